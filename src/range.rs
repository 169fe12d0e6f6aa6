//! Parsing and resolution of single `Range: bytes=start-[end]` requests.

use crate::error::StreamError;

const BYTES_UNIT: &str = "bytes";

/// One parsed `bytes=start-end` or `bytes=start-` expression.
///
/// `end`, when present, is never less than `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    pub start: u64,
    pub end: Option<u64>,
}

impl RangeRequest {
    /// Parses a `Range` header value.
    ///
    /// `None` or a blank value is [`StreamError::MissingHeader`], since every
    /// streaming request must carry a range. Anything other than exactly one
    /// `bytes=start-[end]` expression is [`StreamError::MalformedHeader`].
    pub fn parse(header: Option<&str>) -> Result<RangeRequest, StreamError> {
        let header = header.map(str::trim).unwrap_or_default();
        if header.is_empty() {
            return Err(StreamError::MissingHeader);
        }

        let (unit, spec) = header.split_once('=').ok_or(StreamError::MalformedHeader)?;
        if unit != BYTES_UNIT {
            tracing::debug!("unsupported range unit {:?}", unit);
            return Err(StreamError::MalformedHeader);
        }

        // multi-range sets are not served
        if spec.contains(',') {
            tracing::debug!("multiple ranges requested: {:?}", spec);
            return Err(StreamError::MalformedHeader);
        }

        let (start, end) = spec.split_once('-').ok_or(StreamError::MalformedHeader)?;
        let start = parse_position(start)?;
        let end = match end {
            "" => None,
            end => Some(parse_position(end)?),
        };

        if let Some(end) = end {
            if end < start {
                tracing::debug!("range end {} precedes start {}", end, start);
                return Err(StreamError::MalformedHeader);
            }
        }

        Ok(RangeRequest { start, end })
    }

    /// Validates this request against the current size of the resource.
    ///
    /// An open end serves through the final byte. An end past the final byte
    /// is clamped to it rather than rejected, since some players probe past
    /// EOF. A start at or beyond `total` is always unsatisfiable, which makes
    /// empty resources unaddressable.
    pub fn resolve(&self, total: u64) -> Result<ResolvedRange, StreamError> {
        if self.start >= total {
            tracing::debug!("range start {} not below size {}", self.start, total);
            return Err(StreamError::InvalidRange);
        }

        let last = total - 1;
        let end = self.end.map_or(last, |end| end.min(last));
        if end < self.start {
            return Err(StreamError::InvalidRange);
        }

        Ok(ResolvedRange { start: self.start, end, total })
    }
}

/// A byte window satisfying `start <= end < total`. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ResolvedRange {
    /// Number of bytes in the window, always at least one.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// A resolved window is never empty; see [`RangeRequest::resolve`].
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// `u64::from_str` tolerates a leading `+`, which is not valid in a byte position.
fn parse_position(s: &str) -> Result<u64, StreamError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StreamError::MalformedHeader);
    }
    s.parse().map_err(|_| StreamError::MalformedHeader)
}
