use std::fmt;

pub const DEFAULT_RANGE_UNIT: &str = "bytes";

/// An outgoing byte range, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRequest {
    pub unit:  String,
    pub start: u64,
    pub end:   u64,
}

impl RangeRequest {
    pub fn new(unit: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            unit: unit.into(),
            start,
            end,
        }
    }

    /// Value for the `Range` request header: `<unit>=<start>-<end>`.
    pub fn header_value(&self) -> String { self.to_string() }
}

impl fmt::Display for RangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}-{}", self.unit, self.start, self.end)
    }
}

/// What a `Content-Range: <unit> <start>-<end>/<total>` header announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeResponseInfo {
    pub unit:  String,
    pub start: u64,
    pub end:   u64,
    pub total: u64,
}

impl RangeResponseInfo {
    /// True once the announced range reaches the last byte of the resource.
    pub fn is_final(&self) -> bool { self.end.saturating_add(1) >= self.total }
}

impl fmt::Display for RangeResponseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}/{}", self.unit, self.start, self.end, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_header_value() {
        assert_eq!(RangeRequest::new("bytes", 0, 100).header_value(), "bytes=0-100");
        assert_eq!(RangeRequest::new("items", 5, 9).header_value(), "items=5-9");
    }

    #[test]
    fn test_is_final() {
        let info = |start, end, total| RangeResponseInfo {
            unit: DEFAULT_RANGE_UNIT.into(),
            start,
            end,
            total,
        };
        assert!(info(0, 99, 100).is_final());
        assert!(!info(0, 98, 100).is_final());
        assert!(info(100, 100, 100).is_final());
    }
}
