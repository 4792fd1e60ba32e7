use crate::data::{RangeRequest, RangeResponseInfo};
use crate::error::{Error, Result};

/// Turns persisted progress into the next `Range` to ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeCalculator {
    chunk_size: u64,
    unit:       String,
}

impl RangeCalculator {
    pub fn new(chunk_size: u64, unit: impl Into<String>) -> Self {
        Self {
            chunk_size,
            unit: unit.into(),
        }
    }

    /// `persisted` must be the partial file size read just before the
    /// request; it is the first byte not yet on disk.
    ///
    /// ```
    /// use rget_fetch::core::RangeCalculator;
    ///
    /// let calc = RangeCalculator::new(100, "bytes");
    /// assert_eq!(calc.next_range(0).header_value(), "bytes=0-100");
    /// assert_eq!(calc.next_range(101).header_value(), "bytes=101-201");
    /// ```
    pub fn next_range(&self, persisted: u64) -> RangeRequest {
        RangeRequest::new(
            self.unit.clone(),
            persisted,
            persisted.saturating_add(self.chunk_size),
        )
    }
}

/// Parses `<unit> <start>-<end>/<total>`.
///
/// The header is split on the first space, then on `/`, then on `-`. An
/// unknown total (`*`) or an end before the start is rejected.
pub fn parse_content_range(header: &str) -> Result<RangeResponseInfo> {
    let malformed = || Error::MalformedContentRange(header.to_string());

    let (unit, data) = header.trim().split_once(' ').ok_or_else(malformed)?;
    let (range, total) = data.trim().split_once('/').ok_or_else(malformed)?;
    let (start, end) = range.split_once('-').ok_or_else(malformed)?;

    let number = |s: &str| s.trim().parse::<u64>().map_err(|_| malformed());
    let info = RangeResponseInfo {
        unit:  unit.to_string(),
        start: number(start)?,
        end:   number(end)?,
        total: number(total)?,
    };

    if info.end < info.start {
        return Err(malformed());
    }
    Ok(info)
}

impl RangeResponseInfo {
    pub fn parse(header: &str) -> Result<Self> { parse_content_range(header) }
}

impl std::str::FromStr for RangeResponseInfo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> { parse_content_range(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_range_from_empty() {
        let calc = RangeCalculator::new(10 * 1024 * 1024, "bytes");
        let range = calc.next_range(0);
        assert_eq!(range.start, 0);
        assert_eq!(range.end, 10 * 1024 * 1024);
        assert_eq!(range.header_value(), "bytes=0-10485760");
    }

    #[test]
    fn test_next_range_starts_at_persisted() {
        let calc = RangeCalculator::new(50, "bytes");
        for persisted in [1, 49, 50, 51, 12_345] {
            let range = calc.next_range(persisted);
            assert_eq!(range.start, persisted);
            assert_eq!(range.end, persisted + 50);
        }
    }

    #[test]
    fn test_next_range_saturates() {
        let calc = RangeCalculator::new(u64::MAX, "bytes");
        assert_eq!(calc.next_range(10).end, u64::MAX);
    }

    #[test]
    fn test_next_range_custom_unit() {
        let calc = RangeCalculator::new(5, "items");
        assert_eq!(calc.next_range(5).header_value(), "items=5-10");
    }

    #[test]
    fn test_parse_content_range() {
        let info = parse_content_range("bytes 0-99/100").unwrap();
        assert_eq!(info.unit, "bytes");
        assert_eq!((info.start, info.end, info.total), (0, 99, 100));
        assert!(info.is_final());

        let info: RangeResponseInfo = "bytes 0-10485759/31000000".parse().unwrap();
        assert_eq!(info.end - info.start + 1, 10 * 1024 * 1024);
        assert!(!info.is_final());
    }

    #[test]
    fn test_parse_content_range_tolerates_padding() {
        let info = parse_content_range("  bytes  200-299/1000 ").unwrap();
        assert_eq!((info.start, info.end, info.total), (200, 299, 1000));
    }

    #[test]
    fn test_parse_content_range_rejects_malformed() {
        for bad in [
            "",
            "bytes",
            "bytes 0-99",
            "bytes 0/100",
            "bytes */100",
            "bytes 0-99/*",
            "bytes a-b/c",
            "bytes 50-10/100",
        ] {
            assert!(
                matches!(parse_content_range(bad), Err(Error::MalformedContentRange(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
