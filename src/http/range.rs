//! HTTP Range request parsing module
//!
//! Single `bytes=` range parsing (RFC 7233). Multi-range requests are
//! answered with the full content.

/// Inclusive byte range inside a file of known size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this range
    pub fn content_range(self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Satisfiable range, clamped to the file
    Valid(ByteRange),
    /// Should be answered with 416
    NotSatisfiable,
    /// No Range header or one we ignore; serve the full content
    None,
}

/// Parse a `Range` header against a file of `size` bytes
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
///
/// # Examples
/// ```
/// use asset_server::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// assert_eq!(
///     parse_range_header(Some("bytes=0-99"), 1000),
///     RangeParseResult::Valid(ByteRange { start: 0, end: 99 })
/// );
/// assert_eq!(parse_range_header(None, 1000), RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, size: u64) -> RangeParseResult {
    let Some(ranges) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };
    if ranges.contains(',') {
        return RangeParseResult::None;
    }
    let Some((start, end)) = ranges.split_once('-') else {
        return RangeParseResult::None;
    };

    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() {
        suffix_range(end, size)
    } else {
        bounded_range(start, end, size)
    }
}

fn suffix_range(suffix: &str, size: u64) -> RangeParseResult {
    let Ok(suffix) = suffix.parse::<u64>() else {
        return RangeParseResult::None;
    };
    if suffix == 0 || size == 0 {
        return RangeParseResult::NotSatisfiable;
    }
    RangeParseResult::Valid(ByteRange {
        start: size.saturating_sub(suffix),
        end: size - 1,
    })
}

fn bounded_range(start: &str, end: &str, size: u64) -> RangeParseResult {
    let Ok(start) = start.parse::<u64>() else {
        return RangeParseResult::None;
    };
    if start >= size {
        return RangeParseResult::NotSatisfiable;
    }

    let last = size - 1;
    let end = if end.is_empty() {
        last
    } else {
        match end.parse::<u64>() {
            Ok(e) if e < start => return RangeParseResult::NotSatisfiable,
            Ok(e) => e.min(last),
            Err(_) => return RangeParseResult::None,
        }
    };

    RangeParseResult::Valid(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_range() {
        let RangeParseResult::Valid(range) = parse_range_header(Some("bytes=0-9"), 100) else {
            panic!("Expected Valid");
        };
        assert_eq!(range, ByteRange { start: 0, end: 9 });
        assert_eq!(range.len(), 10);
        assert_eq!(range.content_range(100), "bytes 0-9/100");
    }

    #[test]
    fn test_open_and_clamped_ranges() {
        assert_eq!(
            parse_range_header(Some("bytes=50-"), 100),
            RangeParseResult::Valid(ByteRange { start: 50, end: 99 })
        );
        assert_eq!(
            parse_range_header(Some("bytes=90-500"), 100),
            RangeParseResult::Valid(ByteRange { start: 90, end: 99 })
        );
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(
            parse_range_header(Some("bytes=-20"), 100),
            RangeParseResult::Valid(ByteRange { start: 80, end: 99 })
        );
        assert_eq!(
            parse_range_header(Some("bytes=-500"), 100),
            RangeParseResult::Valid(ByteRange { start: 0, end: 99 })
        );
    }

    #[test]
    fn test_not_satisfiable() {
        for header in ["bytes=200-", "bytes=50-10", "bytes=-0"] {
            assert_eq!(
                parse_range_header(Some(header), 100),
                RangeParseResult::NotSatisfiable,
                "{header}"
            );
        }
        assert_eq!(
            parse_range_header(Some("bytes=0-"), 0),
            RangeParseResult::NotSatisfiable
        );
    }

    #[test]
    fn test_ignored_headers() {
        for header in ["bytes=a-b", "bytes=0-9,20-29", "items=0-9", "bytes=5"] {
            assert_eq!(
                parse_range_header(Some(header), 100),
                RangeParseResult::None,
                "{header}"
            );
        }
    }
}
