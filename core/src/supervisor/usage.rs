//! Peak resident memory captured from process accounting

/// Unit the OS uses for `ru_maxrss`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RssUnit {
    /// Linux and the BSDs
    Kilobytes,
    /// macOS and iOS
    Bytes,
}

impl RssUnit {
    /// Unit reported by the platform this binary was built for
    pub fn native() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            RssUnit::Bytes
        } else {
            RssUnit::Kilobytes
        }
    }
}

/// Convert a raw `ru_maxrss` value to kilobytes
pub fn normalize_max_rss(raw: i64, unit: RssUnit) -> u64 {
    let raw = u64::try_from(raw).unwrap_or(0);
    match unit {
        RssUnit::Kilobytes => raw,
        RssUnit::Bytes => raw / 1024,
    }
}

/// Resource usage of an exited server process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUsage {
    /// Peak resident set size in kilobytes, `None` when the platform has no
    /// process accounting
    pub max_rss_kb: Option<u64>,
}

impl ResourceUsage {
    /// Usage for a platform that cannot report anything
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Build from the raw value returned by the OS, in its native unit
    pub fn from_raw_max_rss(raw: Option<i64>) -> Self {
        Self {
            max_rss_kb: raw.map(|value| normalize_max_rss(value, RssUnit::native())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kilobytes_are_kept() {
        assert_eq!(normalize_max_rss(20_480, RssUnit::Kilobytes), 20_480);
    }

    #[test]
    fn test_bytes_are_divided() {
        assert_eq!(normalize_max_rss(20_971_520, RssUnit::Bytes), 20_480);
        assert_eq!(normalize_max_rss(1023, RssUnit::Bytes), 0);
    }

    #[test]
    fn test_negative_raw_is_clamped() {
        assert_eq!(normalize_max_rss(-1, RssUnit::Kilobytes), 0);
    }

    #[test]
    fn test_native_unit() {
        let unit = RssUnit::native();
        if cfg!(target_os = "macos") {
            assert_eq!(unit, RssUnit::Bytes);
        } else if cfg!(target_os = "linux") {
            assert_eq!(unit, RssUnit::Kilobytes);
        }
    }

    #[test]
    fn test_usage_from_raw() {
        assert_eq!(ResourceUsage::from_raw_max_rss(None), ResourceUsage::unavailable());
        let usage = ResourceUsage::from_raw_max_rss(Some(4096));
        assert!(usage.max_rss_kb.is_some());
    }
}
