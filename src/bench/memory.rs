//! Peak process memory probing.

/// Peak resident set size of the current process, in MiB.
///
/// Reads `VmHWM` from `/proc/self/status`. Returns `None` on other
/// platforms or when the field cannot be parsed; the benchmark reports
/// that as 0 rather than failing the run.
pub fn peak_rss_mb() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        let line = status.lines().find(|line| line.starts_with("VmHWM:"))?;
        let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
        Some(kib / 1024)
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn test_peak_rss_is_reported_on_linux() {
        let peak = peak_rss_mb();
        assert!(peak.is_some());
        assert!(peak.unwrap() > 0);
    }
}
