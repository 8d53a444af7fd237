//! Small helpers for logging, cancellation and the file system.

use std::error::Error;
use std::fs as stdfs;
use std::future::Future;
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes, backing off to the previous
/// character boundary so multi-byte Vietnamese text never splits, with the
/// number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Drive `work` to completion unless `stop` fires first.
///
/// Cancellation wins when both are ready in the same poll.
pub async fn until_cancelled<T>(stop: &CancellationToken, work: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        _ = stop.cancelled() => None,
        out = work => Some(out),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then writes and removes a probe
/// file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Xin chào", 100), "Xin chào");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        // "Thể" is T(1) h(1) ể(3 bytes); cutting at 3 would split ể.
        let result = truncate_for_log("Thể thao", 3);
        assert_eq!(result, "Th…(+8 bytes)");
    }

    #[tokio::test]
    async fn test_until_cancelled_prefers_cancellation() {
        let stop = CancellationToken::new();
        assert_eq!(until_cancelled(&stop, async { 7 }).await, Some(7));
        stop.cancel();
        assert_eq!(until_cancelled(&stop, async { 7 }).await, None);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b");
        ensure_writable_dir(target.to_str().unwrap()).await.unwrap();
        assert!(target.is_dir());
    }
}
