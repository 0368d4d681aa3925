//! Small utility helpers used across modules.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as unix epoch milliseconds.
pub fn now_millis() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis() as u64)
    .unwrap_or(0)
}

/// Log-safe truncation for large strings, cut on a char boundary.
/// Avoids spamming logs with whole learner responses.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}
