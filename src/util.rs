//! Small utility helpers used across modules.

/// Format a duration in seconds as zero-padded `mm:ss`.
/// Minutes are not wrapped into hours, so 3600 becomes "60:00".
pub fn format_time(seconds: u32) -> String {
  format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with whole question prompts or malformed payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}
