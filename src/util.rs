//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Slice from the first `[` to the last `]` (inclusive).
/// Models like to wrap arrays in prose or code fences; this drops both.
pub fn extract_json_array(text: &str) -> Option<&str> {
  let start = text.find('[')?;
  let end = text.rfind(']')?;
  if end < start {
    return None;
  }
  Some(&text[start..=end])
}

/// Remove every ```json / ``` marker and trim what is left.
pub fn strip_code_fences(text: &str) -> String {
  text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge prompt/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}
