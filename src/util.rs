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

/// True if the string contains something other than whitespace.
/// Used for the report gate and for edit-mode structure prompts.
pub fn is_filled(s: &str) -> bool {
  !s.trim().is_empty()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
#[allow(dead_code)]
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn template_replaces_all_occurrences() {
    let out = fill_template("{a} and {a} with {b}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and x with y");
  }

  #[test]
  fn filled_rejects_whitespace_only() {
    assert!(is_filled("  report "));
    assert!(!is_filled("   "));
    assert!(!is_filled(""));
  }
}
