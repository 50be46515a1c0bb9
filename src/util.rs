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

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let cut = s.char_indices().take_while(|(i, _)| *i < max).map(|(i, c)| i + c.len_utf8()).last().unwrap_or(0);
    format!("{}… ({} bytes total)", &s[..cut], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_all_occurrences() {
    let out = fill_template("{a} + {b} = {a}{b}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x + y = xy");
  }

  #[test]
  fn trunc_for_log_keeps_short_strings() {
    assert_eq!(trunc_for_log("x^2 - 9", 64), "x^2 - 9");
  }

  #[test]
  fn trunc_for_log_respects_char_boundaries() {
    let s = "Trinomio de la forma x² + bx + c, repetido varias veces para pasar el límite";
    let t = trunc_for_log(s, 30);
    assert!(t.ends_with("bytes total)"));
  }
}
