//! Struct-tag style marker strings: `inject:"db" singleton:"true" nilable:"true"`.

/// The three injection markers a field can carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
  /// `None` when the field is not injectable at all. An empty key means
  /// "resolve by the field's type".
  pub inject: Option<String>,
  pub singleton: bool,
  pub nilable: bool,
}

impl Markers {
  /// Parses a tag string and layers its markers over `self`.
  ///
  /// Unknown keys are ignored. `nilable` and `cannil` are the same marker.
  pub(crate) fn merge_tag(mut self, tag: &str) -> Result<Self, String> {
    for (key, value) in parse(tag)? {
      match key {
        "inject" => self.inject = Some(value),
        "singleton" => self.singleton = value == "true",
        "nilable" | "cannil" => self.nilable = self.nilable || value == "true",
        _ => {}
      }
    }
    Ok(self)
  }
}

/// Splits a tag string into `(key, unquoted value)` pairs.
pub(crate) fn parse(tag: &str) -> Result<Vec<(&str, String)>, String> {
  let mut pairs = Vec::new();
  let mut rest = tag;

  loop {
    rest = rest.trim_start_matches(' ');
    if rest.is_empty() {
      return Ok(pairs);
    }

    let key_len = rest
      .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\u{7f}')
      .unwrap_or(rest.len());
    if key_len == 0 {
      return Err(format!("expected a key at `{}`", rest));
    }
    let key = &rest[..key_len];
    rest = &rest[key_len..];

    rest = rest
      .strip_prefix(":\"")
      .ok_or_else(|| format!("key `{}` must be followed by `:\"`", key))?;

    let mut value = String::new();
    let mut chars = rest.char_indices();
    let end = loop {
      match chars.next() {
        Some((i, '"')) => break i,
        Some((_, '\\')) => match chars.next() {
          Some((_, escaped @ ('"' | '\\'))) => value.push(escaped),
          Some((_, 'n')) => value.push('\n'),
          Some((_, 't')) => value.push('\t'),
          Some((_, other)) => return Err(format!("unsupported escape `\\{}` in `{}`", other, key)),
          None => return Err(format!("unterminated value for `{}`", key)),
        },
        Some((_, c)) => value.push(c),
        None => return Err(format!("unterminated value for `{}`", key)),
      }
    };
    rest = &rest[end + 1..];
    pairs.push((key, value));
  }
}
