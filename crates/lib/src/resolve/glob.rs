//! Glob pattern compilation.
//!
//! Patterns always use `/` as separator and are matched against the *entire*
//! relative path of a candidate file.
//!
//! | Token    | Meaning                                   |
//! |----------|-------------------------------------------|
//! | `**/`    | zero or more whole path segments          |
//! | `**`     | anything, separators included             |
//! | `*`      | anything within a single segment          |
//! | `?`      | exactly one non-separator character       |
//! | `[...]`  | character class (`[!...]` negates)       |

use regex::Regex;

use super::ResolveError;

/// Characters that turn a path specification into a glob.
const GLOB_METACHARS: &[char] = &['*', '?', '['];

/// A compiled glob, matching whole `/`-separated relative paths.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
  pattern: String,
  regex: Regex,
}

impl GlobMatcher {
  /// The glob this matcher was compiled from.
  pub fn pattern(&self) -> &str {
    &self.pattern
  }

  /// Returns true if `relative_path` matches the whole pattern.
  ///
  /// Backslashes are normalized to `/` before matching.
  pub fn is_match(&self, relative_path: &str) -> bool {
    if relative_path.contains('\\') {
      self.regex.is_match(&relative_path.replace('\\', "/"))
    } else {
      self.regex.is_match(relative_path)
    }
  }
}

/// Returns true if the path specification contains glob metacharacters.
pub fn looks_like_glob(spec: &str) -> bool {
  spec.contains(GLOB_METACHARS)
}

/// Split a glob path into its literal base directory and the glob remainder.
///
/// The base is everything up to the last `/` preceding the first metacharacter.
/// A pattern without any such `/` is relative to `"."`.
pub fn split_glob_base(spec: &str) -> (String, String) {
  let normalized = spec.replace('\\', "/");
  let first_meta = normalized.find(GLOB_METACHARS).unwrap_or(normalized.len());

  match normalized[..first_meta].rfind('/') {
    None => (".".to_string(), normalized),
    Some(0) => ("/".to_string(), normalized[1..].to_string()),
    Some(slash) => (
      normalized[..slash].to_string(),
      normalized[slash + 1..].trim_start_matches('/').to_string(),
    ),
  }
}

/// Compile a glob into a matcher.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher, ResolveError> {
  let source = glob_to_regex(pattern);
  let regex = Regex::new(&source).map_err(|e| ResolveError::InvalidPattern {
    pattern: pattern.to_string(),
    source: Box::new(e),
  })?;

  Ok(GlobMatcher {
    pattern: pattern.to_string(),
    regex,
  })
}

/// Translate a glob into an anchored regex source string.
fn glob_to_regex(glob: &str) -> String {
  let chars: Vec<char> = glob.replace('\\', "/").chars().collect();
  let mut re = String::with_capacity(chars.len() * 2 + 2);
  re.push('^');

  let mut i = 0;
  while i < chars.len() {
    match chars[i] {
      '*' if chars.get(i + 1) == Some(&'*') => {
        if chars.get(i + 2) == Some(&'/') {
          re.push_str("(?:.*/)?");
          i += 3;
        } else {
          re.push_str(".*");
          i += 2;
        }
        continue;
      }
      '*' => re.push_str("[^/]*"),
      '?' => re.push_str("[^/]"),
      '[' => match chars[i + 1..].iter().position(|c| *c == ']') {
        Some(offset) => {
          let end = i + 1 + offset;
          re.push('[');
          let mut body: String = chars[i + 1..end].iter().collect();
          if let Some(rest) = body.strip_prefix('!') {
            body = format!("^{rest}");
          }
          re.push_str(&body);
          re.push(']');
          i = end + 1;
          continue;
        }
        None => re.push_str(r"\["),
      },
      c => {
        let mut buf = [0u8; 4];
        re.push_str(&regex::escape(c.encode_utf8(&mut buf)));
      }
    }
    i += 1;
  }

  re.push('$');
  re
}
