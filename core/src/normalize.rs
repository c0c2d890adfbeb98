//! Token normalization.
//!
//! Rewrites raw argv into the canonical form the nodes match against:
//! clustered short flags are split, `--name=value` is split, and `--` is kept
//! as the end-of-options separator. Everything after the separator passes
//! through untouched.

use crate::error::ParseError;

/// The end-of-options separator.
pub const SEPARATOR: &str = "--";

/// Normalizes a full token list.
///
/// # Errors
///
/// Returns [`ParseError::MalformedToken`] for the first long-form token that
/// carries more than one `=` or has no name before the `=`.
///
/// # Examples
///
/// ```
/// use argspec_core::normalize;
///
/// assert_eq!(normalize(["-abc"]).unwrap(), ["-a", "-b", "-c"]);
/// assert_eq!(normalize(["--foo=bar"]).unwrap(), ["--foo", "bar"]);
/// assert_eq!(normalize(["--", "-xy"]).unwrap(), ["--", "-xy"]);
/// assert!(normalize(["--foo=a=b"]).is_err());
/// ```
pub fn normalize<I, S>(tokens: I) -> Result<Vec<String>, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalizer = Normalizer::default();
    let mut out = Vec::new();
    for token in tokens {
        out.extend(normalizer.push(token.as_ref())?);
    }
    Ok(out)
}

/// Incremental normalizer.
///
/// The dispatcher feeds tokens one at a time so a malformed token can be
/// reported and dropped without losing the rest of the list.
#[derive(Debug, Default)]
pub(crate) struct Normalizer {
    after_separator: bool,
}

impl Normalizer {
    pub(crate) fn push(&mut self, token: &str) -> Result<Vec<String>, ParseError> {
        if self.after_separator {
            return Ok(vec![token.to_string()]);
        }
        if token == SEPARATOR {
            self.after_separator = true;
            return Ok(vec![token.to_string()]);
        }
        split_token(token)
    }
}

fn split_token(token: &str) -> Result<Vec<String>, ParseError> {
    if let Some(body) = token.strip_prefix(SEPARATOR) {
        let mut parts = body.split('=');
        let name = parts.next().unwrap_or_default();
        return match (parts.next(), parts.next()) {
            (None, _) => Ok(vec![token.to_string()]),
            (Some(_), _) if name.is_empty() => Err(ParseError::MalformedToken(token.to_string())),
            (Some(value), None) => Ok(vec![format!("{SEPARATOR}{name}"), value.to_string()]),
            (Some(_), Some(_)) => Err(ParseError::MalformedToken(token.to_string())),
        };
    }

    if let Some(cluster) = token.strip_prefix('-') {
        if cluster.chars().count() > 1 {
            return Ok(cluster.chars().map(|c| format!("-{c}")).collect());
        }
    }

    Ok(vec![token.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_clustered_short_flags() {
        assert_eq!(normalize(["-abc"]).unwrap(), vec!["-a", "-b", "-c"]);
    }

    #[test]
    fn test_split_long_assignment() {
        assert_eq!(normalize(["--foo=bar"]).unwrap(), vec!["--foo", "bar"]);
        assert_eq!(normalize(["--foo="]).unwrap(), vec!["--foo", ""]);
    }

    #[test]
    fn test_multiple_equals_is_malformed() {
        assert_eq!(
            normalize(["--foo=a=b"]).unwrap_err(),
            ParseError::MalformedToken("--foo=a=b".to_string())
        );
    }

    #[test]
    fn test_assignment_without_name_is_malformed() {
        // `--=x` must not turn into a separator.
        assert_eq!(
            normalize(["--=x", "-a"]).unwrap_err(),
            ParseError::MalformedToken("--=x".to_string())
        );
    }

    #[test]
    fn test_plain_tokens_pass_through() {
        let tokens = ["file.txt", "-", "-v", "--verbose", "a=b", "--"];
        assert_eq!(normalize(tokens).unwrap(), tokens.to_vec());
    }

    #[test]
    fn test_separator_stops_normalization() {
        assert_eq!(
            normalize(["-ab", "--", "-cd", "--x=y=z"]).unwrap(),
            vec!["-a", "-b", "--", "-cd", "--x=y=z"]
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = ["-vx", "--out=o.txt", "in", "-n", "3", "--", "-zz"];
        let once = normalize(raw).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_split_is_char_based() {
        assert_eq!(normalize(["-éa"]).unwrap(), vec!["-é", "-a"]);
    }

    #[test]
    fn test_value_from_assignment_is_not_resplit() {
        // The value half of `--n=-12` is kept whole.
        assert_eq!(normalize(["--n=-12"]).unwrap(), vec!["--n", "-12"]);
    }
}
