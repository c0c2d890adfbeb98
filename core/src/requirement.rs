//! Requirements attached to value-bearing nodes.
//!
//! Conversion always happens first; the requirement then checks either the
//! converted value (enumeration, predicate) or the raw token (pattern). That
//! split is what lets `one_of([1, 2, 3])` accept the token `"7"` as the
//! integer 7 while a pattern still sees exactly what was typed.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::ParseError;
use crate::value::{Value, ValueType};

/// Answer returned by a predicate requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The value is acceptable.
    Accept,
    /// The value is rejected without a specific reason.
    Reject,
    /// The value is rejected; the reason is shown to the user.
    RejectWith(String),
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok { Self::Accept } else { Self::Reject }
    }
}

impl From<Result<(), String>> for Verdict {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::Accept,
            Err(reason) => Self::RejectWith(reason),
        }
    }
}

type PredicateFn = dyn Fn(&Value) -> Verdict + Send + Sync;

/// A constraint checked after a token has been converted.
///
/// # Examples
///
/// ```
/// use argspec_core::{Requirement, Value};
///
/// let levels = Requirement::one_of([1, 2, 3]);
/// assert_eq!(levels.to_string(), "must be one of 1, 2, 3");
///
/// let even = Requirement::predicate(|v: &Value| v.as_int().is_some_and(|n| n % 2 == 0));
/// assert!(matches!(even, Requirement::Predicate(_)));
///
/// let hex = Requirement::pattern("^[0-9a-f]+$").unwrap();
/// assert_eq!(hex.to_string(), "must match ^[0-9a-f]+$");
/// ```
#[derive(Clone)]
pub enum Requirement {
    /// The converted value must equal one of these.
    OneOf(Vec<Value>),
    /// The raw token must match this regular expression (unanchored search).
    Pattern(Regex),
    /// The converted value is handed to this function.
    Predicate(Arc<PredicateFn>),
}

impl Requirement {
    /// Enumeration requirement.
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Pattern requirement.
    ///
    /// # Errors
    ///
    /// Returns the [`regex::Error`] if `pattern` does not compile.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    /// Predicate requirement.
    ///
    /// The closure may answer with a `bool`, a [`Verdict`], or a
    /// `Result<(), String>` whose error becomes the rejection reason.
    pub fn predicate<F, R>(check: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self::Predicate(Arc::new(move |value| check(value).into()))
    }

    fn verdict(&self, raw: &str, value: &Value) -> Verdict {
        match self {
            Self::OneOf(allowed) => allowed.iter().any(|a| same_value(a, value)).into(),
            Self::Pattern(re) => re.is_match(raw).into(),
            Self::Predicate(check) => check(value),
        }
    }
}

/// Equality with integers and floats compared numerically.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(_), Value::Float(_)) | (Value::Float(_), Value::Int(_)) => {
            a.as_float() == b.as_float()
        }
        _ => a == b,
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneOf(allowed) => {
                let list: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                write!(f, "must be one of {}", list.join(", "))
            }
            Self::Pattern(re) => write!(f, "must match {}", re.as_str()),
            Self::Predicate(_) => f.write_str("validation failed"),
        }
    }
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneOf(allowed) => f.debug_tuple("OneOf").field(allowed).finish(),
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Converts `raw` to `value_type` and checks it against `requirement`.
///
/// `option` names the node in error messages.
///
/// # Errors
///
/// [`ParseError::Conversion`] when the token does not parse,
/// [`ParseError::Validation`] when the requirement rejects it.
///
/// # Examples
///
/// ```
/// use argspec_core::{convert_token, ParseError, Requirement, Value, ValueType};
///
/// let req = Requirement::one_of([1, 2, 3]);
/// let ty = ValueType::of::<i64>();
///
/// assert_eq!(convert_token(&ty, "2", Some(&req), "-n"), Ok(Value::Int(2)));
/// assert!(matches!(
///     convert_token(&ty, "9", Some(&req), "-n"),
///     Err(ParseError::Validation { .. })
/// ));
/// assert!(matches!(
///     convert_token(&ty, "two", Some(&req), "-n"),
///     Err(ParseError::Conversion { .. })
/// ));
/// ```
pub fn convert_token(
    value_type: &ValueType,
    raw: &str,
    requirement: Option<&Requirement>,
    option: &str,
) -> Result<Value, ParseError> {
    let value = value_type
        .convert(raw)
        .ok_or_else(|| ParseError::Conversion {
            token: raw.to_string(),
            option: option.to_string(),
            type_name: value_type.name(),
        })?;

    let Some(requirement) = requirement else {
        return Ok(value);
    };

    let reason = match requirement.verdict(raw, &value) {
        Verdict::Accept => return Ok(value),
        Verdict::Reject => requirement.to_string(),
        Verdict::RejectWith(reason) => reason,
    };

    Err(ParseError::Validation {
        token: raw.to_string(),
        option: option.to_string(),
        type_name: (!value_type.is_string()).then(|| value_type.name()),
        reason,
    })
}
