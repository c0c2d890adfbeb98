//! The result accumulator.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::ParseError;
use crate::normalize::SEPARATOR;
use crate::value::Value;

/// Result key used for a remainder named `--`.
///
/// Canonical keys never contain two consecutive underscores, so this key
/// cannot collide with any declared name.
pub const REMAINDER_KEY: &str = "__rest";

/// Derives the result key for a declared name.
///
/// Leading `-` markers are stripped and every run of non-alphanumeric
/// characters becomes a single `_`.
///
/// # Examples
///
/// ```
/// use argspec_core::{canonical_key, REMAINDER_KEY};
///
/// assert_eq!(canonical_key("--num-workers"), "num_workers");
/// assert_eq!(canonical_key("-i"), "i");
/// assert_eq!(canonical_key("input file"), "input_file");
/// assert_eq!(canonical_key("--"), REMAINDER_KEY);
/// ```
pub fn canonical_key(name: &str) -> String {
    static NON_ALNUM_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("static regex must compile"));

    if name == SEPARATOR {
        return REMAINDER_KEY.to_string();
    }
    let stripped = name.trim_start_matches('-');
    NON_ALNUM_RE.replace_all(stripped, "_").into_owned()
}

/// Values and errors produced by one parse.
///
/// Keys keep insertion order: defaults first (in declaration order), then
/// keys first written during the scan.
///
/// # Examples
///
/// ```
/// use argspec_core::{OptionGroup, Spec, ValueOption};
///
/// let spec = Spec::new(
///     OptionGroup::new().with(ValueOption::new(["-n", "--num-workers"])),
/// )
/// .unwrap();
/// let args = spec.parse(["-n", "3"]).unwrap();
///
/// assert_eq!(args.get_str("n"), Some("3"));
/// assert_eq!(args.get_str("--num-workers"), Some("3"));
/// assert!(args.is_clean());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    values: IndexMap<String, Value>,
    errors: Vec<ParseError>,
}

impl ParsedArgs {
    /// Looks up a value by canonical key or by any declared name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values
            .get(key)
            .or_else(|| self.values.get(&canonical_key(key)))
    }

    /// Whether a key (or declared name) has a value.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// String value for `key`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Integer value for `key`.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    /// List value for `key`.
    pub fn get_list(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_list)
    }

    /// Boolean value for `key`; `false` when absent.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// All values in insertion order.
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Errors recorded under [`OnError::Record`](crate::OnError::Record).
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Recorded errors rendered as messages.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// `true` when no error was recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Stores `value` under the key of every name.
    pub(crate) fn store(&mut self, names: &[String], value: &Value) {
        for name in names {
            self.values.insert(canonical_key(name), value.clone());
        }
    }

    /// Value under the key of `name`, bypassing name fallback.
    pub(crate) fn stored(&self, name: &str) -> Option<&Value> {
        self.values.get(&canonical_key(name))
    }

    pub(crate) fn push_error(&mut self, error: ParseError) {
        self.errors.push(error);
    }
}

/// Serializes as `{ "values": {...}, "errors": ["message", ...] }`.
impl Serialize for ParsedArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ParsedArgs", 2)?;
        state.serialize_field("values", &self.values)?;
        state.serialize_field("errors", &self.error_messages())?;
        state.end()
    }
}
