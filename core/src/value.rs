//! Typed values and token conversion.
//!
//! Every value-bearing node declares a [`ValueType`], built from a type that
//! implements [`FromToken`]. The conversion function is picked once, when the
//! node is built, and produces a [`Value`] that the result map stores.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A parsed value as stored in [`ParsedArgs`](crate::ParsedArgs).
///
/// Serializes untagged, so a result map renders as plain JSON/YAML.
///
/// # Examples
///
/// ```
/// use argspec_core::Value;
///
/// let v = Value::from(7i64);
/// assert_eq!(v.as_int(), Some(7));
/// assert_eq!(v.to_string(), "7");
///
/// let list = Value::List(vec!["a".into(), "b".into()]);
/// assert_eq!(list.to_string(), "[a, b]");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean (flags, `bool` options).
    Bool(bool),
    /// Any signed or unsigned integer up to 32 bits, and `i64`.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Strings, paths and characters.
    Str(String),
    /// Collected values (`until` options, multiple positionals, remainders).
    List(Vec<Value>),
}

impl Value {
    /// Returns the string payload, if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is a [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float payload; integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list payload, if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Conversion from a raw token into a typed [`Value`].
///
/// Implemented for the value types a spec can declare. Implement it for your
/// own types to accept them in [`ValueOption::of`](crate::ValueOption::of)
/// and [`Positional::of`](crate::Positional::of).
///
/// # Examples
///
/// ```
/// use argspec_core::{FromToken, Value};
///
/// assert_eq!(i8::from_token("-3"), Some(-3));
/// assert_eq!(i8::from_token("300"), None);
/// assert_eq!(bool::from_token("true").map(FromToken::into_value), Some(Value::Bool(true)));
/// ```
pub trait FromToken: Sized {
    /// Type name used in error messages.
    const TYPE_NAME: &'static str;

    /// Parses `token`, returning `None` when it is not a valid `Self`.
    fn from_token(token: &str) -> Option<Self>;

    /// Wraps the parsed value for storage.
    fn into_value(self) -> Value;
}

macro_rules! from_token_via_parse {
    ($($ty:ty => $name:literal, $variant:ident, $widen:ty;)*) => {
        $(
            impl FromToken for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_token(token: &str) -> Option<Self> {
                    token.parse().ok()
                }

                fn into_value(self) -> Value {
                    Value::$variant(<$widen>::from(self))
                }
            }
        )*
    };
}

from_token_via_parse! {
    i8 => "i8", Int, i64;
    i16 => "i16", Int, i64;
    i32 => "i32", Int, i64;
    i64 => "i64", Int, i64;
    u8 => "u8", Int, i64;
    u16 => "u16", Int, i64;
    u32 => "u32", Int, i64;
    f32 => "f32", Float, f64;
    f64 => "f64", Float, f64;
    bool => "bool", Bool, bool;
}

impl FromToken for String {
    const TYPE_NAME: &'static str = "string";

    fn from_token(token: &str) -> Option<Self> {
        Some(token.to_string())
    }

    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl FromToken for PathBuf {
    const TYPE_NAME: &'static str = "path";

    fn from_token(token: &str) -> Option<Self> {
        Some(PathBuf::from(token))
    }

    fn into_value(self) -> Value {
        Value::Str(self.to_string_lossy().into_owned())
    }
}

impl FromToken for char {
    const TYPE_NAME: &'static str = "char";

    fn from_token(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

/// Signed integer widths usable by [`CounterOption`](crate::CounterOption).
pub trait CounterInt: FromToken {
    /// Smallest representable count.
    const MIN: i64;
    /// Largest representable count.
    const MAX: i64;
}

impl CounterInt for i8 {
    const MIN: i64 = i8::MIN as i64;
    const MAX: i64 = i8::MAX as i64;
}

impl CounterInt for i16 {
    const MIN: i64 = i16::MIN as i64;
    const MAX: i64 = i16::MAX as i64;
}

impl CounterInt for i32 {
    const MIN: i64 = i32::MIN as i64;
    const MAX: i64 = i32::MAX as i64;
}

impl CounterInt for i64 {
    const MIN: i64 = i64::MIN;
    const MAX: i64 = i64::MAX;
}

/// The declared type of a value-bearing node.
///
/// Holds the type's name and its conversion function, resolved statically
/// from a [`FromToken`] implementation.
///
/// # Examples
///
/// ```
/// use argspec_core::{Value, ValueType};
///
/// let ty = ValueType::of::<u16>();
/// assert_eq!(ty.name(), "u16");
/// assert_eq!(ty.convert("8080"), Some(Value::Int(8080)));
/// assert_eq!(ty.convert("-1"), None);
/// assert!(!ty.is_string());
/// ```
#[derive(Clone, Copy)]
pub struct ValueType {
    name: &'static str,
    convert: fn(&str) -> Option<Value>,
}

impl ValueType {
    /// The value type backed by `T`.
    pub fn of<T: FromToken>() -> Self {
        Self {
            name: T::TYPE_NAME,
            convert: convert_as::<T>,
        }
    }

    /// Plain strings (the default for every node).
    pub fn string() -> Self {
        Self::of::<String>()
    }

    /// Name of the type, as shown in error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this is the plain string type.
    pub fn is_string(&self) -> bool {
        self.name == String::TYPE_NAME
    }

    /// Converts `token`, returning `None` when it does not parse.
    pub fn convert(&self, token: &str) -> Option<Value> {
        (self.convert)(token)
    }
}

impl Default for ValueType {
    fn default() -> Self {
        Self::string()
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueType").field(&self.name).finish()
    }
}

fn convert_as<T: FromToken>(token: &str) -> Option<Value> {
    T::from_token(token).map(FromToken::into_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths_reject_out_of_range() {
        assert_eq!(ValueType::of::<i8>().convert("127"), Some(Value::Int(127)));
        assert_eq!(ValueType::of::<i8>().convert("128"), None);
        assert_eq!(ValueType::of::<u8>().convert("-1"), None);
        assert_eq!(
            ValueType::of::<u32>().convert("4294967295"),
            Some(Value::Int(4_294_967_295))
        );
    }

    #[test]
    fn test_float_and_bool_conversion() {
        assert_eq!(ValueType::of::<f64>().convert("1.5"), Some(Value::Float(1.5)));
        assert_eq!(ValueType::of::<f32>().convert("x"), None);
        assert_eq!(ValueType::of::<bool>().convert("false"), Some(Value::Bool(false)));
        assert_eq!(ValueType::of::<bool>().convert("yes"), None);
    }

    #[test]
    fn test_char_requires_single_character() {
        assert_eq!(ValueType::of::<char>().convert("é"), Some(Value::Str("é".into())));
        assert_eq!(ValueType::of::<char>().convert("ab"), None);
        assert_eq!(ValueType::of::<char>().convert(""), None);
    }

    #[test]
    fn test_string_type_detection() {
        assert!(ValueType::default().is_string());
        assert!(!ValueType::of::<PathBuf>().is_string());
        assert_eq!(format!("{:?}", ValueType::of::<i32>()), "ValueType(\"i32\")");
    }

    #[test]
    fn test_value_serializes_untagged() {
        let v = Value::List(vec![Value::Int(1), Value::Str("a".into()), Value::Bool(true)]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"[1,"a",true]"#);

        let back: Value = serde_json::from_str("[1, 2.5, \"x\"]").unwrap();
        assert_eq!(
            back,
            Value::List(vec![Value::Int(1), Value::Float(2.5), Value::Str("x".into())])
        );
    }

    #[test]
    fn test_float_accessor_widens_integers() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Str("3".into()).as_float(), None);
    }
}
