//! Error types for parsing tokens and for loading spec documents.
//!
//! Every failure is raised at the point of detection as a [`ParseError`].
//! Only the dispatcher decides what happens next (see
//! [`OnError`](crate::OnError)), so node code simply returns `Err`.

use thiserror::Error;

use crate::validate::SpecError;

/// Errors detected while normalizing or consuming tokens.
///
/// The `Display` impl is the human-readable message recorded by
/// [`OnError::Record`](crate::OnError::Record) and handed to
/// [`OnError::Call`](crate::OnError::Call) callbacks.
///
/// # Examples
///
/// ```
/// use argspec_core::ParseError;
///
/// let err = ParseError::MissingValue("--output".into());
/// assert_eq!(err.to_string(), "option --output needs a value");
/// assert!(!err.is_missing_required());
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A long-form token carried more than one `=` (e.g. `--foo=a=b`).
    #[error("malformed option token: {0}")]
    MalformedToken(String),

    /// A value option matched but no token followed it.
    #[error("option {0} needs a value")]
    MissingValue(String),

    /// An `until` collection never found one of its terminators.
    #[error("option {option} needs an end-mark ({terminators})")]
    Unterminated {
        /// The option token that started the collection.
        option: String,
        /// The accepted terminators, comma separated.
        terminators: String,
    },

    /// A token could not be converted to the declared type.
    #[error("cannot parse '{token}' as {type_name} for {option}")]
    Conversion {
        /// The offending raw token.
        token: String,
        /// The option or positional the token was meant for.
        option: String,
        /// Name of the declared type.
        type_name: &'static str,
    },

    /// A converted value (or its raw text) failed the node's requirement.
    #[error("invalid value '{token}' for {option}{}: {reason}", type_note(.type_name))]
    Validation {
        /// The offending raw token.
        token: String,
        /// The option or positional the token was meant for.
        option: String,
        /// Name of the declared type, `None` for strings.
        type_name: Option<&'static str>,
        /// Requirement description or rejection reason.
        reason: String,
    },

    /// A counter went past the range of its integer width.
    #[error("option {option} used too many times ({token})")]
    CounterOverflow {
        /// The counter's primary name.
        option: String,
        /// The token that would have overflowed the counter.
        token: String,
    },

    /// No node accepted the token at the cursor.
    #[error("unrecognized argument '{0}'")]
    Unrecognized(String),

    /// A required value option or positional never fired.
    #[error("{0} must be specified")]
    MissingRequired(String),

    /// A mutex group did not see exactly one of its children.
    #[error("exactly one of {0} must be specified")]
    MutexViolation(String),
}

impl ParseError {
    /// Returns `true` for [`ParseError::MissingRequired`].
    ///
    /// Mutex groups absorb exactly these failures from their children.
    pub fn is_missing_required(&self) -> bool {
        matches!(self, Self::MissingRequired(_))
    }
}

fn type_note(type_name: &Option<&'static str>) -> String {
    type_name.map(|t| format!(" ({t})")).unwrap_or_default()
}

/// Why a parse stopped before returning a result.
///
/// Returned by [`Spec::parse_with`](crate::Spec::parse_with) when the help
/// policy or the error policy ends the parse. When the policy was an exit
/// code, the exit hook has already been invoked with `code`; `Halt` is what
/// the caller observes if that hook returns (as test hooks do).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Halt {
    /// A help name was present in the token list.
    #[error("help requested")]
    Help {
        /// Exit code handed to the exit hook, if any.
        code: Option<i32>,
    },

    /// An error stopped the parse.
    #[error("{error}")]
    Error {
        /// Exit code handed to the exit hook, if any.
        code: Option<i32>,
        /// The error that stopped the parse.
        #[source]
        error: ParseError,
    },
}

impl Halt {
    /// Exit code handed to the exit hook, if the policy carried one.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Help { code } | Self::Error { code, .. } => *code,
        }
    }

    /// The stopping error, if the parse did not stop for help.
    pub fn error(&self) -> Option<&ParseError> {
        match self {
            Self::Help { .. } => None,
            Self::Error { error, .. } => Some(error),
        }
    }
}

/// Errors raised while loading or building a spec document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A `pattern` requirement did not compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A default or `one_of` entry does not fit the declared type.
    #[error("value '{value}' for {node} is not a valid {type_name}")]
    InvalidValue {
        /// First name of the node.
        node: String,
        /// The offending value.
        value: String,
        /// Name of the declared type.
        type_name: &'static str,
    },

    /// A node declares both `one_of` and `pattern`.
    #[error("{0} declares more than one requirement")]
    ConflictingRequirements(String),

    /// The document describes a tree that fails validation.
    #[error("invalid spec: {0}")]
    InvalidSpec(#[from] SpecError),
}

/// Convenience alias for results with [`DocumentError`].
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;
