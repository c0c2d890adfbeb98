//! The parse driver and its policies.
//!
//! A parse runs in four steps: normalize the tokens, pre-scan for a help
//! name, install defaults, then walk a cursor over the tokens offering the
//! suffix at the cursor to the root group. After the scan every root child
//! is checked for completeness. Every error detected along the way goes
//! through the [`OnError`] policy, and help goes through [`OnHelp`].

use std::fmt;

use tracing::{debug, warn};

use crate::context::ParseContext;
use crate::error::{Halt, ParseError};
use crate::normalize::Normalizer;
use crate::result::ParsedArgs;
use crate::spec::Spec;

/// What to do when a help name appears before any remainder.
pub enum OnHelp<'a> {
    /// Call the exit hook with this code, then stop with [`Halt::Help`].
    Exit(i32),
    /// Skip help names as if they were absent.
    Ignore,
    /// Run the callback, then stop with [`Halt::Help`].
    Call(Box<dyn FnMut() + 'a>),
}

/// What to do with each error detected during a parse.
pub enum OnError<'a> {
    /// Call the exit hook with this code, then stop with [`Halt::Error`].
    Exit(i32),
    /// Append the error to [`ParsedArgs::errors`] and continue.
    Record,
    /// Hand the error to the callback and continue.
    Call(Box<dyn FnMut(&ParseError) + 'a>),
    /// Stop immediately with [`Halt::Error`], without calling the exit hook.
    Return,
}

impl fmt::Debug for OnHelp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exit(code) => f.debug_tuple("Exit").field(code).finish(),
            Self::Ignore => f.write_str("Ignore"),
            Self::Call(_) => f.write_str("Call(..)"),
        }
    }
}

impl fmt::Debug for OnError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exit(code) => f.debug_tuple("Exit").field(code).finish(),
            Self::Record => f.write_str("Record"),
            Self::Call(_) => f.write_str("Call(..)"),
            Self::Return => f.write_str("Return"),
        }
    }
}

/// Policies for one parse.
///
/// The default exits with 0 on help and 1 on the first error, through
/// [`std::process::exit`]. Tests and embedders replace the hook with
/// [`with_exit`](ParseOptions::with_exit).
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
///
/// use argspec_core::{Halt, OptionGroup, ParseOptions, Spec};
///
/// let spec = Spec::new(OptionGroup::new()).unwrap();
/// let exited = Cell::new(None);
///
/// let halt = spec
///     .parse_with(["--help"], ParseOptions::new().with_exit(|code| exited.set(Some(code))))
///     .unwrap_err();
///
/// assert_eq!(halt, Halt::Help { code: Some(0) });
/// assert_eq!(exited.get(), Some(0));
/// ```
pub struct ParseOptions<'a> {
    on_help: OnHelp<'a>,
    on_error: OnError<'a>,
    exit: Box<dyn FnMut(i32) + 'a>,
}

impl<'a> ParseOptions<'a> {
    /// Default policies.
    pub fn new() -> Self {
        Self {
            on_help: OnHelp::Exit(0),
            on_error: OnError::Exit(1),
            exit: Box::new(process_exit),
        }
    }

    /// Sets the help policy.
    pub fn on_help(mut self, policy: OnHelp<'a>) -> Self {
        self.on_help = policy;
        self
    }

    /// Sets the error policy.
    pub fn on_error(mut self, policy: OnError<'a>) -> Self {
        self.on_error = policy;
        self
    }

    /// Replaces the exit hook used by the `Exit` policies.
    pub fn with_exit(mut self, hook: impl FnMut(i32) + 'a) -> Self {
        self.exit = Box::new(hook);
        self
    }

    fn help(&mut self) -> Halt {
        match &mut self.on_help {
            OnHelp::Exit(code) => {
                let code = *code;
                debug!(code, "help requested, exiting");
                (self.exit)(code);
                Halt::Help { code: Some(code) }
            }
            OnHelp::Call(callback) => {
                debug!("help requested, running callback");
                callback();
                Halt::Help { code: None }
            }
            OnHelp::Ignore => Halt::Help { code: None },
        }
    }

    fn report(&mut self, error: ParseError, out: &mut ParsedArgs) -> Result<(), Halt> {
        match &mut self.on_error {
            OnError::Exit(code) => {
                let code = *code;
                warn!(%error, code, "parse failed, exiting");
                (self.exit)(code);
                Err(Halt::Error {
                    code: Some(code),
                    error,
                })
            }
            OnError::Record => {
                warn!(%error, "parse error recorded");
                out.push_error(error);
                Ok(())
            }
            OnError::Call(callback) => {
                debug!(%error, "parse error handed to callback");
                callback(&error);
                Ok(())
            }
            OnError::Return => Err(Halt::Error { code: None, error }),
        }
    }
}

impl Default for ParseOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParseOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("on_help", &self.on_help)
            .field("on_error", &self.on_error)
            .finish_non_exhaustive()
    }
}

fn process_exit(code: i32) {
    std::process::exit(code)
}

pub(crate) fn dispatch<I, S>(
    spec: &Spec,
    args: I,
    mut options: ParseOptions<'_>,
) -> Result<ParsedArgs, Halt>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = ParsedArgs::default();

    let mut normalizer = Normalizer::default();
    let mut tokens = Vec::new();
    for raw in args {
        match normalizer.push(raw.as_ref()) {
            Ok(parts) => tokens.extend(parts),
            Err(error) => options.report(error, &mut out)?,
        }
    }

    let ignore_help = matches!(options.on_help, OnHelp::Ignore);
    if !ignore_help
        && tokens
            .iter()
            .take_while(|t| !spec.is_remainder_name(t))
            .any(|t| spec.is_help_name(t))
    {
        return Err(options.help());
    }

    spec.root().install_defaults(&mut out);

    let mut ctx = ParseContext::new(spec.node_count(), spec.leaf_names());
    let mut cursor = 0;
    while cursor < tokens.len() {
        let rest = &tokens[cursor..];
        match spec.root().consume(rest, &mut ctx, &mut out) {
            Ok(0) => {
                let token = &rest[0];
                if ignore_help && spec.is_help_name(token) {
                    debug!(%token, "help name ignored");
                } else {
                    options.report(ParseError::Unrecognized(token.clone()), &mut out)?;
                }
                cursor += 1;
            }
            Ok(taken) => cursor += taken,
            Err(error) => {
                options.report(error, &mut out)?;
                cursor += 1;
            }
        }
    }

    let mut incomplete = Vec::new();
    for child in spec.root().children() {
        child.check_complete(&ctx, &mut incomplete);
    }
    for error in incomplete {
        options.report(error, &mut out)?;
    }

    debug!(values = out.values().len(), errors = out.errors().len(), "parse finished");
    Ok(out)
}
