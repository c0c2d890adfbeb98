//! Declarative command-line option specs.
//!
//! A program describes its accepted arguments as a tree of nodes and this
//! crate resolves raw tokens against it:
//!
//! - [`ValueOption`], [`FlagOption`], [`CounterOption`]: named options.
//! - [`Positional`] and [`Remainder`]: values identified by position, and
//!   the catch-all after a separator.
//! - [`OptionGroup`] and [`MutexGroup`]: ordered alternatives and mutually
//!   exclusive alternatives.
//! - [`Spec`]: a validated tree; [`Spec::parse`] and [`Spec::parse_with`]
//!   run the dispatcher and produce [`ParsedArgs`].
//!
//! Tokens are first normalized ([`normalize`]): `-abc` becomes `-a -b -c`
//! and `--name=value` becomes `--name value`. Each value is converted to its
//! declared type ([`FromToken`]) and checked against an optional
//! [`Requirement`]. What happens on help and on errors is chosen per call
//! through [`ParseOptions`] ([`OnHelp`], [`OnError`]).
//!
//! Specs can also be loaded from YAML or JSON ([`SpecDocument`]) and checked
//! up front with [`validate_spec`].
//!
//! # Example
//!
//! ```
//! use argspec_core::*;
//!
//! let spec = Spec::new(
//!     OptionGroup::new()
//!         .with(
//!             FlagOption::new(["-i", "--ignore-case"])
//!                 .with_description("Match case-insensitively"),
//!         )
//!         .with(CounterOption::new(["-v"]).with_width::<i8>())
//!         .with(
//!             ValueOption::new(["-n", "--num-workers"])
//!                 .of::<u16>()
//!                 .with_default(1)
//!                 .with_requirement(Requirement::one_of([1, 2, 4, 8])),
//!         )
//!         .with(Positional::new("pattern"))
//!         .with(Positional::new("files").allow_multiple().optional()),
//! )
//! .unwrap();
//!
//! let args = spec.parse(["-iv", "--num-workers=4", "fo+", "a.txt", "b.txt"]).unwrap();
//! assert!(args.flag("ignore_case"));
//! assert_eq!(args.get_int("v"), Some(1));
//! assert_eq!(args.get_int("num_workers"), Some(4));
//! assert_eq!(args.get_str("pattern"), Some("fo+"));
//! assert_eq!(args.get_list("files").map(<[Value]>::len), Some(2));
//!
//! // Collect every problem instead of exiting on the first.
//! let args = spec
//!     .parse_with(["-q", "-n", "3"], ParseOptions::new().on_error(OnError::Record))
//!     .unwrap();
//! assert_eq!(
//!     args.error_messages(),
//!     [
//!         "unrecognized argument '-q'",
//!         "invalid value '3' for -n (u16): must be one of 1, 2, 4, 8",
//!     ]
//! );
//! // The rejected value fell through to the positional.
//! assert_eq!(args.get_str("pattern"), Some("3"));
//! ```

mod context;
mod dispatch;
mod document;
mod error;
mod group;
mod node;
mod normalize;
mod requirement;
mod result;
mod spec;
mod validate;
mod value;

pub use context::{NodeId, ParseContext};
pub use dispatch::{OnError, OnHelp, ParseOptions};
pub use document::{
    CounterDocument, CounterWidth, FlagDocument, GroupDocument, NodeDocument, PositionalDocument,
    RemainderDocument, SpecDocument, TypeName, ValueDocument,
};
pub use error::{DocumentError, DocumentResult, Halt, ParseError};
pub use group::{MutexGroup, OptionGroup};
pub use node::{CounterOption, Fallback, FlagOption, Node, Positional, Remainder, ValueOption};
pub use normalize::{SEPARATOR, normalize};
pub use requirement::{Requirement, Verdict, convert_token};
pub use result::{ParsedArgs, REMAINDER_KEY, canonical_key};
pub use spec::{DEFAULT_HELP_NAMES, Spec};
pub use validate::{SpecError, validate_spec};
pub use value::{CounterInt, FromToken, Value, ValueType};
