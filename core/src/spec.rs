//! A validated spec, ready to parse.

use std::collections::HashSet;

use tracing::debug;

use crate::dispatch::{ParseOptions, dispatch};
use crate::error::Halt;
use crate::group::OptionGroup;
use crate::node::Node;
use crate::result::ParsedArgs;
use crate::validate::{SpecError, validate_spec};

/// Help names recognized unless a leaf declares them itself.
pub const DEFAULT_HELP_NAMES: [&str; 2] = ["-h", "--help"];

/// A validated spec tree plus the lookup tables built from it.
///
/// A `Spec` holds no parse state and can be shared between threads; every
/// call to [`parse`](Spec::parse) builds its own
/// [`ParseContext`](crate::ParseContext).
///
/// # Examples
///
/// ```
/// use argspec_core::*;
///
/// let spec = Spec::new(
///     OptionGroup::new()
///         .with(CounterOption::new(["-v", "--verbose"]))
///         .with(ValueOption::new(["-o", "--output"]).of::<std::path::PathBuf>().optional())
///         .with(Positional::new("input")),
/// )
/// .unwrap();
///
/// let args = spec.parse(["-vv", "--output=out.txt", "in.txt"]).unwrap();
/// assert_eq!(args.get_int("verbose"), Some(2));
/// assert_eq!(args.get_str("output"), Some("out.txt"));
/// assert_eq!(args.get_str("input"), Some("in.txt"));
/// ```
#[derive(Debug, Clone)]
pub struct Spec {
    root: OptionGroup,
    node_count: usize,
    leaf_names: HashSet<String>,
    remainder_names: HashSet<String>,
    help_names: Vec<String>,
}

impl Spec {
    /// Validates `root`, assigns node ids and builds the name registry.
    ///
    /// # Errors
    ///
    /// Returns the first [`SpecError`] reported by
    /// [`validate_spec`](crate::validate_spec).
    pub fn new(mut root: OptionGroup) -> Result<Self, SpecError> {
        if let Some(err) = validate_spec(&root).into_iter().next() {
            return Err(err);
        }

        let mut node_count = 0;
        root.assign_ids(&mut node_count);

        let mut leaf_names = HashSet::new();
        let mut remainder_names = HashSet::new();
        for child in root.children() {
            child.walk(&mut |node| {
                let names = node.names().into_iter().map(str::to_string);
                if matches!(node, Node::Remainder(_)) {
                    remainder_names.extend(names.clone());
                }
                leaf_names.extend(names);
            });
        }

        debug!(nodes = node_count, names = leaf_names.len(), "spec built");
        Ok(Self {
            root,
            node_count,
            leaf_names,
            remainder_names,
            help_names: DEFAULT_HELP_NAMES.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Replaces the help names (default `-h`, `--help`).
    ///
    /// Names that a leaf declares stay with that leaf.
    pub fn with_help_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.help_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Parses `args` with the default policies: exit 0 on help, exit 1 on
    /// the first error.
    ///
    /// # Errors
    ///
    /// See [`parse_with`](Spec::parse_with).
    pub fn parse<I, S>(&self, args: I) -> Result<ParsedArgs, Halt>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.parse_with(args, ParseOptions::default())
    }

    /// Parses `args` under the given policies.
    ///
    /// # Errors
    ///
    /// Returns [`Halt`] when the help policy or the error policy stops the
    /// parse. Under [`OnError::Record`](crate::OnError::Record) and
    /// [`OnError::Call`](crate::OnError::Call) errors never stop the parse.
    pub fn parse_with<I, S>(&self, args: I, options: ParseOptions<'_>) -> Result<ParsedArgs, Halt>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        dispatch(self, args, options)
    }

    /// The root group.
    pub fn root(&self) -> &OptionGroup {
        &self.root
    }

    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Every name declared by a leaf.
    pub fn leaf_names(&self) -> &HashSet<String> {
        &self.leaf_names
    }

    /// Help names in effect: the configured ones minus those a leaf declares.
    pub fn help_names(&self) -> impl Iterator<Item = &str> {
        self.help_names
            .iter()
            .map(String::as_str)
            .filter(|name| !self.leaf_names.contains(*name))
    }

    /// Whether `token` requests help.
    pub fn is_help_name(&self, token: &str) -> bool {
        self.help_names().any(|name| name == token)
    }

    /// Whether `token` starts a remainder.
    pub fn is_remainder_name(&self, token: &str) -> bool {
        self.remainder_names.contains(token)
    }
}
