//! Spec validation.
//!
//! Checks the structural invariants a spec tree must hold before it can
//! parse anything: every leaf is named, option names carry their `-` marker
//! and survive normalization, names are unique and do not collide on their
//! result keys, counter defaults fit their width, and mutex groups are not
//! empty.
//!
//! # Examples
//!
//! ```
//! use argspec_core::*;
//!
//! let root = OptionGroup::new().with(FlagOption::new(["-v", "--verbose"]));
//! assert!(validate_spec(&root).is_empty());
//!
//! // Invalid: option name missing its leading dash
//! let bad = OptionGroup::new().with(FlagOption::new(["v"]));
//! assert!(!validate_spec(&bad).is_empty());
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::group::OptionGroup;
use crate::node::Node;
use crate::normalize::SEPARATOR;
use crate::result::canonical_key;

/// Spec validation errors.
///
/// Each variant describes a specific structural problem found during
/// validation. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// A leaf declares no names at all.
    #[error("node must declare at least one name")]
    MissingName,
    /// A declared name is empty or whitespace-only.
    #[error("names cannot be empty")]
    EmptyName,
    /// An option name lacks its `-` marker or would be split by
    /// normalization (e.g. `"v"`, `"-ab"`, `"--out=x"`).
    #[error("invalid option name: {0}")]
    InvalidOptionName(String),
    /// A positional name starts with `-`.
    #[error("invalid positional name: {0}")]
    InvalidPositionalName(String),
    /// A remainder name is neither `--`, a valid option name, nor a plain word.
    #[error("invalid remainder name: {0}")]
    InvalidRemainderName(String),
    /// Two leaves declare the same name.
    #[error("duplicate name in spec: {0}")]
    DuplicateName(String),
    /// Names of two different leaves map to the same result key.
    #[error("names {first} and {second} share the result key '{key}'")]
    KeyCollision {
        /// The shared canonical key.
        key: String,
        /// Name declared first.
        first: String,
        /// Name declared later.
        second: String,
    },
    /// A counter default lies outside the counter's width.
    #[error("default {default} of counter {option} does not fit {type_name}")]
    CounterDefaultOutOfRange {
        /// The counter's primary name.
        option: String,
        /// The offending default.
        default: i64,
        /// Name of the counter width.
        type_name: &'static str,
    },
    /// A mutex group has no alternatives.
    #[error("mutex group must have at least one alternative")]
    EmptyMutex,
}

/// Validates a spec tree.
///
/// Returns every problem found, in tree order. An empty list means the tree
/// is usable by [`Spec::new`](crate::Spec::new).
///
/// # Examples
///
/// ```
/// use argspec_core::*;
///
/// let root = OptionGroup::new()
///     .with(ValueOption::new(["--dry-run"]))
///     .with(FlagOption::new(["--dry_run"]));
/// let errors = validate_spec(&root);
/// assert!(errors.iter().any(|e| matches!(e, SpecError::KeyCollision { .. })));
/// ```
pub fn validate_spec(root: &OptionGroup) -> Vec<SpecError> {
    let mut errors = Vec::new();
    let mut seen_names: HashSet<&str> = HashSet::new();
    // Keys map to (node position in walk order, first name).
    let mut seen_keys: HashMap<String, (usize, &str)> = HashMap::new();
    let mut position = 0usize;

    for child in root.children() {
        child.walk(&mut |node| {
            position += 1;
            errors.extend(validate_node(node));

            for name in node.names() {
                if !seen_names.insert(name) {
                    errors.push(SpecError::DuplicateName(name.to_string()));
                    continue;
                }
                let key = canonical_key(name);
                match seen_keys.get(&key) {
                    Some((owner, first)) if *owner != position => {
                        errors.push(SpecError::KeyCollision {
                            key,
                            first: first.to_string(),
                            second: name.to_string(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        seen_keys.insert(key, (position, name));
                    }
                }
            }
        });
    }

    errors
}

fn validate_node(node: &Node) -> Vec<SpecError> {
    let mut errors = Vec::new();

    match node {
        Node::Mutex(mutex) if mutex.children().is_empty() => {
            errors.push(SpecError::EmptyMutex);
        }
        Node::Group(_) | Node::Mutex(_) => {}
        Node::Value(_) | Node::Flag(_) | Node::Counter(_) => {
            check_names(node, &mut errors, is_option_name, SpecError::InvalidOptionName);
        }
        Node::Positional(_) => {
            check_names(
                node,
                &mut errors,
                |name| !name.starts_with('-'),
                SpecError::InvalidPositionalName,
            );
        }
        Node::Remainder(_) => {
            check_names(
                node,
                &mut errors,
                |name| name == SEPARATOR || is_option_name(name) || !name.starts_with('-'),
                SpecError::InvalidRemainderName,
            );
        }
    }

    if let Node::Counter(counter) = node {
        let (min, max) = counter.bounds();
        let default = counter.default_count();
        if !(min..=max).contains(&default) {
            errors.push(SpecError::CounterDefaultOutOfRange {
                option: node.display_name(),
                default,
                type_name: counter.type_name(),
            });
        }
    }

    errors
}

fn check_names(
    node: &Node,
    errors: &mut Vec<SpecError>,
    valid: impl Fn(&str) -> bool,
    invalid: fn(String) -> SpecError,
) {
    let names = node.names();
    if names.is_empty() {
        errors.push(SpecError::MissingName);
        return;
    }
    for name in names {
        if name.trim().is_empty() {
            errors.push(SpecError::EmptyName);
        } else if !valid(name) {
            errors.push(invalid(name.to_string()));
        }
    }
}

/// `-x` (exactly one character) or `--name` without `=` or whitespace.
fn is_option_name(name: &str) -> bool {
    if name.contains('=') || name.chars().any(char::is_whitespace) {
        return false;
    }
    if let Some(long) = name.strip_prefix(SEPARATOR) {
        return !long.is_empty() && !long.starts_with('-');
    }
    match name.strip_prefix('-') {
        Some(short) => short.chars().count() == 1,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CounterOption, FlagOption, MutexGroup, Positional, Remainder, ValueOption};

    #[test]
    fn test_validate_spec_rejects_bad_option_names() {
        for bad in ["v", "-ab", "--out=x", "---x", "--", "-"] {
            let root = OptionGroup::new().with(FlagOption::new([bad]));
            assert_eq!(
                validate_spec(&root),
                vec![SpecError::InvalidOptionName(bad.to_string())],
                "{bad}"
            );
        }
    }

    #[test]
    fn test_validate_spec_rejects_dashed_positional() {
        let root = OptionGroup::new().with(Positional::new("-file"));
        assert_eq!(
            validate_spec(&root),
            vec![SpecError::InvalidPositionalName("-file".to_string())]
        );
    }

    #[test]
    fn test_validate_spec_accepts_remainder_forms() {
        let root = OptionGroup::new()
            .with(Remainder::new())
            .with(Remainder::named(["exec"]))
            .with(Remainder::named(["--then"]));
        assert!(validate_spec(&root).is_empty());
    }

    #[test]
    fn test_validate_spec_rejects_duplicate_names_across_groups() {
        let root = OptionGroup::new()
            .with(FlagOption::new(["-v"]))
            .with(MutexGroup::new().with(CounterOption::new(["-v"])));
        assert_eq!(
            validate_spec(&root),
            vec![SpecError::DuplicateName("-v".to_string())]
        );
    }

    #[test]
    fn test_validate_spec_rejects_negator_clash() {
        let root = OptionGroup::new()
            .with(FlagOption::new(["--color"]).with_negators(["--plain"]))
            .with(FlagOption::new(["--plain"]));
        assert_eq!(
            validate_spec(&root),
            vec![SpecError::DuplicateName("--plain".to_string())]
        );
    }

    #[test]
    fn test_synonyms_may_share_a_key() {
        let root = OptionGroup::new().with(ValueOption::new(["-v", "--v"]));
        assert!(validate_spec(&root).is_empty());
    }

    #[test]
    fn test_validate_spec_rejects_counter_default_out_of_range() {
        let root = OptionGroup::new().with(
            CounterOption::new(["-v"])
                .with_width::<i8>()
                .with_default(200),
        );
        assert_eq!(
            validate_spec(&root),
            vec![SpecError::CounterDefaultOutOfRange {
                option: "-v".to_string(),
                default: 200,
                type_name: "i8",
            }]
        );
    }

    #[test]
    fn test_validate_spec_rejects_empty_mutex_and_names() {
        let root = OptionGroup::new()
            .with(MutexGroup::new())
            .with(FlagOption::new(Vec::<String>::new()))
            .with(Positional::new("  "));
        assert_eq!(
            validate_spec(&root),
            vec![SpecError::EmptyMutex, SpecError::MissingName, SpecError::EmptyName]
        );
    }
}
