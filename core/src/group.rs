//! Group nodes.

use crate::context::{NodeId, ParseContext};
use crate::error::ParseError;
use crate::node::Node;
use crate::result::ParsedArgs;

/// Ordered alternatives.
///
/// Children are offered the cursor in declaration order and the first one
/// that consumes wins; declaration order is the tie-break between
/// overlapping children. After the scan every child is checked, so all
/// required children of a group must appear.
#[derive(Debug, Clone, Default)]
pub struct OptionGroup {
    id: NodeId,
    children: Vec<Node>,
    description: Option<String>,
}

impl OptionGroup {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a child.
    pub fn with(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// The group's identity inside its spec.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Children in declaration order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn assign_ids(&mut self, next: &mut usize) {
        self.id = NodeId(*next);
        *next += 1;
        for child in &mut self.children {
            child.assign_ids(next);
        }
    }

    pub(crate) fn install_defaults(&self, out: &mut ParsedArgs) {
        for child in &self.children {
            child.install_defaults(out);
        }
    }

    pub(crate) fn consume(
        &self,
        tokens: &[String],
        ctx: &mut ParseContext<'_>,
        out: &mut ParsedArgs,
    ) -> Result<usize, ParseError> {
        let taken = first_match(&self.children, tokens, ctx, out)?;
        if taken > 0 {
            ctx.record(self.id);
        }
        Ok(taken)
    }

    pub(crate) fn check_complete(&self, ctx: &ParseContext<'_>, errors: &mut Vec<ParseError>) {
        for child in &self.children {
            child.check_complete(ctx, errors);
        }
    }
}

/// Mutually exclusive alternatives.
///
/// Consumes like an [`OptionGroup`], but after the scan exactly one child
/// must be satisfied. A child is satisfied when it reports nothing missing,
/// so a flag (which is never missing) counts as satisfied whether or not it
/// appeared. Mutex groups are therefore normally built from required
/// children.
///
/// # Examples
///
/// ```
/// use argspec_core::{MutexGroup, OnError, OptionGroup, ParseOptions, Spec, ValueOption};
///
/// let spec = Spec::new(
///     OptionGroup::new().with(
///         MutexGroup::new()
///             .with(ValueOption::new(["--file"]))
///             .with(ValueOption::new(["--url"])),
///     ),
/// )
/// .unwrap();
///
/// assert!(spec.parse(["--url", "x"]).unwrap().is_clean());
///
/// let args = spec
///     .parse_with(["--file", "a", "--url", "b"], ParseOptions::new().on_error(OnError::Record))
///     .unwrap();
/// assert_eq!(
///     args.error_messages(),
///     ["exactly one of --file or --url must be specified"]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct MutexGroup {
    id: NodeId,
    children: Vec<Node>,
    description: Option<String>,
}

impl MutexGroup {
    /// Creates an empty mutex group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an alternative.
    pub fn with(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// The group's identity inside its spec.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Alternatives in declaration order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn assign_ids(&mut self, next: &mut usize) {
        self.id = NodeId(*next);
        *next += 1;
        for child in &mut self.children {
            child.assign_ids(next);
        }
    }

    pub(crate) fn install_defaults(&self, out: &mut ParsedArgs) {
        for child in &self.children {
            child.install_defaults(out);
        }
    }

    pub(crate) fn consume(
        &self,
        tokens: &[String],
        ctx: &mut ParseContext<'_>,
        out: &mut ParsedArgs,
    ) -> Result<usize, ParseError> {
        let taken = first_match(&self.children, tokens, ctx, out)?;
        if taken > 0 {
            ctx.record(self.id);
        }
        Ok(taken)
    }

    pub(crate) fn check_complete(&self, ctx: &ParseContext<'_>, errors: &mut Vec<ParseError>) {
        let mut satisfied = 0;
        for child in &self.children {
            let mut child_errors = Vec::new();
            child.check_complete(ctx, &mut child_errors);

            let mut missing = false;
            for error in child_errors {
                if error.is_missing_required() {
                    missing = true;
                } else {
                    errors.push(error);
                }
            }
            if !missing {
                satisfied += 1;
            }
        }

        if satisfied != 1 {
            let names: Vec<String> = self.children.iter().map(Node::display_name).collect();
            errors.push(ParseError::MutexViolation(names.join(" or ")));
        }
    }
}

/// Offers `tokens` to each child in order; the first non-zero answer wins.
fn first_match(
    children: &[Node],
    tokens: &[String],
    ctx: &mut ParseContext<'_>,
    out: &mut ParsedArgs,
) -> Result<usize, ParseError> {
    for child in children {
        let taken = child.consume(tokens, ctx, out)?;
        if taken > 0 {
            return Ok(taken);
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::node::{FlagOption, Positional, ValueOption};

    fn prepare(group: impl Into<Node>) -> (Node, HashSet<String>, usize) {
        let mut node = group.into();
        let mut next = 0;
        node.assign_ids(&mut next);
        let mut registry = HashSet::new();
        node.walk(&mut |n| registry.extend(n.names().iter().map(|s| s.to_string())));
        (node, registry, next)
    }

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        let (node, registry, count) = prepare(
            OptionGroup::new()
                .with(Positional::new("first"))
                .with(Positional::new("second")),
        );
        let mut ctx = ParseContext::new(count, &registry);
        let mut out = ParsedArgs::default();

        assert_eq!(node.consume(&tokens(&["a"]), &mut ctx, &mut out), Ok(1));
        assert_eq!(node.consume(&tokens(&["b"]), &mut ctx, &mut out), Ok(1));
        assert_eq!(out.get_str("first"), Some("a"));
        assert_eq!(out.get_str("second"), Some("b"));
        assert_eq!(ctx.count(node.id()), 2);
    }

    #[test]
    fn test_group_reports_every_missing_child() {
        let (node, registry, count) = prepare(
            OptionGroup::new()
                .with(ValueOption::new(["-a"]))
                .with(ValueOption::new(["-b"])),
        );
        let ctx = ParseContext::new(count, &registry);
        let mut errors = Vec::new();
        node.check_complete(&ctx, &mut errors);
        assert_eq!(
            errors,
            vec![
                ParseError::MissingRequired("-a".to_string()),
                ParseError::MissingRequired("-b".to_string()),
            ]
        );
    }

    #[test]
    fn test_mutex_with_none_satisfied() {
        let (node, registry, count) = prepare(
            MutexGroup::new()
                .with(ValueOption::new(["-a"]))
                .with(ValueOption::new(["-b"])),
        );
        let ctx = ParseContext::new(count, &registry);
        let mut errors = Vec::new();
        node.check_complete(&ctx, &mut errors);
        assert_eq!(errors, vec![ParseError::MutexViolation("-a or -b".to_string())]);
    }

    #[test]
    fn test_mutex_with_exactly_one_satisfied() {
        let (node, registry, count) = prepare(
            MutexGroup::new()
                .with(ValueOption::new(["-a"]))
                .with(ValueOption::new(["-b"])),
        );
        let mut ctx = ParseContext::new(count, &registry);
        let mut out = ParsedArgs::default();
        assert_eq!(node.consume(&tokens(&["-b", "1"]), &mut ctx, &mut out), Ok(2));

        let mut errors = Vec::new();
        node.check_complete(&ctx, &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_mutex_counts_flags_as_satisfied() {
        let (node, registry, count) = prepare(
            MutexGroup::new()
                .with(FlagOption::new(["-x"]))
                .with(ValueOption::new(["-y"])),
        );
        let mut ctx = ParseContext::new(count, &registry);
        let mut out = ParsedArgs::default();
        node.consume(&tokens(&["-y", "1"]), &mut ctx, &mut out).unwrap();

        let mut errors = Vec::new();
        node.check_complete(&ctx, &mut errors);
        assert_eq!(errors, vec![ParseError::MutexViolation("-x or -y".to_string())]);
    }

    #[test]
    fn test_nested_group_inside_mutex() {
        let (node, registry, count) = prepare(
            MutexGroup::new()
                .with(
                    OptionGroup::new()
                        .with(ValueOption::new(["--user"]))
                        .with(ValueOption::new(["--password"])),
                )
                .with(ValueOption::new(["--token"])),
        );
        let mut ctx = ParseContext::new(count, &registry);
        let mut out = ParsedArgs::default();
        node.consume(&tokens(&["--user", "u"]), &mut ctx, &mut out).unwrap();

        // One member of the nested group is still missing.
        let mut errors = Vec::new();
        node.check_complete(&ctx, &mut errors);
        assert_eq!(
            errors,
            vec![ParseError::MutexViolation(
                "(--user, --password) or --token".to_string()
            )]
        );
    }
}
