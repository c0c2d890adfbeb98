//! Spec node definitions.
//!
//! A spec is a tree of [`Node`]s. Leaves are options and positionals; the
//! inner nodes are [`OptionGroup`]s and [`MutexGroup`]s. Every node takes part
//! in the same three-step protocol:
//!
//! 1. `install_defaults` writes default values before the scan starts.
//! 2. `consume` is offered the token suffix at the cursor and answers with the
//!    number of tokens it took (zero to decline).
//! 3. `check_complete` runs after the scan and reports required nodes that
//!    never fired.

use tracing::debug;

use crate::context::{NodeId, ParseContext};
use crate::error::ParseError;
use crate::group::{MutexGroup, OptionGroup};
use crate::normalize::SEPARATOR;
use crate::requirement::{Requirement, convert_token};
use crate::result::ParsedArgs;
use crate::value::{CounterInt, FromToken, Value, ValueType};

/// What a value-bearing node holds when it never fires.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Fallback {
    /// The node must fire; otherwise the parse reports it as missing.
    #[default]
    Required,
    /// Optional with no default. Collection nodes start as an empty list,
    /// scalar nodes leave their keys absent.
    Unset,
    /// Optional, with this default installed before the scan.
    Value(Value),
}

/// One node of a spec tree.
///
/// `Node` is a closed set of variants; build leaves with their own builders
/// and convert with `.into()` (or pass them straight to
/// [`OptionGroup::with`]).
#[derive(Debug, Clone)]
pub enum Node {
    /// Option followed by a value (`-n 3`) or a terminated run of values.
    Value(ValueOption),
    /// Boolean switch with optional negators.
    Flag(FlagOption),
    /// Occurrence counter (`-vvv`).
    Counter(CounterOption),
    /// Value identified by position.
    Positional(Positional),
    /// Catch-all that takes every token after its name.
    Remainder(Remainder),
    /// Ordered alternatives; the first child that consumes wins.
    Group(OptionGroup),
    /// Like a group, but exactly one child must end up satisfied.
    Mutex(MutexGroup),
}

impl Node {
    /// The node's identity inside its spec.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Value(n) => n.id,
            Self::Flag(n) => n.id,
            Self::Counter(n) => n.id,
            Self::Positional(n) => n.id,
            Self::Remainder(n) => n.id,
            Self::Group(n) => n.id(),
            Self::Mutex(n) => n.id(),
        }
    }

    /// Every name the node matches or stores under. Empty for groups.
    pub fn names(&self) -> Vec<&str> {
        const NONE: &[String] = &[];
        let (primary, secondary) = match self {
            Self::Value(n) => (n.names.as_slice(), NONE),
            Self::Flag(n) => (n.names.as_slice(), n.negators.as_slice()),
            Self::Counter(n) => (n.names.as_slice(), n.decrementers.as_slice()),
            Self::Positional(n) => (n.names.as_slice(), NONE),
            Self::Remainder(n) => (n.names.as_slice(), NONE),
            Self::Group(_) | Self::Mutex(_) => (NONE, NONE),
        };
        primary.iter().chain(secondary).map(String::as_str).collect()
    }

    /// Name used in diagnostics.
    ///
    /// Leaves use their first name; groups list their children.
    pub fn display_name(&self) -> String {
        match self {
            Self::Group(g) => format!("({})", join_display(g.children(), ", ")),
            Self::Mutex(m) => format!("({})", join_display(m.children(), " or ")),
            other => other.names().first().copied().unwrap_or_default().to_string(),
        }
    }

    /// Child nodes of a group; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Group(g) => g.children(),
            Self::Mutex(m) => m.children(),
            _ => &[],
        }
    }

    /// Whether this node matches tokens by an option-style (`-`) name.
    pub fn is_option(&self) -> bool {
        matches!(self, Self::Value(_) | Self::Flag(_) | Self::Counter(_))
    }

    /// Visits this node and all its descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    pub(crate) fn assign_ids(&mut self, next: &mut usize) {
        match self {
            Self::Value(n) => n.id = take_id(next),
            Self::Flag(n) => n.id = take_id(next),
            Self::Counter(n) => n.id = take_id(next),
            Self::Positional(n) => n.id = take_id(next),
            Self::Remainder(n) => n.id = take_id(next),
            Self::Group(g) => g.assign_ids(next),
            Self::Mutex(m) => m.assign_ids(next),
        }
    }

    pub(crate) fn install_defaults(&self, out: &mut ParsedArgs) {
        match self {
            Self::Value(n) => n.install_defaults(out),
            Self::Flag(n) => n.install_defaults(out),
            Self::Counter(n) => n.install_defaults(out),
            Self::Positional(n) => n.install_defaults(out),
            Self::Remainder(n) => n.install_defaults(out),
            Self::Group(g) => g.install_defaults(out),
            Self::Mutex(m) => m.install_defaults(out),
        }
    }

    pub(crate) fn consume(
        &self,
        tokens: &[String],
        ctx: &mut ParseContext<'_>,
        out: &mut ParsedArgs,
    ) -> Result<usize, ParseError> {
        match self {
            Self::Value(n) => n.consume(tokens, ctx, out),
            Self::Flag(n) => Ok(n.consume(tokens, ctx, out)),
            Self::Counter(n) => n.consume(tokens, ctx, out),
            Self::Positional(n) => n.consume(tokens, ctx, out),
            Self::Remainder(n) => Ok(n.consume(tokens, ctx, out)),
            Self::Group(g) => g.consume(tokens, ctx, out),
            Self::Mutex(m) => m.consume(tokens, ctx, out),
        }
    }

    pub(crate) fn check_complete(&self, ctx: &ParseContext<'_>, errors: &mut Vec<ParseError>) {
        match self {
            Self::Value(n) => {
                if n.fallback == Fallback::Required && !ctx.fired(n.id) {
                    errors.push(ParseError::MissingRequired(n.primary_name().to_string()));
                }
            }
            Self::Positional(n) => {
                if n.fallback == Fallback::Required && !ctx.fired(n.id) {
                    errors.push(ParseError::MissingRequired(n.primary_name().to_string()));
                }
            }
            Self::Flag(_) | Self::Counter(_) | Self::Remainder(_) => {}
            Self::Group(g) => g.check_complete(ctx, errors),
            Self::Mutex(m) => m.check_complete(ctx, errors),
        }
    }
}

fn take_id(next: &mut usize) -> NodeId {
    let id = NodeId(*next);
    *next += 1;
    id
}

fn join_display(children: &[Node], sep: &str) -> String {
    children
        .iter()
        .map(Node::display_name)
        .collect::<Vec<_>>()
        .join(sep)
}

fn collect_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

fn first_name(names: &[String]) -> &str {
    names.first().map(String::as_str).unwrap_or_default()
}

/// An option that takes a value: `-n 3`, `--output out.txt`.
///
/// With [`until`](ValueOption::until) the option instead collects every
/// token up to (not including) a terminator.
///
/// # Examples
///
/// ```
/// use argspec_core::{OptionGroup, Requirement, Spec, Value, ValueOption};
///
/// let spec = Spec::new(
///     OptionGroup::new()
///         .with(
///             ValueOption::new(["-j", "--jobs"])
///                 .of::<u8>()
///                 .with_default(4)
///                 .with_requirement(Requirement::predicate(|v: &Value| {
///                     v.as_int().is_some_and(|n| n > 0)
///                 })),
///         )
///         .with(ValueOption::new(["--exec"]).until([";"]).optional()),
/// )
/// .unwrap();
///
/// let args = spec.parse(["-j", "8"]).unwrap();
/// assert_eq!(args.get_int("jobs"), Some(8));
/// assert_eq!(args.get_list("exec"), Some(&[][..]));
/// ```
#[derive(Debug, Clone)]
pub struct ValueOption {
    id: NodeId,
    names: Vec<String>,
    value_type: ValueType,
    fallback: Fallback,
    until: Vec<String>,
    requirement: Option<Requirement>,
    description: Option<String>,
}

impl ValueOption {
    /// Creates a required string option with the given names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: NodeId::default(),
            names: collect_names(names),
            value_type: ValueType::string(),
            fallback: Fallback::Required,
            until: Vec::new(),
            requirement: None,
            description: None,
        }
    }

    /// Declares the value type.
    pub fn of<T: FromToken>(self) -> Self {
        self.with_type(ValueType::of::<T>())
    }

    /// Declares the value type from an existing [`ValueType`].
    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Makes the option optional with a default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.fallback = Fallback::Value(value.into());
        self
    }

    /// Makes the option optional without a default.
    pub fn optional(mut self) -> Self {
        self.fallback = Fallback::Unset;
        self
    }

    /// Collects values up to the first of these terminators.
    ///
    /// The terminator itself is left in place for the next node. A spec
    /// that accepts `--exec rm ;` therefore needs a sibling that consumes
    /// `;`, or the parse reports it as unrecognized.
    pub fn until<I, S>(mut self, terminators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.until = collect_names(terminators);
        self
    }

    /// Attaches a requirement checked against every value.
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = Some(requirement);
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Declared names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// First declared name, used in "missing" diagnostics.
    pub fn primary_name(&self) -> &str {
        first_name(&self.names)
    }

    /// Declared value type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// What the option holds when it never fires.
    pub fn fallback(&self) -> &Fallback {
        &self.fallback
    }

    /// Terminators of an `until` collection; empty for plain options.
    pub fn terminators(&self) -> &[String] {
        &self.until
    }

    /// Description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn install_defaults(&self, out: &mut ParsedArgs) {
        match &self.fallback {
            Fallback::Value(v) => out.store(&self.names, v),
            Fallback::Unset if !self.until.is_empty() => {
                out.store(&self.names, &Value::List(Vec::new()));
            }
            Fallback::Unset | Fallback::Required => {}
        }
    }

    fn consume(
        &self,
        tokens: &[String],
        ctx: &mut ParseContext<'_>,
        out: &mut ParsedArgs,
    ) -> Result<usize, ParseError> {
        let Some(option) = tokens.first() else {
            return Ok(0);
        };
        if !self.names.contains(option) {
            return Ok(0);
        }

        let rest = &tokens[1..];
        if self.until.is_empty() {
            let Some(raw) = rest.first() else {
                return Err(ParseError::MissingValue(option.clone()));
            };
            let value = convert_token(&self.value_type, raw, self.requirement.as_ref(), option)?;
            debug!(option = %option, value = %value, "value option matched");
            out.store(&self.names, &value);
            ctx.record(self.id);
            return Ok(2);
        }

        let Some(end) = rest.iter().position(|t| self.until.contains(t)) else {
            return Err(ParseError::Unterminated {
                option: option.clone(),
                terminators: self.until.join(", "),
            });
        };
        let values = rest[..end]
            .iter()
            .map(|raw| convert_token(&self.value_type, raw, self.requirement.as_ref(), option))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(option = %option, count = values.len(), "value option collected run");
        out.store(&self.names, &Value::List(values));
        ctx.record(self.id);
        Ok(1 + end)
    }
}

/// A boolean switch.
///
/// Primary names set `true`, negator names set `false`; every primary key
/// always holds the complement of every negator key.
///
/// # Examples
///
/// ```
/// use argspec_core::{FlagOption, OptionGroup, Spec};
///
/// let spec = Spec::new(
///     OptionGroup::new().with(FlagOption::new(["--color"]).with_negators(["--no-color"])),
/// )
/// .unwrap();
///
/// let args = spec.parse(["--no-color"]).unwrap();
/// assert!(!args.flag("color"));
/// assert!(args.flag("no_color"));
/// ```
#[derive(Debug, Clone)]
pub struct FlagOption {
    id: NodeId,
    names: Vec<String>,
    negators: Vec<String>,
    description: Option<String>,
}

impl FlagOption {
    /// Creates a flag with the given names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: NodeId::default(),
            names: collect_names(names),
            negators: Vec::new(),
            description: None,
        }
    }

    /// Adds names that set the flag to `false`.
    pub fn with_negators<I, S>(mut self, negators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.negators = collect_names(negators);
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Primary names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Negator names.
    pub fn negators(&self) -> &[String] {
        &self.negators
    }

    /// Description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn set(&self, out: &mut ParsedArgs, on: bool) {
        out.store(&self.names, &Value::Bool(on));
        out.store(&self.negators, &Value::Bool(!on));
    }

    fn install_defaults(&self, out: &mut ParsedArgs) {
        self.set(out, false);
    }

    fn consume(
        &self,
        tokens: &[String],
        ctx: &mut ParseContext<'_>,
        out: &mut ParsedArgs,
    ) -> usize {
        let Some(token) = tokens.first() else {
            return 0;
        };
        let on = if self.names.contains(token) {
            true
        } else if self.negators.contains(token) {
            false
        } else {
            return 0;
        };
        debug!(flag = %token, on, "flag matched");
        self.set(out, on);
        ctx.record(self.id);
        1
    }
}

/// Counts occurrences of its names, within a signed integer width.
///
/// Decrementer names count down. The count is stored under every primary and
/// decrementer name.
///
/// # Examples
///
/// ```
/// use argspec_core::{CounterOption, OptionGroup, Spec};
///
/// let spec = Spec::new(
///     OptionGroup::new().with(
///         CounterOption::new(["-v"])
///             .with_width::<i8>()
///             .with_decrementers(["-q"]),
///     ),
/// )
/// .unwrap();
///
/// let args = spec.parse(["-vvv", "-q"]).unwrap();
/// assert_eq!(args.get_int("v"), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct CounterOption {
    id: NodeId,
    names: Vec<String>,
    decrementers: Vec<String>,
    type_name: &'static str,
    min: i64,
    max: i64,
    default: i64,
    description: Option<String>,
}

impl CounterOption {
    /// Creates an `i64` counter starting at zero.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: NodeId::default(),
            names: collect_names(names),
            decrementers: Vec::new(),
            type_name: i64::TYPE_NAME,
            min: <i64 as CounterInt>::MIN,
            max: <i64 as CounterInt>::MAX,
            default: 0,
            description: None,
        }
    }

    /// Bounds the counter to the range of `T`.
    pub fn with_width<T: CounterInt>(mut self) -> Self {
        self.type_name = T::TYPE_NAME;
        self.min = T::MIN;
        self.max = T::MAX;
        self
    }

    /// Adds names that decrement the counter.
    pub fn with_decrementers<I, S>(mut self, decrementers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.decrementers = collect_names(decrementers);
        self
    }

    /// Sets the starting count.
    ///
    /// Must lie inside the declared width; [`Spec::new`](crate::Spec::new)
    /// rejects it otherwise.
    pub fn with_default(mut self, default: i64) -> Self {
        self.default = default;
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Primary (incrementing) names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Decrementing names.
    pub fn decrementers(&self) -> &[String] {
        &self.decrementers
    }

    /// Starting count.
    pub fn default_count(&self) -> i64 {
        self.default
    }

    /// Inclusive range of the declared width.
    pub fn bounds(&self) -> (i64, i64) {
        (self.min, self.max)
    }

    /// Name of the declared width.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn store(&self, out: &mut ParsedArgs, count: i64) {
        let value = Value::Int(count);
        out.store(&self.names, &value);
        out.store(&self.decrementers, &value);
    }

    fn install_defaults(&self, out: &mut ParsedArgs) {
        self.store(out, self.default);
    }

    fn consume(
        &self,
        tokens: &[String],
        ctx: &mut ParseContext<'_>,
        out: &mut ParsedArgs,
    ) -> Result<usize, ParseError> {
        let Some(token) = tokens.first() else {
            return Ok(0);
        };
        let delta = if self.names.contains(token) {
            1
        } else if self.decrementers.contains(token) {
            -1
        } else {
            return Ok(0);
        };

        let prior = out
            .stored(first_name(&self.names))
            .and_then(Value::as_int)
            .unwrap_or(self.default);
        let count = prior
            .checked_add(delta)
            .filter(|n| (self.min..=self.max).contains(n))
            .ok_or_else(|| ParseError::CounterOverflow {
                option: first_name(&self.names).to_string(),
                token: token.clone(),
            })?;

        debug!(counter = %token, count, "counter matched");
        self.store(out, count);
        ctx.record(self.id);
        Ok(1)
    }
}

/// A value identified by position rather than by name.
///
/// A single positional takes one token and is then done; a multiple
/// positional takes every following token up to the next option-looking
/// token, and appends when it fires again later.
///
/// # Examples
///
/// ```
/// use argspec_core::{FlagOption, OptionGroup, Positional, Spec, Value};
///
/// let spec = Spec::new(
///     OptionGroup::new()
///         .with(FlagOption::new(["-v"]))
///         .with(Positional::new("files").allow_multiple()),
/// )
/// .unwrap();
///
/// let args = spec.parse(["a.txt", "-3", "-v", "b.txt"]).unwrap();
/// assert!(args.flag("v"));
/// assert_eq!(
///     args.get_list("files"),
///     Some(&[Value::from("a.txt"), Value::from("-3"), Value::from("b.txt")][..])
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Positional {
    id: NodeId,
    names: Vec<String>,
    value_type: ValueType,
    multiple: bool,
    fallback: Fallback,
    requirement: Option<Requirement>,
    description: Option<String>,
}

impl Positional {
    /// Creates a required single string positional.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::default(),
            names: vec![name.into()],
            value_type: ValueType::string(),
            multiple: false,
            fallback: Fallback::Required,
            requirement: None,
            description: None,
        }
    }

    /// Adds another name the value is stored under.
    pub fn with_alias(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Declares the value type.
    pub fn of<T: FromToken>(self) -> Self {
        self.with_type(ValueType::of::<T>())
    }

    /// Declares the value type from an existing [`ValueType`].
    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Marks as accepting multiple values.
    pub fn allow_multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Makes the positional optional with a default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.fallback = Fallback::Value(value.into());
        self
    }

    /// Makes the positional optional without a default.
    pub fn optional(mut self) -> Self {
        self.fallback = Fallback::Unset;
        self
    }

    /// Attaches a requirement checked against every value.
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = Some(requirement);
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Declared names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// First declared name, used in diagnostics.
    pub fn primary_name(&self) -> &str {
        first_name(&self.names)
    }

    /// Whether the positional accepts multiple values.
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// What the positional holds when it never fires.
    pub fn fallback(&self) -> &Fallback {
        &self.fallback
    }

    /// Description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn install_defaults(&self, out: &mut ParsedArgs) {
        match &self.fallback {
            Fallback::Value(v) => out.store(&self.names, v),
            Fallback::Unset if self.multiple => out.store(&self.names, &Value::List(Vec::new())),
            Fallback::Unset | Fallback::Required => {}
        }
    }

    fn consume(
        &self,
        tokens: &[String],
        ctx: &mut ParseContext<'_>,
        out: &mut ParsedArgs,
    ) -> Result<usize, ParseError> {
        let already_fired = ctx.fired(self.id);
        if already_fired && !self.multiple {
            return Ok(0);
        }

        let take = if self.multiple {
            tokens
                .iter()
                .take_while(|t| !ctx.looks_like_option(t))
                .count()
        } else {
            usize::from(tokens.first().is_some_and(|t| !ctx.looks_like_option(t)))
        };
        if take == 0 {
            return Ok(0);
        }

        let name = self.primary_name();
        let mut values = tokens[..take]
            .iter()
            .map(|raw| convert_token(&self.value_type, raw, self.requirement.as_ref(), name))
            .collect::<Result<Vec<_>, _>>()?;

        let value = if self.multiple {
            let mut items = if already_fired {
                out.stored(name)
                    .and_then(Value::as_list)
                    .map(<[Value]>::to_vec)
                    .unwrap_or_default()
            } else {
                Vec::new()
            };
            items.append(&mut values);
            Value::List(items)
        } else {
            values.swap_remove(0)
        };

        debug!(positional = %name, taken = take, "positional matched");
        out.store(&self.names, &value);
        ctx.record(self.id);
        Ok(take)
    }
}

/// Takes every token after its name, verbatim.
///
/// The default remainder is named `--`, so everything after the
/// end-of-options separator lands under [`REMAINDER_KEY`](crate::REMAINDER_KEY).
///
/// # Examples
///
/// ```
/// use argspec_core::{OptionGroup, Remainder, Spec, REMAINDER_KEY};
///
/// let spec = Spec::new(OptionGroup::new().with(Remainder::new())).unwrap();
/// let args = spec.parse(["--", "a", "-7", "--c"]).unwrap();
///
/// let rest: Vec<String> = args
///     .get_list(REMAINDER_KEY)
///     .unwrap()
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// assert_eq!(rest, ["a", "-7", "--c"]);
/// ```
#[derive(Debug, Clone)]
pub struct Remainder {
    id: NodeId,
    names: Vec<String>,
    description: Option<String>,
}

impl Remainder {
    /// The conventional remainder, named `--`.
    pub fn new() -> Self {
        Self::named([SEPARATOR])
    }

    /// A remainder triggered by other names (e.g. `exec`).
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: NodeId::default(),
            names: collect_names(names),
            description: None,
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Declared names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn install_defaults(&self, out: &mut ParsedArgs) {
        out.store(&self.names, &Value::List(Vec::new()));
    }

    fn consume(
        &self,
        tokens: &[String],
        ctx: &mut ParseContext<'_>,
        out: &mut ParsedArgs,
    ) -> usize {
        let Some(name) = tokens.first() else {
            return 0;
        };
        if !self.names.contains(name) {
            return 0;
        }
        let rest: Vec<Value> = tokens[1..].iter().map(|t| Value::Str(t.clone())).collect();
        debug!(remainder = %name, taken = rest.len(), "remainder matched");
        out.store(&self.names, &Value::List(rest));
        ctx.record(self.id);
        tokens.len()
    }
}

impl Default for Remainder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ValueOption> for Node {
    fn from(node: ValueOption) -> Self {
        Self::Value(node)
    }
}

impl From<FlagOption> for Node {
    fn from(node: FlagOption) -> Self {
        Self::Flag(node)
    }
}

impl From<CounterOption> for Node {
    fn from(node: CounterOption) -> Self {
        Self::Counter(node)
    }
}

impl From<Positional> for Node {
    fn from(node: Positional) -> Self {
        Self::Positional(node)
    }
}

impl From<Remainder> for Node {
    fn from(node: Remainder) -> Self {
        Self::Remainder(node)
    }
}

impl From<OptionGroup> for Node {
    fn from(node: OptionGroup) -> Self {
        Self::Group(node)
    }
}

impl From<MutexGroup> for Node {
    fn from(node: MutexGroup) -> Self {
        Self::Mutex(node)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Runs a single leaf with fresh ids against `input`.
    fn run(node: impl Into<Node>, input: &[&str]) -> (Result<usize, ParseError>, ParsedArgs, u32) {
        let mut node = node.into();
        let mut next = 0;
        node.assign_ids(&mut next);
        let registry: HashSet<String> = node.names().iter().map(|s| s.to_string()).collect();
        let mut ctx = ParseContext::new(next, &registry);
        let mut out = ParsedArgs::default();
        node.install_defaults(&mut out);
        let consumed = node.consume(&tokens(input), &mut ctx, &mut out);
        let count = ctx.count(node.id());
        (consumed, out, count)
    }

    #[test]
    fn test_value_option_declines_other_names() {
        let (consumed, _, count) = run(ValueOption::new(["-n"]), &["-x", "1"]);
        assert_eq!(consumed, Ok(0));
        assert_eq!(count, 0);
    }

    #[test]
    fn test_value_option_consumes_two() {
        let node = ValueOption::new(["-n", "--num-workers"]);
        let (consumed, out, count) = run(node, &["-n", "3", "x"]);
        assert_eq!(consumed, Ok(2));
        assert_eq!(count, 1);
        assert_eq!(out.get_str("n"), Some("3"));
        assert_eq!(out.get_str("num_workers"), Some("3"));
    }

    #[test]
    fn test_value_option_needs_a_value() {
        let (consumed, _, _) = run(ValueOption::new(["--out"]), &["--out"]);
        assert_eq!(consumed, Err(ParseError::MissingValue("--out".to_string())));
    }

    #[test]
    fn test_until_collects_up_to_terminator() {
        let node = ValueOption::new(["--exec"]).of::<i32>().until([";", "+"]);
        let (consumed, out, _) = run(node, &["--exec", "1", "2", "+", "3"]);
        assert_eq!(consumed, Ok(3));
        assert_eq!(out.get_list("exec"), Some(&[Value::Int(1), Value::Int(2)][..]));
    }

    #[test]
    fn test_until_without_terminator_fails() {
        let (consumed, _, _) = run(ValueOption::new(["--exec"]).until([";"]), &["--exec", "ls"]);
        assert_eq!(
            consumed,
            Err(ParseError::Unterminated {
                option: "--exec".to_string(),
                terminators: ";".to_string(),
            })
        );
    }

    #[test]
    fn test_value_option_defaults() {
        let (_, out, _) = run(ValueOption::new(["--level"]).with_default(3), &[]);
        assert_eq!(out.get_int("level"), Some(3));

        let (_, out, _) = run(ValueOption::new(["--level"]).optional(), &[]);
        assert!(!out.contains("level"));
    }

    #[test]
    fn test_flag_and_negator_are_complementary() {
        let flag = || FlagOption::new(["-c", "--color"]).with_negators(["--no-color"]);

        let (_, out, _) = run(flag(), &[]);
        assert!(!out.flag("color"));
        assert!(out.flag("no_color"));

        for input in [["-c"], ["--color"], ["--no-color"]] {
            let (consumed, out, _) = run(flag(), &input);
            assert_eq!(consumed, Ok(1));
            assert_eq!(out.flag("c"), out.flag("color"));
            assert_eq!(out.flag("color"), !out.flag("no_color"));
        }
    }

    #[test]
    fn test_counter_decrements() {
        let node = CounterOption::new(["-v"]).with_decrementers(["-q"]).with_default(5);
        let (consumed, out, _) = run(node, &["-q"]);
        assert_eq!(consumed, Ok(1));
        assert_eq!(out.get_int("v"), Some(4));
        assert_eq!(out.get_int("q"), Some(4));
    }

    #[test]
    fn test_counter_underflow_names_token() {
        let node = CounterOption::new(["-v"])
            .with_width::<i8>()
            .with_decrementers(["-q"])
            .with_default(-128);
        let (consumed, _, _) = run(node, &["-q"]);
        assert_eq!(
            consumed,
            Err(ParseError::CounterOverflow {
                option: "-v".to_string(),
                token: "-q".to_string(),
            })
        );
    }

    #[test]
    fn test_single_positional_takes_one() {
        let (consumed, out, _) = run(Positional::new("file"), &["a", "b"]);
        assert_eq!(consumed, Ok(1));
        assert_eq!(out.get_str("file"), Some("a"));
    }

    #[test]
    fn test_multiple_positional_stops_at_option() {
        let node = Positional::new("files").allow_multiple();
        let (consumed, out, _) = run(node, &["a", "-1", "-x", "b"]);
        assert_eq!(consumed, Ok(2));
        assert_eq!(
            out.get_list("files"),
            Some(&[Value::from("a"), Value::from("-1")][..])
        );
    }

    #[test]
    fn test_positional_declines_option_token() {
        let (consumed, out, count) = run(Positional::new("file"), &["--x"]);
        assert_eq!(consumed, Ok(0));
        assert_eq!(count, 0);
        assert!(!out.contains("file"));
    }

    #[test]
    fn test_positional_converts_each_token() {
        let node = Positional::new("nums").of::<u8>().allow_multiple();
        let (consumed, _, _) = run(node, &["1", "x"]);
        assert!(matches!(consumed, Err(ParseError::Conversion { ref token, .. }) if token == "x"));
    }

    #[test]
    fn test_remainder_takes_suffix_verbatim() {
        let (consumed, out, _) = run(Remainder::named(["exec"]), &["exec", "-a", "--b=c"]);
        assert_eq!(consumed, Ok(3));
        assert_eq!(
            out.get_list("exec"),
            Some(&[Value::from("-a"), Value::from("--b=c")][..])
        );
    }

    #[test]
    fn test_remainder_only_matches_current_token() {
        let (consumed, out, _) = run(Remainder::new(), &["a", "--"]);
        assert_eq!(consumed, Ok(0));
        assert_eq!(out.get_list(crate::REMAINDER_KEY), Some(&[][..]));
    }

    #[test]
    fn test_display_names() {
        let group: Node = OptionGroup::new()
            .with(FlagOption::new(["-a"]))
            .with(MutexGroup::new().with(FlagOption::new(["-b"])).with(FlagOption::new(["-c"])))
            .into();
        assert_eq!(group.display_name(), "(-a, (-b or -c))");
    }
}
