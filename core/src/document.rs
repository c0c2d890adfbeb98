//! Declarative spec documents.
//!
//! A spec tree can be written as YAML (or JSON) instead of builder calls.
//! Each node is tagged by `kind`; everything else mirrors the builders.
//!
//! # Example YAML
//!
//! ```yaml
//! help: ["-h", "--help"]
//! options:
//!   - kind: counter
//!     names: ["-v", "--verbose"]
//!     width: i8
//!   - kind: value
//!     names: ["-f", "--format"]
//!     default: json
//!     one_of: [json, yaml]
//!   - kind: mutex
//!     children:
//!       - kind: value
//!         names: ["--file"]
//!         type: path
//!       - kind: value
//!         names: ["--url"]
//!         pattern: "^https?://"
//!   - kind: positional
//!     name: inputs
//!     multiple: true
//!     optional: true
//!   - kind: remainder
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DocumentError, DocumentResult};
use crate::group::{MutexGroup, OptionGroup};
use crate::node::{CounterOption, FlagOption, Node, Positional, Remainder, ValueOption};
use crate::requirement::Requirement;
use crate::spec::Spec;
use crate::value::{Value, ValueType};

/// Value types a document can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeName {
    /// Any text.
    #[default]
    String,
    /// Filesystem path (stored as text).
    Path,
    /// Exactly one character.
    Char,
    /// `true` or `false`.
    Bool,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    #[serde(alias = "int")]
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    #[serde(alias = "float")]
    F64,
}

impl TypeName {
    /// The conversion this name stands for.
    pub fn value_type(self) -> ValueType {
        match self {
            Self::String => ValueType::of::<String>(),
            Self::Path => ValueType::of::<std::path::PathBuf>(),
            Self::Char => ValueType::of::<char>(),
            Self::Bool => ValueType::of::<bool>(),
            Self::I8 => ValueType::of::<i8>(),
            Self::I16 => ValueType::of::<i16>(),
            Self::I32 => ValueType::of::<i32>(),
            Self::I64 => ValueType::of::<i64>(),
            Self::U8 => ValueType::of::<u8>(),
            Self::U16 => ValueType::of::<u16>(),
            Self::U32 => ValueType::of::<u32>(),
            Self::F32 => ValueType::of::<f32>(),
            Self::F64 => ValueType::of::<f64>(),
        }
    }
}

/// Counter widths a document can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterWidth {
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    #[default]
    I64,
}

/// Top-level spec document.
///
/// # Examples
///
/// ```no_run
/// use argspec_core::SpecDocument;
///
/// let spec = SpecDocument::load("argspec.yml").unwrap().into_spec().unwrap();
/// let args = spec.parse(std::env::args().skip(1)).unwrap();
/// println!("{:?}", args.values());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecDocument {
    /// Help names; `-h`/`--help` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<Vec<String>>,
    /// Children of the root group.
    #[serde(default)]
    pub options: Vec<NodeDocument>,
}

/// One node of a spec document, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDocument {
    /// A [`ValueOption`].
    Value(ValueDocument),
    /// A [`FlagOption`].
    Flag(FlagDocument),
    /// A [`CounterOption`].
    Counter(CounterDocument),
    /// A [`Positional`].
    Positional(PositionalDocument),
    /// A [`Remainder`].
    Remainder(RemainderDocument),
    /// An [`OptionGroup`].
    Group(GroupDocument),
    /// A [`MutexGroup`].
    Mutex(GroupDocument),
}

/// Document form of a [`ValueOption`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueDocument {
    /// Option names, e.g. `["-n", "--num-workers"]`.
    pub names: Vec<String>,
    /// Declared type (`type:` in the document), `string` when absent.
    #[serde(default, rename = "type")]
    pub value_type: TypeName,
    /// Default value; implies `optional`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Optional without a default.
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    /// Terminators; when set the option collects a run of values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub until: Vec<String>,
    /// Enumeration requirement, read through the declared type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,
    /// Pattern requirement, matched against the raw token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Document form of a [`FlagOption`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagDocument {
    /// Names that set the flag.
    pub names: Vec<String>,
    /// Names that clear it, e.g. `--no-color`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub negators: Vec<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Document form of a [`CounterOption`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterDocument {
    /// Names that increment the count.
    pub names: Vec<String>,
    /// Names that decrement it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decrementers: Vec<String>,
    /// Integer width bounding the count, `i64` when absent.
    #[serde(default)]
    pub width: CounterWidth,
    /// Starting count.
    #[serde(default)]
    pub default: i64,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Document form of a [`Positional`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionalDocument {
    /// Primary name; also the result key.
    pub name: String,
    /// Further names the value is stored under.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Declared type (`type:` in the document), `string` when absent.
    #[serde(default, rename = "type")]
    pub value_type: TypeName,
    /// Takes a run of tokens instead of one.
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiple: bool,
    /// Default value; implies `optional`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Optional without a default.
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    /// Enumeration requirement, read through the declared type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,
    /// Pattern requirement, matched against the raw token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Document form of a [`Remainder`]. No names means `--`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemainderDocument {
    /// Names that start the remainder.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Document form of an [`OptionGroup`] or [`MutexGroup`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDocument {
    /// Nested nodes, in declaration order.
    #[serde(default)]
    pub children: Vec<NodeDocument>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl SpecDocument {
    /// Loads a document; `.json` files are read as JSON, anything else as
    /// YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DocumentError::IoError) if the file cannot be
    /// read, or a YAML/JSON error if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let document = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        debug!(path = %path.display(), "spec document loaded");
        Ok(document)
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](DocumentError::YamlError) if parsing fails.
    pub fn from_yaml_str(text: &str) -> DocumentResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](DocumentError::JsonError) if parsing fails.
    pub fn from_json_str(text: &str) -> DocumentResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Saves the document; `.json` paths get pretty JSON, anything else YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DocumentError::IoError) if the file cannot be
    /// written, or a YAML/JSON error if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// Builds the root group described by the document.
    ///
    /// # Errors
    ///
    /// Fails on a bad pattern, a default or `one_of` entry that does not
    /// fit its type, or a node with both `one_of` and `pattern`.
    pub fn to_root(&self) -> DocumentResult<OptionGroup> {
        self.options
            .iter()
            .try_fold(OptionGroup::new(), |group, child| {
                Ok::<_, DocumentError>(group.with(child.to_node()?))
            })
    }

    /// Builds and validates the spec described by the document.
    ///
    /// # Errors
    ///
    /// Everything [`to_root`](SpecDocument::to_root) reports, plus
    /// [`InvalidSpec`](DocumentError::InvalidSpec) when the tree fails
    /// validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_core::SpecDocument;
    ///
    /// let doc = SpecDocument::from_yaml_str(r#"
    /// options:
    ///   - kind: value
    ///     names: ["-n", "--count"]
    ///     type: int
    ///     default: 1
    ///     one_of: [1, 2, 3]
    /// "#).unwrap();
    ///
    /// let spec = doc.into_spec().unwrap();
    /// assert_eq!(spec.parse(["--count=2"]).unwrap().get_int("count"), Some(2));
    /// ```
    pub fn into_spec(self) -> DocumentResult<Spec> {
        let spec = Spec::new(self.to_root()?)?;
        Ok(match self.help {
            Some(names) => spec.with_help_names(names),
            None => spec,
        })
    }
}

impl NodeDocument {
    /// Builds the node described by this entry.
    ///
    /// # Errors
    ///
    /// See [`SpecDocument::to_root`].
    pub fn to_node(&self) -> DocumentResult<Node> {
        let node = match self {
            Self::Value(doc) => {
                let value_type = doc.value_type.value_type();
                let label = label(&doc.names);
                let mut node = ValueOption::new(doc.names.iter().cloned())
                    .with_type(value_type)
                    .until(doc.until.iter().cloned());
                if let Some(default) = &doc.default {
                    node = node.with_default(coerce(value_type, default, &label)?);
                } else if doc.optional {
                    node = node.optional();
                }
                if let Some(req) = requirement(value_type, &doc.one_of, &doc.pattern, &label)? {
                    node = node.with_requirement(req);
                }
                if let Some(desc) = &doc.description {
                    node = node.with_description(desc);
                }
                Node::Value(node)
            }
            Self::Flag(doc) => {
                let mut node = FlagOption::new(doc.names.iter().cloned())
                    .with_negators(doc.negators.iter().cloned());
                if let Some(desc) = &doc.description {
                    node = node.with_description(desc);
                }
                Node::Flag(node)
            }
            Self::Counter(doc) => {
                let node = CounterOption::new(doc.names.iter().cloned())
                    .with_decrementers(doc.decrementers.iter().cloned())
                    .with_default(doc.default);
                let mut node = match doc.width {
                    CounterWidth::I8 => node.with_width::<i8>(),
                    CounterWidth::I16 => node.with_width::<i16>(),
                    CounterWidth::I32 => node.with_width::<i32>(),
                    CounterWidth::I64 => node.with_width::<i64>(),
                };
                if let Some(desc) = &doc.description {
                    node = node.with_description(desc);
                }
                Node::Counter(node)
            }
            Self::Positional(doc) => {
                let value_type = doc.value_type.value_type();
                let mut node = doc
                    .aliases
                    .iter()
                    .fold(Positional::new(doc.name.clone()), |node, alias| {
                        node.with_alias(alias.clone())
                    })
                    .with_type(value_type);
                if doc.multiple {
                    node = node.allow_multiple();
                }
                if let Some(default) = &doc.default {
                    node = node.with_default(coerce(value_type, default, &doc.name)?);
                } else if doc.optional {
                    node = node.optional();
                }
                if let Some(req) = requirement(value_type, &doc.one_of, &doc.pattern, &doc.name)? {
                    node = node.with_requirement(req);
                }
                if let Some(desc) = &doc.description {
                    node = node.with_description(desc);
                }
                Node::Positional(node)
            }
            Self::Remainder(doc) => {
                let mut node = if doc.names.is_empty() {
                    Remainder::new()
                } else {
                    Remainder::named(doc.names.iter().cloned())
                };
                if let Some(desc) = &doc.description {
                    node = node.with_description(desc);
                }
                Node::Remainder(node)
            }
            Self::Group(doc) => {
                let mut group = doc
                    .children
                    .iter()
                    .try_fold(OptionGroup::new(), |group, child| {
                        Ok::<_, DocumentError>(group.with(child.to_node()?))
                    })?;
                if let Some(desc) = &doc.description {
                    group = group.with_description(desc);
                }
                Node::Group(group)
            }
            Self::Mutex(doc) => {
                let mut mutex = doc
                    .children
                    .iter()
                    .try_fold(MutexGroup::new(), |mutex, child| {
                        Ok::<_, DocumentError>(mutex.with(child.to_node()?))
                    })?;
                if let Some(desc) = &doc.description {
                    mutex = mutex.with_description(desc);
                }
                Node::Mutex(mutex)
            }
        };
        Ok(node)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn label(names: &[String]) -> String {
    names.first().cloned().unwrap_or_default()
}

/// Re-reads a document value through the declared type, so `3` declared for
/// a string option becomes `"3"` and `1` declared for an `f64` becomes `1.0`.
fn coerce(value_type: ValueType, value: &Value, node: &str) -> DocumentResult<Value> {
    match value {
        Value::List(items) => items
            .iter()
            .map(|item| coerce(value_type, item, node))
            .collect::<DocumentResult<Vec<_>>>()
            .map(Value::List),
        scalar => {
            let text = scalar.to_string();
            value_type
                .convert(&text)
                .ok_or_else(|| DocumentError::InvalidValue {
                    node: node.to_string(),
                    value: text,
                    type_name: value_type.name(),
                })
        }
    }
}

fn requirement(
    value_type: ValueType,
    one_of: &Option<Vec<Value>>,
    pattern: &Option<String>,
    node: &str,
) -> DocumentResult<Option<Requirement>> {
    match (one_of, pattern) {
        (Some(_), Some(_)) => Err(DocumentError::ConflictingRequirements(node.to_string())),
        (Some(allowed), None) => {
            let allowed = allowed
                .iter()
                .map(|v| coerce(value_type, v, node))
                .collect::<DocumentResult<Vec<_>>>()?;
            Ok(Some(Requirement::OneOf(allowed)))
        }
        (None, Some(pattern)) => Ok(Some(Requirement::pattern(pattern)?)),
        (None, None) => Ok(None),
    }
}
