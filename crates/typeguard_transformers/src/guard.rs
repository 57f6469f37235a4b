//! The guard IR.
//!
//! A [`Guard`] is a small tree of checks over named JavaScript variables. It
//! is produced by the check compiler, rendered to JavaScript by
//! [`render`](crate::render), and executed against [`Value`]s by
//! [`eval`](crate::eval) so the generated checks can be tested without a
//! JavaScript engine.
//!
//! [`Value`]: typeguard_checker::Value

use rustc_hash::FxHashMap;
use typeguard_types::{LiteralValue, TypeNode};

/// A predicate on one variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    /// `typeof v === "..."`
    TypeOf(&'static str),
    /// Non-null object or function.
    ObjectOrFunction,
    Undefined,
    NotUndefined,
    Null,
    /// `v === literal`
    Equals(LiteralValue),
    /// `v` is one of the listed values.
    OneOf(Vec<LiteralValue>),
    /// `Array.isArray(v)`
    Array,
    /// Non-null, non-array object.
    Object,
    Function,
    Map,
    Set,
    /// Length bounds of an array.
    Length { min: usize, max: Option<usize> },
    /// A string matching an anchored pattern.
    Pattern(String),
    Never,
    /// The runtime matcher against entry `n` of the descriptor table.
    Matches(usize),
}

/// One piece of a diagnostic path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathPart {
    Text(String),
    /// `[i]` for an index variable.
    Index(String),
    /// `.k` for a key variable.
    Key(String),
    /// `[<stringified key>]` for a map key variable.
    Entry(String),
}

/// A diagnostic path, part of it known only at run time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path(pub Vec<PathPart>);

impl Path {
    pub fn new(root: &str) -> Self {
        Path(vec![PathPart::Text(root.to_string())])
    }

    fn push(&self, part: PathPart) -> Path {
        let mut parts = self.0.clone();
        match (parts.last_mut(), part) {
            (Some(PathPart::Text(last)), PathPart::Text(text)) => last.push_str(&text),
            (_, part) => parts.push(part),
        }
        Path(parts)
    }

    pub fn text(&self, text: &str) -> Path {
        self.push(PathPart::Text(text.to_string()))
    }

    pub fn index(&self, var: &str) -> Path {
        self.push(PathPart::Index(var.to_string()))
    }

    pub fn key(&self, var: &str) -> Path {
        self.push(PathPart::Key(var.to_string()))
    }

    pub fn entry(&self, var: &str) -> Path {
        self.push(PathPart::Entry(var.to_string()))
    }

    /// The path when it has no run-time parts.
    pub fn as_static(&self) -> Option<&str> {
        match self.0.as_slice() {
            [PathPart::Text(text)] => Some(text),
            [] => Some(""),
            _ => None,
        }
    }
}

/// How a bound variable reads its parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    /// `v["k"]`
    Key(String),
    /// `v[3]`
    Index(usize),
    /// `v[3]` when it lies before the last `trailing` elements, else
    /// `undefined`.
    Head { index: usize, trailing: usize },
    /// `v[v.length - n]`
    FromEnd(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardNode {
    /// Report a mismatch unless `test` holds; otherwise run `then`.
    Check {
        var: String,
        test: Test,
        path: Path,
        expected: String,
        then: Vec<GuardNode>,
    },
    /// Run `then` only when `test` holds.
    When { var: String, test: Test, then: Vec<GuardNode> },
    /// Run `then` unless `var` is `Object.is` one of `seen`, values an
    /// earlier guard already checked against the same type.
    Unseen { var: String, seen: Vec<String>, then: Vec<GuardNode> },
    /// Bind `name` to a part of `var` and run `then`.
    Bind { name: String, var: String, access: Access, then: Vec<GuardNode> },
    /// Bind `name` to own property `key` of `var`. When the property is
    /// absent, report it as missing if `missing` is set, else skip `then`.
    Property {
        name: String,
        var: String,
        key: String,
        missing: Option<(Path, String)>,
        then: Vec<GuardNode>,
    },
    /// Visit the elements of an array from `start` up to `length - trailing`.
    Elements {
        var: String,
        index: String,
        element: String,
        start: usize,
        trailing: usize,
        then: Vec<GuardNode>,
    },
    /// Visit the entries of a map.
    Entries { var: String, key: String, value: String, then: Vec<GuardNode> },
    /// Visit the members of a set.
    Members { var: String, element: String, then: Vec<GuardNode> },
    /// Visit own enumerable keys of an object, skipping `exclude` and, with
    /// `numeric_only`, keys that are not canonical numbers.
    OwnKeys {
        var: String,
        key: String,
        value: String,
        exclude: Vec<String>,
        numeric_only: bool,
        then: Vec<GuardNode>,
    },
}

/// The checks for one value. An empty guard checks nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Guard {
    /// The variable holding the checked value.
    pub target: String,
    pub nodes: Vec<GuardNode>,
}

impl Guard {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Types the runtime matcher is asked about, deduplicated by descriptor and
/// emitted once per unit as `__tg_types`.
#[derive(Debug, Default)]
pub struct DescriptorTable {
    types: Vec<TypeNode>,
    descriptors: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table slot for `ty`, adding it if needed.
    pub fn intern(&mut self, ty: &TypeNode) -> usize {
        let descriptor = ty.to_descriptor();
        if let Some(&slot) = self.index.get(&descriptor) {
            return slot;
        }
        let slot = self.types.len();
        self.index.insert(descriptor.clone(), slot);
        self.descriptors.push(descriptor);
        self.types.push(ty.clone());
        slot
    }

    pub fn get(&self, slot: usize) -> Option<&TypeNode> {
        self.types.get(slot)
    }

    pub fn descriptors(&self) -> &[String] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
