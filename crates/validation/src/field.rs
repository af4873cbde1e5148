//! Field paths, typed validation errors, and error-list aggregation.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug)]
struct Node {
    name: String,
    index: String,
    parent: Option<Arc<Node>>,
}

/// A field-access path built during nested struct traversal, rendered as
/// `a.b[0].c`. The chain is append-only: every node's parent link is set
/// exactly once at construction, so a `Path` handle is a cheap clone and can
/// be shared across threads freely.
#[derive(Debug, Clone)]
pub struct Path(Arc<Node>);

fn chain(name: &str, elems: &[&str], parent: Option<Arc<Node>>) -> Arc<Node> {
    let mut node = Arc::new(Node { name: name.to_string(), index: String::new(), parent });

    for elem in elems {
        node = Arc::new(Node {
            name: (*elem).to_string(),
            index: String::new(),
            parent: Some(node),
        });
    }

    node
}

impl Path {
    /// Build a fresh root-to-leaf chain reading `name, elems[0], elems[1], …`.
    pub fn new(name: &str, elems: &[&str]) -> Path {
        Path(chain(name, elems, None))
    }

    /// Build the same chain as [`Path::new`] and splice it below the
    /// receiver: the new chain's root gets the receiver as parent.
    pub fn child(&self, name: &str, elems: &[&str]) -> Path {
        Path(chain(name, elems, Some(self.0.clone())))
    }

    /// Append an array-dereference node (`[i]`) below the receiver.
    pub fn index(&self, i: usize) -> Path {
        Path(Arc::new(Node {
            name: String::new(),
            index: i.to_string(),
            parent: Some(self.0.clone()),
        }))
    }

    /// Append a map-dereference node (`[key]`) below the receiver.
    pub fn key(&self, key: &str) -> Path {
        Path(Arc::new(Node {
            name: String::new(),
            index: key.to_string(),
            parent: Some(self.0.clone()),
        }))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes: SmallVec<[&Node; 8]> = SmallVec::new();
        let mut cur = Some(&self.0);

        while let Some(node) = cur {
            nodes.push(node);
            cur = node.parent.as_ref();
        }

        // nodes were collected leaf-to-root; emit root-to-leaf. The leading
        // dot is skipped only on the very first node; a node with neither
        // name nor index contributes nothing but does not break the chain.
        for (i, node) in nodes.iter().rev().enumerate() {
            if i >= 1 && !node.name.is_empty() {
                f.write_str(".")?;
            }
            if !node.name.is_empty() {
                f.write_str(&node.name)?;
            }
            if !node.index.is_empty() {
                write!(f, "[{}]", node.index)?;
            }
        }

        Ok(())
    }
}

/// The nine validation failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    NotFound,
    Required,
    Duplicate,
    Invalid,
    NotSupport,
    Forbidden,
    TooLong,
    TooMany,
    Internal,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorType::NotFound => "ErrorNotFound",
            ErrorType::Required => "ErrorRequired",
            ErrorType::Duplicate => "ErrorDuplicate",
            ErrorType::Invalid => "ErrorInvalid",
            ErrorType::NotSupport => "ErrorNotSupport",
            ErrorType::Forbidden => "ErrorForbidden",
            ErrorType::TooLong => "ErrorTooLong",
            ErrorType::TooMany => "ErrorTooMany",
            ErrorType::Internal => "ErrorInternal",
        };

        f.write_str(label)
    }
}

/// The offending value attached to an error, resolved to a closed renderable
/// set at construction time. `Rendered` holds output of a Display-capable
/// value, `Opaque` a debug formatting; the fallback order in
/// [`Error::error_body`] is primitive, then string-capable, then debug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    Str(String),
    Rendered(String),
    Opaque(String),
}

impl Value {
    pub fn rendered(v: &impl fmt::Display) -> Value {
        Value::Rendered(v.to_string())
    }

    pub fn opaque(v: &impl fmt::Debug) -> Value {
        Value::Opaque(format!("{v:?}"))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Int(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Value {
        i64::try_from(v).map(Value::Int).unwrap_or(Value::Opaque(v.to_string()))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Value {
        i64::try_from(v).map(Value::Int).unwrap_or(Value::Opaque(v.to_string()))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(v)
    }
}

/// A nilable reference dereferences one level; absent renders as `null`.
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Value {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// A single validation failure tied to a [`Path`]. Immutable once built via
/// one of the kind-specific constructors, which fix how `value` and `detail`
/// are used per kind.
#[derive(Debug, Clone)]
pub struct Error {
    error_type: ErrorType,
    path: Path,
    value: Value,
    detail: String,
}

impl Error {
    pub fn not_found(path: &Path, value: impl Into<Value>) -> Error {
        Error {
            error_type: ErrorType::NotFound,
            path: path.clone(),
            value: value.into(),
            detail: String::new(),
        }
    }

    pub fn required(path: &Path) -> Error {
        Error {
            error_type: ErrorType::Required,
            path: path.clone(),
            value: Value::Null,
            detail: String::new(),
        }
    }

    pub fn duplicate(path: &Path, value: impl Into<Value>) -> Error {
        Error {
            error_type: ErrorType::Duplicate,
            path: path.clone(),
            value: value.into(),
            detail: String::new(),
        }
    }

    pub fn invalid(path: &Path, value: impl Into<Value>, detail: &str) -> Error {
        Error {
            error_type: ErrorType::Invalid,
            path: path.clone(),
            value: value.into(),
            detail: detail.to_string(),
        }
    }

    pub fn not_support(path: &Path, value: impl Into<Value>, valid_items: &[&str]) -> Error {
        let quoted: Vec<String> = valid_items.iter().map(|item| format!("{item:?}")).collect();

        Error {
            error_type: ErrorType::NotSupport,
            path: path.clone(),
            value: value.into(),
            detail: format!("supported values: {}", quoted.join(", ")),
        }
    }

    pub fn forbidden(path: &Path, detail: &str) -> Error {
        Error {
            error_type: ErrorType::Forbidden,
            path: path.clone(),
            value: Value::Null,
            detail: detail.to_string(),
        }
    }

    /// The oversized value is stored but deliberately never shown.
    pub fn too_long(path: &Path, value: impl Into<Value>, max_length: usize) -> Error {
        Error {
            error_type: ErrorType::TooLong,
            path: path.clone(),
            value: value.into(),
            detail: format!("must have at most {max_length} bytes"),
        }
    }

    pub fn too_many(path: &Path, actual_quantity: usize, max_quantity: usize) -> Error {
        Error {
            error_type: ErrorType::TooMany,
            path: path.clone(),
            value: actual_quantity.into(),
            detail: format!("must have at most {max_quantity}"),
        }
    }

    pub fn internal(path: &Path, err: impl fmt::Display) -> Error {
        Error {
            error_type: ErrorType::Internal,
            path: path.clone(),
            value: Value::Null,
            detail: err.to_string(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// The message without the path prefix. Required/Forbidden/TooLong/
    /// Internal render the kind label only; the value is never shown for
    /// those kinds even when one is set.
    pub fn error_body(&self) -> String {
        let mut s = match self.error_type {
            ErrorType::Required
            | ErrorType::Forbidden
            | ErrorType::TooLong
            | ErrorType::Internal => self.error_type.to_string(),
            _ => match &self.value {
                Value::Null => format!("{}: null", self.error_type),
                Value::Int(v) => format!("{}: {v}", self.error_type),
                Value::Str(v) | Value::Rendered(v) | Value::Opaque(v) => {
                    format!("{}: {v}", self.error_type)
                }
            },
        };

        if !self.detail.is_empty() {
            s.push_str(": ");
            s.push_str(&self.detail);
        }

        s
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error_body())
    }
}

impl std::error::Error for Error {}

/// Ordered sequence of validation failures. Duplicates are allowed at
/// collection time (two rules may flag the same field); deduplication
/// happens only in [`ErrorList::to_aggregate`].
#[derive(Debug, Clone, Default)]
pub struct ErrorList(pub Vec<Error>);

impl ErrorList {
    pub fn new() -> ErrorList {
        ErrorList(Vec::new())
    }

    pub fn push(&mut self, err: Error) {
        self.0.push(err);
    }

    pub fn extend(&mut self, other: ErrorList) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.0.iter()
    }

    /// Collapse into one combined error, dropping later errors whose rendered
    /// text is identical to an earlier one. `None` on an empty list.
    pub fn to_aggregate(&self) -> Option<Aggregate> {
        if self.0.is_empty() {
            return None;
        }

        let mut seen = HashSet::new();
        let mut errs = Vec::with_capacity(self.0.len());

        for err in &self.0 {
            if seen.insert(err.to_string()) {
                errs.push(err.clone());
            }
        }

        Some(Aggregate(errs))
    }

    /// Remove every error the matcher selects, deduplicating on the way
    /// through the aggregate. `None` when nothing survives.
    pub fn filter(&self, is_match: impl Fn(&Error) -> bool) -> Option<ErrorList> {
        let agg = self.to_aggregate()?;
        let kept: Vec<Error> = agg.0.into_iter().filter(|err| !is_match(err)).collect();

        if kept.is_empty() {
            None
        } else {
            Some(ErrorList(kept))
        }
    }
}

impl From<Vec<Error>> for ErrorList {
    fn from(errs: Vec<Error>) -> ErrorList {
        ErrorList(errs)
    }
}

impl FromIterator<Error> for ErrorList {
    fn from_iter<I: IntoIterator<Item = Error>>(iter: I) -> ErrorList {
        ErrorList(iter.into_iter().collect())
    }
}

impl IntoIterator for ErrorList {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Combined multi-error, displayed as `[1]err1; [2]err2; …`. The rendering is
/// deterministic given the same ordered input list.
#[derive(Debug, Clone)]
pub struct Aggregate(Vec<Error>);

impl Aggregate {
    pub fn errors(&self) -> &[Error] {
        &self.0
    }

    pub fn into_error_list(self) -> ErrorList {
        ErrorList(self.0)
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "[{}]{err}", i + 1)?;
        }

        Ok(())
    }
}

impl std::error::Error for Aggregate {}

/// Canonical matcher builder for [`ErrorList::filter`]: selects by kind.
pub fn type_matcher(t: ErrorType) -> impl Fn(&Error) -> bool {
    move |err| err.error_type == t
}
