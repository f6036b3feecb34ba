//! Patch operations over configuration documents
//!
//! Provides [`PatchItem`] and [`PatchApplier`] for structural (JSON pointer
//! addressed) edits. Each operation kind is handled explicitly; nothing is
//! accepted as a silent no-op.

use crate::pointer::{parse_index, JsonPointer, PointerError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

/// Operation kind of a patch item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    /// Insert at path; on arrays, shifts later elements (`-` appends)
    Add,
    /// Remove the element at path; it must exist
    Remove,
    /// Replace the element at path; it must exist
    Replace,
    /// Copy the element at `from` to path
    Copy,
    /// Remove the element at `from` and add it at path
    Move,
    /// Assert the element at path equals value
    Test,
}

impl PatchOperation {
    pub const ALL: [Self; 6] = [
        Self::Add,
        Self::Remove,
        Self::Replace,
        Self::Copy,
        Self::Move,
        Self::Test,
    ];

    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::Copy => "copy",
            Self::Move => "move",
            Self::Test => "test",
        }
    }

    /// Operation carries a `value`
    #[inline]
    #[must_use]
    pub fn needs_value(self) -> bool {
        matches!(self, Self::Add | Self::Replace | Self::Test)
    }

    /// Operation carries a `from`
    #[inline]
    #[must_use]
    pub fn needs_from(self) -> bool {
        matches!(self, Self::Copy | Self::Move)
    }

    /// Operation changes the document
    #[inline]
    #[must_use]
    pub fn writes_state(self) -> bool {
        !matches!(self, Self::Test)
    }
}

impl Display for PatchOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One patch instruction as received from a caller
///
/// `path` and `from` stay unparsed so a malformed pointer is reported against
/// the item that carried it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchItem {
    pub op: PatchOperation,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl PatchItem {
    #[inline]
    #[must_use]
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(PatchOperation::Add, path, value)
    }

    #[inline]
    #[must_use]
    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(PatchOperation::Replace, path, value)
    }

    #[inline]
    #[must_use]
    pub fn test(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(PatchOperation::Test, path, value)
    }

    #[inline]
    #[must_use]
    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOperation::Remove,
            path: path.into(),
            value: None,
            from: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn copy(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_from(PatchOperation::Copy, from, path)
    }

    #[inline]
    #[must_use]
    pub fn move_to(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_from(PatchOperation::Move, from, path)
    }

    fn with_value(op: PatchOperation, path: impl Into<String>, value: Value) -> Self {
        Self {
            op,
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }

    fn with_from(op: PatchOperation, from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op,
            path: path.into(),
            value: None,
            from: Some(from.into()),
        }
    }

    /// Parsed target pointer
    ///
    /// # Errors
    /// Returns error if `path` is not a valid JSON pointer
    #[inline]
    pub fn target(&self) -> Result<JsonPointer, PatchError> {
        self.path.parse().map_err(PatchError::from)
    }

    /// Parsed source pointer, for copy and move
    ///
    /// # Errors
    /// Returns error if `from` is absent or not a valid JSON pointer
    #[inline]
    pub fn source(&self) -> Result<JsonPointer, PatchError> {
        let from = self
            .from
            .as_deref()
            .ok_or(PatchError::MissingFrom { op: self.op })?;
        from.parse().map_err(PatchError::from)
    }
}

impl Display for PatchItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{} {}", self.op, self.path),
        }
    }
}

/// Errors specific to patch application
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    /// Malformed `path` or `from`
    #[error("invalid pointer: {0}")]
    InvalidPointer(#[from] PointerError),

    /// Nothing at the addressed location
    #[error("path not found: {0}")]
    PathNotFound(JsonPointer),

    /// Parent of the target is a scalar
    #[error("parent of '{0}' is not an object or array")]
    NotAContainer(JsonPointer),

    /// Array segment is not a valid index
    #[error("invalid array index '{index}' at '{path}'")]
    InvalidIndex { path: JsonPointer, index: String },

    /// add/replace/test without a value
    #[error("'{op}' requires a value")]
    MissingValue { op: PatchOperation },

    /// copy/move without a source
    #[error("'{op}' requires a from pointer")]
    MissingFrom { op: PatchOperation },

    /// The document root cannot be removed
    #[error("cannot remove the document root")]
    RootRemoval,

    /// move into its own descendant
    #[error("cannot move '{from}' into its own child '{path}'")]
    MoveIntoDescendant { from: JsonPointer, path: JsonPointer },

    /// test comparison failed
    #[error("test failed at '{0}'")]
    TestFailed(JsonPointer),
}

/// Applies patch items to JSON documents
///
/// Stateless; each call returns a new document and leaves the input intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchApplier;

impl PatchApplier {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Apply a single item
    ///
    /// # Errors
    /// Returns error if the item cannot be applied to `doc`
    pub fn apply(&self, doc: &Value, item: &PatchItem) -> Result<Value, PatchError> {
        let path = item.target()?;
        let mut next = doc.clone();

        match item.op {
            PatchOperation::Add => {
                add(&mut next, &path, required_value(item)?)?;
            }
            PatchOperation::Remove => {
                remove(&mut next, &path)?;
            }
            PatchOperation::Replace => {
                let value = required_value(item)?;
                let slot = path
                    .resolve_mut(&mut next)
                    .ok_or_else(|| PatchError::PathNotFound(path.clone()))?;
                *slot = value;
            }
            PatchOperation::Copy => {
                let from = item.source()?;
                let value = from
                    .resolve(&next)
                    .cloned()
                    .ok_or(PatchError::PathNotFound(from))?;
                add(&mut next, &path, value)?;
            }
            PatchOperation::Move => {
                let from = item.source()?;
                if from.is_ancestor_of(&path) {
                    return Err(PatchError::MoveIntoDescendant { from, path });
                }
                let value = remove(&mut next, &from)?;
                add(&mut next, &path, value)?;
            }
            PatchOperation::Test => {
                let expected = required_value(item)?;
                let actual = path.resolve(&next);
                if actual != Some(&expected) {
                    return Err(PatchError::TestFailed(path));
                }
            }
        }

        Ok(next)
    }

    /// Apply items in order, stopping at the first failure
    ///
    /// # Errors
    /// Returns the index of the failing item with its error
    pub fn apply_all(&self, doc: &Value, items: &[PatchItem]) -> Result<Value, (usize, PatchError)> {
        items
            .iter()
            .enumerate()
            .try_fold(doc.clone(), |current, (i, item)| {
                self.apply(&current, item).map_err(|e| (i, e))
            })
    }
}

fn required_value(item: &PatchItem) -> Result<Value, PatchError> {
    item.value
        .clone()
        .ok_or(PatchError::MissingValue { op: item.op })
}

fn add(doc: &mut Value, path: &JsonPointer, value: Value) -> Result<(), PatchError> {
    let (Some(parent), Some(last)) = (path.parent(), path.last()) else {
        *doc = value;
        return Ok(());
    };

    match parent.resolve_mut(doc) {
        Some(Value::Object(map)) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        Some(Value::Array(items)) => {
            let index = if last == "-" {
                items.len()
            } else {
                parse_index(last)
                    .filter(|i| *i <= items.len())
                    .ok_or_else(|| PatchError::InvalidIndex {
                        path: path.clone(),
                        index: last.to_string(),
                    })?
            };
            items.insert(index, value);
            Ok(())
        }
        Some(_) => Err(PatchError::NotAContainer(path.clone())),
        None => Err(PatchError::PathNotFound(parent)),
    }
}

fn remove(doc: &mut Value, path: &JsonPointer) -> Result<Value, PatchError> {
    let (Some(parent), Some(last)) = (path.parent(), path.last()) else {
        return Err(PatchError::RootRemoval);
    };

    match parent.resolve_mut(doc) {
        Some(Value::Object(map)) => map
            .remove(last)
            .ok_or_else(|| PatchError::PathNotFound(path.clone())),
        Some(Value::Array(items)) => match parse_index(last) {
            Some(i) if i < items.len() => Ok(items.remove(i)),
            _ => Err(PatchError::InvalidIndex {
                path: path.clone(),
                index: last.to_string(),
            }),
        },
        Some(_) => Err(PatchError::NotAContainer(path.clone())),
        None => Err(PatchError::PathNotFound(path.clone())),
    }
}
