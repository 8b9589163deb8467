//! Structural identity of anonymous shapes.
//!
//! A shape is identified by its ordered field names alone. Field types never
//! participate: `{ a = 1 }` and `{ a = "x" }` share one template and differ
//! only in the type arguments they instantiate it with.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Separator written before every field name in the canonical form.
const SEPARATOR: char = '|';

/// Ordered, case-sensitive field-name sequence of a shape.
///
/// The canonical form is `"|a|b|c"`; the zero-field shape is `""`. Equality,
/// hashing, and ordering all go through the canonical form.
#[derive(Clone, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ShapeKey {
    canonical: Arc<str>,
    fields: Arc<[Arc<str>]>,
}

/// A canonical key string that does not describe a field sequence.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ShapeKeyError {
    #[error("shape key `{0}` does not start with `|`")]
    MissingSeparator(String),
    #[error("shape key `{key}` has an empty field name at position {ordinal}")]
    EmptyField { key: String, ordinal: usize },
}

impl ShapeKey {
    /// Key of the zero-field shape.
    pub fn empty() -> Self {
        ShapeKey {
            canonical: Arc::from(""),
            fields: Arc::from(Vec::new()),
        }
    }

    /// Build a key from field names in declaration order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let fields: Arc<[Arc<str>]> = names.into_iter().map(Into::into).collect();
        let mut canonical = String::new();
        for field in fields.iter() {
            debug_assert!(
                !field.is_empty() && !field.contains(SEPARATOR),
                "field name `{field}` cannot appear in a shape key"
            );
            canonical.push(SEPARATOR);
            canonical.push_str(field);
        }
        ShapeKey {
            canonical: Arc::from(canonical),
            fields,
        }
    }

    /// Parse a canonical key string back into a key.
    pub fn parse(canonical: &str) -> Result<Self, ShapeKeyError> {
        if canonical.is_empty() {
            return Ok(Self::empty());
        }
        let Some(rest) = canonical.strip_prefix(SEPARATOR) else {
            return Err(ShapeKeyError::MissingSeparator(canonical.to_owned()));
        };
        let names: Vec<&str> = rest.split(SEPARATOR).collect();
        if let Some(ordinal) = names.iter().position(|name| name.is_empty()) {
            return Err(ShapeKeyError::EmptyField {
                key: canonical.to_owned(),
                ordinal,
            });
        }
        Ok(Self::new(names))
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn fields(&self) -> &[Arc<str>] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Ordinal of a field by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| &**field == name)
    }
}

impl PartialEq for ShapeKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for ShapeKey {}

impl Hash for ShapeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl Ord for ShapeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl PartialOrd for ShapeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShapeKey({:?})", &*self.canonical)
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl From<ShapeKey> for String {
    fn from(key: ShapeKey) -> String {
        key.canonical.to_string()
    }
}

impl TryFrom<String> for ShapeKey {
    type Error = ShapeKeyError;

    fn try_from(canonical: String) -> Result<Self, Self::Error> {
        ShapeKey::parse(&canonical)
    }
}
