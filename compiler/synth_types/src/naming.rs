//! External names of synthesized types.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::SynthError;

/// The committed identity of a synthesized type.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NameAndIndex {
    pub name: String,
    pub index: u32,
}

impl NameAndIndex {
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        NameAndIndex {
            name: name.into(),
            index,
        }
    }
}

impl fmt::Display for NameAndIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` (index {})", self.name, self.index)
    }
}

/// Write-once storage for a [`NameAndIndex`].
#[derive(Debug, Default)]
pub(crate) struct NameSlot(OnceLock<NameAndIndex>);

impl NameSlot {
    pub(crate) fn get(&self) -> Option<&NameAndIndex> {
        self.0.get()
    }

    /// Assign the identity once.
    ///
    /// Returns `Ok(true)` if the value was stored, `Ok(false)` if the identical
    /// value was already present.
    pub(crate) fn assign(
        &self,
        value: NameAndIndex,
        target: impl FnOnce() -> String,
    ) -> Result<bool, SynthError> {
        let Err(attempted) = self.0.set(value) else {
            return Ok(true);
        };
        match self.0.get() {
            Some(existing) if *existing != attempted => Err(SynthError::NameReassignmentConflict {
                target: target(),
                existing: existing.clone(),
                attempted,
            }),
            _ => Ok(false),
        }
    }
}

/// External name of the shape template with ordinal `index`.
///
/// `<{module}>f__Shape{index}`, with `#{slot}` appended for submissions.
pub fn shape_type_name(index: u32, submission_slot: Option<u32>, module_fragment: &str) -> String {
    match submission_slot {
        Some(slot) => format!("<{module_fragment}>f__Shape{index}#{slot}"),
        None => format!("<{module_fragment}>f__Shape{index}"),
    }
}
