//! Persisted shape identity map.
//!
//! The map records every named shape of an output together with the counter
//! state, so a later generation compiled from scratch (no in-memory
//! predecessor) can keep the same names and continue numbering. Encoded with
//! `bincode`; shape keys travel in their canonical string form.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::finalize::NumberingState;
use crate::naming::NameAndIndex;
use crate::shape_key::ShapeKey;
use crate::PersistError;

/// `ShapeKey → NameAndIndex` plus the counters to continue from.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EmittedShapeMap {
    entries: BTreeMap<ShapeKey, NameAndIndex>,
    numbering: NumberingState,
}

impl EmittedShapeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `identity` for `key`, returning the identity it replaced.
    pub fn insert(&mut self, key: ShapeKey, identity: NameAndIndex) -> Option<NameAndIndex> {
        self.entries.insert(key, identity)
    }

    pub fn get(&self, key: &ShapeKey) -> Option<&NameAndIndex> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ShapeKey, &NameAndIndex)> {
        self.entries.iter()
    }

    pub fn numbering(&self) -> NumberingState {
        self.numbering
    }

    pub fn next_shape_index(&self) -> u32 {
        self.numbering.next_shape_index
    }

    pub fn next_delegate_index(&self) -> u32 {
        self.numbering.next_delegate_index
    }

    pub(crate) fn set_numbering(&mut self, numbering: NumberingState) {
        self.numbering = numbering;
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        bincode::serialize(self).map_err(PersistError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        bincode::deserialize(bytes).map_err(PersistError::Decode)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), PersistError> {
        bincode::serialize_into(writer, self).map_err(PersistError::Encode)
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self, PersistError> {
        bincode::deserialize_from(reader).map_err(PersistError::Decode)
    }

    /// Write the map to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        tracing::debug!(path = %path.display(), entries = self.len(), "saved shape identity map");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, PersistError> {
        let map = Self::read_from(BufReader::new(File::open(path)?))?;
        tracing::debug!(path = %path.display(), entries = map.len(), "loaded shape identity map");
        Ok(map)
    }
}
