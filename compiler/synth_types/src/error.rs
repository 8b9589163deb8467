//! Internal error types.
//!
//! User mistakes never surface here: they become [`Diagnostic`]s while
//! descriptors are built. A [`SynthError`] means the engine or its caller broke
//! a contract, and compilation should abort.

use synth_diagnostic::{Diagnostic, ErrorCode};

use crate::generation::GenerationId;
use crate::naming::NameAndIndex;

/// Fatal internal-consistency failures.
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    /// A template already carries a different name/index.
    #[error("{target} is already named {existing}, refusing to rename it to {attempted}")]
    NameReassignmentConflict {
        target: String,
        existing: NameAndIndex,
        attempted: NameAndIndex,
    },

    /// A new key arrived after finalization sealed the caches.
    #[error("{kind} `{key}` was requested after synthesized types were sealed")]
    InsertAfterSeal { kind: &'static str, key: String },

    /// Instantiation with the wrong number of type arguments.
    #[error("shape `{key}` takes {expected} type argument(s), got {found}")]
    ArityMismatch {
        key: String,
        expected: usize,
        found: usize,
    },

    /// Finalization ran a second time for the same generation.
    #[error("generation {generation} has already been finalized")]
    AlreadyFinalized { generation: GenerationId },

    /// A generation was derived from a predecessor that was never finalized.
    #[error("cannot derive a generation from {generation} before it is finalized")]
    UnfinalizedPredecessor { generation: GenerationId },
}

impl SynthError {
    /// Report this failure as an internal compiler error.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(ErrorCode::E9001)
            .with_message(format!("internal compiler error: {self}"))
            .with_note("this is a bug in the compiler, not in the program being compiled")
    }
}

/// Failures reading or writing the persisted identity map.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to encode shape identity map: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode shape identity map: {0}")]
    Decode(#[source] bincode::Error),

    #[error("shape identity map I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
