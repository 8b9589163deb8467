//! Per-generation configuration.

use std::path::Path;

/// What the emitted output will contain.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum EmitMode {
    /// Definitions and member bodies.
    #[default]
    Full,
    /// Definitions only. No member bodies are generated, so the caches are
    /// never sealed and late requests stay legal.
    MetadataOnly,
}

/// Configuration of one compilation generation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenerationConfig {
    /// File name of the emitted output, e.g. `app.core.dll`.
    pub module_name: String,
    /// Submission slot of an interactive/script unit, if any.
    pub submission_slot: Option<u32>,
    pub emit_mode: EmitMode,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            module_name: String::from("module"),
            submission_slot: None,
            emit_mode: EmitMode::Full,
        }
    }
}

impl GenerationConfig {
    #[must_use]
    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = module_name.into();
        self
    }

    #[must_use]
    pub fn with_submission_slot(mut self, slot: u32) -> Self {
        self.submission_slot = Some(slot);
        self
    }

    #[must_use]
    pub fn with_emit_mode(mut self, emit_mode: EmitMode) -> Self {
        self.emit_mode = emit_mode;
        self
    }

    /// Whether finalization seals the caches.
    pub fn seals_caches(&self) -> bool {
        self.emit_mode == EmitMode::Full
    }

    /// Name-safe fragment identifying the output module.
    ///
    /// The file extension is stripped and every character other than ASCII
    /// alphanumerics and `_` becomes `_`, so types from several modules can be
    /// merged later without colliding.
    pub fn module_fragment(&self) -> String {
        let stem = Path::new(&self.module_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();
        stem.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect()
    }
}
