use std::fmt;

/// Error codes for shape synthesis diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E2xxx: Type errors raised while building shape descriptors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Field name used twice in one shape
    E2101,
    /// Field type may not be stored in a shape (void, pointer, restricted)
    E2102,
    /// Field expression has no static type
    E2103,
    /// Shape construction in a context that does not allow it
    E2104,
    /// Field initializer has no name and none can be inferred
    E2105,

    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    /// Get the numeric code as a string (e.g., "E2101").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E2101 => "E2101",
            ErrorCode::E2102 => "E2102",
            ErrorCode::E2103 => "E2103",
            ErrorCode::E2104 => "E2104",
            ErrorCode::E2105 => "E2105",
            ErrorCode::E9001 => "E9001",
        }
    }

    pub fn is_internal(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E2101.to_string(), "E2101");
        assert_eq!(ErrorCode::E2104.as_str(), "E2104");
    }

    #[test]
    fn test_internal_range() {
        assert!(ErrorCode::E9001.is_internal());
        assert!(!ErrorCode::E2103.is_internal());
    }
}
