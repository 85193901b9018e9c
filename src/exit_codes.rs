/// Exit codes for codevalidator
///
/// These exit codes allow users and CI/CD systems to distinguish between
/// failed validations and a run that could not be completed.
/// Success - No validation failure was recorded
pub const SUCCESS: i32 = 0;

/// At least one validation failure was recorded, whether or not it was fixed afterwards
pub const VIOLATIONS_FOUND: i32 = 1;

/// Tool error - Configuration error, unreadable file, or internal error
pub const TOOL_ERROR: i32 = 2;

/// Helper functions for consistent exit behavior
pub mod exit {
    use super::{SUCCESS, TOOL_ERROR, VIOLATIONS_FOUND};

    /// Exit with tool error code (2)
    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR);
    }

    /// Exit with the given code
    pub fn with_code(code: i32) -> ! {
        match code {
            SUCCESS | VIOLATIONS_FOUND => std::process::exit(code),
            _ => tool_error(),
        }
    }
}
