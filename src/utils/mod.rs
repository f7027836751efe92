pub mod console;
pub mod process;

use std::path::PathBuf;
use which::which;

use crate::errors::{AppError, Result};

/// Finds an executable in the system PATH. Names containing a path separator
/// are checked as given.
pub fn find_executable(program: &str) -> Result<PathBuf> {
    which(program).map_err(|e| AppError::Command {
        program: program.to_string(),
        reason: format!("executable not found in PATH ({}). Please ensure it is installed and in your PATH.", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_executable_missing() {
        let err = find_executable("dbrestore-no-such-program").unwrap_err();
        assert!(matches!(err, AppError::Command { .. }));
        assert!(!err.is_invalid_input());
    }
}
