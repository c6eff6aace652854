//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                         |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified)                         |
//! | 2    | CLI usage error (bad args)                          |
//! | 3    | Invalid plan (TOML parse or validation failure)     |
//! | 4    | Engine error while running (type mismatch, etc.)    |
//! | 5    | I/O error (cannot read input, cannot write output)  |

use recmatch_engine::MatchError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Plan failed to parse or validate. Nothing was read or run.
pub const EXIT_PLAN_INVALID: u8 = 3;

/// The engine rejected the data mid-run (no output is written).
pub const EXIT_PLAN_RUNTIME: u8 = 4;

/// Input could not be read or output could not be written.
pub const EXIT_IO: u8 = 5;

/// Map an engine error to its exit code.
pub fn match_error_exit_code(err: &MatchError) -> u8 {
    match err {
        MatchError::ConfigParse(_)
        | MatchError::ConfigValidation(_)
        | MatchError::UnknownReference(_)
        | MatchError::InvalidArgument(_) => EXIT_PLAN_INVALID,
        MatchError::TypeMismatch { .. } => EXIT_PLAN_RUNTIME,
        MatchError::Load(_) | MatchError::UnsupportedValue { .. } => EXIT_IO,
    }
}
