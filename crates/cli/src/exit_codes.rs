//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts rely on them; do not renumber.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | Usage error (bad arguments, invalid value)       |
//! | 3    | No food group selected                           |
//! | 4    | Catalog could not be parsed or failed validation |
//! | 5    | Food table missing, unreadable or malformed      |
//! | 6    | History log could not be read or written        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, out-of-range values.
pub const EXIT_USAGE: u8 = 2;

/// `recommend` was given no non-blank `--group`.
pub const EXIT_NO_GROUP: u8 = 3;

/// Catalog TOML failed to parse or validate.
pub const EXIT_CATALOG: u8 = 4;

/// Food table could not be read or lacks a required column.
pub const EXIT_DATA: u8 = 5;

/// History directory or a goal log could not be read or written.
pub const EXIT_HISTORY: u8 = 6;
