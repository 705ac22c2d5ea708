//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-4     | Universal        | I/O and parse errors                     |
//! | 10-19   | ai               | Classifier provider/keychain codes       |
//! | 20-29   | catalog          | Catalog build and export codes           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use datacat_engine::EngineError;

// =============================================================================
// Universal (0-4)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Reading or writing a file failed.
pub const EXIT_IO: u8 = 3;

/// An edits file, settings file or catalog workbook could not be parsed.
pub const EXIT_PARSE: u8 = 4;

// =============================================================================
// AI (10-19)
// =============================================================================

/// Classifier disabled (provider=none) and --offline not given.
pub const EXIT_AI_DISABLED: u8 = 10;

/// Classifier provider configured but API key missing.
pub const EXIT_AI_MISSING_KEY: u8 = 11;

// =============================================================================
// Catalog (20-29)
// =============================================================================

/// Export blocked: at least one steward contact is not a valid address.
pub const EXIT_CATALOG_STEWARDS: u8 = 20;

/// None of the inputs produced a readable table.
pub const EXIT_CATALOG_EMPTY: u8 = 21;

/// Map an engine error to its exit code.
pub fn engine_exit_code(err: &EngineError) -> u8 {
    match err {
        EngineError::InvalidStewards(_) => EXIT_CATALOG_STEWARDS,
        EngineError::EditsParse(_) => EXIT_PARSE,
        EngineError::UnknownTable(_) => EXIT_USAGE,
    }
}
