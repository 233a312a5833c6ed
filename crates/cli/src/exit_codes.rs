//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 3-9     | enrich           | Pull sheet pipeline codes                |
//! | 50-59   | fetch            | Catalog (Scryfall) connector codes       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap emits this itself on parse failures; commands never raise it directly.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Enrich pipeline (3-9)
// =============================================================================

/// Input export is missing required columns.
pub const EXIT_ENRICH_SCHEMA: u8 = 3;

/// Parse error reading the input CSV, set map, or other data file.
pub const EXIT_ENRICH_PARSE: u8 = 4;

/// Invalid run configuration (bad TOML, out-of-range values).
pub const EXIT_ENRICH_CONFIG: u8 = 5;

/// Unreadable input or unwritable output file.
pub const EXIT_ENRICH_IO: u8 = 6;

// =============================================================================
// Fetch / catalog (50-59) — Scryfall connector
// =============================================================================

/// Malformed catalog response (undecodable JSON, unexpected shape).
pub const EXIT_FETCH_VALIDATION: u8 = 52;

/// Upstream error (non-200 status) or network failure.
pub const EXIT_FETCH_UPSTREAM: u8 = 54;
