//! CLI exit code registry.
//!
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 1    | General error (unspecified)                     |
//! | 2    | Usage error (clap's default for bad arguments)  |
//! | 3    | Config parse / validation error                 |
//! | 4    | Source error (missing file, bad key field, ...) |
//! | 5    | Comparison error (arity, unknown merge field)   |
//! | 6    | Output error (schema mismatch, empty result)    |

use keymatch_core::KeymatchError;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_CONFIG: u8 = 3;
pub const EXIT_SOURCE: u8 = 4;
pub const EXIT_COMPARE: u8 = 5;
pub const EXIT_OUTPUT: u8 = 6;

pub fn exit_code_for(err: &KeymatchError) -> u8 {
    match err {
        KeymatchError::ConfigParse(_) | KeymatchError::ConfigValidation(_) => EXIT_CONFIG,
        KeymatchError::SourceNotFound(_)
        | KeymatchError::SourceUnreadable(_)
        | KeymatchError::MissingKeyField { .. } => EXIT_SOURCE,
        KeymatchError::KeyArityMismatch { .. } | KeymatchError::UnknownMergeField { .. } => {
            EXIT_COMPARE
        }
        KeymatchError::SchemaMismatch { .. }
        | KeymatchError::EmptyCollection
        | KeymatchError::EmptyResult => EXIT_OUTPUT,
    }
}
