//! `keymatch-core` — keyed reconciliation of delimited tabular data.
//!
//! Pure engine crate: loads two keyed collections from delimited sources,
//! compares them by composite key (match, diff, merge), and writes results
//! back out. No CLI dependencies.

pub mod codec;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;

pub use compare::{comparable, diff_records, match_records, merge_records};
pub use config::{JobConfig, Operation};
pub use engine::{run, RunReport};
pub use error::KeymatchError;
pub use model::{ComparisonResult, Key, Keyed, LoadedCollection, Record};
