//! `pullsheet-enrich`: card-list enrichment engine.
//!
//! Pure engine crate: receives pre-loaded table text and an injected card
//! catalog, returns the enriched table and run counters. No CLI, filesystem
//! or HTTP dependencies.

pub mod card;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod foil;
pub mod progress;
pub mod setmap;
pub mod table;

pub use card::{normalize_collector_number, CardCatalog, CatalogCard, Lookup};
pub use color::{classify, Color};
pub use config::EnrichConfig;
pub use engine::{run, EnrichOutcome, RunReport};
pub use error::EnrichError;
pub use progress::{NullProgress, Progress};
pub use setmap::{consolidate, merge, MergeOutcome, SetCodeMap, SetConflict, SetEntry};
pub use table::Table;
