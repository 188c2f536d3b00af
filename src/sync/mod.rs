//! Import, seed and export operations.
//!
//! - **Seed**: hierarchical sheet payload (seed file, bundled sample or
//!   remote API) → normalized snapshot
//! - **Export**: snapshot → pretty JSON or CSV
//! - **Hashing**: SHA256 content hashing for change detection
//! - **Files**: atomic writes for exports and caches
//!
//! # Example
//!
//! ```ignore
//! use qsheet::sync::{seed_from_file, export_to, ExportFormat};
//!
//! let (snapshot, stats) = seed_from_file(Path::new("sheet.json"))?;
//! store.import_data(snapshot);
//! export_to(store.sheet(), ExportFormat::Csv, Path::new("out.csv"))?;
//! ```

mod export;
mod file;
mod hash;
mod remote;
mod seed;
mod types;

pub use export::{export_to, render, to_csv, to_json, ExportStats, CSV_HEADERS};
pub use file::{atomic_write, file_size, read_json, write_json};
pub use hash::{content_hash, has_changed, hash_bytes};
pub use remote::SheetClient;
pub use seed::{parse_seed, seed_bundled, seed_from_file, transform_raw};
pub use types::{
    ExportFormat, RawEnvelope, RawQuestion, RawQuestionRef, RawSheet, RawSheetConfig,
    RawSheetData, SeedStats, SyncError, SyncResult,
};
