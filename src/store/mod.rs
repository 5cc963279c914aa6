// src/store/mod.rs
// =============================================================================
// The snapshot store.
//
// Submodules:
// - json: the full, lossless snapshot file (export + import)
// - csv: a flattened one-row-per-page summary (export + import)
//
// These are application-level file operations, so they return anyhow errors
// with the offending path attached as context.
// =============================================================================

mod csv;
mod json;

pub use self::csv::{export_csv, import_csv};
pub use self::json::{export_json, import_json};
