//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server crate can prepare the
//! file backend without reaching into `common` directly.

use std::path::Path;

/// Ensure the directory of the JSON data file exists.
pub async fn ensure_data_dir(data_file: &Path) -> anyhow::Result<()> {
    common::env::ensure_data_dir(data_file).await
}
