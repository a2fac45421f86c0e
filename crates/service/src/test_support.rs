#![cfg(test)]
use std::path::PathBuf;

use models::AuDraft;

/// Unique, not-yet-existing JSON file path under the OS temp dir.
pub fn temp_data_file(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_{}.json", prefix, uuid::Uuid::new_v4()))
}

pub fn draft(name: &str) -> AuDraft {
    AuDraft::new(name, "tester", "an alternate universe")
}
