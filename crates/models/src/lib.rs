//! Domain types for AU entries.
//! - `Au` is the persisted record shared by every storage backend.
//! - `AuDraft` is the raw client submission; `AuDraft::validate` turns it into a `NewAu`.

pub mod errors;
pub mod au;

pub use au::{Au, AuDraft, AuId, NewAu};
