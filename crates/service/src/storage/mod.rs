//! Storage abstractions for service layer
//!
//! Contains the reusable file-backed collection store used by the file backend.

pub mod json_vec_store;
