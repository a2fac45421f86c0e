//! Service layer for AU entries.
//! - `aus`: the `AuStore` trait and the `AuService` façade used by handlers.
//! - `file` / `mongo`: the two interchangeable `AuStore` backends.
//! - `auth`: the shared-secret gate for deletes.

pub mod errors;
pub mod auth;
pub mod aus;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
pub mod storage;
pub mod file;
#[cfg(feature = "mongodb")]
pub mod mongo;
