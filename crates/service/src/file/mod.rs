pub mod au_store;

pub use au_store::FileAuStore;
