pub mod store;
pub mod service;

pub use service::AuService;
pub use store::AuStore;
