//! Service layer modules for external integrations and shared writes.
//!
//! Clients for the completion provider, Redis cache and export renderer,
//! plus the versioning store and the fire-and-forget usage recorder.

pub mod cache;
pub mod completion;
pub mod exportador;
pub mod uso;
pub mod versoes;

pub use cache::RedisCache;
pub use completion::CompletionGateway;
pub use exportador::ExportadorClient;
