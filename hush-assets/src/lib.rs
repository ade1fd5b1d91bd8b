//! Offline asset cache for hush - manifest, origins, and SQLite storage

mod cache;
mod manifest;
mod origin;

pub use cache::{AssetCache, CacheError};
pub use manifest::Manifest;
pub use origin::{AssetOrigin, DirOrigin, OriginError};
