//! KITSTORE Client
//!
//! Serves kits anchored in the authority's merkle root. Each [`MerkleStore`]
//! handles one tag: it keeps the root fresh, resolves the hash the root
//! names, and returns the matching kit from memory, the local db, or the
//! server, verifying anything fetched against that hash.

pub mod error;
pub mod http;
pub mod store;
pub mod telemetry;

pub use error::{ClientError, ClientResult};
pub use http::HttpKitTransport;
pub use store::{MerkleStore, StoreDeps, StoreStats};
pub use telemetry::{init_tracing, TelemetryConfig};

pub use kitstore_core::{
    Entry, Kit, KitHash, KitStoreError, KitStoreResult, MerkleRoot, RootHashGetter, StoreConfig,
    TransportConfig,
};
