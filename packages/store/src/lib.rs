//! Client-side persistence and configuration for CafeLocate.
//!
//! Everything the browser keeps between page loads goes through a
//! [`KeyValueStore`]. The session layer is the only writer; the key names it
//! uses live in [`keys`].

pub mod config;
pub mod keys;
pub mod kv;

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod local;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use local::LocalStore;

pub use config::{ClientConfig, ConfigError};
pub use kv::{KeyValueStore, StoreError};
