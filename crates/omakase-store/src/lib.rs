//! Tab-scoped key-value storage for Omakase.
//!
//! A "tab" is one [`SessionStore`]: everything written to it lives exactly as
//! long as the store does. Two backends are provided:
//!
//! - [`MemoryStore`] - in-process map, gone when the process exits
//! - [`FileStore`] - one file per key under a session directory, survives a
//!   process restart (the equivalent of a page reload)
//!
//! [`Storage`] layers JSON serialization on top of any backend, and
//! [`SessionIdentity`] hands out the opaque per-tab session token.
//!
//! # Example
//!
//! ```rust,ignore
//! use omakase_store::{MemoryStore, SessionIdentity, Storage};
//!
//! let storage = Storage::new(MemoryStore::new());
//! let identity = SessionIdentity::new(storage.clone());
//!
//! // First call generates and persists, later calls return the same token
//! let token = identity.session_id();
//! assert_eq!(token, identity.session_id());
//!
//! storage.set("carrinho", &vec![1, 2, 3])?;
//! let items: Option<Vec<u32>> = storage.get("carrinho")?;
//! ```

mod error;
mod file;
mod kv;
mod memory;
mod session;

pub use error::StoreError;
pub use file::FileStore;
pub use kv::{SessionStore, Storage};
pub use memory::MemoryStore;
pub use session::{SessionId, SessionIdentity, DEFAULT_SESSION_KEY};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        FileStore, MemoryStore, SessionId, SessionIdentity, SessionStore, Storage, StoreError,
    };
}
