//! # pagevault Store
//!
//! Storage seams for pagevault. The engine talks to five narrow traits:
//!
//! - [`RecordStore`] - the provisioned users/roles/ACL documents
//! - [`ResourceFetcher`] - encrypted resource blobs from the origin
//! - [`ResourceCache`] - decrypted fragment bodies, filled at login
//! - [`SessionStore`] - the single active session
//! - [`DocumentCache`] - raw protected documents, for offline refresh
//!
//! [`SqliteStore`] implements the three local seams against one database
//! file. The `Memory*` types implement every seam in memory for tests.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::{MemoryCache, MemoryDocuments, MemoryFetcher, MemoryRecords, MemorySessions};
pub use sqlite::SqliteStore;
pub use traits::{DocumentCache, RecordStore, ResourceCache, ResourceFetcher, SessionStore};
