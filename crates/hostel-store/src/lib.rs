//! Hostel Desk Store
//!
//! Persistence boundary shared by every front end:
//! - [`Store`] traits over chat and hostel records
//! - [`RemoteBackend`]: the hosted REST database, plus [`AuthClient`]
//! - [`Database`]: a local sqlite mirror for offline use and tests
//! - [`ChangeFeed`]: row changes published by both backends

pub mod error;
pub mod feed;
pub mod models;
pub mod remote;
pub mod sqlite;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use feed::{ChangeFeed, ChangeFilter, ChangeKind, ChangeSubscription, RowChange, Table};
pub use models::ChatRecord;
pub use remote::{AuthClient, AuthTokens, AuthUser, RemoteBackend, RemoteConfig, SignUpData};
pub use sqlite::Database;
pub use store::{ChatStore, RecordStore, SharedStore, Store};
