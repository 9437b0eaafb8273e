//! Unified error handling for the synchronization engine.
//!
//! - **Error Categories**: how a failure should be surfaced
//! - **Domain-specific Errors**: network and local storage errors
//! - **Unified Error Type**: `SyncError` consolidates them
//! - **Error Context**: operation/peer metadata attached for logging
//! - **Result Type Alias**: `SyncResult<T>`
//!
//! | Category | Raised by | Effect on local state |
//! |----------|-----------|-----------------------|
//! | TransientFetch | feed refresh, history load, lookups | previous state kept |
//! | WriteAck | send, delete | optimistic change kept |
//! | Storage | key/value store | read state treated as empty |
//! | Configuration | `SyncConfig` | startup aborted |
//!
//! A result discarded because a newer request superseded it is *not* an
//! error; see [`crate::chat::LoadOutcome`] and
//! [`crate::notifications::IngestOutcome`].

mod category;
mod context;
mod network;
mod result;
mod storage;
mod sync_error;

pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use network::NetworkError;
pub use result::{ResultExt, SyncResult};
pub use storage::StorageError;
pub use sync_error::SyncError;
