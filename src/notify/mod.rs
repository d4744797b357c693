//! Unread-notification plumbing.
//!
//! Badge recounts per viewer role, the polling client that keeps a
//! cached snapshot of them, and the per-item dedup store that stops a
//! desktop notification from firing twice for the same item.

pub mod counts;
pub mod fetch;
pub mod notified;
pub mod poller;
pub mod store;

pub use counts::{unread_counts, unread_counts_or_zero, UnreadCounts};
pub use fetch::{CountsFetcher, FetchError, HttpCountsFetcher};
pub use notified::{NotifiedSet, NotifyChannel, THREAD_KEY_OFFSET};
pub use poller::{CountsPoller, CountsView};
pub use store::{FileKvStore, KvStore, MemoryKvStore};
