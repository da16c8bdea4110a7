//! Document storage subsystem
//!
//! The store gives point lookups, filtered scans, and by-id mutations over
//! named collections of JSON documents. The core only ever talks to the
//! [`DataStore`] and [`Collection`] traits; `MemoryStore` is the bundled
//! implementation, which also backs the test suites.

mod collection;
mod errors;
mod memory;

pub use collection::{Collection, DataStore, FindOptions, SortOrder};
pub use errors::{StorageError, StorageResult};
pub use memory::MemoryStore;
