pub mod clock;
pub mod kv_store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use kv_store::{FileStore, KeyValueStore, MemoryStore};
