//! Key-value persistence port.
//!
//! The core never touches a storage mechanism directly: stores load and
//! persist through `KvStore`. The file-backed implementation lives in
//! collective-infra.

pub mod kv_store;
pub mod memory;
