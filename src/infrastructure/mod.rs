pub mod http;
pub mod in_memory;
pub mod notify;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
