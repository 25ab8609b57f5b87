pub mod memory;

pub use memory::MemoryStore;

#[cfg(feature = "google")]
pub mod google;

#[cfg(feature = "google")]
pub use google::GoogleSheetsStore;
