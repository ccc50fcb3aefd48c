//! Backend module.

mod memory;
mod sanity;

pub use memory::MemoryStore;
pub use sanity::SanityStore;
