// --- File: crates/barberbot_store/src/lib.rs ---
pub mod memory;
#[cfg(test)]
mod memory_test;
#[cfg(feature = "redis")]
pub mod redis;
pub mod sweeper;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis::RedisStore;
pub use sweeper::spawn_sweeper;
