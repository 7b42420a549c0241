pub mod clock_lock;
pub mod name_cache;
