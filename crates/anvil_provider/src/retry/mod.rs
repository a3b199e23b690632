pub mod backoff;
pub mod executor;
