pub mod core;
pub mod error;
pub mod signal;
pub mod spatial;
