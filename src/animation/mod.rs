pub mod animator;
pub mod handle;
pub mod timing;
