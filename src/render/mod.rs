pub mod display;
pub mod frames;
pub mod layer;
