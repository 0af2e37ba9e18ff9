pub mod engine;
pub mod error;
pub mod grid;
pub mod placer;
