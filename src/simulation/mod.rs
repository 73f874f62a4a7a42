pub mod capacity;
pub mod config;
pub mod control;
pub mod engine;
pub mod random;
