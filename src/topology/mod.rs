pub mod micro;
pub mod monolith;
pub mod topology;
