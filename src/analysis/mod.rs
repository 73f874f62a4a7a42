pub mod summary;
pub mod trend;
