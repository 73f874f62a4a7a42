pub mod database;
pub mod metrics;
pub mod node_health;
pub mod request;
