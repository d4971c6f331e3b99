pub mod health;
pub mod kitchen;
pub mod metrics;
pub mod orders;
pub mod stock;
