pub mod signal;
pub mod stock;
