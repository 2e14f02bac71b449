pub mod config;
pub mod exchange;
pub mod logging;
pub mod orders;
pub mod types;
pub mod validation;
