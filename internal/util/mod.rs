pub mod config;
pub mod http;
pub mod shutdown;
pub mod usage;
