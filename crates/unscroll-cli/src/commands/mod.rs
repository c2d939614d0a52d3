pub mod config;
pub mod monitor;
pub mod schedule;
pub mod session;
pub mod target;
