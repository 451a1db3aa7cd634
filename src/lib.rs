pub mod args;
pub mod config;
pub mod database;
pub mod error;
pub mod model;
pub mod processor;
pub mod utils;
