pub mod cli;
pub mod config;
pub mod error;
pub mod exchange;
pub mod model;
pub mod research;
pub mod schema;
