pub mod api;
pub mod args;
pub mod commands;
mod config;
pub mod error;
pub mod model;
pub mod server;
pub mod storage;
pub mod store;
mod utils;
mod view;


pub use config::Config;
pub use error::Error;
pub use error::Result;
