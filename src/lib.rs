pub mod api;
pub mod args;
pub mod commands;
mod config;
pub mod earnings;
mod error;
pub mod model;
pub mod refresh;
pub mod snapshot;
pub mod table;
mod utils;


pub use api::Mode;
pub use config::Config;
pub use error::Error;
pub use error::Result;
