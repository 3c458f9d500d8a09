pub mod config;
pub mod error;
pub mod db;
pub mod providers;
pub mod services;
pub mod api;
pub mod scheduler;

pub use config::Config;
pub use error::{ AppError, Result };
