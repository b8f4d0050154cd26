pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod positions;
pub mod services;

pub use error::{CorkboardError, Result};
