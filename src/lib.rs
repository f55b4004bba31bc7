pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod repository;
pub mod routes;
pub mod utils;

pub use config::Config;
pub use error::AppError;
pub use repository::{AttendanceStore, MemoryStore, MySqlStore};
