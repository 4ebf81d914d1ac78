pub mod app;
pub mod buckets;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod score;
pub mod severity;
pub mod state;
pub mod stats;
pub mod storage;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{load_data, LogRepository, LogStore};
