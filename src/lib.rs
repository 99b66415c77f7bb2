pub mod app;
pub mod config;
pub mod date_range;
pub mod errors;
pub mod fetcher;
pub mod handlers;
pub mod models;
pub mod state;
pub mod table;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
