pub mod app;
pub mod calendar;
pub mod cart;
pub mod chat;
pub mod config;
pub mod dday;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod repair;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;
pub mod vision;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{JsonFileStore, Store};
