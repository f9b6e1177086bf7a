pub mod app;
pub mod codec;
pub mod config;
pub mod debounce;
pub mod errors;
pub mod gate;
pub mod gist;
pub mod handlers;
pub mod models;
pub mod recurring;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{LoadedRecord, RecordStore, StorageMode};
