// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod countdown;
pub mod game;
pub mod logging;
pub mod runtime;

pub use game::{ConfigError, GameConfig, GameSession, GameStatus};
