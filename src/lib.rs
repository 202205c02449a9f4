pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::Cli;

pub use crate::config::BotConfig;
pub use crate::core::{
    bot::{BirthdayBot, RunReport},
    clock::{FixedClock, SystemClock},
    images::ImageProvider,
    lock::{LockDecision, LockManager, LockStatus},
};
pub use crate::utils::error::{BotError, Result};
