use crate::core::clock::{format_long, today};
use crate::domain::ports::Clock;
use crate::utils::error::{BotError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of [`LockManager::check_and_acquire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockDecision {
    /// Lock written for today; `previous` holds the date it replaced.
    Proceed { previous: Option<String> },
    /// The bot already ran today.
    AlreadyRanToday { date: String },
    /// The lock file could not be read or written; the run must not start.
    Unavailable { reason: String },
}

impl LockDecision {
    pub fn may_proceed(&self) -> bool {
        matches!(self, LockDecision::Proceed { .. })
    }
}

/// Read-only view of the lock file used by `--status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockStatus {
    pub stored: Option<String>,
    pub today: String,
}

impl LockStatus {
    pub fn ran_today(&self) -> bool {
        self.stored.as_deref() == Some(self.today.as_str())
    }
}

/// Daily run marker. The file holds the long Russian date of the last
/// permitted run and is compared as a plain string.
pub struct LockManager {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl LockManager {
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn today(&self) -> String {
        format_long(&today(self.clock.as_ref()))
    }

    fn io_error(&self, source: std::io::Error) -> BotError {
        BotError::LockIoError {
            path: self.path.display().to_string(),
            source,
        }
    }

    // Bytes that are not UTF-8 never equal a formatted date, so a damaged
    // marker reads as a stale one instead of blocking every run.
    async fn read(&self) -> Result<Option<String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    async fn write_today(&self, today: &str) -> Result<()> {
        tokio::fs::write(&self.path, today)
            .await
            .map_err(|e| self.io_error(e))
    }

    /// Gates the main flow. Any I/O failure other than a missing file blocks
    /// the run.
    pub async fn check_and_acquire(&self) -> LockDecision {
        let today = self.today();

        let previous = match self.read().await {
            Ok(previous) => previous,
            Err(e) => {
                tracing::error!("❌ Failed to read lock file: {}", e);
                return LockDecision::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        if previous.as_deref() == Some(today.as_str()) {
            tracing::warn!(
                "⛔ Already ran today ({}), refusing to post again",
                today
            );
            return LockDecision::AlreadyRanToday { date: today };
        }

        if let Err(e) = self.write_today(&today).await {
            tracing::error!("❌ Failed to write lock file: {}", e);
            return LockDecision::Unavailable {
                reason: e.to_string(),
            };
        }

        match &previous {
            None => tracing::info!("🔒 Lock file created: {}", today),
            Some(old) => tracing::info!("🔒 Lock file updated: {} -> {}", old, today),
        }

        LockDecision::Proceed { previous }
    }

    /// Deletes the lock file and returns what it held. Only a failed delete
    /// is an error; a missing file is not, and unreadable content is logged
    /// before the file is removed anyway.
    pub async fn reset(&self) -> Result<Option<String>> {
        let previous = match self.read().await {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!("⚠️ Could not read lock file before reset: {}", e);
                None
            }
        };

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("ℹ️ Lock file does not exist");
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        }

        match &previous {
            Some(date) => tracing::info!("🔓 Lock reset (was set to: {})", date),
            None => tracing::info!("🔓 Lock reset"),
        }
        Ok(previous)
    }

    pub async fn status(&self) -> Result<LockStatus> {
        Ok(LockStatus {
            stored: self.read().await?,
            today: self.today(),
        })
    }
}
