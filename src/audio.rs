//! Generated audio storage
//!
//! Synthesized prompts are written as `{uuid}.mp3` into a single directory
//! and served back under `/audio/`. A background sweeper deletes files older
//! than the configured TTL.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::{Error, Result};

/// Extension of every generated file
const AUDIO_EXTENSION: &str = "mp3";

/// Directory of generated prompt audio
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Public URL for a stored file name
    #[must_use]
    pub fn url_for(file_name: &str) -> String {
        format!("/audio/{file_name}")
    }

    /// Persist audio under a fresh unique name, creating the directory if needed
    ///
    /// Returns the file name (not the full path).
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written
    pub async fn save(&self, audio: &[u8]) -> Result<String> {
        if audio.is_empty() {
            return Err(Error::AudioStore("refusing to store empty audio".to_string()));
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = format!("{}.{AUDIO_EXTENSION}", uuid::Uuid::new_v4());
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, audio).await?;

        tracing::info!(path = %path.display(), bytes = audio.len(), "audio file saved");
        Ok(file_name)
    }

    /// Delete generated files older than `ttl`
    ///
    /// Returns how many files were removed. A missing directory counts as empty.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be listed
    pub async fn sweep_expired(&self, ttl: Duration) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let now = SystemTime::now();
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(AUDIO_EXTENSION) {
                continue;
            }

            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            let age = metadata
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or_default();
            if age <= ttl {
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove expired audio");
                }
            }
        }

        if removed > 0 {
            tracing::info!(removed, dir = %self.dir.display(), "swept expired audio");
        }
        Ok(removed)
    }

    /// Run [`Self::sweep_expired`] every `interval` until the task is aborted
    #[must_use]
    pub fn spawn_sweeper(self, ttl: Duration, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep_expired(ttl).await {
                    tracing::warn!(error = %e, "audio sweep failed");
                }
            }
        })
    }
}
