//! What happens to synthesized audio once it arrives.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempdir::TempDir;

use crate::activity::ActivityLog;
use crate::error::{Result, TtsError};
use crate::output::{ensure_output_directory, output_path_under, DEFAULT_OUTPUT_DIR};
use crate::params::Format;

#[derive(Clone, Debug, PartialEq)]
pub enum Disposed {
    Saved { path: PathBuf },
    Played { duration: Duration },
}

/// `prepare` runs before the remote call, `dispose` after it.
#[async_trait]
pub trait Disposition: Send + Sync {
    type Target: Send;

    async fn prepare(&self, format: Format) -> Result<Self::Target>;

    async fn dispose(
        &self,
        target: Self::Target,
        audio: Vec<u8>,
        log: &dyn ActivityLog,
    ) -> Result<Disposed>;
}

#[derive(Clone, Debug)]
pub struct SaveToFile {
    output: Option<PathBuf>,
    default_dir: PathBuf,
}

impl SaveToFile {
    /// Writes to `output` if given, else to a generated name under `output/`.
    pub fn new(output: Option<PathBuf>) -> Self {
        Self {
            output,
            default_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    /// Always writes generated names under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output: None,
            default_dir: dir.into(),
        }
    }

    pub fn resolve(&self, format: Format) -> Result<PathBuf> {
        output_path_under(self.output.as_deref(), Some(format), &self.default_dir)
    }
}

#[async_trait]
impl Disposition for SaveToFile {
    type Target = PathBuf;

    async fn prepare(&self, format: Format) -> Result<PathBuf> {
        let path = self.resolve(format)?;
        ensure_output_directory(&path).await?;
        Ok(path)
    }

    async fn dispose(
        &self,
        path: PathBuf,
        audio: Vec<u8>,
        log: &dyn ActivityLog,
    ) -> Result<Disposed> {
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|source| TtsError::WriteOutput {
                path: path.clone(),
                source,
            })?;
        log.info(&format!("Saved audio file: {}", path.display()))
            .await;
        Ok(Disposed::Saved { path })
    }
}

/// Blocking audio output. Returns once playback has finished.
pub trait Player: Send + Sync + 'static {
    fn play(&self, path: &Path) -> Result<Duration>;
}

/// Writes the audio to a temporary file, plays it, then removes the file.
#[derive(Clone)]
pub struct PlayThenDelete {
    player: Arc<dyn Player>,
}

impl PlayThenDelete {
    pub fn new(player: Arc<dyn Player>) -> Self {
        Self { player }
    }

    /// Plays through the system audio output.
    #[cfg(feature = "playback")]
    pub fn with_default_player() -> Result<Self> {
        Ok(Self::new(Arc::new(crate::speaker::Speaker)))
    }

    #[cfg(not(feature = "playback"))]
    pub fn with_default_player() -> Result<Self> {
        Err(TtsError::PlaybackUnavailable)
    }
}

#[async_trait]
impl Disposition for PlayThenDelete {
    type Target = (TempDir, PathBuf);

    async fn prepare(&self, format: Format) -> Result<(TempDir, PathBuf)> {
        let dir = TempDir::new("tts-mcp").map_err(|source| TtsError::CreateDirectory {
            path: std::env::temp_dir(),
            source,
        })?;
        let path = dir.path().join(format!("speech.{}", format.extension()));
        Ok((dir, path))
    }

    async fn dispose(
        &self,
        target: (TempDir, PathBuf),
        audio: Vec<u8>,
        log: &dyn ActivityLog,
    ) -> Result<Disposed> {
        let (dir, path) = target;
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|source| TtsError::WriteOutput {
                path: path.clone(),
                source,
            })?;

        let player = Arc::clone(&self.player);
        let played = tokio::task::spawn_blocking(move || player.play(&path))
            .await
            .map_err(|e| TtsError::Playback(e.to_string()));

        if let Err(e) = dir.close() {
            log::warn!("failed to remove temporary audio file: {}", e);
        }

        let duration = played??;
        log.info(&format!("Played audio ({:.1}s)", duration.as_secs_f64()))
            .await;
        Ok(Disposed::Played { duration })
    }
}
