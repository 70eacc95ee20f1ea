use std::path::PathBuf;

use thiserror::Error;

use crate::params::ValidationError;
use crate::speech::SpeechError;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("OpenAI API key is not set. Pass --api-key or set the OPENAI_API_KEY environment variable.")]
    MissingApiKey,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to read input file {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write audio file {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to resolve the current directory: {0}")]
    CurrentDir(std::io::Error),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error("playback failed: {0}")]
    Playback(String),

    #[error("audio playback is not available in this build (enable the `playback` feature)")]
    PlaybackUnavailable,
}

pub type Result<T> = std::result::Result<T, TtsError>;
