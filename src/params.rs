//! Closed parameter sets accepted by the speech endpoint, and the two kinds
//! of validation applied to user input.
//!
//! Voice, model and format are *coerced*: anything outside the set silently
//! becomes the default. Option presence, speed and the base URL are
//! *rejected* with a [`ValidationError`].

use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub const SPEED_RANGE: RangeInclusive<f32> = 0.25..=4.0;
pub const DEFAULT_SPEED: f32 = 1.0;

pub const DEFAULT_VOICE: Voice = Voice::Alloy;
pub const DEFAULT_MODEL: Model = Model::Gpt4oMiniTts;
pub const DEFAULT_FORMAT: Format = Format::Mp3;

/// Older voice names some callers still pass. They are accepted on the
/// command line and coerced like any other unknown voice.
pub const LEGACY_VOICES: [&str; 2] = ["ballad", "verse"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Ash,
    Coral,
    Echo,
    Fable,
    Onyx,
    Nova,
    Sage,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 9] = [
        Voice::Alloy,
        Voice::Ash,
        Voice::Coral,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Sage,
        Voice::Shimmer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Ash => "ash",
            Voice::Coral => "coral",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Sage => "sage",
            Voice::Shimmer => "shimmer",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Model {
    #[serde(rename = "tts-1")]
    Tts1,
    #[serde(rename = "tts-1-hd")]
    Tts1Hd,
    #[serde(rename = "gpt-4o-mini-tts")]
    Gpt4oMiniTts,
}

impl Model {
    pub const ALL: [Model; 3] = [Model::Tts1, Model::Tts1Hd, Model::Gpt4oMiniTts];

    pub fn as_str(self) -> &'static str {
        match self {
            Model::Tts1 => "tts-1",
            Model::Tts1Hd => "tts-1-hd",
            Model::Gpt4oMiniTts => "gpt-4o-mini-tts",
        }
    }
}

/// Output container/codec. The name doubles as the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

impl Format {
    pub const ALL: [Format; 6] = [
        Format::Mp3,
        Format::Opus,
        Format::Aac,
        Format::Flac,
        Format::Wav,
        Format::Pcm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Mp3 => "mp3",
            Format::Opus => "opus",
            Format::Aac => "aac",
            Format::Flac => "flac",
            Format::Wav => "wav",
            Format::Pcm => "pcm",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(Voice, Model, Format);

pub fn validate_voice(voice: &str) -> Voice {
    Voice::ALL
        .into_iter()
        .find(|v| v.as_str() == voice)
        .unwrap_or(DEFAULT_VOICE)
}

pub fn validate_model(model: &str) -> Model {
    Model::ALL
        .into_iter()
        .find(|m| m.as_str() == model)
        .unwrap_or(DEFAULT_MODEL)
}

pub fn validate_format(format: &str) -> Format {
    Format::ALL
        .into_iter()
        .find(|f| f.as_str() == format)
        .unwrap_or(DEFAULT_FORMAT)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Specify either text (-t, --text) or a file (-f, --file).")]
    MissingText,

    #[error("The input text is empty.")]
    EmptyText,

    #[error("Speed (-s, --speed) must be between 0.25 and 4.0, got {0}.")]
    SpeedOutOfRange(f32),

    #[error("Invalid base URL {0:?}. Specify a valid URL (--base-url).")]
    InvalidBaseUrl(String),
}

/// Raw, not yet validated options as collected from the command line.
#[derive(Clone, Debug, Default)]
pub struct TtsOptions {
    pub text: Option<String>,
    pub file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub speed: Option<f32>,
    pub format: Option<String>,
    pub instructions: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub play: bool,
}

pub fn validate_options(options: &TtsOptions) -> Result<(), ValidationError> {
    let has_text = options.text.as_deref().is_some_and(|t| !t.is_empty());
    let has_file = options
        .file
        .as_deref()
        .is_some_and(|f| !f.as_os_str().is_empty());
    if !has_text && !has_file {
        return Err(ValidationError::MissingText);
    }

    if let Some(speed) = options.speed {
        validate_speed(speed)?;
    }

    if let Some(base_url) = options.base_url.as_deref() {
        validate_base_url(base_url)?;
    }

    Ok(())
}

pub fn validate_speed(speed: f32) -> Result<(), ValidationError> {
    // NaN fails `contains`.
    if SPEED_RANGE.contains(&speed) {
        Ok(())
    } else {
        Err(ValidationError::SpeedOutOfRange(speed))
    }
}

pub fn validate_base_url(base_url: &str) -> Result<(), ValidationError> {
    reqwest::Url::parse(base_url)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidBaseUrl(base_url.to_string()))
}
