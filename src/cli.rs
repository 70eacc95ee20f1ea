use std::path::PathBuf;

use clap::Parser;

use crate::activity::{ActivityLog, Console};
use crate::disposition::{PlayThenDelete, SaveToFile};
use crate::error::Result;
use crate::output::read_text_file;
use crate::params::{
    validate_format, validate_model, validate_options, validate_voice, TtsOptions,
    ValidationError, Voice, DEFAULT_FORMAT, DEFAULT_MODEL, DEFAULT_SPEED, DEFAULT_VOICE,
    LEGACY_VOICES,
};
use crate::speech::SpeechClient;
use crate::tts::{synthesize, SynthesisRequest, SynthesisResult};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const SUPPORTED_VALUES_HELP: &str = "\
Supported voices:
  alloy, ash, coral, echo, fable, onyx, nova, sage, shimmer

Supported models:
  tts-1, tts-1-hd, gpt-4o-mini-tts

Supported formats:
  mp3, opus, aac, flac, wav, pcm";

const CLI_HELP: &str = "\
Examples:
  $ tts-mcp -t \"Hello, world\"
  $ tts-mcp -t \"Hello, world\" -o hello.mp3
  $ tts-mcp -f speech.txt -v nova
  $ tts-mcp -t \"Welcome to the future\" -m tts-1-hd -v echo -s 1.2 --format aac
";

/// CLI tool using OpenAI Text to Speech API
#[derive(Parser, Debug)]
#[command(
    name = "tts-mcp",
    version,
    long_about = None,
    after_help = format!("{CLI_HELP}\n{SUPPORTED_VALUES_HELP}")
)]
pub struct CliArgs {
    /// Input text.
    #[arg(short, long)]
    pub text: Option<String>,

    /// Path to text file.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Path to output audio file (defaults to the output directory).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Model to use.
    #[arg(short, long, default_value_t = DEFAULT_MODEL.to_string())]
    pub model: String,

    /// Voice character.
    #[arg(short, long, default_value_t = DEFAULT_VOICE.to_string())]
    pub voice: String,

    /// Speech speed (0.25-4.0).
    #[arg(short, long, default_value_t = DEFAULT_SPEED, allow_negative_numbers = true)]
    pub speed: f32,

    /// Output format.
    #[arg(long, default_value_t = DEFAULT_FORMAT.to_string())]
    pub format: String,

    /// Additional instructions for speech generation.
    #[arg(short, long)]
    pub instructions: Option<String>,

    /// OpenAI API key (can also be set via the OPENAI_API_KEY environment variable).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL for the OpenAI API endpoint.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Play the audio instead of saving it.
    #[arg(long)]
    pub play: bool,
}

impl CliArgs {
    /// Falls back to `OPENAI_API_KEY` when `--api-key` is not given.
    pub fn into_options(self) -> TtsOptions {
        let api_key = self.api_key.or_else(|| std::env::var(API_KEY_ENV).ok());
        TtsOptions {
            text: self.text,
            file: self.file,
            output: self.output,
            model: Some(self.model),
            voice: Some(self.voice),
            speed: Some(self.speed),
            format: Some(self.format),
            instructions: self.instructions,
            api_key,
            base_url: self.base_url,
            play: self.play,
        }
    }
}

/// Runs one request with the console as activity log.
pub async fn run(options: TtsOptions, client: &dyn SpeechClient) -> Result<SynthesisResult> {
    run_with_log(options, client, &Console).await
}

pub async fn run_with_log(
    options: TtsOptions,
    client: &dyn SpeechClient,
    log: &dyn ActivityLog,
) -> Result<SynthesisResult> {
    validate_options(&options)?;

    let text = match (&options.file, options.text) {
        (Some(file), _) => read_text_file(file).await?,
        (None, Some(text)) => text,
        (None, None) => return Err(ValidationError::MissingText.into()),
    };
    if text.is_empty() {
        return Err(ValidationError::EmptyText.into());
    }

    let request = SynthesisRequest {
        text,
        model: options
            .model
            .as_deref()
            .map_or(DEFAULT_MODEL, validate_model),
        voice: options
            .voice
            .as_deref()
            .map_or(DEFAULT_VOICE, validate_voice),
        speed: options.speed.unwrap_or(DEFAULT_SPEED),
        format: options
            .format
            .as_deref()
            .map_or(DEFAULT_FORMAT, validate_format),
        instructions: options.instructions,
    };
    if let Some(warning) = options
        .voice
        .as_deref()
        .and_then(|voice| voice_warning(voice, request.voice))
    {
        log::warn!("{}", warning);
    }

    let result = if options.play {
        let disposition = PlayThenDelete::with_default_player()?;
        synthesize(client, &request, &disposition, log).await?
    } else {
        let disposition = SaveToFile::new(options.output);
        synthesize(client, &request, &disposition, log).await?
    };

    log.info("Done.").await;
    Ok(result)
}

fn voice_warning(requested: &str, used: Voice) -> Option<String> {
    if requested == used.as_str() {
        None
    } else if LEGACY_VOICES.contains(&requested) {
        Some(format!("voice {requested:?} is no longer offered, using {used}"))
    } else {
        Some(format!("unsupported voice {requested:?}, using {used}"))
    }
}
