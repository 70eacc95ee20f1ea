//! Text-to-speech through the OpenAI speech endpoint, driven either from
//! the command line (`tts-mcp`) or as an MCP tool (`tts-mcp-server`).

pub mod activity;
pub mod cli;
pub mod disposition;
pub mod error;
pub mod output;
pub mod params;
pub mod server;
#[cfg(feature = "playback")]
pub mod speaker;
pub mod speech;
pub mod tts;

#[cfg(test)]
mod test_support;

pub use error::{Result, TtsError};
pub use params::{Format, Model, Voice};
pub use speech::{initialize_client, SpeechClient, SpeechError, SpeechRequest};
pub use tts::{synthesize, SynthesisRequest, SynthesisResult};
