//! MCP server exposing a single `text-to-speech` tool over stdio.
//!
//! The tool call supplies text, speed and instructions; model, voice, format,
//! credentials and the output directory come from the [`ServerConfig`] fixed
//! at startup. Pipeline failures become `isError` results so the server keeps
//! running; only malformed arguments are rejected at the protocol level.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorData as McpError, Implementation,
        JsonObject, ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    transport::stdio,
    RoleServer, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::activity::{ActivityLog, LogFile, DEFAULT_LOG_FILE};
use crate::cli::{API_KEY_ENV, SUPPORTED_VALUES_HELP};
use crate::disposition::SaveToFile;
use crate::error::{Result, TtsError};
use crate::output::DEFAULT_OUTPUT_DIR;
use crate::params::{
    validate_base_url, validate_format, validate_model, validate_speed, validate_voice, Format,
    Model, Voice, DEFAULT_FORMAT, DEFAULT_MODEL, DEFAULT_SPEED, DEFAULT_VOICE,
};
use crate::speech::{initialize_client, SpeechClient};
use crate::tts::{synthesize, SynthesisRequest, SynthesisResult};

pub const SERVER_NAME: &str = "tts-mcp";
pub const TOOL_NAME: &str = "text-to-speech";
const TOOL_DESCRIPTION: &str =
    "Converts text to speech using OpenAI's TTS API and saves it to a file";

/// Generated files land here, below the working directory.
pub const SERVER_OUTPUT_SUBDIR: &str = "openai-tts-mcp";

const REMEDY: &str =
    "Remedy: check your OpenAI API key, the text content, or try a different voice or model.";

const SERVER_HELP: &str = "\
Examples:
  $ tts-mcp-server
  $ tts-mcp-server --model tts-1 --voice nova --format mp3
  $ tts-mcp-server --voice echo
";

/// OpenAI Text to Speech MCP Server
#[derive(Parser, Debug)]
#[command(
    name = "tts-mcp-server",
    version,
    long_about = None,
    after_help = format!("{SERVER_HELP}\n{SUPPORTED_VALUES_HELP}")
)]
pub struct ServerArgs {
    /// TTS model to use.
    #[arg(short, long, default_value_t = DEFAULT_MODEL.to_string())]
    pub model: String,

    /// Voice character.
    #[arg(short, long, default_value_t = DEFAULT_VOICE.to_string())]
    pub voice: String,

    /// Audio format.
    #[arg(short, long, default_value_t = DEFAULT_FORMAT.to_string())]
    pub format: String,

    /// OpenAI API key (can also be set via the OPENAI_API_KEY environment variable).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL for the OpenAI API endpoint.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Log file path [default: ./tts-mcp.log].
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Directory for generated audio files [default: ./output/openai-tts-mcp].
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl ServerArgs {
    pub fn into_config(self) -> Result<ServerConfig> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
            .ok_or(TtsError::MissingApiKey)?;

        if let Some(base_url) = self.base_url.as_deref() {
            validate_base_url(base_url)?;
        }

        let cwd = std::env::current_dir().map_err(TtsError::CurrentDir)?;
        Ok(ServerConfig {
            model: validate_model(&self.model),
            voice: validate_voice(&self.voice),
            format: validate_format(&self.format),
            api_key,
            base_url: self.base_url,
            log_file: cwd.join(self.log_file.unwrap_or_else(|| DEFAULT_LOG_FILE.into())),
            output_dir: cwd.join(self.output_dir.unwrap_or_else(|| {
                PathBuf::from(DEFAULT_OUTPUT_DIR).join(SERVER_OUTPUT_SUBDIR)
            })),
        })
    }
}

/// Settings fixed for the lifetime of one server process.
#[derive(Clone)]
pub struct ServerConfig {
    pub model: Model,
    pub voice: Voice,
    pub format: Format,
    pub api_key: String,
    pub base_url: Option<String>,
    pub log_file: PathBuf,
    pub output_dir: PathBuf,
}

impl ServerConfig {
    pub fn summary(&self) -> String {
        format!(
            "model={}, voice={}, format={}",
            self.model, self.voice, self.format
        )
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TextToSpeechParams {
    pub text: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default)]
    pub instructions: Option<String>,
}

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

/// Checks tool arguments against the declared schema.
pub fn parse_arguments(arguments: Option<JsonObject>) -> std::result::Result<TextToSpeechParams, McpError> {
    let arguments = Value::Object(arguments.unwrap_or_default());
    let params: TextToSpeechParams = serde_json::from_value(arguments)
        .map_err(|e| McpError::invalid_params(format!("invalid arguments: {e}"), None))?;
    validate_speed(params.speed).map_err(|e| McpError::invalid_params(e.to_string(), None))?;
    Ok(params)
}

fn check_tool_name(name: &str) -> std::result::Result<(), McpError> {
    if name == TOOL_NAME {
        Ok(())
    } else {
        Err(McpError::invalid_params(format!("unknown tool: {name}"), None))
    }
}

pub fn text_to_speech_tool() -> Tool {
    let schema = json!({
        "type": "object",
        "properties": {
            "text": {
                "type": "string",
                "description": "The text content to be converted to speech"
            },
            "speed": {
                "type": "number",
                "minimum": 0.25,
                "maximum": 4.0,
                "default": 1.0,
                "description": "Speech speed factor (0.25 to 4.0, default: 1.0)"
            },
            "instructions": {
                "type": "string",
                "description": "Optional instructions to guide the speech generation (e.g. emotions, style)"
            }
        },
        "required": ["text"]
    });
    let schema = match schema {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    Tool::new(TOOL_NAME, TOOL_DESCRIPTION, Arc::new(schema))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SaveMetadata {
    pub file_path: String,
    pub text_length: usize,
}

/// Result of one tool call before it is wrapped for the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolOutcome {
    pub is_error: bool,
    pub messages: Vec<String>,
    pub metadata: Option<SaveMetadata>,
}

impl ToolOutcome {
    fn saved(result: &SynthesisResult) -> Self {
        let file_path = result
            .file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Self {
            is_error: false,
            messages: vec![format!("Saved audio file: {file_path}")],
            metadata: Some(SaveMetadata {
                file_path,
                text_length: result.text_length,
            }),
        }
    }

    fn failed(error: &TtsError) -> Self {
        Self {
            is_error: true,
            messages: vec![
                "Error: failed to generate or save speech".to_string(),
                format!("Details: {error}"),
                REMEDY.to_string(),
            ],
            metadata: None,
        }
    }
}

impl From<ToolOutcome> for CallToolResult {
    fn from(outcome: ToolOutcome) -> Self {
        let mut content: Vec<Content> = outcome.messages.into_iter().map(Content::text).collect();
        if let Some(metadata) = &outcome.metadata {
            match serde_json::to_string(metadata) {
                Ok(json) => content.push(Content::text(json)),
                Err(e) => log::warn!("failed to encode tool metadata: {}", e),
            }
        }

        if outcome.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

#[derive(Clone)]
pub struct TtsServer {
    config: Arc<ServerConfig>,
    client: Arc<dyn SpeechClient>,
    log: LogFile,
}

impl TtsServer {
    pub fn new(config: ServerConfig, client: Arc<dyn SpeechClient>) -> Self {
        let log = LogFile::new(&config.log_file);
        Self {
            config: Arc::new(config),
            client,
            log,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    async fn log_startup(&self) {
        self.log.append("---------------------------------------").await;
        self.log.append("Initializing MCP server...").await;
        self.log
            .append(&format!("Settings: {}", self.config.summary()))
            .await;
    }

    /// Runs the synthesis pipeline for one tool call.
    pub async fn text_to_speech(&self, params: TextToSpeechParams) -> ToolOutcome {
        let request = SynthesisRequest {
            text: params.text,
            model: self.config.model,
            voice: self.config.voice,
            speed: params.speed,
            format: self.config.format,
            instructions: params.instructions,
        };
        let disposition = SaveToFile::in_dir(&self.config.output_dir);

        match synthesize(self.client.as_ref(), &request, &disposition, &self.log).await {
            Ok(result) => ToolOutcome::saved(&result),
            Err(e) => {
                // Remote failures were already reported by the pipeline.
                if !matches!(e, TtsError::Speech(_)) {
                    self.log.error(&format!("error: {e}")).await;
                }
                ToolOutcome::failed(&e)
            }
        }
    }
}

impl ServerHandler for TtsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Use the text-to-speech tool to turn text into an audio file with OpenAI's TTS API."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: vec![text_to_speech_tool()],
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        check_tool_name(&request.name)?;
        let params = parse_arguments(request.arguments)?;
        Ok(self.text_to_speech(params).await.into())
    }
}

/// Serves on stdio until the client closes the transport.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    eprintln!("{}", config.summary());

    let client = initialize_client(Some(config.api_key.as_str()), config.base_url.as_deref())?;
    let server = TtsServer::new(config, Arc::new(client));
    server.log_startup().await;

    let service = match server.clone().serve(stdio()).await {
        Ok(service) => service,
        Err(e) => {
            let message = format!("MCP server startup error: {e:?}");
            server.log.append(&message).await;
            return Err(anyhow::anyhow!(message));
        }
    };
    server.log.append("MCP server started").await;
    log::info!("serving {} on stdio", TOOL_NAME);

    let reason = service.waiting().await?;
    server
        .log
        .append(&format!("MCP server stopped: {reason:?}"))
        .await;

    Ok(())
}
