use std::path::Path;

use crate::activity::ActivityLog;
use crate::disposition::{Disposed, Disposition};
use crate::error::Result;
use crate::params::{Format, Model, Voice};
use crate::speech::{SpeechClient, SpeechError, SpeechRequest};

/// A fully validated synthesis job.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub model: Model,
    pub voice: Voice,
    pub speed: f32,
    pub format: Format,
    pub instructions: Option<String>,
}

impl SynthesisRequest {
    /// Length in UTF-16 code units, the unit protocol clients count in.
    pub fn text_length(&self) -> usize {
        self.text.encode_utf16().count()
    }

    fn speech_request(&self) -> SpeechRequest {
        SpeechRequest {
            model: self.model,
            input: self.text.clone(),
            voice: self.voice,
            speed: self.speed,
            response_format: self.format,
            instructions: self.instructions.clone().filter(|i| !i.is_empty()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisResult {
    pub disposed: Disposed,
    pub text_length: usize,
}

impl SynthesisResult {
    pub fn file_path(&self) -> Option<&Path> {
        match &self.disposed {
            Disposed::Saved { path } => Some(path),
            Disposed::Played { .. } => None,
        }
    }
}

/// Prepares the destination, calls the API once and hands the audio to
/// `disposition`. The first failure ends the request.
pub async fn synthesize<D: Disposition>(
    client: &dyn SpeechClient,
    request: &SynthesisRequest,
    disposition: &D,
    log: &dyn ActivityLog,
) -> Result<SynthesisResult> {
    let target = disposition.prepare(request.format).await?;

    log.info("Generating speech...").await;
    log::debug!(
        "model={}, voice={}, format={}, speed={}",
        request.model,
        request.voice,
        request.format,
        request.speed
    );

    let audio = match client.synthesize(&request.speech_request()).await {
        Ok(audio) => audio,
        Err(e) => {
            report_speech_error(log, &e).await;
            return Err(e.into());
        }
    };

    let disposed = disposition.dispose(target, audio, log).await?;

    Ok(SynthesisResult {
        disposed,
        text_length: request.text_length(),
    })
}

pub async fn report_speech_error(log: &dyn ActivityLog, error: &SpeechError) {
    match error {
        SpeechError::Api {
            status,
            message,
            kind,
            body,
        } => {
            log.error("OpenAI API error:").await;
            log.error(&format!("- status: {status}")).await;
            log.error(&format!("- message: {message}")).await;
            log.error(&format!("- type: {kind}")).await;
            if !body.is_empty() {
                log.error(&format!("raw response: {body}")).await;
            }
        }
        SpeechError::Request(message) => {
            log.error(&format!("error: {message}")).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disposition::SaveToFile;
    use crate::error::TtsError;
    use crate::test_support::{MemoryLog, MockClient};
    use tempdir::TempDir;

    fn request(text: &str) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            model: Model::Tts1Hd,
            voice: Voice::Echo,
            speed: 1.25,
            format: Format::Mp3,
            instructions: Some("whisper".to_string()),
        }
    }

    #[tokio::test]
    async fn writes_returned_bytes_to_resolved_path() {
        let tmp = TempDir::new("tts-run").unwrap();
        let output = tmp.path().join("speech.mp3");
        let client = MockClient::returning(&[1, 2, 3, 4]);
        let log = MemoryLog::default();

        let result = synthesize(
            &client,
            &request("hello there"),
            &SaveToFile::new(Some(output.clone())),
            &log,
        )
        .await
        .unwrap();

        assert_eq!(result.file_path(), Some(output.as_path()));
        assert_eq!(result.text_length, 11);
        assert_eq!(std::fs::read(&output).unwrap(), vec![1, 2, 3, 4]);

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0],
            SpeechRequest {
                model: Model::Tts1Hd,
                input: "hello there".to_string(),
                voice: Voice::Echo,
                speed: 1.25,
                response_format: Format::Mp3,
                instructions: Some("whisper".to_string()),
            }
        );
        assert_eq!(log.lines()[0], "info: Generating speech...");
    }

    #[tokio::test]
    async fn empty_instructions_are_not_sent() {
        let tmp = TempDir::new("tts-run").unwrap();
        let client = MockClient::returning(&[0]);
        let mut req = request("hi");
        req.instructions = Some(String::new());

        synthesize(
            &client,
            &req,
            &SaveToFile::new(Some(tmp.path().join("a.mp3"))),
            &MemoryLog::default(),
        )
        .await
        .unwrap();

        assert_eq!(client.requests()[0].instructions, None);
    }

    #[test]
    fn text_length_counts_utf16_units() {
        assert_eq!(request("hi").text_length(), 2);
        assert_eq!(request("こんにちは").text_length(), 5);
        assert_eq!(request("🎤").text_length(), 2);
    }

    #[tokio::test]
    async fn structured_error_logs_all_fields() {
        let tmp = TempDir::new("tts-run").unwrap();
        let output = tmp.path().join("speech.mp3");
        let client = MockClient::failing(SpeechError::Api {
            status: 401,
            message: "Incorrect API key provided".to_string(),
            kind: "invalid_request_error".to_string(),
            body: String::new(),
        });
        let log = MemoryLog::default();

        let err = synthesize(&client, &request("hi"), &SaveToFile::new(Some(output.clone())), &log)
            .await
            .unwrap_err();

        assert!(matches!(err, TtsError::Speech(SpeechError::Api { status: 401, .. })));
        assert_eq!(err.to_string(), "OpenAI API error: Incorrect API key provided");
        assert_eq!(
            log.lines(),
            vec![
                "info: Generating speech...",
                "error: OpenAI API error:",
                "error: - status: 401",
                "error: - message: Incorrect API key provided",
                "error: - type: invalid_request_error",
            ]
        );
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn unstructured_error_logs_message_only() {
        let tmp = TempDir::new("tts-run").unwrap();
        let client = MockClient::failing(SpeechError::Request("connection refused".to_string()));
        let log = MemoryLog::default();

        let err = synthesize(
            &client,
            &request("hi"),
            &SaveToFile::new(Some(tmp.path().join("speech.mp3"))),
            &log,
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(
            log.lines(),
            vec!["info: Generating speech...", "error: error: connection refused"]
        );
    }

    #[tokio::test]
    async fn directory_failure_skips_remote_call() {
        let tmp = TempDir::new("tts-run").unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let client = MockClient::returning(&[1]);

        let err = synthesize(
            &client,
            &request("hi"),
            &SaveToFile::new(Some(blocker.join("dir/out.mp3"))),
            &MemoryLog::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TtsError::CreateDirectory { .. }));
        assert!(client.requests().is_empty());
    }
}
