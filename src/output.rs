use std::path::{Path, PathBuf};

use crate::error::{Result, TtsError};
use crate::params::Format;

/// Directory (relative to the working directory) for generated file names.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Resolves where the audio file goes. An explicit `output` is used as-is
/// when absolute and joined to the working directory otherwise; without one
/// a `speech_<epoch millis>.<format>` name is generated under `output/`.
pub fn get_output_path(output: Option<&Path>, format: Option<Format>) -> Result<PathBuf> {
    output_path_under(output, format, Path::new(DEFAULT_OUTPUT_DIR))
}

/// [`get_output_path`] with generated names placed under `default_dir`.
pub fn output_path_under(
    output: Option<&Path>,
    format: Option<Format>,
    default_dir: &Path,
) -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(TtsError::CurrentDir)?;
    Ok(output_path_in(output, format, default_dir, &cwd, now_millis()))
}

pub fn output_path_in(
    output: Option<&Path>,
    format: Option<Format>,
    default_dir: &Path,
    cwd: &Path,
    now_millis: i64,
) -> PathBuf {
    if let Some(output) = output {
        return if output.is_absolute() {
            output.to_path_buf()
        } else {
            cwd.join(output)
        };
    }

    let extension = format.map_or("mp3", Format::extension);
    cwd.join(default_dir)
        .join(format!("speech_{now_millis}.{extension}"))
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Creates the parent directory of `path` (and any missing ancestors) unless
/// it is already accessible.
pub async fn ensure_output_directory(path: &Path) -> Result<()> {
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => return Ok(()),
    };

    if tokio::fs::metadata(directory).await.is_ok() {
        return Ok(());
    }

    tokio::fs::create_dir_all(directory)
        .await
        .map_err(|source| TtsError::CreateDirectory {
            path: directory.to_path_buf(),
            source,
        })?;
    log::info!("Created directory: {}", directory.display());

    Ok(())
}

pub async fn read_text_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| TtsError::ReadInput {
            path: path.to_path_buf(),
            source,
        })
}
