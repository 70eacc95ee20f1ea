use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::disposition::Player;
use crate::error::{Result, TtsError};

/// Plays audio files on the default output device.
#[derive(Clone, Copy, Debug, Default)]
pub struct Speaker;

impl Player for Speaker {
    fn play(&self, path: &Path) -> Result<Duration> {
        let (_output_stream, output_stream_handle) =
            rodio::OutputStream::try_default().map_err(playback)?;
        let sink = rodio::Sink::try_new(&output_stream_handle).map_err(playback)?;

        let file = File::open(path).map_err(playback)?;
        sink.append(rodio::Decoder::new(BufReader::new(file)).map_err(playback)?);

        let start_time = Instant::now();
        sink.sleep_until_end();
        let elapsed = start_time.elapsed();
        log::debug!("played {} in {}ms", path.display(), elapsed.as_millis());

        Ok(elapsed)
    }
}

fn playback(e: impl std::fmt::Display) -> TtsError {
    TtsError::Playback(e.to_string())
}
