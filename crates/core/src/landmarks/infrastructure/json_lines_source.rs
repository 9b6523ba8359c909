use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Stdin};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::landmarks::domain::capture_error::CaptureError;
use crate::landmarks::domain::landmark_source::{LandmarkSource, SourceEvent};
use crate::shared::landmark_frame::{LandmarkFrame, LandmarkId, Point};

/// One line of the replay format.
///
/// ```json
/// {"timestamp": 0.033, "confidence": 0.92,
///  "landmarks": {"left_eyebrow": {"x": 0.41, "y": 0.31}, ...}}
/// ```
#[derive(Deserialize)]
struct WireFrame {
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    landmarks: BTreeMap<String, Point>,
}

/// Replays landmark frames from newline-delimited JSON.
///
/// Each line is one detection cycle. `null`, `{}` or a frame without
/// landmarks means no face was detected. A line equal to the quit key,
/// or end of input, ends the stream. Lines that fail to decode are logged
/// and treated as a cycle without a face.
pub struct JsonLinesSource<R: BufRead + Send> {
    reader: R,
    min_confidence: f64,
    quit_key: String,
    line: String,
    line_number: usize,
}

impl<R: BufRead + Send> JsonLinesSource<R> {
    pub fn new(reader: R, min_confidence: f64, quit_key: &str) -> Self {
        Self {
            reader,
            min_confidence,
            quit_key: quit_key.to_string(),
            line: String::new(),
            line_number: 0,
        }
    }

    fn decode(&self, text: &str) -> SourceEvent {
        let wire: Option<WireFrame> = match serde_json::from_str(text) {
            Ok(w) => w,
            Err(e) => {
                log::warn!("Skipping undecodable landmark line {}: {e}", self.line_number);
                return SourceEvent::NoFace;
            }
        };
        let Some(wire) = wire else {
            return SourceEvent::NoFace;
        };

        if let Some(confidence) = wire.confidence {
            if confidence < self.min_confidence {
                log::debug!(
                    "Frame {} below detection confidence ({confidence:.2} < {:.2})",
                    self.line_number,
                    self.min_confidence
                );
                return SourceEvent::NoFace;
            }
        }

        let mut points = Vec::with_capacity(wire.landmarks.len());
        for (name, point) in wire.landmarks {
            match LandmarkId::from_name(&name) {
                Some(id) => points.push((id, point)),
                None => log::trace!("Ignoring unknown landmark '{name}'"),
            }
        }
        if points.is_empty() {
            return SourceEvent::NoFace;
        }

        let mut frame = LandmarkFrame::new(points);
        if let Some(ts) = wire.timestamp.and_then(|s| Duration::try_from_secs_f64(s).ok()) {
            frame = frame.with_timestamp(ts);
        }
        SourceEvent::Face(frame)
    }
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(path: &Path, min_confidence: f64, quit_key: &str) -> Result<Self, CaptureError> {
        let file = File::open(path).map_err(|source| CaptureError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), min_confidence, quit_key))
    }
}

impl JsonLinesSource<BufReader<Stdin>> {
    pub fn stdin(min_confidence: f64, quit_key: &str) -> Self {
        Self::new(BufReader::new(std::io::stdin()), min_confidence, quit_key)
    }
}

impl<R: BufRead + Send> LandmarkSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<SourceEvent, CaptureError> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .map_err(CaptureError::Read)?;
            if read == 0 {
                return Ok(SourceEvent::Quit);
            }
            self.line_number += 1;

            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            if text == self.quit_key {
                return Ok(SourceEvent::Quit);
            }
            return Ok(self.decode(text));
        }
    }
}
