//! SSE Frame Decoding
//!
//! Incremental decoder for server-sent-event response bodies. Body chunks
//! arrive at arbitrary byte boundaries, so the decoder buffers raw bytes
//! until a full line is available and yields one frame per `data:` line.

/// One decoded SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// Payload of a `data:` line
    Data(String),
    /// The literal `[DONE]` terminator
    Done,
}

/// Line-buffered SSE decoder.
///
/// Bytes are converted to text one complete line at a time, so a multi-byte
/// UTF-8 sequence split across two chunks is reassembled before decoding.
/// Blank lines, comment lines, non-`data:` fields, and empty payloads are
/// skipped.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buffer: Vec<u8>,
}

impl SseFrameDecoder {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed one chunk of body bytes; returns every frame it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = vec![];
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = String::from_utf8_lossy(&self.buffer[..line_end])
                .trim_end_matches('\r')
                .to_string();
            self.buffer.drain(..=line_end);

            if line.trim().is_empty() || line.starts_with(':') {
                continue;
            }
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.strip_prefix(' ').unwrap_or(data);
            if data.is_empty() {
                continue;
            }

            if data == "[DONE]" {
                frames.push(SseFrame::Done);
            } else {
                frames.push(SseFrame::Data(data.to_string()));
            }
        }
        frames
    }
}
