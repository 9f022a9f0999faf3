//! SSE Frame Decoder
//!
//! Splits an arbitrary byte-chunked SSE stream into complete `data:` frame
//! payloads. Network chunks can cut a frame anywhere, including inside a
//! multi-byte UTF-8 character, so the decoder buffers raw bytes and only
//! converts whole lines; the frames it yields are identical regardless of
//! how the transport sliced the bytes.

/// Prefix marking a data line in the SSE stream.
const DATA_PREFIX: &str = "data: ";

/// Terminal sentinel payload signalling the end of the stream.
const DONE_SENTINEL: &str = "[DONE]";

/// Incremental decoder for `data: <payload>` framed streams.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    finished: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` sentinel has been seen. Once finished, further
    /// input is ignored.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one transport chunk and return every complete frame payload it
    /// unlocked, in arrival order. The sentinel itself is consumed, never
    /// returned.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.finished {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..pos]);
            let line = line.trim_end_matches('\r');

            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                // Blank keep-alives, comments, and non-data fields.
                continue;
            };
            if payload == DONE_SENTINEL {
                self.finished = true;
                self.buffer.clear();
                break;
            }
            frames.push(payload.to_string());
        }
        frames
    }
}
