// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Length-prefixed wire framing.
//!
//! Each message on the transport is a `u32` little-endian payload length
//! followed by that many bytes of UTF-8 payload. Framing is stateful and
//! re-entrant: a chunk may carry zero, one or many complete frames, and a
//! partial frame is retained until the bytes that complete it arrive.
//! One decoder instance per connection; an oversized or non-UTF-8 frame
//! is fatal for that connection.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::Decoder;

use crate::errors::ProtocolError;
use crate::observability::messages::protocol::FrameRejected;
use crate::observability::messages::StructuredLog;

/// Default maximum payload length: 1 MiB.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1 << 20;

const HEADER_LEN: usize = 4;

/// [`Decoder`] for the length-prefixed protocol, usable directly with
/// `tokio_util::codec::FramedRead` or through [`FrameDecoder`] when the
/// transport hands over raw chunks.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Decoder for FrameCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if src.len() < HEADER_LEN {
            return Ok(None);
        }

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&src[..HEADER_LEN]);
        let length = u32::from_le_bytes(header) as usize;

        if length > self.max_frame_size {
            FrameRejected {
                size: length,
                max: self.max_frame_size,
            }
            .log();
            return Err(ProtocolError::OversizedFrame {
                size: length,
                max: self.max_frame_size,
            });
        }

        if src.len() < HEADER_LEN + length {
            // Partial frame; ask for the rest in one allocation.
            src.reserve(HEADER_LEN + length - src.len());
            return Ok(None);
        }

        src.advance(HEADER_LEN);
        let payload = src.split_to(length);
        let payload = std::str::from_utf8(&payload)?.to_owned();
        Ok(Some(payload))
    }

    // Truncated input at EOF is a normal no-op, not an error.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        self.decode(buf)
    }
}

/// Chunk-feeding wrapper around [`FrameCodec`] for transports that push
/// byte slices instead of implementing `AsyncRead`. Not thread-safe; one
/// instance per connection.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    codec: FrameCodec,
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codec(codec: FrameCodec) -> Self {
        Self {
            codec,
            buffer: BytesMut::new(),
        }
    }

    /// Appends a chunk and drains every frame it completes. A failure is
    /// fatal for the connection; the decoder should be discarded with it.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, ProtocolError> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(frame) = self.codec.decode(&mut self.buffer)? {
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Bytes buffered towards the next frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Reads a whole transport to EOF and returns its framed payloads.
/// Convenience for tests and one-shot embeddings; long-lived servers
/// should feed chunks to [`FrameDecoder`] as they arrive.
pub async fn read_frames<R>(mut reader: R, mut codec: FrameCodec) -> Result<Vec<String>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(4096);
    let mut frames = Vec::new();

    loop {
        let read = reader.read_buf(&mut buffer).await?;
        while let Some(frame) = codec.decode(&mut buffer)? {
            frames.push(frame);
        }
        if read == 0 {
            return Ok(frames);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: &str) -> Vec<u8> {
        let mut bytes = (payload.len() as u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(payload.as_bytes());
        bytes
    }

    #[test]
    fn single_frame_single_chunk() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&frame("1:l:m")).unwrap();
        assert_eq!(frames, vec!["1:l:m"]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn frame_split_across_chunks() {
        // `07 00 00 00 31 3A 6C` then `3A 6D`
        let mut decoder = FrameDecoder::new();
        let bytes = frame("1:l:m");

        let frames = decoder.feed(&bytes[..7]).unwrap();
        assert!(frames.is_empty());

        let frames = decoder.feed(&bytes[7..]).unwrap();
        assert_eq!(frames, vec!["1:l:m"]);
    }

    #[test]
    fn many_frames_in_one_chunk() {
        let mut bytes = frame("1:a:x");
        bytes.extend_from_slice(&frame("2:b:y"));
        bytes.extend_from_slice(&frame("3:c:z"));

        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&bytes).unwrap();
        assert_eq!(frames, vec!["1:a:x", "2:b:y", "3:c:z"]);
    }

    #[test]
    fn round_trip_at_any_alignment() {
        let payloads = ["1:loc:first", "2:loc:second", "3:loc:", "4:l:multi byte ü"];
        let mut bytes = Vec::new();
        for p in &payloads {
            bytes.extend_from_slice(&frame(p));
        }

        for chunk_size in [1, 2, 3, 5, 7, bytes.len()] {
            let mut decoder = FrameDecoder::new();
            let mut out = Vec::new();
            for chunk in bytes.chunks(chunk_size) {
                out.extend(decoder.feed(chunk).unwrap());
            }
            assert_eq!(out, payloads, "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn oversized_header_is_fatal() {
        // length = 2_097_152 = 2 MiB, twice the default limit
        let mut decoder = FrameDecoder::new();
        let err = decoder.feed(&[0x00, 0x00, 0x20, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::OversizedFrame {
                size: 2_097_152,
                max: DEFAULT_MAX_FRAME_SIZE,
            }
        ));
    }

    #[test]
    fn limit_is_configurable() {
        let mut decoder = FrameDecoder::with_codec(FrameCodec::with_max_frame_size(4));

        let err = decoder.feed(&frame("12345")).unwrap_err();
        assert!(matches!(err, ProtocolError::OversizedFrame { size: 5, max: 4 }));

        let mut decoder = FrameDecoder::with_codec(FrameCodec::with_max_frame_size(4));
        assert_eq!(decoder.feed(&frame("1234")).unwrap(), vec!["1234"]);
    }

    #[test]
    fn non_utf8_payload_is_fatal() {
        let mut bytes = 2u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE]);

        let mut decoder = FrameDecoder::new();
        assert!(matches!(
            decoder.feed(&bytes).unwrap_err(),
            ProtocolError::Payload(_)
        ));
    }

    #[test]
    fn empty_payload_is_a_frame() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&0u32.to_le_bytes()).unwrap();
        assert_eq!(frames, vec![String::new()]);
    }

    #[tokio::test]
    async fn read_frames_drains_a_transport() {
        let mut bytes = frame("1:l:m");
        bytes.extend_from_slice(&frame("2:l:n"));
        // Trailing partial frame: truncated input at EOF is a no-op.
        bytes.extend_from_slice(&9u32.to_le_bytes());
        bytes.extend_from_slice(b"1:l");

        let frames = read_frames(&bytes[..], FrameCodec::new()).await.unwrap();
        assert_eq!(frames, vec!["1:l:m", "2:l:n"]);
    }
}
