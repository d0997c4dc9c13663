// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Inbound wire protocol: length-prefixed framing and the event payload
//! grammar.

pub mod event;
pub mod frame;

pub use event::parse_event;
pub use frame::{read_frames, FrameCodec, FrameDecoder, DEFAULT_MAX_FRAME_SIZE};
