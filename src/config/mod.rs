// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine settings, loadable from a YAML file.
//!
//! ```yaml
//! max_frame_size: 1048576
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::protocol::{FrameCodec, DEFAULT_MAX_FRAME_SIZE};

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Maximum inbound frame payload, in bytes. Frames announcing more
    /// are fatal for their connection.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
}

fn default_max_frame_size() -> usize {
    DEFAULT_MAX_FRAME_SIZE
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl EngineSettings {
    /// A frame codec honouring these settings.
    pub fn frame_codec(&self) -> FrameCodec {
        FrameCodec::with_max_frame_size(self.max_frame_size)
    }
}

/// Loads settings from a YAML file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<EngineSettings, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let settings: EngineSettings = serde_yaml::from_str(&content)?;
    Ok(settings)
}
