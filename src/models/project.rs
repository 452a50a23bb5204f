// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project document for serialization.
//!
//! This is the on-disk exchange shape shared with the external task
//! loader/saver: geometry is stored in media pixel space with derived
//! bounding boxes, never in viewport space.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::annotation::{BBox, Keypoint};
use super::category::LabelCategory;

fn default_frame_rate() -> f64 {
    24.0
}

fn default_true() -> bool {
    true
}

/// Complete project data for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectData {
    pub media_file: String,
    pub media_width: u32,
    pub media_height: u32,
    /// Zero for still images; a video task otherwise.
    #[serde(default)]
    pub frame_count: u32,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    pub categories: Vec<LabelCategory>,
    /// Whether classification allows multiple category ids at once.
    #[serde(default)]
    pub can_multi: bool,
    #[serde(default)]
    pub classification: Vec<u32>,
    #[serde(default)]
    pub annotations: Vec<StoredAnnotation>,
    #[serde(default)]
    pub tracks: Vec<StoredTrack>,
}

impl ProjectData {
    pub fn new(
        media_file: String,
        media_width: u32,
        media_height: u32,
        categories: Vec<LabelCategory>,
    ) -> Self {
        Self {
            media_file,
            media_width,
            media_height,
            frame_count: 0,
            frame_rate: default_frame_rate(),
            categories,
            can_multi: false,
            classification: Vec::new(),
            annotations: Vec::new(),
            tracks: Vec::new(),
        }
    }

    pub fn is_video(&self) -> bool {
        self.frame_count > 0
    }
}

/// A stored image annotation: media-space polygon plus derived bbox/area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnnotation {
    pub id: Uuid,
    pub category_id: u32,
    pub segmentation: Vec<[f64; 2]>,
    pub bbox: BBox,
    pub area: f64,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// A stored keyframe, media-space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredKeyframe {
    pub frame: u32,
    pub polygon: Vec<[f64; 2]>,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
    pub lerp_after: bool,
}

/// A stored video track: identity plus its keyframe list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTrack {
    pub id: Uuid,
    pub category_id: u32,
    pub keyframes: Vec<StoredKeyframe>,
}
