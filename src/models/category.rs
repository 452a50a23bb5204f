// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label category configuration.
//!
//! Categories are provided by the task loader and fix the annotation kind,
//! color, and (for pose tasks) the keypoint/bone layout of every annotation
//! created under them.

use serde::{Deserialize, Serialize};

use super::annotation::{AnnotationKind, Bone};

/// A label category as delivered by the task configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCategory {
    pub id: u32,
    pub name: String,
    pub kind: AnnotationKind,
    /// RGB stroke color for annotations of this category.
    pub color: [u8; 3],
    /// Keypoint names; empty unless `kind` is `Skeleton`.
    #[serde(default)]
    pub keypoints: Vec<String>,
    /// Bone edges referencing keypoint indices.
    #[serde(default)]
    pub bones: Vec<Bone>,
}

impl LabelCategory {
    pub fn new(id: u32, name: impl Into<String>, kind: AnnotationKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            color: palette_color(id as usize),
            keypoints: Vec::new(),
            bones: Vec::new(),
        }
    }
}

/// Stable per-index palette for category colors.
pub fn palette_color(index: usize) -> [u8; 3] {
    const PALETTE: [[u8; 3]; 10] = [
        [230, 76, 76],   // red
        [76, 175, 80],   // green
        [66, 133, 244],  // blue
        [255, 193, 7],   // amber
        [156, 39, 176],  // purple
        [0, 188, 212],   // cyan
        [255, 112, 67],  // deep orange
        [139, 195, 74],  // light green
        [121, 85, 202],  // violet
        [233, 30, 99],   // pink
    ];
    PALETTE[index % PALETTE.len()]
}
