// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video annotation tracks.
//!
//! A track carries an annotation's identity across frames through a sparse,
//! sorted keyframe list. The per-frame `polygon`/`keypoints` fields are a
//! cache recomputed on every frame tick and are never persisted.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::annotation::{AnnotationKind, Keypoint, Point};
use crate::engine::interpolate;

/// Caller/data errors at the keyframe loading and insertion boundary.
/// These fail fast instead of being silently tolerated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackError {
    #[error("a keyframe at frame {0} already exists")]
    DuplicateFrame(u32),
    #[error("keyframes are not sorted ascending by frame")]
    Unsorted,
    #[error(
        "keyframe geometry mismatch: track has {expected_vertices} vertices / \
         {expected_keypoints} keypoints, keyframe has {vertices} / {keypoints}"
    )]
    GeometryMismatch {
        expected_vertices: usize,
        expected_keypoints: usize,
        vertices: usize,
        keypoints: usize,
    },
}

/// An authored geometry sample at one frame. `lerp_after` says whether the
/// interval to the next keyframe is interpolated or held/absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: u32,
    pub polygon: Vec<Point>,
    pub keypoints: Vec<Keypoint>,
    pub lerp_after: bool,
}

/// A video annotation track: identity plus its full keyframe sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationTrack {
    pub id: Uuid,
    pub category_id: u32,
    pub kind: AnnotationKind,
    /// Sorted ascending, unique by frame.
    pub keyframes: Vec<Keyframe>,
    /// Geometry displayed at the current frame. Cache only.
    #[serde(skip, default)]
    pub polygon: Vec<Point>,
    #[serde(skip, default)]
    pub keypoints: Vec<Keypoint>,
}

impl AnnotationTrack {
    pub fn new(id: Uuid, category_id: u32, kind: AnnotationKind) -> Self {
        Self {
            id,
            category_id,
            kind,
            keyframes: Vec::new(),
            polygon: Vec::new(),
            keypoints: Vec::new(),
        }
    }

    /// Validate and adopt a loaded keyframe list.
    pub fn from_keyframes(
        id: Uuid,
        category_id: u32,
        kind: AnnotationKind,
        keyframes: Vec<Keyframe>,
    ) -> Result<Self, TrackError> {
        let mut track = Self::new(id, category_id, kind);
        for window in keyframes.windows(2) {
            if window[1].frame < window[0].frame {
                return Err(TrackError::Unsorted);
            }
        }
        for kf in keyframes {
            track.insert_keyframe(kf)?;
        }
        Ok(track)
    }

    /// Insert a keyframe keeping the list sorted and unique by frame.
    ///
    /// Rejects duplicate frames and geometry whose vertex/keypoint counts
    /// differ from the track's existing keyframes.
    pub fn insert_keyframe(&mut self, kf: Keyframe) -> Result<(), TrackError> {
        if let Some(existing) = self.keyframes.first() {
            if existing.polygon.len() != kf.polygon.len()
                || existing.keypoints.len() != kf.keypoints.len()
            {
                return Err(TrackError::GeometryMismatch {
                    expected_vertices: existing.polygon.len(),
                    expected_keypoints: existing.keypoints.len(),
                    vertices: kf.polygon.len(),
                    keypoints: kf.keypoints.len(),
                });
            }
        }
        match self.keyframes.binary_search_by_key(&kf.frame, |k| k.frame) {
            Ok(_) => Err(TrackError::DuplicateFrame(kf.frame)),
            Err(pos) => {
                self.keyframes.insert(pos, kf);
                Ok(())
            }
        }
    }

    /// Index of the keyframe authored exactly at `frame`, if any.
    pub fn keyframe_at(&self, frame: u32) -> Option<usize> {
        self.keyframes
            .binary_search_by_key(&frame, |k| k.frame)
            .ok()
    }

    /// Remove the keyframe authored at `frame`.
    pub fn remove_keyframe_at(&mut self, frame: u32) -> Option<Keyframe> {
        let idx = self.keyframe_at(frame)?;
        Some(self.keyframes.remove(idx))
    }

    /// Flip `lerp_after` for the interval containing `frame`: the keyframe
    /// right before the next one, or the last keyframe when none follows.
    pub fn toggle_lerp_after(&mut self, frame: u32) -> bool {
        if self.keyframes.is_empty() {
            return false;
        }
        let next = self.keyframes.iter().position(|k| k.frame > frame);
        let idx = match next {
            Some(0) | None => self.keyframes.len() - 1,
            Some(i) => i - 1,
        };
        self.keyframes[idx].lerp_after = !self.keyframes[idx].lerp_after;
        true
    }

    /// Frame of the nearest keyframe strictly before `frame`.
    pub fn prev_keyframe(&self, frame: u32) -> Option<u32> {
        self.keyframes
            .iter()
            .rev()
            .find(|k| k.frame < frame)
            .map(|k| k.frame)
    }

    /// Frame of the nearest keyframe strictly after `frame`.
    pub fn next_keyframe(&self, frame: u32) -> Option<u32> {
        self.keyframes
            .iter()
            .find(|k| k.frame > frame)
            .map(|k| k.frame)
    }

    /// Recompute the displayed geometry cache for `frame`.
    pub fn refresh(&mut self, frame: u32) {
        match interpolate::sample(&self.keyframes, frame) {
            Some(sampled) => {
                self.polygon = sampled.polygon;
                self.keypoints = sampled.keypoints;
            }
            None => {
                self.polygon.clear();
                self.keypoints.clear();
            }
        }
    }

    /// Whether the cache holds displayable geometry for the current frame.
    pub fn has_geometry(&self) -> bool {
        !self.polygon.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kf(frame: u32, x: f64) -> Keyframe {
        Keyframe {
            frame,
            polygon: vec![Point::new(x, x)],
            keypoints: Vec::new(),
            lerp_after: true,
        }
    }

    #[test]
    fn insert_keeps_keyframes_sorted() {
        let mut track = AnnotationTrack::new(Uuid::new_v4(), 1, AnnotationKind::Box);
        track.insert_keyframe(kf(10, 1.0)).unwrap();
        track.insert_keyframe(kf(0, 0.0)).unwrap();
        track.insert_keyframe(kf(5, 0.5)).unwrap();
        let frames: Vec<u32> = track.keyframes.iter().map(|k| k.frame).collect();
        assert_eq!(frames, vec![0, 5, 10]);
    }

    #[test]
    fn duplicate_frame_is_rejected() {
        let mut track = AnnotationTrack::new(Uuid::new_v4(), 1, AnnotationKind::Box);
        track.insert_keyframe(kf(3, 1.0)).unwrap();
        assert_eq!(
            track.insert_keyframe(kf(3, 2.0)),
            Err(TrackError::DuplicateFrame(3))
        );
    }

    #[test]
    fn geometry_arity_mismatch_is_rejected() {
        let mut track = AnnotationTrack::new(Uuid::new_v4(), 1, AnnotationKind::Polygon);
        track.insert_keyframe(kf(0, 1.0)).unwrap();
        let bad = Keyframe {
            frame: 5,
            polygon: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            keypoints: Vec::new(),
            lerp_after: true,
        };
        assert!(matches!(
            track.insert_keyframe(bad),
            Err(TrackError::GeometryMismatch { .. })
        ));
    }

    #[test]
    fn unsorted_load_is_rejected() {
        let result = AnnotationTrack::from_keyframes(
            Uuid::new_v4(),
            1,
            AnnotationKind::Box,
            vec![kf(8, 1.0), kf(2, 0.0)],
        );
        assert_eq!(result.unwrap_err(), TrackError::Unsorted);
    }

    #[test]
    fn toggle_lerp_picks_interval_start() {
        let mut track = AnnotationTrack::new(Uuid::new_v4(), 1, AnnotationKind::Box);
        track.insert_keyframe(kf(0, 0.0)).unwrap();
        track.insert_keyframe(kf(10, 1.0)).unwrap();

        assert!(track.toggle_lerp_after(4));
        assert!(!track.keyframes[0].lerp_after);
        assert!(track.keyframes[1].lerp_after);

        // Past the last keyframe the last one is toggled.
        assert!(track.toggle_lerp_after(99));
        assert!(!track.keyframes[1].lerp_after);
    }

    #[test]
    fn prev_next_keyframe_navigation() {
        let mut track = AnnotationTrack::new(Uuid::new_v4(), 1, AnnotationKind::Box);
        for frame in [0, 5, 10] {
            track.insert_keyframe(kf(frame, frame as f64)).unwrap();
        }
        assert_eq!(track.prev_keyframe(7), Some(5));
        assert_eq!(track.next_keyframe(7), Some(10));
        assert_eq!(track.prev_keyframe(0), None);
        assert_eq!(track.next_keyframe(10), None);
    }
}
