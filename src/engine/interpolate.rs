// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Keyframe interpolation.
//!
//! Derives the geometry displayed at a given frame from a track's sorted
//! keyframe list. Precondition: every keyframe in the list shares the same
//! polygon vertex count and keypoint count (categories fix these); the
//! insertion boundary in `models::track` enforces it.

use crate::models::annotation::{Keypoint, Point};
use crate::models::track::Keyframe;

/// Geometry sampled for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampled {
    pub polygon: Vec<Point>,
    pub keypoints: Vec<Keypoint>,
}

/// Compute the displayed geometry for `frame`, or `None` when the track
/// shows nothing there:
/// - before the first keyframe, nothing is displayed;
/// - at/after the last keyframe, its geometry is held only when its
///   `lerp_after` is set or the frame matches exactly;
/// - between keyframes, geometry is interpolated only when the interval's
///   starting keyframe has `lerp_after` set.
pub fn sample(keyframes: &[Keyframe], frame: u32) -> Option<Sampled> {
    if keyframes.is_empty() {
        return None;
    }
    match keyframes.iter().position(|k| k.frame > frame) {
        None => {
            // keyframes is non-empty here
            let last = keyframes.last()?;
            if last.lerp_after || frame == last.frame {
                Some(Sampled {
                    polygon: last.polygon.clone(),
                    keypoints: last.keypoints.clone(),
                })
            } else {
                None
            }
        }
        Some(0) => None,
        Some(next) => {
            let a = &keyframes[next - 1];
            let b = &keyframes[next];
            if a.lerp_after {
                Some(lerp_keyframes(a, b, frame))
            } else {
                None
            }
        }
    }
}

/// Linearly interpolate every polygon vertex and keypoint position between
/// two keyframes. Keypoint `visible`/`name` carry over from `a` unchanged.
fn lerp_keyframes(a: &Keyframe, b: &Keyframe, frame: u32) -> Sampled {
    let polygon = a
        .polygon
        .iter()
        .zip(&b.polygon)
        .map(|(pa, pb)| {
            Point::new(
                lerp(pa.x, pb.x, a.frame, b.frame, frame),
                lerp(pa.y, pb.y, a.frame, b.frame, frame),
            )
        })
        .collect();
    let keypoints = a
        .keypoints
        .iter()
        .zip(&b.keypoints)
        .map(|(ka, kb)| Keypoint {
            name: ka.name.clone(),
            x: lerp(ka.x, kb.x, a.frame, b.frame, frame),
            y: lerp(ka.y, kb.y, a.frame, b.frame, frame),
            visible: ka.visible,
        })
        .collect();
    Sampled { polygon, keypoints }
}

fn lerp(v1: f64, v2: f64, f1: u32, f2: u32, f: u32) -> f64 {
    v1 + (v2 - v1) * ((f - f1) as f64 / (f2 - f1) as f64)
}
