// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project data serialization and deserialization.
//!
//! Exports and imports project data in YAML and JSON formats, and converts
//! between the runtime geometry (viewport space) and the stored geometry
//! (media pixel space). Geometry crosses this boundary through the
//! viewport's mapping pair, so a stored file is independent of window size
//! and zoom.

use anyhow::{anyhow, Result};
use std::path::Path;

use crate::engine::viewport::Viewport;
use crate::models::annotation::{bbox_of, Annotation, Keypoint, Point, Skeleton};
use crate::models::category::LabelCategory;
use crate::models::project::{ProjectData, StoredAnnotation, StoredKeyframe, StoredTrack};
use crate::models::track::{AnnotationTrack, Keyframe};

/// Export project data to YAML format.
pub fn export_yaml(data: &ProjectData, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export project data to JSON format.
pub fn export_json(data: &ProjectData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import project data from YAML format.
pub fn import_yaml(path: &Path) -> Result<ProjectData> {
    let yaml = std::fs::read_to_string(path)?;
    let data = serde_yaml::from_str(&yaml)?;
    Ok(data)
}

/// Import project data from JSON format.
pub fn import_json(path: &Path) -> Result<ProjectData> {
    let json = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    Ok(data)
}

/// Convert a finished annotation to its stored, media-space shape.
pub fn annotation_to_stored(anno: &Annotation, vp: &Viewport) -> StoredAnnotation {
    let segmentation: Vec<[f64; 2]> = anno
        .polygon
        .iter()
        .map(|&p| {
            let m = vp.canvas_to_media(p);
            [m.x, m.y]
        })
        .collect();
    let media_points: Vec<Point> = segmentation.iter().map(|&[x, y]| Point::new(x, y)).collect();
    let bbox = bbox_of(&media_points);
    StoredAnnotation {
        id: anno.id,
        category_id: anno.category_id,
        area: polygon_area(&media_points),
        segmentation,
        bbox,
        keypoints: anno
            .skeleton
            .as_ref()
            .map(|s| keypoints_to_media(&s.keypoints, vp))
            .unwrap_or_default(),
        visible: anno.visible,
    }
}

/// Rebuild a runtime annotation from its stored shape. The category fixes
/// the kind and the skeleton's bone edges.
pub fn annotation_from_stored(
    stored: &StoredAnnotation,
    categories: &[LabelCategory],
    vp: &Viewport,
) -> Result<Annotation> {
    let category = category_by_id(categories, stored.category_id)?;
    let polygon: Vec<Point> = stored
        .segmentation
        .iter()
        .map(|&[x, y]| vp.media_to_canvas(Point::new(x, y)))
        .collect();
    let mut anno = Annotation::new(stored.category_id, category.kind, polygon);
    anno.id = stored.id;
    anno.is_over = true;
    anno.visible = stored.visible;
    if !stored.keypoints.is_empty() {
        anno.skeleton = Some(Skeleton {
            keypoints: keypoints_to_canvas(&stored.keypoints, vp),
            bones: category.bones.clone(),
        });
    }
    Ok(anno)
}

/// Convert a video track to its stored, media-space shape.
pub fn track_to_stored(track: &AnnotationTrack, vp: &Viewport) -> StoredTrack {
    StoredTrack {
        id: track.id,
        category_id: track.category_id,
        keyframes: track
            .keyframes
            .iter()
            .map(|kf| StoredKeyframe {
                frame: kf.frame,
                polygon: kf
                    .polygon
                    .iter()
                    .map(|&p| {
                        let m = vp.canvas_to_media(p);
                        [m.x, m.y]
                    })
                    .collect(),
                keypoints: keypoints_to_media(&kf.keypoints, vp),
                lerp_after: kf.lerp_after,
            })
            .collect(),
    }
}

/// Rebuild a runtime track from its stored shape, re-validating the
/// keyframe list on the way in.
pub fn track_from_stored(
    stored: &StoredTrack,
    categories: &[LabelCategory],
    vp: &Viewport,
) -> Result<AnnotationTrack> {
    let category = category_by_id(categories, stored.category_id)?;
    let keyframes: Vec<Keyframe> = stored
        .keyframes
        .iter()
        .map(|kf| Keyframe {
            frame: kf.frame,
            polygon: kf
                .polygon
                .iter()
                .map(|&[x, y]| vp.media_to_canvas(Point::new(x, y)))
                .collect(),
            keypoints: keypoints_to_canvas(&kf.keypoints, vp),
            lerp_after: kf.lerp_after,
        })
        .collect();
    AnnotationTrack::from_keyframes(stored.id, stored.category_id, category.kind, keyframes)
        .map_err(|e| anyhow!("track {}: {}", stored.id, e))
}

fn category_by_id(categories: &[LabelCategory], id: u32) -> Result<&LabelCategory> {
    categories
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| anyhow!("unknown category id {}", id))
}

fn keypoints_to_media(keypoints: &[Keypoint], vp: &Viewport) -> Vec<Keypoint> {
    keypoints
        .iter()
        .map(|kp| {
            let m = vp.canvas_to_media(Point::new(kp.x, kp.y));
            Keypoint {
                name: kp.name.clone(),
                x: m.x,
                y: m.y,
                visible: kp.visible,
            }
        })
        .collect()
}

fn keypoints_to_canvas(keypoints: &[Keypoint], vp: &Viewport) -> Vec<Keypoint> {
    keypoints
        .iter()
        .map(|kp| {
            let c = vp.media_to_canvas(Point::new(kp.x, kp.y));
            Keypoint {
                name: kp.name.clone(),
                x: c.x,
                y: c.y,
                visible: kp.visible,
            }
        })
        .collect()
}

/// Shoelace area of a closed polygon in media pixels.
fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum.abs() / 2.0
}
