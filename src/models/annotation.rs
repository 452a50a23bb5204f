// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the core data structures for representing
//! polygons, bounding boxes, pose skeletons, and their derived state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A 2D point. Coordinates are in viewport (canvas) space unless a
/// function says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box as `[x, y, w, h]`.
pub type BBox = [f64; 4];

/// Compute the axis-aligned extents of a vertex list.
///
/// An empty list yields a zero box at the origin.
pub fn bbox_of(points: &[Point]) -> BBox {
    if points.is_empty() {
        return [0.0, 0.0, 0.0, 0.0];
    }
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }
    [x_min, y_min, x_max - x_min, y_max - y_min]
}

/// Check whether a point lies inside a bounding box (edges inclusive).
pub fn bbox_contains(bbox: &BBox, p: Point) -> bool {
    p.x >= bbox[0] && p.x <= bbox[0] + bbox[2] && p.y >= bbox[1] && p.y <= bbox[1] + bbox[3]
}

/// A named skeleton keypoint. Invisible keypoints keep their geometry but
/// are excluded from rendering, hit-testing, and bone drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

/// A bone edge connecting two keypoints by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bone {
    pub start: usize,
    pub end: usize,
}

/// Pose skeleton owned by an annotation: a fixed-size ordered keypoint
/// list plus the category's immutable bone edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    pub keypoints: Vec<Keypoint>,
    pub bones: Vec<Bone>,
}

// Vertical padding used when spreading fresh keypoints through a bbox.
const SKELETON_TOP_PAD: f64 = 14.0;
const SKELETON_MIN_HEIGHT: f64 = 28.0;
const SKELETON_MIN_WIDTH: f64 = 10.0;

impl Skeleton {
    /// Build a skeleton from category metadata, spreading the keypoints
    /// vertically down the middle of `bbox`. Keypoints start hidden when
    /// the box is too small to place them.
    pub fn from_category(keypoint_names: &[String], bones: &[Bone], bbox: &BBox) -> Self {
        let mut skeleton = Self {
            keypoints: keypoint_names
                .iter()
                .map(|name| Keypoint {
                    name: name.clone(),
                    x: 0.0,
                    y: 0.0,
                    visible: true,
                })
                .collect(),
            bones: bones.to_vec(),
        };
        skeleton.spread_in_bbox(bbox);
        skeleton
    }

    /// Distribute keypoints evenly through the bbox interior. Hides all
    /// keypoints when the box is degenerate.
    pub fn spread_in_bbox(&mut self, bbox: &BBox) {
        let count = self.keypoints.len();
        if count == 0 {
            return;
        }
        let usable = bbox[3] - SKELETON_MIN_HEIGHT;
        if usable <= 0.0 || bbox[2] <= SKELETON_MIN_WIDTH {
            for kp in &mut self.keypoints {
                kp.visible = false;
            }
            return;
        }
        let step = if count > 1 {
            usable / (count - 1) as f64
        } else {
            0.0
        };
        for (i, kp) in self.keypoints.iter_mut().enumerate() {
            kp.x = bbox[0] + bbox[2] / 2.0;
            kp.y = bbox[1] + SKELETON_TOP_PAD + i as f64 * step;
            kp.visible = true;
        }
    }

    /// Translate every keypoint by the same delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for kp in &mut self.keypoints {
            kp.x += dx;
            kp.y += dy;
        }
    }

    /// Soft-delete one keypoint. Geometry is retained.
    pub fn hide_keypoint(&mut self, idx: usize) {
        if let Some(kp) = self.keypoints.get_mut(idx) {
            kp.visible = false;
        }
    }

    /// Restore every soft-deleted keypoint.
    pub fn show_all(&mut self) {
        for kp in &mut self.keypoints {
            kp.visible = true;
        }
    }
}

/// What a category annotates. Replaces loose numeric task-type codes with
/// a tagged variant the state machine can dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Polygon,
    Box,
    Skeleton,
    ClassifyOnly,
}

/// A single geometric annotation. The polygon is the source of truth;
/// `bbox` is derived from it on every mutation and never set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Uuid,
    pub category_id: u32,
    pub kind: AnnotationKind,
    pub polygon: Vec<Point>,
    pub skeleton: Option<Skeleton>,
    /// Whether the polygon is closed/finalized. Editable only while open.
    pub is_over: bool,
    pub visible: bool,
    #[serde(skip, default)]
    pub bbox: BBox,
}

impl Annotation {
    pub fn new(category_id: u32, kind: AnnotationKind, polygon: Vec<Point>) -> Self {
        let bbox = bbox_of(&polygon);
        Self {
            id: Uuid::new_v4(),
            category_id,
            kind,
            polygon,
            skeleton: None,
            is_over: false,
            visible: true,
            bbox,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.polygon.len()
    }

    /// Replace the whole vertex list and recompute the bbox.
    pub fn set_polygon(&mut self, polygon: Vec<Point>) {
        self.polygon = polygon;
        self.recompute_bbox();
    }

    /// Move one vertex and recompute the bbox.
    pub fn update_vertex(&mut self, idx: usize, p: Point) {
        if let Some(v) = self.polygon.get_mut(idx) {
            *v = p;
            self.recompute_bbox();
        }
    }

    /// Translate the whole shape, skeleton included, by the same delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.polygon {
            p.x += dx;
            p.y += dy;
        }
        if let Some(skeleton) = &mut self.skeleton {
            skeleton.translate(dx, dy);
        }
        self.recompute_bbox();
    }

    pub fn recompute_bbox(&mut self) {
        self.bbox = bbox_of(&self.polygon);
    }
}

/// The annotation collection plus the single "current annotation" pointer
/// that designates the edit target.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotationSet {
    pub annotations: Vec<Annotation>,
    #[serde(skip, default)]
    pub current: Option<usize>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Annotation> {
        self.current.and_then(|i| self.annotations.get(i))
    }

    pub fn current_mut(&mut self) -> Option<&mut Annotation> {
        self.current.and_then(|i| self.annotations.get_mut(i))
    }

    /// Append an annotation and make it current.
    pub fn push_current(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
        self.current = Some(self.annotations.len() - 1);
    }

    /// Remove an annotation, fixing up the current pointer.
    pub fn remove(&mut self, idx: usize) -> Option<Annotation> {
        if idx >= self.annotations.len() {
            return None;
        }
        let removed = self.annotations.remove(idx);
        self.current = match self.current {
            Some(c) if c == idx => None,
            Some(c) if c > idx => Some(c - 1),
            other => other,
        };
        Some(removed)
    }

    pub fn index_of(&self, id: Uuid) -> Option<usize> {
        self.annotations.iter().position(|a| a.id == id)
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_follows_polygon_mutation() {
        let mut anno = Annotation::new(
            1,
            AnnotationKind::Polygon,
            vec![
                Point::new(10.0, 20.0),
                Point::new(40.0, 20.0),
                Point::new(40.0, 60.0),
            ],
        );
        assert_eq!(anno.bbox, [10.0, 20.0, 30.0, 40.0]);

        anno.update_vertex(2, Point::new(100.0, 80.0));
        assert_eq!(anno.bbox, [10.0, 20.0, 90.0, 60.0]);

        anno.translate(5.0, -5.0);
        assert_eq!(anno.bbox, [15.0, 15.0, 90.0, 60.0]);
    }

    #[test]
    fn bbox_of_empty_polygon_is_zero() {
        assert_eq!(bbox_of(&[]), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn skeleton_spreads_keypoints_through_bbox() {
        let names = vec!["head".to_string(), "hip".to_string(), "foot".to_string()];
        let bones = vec![Bone { start: 0, end: 1 }, Bone { start: 1, end: 2 }];
        let skeleton = Skeleton::from_category(&names, &bones, &[0.0, 0.0, 100.0, 128.0]);

        assert_eq!(skeleton.keypoints.len(), 3);
        assert!(skeleton.keypoints.iter().all(|kp| kp.visible));
        assert_eq!(skeleton.keypoints[0].x, 50.0);
        assert!(skeleton.keypoints[0].y < skeleton.keypoints[1].y);
        assert!(skeleton.keypoints[1].y < skeleton.keypoints[2].y);
    }

    #[test]
    fn skeleton_hides_keypoints_in_degenerate_bbox() {
        let names = vec!["a".to_string(), "b".to_string()];
        let skeleton = Skeleton::from_category(&names, &[], &[0.0, 0.0, 4.0, 10.0]);
        assert!(skeleton.keypoints.iter().all(|kp| !kp.visible));
    }

    #[test]
    fn remove_fixes_current_pointer() {
        let mut set = AnnotationSet::new();
        set.push_current(Annotation::new(1, AnnotationKind::Polygon, vec![]));
        set.push_current(Annotation::new(1, AnnotationKind::Polygon, vec![]));
        set.push_current(Annotation::new(1, AnnotationKind::Polygon, vec![]));
        assert_eq!(set.current, Some(2));

        set.remove(0);
        assert_eq!(set.current, Some(1));
        set.remove(1);
        assert_eq!(set.current, None);
    }
}
