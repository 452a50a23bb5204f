// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hit testing of canvas-space pointer positions against annotations.
//!
//! Tests in priority order per annotation, in insertion order, first hit
//! wins: skeleton keypoints, then polygon vertices, then the polygon body.
//! The body test is point-in-bbox on purpose, keeping body selection
//! permissive.

use crate::models::annotation::{bbox_contains, Annotation, Point};

/// Keypoint pick radius; grown for the hover affordance when drawing.
pub const KEYPOINT_RADIUS: f64 = 6.0;
pub const KEYPOINT_HOVER_RADIUS: f64 = 10.0;
/// Polygon vertex pick radius.
pub const VERTEX_RADIUS: f64 = 3.0;

/// The topmost entity under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Keypoint { annotation: usize, keypoint: usize },
    Vertex { annotation: usize, vertex: usize },
    Body { annotation: usize },
}

/// Rank and return the topmost hit across all annotations.
pub fn hit_test(annotations: &[Annotation], pos: Point) -> Option<Hit> {
    for (idx, anno) in annotations.iter().enumerate() {
        if !anno.visible {
            continue;
        }
        if let Some(skeleton) = &anno.skeleton {
            for (k, kp) in skeleton.keypoints.iter().enumerate() {
                if kp.visible && in_radius(kp.x, kp.y, pos, KEYPOINT_RADIUS) {
                    return Some(Hit::Keypoint {
                        annotation: idx,
                        keypoint: k,
                    });
                }
            }
        }
        for (v, vertex) in anno.polygon.iter().enumerate() {
            // The last two vertices of an open polygon are transient: one
            // follows the cursor, the other was just committed under it.
            if !anno.is_over && v + 2 >= anno.polygon.len() {
                continue;
            }
            if in_radius(vertex.x, vertex.y, pos, VERTEX_RADIUS) {
                return Some(Hit::Vertex {
                    annotation: idx,
                    vertex: v,
                });
            }
        }
        if !anno.polygon.is_empty() && bbox_contains(&anno.bbox, pos) {
            return Some(Hit::Body { annotation: idx });
        }
    }
    None
}

/// Nearest visible keypoint within `radius`, for hover affordances wider
/// than the pick radius.
pub fn keypoint_within(
    annotations: &[Annotation],
    pos: Point,
    radius: f64,
) -> Option<(usize, usize)> {
    for (idx, anno) in annotations.iter().enumerate() {
        if !anno.visible {
            continue;
        }
        if let Some(skeleton) = &anno.skeleton {
            for (k, kp) in skeleton.keypoints.iter().enumerate() {
                if kp.visible && in_radius(kp.x, kp.y, pos, radius) {
                    return Some((idx, k));
                }
            }
        }
    }
    None
}

fn in_radius(x: f64, y: f64, pos: Point, radius: f64) -> bool {
    let dx = pos.x - x;
    let dy = pos.y - y;
    dx * dx + dy * dy <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{AnnotationKind, Bone, Skeleton};

    fn closed(points: &[(f64, f64)]) -> Annotation {
        let mut anno = Annotation::new(
            1,
            AnnotationKind::Polygon,
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        );
        anno.is_over = true;
        anno
    }

    #[test]
    fn keypoint_outranks_vertex_and_body() {
        let mut anno = closed(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        let mut skeleton = Skeleton::from_category(
            &["head".to_string()],
            &[] as &[Bone],
            &[0.0, 0.0, 100.0, 100.0],
        );
        skeleton.keypoints[0].x = 2.0;
        skeleton.keypoints[0].y = 2.0;
        skeleton.keypoints[0].visible = true;
        anno.skeleton = Some(skeleton);

        // (2,2) is within both vertex 0's radius and the body bbox.
        let hit = hit_test(&[anno], Point::new(2.0, 2.0)).unwrap();
        assert_eq!(
            hit,
            Hit::Keypoint {
                annotation: 0,
                keypoint: 0
            }
        );
    }

    #[test]
    fn invisible_keypoints_are_skipped() {
        let mut anno = closed(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        let mut skeleton = Skeleton::from_category(
            &["head".to_string()],
            &[] as &[Bone],
            &[0.0, 0.0, 100.0, 100.0],
        );
        skeleton.keypoints[0].x = 50.0;
        skeleton.keypoints[0].y = 50.0;
        skeleton.keypoints[0].visible = false;
        anno.skeleton = Some(skeleton);

        let hit = hit_test(&[anno], Point::new(50.0, 50.0)).unwrap();
        assert_eq!(hit, Hit::Body { annotation: 0 });
    }

    #[test]
    fn open_polygon_skips_transient_vertices() {
        let mut anno = closed(&[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)]);
        anno.is_over = false;

        // Vertices 1 and 2 are transient while open; vertex 0 is pickable.
        assert_eq!(
            hit_test(std::slice::from_ref(&anno), Point::new(0.0, 0.0)),
            Some(Hit::Vertex {
                annotation: 0,
                vertex: 0
            })
        );
        assert_ne!(
            hit_test(std::slice::from_ref(&anno), Point::new(50.0, 0.0)),
            Some(Hit::Vertex {
                annotation: 0,
                vertex: 1
            })
        );
    }

    #[test]
    fn body_uses_bbox_not_exact_polygon() {
        // A triangle: (75, 25) is outside the polygon but inside its bbox.
        let anno = closed(&[(0.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        assert_eq!(
            hit_test(&[anno], Point::new(75.0, 25.0)),
            Some(Hit::Body { annotation: 0 })
        );
    }

    #[test]
    fn first_annotation_in_insertion_order_wins() {
        let a = closed(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        let b = closed(&[(10.0, 10.0), (90.0, 10.0), (90.0, 90.0), (10.0, 90.0)]);
        assert_eq!(
            hit_test(&[a, b], Point::new(50.0, 50.0)),
            Some(Hit::Body { annotation: 0 })
        );
    }

    #[test]
    fn miss_returns_none() {
        let anno = closed(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(hit_test(&[anno], Point::new(500.0, 500.0)), None);
    }
}
