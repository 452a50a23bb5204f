// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer-driven annotation creation and editing.
//!
//! Consumes pointer-down/move/up events and drives one active annotation
//! at a time through creation and editing, consulting the hit tester and
//! the viewport's canvas rectangle. Malformed gestures (degenerate polygon
//! or box) are rolled back locally and never surface as errors.

use crate::engine::hit::{self, Hit};
use crate::engine::viewport::CanvasPos;
use crate::models::annotation::{Annotation, AnnotationKind, AnnotationSet, Point, Skeleton};
use crate::models::category::LabelCategory;

/// Boxes with either dimension below this are treated as accidental
/// clicks and discarded.
pub const MIN_BOX_SIZE: f64 = 8.0;
/// A closed polygon keeps at least this many vertices.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Cursor hints for the host view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Crosshair,
    Pointer,
    Move,
    Grab,
    Grabbing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// The state machine's current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Persists between clicks while a polygon is being outlined.
    CreatingPolygon,
    CreatingBox,
    Moving,
    MovingPoint,
    MovingKeypoint,
}

/// What a completed pointer-up amounted to. The caller records history
/// and, for video, writes keyframes based on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// A polygon vertex was committed (creation still in progress).
    VertexCommitted,
    PolygonClosed,
    PolygonDiscarded,
    BoxCreated,
    BoxDiscarded,
    /// A move/move-point/move-keypoint drag actually changed geometry.
    GeometryMoved,
    /// A keypoint was clicked without dragging and is now selected.
    KeypointSelected(usize),
}

/// Per-edge cursor clamp limits captured at pointer-down:
/// minimum y, maximum x, maximum y, minimum x.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct EdgeLimits {
    top: f64,
    right: f64,
    bottom: f64,
    left: f64,
}

impl EdgeLimits {
    fn from_canvas(canvas: &CanvasPos) -> Self {
        Self {
            top: canvas.dy,
            right: canvas.dx + canvas.w,
            bottom: canvas.dy + canvas.h,
            left: canvas.dx,
        }
    }

    fn from_bbox(bbox: &[f64; 4]) -> Self {
        Self {
            top: bbox[1],
            right: bbox[0] + bbox[2],
            bottom: bbox[1] + bbox[3],
            left: bbox[0],
        }
    }

    /// Limits that keep the whole bbox inside the canvas while the cursor
    /// drags it from `pos`.
    fn for_body_drag(canvas: &CanvasPos, bbox: &[f64; 4], pos: Point) -> Self {
        Self {
            top: canvas.dy + (pos.y - bbox[1]),
            right: canvas.dx + canvas.w - (bbox[0] + bbox[2] - pos.x),
            bottom: canvas.dy + canvas.h - (bbox[1] + bbox[3] - pos.y),
            left: canvas.dx + (pos.x - bbox[0]),
        }
    }

    fn clamp(&self, p: Point) -> Point {
        Point::new(p.x.clamp(self.left, self.right), p.y.clamp(self.top, self.bottom))
    }
}

/// Moving one corner of a rectangle keeps it rectangular: the opposite
/// corner `(corner + 2) % 4` anchors, and the moved corner's x or y
/// propagates to its two neighbors. Relies on the TL,TR,BR,BL vertex
/// ordering that box creation establishes and editing preserves.
pub fn drag_box_corner(polygon: &mut [Point], corner: usize, pos: Point) {
    if polygon.len() != 4 || corner >= 4 {
        return;
    }
    polygon[corner] = pos;
    let anchor_idx = (corner + 2) % 4;
    let anchor = polygon[anchor_idx];
    match anchor_idx {
        0 => {
            polygon[1] = Point::new(pos.x, anchor.y);
            polygon[3] = Point::new(anchor.x, pos.y);
        }
        1 => {
            polygon[0] = Point::new(pos.x, anchor.y);
            polygon[2] = Point::new(anchor.x, pos.y);
        }
        2 => {
            polygon[1] = Point::new(anchor.x, pos.y);
            polygon[3] = Point::new(pos.x, anchor.y);
        }
        3 => {
            polygon[0] = Point::new(anchor.x, pos.y);
            polygon[2] = Point::new(pos.x, anchor.y);
        }
        _ => unreachable!(),
    }
}

/// The pointer-driven interaction state machine.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    state: DragState,
    /// Whether a button is currently held for the active gesture.
    pressed: bool,
    start_pos: Point,
    move_pos: Point,
    /// Geometry snapshots taken at pointer-down for whole-shape moves.
    start_polygon: Vec<Point>,
    start_keypoints: Vec<(f64, f64)>,
    edge: EdgeLimits,
    cur_point: usize,
    /// Set while hovering the first vertex of the open polygon.
    ready_over: bool,
    selected_keypoint: Option<usize>,
    hint: CursorHint,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> CursorHint {
        self.hint
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Keypoint selected by a click-without-drag, eligible for soft delete.
    pub fn selected_keypoint(&self) -> Option<usize> {
        self.selected_keypoint
    }

    /// Whether a gesture is in flight (including an open polygon outline).
    pub fn gesture_active(&self) -> bool {
        self.state != DragState::Idle
    }

    /// Handle a pointer press. Ignored outside the canvas rectangle or for
    /// non-primary buttons.
    pub fn on_pointer_down(
        &mut self,
        pos: Point,
        button: PointerButton,
        set: &mut AnnotationSet,
        canvas: &CanvasPos,
        category: &LabelCategory,
    ) {
        if button != PointerButton::Primary || !canvas.contains(pos) {
            return;
        }
        if category.kind == AnnotationKind::ClassifyOnly && self.state == DragState::Idle {
            return;
        }
        self.pressed = true;
        self.start_pos = pos;
        self.move_pos = pos;
        self.edge = EdgeLimits::from_canvas(canvas);
        self.selected_keypoint = None;

        let editable = set.current().map_or(true, |a| a.is_over);
        match hit::hit_test(&set.annotations, pos) {
            Some(Hit::Keypoint {
                annotation,
                keypoint,
            }) => {
                set.current = Some(annotation);
                self.state = DragState::MovingKeypoint;
                self.cur_point = keypoint;
                // Keypoints stay inside the shape's bbox.
                self.edge = EdgeLimits::from_bbox(&set.annotations[annotation].bbox);
            }
            Some(Hit::Vertex { annotation, vertex }) if editable => {
                set.current = Some(annotation);
                self.state = DragState::MovingPoint;
                self.cur_point = vertex;
            }
            Some(Hit::Body { annotation }) if editable => {
                set.current = Some(annotation);
                self.state = DragState::Moving;
                let anno = &set.annotations[annotation];
                self.edge = EdgeLimits::for_body_drag(canvas, &anno.bbox, pos);
                self.start_polygon = anno.polygon.clone();
                self.start_keypoints = anno
                    .skeleton
                    .as_ref()
                    .map(|s| s.keypoints.iter().map(|kp| (kp.x, kp.y)).collect())
                    .unwrap_or_default();
            }
            _ => {
                if category.kind == AnnotationKind::Box {
                    self.state = DragState::CreatingBox;
                    let mut anno = Annotation::new(
                        category.id,
                        AnnotationKind::Box,
                        vec![pos, pos, pos, pos],
                    );
                    anno.is_over = true;
                    set.push_current(anno);
                } else {
                    self.state = DragState::CreatingPolygon;
                }
            }
        }
    }

    /// Handle pointer motion: updates hover hints and, mid-gesture, the
    /// active geometry. Motion is clamped to the limits captured at
    /// pointer-down.
    pub fn on_pointer_move(&mut self, pos: Point, set: &mut AnnotationSet) {
        self.update_hover(pos, set);

        if self.state == DragState::Idle {
            self.move_pos = pos;
            return;
        }
        let pos = self.edge.clamp(pos);
        self.move_pos = pos;

        match self.state {
            DragState::CreatingPolygon => {
                if let Some(anno) = set.current_mut() {
                    if !anno.is_over {
                        // The provisional last vertex follows the cursor.
                        if let Some(last) = anno.polygon.len().checked_sub(1) {
                            anno.update_vertex(last, pos);
                        }
                    }
                }
            }
            DragState::CreatingBox => {
                if !self.pressed {
                    return;
                }
                let (a, b) = (self.start_pos, pos);
                if let Some(anno) = set.current_mut() {
                    anno.set_polygon(vec![
                        Point::new(a.x, a.y),
                        Point::new(b.x, a.y),
                        Point::new(b.x, b.y),
                        Point::new(a.x, b.y),
                    ]);
                }
            }
            DragState::Moving => {
                if !self.pressed {
                    return;
                }
                let dx = pos.x - self.start_pos.x;
                let dy = pos.y - self.start_pos.y;
                let polygon: Vec<Point> = self
                    .start_polygon
                    .iter()
                    .map(|p| Point::new(p.x + dx, p.y + dy))
                    .collect();
                if let Some(anno) = set.current_mut() {
                    anno.set_polygon(polygon);
                    if let Some(skeleton) = &mut anno.skeleton {
                        for (kp, &(sx, sy)) in
                            skeleton.keypoints.iter_mut().zip(&self.start_keypoints)
                        {
                            kp.x = sx + dx;
                            kp.y = sy + dy;
                        }
                    }
                }
            }
            DragState::MovingPoint => {
                if !self.pressed {
                    return;
                }
                let cur_point = self.cur_point;
                if let Some(anno) = set.current_mut() {
                    if anno.kind == AnnotationKind::Box {
                        drag_box_corner(&mut anno.polygon, cur_point, pos);
                        anno.recompute_bbox();
                    } else {
                        anno.update_vertex(cur_point, pos);
                    }
                }
            }
            DragState::MovingKeypoint => {
                if !self.pressed {
                    return;
                }
                let cur_point = self.cur_point;
                if let Some(skeleton) = set.current_mut().and_then(|a| a.skeleton.as_mut()) {
                    if let Some(kp) = skeleton.keypoints.get_mut(cur_point) {
                        kp.x = pos.x;
                        kp.y = pos.y;
                    }
                }
            }
            DragState::Idle => {}
        }
    }

    /// Handle a pointer release, committing or rolling back the gesture.
    pub fn on_pointer_up(
        &mut self,
        set: &mut AnnotationSet,
        category: &LabelCategory,
    ) -> Option<GestureOutcome> {
        if self.state == DragState::Idle || !self.pressed {
            return None;
        }
        self.pressed = false;

        match self.state {
            DragState::CreatingPolygon => {
                let pos = self.move_pos;
                let creating = set.current().map_or(false, |a| !a.is_over);
                if !creating {
                    // First click: open a new polygon with a committed
                    // vertex plus the provisional one under the cursor.
                    let anno = Annotation::new(category.id, category.kind, vec![pos, pos]);
                    set.push_current(anno);
                    Some(GestureOutcome::VertexCommitted)
                } else if self.ready_over {
                    self.state = DragState::Idle;
                    self.ready_over = false;
                    let anno = set.current_mut()?;
                    // Drop the provisional vertex that tracked the cursor.
                    anno.polygon.pop();
                    if anno.polygon.len() < MIN_POLYGON_VERTICES {
                        let idx = set.current?;
                        set.remove(idx);
                        Some(GestureOutcome::PolygonDiscarded)
                    } else {
                        anno.is_over = true;
                        anno.recompute_bbox();
                        if category.kind == AnnotationKind::Skeleton {
                            anno.skeleton = Some(Skeleton::from_category(
                                &category.keypoints,
                                &category.bones,
                                &anno.bbox,
                            ));
                        }
                        Some(GestureOutcome::PolygonClosed)
                    }
                } else {
                    let anno = set.current_mut()?;
                    anno.polygon.push(pos);
                    anno.recompute_bbox();
                    Some(GestureOutcome::VertexCommitted)
                }
            }
            DragState::CreatingBox => {
                self.state = DragState::Idle;
                let width = (self.move_pos.x - self.start_pos.x).abs();
                let height = (self.move_pos.y - self.start_pos.y).abs();
                if width < MIN_BOX_SIZE || height < MIN_BOX_SIZE {
                    let idx = set.current?;
                    set.remove(idx);
                    Some(GestureOutcome::BoxDiscarded)
                } else {
                    Some(GestureOutcome::BoxCreated)
                }
            }
            DragState::Moving | DragState::MovingPoint | DragState::MovingKeypoint => {
                let was_keypoint = self.state == DragState::MovingKeypoint;
                self.state = DragState::Idle;
                if self.move_pos != self.start_pos {
                    Some(GestureOutcome::GeometryMoved)
                } else if was_keypoint {
                    // A click without a drag selects the keypoint.
                    self.selected_keypoint = Some(self.cur_point);
                    Some(GestureOutcome::KeypointSelected(self.cur_point))
                } else {
                    None
                }
            }
            DragState::Idle => None,
        }
    }

    /// Soft-delete the selected keypoint of the current annotation.
    /// Returns the hidden keypoint's index.
    pub fn delete_selected_keypoint(&mut self, set: &mut AnnotationSet) -> Option<usize> {
        let idx = self.selected_keypoint.take()?;
        let skeleton = set.current_mut()?.skeleton.as_mut()?;
        skeleton.hide_keypoint(idx);
        Some(idx)
    }

    /// Roll back an in-progress polygon outline and reset the gesture.
    pub fn cancel(&mut self, set: &mut AnnotationSet) {
        if let Some(idx) = set.current {
            if set.annotations.get(idx).is_some_and(|a| !a.is_over) {
                set.remove(idx);
            }
        }
        self.state = DragState::Idle;
        self.pressed = false;
        self.ready_over = false;
        self.selected_keypoint = None;
    }

    fn update_hover(&mut self, pos: Point, set: &AnnotationSet) {
        let dragging = self.pressed;
        let editable = set.current().map_or(true, |a| a.is_over);
        match hit::hit_test(&set.annotations, pos) {
            Some(Hit::Keypoint { .. }) => {
                self.hint = if dragging {
                    CursorHint::Grabbing
                } else {
                    CursorHint::Grab
                };
            }
            Some(Hit::Vertex { vertex: 0, .. })
                if set.current().is_some_and(|a| !a.is_over) =>
            {
                self.ready_over = true;
                self.hint = CursorHint::Pointer;
            }
            Some(_) if editable => {
                self.ready_over = false;
                self.hint = if dragging {
                    CursorHint::Move
                } else {
                    CursorHint::Pointer
                };
            }
            _ => {
                self.ready_over = false;
                // Wider grab affordance around keypoints than the pick
                // radius itself.
                self.hint = if hit::keypoint_within(
                    &set.annotations,
                    pos,
                    hit::KEYPOINT_HOVER_RADIUS,
                )
                .is_some()
                {
                    CursorHint::Grab
                } else {
                    CursorHint::Crosshair
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::bbox_of;

    fn canvas() -> CanvasPos {
        CanvasPos {
            w: 1000.0,
            h: 1000.0,
            dx: 0.0,
            dy: 0.0,
        }
    }

    fn polygon_category() -> LabelCategory {
        LabelCategory::new(1, "region", AnnotationKind::Polygon)
    }

    fn box_category() -> LabelCategory {
        LabelCategory::new(2, "object", AnnotationKind::Box)
    }

    fn skeleton_category() -> LabelCategory {
        let mut cat = LabelCategory::new(3, "person", AnnotationKind::Skeleton);
        cat.keypoints = vec!["head".to_string(), "hip".to_string()];
        cat
    }

    /// Press, move, release at the same spot: one click.
    fn click(
        interaction: &mut Interaction,
        set: &mut AnnotationSet,
        cat: &LabelCategory,
        x: f64,
        y: f64,
    ) -> Option<GestureOutcome> {
        let p = Point::new(x, y);
        interaction.on_pointer_down(p, PointerButton::Primary, set, &canvas(), cat);
        interaction.on_pointer_move(p, set);
        interaction.on_pointer_up(set, cat)
    }

    fn drag(
        interaction: &mut Interaction,
        set: &mut AnnotationSet,
        cat: &LabelCategory,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Option<GestureOutcome> {
        interaction.on_pointer_down(
            Point::new(from.0, from.1),
            PointerButton::Primary,
            set,
            &canvas(),
            cat,
        );
        interaction.on_pointer_move(Point::new(to.0, to.1), set);
        interaction.on_pointer_up(set, cat)
    }

    #[test]
    fn two_vertex_polygon_is_discarded_on_close() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = polygon_category();

        click(&mut interaction, &mut set, &cat, 100.0, 100.0);
        click(&mut interaction, &mut set, &cat, 200.0, 100.0);
        // Click back on the first vertex to close.
        let outcome = click(&mut interaction, &mut set, &cat, 100.0, 100.0);

        assert_eq!(outcome, Some(GestureOutcome::PolygonDiscarded));
        assert!(set.annotations.is_empty());
    }

    #[test]
    fn three_vertex_polygon_closes() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = polygon_category();

        click(&mut interaction, &mut set, &cat, 100.0, 100.0);
        click(&mut interaction, &mut set, &cat, 200.0, 100.0);
        click(&mut interaction, &mut set, &cat, 150.0, 200.0);
        let outcome = click(&mut interaction, &mut set, &cat, 100.0, 100.0);

        assert_eq!(outcome, Some(GestureOutcome::PolygonClosed));
        assert_eq!(set.annotations.len(), 1);
        let anno = &set.annotations[0];
        assert!(anno.is_over);
        assert_eq!(anno.vertex_count(), 3);
    }

    #[test]
    fn tiny_box_drag_is_discarded() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = box_category();

        let outcome = drag(
            &mut interaction,
            &mut set,
            &cat,
            (100.0, 100.0),
            (103.0, 104.0),
        );
        assert_eq!(outcome, Some(GestureOutcome::BoxDiscarded));
        assert!(set.annotations.is_empty());
    }

    #[test]
    fn box_drag_creates_rectangle() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = box_category();

        let outcome = drag(
            &mut interaction,
            &mut set,
            &cat,
            (100.0, 100.0),
            (150.0, 150.0),
        );
        assert_eq!(outcome, Some(GestureOutcome::BoxCreated));
        assert_eq!(set.annotations.len(), 1);
        assert_eq!(set.annotations[0].bbox, [100.0, 100.0, 50.0, 50.0]);
        assert!(set.annotations[0].is_over);
    }

    #[test]
    fn box_corner_drag_keeps_rectangle() {
        let mut polygon = vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 50.0),
            Point::new(0.0, 50.0),
        ];
        drag_box_corner(&mut polygon, 0, Point::new(10.0, 10.0));
        assert_eq!(polygon[0], Point::new(10.0, 10.0));
        assert_eq!(polygon[1], Point::new(50.0, 10.0));
        assert_eq!(polygon[2], Point::new(50.0, 50.0));
        assert_eq!(polygon[3], Point::new(10.0, 50.0));
    }

    #[test]
    fn corner_drag_through_state_machine() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = box_category();
        drag(
            &mut interaction,
            &mut set,
            &cat,
            (0.0, 0.0),
            (50.0, 50.0),
        );

        let outcome = drag(&mut interaction, &mut set, &cat, (0.0, 0.0), (10.0, 10.0));
        assert_eq!(outcome, Some(GestureOutcome::GeometryMoved));
        let polygon = &set.annotations[0].polygon;
        assert_eq!(polygon[1], Point::new(50.0, 10.0));
        assert_eq!(polygon[3], Point::new(10.0, 50.0));
        assert_eq!(set.annotations[0].bbox, [10.0, 10.0, 40.0, 40.0]);
    }

    #[test]
    fn body_drag_translates_shape_within_canvas() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = box_category();
        drag(
            &mut interaction,
            &mut set,
            &cat,
            (100.0, 100.0),
            (200.0, 200.0),
        );

        // Drag the body far past the canvas edge; the clamp keeps the
        // shape inside.
        interaction.on_pointer_down(
            Point::new(150.0, 150.0),
            PointerButton::Primary,
            &mut set,
            &canvas(),
            &cat,
        );
        interaction.on_pointer_move(Point::new(5000.0, 150.0), &mut set);
        let outcome = interaction.on_pointer_up(&mut set, &cat);
        assert_eq!(outcome, Some(GestureOutcome::GeometryMoved));
        let bbox = set.annotations[0].bbox;
        assert_eq!(bbox[0] + bbox[2], 1000.0);
        assert_eq!(bbox[1], 100.0);
    }

    #[test]
    fn keypoint_click_selects_then_deletes() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = skeleton_category();

        click(&mut interaction, &mut set, &cat, 100.0, 100.0);
        click(&mut interaction, &mut set, &cat, 300.0, 100.0);
        click(&mut interaction, &mut set, &cat, 200.0, 300.0);
        click(&mut interaction, &mut set, &cat, 100.0, 100.0);
        let skeleton = set.annotations[0].skeleton.as_ref().unwrap();
        assert_eq!(skeleton.keypoints.len(), 2);
        let (kx, ky) = (skeleton.keypoints[0].x, skeleton.keypoints[0].y);

        // Click squarely on the first keypoint without dragging.
        let outcome = click(&mut interaction, &mut set, &cat, kx, ky);
        assert_eq!(outcome, Some(GestureOutcome::KeypointSelected(0)));

        assert_eq!(interaction.delete_selected_keypoint(&mut set), Some(0));
        let skeleton = set.annotations[0].skeleton.as_ref().unwrap();
        assert!(!skeleton.keypoints[0].visible);
        assert!(interaction.selected_keypoint().is_none());
    }

    #[test]
    fn keypoint_drag_moves_only_that_keypoint() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = skeleton_category();

        click(&mut interaction, &mut set, &cat, 100.0, 100.0);
        click(&mut interaction, &mut set, &cat, 300.0, 100.0);
        click(&mut interaction, &mut set, &cat, 200.0, 300.0);
        click(&mut interaction, &mut set, &cat, 100.0, 100.0);
        let skeleton = set.annotations[0].skeleton.as_ref().unwrap();
        let (kx, ky) = (skeleton.keypoints[0].x, skeleton.keypoints[0].y);
        let other = (skeleton.keypoints[1].x, skeleton.keypoints[1].y);
        let polygon_before = set.annotations[0].polygon.clone();

        let outcome = drag(
            &mut interaction,
            &mut set,
            &cat,
            (kx, ky),
            (kx + 20.0, ky + 10.0),
        );
        assert_eq!(outcome, Some(GestureOutcome::GeometryMoved));
        let skeleton = set.annotations[0].skeleton.as_ref().unwrap();
        assert_eq!(skeleton.keypoints[0].x, kx + 20.0);
        assert_eq!(skeleton.keypoints[0].y, ky + 10.0);
        assert_eq!((skeleton.keypoints[1].x, skeleton.keypoints[1].y), other);
        assert_eq!(set.annotations[0].polygon, polygon_before);
    }

    #[test]
    fn non_primary_button_is_ignored() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = polygon_category();

        interaction.on_pointer_down(
            Point::new(100.0, 100.0),
            PointerButton::Secondary,
            &mut set,
            &canvas(),
            &cat,
        );
        assert_eq!(interaction.state(), DragState::Idle);
        assert!(interaction.on_pointer_up(&mut set, &cat).is_none());
    }

    #[test]
    fn pointer_down_outside_canvas_is_ignored() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = box_category();

        interaction.on_pointer_down(
            Point::new(2000.0, 2000.0),
            PointerButton::Primary,
            &mut set,
            &canvas(),
            &cat,
        );
        assert_eq!(interaction.state(), DragState::Idle);
        assert!(set.annotations.is_empty());
    }

    #[test]
    fn cancel_rolls_back_open_polygon() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = polygon_category();

        click(&mut interaction, &mut set, &cat, 100.0, 100.0);
        click(&mut interaction, &mut set, &cat, 200.0, 100.0);
        assert_eq!(set.annotations.len(), 1);

        interaction.cancel(&mut set);
        assert!(set.annotations.is_empty());
        assert_eq!(interaction.state(), DragState::Idle);
    }

    #[test]
    fn moved_shape_bbox_stays_derived() {
        let mut interaction = Interaction::new();
        let mut set = AnnotationSet::new();
        let cat = box_category();
        drag(
            &mut interaction,
            &mut set,
            &cat,
            (100.0, 100.0),
            (200.0, 200.0),
        );

        drag(
            &mut interaction,
            &mut set,
            &cat,
            (150.0, 150.0),
            (180.0, 170.0),
        );
        let anno = &set.annotations[0];
        assert_eq!(anno.bbox, bbox_of(&anno.polygon));
        assert_eq!(anno.bbox, [130.0, 120.0, 100.0, 100.0]);
    }
}
