// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image/video display and annotation.
//!
//! Stateless: redraws the media texture and every annotation each frame
//! from the state it is handed, and reports raw pointer events back to the
//! application in viewport (panel-local) coordinates.

use crate::engine::hit::{KEYPOINT_RADIUS, VERTEX_RADIUS};
use crate::engine::interaction::{CursorHint, PointerButton};
use crate::engine::viewport::CanvasPos;
use crate::models::annotation::{Annotation, AnnotationSet, Point};
use crate::models::category::LabelCategory;

/// A pointer event in viewport coordinates.
pub enum CanvasEvent {
    Resized { w: f64, h: f64 },
    PointerDown(Point, PointerButton),
    PointerMoved(Point),
    PointerUp,
}

/// Display the canvas area, returning the pointer events that occurred
/// over it this frame.
pub fn show(
    ui: &mut egui::Ui,
    texture: Option<&egui::TextureHandle>,
    canvas: CanvasPos,
    set: &AnnotationSet,
    categories: &[LabelCategory],
    cursor: CursorHint,
) -> Vec<CanvasEvent> {
    let mut events = Vec::new();
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();
    let (rect, response) =
        ui.allocate_exact_size(available_size, egui::Sense::click_and_drag());
    events.push(CanvasEvent::Resized {
        w: rect.width() as f64,
        h: rect.height() as f64,
    });

    let Some(texture) = texture else {
        draw_welcome(ui, rect);
        return events;
    };

    // Pointer events, translated to panel-local coordinates.
    let origin = rect.min;
    if let Some(pos) = response.hover_pos().or_else(|| response.interact_pointer_pos()) {
        let local = Point::new((pos.x - origin.x) as f64, (pos.y - origin.y) as f64);
        ui.input(|i| {
            if i.pointer.primary_pressed() {
                events.push(CanvasEvent::PointerDown(local, PointerButton::Primary));
            } else if i.pointer.secondary_pressed() {
                events.push(CanvasEvent::PointerDown(local, PointerButton::Secondary));
            }
        });
        events.push(CanvasEvent::PointerMoved(local));
        ui.ctx().set_cursor_icon(cursor_icon(cursor));
    }
    if ui.input(|i| i.pointer.primary_released()) {
        events.push(CanvasEvent::PointerUp);
    }

    // Everything below draws clipped to the panel.
    let painter = ui.painter().with_clip_rect(rect);
    let image_rect = egui::Rect::from_min_size(
        origin + egui::vec2(canvas.dx as f32, canvas.dy as f32),
        egui::vec2(canvas.w as f32, canvas.h as f32),
    );
    painter.image(
        texture.id(),
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    for (idx, anno) in set.annotations.iter().enumerate() {
        if !anno.visible {
            continue;
        }
        let color = category_color(categories, anno.category_id);
        let selected = set.current == Some(idx);
        draw_annotation(&painter, origin, anno, color, selected);
        draw_label(&painter, origin, anno, categories, idx, set, color);
    }

    events
}

fn draw_annotation(
    painter: &egui::Painter,
    origin: egui::Pos2,
    anno: &Annotation,
    color: egui::Color32,
    selected: bool,
) {
    let points: Vec<egui::Pos2> = anno.polygon.iter().map(|p| to_pos2(origin, *p)).collect();
    if points.is_empty() {
        return;
    }

    let stroke_width = if selected { 3.0 } else { 2.0 };
    let stroke = egui::Stroke::new(stroke_width, color);
    if anno.is_over {
        painter.add(egui::Shape::closed_line(points.clone(), stroke));
        let fill = egui::Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 28);
        painter.add(egui::Shape::convex_polygon(
            points.clone(),
            fill,
            egui::Stroke::NONE,
        ));
    } else {
        painter.add(egui::Shape::line(points.clone(), stroke));
    }

    for p in &points {
        painter.circle_filled(*p, VERTEX_RADIUS as f32, egui::Color32::WHITE);
        painter.circle_stroke(*p, VERTEX_RADIUS as f32, egui::Stroke::new(1.0, color));
    }

    if let Some(skeleton) = &anno.skeleton {
        for bone in &skeleton.bones {
            let (Some(a), Some(b)) = (
                skeleton.keypoints.get(bone.start),
                skeleton.keypoints.get(bone.end),
            ) else {
                continue;
            };
            if a.visible && b.visible {
                painter.line_segment(
                    [
                        to_pos2(origin, Point::new(a.x, a.y)),
                        to_pos2(origin, Point::new(b.x, b.y)),
                    ],
                    egui::Stroke::new(1.5, color),
                );
            }
        }
        for kp in &skeleton.keypoints {
            if !kp.visible {
                continue;
            }
            let center = to_pos2(origin, Point::new(kp.x, kp.y));
            painter.circle_filled(center, KEYPOINT_RADIUS as f32, color);
            painter.circle_stroke(
                center,
                KEYPOINT_RADIUS as f32,
                egui::Stroke::new(1.0, egui::Color32::BLACK),
            );
        }
    }
}

fn draw_label(
    painter: &egui::Painter,
    origin: egui::Pos2,
    anno: &Annotation,
    categories: &[LabelCategory],
    idx: usize,
    set: &AnnotationSet,
    color: egui::Color32,
) {
    if !anno.is_over {
        return;
    }
    let name = categories
        .iter()
        .find(|c| c.id == anno.category_id)
        .map(|c| c.name.as_str())
        .unwrap_or("?");
    // Duplicate categories get a running index in the tag.
    let nth = set.annotations[..=idx]
        .iter()
        .filter(|a| a.category_id == anno.category_id)
        .count();
    let anchor = to_pos2(origin, Point::new(anno.bbox[0], anno.bbox[1]));
    painter.text(
        anchor - egui::vec2(0.0, 2.0),
        egui::Align2::LEFT_BOTTOM,
        format!("{} {}", name, nth),
        egui::FontId::proportional(12.0),
        color,
    );
}

fn draw_welcome(ui: &mut egui::Ui, rect: egui::Rect) {
    let mut child = ui.child_ui(rect, egui::Layout::top_down(egui::Align::Center), None);
    child.add_space(rect.height() / 3.0);
    child.heading(
        egui::RichText::new("LARIAT")
            .size(32.0)
            .color(egui::Color32::from_gray(200)),
    );
    child.label(
        egui::RichText::new("Label And Region Interactive Annotation Tool")
            .size(14.0)
            .color(egui::Color32::from_gray(150)),
    );
    child.add_space(20.0);
    child.label(
        egui::RichText::new("Open an image or load a project to begin annotating")
            .color(egui::Color32::from_gray(180)),
    );
}

fn cursor_icon(hint: CursorHint) -> egui::CursorIcon {
    match hint {
        CursorHint::Crosshair => egui::CursorIcon::Crosshair,
        CursorHint::Pointer => egui::CursorIcon::PointingHand,
        CursorHint::Move => egui::CursorIcon::Move,
        CursorHint::Grab => egui::CursorIcon::Grab,
        CursorHint::Grabbing => egui::CursorIcon::Grabbing,
    }
}

fn to_pos2(origin: egui::Pos2, p: Point) -> egui::Pos2 {
    origin + egui::vec2(p.x as f32, p.y as f32)
}

fn category_color(categories: &[LabelCategory], id: u32) -> egui::Color32 {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| egui::Color32::from_rgb(c.color[0], c.color[1], c.color[2]))
        .unwrap_or(egui::Color32::YELLOW)
}
