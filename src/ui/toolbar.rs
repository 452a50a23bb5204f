// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with category selection and view controls.
//!
//! The active category doubles as the drawing tool: its kind decides what
//! a canvas gesture creates.

use crate::models::annotation::AnnotationKind;
use crate::models::category::LabelCategory;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    SelectCategory(usize),
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Undo,
    Redo,
}

/// Display the toolbar with category buttons and zoom/history controls.
pub fn show(
    ui: &mut egui::Ui,
    categories: &[LabelCategory],
    active_category: usize,
    zoom: f64,
    can_undo: bool,
    can_redo: bool,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Labels:");
        for (idx, category) in categories.iter().enumerate() {
            let color = egui::Color32::from_rgb(
                category.color[0],
                category.color[1],
                category.color[2],
            );
            let text = egui::RichText::new(format!(
                "{} {}",
                kind_glyph(category.kind),
                category.name
            ))
            .color(color);
            if ui.selectable_label(idx == active_category, text).clicked() {
                action = ToolbarAction::SelectCategory(idx);
            }
        }

        ui.separator();

        if ui.button("−").on_hover_text("Zoom out").clicked() {
            action = ToolbarAction::ZoomOut;
        }
        ui.label(format!("{:.0}%", zoom * 100.0));
        if ui.button("+").on_hover_text("Zoom in").clicked() {
            action = ToolbarAction::ZoomIn;
        }
        if ui.button("Fit").on_hover_text("Reset zoom").clicked() {
            action = ToolbarAction::ResetZoom;
        }

        ui.separator();

        if ui
            .add_enabled(can_undo, egui::Button::new("↶ Undo"))
            .clicked()
        {
            action = ToolbarAction::Undo;
        }
        if ui
            .add_enabled(can_redo, egui::Button::new("↷ Redo"))
            .clicked()
        {
            action = ToolbarAction::Redo;
        }

        ui.separator();

        let hint = categories
            .get(active_category)
            .map(|c| kind_hint(c.kind))
            .unwrap_or("Load a project to get label categories");
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}

fn kind_glyph(kind: AnnotationKind) -> &'static str {
    match kind {
        AnnotationKind::Polygon => "▱",
        AnnotationKind::Box => "▭",
        AnnotationKind::Skeleton => "☊",
        AnnotationKind::ClassifyOnly => "◉",
    }
}

fn kind_hint(kind: AnnotationKind) -> &'static str {
    match kind {
        AnnotationKind::Polygon => "Click to add vertices, click the first vertex to close",
        AnnotationKind::Box => "Drag to draw a box",
        AnnotationKind::Skeleton => {
            "Outline the subject; keypoints are placed inside when it closes"
        }
        AnnotationKind::ClassifyOnly => "Pick classification labels in the properties panel",
    }
}
