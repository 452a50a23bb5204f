// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation properties panel.
//!
//! Lists the annotations on the current frame with selection, visibility
//! and delete controls, and exposes the classification label picker for
//! tasks that carry one.

use crate::models::annotation::AnnotationSet;
use crate::models::category::LabelCategory;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    Select(usize),
    Delete(usize),
    ToggleVisible(usize),
    /// Toggle a classification label by category id.
    ToggleClassify(u32),
    ShowAllKeypoints,
    ClearAll,
}

/// Display the properties panel.
pub fn show(
    ui: &mut egui::Ui,
    set: &AnnotationSet,
    categories: &[LabelCategory],
    classification: &[u32],
    can_multi: bool,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Labels");
    ui.separator();

    let classify_cats: Vec<&LabelCategory> = categories
        .iter()
        .filter(|c| c.kind == crate::models::annotation::AnnotationKind::ClassifyOnly)
        .collect();
    if !classify_cats.is_empty() {
        ui.label(if can_multi {
            "Classification (multiple)"
        } else {
            "Classification"
        });
        for category in classify_cats {
            let checked = classification.contains(&category.id);
            if ui.selectable_label(checked, &category.name).clicked() {
                action = PropertiesAction::ToggleClassify(category.id);
            }
        }
        ui.separator();
    }

    if set.annotations.is_empty() {
        ui.label(egui::RichText::new("No annotations yet").weak());
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (idx, anno) in set.annotations.iter().enumerate() {
            let name = categories
                .iter()
                .find(|c| c.id == anno.category_id)
                .map(|c| c.name.as_str())
                .unwrap_or("?");
            let nth = set.annotations[..=idx]
                .iter()
                .filter(|a| a.category_id == anno.category_id)
                .count();

            ui.horizontal(|ui| {
                let selected = set.current == Some(idx);
                if ui
                    .selectable_label(selected, format!("{} {}", name, nth))
                    .clicked()
                {
                    action = PropertiesAction::Select(idx);
                }
                let eye = if anno.visible { "👁" } else { "–" };
                if ui.small_button(eye).on_hover_text("Toggle visibility").clicked() {
                    action = PropertiesAction::ToggleVisible(idx);
                }
                if ui.small_button("✖").on_hover_text("Delete").clicked() {
                    action = PropertiesAction::Delete(idx);
                }
            });
        }
    });

    let has_hidden_keypoints = set.annotations.iter().any(|a| {
        a.skeleton
            .as_ref()
            .is_some_and(|s| s.keypoints.iter().any(|kp| !kp.visible))
    });
    if has_hidden_keypoints {
        ui.separator();
        if ui.button("Show all keypoints").clicked() {
            action = PropertiesAction::ShowAllKeypoints;
        }
    }

    ui.separator();
    if ui.button("Clear all").clicked() {
        action = PropertiesAction::ClearAll;
    }

    action
}
