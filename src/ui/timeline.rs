// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video timeline scrubber and keyframe controls.
//!
//! Shown only for video tasks: a frame slider with keyframe tick marks for
//! the selected track, transport buttons, and keyframe authoring buttons.

use crate::engine::playback::Playback;

/// Result of timeline interaction.
pub enum TimelineAction {
    None,
    Seek(u32),
    TogglePlay,
    PrevKeyframe,
    NextKeyframe,
    AddKeyframe,
    DeleteKeyframe,
    ToggleLerp,
}

/// Display the timeline. `keyframe_marks` are the selected track's authored
/// frames; `on_keyframe` says whether the current frame is one of them.
pub fn show(
    ui: &mut egui::Ui,
    playback: &Playback,
    keyframe_marks: &[u32],
    has_track: bool,
    on_keyframe: bool,
) -> TimelineAction {
    let mut action = TimelineAction::None;
    let last = playback.last_frame();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 6.0;

        let play_label = if playback.is_running() { "⏸" } else { "▶" };
        if ui.button(play_label).on_hover_text("Play/pause (Space)").clicked() {
            action = TimelineAction::TogglePlay;
        }

        if ui
            .add_enabled(has_track, egui::Button::new("⏮"))
            .on_hover_text("Previous keyframe")
            .clicked()
        {
            action = TimelineAction::PrevKeyframe;
        }
        if ui
            .add_enabled(has_track, egui::Button::new("⏭"))
            .on_hover_text("Next keyframe")
            .clicked()
        {
            action = TimelineAction::NextKeyframe;
        }

        let mut frame = playback.frame();
        let slider = ui.add(
            egui::Slider::new(&mut frame, 0..=last)
                .show_value(false)
                .trailing_fill(true),
        );
        if slider.changed() {
            action = TimelineAction::Seek(frame);
        }
        draw_keyframe_marks(ui, slider.rect, keyframe_marks, last);

        ui.label(format!("{} / {}", playback.frame(), last));

        ui.separator();

        if ui
            .add_enabled(has_track && !on_keyframe, egui::Button::new("◆ Add key"))
            .on_hover_text("Author a keyframe at this frame")
            .clicked()
        {
            action = TimelineAction::AddKeyframe;
        }
        if ui
            .add_enabled(
                has_track && on_keyframe && keyframe_marks.len() > 1,
                egui::Button::new("◇ Remove key"),
            )
            .on_hover_text("Remove the keyframe at this frame")
            .clicked()
        {
            action = TimelineAction::DeleteKeyframe;
        }
        if ui
            .add_enabled(has_track, egui::Button::new("⇄ Lerp"))
            .on_hover_text("Toggle interpolation for this interval")
            .clicked()
        {
            action = TimelineAction::ToggleLerp;
        }
    });

    action
}

/// Paint a tick above the slider track for each authored keyframe.
fn draw_keyframe_marks(ui: &egui::Ui, rect: egui::Rect, marks: &[u32], last: u32) {
    if last == 0 {
        return;
    }
    let painter = ui.painter();
    for &frame in marks {
        let t = frame.min(last) as f32 / last as f32;
        let x = rect.left() + t * rect.width();
        painter.line_segment(
            [
                egui::pos2(x, rect.top()),
                egui::pos2(x, rect.top() + 5.0),
            ],
            egui::Stroke::new(2.0, egui::Color32::GOLD),
        );
    }
}
