// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! Owns the runtime annotation state and wires the engine to the panels:
//! pointer events flow from the canvas into the interaction state machine,
//! completed gestures are committed (to the image annotation set or, for
//! video, to track keyframes) and recorded in history, and every viewport
//! change is propagated to geometry through explicit remaps.

use std::sync::mpsc::{channel, Receiver};

use crate::engine::history::{HistoryEntry, HistoryStack};
use crate::engine::interaction::{DragState, GestureOutcome, Interaction};
use crate::engine::playback::Playback;
use crate::engine::viewport::{MediaSize, Remap, Viewport};
use crate::io::{media, serialization};
use crate::models::annotation::{Annotation, AnnotationKind, AnnotationSet, Skeleton};
use crate::models::category::LabelCategory;
use crate::models::project::ProjectData;
use crate::models::track::{AnnotationTrack, Keyframe};
use crate::ui::{canvas, properties, timeline, toolbar};

/// One undoable unit of label state. Tagged so an entry restores exactly
/// the kind of state it changed and nothing else.
#[derive(Debug, Clone)]
enum LabelSnapshot {
    Classify(Vec<u32>),
    Detection(Vec<Annotation>),
    Tracks(Vec<AnnotationTrack>),
}

/// Result of background media loading.
struct LoadedMediaData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    project: ProjectData,
}

/// Main application state.
pub struct LariatApp {
    media_file: String,
    categories: Vec<LabelCategory>,
    active_category: usize,
    can_multi: bool,
    classification: Vec<u32>,

    /// Image-task annotations, viewport space.
    annotations: AnnotationSet,
    /// Video-task tracks; `display` mirrors them at the current frame.
    tracks: Vec<AnnotationTrack>,
    display: AnnotationSet,
    /// Display index -> track index, valid until the next resync.
    display_track: Vec<usize>,
    selected_track: Option<usize>,
    is_video: bool,

    viewport: Viewport,
    interaction: Interaction,
    history: HistoryStack<LabelSnapshot>,
    playback: Playback,
    /// Pre-gesture snapshot taken at pointer-down.
    gesture_old: Option<LabelSnapshot>,

    texture: Option<egui::TextureHandle>,
    media_loader: Option<Receiver<Result<LoadedMediaData, String>>>,
    loading_message: Option<String>,
    /// A loaded project waiting for a valid viewport before its stored
    /// geometry can be converted to viewport space.
    pending_project: Option<ProjectData>,
}

impl Default for LariatApp {
    fn default() -> Self {
        Self::new()
    }
}

impl LariatApp {
    pub fn new() -> Self {
        Self {
            media_file: String::new(),
            categories: Vec::new(),
            active_category: 0,
            can_multi: false,
            classification: Vec::new(),
            annotations: AnnotationSet::new(),
            tracks: Vec::new(),
            display: AnnotationSet::new(),
            display_track: Vec::new(),
            selected_track: None,
            is_video: false,
            viewport: Viewport::new(),
            interaction: Interaction::new(),
            history: HistoryStack::new(),
            playback: Playback::default(),
            gesture_old: None,
            texture: None,
            media_loader: None,
            loading_message: None,
            pending_project: None,
        }
    }

    fn active_category(&self) -> Option<&LabelCategory> {
        self.categories.get(self.active_category)
    }

    /// Snapshot the geometry state a gesture can change.
    fn geometry_snapshot(&self) -> LabelSnapshot {
        if self.is_video {
            LabelSnapshot::Tracks(self.tracks.clone())
        } else {
            LabelSnapshot::Detection(self.annotations.annotations.clone())
        }
    }

    fn restore(&mut self, snapshot: LabelSnapshot) {
        match snapshot {
            LabelSnapshot::Classify(ids) => self.classification = ids,
            LabelSnapshot::Detection(annos) => {
                self.annotations.annotations = annos;
                self.annotations.current = None;
            }
            LabelSnapshot::Tracks(tracks) => {
                self.tracks = tracks;
                self.selected_track = None;
            }
        }
        self.interaction = Interaction::new();
        self.gesture_old = None;
        self.sync_display();
    }

    fn undo(&mut self) {
        if let Some(snapshot) = self.history.undo() {
            self.restore(snapshot);
            log::info!("Undo");
        }
    }

    fn redo(&mut self) {
        if let Some(snapshot) = self.history.redo() {
            self.restore(snapshot);
            log::info!("Redo");
        }
    }

    /// Record a mutation performed between `old` and now.
    fn push_history(&mut self, old: LabelSnapshot) {
        let cur = match &old {
            LabelSnapshot::Classify(_) => LabelSnapshot::Classify(self.classification.clone()),
            LabelSnapshot::Detection(_) => {
                LabelSnapshot::Detection(self.annotations.annotations.clone())
            }
            LabelSnapshot::Tracks(_) => LabelSnapshot::Tracks(self.tracks.clone()),
        };
        self.history.push(HistoryEntry { old, cur });
    }

    fn push_gesture_history(&mut self) {
        if let Some(old) = self.gesture_old.take() {
            self.push_history(old);
        }
    }

    /// Rebuild the per-frame display set from the tracks. Skipped while a
    /// gesture is in flight so it cannot yank geometry out from under the
    /// pointer.
    fn sync_display(&mut self) {
        if !self.is_video || self.interaction.gesture_active() {
            return;
        }
        let frame = self.playback.frame();
        self.display.clear();
        self.display_track.clear();
        let mut current = None;
        for (idx, track) in self.tracks.iter_mut().enumerate() {
            track.refresh(frame);
            if !track.has_geometry() {
                continue;
            }
            let mut anno = Annotation::new(track.category_id, track.kind, track.polygon.clone());
            anno.id = track.id;
            anno.is_over = true;
            if !track.keypoints.is_empty() {
                let bones = self
                    .categories
                    .iter()
                    .find(|c| c.id == track.category_id)
                    .map(|c| c.bones.clone())
                    .unwrap_or_default();
                anno.skeleton = Some(Skeleton {
                    keypoints: track.keypoints.clone(),
                    bones,
                });
            }
            if self.selected_track == Some(idx) {
                current = Some(self.display.annotations.len());
            }
            self.display.annotations.push(anno);
            self.display_track.push(idx);
        }
        self.display.current = current;
    }

    fn seek(&mut self, frame: u32) {
        if self.playback.set_frame(frame) {
            self.sync_display();
        }
    }

    /// Propagate a canvas-rectangle change to all viewport-space geometry.
    fn apply_remap(&mut self, remap: Remap) {
        for anno in &mut self.annotations.annotations {
            remap_annotation(&remap, anno);
        }
        for anno in &mut self.display.annotations {
            remap_annotation(&remap, anno);
        }
        for track in &mut self.tracks {
            for kf in &mut track.keyframes {
                for p in &mut kf.polygon {
                    remap.apply(p);
                }
                for kp in &mut kf.keypoints {
                    remap.apply_xy(&mut kp.x, &mut kp.y);
                }
            }
            for p in &mut track.polygon {
                remap.apply(p);
            }
            for kp in &mut track.keypoints {
                remap.apply_xy(&mut kp.x, &mut kp.y);
            }
        }
    }

    /// Promote the just-closed display annotation to a new track with its
    /// first keyframe at the current frame.
    fn commit_new_track(&mut self) {
        let Some(anno) = self.display.current() else {
            return;
        };
        let mut track = AnnotationTrack::new(anno.id, anno.category_id, anno.kind);
        let keyframe = Keyframe {
            frame: self.playback.frame(),
            polygon: anno.polygon.clone(),
            keypoints: anno
                .skeleton
                .as_ref()
                .map(|s| s.keypoints.clone())
                .unwrap_or_default(),
            lerp_after: true,
        };
        if let Err(e) = track.insert_keyframe(keyframe) {
            log::error!("Failed to create track: {}", e);
            return;
        }
        self.tracks.push(track);
        self.selected_track = Some(self.tracks.len() - 1);
    }

    /// Write the current display geometry of the edited track back as a
    /// keyframe at the current frame, replacing one authored there.
    fn commit_display_geometry(&mut self) {
        let Some(display_idx) = self.display.current else {
            return;
        };
        let Some(&track_idx) = self.display_track.get(display_idx) else {
            return;
        };
        let anno = &self.display.annotations[display_idx];
        let polygon = anno.polygon.clone();
        let keypoints = anno
            .skeleton
            .as_ref()
            .map(|s| s.keypoints.clone())
            .unwrap_or_default();
        let frame = self.playback.frame();
        let track = &mut self.tracks[track_idx];
        self.selected_track = Some(track_idx);

        if let Some(idx) = track.keyframe_at(frame) {
            track.keyframes[idx].polygon = polygon;
            track.keyframes[idx].keypoints = keypoints;
        } else if let Err(e) = track.insert_keyframe(Keyframe {
            frame,
            polygon,
            keypoints,
            lerp_after: true,
        }) {
            log::error!("Failed to author keyframe: {}", e);
        }
    }

    fn handle_canvas_events(&mut self, events: Vec<canvas::CanvasEvent>) {
        for event in events {
            match event {
                canvas::CanvasEvent::Resized { w, h } => {
                    if let Some(remap) = self.viewport.set_view_size(w, h) {
                        self.apply_remap(remap);
                    }
                }
                canvas::CanvasEvent::PointerDown(pos, button) => {
                    let Some(category) = self.active_category().cloned() else {
                        continue;
                    };
                    if self.interaction.state() == DragState::Idle {
                        self.gesture_old = Some(self.geometry_snapshot());
                    }
                    let canvas_pos = self.viewport.canvas();
                    let Self {
                        interaction,
                        annotations,
                        display,
                        is_video,
                        ..
                    } = self;
                    let set = if *is_video { display } else { annotations };
                    interaction.on_pointer_down(pos, button, set, &canvas_pos, &category);
                    // Keep the timeline's track selection in step with the
                    // canvas selection.
                    if self.is_video {
                        self.selected_track = self
                            .display
                            .current
                            .and_then(|i| self.display_track.get(i).copied());
                    }
                }
                canvas::CanvasEvent::PointerMoved(pos) => {
                    let Self {
                        interaction,
                        annotations,
                        display,
                        is_video,
                        ..
                    } = self;
                    let set = if *is_video { display } else { annotations };
                    interaction.on_pointer_move(pos, set);
                }
                canvas::CanvasEvent::PointerUp => {
                    let Some(category) = self.active_category().cloned() else {
                        continue;
                    };
                    let outcome = {
                        let Self {
                            interaction,
                            annotations,
                            display,
                            is_video,
                            ..
                        } = self;
                        let set = if *is_video { display } else { annotations };
                        interaction.on_pointer_up(set, &category)
                    };
                    if let Some(outcome) = outcome {
                        self.handle_outcome(outcome);
                    }
                }
            }
        }
    }

    fn handle_outcome(&mut self, outcome: GestureOutcome) {
        match outcome {
            GestureOutcome::VertexCommitted => {}
            GestureOutcome::PolygonClosed | GestureOutcome::BoxCreated => {
                if self.is_video {
                    self.commit_new_track();
                }
                self.push_gesture_history();
                self.sync_display();
                log::info!("Annotation created");
            }
            GestureOutcome::PolygonDiscarded | GestureOutcome::BoxDiscarded => {
                self.gesture_old = None;
                self.sync_display();
                log::info!("Degenerate annotation discarded");
            }
            GestureOutcome::GeometryMoved => {
                if self.is_video {
                    self.commit_display_geometry();
                }
                self.push_gesture_history();
                self.sync_display();
            }
            GestureOutcome::KeypointSelected(idx) => {
                self.gesture_old = None;
                log::info!("Selected keypoint {}", idx);
            }
        }
    }

    /// Delete key: hide the selected keypoint if one is picked, otherwise
    /// remove the current annotation/track.
    fn delete_pressed(&mut self) {
        if self.interaction.selected_keypoint().is_some() {
            let old = self.geometry_snapshot();
            let hidden = {
                let Self {
                    interaction,
                    annotations,
                    display,
                    is_video,
                    ..
                } = self;
                let set = if *is_video { display } else { annotations };
                interaction.delete_selected_keypoint(set)
            };
            if hidden.is_some() {
                if self.is_video {
                    self.commit_display_geometry();
                }
                self.push_history(old);
                log::info!("Hid keypoint");
            }
            return;
        }
        self.delete_current();
    }

    fn delete_current(&mut self) {
        if self.is_video {
            let Some(display_idx) = self.display.current else {
                return;
            };
            let Some(&track_idx) = self.display_track.get(display_idx) else {
                return;
            };
            let old = self.geometry_snapshot();
            self.tracks.remove(track_idx);
            self.selected_track = None;
            self.push_history(old);
            self.sync_display();
            log::info!("Deleted track, total: {}", self.tracks.len());
        } else {
            let Some(idx) = self.annotations.current else {
                return;
            };
            let old = self.geometry_snapshot();
            self.annotations.remove(idx);
            self.push_history(old);
            log::info!("Deleted annotation, total: {}", self.annotations.annotations.len());
        }
    }

    fn clear_all(&mut self) {
        let old = self.geometry_snapshot();
        if self.is_video {
            if self.tracks.is_empty() {
                return;
            }
            self.tracks.clear();
            self.selected_track = None;
        } else {
            if self.annotations.annotations.is_empty() {
                return;
            }
            self.annotations.clear();
        }
        self.push_history(old);
        self.sync_display();
        log::info!("Cleared all annotations");
    }

    fn toggle_classification(&mut self, id: u32) {
        let old = LabelSnapshot::Classify(self.classification.clone());
        if let Some(pos) = self.classification.iter().position(|&c| c == id) {
            self.classification.remove(pos);
        } else {
            if !self.can_multi {
                self.classification.clear();
            }
            self.classification.push(id);
        }
        self.push_history(old);
    }

    fn show_all_keypoints(&mut self) {
        let old = self.geometry_snapshot();
        if self.is_video {
            for track in &mut self.tracks {
                for kf in &mut track.keyframes {
                    for kp in &mut kf.keypoints {
                        kp.visible = true;
                    }
                }
            }
        } else {
            for anno in &mut self.annotations.annotations {
                if let Some(skeleton) = &mut anno.skeleton {
                    skeleton.show_all();
                }
            }
        }
        self.push_history(old);
        self.sync_display();
    }

    fn handle_timeline_action(&mut self, action: timeline::TimelineAction) {
        match action {
            timeline::TimelineAction::None => {}
            timeline::TimelineAction::Seek(frame) => self.seek(frame),
            timeline::TimelineAction::TogglePlay => self.playback.toggle(),
            timeline::TimelineAction::PrevKeyframe => {
                if let Some(frame) = self
                    .selected_track
                    .and_then(|i| self.tracks.get(i))
                    .and_then(|t| t.prev_keyframe(self.playback.frame()))
                {
                    self.seek(frame);
                }
            }
            timeline::TimelineAction::NextKeyframe => {
                if let Some(frame) = self
                    .selected_track
                    .and_then(|i| self.tracks.get(i))
                    .and_then(|t| t.next_keyframe(self.playback.frame()))
                {
                    self.seek(frame);
                }
            }
            timeline::TimelineAction::AddKeyframe => self.add_keyframe(),
            timeline::TimelineAction::DeleteKeyframe => self.delete_keyframe(),
            timeline::TimelineAction::ToggleLerp => {
                let frame = self.playback.frame();
                if self.selected_track.and_then(|i| self.tracks.get(i)).is_none() {
                    return;
                }
                let old = self.geometry_snapshot();
                if let Some(track) = self.selected_track.and_then(|i| self.tracks.get_mut(i)) {
                    if track.toggle_lerp_after(frame) {
                        self.push_history(old);
                        self.sync_display();
                        log::info!("Toggled interpolation at frame {}", frame);
                    }
                }
            }
        }
    }

    /// Author a keyframe at the current frame, copying the sampled
    /// geometry when the track displays here, or the nearest authored
    /// keyframe's geometry otherwise.
    fn add_keyframe(&mut self) {
        let frame = self.playback.frame();
        let Some(track_idx) = self.selected_track else {
            return;
        };
        let old = self.geometry_snapshot();
        let Some(track) = self.tracks.get_mut(track_idx) else {
            return;
        };
        if track.keyframe_at(frame).is_some() {
            return;
        }
        let (polygon, keypoints) = if track.has_geometry() {
            (track.polygon.clone(), track.keypoints.clone())
        } else {
            let neighbor = track
                .prev_keyframe(frame)
                .or_else(|| track.next_keyframe(frame))
                .and_then(|f| track.keyframe_at(f))
                .map(|i| &track.keyframes[i]);
            match neighbor {
                Some(kf) => (kf.polygon.clone(), kf.keypoints.clone()),
                None => return,
            }
        };
        match track.insert_keyframe(Keyframe {
            frame,
            polygon,
            keypoints,
            lerp_after: true,
        }) {
            Ok(()) => {
                self.push_history(old);
                self.sync_display();
                log::info!("Added keyframe at frame {}", frame);
            }
            Err(e) => log::error!("Failed to add keyframe: {}", e),
        }
    }

    /// Remove the keyframe at the current frame; a track always keeps at
    /// least one keyframe.
    fn delete_keyframe(&mut self) {
        let frame = self.playback.frame();
        let old = self.geometry_snapshot();
        let Some(track) = self.selected_track.and_then(|i| self.tracks.get_mut(i)) else {
            return;
        };
        if track.keyframes.len() <= 1 {
            return;
        }
        if track.remove_keyframe_at(frame).is_some() {
            self.push_history(old);
            self.sync_display();
            log::info!("Removed keyframe at frame {}", frame);
        }
    }

    fn handle_properties_action(&mut self, action: properties::PropertiesAction) {
        match action {
            properties::PropertiesAction::None => {}
            properties::PropertiesAction::Select(idx) => {
                if self.is_video {
                    self.display.current = Some(idx);
                    self.selected_track = self.display_track.get(idx).copied();
                } else {
                    self.annotations.current = Some(idx);
                }
            }
            properties::PropertiesAction::Delete(idx) => {
                if self.is_video {
                    self.display.current = Some(idx);
                    self.selected_track = self.display_track.get(idx).copied();
                } else {
                    self.annotations.current = Some(idx);
                }
                self.delete_current();
            }
            properties::PropertiesAction::ToggleVisible(idx) => {
                let set = if self.is_video {
                    &mut self.display
                } else {
                    &mut self.annotations
                };
                if let Some(anno) = set.annotations.get_mut(idx) {
                    anno.visible = !anno.visible;
                }
            }
            properties::PropertiesAction::ToggleClassify(id) => self.toggle_classification(id),
            properties::PropertiesAction::ShowAllKeypoints => self.show_all_keypoints(),
            properties::PropertiesAction::ClearAll => self.clear_all(),
        }
    }

    /// Build the on-disk document from the runtime state.
    fn build_project_data(&self) -> ProjectData {
        let media = self.viewport.media();
        let mut data = ProjectData::new(
            self.media_file.clone(),
            media.w as u32,
            media.h as u32,
            self.categories.clone(),
        );
        data.frame_count = self.playback.total_frames();
        data.can_multi = self.can_multi;
        data.classification = self.classification.clone();
        if self.is_video {
            data.tracks = self
                .tracks
                .iter()
                .map(|t| serialization::track_to_stored(t, &self.viewport))
                .collect();
        } else {
            data.annotations = self
                .annotations
                .annotations
                .iter()
                .filter(|a| a.is_over)
                .map(|a| serialization::annotation_to_stored(a, &self.viewport))
                .collect();
        }
        data
    }

    fn export_project(&self, path: std::path::PathBuf) {
        let data = self.build_project_data();
        let extension = path.extension().and_then(|s| s.to_str());
        let result = match extension {
            Some("yaml") | Some("yml") => serialization::export_yaml(&data, &path),
            Some("json") => serialization::export_json(&data, &path),
            _ => {
                log::error!("Unsupported file extension: {:?}", extension);
                return;
            }
        };
        match result {
            Ok(_) => log::info!("Exported project to {}", path.display()),
            Err(e) => log::error!("Failed to export project: {}", e),
        }
    }

    /// Load a project file and its referenced media (asynchronously).
    fn import_project(&mut self, path: std::path::PathBuf) {
        let (sender, receiver) = channel();
        self.media_loader = Some(receiver);
        self.loading_message = Some("Loading project and media...".to_string());

        std::thread::spawn(move || {
            let result = (|| -> Result<LoadedMediaData, String> {
                let extension = path.extension().and_then(|s| s.to_str());
                let project = match extension {
                    Some("yaml") | Some("yml") => serialization::import_yaml(&path)
                        .map_err(|e| format!("Failed to import YAML: {}", e))?,
                    Some("json") => serialization::import_json(&path)
                        .map_err(|e| format!("Failed to import JSON: {}", e))?,
                    _ => return Err(format!("Unsupported file extension: {:?}", extension)),
                };

                let media_path = std::path::PathBuf::from(&project.media_file);
                if !media_path.exists() {
                    return Err(format!(
                        "Referenced media not found: {}",
                        media_path.display()
                    ));
                }
                let loaded = media::load_image(&media_path)
                    .map_err(|e| format!("Failed to load media: {}", e))?;
                log::info!("Loaded project {}", path.display());

                Ok(LoadedMediaData {
                    width: loaded.width,
                    height: loaded.height,
                    pixels: loaded.pixels,
                    project,
                })
            })();
            let _ = sender.send(result);
        });
    }

    /// Load a bare image and start a fresh annotation session over it
    /// (asynchronously).
    pub fn load_image_file(&mut self, path: std::path::PathBuf) {
        let (sender, receiver) = channel();
        self.media_loader = Some(receiver);
        self.loading_message = Some("Loading image...".to_string());

        let path_string = path.to_string_lossy().to_string();
        std::thread::spawn(move || {
            let result = (|| -> Result<LoadedMediaData, String> {
                let loaded = media::load_image(&path)
                    .map_err(|e| format!("Failed to load image: {}", e))?;
                log::info!(
                    "Loaded image: {} ({}x{})",
                    path.display(),
                    loaded.width,
                    loaded.height
                );
                let project = ProjectData::new(
                    path_string,
                    loaded.width,
                    loaded.height,
                    default_categories(),
                );
                Ok(LoadedMediaData {
                    width: loaded.width,
                    height: loaded.height,
                    pixels: loaded.pixels,
                    project,
                })
            })();
            let _ = sender.send(result);
        });
    }

    fn poll_media_loader(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.media_loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.media_loader = None;
        self.loading_message = None;

        match result {
            Ok(loaded) => {
                let size = [loaded.width as usize, loaded.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
                let texture =
                    ctx.load_texture("loaded_media", color_image, egui::TextureOptions::LINEAR);
                self.texture = Some(texture);
                if let Some(remap) = self.viewport.set_media_size(MediaSize {
                    w: loaded.width as f64,
                    h: loaded.height as f64,
                }) {
                    self.apply_remap(remap);
                }
                self.pending_project = Some(loaded.project);
                log::info!("Media loaded successfully");
            }
            Err(e) => log::error!("Failed to load media: {}", e),
        }
    }

    /// Install a loaded project once the viewport can map its stored
    /// media-space geometry to viewport space.
    fn try_apply_pending_project(&mut self) {
        if self.pending_project.is_none() || !self.viewport.canvas().is_valid() {
            return;
        }
        let data = self.pending_project.take().unwrap();

        self.categories = data.categories.clone();
        self.active_category = 0;
        self.can_multi = data.can_multi;
        self.classification = data.classification.clone();
        self.is_video = data.is_video();
        self.playback = Playback::new(data.frame_rate, data.frame_count);
        self.annotations.clear();
        self.tracks.clear();
        self.display.clear();
        self.display_track.clear();
        self.selected_track = None;
        self.interaction = Interaction::new();
        self.history.clear();
        self.gesture_old = None;

        for stored in &data.annotations {
            match serialization::annotation_from_stored(stored, &self.categories, &self.viewport) {
                Ok(anno) => self.annotations.annotations.push(anno),
                Err(e) => log::error!("Skipping annotation: {}", e),
            }
        }
        for stored in &data.tracks {
            match serialization::track_from_stored(stored, &self.categories, &self.viewport) {
                Ok(track) => self.tracks.push(track),
                Err(e) => log::error!("Skipping track: {}", e),
            }
        }
        self.media_file = data.media_file;
        self.sync_display();
        log::info!(
            "Project ready: {} annotations, {} tracks",
            self.annotations.annotations.len(),
            self.tracks.len()
        );
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            let Self {
                interaction,
                annotations,
                display,
                is_video,
                ..
            } = self;
            let set = if *is_video { display } else { annotations };
            interaction.cancel(set);
            set.current = None;
            self.gesture_old = None;
        }

        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            self.delete_pressed();
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.undo();
        }
        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.redo();
        }

        if self.is_video {
            if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
                self.playback.toggle();
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
                let target = self.playback.frame().saturating_sub(1);
                self.seek(target);
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
                let target = self.playback.frame().saturating_add(1);
                self.seek(target);
            }
        }
    }

    fn handle_toolbar_action(&mut self, action: toolbar::ToolbarAction) {
        match action {
            toolbar::ToolbarAction::None => {}
            toolbar::ToolbarAction::SelectCategory(idx) => {
                self.active_category = idx;
            }
            toolbar::ToolbarAction::ZoomIn => {
                if let Some(remap) = self.viewport.zoom_step(1) {
                    self.apply_remap(remap);
                }
            }
            toolbar::ToolbarAction::ZoomOut => {
                if let Some(remap) = self.viewport.zoom_step(-1) {
                    self.apply_remap(remap);
                }
            }
            toolbar::ToolbarAction::ResetZoom => {
                if let Some(remap) = self.viewport.set_zoom(1.0) {
                    self.apply_remap(remap);
                }
            }
            toolbar::ToolbarAction::Undo => self.undo(),
            toolbar::ToolbarAction::Redo => self.redo(),
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", media::IMAGE_EXTENSIONS)
                            .pick_file()
                        {
                            self.load_image_file(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Load Project...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Projects", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            self.import_project(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.menu_button("Export Project", |ui| {
                        if ui.button("Export as YAML...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("project.yaml")
                                .save_file()
                            {
                                self.export_project(path);
                            }
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("project.json")
                                .save_file()
                            {
                                self.export_project(path);
                            }
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui
                        .add_enabled(self.history.can_undo(), egui::Button::new("Undo (Ctrl+Z)"))
                        .clicked()
                    {
                        self.undo();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(
                            self.history.can_redo(),
                            egui::Button::new("Redo (Ctrl+Shift+Z)"),
                        )
                        .clicked()
                    {
                        self.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    let has_selection = if self.is_video {
                        self.display.current.is_some()
                    } else {
                        self.annotations.current.is_some()
                    };
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Delete Selected"))
                        .clicked()
                    {
                        self.delete_current();
                        ui.close_menu();
                    }
                    if ui.button("Clear All").clicked() {
                        self.clear_all();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Zoom In").clicked() {
                        self.handle_toolbar_action(toolbar::ToolbarAction::ZoomIn);
                        ui.close_menu();
                    }
                    if ui.button("Zoom Out").clicked() {
                        self.handle_toolbar_action(toolbar::ToolbarAction::ZoomOut);
                        ui.close_menu();
                    }
                    if ui.button("Reset Zoom").clicked() {
                        self.handle_toolbar_action(toolbar::ToolbarAction::ResetZoom);
                        ui.close_menu();
                    }
                });
            });
        });
    }
}

impl eframe::App for LariatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_media_loader(ctx);
        self.try_apply_pending_project();

        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        // Advance video playback from the repaint clock.
        if self.is_video {
            let dt = ctx.input(|i| i.stable_dt) as f64;
            if self.playback.tick(dt) {
                self.sync_display();
            }
            if self.playback.is_running() {
                ctx.request_repaint();
            }
        }

        self.show_menu_bar(ctx);

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    &self.categories,
                    self.active_category,
                    self.viewport.zoom(),
                    self.history.can_undo(),
                    self.history.can_redo(),
                )
            })
            .inner;
        self.handle_toolbar_action(toolbar_action);

        if self.is_video {
            let frame = self.playback.frame();
            let (marks, on_keyframe) = match self.selected_track.and_then(|i| self.tracks.get(i)) {
                Some(track) => (
                    track.keyframes.iter().map(|k| k.frame).collect::<Vec<_>>(),
                    track.keyframe_at(frame).is_some(),
                ),
                None => (Vec::new(), false),
            };
            let timeline_action = egui::TopBottomPanel::bottom("timeline")
                .show(ctx, |ui| {
                    timeline::show(
                        ui,
                        &self.playback,
                        &marks,
                        self.selected_track.is_some(),
                        on_keyframe,
                    )
                })
                .inner;
            self.handle_timeline_action(timeline_action);
        }

        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| {
                let set = if self.is_video {
                    &self.display
                } else {
                    &self.annotations
                };
                properties::show(
                    ui,
                    set,
                    &self.categories,
                    &self.classification,
                    self.can_multi,
                )
            })
            .inner;
        self.handle_properties_action(properties_action);

        self.handle_keyboard(ctx);

        let canvas_events = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(message) = &self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    Vec::new()
                } else {
                    let set = if self.is_video {
                        &self.display
                    } else {
                        &self.annotations
                    };
                    canvas::show(
                        ui,
                        self.texture.as_ref(),
                        self.viewport.canvas(),
                        set,
                        &self.categories,
                        self.interaction.cursor(),
                    )
                }
            })
            .inner;
        self.handle_canvas_events(canvas_events);
    }
}

fn default_categories() -> Vec<LabelCategory> {
    vec![
        LabelCategory::new(1, "region", AnnotationKind::Polygon),
        LabelCategory::new(2, "object", AnnotationKind::Box),
    ]
}

fn remap_annotation(remap: &Remap, anno: &mut Annotation) {
    for p in &mut anno.polygon {
        remap.apply(p);
    }
    if let Some(skeleton) = &mut anno.skeleton {
        for kp in &mut skeleton.keypoints {
            remap.apply_xy(&mut kp.x, &mut kp.y);
        }
    }
    anno.recompute_bbox();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::interaction::PointerButton;
    use crate::models::annotation::Point;

    fn video_app() -> LariatApp {
        let mut app = LariatApp::new();
        app.viewport.set_view_size(1000.0, 1000.0);
        app.viewport.set_media_size(MediaSize {
            w: 1000.0,
            h: 1000.0,
        });
        app.categories = vec![LabelCategory::new(1, "car", AnnotationKind::Box)];
        app.is_video = true;
        app.playback = Playback::new(24.0, 100);
        app
    }

    fn drag_events(from: (f64, f64), to: (f64, f64)) -> Vec<canvas::CanvasEvent> {
        vec![
            canvas::CanvasEvent::PointerDown(
                Point::new(from.0, from.1),
                PointerButton::Primary,
            ),
            canvas::CanvasEvent::PointerMoved(Point::new(to.0, to.1)),
            canvas::CanvasEvent::PointerUp,
        ]
    }

    #[test]
    fn box_gesture_creates_track_with_first_keyframe() {
        let mut app = video_app();
        app.handle_canvas_events(drag_events((100.0, 100.0), (200.0, 200.0)));

        assert_eq!(app.tracks.len(), 1);
        let track = &app.tracks[0];
        assert_eq!(track.keyframes.len(), 1);
        assert_eq!(track.keyframes[0].frame, 0);
        assert!(track.keyframes[0].lerp_after);
        assert_eq!(app.selected_track, Some(0));
        // The display mirrors the track after the commit.
        assert_eq!(app.display.annotations.len(), 1);
        assert!(app.history.can_undo());
    }

    #[test]
    fn moving_held_geometry_authors_a_keyframe() {
        let mut app = video_app();
        app.handle_canvas_events(drag_events((100.0, 100.0), (200.0, 200.0)));
        app.seek(10);
        assert_eq!(app.display.annotations.len(), 1);

        // Drag the body; a new keyframe lands at frame 10.
        app.handle_canvas_events(drag_events((150.0, 150.0), (180.0, 180.0)));
        let track = &app.tracks[0];
        assert_eq!(track.keyframes.len(), 2);
        assert_eq!(track.keyframes[1].frame, 10);
        assert!((track.keyframes[1].polygon[0].x - 130.0).abs() < 1e-6);

        app.undo();
        assert_eq!(app.tracks[0].keyframes.len(), 1);
    }

    #[test]
    fn discarded_box_leaves_no_track_and_no_history() {
        let mut app = video_app();
        app.handle_canvas_events(drag_events((100.0, 100.0), (103.0, 103.0)));
        assert!(app.tracks.is_empty());
        assert!(app.display.annotations.is_empty());
        assert!(!app.history.can_undo());
    }

    #[test]
    fn classification_toggle_respects_single_select() {
        let mut app = LariatApp::new();
        app.can_multi = false;
        app.toggle_classification(3);
        app.toggle_classification(5);
        assert_eq!(app.classification, vec![5]);

        app.undo();
        assert_eq!(app.classification, vec![3]);

        app.can_multi = true;
        app.toggle_classification(9);
        assert_eq!(app.classification, vec![3, 9]);
    }

    #[test]
    fn image_delete_and_undo_round_trip() {
        let mut app = LariatApp::new();
        app.viewport.set_view_size(1000.0, 1000.0);
        app.viewport.set_media_size(MediaSize {
            w: 1000.0,
            h: 1000.0,
        });
        app.categories = vec![LabelCategory::new(2, "object", AnnotationKind::Box)];
        app.handle_canvas_events(drag_events((10.0, 10.0), (60.0, 60.0)));
        assert_eq!(app.annotations.annotations.len(), 1);

        app.annotations.current = Some(0);
        app.delete_current();
        assert!(app.annotations.annotations.is_empty());

        app.undo();
        assert_eq!(app.annotations.annotations.len(), 1);
    }
}
