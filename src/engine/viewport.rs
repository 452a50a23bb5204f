// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Viewport/media coordinate mapping.
//!
//! Owns the affine transform between media pixel space and viewport space:
//! the fitted display rectangle (`CanvasPos`), the zoom rate, and the
//! inverse mapping pair. Every change that produces a new `CanvasPos`
//! yields an explicit [`Remap`] that geometry owners apply to keep shapes
//! anchored to the same media location.

use crate::models::annotation::Point;

pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.1;

/// The fitted/zoomed display rectangle's size and top-left offset within
/// the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasPos {
    pub w: f64,
    pub h: f64,
    pub dx: f64,
    pub dy: f64,
}

impl CanvasPos {
    pub fn is_valid(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.dx && p.x <= self.dx + self.w && p.y >= self.dy && p.y <= self.dy + self.h
    }
}

/// Intrinsic pixel size of the loaded image/video. Immutable after load.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MediaSize {
    pub w: f64,
    pub h: f64,
}

/// A canvas-position change. Owners of viewport-space points must remap
/// each point by `p' = (new_size/old_size) * (p - old_offset) + new_offset`
/// component-wise, which keeps shapes visually anchored to the same media
/// location across resizes and zooms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Remap {
    pub from: CanvasPos,
    pub to: CanvasPos,
}

impl Remap {
    pub fn apply(&self, p: &mut Point) {
        self.apply_xy(&mut p.x, &mut p.y);
    }

    pub fn apply_xy(&self, x: &mut f64, y: &mut f64) {
        *x = (self.to.w / self.from.w) * (*x - self.from.dx) + self.to.dx;
        *y = (self.to.h / self.from.h) * (*y - self.from.dy) + self.to.dy;
    }
}

/// Computes and maintains the media/viewport transform and zoom state.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    media: MediaSize,
    view_w: f64,
    view_h: f64,
    zoom: f64,
    canvas: CanvasPos,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            media: MediaSize::default(),
            view_w: 0.0,
            view_h: 0.0,
            zoom: 1.0,
            canvas: CanvasPos::default(),
        }
    }

    pub fn canvas(&self) -> CanvasPos {
        self.canvas
    }

    pub fn media(&self) -> MediaSize {
        self.media
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Install the intrinsic media size (on load) and refit.
    pub fn set_media_size(&mut self, media: MediaSize) -> Option<Remap> {
        self.media = media;
        self.refit()
    }

    /// Viewport resize notification from the host view.
    pub fn set_view_size(&mut self, w: f64, h: f64) -> Option<Remap> {
        if (w, h) == (self.view_w, self.view_h) {
            return None;
        }
        self.view_w = w;
        self.view_h = h;
        self.refit()
    }

    /// Zoom in/out one step (`±1`), clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn zoom_step(&mut self, dir: i32) -> Option<Remap> {
        self.set_zoom(self.zoom + dir as f64 * ZOOM_STEP)
    }

    pub fn set_zoom(&mut self, rate: f64) -> Option<Remap> {
        self.zoom = rate.clamp(MIN_ZOOM, MAX_ZOOM);
        self.refit()
    }

    /// Viewport-space point -> media pixel point.
    pub fn canvas_to_media(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.canvas.dx) * (self.media.w / self.canvas.w),
            (p.y - self.canvas.dy) * (self.media.h / self.canvas.h),
        )
    }

    /// Media pixel point -> viewport-space point.
    pub fn media_to_canvas(&self, p: Point) -> Point {
        Point::new(
            p.x * (self.canvas.w / self.media.w) + self.canvas.dx,
            p.y * (self.canvas.h / self.media.h) + self.canvas.dy,
        )
    }

    /// Recompute the canvas rectangle from fit + zoom. Returns the remap
    /// to apply to existing viewport-space geometry when the previous
    /// rectangle was valid and actually changed.
    fn refit(&mut self) -> Option<Remap> {
        if self.media.w <= 0.0 || self.media.h <= 0.0 || self.view_w <= 0.0 || self.view_h <= 0.0 {
            return None;
        }
        let old = self.canvas;
        let fitted = fit(self.media, self.view_w, self.view_h);
        self.canvas = apply_zoom(fitted, self.view_w, self.view_h, self.zoom);
        if old.is_valid() && old != self.canvas {
            Some(Remap {
                from: old,
                to: self.canvas,
            })
        } else {
            None
        }
    }
}

/// Fit the media into the viewport: undersized media is centered at its
/// natural size; otherwise fill height when the viewport is proportionally
/// wider than the media, else fill width, preserving aspect ratio.
fn fit(media: MediaSize, view_w: f64, view_h: f64) -> CanvasPos {
    let media_ratio = media.w / media.h;
    if media.w < view_w && media.h < view_h {
        CanvasPos {
            w: media.w,
            h: media.h,
            dx: (view_w - media.w) / 2.0,
            dy: (view_h - media.h) / 2.0,
        }
    } else if view_w / view_h >= media_ratio {
        let h = view_h;
        let w = h * media_ratio;
        CanvasPos {
            w,
            h,
            dx: (view_w - w) / 2.0,
            dy: 0.0,
        }
    } else {
        let w = view_w;
        let h = w / media_ratio;
        CanvasPos {
            w,
            h,
            dx: 0.0,
            dy: (view_h - h) / 2.0,
        }
    }
}

/// Apply the zoom rate to a fitted rectangle. Rates above one grow the
/// rectangle and re-center it in the viewport; rates below one shrink it
/// and shift the offset by half the shrink delta so the content stays
/// centered within the original fitted box.
fn apply_zoom(fitted: CanvasPos, view_w: f64, view_h: f64, rate: f64) -> CanvasPos {
    let rate = rate.clamp(MIN_ZOOM, MAX_ZOOM);
    let mut pos = fitted;
    if rate > 1.0 {
        pos.w = fitted.w * rate;
        pos.h = fitted.h * rate;
        pos.dx = (view_w - pos.w) / 2.0;
        pos.dy = (view_h - pos.h) / 2.0;
    } else if rate < 1.0 {
        pos.dx += (fitted.w - fitted.w * rate).abs() / 2.0;
        pos.dy += (fitted.h - fitted.h * rate).abs() / 2.0;
        pos.w = fitted.w * rate;
        pos.h = fitted.h * rate;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn viewport_1080p() -> Viewport {
        let mut vp = Viewport::new();
        vp.set_view_size(1280.0, 720.0);
        vp.set_media_size(MediaSize {
            w: 1920.0,
            h: 1080.0,
        });
        vp
    }

    #[test]
    fn mapping_round_trip() {
        let vp = viewport_1080p();
        let p = Point::new(333.25, 512.5);
        let back = vp.media_to_canvas(vp.canvas_to_media(p));
        assert!((back.x - p.x).abs() < TOLERANCE);
        assert!((back.y - p.y).abs() < TOLERANCE);
    }

    #[test]
    fn undersized_media_is_centered() {
        let mut vp = Viewport::new();
        vp.set_view_size(1000.0, 800.0);
        vp.set_media_size(MediaSize { w: 400.0, h: 300.0 });
        let c = vp.canvas();
        assert_eq!((c.w, c.h), (400.0, 300.0));
        assert_eq!((c.dx, c.dy), (300.0, 250.0));
    }

    #[test]
    fn wide_viewport_fills_height() {
        let mut vp = Viewport::new();
        vp.set_view_size(2000.0, 500.0);
        vp.set_media_size(MediaSize {
            w: 1920.0,
            h: 1080.0,
        });
        let c = vp.canvas();
        assert!((c.h - 500.0).abs() < TOLERANCE);
        assert!(c.dy.abs() < TOLERANCE);
        assert!(c.dx > 0.0);
    }

    #[test]
    fn tall_viewport_fills_width() {
        let mut vp = Viewport::new();
        vp.set_view_size(800.0, 2000.0);
        vp.set_media_size(MediaSize {
            w: 1920.0,
            h: 1080.0,
        });
        let c = vp.canvas();
        assert!((c.w - 800.0).abs() < TOLERANCE);
        assert!(c.dx.abs() < TOLERANCE);
        assert!(c.dy > 0.0);
    }

    #[test]
    fn zoom_clamps_after_repeated_steps() {
        let mut vp = viewport_1080p();
        for _ in 0..30 {
            vp.zoom_step(1);
        }
        assert!((vp.zoom() - MAX_ZOOM).abs() < TOLERANCE);
        for _ in 0..30 {
            vp.zoom_step(-1);
        }
        assert!((vp.zoom() - MIN_ZOOM).abs() < TOLERANCE);
    }

    #[test]
    fn zoom_in_recenters_canvas() {
        let mut vp = viewport_1080p();
        vp.set_zoom(2.0);
        let c = vp.canvas();
        // Rectangle doubled and re-centered: symmetric negative offsets.
        assert!((c.dx - (1280.0 - c.w) / 2.0).abs() < TOLERANCE);
        assert!((c.dy - (720.0 - c.h) / 2.0).abs() < TOLERANCE);
        assert!(c.dx < 0.0);
    }

    #[test]
    fn resize_keeps_points_anchored_to_media() {
        let mut vp = viewport_1080p();
        let mut p = Point::new(400.0, 300.0);
        let media_before = vp.canvas_to_media(p);

        let remap = vp.set_view_size(900.0, 600.0).expect("canvas changed");
        remap.apply(&mut p);
        let media_after = vp.canvas_to_media(p);

        assert!((media_before.x - media_after.x).abs() < TOLERANCE);
        assert!((media_before.y - media_after.y).abs() < TOLERANCE);
    }

    #[test]
    fn zoom_keeps_points_anchored_to_media() {
        let mut vp = viewport_1080p();
        let mut p = Point::new(640.0, 360.0);
        let media_before = vp.canvas_to_media(p);

        let remap = vp.zoom_step(1).expect("canvas changed");
        remap.apply(&mut p);
        let media_after = vp.canvas_to_media(p);

        assert!((media_before.x - media_after.x).abs() < TOLERANCE);
        assert!((media_before.y - media_after.y).abs() < TOLERANCE);
    }

    #[test]
    fn unchanged_view_size_yields_no_remap() {
        let mut vp = viewport_1080p();
        assert!(vp.set_view_size(1280.0, 720.0).is_none());
    }
}
