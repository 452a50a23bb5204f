// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame clock for video playback.
//!
//! Advances a frame counter at the media's frame rate from wall-clock
//! deltas supplied by the host's repaint loop. Owns no timer of its own;
//! the host calls [`Playback::tick`] once per repaint.

/// Playback state for a frame-indexed medium.
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    running: bool,
    frame_rate: f64,
    total_frames: u32,
    frame: u32,
    /// Fractional frame carry between ticks.
    accum: f64,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            running: false,
            frame_rate: 24.0,
            total_frames: 0,
            frame: 0,
            accum: 0.0,
        }
    }
}

impl Playback {
    pub fn new(frame_rate: f64, total_frames: u32) -> Self {
        Self {
            frame_rate: if frame_rate > 0.0 { frame_rate } else { 24.0 },
            total_frames,
            ..Self::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Last addressable frame index.
    pub fn last_frame(&self) -> u32 {
        self.total_frames.saturating_sub(1)
    }

    pub fn start(&mut self) {
        if self.total_frames == 0 {
            return;
        }
        // Restart from the top when already at the end.
        if self.frame >= self.last_frame() {
            self.frame = 0;
        }
        self.accum = 0.0;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.accum = 0.0;
    }

    pub fn toggle(&mut self) {
        if self.running {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Seek, clamped to the valid frame range. Returns true if the frame
    /// changed.
    pub fn set_frame(&mut self, frame: u32) -> bool {
        let clamped = frame.min(self.last_frame());
        let changed = clamped != self.frame;
        self.frame = clamped;
        self.accum = 0.0;
        changed
    }

    pub fn step(&mut self, dir: i32) -> bool {
        let target = if dir >= 0 {
            self.frame.saturating_add(dir as u32)
        } else {
            self.frame.saturating_sub(dir.unsigned_abs())
        };
        self.set_frame(target)
    }

    /// Advance by `dt` seconds of wall time. Returns true if the displayed
    /// frame changed. Stops automatically on the last frame.
    pub fn tick(&mut self, dt: f64) -> bool {
        if !self.running || self.total_frames == 0 {
            return false;
        }
        self.accum += dt * self.frame_rate;
        let whole = self.accum.floor();
        if whole < 1.0 {
            return false;
        }
        self.accum -= whole;
        let next = self.frame.saturating_add(whole as u32);
        if next >= self.last_frame() {
            self.frame = self.last_frame();
            self.running = false;
        } else {
            self.frame = next;
        }
        true
    }
}
