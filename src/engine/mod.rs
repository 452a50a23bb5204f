// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interaction-independent annotation machinery: coordinate mapping,
//! hit testing, gesture handling, undo history, keyframe interpolation,
//! and the playback clock.

pub mod history;
pub mod hit;
pub mod interaction;
pub mod interpolate;
pub mod playback;
pub mod viewport;
