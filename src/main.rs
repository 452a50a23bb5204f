// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! LARIAT - Label And Region Interactive Annotation Tool
//!
//! A cross-platform desktop application for annotating images and videos
//! with polygons, bounding boxes, pose skeletons, and classification
//! labels over a zoomable media viewport.

mod app;
mod engine;
mod io;
mod models;
mod ui;

use anyhow::Result;
use app::LariatApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("LARIAT - Label And Region Interactive Annotation Tool"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "LARIAT",
        options,
        Box::new(|_cc| Ok(Box::new(LariatApp::new()))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
