// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: annotations, categories, video tracks, project documents.

pub mod annotation;
pub mod category;
pub mod project;
pub mod track;
