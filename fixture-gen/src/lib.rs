// SPDX-FileCopyrightText: fixture-gen contributors
//
// SPDX-License-Identifier: MIT

// This crate has two intended purposes:
// - Render the per-variant test definitions for the CSI provider integration tests.
// - Keep track of which files a render produces so they can be cleaned up again.

pub mod files;
pub mod render;
pub mod snippets;

pub use files::{TEMPLATES, Template, cleanup_files, generate_all, generated_files};
pub use render::{RenderError, RenderOptions, render, render_str};
