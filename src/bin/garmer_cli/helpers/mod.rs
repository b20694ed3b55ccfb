// ABOUTME: Helper modules for the garmer CLI
// ABOUTME: Provides date defaults, interactive prompts, and display formatting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

pub mod dates;
pub mod display;
pub mod prompt;
