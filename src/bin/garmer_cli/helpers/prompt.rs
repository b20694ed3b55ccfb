// ABOUTME: Interactive prompts for the login command
// ABOUTME: Reads a line from stdin after printing a label to stderr
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Prompt for one line of input, without the trailing newline
pub fn read_line(label: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{label}: ").context("Failed to write prompt")?;
    stderr.flush().context("Failed to write prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// `value`, or the prompted input when absent
pub fn value_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    value.map_or_else(|| read_line(label), Ok)
}
