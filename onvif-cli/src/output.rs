//! Result printing
//!
//! Human output is plain `key: value` lines; `--json` prints one JSON
//! document per result (one per line for streamed results).

use std::fmt::Display;

use anyhow::Result;
use serde::Serialize;

use crate::config::OutputMode;

#[derive(Debug, Clone, Copy)]
pub struct Printer {
    mode: OutputMode,
}

impl Printer {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Print a result; `human` is only rendered in human mode
    pub fn emit<T, F>(&self, value: &T, human: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce() -> Vec<String>,
    {
        if let Some(text) = render(self.mode, value, human)? {
            println!("{text}");
        }
        Ok(())
    }

    /// Print a progress or status line (human mode only)
    pub fn note(&self, text: impl Display) {
        if self.mode == OutputMode::Human {
            println!("{text}");
        }
    }
}

fn render<T, F>(mode: OutputMode, value: &T, human: F) -> Result<Option<String>>
where
    T: Serialize,
    F: FnOnce() -> Vec<String>,
{
    Ok(match mode {
        OutputMode::Quiet => None,
        OutputMode::Json => Some(serde_json::to_string(value)?),
        OutputMode::Human => Some(human().join("\n")),
    })
}

/// `key: value` with the key padded for alignment
pub fn field(key: &str, value: impl Display) -> String {
    format!("{key:<18} {value}")
}

/// Render an optional value, `-` when absent
pub fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
