//! JSON replay scripts.
//!
//! ```json
//! {
//!   "queue": { "max_toasts": 3, "strategy": "priority" },
//!   "steps": [
//!     { "op": "add", "content": "Saved", "category": "success", "duration_ms": 2000 },
//!     { "op": "advance", "ms": 500 },
//!     { "op": "dismiss", "target": 0 }
//!   ]
//! }
//! ```
//!
//! `target` is the index of an earlier `add` step, counting adds only.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use toastline_core::{
    Category, Position, Priority, QueueConfig, QueueConfigPatch, SwipeConfig, ToastConfigPatch,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default = "default_exit_ms")]
    pub exit_duration_ms: u64,
    /// Start with the host window unfocused.
    #[serde(default)]
    pub unfocused: bool,
    pub steps: Vec<Step>,
}

fn default_exit_ms() -> u64 {
    300
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Step {
    Add(AddStep),
    Dismiss { target: usize },
    DismissAll,
    DismissGroup { group: String },
    Pause { target: usize },
    Resume { target: usize },
    Retry { target: usize },
    Undo { target: usize },
    HoverStart { target: usize },
    HoverEnd { target: usize },
    FocusLost,
    FocusGained,
    Swipe {
        target: usize,
        dx: f64,
        #[serde(default)]
        dy: f64,
        duration_ms: u64,
    },
    SetQueue(QueueConfigPatch),
    Advance { ms: u64 },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Add(_) => "add",
            Step::Dismiss { .. } => "dismiss",
            Step::DismissAll => "dismiss-all",
            Step::DismissGroup { .. } => "dismiss-group",
            Step::Pause { .. } => "pause",
            Step::Resume { .. } => "resume",
            Step::Retry { .. } => "retry",
            Step::Undo { .. } => "undo",
            Step::HoverStart { .. } => "hover-start",
            Step::HoverEnd { .. } => "hover-end",
            Step::FocusLost => "focus-lost",
            Step::FocusGained => "focus-gained",
            Step::Swipe { .. } => "swipe",
            Step::SetQueue(_) => "set-queue",
            Step::Advance { .. } => "advance",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddStep {
    pub content: String,
    #[serde(default)]
    pub category: Category,
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub persistent: bool,
    pub priority: Option<Priority>,
    pub position: Option<Position>,
    pub group: Option<String>,
    #[serde(default)]
    pub stackable: bool,
    pub pause_on_hover: Option<bool>,
    pub pause_on_focus_loss: Option<bool>,
    pub swipe: Option<SwipeConfig>,
    /// Attach a logging retry callback.
    #[serde(default)]
    pub retry: bool,
    /// Attach a logging undo callback.
    #[serde(default)]
    pub undo: bool,
}

impl AddStep {
    /// Config patch for everything except callbacks.
    pub fn patch(&self) -> ToastConfigPatch {
        let mut patch = ToastConfigPatch::new().stackable(self.stackable);
        if self.persistent {
            patch = patch.persistent();
        } else if let Some(ms) = self.duration_ms {
            patch = patch.duration_ms(ms);
        }
        patch.priority = self.priority;
        patch.position = self.position;
        patch.group_id = self.group.clone();
        patch.pause_on_hover = self.pause_on_hover;
        patch.pause_on_focus_loss = self.pause_on_focus_loss;
        patch.swipe = self.swipe;
        patch
    }
}

pub fn parse(source: &str) -> Result<Script> {
    serde_json::from_str(source).context("invalid replay script")
}

pub fn load(path: &Path) -> Result<Script> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&source).with_context(|| format!("in {}", path.display()))
}
