use crate::script::{Script, Step};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use toastline_core::{
    Category, Clock, Content, ManualClock, PointerSample, Position, PositionGroup, Priority,
    Toast, ToastId, Toaster, ToasterOptions,
};

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub op: &'static str,
    pub time_ms: u64,
    pub positions: Vec<PositionReport>,
}

#[derive(Debug, Serialize)]
pub struct PositionReport {
    pub position: Position,
    pub toasts: Vec<ToastReport>,
}

#[derive(Debug, Serialize)]
pub struct ToastReport {
    pub id: u64,
    pub content: Content,
    pub category: Category,
    pub priority: Priority,
    pub group: Option<String>,
    pub exiting: bool,
    pub paused: bool,
    pub remaining_ms: Option<u64>,
    pub stack_count: u32,
    pub retry_count: u32,
    pub swipe_progress: f32,
}

impl From<&Toast> for ToastReport {
    fn from(toast: &Toast) -> Self {
        Self {
            id: toast.id.as_u64(),
            content: toast.content.clone(),
            category: toast.category,
            priority: toast.priority(),
            group: toast.group_id().map(str::to_owned),
            exiting: toast.is_exiting,
            paused: toast.is_paused,
            remaining_ms: toast.remaining_ms,
            stack_count: toast.stack_count,
            retry_count: toast.retry_count,
            swipe_progress: toast.swipe_progress,
        }
    }
}

impl From<PositionGroup> for PositionReport {
    fn from(group: PositionGroup) -> Self {
        Self {
            position: group.position,
            toasts: group.toasts.iter().map(ToastReport::from).collect(),
        }
    }
}

fn target(added: &[ToastId], step: usize, index: usize) -> Result<ToastId> {
    added
        .get(index)
        .copied()
        .with_context(|| format!("step {step}: target {index} does not name an earlier add"))
}

/// Runs `script` on a manual clock starting at 0 and reports the queue after every step.
pub fn run(script: &Script) -> Result<Vec<StepReport>> {
    let clock = ManualClock::new();
    let options = ToasterOptions {
        queue: script.queue,
        exit_duration_ms: script.exit_duration_ms,
        ..Default::default()
    };
    let toaster = Toaster::with_clock(clock.clone(), options).context("invalid queue config")?;
    if script.unfocused {
        toaster.focus_lost();
    }

    let mut added = Vec::new();
    let mut reports = Vec::with_capacity(script.steps.len());

    for (index, step) in script.steps.iter().enumerate() {
        tracing::debug!(step = index, op = step.name(), "replaying");
        match step {
            Step::Add(add) => {
                let mut patch = add.patch();
                if add.retry {
                    patch = patch.on_retry(|id| tracing::info!(%id, "retry callback"));
                }
                if add.undo {
                    patch = patch.on_undo(|id| tracing::info!(%id, "undo callback"));
                }
                added.push(toaster.add(add.content.as_str(), add.category, patch));
            }
            Step::Dismiss { target: t } => toaster.dismiss(target(&added, index, *t)?),
            Step::DismissAll => toaster.dismiss_all(),
            Step::DismissGroup { group } => toaster.dismiss_group(group),
            Step::Pause { target: t } => toaster.pause(target(&added, index, *t)?),
            Step::Resume { target: t } => toaster.resume(target(&added, index, *t)?),
            Step::Retry { target: t } => toaster.retry(target(&added, index, *t)?),
            Step::Undo { target: t } => toaster.undo(target(&added, index, *t)?),
            Step::HoverStart { target: t } => toaster.hover_start(target(&added, index, *t)?),
            Step::HoverEnd { target: t } => toaster.hover_end(target(&added, index, *t)?),
            Step::FocusLost => toaster.focus_lost(),
            Step::FocusGained => toaster.focus_gained(),
            Step::Swipe {
                target: t,
                dx,
                dy,
                duration_ms,
            } => {
                let id = target(&added, index, *t)?;
                toaster.swipe_start(id, PointerSample::new(0.0, 0.0, clock.now_ms()));
                clock.advance(*duration_ms);
                let end = PointerSample::new(*dx, *dy, clock.now_ms());
                toaster.swipe_move(id, end);
                let event = toaster.swipe_end(id, Some(end));
                tracing::info!(%id, ?event, "swipe finished");
            }
            Step::SetQueue(patch) => toaster
                .set_queue_config(*patch)
                .with_context(|| format!("step {index}: rejected queue config"))?,
            Step::Advance { ms } => {
                clock.advance(*ms);
                toaster.tick();
            }
        }

        reports.push(StepReport {
            step: index,
            op: step.name(),
            time_ms: clock.now_ms(),
            positions: toaster
                .snapshot()
                .into_iter()
                .map(PositionReport::from)
                .collect(),
        });
    }

    Ok(reports)
}

/// Human-readable rendering of one report.
pub fn render(report: &StepReport) -> String {
    let mut out = format!(
        "[{:>7}ms] #{} {}\n",
        report.time_ms, report.step, report.op
    );
    if report.positions.is_empty() {
        out.push_str("  (empty)\n");
    }

    for group in &report.positions {
        let _ = writeln!(out, "  {}", group.position.as_str());
        for toast in &group.toasts {
            let content = match &toast.content {
                Content::Text(text) => format!("{text:?}"),
                Content::Custom(value) => value.to_string(),
            };
            let _ = write!(
                out,
                "    toast-{} {} {} {}",
                toast.id,
                toast.category.as_str(),
                toast.priority.as_str(),
                content
            );
            match toast.remaining_ms {
                Some(ms) => {
                    let _ = write!(out, " {ms}ms");
                }
                None => out.push_str(" sticky"),
            }
            if toast.stack_count > 1 {
                let _ = write!(out, " x{}", toast.stack_count);
            }
            if toast.retry_count > 0 {
                let _ = write!(out, " retried={}", toast.retry_count);
            }
            if toast.paused {
                out.push_str(" paused");
            }
            if toast.exiting {
                out.push_str(" exiting");
            }
            out.push('\n');
        }
    }
    out
}
