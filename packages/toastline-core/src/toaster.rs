//! The programmatic toast API.
//!
//! A [`Toaster`] ties the queue, the lifecycle controller, and swipe gestures
//! to a clock and an observer list. Each operation settles elapsed time,
//! applies its change, then runs user callbacks and notifies observers with
//! no internal borrow held, so both may call back into the same toaster.

use crate::config::{
    Callback, QueueConfig, QueueConfigPatch, Theme, ToastConfig, ToastConfigPatch, ToasterOptions,
};
use crate::cues::{self, CueSink, SilentCues};
use crate::error::ConfigError;
use crate::gesture::{GestureEvent, PointerSample, SwipeGesture};
use crate::lifecycle::{LifecycleController, PauseSource, PauseSources};
use crate::queue::{Placement, QueueEngine};
use crate::toast::{Category, Content, Position, Toast, ToastDuration, ToastId, ToastPatch};
use std::cell::RefCell;
use std::rc::Rc;
use toastline_devtools::{QueueEvent, ToastEntry, devtools};
use toastline_scheduler::{Clock, SystemClock, TaskQueue};
use toastline_signals::{ChangeNotifier, SubscriptionId};

/// Toasts sharing one screen anchor, in render order.
#[derive(Debug, Clone)]
pub struct PositionGroup {
    pub position: Position,
    pub toasts: Vec<Toast>,
}

struct Inner<C: Clock> {
    clock: C,
    queue: QueueEngine,
    lifecycle: LifecycleController,
    defaults: ToastConfig,
    theme: Theme,
    tick_interval_ms: u64,
    newest_on_top: bool,
    focused: bool,
    gesture: Option<(ToastId, SwipeGesture)>,
    cues: Box<dyn CueSink>,
    next_id: u64,
    now: u64,
}

impl<C: Clock> Inner<C> {
    /// Brings every countdown and exit timer up to the current clock reading.
    fn settle(&mut self, effects: &TaskQueue) {
        self.now = self.clock.now_ms();
        let report = self.lifecycle.advance(&mut self.queue, self.now);

        if !report.expired.is_empty() {
            devtools().record_event(QueueEvent::Dismissed, report.expired.len() as u64);
        }
        if !report.removed.is_empty() {
            devtools().record_event(QueueEvent::Removed, report.removed.len() as u64);
            self.closed(report.removed, effects);
        }
    }

    /// Cleans up after toasts that left the queue and schedules their
    /// `on_close` callbacks.
    fn closed(&mut self, toasts: Vec<Toast>, effects: &TaskQueue) {
        for toast in toasts {
            self.lifecycle.forget(toast.id);
            if self.gesture.as_ref().is_some_and(|(id, _)| *id == toast.id) {
                self.gesture = None;
            }
            if let Some(on_close) = toast.config.on_close {
                let id = toast.id;
                effects.push(Box::new(move || on_close.call(id)));
            }
        }
    }

    fn add(
        &mut self,
        content: Content,
        category: Category,
        patch: ToastConfigPatch,
        effects: &TaskQueue,
    ) -> ToastId {
        let id = ToastId::from_raw(self.next_id);
        self.next_id += 1;

        let toast = Toast::new(id, content, category, self.defaults.merged(patch), self.now);
        let starts_paused = !self.focused && toast.config.pause_on_focus_loss;
        cues::emit(self.cues.as_ref(), &toast);

        let insertion = self.queue.insert(toast);
        if !insertion.evicted.is_empty() {
            devtools().record_event(QueueEvent::Evicted, insertion.evicted.len() as u64);
            self.closed(insertion.evicted, effects);
        }

        match insertion.placement {
            Placement::Inserted(id) => {
                devtools().record_event(QueueEvent::Added, 1);
                // An immediately evicted toast is gone; pausing it is a no-op.
                if starts_paused {
                    self.lifecycle
                        .pause(&mut self.queue, id, PauseSource::FocusLoss);
                }
                tracing::debug!(%id, category = category.as_str(), "toast added");
                id
            }
            Placement::Merged { into } => {
                devtools().record_event(QueueEvent::Merged, 1);
                into
            }
            Placement::Duplicate(id) => id,
        }
    }

    fn dismiss(&mut self, id: ToastId) -> bool {
        let dismissed = self.lifecycle.dismiss(&mut self.queue, id, self.now);
        if dismissed {
            devtools().record_event(QueueEvent::Dismissed, 1);
            self.end_gesture_on(id);
        }
        dismissed
    }

    /// Releases the gesture if it is dragging `id`.
    fn end_gesture_on(&mut self, id: ToastId) {
        if self.gesture.as_ref().is_some_and(|(active, _)| *active == id) {
            self.release_gesture(id);
        }
    }

    /// Ends the active gesture without committing it.
    fn release_gesture(&mut self, id: ToastId) {
        self.gesture = None;
        self.queue.update(id, ToastPatch::new().swipe_progress(0.0));
        self.lifecycle
            .resume(&mut self.queue, id, PauseSource::Drag);
    }

    fn ids(&self) -> Vec<ToastId> {
        self.queue.get_all().iter().map(|t| t.id).collect()
    }

    fn record_snapshot(&self) {
        if !toastline_devtools::ENABLED {
            return;
        }
        let entries = self
            .queue
            .get_all()
            .iter()
            .map(|t| ToastEntry {
                id: t.id.as_u64(),
                category: t.category.as_str().to_owned(),
                priority: t.priority().as_str().to_owned(),
                position: t.position().as_str().to_owned(),
                group_id: t.group_id().map(str::to_owned),
                exiting: t.is_exiting,
                paused: t.is_paused,
                remaining_ms: t.remaining_ms,
                stack_count: t.stack_count,
                retry_count: t.retry_count,
            })
            .collect();
        devtools().record_snapshot(entries, self.now);
    }
}

/// Cheap-clone handle to a single-threaded toast queue.
pub struct Toaster<C: Clock = SystemClock> {
    inner: Rc<RefCell<Inner<C>>>,
    effects: Rc<TaskQueue>,
    notifier: Rc<ChangeNotifier<Vec<Toast>>>,
}

impl<C: Clock> Clone for Toaster<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            effects: Rc::clone(&self.effects),
            notifier: Rc::clone(&self.notifier),
        }
    }
}

impl Toaster<SystemClock> {
    pub fn new(options: ToasterOptions) -> Result<Self, ConfigError> {
        Self::with_clock(SystemClock::new(), options)
    }
}

impl<C: Clock> Toaster<C> {
    pub fn with_clock(clock: C, options: ToasterOptions) -> Result<Self, ConfigError> {
        let mut queue = QueueEngine::new(options.queue)?;
        let now = clock.now_ms();

        // Anchor the first countdown at construction time.
        let mut lifecycle = LifecycleController::new(options.exit_duration_ms);
        lifecycle.advance(&mut queue, now);

        tracing::info!(
            max_toasts = options.queue.max_toasts,
            strategy = ?options.queue.strategy,
            grouping = options.queue.grouping,
            "toaster created"
        );

        let inner = Inner {
            clock,
            queue,
            lifecycle,
            defaults: options.defaults,
            theme: options.theme,
            tick_interval_ms: options.tick_interval_ms.max(1),
            newest_on_top: options.newest_on_top,
            focused: true,
            gesture: None,
            cues: Box::new(SilentCues),
            next_id: 1,
            now,
        };

        Ok(Self {
            inner: Rc::new(RefCell::new(inner)),
            effects: Rc::new(TaskQueue::new()),
            notifier: Rc::new(ChangeNotifier::new()),
        })
    }

    /// Replaces the sound/vibration hook used for new toasts.
    pub fn set_cue_sink(&self, sink: impl CueSink + 'static) {
        self.inner.borrow_mut().cues = Box::new(sink);
    }

    /// Runs `op` against settled state, then callbacks, then observers.
    fn mutate<R>(&self, op: impl FnOnce(&mut Inner<C>, &TaskQueue) -> R) -> R {
        let (result, changed) = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.queue.revision();
            inner.settle(&self.effects);
            let result = op(&mut *inner, &self.effects);
            let changed = inner.queue.revision() != before;
            if changed {
                inner.record_snapshot();
            }
            (result, changed)
        };

        self.effects.drain();
        if changed {
            self.notifier.notify(self.toasts());
        }
        result
    }

    pub fn add(
        &self,
        content: impl Into<Content>,
        category: Category,
        patch: ToastConfigPatch,
    ) -> ToastId {
        let content = content.into();
        self.mutate(|inner, effects| inner.add(content, category, patch, effects))
    }

    pub fn success(&self, content: impl Into<Content>, patch: ToastConfigPatch) -> ToastId {
        self.add(content, Category::Success, patch)
    }

    pub fn error(&self, content: impl Into<Content>, patch: ToastConfigPatch) -> ToastId {
        self.add(content, Category::Error, patch)
    }

    pub fn info(&self, content: impl Into<Content>, patch: ToastConfigPatch) -> ToastId {
        self.add(content, Category::Info, patch)
    }

    pub fn warning(&self, content: impl Into<Content>, patch: ToastConfigPatch) -> ToastId {
        self.add(content, Category::Warning, patch)
    }

    /// Loading toasts stay until dismissed unless `patch` sets a duration.
    pub fn loading(&self, content: impl Into<Content>, mut patch: ToastConfigPatch) -> ToastId {
        patch.duration.get_or_insert(ToastDuration::Never);
        self.add(content, Category::Loading, patch)
    }

    pub fn custom(&self, content: impl Into<Content>, patch: ToastConfigPatch) -> ToastId {
        self.add(content, Category::Custom, patch)
    }

    pub fn update(&self, id: ToastId, content: Option<Content>, patch: Option<ToastConfigPatch>) {
        self.mutate(|inner, _| {
            let patch = ToastPatch {
                content,
                config: patch,
                ..ToastPatch::default()
            };
            inner.queue.update(id, patch);
        });
    }

    pub fn dismiss(&self, id: ToastId) {
        self.mutate(|inner, _| {
            inner.dismiss(id);
        });
    }

    pub fn dismiss_all(&self) {
        self.mutate(|inner, _| {
            for id in inner.ids() {
                inner.dismiss(id);
            }
        });
    }

    pub fn dismiss_group(&self, group_id: &str) {
        self.mutate(|inner, _| {
            let members: Vec<ToastId> = inner
                .queue
                .get_all()
                .iter()
                .filter(|t| t.group_id() == Some(group_id))
                .map(|t| t.id)
                .collect();
            for id in members {
                inner.dismiss(id);
            }
        });
    }

    /// Removes every toast at once, skipping exit windows.
    pub fn clear(&self) {
        self.mutate(|inner, effects| {
            let drained = inner.queue.drain();
            inner.lifecycle.forget_all();
            inner.gesture = None;
            if !drained.is_empty() {
                devtools().record_event(QueueEvent::Removed, drained.len() as u64);
                tracing::debug!(count = drained.len(), "toasts cleared");
            }
            inner.closed(drained, effects);
        });
    }

    pub fn pause(&self, id: ToastId) {
        self.mutate(|inner, _| {
            inner
                .lifecycle
                .pause(&mut inner.queue, id, PauseSource::Manual);
        });
    }

    pub fn resume(&self, id: ToastId) {
        self.mutate(|inner, _| {
            inner
                .lifecycle
                .resume(&mut inner.queue, id, PauseSource::Manual);
        });
    }

    /// Pointer entered the toast. Ignored when the toast opted out of hover pause.
    pub fn hover_start(&self, id: ToastId) {
        self.mutate(|inner, _| {
            if inner
                .queue
                .get(id)
                .is_some_and(|t| t.config.pause_on_hover)
            {
                inner
                    .lifecycle
                    .pause(&mut inner.queue, id, PauseSource::Hover);
            }
        });
    }

    pub fn hover_end(&self, id: ToastId) {
        self.mutate(|inner, _| {
            inner
                .lifecycle
                .resume(&mut inner.queue, id, PauseSource::Hover);
        });
    }

    /// The host window lost focus. Toasts created until focus returns start paused.
    pub fn focus_lost(&self) {
        self.mutate(|inner, _| {
            inner.focused = false;
            let affected: Vec<ToastId> = inner
                .queue
                .get_all()
                .iter()
                .filter(|t| t.config.pause_on_focus_loss)
                .map(|t| t.id)
                .collect();
            for id in affected {
                inner
                    .lifecycle
                    .pause(&mut inner.queue, id, PauseSource::FocusLoss);
            }
            tracing::debug!("focus lost");
        });
    }

    pub fn focus_gained(&self) {
        self.mutate(|inner, _| {
            inner.focused = true;
            for id in inner.ids() {
                inner
                    .lifecycle
                    .resume(&mut inner.queue, id, PauseSource::FocusLoss);
            }
            tracing::debug!("focus gained");
        });
    }

    pub fn is_focused(&self) -> bool {
        self.inner.borrow().focused
    }

    pub fn pause_sources(&self, id: ToastId) -> PauseSources {
        self.inner.borrow().lifecycle.pause_sources(id)
    }

    /// Restarts the countdown and invokes `on_retry`. No-op without a retry callback.
    pub fn retry(&self, id: ToastId) {
        self.mutate(|inner, effects| {
            if let Some(on_retry) = inner.lifecycle.retry(&mut inner.queue, id) {
                effects.push(Box::new(move || on_retry.call(id)));
            }
        });
    }

    /// Dismisses the toast and invokes `on_undo`. No-op without an undo callback.
    pub fn undo(&self, id: ToastId) {
        self.mutate(|inner, effects| {
            let live = inner.queue.get(id).is_some_and(|t| !t.is_exiting);
            let Some(on_undo) = inner.lifecycle.undo(&mut inner.queue, id, inner.now) else {
                return;
            };
            if live {
                devtools().record_event(QueueEvent::Dismissed, 1);
            }
            inner.end_gesture_on(id);
            tracing::debug!(%id, "undo requested");
            effects.push(Box::new(move || on_undo.call(id)));
        });
    }

    /// Clicks action `index`. Loading actions and bad indexes are ignored.
    pub fn trigger_action(&self, id: ToastId, index: usize) {
        let on_click: Option<Callback> = self.inner.borrow().queue.get(id).and_then(|t| {
            t.config
                .actions
                .get(index)
                .filter(|action| !action.loading)
                .map(|action| action.on_click.clone())
        });

        if let Some(on_click) = on_click {
            tracing::debug!(%id, index, "action triggered");
            on_click.call(id);
        }
    }

    pub fn set_action_loading(&self, id: ToastId, index: usize, loading: bool) {
        self.mutate(|inner, _| {
            let Some(mut actions) = inner.queue.get(id).map(|t| t.config.actions.clone()) else {
                return;
            };
            let Some(action) = actions.get_mut(index) else {
                return;
            };
            if action.loading == loading {
                return;
            }
            action.loading = loading;

            let patch = ToastConfigPatch {
                actions: Some(actions),
                ..ToastConfigPatch::default()
            };
            inner.queue.update(id, ToastPatch::new().config(patch));
        });
    }

    /// Merges queue settings. Existing toasts are not re-sorted or evicted.
    pub fn set_queue_config(&self, patch: QueueConfigPatch) -> Result<(), ConfigError> {
        self.mutate(|inner, _| inner.queue.set_config(&patch))
    }

    pub fn queue_config(&self) -> QueueConfig {
        *self.inner.borrow().queue.config()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.inner.borrow_mut().theme = theme;
        tracing::debug!(?theme, "theme changed");
    }

    pub fn theme(&self) -> Theme {
        self.inner.borrow().theme
    }

    pub fn effective_theme(&self, system_prefers_dark: bool) -> Theme {
        self.theme().resolve(system_prefers_dark)
    }

    /// Advances countdowns and exit windows to the clock's current reading.
    pub fn tick(&self) {
        self.mutate(|_, _| ());
    }

    /// Clock reading at which the next expiry or removal is due.
    pub fn next_deadline(&self) -> Option<u64> {
        let inner = self.inner.borrow();
        inner.lifecycle.next_deadline(&inner.queue)
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.inner.borrow().tick_interval_ms
    }

    /// The ordered collection as of the last operation.
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.borrow().queue.get_all().to_vec()
    }

    pub fn get(&self, id: ToastId) -> Option<Toast> {
        self.inner.borrow().queue.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().queue.is_empty()
    }

    /// Toasts grouped by anchor in [`Position::ALL`] order. Empty anchors are left out.
    pub fn snapshot(&self) -> Vec<PositionGroup> {
        let inner = self.inner.borrow();
        Position::ALL
            .iter()
            .filter_map(|&position| {
                let mut toasts: Vec<Toast> = inner
                    .queue
                    .get_all()
                    .iter()
                    .filter(|t| t.position() == position)
                    .cloned()
                    .collect();
                if toasts.is_empty() {
                    return None;
                }
                if inner.newest_on_top {
                    toasts.reverse();
                }
                Some(PositionGroup { position, toasts })
            })
            .collect()
    }

    /// Registers an observer called with the full collection after each change.
    pub fn subscribe(&self, observer: impl Fn(&[Toast]) + 'static) -> SubscriptionId {
        self.notifier
            .subscribe(move |toasts: &Vec<Toast>| observer(toasts))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Runs `f`, delivering at most one notification for all changes inside it.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.notifier.batch(f)
    }

    /// Starts a swipe on `id`, abandoning any gesture on another toast.
    pub fn swipe_start(&self, id: ToastId, sample: PointerSample) -> GestureEvent {
        self.mutate(|inner, _| {
            if let Some((previous, _)) = inner.gesture {
                inner.release_gesture(previous);
            }

            let swipe = match inner.queue.get(id) {
                Some(t) if !t.is_exiting && t.config.swipe.enabled => t.config.swipe,
                _ => return GestureEvent::Ignored,
            };

            let mut gesture = SwipeGesture::new(swipe);
            let event = gesture.start(sample);
            if event == GestureEvent::Started {
                inner
                    .lifecycle
                    .pause(&mut inner.queue, id, PauseSource::Drag);
                inner.gesture = Some((id, gesture));
                tracing::trace!(%id, "swipe started");
            }
            event
        })
    }

    pub fn swipe_move(&self, id: ToastId, sample: PointerSample) -> GestureEvent {
        self.mutate(|inner, _| {
            let event = match inner.gesture.as_mut() {
                Some((active, gesture)) if *active == id => gesture.update(sample),
                _ => return GestureEvent::Ignored,
            };

            match event {
                GestureEvent::Progress(progress) => {
                    inner
                        .queue
                        .update(id, ToastPatch::new().swipe_progress(progress));
                }
                GestureEvent::Cancelled => {
                    tracing::debug!(%id, "swipe abandoned");
                    inner.release_gesture(id);
                }
                _ => {}
            }
            event
        })
    }

    /// Ends the swipe on `id`; a commit dismisses the toast.
    pub fn swipe_end(&self, id: ToastId, sample: Option<PointerSample>) -> GestureEvent {
        self.mutate(|inner, _| {
            let event = match inner.gesture.as_mut() {
                Some((active, gesture)) if *active == id => gesture.end(sample),
                _ => return GestureEvent::Ignored,
            };

            inner.release_gesture(id);
            if event == GestureEvent::Committed {
                tracing::debug!(%id, "swipe committed");
                inner.dismiss(id);
            } else {
                tracing::debug!(%id, "swipe cancelled");
            }
            event
        })
    }

    pub fn swipe_cancel(&self, id: ToastId) -> GestureEvent {
        self.mutate(|inner, _| match inner.gesture.as_mut() {
            Some((active, gesture)) if *active == id => {
                let event = gesture.cancel();
                inner.release_gesture(id);
                event
            }
            _ => GestureEvent::Ignored,
        })
    }
}
