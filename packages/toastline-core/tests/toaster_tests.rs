use std::cell::{Cell, RefCell};
use std::rc::Rc;
use toastline_core::*;

fn toaster_with(options: ToasterOptions) -> (Toaster<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let toaster = Toaster::with_clock(clock.clone(), options).unwrap();
    (toaster, clock)
}

fn toaster() -> (Toaster<ManualClock>, ManualClock) {
    toaster_with(ToasterOptions::default())
}

fn notification_counter(toaster: &Toaster<ManualClock>) -> Rc<Cell<u32>> {
    let count = Rc::new(Cell::new(0));
    let seen = count.clone();
    toaster.subscribe(move |_| seen.set(seen.get() + 1));
    count
}

#[test]
fn test_observers_notified_once_per_mutation() {
    let (toaster, clock) = toaster();
    let count = notification_counter(&toaster);

    let id = toaster.info("a", ToastConfigPatch::new());
    assert_eq!(count.get(), 1);

    toaster.dismiss(id);
    assert_eq!(count.get(), 2);

    // Nothing due yet: no change, no notification.
    toaster.tick();
    assert_eq!(count.get(), 2);

    clock.advance(300);
    toaster.tick();
    assert_eq!(count.get(), 3);
    assert!(toaster.is_empty());
}

#[test]
fn test_observer_receives_full_collection() {
    let (toaster, _clock) = toaster();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    toaster.subscribe(move |toasts| {
        *sink.borrow_mut() = toasts.iter().map(|t| t.id).collect::<Vec<_>>();
    });

    let a = toaster.info("a", ToastConfigPatch::new());
    let b = toaster.info("b", ToastConfigPatch::new());

    assert_eq!(*seen.borrow(), vec![a, b]);
}

#[test]
fn test_batch_coalesces_notifications() {
    let (toaster, _clock) = toaster();
    let count = notification_counter(&toaster);

    toaster.batch(|| {
        toaster.info("a", ToastConfigPatch::new());
        toaster.info("b", ToastConfigPatch::new());
        toaster.dismiss_all();
    });

    assert_eq!(count.get(), 1);
    assert!(toaster.toasts().iter().all(|t| t.is_exiting));
}

#[test]
fn test_unsubscribe_stops_notifications() {
    let (toaster, _clock) = toaster();
    let count = Rc::new(Cell::new(0));
    let seen = count.clone();
    let subscription = toaster.subscribe(move |_| seen.set(seen.get() + 1));

    toaster.info("a", ToastConfigPatch::new());
    assert!(toaster.unsubscribe(subscription));
    toaster.info("b", ToastConfigPatch::new());

    assert_eq!(count.get(), 1);
}

#[test]
fn test_ids_are_unique_and_increasing() {
    let (toaster, clock) = toaster_with(ToasterOptions {
        queue: QueueConfig {
            max_toasts: 1,
            ..Default::default()
        },
        ..Default::default()
    });

    let first = toaster.info("a", ToastConfigPatch::new());
    toaster.clear();
    clock.advance(10);
    let second = toaster.info("b", ToastConfigPatch::new());

    assert!(second > first);
}

#[test]
fn test_snapshot_groups_by_position() {
    let (toaster, _clock) = toaster();
    let a = toaster.info("a", ToastConfigPatch::new().position(Position::BottomLeft));
    let b = toaster.info("b", ToastConfigPatch::new());
    let c = toaster.info("c", ToastConfigPatch::new().position(Position::TopLeft));
    let d = toaster.info("d", ToastConfigPatch::new().position(Position::BottomLeft));

    let snapshot = toaster.snapshot();
    let layout: Vec<(Position, Vec<ToastId>)> = snapshot
        .iter()
        .map(|group| (group.position, group.toasts.iter().map(|t| t.id).collect()))
        .collect();

    assert_eq!(
        layout,
        vec![
            (Position::TopLeft, vec![c]),
            (Position::TopRight, vec![b]),
            (Position::BottomLeft, vec![a, d]),
        ]
    );
}

#[test]
fn test_snapshot_newest_on_top() {
    let (toaster, _clock) = toaster_with(ToasterOptions {
        newest_on_top: true,
        ..Default::default()
    });
    let a = toaster.info("a", ToastConfigPatch::new());
    let b = toaster.info("b", ToastConfigPatch::new());

    let snapshot = toaster.snapshot();
    let order: Vec<ToastId> = snapshot[0].toasts.iter().map(|t| t.id).collect();
    assert_eq!(order, vec![b, a]);
}

#[test]
fn test_add_returns_representative_when_stacked() {
    let (toaster, _clock) = toaster_with(ToasterOptions {
        queue: QueueConfig {
            grouping: true,
            ..Default::default()
        },
        ..Default::default()
    });
    let count = notification_counter(&toaster);
    let patch = || ToastConfigPatch::new().group("saves").stackable(true);

    let first = toaster.success("Saved", patch());
    let second = toaster.success("Saved", patch());
    let third = toaster.success("Saved", patch());

    assert_eq!(second, first);
    assert_eq!(third, first);
    assert_eq!(toaster.len(), 1);
    assert_eq!(
        toaster.get(first).unwrap().content.as_text(),
        Some("Saved (+3)")
    );
    assert_eq!(count.get(), 3);
}

#[test]
fn test_dismiss_group_only_touches_members() {
    let (toaster, _clock) = toaster();
    let member = toaster.info("a", ToastConfigPatch::new().group("sync"));
    let other = toaster.info("b", ToastConfigPatch::new());

    toaster.dismiss_group("sync");

    assert!(toaster.get(member).unwrap().is_exiting);
    assert!(!toaster.get(other).unwrap().is_exiting);
}

#[test]
fn test_on_close_fires_once_for_every_removal_path() {
    let (toaster, clock) = toaster_with(ToasterOptions {
        queue: QueueConfig {
            max_toasts: 2,
            ..Default::default()
        },
        ..Default::default()
    });
    let closed = Rc::new(RefCell::new(Vec::new()));
    let patch = || {
        let closed = closed.clone();
        ToastConfigPatch::new().on_close(move |id| closed.borrow_mut().push(id))
    };

    let expired = toaster.info("expires", patch().duration_ms(100));
    let evicted = toaster.info("evicted", patch());
    clock.set(400);
    toaster.tick();
    let kept = toaster.info("kept", patch());
    let newest = toaster.info("newest", patch());
    toaster.clear();

    assert_eq!(*closed.borrow(), vec![expired, evicted, kept, newest]);
}

#[test]
fn test_callbacks_may_reenter_toaster() {
    let (toaster, _clock) = toaster();
    let handle = toaster.clone();
    let id = toaster.info(
        "a",
        ToastConfigPatch::new().on_undo(move |_| {
            handle.info("restored", ToastConfigPatch::new());
        }),
    );

    let lengths = Rc::new(RefCell::new(Vec::new()));
    let observer_handle = toaster.clone();
    let sink = lengths.clone();
    toaster.subscribe(move |_| sink.borrow_mut().push(observer_handle.len()));

    toaster.undo(id);

    assert_eq!(toaster.len(), 2);
    assert_eq!(*lengths.borrow(), vec![2, 2]);
}

#[test]
fn test_loading_defaults_to_persistent() {
    let (toaster, _clock) = toaster();
    let spinner = toaster.loading("Uploading", ToastConfigPatch::new());
    let timed = toaster.loading("Uploading", ToastConfigPatch::new().duration_ms(2000));

    assert_eq!(toaster.get(spinner).unwrap().duration(), ToastDuration::Never);
    assert_eq!(toaster.get(timed).unwrap().remaining_ms, Some(2000));
    assert_eq!(toaster.get(spinner).unwrap().category, Category::Loading);
}

#[test]
fn test_update_replaces_content_and_restarts_changed_duration() {
    let (toaster, clock) = toaster();
    let id = toaster.loading("Uploading", ToastConfigPatch::new());

    clock.advance(500);
    toaster.update(
        id,
        Some("Uploaded".into()),
        Some(ToastConfigPatch::new().duration_ms(3000)),
    );

    let toast = toaster.get(id).unwrap();
    assert_eq!(toast.content.as_text(), Some("Uploaded"));
    assert_eq!(toast.remaining_ms, Some(3000));
}

#[test]
fn test_actions_respect_loading_and_bounds() {
    let (toaster, _clock) = toaster();
    let clicks = Rc::new(Cell::new(0));
    let counter = clicks.clone();
    let id = toaster.info(
        "Message archived",
        ToastConfigPatch::new().action(
            ToastAction::new("View", move |_| counter.set(counter.get() + 1))
                .style(ActionStyle::Secondary),
        ),
    );

    toaster.trigger_action(id, 0);
    toaster.trigger_action(id, 3);
    assert_eq!(clicks.get(), 1);

    toaster.set_action_loading(id, 0, true);
    toaster.trigger_action(id, 0);
    assert_eq!(clicks.get(), 1);
    assert!(toaster.get(id).unwrap().config.actions[0].loading);

    toaster.set_action_loading(id, 0, false);
    toaster.trigger_action(id, 0);
    assert_eq!(clicks.get(), 2);
}

#[test]
fn test_set_queue_config_validates() {
    let (toaster, _clock) = toaster();

    let result = toaster.set_queue_config(QueueConfigPatch {
        max_toasts: Some(0),
        ..Default::default()
    });
    assert_eq!(result, Err(ConfigError::ZeroCapacity));
    assert_eq!(toaster.queue_config().max_toasts, 5);

    toaster
        .set_queue_config(QueueConfigPatch {
            strategy: Some(Strategy::Lifo),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(toaster.queue_config().strategy, Strategy::Lifo);
}

#[test]
fn test_invalid_options_are_rejected() {
    let result = Toaster::with_clock(
        ManualClock::new(),
        ToasterOptions {
            queue: QueueConfig {
                grouping: true,
                max_per_group: 0,
                ..Default::default()
            },
            ..Default::default()
        },
    );
    assert_eq!(result.err(), Some(ConfigError::ZeroGroupCapacity));
}

#[test]
fn test_theme_resolution() {
    let (toaster, _clock) = toaster();
    assert_eq!(toaster.theme(), Theme::Auto);
    assert_eq!(toaster.effective_theme(true), Theme::Dark);

    toaster.set_theme(Theme::Light);
    assert_eq!(toaster.effective_theme(true), Theme::Light);
}

#[test]
fn test_tick_interval_is_at_least_one() {
    let (toaster, _clock) = toaster_with(ToasterOptions {
        tick_interval_ms: 0,
        ..Default::default()
    });
    assert_eq!(toaster.tick_interval_ms(), 1);
}

#[derive(Clone, Default)]
struct RecordingCues {
    sounds: Rc<RefCell<Vec<Category>>>,
    vibrations: Rc<Cell<u32>>,
}

impl CueSink for RecordingCues {
    fn play_sound(&self, category: Category) -> Result<(), CueError> {
        self.sounds.borrow_mut().push(category);
        Ok(())
    }

    fn vibrate(&self, pattern: &[u64]) -> Result<(), CueError> {
        assert_eq!(pattern, &VIBRATION_PATTERN[..]);
        self.vibrations.set(self.vibrations.get() + 1);
        Ok(())
    }
}

struct BrokenCues;

impl CueSink for BrokenCues {
    fn play_sound(&self, _category: Category) -> Result<(), CueError> {
        Err(CueError::Sound("no audio device".into()))
    }

    fn vibrate(&self, _pattern: &[u64]) -> Result<(), CueError> {
        Err(CueError::Vibration("unsupported".into()))
    }
}

#[test]
fn test_cues_requested_on_creation() {
    let (toaster, _clock) = toaster();
    let cues = RecordingCues::default();
    toaster.set_cue_sink(cues.clone());

    toaster.error("boom", ToastConfigPatch::new().sound(true).vibrate(true));
    toaster.info("quiet", ToastConfigPatch::new());

    assert_eq!(*cues.sounds.borrow(), vec![Category::Error]);
    assert_eq!(cues.vibrations.get(), 1);
}

#[test]
fn test_cue_failures_are_swallowed() {
    let (toaster, _clock) = toaster();
    toaster.set_cue_sink(BrokenCues);

    let id = toaster.warning("careful", ToastConfigPatch::new().sound(true).vibrate(true));

    assert!(toaster.get(id).is_some());
}

#[cfg(debug_assertions)]
#[test]
fn test_devtools_sees_queue_snapshots() {
    let (toaster, _clock) = toaster();
    toaster.info("inspect me", ToastConfigPatch::new());

    let snapshot = toastline_devtools::devtools().snapshot();
    assert!(snapshot.snapshot_count > 0);
    assert!(snapshot.metrics.added > 0);
}
