use std::cell::Cell;
use std::rc::Rc;
use toastline_core::*;

fn setup() -> (Toaster<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let toaster = Toaster::with_clock(clock.clone(), ToasterOptions::default()).unwrap();
    (toaster, clock)
}

fn counter() -> (Rc<Cell<u32>>, impl Fn(ToastId) + 'static) {
    let count = Rc::new(Cell::new(0));
    let handle = count.clone();
    (count, move |_| handle.set(handle.get() + 1))
}

#[test]
fn test_countdown_expires_then_removes_after_exit_window() {
    let (toaster, clock) = setup();
    let id = toaster.info("hello", ToastConfigPatch::new().duration_ms(1000));

    clock.advance(999);
    toaster.tick();
    assert_eq!(toaster.get(id).unwrap().remaining_ms, Some(1));
    assert!(!toaster.get(id).unwrap().is_exiting);

    clock.advance(1);
    toaster.tick();
    assert!(toaster.get(id).unwrap().is_exiting);

    clock.advance(299);
    toaster.tick();
    assert!(toaster.get(id).is_some());

    clock.advance(1);
    toaster.tick();
    assert!(toaster.get(id).is_none());
}

#[test]
fn test_pause_resume_defers_dismissal() {
    let (toaster, clock) = setup();
    let id = toaster.info("upload", ToastConfigPatch::new().duration_ms(5000));

    clock.set(2000);
    toaster.pause(id);
    assert_eq!(toaster.get(id).unwrap().remaining_ms, Some(3000));

    clock.set(5000);
    toaster.tick();
    assert_eq!(toaster.get(id).unwrap().remaining_ms, Some(3000));
    toaster.resume(id);

    clock.set(7999);
    toaster.tick();
    assert!(!toaster.get(id).unwrap().is_exiting);

    clock.set(8000);
    toaster.tick();
    assert!(toaster.get(id).unwrap().is_exiting);
}

#[test]
fn test_pause_and_resume_are_idempotent() {
    let (toaster, clock) = setup();
    let id = toaster.info("x", ToastConfigPatch::new().duration_ms(1000));

    toaster.pause(id);
    toaster.pause(id);
    toaster.resume(id);
    assert!(!toaster.get(id).unwrap().is_paused);
    toaster.resume(id);

    clock.advance(400);
    toaster.tick();
    assert_eq!(toaster.get(id).unwrap().remaining_ms, Some(600));
}

#[test]
fn test_late_tick_starts_exit_window_at_expiry() {
    let (toaster, clock) = setup();
    let id = toaster.info("x", ToastConfigPatch::new().duration_ms(1000));

    clock.set(1200);
    toaster.tick();
    assert!(toaster.get(id).unwrap().is_exiting);

    clock.set(1300);
    toaster.tick();
    assert!(toaster.get(id).is_none());
}

#[test]
fn test_dismiss_twice_matches_dismiss_once() {
    let (toaster, clock) = setup();
    let (closed, on_close) = counter();
    let id = toaster.info("x", ToastConfigPatch::new().on_close(on_close));

    toaster.dismiss(id);
    clock.advance(100);
    toaster.dismiss(id);

    clock.set(299);
    toaster.tick();
    assert!(toaster.get(id).unwrap().is_exiting);

    clock.set(300);
    toaster.tick();
    assert!(toaster.get(id).is_none());

    clock.advance(1000);
    toaster.tick();
    assert_eq!(closed.get(), 1);
}

#[test]
fn test_retry_restores_exiting_toast() {
    let (toaster, clock) = setup();
    let (retried, on_retry) = counter();
    let id = toaster.error(
        "failed",
        ToastConfigPatch::new().duration_ms(4000).on_retry(on_retry),
    );

    clock.set(1000);
    toaster.dismiss(id);
    clock.set(1100);
    toaster.retry(id);

    let toast = toaster.get(id).unwrap();
    assert!(!toast.is_exiting);
    assert_eq!(toast.remaining_ms, Some(4000));
    assert_eq!(toast.retry_count, 1);
    assert_eq!(retried.get(), 1);

    // The cancelled exit would have fired at 1300.
    clock.set(1400);
    toaster.tick();
    assert_eq!(toaster.get(id).unwrap().remaining_ms, Some(3700));
}

#[test]
fn test_retry_without_callback_is_noop() {
    let (toaster, _clock) = setup();
    let id = toaster.error("failed", ToastConfigPatch::new());

    toaster.dismiss(id);
    toaster.retry(id);

    let toast = toaster.get(id).unwrap();
    assert!(toast.is_exiting);
    assert_eq!(toast.retry_count, 0);
}

#[test]
fn test_undo_invokes_callback_and_dismisses() {
    let (toaster, _clock) = setup();
    let (undone, on_undo) = counter();
    let with_undo = toaster.info("deleted", ToastConfigPatch::new().on_undo(on_undo));
    let without = toaster.info("plain", ToastConfigPatch::new());

    toaster.undo(with_undo);
    toaster.undo(without);

    assert_eq!(undone.get(), 1);
    assert!(toaster.get(with_undo).unwrap().is_exiting);
    assert!(!toaster.get(without).unwrap().is_exiting);
}

#[test]
fn test_unknown_id_leaves_state_untouched() {
    let (toaster, _clock) = setup();
    toaster.info("x", ToastConfigPatch::new());
    let before = toaster.toasts();

    let notified = Rc::new(Cell::new(0));
    let seen = notified.clone();
    toaster.subscribe(move |_| seen.set(seen.get() + 1));

    let ghost = ToastId::from_raw(9_999);
    toaster.dismiss(ghost);
    toaster.pause(ghost);
    toaster.resume(ghost);
    toaster.retry(ghost);
    toaster.undo(ghost);
    toaster.update(ghost, Some("nope".into()), None);

    let after = toaster.toasts();
    assert_eq!(after.len(), before.len());
    assert_eq!(after[0].id, before[0].id);
    assert_eq!(after[0].content, before[0].content);
    assert_eq!(notified.get(), 0);
}

#[test]
fn test_never_duration_is_not_auto_dismissed() {
    let (toaster, clock) = setup();
    let id = toaster.info("sticky", ToastConfigPatch::new().persistent());

    clock.advance(1_000_000);
    toaster.tick();

    let toast = toaster.get(id).unwrap();
    assert!(!toast.is_exiting);
    assert_eq!(toast.remaining_ms, None);
    assert_eq!(toast.progress(), 1.0);
}

#[test]
fn test_pause_sources_resume_only_when_all_clear() {
    let (toaster, _clock) = setup();
    let id = toaster.info("x", ToastConfigPatch::new());

    toaster.hover_start(id);
    toaster.focus_lost();
    toaster.hover_end(id);
    assert!(toaster.get(id).unwrap().is_paused);
    assert!(toaster.pause_sources(id).contains(PauseSource::FocusLoss));

    toaster.focus_gained();
    assert!(!toaster.get(id).unwrap().is_paused);
    assert!(toaster.pause_sources(id).is_empty());
}

#[test]
fn test_manual_pause_survives_hover_end() {
    let (toaster, _clock) = setup();
    let id = toaster.info("x", ToastConfigPatch::new());

    toaster.pause(id);
    toaster.hover_start(id);
    toaster.hover_end(id);
    assert!(toaster.get(id).unwrap().is_paused);

    toaster.resume(id);
    assert!(!toaster.get(id).unwrap().is_paused);
}

#[test]
fn test_hover_respects_opt_out() {
    let (toaster, _clock) = setup();
    let id = toaster.info("x", ToastConfigPatch::new().pause_on_hover(false));

    toaster.hover_start(id);
    assert!(!toaster.get(id).unwrap().is_paused);
}

#[test]
fn test_toasts_created_while_unfocused_start_paused() {
    let (toaster, clock) = setup();
    toaster.focus_lost();
    let paused = toaster.info("x", ToastConfigPatch::new().duration_ms(1000));
    let running = toaster.info(
        "y",
        ToastConfigPatch::new()
            .duration_ms(1000)
            .pause_on_focus_loss(false),
    );

    clock.advance(500);
    toaster.tick();
    assert_eq!(toaster.get(paused).unwrap().remaining_ms, Some(1000));
    assert_eq!(toaster.get(running).unwrap().remaining_ms, Some(500));

    toaster.focus_gained();
    assert!(!toaster.get(paused).unwrap().is_paused);
}

#[test]
fn test_simultaneous_expirations_follow_collection_order() {
    let mut queue = QueueEngine::default();
    let mut lifecycle = LifecycleController::new(300);
    lifecycle.advance(&mut queue, 0);

    for id in 1..=3 {
        let config = ToastConfig::default().merged(ToastConfigPatch::new().duration_ms(500));
        queue.add(Toast::new(ToastId::from_raw(id), "x", Category::Info, config, 0));
    }

    let report = lifecycle.advance(&mut queue, 500);
    let expired: Vec<u64> = report.expired.iter().map(|id| id.as_u64()).collect();
    assert_eq!(expired, vec![1, 2, 3]);
    assert!(report.removed.is_empty());

    // Expiry fires once; the next tick only removes.
    let report = lifecycle.advance(&mut queue, 800);
    assert!(report.expired.is_empty());
    assert_eq!(report.removed.len(), 3);
    assert!(queue.is_empty());
}

#[test]
fn test_next_deadline_tracks_expiry_and_exit() {
    let (toaster, clock) = setup();
    assert_eq!(toaster.next_deadline(), None);

    let id = toaster.info("x", ToastConfigPatch::new().duration_ms(5000));
    assert_eq!(toaster.next_deadline(), Some(5000));

    clock.set(100);
    toaster.dismiss(id);
    assert_eq!(toaster.next_deadline(), Some(400));
}
