// Autoplay unlock controller driven by scripted host answers and a virtual clock.

mod common;

use card_core::constants::*;
use card_core::*;
use common::*;

/// Creation time of the first repeating timer armed at or after `after`.
fn repeating_armed_since(sched: &FakeScheduler, after: f64) -> Option<f64> {
    sched
        .created
        .iter()
        .find(|(_, at, repeating)| *repeating && *at >= after)
        .map(|(_, at, _)| *at)
}

fn note(p: Phase, seen: &mut Vec<Phase>) {
    if seen.last() != Some(&p) {
        seen.push(p);
    }
}

#[test]
fn load_starts_muted_playback_at_zero_volume() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, false));
    ctl.init(0.0, &mut sched);

    assert_eq!(ctl.phase(), Phase::MutedPlaying);
    assert!(ctl.sink().muted);
    assert_eq!(ctl.sink().volume, 0.0);
    assert_eq!(ctl.sink().plays.len(), 1);
    assert!(ctl.sink().plays[0].1, "first play request must be muted");
    // settle delay armed
    assert_eq!(sched.live_count(), 1);
}

#[test]
fn muted_play_rejection_stays_in_init_without_retrying_it() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(false, false));
    ctl.init(0.0, &mut sched);
    assert_eq!(ctl.phase(), Phase::Init);

    run(&mut ctl, &mut sched, SETTLE_DELAY_MS - 1.0);
    assert_eq!(ctl.sink().plays.len(), 1, "no retry loop for a muted rejection");
    assert_eq!(ctl.phase(), Phase::Init);
}

#[test]
fn unmute_after_settle_delay_unlocks_and_fades() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, true));
    ctl.init(0.0, &mut sched);

    run(&mut ctl, &mut sched, SETTLE_DELAY_MS - 1.0);
    assert_eq!(ctl.phase(), Phase::MutedPlaying);

    run(&mut ctl, &mut sched, SETTLE_DELAY_MS);
    assert_eq!(ctl.phase(), Phase::Unlocked);
    assert!(!ctl.sink().muted);
    assert!(ctl.is_fading());
    assert!(!ctl.is_retrying());
    assert_eq!(ctl.hint().hides, 1);
}

#[test]
fn fade_in_rises_strictly_to_target_then_stops() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, true));
    ctl.init(0.0, &mut sched);
    run(&mut ctl, &mut sched, 10_000.0);

    let volumes = &ctl.sink().volumes;
    // volumes[0] is the initial zero written at load
    let fade = &volumes[1..];
    assert!(!fade.is_empty());
    for pair in fade.windows(2) {
        assert!(pair[1] > pair[0], "fade not strictly increasing: {pair:?}");
    }
    assert_eq!(*fade.last().unwrap(), TARGET_VOLUME);
    assert_eq!(fade.len(), 43);
    assert_eq!(ctl.volume(), TARGET_VOLUME);
    assert!(!ctl.is_fading());

    let writes = ctl.sink().volumes.len();
    run(&mut ctl, &mut sched, 20_000.0);
    assert_eq!(ctl.sink().volumes.len(), writes, "volume mutated after reaching target");
}

#[test]
fn second_fade_in_replaces_the_first_timer() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, true));
    ctl.init(0.0, &mut sched);
    run(&mut ctl, &mut sched, SETTLE_DELAY_MS + FADE_INTERVAL_MS * 3.0);
    assert!(ctl.is_fading());
    assert_eq!(sched.live_repeating(), 1);

    assert!(ctl.fade_in(&mut sched));
    assert!(ctl.fade_in(&mut sched));
    assert_eq!(sched.live_repeating(), 1);
    assert_eq!(sched.cancelled.len(), 2);

    run(&mut ctl, &mut sched, 20_000.0);
    assert_eq!(ctl.volume(), TARGET_VOLUME);
    assert_eq!(sched.live_count(), 0);
}

#[test]
fn fade_in_is_refused_while_locked() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, false));
    ctl.init(0.0, &mut sched);
    assert!(!ctl.fade_in(&mut sched));
    assert!(!ctl.is_fading());
}

#[test]
fn blocked_unmute_waits_for_first_gesture() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, false));
    ctl.init(0.0, &mut sched);

    run(&mut ctl, &mut sched, 1_999.0);
    assert_eq!(ctl.phase(), Phase::AwaitingGesture);
    assert!(ctl.sink().muted, "blocked unmute must re-mute");
    assert!(ctl.hint().visible);
    assert!(ctl.is_retrying());
    assert!(!ctl.is_fading());
    assert_eq!(ctl.sink().volumes, vec![0.0]);

    run(&mut ctl, &mut sched, 2_000.0);
    ctl.sink_mut().gesture_active = true;
    assert!(ctl.on_first_gesture(2_000.0, &mut sched));

    assert_eq!(ctl.phase(), Phase::Unlocked);
    assert!(!ctl.is_retrying());
    assert!(!ctl.hint().visible);
    assert_eq!(repeating_armed_since(&sched, 2_000.0), Some(2_000.0));
    assert_eq!(ctl.volume(), 0.0, "fade must not have stepped yet");

    run(&mut ctl, &mut sched, 2_000.0 + FADE_INTERVAL_MS);
    assert!((ctl.volume() - FADE_STEP).abs() < 1e-6);
}

#[test]
fn first_gesture_is_consumed_once() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, false));
    ctl.init(0.0, &mut sched);
    run(&mut ctl, &mut sched, 600.0);

    assert!(ctl.on_first_gesture(600.0, &mut sched));
    assert_eq!(ctl.phase(), Phase::AwaitingGesture);
    assert!(!ctl.on_first_gesture(610.0, &mut sched));
}

#[test]
fn affordance_tap_always_attempts() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, false));
    ctl.init(0.0, &mut sched);
    run(&mut ctl, &mut sched, 600.0);
    ctl.on_first_gesture(600.0, &mut sched);

    let before = ctl.sink().plays.len();
    ctl.sink_mut().gesture_active = true;
    assert!(ctl.on_affordance_gesture(650.0, &mut sched));
    assert_eq!(ctl.sink().plays.len(), before + 1);
    assert_eq!(ctl.phase(), Phase::Unlocked);
}

#[test]
fn visibility_regain_retries_immediately() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, false));
    ctl.init(0.0, &mut sched);
    run(&mut ctl, &mut sched, 800.0);
    assert_eq!(ctl.phase(), Phase::AwaitingGesture);

    let before = ctl.sink().plays.len();
    assert!(!ctl.on_visibility_change(false, 810.0, &mut sched));
    assert_eq!(ctl.sink().plays.len(), before);

    ctl.sink_mut().unmuted_play_ok = true;
    assert!(ctl.on_visibility_change(true, 820.0, &mut sched));
    assert_eq!(ctl.phase(), Phase::Unlocked);
}

#[test]
fn always_blocked_host_gives_up_only_after_window() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(false, false));
    ctl.init(0.0, &mut sched);

    run(&mut ctl, &mut sched, SETTLE_DELAY_MS);
    assert_eq!(ctl.phase(), Phase::AwaitingGesture);
    let deadline = ctl.retry_deadline().expect("retry window armed");
    assert_eq!(deadline, SETTLE_DELAY_MS + RETRY_WINDOW_MS);

    // last tick inside the window still attempts
    run(&mut ctl, &mut sched, deadline);
    assert_eq!(ctl.phase(), Phase::AwaitingGesture);
    assert!(ctl.is_retrying());

    // first tick after the window: 500 + 700 * 26 = 18_700
    let first_late_tick = SETTLE_DELAY_MS + RETRY_INTERVAL_MS * 26.0;
    run(&mut ctl, &mut sched, first_late_tick - 1.0);
    assert_eq!(ctl.phase(), Phase::AwaitingGesture);
    run(&mut ctl, &mut sched, first_late_tick);
    assert_eq!(ctl.phase(), Phase::GaveUp);
    assert!(!ctl.is_retrying());
    assert!(ctl.hint().visible);

    let plays = ctl.sink().plays.len();
    run(&mut ctl, &mut sched, 60_000.0);
    assert!(!ctl.on_visibility_change(true, 60_000.0, &mut sched));
    assert_eq!(ctl.sink().plays.len(), plays, "no attempts after giving up");
    assert_eq!(sched.live_count(), 0);
}

#[test]
fn tap_after_giving_up_still_unlocks() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, false));
    ctl.init(0.0, &mut sched);
    run(&mut ctl, &mut sched, 30_000.0);
    assert_eq!(ctl.phase(), Phase::GaveUp);

    // a blocked tap leaves the card in GaveUp
    assert!(ctl.on_affordance_gesture(30_000.0, &mut sched));
    assert_eq!(ctl.phase(), Phase::GaveUp);

    ctl.sink_mut().gesture_active = true;
    assert!(ctl.on_affordance_gesture(30_100.0, &mut sched));
    assert_eq!(ctl.phase(), Phase::Unlocked);
    assert!(ctl.is_fading());
}

#[test]
fn phases_only_move_forward_except_sanctioned_steps() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, false));
    let mut seen = vec![ctl.phase()];

    ctl.init(0.0, &mut sched);
    note(ctl.phase(), &mut seen);
    let mut t = 0.0;
    while t < 25_000.0 {
        t += 50.0;
        run(&mut ctl, &mut sched, t);
        note(ctl.phase(), &mut seen);
        if t == 5_000.0 {
            ctl.on_visibility_change(true, t, &mut sched);
            note(ctl.phase(), &mut seen);
        }
    }
    ctl.sink_mut().gesture_active = true;
    ctl.on_affordance_gesture(t, &mut sched);
    note(ctl.phase(), &mut seen);

    assert_eq!(
        seen,
        vec![
            Phase::Init,
            Phase::MutedPlaying,
            Phase::AwaitingGesture,
            Phase::GaveUp,
            Phase::Unlocked
        ]
    );
    for pair in seen.windows(2) {
        let forward = (pair[1] as u8) > (pair[0] as u8);
        let sanctioned = matches!(
            (pair[0], pair[1]),
            (Phase::AwaitingGesture, Phase::Unlocked) | (Phase::GaveUp, Phase::Unlocked)
        );
        assert!(forward || sanctioned, "illegal transition {pair:?}");
    }
}

#[test]
fn deferred_results_resolve_through_tickets() {
    let mut sched = FakeScheduler::default();
    let mut sink = FakeSink::allowing(true, false);
    sink.defer = true;
    let mut ctl = controller(sink);

    ctl.init(0.0, &mut sched);
    assert_eq!(ctl.phase(), Phase::Init);
    let muted_ticket = ctl.sink().plays[0].0;
    ctl.on_play_settled(muted_ticket, true, 10.0, &mut sched);
    assert_eq!(ctl.phase(), Phase::MutedPlaying);

    run(&mut ctl, &mut sched, SETTLE_DELAY_MS);
    assert_eq!(ctl.phase(), Phase::UnmuteAttempted);
    let settle_ticket = ctl.sink().plays[1].0;

    // a timed retry cannot overlap an in-flight attempt...
    assert!(!ctl.on_visibility_change(true, 520.0, &mut sched));
    // ...but a gesture can, and it wins
    assert!(ctl.on_first_gesture(530.0, &mut sched));
    let gesture_ticket = ctl.sink().plays[2].0;
    ctl.on_play_settled(gesture_ticket, true, 540.0, &mut sched);
    assert_eq!(ctl.phase(), Phase::Unlocked);

    // the older rejection arrives late and must not re-mute
    ctl.on_play_settled(settle_ticket, false, 550.0, &mut sched);
    assert_eq!(ctl.phase(), Phase::Unlocked);
    assert_eq!(ctl.sink().mute_calls.last(), Some(&false));
}

#[test]
fn stale_rejection_is_ignored_while_newer_attempt_pending() {
    let mut sched = FakeScheduler::default();
    let mut sink = FakeSink::allowing(true, false);
    sink.defer = true;
    let mut ctl = controller(sink);
    ctl.init(0.0, &mut sched);
    run(&mut ctl, &mut sched, SETTLE_DELAY_MS);
    let older = ctl.sink().plays[1].0;
    ctl.on_first_gesture(520.0, &mut sched);

    ctl.on_play_settled(older, false, 530.0, &mut sched);
    assert_eq!(ctl.phase(), Phase::UnmuteAttempted);
    assert!(!ctl.hint().visible);
}

/// Deferred host that rejects every unmute as soon as it is issued, the way
/// a browser answers `play()` promises without user activation.
fn run_rejecting(ctl: &mut Controller, sched: &mut FakeScheduler, until: f64) {
    sched.run_until(until, |h, at, s| {
        ctl.on_timer(h, at, s);
        if let Some(&(ticket, false)) = ctl.sink().plays.last() {
            ctl.on_play_settled(ticket, false, at, s);
        }
    });
}

/// Deferred controller that reached the retry loop at the settle delay and
/// has a background retry pending from the last in-window tick.
fn deferred_retry_pending_at_deadline() -> (Controller, FakeScheduler, PlayTicket) {
    let mut sched = FakeScheduler::default();
    let mut sink = FakeSink::allowing(true, false);
    sink.defer = true;
    let mut ctl = controller(sink);
    ctl.init(0.0, &mut sched);
    let muted_ticket = ctl.sink().plays[0].0;
    ctl.on_play_settled(muted_ticket, true, 0.0, &mut sched);

    let last_in_window = SETTLE_DELAY_MS + RETRY_INTERVAL_MS * 25.0;
    run_rejecting(&mut ctl, &mut sched, last_in_window - 1.0);
    assert_eq!(ctl.phase(), Phase::AwaitingGesture);
    assert_eq!(ctl.retry_deadline(), Some(SETTLE_DELAY_MS + RETRY_WINDOW_MS));

    run(&mut ctl, &mut sched, last_in_window);
    let (pending, muted) = *ctl.sink().plays.last().unwrap();
    assert!(!muted);
    (ctl, sched, pending)
}

#[test]
fn late_background_success_after_giving_up_is_ignored() {
    let (mut ctl, mut sched, pending) = deferred_retry_pending_at_deadline();
    run(&mut ctl, &mut sched, SETTLE_DELAY_MS + RETRY_INTERVAL_MS * 26.0);
    assert_eq!(ctl.phase(), Phase::GaveUp);
    assert_eq!(sched.live_count(), 0);

    ctl.on_play_settled(pending, true, 18_800.0, &mut sched);
    assert_eq!(ctl.phase(), Phase::GaveUp);
    assert!(ctl.hint().visible);
    assert!(!ctl.is_fading());

    // a tap is still honoured
    assert!(ctl.on_affordance_gesture(19_000.0, &mut sched));
    let tap = ctl.sink().plays.last().unwrap().0;
    ctl.on_play_settled(tap, true, 19_050.0, &mut sched);
    assert_eq!(ctl.phase(), Phase::Unlocked);
    assert!(!ctl.hint().visible);
}

#[test]
fn late_background_failure_after_giving_up_changes_nothing() {
    let (mut ctl, mut sched, pending) = deferred_retry_pending_at_deadline();
    run(&mut ctl, &mut sched, 19_000.0);
    assert_eq!(ctl.phase(), Phase::GaveUp);
    let shows = ctl.hint().shows;

    ctl.on_play_settled(pending, false, 19_100.0, &mut sched);
    assert_eq!(ctl.phase(), Phase::GaveUp);
    assert!(ctl.hint().visible);
    assert_eq!(ctl.hint().shows, shows);
    assert_eq!(sched.live_count(), 0);
}

#[test]
fn pending_tap_survives_the_end_of_the_retry_window() {
    let (mut ctl, mut sched, pending) = deferred_retry_pending_at_deadline();
    assert!(ctl.on_affordance_gesture(18_650.0, &mut sched));
    let tap = ctl.sink().plays.last().unwrap().0;

    run(&mut ctl, &mut sched, 18_700.0);
    assert_eq!(ctl.phase(), Phase::GaveUp);

    ctl.on_play_settled(pending, true, 18_720.0, &mut sched);
    assert_eq!(ctl.phase(), Phase::GaveUp);
    ctl.on_play_settled(tap, true, 18_740.0, &mut sched);
    assert_eq!(ctl.phase(), Phase::Unlocked);
    assert!(ctl.is_fading());
}

#[test]
fn toggle_pauses_and_resumes() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, true));
    ctl.init(0.0, &mut sched);
    run(&mut ctl, &mut sched, 600.0);
    assert!(ctl.is_fading());

    assert!(!ctl.toggle_playback(600.0, &mut sched));
    assert!(ctl.is_paused());
    assert!(ctl.sink().paused);
    assert!(!ctl.is_fading());

    assert!(ctl.toggle_playback(700.0, &mut sched));
    assert!(!ctl.sink().paused);
    assert!(ctl.is_fading());
    assert_eq!(ctl.phase(), Phase::Unlocked);
}

#[test]
fn teardown_cancels_every_timer() {
    let mut sched = FakeScheduler::default();
    let mut ctl = controller(FakeSink::allowing(true, false));
    ctl.init(0.0, &mut sched);
    run(&mut ctl, &mut sched, 900.0);
    assert!(sched.live_count() > 0);

    ctl.teardown(&mut sched);
    assert_eq!(sched.live_count(), 0);
    assert!(ctl.sink().paused);
    assert!(!ctl.on_affordance_gesture(1_000.0, &mut sched));
}

#[test]
fn custom_config_is_clamped() {
    let ctl = AutoplayController::new(
        FakeSink::default(),
        FakeHint::default(),
        AutoplayConfig {
            target_volume: 3.0,
            ..AutoplayConfig::default()
        },
    );
    assert_eq!(ctl.target_volume(), 1.0);
}
