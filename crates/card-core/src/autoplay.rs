//! Autoplay unlock controller.
//!
//! Owns the background track's mute/volume state from page load onward. The
//! host forwards page events (load, timers, gestures, visibility, playback
//! results) and the controller is the only thing that touches the sink, so two
//! triggers racing for an unmute can only ever *request* a transition.
//!
//! Phase flow:
//!
//! ```text
//! Init ──muted play──▶ MutedPlaying ──settle──▶ UnmuteAttempted ──ok──▶ Unlocked
//!   └────────────────settle─────────────────────────┘    │ blocked        ▲
//!                                                        ▼                │
//!                                   GaveUp ◀──window── AwaitingGesture ──ok
//! ```
//!
//! Retries issued from `AwaitingGesture` stay in that phase while in flight.
//! `GaveUp` only leaves through an explicit gesture.

use smallvec::SmallVec;

use crate::constants::*;
use crate::host::{Affordance, AudioSink, PlayOutcome, PlayTicket, Scheduler, TimerHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    MutedPlaying,
    UnmuteAttempted,
    Unlocked,
    AwaitingGesture,
    GaveUp,
}

/// What asked for an unmute attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Settle,
    RetryTick,
    Visibility,
    FirstGesture,
    Affordance,
    Resume,
}

impl Trigger {
    /// Gesture-backed requests carry user activation, so the host will accept
    /// them even while an earlier attempt is still in flight.
    pub fn is_gesture(self) -> bool {
        matches!(self, Trigger::FirstGesture | Trigger::Affordance | Trigger::Resume)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AutoplayConfig {
    pub settle_delay_ms: f64,
    pub fade_step: f32,
    pub fade_interval_ms: f64,
    pub target_volume: f32,
    pub retry_interval_ms: f64,
    pub retry_window_ms: f64,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: SETTLE_DELAY_MS,
            fade_step: FADE_STEP,
            fade_interval_ms: FADE_INTERVAL_MS,
            target_volume: TARGET_VOLUME,
            retry_interval_ms: RETRY_INTERVAL_MS,
            retry_window_ms: RETRY_WINDOW_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttemptKind {
    Muted,
    Unmute,
}

#[derive(Clone, Copy, Debug)]
struct Attempt {
    ticket: PlayTicket,
    kind: AttemptKind,
    /// Issued on behalf of a user gesture.
    gesture: bool,
}

pub struct AutoplayController<S: AudioSink, H: Affordance> {
    sink: S,
    hint: H,
    config: AutoplayConfig,
    phase: Phase,
    volume: f32,
    retry_deadline: Option<f64>,
    settle_timer: Option<TimerHandle>,
    fade_timer: Option<TimerHandle>,
    retry_timer: Option<TimerHandle>,
    next_ticket: u64,
    in_flight: SmallVec<[Attempt; 4]>,
    gesture_seen: bool,
    paused: bool,
    torn_down: bool,
}

impl<S: AudioSink, H: Affordance> AutoplayController<S, H> {
    pub fn new(sink: S, hint: H, mut config: AutoplayConfig) -> Self {
        config.target_volume = config.target_volume.clamp(0.0, 1.0);
        config.fade_step = config.fade_step.max(f32::EPSILON);
        Self {
            sink,
            hint,
            config,
            phase: Phase::Init,
            volume: 0.0,
            retry_deadline: None,
            settle_timer: None,
            fade_timer: None,
            retry_timer: None,
            next_ticket: 0,
            in_flight: SmallVec::new(),
            gesture_seen: false,
            paused: false,
            torn_down: false,
        }
    }

    /// Page load: start muted playback and arm the settle delay.
    pub fn init(&mut self, _now_ms: f64, timers: &mut dyn Scheduler) {
        if self.torn_down || self.settle_timer.is_some() || self.phase != Phase::Init {
            return;
        }
        self.volume = 0.0;
        self.sink.set_volume(0.0);
        self.sink.set_muted(true);
        let ticket = self.issue_ticket();
        match self.sink.play(ticket) {
            PlayOutcome::Granted => self.enter_muted_playing(),
            PlayOutcome::Blocked => log::warn!("[autoplay] muted autoplay blocked; staying in Init"),
            PlayOutcome::Pending => self.in_flight.push(Attempt {
                ticket,
                kind: AttemptKind::Muted,
                gesture: false,
            }),
        }
        // Armed regardless of the muted result: an unmute may still succeed.
        self.settle_timer = Some(timers.schedule_once(self.config.settle_delay_ms));
    }

    /// Cancel every live timer and stop the track. The controller ignores all
    /// further events.
    pub fn teardown(&mut self, timers: &mut dyn Scheduler) {
        for handle in [
            self.settle_timer.take(),
            self.fade_timer.take(),
            self.retry_timer.take(),
        ]
        .into_iter()
        .flatten()
        {
            timers.cancel(handle);
        }
        self.in_flight.clear();
        self.sink.pause();
        self.torn_down = true;
        log::info!("[autoplay] torn down in {:?}", self.phase);
    }

    pub fn on_timer(&mut self, handle: TimerHandle, now_ms: f64, timers: &mut dyn Scheduler) {
        if self.torn_down {
            return;
        }
        if self.settle_timer == Some(handle) {
            self.settle_timer = None;
            self.request_unmute(Trigger::Settle, now_ms, timers);
        } else if self.fade_timer == Some(handle) {
            self.fade_tick(timers);
        } else if self.retry_timer == Some(handle) {
            self.retry_tick(now_ms, timers);
        }
    }

    /// Late result for a `Pending` play request.
    pub fn on_play_settled(
        &mut self,
        ticket: PlayTicket,
        granted: bool,
        now_ms: f64,
        timers: &mut dyn Scheduler,
    ) {
        if self.torn_down {
            return;
        }
        let Some(pos) = self.in_flight.iter().position(|a| a.ticket == ticket) else {
            log::debug!("[autoplay] ignoring settlement for unknown ticket {:?}", ticket);
            return;
        };
        let attempt = self.in_flight.remove(pos);
        match (attempt.kind, granted) {
            (AttemptKind::Muted, true) => {
                if self.phase == Phase::Init {
                    self.enter_muted_playing();
                }
            }
            (AttemptKind::Muted, false) => {
                log::warn!("[autoplay] muted autoplay blocked; staying in {:?}", self.phase)
            }
            (AttemptKind::Unmute, true) => self.unlock(attempt.gesture, timers),
            (AttemptKind::Unmute, false) => {
                // Only the newest unmute decides a failure; an older rejection
                // must not re-mute after a later attempt went through.
                let newer_unmute = self
                    .in_flight
                    .iter()
                    .any(|a| a.kind == AttemptKind::Unmute && a.ticket > ticket);
                if !newer_unmute {
                    self.unmute_failed(now_ms, timers);
                }
            }
        }
    }

    /// The first pointer/key gesture anywhere on the page. Later calls are no-ops.
    pub fn on_first_gesture(&mut self, now_ms: f64, timers: &mut dyn Scheduler) -> bool {
        if self.gesture_seen {
            return false;
        }
        self.gesture_seen = true;
        self.request_unmute(Trigger::FirstGesture, now_ms, timers)
    }

    /// A tap on the "enable sound" hint itself: always attempts, outside the
    /// retry cadence.
    pub fn on_affordance_gesture(&mut self, now_ms: f64, timers: &mut dyn Scheduler) -> bool {
        self.gesture_seen = true;
        self.request_unmute(Trigger::Affordance, now_ms, timers)
    }

    /// Page visibility or window focus changed.
    pub fn on_visibility_change(
        &mut self,
        visible: bool,
        now_ms: f64,
        timers: &mut dyn Scheduler,
    ) -> bool {
        if !visible {
            return false;
        }
        self.request_unmute(Trigger::Visibility, now_ms, timers)
    }

    /// Ask for an unmute. Returns whether a play request was issued.
    pub fn request_unmute(
        &mut self,
        trigger: Trigger,
        now_ms: f64,
        timers: &mut dyn Scheduler,
    ) -> bool {
        if self.torn_down || self.phase == Phase::Unlocked {
            return false;
        }
        if !trigger.is_gesture() {
            if self.paused || self.phase == Phase::GaveUp {
                return false;
            }
            if self.in_flight.iter().any(|a| a.kind == AttemptKind::Unmute) {
                log::debug!("[autoplay] {:?} skipped, unmute already in flight", trigger);
                return false;
            }
        }
        if trigger.is_gesture() {
            self.paused = false;
        }
        if matches!(self.phase, Phase::Init | Phase::MutedPlaying) {
            self.phase = Phase::UnmuteAttempted;
        }
        log::debug!("[autoplay] unmute attempt ({:?}) in {:?}", trigger, self.phase);

        self.sink.set_muted(false);
        let ticket = self.issue_ticket();
        match self.sink.play(ticket) {
            PlayOutcome::Granted => self.unlock(trigger.is_gesture(), timers),
            PlayOutcome::Blocked => self.unmute_failed(now_ms, timers),
            PlayOutcome::Pending => self.in_flight.push(Attempt {
                ticket,
                kind: AttemptKind::Unmute,
                gesture: trigger.is_gesture(),
            }),
        }
        true
    }

    /// Start (or restart) the fade toward the target volume. Any fade already
    /// running is cancelled first, so at most one fade timer exists.
    pub fn fade_in(&mut self, timers: &mut dyn Scheduler) -> bool {
        if self.torn_down || self.phase != Phase::Unlocked {
            return false;
        }
        if let Some(handle) = self.fade_timer.take() {
            timers.cancel(handle);
        }
        if self.volume >= self.config.target_volume {
            return false;
        }
        self.fade_timer = Some(timers.schedule_repeating(self.config.fade_interval_ms));
        true
    }

    /// Pause or resume the track from an explicit control. Resuming counts as
    /// a gesture. Returns whether playback is now wanted.
    pub fn toggle_playback(&mut self, now_ms: f64, timers: &mut dyn Scheduler) -> bool {
        if self.torn_down {
            return false;
        }
        if !self.paused {
            self.paused = true;
            if let Some(handle) = self.fade_timer.take() {
                timers.cancel(handle);
            }
            self.sink.pause();
            log::info!("[autoplay] paused by user");
            return false;
        }
        self.paused = false;
        self.gesture_seen = true;
        if self.phase == Phase::Unlocked {
            let ticket = self.issue_ticket();
            if self.sink.play(ticket) == PlayOutcome::Blocked {
                log::warn!("[autoplay] resume refused by host");
            }
            self.fade_in(timers);
        } else {
            self.request_unmute(Trigger::Resume, now_ms, timers);
        }
        true
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn target_volume(&self) -> f32 {
        self.config.target_volume
    }

    pub fn retry_deadline(&self) -> Option<f64> {
        self.retry_deadline
    }

    pub fn is_fading(&self) -> bool {
        self.fade_timer.is_some()
    }

    pub fn is_retrying(&self) -> bool {
        self.retry_timer.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &AutoplayConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn hint(&self) -> &H {
        &self.hint
    }

    fn issue_ticket(&mut self) -> PlayTicket {
        self.next_ticket += 1;
        PlayTicket(self.next_ticket)
    }

    fn enter_muted_playing(&mut self) {
        self.phase = Phase::MutedPlaying;
        log::info!("[autoplay] muted playback running");
    }

    fn unlock(&mut self, gesture: bool, timers: &mut dyn Scheduler) {
        if self.phase == Phase::Unlocked {
            return;
        }
        if self.phase == Phase::GaveUp && !gesture {
            log::debug!("[autoplay] late background unlock ignored after giving up");
            return;
        }
        log::info!("[autoplay] unlocked from {:?}", self.phase);
        self.phase = Phase::Unlocked;
        self.in_flight.retain(|a| a.kind != AttemptKind::Unmute);
        if let Some(handle) = self.retry_timer.take() {
            timers.cancel(handle);
        }
        if let Some(handle) = self.settle_timer.take() {
            timers.cancel(handle);
        }
        self.hint.hide();
        self.fade_in(timers);
    }

    fn unmute_failed(&mut self, now_ms: f64, timers: &mut dyn Scheduler) {
        if self.phase == Phase::Unlocked {
            return;
        }
        self.sink.set_muted(true);
        self.hint.show();
        let window_over = self.retry_deadline.is_some_and(|d| now_ms > d);
        match self.phase {
            Phase::GaveUp => {}
            _ if window_over => self.give_up(timers),
            _ => {
                self.phase = Phase::AwaitingGesture;
                self.ensure_retry_loop(now_ms, timers);
            }
        }
        log::warn!("[autoplay] unmute blocked; now {:?}", self.phase);
    }

    /// Start the bounded retry loop unless one is already running. The window
    /// is fixed by the first entry and never extended.
    fn ensure_retry_loop(&mut self, now_ms: f64, timers: &mut dyn Scheduler) {
        if self.retry_timer.is_some() {
            return;
        }
        let deadline = *self
            .retry_deadline
            .get_or_insert(now_ms + self.config.retry_window_ms);
        if now_ms > deadline {
            self.give_up(timers);
            return;
        }
        self.retry_timer = Some(timers.schedule_repeating(self.config.retry_interval_ms));
        log::debug!("[autoplay] retry loop armed until t={:.0}ms", deadline);
    }

    fn retry_tick(&mut self, now_ms: f64, timers: &mut dyn Scheduler) {
        let window_over = self.retry_deadline.is_some_and(|d| now_ms > d);
        if window_over {
            // Background retries still in flight no longer count; only a
            // gesture may unlock from here on.
            self.in_flight
                .retain(|a| a.kind == AttemptKind::Muted || a.gesture);
            self.give_up(timers);
            return;
        }
        self.request_unmute(Trigger::RetryTick, now_ms, timers);
    }

    fn give_up(&mut self, timers: &mut dyn Scheduler) {
        if let Some(handle) = self.retry_timer.take() {
            timers.cancel(handle);
        }
        self.phase = Phase::GaveUp;
        self.hint.show();
        log::info!("[autoplay] giving up on autoplay; waiting for a tap");
    }

    fn fade_tick(&mut self, timers: &mut dyn Scheduler) {
        let target = self.config.target_volume;
        self.volume = (self.volume + self.config.fade_step).min(target);
        self.sink.set_volume(self.volume);
        if self.volume >= target {
            self.volume = target;
            if let Some(handle) = self.fade_timer.take() {
                timers.cancel(handle);
            }
        }
    }
}
