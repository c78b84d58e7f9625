// Scripted hosts shared by the integration tests: a sink whose answers are
// configured per test, a virtual-clock scheduler, and a surface that records
// every drawing call.

#![allow(dead_code)]

use std::collections::BTreeMap;

use card_core::*;

#[derive(Default)]
pub struct FakeSink {
    pub muted_play_ok: bool,
    pub unmuted_play_ok: bool,
    /// Set by a test right before it delivers a user gesture.
    pub gesture_active: bool,
    /// Answer every play with `Pending`; results arrive via `on_play_settled`.
    pub defer: bool,
    pub muted: bool,
    pub paused: bool,
    pub volume: f32,
    pub volumes: Vec<f32>,
    pub plays: Vec<(PlayTicket, bool)>,
    pub mute_calls: Vec<bool>,
}

impl FakeSink {
    pub fn allowing(muted_play_ok: bool, unmuted_play_ok: bool) -> Self {
        Self {
            muted_play_ok,
            unmuted_play_ok,
            ..Default::default()
        }
    }
}

impl AudioSink for FakeSink {
    fn play(&mut self, ticket: PlayTicket) -> PlayOutcome {
        self.plays.push((ticket, self.muted));
        self.paused = false;
        if self.defer {
            return PlayOutcome::Pending;
        }
        let ok = if self.muted {
            self.muted_play_ok
        } else {
            self.unmuted_play_ok || self.gesture_active
        };
        if ok {
            PlayOutcome::Granted
        } else {
            PlayOutcome::Blocked
        }
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.mute_calls.push(muted);
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.volumes.push(volume);
    }
}

#[derive(Default)]
pub struct FakeHint {
    pub visible: bool,
    pub shows: usize,
    pub hides: usize,
}

impl Affordance for FakeHint {
    fn show(&mut self) {
        self.visible = true;
        self.shows += 1;
    }

    fn hide(&mut self) {
        self.visible = false;
        self.hides += 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timer {
    pub due: f64,
    pub interval: Option<f64>,
}

#[derive(Default)]
pub struct FakeScheduler {
    pub now: f64,
    next_id: u64,
    live: BTreeMap<u64, Timer>,
    /// (handle, creation time, repeating?)
    pub created: Vec<(TimerHandle, f64, bool)>,
    pub cancelled: Vec<TimerHandle>,
}

impl FakeScheduler {
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_repeating(&self) -> usize {
        self.live.values().filter(|t| t.interval.is_some()).count()
    }

    pub fn created_at(&self, handle: TimerHandle) -> Option<f64> {
        self.created
            .iter()
            .find(|(h, _, _)| *h == handle)
            .map(|(_, at, _)| *at)
    }

    fn pop_due(&mut self, until: f64) -> Option<(TimerHandle, f64)> {
        let (&id, timer) = self
            .live
            .iter()
            .filter(|(_, t)| t.due <= until)
            .min_by(|a, b| a.1.due.total_cmp(&b.1.due).then(a.0.cmp(b.0)))?;
        let timer = *timer;
        match timer.interval {
            Some(i) => {
                if let Some(t) = self.live.get_mut(&id) {
                    t.due += i;
                }
            }
            None => {
                self.live.remove(&id);
            }
        }
        Some((TimerHandle(id), timer.due))
    }

    /// Move the clock to `until`, firing every due timer in order.
    pub fn run_until(&mut self, until: f64, mut fire: impl FnMut(TimerHandle, f64, &mut Self)) {
        while let Some((handle, at)) = self.pop_due(until) {
            self.now = at;
            fire(handle, at, self);
        }
        self.now = until;
    }

    fn insert(&mut self, delay: f64, interval: Option<f64>) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.live.insert(
            self.next_id,
            Timer {
                due: self.now + delay,
                interval,
            },
        );
        self.created.push((handle, self.now, interval.is_some()));
        handle
    }
}

impl Scheduler for FakeScheduler {
    fn schedule_once(&mut self, delay_ms: f64) -> TimerHandle {
        self.insert(delay_ms, None)
    }

    fn schedule_repeating(&mut self, interval_ms: f64) -> TimerHandle {
        self.insert(interval_ms, Some(interval_ms))
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if self.live.remove(&handle.0).is_some() {
            self.cancelled.push(handle);
        }
    }
}

pub type Controller = AutoplayController<FakeSink, FakeHint>;

pub fn controller(sink: FakeSink) -> Controller {
    AutoplayController::new(sink, FakeHint::default(), AutoplayConfig::default())
}

pub fn run(ctl: &mut Controller, sched: &mut FakeScheduler, until: f64) {
    sched.run_until(until, |h, at, s| ctl.on_timer(h, at, s));
}

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Resize(Viewport),
    Clear,
    Save,
    Restore,
    Alpha(f32),
    Fill(Color),
    Translate(f32, f32),
    Rotate(f32),
    Scale(f32, f32),
    BeginPath,
    MoveTo(f32, f32),
    Bezier,
    Arc(f32, f32, f32),
    ClosePath,
    FillPath,
    FillRect(f32, f32, f32, f32),
}

#[derive(Default)]
pub struct RecordingSurface {
    pub ops: Vec<Op>,
}

impl RecordingSurface {
    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// Filled shapes: one per rendered particle.
    pub fn shapes(&self) -> usize {
        self.count(|op| matches!(op, Op::FillPath | Op::FillRect(..)))
    }
}

impl DrawSurface for RecordingSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.ops.push(Op::Resize(viewport));
    }
    fn clear(&mut self) {
        self.ops.push(Op::Clear);
    }
    fn save(&mut self) {
        self.ops.push(Op::Save);
    }
    fn restore(&mut self) {
        self.ops.push(Op::Restore);
    }
    fn set_alpha(&mut self, alpha: f32) {
        self.ops.push(Op::Alpha(alpha));
    }
    fn set_fill(&mut self, color: Color) {
        self.ops.push(Op::Fill(color));
    }
    fn translate(&mut self, x: f32, y: f32) {
        self.ops.push(Op::Translate(x, y));
    }
    fn rotate(&mut self, radians: f32) {
        self.ops.push(Op::Rotate(radians));
    }
    fn scale(&mut self, sx: f32, sy: f32) {
        self.ops.push(Op::Scale(sx, sy));
    }
    fn begin_path(&mut self) {
        self.ops.push(Op::BeginPath);
    }
    fn move_to(&mut self, x: f32, y: f32) {
        self.ops.push(Op::MoveTo(x, y));
    }
    fn bezier_curve_to(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: f32) {
        self.ops.push(Op::Bezier);
    }
    fn arc(&mut self, x: f32, y: f32, radius: f32, _start: f32, _end: f32) {
        self.ops.push(Op::Arc(x, y, radius));
    }
    fn close_path(&mut self) {
        self.ops.push(Op::ClosePath);
    }
    fn fill(&mut self) {
        self.ops.push(Op::FillPath);
    }
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ops.push(Op::FillRect(x, y, w, h));
    }
}
