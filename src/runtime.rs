use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use web_sys as web;

use crate::audio::WebAudioSink;
use crate::constants::*;
use crate::dom;
use crate::layout::PendingResize;
use crate::overlay::{self, HintOverlay};
use crate::surface::CanvasSurface;
use crate::timers::WebScheduler;
use card_core::{
    AutoplayConfig, DrawSurface, GreetingCard, ParticleSystem, Phase, PlayTicket, TimerHandle,
};

pub type Card = GreetingCard<WebAudioSink, HintOverlay>;

/// Elements found at start-up, before the runtime exists.
pub struct PageParts {
    pub document: web::Document,
    pub audio: web::HtmlAudioElement,
    pub petals: CanvasSurface,
    pub sparkle: CanvasSurface,
    pub hint: HintOverlay,
    pub seed: u64,
}

/// Everything the page callbacks share. Lives in one `Rc<RefCell<_>>`; the
/// sink and scheduler hold weak references back to it.
pub struct Runtime {
    card: Card,
    timers: WebScheduler,
    surfaces: [CanvasSurface; 2],
    document: web::Document,
    pending_resize: PendingResize,
}

impl Runtime {
    pub fn new(parts: PageParts) -> Rc<RefCell<Self>> {
        let PageParts {
            document,
            audio,
            petals,
            sparkle,
            hint,
            seed,
        } = parts;
        let viewport = dom::current_viewport();
        Rc::new_cyclic(|weak| {
            let card = GreetingCard::new(
                WebAudioSink::new(audio, weak.clone()),
                hint,
                AutoplayConfig::default(),
                ParticleSystem::with_default_layers(viewport, seed),
            );
            RefCell::new(Self {
                card,
                timers: WebScheduler::new(weak.clone()),
                surfaces: [petals, sparkle],
                document,
                pending_resize: PendingResize::default(),
            })
        })
    }

    pub fn attach(&mut self) -> anyhow::Result<()> {
        let [a, b] = &mut self.surfaces;
        let mut surfaces: [&mut dyn DrawSurface; 2] = [a, b];
        self.card
            .attach(dom::current_viewport(), &mut surfaces)
            .map_err(anyhow::Error::from)
    }

    pub fn load(&mut self) {
        self.card.on_load(instant::now(), &mut self.timers);
    }

    pub fn fire_timer(&mut self, handle: TimerHandle) {
        self.timers.fired(handle);
        self.card
            .on_timer(handle, instant::now(), &mut self.timers);
    }

    pub fn play_settled(&mut self, ticket: PlayTicket, granted: bool) {
        self.card
            .on_play_settled(ticket, granted, instant::now(), &mut self.timers);
        self.sync_toggle();
    }

    pub fn first_gesture(&mut self) {
        if self.card.on_first_gesture(instant::now(), &mut self.timers) {
            log::info!("[page] first gesture used as unmute attempt");
        }
    }

    pub fn hint_tap(&mut self) {
        self.card.on_affordance_tap(instant::now(), &mut self.timers);
    }

    pub fn visibility(&mut self, visible: bool) {
        self.card
            .on_visibility_change(visible, instant::now(), &mut self.timers);
    }

    /// Flag the resize listeners mark when they find the runtime borrowed.
    pub fn pending_resize(&self) -> PendingResize {
        self.pending_resize.clone()
    }

    pub fn resize(&mut self) {
        self.pending_resize.take();
        let [a, b] = &mut self.surfaces;
        let mut surfaces: [&mut dyn DrawSurface; 2] = [a, b];
        self.card.on_resize(dom::current_viewport(), &mut surfaces);
    }

    pub fn surprise(&mut self, origin: Option<Vec2>) {
        let added = self
            .card
            .surprise(origin, instant::now(), &mut self.timers);
        self.card.intensify_sparks(SURPRISE_SPARK_MS);
        log::info!("[page] surprise: {} confetti", added);
    }

    /// While sound is still locked the button asks for an unmute instead of
    /// pausing the muted track.
    pub fn toggle_music(&mut self) {
        let audio = self.card.audio();
        let playing = if audio.phase() != Phase::Unlocked && !audio.is_paused() {
            self.card.on_affordance_tap(instant::now(), &mut self.timers);
            true
        } else {
            self.card.toggle_playback(instant::now(), &mut self.timers)
        };
        overlay::set_playing(&self.document, MUSIC_TOGGLE_ID, playing);
    }

    pub fn frame(&mut self, dt_ms: f32) {
        if self.pending_resize.is_marked() {
            log::debug!("[page] applying deferred resize");
            self.resize();
        }
        let [a, b] = &mut self.surfaces;
        let mut surfaces: [&mut dyn DrawSurface; 2] = [a, b];
        self.card.frame(dt_ms, &mut surfaces);
        self.timers.collect();
    }

    pub fn teardown(&mut self) {
        self.card.teardown(&mut self.timers);
        log::info!("[page] torn down, {} timers left", self.timers.live_count());
    }

    fn sync_toggle(&self) {
        let playing = !self.card.audio().is_paused() && !self.card.audio().sink().is_paused();
        overlay::set_playing(&self.document, MUSIC_TOGGLE_ID, playing);
    }
}
