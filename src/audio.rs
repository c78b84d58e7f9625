use std::cell::RefCell;
use std::rc::Weak;

use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

use crate::runtime::Runtime;
use card_core::{AudioSink, PlayOutcome, PlayTicket};

/// `AudioSink` over the page's `<audio>` element. `play()` returns a promise,
/// so every request is answered `Pending` and settled once it resolves.
pub struct WebAudioSink {
    el: web::HtmlAudioElement,
    runtime: Weak<RefCell<Runtime>>,
}

impl WebAudioSink {
    pub fn new(el: web::HtmlAudioElement, runtime: Weak<RefCell<Runtime>>) -> Self {
        el.set_loop(true);
        Self { el, runtime }
    }

    pub fn is_paused(&self) -> bool {
        self.el.paused()
    }
}

impl AudioSink for WebAudioSink {
    fn play(&mut self, ticket: PlayTicket) -> PlayOutcome {
        let promise = match self.el.play() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("[audio] play() threw: {:?}", e);
                return PlayOutcome::Blocked;
            }
        };
        let runtime = self.runtime.clone();
        spawn_local(async move {
            let granted = match JsFuture::from(promise).await {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("[audio] play {:?} rejected: {:?}", ticket, e);
                    false
                }
            };
            if let Some(rt) = runtime.upgrade() {
                match rt.try_borrow_mut() {
                    Ok(mut rt) => rt.play_settled(ticket, granted),
                    Err(_) => log::warn!("[audio] runtime busy; settlement {:?} lost", ticket),
                };
            }
        });
        PlayOutcome::Pending
    }

    fn pause(&mut self) {
        _ = self.el.pause();
    }

    fn set_muted(&mut self, muted: bool) {
        self.el.set_muted(muted);
    }

    fn set_volume(&mut self, volume: f32) {
        self.el.set_volume(volume.clamp(0.0, 1.0) as f64);
    }
}
