use web_sys as web;

use crate::constants::{HIDDEN_CLASS, PLAYING_CLASS};
use card_core::Affordance;

/// The "tap to enable sound" hint. A missing element turns every call into a
/// no-op so the card still runs on pages without one.
pub struct HintOverlay {
    el: Option<web::HtmlElement>,
}

impl HintOverlay {
    pub fn find(document: &web::Document, id: &str) -> Self {
        let el = crate::dom::element::<web::HtmlElement>(document, id).ok();
        if el.is_none() {
            log::info!("[overlay] no #{} on this page; hint disabled", id);
        }
        Self { el }
    }
}

impl Affordance for HintOverlay {
    fn show(&mut self) {
        if let Some(el) = &self.el {
            _ = el.class_list().remove_1(HIDDEN_CLASS);
            // fallback for pages without the class
            _ = el.style().set_property("display", "block");
        }
    }

    fn hide(&mut self) {
        if let Some(el) = &self.el {
            _ = el.class_list().add_1(HIDDEN_CLASS);
            _ = el.style().set_property("display", "none");
        }
    }
}

/// Reflect the playback state on the optional music button.
pub fn set_playing(document: &web::Document, id: &str, playing: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        _ = el.class_list().toggle_with_force(PLAYING_CLASS, playing);
        _ = el.set_attribute("aria-pressed", if playing { "true" } else { "false" });
    }
}
