#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod layout;
mod overlay;
mod runtime;
mod surface;
mod timers;

use card_core::CardError;
use constants::*;
use runtime::{PageParts, Runtime};
use surface::CanvasSurface;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("petal-card starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn find_parts(document: &web::Document) -> anyhow::Result<PageParts> {
    let audio = dom::element::<web::HtmlAudioElement>(document, AUDIO_ID)?;
    let petals = CanvasSurface::new(dom::element(document, PETAL_CANVAS_ID)?)?;
    let sparkle = CanvasSurface::new(dom::element(document, SPARKLE_CANVAS_ID)?)?;
    Ok(PageParts {
        document: document.clone(),
        audio,
        petals,
        sparkle,
        hint: overlay::HintOverlay::find(document, HINT_ID),
        seed: layout::seed_from_clock(js_sys::Date::now(), FALLBACK_SEED),
    })
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| CardError::unavailable("window"))?;
    let document = window
        .document()
        .ok_or_else(|| CardError::unavailable("document"))?;

    let parts = find_parts(&document)?;
    let rt: Rc<RefCell<Runtime>> = Runtime::new(parts);
    rt.borrow_mut().attach()?;

    events::wire_all(&window, &document, &rt);

    // muted playback starts on `load`
    if document.ready_state() == "complete" {
        rt.borrow_mut().load();
    } else {
        let rt_load = rt.clone();
        dom::listen_once(&window, "load", move || {
            if let Ok(mut r) = rt_load.try_borrow_mut() {
                r.load();
            }
        });
    }

    frame::start_loop(Rc::new(RefCell::new(frame::FrameContext::new(rt))));
    Ok(())
}
