use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::layout;
use card_core::{CardError, Viewport};

/// Typed lookup of a required element.
pub fn element<T: JsCast>(document: &web::Document, id: &str) -> Result<T, CardError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| CardError::unavailable(format!("#{}", id)))?
        .dyn_into::<T>()
        .map_err(|_| CardError::unavailable(format!("#{} of the expected element type", id)))
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    handler: impl FnMut(web::MouseEvent) + 'static,
) -> bool {
    let Some(el) = document.get_element_by_id(element_id) else {
        return false;
    };
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::MouseEvent)>);
    _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
    true
}

/// Listen for `event` on `target` for the page's lifetime.
pub fn listen(target: &web::EventTarget, event: &str, handler: impl FnMut(web::Event) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        log::warn!("[dom] could not listen for {}: {:?}", event, e);
    }
    closure.forget();
}

/// Listen for a single `event`; the browser drops the listener after it fires.
pub fn listen_once(target: &web::EventTarget, event: &str, handler: impl FnOnce() + 'static) {
    let opts = web::AddEventListenerOptions::new();
    opts.set_once(true);
    let callback = Closure::once_into_js(handler);
    if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        callback.unchecked_ref(),
        &opts,
    ) {
        log::warn!("[dom] could not listen once for {}: {:?}", event, e);
    }
}

pub fn current_viewport() -> Viewport {
    match web::window() {
        Some(w) => {
            let width = w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            layout::viewport_from_window(width, height, w.device_pixel_ratio())
        }
        None => Viewport::default(),
    }
}

pub fn page_visible(document: &web::Document) -> bool {
    document.visibility_state() == web::VisibilityState::Visible
}
