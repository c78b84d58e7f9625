use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use web_sys as web;

use crate::constants::*;
use crate::dom;
use crate::layout::{self, PendingResize};
use crate::runtime::Runtime;

type Shared = Rc<RefCell<Runtime>>;

// Page callbacks never nest, but a promise settling mid-frame would; skip
// rather than panic on a double borrow.
fn with(rt: &Shared, f: impl FnOnce(&mut Runtime)) {
    match rt.try_borrow_mut() {
        Ok(mut rt) => f(&mut rt),
        Err(_) => log::debug!("[events] runtime busy, event skipped"),
    }
}

/// A resize that finds the runtime busy is deferred to the next frame
/// instead of being dropped.
fn resize_or_defer(rt: &Shared, pending: &PendingResize) {
    match rt.try_borrow_mut() {
        Ok(mut rt) => rt.resize(),
        Err(_) => {
            log::debug!("[events] runtime busy, resize deferred");
            pending.mark();
        }
    }
}

pub fn wire_all(window: &web::Window, document: &web::Document, rt: &Shared) {
    let pending = rt.borrow().pending_resize();
    wire_first_gesture(window, rt);
    wire_hint(document, rt);
    wire_visibility(window, document, rt);
    wire_resize(window, rt, pending.clone());
    watch_pixel_ratio(rt.clone(), pending);
    wire_buttons(document, rt);
    wire_pagehide(window, rt);
}

/// The first pointer or key press anywhere counts as the unlocking gesture.
fn wire_first_gesture(window: &web::Window, rt: &Shared) {
    for event in ["pointerdown", "keydown"] {
        let rt = rt.clone();
        dom::listen_once(window, event, move || with(&rt, |r| r.first_gesture()));
    }
}

fn wire_hint(document: &web::Document, rt: &Shared) {
    let Some(el) = document.get_element_by_id(HINT_ID) else {
        return;
    };
    let rt = rt.clone();
    dom::listen(&el, "pointerdown", move |ev| {
        // keep the window listener from spending the first gesture on it too
        ev.stop_propagation();
        with(&rt, |r| r.hint_tap());
    });
}

fn wire_visibility(window: &web::Window, document: &web::Document, rt: &Shared) {
    let rt_vis = rt.clone();
    let doc = document.clone();
    dom::listen(document, "visibilitychange", move |_| {
        let visible = dom::page_visible(&doc);
        with(&rt_vis, |r| r.visibility(visible));
    });

    let rt_focus = rt.clone();
    dom::listen(window, "focus", move |_| {
        with(&rt_focus, |r| r.visibility(true))
    });
}

fn wire_resize(window: &web::Window, rt: &Shared, pending: PendingResize) {
    let rt = rt.clone();
    dom::listen(window, "resize", move |_| resize_or_defer(&rt, &pending));
}

/// Window resizes do not fire when only the pixel ratio changes, so watch a
/// resolution query for the current ratio and re-arm it after every change.
fn watch_pixel_ratio(rt: Shared, pending: PendingResize) {
    let Some(window) = web::window() else {
        return;
    };
    let query = layout::resolution_query(window.device_pixel_ratio());
    let mql = match window.match_media(&query) {
        Ok(Some(mql)) => mql,
        Ok(None) | Err(_) => {
            log::warn!("[events] matchMedia unavailable; pixel ratio changes ignored");
            return;
        }
    };
    dom::listen_once(&mql, "change", move || {
        resize_or_defer(&rt, &pending);
        watch_pixel_ratio(rt, pending);
    });
}

fn wire_buttons(document: &web::Document, rt: &Shared) {
    // the toggle decides for itself what a press means
    if let Some(el) = document.get_element_by_id(MUSIC_TOGGLE_ID) {
        dom::listen(&el, "pointerdown", |ev| ev.stop_propagation());
    }
    let rt_toggle = rt.clone();
    if dom::add_click_listener(document, MUSIC_TOGGLE_ID, move |ev| {
        ev.stop_propagation();
        with(&rt_toggle, |r| r.toggle_music());
    }) {
        log::info!("[events] music toggle wired");
    }

    let rt_surprise = rt.clone();
    dom::add_click_listener(document, SURPRISE_ID, move |ev| {
        let origin = Vec2::new(ev.client_x() as f32, ev.client_y() as f32);
        // keyboard activation reports (0, 0); burst from the centre instead
        let origin = (origin != Vec2::ZERO).then_some(origin);
        with(&rt_surprise, |r| r.surprise(origin));
    });
}

fn wire_pagehide(window: &web::Window, rt: &Shared) {
    let rt = rt.clone();
    dom::listen_once(window, "pagehide", move || with(&rt, |r| r.teardown()));
}
