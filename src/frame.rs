use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::runtime::Runtime;

pub struct FrameContext {
    pub runtime: Rc<RefCell<Runtime>>,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn new(runtime: Rc<RefCell<Runtime>>) -> Self {
        Self {
            runtime,
            last_instant: Instant::now(),
        }
    }

    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;
        // the core clamps long gaps itself
        let dt_ms = dt.as_secs_f32() * 1000.0;
        match self.runtime.try_borrow_mut() {
            Ok(mut rt) => rt.frame(dt_ms),
            Err(_) => log::debug!("[frame] runtime busy, frame skipped"),
        }
    }
}

fn request_frame(tick: &Closure<dyn FnMut()>) {
    if let Some(w) = web::window() {
        _ = w.request_animation_frame(tick.as_ref().unchecked_ref());
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        if let Some(t) = tick_clone.borrow().as_ref() {
            request_frame(t);
        }
    }) as Box<dyn FnMut()>));
    if let Some(t) = tick.borrow().as_ref() {
        request_frame(t);
    }
}
