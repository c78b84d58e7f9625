use std::cell::RefCell;
use std::rc::Weak;

use fnv::FnvHashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::runtime::Runtime;
use card_core::{Scheduler, TimerHandle};

struct Armed {
    js_id: i32,
    repeating: bool,
    // kept alive while the browser may still call it
    callback: Closure<dyn FnMut()>,
}

/// `Scheduler` over `setTimeout` / `setInterval`. Expirations are routed back
/// into the runtime by handle.
pub struct WebScheduler {
    runtime: Weak<RefCell<Runtime>>,
    next_id: u64,
    armed: FnvHashMap<u64, Armed>,
    // A closure cancelled from inside its own callback cannot be dropped
    // there; it waits here until the next animation frame.
    retired: Vec<Closure<dyn FnMut()>>,
}

impl WebScheduler {
    pub fn new(runtime: Weak<RefCell<Runtime>>) -> Self {
        Self {
            runtime,
            next_id: 0,
            armed: FnvHashMap::default(),
            retired: Vec::new(),
        }
    }

    fn arm(&mut self, delay_ms: f64, repeating: bool) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let Some(window) = web::window() else {
            log::warn!("[timers] no window; timer {:?} will never fire", handle);
            return handle;
        };
        let runtime = self.runtime.clone();
        let callback = Closure::wrap(Box::new(move || {
            let Some(rt) = runtime.upgrade() else {
                return;
            };
            match rt.try_borrow_mut() {
                Ok(mut rt) => rt.fire_timer(handle),
                Err(_) => log::debug!("[timers] runtime busy, dropped tick {:?}", handle),
            };
        }) as Box<dyn FnMut()>);
        let delay = delay_ms.max(0.0).round() as i32;
        let js_id = if repeating {
            window.set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay,
            )
        } else {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay,
            )
        };
        match js_id {
            Ok(js_id) => {
                self.armed.insert(
                    handle.0,
                    Armed {
                        js_id,
                        repeating,
                        callback,
                    },
                );
            }
            Err(e) => log::warn!("[timers] could not arm {:?}: {:?}", handle, e),
        }
        handle
    }

    /// Bookkeeping for a timer that just fired: one-shot timers are done.
    pub fn fired(&mut self, handle: TimerHandle) {
        if self.armed.get(&handle.0).is_some_and(|a| !a.repeating) {
            if let Some(armed) = self.armed.remove(&handle.0) {
                self.retired.push(armed.callback);
            }
        }
    }

    /// Drop callbacks retired since the last frame.
    pub fn collect(&mut self) {
        self.retired.clear();
    }

    pub fn live_count(&self) -> usize {
        self.armed.len()
    }
}

impl Scheduler for WebScheduler {
    fn schedule_once(&mut self, delay_ms: f64) -> TimerHandle {
        self.arm(delay_ms, false)
    }

    fn schedule_repeating(&mut self, interval_ms: f64) -> TimerHandle {
        self.arm(interval_ms, true)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let Some(armed) = self.armed.remove(&handle.0) else {
            return;
        };
        if let Some(window) = web::window() {
            if armed.repeating {
                window.clear_interval_with_handle(armed.js_id);
            } else {
                window.clear_timeout_with_handle(armed.js_id);
            }
        }
        self.retired.push(armed.callback);
    }
}
