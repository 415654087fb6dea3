//! `Scheduler` backed by `setInterval` and `requestAnimationFrame`.
//!
//! Both JS callbacks are created once and live as long as the scheduler, so a
//! cancel issued from inside a firing never frees the closure that is running.
//! Firings carry our own handle id back into the session, which drops any
//! handle it no longer holds.

use std::collections::HashMap;

use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Performance, Window};

use crate::scheduler::{Scheduler, TimerHandle};

pub struct BrowserScheduler {
    window: Window,
    performance: Option<Performance>,
    last_id: u32,
    intervals: HashMap<TimerHandle, i32>,
    frame: Option<(TimerHandle, i32)>,
    interval_cb: Closure<dyn FnMut(u32)>,
    frame_cb: Closure<dyn FnMut(f64)>,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        let interval_cb = Closure::wrap(Box::new(move |id: u32| {
            super::with_session(|session| {
                let now = session.scheduler().now_ms();
                session.on_trigger(TimerHandle(id), now);
            });
        }) as Box<dyn FnMut(u32)>);
        let frame_cb = Closure::wrap(Box::new(move |ts: f64| {
            super::with_session(|session| {
                if let Some(handle) = session.scheduler_mut().take_fired_frame() {
                    session.on_trigger(handle, ts);
                }
            });
        }) as Box<dyn FnMut(f64)>);
        Self {
            performance: window.performance(),
            window,
            last_id: 0,
            intervals: HashMap::new(),
            frame: None,
            interval_cb,
            frame_cb,
        }
    }

    fn next_handle(&mut self) -> TimerHandle {
        self.last_id += 1;
        TimerHandle(self.last_id)
    }

    /// Claim the pending frame request; called from the rAF callback.
    fn take_fired_frame(&mut self) -> Option<TimerHandle> {
        self.frame.take().map(|(handle, _)| handle)
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule_periodic(&mut self, period_ms: u32) -> TimerHandle {
        let handle = self.next_handle();
        match self.window.set_interval_with_callback_and_timeout_and_arguments_1(
            self.interval_cb.as_ref().unchecked_ref(),
            period_ms.min(i32::MAX as u32) as i32,
            &JsValue::from(handle.0),
        ) {
            Ok(js_id) => {
                self.intervals.insert(handle, js_id);
            }
            Err(err) => warn!(?err, "setInterval failed"),
        }
        handle
    }

    fn schedule_next_frame(&mut self) -> TimerHandle {
        if let Some((_, js_id)) = self.frame.take() {
            self.window.cancel_animation_frame(js_id).ok();
        }
        let handle = self.next_handle();
        match self.window.request_animation_frame(self.frame_cb.as_ref().unchecked_ref()) {
            Ok(js_id) => self.frame = Some((handle, js_id)),
            Err(err) => warn!(?err, "requestAnimationFrame failed"),
        }
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(js_id) = self.intervals.remove(&handle) {
            self.window.clear_interval_with_handle(js_id);
        }
        if let Some((pending, js_id)) = self.frame {
            if pending == handle {
                self.window.cancel_animation_frame(js_id).ok();
                self.frame = None;
            }
        }
    }

    fn now_ms(&self) -> f64 {
        self.performance.as_ref().map(|p| p.now()).unwrap_or(0.0)
    }
}

impl Drop for BrowserScheduler {
    fn drop(&mut self) {
        for (_, js_id) in self.intervals.drain() {
            self.window.clear_interval_with_handle(js_id);
        }
        if let Some((_, js_id)) = self.frame.take() {
            self.window.cancel_animation_frame(js_id).ok();
        }
    }
}

/// Run `f` once after `ms` milliseconds. The closure frees itself after running.
pub(crate) fn set_timeout(
    window: &Window,
    ms: u32,
    f: impl FnOnce() + 'static,
) -> Result<i32, JsValue> {
    let cb = Closure::once_into_js(f);
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        cb.unchecked_ref(),
        ms.min(i32::MAX as u32) as i32,
    )
}
