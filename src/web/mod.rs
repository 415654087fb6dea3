//! Browser host: wires the session to the DOM, timers, speech and input events.
//!
//! The session lives in a thread-local `RefCell`. Every JS callback borrows it,
//! runs to completion and releases it before the next event is dispatched.

use std::cell::{Cell, RefCell};

use tracing::{debug, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Window, window};

use crate::config::{ConfigError, GameConfig};
use crate::session::GameSession;

mod dom;
mod keyboard;
mod logging;
mod speech;
mod timers;

pub use dom::DomSurface;
pub use speech::SpeechVoice;
pub use timers::BrowserScheduler;

pub type WebSession = GameSession<BrowserScheduler, DomSurface, SpeechVoice>;

// Delay between "Play Again" and the next round.
const RESTART_DELAY_MS: u32 = 150;

thread_local! {
    static SESSION: RefCell<Option<WebSession>> = const { RefCell::new(None) };
    static LISTENERS_INSTALLED: Cell<bool> = const { Cell::new(false) };
}

impl From<ConfigError> for JsValue {
    fn from(err: ConfigError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Run `f` against the live session. Returns `None` when there is no session
/// or it is already borrowed further up the stack.
pub(crate) fn with_session<R>(f: impl FnOnce(&mut WebSession) -> R) -> Option<R> {
    SESSION.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

pub(crate) fn boot(config: GameConfig) -> Result<(), JsValue> {
    logging::init(&config.log_filter);
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // A second boot replaces the running game; stop its timers first.
    with_session(|old| old.reset());

    let surface = DomSurface::attach(&win, &doc, config.touch_keyboard_max_width)?;
    let voice = SpeechVoice::new(&win, &doc, config.speech_rate, config.speech_pitch);
    let scheduler = BrowserScheduler::new(win.clone());
    let autostart = config.autostart_delay_ms;
    let session = GameSession::new(config, scheduler, surface, voice)?;
    SESSION.with(|cell| cell.replace(Some(session)));

    if !LISTENERS_INSTALLED.with(Cell::get) {
        install_listeners(&win)?;
        LISTENERS_INSTALLED.with(|flag| flag.set(true));
    }

    if let Some(delay) = autostart {
        timers::set_timeout(&win, delay, || {
            with_session(|s| s.start());
        })?;
    }
    info!("bubble pop ready");
    Ok(())
}

/// Forward a key string from any input source. Only single characters count.
pub(crate) fn press(key: &str) -> bool {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => press_char(c),
        _ => false,
    }
}

pub(crate) fn press_char(c: char) -> bool {
    with_session(|s| s.handle_key(c)).unwrap_or(false)
}

/// Reset, then start a fresh round after a short pause.
fn restart(win: &Window) {
    with_session(|s| s.reset());
    if let Err(err) = timers::set_timeout(win, RESTART_DELAY_MS, || {
        with_session(|s| s.start());
    }) {
        debug!(?err, "restart timer failed; starting immediately");
        with_session(|s| s.start());
    }
}

fn install_listeners(win: &Window) -> Result<(), JsValue> {
    // Keyboard: listen on window so focus inside the page does not matter.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            if evt.ctrl_key() || evt.meta_key() || evt.alt_key() {
                return;
            }
            if press(&evt.key()) {
                // Accepted keys (space in "apple pie") must not scroll the page.
                evt.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    let (game_area, play_again, start_btn, reset_btn) = with_session(|s| {
        let surface = s.surface();
        (
            surface.game_area().clone(),
            surface.play_again().clone(),
            surface.start_button().cloned(),
            surface.reset_button().cloned(),
        )
    })
    .ok_or_else(|| JsValue::from_str("session not initialised"))?;

    // Clicking a bubble pulses it and says the word again; it never pops.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let target = evt.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok());
            let Some(target) = target else {
                return;
            };
            let Ok(Some(bubble)) = target.closest(".bubble") else {
                return;
            };
            if let Some(id) = bubble.get_attribute("data-id").and_then(|v| v.parse().ok()) {
                with_session(|s| s.poke_bubble(id));
            }
        }) as Box<dyn FnMut(_)>);
        game_area.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let area = game_area.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            area.focus().ok();
        }) as Box<dyn FnMut(_)>);
        game_area.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    if let Some(btn) = start_btn {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_session(|s| s.start());
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    if let Some(btn) = reset_btn {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_session(|s| s.reset());
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let win = win.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            restart(&win);
        }) as Box<dyn FnMut(_)>);
        play_again.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}
