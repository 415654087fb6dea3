//! Bubble Pop core crate.
//!
//! Word bubbles rise up the play area one at a time; typing a bubble's word
//! letter by letter pops it for points before the round timer runs out. The
//! game rules live in [`session::GameSession`] and are host-agnostic: the
//! browser build drives them through [`web`], native tests through
//! [`headless`] and [`scheduler::ManualScheduler`].

use wasm_bindgen::prelude::*;

pub mod config;
pub mod headless;
pub mod scheduler;
pub mod session;
pub mod surface;
pub mod web;
pub mod words;

pub use config::{ConfigError, GameConfig};
pub use session::{Bubble, GameSession, Phase, reward};
pub use words::{BASE_WORDS, WEIGHTED_WORDS, WeightedWordPool};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

/// Attach to the page with the stock configuration. The first round starts
/// automatically after a short delay.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::boot(GameConfig::default())
}

/// Like `start_game` with a JSON object overriding any `GameConfig` fields.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    web::boot(GameConfig::from_json(json)?)
}

#[wasm_bindgen]
pub fn reset_game() {
    web::with_session(|s| s.reset());
}

/// Feed a key from outside the page's own listeners (e.g. a custom keypad).
#[wasm_bindgen]
pub fn press_key(key: &str) -> bool {
    web::press(key)
}
