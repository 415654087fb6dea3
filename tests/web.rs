// Browser tests for the DOM surface. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use bubble_pop::surface::{BubbleView, Overlay, Surface, Voice};
use bubble_pop::web::{DomSurface, SpeechVoice};
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn attach() -> (web_sys::Document, DomSurface) {
    let win = web_sys::window().expect("window");
    let doc = win.document().expect("document");
    let surface = DomSurface::attach(&win, &doc, 700.0).expect("attach");
    (doc, surface)
}

fn text_of(doc: &web_sys::Document, id: &str) -> String {
    doc.get_element_by_id(id)
        .and_then(|el| el.text_content())
        .unwrap_or_default()
}

#[wasm_bindgen_test]
fn creates_missing_elements_and_writes_text() {
    let (doc, mut surface) = attach();
    surface.set_score("Score: 18");
    surface.set_collected("cat");
    surface.set_hint(Some('C'));
    surface.set_timer("Time: 12.3s");
    assert_eq!(text_of(&doc, "score"), "Score: 18");
    assert_eq!(text_of(&doc, "collected"), "cat");
    assert_eq!(text_of(&doc, "hintLetter"), "C");
    assert_eq!(text_of(&doc, "timer"), "Time: 12.3s");
}

#[wasm_bindgen_test]
fn game_over_overlay_shows_play_again() {
    let (doc, mut surface) = attach();
    surface.set_overlay(&Overlay::GameOver("Game Over! Score: 7".into()));
    assert_eq!(text_of(&doc, "infoText"), "Game Over! Score: 7");
    let btn = doc.get_element_by_id("playAgainBtn").expect("play again button");
    assert_eq!(btn.get_attribute("style").map(|s| s.contains("inline-block")), Some(true));
}

#[wasm_bindgen_test]
fn bubbles_are_added_and_removed() {
    let (doc, mut surface) = attach();
    surface.show_bubble(&BubbleView {
        id: 42,
        word: "sun".into(),
        x: 0.5,
        rise_secs: 12.0,
    });
    let el = doc
        .query_selector("[data-id='42']")
        .ok()
        .flatten()
        .expect("bubble element");
    assert_eq!(el.text_content().as_deref(), Some("sun"));
    surface.remove_bubble(42, false);
    assert!(doc.query_selector("[data-id='42']").ok().flatten().is_none());
}

#[wasm_bindgen(inline_js = "
export function hide_speech() {
    Object.defineProperty(window, 'speechSynthesis', { value: undefined, configurable: true });
}
export function restore_speech() {
    delete window.speechSynthesis;
}
")]
extern "C" {
    fn hide_speech();
    fn restore_speech();
}

#[wasm_bindgen_test]
fn voice_without_speech_api_is_silent() {
    let win = web_sys::window().expect("window");
    let doc = win.document().expect("document");
    hide_speech();
    let mut voice = SpeechVoice::new(&win, &doc, 0.9, 1.1);
    restore_speech();
    assert!(!voice.is_enabled());
    voice.speak("cat");
    voice.cancel();
}
