//! `Voice` backed by the Web Speech API, gated by the page's voice checkbox.

use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlInputElement, SpeechSynthesis, SpeechSynthesisUtterance, Window};

use crate::surface::Voice;

pub struct SpeechVoice {
    synth: Option<SpeechSynthesis>,
    toggle: Option<HtmlInputElement>,
    rate: f32,
    pitch: f32,
}

impl SpeechVoice {
    pub fn new(window: &Window, document: &Document, rate: f32, pitch: f32) -> Self {
        // A missing API reads back as `undefined` rather than throwing.
        let synth = window
            .speech_synthesis()
            .ok()
            .filter(|s| !s.is_undefined() && !s.is_null());
        if synth.is_none() {
            debug!("speechSynthesis unavailable; voice feedback disabled");
        }
        let toggle = document
            .get_element_by_id("voiceToggle")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        Self {
            synth,
            toggle,
            rate,
            pitch,
        }
    }
}

impl Voice for SpeechVoice {
    fn is_enabled(&self) -> bool {
        self.synth.is_some() && self.toggle.as_ref().is_some_and(|t| t.checked())
    }

    fn speak(&mut self, text: &str) {
        let Some(synth) = &self.synth else {
            return;
        };
        match SpeechSynthesisUtterance::new_with_text(text) {
            Ok(utterance) => {
                utterance.set_rate(self.rate);
                utterance.set_pitch(self.pitch);
                synth.cancel();
                synth.speak(&utterance);
            }
            Err(err) => debug!(?err, "utterance not supported"),
        }
    }

    fn cancel(&mut self) {
        if let Some(synth) = &self.synth {
            synth.cancel();
        }
    }
}
