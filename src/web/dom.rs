//! DOM-backed `Surface`.
//!
//! Elements are looked up by id from the host page; any that are missing get a
//! minimal fixed-position fallback so the game still runs on a bare page.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlButtonElement, HtmlElement, Window};

use super::keyboard;
use super::timers::set_timeout;
use crate::surface::{BubbleId, BubbleView, Overlay, Surface};

const INTRO_TEXT: &str = "Type the word in the bubble to pop it!";
// Bubble box width reserved at the right edge so words stay inside the play area.
const BUBBLE_WIDTH_PX: f64 = 120.0;
const BUBBLE_MARGIN_PX: f64 = 6.0;
const POP_MS: u32 = 220;
const SPARK_MS: u32 = 900;
const PULSE_MS: u32 = 300;

pub struct DomSurface {
    window: Window,
    document: Document,
    game_area: HtmlElement,
    collected: HtmlElement,
    score: HtmlElement,
    timer: HtmlElement,
    hint: HtmlElement,
    typed: HtmlElement,
    big_timer: HtmlElement,
    info: HtmlElement,
    info_text: HtmlElement,
    play_again: HtmlElement,
    start_btn: Option<HtmlButtonElement>,
    reset_btn: Option<HtmlButtonElement>,
    touch_keyboard: HtmlElement,
    keyboard_built: bool,
    touch_keyboard_max_width: f64,
    intro_text: String,
    bubble: Option<(BubbleId, HtmlElement)>,
}

impl DomSurface {
    pub fn attach(
        window: &Window,
        document: &Document,
        touch_keyboard_max_width: f64,
    ) -> Result<Self, JsValue> {
        let game_area = ensure_element(
            document,
            "gameArea",
            "position:relative; width:100%; height:70vh; overflow:hidden;",
        )?;
        game_area.set_attribute("tabindex", "0")?;
        let info = ensure_element(
            document,
            "info",
            concat!(
                "position:fixed; top:40%; left:50%; transform:translate(-50%,-50%); ",
                "font-size:22px; padding:16px 24px; background:rgba(255,255,255,0.9); ",
                "border-radius:12px; text-align:center; z-index:40;",
            ),
        )?;

        // Split the info panel into a text span plus the Play Again button so the
        // message can change without dropping the button.
        let (info_text, play_again, intro_text) = match (
            document.get_element_by_id("infoText"),
            document.get_element_by_id("playAgainBtn"),
        ) {
            (Some(text), Some(btn)) => {
                let text: HtmlElement = text.dyn_into()?;
                let btn: HtmlElement = btn.dyn_into()?;
                let intro = text.text_content().unwrap_or_default();
                (text, btn, intro)
            }
            _ => {
                let intro = info
                    .text_content()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| INTRO_TEXT.to_string());
                info.set_text_content(None);
                let text: HtmlElement = document.create_element("span")?.dyn_into()?;
                text.set_id("infoText");
                text.set_text_content(Some(&intro));
                info.append_child(&text)?;
                info.append_child(&document.create_element("br")?.into())?;
                let btn: HtmlElement = document.create_element("button")?.dyn_into()?;
                btn.set_id("playAgainBtn");
                btn.set_class_name("start-btn-large");
                btn.set_text_content(Some("Play Again"));
                btn.style().set_property("margin-top", "12px")?;
                btn.style().set_property("display", "none")?;
                info.append_child(&btn)?;
                (text, btn, intro)
            }
        };

        Ok(Self {
            window: window.clone(),
            document: document.clone(),
            collected: ensure_element(
                document,
                "collected",
                "position:fixed; bottom:10px; left:12px; font-size:18px;",
            )?,
            score: ensure_element(
                document,
                "score",
                "position:fixed; top:10px; left:12px; font-size:18px;",
            )?,
            timer: ensure_element(
                document,
                "timer",
                "position:fixed; top:10px; right:12px; font-size:18px;",
            )?,
            hint: ensure_element(
                document,
                "hintLetter",
                "position:fixed; top:40px; left:12px; font-size:32px;",
            )?,
            typed: ensure_element(
                document,
                "currentTyped",
                "position:fixed; top:80px; left:12px; font-size:24px;",
            )?,
            big_timer: ensure_element(
                document,
                "bigTimer",
                "position:fixed; top:10px; left:50%; transform:translateX(-50%); font-size:48px; display:none;",
            )?,
            touch_keyboard: ensure_element(
                document,
                "touchKeyboard",
                "position:fixed; bottom:0; left:0; right:0; display:none; flex-direction:column;",
            )?,
            start_btn: button(document, "startBtn")?,
            reset_btn: button(document, "resetBtn")?,
            game_area,
            info,
            info_text,
            play_again,
            keyboard_built: false,
            touch_keyboard_max_width,
            intro_text,
            bubble: None,
        })
    }

    pub fn game_area(&self) -> &HtmlElement {
        &self.game_area
    }

    pub fn play_again(&self) -> &HtmlElement {
        &self.play_again
    }

    pub fn start_button(&self) -> Option<&HtmlButtonElement> {
        self.start_btn.as_ref()
    }

    pub fn reset_button(&self) -> Option<&HtmlButtonElement> {
        self.reset_btn.as_ref()
    }

    fn is_narrow(&self) -> bool {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .is_some_and(|w| w <= self.touch_keyboard_max_width)
    }

    fn live_bubble(&self, id: BubbleId) -> Option<&HtmlElement> {
        self.bubble.as_ref().filter(|(live, _)| *live == id).map(|(_, el)| el)
    }

    fn show_spark(&self, x: f64, y: f64, text: &str) -> Result<(), JsValue> {
        let Some(body) = self.document.body() else {
            return Ok(());
        };
        let spark: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        spark.set_class_name("score-spark");
        spark.set_text_content(Some(text));
        let style = spark.style();
        style.set_property("left", &format!("{x}px"))?;
        style.set_property("top", &format!("{y}px"))?;
        body.append_child(&spark)?;
        set_timeout(&self.window, SPARK_MS, move || spark.remove())?;
        Ok(())
    }
}

impl Surface for DomSurface {
    fn set_collected(&mut self, text: &str) {
        self.collected.set_text_content(Some(text));
    }

    fn set_score(&mut self, text: &str) {
        self.score.set_text_content(Some(text));
    }

    fn set_timer(&mut self, text: &str) {
        self.timer.set_text_content(Some(text));
    }

    fn set_countdown(&mut self, text: &str) {
        self.big_timer.set_text_content(Some(text));
        let display = if text.is_empty() { "none" } else { "flex" };
        self.big_timer.style().set_property("display", display).ok();
        if text.is_empty() {
            self.big_timer.class_list().remove_1("running").ok();
        } else {
            self.big_timer.class_list().add_1("running").ok();
        }
    }

    fn set_hint(&mut self, letter: Option<char>) {
        let text = letter.map(String::from).unwrap_or_default();
        self.hint.set_text_content(Some(&text));
    }

    fn set_typed(&mut self, text: &str) {
        self.typed.set_text_content(Some(text));
    }

    fn set_overlay(&mut self, overlay: &Overlay) {
        let style = self.info.style();
        match overlay {
            Overlay::Intro => {
                self.info_text.set_text_content(Some(&self.intro_text));
                self.play_again.style().set_property("display", "none").ok();
                style.set_property("display", "block").ok();
            }
            Overlay::Hidden => {
                style.set_property("display", "none").ok();
                // Key events go to the play area once the round is visible.
                self.game_area.focus().ok();
            }
            Overlay::GameOver(message) => {
                self.info_text.set_text_content(Some(message));
                self.play_again.style().set_property("display", "inline-block").ok();
                style.set_property("display", "block").ok();
            }
        }
    }

    fn set_controls(&mut self, can_start: bool, can_reset: bool) {
        if let Some(btn) = &self.start_btn {
            btn.set_disabled(!can_start);
        }
        if let Some(btn) = &self.reset_btn {
            btn.set_disabled(!can_reset);
        }
    }

    fn show_bubble(&mut self, bubble: &BubbleView) {
        let el = match self
            .document
            .create_element("div")
            .and_then(|el| el.dyn_into::<HtmlElement>().map_err(JsValue::from))
        {
            Ok(el) => el,
            Err(err) => {
                tracing::warn!(?err, "could not create bubble element");
                return;
            }
        };
        el.set_class_name("bubble large");
        el.set_text_content(Some(&bubble.word));
        el.set_attribute("data-id", &bubble.id.to_string()).ok();

        let width = f64::from(self.game_area.client_width());
        let height = f64::from(self.game_area.client_height());
        let span = (width - BUBBLE_WIDTH_PX - BUBBLE_MARGIN_PX).max(0.0);
        let style = el.style();
        style
            .set_property("left", &format!("{}px", BUBBLE_MARGIN_PX + bubble.x * span))
            .ok();
        style.set_property("top", &format!("{}px", height + 40.0)).ok();
        style
            .set_property("animation", &format!("floatUp {:.2}s linear forwards", bubble.rise_secs))
            .ok();

        if let Err(err) = self.game_area.append_child(&el) {
            tracing::warn!(?err, "could not attach bubble");
            return;
        }
        if let Some((_, old)) = self.bubble.replace((bubble.id, el)) {
            old.remove();
        }
    }

    fn remove_bubble(&mut self, id: BubbleId, popped: bool) {
        let Some((_, el)) = self.bubble.take_if(|(live, _)| *live == id) else {
            return;
        };
        if popped {
            el.class_list().add_1("pop-animation").ok();
            if set_timeout(&self.window, POP_MS, {
                let el = el.clone();
                move || el.remove()
            })
            .is_err()
            {
                el.remove();
            }
        } else {
            el.remove();
        }
    }

    fn pulse_bubble(&mut self, id: BubbleId) {
        let Some(el) = self.live_bubble(id).cloned() else {
            return;
        };
        el.class_list().add_1("pulse").ok();
        set_timeout(&self.window, PULSE_MS, move || {
            el.class_list().remove_1("pulse").ok();
        })
        .ok();
        self.game_area.focus().ok();
    }

    fn spark(&mut self, id: BubbleId, text: &str) {
        let Some(el) = self.live_bubble(id) else {
            return;
        };
        let rect = el.get_bounding_client_rect();
        if let Err(err) = self.show_spark(rect.left() + rect.width() / 2.0, rect.top(), text) {
            tracing::debug!(?err, "spark skipped");
        }
    }

    fn set_touch_keyboard(&mut self, visible: bool) {
        let style = self.touch_keyboard.style();
        if !visible || !self.is_narrow() {
            style.set_property("display", "none").ok();
            return;
        }
        if !self.keyboard_built {
            match keyboard::build(&self.document, &self.touch_keyboard) {
                Ok(()) => self.keyboard_built = true,
                Err(err) => {
                    tracing::warn!(?err, "touch keyboard unavailable");
                    return;
                }
            }
        }
        style.set_property("display", "flex").ok();
    }
}

/// Find an element by id, creating a styled `div` on `<body>` when the page lacks it.
fn ensure_element(doc: &Document, id: &str, fallback_style: &str) -> Result<HtmlElement, JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        return el.dyn_into().map_err(JsValue::from);
    }
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
    let div = doc.create_element("div")?;
    div.set_id(id);
    div.set_attribute("style", fallback_style)?;
    body.append_child(&div)?;
    div.dyn_into().map_err(JsValue::from)
}

fn button(doc: &Document, id: &str) -> Result<Option<HtmlButtonElement>, JsValue> {
    doc.get_element_by_id(id)
        .map(|el| el.dyn_into::<HtmlButtonElement>().map_err(JsValue::from))
        .transpose()
}
