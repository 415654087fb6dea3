//! In-memory collaborators for running a session without a browser.

use crate::scheduler::{ManualScheduler, Scheduler};
use crate::session::GameSession;
use crate::surface::{BubbleId, BubbleView, Overlay, Surface, Voice};

/// Surface that keeps the last value written to every display element.
#[derive(Clone, Debug)]
pub struct HeadlessSurface {
    pub collected: String,
    pub score: String,
    pub timer: String,
    pub countdown: String,
    pub hint: Option<char>,
    pub typed: String,
    pub overlay: Overlay,
    pub can_start: bool,
    pub can_reset: bool,
    pub touch_keyboard: bool,
    /// Bubbles currently on screen.
    pub bubbles: Vec<BubbleView>,
    pub popped: Vec<BubbleId>,
    /// Bubbles removed without being completed.
    pub dismissed: Vec<BubbleId>,
    pub pulses: Vec<BubbleId>,
    pub sparks: Vec<String>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self {
            collected: String::new(),
            score: String::new(),
            timer: String::new(),
            countdown: String::new(),
            hint: None,
            typed: String::new(),
            overlay: Overlay::Intro,
            can_start: false,
            can_reset: false,
            touch_keyboard: false,
            bubbles: Vec::new(),
            popped: Vec::new(),
            dismissed: Vec::new(),
            pulses: Vec::new(),
            sparks: Vec::new(),
        }
    }
}

impl Surface for HeadlessSurface {
    fn set_collected(&mut self, text: &str) {
        self.collected = text.to_string();
    }
    fn set_score(&mut self, text: &str) {
        self.score = text.to_string();
    }
    fn set_timer(&mut self, text: &str) {
        self.timer = text.to_string();
    }
    fn set_countdown(&mut self, text: &str) {
        self.countdown = text.to_string();
    }
    fn set_hint(&mut self, letter: Option<char>) {
        self.hint = letter;
    }
    fn set_typed(&mut self, text: &str) {
        self.typed = text.to_string();
    }
    fn set_overlay(&mut self, overlay: &Overlay) {
        self.overlay = overlay.clone();
    }
    fn set_controls(&mut self, can_start: bool, can_reset: bool) {
        self.can_start = can_start;
        self.can_reset = can_reset;
    }
    fn show_bubble(&mut self, bubble: &BubbleView) {
        self.bubbles.push(bubble.clone());
    }
    fn remove_bubble(&mut self, id: BubbleId, popped: bool) {
        self.bubbles.retain(|b| b.id != id);
        if popped {
            self.popped.push(id);
        } else {
            self.dismissed.push(id);
        }
    }
    fn pulse_bubble(&mut self, id: BubbleId) {
        self.pulses.push(id);
    }
    fn spark(&mut self, _id: BubbleId, text: &str) {
        self.sparks.push(text.to_string());
    }
    fn set_touch_keyboard(&mut self, visible: bool) {
        self.touch_keyboard = visible;
    }
}

/// Voice that records what it was asked to say.
#[derive(Clone, Debug, Default)]
pub struct RecordingVoice {
    pub enabled: bool,
    pub spoken: Vec<String>,
    pub cancels: usize,
}

impl RecordingVoice {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }
}

impl Voice for RecordingVoice {
    fn is_enabled(&self) -> bool {
        self.enabled
    }
    fn speak(&mut self, text: &str) {
        self.spoken.push(text.to_string());
    }
    fn cancel(&mut self) {
        self.cancels += 1;
    }
}

/// Advance a manually scheduled session by `total_ms`, one frame of `frame_ms`
/// at a time, delivering spawn firings before the frame of each step.
pub fn run_for<D: Surface, V: Voice>(
    session: &mut GameSession<ManualScheduler, D, V>,
    total_ms: f64,
    frame_ms: f64,
) {
    let frame_ms = frame_ms.max(1.0);
    let mut elapsed = 0.0;
    while elapsed < total_ms {
        let step = frame_ms.min(total_ms - elapsed);
        elapsed += step;
        let due = session.scheduler_mut().advance(step);
        for handle in due {
            let now = session.scheduler().now_ms();
            session.on_trigger(handle, now);
        }
        let frames = session.scheduler_mut().take_frames();
        for handle in frames {
            let now = session.scheduler().now_ms();
            session.on_trigger(handle, now);
        }
    }
}
