//! Collaborators the session renders and speaks through.

/// Identity of a spawned bubble. Ids increase for the lifetime of a session.
pub type BubbleId = u32;

/// What the session asks the display to draw for a new bubble.
#[derive(Clone, Debug, PartialEq)]
pub struct BubbleView {
    pub id: BubbleId,
    pub word: String,
    /// Horizontal start position as a fraction of the play-area width.
    pub x: f64,
    /// Duration of the rise animation in seconds.
    pub rise_secs: f64,
}

/// Centered info panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    /// Instructions shown before the first round and after a reset.
    Intro,
    Hidden,
    /// Final message with a "Play Again" control.
    GameOver(String),
}

/// Display surface. Text setters receive fully formatted strings.
pub trait Surface {
    fn set_collected(&mut self, text: &str);
    fn set_score(&mut self, text: &str);
    fn set_timer(&mut self, text: &str);
    /// Large countdown; an empty string hides it.
    fn set_countdown(&mut self, text: &str);
    fn set_hint(&mut self, letter: Option<char>);
    fn set_typed(&mut self, text: &str);
    fn set_overlay(&mut self, overlay: &Overlay);
    /// Enable/disable the start and reset buttons.
    fn set_controls(&mut self, can_start: bool, can_reset: bool);

    fn show_bubble(&mut self, bubble: &BubbleView);
    /// `popped` is true when the word was completed, false when it floated away or was cleared.
    fn remove_bubble(&mut self, id: BubbleId, popped: bool);

    fn pulse_bubble(&mut self, _id: BubbleId) {}
    /// Short floating feedback text ("+1", "+18") near the bubble.
    fn spark(&mut self, _id: BubbleId, _text: &str) {}
    fn set_touch_keyboard(&mut self, _visible: bool) {}
}

/// Optional text-to-speech. Implementations must never fail the caller.
pub trait Voice {
    fn is_enabled(&self) -> bool;
    fn speak(&mut self, text: &str);
    fn cancel(&mut self);
}
