//! The game session state machine.
//!
//! `Idle -> Running -> Ended -> (reset) -> Idle`. All transitions happen on the
//! caller's thread in response to one of three inputs: a spawn-trigger firing,
//! a frame tick, or a key press. Invalid calls are no-ops.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::config::{ConfigError, GameConfig};
use crate::scheduler::{Scheduler, TimerHandle};
use crate::surface::{BubbleId, BubbleView, Overlay, Surface, Voice};
use crate::words::WeightedWordPool;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Ended,
}

/// The word currently floating up the screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Bubble {
    pub id: BubbleId,
    pub word: String,
    /// Number of characters typed correctly so far.
    pub match_index: usize,
    pub spawned_at: f64,
    pub rise_ms: f64,
    pub x: f64,
}

impl Bubble {
    pub fn len(&self) -> usize {
        self.word.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    pub fn expected(&self) -> Option<char> {
        self.word.chars().nth(self.match_index)
    }

    pub fn is_complete(&self) -> bool {
        self.match_index >= self.len()
    }

    /// Typed-so-far prefix as shown to the player.
    pub fn typed(&self) -> String {
        self.word.chars().take(self.match_index).collect::<String>().to_uppercase()
    }
}

/// Points for completing a word of `len` characters `elapsed_secs` after it
/// spawned: four per character plus up to six for speed, never below five.
pub fn reward(len: usize, elapsed_secs: f64) -> u32 {
    let elapsed = elapsed_secs.clamp(0.0, 6.0);
    let raw = (len as f64 * 4.0 + (6.0 - elapsed)).floor();
    (raw as u32).max(5)
}

pub fn format_timer(remaining_secs: f64) -> String {
    format!("Time: {:.1}s", remaining_secs.max(0.0))
}

pub fn format_countdown(remaining_secs: f64) -> String {
    format!("{}s", remaining_secs.max(0.0).ceil() as u64)
}

pub fn format_score(score: u32) -> String {
    format!("Score: {score}")
}

pub struct GameSession<S, D, V> {
    config: GameConfig,
    pool: WeightedWordPool,
    scheduler: S,
    surface: D,
    voice: V,
    rng: StdRng,
    phase: Phase,
    started_at: f64,
    score: u32,
    collected: Vec<String>,
    active: Option<Bubble>,
    last_bubble_id: BubbleId,
    spawn_timer: Option<TimerHandle>,
    frame: Option<TimerHandle>,
}

impl<S: Scheduler, D: Surface, V: Voice> GameSession<S, D, V> {
    pub fn new(
        config: GameConfig,
        scheduler: S,
        surface: D,
        voice: V,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(config, scheduler, surface, voice, StdRng::from_entropy())
    }

    /// Like `new` but with a caller-provided random source (seeded in tests).
    pub fn with_rng(
        config: GameConfig,
        scheduler: S,
        surface: D,
        voice: V,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let pool = config.word_pool()?;
        let mut session = Self {
            config,
            pool,
            scheduler,
            surface,
            voice,
            rng,
            phase: Phase::Idle,
            started_at: 0.0,
            score: 0,
            collected: Vec::new(),
            active: None,
            last_bubble_id: 0,
            spawn_timer: None,
            frame: None,
        };
        session.render_idle();
        Ok(session)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn collected_words(&self) -> &[String] {
        &self.collected
    }

    pub fn collected_text(&self) -> String {
        self.collected.join(" ")
    }

    pub fn active_bubble(&self) -> Option<&Bubble> {
        self.active.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Seconds left in the round at `now`; the full duration unless running.
    pub fn remaining_secs(&self, now: f64) -> f64 {
        match self.phase {
            Phase::Running => {
                let left_ms = self.config.duration_ms() - (now - self.started_at);
                (left_ms / 1000.0).max(0.0)
            }
            Phase::Idle => self.config.duration_secs,
            Phase::Ended => 0.0,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    pub fn voice(&self) -> &V {
        &self.voice
    }

    pub fn voice_mut(&mut self) -> &mut V {
        &mut self.voice
    }

    pub fn start(&mut self) {
        match self.phase {
            Phase::Running => return,
            // Play Again: every round starts from a clean slate.
            Phase::Ended => self.reset(),
            Phase::Idle => {}
        }
        self.started_at = self.scheduler.now_ms();
        self.phase = Phase::Running;

        self.surface.set_overlay(&Overlay::Hidden);
        self.surface.set_controls(false, true);
        self.surface.set_countdown(&format_countdown(self.config.duration_secs));
        self.surface.set_touch_keyboard(true);

        self.spawn_timer = Some(self.scheduler.schedule_periodic(self.config.spawn_interval_ms));
        self.frame = Some(self.scheduler.schedule_next_frame());
        info!(
            duration_secs = self.config.duration_secs,
            spawn_interval_ms = self.config.spawn_interval_ms,
            "round started"
        );
    }

    /// Route a scheduler firing. Handles that are no longer live are dropped.
    pub fn on_trigger(&mut self, handle: TimerHandle, now: f64) {
        if self.spawn_timer == Some(handle) {
            self.spawn();
        } else if self.frame == Some(handle) {
            self.frame = None;
            self.tick(now);
        } else {
            debug!(?handle, "ignoring stale trigger");
        }
    }

    pub fn tick(&mut self, now: f64) {
        if self.phase != Phase::Running {
            return;
        }
        let remaining = self.remaining_secs(now);
        self.surface.set_timer(&format_timer(remaining));
        self.surface.set_countdown(&format_countdown(remaining));
        if remaining <= 0.0 {
            self.end(None);
            return;
        }

        if let Some(bubble) = &self.active {
            if now - bubble.spawned_at >= bubble.rise_ms {
                let id = bubble.id;
                debug!(id, word = %bubble.word, "bubble floated away");
                self.active = None;
                self.surface.remove_bubble(id, false);
                self.surface.set_hint(None);
                self.surface.set_typed("");
            }
        }

        if let Some(pending) = self.frame.take() {
            self.scheduler.cancel(pending);
        }
        self.frame = Some(self.scheduler.schedule_next_frame());
    }

    pub fn spawn(&mut self) {
        if self.phase != Phase::Running || self.active.is_some() {
            return;
        }
        let word = self.pool.select(&mut self.rng).to_string();
        let rise_secs = self.rng.gen_range(self.config.rise_secs.clone());
        let x = self.rng.gen_range(0.0..1.0);
        self.last_bubble_id += 1;
        let bubble = Bubble {
            id: self.last_bubble_id,
            word,
            match_index: 0,
            spawned_at: self.scheduler.now_ms(),
            rise_ms: rise_secs * 1000.0,
            x,
        };

        self.surface.show_bubble(&BubbleView {
            id: bubble.id,
            word: bubble.word.clone(),
            x,
            rise_secs,
        });
        self.surface.set_hint(bubble.word.chars().next().and_then(|c| c.to_uppercase().next()));
        self.surface.set_typed("");
        if self.voice.is_enabled() {
            self.voice.speak(&bubble.word);
        }
        debug!(id = bubble.id, word = %bubble.word, rise_secs, "bubble spawned");
        self.active = Some(bubble);
    }

    /// Feed one typed character. Returns true when it matched the next letter.
    pub fn handle_key(&mut self, key: char) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let Some(bubble) = self.active.as_mut() else {
            return false;
        };
        let Some(expected) = bubble.expected() else {
            return false;
        };
        if !key.to_lowercase().eq(expected.to_lowercase()) {
            trace!(%key, %expected, "mismatch");
            return false;
        }

        bubble.match_index += 1;
        let id = bubble.id;
        let complete = bubble.is_complete();
        self.surface.set_typed(&bubble.typed());
        self.surface.spark(id, "+1");
        if complete {
            self.pop();
        }
        true
    }

    fn pop(&mut self) {
        let Some(bubble) = self.active.take() else {
            return;
        };
        let elapsed_secs = (self.scheduler.now_ms() - bubble.spawned_at) / 1000.0;
        let gained = reward(bubble.len(), elapsed_secs);
        self.score = self.score.saturating_add(gained);
        self.collected.push(bubble.word.to_lowercase());
        self.surface.set_score(&format_score(self.score));
        self.surface.set_collected(&self.collected_text());

        if self.voice.is_enabled() {
            self.voice.speak(&format!("Great! {}", bubble.word));
        }
        self.surface.set_hint(None);
        self.surface.set_typed("");
        self.surface.spark(bubble.id, &format!("+{gained}"));
        self.surface.remove_bubble(bubble.id, true);
        debug!(id = bubble.id, word = %bubble.word, gained, score = self.score, "bubble popped");
    }

    /// Click on a bubble: a gentle pulse and the word spoken again, never a pop.
    pub fn poke_bubble(&mut self, id: BubbleId) {
        let Some(bubble) = self.active.as_ref().filter(|b| b.id == id) else {
            return;
        };
        self.surface.pulse_bubble(id);
        if self.voice.is_enabled() {
            self.voice.speak(&bubble.word);
        }
    }

    /// Finish the round. `message` replaces the default score summary.
    pub fn end(&mut self, message: Option<&str>) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::Ended;
        self.cancel_triggers();
        self.clear_bubble();
        self.voice.cancel();

        let message = message
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Game Over! Score: {}", self.score));
        self.surface.set_touch_keyboard(false);
        self.surface.set_controls(false, true);
        self.surface.set_overlay(&Overlay::GameOver(message));
        self.surface.set_countdown("GAME OVER");
        self.surface.set_timer(&format_timer(0.0));
        info!(score = self.score, words = self.collected.len(), "round ended");
    }

    pub fn reset(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.cancel_triggers();
        self.clear_bubble();
        self.voice.cancel();
        self.score = 0;
        self.collected.clear();
        self.phase = Phase::Idle;
        self.render_idle();
        info!("session reset");
    }

    fn cancel_triggers(&mut self) {
        for handle in [self.spawn_timer.take(), self.frame.take()].into_iter().flatten() {
            self.scheduler.cancel(handle);
        }
    }

    fn clear_bubble(&mut self) {
        if let Some(bubble) = self.active.take() {
            self.surface.remove_bubble(bubble.id, false);
        }
        self.surface.set_hint(None);
        self.surface.set_typed("");
    }

    fn render_idle(&mut self) {
        self.surface.set_collected("");
        self.surface.set_score(&format_score(0));
        self.surface.set_timer(&format_timer(0.0));
        self.surface.set_countdown("");
        self.surface.set_hint(None);
        self.surface.set_typed("");
        self.surface.set_overlay(&Overlay::Intro);
        self.surface.set_controls(true, false);
        self.surface.set_touch_keyboard(false);
    }
}
