// Session state machine tests. Native only: the session runs against the
// headless surface and a manually advanced scheduler.

use bubble_pop::headless::{HeadlessSurface, RecordingVoice};
use bubble_pop::scheduler::{ManualScheduler, Scheduler};
use bubble_pop::surface::Overlay;
use bubble_pop::{GameConfig, GameSession, Phase};
use rand::SeedableRng;
use rand::rngs::StdRng;

type TestSession = GameSession<ManualScheduler, HeadlessSurface, RecordingVoice>;

fn config_for(word: &str) -> GameConfig {
    GameConfig {
        base_words: vec![word.to_string()],
        base_repeat: 1,
        weighted_words: Vec::new(),
        ..GameConfig::default()
    }
}

fn session(config: GameConfig) -> TestSession {
    GameSession::with_rng(
        config,
        ManualScheduler::new(),
        HeadlessSurface::default(),
        RecordingVoice::enabled(),
        StdRng::seed_from_u64(1),
    )
    .expect("valid config")
}

fn type_word(s: &mut TestSession, word: &str) {
    for c in word.chars() {
        assert!(s.handle_key(c), "'{c}' should match");
    }
}

#[test]
fn fresh_session_is_idle() {
    let s = session(GameConfig::default());
    assert_eq!(s.phase(), Phase::Idle);
    assert_eq!(s.score(), 0);
    assert!(s.collected_words().is_empty());
    assert!(s.active_bubble().is_none());
    assert_eq!(s.surface().score, "Score: 0");
    assert_eq!(s.surface().overlay, Overlay::Intro);
    assert!(s.surface().can_start);
    assert!(!s.surface().can_reset);
}

#[test]
fn start_arms_spawn_and_frame_triggers() {
    let mut s = session(GameConfig::default());
    s.start();
    assert_eq!(s.phase(), Phase::Running);
    assert_eq!(s.scheduler().pending(), 2);
    assert_eq!(s.surface().overlay, Overlay::Hidden);
    assert_eq!(s.surface().countdown, "60s");
    assert!(!s.surface().can_start);
    assert!(s.surface().can_reset);

    // starting again while running changes nothing
    s.start();
    assert_eq!(s.scheduler().pending(), 2);
}

#[test]
fn typing_a_word_pops_it_once() {
    let mut s = session(config_for("cat"));
    s.start();
    s.spawn();
    let bubble = s.active_bubble().expect("bubble spawned").clone();
    assert_eq!(bubble.word, "cat");
    assert_eq!(bubble.match_index, 0);
    assert_eq!(s.surface().hint, Some('C'));
    assert_eq!(s.voice().spoken, vec!["cat".to_string()]);

    assert!(s.handle_key('c'));
    assert_eq!(s.active_bubble().map(|b| b.match_index), Some(1));
    assert_eq!(s.surface().typed, "C");
    assert!(s.handle_key('a'));
    assert_eq!(s.active_bubble().map(|b| b.match_index), Some(2));
    assert!(s.handle_key('t'));

    assert!(s.active_bubble().is_none());
    assert_eq!(s.score(), 18);
    assert_eq!(s.collected_words(), ["cat".to_string()]);
    assert_eq!(s.surface().popped, vec![bubble.id]);
    assert_eq!(s.surface().score, "Score: 18");
    assert_eq!(s.surface().collected, "cat");
    assert_eq!(s.surface().sparks, vec!["+1", "+1", "+1", "+18"]);
    assert_eq!(s.surface().hint, None);
    assert_eq!(s.surface().typed, "");
    assert_eq!(s.voice().spoken.last().map(String::as_str), Some("Great! cat"));

    // no bubble left: further keys do nothing
    assert!(!s.handle_key('c'));
    assert_eq!(s.score(), 18);
}

#[test]
fn slow_completion_earns_length_points_only() {
    let mut s = session(config_for("cat"));
    s.start();
    s.spawn();
    s.scheduler_mut().advance(10_000.0);
    type_word(&mut s, "cat");
    assert_eq!(s.score(), 12);
}

#[test]
fn phrases_require_the_space() {
    let mut s = session(config_for("apple pie"));
    s.start();
    s.spawn();
    type_word(&mut s, "apple");
    assert!(!s.handle_key('p'), "space must be typed literally");
    type_word(&mut s, " pie");
    assert_eq!(s.score(), 42);
    assert_eq!(s.collected_text(), "apple pie");
}

#[test]
fn mismatches_change_nothing() {
    let mut s = session(config_for("cat"));
    s.start();
    s.spawn();
    for key in ['x', 'a', 't', ' ', '1'] {
        assert!(!s.handle_key(key));
    }
    assert_eq!(s.active_bubble().map(|b| b.match_index), Some(0));
    assert_eq!(s.score(), 0);
    assert!(s.collected_words().is_empty());
    assert!(s.surface().sparks.is_empty());
}

#[test]
fn matching_ignores_case_and_collects_lowercase() {
    let mut s = session(config_for("Cat"));
    s.start();
    s.spawn();
    assert!(s.handle_key('C'));
    assert!(s.handle_key('A'));
    assert!(s.handle_key('t'));
    assert_eq!(s.collected_words(), ["cat".to_string()]);
}

#[test]
fn only_one_bubble_at_a_time() {
    let mut s = session(GameConfig::default());
    s.start();
    s.spawn();
    let first = s.active_bubble().map(|b| b.id);
    s.spawn();
    s.spawn();
    assert_eq!(s.active_bubble().map(|b| b.id), first);
    assert_eq!(s.surface().bubbles.len(), 1);
}

#[test]
fn inputs_before_start_are_ignored() {
    let mut s = session(config_for("cat"));
    s.spawn();
    assert!(s.active_bubble().is_none());
    assert!(!s.handle_key('c'));
    s.tick(1_000.0);
    assert_eq!(s.phase(), Phase::Idle);
    s.end(None);
    assert_eq!(s.phase(), Phase::Idle);
}

#[test]
fn time_expiry_ends_the_round() {
    let mut s = session(config_for("cat"));
    s.start();
    s.spawn();
    let id = s.active_bubble().map(|b| b.id).expect("bubble");
    assert!(s.handle_key('c'));

    // still well inside the bubble's rise time
    s.tick(10_000.0);
    assert_eq!(s.surface().timer, "Time: 50.0s");
    assert_eq!(s.surface().countdown, "50s");
    assert!(s.active_bubble().is_some());

    s.tick(60_000.0);
    assert_eq!(s.phase(), Phase::Ended);
    assert!(s.active_bubble().is_none());
    assert_eq!(s.score(), 0);
    assert_eq!(s.surface().dismissed, vec![id]);
    assert!(s.surface().bubbles.is_empty());
    assert_eq!(s.surface().overlay, Overlay::GameOver("Game Over! Score: 0".into()));
    assert_eq!(s.surface().countdown, "GAME OVER");
    assert_eq!(s.surface().timer, "Time: 0.0s");
    assert!(!s.surface().touch_keyboard);
    assert_eq!(s.scheduler().pending(), 0);
    assert!(s.voice().cancels >= 1);

    // nothing moves until reset
    s.spawn();
    s.tick(61_000.0);
    assert!(s.active_bubble().is_none());
    assert!(!s.handle_key('a'));
    assert_eq!(s.phase(), Phase::Ended);
}

#[test]
fn end_accepts_a_custom_message() {
    let mut s = session(GameConfig::default());
    s.start();
    s.end(Some("Well done!"));
    assert_eq!(s.surface().overlay, Overlay::GameOver("Well done!".into()));
}

#[test]
fn reset_restores_a_fresh_session() {
    let fresh = session(config_for("cat"));
    let mut s = session(config_for("cat"));
    s.start();
    s.spawn();
    type_word(&mut s, "cat");
    s.spawn();
    s.tick(60_000.0);
    assert_eq!(s.phase(), Phase::Ended);

    s.reset();
    assert_eq!(s.phase(), fresh.phase());
    assert_eq!(s.score(), fresh.score());
    assert_eq!(s.collected_words(), fresh.collected_words());
    assert_eq!(s.active_bubble(), fresh.active_bubble());

    let (a, b) = (s.surface(), fresh.surface());
    assert_eq!(a.score, b.score);
    assert_eq!(a.collected, b.collected);
    assert_eq!(a.timer, b.timer);
    assert_eq!(a.countdown, b.countdown);
    assert_eq!(a.hint, b.hint);
    assert_eq!(a.typed, b.typed);
    assert_eq!(a.overlay, b.overlay);
    assert_eq!((a.can_start, a.can_reset), (b.can_start, b.can_reset));
    assert_eq!(s.scheduler().pending(), 0);
}

#[test]
fn reset_while_running_cancels_triggers() {
    let mut s = session(GameConfig::default());
    s.start();
    s.spawn();
    s.reset();
    assert_eq!(s.phase(), Phase::Idle);
    assert!(s.active_bubble().is_none());
    assert_eq!(s.scheduler().pending(), 0);
    assert!(s.scheduler_mut().advance(5_000.0).is_empty());
}

#[test]
fn start_after_end_begins_a_clean_round() {
    let mut s = session(config_for("cat"));
    s.start();
    s.spawn();
    type_word(&mut s, "cat");
    s.end(None);
    assert_eq!(s.score(), 18);

    s.scheduler_mut().advance(1_000.0);
    s.start();
    assert_eq!(s.phase(), Phase::Running);
    assert_eq!(s.score(), 0);
    assert!(s.collected_words().is_empty());
    assert_eq!(s.remaining_secs(s.scheduler().now_ms()), 60.0);
}

#[test]
fn stale_frame_handles_are_ignored() {
    let mut s = session(GameConfig::default());
    s.start();
    let first = s.scheduler_mut().take_frames();
    assert_eq!(first.len(), 1);

    // a direct tick re-arms the chain with a new handle
    s.tick(16.0);
    let live = s.scheduler_mut().take_frames();
    assert_eq!(live.len(), 1);
    assert_ne!(live[0], first[0]);

    // the old handle must not re-arm anything
    s.on_trigger(first[0], 32.0);
    assert!(s.scheduler_mut().take_frames().is_empty());

    s.on_trigger(live[0], 32.0);
    assert_eq!(s.scheduler_mut().take_frames().len(), 1);
}

#[test]
fn spawn_handle_from_previous_round_is_ignored() {
    let mut s = session(config_for("cat"));
    s.start();
    let old = s.scheduler_mut().advance(1200.0);
    assert_eq!(old.len(), 1);

    s.reset();
    s.start();
    assert!(!s.scheduler().is_active(old[0]));

    let now = s.scheduler().now_ms();
    s.on_trigger(old[0], now);
    assert!(s.active_bubble().is_none());
    assert!(s.surface().bubbles.is_empty());
}

#[test]
fn untouched_bubble_floats_away_without_penalty() {
    let mut s = session(config_for("cat"));
    s.start();
    s.spawn();
    let bubble = s.active_bubble().cloned().expect("bubble");
    assert!((12_000.0..18_000.0).contains(&bubble.rise_ms));
    assert!((0.0..1.0).contains(&bubble.x));
    assert!(s.handle_key('c'));

    s.tick(bubble.rise_ms - 1.0);
    assert!(s.active_bubble().is_some());
    s.tick(bubble.rise_ms);
    assert!(s.active_bubble().is_none());
    assert_eq!(s.surface().dismissed, vec![bubble.id]);
    assert_eq!(s.score(), 0);
    assert_eq!(s.surface().hint, None);

    s.spawn();
    assert_eq!(s.active_bubble().map(|b| b.id), Some(bubble.id + 1));
}

#[test]
fn poking_a_bubble_never_scores() {
    let mut s = session(config_for("sun"));
    s.start();
    s.spawn();
    let id = s.active_bubble().map(|b| b.id).expect("bubble");
    s.poke_bubble(id);
    s.poke_bubble(id + 7);
    assert_eq!(s.surface().pulses, vec![id]);
    assert_eq!(s.voice().spoken, vec!["sun".to_string(), "sun".to_string()]);
    assert_eq!(s.score(), 0);
    assert!(s.active_bubble().is_some());
}

#[test]
fn disabled_voice_stays_silent() {
    let mut s = GameSession::with_rng(
        config_for("cat"),
        ManualScheduler::new(),
        HeadlessSurface::default(),
        RecordingVoice::default(),
        StdRng::seed_from_u64(3),
    )
    .unwrap();
    s.start();
    s.spawn();
    type_word(&mut s, "cat");
    assert!(s.voice().spoken.is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = GameConfig {
        base_words: Vec::new(),
        weighted_words: Vec::new(),
        ..GameConfig::default()
    };
    let result = GameSession::new(
        cfg,
        ManualScheduler::new(),
        HeadlessSurface::default(),
        RecordingVoice::default(),
    );
    assert!(matches!(result, Err(bubble_pop::ConfigError::EmptyWordPool)));
}
