//! Full-screen break countdown.
//!
//! The timer is a plain value driven by [`BreakTimer::tick`]; the host calls
//! it about every [`TICK_INTERVAL`] and repaints from the accessors.

use crate::hotkey::{Key, KeyEvent};
use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_millis(50);
pub const CLOSE_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_MINUTES: f64 = 5.0;
pub const MIN_MINUTES: f64 = 0.1;
pub const ADJUST_STEP: Duration = Duration::from_secs(60);
pub const HINT: &str = "Press Esc to dismiss  |  Ctrl+\u{2191}\u{2193} to adjust time";

/// Asks the user how long the break should be. `None` means the prompt was
/// cancelled.
pub trait DurationPrompt {
    fn prompt_minutes(&mut self, default_minutes: f64) -> Option<String>;
}

/// Answers every prompt with the same reply.
#[derive(Debug, Clone, Default)]
pub struct FixedPrompt {
    pub answer: Option<String>,
}

impl FixedPrompt {
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
        }
    }

    pub fn cancelled() -> Self {
        Self { answer: None }
    }
}

impl DurationPrompt for FixedPrompt {
    fn prompt_minutes(&mut self, _default_minutes: f64) -> Option<String> {
        self.answer.clone()
    }
}

/// Turns a prompt reply into a break length. Unparsable replies fall back
/// to `default_minutes`; anything shorter than six seconds is raised to it.
pub fn parse_minutes_or(input: Option<&str>, default_minutes: f64) -> Option<Duration> {
    let input = input?;
    let minutes = input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|m| m.is_finite())
        .unwrap_or(default_minutes);
    Some(Duration::from_millis(
        (minutes.max(MIN_MINUTES) * 60_000.0).round() as u64,
    ))
}

pub fn parse_minutes(input: Option<&str>) -> Option<Duration> {
    parse_minutes_or(input, DEFAULT_MINUTES)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingColor {
    Blue,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKeyOutcome {
    Dismiss,
    Adjusted,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct BreakTimer {
    total: Duration,
    remaining: Duration,
    last_tick: Instant,
    expired_at: Option<Instant>,
}

impl BreakTimer {
    pub fn new(duration: Duration, now: Instant) -> Self {
        tracing::info!(secs = duration.as_secs_f64(), "break timer started");
        Self {
            total: duration,
            remaining: duration,
            last_tick: now,
            expired_at: None,
        }
    }

    /// Advances the countdown to `now`. Returns `true` once the timer has
    /// been at zero for [`CLOSE_DELAY`] and should be closed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(expired_at) = self.expired_at {
            return now.saturating_duration_since(expired_at) >= CLOSE_DELAY;
        }
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            tracing::info!("break is over");
            self.expired_at = Some(now);
        }
        false
    }

    pub fn is_expired(&self) -> bool {
        self.expired_at.is_some()
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    /// Ignored once the countdown has stopped.
    pub fn add_minute(&mut self) {
        if self.is_expired() {
            return;
        }
        self.remaining += ADJUST_STEP;
        self.total += ADJUST_STEP;
    }

    /// Ignored once the countdown has stopped.
    pub fn remove_minute(&mut self) {
        if self.is_expired() {
            return;
        }
        self.remaining = self.remaining.saturating_sub(ADJUST_STEP);
        self.total = self.total.max(ADJUST_STEP);
    }

    /// Fraction of the break still left, 1.0 at the start.
    pub fn progress(&self) -> f64 {
        if self.total.is_zero() {
            return 0.0;
        }
        (self.remaining.as_secs_f64() / self.total.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn ring_color(&self) -> RingColor {
        match self.progress() {
            p if p > 0.5 => RingColor::Blue,
            p if p > 0.2 => RingColor::Yellow,
            _ => RingColor::Red,
        }
    }

    /// Remaining time as `m:ss`, rounded down to the second.
    pub fn display_time(&self) -> String {
        let secs = self.remaining.as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }

    pub fn label(&self) -> &'static str {
        if self.remaining.is_zero() {
            "TIME'S UP!"
        } else {
            "BREAK"
        }
    }

    pub fn hint(&self) -> &'static str {
        HINT
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> TimerKeyOutcome {
        match (event.key, event.modifiers.ctrl) {
            (Key::Escape, _) => TimerKeyOutcome::Dismiss,
            (Key::Up, true) => {
                self.add_minute();
                TimerKeyOutcome::Adjusted
            }
            (Key::Down, true) => {
                self.remove_minute();
                TimerKeyOutcome::Adjusted
            }
            _ => TimerKeyOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn parse_minutes_defaults_and_floors() {
        assert_eq!(parse_minutes(None), None);
        assert_eq!(parse_minutes(Some(" 2 ")), Some(secs(120)));
        assert_eq!(parse_minutes(Some("abc")), Some(secs(300)));
        assert_eq!(parse_minutes(Some("0")), Some(secs(6)));
        assert_eq!(parse_minutes(Some("-3")), Some(secs(6)));
        assert_eq!(parse_minutes_or(Some(""), 10.0), Some(secs(600)));
    }

    #[test]
    fn fixed_prompt_answers_or_cancels() {
        assert_eq!(FixedPrompt::answering("3").prompt_minutes(5.0).as_deref(), Some("3"));
        assert_eq!(FixedPrompt::cancelled().prompt_minutes(5.0), None);
    }

    #[test]
    fn countdown_closes_two_seconds_after_zero() {
        let start = Instant::now();
        let mut timer = BreakTimer::new(secs(1), start);
        assert!(!timer.tick(start + Duration::from_millis(500)));
        assert_eq!(timer.label(), "BREAK");
        assert!(!timer.tick(start + secs(1)));
        assert!(timer.is_expired());
        assert_eq!(timer.label(), "TIME'S UP!");
        assert_eq!(timer.display_time(), "0:00");
        assert!(!timer.tick(start + Duration::from_millis(2500)));
        assert!(timer.tick(start + secs(3)));
    }

    #[test]
    fn adjustments_follow_ctrl_arrows() {
        let start = Instant::now();
        let mut timer = BreakTimer::new(secs(90), start);
        let ctrl_up = KeyEvent::ctrl(Key::Up);
        let ctrl_down = KeyEvent::ctrl(Key::Down);

        assert_eq!(timer.handle_key(ctrl_up), TimerKeyOutcome::Adjusted);
        assert_eq!((timer.remaining(), timer.total()), (secs(150), secs(150)));

        timer.handle_key(ctrl_down);
        timer.handle_key(ctrl_down);
        timer.handle_key(ctrl_down);
        assert_eq!((timer.remaining(), timer.total()), (secs(0), secs(150)));

        assert_eq!(timer.handle_key(KeyEvent::plain(Key::Up)), TimerKeyOutcome::Ignored);
        assert_eq!(timer.handle_key(KeyEvent::plain(Key::Escape)), TimerKeyOutcome::Dismiss);
    }

    #[test]
    fn total_never_drops_below_a_minute() {
        let mut timer = BreakTimer::new(secs(6), Instant::now());
        timer.remove_minute();
        assert_eq!(timer.total(), secs(60));
        assert_eq!(timer.remaining(), secs(0));
    }

    #[test]
    fn ring_color_tracks_progress() {
        let start = Instant::now();
        let mut timer = BreakTimer::new(secs(100), start);
        assert_eq!(timer.ring_color(), RingColor::Blue);
        timer.tick(start + secs(50));
        assert_eq!(timer.ring_color(), RingColor::Yellow);
        timer.tick(start + secs(80));
        assert_eq!(timer.ring_color(), RingColor::Red);
        assert_eq!(timer.display_time(), "0:20");
    }

    #[test]
    fn display_rounds_down() {
        let start = Instant::now();
        let timer = BreakTimer::new(Duration::from_millis(125_900), start);
        assert_eq!(timer.display_time(), "2:05");
        assert!((timer.progress() - 1.0).abs() < f64::EPSILON);
    }
}
