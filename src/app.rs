use crate::demotype::{DemoType, EndReason, SessionState};
use crate::draw::state::{shared, EditingState, SharedEditingState};
use crate::draw::DrawOverlay;
use crate::hotkey::{Command, KeyEvent};
use crate::settings::Settings;
use crate::timer::{parse_minutes_or, BreakTimer, DurationPrompt, TimerKeyOutcome};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

/// Application coordinator. Owns the three activities and routes hotkey
/// commands between them; starting an activity closes the others.
pub struct App {
    settings: Settings,
    commands: Receiver<Command>,
    editing: SharedEditingState,
    draw: Option<DrawOverlay>,
    timer: Option<BreakTimer>,
    demo_type: DemoType,
    prompt: Box<dyn DurationPrompt>,
    messages: Vec<String>,
}

impl App {
    pub fn new(
        settings: Settings,
        commands: Receiver<Command>,
        demo_type: DemoType,
        prompt: Box<dyn DurationPrompt>,
    ) -> Self {
        let editing = shared(EditingState::with_width(settings.pen_width));
        Self {
            settings,
            commands,
            editing,
            draw: None,
            timer: None,
            demo_type,
            prompt,
            messages: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Tool, color and width carried across draw sessions.
    pub fn editing(&self) -> &SharedEditingState {
        &self.editing
    }

    pub fn draw(&self) -> Option<&DrawOverlay> {
        self.draw.as_ref()
    }

    pub fn draw_mut(&mut self) -> Option<&mut DrawOverlay> {
        self.draw.as_mut()
    }

    pub fn timer(&self) -> Option<&BreakTimer> {
        self.timer.as_ref()
    }

    pub fn demo_type(&self) -> &DemoType {
        &self.demo_type
    }

    /// Drains pending commands. Returns `false` once every sender is gone.
    pub fn pump(&mut self, now: Instant) -> bool {
        loop {
            match self.commands.try_recv() {
                Ok(command) => self.handle(command, now),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    pub fn handle(&mut self, command: Command, now: Instant) {
        tracing::debug!(?command, "handling command");
        match command {
            Command::ToggleDraw => {
                if self.draw.take().is_some() {
                    tracing::info!("draw overlay closed");
                    return;
                }
                self.close_all(EndReason::Closed);
                self.draw = Some(DrawOverlay::new(self.editing.clone()));
                tracing::info!("draw overlay opened");
            }
            Command::ToggleTimer => {
                if self.timer.take().is_some() {
                    tracing::info!("break timer closed");
                    return;
                }
                self.close_all(EndReason::Closed);
                let default_minutes = self.settings.default_break_minutes;
                let answer = self.prompt.prompt_minutes(default_minutes);
                match parse_minutes_or(answer.as_deref(), default_minutes) {
                    Some(duration) => self.timer = Some(BreakTimer::new(duration, now)),
                    None => tracing::info!("break timer prompt cancelled"),
                }
            }
            Command::DemoType => {
                // A fresh session types into whatever is frontmost.
                if self.demo_type.state() == SessionState::Idle {
                    self.draw = None;
                    self.timer = None;
                }
                let path = self.settings.demo_type_path();
                if let Err(err) = self.demo_type.trigger(now, path) {
                    self.messages.push(format!("DemoType: {err}"));
                }
            }
            Command::Cancel => self.close_all(EndReason::Cancelled),
        }
    }

    /// Runs deferred DemoType steps and retires finished activities.
    pub fn tick(&mut self, now: Instant) {
        self.demo_type.tick(now);
        if self.timer.as_mut().is_some_and(|timer| timer.tick(now)) {
            tracing::info!("break timer finished");
            self.timer = None;
        }
        if self.draw.as_ref().is_some_and(DrawOverlay::exit_requested) {
            tracing::info!("draw overlay exited");
            self.draw = None;
        }
    }

    /// Key press while the break timer has focus.
    pub fn timer_key(&mut self, event: KeyEvent) -> TimerKeyOutcome {
        let Some(timer) = self.timer.as_mut() else {
            return TimerKeyOutcome::Ignored;
        };
        let outcome = timer.handle_key(event);
        if outcome == TimerKeyOutcome::Dismiss {
            self.timer = None;
        }
        outcome
    }

    pub fn close_all(&mut self, reason: EndReason) {
        self.draw = None;
        self.timer = None;
        self.demo_type.close(reason);
    }

    /// User-facing errors collected since the last call.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}
