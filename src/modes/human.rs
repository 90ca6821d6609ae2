use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval, interval_at};
use tracing::{debug, info};

use crate::game::{Action, GameSession, Phase, TickOutcome, TimerHandle};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// The tokio side of a [`TimerHandle`]
struct Ticker {
    id: u64,
    interval: Interval,
}

impl Ticker {
    fn new(handle: TimerHandle) -> Self {
        // First tick one full period from now, not immediately
        let mut interval = interval_at(Instant::now() + handle.period, handle.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            id: handle.id,
            interval,
        }
    }
}

/// Make the live ticker match the session's handle.
///
/// The old interval is dropped before a new one is built, so at most one
/// exists and nothing stale can fire after a pause or game over.
fn sync_ticker(handle: Option<TimerHandle>, ticker: &mut Option<Ticker>) {
    match (handle, ticker.as_ref()) {
        (None, None) => {}
        (Some(h), Some(t)) if h.id == t.id => {}
        (handle, _) => {
            *ticker = None;
            if let Some(h) = handle {
                debug!(id = h.id, period_ms = h.period.as_millis() as u64, "Tick timer issued");
                *ticker = Some(Ticker::new(h));
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<Ticker>) {
    match ticker {
        Some(t) => {
            t.interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

pub struct HumanMode {
    session: GameSession,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    needs_redraw: bool,
}

impl HumanMode {
    pub fn new(session: GameSession, min_swipe_cells: u16) -> Self {
        Self {
            session,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(min_swipe_cells),
            should_quit: false,
            needs_redraw: true,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut ticker: Option<Ticker> = None;

        // Keeps the HUD clock moving between ticks
        let mut clock_timer = interval(Duration::from_secs(1));

        loop {
            if self.needs_redraw {
                terminal
                    .draw(|frame| {
                        self.renderer.render(frame, &self.session, &self.metrics);
                    })
                    .context("Failed to draw frame")?;
                self.needs_redraw = false;
            }

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick
                _ = next_tick(&mut ticker) => {
                    self.update_game();
                }

                _ = clock_timer.tick() => {
                    if self.metrics.is_running() {
                        self.needs_redraw = true;
                    }
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            sync_ticker(self.session.timer(), &mut ticker);

            if self.should_quit {
                break;
            }
        }

        info!(
            games_played = self.metrics.games_played,
            high_score = self.session.high_score(),
            "Quitting"
        );
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        let action = match event {
            // Only process key press events, not release
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.input_handler.handle_key_event(key)
            }
            Event::Mouse(mouse) => self.input_handler.handle_mouse_event(mouse),
            Event::Resize(_, _) => {
                self.needs_redraw = true;
                KeyAction::None
            }
            _ => KeyAction::None,
        };

        match action {
            KeyAction::GameAction(action) => self.apply_action(action),
            KeyAction::ToggleMute => {
                let muted = self.session.audio_mut().toggle_mute();
                info!(muted, "Sound toggled");
                self.needs_redraw = true;
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    fn apply_action(&mut self, action: Action) {
        let before = self.session.phase();
        self.session.apply(action);
        let after = self.session.phase();

        if before != after {
            self.on_phase_change(before, after);
            self.needs_redraw = true;
        }
    }

    fn on_phase_change(&mut self, before: Phase, after: Phase) {
        match (before, after) {
            (Phase::Paused, Phase::Running) => self.metrics.on_resume(),
            (_, Phase::Running) => self.metrics.on_game_start(),
            (Phase::Running, Phase::Paused) => self.metrics.on_pause(),
            (Phase::Running, Phase::GameOver { .. }) => self.metrics.on_game_over(),
            (_, Phase::Idle) => self.metrics.on_pause(),
            _ => {}
        }
    }

    fn update_game(&mut self) {
        let before = self.session.phase();
        let outcome = self.session.tick();

        if let TickOutcome::Ended { .. } = outcome {
            self.on_phase_change(before, self.session.phase());
        }
        if outcome.needs_redraw() {
            self.needs_redraw = true;
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )
        .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
