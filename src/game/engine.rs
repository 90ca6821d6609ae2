use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::{
    action::{Action, Direction},
    config::GameConfig,
    food::Food,
    state::{CollisionType, Position, Snake},
};
use crate::audio::{AudioSink, Sound};
use crate::storage::HighScoreStore;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    Collision(CollisionType),
    /// The snake filled the board and no cell is left for food
    BoardFull,
}

/// Session-level state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the player to start; no timer
    Idle,
    /// Ticking
    Running,
    /// Timer stopped, board kept as it was
    Paused,
    /// A run just ended. The board has already been reset; this carries the
    /// result until the player restarts.
    GameOver {
        final_score: u32,
        cause: GameOverCause,
    },
}

/// The single live repeating tick schedule
///
/// A new handle (with a new id) is issued whenever the schedule has to change;
/// drivers should drop their timer and build a new one when the id changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    pub id: u64,
    pub period: Duration,
}

/// Result of a game tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session was not running, nothing changed
    Ignored,
    /// The snake moved
    Advanced { ate_food: bool },
    /// The run is over and the board is back to its starting layout
    Ended {
        final_score: u32,
        cause: GameOverCause,
    },
}

impl TickOutcome {
    /// Whether the frame has to be drawn again
    pub fn needs_redraw(&self) -> bool {
        !matches!(self, TickOutcome::Ignored)
    }
}

/// One player's game: board, score, speed and phase, plus the collaborators
/// it reports to.
pub struct GameSession {
    config: GameConfig,
    snake: Snake,
    food: Food,
    score: u32,
    high_score: u32,
    speed: Duration,
    phase: Phase,
    timer: Option<TimerHandle>,
    next_timer_id: u64,
    rng: StdRng,
    audio: Box<dyn AudioSink>,
    store: Box<dyn HighScoreStore>,
}

impl GameSession {
    /// Build a session in the idle phase
    ///
    /// Reads the high score once. A store that cannot be read is logged and
    /// treated as holding zero.
    pub fn new(
        config: GameConfig,
        audio: Box<dyn AudioSink>,
        store: Box<dyn HighScoreStore>,
    ) -> Result<Self> {
        config.validate().context("Invalid game configuration")?;

        let high_score = match store.load() {
            Ok(score) => score,
            Err(e) => {
                warn!("Failed to load high score, starting from 0: {:#}", e);
                0
            }
        };

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let snake = Self::spawn_snake(&config);
        let mut session = Self {
            food: Food::new(config.max_placement_attempts),
            speed: config.initial_speed(),
            config,
            snake,
            score: 0,
            high_score,
            phase: Phase::Idle,
            timer: None,
            next_timer_id: 0,
            rng,
            audio,
            store,
        };

        session
            .place_food()
            .ok_or_else(|| anyhow!("No free cell for the first food item"))?;

        info!(
            grid_width = session.grid_width(),
            grid_height = session.grid_height(),
            high_score,
            "Session ready"
        );
        Ok(session)
    }

    fn spawn_snake(config: &GameConfig) -> Snake {
        Snake::new(
            Position::from(config.initial_head),
            Direction::Right,
            config.initial_snake_length,
        )
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &Food {
        &self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Current tick interval
    pub fn speed(&self) -> Duration {
        self.speed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    pub fn grid_width(&self) -> i32 {
        self.config.grid_width()
    }

    pub fn grid_height(&self) -> i32 {
        self.config.grid_height()
    }

    pub fn audio(&self) -> &dyn AudioSink {
        self.audio.as_ref()
    }

    pub fn audio_mut(&mut self) -> &mut dyn AudioSink {
        self.audio.as_mut()
    }

    /// Dispatch a player intent
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Turn(direction) => self.set_direction(direction),
            Action::Start => self.start(),
            Action::TogglePause => self.toggle_pause(),
            Action::Restart => self.restart(),
        }
    }

    /// Queue a heading for the next tick; reversals are dropped by the snake
    pub fn set_direction(&mut self, direction: Direction) {
        self.snake.set_direction(direction);
    }

    /// Begin ticking. Already running: nothing happens. Paused: resumes.
    /// After a game over the result is dismissed and a fresh run begins.
    pub fn start(&mut self) {
        match self.phase {
            Phase::Running => {}
            Phase::Paused => self.resume(),
            Phase::Idle | Phase::GameOver { .. } => {
                self.phase = Phase::Running;
                self.schedule_timer();
                info!(speed_ms = self.speed.as_millis() as u64, "Game started");
            }
        }
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.cancel_timer();
            self.phase = Phase::Paused;
            info!(score = self.score, "Game paused");
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
            self.schedule_timer();
            info!("Game resumed");
        }
    }

    /// Pause a running game, resume a paused one, start anything else
    pub fn toggle_pause(&mut self) {
        match self.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Idle | Phase::GameOver { .. } => self.start(),
        }
    }

    /// Abandon whatever is on the board and go back to idle
    pub fn restart(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.cancel_timer();
        if matches!(self.phase, Phase::Running | Phase::Paused) {
            self.reset_board();
        }
        self.phase = Phase::Idle;
        info!("Session back to idle");
    }

    /// Advance the simulation by one step
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Running {
            return TickOutcome::Ignored;
        }

        self.snake.move_snake();

        let ate_food = self
            .food
            .is_eaten_by(self.snake.head(), self.config.cell_size);
        if ate_food {
            self.audio.play(Sound::Eat);
            let placed = self.place_food();
            self.add_score(self.config.food_score);

            if placed.is_none() {
                return self.finish(GameOverCause::BoardFull);
            }

            self.update_speed();
            self.snake.grow();
        }

        if let Some(collision) = self.snake.collision(self.grid_width(), self.grid_height()) {
            self.audio.play(Sound::GameOver);
            return self.finish(GameOverCause::Collision(collision));
        }

        TickOutcome::Advanced { ate_food }
    }

    fn place_food(&mut self) -> Option<Position> {
        let placed = self.food.generate(
            &mut self.rng,
            self.config.grid_width(),
            self.config.grid_height(),
            self.snake.body(),
        );
        if let Some(pos) = placed {
            debug!(x = pos.x, y = pos.y, "Food placed");
        }
        placed
    }

    fn add_score(&mut self, points: u32) {
        self.score += points;

        if self.score > self.high_score {
            self.high_score = self.score;
            if let Err(e) = self.store.save(self.high_score) {
                warn!("Failed to save high score {}: {:#}", self.high_score, e);
            }
        }
    }

    /// Speed up each time the score lands on a threshold
    fn update_speed(&mut self) {
        if self.score % self.config.speed_up_every != 0 {
            return;
        }

        let faster = self
            .speed
            .mul_f64(self.config.speed_factor)
            .max(self.config.min_speed());
        if faster == self.speed {
            return;
        }

        self.speed = faster;
        debug!(
            score = self.score,
            speed_ms = self.speed.as_millis() as u64,
            "Speed increased"
        );

        // A running schedule cannot change period in place
        if self.phase == Phase::Running {
            self.schedule_timer();
        }
    }

    fn finish(&mut self, cause: GameOverCause) -> TickOutcome {
        self.cancel_timer();
        let final_score = self.score;
        info!(final_score, ?cause, high_score = self.high_score, "Game over");

        self.reset_board();
        self.phase = Phase::GameOver { final_score, cause };

        TickOutcome::Ended { final_score, cause }
    }

    /// Fresh snake and food, score and speed back to their starting values
    fn reset_board(&mut self) {
        self.snake = Self::spawn_snake(&self.config);
        self.score = 0;
        self.speed = self.config.initial_speed();
        if self.place_food().is_none() {
            warn!("No free cell for food after reset");
        }
    }

    /// Replace the live timer, cancelling any existing one first
    fn schedule_timer(&mut self) {
        self.cancel_timer();
        self.next_timer_id += 1;
        self.timer = Some(TimerHandle {
            id: self.next_timer_id,
            period: self.speed,
        });
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            debug!(id = handle.id, "Timer cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::RecordingAudio;
    use crate::storage::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Harness {
        session: GameSession,
        played: Rc<RefCell<Vec<Sound>>>,
        store: MemoryStore,
    }

    fn harness_with(config: GameConfig, high_score: u32) -> Harness {
        let audio = RecordingAudio::default();
        let played = audio.played.clone();
        let store = MemoryStore::new(high_score);
        let mut session = GameSession::new(
            GameConfig {
                rng_seed: Some(17),
                ..config
            },
            Box::new(audio),
            Box::new(store.clone()),
        )
        .unwrap();
        park_food(&mut session);

        Harness {
            session,
            played,
            store,
        }
    }

    fn harness() -> Harness {
        harness_with(GameConfig::default(), 0)
    }

    /// Keep the food in a corner no test walks through
    fn park_food(session: &mut GameSession) {
        session.food = Food::at(Position::new(0, 0), 1000);
    }

    /// Put the food right where the head will be after the next move
    fn food_ahead(session: &mut GameSession) {
        let next = session
            .snake
            .head()
            .moved_in_direction(session.snake.next_direction());
        session.food = Food::at(next, 1000);
    }

    #[test]
    fn test_new_session_is_idle() {
        let h = harness();
        let s = &h.session;

        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.timer(), None);
        assert_eq!(s.score(), 0);
        assert_eq!(s.speed(), Duration::from_millis(200));
        assert_eq!(s.snake().head(), Position::new(6, 15));
    }

    #[test]
    fn test_initial_food_off_snake() {
        for seed in 0..50 {
            let session = GameSession::new(
                GameConfig {
                    rng_seed: Some(seed),
                    ..GameConfig::small()
                },
                Box::new(RecordingAudio::default()),
                Box::new(MemoryStore::default()),
            )
            .unwrap();
            let food = session.food().position();
            assert!(!session.snake().occupies(food));
            assert!(food.is_within(session.grid_width(), session.grid_height()));
        }
    }

    #[test]
    fn test_high_score_read_at_start() {
        let h = harness_with(GameConfig::default(), 250);
        assert_eq!(h.session.high_score(), 250);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = GameSession::new(
            GameConfig {
                cell_size: 7,
                ..Default::default()
            },
            Box::new(RecordingAudio::default()),
            Box::new(MemoryStore::default()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_tick_ignored_unless_running() {
        let mut h = harness();
        let before = h.session.snake().clone();

        assert_eq!(h.session.tick(), TickOutcome::Ignored);
        assert_eq!(h.session.snake(), &before);
        assert!(!h.session.tick().needs_redraw());
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut h = harness();
        h.session.start();
        let handle = h.session.timer().unwrap();
        assert_eq!(handle.period, Duration::from_millis(200));

        h.session.start();
        assert_eq!(h.session.phase(), Phase::Running);
        assert_eq!(h.session.timer(), Some(handle));
    }

    #[test]
    fn test_pause_and_resume_swap_timer() {
        let mut h = harness();
        h.session.start();
        let first = h.session.timer().unwrap();

        h.session.pause();
        assert_eq!(h.session.phase(), Phase::Paused);
        assert_eq!(h.session.timer(), None);

        h.session.pause();
        assert_eq!(h.session.phase(), Phase::Paused);

        let before = h.session.snake().clone();
        assert_eq!(h.session.tick(), TickOutcome::Ignored);
        assert_eq!(h.session.snake(), &before);

        h.session.resume();
        let second = h.session.timer().unwrap();
        assert_eq!(h.session.phase(), Phase::Running);
        assert_ne!(first.id, second.id);
        assert_eq!(second.period, first.period);

        h.session.resume();
        assert_eq!(h.session.timer(), Some(second));
    }

    #[test]
    fn test_toggle_pause_cycle() {
        let mut h = harness();
        h.session.toggle_pause();
        assert_eq!(h.session.phase(), Phase::Running);
        h.session.toggle_pause();
        assert_eq!(h.session.phase(), Phase::Paused);
        h.session.toggle_pause();
        assert_eq!(h.session.phase(), Phase::Running);
    }

    #[test]
    fn test_start_from_paused_resumes() {
        let mut h = harness();
        h.session.start();
        h.session.tick();
        h.session.pause();
        let head = h.session.snake().head();

        h.session.apply(Action::Start);
        assert_eq!(h.session.phase(), Phase::Running);
        assert_eq!(h.session.snake().head(), head);
    }

    #[test]
    fn test_tick_moves_snake() {
        let mut h = harness();
        h.session.start();

        assert_eq!(
            h.session.tick(),
            TickOutcome::Advanced { ate_food: false }
        );
        assert_eq!(
            h.session.snake().body(),
            &[
                Position::new(7, 15),
                Position::new(6, 15),
                Position::new(5, 15)
            ]
        );
    }

    #[test]
    fn test_reversal_before_tick_is_ignored() {
        let mut h = harness();
        h.session.start();
        h.session.apply(Action::Turn(Direction::Left));
        h.session.tick();
        assert_eq!(h.session.snake().head(), Position::new(7, 15));
        assert_eq!(h.session.snake().direction(), Direction::Right);
    }

    #[test]
    fn test_eating_scores_and_grows_next_tick() {
        let mut h = harness();
        h.session.start();
        food_ahead(&mut h.session);

        assert_eq!(h.session.tick(), TickOutcome::Advanced { ate_food: true });
        assert_eq!(h.session.score(), 10);
        assert_eq!(h.session.snake().len(), 3);
        assert!(!h.session.snake().occupies(h.session.food().position()));
        assert_eq!(*h.played.borrow(), vec![Sound::Eat]);

        h.session.tick();
        assert_eq!(h.session.snake().len(), 4);
    }

    #[test]
    fn test_high_score_saved_when_exceeded() {
        let mut h = harness_with(GameConfig::default(), 10);
        h.session.start();

        food_ahead(&mut h.session);
        h.session.tick();
        assert_eq!(h.session.high_score(), 10);
        assert_eq!(h.store.get(), 10);

        food_ahead(&mut h.session);
        h.session.tick();
        assert_eq!(h.session.high_score(), 20);
        assert_eq!(h.store.get(), 20);
    }

    #[test]
    fn test_speed_up_on_hundred() {
        let mut h = harness();
        h.session.start();
        h.session.score = 90;
        let before = h.session.timer().unwrap();

        food_ahead(&mut h.session);
        h.session.tick();
        assert_eq!(h.session.score(), 100);
        assert_eq!(h.session.speed(), Duration::from_millis(180));

        let after = h.session.timer().unwrap();
        assert_ne!(after.id, before.id);
        assert_eq!(after.period, Duration::from_millis(180));

        food_ahead(&mut h.session);
        h.session.tick();
        assert_eq!(h.session.score(), 110);
        assert_eq!(h.session.speed(), Duration::from_millis(180));
        assert_eq!(h.session.timer(), Some(after));
    }

    #[test]
    fn test_speed_has_floor() {
        let mut h = harness();
        h.session.start();
        h.session.score = 190;
        h.session.speed = Duration::from_millis(52);

        food_ahead(&mut h.session);
        h.session.tick();
        assert_eq!(h.session.speed(), Duration::from_millis(50));

        h.session.score = 290;
        let handle = h.session.timer();
        food_ahead(&mut h.session);
        h.session.tick();
        assert_eq!(h.session.speed(), Duration::from_millis(50));
        assert_eq!(h.session.timer(), handle);
    }

    #[test]
    fn test_wall_collision_ends_run_and_resets() {
        let mut h = harness_with(GameConfig::default(), 0);
        h.session.start();
        food_ahead(&mut h.session);
        h.session.tick();
        h.session.snake = Snake::new(Position::new(0, 5), Direction::Left, 3);
        h.session.food = Food::at(Position::new(10, 10), 1000);

        let outcome = h.session.tick();
        assert_eq!(
            outcome,
            TickOutcome::Ended {
                final_score: 10,
                cause: GameOverCause::Collision(CollisionType::Wall),
            }
        );
        assert!(outcome.needs_redraw());
        assert_eq!(*h.played.borrow(), vec![Sound::Eat, Sound::GameOver]);

        let s = &h.session;
        assert_eq!(
            s.phase(),
            Phase::GameOver {
                final_score: 10,
                cause: GameOverCause::Collision(CollisionType::Wall),
            }
        );
        assert_eq!(s.timer(), None);
        assert_eq!(s.score(), 0);
        assert_eq!(s.speed(), Duration::from_millis(200));
        assert_eq!(s.snake().head(), Position::new(6, 15));
        assert_eq!(s.high_score(), 10);
        assert_eq!(h.session.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_self_collision_ends_run() {
        let mut h = harness();
        h.session.start();
        h.session.snake = Snake::from_segments(
            vec![
                Position::new(5, 5),
                Position::new(5, 6),
                Position::new(4, 6),
                Position::new(4, 5),
                Position::new(4, 4),
            ],
            Direction::Up,
        )
        .unwrap();
        h.session.food = Food::at(Position::new(15, 15), 1000);
        h.session.set_direction(Direction::Left);

        assert_eq!(
            h.session.tick(),
            TickOutcome::Ended {
                final_score: 0,
                cause: GameOverCause::Collision(CollisionType::SelfCollision),
            }
        );
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut h = harness();
        h.session.start();
        h.session.snake = Snake::new(Position::new(19, 0), Direction::Right, 3);
        h.session.tick();
        assert!(matches!(h.session.phase(), Phase::GameOver { .. }));

        h.session.restart();
        assert_eq!(h.session.phase(), Phase::Idle);
        assert_eq!(h.session.timer(), None);

        h.session.start();
        assert_eq!(h.session.phase(), Phase::Running);
        assert!(h.session.timer().is_some());
    }

    #[test]
    fn test_start_from_game_over_begins_new_run() {
        let mut h = harness();
        h.session.start();
        h.session.snake = Snake::new(Position::new(19, 0), Direction::Right, 3);
        h.session.tick();
        park_food(&mut h.session);

        h.session.toggle_pause();
        assert_eq!(h.session.phase(), Phase::Running);
        assert_eq!(
            h.session.tick(),
            TickOutcome::Advanced { ate_food: false }
        );
    }

    #[test]
    fn test_restart_mid_run_resets_board() {
        let mut h = harness();
        h.session.start();
        food_ahead(&mut h.session);
        h.session.tick();

        h.session.apply(Action::Restart);
        assert_eq!(h.session.phase(), Phase::Idle);
        assert_eq!(h.session.score(), 0);
        assert_eq!(h.session.timer(), None);
        assert_eq!(h.session.high_score(), 10);
    }

    #[test]
    fn test_board_full_ends_run() {
        // 2x2 grid
        let config = GameConfig {
            board_width: 40,
            board_height: 40,
            initial_head: (1, 0),
            initial_snake_length: 2,
            ..Default::default()
        };
        let mut h = harness_with(config, 0);
        h.session.start();
        h.session.snake = Snake::from_segments(
            vec![Position::new(1, 0), Position::new(0, 0), Position::new(0, 1)],
            Direction::Down,
        )
        .unwrap();
        h.session.snake.grow();
        h.session.food = Food::at(Position::new(1, 1), 1000);

        assert_eq!(
            h.session.tick(),
            TickOutcome::Ended {
                final_score: 10,
                cause: GameOverCause::BoardFull,
            }
        );
        assert_eq!(*h.played.borrow(), vec![Sound::Eat]);
        assert_eq!(h.session.timer(), None);
        assert_eq!(h.store.get(), 10);
    }

    #[test]
    fn test_mute_is_left_to_the_sink() {
        let mut h = harness();
        assert!(h.session.audio_mut().toggle_mute());
        h.session.start();
        food_ahead(&mut h.session);
        h.session.tick();

        // The recording sink ignores its own mute flag; the session still asks
        assert_eq!(*h.played.borrow(), vec![Sound::Eat]);
    }
}
