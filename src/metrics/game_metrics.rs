use std::time::{Duration, Instant};

/// Wall-clock play time of the current run, plus a run counter
pub struct GameMetrics {
    /// When the clock last started; `None` while stopped
    pub start_time: Option<Instant>,
    /// Time banked before the last pause
    pub banked: Duration,
    pub games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: None,
            banked: Duration::ZERO,
            games_played: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.banked + self.start_time.map(|t| t.elapsed()).unwrap_or_default()
    }

    pub fn on_game_start(&mut self) {
        self.banked = Duration::ZERO;
        self.start_time = Some(Instant::now());
    }

    pub fn on_pause(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.banked += start.elapsed();
        }
    }

    pub fn on_resume(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    pub fn on_game_over(&mut self) {
        self.on_pause();
        self.games_played += 1;
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed().as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
