//! Sound effects
//!
//! The session calls [`AudioSink::play`] the moment it detects an event. Muting
//! lives entirely in the sink; the session never looks at it.

use std::io::{Stderr, Write, stderr};

use tracing::debug;

/// Events that have a sound attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Eat,
    GameOver,
}

impl Sound {
    pub fn name(&self) -> &'static str {
        match self {
            Sound::Eat => "eat",
            Sound::GameOver => "gameOver",
        }
    }

    /// Terminal bells per sound
    fn bells(&self) -> usize {
        match self {
            Sound::Eat => 1,
            Sound::GameOver => 2,
        }
    }
}

pub trait AudioSink {
    fn play(&mut self, sound: Sound);

    fn set_muted(&mut self, muted: bool);

    fn is_muted(&self) -> bool;

    fn toggle_mute(&mut self) -> bool {
        let muted = !self.is_muted();
        self.set_muted(muted);
        muted
    }
}

/// Plays sounds by ringing the terminal bell
pub struct TerminalBell<W: Write = Stderr> {
    out: W,
    muted: bool,
}

impl TerminalBell<Stderr> {
    pub fn new(muted: bool) -> Self {
        Self::with_writer(stderr(), muted)
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn with_writer(out: W, muted: bool) -> Self {
        Self { out, muted }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioSink for TerminalBell<W> {
    fn play(&mut self, sound: Sound) {
        if self.muted {
            return;
        }
        let bells = "\x07".repeat(sound.bells());
        // A missing bell is not worth interrupting the game for
        if let Err(e) = self
            .out
            .write_all(bells.as_bytes())
            .and_then(|_| self.out.flush())
        {
            debug!("Failed to play {}: {}", sound.name(), e);
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

/// Sink that never makes a sound
#[derive(Debug, Default)]
pub struct Silent {
    muted: bool,
}

impl AudioSink for Silent {
    fn play(&mut self, _sound: Sound) {}

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}
