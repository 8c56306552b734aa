//! Playback Clock
//!
//! Two-state transport driving logical time. Each tick measures wall-clock
//! time since the previous tick, clamps it to a maximum step so a stalled
//! scheduler cannot jump the playhead, and advances the session's current
//! time. Reaching the end of the timeline stops playback (or wraps to zero
//! when looping is enabled).
//!
//! The session's `PlaybackState::playing` flag is the only playing state.
//! Clearing it from anywhere halts the clock on its next tick.

use std::fmt;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::state::PlaybackState;
use crate::timeline::quantize;

/// Transport states, as read from the session flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Stopped,
    Playing,
}

impl From<&PlaybackState> for ClockState {
    fn from(playback: &PlaybackState) -> Self {
        if playback.playing {
            ClockState::Playing
        } else {
            ClockState::Stopped
        }
    }
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockState::Stopped => write!(f, "Stopped"),
            ClockState::Playing => write!(f, "Playing"),
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; time unchanged.
    Idle,
    Advanced,
    /// Hit the end and stopped there.
    ReachedEnd,
    /// Hit the end and wrapped to zero.
    Looped,
}

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Wall-clock instant of the previous tick (or of `play`).
    last_tick: Option<Instant>,

    /// Largest advance per tick, in seconds.
    max_step: f64,

    loop_playback: bool,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl PlaybackClock {
    pub fn new(max_step: f64, loop_playback: bool) -> Self {
        Self {
            last_tick: None,
            max_step,
            loop_playback,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_tick_step, config.loop_playback)
    }

    /// Start playback. Playing from the end restarts at zero.
    pub fn play(&mut self, playback: &mut PlaybackState, max_time: f64, now: Instant) {
        if playback.playing {
            log::debug!("Clock already playing");
            return;
        }
        if playback.current_time >= max_time {
            playback.current_time = 0.0;
        }
        self.last_tick = Some(now);
        playback.playing = true;
        log::debug!("Clock: play from {:.3}s", playback.current_time);
    }

    /// Halt at the current position.
    pub fn pause(&mut self, playback: &mut PlaybackState) {
        self.last_tick = None;
        if !playback.playing {
            return;
        }
        playback.playing = false;
        log::debug!("Clock: paused at {:.3}s", playback.current_time);
    }

    /// Halt and return to zero.
    pub fn stop(&mut self, playback: &mut PlaybackState) {
        self.pause(playback);
        playback.current_time = 0.0;
    }

    pub fn toggle(&mut self, playback: &mut PlaybackState, max_time: f64, now: Instant) {
        match ClockState::from(&*playback) {
            ClockState::Playing => self.pause(playback),
            ClockState::Stopped => self.play(playback, max_time, now),
        }
    }

    /// Explicit time-set (scrub). Clamped to `[0, max_time]`.
    pub fn seek(&self, playback: &mut PlaybackState, time: f64, max_time: f64) {
        playback.current_time = quantize(time.clamp(0.0, max_time));
        log::trace!("Clock: seek to {:.3}s", playback.current_time);
    }

    /// Advance logical time by the clamped wall-clock delta.
    pub fn tick(&mut self, playback: &mut PlaybackState, max_time: f64, now: Instant) -> TickOutcome {
        if !playback.playing {
            self.last_tick = None;
            return TickOutcome::Idle;
        }

        let elapsed = self
            .last_tick
            .map(|prev| now.saturating_duration_since(prev).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        let next = quantize(playback.current_time + elapsed.min(self.max_step));
        if next < quantize(max_time) {
            playback.current_time = next;
            log::trace!("Clock: tick to {:.4}s", playback.current_time);
            return TickOutcome::Advanced;
        }

        if self.loop_playback {
            playback.current_time = 0.0;
            log::debug!("Clock: looped at {:.3}s", max_time);
            TickOutcome::Looped
        } else {
            playback.current_time = quantize(max_time);
            self.last_tick = None;
            playback.playing = false;
            log::debug!("Clock: reached end at {:.3}s", max_time);
            TickOutcome::ReachedEnd
        }
    }

    pub fn max_step(&self) -> f64 {
        self.max_step
    }
}
