//! Playback driver
//!
//! Ties the clock, resolver and synchronizer together. One tick advances
//! the clock, resolves the timeline exactly once and hands the same frame to
//! every consumer.

use std::thread;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::engine::resolver::{resolve, ResolvedFrame};
use crate::engine::sync::{MediaHost, MediaSynchronizer};
use crate::engine::transport::{PlaybackClock, TickOutcome};
use crate::state::Session;

/// Source of scheduling ticks ("request the next tick").
pub trait Scheduler {
    /// Block until the next tick is due and return its instant.
    fn next_tick(&mut self) -> Instant;
}

/// Fixed-interval scheduler backed by `thread::sleep`.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    interval: Duration,
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Interval for a target tick rate.
    pub fn from_rate(ticks_per_second: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(ticks_per_second.max(1))))
    }
}

impl Scheduler for IntervalScheduler {
    fn next_tick(&mut self) -> Instant {
        thread::sleep(self.interval);
        Instant::now()
    }
}

/// External capture collaborator, told to stop when playback hits the end.
pub trait RecordingSession {
    fn is_active(&self) -> bool;
    fn stop(&mut self);
}

#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    clock: PlaybackClock,
    sync: MediaSynchronizer,
    lookahead: f64,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl PlaybackEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            clock: PlaybackClock::from_config(config),
            sync: MediaSynchronizer::from_config(config),
            lookahead: config.resolver_lookahead,
        }
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn play(&mut self, session: &mut Session, now: Instant) {
        let max_time = session.max_time();
        self.clock.play(&mut session.playback, max_time, now);
    }

    pub fn pause(&mut self, session: &mut Session) {
        self.clock.pause(&mut session.playback);
    }

    pub fn stop(&mut self, session: &mut Session) {
        self.clock.stop(&mut session.playback);
    }

    pub fn seek(&mut self, session: &mut Session, time: f64) {
        let max_time = session.max_time();
        self.clock.seek(&mut session.playback, time, max_time);
    }

    /// Resolve the session at its current time without advancing.
    pub fn frame(&self, session: &Session) -> ResolvedFrame {
        resolve(
            session.timeline(),
            session.playback.current_time,
            self.lookahead,
            session.playback.playing,
        )
    }

    /// One scheduling tick.
    pub fn tick(
        &mut self,
        session: &mut Session,
        now: Instant,
        host: &mut dyn MediaHost,
        recorder: Option<&mut (dyn RecordingSession + '_)>,
    ) -> ResolvedFrame {
        let max_time = session.max_time();
        let outcome = self.clock.tick(&mut session.playback, max_time, now);

        if outcome == TickOutcome::ReachedEnd {
            if let Some(recorder) = recorder.filter(|r| r.is_active()) {
                log::info!("End of timeline reached; stopping recording");
                recorder.stop();
            }
        }

        let frame = self.frame(session);
        self.sync.sync(&frame, host);
        frame
    }
}

/// Drive playback until the clock stops. Returns the number of ticks run.
pub fn run_playback<F>(
    engine: &mut PlaybackEngine,
    session: &mut Session,
    scheduler: &mut dyn Scheduler,
    host: &mut dyn MediaHost,
    mut recorder: Option<&mut (dyn RecordingSession + '_)>,
    mut on_frame: F,
) -> usize
where
    F: FnMut(&ResolvedFrame),
{
    let mut ticks = 0;
    while session.playback.playing {
        let now = scheduler.next_tick();
        let frame = engine.tick(session, now, host, recorder.as_deref_mut());
        on_frame(&frame);
        ticks += 1;
    }
    log::debug!("Playback loop finished after {} ticks", ticks);
    ticks
}
