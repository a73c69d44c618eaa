//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter for
//! internal bookkeeping, paired with a `SimClock` that maps ticks onto real
//! calendar dates via `chrono`. A pure-integer tick (the teacher framework's
//! original model) cannot express the disaster timeline's arbitrary
//! `start`/`end` calendar dates or the `MM-DD-YYYY_HH:MM:SS` per-tick export
//! filenames, so the clock here carries a `chrono::NaiveDateTime` directly
//! rather than only a Unix-seconds offset.

use chrono::NaiveDateTime;
use std::fmt;

/// Format used for per-tick export filenames and the `date` column.
pub const EXPORT_DATE_FORMAT: &str = "%m-%d-%Y_%H:%M:%S";

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and calendar timestamps.
#[derive(Clone, Debug)]
pub struct SimClock {
    /// Calendar timestamp of tick 0.
    pub start: NaiveDateTime,
    /// How many hours one tick represents (`Δt_sim`).
    pub tick_duration_hours: f64,
    /// The current tick — advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start: NaiveDateTime, tick_duration_hours: f64) -> Self {
        Self {
            start,
            tick_duration_hours,
            current_tick: Tick::ZERO,
        }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.offset(1);
    }

    /// Calendar timestamp corresponding to `current_tick`.
    pub fn current_datetime(&self) -> NaiveDateTime {
        let secs = (self.current_tick.0 as f64) * self.tick_duration_hours * 3600.0;
        self.start + chrono::Duration::milliseconds((secs * 1000.0).round() as i64)
    }

    /// How many ticks span the interval `[start, end]` given the configured
    /// `tick_duration_hours`. Used to derive `K` in the disaster timeline's
    /// decay formulas.
    pub fn ticks_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> u64 {
        let hours = (end - start).num_seconds() as f64 / 3600.0;
        (hours / self.tick_duration_hours).ceil().max(0.0) as u64
    }

    /// Render `current_datetime()` in the export filename/date-column format.
    pub fn current_date_string(&self) -> String {
        self.current_datetime().format(EXPORT_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.current_tick, self.current_date_string())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation run configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    #[cfg_attr(feature = "serde", serde(with = "chrono::naive::serde::ts_seconds"))]
    pub start: NaiveDateTime,
    #[cfg_attr(feature = "serde", serde(with = "chrono::naive::serde::ts_seconds"))]
    pub end: NaiveDateTime,

    /// Hours per tick (`Δt_sim`). Typically `1.0` or `24.0`.
    pub tick_duration_hours: f64,

    /// Master RNG seed. The same seed always produces identical results.
    pub seed: u64,

    /// Worker thread count passed to Rayon. `None` uses all logical cores.
    pub num_threads: Option<usize>,
}

impl SimConfig {
    /// Total number of ticks from `start` to `end` inclusive.
    pub fn total_ticks(&self) -> u64 {
        let hours = (self.end - self.start).num_seconds() as f64 / 3600.0;
        (hours / self.tick_duration_hours).ceil().max(0.0) as u64
    }

    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks())
    }

    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start, self.tick_duration_hours)
    }
}
