//! Simulation observer trait for progress reporting and output export.

use dm_core::Tick;
use dm_device::DeviceStore;
use dm_output::{DeviceSnapshotRow, OutputError, OutputWriter};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick, after the apply phase.
    ///
    /// `date` is the tick's calendar timestamp, already formatted per §6.
    fn on_tick_end(&mut self, _tick: Tick, _date: &str, _devices: &DeviceStore) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing. Use when you need to call `run` but
/// don't want progress callbacks or output export.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Bridges [`SimObserver`] to any [`OutputWriter`] backend.
///
/// Lives here rather than in `dm-output` so that crate never needs to depend
/// on `dm-sim` (which already depends on it for export) — see `DESIGN.md`.
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: dm_output::OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, _tick: Tick, date: &str, devices: &DeviceStore) {
        let rows: Vec<DeviceSnapshotRow> = devices
            .device_ids()
            .map(|id| {
                let (lon, lat) = devices.position(id);
                DeviceSnapshotRow { id: id.0, lon, lat }
            })
            .collect();
        let result = self.writer.write_tick(date, &rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
