//! Plain data row written by every output backend.

/// One device's position at one tick — the full output schema (§6):
/// `id,date,lon,lat`. `date` is carried per row (not just in the filename)
/// because the SQLite backend has no filename to fall back on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceSnapshotRow {
    pub id: u32,
    pub lon: f64,
    pub lat: f64,
}
