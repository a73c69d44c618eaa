//! Disaster timeline generation and lookup.

use chrono::{Duration, NaiveDateTime};

use crate::field::DisasterField;

/// Amplitude decay schedule. The spelling here is the corrected one: the
/// original generator's `generate_disaster` checks for a misspelled
/// `'exponetial'` against an assert that only allows `'exponential'`, so its
/// exponential branch can never run. `Exponential` here is fully wired up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecayMethod {
    Linear,
    Exponential,
    Parabolic,
}

impl DecayMethod {
    fn amplitude_at(self, initial_amplitude: f64, k: u64, total_steps: u64) -> f64 {
        let k = k as f64;
        let big_k = total_steps.max(1) as f64;
        match self {
            DecayMethod::Linear => initial_amplitude * (1.0 - k / big_k),
            DecayMethod::Exponential => initial_amplitude * (-k).exp(),
            DecayMethod::Parabolic => initial_amplitude * (1.0 - (k / big_k).powi(2)),
        }
    }
}

/// Strictly increasing sequence of `(timestamp, field)` pairs.
#[derive(Clone, Debug)]
pub struct Timeline {
    entries: Vec<(NaiveDateTime, DisasterField)>,
}

impl Timeline {
    /// The field whose timestamp is the greatest `<= t`, or `None` if `t`
    /// precedes the first entry.
    pub fn field_at(&self, t: NaiveDateTime) -> Option<&DisasterField> {
        match self.entries.binary_search_by_key(&t, |(ts, _)| *ts) {
            Ok(idx) => Some(&self.entries[idx].1),
            Err(0) => None,
            Err(idx) => Some(&self.entries[idx - 1].1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn steps_between(start: NaiveDateTime, end: NaiveDateTime, step_hours: f64) -> u64 {
    let hours = (end - start).num_seconds() as f64 / 3600.0;
    (hours / step_hours).ceil().max(0.0) as u64
}

/// Builds a [`Timeline`] by decaying an initial amplitude over a fixed step
/// schedule from `start` to `end`, optionally handing off to a residual
/// field once the timestamp passes `continuity`.
pub struct TimelineBuilder {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub step_hours: f64,
    pub initial_amplitude: f64,
    pub decay: DecayMethod,
    pub continuity: Option<NaiveDateTime>,
    pub residual: Option<DisasterField>,
}

impl TimelineBuilder {
    /// Generate the timeline, deriving each step's field from `base` by
    /// overwriting its amplitude with the decayed value for that step.
    pub fn build(&self, base: DisasterField) -> Timeline {
        let total_steps = steps_between(self.start, self.end, self.step_hours);
        let continuity_steps = self
            .continuity
            .map(|c| steps_between(self.start, c, self.step_hours));
        let big_k = continuity_steps.unwrap_or(total_steps);
        let has_residual = self.continuity.is_some() && self.residual.is_some();

        let mut entries = Vec::with_capacity(big_k as usize + 1);
        for k in 0..=big_k {
            let offset_secs = (k as f64) * self.step_hours * 3600.0;
            let t_k = self.start + Duration::milliseconds((offset_secs * 1000.0).round() as i64);

            if has_residual {
                if t_k > self.end {
                    entries.push((t_k, self.residual.unwrap()));
                    continue;
                }
            } else if t_k > self.end {
                break;
            }

            let amplitude = self.decay.amplitude_at(self.initial_amplitude, k, big_k);
            entries.push((t_k, base.with_amplitude(amplitude)));
        }

        Timeline { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::GaussianField;
    use chrono::NaiveDate;
    use dm_core::GeoPoint;

    fn dt(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn gaussian(amplitude: f64) -> DisasterField {
        DisasterField::Gaussian(
            GaussianField::new(GeoPoint::new(0.0, 0.0), 1.0, 1.0, amplitude).unwrap(),
        )
    }

    #[test]
    fn exponential_decay_matches_formula() {
        let builder = TimelineBuilder {
            start: dt(0),
            end: dt(5),
            step_hours: 1.0,
            initial_amplitude: 10.0,
            decay: DecayMethod::Exponential,
            continuity: None,
            residual: None,
        };
        let timeline = builder.build(gaussian(10.0));
        let field_at_2 = timeline.field_at(dt(2)).unwrap();
        let expected = 10.0 * (-2.0f64).exp();
        assert!((field_at_2.intensity(GeoPoint::new(0.0, 0.0)) - expected).abs() < 1e-9);
    }

    #[test]
    fn linear_decay_reaches_zero_at_end() {
        let builder = TimelineBuilder {
            start: dt(0),
            end: dt(10),
            step_hours: 1.0,
            initial_amplitude: 10.0,
            decay: DecayMethod::Linear,
            continuity: None,
            residual: None,
        };
        let timeline = builder.build(gaussian(10.0));
        let last = timeline.field_at(dt(10)).unwrap();
        assert!(last.intensity(GeoPoint::new(0.0, 0.0)).abs() < 1e-9);
    }

    #[test]
    fn query_before_first_entry_returns_none() {
        let builder = TimelineBuilder {
            start: dt(5),
            end: dt(10),
            step_hours: 1.0,
            initial_amplitude: 1.0,
            decay: DecayMethod::Linear,
            continuity: None,
            residual: None,
        };
        let timeline = builder.build(gaussian(1.0));
        assert!(timeline.field_at(dt(0)).is_none());
    }

    #[test]
    fn residual_field_takes_over_after_end_when_continuity_extends_past_it() {
        // Mirrors the earthquake scenario: continuity falls well beyond end,
        // so the timeline keeps generating entries out to continuity, and
        // every entry past `end` (not past `continuity`) is the residual.
        let residual = gaussian(1.0);
        let builder = TimelineBuilder {
            start: dt(0),
            end: dt(5),
            step_hours: 1.0,
            initial_amplitude: 10.0,
            decay: DecayMethod::Linear,
            continuity: Some(dt(20)),
            residual: Some(residual),
        };
        let timeline = builder.build(gaussian(10.0));

        // Entry count is driven by continuity, not end.
        assert_eq!(timeline.len(), 21);

        // Still decaying at end.
        let at_end = timeline.field_at(dt(5)).unwrap();
        assert!((at_end.intensity(GeoPoint::new(0.0, 0.0))).abs() < 1e-9);

        // Residual from the first step past end onward.
        let after = timeline.field_at(dt(7)).unwrap();
        assert_eq!(
            after.intensity(GeoPoint::new(0.0, 0.0)),
            residual.intensity(GeoPoint::new(0.0, 0.0))
        );
        let at_continuity = timeline.field_at(dt(20)).unwrap();
        assert_eq!(
            at_continuity.intensity(GeoPoint::new(0.0, 0.0)),
            residual.intensity(GeoPoint::new(0.0, 0.0))
        );
    }

    #[test]
    fn timestamps_are_strictly_increasing() {
        let builder = TimelineBuilder {
            start: dt(0),
            end: dt(5),
            step_hours: 1.0,
            initial_amplitude: 1.0,
            decay: DecayMethod::Parabolic,
            continuity: None,
            residual: None,
        };
        let timeline = builder.build(gaussian(1.0));
        assert!(timeline.len() >= 2);
    }
}
