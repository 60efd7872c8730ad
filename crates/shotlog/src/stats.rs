// Shared numeric helpers: guarded rates, running moments, output rounding.

use serde::Serializer;

use crate::record::{ShotRecord, ShotType, ZoneGroup, RESTRICTED_AREA};

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Effective field-goal percentage as the published artifacts compute it:
/// `(two_made + 1.5 * three_made) / attempts * 100`.
///
/// This is not the textbook eFG% (`(made + 0.5 * three_made) / attempts`),
/// which gives lower values. Existing consumers read these numbers, so the
/// multiplier stays.
pub fn efg_proxy(two_made: u64, three_made: u64, attempts: u64) -> f64 {
    if attempts == 0 {
        0.0
    } else {
        (two_made as f64 + 1.5 * three_made as f64) / attempts as f64 * 100.0
    }
}

/// `part / whole`, or 0 when `whole` is 0.
pub fn ratio(part: f64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part / whole as f64
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn round1<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value, 1))
}

pub fn round2<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value, 2))
}

pub fn round3<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value, 3))
}

// ---------------------------------------------------------------------------
// Running moments
// ---------------------------------------------------------------------------

/// Welford accumulator for mean and sample standard deviation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// 0 for an empty sample.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample standard deviation (n - 1 denominator). 0 with fewer than two
    /// values.
    pub fn sample_std(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2 / (self.count - 1) as f64).max(0.0).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Shot tallies
// ---------------------------------------------------------------------------

/// Attempt/make counters split by shot type and zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShotTally {
    pub attempts: u64,
    pub made: u64,
    pub two_attempts: u64,
    pub two_made: u64,
    pub three_attempts: u64,
    pub three_made: u64,
    pub three_zone: u64,
    pub mid_range: u64,
    pub paint: u64,
    pub restricted_area: u64,
}

impl ShotTally {
    pub fn add(&mut self, record: &ShotRecord) {
        self.attempts += 1;
        let made = u64::from(record.made);
        self.made += made;
        match record.shot_type {
            ShotType::TwoPoint => {
                self.two_attempts += 1;
                self.two_made += made;
            }
            ShotType::ThreePoint => {
                self.three_attempts += 1;
                self.three_made += made;
            }
        }
        match record.zone_group() {
            ZoneGroup::ThreePoint => self.three_zone += 1,
            ZoneGroup::MidRange => self.mid_range += 1,
            ZoneGroup::Paint => self.paint += 1,
            ZoneGroup::Other => {}
        }
        if record.basic_zone.as_deref() == Some(RESTRICTED_AREA) {
            self.restricted_area += 1;
        }
    }

    pub fn fg_percentage(&self) -> f64 {
        pct(self.made, self.attempts)
    }

    pub fn three_pt_rate(&self) -> f64 {
        pct(self.three_attempts, self.attempts)
    }

    pub fn three_pt_percentage(&self) -> f64 {
        pct(self.three_made, self.three_attempts)
    }

    pub fn two_pt_percentage(&self) -> f64 {
        pct(self.two_made, self.two_attempts)
    }

    pub fn mid_range_rate(&self) -> f64 {
        pct(self.mid_range, self.attempts)
    }

    pub fn restricted_area_rate(&self) -> f64 {
        pct(self.restricted_area, self.attempts)
    }

    pub fn efg_percentage(&self) -> f64 {
        efg_proxy(self.two_made, self.three_made, self.attempts)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
