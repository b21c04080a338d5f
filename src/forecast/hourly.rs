use super::types::{Condition, RawSample};
use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};

pub const HOURLY_POINTS: usize = 24;

/// One interpolated hour of the 24-hour outlook.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyPoint {
    pub local_time: DateTime<FixedOffset>,
    /// "HH:MM" label in location-local time.
    pub label: String,
    pub temp: f64,
    pub condition: Condition,
}

type Pt = (DateTime<FixedOffset>, f64, Condition);

/// Interpolate the 3-hourly forecast into 24 hourly points, one per local hour
/// starting at `now_utc` shifted by `tz_offset_secs` and truncated to the hour.
///
/// Returns exactly 24 points, or an empty vec when there are no samples or the
/// offset/timestamps are unrepresentable. Never a partial count.
pub fn hourly_points(
    samples: &[RawSample],
    tz_offset_secs: i32,
    now_utc: DateTime<Utc>,
) -> Vec<HourlyPoint> {
    compute(samples, tz_offset_secs, now_utc).unwrap_or_default()
}

fn compute(
    samples: &[RawSample],
    tz_offset_secs: i32,
    now_utc: DateTime<Utc>,
) -> Option<Vec<HourlyPoint>> {
    if samples.is_empty() {
        return Some(Vec::new());
    }

    let offset = FixedOffset::east_opt(tz_offset_secs)?;

    let mut pts: Vec<Pt> = Vec::with_capacity(samples.len());
    for sample in samples {
        let local = DateTime::from_timestamp(sample.dt, 0)?.with_timezone(&offset);
        pts.push((truncate_hour(local)?, sample.temp, sample.condition));
    }
    pts.sort_by_key(|p| p.0);

    let start = truncate_hour(now_utc.with_timezone(&offset))?;

    let mut result = Vec::with_capacity(HOURLY_POINTS);
    for i in 0..HOURLY_POINTS {
        let t = start.checked_add_signed(Duration::hours(i as i64))?;

        let (temp, condition) = if let Some(exact) = pts.iter().find(|p| p.0 == t) {
            (exact.1, exact.2)
        } else {
            let before = pts.iter().rev().find(|p| p.0 < t);
            let after = pts.iter().find(|p| p.0 > t);
            match (before, after) {
                (Some(b), Some(a)) => lerp_between(b, a, t),
                (Some(b), None) => (b.1, b.2),
                (None, Some(a)) => (a.1, a.2),
                (None, None) => (pts[0].1, pts[0].2),
            }
        };

        result.push(HourlyPoint {
            local_time: t,
            label: t.format("%H:%M").to_string(),
            temp,
            condition,
        });
    }

    Some(result)
}

/// Linear temperature interpolation between two bracketing points. The
/// condition is categorical, so it is taken from the nearer side (before when
/// the elapsed fraction is below one half, after otherwise). A zero time delta
/// yields the before point's values.
fn lerp_between(before: &Pt, after: &Pt, t: DateTime<FixedOffset>) -> (f64, Condition) {
    let total = (after.0 - before.0).num_seconds();
    if total == 0 {
        return (before.1, before.2);
    }
    let frac = (t - before.0).num_seconds() as f64 / total as f64;
    let temp = before.1 + (after.1 - before.1) * frac;
    let condition = if frac < 0.5 { before.2 } else { after.2 };
    (temp, condition)
}

fn truncate_hour(dt: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    dt.with_minute(0)?.with_second(0)?.with_nanosecond(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2023-11-14 22:13:20 UTC; the hour window starts at 22:00 UTC.
    const NOW: i64 = 1_700_000_000;
    const START: i64 = 1_699_999_200;

    fn now_utc() -> DateTime<Utc> {
        DateTime::from_timestamp(NOW, 0).unwrap()
    }

    fn sample(dt: i64, temp: f64, condition: Condition) -> RawSample {
        RawSample {
            dt,
            temp,
            condition,
            pop: None,
        }
    }

    #[test]
    fn returns_exactly_24_points() {
        let samples: Vec<RawSample> = (0..16)
            .map(|i| sample(START + i * 3 * 3600, 10.0 + i as f64, Condition::Clear))
            .collect();
        for offset in [-8 * 3600, 0, 3600, 5 * 3600 + 1800] {
            let points = hourly_points(&samples, offset, now_utc());
            assert_eq!(points.len(), 24, "offset {offset}");
        }
    }

    #[test]
    fn returns_empty_for_no_samples() {
        assert!(hourly_points(&[], 0, now_utc()).is_empty());
    }

    #[test]
    fn returns_empty_for_invalid_offset() {
        let samples = vec![sample(START, 10.0, Condition::Clear)];
        assert!(hourly_points(&samples, 100 * 3600, now_utc()).is_empty());
    }

    #[test]
    fn exact_hour_match_is_used_directly() {
        let samples = vec![
            sample(START, 7.5, Condition::Snow),
            sample(START + 3 * 3600, 9.0, Condition::Clear),
        ];
        let points = hourly_points(&samples, 0, now_utc());
        assert_eq!(points[0].temp, 7.5);
        assert_eq!(points[0].condition, Condition::Snow);
        assert_eq!(points[0].label, "22:00");
    }

    #[test]
    fn interpolates_linearly_between_brackets() {
        let samples = vec![
            sample(START, 10.0, Condition::Clear),
            sample(START + 3 * 3600, 16.0, Condition::Rain),
        ];
        let points = hourly_points(&samples, 0, now_utc());
        assert!((points[1].temp - 12.0).abs() < 1e-9);
        assert!((points[2].temp - 14.0).abs() < 1e-9);
    }

    #[test]
    fn interpolated_temp_stays_within_bracket_range() {
        let samples = vec![
            sample(START, -3.0, Condition::Snow),
            sample(START + 3 * 3600, 4.0, Condition::Clouds),
            sample(START + 6 * 3600, 1.0, Condition::Clouds),
        ];
        let points = hourly_points(&samples, 0, now_utc());
        for p in &points[..7] {
            assert!(p.temp >= -3.0 && p.temp <= 4.0, "{} out of range", p.temp);
        }
    }

    #[test]
    fn condition_comes_from_nearer_side() {
        let samples = vec![
            sample(START, 10.0, Condition::Clear),
            sample(START + 3 * 3600, 16.0, Condition::Rain),
        ];
        let points = hourly_points(&samples, 0, now_utc());
        // +1h: fraction 1/3 -> before; +2h: fraction 2/3 -> after.
        assert_eq!(points[1].condition, Condition::Clear);
        assert_eq!(points[2].condition, Condition::Rain);
    }

    #[test]
    fn extrapolates_flat_past_the_series_boundaries() {
        // Single sample at the window start; every later hour carries it forward.
        let samples = vec![sample(START, 5.5, Condition::Mist)];
        let points = hourly_points(&samples, 0, now_utc());
        assert_eq!(points.len(), 24);
        assert!(points.iter().all(|p| p.temp == 5.5));
        assert!(points.iter().all(|p| p.condition == Condition::Mist));

        // Single sample after the whole window; values carried backward.
        let samples = vec![sample(START + 40 * 3600, -1.0, Condition::Snow)];
        let points = hourly_points(&samples, 0, now_utc());
        assert!(points.iter().all(|p| p.temp == -1.0));
    }

    #[test]
    fn zero_time_delta_uses_before_values() {
        let at = DateTime::from_timestamp(START, 0)
            .unwrap()
            .with_timezone(&FixedOffset::east_opt(0).unwrap());
        let before = (at, 10.0, Condition::Clear);
        let after = (at, 20.0, Condition::Rain);
        let (temp, condition) = lerp_between(&before, &after, at + Duration::hours(1));
        assert_eq!(temp, 10.0);
        assert_eq!(condition, Condition::Clear);
    }

    #[test]
    fn offset_shifts_the_local_labels() {
        let samples = vec![sample(START, 10.0, Condition::Clear)];
        let points = hourly_points(&samples, 3600, now_utc());
        // 22:00 UTC is 23:00 at UTC+1.
        assert_eq!(points[0].label, "23:00");
    }
}
