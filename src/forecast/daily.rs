use super::types::{Condition, RawSample};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::collections::BTreeMap;

pub const MAX_FORECAST_DAYS: usize = 5;

/// Aggregated outlook for one upcoming local calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Weekday name, e.g. "Tuesday".
    pub day_name: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub condition: Condition,
    pub icon: &'static str,
}

/// Reduce the 3-hourly samples to at most 5 per-day summaries, one per local
/// calendar date strictly after today, ascending. Today's leftover samples are
/// dropped. Empty on no usable samples or an unrepresentable offset.
pub fn daily_summaries(
    samples: &[RawSample],
    tz_offset_secs: i32,
    now_utc: DateTime<Utc>,
) -> Vec<DailySummary> {
    compute(samples, tz_offset_secs, now_utc).unwrap_or_default()
}

fn compute(
    samples: &[RawSample],
    tz_offset_secs: i32,
    now_utc: DateTime<Utc>,
) -> Option<Vec<DailySummary>> {
    let offset = FixedOffset::east_opt(tz_offset_secs)?;
    let today = now_utc.with_timezone(&offset).date_naive();

    let mut buckets: BTreeMap<NaiveDate, (Vec<f64>, Vec<Condition>)> = BTreeMap::new();
    for sample in samples {
        let date = local_date(sample.dt, &offset)?;
        if date == today {
            continue;
        }
        let bucket = buckets.entry(date).or_default();
        bucket.0.push(sample.temp);
        bucket.1.push(sample.condition);
    }

    let summaries = buckets
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .map(|(date, (temps, conditions))| {
            let temp_max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let temp_min = temps.iter().copied().fold(f64::INFINITY, f64::min);
            let condition = dominant_condition(&conditions);
            DailySummary {
                date,
                day_name: date.format("%A").to_string(),
                temp_max,
                temp_min,
                condition,
                icon: condition.icon(),
            }
        })
        .collect();

    Some(summaries)
}

/// Group every sample by its local calendar date, today included. Used to
/// resolve a selected forecast day back to its raw 3-hourly entries.
pub fn samples_by_date(
    samples: &[RawSample],
    tz_offset_secs: i32,
) -> BTreeMap<NaiveDate, Vec<RawSample>> {
    let Some(offset) = FixedOffset::east_opt(tz_offset_secs) else {
        return BTreeMap::new();
    };

    let mut grouped: BTreeMap<NaiveDate, Vec<RawSample>> = BTreeMap::new();
    for sample in samples {
        if let Some(date) = local_date(sample.dt, &offset) {
            grouped.entry(date).or_default().push(*sample);
        }
    }
    grouped
}

/// Most frequent condition in the bucket, ties broken by first-encountered
/// order. `Default` for an empty bucket.
fn dominant_condition(conditions: &[Condition]) -> Condition {
    let mut seen: Vec<(Condition, usize)> = Vec::new();
    for condition in conditions {
        match seen.iter_mut().find(|(c, _)| c == condition) {
            Some((_, count)) => *count += 1,
            None => seen.push((*condition, 1)),
        }
    }

    let mut best: Option<(Condition, usize)> = None;
    for (condition, count) in seen {
        // Strict comparison keeps the first-encountered condition on ties.
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((condition, count));
        }
    }
    best.map(|(condition, _)| condition).unwrap_or(Condition::Default)
}

fn local_date(dt: i64, offset: &FixedOffset) -> Option<NaiveDate> {
    Some(DateTime::from_timestamp(dt, 0)?.with_timezone(offset).date_naive())
}
