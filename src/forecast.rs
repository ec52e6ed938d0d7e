//! Forecast aggregation
//!
//! Reduces the flat 3-hour forecast feed into one summary per calendar day and
//! counts condition groups for the distribution chart.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use tracing::warn;

use crate::data::{DailySummary, ForecastSample};

/// Groups samples by local calendar date, in order of first appearance.
///
/// Each day's average is the arithmetic mean of its temperatures rounded to two
/// decimals (half away from zero). The representative condition is the condition
/// of the first sample seen for that day, not the most frequent one.
pub fn aggregate(samples: &[ForecastSample]) -> Vec<DailySummary> {
    aggregate_in(samples, &Local)
}

/// Same as [`aggregate`], projecting timestamps into `tz` instead of the local zone
pub fn aggregate_in<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DailySummary> {
    let mut days: Vec<DayAccumulator> = Vec::new();
    let mut slots: HashMap<NaiveDate, usize> = HashMap::new();

    for sample in samples {
        let Some(date) = calendar_date(sample.timestamp, tz) else {
            warn!(timestamp = sample.timestamp, "skipping forecast sample with unrepresentable timestamp");
            continue;
        };

        let slot = *slots.entry(date).or_insert_with(|| {
            days.push(DayAccumulator::new(date, &sample.condition));
            days.len() - 1
        });
        days[slot].add(sample.temperature);
    }

    days.into_iter().map(DayAccumulator::finish).collect()
}

/// Rounds to two decimal places, ties away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn calendar_date<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(tz).date_naive())
}

/// Running totals for one calendar day
struct DayAccumulator {
    date: NaiveDate,
    first_condition: String,
    sum: f64,
    count: usize,
}

impl DayAccumulator {
    fn new(date: NaiveDate, condition: &str) -> Self {
        Self {
            date,
            first_condition: condition.to_string(),
            sum: 0.0,
            count: 0,
        }
    }

    fn add(&mut self, temperature: f64) {
        self.sum += temperature;
        self.count += 1;
    }

    fn finish(self) -> DailySummary {
        // count is at least 1: an accumulator only exists once a sample was added
        DailySummary {
            calendar_date: self.date,
            average_temperature: round2(self.sum / self.count as f64),
            representative_condition: self.first_condition,
        }
    }
}

/// How many forecast slots fall into each condition group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionCounts {
    pub clear: u64,
    pub clouds: u64,
    pub rain: u64,
    pub snow: u64,
    pub other: u64,
}

impl ConditionCounts {
    /// Label/count pairs in display order
    pub fn entries(&self) -> [(&'static str, u64); 5] {
        [
            ("Clear", self.clear),
            ("Clouds", self.clouds),
            ("Rain", self.rain),
            ("Snow", self.snow),
            ("Other", self.other),
        ]
    }

    pub fn total(&self) -> u64 {
        self.clear + self.clouds + self.rain + self.snow + self.other
    }
}

/// Counts samples per condition group; anything unrecognised is "Other"
pub fn condition_distribution(samples: &[ForecastSample]) -> ConditionCounts {
    let mut counts = ConditionCounts::default();
    for sample in samples {
        match sample.condition.as_str() {
            "Clear" => counts.clear += 1,
            "Clouds" => counts.clouds += 1,
            "Rain" => counts.rain += 1,
            "Snow" => counts.snow += 1,
            _ => counts.other += 1,
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    /// 2024-07-15T00:00:00Z
    const JUL_15: i64 = 1_721_001_600;
    const HOUR: i64 = 3600;
    const DAY: i64 = 24 * HOUR;

    fn sample(timestamp: i64, temperature: f64, condition: &str) -> ForecastSample {
        ForecastSample {
            timestamp,
            temperature,
            condition: condition.to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(aggregate_in(&[], &Utc).is_empty());
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_average_of_single_day() {
        let samples = vec![
            sample(JUL_15, 10.0, "Clear"),
            sample(JUL_15 + 3 * HOUR, 20.0, "Clear"),
            sample(JUL_15 + 6 * HOUR, 30.0, "Clear"),
        ];

        let days = aggregate_in(&samples, &Utc);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].calendar_date, date(2024, 7, 15));
        assert_eq!(days[0].average_temperature, 20.0);
    }

    #[test]
    fn test_average_rounds_half_away_from_zero() {
        let samples = vec![
            sample(JUL_15, 10.1, "Clouds"),
            sample(JUL_15 + 3 * HOUR, 10.15, "Clouds"),
        ];

        let days = aggregate_in(&samples, &Utc);

        assert_eq!(days[0].average_temperature, 10.13);
    }

    #[test]
    fn test_negative_average_rounds_away_from_zero() {
        let samples = vec![
            sample(JUL_15, -10.1, "Snow"),
            sample(JUL_15 + 3 * HOUR, -10.15, "Snow"),
        ];

        let days = aggregate_in(&samples, &Utc);

        assert_eq!(days[0].average_temperature, -10.13);
    }

    #[test]
    fn test_single_sample_day_keeps_its_temperature() {
        let days = aggregate_in(&[sample(JUL_15, 12.34, "Rain")], &Utc);
        assert_eq!(days[0].average_temperature, 12.34);
        assert_eq!(days[0].representative_condition, "Rain");
    }

    #[test]
    fn test_one_summary_per_day_in_first_seen_order() {
        let samples = vec![
            sample(JUL_15 + 21 * HOUR, 14.0, "Clear"),
            sample(JUL_15 + DAY, 12.0, "Clouds"),
            sample(JUL_15 + DAY + 3 * HOUR, 16.0, "Clouds"),
            sample(JUL_15 + 2 * DAY, 18.0, "Rain"),
        ];

        let days = aggregate_in(&samples, &Utc);

        let dates: Vec<NaiveDate> = days.iter().map(|d| d.calendar_date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 7, 15), date(2024, 7, 16), date(2024, 7, 17)]
        );
        assert_eq!(days[1].average_temperature, 14.0);
    }

    #[test]
    fn test_order_follows_first_appearance_not_date() {
        // Unsorted input: the 17th appears before the 15th
        let samples = vec![
            sample(JUL_15 + 2 * DAY, 18.0, "Rain"),
            sample(JUL_15, 10.0, "Clear"),
            sample(JUL_15 + 2 * DAY + 3 * HOUR, 20.0, "Clear"),
        ];

        let days = aggregate_in(&samples, &Utc);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].calendar_date, date(2024, 7, 17));
        assert_eq!(days[0].average_temperature, 19.0);
        assert_eq!(days[1].calendar_date, date(2024, 7, 15));
    }

    #[test]
    fn test_representative_condition_is_first_not_most_frequent() {
        let samples = vec![
            sample(JUL_15, 10.0, "Clear"),
            sample(JUL_15 + 3 * HOUR, 11.0, "Rain"),
            sample(JUL_15 + 6 * HOUR, 12.0, "Rain"),
            sample(JUL_15 + 9 * HOUR, 13.0, "Rain"),
        ];

        let days = aggregate_in(&samples, &Utc);

        assert_eq!(days[0].representative_condition, "Clear");
    }

    #[test]
    fn test_grouping_uses_time_zone_of_projection() {
        // 22:00Z on the 15th is already the 16th at UTC+3
        let samples = vec![
            sample(JUL_15 + 12 * HOUR, 10.0, "Clear"),
            sample(JUL_15 + 22 * HOUR, 20.0, "Clouds"),
        ];

        let utc_days = aggregate_in(&samples, &Utc);
        assert_eq!(utc_days.len(), 1);

        let plus_three = FixedOffset::east_opt(3 * 3600).unwrap();
        let shifted = aggregate_in(&samples, &plus_three);
        assert_eq!(shifted.len(), 2);
        assert_eq!(shifted[1].calendar_date, date(2024, 7, 16));
        assert_eq!(shifted[1].representative_condition, "Clouds");
    }

    #[test]
    fn test_unrepresentable_timestamp_is_skipped() {
        let samples = vec![sample(i64::MAX, 10.0, "Clear"), sample(JUL_15, 20.0, "Clear")];
        let days = aggregate_in(&samples, &Utc);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].average_temperature, 20.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(20.0 / 3.0), 6.67);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
    }

    #[test]
    fn test_condition_distribution_buckets() {
        let samples = vec![
            sample(JUL_15, 10.0, "Clear"),
            sample(JUL_15, 10.0, "Clear"),
            sample(JUL_15, 10.0, "Clouds"),
            sample(JUL_15, 10.0, "Rain"),
            sample(JUL_15, 10.0, "Snow"),
            sample(JUL_15, 10.0, "Drizzle"),
            sample(JUL_15, 10.0, "Mist"),
        ];

        let counts = condition_distribution(&samples);

        assert_eq!(
            counts,
            ConditionCounts {
                clear: 2,
                clouds: 1,
                rain: 1,
                snow: 1,
                other: 2,
            }
        );
        assert_eq!(counts.total(), 7);
        assert_eq!(counts.entries()[0], ("Clear", 2));
        assert_eq!(counts.entries()[4], ("Other", 2));
    }

    #[test]
    fn test_condition_distribution_empty() {
        assert_eq!(condition_distribution(&[]), ConditionCounts::default());
    }
}
