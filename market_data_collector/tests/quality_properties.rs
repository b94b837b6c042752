use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use market_data_collector::models::{bar::Bar, bar_series::BarSeries, timeframe::TimeFrame};
use market_data_collector::validation::DatasetValidator;
use proptest::prelude::*;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap()
}

fn series(bars: Vec<Bar>) -> BarSeries {
    BarSeries::new("GOLD", TimeFrame::minutes(15).unwrap(), bars)
}

/// Bars drawn from a small value pool so duplicates actually occur.
fn arb_bars(max_len: usize) -> impl Strategy<Value = Vec<Bar>> {
    proptest::collection::vec((0i64..6, 0u8..4, 0u64..3), 0..max_len).prop_map(|rows| {
        rows.into_iter()
            .map(|(slot, price, volume)| {
                let p = 100.0 + f64::from(price);
                Bar::new(
                    start() + TimeDelta::minutes(15 * slot),
                    p,
                    p + 0.5,
                    p - 0.5,
                    p,
                    volume,
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn total_count_matches_length(bars in arb_bars(40)) {
        let n = bars.len();
        let report = DatasetValidator::default()
            .validate(&series(bars), TimeDelta::minutes(15))
            .unwrap();
        prop_assert_eq!(report.total_count, n);
        prop_assert_eq!(report.missing_values, 0);
    }

    #[test]
    fn duplicates_ignore_row_order(bars in arb_bars(40), shift in 0usize..40) {
        let validator = DatasetValidator::default();
        let interval = TimeDelta::minutes(15);
        let forward = validator.validate(&series(bars.clone()), interval).unwrap();

        let mut reversed = bars.clone();
        reversed.reverse();
        let mut rotated = bars;
        if !rotated.is_empty() {
            let k = shift % rotated.len();
            rotated.rotate_left(k);
        }

        prop_assert_eq!(
            validator.validate(&series(reversed), interval).unwrap().duplicates,
            forward.duplicates
        );
        prop_assert_eq!(
            validator.validate(&series(rotated), interval).unwrap().duplicates,
            forward.duplicates
        );
    }

    #[test]
    fn constant_column_has_no_outliers(value in -1.0e6f64..1.0e6, n in 1usize..200) {
        let bars = (0..n)
            .map(|i| Bar::new(start() + TimeDelta::minutes(15 * i as i64), value, value, value, value, 1))
            .collect();
        let report = DatasetValidator::default()
            .validate(&series(bars), TimeDelta::minutes(15))
            .unwrap();
        prop_assert_eq!(report.total_outliers(), 0);
    }

    #[test]
    fn evenly_spaced_bars_are_regular(minutes in 1i64..=1440, n in 0usize..100) {
        let interval = TimeDelta::minutes(minutes);
        let bars = (0..n)
            .map(|i| Bar::new(start() + interval * i as i32, 1.0, 2.0, 0.5, 1.5, 10))
            .collect();
        let report = DatasetValidator::default().validate(&series(bars), interval).unwrap();
        prop_assert_eq!(report.irregular_intervals, 0);
    }

    #[test]
    fn single_bar_is_never_irregular(minutes in 1i64..10_000, offset in 0i64..10_000) {
        let bar = Bar::new(start() + TimeDelta::seconds(offset), 1.0, 1.0, 1.0, 1.0, 0);
        let report = DatasetValidator::default()
            .validate(&series(vec![bar]), TimeDelta::minutes(minutes))
            .unwrap();
        prop_assert_eq!(report.irregular_intervals, 0);
        prop_assert_eq!(report.duplicates, 0);
    }
}
