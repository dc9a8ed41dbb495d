// ═══════════════════════════════════════════════════════════════════
// Analytics Tests: ValuationService, WindowService, ReturnsService,
// BenchmarkService, IncomeService
// ═══════════════════════════════════════════════════════════════════

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

use portfolio_tracker_core::errors::CoreError;
use portfolio_tracker_core::models::diagnostic::Diagnostic;
use portfolio_tracker_core::models::holdings::Holdings;
use portfolio_tracker_core::models::report::{BenchmarkStatus, PerformanceRecord};
use portfolio_tracker_core::models::series::{
    BenchmarkPoint, BenchmarkSeries, PortfolioSeries, ValuePoint,
};
use portfolio_tracker_core::models::snapshot::PriceSnapshot;
use portfolio_tracker_core::models::window::{Window, WindowKind};
use portfolio_tracker_core::services::benchmark_service::BenchmarkService;
use portfolio_tracker_core::services::income_service::IncomeService;
use portfolio_tracker_core::services::returns_service::{
    drawdown_series, percent_change, running_max, ReturnsService,
};
use portfolio_tracker_core::services::valuation_service::ValuationService;
use portfolio_tracker_core::services::window_service::{
    anchor_instant, at_or_before, shift_month, WindowService,
};

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn day(d: u32) -> NaiveDateTime {
    dt(2024, 1, d, 12, 0)
}

fn snap(ts: NaiveDateTime, prices: &[(&str, f64)]) -> PriceSnapshot {
    PriceSnapshot::from_pairs(ts, prices.iter().map(|&(a, p)| (a, p)))
}

fn series(values: &[f64]) -> PortfolioSeries {
    PortfolioSeries::new(
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| ValuePoint {
                timestamp: day(i as u32 + 1),
                value,
            })
            .collect(),
    )
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ═══════════════════════════════════════════════════════════════════
// ValuationService
// ═══════════════════════════════════════════════════════════════════

mod valuation {
    use super::*;

    #[test]
    fn values_snapshot_with_all_prices() {
        let holdings = Holdings::from_pairs([("A", 2.0), ("B", 1.0)]).unwrap();
        let v = ValuationService::new().value_snapshot(&snap(day(1), &[("A", 10.0), ("B", 20.0)]), &holdings);
        assert_eq!(v.total, Some(40.0));
        assert!(v.missing.is_empty());
    }

    #[test]
    fn missing_asset_is_skipped_not_zeroed() {
        let holdings = Holdings::from_pairs([("A", 2.0), ("B", 1.0)]).unwrap();
        let v = ValuationService::new().value_snapshot(&snap(day(1), &[("A", 10.0)]), &holdings);
        assert_eq!(v.total, Some(20.0));
        assert_eq!(v.missing, vec!["B".to_string()]);
    }

    #[test]
    fn unheld_prices_are_ignored() {
        let holdings = Holdings::from_pairs([("A", 1.0)]).unwrap();
        let v = ValuationService::new().value_snapshot(&snap(day(1), &[("A", 10.0), ("SPY", 470.0)]), &holdings);
        assert_eq!(v.total, Some(10.0));
    }

    #[test]
    fn no_held_asset_priced_gives_none() {
        let holdings = Holdings::from_pairs([("A", 1.0)]).unwrap();
        let v = ValuationService::new().value_snapshot(&snap(day(1), &[("SPY", 470.0)]), &holdings);
        assert_eq!(v.total, None);
    }

    #[test]
    fn forward_fill_uses_preceding_observation() {
        let snaps = vec![
            snap(day(1), &[("A", 10.0)]),
            snap(day(2), &[("B", 5.0)]),
            snap(day(3), &[("A", 12.0)]),
        ];
        let filled = ValuationService::new().forward_fill(&snaps, ["A", "B"]);

        assert_eq!(filled[0].price("A"), Some(10.0));
        assert_eq!(filled[0].price("B"), None, "never fills before first observation");
        assert_eq!(filled[1].price("A"), Some(10.0));
        assert_eq!(filled[1].price("B"), Some(5.0));
        assert_eq!(filled[2].price("A"), Some(12.0));
        assert_eq!(filled[2].price("B"), Some(5.0));
    }

    #[test]
    fn forward_fill_leaves_input_untouched() {
        let snaps = vec![snap(day(1), &[("A", 10.0)]), snap(day(2), &[])];
        let _ = ValuationService::new().forward_fill(&snaps, ["A"]);
        assert_eq!(snaps[1].price("A"), None);
    }

    #[test]
    fn series_with_forward_fill() {
        let holdings = Holdings::from_pairs([("A", 1.0), ("B", 2.0)]).unwrap();
        let snaps = vec![
            snap(day(1), &[("A", 10.0), ("B", 5.0)]),
            snap(day(2), &[("A", 11.0)]),
        ];
        let v = ValuationService::new().value_series(&snaps, &holdings, true);
        assert_eq!(v.series.values(), vec![20.0, 21.0]);
        assert!(v.gaps.is_empty());
    }

    #[test]
    fn series_without_forward_fill_records_gaps() {
        let holdings = Holdings::from_pairs([("A", 1.0), ("B", 2.0)]).unwrap();
        let snaps = vec![
            snap(day(1), &[("A", 10.0), ("B", 5.0)]),
            snap(day(2), &[("A", 11.0)]),
        ];
        let v = ValuationService::new().value_series(&snaps, &holdings, false);
        assert_eq!(v.series.values(), vec![20.0, 11.0]);
        assert_eq!(
            v.gaps,
            vec![Diagnostic::MissingAssetPrice {
                asset: "B".into(),
                timestamp: day(2),
            }]
        );
    }

    #[test]
    fn snapshot_without_holdings_produces_no_point() {
        let holdings = Holdings::from_pairs([("A", 1.0)]).unwrap();
        let snaps = vec![snap(day(1), &[("SPY", 470.0)]), snap(day(2), &[("A", 10.0)])];
        let v = ValuationService::new().value_series(&snaps, &holdings, true);
        assert_eq!(v.series.len(), 1);
        assert_eq!(v.series.points[0].timestamp, day(2));
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let holdings = Holdings::from_pairs([("A", 1.0)]).unwrap();
        let snaps = vec![snap(day(3), &[("A", 3.0)]), snap(day(1), &[("A", 1.0)])];
        let v = ValuationService::new().value_series(&snaps, &holdings, true);
        assert_eq!(v.series.values(), vec![1.0, 3.0]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// WindowService
// ═══════════════════════════════════════════════════════════════════

mod windows {
    use super::*;

    #[test]
    fn shift_month_rolls_years() {
        assert_eq!(shift_month(2024, 1, -1), (2023, 12));
        assert_eq!(shift_month(2023, 12, 1), (2024, 1));
        assert_eq!(shift_month(2024, 1, -13), (2022, 12));
        assert_eq!(shift_month(2024, 6, 0), (2024, 6));
    }

    #[test]
    fn anchor_day_clamps_to_month_end() {
        assert_eq!(anchor_instant(2024, 2, 31).unwrap(), dt(2024, 2, 29, 0, 0));
        assert_eq!(anchor_instant(2023, 2, 31).unwrap(), dt(2023, 2, 28, 0, 0));
        assert_eq!(anchor_instant(2024, 4, 31).unwrap(), dt(2024, 4, 30, 0, 0));
    }

    #[test]
    fn at_or_before_picks_latest_not_after() {
        let points = vec![
            ValuePoint { timestamp: day(10), value: 1.0 },
            ValuePoint { timestamp: day(12), value: 2.0 },
            ValuePoint { timestamp: day(15), value: 3.0 },
        ];
        assert_eq!(at_or_before(&points, day(11)), Some(0));
        assert_eq!(at_or_before(&points, day(12)), Some(1));
        assert_eq!(at_or_before(&points, day(20)), Some(2));
        assert_eq!(at_or_before(&points, day(9)), None);
    }

    #[test]
    fn at_or_before_empty() {
        let points: Vec<ValuePoint> = Vec::new();
        assert_eq!(at_or_before(&points, day(1)), None);
    }

    #[test]
    fn current_window_after_anchor() {
        let w = WindowService::new().current_window(dt(2024, 1, 15, 9, 0), 10).unwrap();
        assert_eq!(w.start, dt(2024, 1, 10, 0, 0));
        assert_eq!(w.end, dt(2024, 1, 15, 9, 0));
        assert_eq!(w.kind, WindowKind::Anchored);
    }

    #[test]
    fn current_window_before_anchor_uses_previous_month() {
        let w = WindowService::new().current_window(dt(2024, 1, 5, 9, 0), 10).unwrap();
        assert_eq!(w.start, dt(2023, 12, 10, 0, 0));
    }

    #[test]
    fn current_window_on_anchor_day() {
        let w = WindowService::new().current_window(dt(2024, 1, 10, 9, 0), 10).unwrap();
        assert_eq!(w.start, dt(2024, 1, 10, 0, 0));
    }

    #[test]
    fn anchored_history_walks_back() {
        let windows = WindowService::new()
            .anchored_history(dt(2024, 1, 15, 9, 0), 10, 3)
            .unwrap();
        assert_eq!(windows.len(), 3);

        assert_eq!(windows[0].start, dt(2023, 12, 10, 0, 0));
        assert_eq!(windows[0].end, dt(2024, 1, 10, 0, 0));
        assert_eq!(windows[0].label, "12/23 - 01/24");

        assert_eq!(windows[1].start, dt(2023, 11, 10, 0, 0));
        assert_eq!(windows[1].end, dt(2023, 12, 10, 0, 0));

        assert_eq!(windows[2].label, "10/23 - 11/23");
    }

    #[test]
    fn anchored_history_zero_count() {
        let windows = WindowService::new().anchored_history(dt(2024, 1, 15, 9, 0), 10, 0).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn lookback_window_label_and_bounds() {
        let now = dt(2024, 1, 15, 9, 0);
        let w = WindowService::new().lookback_window(now, 7).unwrap();
        assert_eq!(w.label, "7d");
        assert_eq!(w.start, dt(2024, 1, 8, 9, 0));
        assert_eq!(w.end, now);
        assert_eq!(w.kind, WindowKind::Lookback);
    }

    #[test]
    fn resolve_anchored_window() {
        let s = series(&[100.0, 110.0, 120.0, 130.0]); // days 1..=4 at noon
        let w = Window::new(dt(2024, 1, 2, 0, 0), dt(2024, 1, 4, 0, 0), "w", WindowKind::Anchored).unwrap();
        let r = WindowService::new().resolve(&s.points, &w).unwrap();
        assert_eq!(r.start_index, 0);
        assert_eq!(r.end_index, 2);
        assert_eq!(r.start_at, day(1));
        assert_eq!(r.end_at, day(3));
        assert!(!r.partial);
    }

    #[test]
    fn resolve_anchored_without_point_before_start() {
        let s = series(&[100.0, 110.0]);
        let w = Window::new(dt(2023, 12, 10, 0, 0), dt(2024, 1, 10, 0, 0), "w", WindowKind::Anchored).unwrap();
        let err = WindowService::new().resolve(&s.points, &w).unwrap_err();
        assert!(matches!(err, CoreError::EmptyWindow { ref label, .. } if label == "w"));
    }

    #[test]
    fn resolve_degenerate_window() {
        let s = series(&[100.0, 110.0, 120.0]);
        // Both boundaries fall between day 1 and day 2 noon.
        let w = Window::new(dt(2024, 1, 1, 13, 0), dt(2024, 1, 2, 11, 0), "w", WindowKind::Anchored).unwrap();
        assert!(matches!(
            WindowService::new().resolve(&s.points, &w),
            Err(CoreError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn resolve_lookback_ends_at_last_point() {
        let s = series(&[100.0, 110.0, 120.0, 130.0]);
        let w = Window::new(dt(2024, 1, 2, 12, 0), dt(2024, 1, 30, 0, 0), "1d", WindowKind::Lookback).unwrap();
        let r = WindowService::new().resolve(&s.points, &w).unwrap();
        assert_eq!(r.start_index, 1);
        assert_eq!(r.end_index, 3);
        assert!(!r.partial);
    }

    #[test]
    fn resolve_lookback_falls_back_to_first_point() {
        let s = series(&[100.0, 110.0]);
        let w = Window::new(dt(2023, 12, 1, 0, 0), dt(2024, 1, 5, 0, 0), "30d", WindowKind::Lookback).unwrap();
        let r = WindowService::new().resolve(&s.points, &w).unwrap();
        assert_eq!(r.start_index, 0);
        assert_eq!(r.end_index, 1);
        assert!(r.partial);
    }

    #[test]
    fn resolve_lookback_single_point_is_empty() {
        let s = series(&[100.0]);
        let w = Window::new(dt(2023, 12, 1, 0, 0), dt(2024, 1, 5, 0, 0), "7d", WindowKind::Lookback).unwrap();
        assert!(matches!(
            WindowService::new().resolve(&s.points, &w),
            Err(CoreError::EmptyWindow { .. })
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// ReturnsService
// ═══════════════════════════════════════════════════════════════════

mod returns {
    use super::*;

    #[test]
    fn percent_change_basic() {
        assert!(approx(percent_change(100.0, 110.0, "x").unwrap(), 10.0));
        assert!(approx(percent_change(100.0, 90.0, "x").unwrap(), -10.0));
    }

    #[test]
    fn percent_change_zero_base_is_undefined() {
        let err = percent_change(0.0, 10.0, "asset X").unwrap_err();
        assert!(matches!(err, CoreError::UndefinedReturn { ref context } if context == "asset X"));
    }

    #[test]
    fn cumulative_return_cases() {
        let svc = ReturnsService::new();
        assert!(approx(svc.cumulative_return(&series(&[100.0, 100.0])).unwrap(), 0.0));
        assert!(approx(svc.cumulative_return(&series(&[100.0, 200.0])).unwrap(), 100.0));
        assert!(approx(svc.cumulative_return(&series(&[100.0, 50.0])).unwrap(), -50.0));
    }

    #[test]
    fn cumulative_return_zero_first_value() {
        let err = ReturnsService::new().cumulative_return(&series(&[0.0, 10.0])).unwrap_err();
        assert!(matches!(err, CoreError::UndefinedReturn { .. }));
    }

    #[test]
    fn cumulative_return_empty_series() {
        let err = ReturnsService::new().cumulative_return(&series(&[])).unwrap_err();
        assert!(matches!(err, CoreError::NoSnapshots));
    }

    #[test]
    fn running_max_never_decreases() {
        let m = running_max(&[100.0, 120.0, 90.0, 110.0, 130.0, 50.0]);
        assert_eq!(m, vec![100.0, 120.0, 120.0, 120.0, 130.0, 130.0]);
        assert!(m.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn drawdown_reference_example() {
        let values = [100.0, 120.0, 90.0, 110.0];
        assert_eq!(running_max(&values), vec![100.0, 120.0, 120.0, 120.0]);

        let d = drawdown_series(&values);
        assert!(approx(d[0], 0.0));
        assert!(approx(d[1], 0.0));
        assert!(approx(d[2], -0.25));
        assert!(approx(d[3] * 100.0, -8.333333333333332));

        let summary = ReturnsService::new().max_drawdown(&series(&values)).unwrap();
        assert!(approx(summary.max_drawdown_pct, -25.0));
        assert_eq!(summary.peak_at, day(2));
        assert_eq!(summary.peak_value, 120.0);
        assert_eq!(summary.trough_at, day(3));
        assert_eq!(summary.trough_value, 90.0);
    }

    #[test]
    fn drawdown_zero_peak_is_zero() {
        assert_eq!(drawdown_series(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn drawdown_monotonic_rise_is_zero() {
        let summary = ReturnsService::new().max_drawdown(&series(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(summary.max_drawdown_pct, 0.0);
    }

    #[test]
    fn drawdown_stays_within_bounds() {
        let summary = ReturnsService::new()
            .max_drawdown(&series(&[50.0, 10.0, 0.0, 5.0]))
            .unwrap();
        assert!((-100.0..=0.0).contains(&summary.max_drawdown_pct));
        assert!(approx(summary.max_drawdown_pct, -100.0));
    }

    #[test]
    fn drawdown_empty_series() {
        assert!(ReturnsService::new().max_drawdown(&series(&[])).is_none());
    }

    #[test]
    fn window_performance_return_and_gain() {
        let s = series(&[100.0, 110.0, 125.0]);
        let w = Window::new(day(1), day(3), "w", WindowKind::Anchored).unwrap();
        let resolved = WindowService::new().resolve(&s.points, &w).unwrap();
        let record = ReturnsService::new().window_performance(&s, &resolved).unwrap();
        assert!(approx(record.return_pct, 25.0));
        assert!(approx(record.gain, 25.0));
        assert_eq!(record.start_at, day(1));
        assert_eq!(record.end_at, day(3));
    }

    #[test]
    fn window_performance_zero_start_undefined() {
        let s = series(&[0.0, 110.0]);
        let w = Window::new(day(1), day(2), "w", WindowKind::Anchored).unwrap();
        let resolved = WindowService::new().resolve(&s.points, &w).unwrap();
        let err = ReturnsService::new().window_performance(&s, &resolved).unwrap_err();
        assert!(matches!(err, CoreError::UndefinedReturn { .. }));
    }

    #[test]
    fn ranking_orders_and_excludes_single_observation() {
        let holdings = Holdings::from_pairs([("A", 1.0), ("B", 1.0), ("C", 1.0)]).unwrap();
        let snaps = vec![
            snap(day(1), &[("A", 10.0), ("C", 10.0)]),
            snap(day(2), &[("A", 15.0), ("B", 7.0)]),
            snap(day(3), &[("A", 20.0), ("C", 5.0)]),
        ];
        let outcome = ReturnsService::new().rank_assets(&snaps, &holdings);
        let assets: Vec<&str> = outcome.ranking.ranked.iter().map(|p| p.asset.as_str()).collect();

        assert_eq!(assets, vec!["A", "C"]);
        assert_eq!(outcome.ranking.best().unwrap().asset, "A");
        assert!(approx(outcome.ranking.best().unwrap().return_pct, 100.0));
        assert_eq!(outcome.ranking.worst().unwrap().asset, "C");
        assert!(approx(outcome.ranking.worst().unwrap().return_pct, -50.0));
        assert_eq!(outcome.ranking.best().unwrap().observations, 3);
        assert!(outcome.excluded.is_empty());
    }

    #[test]
    fn ranking_zero_first_price_flagged() {
        let holdings = Holdings::from_pairs([("A", 1.0), ("Z", 1.0)]).unwrap();
        let snaps = vec![
            snap(day(1), &[("A", 10.0), ("Z", 0.0)]),
            snap(day(2), &[("A", 11.0), ("Z", 3.0)]),
        ];
        let outcome = ReturnsService::new().rank_assets(&snaps, &holdings);
        assert_eq!(outcome.ranking.ranked.len(), 1);
        assert_eq!(
            outcome.excluded,
            vec![Diagnostic::UndefinedReturn {
                context: "asset Z".into()
            }]
        );
    }

    #[test]
    fn ranking_ties_break_by_name() {
        let holdings = Holdings::from_pairs([("B", 1.0), ("A", 1.0)]).unwrap();
        let snaps = vec![
            snap(day(1), &[("A", 10.0), ("B", 20.0)]),
            snap(day(2), &[("A", 20.0), ("B", 40.0)]),
        ];
        let outcome = ReturnsService::new().rank_assets(&snaps, &holdings);
        assert_eq!(outcome.ranking.ranked[0].asset, "A");
        assert_eq!(outcome.ranking.ranked[1].asset, "B");
    }
}

// ═══════════════════════════════════════════════════════════════════
// BenchmarkService
// ═══════════════════════════════════════════════════════════════════

mod benchmark {
    use super::*;

    fn record(return_pct: f64) -> PerformanceRecord {
        PerformanceRecord {
            window: Window::new(day(1), day(3), "w", WindowKind::Anchored).unwrap(),
            start_at: day(1),
            end_at: day(3),
            start_value: 100.0,
            end_value: 100.0 + return_pct,
            return_pct,
            gain: return_pct,
            partial: false,
        }
    }

    fn spy(points: &[(NaiveDateTime, f64)]) -> BenchmarkSeries {
        BenchmarkSeries::new(
            "SPY",
            points
                .iter()
                .map(|&(timestamp, price)| BenchmarkPoint { timestamp, price })
                .collect(),
        )
    }

    #[test]
    fn aligned_comparison() {
        let bench = spy(&[(dt(2024, 1, 1, 0, 0), 400.0), (dt(2024, 1, 3, 0, 0), 440.0)]);
        let c = BenchmarkService::new().compare(&record(20.0), Some(&bench), "SPY");
        assert!(approx(c.benchmark_return_pct, 10.0));
        assert!(approx(c.relative_pct, 10.0));
        assert_eq!(c.status, BenchmarkStatus::Available);
    }

    #[test]
    fn benchmark_uses_at_or_before_alignment() {
        // Day 3 noon resolves to day 2's close, not day 4's.
        let bench = spy(&[
            (dt(2024, 1, 1, 0, 0), 100.0),
            (dt(2024, 1, 2, 0, 0), 105.0),
            (dt(2024, 1, 4, 0, 0), 200.0),
        ]);
        let c = BenchmarkService::new().compare(&record(0.0), Some(&bench), "SPY");
        assert!(approx(c.benchmark_return_pct, 5.0));
    }

    #[test]
    fn unavailable_series_defaults_to_zero() {
        let c = BenchmarkService::new().compare(&record(7.5), None, "SPY");
        assert_eq!(c.benchmark_return_pct, 0.0);
        assert!(approx(c.relative_pct, c.portfolio_return_pct));
        assert!(c.is_fallback());
    }

    #[test]
    fn series_starting_after_window_start() {
        let bench = spy(&[(dt(2024, 1, 2, 0, 0), 400.0), (dt(2024, 1, 3, 0, 0), 410.0)]);
        let c = BenchmarkService::new().compare(&record(3.0), Some(&bench), "SPY");
        assert!(c.is_fallback());
        assert!(approx(c.relative_pct, 3.0));
    }

    #[test]
    fn single_point_inside_window() {
        let bench = spy(&[(dt(2024, 1, 1, 0, 0), 400.0)]);
        let c = BenchmarkService::new().compare(&record(3.0), Some(&bench), "SPY");
        assert!(matches!(c.status, BenchmarkStatus::Unavailable { .. }));
    }

    #[test]
    fn zero_benchmark_base() {
        let bench = spy(&[(dt(2024, 1, 1, 0, 0), 0.0), (dt(2024, 1, 3, 0, 0), 10.0)]);
        let c = BenchmarkService::new().compare(&record(3.0), Some(&bench), "SPY");
        assert!(c.is_fallback());
    }

    #[test]
    fn real_zero_return_is_not_a_fallback() {
        let bench = spy(&[(dt(2024, 1, 1, 0, 0), 400.0), (dt(2024, 1, 3, 0, 0), 400.0)]);
        let c = BenchmarkService::new().compare(&record(3.0), Some(&bench), "SPY");
        assert_eq!(c.benchmark_return_pct, 0.0);
        assert!(!c.is_fallback());
    }
}

// ═══════════════════════════════════════════════════════════════════
// IncomeService
// ═══════════════════════════════════════════════════════════════════

mod income {
    use super::*;

    #[test]
    fn projects_annual_and_monthly() {
        let holdings = Holdings::from_pairs([("A", 10.0), ("B", 5.0)]).unwrap();
        let rates = HashMap::from([("A".to_string(), 2.0)]);
        let est = IncomeService::new().estimate(&holdings, &rates);
        assert!(approx(est.annual, 20.0));
        assert!(approx(est.monthly, 20.0 / 12.0));
        assert_eq!(est.per_asset.get("A"), Some(&20.0));
        assert_eq!(est.per_asset.get("B"), Some(&0.0));
    }

    #[test]
    fn no_rates_is_zero() {
        let holdings = Holdings::from_pairs([("A", 10.0)]).unwrap();
        let est = IncomeService::new().estimate(&holdings, &HashMap::new());
        assert_eq!(est.annual, 0.0);
        assert_eq!(est.monthly, 0.0);
    }

    #[test]
    fn non_finite_rate_counts_as_zero() {
        let holdings = Holdings::from_pairs([("A", 10.0)]).unwrap();
        let rates = HashMap::from([("A".to_string(), f64::NAN)]);
        assert_eq!(IncomeService::new().estimate(&holdings, &rates).annual, 0.0);
    }
}
