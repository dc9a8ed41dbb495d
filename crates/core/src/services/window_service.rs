use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::errors::CoreError;
use crate::models::series::Timestamped;
use crate::models::window::{ResolvedWindow, Window, WindowKind};

/// Label format for anchored windows, e.g. "12/23 - 01/24".
const ANCHORED_LABEL_FORMAT: &str = "%m/%y";

/// Index of the most recent point not after `instant`.
///
/// `points` must be sorted ascending. Never interpolates; returns `None` when
/// every point lies after `instant`.
pub fn at_or_before<T: Timestamped>(points: &[T], instant: NaiveDateTime) -> Option<usize> {
    points
        .partition_point(|p| p.timestamp() <= instant)
        .checked_sub(1)
}

/// Move `(year, month)` by `delta` months, rolling the year explicitly.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let zero_based = year * 12 + month as i32 - 1 + delta;
    (zero_based.div_euclid(12), zero_based.rem_euclid(12) as u32 + 1)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Midnight of the anchor day in the given month. Anchor days past the end of
/// the month clamp to its last day.
pub fn anchor_instant(year: i32, month: u32, anchor_day: u32) -> Result<NaiveDateTime, CoreError> {
    let day = anchor_day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CoreError::Config(format!("No anchor date for {year}-{month:02}-{day:02}")))
}

/// Resolves calendar-anchored and lookback windows over a timestamped series.
pub struct WindowService;

impl WindowService {
    pub fn new() -> Self {
        Self
    }

    /// `(year, month)` whose anchor day opens the window containing `now`:
    /// this month if today is on/after the anchor, otherwise the previous month.
    pub fn current_anchor_month(&self, now: NaiveDateTime, anchor_day: u32) -> (i32, u32) {
        let effective_anchor = anchor_day.clamp(1, days_in_month(now.year(), now.month()));
        if now.day() >= effective_anchor {
            (now.year(), now.month())
        } else {
            shift_month(now.year(), now.month(), -1)
        }
    }

    /// Start of the current anchored window.
    pub fn current_window_start(
        &self,
        now: NaiveDateTime,
        anchor_day: u32,
    ) -> Result<NaiveDateTime, CoreError> {
        let (year, month) = self.current_anchor_month(now, anchor_day);
        anchor_instant(year, month, anchor_day)
    }

    /// The in-progress window: latest anchor day through `now`.
    pub fn current_window(&self, now: NaiveDateTime, anchor_day: u32) -> Result<Window, CoreError> {
        let start = self.current_window_start(now, anchor_day)?;
        Window::new(start, now, "current", WindowKind::Anchored)
    }

    /// Completed anchored windows before the current one, most recent first.
    /// Each spans anchor(M-1) to anchor(M).
    pub fn anchored_history(
        &self,
        now: NaiveDateTime,
        anchor_day: u32,
        count: u32,
    ) -> Result<Vec<Window>, CoreError> {
        let (year, month) = self.current_anchor_month(now, anchor_day);
        let mut windows = Vec::with_capacity(count as usize);

        for i in 0..count as i32 {
            let (end_y, end_m) = shift_month(year, month, -i);
            let (start_y, start_m) = shift_month(year, month, -i - 1);
            let start = anchor_instant(start_y, start_m, anchor_day)?;
            let end = anchor_instant(end_y, end_m, anchor_day)?;
            let label = format!(
                "{} - {}",
                start.format(ANCHORED_LABEL_FORMAT),
                end.format(ANCHORED_LABEL_FORMAT)
            );
            windows.push(Window::new(start, end, label, WindowKind::Anchored)?);
        }

        Ok(windows)
    }

    /// Fixed-duration window ending at `now`, labelled like "7d".
    pub fn lookback_window(&self, now: NaiveDateTime, days: u32) -> Result<Window, CoreError> {
        let start = now - Duration::days(i64::from(days));
        Window::new(start, now, format!("{days}d"), WindowKind::Lookback)
    }

    /// Map a window onto `points` (sorted ascending).
    ///
    /// - Anchored: both boundaries resolve at-or-before; a boundary with nothing
    ///   at or before it drops the window.
    /// - Lookback: ends at the last point; start falls back to the first point
    ///   (flagged `partial`) when the series does not reach back far enough.
    ///
    /// Start and end resolving to the same point is an `EmptyWindow`.
    pub fn resolve<T: Timestamped>(
        &self,
        points: &[T],
        window: &Window,
    ) -> Result<ResolvedWindow, CoreError> {
        let empty = |reason: &str| CoreError::EmptyWindow {
            label: window.label.clone(),
            reason: reason.to_string(),
        };

        let (start_index, end_index, partial) = match window.kind {
            WindowKind::Anchored => {
                let start = at_or_before(points, window.start)
                    .ok_or_else(|| empty("no snapshot at or before window start"))?;
                let end = at_or_before(points, window.end)
                    .ok_or_else(|| empty("no snapshot at or before window end"))?;
                (start, end, false)
            }
            WindowKind::Lookback => {
                let end = points
                    .len()
                    .checked_sub(1)
                    .ok_or_else(|| empty("series is empty"))?;
                match at_or_before(points, window.start) {
                    Some(start) => (start, end, false),
                    None => (0, end, true),
                }
            }
        };

        if start_index >= end_index {
            return Err(empty("start and end resolve to the same snapshot"));
        }

        Ok(ResolvedWindow {
            window: window.clone(),
            start_index,
            end_index,
            start_at: points[start_index].timestamp(),
            end_at: points[end_index].timestamp(),
            partial,
        })
    }
}

impl Default for WindowService {
    fn default() -> Self {
        Self::new()
    }
}
