use crate::domain::models::{Event, FreeBlock, TimeWindow};
use crate::domain::policy::{AvailabilityPolicy, WallClock};
use chrono::offset::LocalResult;
use chrono::{DateTime, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::trace;

/// Free sub-intervals of `window` not covered by any event overlapping `day`.
///
/// Events are clipped to the window, swept in start order, and every gap of at
/// least `min_duration` is emitted. The result is ascending and pairwise
/// disjoint.
pub fn free_blocks(
    events: &[Event],
    day: &TimeWindow,
    window: &TimeWindow,
    min_duration: Duration,
) -> Vec<FreeBlock> {
    if window.is_empty() {
        return Vec::new();
    }

    let mut busy_intervals = events
        .iter()
        .filter(|event| event.overlaps(day.start, day.end))
        .filter_map(|event| clip_interval(event.start, event.end, window))
        .collect::<Vec<_>>();
    busy_intervals.sort_by_key(|interval| interval.start);

    let mut blocks = Vec::new();
    let mut cursor = window.start;
    for interval in &busy_intervals {
        if cursor < interval.start && interval.start - cursor >= min_duration {
            blocks.push(FreeBlock {
                start: cursor,
                end: interval.start,
            });
        }
        if interval.end > cursor {
            cursor = interval.end;
        }
    }
    if cursor < window.end && window.end - cursor >= min_duration {
        blocks.push(FreeBlock {
            start: cursor,
            end: window.end,
        });
    }

    trace!(
        busy = busy_intervals.len(),
        free = blocks.len(),
        "swept availability window"
    );
    blocks
}

pub fn free_blocks_on(
    events: &[Event],
    date: NaiveDate,
    tz: &Tz,
    policy: &AvailabilityPolicy,
) -> Vec<FreeBlock> {
    let day = day_bounds(date, tz);
    let window = working_window(date, tz, policy);
    free_blocks(events, &day, &window, policy.min_duration())
}

pub fn day_bounds(date: NaiveDate, tz: &Tz) -> TimeWindow {
    TimeWindow::new(
        local_instant(tz, wall_clock_on(date, WallClock::MIDNIGHT)),
        local_instant(tz, wall_clock_on(date, WallClock::END_OF_DAY)),
    )
}

pub fn working_window(date: NaiveDate, tz: &Tz, policy: &AvailabilityPolicy) -> TimeWindow {
    TimeWindow::new(
        local_instant(tz, wall_clock_on(date, policy.window_start)),
        local_instant(tz, wall_clock_on(date, policy.window_end)),
    )
}

pub fn dates_between(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    first
        .iter_days()
        .take_while(|date| *date <= last)
        .collect()
}

fn wall_clock_on(date: NaiveDate, clock: WallClock) -> NaiveDateTime {
    let minutes = clock.minutes_from_midnight();
    let midnight = date.and_time(NaiveTime::MIN);
    if minutes >= 24 * 60 {
        return date
            .checked_add_days(Days::new(1))
            .map(|next| next.and_time(NaiveTime::MIN))
            .unwrap_or(midnight);
    }
    midnight + Duration::minutes(i64::from(minutes))
}

// Wall-clock times skipped by a DST jump resolve to the first instant after
// the gap; repeated times resolve to their earlier occurrence.
fn local_instant(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(value) => value.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|value| value.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local)),
    }
}

fn clip_interval(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    window: &TimeWindow,
) -> Option<TimeWindow> {
    if end <= window.start || start >= window.end {
        return None;
    }
    let start = start.max(window.start);
    let end = end.min(window.end);
    (end > start).then_some(TimeWindow { start, end })
}
