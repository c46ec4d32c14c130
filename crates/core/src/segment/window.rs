//! Fixed-length windowing of an utterance and exactly-once interval claims.

use crate::types::{PhonemeInterval, Window};

/// Number of windows of `interval_ms` needed to cover `duration_ms`.
pub fn window_count(duration_ms: f64, interval_ms: f64) -> usize {
    if duration_ms <= 0.0 || interval_ms <= 0.0 {
        return 0;
    }
    (duration_ms / interval_ms).ceil() as usize
}

/// Whether the window `[start, end]` may claim `interval`.
///
/// Claimed when fully inside, or when it crosses one boundary with at least
/// half of its own duration inside the window.
pub fn claims(interval: &PhonemeInterval, start: f64, end: f64) -> bool {
    let half = 0.5 * interval.duration_ms();
    let inside = interval.start_ms >= start && interval.end_ms <= end;
    let tail_out = interval.start_ms >= start && interval.start_ms + half <= end;
    let head_out = interval.end_ms <= end && interval.end_ms - half >= start;
    inside || tail_out || head_out
}

/// Shift a claimed interval into window-local time, clamped to the window.
pub fn to_local(interval: &PhonemeInterval, start: f64, length: f64) -> PhonemeInterval {
    PhonemeInterval {
        start_ms: (interval.start_ms - start).max(0.0),
        end_ms: (interval.end_ms - start).min(length),
        label: interval.label.clone(),
    }
}

/// Split `[0, duration_ms)` into windows and hand each interval to at most one.
///
/// `intervals` must be sorted by start. Claimed intervals leave the pending
/// list, so later windows cannot take them again. Scanning for a window
/// stops at the first interval starting after its end.
pub fn assign_windows(
    intervals: &[PhonemeInterval],
    duration_ms: f64,
    interval_ms: f64,
) -> Vec<Window> {
    let count = window_count(duration_ms, interval_ms);
    let mut pending: Vec<&PhonemeInterval> = intervals.iter().collect();
    let mut windows = Vec::with_capacity(count);

    for index in 0..count {
        let start = index as f64 * interval_ms;
        let end = start + interval_ms;

        let mut assigned = Vec::new();
        let mut kept = Vec::with_capacity(pending.len());
        let mut past_end = false;
        for interval in pending {
            past_end = past_end || interval.start_ms > end;
            if !past_end && claims(interval, start, end) {
                assigned.push(to_local(interval, start, interval_ms));
            } else {
                kept.push(interval);
            }
        }
        pending = kept;

        windows.push(Window {
            index,
            start_ms: start,
            end_ms: end,
            assigned,
            needs_padding: end > duration_ms,
        });
    }

    windows
}
