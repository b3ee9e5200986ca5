/*
Time-slot model and boundary validation.

A tracked day runs 04:00 -> 23:45 in 80 slots of 15 minutes.
Everything here runs before scoring: bad input is rejected with
InvalidFormat / OutOfRange / InvalidRange so the scoring code
never has to.
*/

use chrono::NaiveDate;

use crate::error::{AppError, AppResult};

pub const SLOTS_PER_DAY: i64 = 80;
pub const SLOT_MINUTES: i64 = 15;
pub const DAY_START_MINUTES: i64 = 4 * 60; // 04:00
pub const HOURS_PER_SLOT: f64 = 0.25;

pub const MIN_FOCUS: i64 = 1;
pub const MAX_FOCUS: i64 = 5;

// Trend requests longer than this are refused before any data is loaded
pub const MAX_TREND_DAYS: i64 = 90;

pub fn validate_slot(index: i64) -> AppResult<i64> {
    if (0..SLOTS_PER_DAY).contains(&index) {
        Ok(index)
    } else {
        Err(AppError::OutOfRange(format!(
            "slot index must be 0..={}: {index}",
            SLOTS_PER_DAY - 1
        )))
    }
}

pub fn validate_focus(focus: Option<i64>) -> AppResult<Option<i64>> {
    match focus {
        Some(f) if !(MIN_FOCUS..=MAX_FOCUS).contains(&f) => Err(AppError::OutOfRange(format!(
            "focus must be {MIN_FOCUS}..={MAX_FOCUS}: {f}"
        ))),
        other => Ok(other),
    }
}

/// Slot index -> "HH:MM" wall-clock start time.
///
///   slot_to_time(0)  -> "04:00"
///   slot_to_time(1)  -> "04:15"
///   slot_to_time(79) -> "23:45"
pub fn slot_to_time(index: i64) -> AppResult<String> {
    let index = validate_slot(index)?;
    let total = DAY_START_MINUTES + index * SLOT_MINUTES;
    let hours = (total / 60) % 24;
    let minutes = total % 60;
    Ok(format!("{hours:02}:{minutes:02}"))
}

/// "HH:MM" -> slot index.
///
/// Times before 04:00 belong to the tail of the logical day (+24h),
/// which always lands past the last slot and is reported as OutOfRange.
/// Minutes inside a slot floor to that slot.
pub fn time_to_slot(time: &str) -> AppResult<i64> {
    let invalid = || AppError::InvalidFormat(format!("time must be HH:MM: {time}"));

    let parts: Vec<&str> = time.trim().split(':').collect();
    if parts.len() != 2 {
        return Err(invalid());
    }
    let h: i64 = parts[0].parse().map_err(|_| invalid())?;
    let m: i64 = parts[1].parse().map_err(|_| invalid())?;
    if !(0..24).contains(&h) || !(0..60).contains(&m) {
        return Err(invalid());
    }

    let mut minutes = h * 60 + m;
    if minutes < DAY_START_MINUTES {
        minutes += 24 * 60;
    }

    let index = (minutes - DAY_START_MINUTES) / SLOT_MINUTES;
    if !(0..SLOTS_PER_DAY).contains(&index) {
        return Err(AppError::OutOfRange(format!(
            "time outside the tracked day (04:00-23:59): {time}"
        )));
    }
    Ok(index)
}

// Every (index, "HH:MM") pair of the day, in order.
pub fn all_slots() -> Vec<(i64, String)> {
    (0..SLOTS_PER_DAY)
        .map(|i| {
            let total = DAY_START_MINUTES + i * SLOT_MINUTES;
            (i, format!("{:02}:{:02}", total / 60, total % 60))
        })
        .collect()
}

pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidFormat(format!("date must be YYYY-MM-DD: {s}")))
}

// Inclusive range check for trend queries.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end < start {
        return Err(AppError::InvalidRange(format!(
            "start date {start} is after end date {end}"
        )));
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_TREND_DAYS {
        return Err(AppError::InvalidRange(format!(
            "range must be at most {MAX_TREND_DAYS} days: got {days}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_boundaries() {
        assert_eq!(slot_to_time(0).unwrap(), "04:00");
        assert_eq!(slot_to_time(1).unwrap(), "04:15");
        assert_eq!(slot_to_time(79).unwrap(), "23:45");
        assert_eq!(time_to_slot("04:00").unwrap(), 0);
        assert_eq!(time_to_slot("23:45").unwrap(), 79);
    }

    #[test]
    fn slot_and_time_are_inverses() {
        for i in 0..SLOTS_PER_DAY {
            let t = slot_to_time(i).unwrap();
            assert_eq!(time_to_slot(&t).unwrap(), i, "slot {i} via {t}");
        }
        for (i, t) in all_slots() {
            assert_eq!(slot_to_time(time_to_slot(&t).unwrap()).unwrap(), t);
            assert_eq!(slot_to_time(i).unwrap(), t);
        }
    }

    #[test]
    fn slot_out_of_range_is_rejected() {
        assert!(matches!(slot_to_time(-1), Err(AppError::OutOfRange(_))));
        assert!(matches!(slot_to_time(80), Err(AppError::OutOfRange(_))));
    }

    #[test]
    fn mid_slot_minutes_floor() {
        assert_eq!(time_to_slot("04:14").unwrap(), 0);
        assert_eq!(time_to_slot("23:59").unwrap(), 79);
    }

    #[test]
    fn early_morning_is_past_the_last_slot() {
        assert!(matches!(time_to_slot("00:00"), Err(AppError::OutOfRange(_))));
        assert!(matches!(time_to_slot("03:59"), Err(AppError::OutOfRange(_))));
    }

    #[test]
    fn malformed_times() {
        for bad in ["", "0400", "4:00:00", "aa:bb", "24:00", "10:60", "-1:00"] {
            assert!(
                matches!(time_to_slot(bad), Err(AppError::InvalidFormat(_))),
                "{bad:?} should be InvalidFormat"
            );
        }
    }

    #[test]
    fn focus_bounds() {
        assert_eq!(validate_focus(None).unwrap(), None);
        assert_eq!(validate_focus(Some(1)).unwrap(), Some(1));
        assert_eq!(validate_focus(Some(5)).unwrap(), Some(5));
        assert!(matches!(validate_focus(Some(0)), Err(AppError::OutOfRange(_))));
        assert!(matches!(validate_focus(Some(6)), Err(AppError::OutOfRange(_))));
    }

    #[test]
    fn dates_and_ranges() {
        let start = parse_date("2024-01-01").unwrap();
        assert!(matches!(parse_date("2024/01/01"), Err(AppError::InvalidFormat(_))));
        assert!(matches!(parse_date("2024-02-30"), Err(AppError::InvalidFormat(_))));

        assert!(validate_range(start, start).is_ok());
        // 2024-01-01 ..= 2024-03-30 is exactly 90 days
        assert!(validate_range(start, parse_date("2024-03-30").unwrap()).is_ok());
        assert!(matches!(
            validate_range(start, parse_date("2024-03-31").unwrap()),
            Err(AppError::InvalidRange(_))
        ));
        assert!(matches!(
            validate_range(parse_date("2024-01-02").unwrap(), start),
            Err(AppError::InvalidRange(_))
        ));
    }
}
