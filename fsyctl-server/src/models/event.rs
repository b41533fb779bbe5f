//! Daily event scheduling values
//!
//! The program runs for one week, so events are placed on day 1..=7 and
//! must end after they start.

use chrono::NaiveTime;

use super::ValidationError;

const FIRST_DAY: i16 = 1;
const LAST_DAY: i16 = 7;

/// Day of the program week (1..=7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DayNumber(i16);

impl DayNumber {
    pub fn new(day: i64) -> Result<Self, ValidationError> {
        if !(i64::from(FIRST_DAY)..=i64::from(LAST_DAY)).contains(&day) {
            return Err(ValidationError::OutOfRange {
                field: "day_number",
                min: FIRST_DAY.into(),
                max: LAST_DAY.into(),
            });
        }
        Ok(Self(day as i16))
    }

    pub fn get(&self) -> i16 {
        self.0
    }
}

/// Time of day as entered in the schedule form (`HH:MM` or `HH:MM:SS`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventTime(NaiveTime);

impl EventTime {
    pub fn parse(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field });
        }
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map(Self)
            .map_err(|_| ValidationError::InvalidFormat {
                field,
                reason: "expected HH:MM or HH:MM:SS",
            })
    }

    pub fn get(&self) -> NaiveTime {
        self.0
    }
}

/// A validated start/end pair where end is strictly after start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub start: EventTime,
    pub end: EventTime,
}

impl EventWindow {
    pub fn new(start: EventTime, end: EventTime) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::Rule {
                message: "End time must be later than start time",
            });
        }
        Ok(Self { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_range() {
        assert!(DayNumber::new(1).is_ok());
        assert!(DayNumber::new(7).is_ok());
        assert!(matches!(
            DayNumber::new(0),
            Err(ValidationError::OutOfRange { min: 1, max: 7, .. })
        ));
        assert!(DayNumber::new(8).is_err());
        assert!(DayNumber::new(-3).is_err());
    }

    #[test]
    fn parses_both_time_formats() {
        let a = EventTime::parse("start_time", "08:30").unwrap();
        let b = EventTime::parse("start_time", "08:30:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.get(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn rejects_bad_times() {
        assert!(matches!(
            EventTime::parse("end_time", "25:00"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            EventTime::parse("end_time", "noon"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            EventTime::parse("end_time", " "),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn window_requires_end_after_start() {
        let nine = EventTime::parse("start_time", "09:00").unwrap();
        let ten = EventTime::parse("end_time", "10:00").unwrap();
        assert!(EventWindow::new(nine, ten).is_ok());
        assert!(EventWindow::new(ten, nine).is_err());
        assert!(EventWindow::new(nine, nine).is_err());
    }
}
