use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

/// Fires the daily summary once per local date, during `hour` in `timezone`.
#[derive(Debug, Clone)]
pub struct SummarySchedule {
    hour: u32,
    timezone: Tz,
    last_fired: Option<NaiveDate>,
}

impl SummarySchedule {
    pub fn new(hour: u32, timezone: Tz) -> Self {
        Self {
            hour,
            timezone,
            last_fired: None,
        }
    }

    /// Local date to report for, if the summary is due at `now`.
    pub fn due(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        let local = now.with_timezone(&self.timezone);
        let today = local.date_naive();

        (local.hour() == self.hour && self.last_fired != Some(today)).then_some(today)
    }

    /// Records a completed summary so `due` stays quiet for the rest of `date`.
    pub fn mark_fired(&mut self, date: NaiveDate) {
        self.last_fired = Some(date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Kolkata;

    #[test]
    fn fires_at_local_midnight_once() {
        let mut schedule = SummarySchedule::new(0, Kolkata);
        // 18:45 UTC is 00:15 IST the next day.
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 18, 45, 0).unwrap();

        let date = schedule.due(now).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());

        schedule.mark_fired(date);
        let later = Utc.with_ymd_and_hms(2025, 6, 1, 19, 0, 0).unwrap();
        assert_eq!(schedule.due(later), None);
    }

    #[test]
    fn quiet_outside_the_hour() {
        let schedule = SummarySchedule::new(0, Kolkata);
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(schedule.due(now), None);
    }

    #[test]
    fn unmarked_date_stays_due() {
        let schedule = SummarySchedule::new(0, Kolkata);
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 18, 45, 0).unwrap();

        // Nothing was recorded, e.g. because persisting the reset failed.
        assert!(schedule.due(now).is_some());
        assert!(schedule.due(now).is_some());
    }

    #[test]
    fn fires_again_the_next_day() {
        let mut schedule = SummarySchedule::new(0, Kolkata);
        let day_one = Utc.with_ymd_and_hms(2025, 6, 1, 18, 40, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2025, 6, 2, 18, 40, 0).unwrap();

        let first = schedule.due(day_one).unwrap();
        schedule.mark_fired(first);

        assert_eq!(
            schedule.due(day_two),
            Some(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap())
        );
    }
}
