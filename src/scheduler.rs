//! Recurring cycle trigger
//!
//! Trigger times are evaluated in local wall-clock time. The loop is
//! synchronous: a cycle that overruns the next trigger simply delays it.

use std::thread;
use std::time::Duration;

use chrono::{Datelike, Days, Local, Months, NaiveDateTime, NaiveTime, Weekday};

use crate::config::{Frequency, ScheduleConfig};
use crate::error::Result;

/// Cadence and time-of-day of the recurring trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    frequency: Frequency,
    time: NaiveTime,
    weekday: Weekday,
    day_of_month: u32,
    poll_interval: Duration,
}

impl Schedule {
    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        Ok(Self {
            frequency: config.frequency,
            time: config.trigger_time()?,
            weekday: config.weekday,
            day_of_month: config.day_of_month,
            poll_interval: config.poll_interval(),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// First trigger strictly after `after`.
    ///
    /// `None` only when the result would fall outside chrono's calendar.
    pub fn next_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = after.date();
        match self.frequency {
            Frequency::Daily => {
                let today = date.and_time(self.time);
                if today > after {
                    Some(today)
                } else {
                    date.checked_add_days(Days::new(1))
                        .map(|d| d.and_time(self.time))
                }
            }
            Frequency::Weekly => {
                let ahead = (7 + self.weekday.num_days_from_monday()
                    - date.weekday().num_days_from_monday())
                    % 7;
                let candidate = date
                    .checked_add_days(Days::new(u64::from(ahead)))?
                    .and_time(self.time);
                if candidate > after {
                    Some(candidate)
                } else {
                    candidate.checked_add_days(Days::new(7))
                }
            }
            Frequency::Monthly => {
                let first = date.with_day(1)?;
                (0..=1).find_map(|offset| {
                    let candidate = first
                        .checked_add_months(Months::new(offset))?
                        .with_day(self.day_of_month)?
                        .and_time(self.time);
                    (candidate > after).then_some(candidate)
                })
            }
        }
    }
}

/// Current local wall-clock time
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Tracks the next due trigger and fires the job when it has passed
pub struct Scheduler {
    schedule: Schedule,
    next_run: Option<NaiveDateTime>,
    /// Read after each job so the next trigger is computed from when it finished
    clock: fn() -> NaiveDateTime,
}

impl Scheduler {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            next_run: None,
            clock: local_now,
        }
    }

    #[cfg(test)]
    fn with_clock(schedule: Schedule, clock: fn() -> NaiveDateTime) -> Self {
        Self {
            clock,
            ..Self::new(schedule)
        }
    }

    pub fn next_run(&self) -> Option<NaiveDateTime> {
        self.next_run
    }

    /// Run `job` unconditionally and schedule the following trigger
    pub fn run_now(&mut self, now: NaiveDateTime, job: &mut impl FnMut()) {
        job();
        self.reschedule(now);
    }

    /// Run `job` if the next trigger is due at `now`; returns whether it ran
    pub fn run_pending(&mut self, now: NaiveDateTime, job: &mut impl FnMut()) -> bool {
        match self.next_run {
            Some(due) if due <= now => {
                tracing::info!(due = %due, "scheduled synchronization due");
                job();
                self.reschedule(now);
                true
            }
            _ => false,
        }
    }

    /// Schedule the first trigger after the job that started at `started` finished
    fn reschedule(&mut self, started: NaiveDateTime) {
        let finished = (self.clock)().max(started);
        self.next_run = self.schedule.next_after(finished);
        match self.next_run {
            Some(next) => tracing::info!(next = %next, "next synchronization scheduled"),
            None => tracing::error!("no future trigger time could be computed"),
        }
    }

    /// Run once immediately, then poll forever
    pub fn run_forever(mut self, mut job: impl FnMut()) -> ! {
        self.run_now(local_now(), &mut job);
        loop {
            thread::sleep(self.schedule.poll_interval());
            if !self.run_pending(local_now(), &mut job) {
                tracing::trace!(next = ?self.next_run(), "no synchronization due");
            }
        }
    }
}
