//! Daily birthday announcements.
//!
//! # Responsibility
//! - Compute when the next daily run is due in the operational timezone.
//! - On each run, announce today's birthdays once per affected group.
//!
//! # Invariants
//! - At most one announcement per group per run, however many people match.
//! - A send failure for one group never prevents sends to other groups.
//! - All sends of a run are joined before the run reports completion.

use crate::clock::Clock;
use crate::command::replies;
use crate::model::birthday::{BirthdayRecord, GroupId};
use crate::repo::birthday_repo::BirthdayRepository;
use crate::service::birthday_service::{BirthdayService, ServiceResult};
use crate::transport::{SendError, Transport};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use log::{error, info, warn};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Longest single sleep while waiting for a trigger, so shutdown stays responsive.
const MAX_SLEEP_SLICE: std::time::Duration = std::time::Duration::from_secs(30);

/// Upper bound on announcement sends in flight during one run.
pub const MAX_CONCURRENT_SENDS: usize = 8;

/// Outcome of one scheduler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerReport {
    pub run_id: Uuid,
    pub date: NaiveDate,
    /// Number of records celebrating on `date`.
    pub matched: usize,
    /// Groups that received their announcement.
    pub sent: Vec<GroupId>,
    /// Groups whose announcement could not be delivered.
    pub failed: Vec<SendError>,
}

/// Fires once per day at a fixed wall-clock time in one timezone.
#[derive(Debug, Clone, Copy)]
pub struct DailyScheduler {
    tz: Tz,
    announce_at: NaiveTime,
}

impl DailyScheduler {
    pub fn new(tz: Tz, announce_at: NaiveTime) -> Self {
        Self { tz, announce_at }
    }

    /// Returns the first trigger instant strictly after `now`.
    ///
    /// Days on which the wall-clock time does not exist (DST gap) are skipped.
    pub fn next_trigger_after(&self, now: DateTime<Tz>) -> DateTime<Tz> {
        let now = now.with_timezone(&self.tz);
        let mut date = now.date_naive();
        for _ in 0..4 {
            let local = date.and_time(self.announce_at);
            if let Some(candidate) = self.tz.from_local_datetime(&local).earliest() {
                if candidate > now {
                    return candidate;
                }
            }
            date += Duration::days(1);
        }
        now + Duration::days(1)
    }

    /// Announces every birthday celebrated on `date`.
    ///
    /// # Errors
    /// - Returns the service error when today's birthdays cannot be loaded;
    ///   no announcement is sent in that case.
    pub fn run_for_date<R, T>(
        &self,
        service: &BirthdayService<R>,
        transport: &T,
        date: NaiveDate,
    ) -> ServiceResult<SchedulerReport>
    where
        R: BirthdayRepository,
        T: Transport + Sync + ?Sized,
    {
        let run_id = Uuid::new_v4();
        info!(
            "event=scheduler_run module=scheduler status=start run_id={} date={}",
            run_id, date
        );

        let records = match service.celebrating_on(date) {
            Ok(records) => records,
            Err(err) => {
                error!(
                    "event=scheduler_run module=scheduler status=error run_id={} date={} error={}",
                    run_id, date, err
                );
                return Err(err);
            }
        };
        let matched = records.len();
        let groups = group_by_chat(records);

        let announcements: Vec<(GroupId, String)> = groups
            .into_iter()
            .map(|(group_id, members)| {
                let text = replies::announcement(&members);
                (group_id, text)
            })
            .collect();

        let mut outcomes: Vec<(GroupId, Result<(), SendError>)> = Vec::new();
        for batch in announcements.chunks(MAX_CONCURRENT_SENDS) {
            outcomes.extend(send_batch(transport, batch));
        }

        let mut report = SchedulerReport {
            run_id,
            date,
            matched,
            sent: Vec::new(),
            failed: Vec::new(),
        };
        for (group_id, outcome) in outcomes {
            match outcome {
                Ok(()) => {
                    info!(
                        "event=announcement_send module=scheduler status=ok run_id={} group_id={}",
                        run_id, group_id
                    );
                    report.sent.push(group_id);
                }
                Err(err) => {
                    warn!(
                        "event=announcement_send module=scheduler status=error run_id={} group_id={} error={}",
                        run_id, group_id, err
                    );
                    report.failed.push(err);
                }
            }
        }

        info!(
            "event=scheduler_run module=scheduler status=ok run_id={} date={} matched={} sent={} failed={}",
            run_id,
            date,
            report.matched,
            report.sent.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Sleeps until each trigger and runs, until `shutdown` is set.
    ///
    /// A failed run is logged and the loop moves on to the next day.
    pub fn run_forever<R, T, C>(
        &self,
        service: &BirthdayService<R>,
        transport: &T,
        clock: &C,
        shutdown: &AtomicBool,
    ) where
        R: BirthdayRepository,
        T: Transport + Sync + ?Sized,
        C: Clock,
    {
        info!(
            "event=scheduler_start module=scheduler status=ok timezone={} announce_at={}",
            self.tz.name(),
            self.announce_at
        );
        while !shutdown.load(Ordering::Relaxed) {
            let trigger = self.next_trigger_after(clock.now());
            info!(
                "event=scheduler_wait module=scheduler status=ok next_trigger={}",
                trigger.to_rfc3339()
            );
            if !sleep_until(clock, trigger, shutdown) {
                break;
            }
            let today = clock.now().with_timezone(&self.tz).date_naive();
            // Failures are already logged inside the run.
            let _ = self.run_for_date(service, transport, today);
        }
        info!("event=scheduler_stop module=scheduler status=ok");
    }
}

/// Sends one batch of announcements in parallel and waits for all of them.
fn send_batch<T>(transport: &T, batch: &[(GroupId, String)]) -> Vec<(GroupId, Result<(), SendError>)>
where
    T: Transport + Sync + ?Sized,
{
    std::thread::scope(|scope| {
        let tasks: Vec<_> = batch
            .iter()
            .map(|(group_id, text)| {
                let handle = scope.spawn(move || transport.send_text(group_id, text));
                (group_id, handle)
            })
            .collect();

        tasks
            .into_iter()
            .map(|(group_id, handle)| {
                let outcome = handle.join().unwrap_or_else(|_| {
                    Err(SendError::new(group_id.as_str(), "send task panicked"))
                });
                (group_id.clone(), outcome)
            })
            .collect()
    })
}

/// Groups records by chat, keeping one entry per group.
fn group_by_chat(records: Vec<BirthdayRecord>) -> BTreeMap<GroupId, Vec<BirthdayRecord>> {
    let mut groups: BTreeMap<GroupId, Vec<BirthdayRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.group_id.clone())
            .or_default()
            .push(record);
    }
    groups
}

/// Returns `false` when shutdown was requested before `trigger`.
fn sleep_until<C: Clock>(clock: &C, trigger: DateTime<Tz>, shutdown: &AtomicBool) -> bool {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let remaining = trigger.signed_duration_since(clock.now());
        let Ok(remaining) = remaining.to_std() else {
            return true;
        };
        if remaining.is_zero() {
            return true;
        }
        std::thread::sleep(remaining.min(MAX_SLEEP_SLICE));
    }
}
