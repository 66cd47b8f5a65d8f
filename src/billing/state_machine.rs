use crate::entities::{SubscriptionStatus, subscriptions};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Everything time-derived is carried on the event; the machine itself
/// never reads the wall clock, so `apply` is a pure function of
/// (snapshot, event) and replays deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    /// `starts_at` is still ahead; park the subscription until then.
    Schedule { now: DateTime<Utc> },
    /// `starts_at` reached with no trial configured.
    Activate {
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        now: DateTime<Utc>,
    },
    EnterTrial {
        trial_start: DateTime<Utc>,
        trial_end: DateTime<Utc>,
        now: DateTime<Utc>,
    },
    /// Trial window crossed; lands on `active` or, for non-renewing
    /// subscriptions awaiting a manual charge, `pending`.
    TrialEnded {
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        now: DateTime<Utc>,
    },
    /// Cycle boundary crossed; bills cycle `cycle` and advances the period.
    Renew {
        cycle: i32,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        now: DateTime<Utc>,
    },
    /// All paid cycles have elapsed.
    Complete { now: DateTime<Utc> },
    Cancel { now: DateTime<Utc> },
    Pause { now: DateTime<Utc> },
    Resume { now: DateTime<Utc> },
    /// Payment failure signaled by the payment collaborator.
    Halt { now: DateTime<Utc> },
    /// Payment recovered; period recomputed by the caller.
    Resolve {
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        now: DateTime<Utc>,
    },
}

impl SubscriptionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SubscriptionEvent::Schedule { .. } => "schedule",
            SubscriptionEvent::Activate { .. } => "activate",
            SubscriptionEvent::EnterTrial { .. } => "enter_trial",
            SubscriptionEvent::TrialEnded { .. } => "trial_ended",
            SubscriptionEvent::Renew { .. } => "renew",
            SubscriptionEvent::Complete { .. } => "complete",
            SubscriptionEvent::Cancel { .. } => "cancel",
            SubscriptionEvent::Pause { .. } => "pause",
            SubscriptionEvent::Resume { .. } => "resume",
            SubscriptionEvent::Halt { .. } => "halt",
            SubscriptionEvent::Resolve { .. } => "resolve",
        }
    }
}

/// The fact of a transition, as exposed to collaborators.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Transition {
    pub subscription_id: i64,
    pub from_status: SubscriptionStatus,
    pub to_status: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_number: Option<i32>,
    pub occurred_at: DateTime<Utc>,
}

fn rejected(sub: &subscriptions::Model, event: &SubscriptionEvent) -> AppError {
    AppError::TransitionRejected(format!(
        "event {} is not allowed for subscription {} in status {}",
        event.name(),
        sub.id,
        sub.status
    ))
}

/// Apply `event` to `sub`, returning the updated snapshot and the
/// transition record. The input snapshot is never mutated; an illegal
/// event returns `TransitionRejected` and the caller observes the
/// unchanged snapshot.
pub fn apply(
    sub: &subscriptions::Model,
    event: &SubscriptionEvent,
) -> AppResult<(subscriptions::Model, Transition)> {
    use SubscriptionStatus::*;

    let mut next = sub.clone();
    let mut cycle_number = None;

    let occurred_at = match *event {
        SubscriptionEvent::Schedule { now } => {
            if sub.status != New {
                return Err(rejected(sub, event));
            }
            next.status = Future;
            now
        }
        SubscriptionEvent::Activate {
            period_start,
            period_end,
            now,
        } => {
            if !matches!(sub.status, New | Future) {
                return Err(rejected(sub, event));
            }
            next.status = Active;
            next.activated_at = Some(now);
            next.current_period_start = Some(period_start);
            next.current_period_end = Some(period_end);
            now
        }
        SubscriptionEvent::EnterTrial {
            trial_start,
            trial_end,
            now,
        } => {
            if !matches!(sub.status, New | Future) {
                return Err(rejected(sub, event));
            }
            next.status = InTrial;
            next.current_period_start = Some(trial_start);
            next.current_period_end = Some(trial_end);
            now
        }
        SubscriptionEvent::TrialEnded {
            period_start,
            period_end,
            now,
        } => {
            if sub.status != InTrial {
                return Err(rejected(sub, event));
            }
            next.status = if sub.renews { Active } else { Pending };
            if next.activated_at.is_none() {
                next.activated_at = Some(now);
            }
            next.current_period_start = Some(period_start);
            next.current_period_end = Some(period_end);
            now
        }
        SubscriptionEvent::Renew {
            cycle,
            period_start,
            period_end,
            now,
        } => {
            if sub.status != Active {
                return Err(rejected(sub, event));
            }
            // currentBillingCycle never decreases and never skips ahead.
            if cycle != sub.current_billing_cycle + 1 {
                return Err(AppError::TransitionRejected(format!(
                    "renewal to cycle {} is out of order for subscription {} at cycle {}",
                    cycle, sub.id, sub.current_billing_cycle
                )));
            }
            if sub.total_billing_cycles > 0 && cycle > sub.total_billing_cycles {
                return Err(AppError::TransitionRejected(format!(
                    "subscription {} has exhausted its {} billing cycles",
                    sub.id, sub.total_billing_cycles
                )));
            }
            next.current_billing_cycle = cycle;
            next.current_period_start = Some(period_start);
            next.current_period_end = Some(period_end);
            cycle_number = Some(cycle);
            now
        }
        SubscriptionEvent::Complete { now } => {
            if sub.status != Active {
                return Err(rejected(sub, event));
            }
            if sub.total_billing_cycles == 0 || sub.current_billing_cycle < sub.total_billing_cycles
            {
                return Err(AppError::TransitionRejected(format!(
                    "subscription {} still has billing cycles remaining",
                    sub.id
                )));
            }
            next.status = Expired;
            // expiry marker; mirrors cancelled_at for terminal auditing
            next.cancelled_at = Some(now);
            now
        }
        SubscriptionEvent::Cancel { now } => {
            if sub.status.is_terminal() {
                return Err(rejected(sub, event));
            }
            next.status = Canceled;
            next.cancelled_at = Some(now);
            now
        }
        SubscriptionEvent::Pause { now } => {
            if !matches!(sub.status, Active | InTrial) {
                return Err(rejected(sub, event));
            }
            next.status = Paused;
            next.paused_at = Some(now);
            now
        }
        SubscriptionEvent::Resume { now } => {
            if sub.status != Paused {
                return Err(rejected(sub, event));
            }
            let Some(paused_at) = sub.paused_at else {
                return Err(AppError::TransitionRejected(format!(
                    "subscription {} is paused without a pause timestamp",
                    sub.id
                )));
            };
            // Shift the period forward by the paused duration so no cycle
            // is lost; the calculator folds the shift into later boundaries.
            let shift = (now - paused_at).max(chrono::Duration::zero());
            next.status = Active;
            next.paused_at = None;
            if next.activated_at.is_none() {
                next.activated_at = Some(now);
            }
            next.current_period_start = sub.current_period_start.map(|t| t + shift);
            next.current_period_end = sub.current_period_end.map(|t| t + shift);
            now
        }
        SubscriptionEvent::Halt { now } => {
            if !matches!(sub.status, Active | Pending) {
                return Err(rejected(sub, event));
            }
            next.status = Halted;
            now
        }
        SubscriptionEvent::Resolve {
            period_start,
            period_end,
            now,
        } => {
            if sub.status != Halted {
                return Err(rejected(sub, event));
            }
            next.status = Active;
            next.current_period_start = Some(period_start);
            next.current_period_end = Some(period_end);
            now
        }
    };

    next.updated_at = Some(occurred_at);
    let transition = Transition {
        subscription_id: sub.id,
        from_status: sub.status,
        to_status: next.status,
        cycle_number,
        occurred_at,
    };
    Ok((next, transition))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PeriodUnit;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn subscription(status: SubscriptionStatus) -> subscriptions::Model {
        subscriptions::Model {
            id: 7,
            owner_id: 1,
            account_id: 2,
            plan_id: 3,
            status,
            price_per_billing_cycle: 1500,
            setup_fee: 0,
            quantity: 2,
            starts_at: utc(2024, 1, 1),
            total_billing_cycles: 0,
            current_billing_cycle: 0,
            renews: true,
            trial_period: None,
            trial_period_unit: PeriodUnit::Days,
            term: 1,
            term_unit: PeriodUnit::Months,
            activated_at: None,
            cancelled_at: None,
            paused_at: None,
            current_period_start: None,
            current_period_end: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_activate_sets_period_and_timestamp() {
        let sub = subscription(SubscriptionStatus::New);
        let event = SubscriptionEvent::Activate {
            period_start: utc(2024, 1, 1),
            period_end: utc(2024, 2, 1),
            now: utc(2024, 1, 1),
        };
        let (next, transition) = apply(&sub, &event).unwrap();
        assert_eq!(next.status, SubscriptionStatus::Active);
        assert_eq!(next.activated_at, Some(utc(2024, 1, 1)));
        assert_eq!(next.current_period_start, Some(utc(2024, 1, 1)));
        assert_eq!(next.current_period_end, Some(utc(2024, 2, 1)));
        assert_eq!(transition.from_status, SubscriptionStatus::New);
        assert_eq!(transition.to_status, SubscriptionStatus::Active);
    }

    #[test]
    fn test_trial_end_respects_renews_flag() {
        let mut sub = subscription(SubscriptionStatus::InTrial);
        let event = SubscriptionEvent::TrialEnded {
            period_start: utc(2024, 1, 15),
            period_end: utc(2024, 2, 15),
            now: utc(2024, 1, 15),
        };
        let (next, _) = apply(&sub, &event).unwrap();
        assert_eq!(next.status, SubscriptionStatus::Active);

        sub.renews = false;
        let (next, _) = apply(&sub, &event).unwrap();
        assert_eq!(next.status, SubscriptionStatus::Pending);
        assert_eq!(next.activated_at, Some(utc(2024, 1, 15)));
    }

    #[test]
    fn test_renew_increments_cycle_exactly_once() {
        let mut sub = subscription(SubscriptionStatus::Active);
        sub.current_billing_cycle = 2;
        let event = SubscriptionEvent::Renew {
            cycle: 3,
            period_start: utc(2024, 4, 1),
            period_end: utc(2024, 5, 1),
            now: utc(2024, 4, 1),
        };
        let (next, transition) = apply(&sub, &event).unwrap();
        assert_eq!(next.current_billing_cycle, 3);
        assert_eq!(transition.cycle_number, Some(3));

        // Replaying against the updated snapshot is rejected, not doubled.
        let err = apply(&next, &event).unwrap_err();
        assert!(matches!(err, AppError::TransitionRejected(_)));
    }

    #[test]
    fn test_renew_rejected_past_total_cycles() {
        let mut sub = subscription(SubscriptionStatus::Active);
        sub.total_billing_cycles = 3;
        sub.current_billing_cycle = 3;
        let event = SubscriptionEvent::Renew {
            cycle: 4,
            period_start: utc(2024, 5, 1),
            period_end: utc(2024, 6, 1),
            now: utc(2024, 5, 1),
        };
        assert!(apply(&sub, &event).is_err());

        let (next, _) = apply(&sub, &SubscriptionEvent::Complete { now: utc(2024, 5, 1) }).unwrap();
        assert_eq!(next.status, SubscriptionStatus::Expired);
    }

    #[test]
    fn test_cancel_on_canceled_is_rejected() {
        let sub = subscription(SubscriptionStatus::Canceled);
        let err = apply(&sub, &SubscriptionEvent::Cancel { now: utc(2024, 3, 1) }).unwrap_err();
        assert!(matches!(err, AppError::TransitionRejected(_)));
    }

    #[test]
    fn test_cancel_beats_renew() {
        let sub = subscription(SubscriptionStatus::Canceled);
        let event = SubscriptionEvent::Renew {
            cycle: 1,
            period_start: utc(2024, 2, 1),
            period_end: utc(2024, 3, 1),
            now: utc(2024, 2, 1),
        };
        assert!(apply(&sub, &event).is_err());
    }

    #[test]
    fn test_pause_resume_shifts_period() {
        let mut sub = subscription(SubscriptionStatus::Active);
        sub.activated_at = Some(utc(2024, 1, 1));
        sub.current_period_start = Some(utc(2024, 1, 1));
        sub.current_period_end = Some(utc(2024, 2, 1));

        let (paused, _) = apply(&sub, &SubscriptionEvent::Pause { now: utc(2024, 1, 10) }).unwrap();
        assert_eq!(paused.status, SubscriptionStatus::Paused);
        assert_eq!(paused.paused_at, Some(utc(2024, 1, 10)));

        let (resumed, _) =
            apply(&paused, &SubscriptionEvent::Resume { now: utc(2024, 1, 20) }).unwrap();
        assert_eq!(resumed.status, SubscriptionStatus::Active);
        assert_eq!(resumed.paused_at, None);
        assert_eq!(resumed.current_period_start, Some(utc(2024, 1, 11)));
        assert_eq!(resumed.current_period_end, Some(utc(2024, 2, 11)));
    }

    #[test]
    fn test_halt_and_resolve() {
        let mut sub = subscription(SubscriptionStatus::Active);
        sub.current_period_start = Some(utc(2024, 1, 1));
        sub.current_period_end = Some(utc(2024, 2, 1));

        let (halted, _) = apply(&sub, &SubscriptionEvent::Halt { now: utc(2024, 1, 5) }).unwrap();
        assert_eq!(halted.status, SubscriptionStatus::Halted);
        // no period mutation on halt
        assert_eq!(halted.current_period_start, sub.current_period_start);

        let (resolved, _) = apply(
            &halted,
            &SubscriptionEvent::Resolve {
                period_start: utc(2024, 1, 1),
                period_end: utc(2024, 2, 1),
                now: utc(2024, 1, 8),
            },
        )
        .unwrap();
        assert_eq!(resolved.status, SubscriptionStatus::Active);

        // resolve is only legal from halted
        let err = apply(
            &resolved,
            &SubscriptionEvent::Resolve {
                period_start: utc(2024, 1, 1),
                period_end: utc(2024, 2, 1),
                now: utc(2024, 1, 9),
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::TransitionRejected(_)));
    }

    #[test]
    fn test_active_always_has_period_start() {
        // Every event that lands on `active` must leave a period behind.
        let trial = {
            let mut s = subscription(SubscriptionStatus::InTrial);
            s.current_period_start = Some(utc(2024, 1, 1));
            s.current_period_end = Some(utc(2024, 1, 15));
            s
        };
        let events = vec![
            (
                subscription(SubscriptionStatus::New),
                SubscriptionEvent::Activate {
                    period_start: utc(2024, 1, 1),
                    period_end: utc(2024, 2, 1),
                    now: utc(2024, 1, 1),
                },
            ),
            (
                trial,
                SubscriptionEvent::TrialEnded {
                    period_start: utc(2024, 1, 15),
                    period_end: utc(2024, 2, 15),
                    now: utc(2024, 1, 15),
                },
            ),
        ];
        for (sub, event) in events {
            let (next, _) = apply(&sub, &event).unwrap();
            if next.status == SubscriptionStatus::Active {
                assert!(next.current_period_start.is_some());
                assert!(next.current_period_end.is_some());
                assert!(next.current_period_end > next.current_period_start);
            }
        }
    }
}
