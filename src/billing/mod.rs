//! Subscription lifecycle and billing-cycle engine.
//!
//! Pure and clock-parameterized: `calendar` does period arithmetic,
//! `cycle` derives the current billing period from a stored snapshot,
//! `state_machine` owns the legal transition table, and `plan_event`
//! bridges the two for the sweep. All I/O lives in the service layer.

pub mod calendar;
pub mod cycle;
pub mod state_machine;

pub use cycle::{CycleState, Phase, compute_cycle};
pub use state_machine::{SubscriptionEvent, Transition, apply};

use crate::entities::{SubscriptionStatus, subscriptions};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};

/// Reject schedule fields that cannot produce a well-formed period.
/// Enforced once, when a plan or subscription is created; the calculator
/// assumes validated input and never re-checks on sweep passes.
pub fn validate_schedule(
    term: i32,
    trial_period: Option<i32>,
    total_billing_cycles: i32,
) -> AppResult<()> {
    if term < 1 {
        return Err(AppError::InvalidSchedule(
            "term must be at least 1".to_string(),
        ));
    }
    if let Some(p) = trial_period
        && p < 1
    {
        return Err(AppError::InvalidSchedule(
            "trial period must be at least 1 when set".to_string(),
        ));
    }
    if total_billing_cycles < 0 {
        return Err(AppError::InvalidSchedule(
            "total billing cycles must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Derive the event the sweep should submit for `sub` at `now`, if any.
///
/// One event per pass: after downtime the engine catches up one cycle per
/// evaluation, which keeps every ledger write tied to exactly one
/// transition. Re-planning against an updated snapshot at the same `now`
/// eventually yields `None`, so repeated evaluation is idempotent.
pub fn plan_event(sub: &subscriptions::Model, now: DateTime<Utc>) -> Option<SubscriptionEvent> {
    use SubscriptionStatus::*;

    if sub.status.is_terminal() {
        return None;
    }
    // Paused and halted subscriptions only move on external resume/resolve.
    if matches!(sub.status, Paused | Halted) {
        return None;
    }

    let state = cycle::compute_cycle(sub, now);
    if !state.due_for_transition {
        // Park not-yet-started subscriptions under `future`.
        if state.phase == Phase::Future && sub.status == New {
            return Some(SubscriptionEvent::Schedule { now });
        }
        return None;
    }

    match state.phase {
        Phase::Future => None,
        Phase::Trial => match sub.status {
            New | Future => Some(SubscriptionEvent::EnterTrial {
                trial_start: state.period_start,
                trial_end: state.period_end,
                now,
            }),
            _ => None,
        },
        Phase::Billing => match sub.status {
            New | Future => {
                let (period_start, period_end) = cycle::period_for_cycle(sub, 0);
                Some(SubscriptionEvent::Activate {
                    period_start,
                    period_end,
                    now,
                })
            }
            InTrial => {
                let (period_start, period_end) = cycle::period_for_cycle(sub, 0);
                Some(SubscriptionEvent::TrialEnded {
                    period_start,
                    period_end,
                    now,
                })
            }
            Active => {
                if sub.total_billing_cycles > 0
                    && sub.current_billing_cycle >= sub.total_billing_cycles
                {
                    Some(SubscriptionEvent::Complete { now })
                } else if state.cycles_elapsed > sub.current_billing_cycle {
                    let cycle = sub.current_billing_cycle + 1;
                    let (period_start, period_end) = cycle::period_for_cycle(sub, cycle);
                    Some(SubscriptionEvent::Renew {
                        cycle,
                        period_start,
                        period_end,
                        now,
                    })
                } else {
                    None
                }
            }
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PeriodUnit;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn subscription() -> subscriptions::Model {
        subscriptions::Model {
            id: 42,
            owner_id: 1,
            account_id: 2,
            plan_id: 3,
            status: SubscriptionStatus::New,
            price_per_billing_cycle: 2500,
            setup_fee: 0,
            quantity: 1,
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
            created_at: Some(utc(2024, 1, 1)),
            updated_at: Some(utc(2024, 1, 1)),
        }
    }

    /// Drive the engine the way the sweep does: plan, apply, repeat until
    /// nothing is due. Returns the transitions in order.
    fn settle(sub: &mut subscriptions::Model, now: DateTime<Utc>) -> Vec<Transition> {
        let mut transitions = Vec::new();
        while let Some(event) = plan_event(sub, now) {
            let (next, transition) = apply(sub, &event).unwrap();
            *sub = next;
            transitions.push(transition);
        }
        transitions
    }

    #[test]
    fn test_validate_schedule() {
        assert!(validate_schedule(1, None, 0).is_ok());
        assert!(validate_schedule(30, Some(14), 12).is_ok());
        assert!(validate_schedule(0, None, 0).is_err());
        assert!(validate_schedule(-1, None, 0).is_err());
        assert!(validate_schedule(1, Some(0), 0).is_err());
        assert!(validate_schedule(1, None, -1).is_err());
    }

    #[test]
    fn test_new_subscription_parks_as_future() {
        let mut sub = subscription();
        sub.starts_at = utc(2024, 6, 1);
        let transitions = settle(&mut sub, utc(2024, 5, 1));
        assert_eq!(transitions.len(), 1);
        assert_eq!(sub.status, SubscriptionStatus::Future);
        // nothing further until starts_at
        assert!(plan_event(&sub, utc(2024, 5, 2)).is_none());
    }

    #[test]
    fn test_activation_without_trial() {
        let mut sub = subscription();
        let transitions = settle(&mut sub, utc(2024, 1, 1));
        assert_eq!(transitions.len(), 1);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.current_period_start, Some(utc(2024, 1, 1)));
        assert_eq!(sub.current_period_end, Some(utc(2024, 2, 1)));
    }

    #[test]
    fn test_trial_then_activation() {
        let mut sub = subscription();
        sub.trial_period = Some(14);
        sub.trial_period_unit = PeriodUnit::Days;

        settle(&mut sub, utc(2024, 1, 2));
        assert_eq!(sub.status, SubscriptionStatus::InTrial);
        assert_eq!(sub.current_period_end, Some(utc(2024, 1, 15)));

        settle(&mut sub, utc(2024, 1, 15));
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.current_period_start, Some(utc(2024, 1, 15)));
        assert_eq!(sub.current_period_end, Some(utc(2024, 2, 15)));
        assert_eq!(sub.current_billing_cycle, 0);
    }

    #[test]
    fn test_catch_up_renews_one_cycle_per_event() {
        let mut sub = subscription();
        settle(&mut sub, utc(2024, 1, 1));

        // Three boundaries crossed while the sweep was down.
        let transitions = settle(&mut sub, utc(2024, 4, 10));
        let cycles: Vec<_> = transitions.iter().filter_map(|t| t.cycle_number).collect();
        assert_eq!(cycles, vec![1, 2, 3]);
        assert_eq!(sub.current_billing_cycle, 3);
        assert_eq!(sub.current_period_start, Some(utc(2024, 4, 1)));
        assert_eq!(sub.current_period_end, Some(utc(2024, 5, 1)));

        // Idempotent: settled state plans nothing at the same instant.
        assert!(plan_event(&sub, utc(2024, 4, 10)).is_none());
    }

    #[test]
    fn test_limited_subscription_expires_after_last_cycle() {
        let mut sub = subscription();
        sub.total_billing_cycles = 3;
        settle(&mut sub, utc(2024, 1, 1));

        let transitions = settle(&mut sub, utc(2024, 2, 1));
        assert_eq!(transitions.last().and_then(|t| t.cycle_number), Some(1));
        let transitions = settle(&mut sub, utc(2024, 3, 1));
        assert_eq!(transitions.last().and_then(|t| t.cycle_number), Some(2));

        // The third boundary bills the last cycle and, with every paid
        // period now elapsed, expires the subscription.
        let transitions = settle(&mut sub, utc(2024, 4, 1));
        let cycles: Vec<_> = transitions.iter().map(|t| t.cycle_number).collect();
        assert_eq!(cycles, vec![Some(3), None]);
        assert_eq!(sub.status, SubscriptionStatus::Expired);
        assert_eq!(sub.current_billing_cycle, 3);

        // Terminal: no further events, no further ledger writes.
        assert!(plan_event(&sub, utc(2024, 5, 1)).is_none());
    }

    #[test]
    fn test_pause_freezes_and_resume_restores_cadence() {
        let mut sub = subscription();
        settle(&mut sub, utc(2024, 1, 1));

        let (paused, _) =
            apply(&sub, &SubscriptionEvent::Pause { now: utc(2024, 1, 10) }).unwrap();
        sub = paused;
        // The sweep leaves paused subscriptions alone.
        assert!(plan_event(&sub, utc(2024, 3, 1)).is_none());

        let (resumed, _) =
            apply(&sub, &SubscriptionEvent::Resume { now: utc(2024, 1, 20) }).unwrap();
        sub = resumed;
        // Ten paused days push the boundary from Feb 1 to Feb 11.
        assert!(plan_event(&sub, utc(2024, 2, 5)).is_none());
        let event = plan_event(&sub, utc(2024, 2, 11)).unwrap();
        assert!(matches!(event, SubscriptionEvent::Renew { cycle: 1, .. }));
    }

    #[test]
    fn test_non_renewing_trial_lands_pending() {
        let mut sub = subscription();
        sub.renews = false;
        sub.trial_period = Some(14);
        settle(&mut sub, utc(2024, 1, 2));
        settle(&mut sub, utc(2024, 2, 1));
        assert_eq!(sub.status, SubscriptionStatus::Pending);
        // Pending waits for an external signal; the sweep plans nothing.
        assert!(plan_event(&sub, utc(2024, 3, 1)).is_none());
    }
}
