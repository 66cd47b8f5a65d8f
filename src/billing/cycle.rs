use super::calendar::add_period;
use crate::entities::{SubscriptionStatus, subscriptions};
use chrono::{DateTime, Duration, Utc};

/// Where a subscription sits relative to its schedule at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `now` is before `starts_at`.
    Future,
    /// Inside the configured trial window.
    Trial,
    /// Past the trial (or no trial); the paid billing clock is running.
    Billing,
}

#[derive(Debug, Clone)]
pub struct CycleState {
    pub phase: Phase,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    /// Completed billing cycles since the billing clock started.
    pub cycles_elapsed: i32,
    pub due_for_transition: bool,
}

pub fn trial_end(sub: &subscriptions::Model) -> Option<DateTime<Utc>> {
    sub.trial_period
        .filter(|p| *p > 0)
        .map(|p| add_period(sub.starts_at, p as u32, sub.trial_period_unit))
}

/// The instant the paid billing clock starts: end of trial, or `starts_at`.
pub fn billing_clock_start(sub: &subscriptions::Model) -> DateTime<Utc> {
    trial_end(sub).unwrap_or(sub.starts_at)
}

/// Canonical start boundary of cycle index `k`, before any pause shift.
/// Always derived from the clock start in one jump so month-length
/// clamping never accumulates.
fn boundary(sub: &subscriptions::Model, k: i32) -> DateTime<Utc> {
    let term = sub.term.max(1) as u32;
    add_period(billing_clock_start(sub), k.max(0) as u32 * term, sub.term_unit)
}

/// Pause/resume shifts the current period forward so no cycle is lost.
/// The accumulated shift is recoverable from the stored period start of
/// the cycle the subscription currently sits in.
fn pause_drift(sub: &subscriptions::Model) -> Duration {
    if sub.activated_at.is_none() || sub.status == SubscriptionStatus::InTrial {
        return Duration::zero();
    }
    match sub.current_period_start {
        Some(start) => (start - boundary(sub, sub.current_billing_cycle)).max(Duration::zero()),
        None => Duration::zero(),
    }
}

/// Period bracketing cycle index `k`, pause shift applied.
pub fn period_for_cycle(sub: &subscriptions::Model, k: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    let drift = pause_drift(sub);
    (boundary(sub, k) + drift, boundary(sub, k + 1) + drift)
}

/// Derive the current billing period and elapsed-cycle count from the
/// stored schedule fields. Pure in (snapshot, now); never reads the clock.
pub fn compute_cycle(sub: &subscriptions::Model, now: DateTime<Utc>) -> CycleState {
    use SubscriptionStatus::*;

    if now < sub.starts_at {
        let first_end = trial_end(sub).unwrap_or_else(|| boundary(sub, 1));
        return CycleState {
            phase: Phase::Future,
            period_start: sub.starts_at,
            period_end: first_end,
            cycles_elapsed: 0,
            due_for_transition: false,
        };
    }

    if let Some(te) = trial_end(sub)
        && now < te
    {
        return CycleState {
            phase: Phase::Trial,
            period_start: sub.starts_at,
            period_end: te,
            cycles_elapsed: 0,
            due_for_transition: matches!(sub.status, New | Future),
        };
    }

    let drift = pause_drift(sub);
    let effective_now = now - drift;

    // Walk boundaries with add_period; a boundary that has been reached
    // counts its cycle as completed.
    let mut k = 0i32;
    while boundary(sub, k + 1) <= effective_now {
        k += 1;
    }

    let total_reached =
        sub.total_billing_cycles > 0 && sub.current_billing_cycle >= sub.total_billing_cycles;
    let due_for_transition = match sub.status {
        // Activation or a just-crossed trial boundary.
        New | Future | InTrial => true,
        Active => total_reached || k > sub.current_billing_cycle,
        _ => false,
    };

    CycleState {
        phase: Phase::Billing,
        period_start: boundary(sub, k) + drift,
        period_end: boundary(sub, k + 1) + drift,
        cycles_elapsed: k,
        due_for_transition,
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

    fn subscription(starts_at: DateTime<Utc>, term: i32, term_unit: PeriodUnit) -> subscriptions::Model {
        subscriptions::Model {
            id: 1,
            owner_id: 1,
            account_id: 1,
            plan_id: 1,
            status: SubscriptionStatus::Active,
            price_per_billing_cycle: 999,
            setup_fee: 0,
            quantity: 1,
            starts_at,
            total_billing_cycles: 0,
            current_billing_cycle: 0,
            renews: true,
            trial_period: None,
            trial_period_unit: PeriodUnit::Days,
            term,
            term_unit,
            activated_at: Some(starts_at),
            cancelled_at: None,
            paused_at: None,
            current_period_start: Some(starts_at),
            current_period_end: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_monthly_cycle_boundary() {
        let sub = subscription(utc(2024, 1, 1), 1, PeriodUnit::Months);
        let state = compute_cycle(&sub, utc(2024, 2, 1));
        assert_eq!(state.phase, Phase::Billing);
        assert_eq!(state.cycles_elapsed, 1);
        assert_eq!(state.period_start, utc(2024, 2, 1));
        assert_eq!(state.period_end, utc(2024, 3, 1));
        assert!(state.due_for_transition);
    }

    #[test]
    fn test_month_end_clamping() {
        let sub = subscription(utc(2024, 1, 31), 1, PeriodUnit::Months);
        let state = compute_cycle(&sub, utc(2024, 2, 1));
        assert_eq!(state.cycles_elapsed, 0);
        assert_eq!(state.period_end, utc(2024, 2, 29)); // leap year

        let sub = subscription(utc(2023, 1, 31), 1, PeriodUnit::Months);
        let state = compute_cycle(&sub, utc(2023, 2, 1));
        assert_eq!(state.period_end, utc(2023, 2, 28));
    }

    #[test]
    fn test_trial_phase_then_billing() {
        let mut sub = subscription(utc(2024, 1, 1), 1, PeriodUnit::Months);
        sub.trial_period = Some(14);
        sub.trial_period_unit = PeriodUnit::Days;
        sub.status = SubscriptionStatus::InTrial;
        sub.activated_at = None;

        let state = compute_cycle(&sub, utc(2024, 1, 10));
        assert_eq!(state.phase, Phase::Trial);
        assert_eq!(state.period_start, utc(2024, 1, 1));
        assert_eq!(state.period_end, utc(2024, 1, 15));
        assert_eq!(state.cycles_elapsed, 0);

        let state = compute_cycle(&sub, utc(2024, 1, 20));
        assert_eq!(state.phase, Phase::Billing);
        assert_eq!(state.cycles_elapsed, 0);
        assert_eq!(state.period_start, utc(2024, 1, 15));
        assert_eq!(state.period_end, utc(2024, 2, 15));
        // trial boundary crossed while still in_trial
        assert!(state.due_for_transition);
    }

    #[test]
    fn test_before_start_is_future() {
        let sub = subscription(utc(2024, 6, 1), 30, PeriodUnit::Days);
        let state = compute_cycle(&sub, utc(2024, 5, 20));
        assert_eq!(state.phase, Phase::Future);
        assert_eq!(state.cycles_elapsed, 0);
        assert!(!state.due_for_transition);
    }

    #[test]
    fn test_cycles_elapsed_is_monotonic() {
        let sub = subscription(utc(2024, 1, 31), 1, PeriodUnit::Months);
        let mut last = 0;
        let mut now = utc(2024, 1, 31);
        for _ in 0..400 {
            now += Duration::days(1);
            let state = compute_cycle(&sub, now);
            assert!(state.cycles_elapsed >= last);
            assert!(state.period_start <= now && now < state.period_end);
            last = state.cycles_elapsed;
        }
    }

    #[test]
    fn test_total_cycles_reached_reports_due() {
        let mut sub = subscription(utc(2024, 1, 1), 1, PeriodUnit::Months);
        sub.total_billing_cycles = 3;
        sub.current_billing_cycle = 3;
        let state = compute_cycle(&sub, utc(2024, 4, 2));
        assert!(state.due_for_transition);
    }

    #[test]
    fn test_pause_drift_shifts_boundaries() {
        let mut sub = subscription(utc(2024, 1, 1), 30, PeriodUnit::Days);
        // Period was shifted 10 days forward by a pause/resume.
        sub.current_period_start = Some(utc(2024, 1, 11));
        sub.current_period_end = Some(utc(2024, 2, 10));

        // Without drift the first cycle would complete on Jan 31.
        let state = compute_cycle(&sub, utc(2024, 2, 5));
        assert_eq!(state.cycles_elapsed, 0);
        assert_eq!(state.period_start, utc(2024, 1, 11));
        assert_eq!(state.period_end, utc(2024, 2, 10));

        let state = compute_cycle(&sub, utc(2024, 2, 10));
        assert_eq!(state.cycles_elapsed, 1);
        assert_eq!(state.period_start, utc(2024, 2, 10));
    }
}
