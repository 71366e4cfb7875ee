use chrono::Months;
use log::debug;

use super::mortgage::{compute_payment, monthly_rate};
use super::types::{
    InsolvencyPolicy, MonthSnapshot, PaymentSegment, Prepayment, PrepaymentPolicy, ScenarioInput,
    ScheduledShock, ShockKind, SimulationResult, StopReason,
};

/// Balances below half a cent are treated as fully repaid.
const PAYOFF_EPSILON: f64 = 0.005;

#[derive(Debug)]
struct SimulationState {
    month: u32,
    loan_balance: f64,
    monthly_payment: f64,
    annual_rate: f64,
    monthly_rate: f64,
    cash_balance: f64,
    income: f64,
    income_ceiling: Option<f64>,
    living_expense: f64,
    carrying_cost: f64,
}

impl SimulationState {
    fn new(input: &ScenarioInput) -> Self {
        let principal = input.loan_principal();
        let payment = compute_payment(
            principal,
            input.nominal_annual_rate,
            input.amortization_years as f64,
        );
        Self {
            month: 0,
            loan_balance: principal,
            monthly_payment: payment,
            annual_rate: input.nominal_annual_rate,
            monthly_rate: monthly_rate(input.nominal_annual_rate),
            cash_balance: input.initial_cash(),
            income: clamp_to_ceiling(input.monthly_income, input.income_ceiling),
            income_ceiling: input.income_ceiling,
            living_expense: input.monthly_living_expense,
            carrying_cost: input.monthly_housing_carrying_cost,
        }
    }

    fn expense(&self) -> f64 {
        self.living_expense + self.carrying_cost
    }

    fn mark_paid_off(&mut self) {
        self.loan_balance = 0.0;
        self.monthly_payment = 0.0;
    }
}

#[derive(Debug, Default)]
struct SegmentTracker {
    segments: Vec<PaymentSegment>,
    open: Option<(u32, f64)>,
}

impl SegmentTracker {
    fn start(&mut self, month: u32, payment: f64) {
        self.close(month.saturating_sub(1));
        if payment > 0.0 {
            self.open = Some((month, payment));
        }
    }

    fn close(&mut self, end_month: u32) {
        if let Some((start_month, payment)) = self.open.take() {
            if end_month >= start_month {
                self.segments.push(PaymentSegment {
                    start_month,
                    end_month,
                    payment,
                });
            }
        }
    }

    fn finish(mut self, last_month: u32) -> Vec<PaymentSegment> {
        self.close(last_month);
        self.segments
    }
}

#[derive(Debug, Default)]
struct RunLedger {
    segments: SegmentTracker,
    insolvency_month: Option<u32>,
    payoff_month: Option<u32>,
    renewal_payment: Option<f64>,
    total_interest_paid: f64,
}

impl RunLedger {
    fn record_payoff(&mut self, month: u32) {
        if self.payoff_month.is_none() {
            debug!("loan paid off in month {month}");
            self.payoff_month = Some(month);
            // Nothing is charged in the payoff month itself.
            self.segments.close(month.saturating_sub(1));
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct AmortizationStep {
    interest_paid: f64,
    payment_charged: f64,
    paid_off: bool,
}

/// Runs one deterministic month-by-month projection of cash and mortgage balance.
///
/// The run never fails: degenerate mortgage parameters (no principal, a
/// non-positive rate or term) produce a zero payment and the projection
/// continues on income, expenses and events alone. Events scheduled past the
/// last simulated month never fire.
pub fn simulate(input: &ScenarioInput) -> SimulationResult {
    let mut state = SimulationState::new(input);
    let mut ledger = RunLedger::default();
    let horizon = input.horizon_months();

    let loan_principal = state.loan_balance;
    let initial_cash = state.cash_balance;
    let initial_payment = state.monthly_payment;
    ledger.segments.start(1, initial_payment);

    let mut time_series = Vec::with_capacity(horizon as usize);
    let mut stop_reason = StopReason::Horizon;

    for month in 1..=horizon {
        state.month = month;

        if month > 1 && (month - 1) % 12 == 0 {
            apply_annual_step(input, &mut state);
        }

        let event_cash = apply_scheduled_events(input, &mut state, &mut ledger);

        let step = amortize(&mut state);
        ledger.total_interest_paid += step.interest_paid;
        if step.paid_off {
            ledger.record_payoff(month);
        }

        if let Some(payment) = renew_if_due(input, &mut state) {
            ledger.renewal_payment.get_or_insert(payment);
            ledger.segments.start(month + 1, payment);
        }

        let recurring_net = state.income - state.expense() - step.payment_charged;
        state.cash_balance += recurring_net + event_cash;

        time_series.push(MonthSnapshot {
            month,
            age: input.current_age as f64 + month as f64 / 12.0,
            date: input
                .start_date
                .and_then(|d| d.checked_add_months(Months::new(month - 1))),
            cash_balance: state.cash_balance,
            loan_balance: state.loan_balance,
            payment: step.payment_charged,
            income: state.income,
            expense: state.expense(),
        });

        if state.cash_balance < 0.0 && ledger.insolvency_month.is_none() {
            debug!(
                "cash went negative in month {month}: {:.2}",
                state.cash_balance
            );
            ledger.insolvency_month = Some(month);
        }

        if let Some(reason) = early_stop_reason(input, &state, &ledger, recurring_net) {
            debug!("stopping after month {month}: {reason:?}");
            stop_reason = reason;
            break;
        }
    }

    let months_simulated = time_series.len() as u32;
    SimulationResult {
        loan_principal,
        initial_cash,
        initial_payment,
        renewal_payment: ledger.renewal_payment,
        final_payment: state.monthly_payment,
        total_interest_paid: ledger.total_interest_paid,
        insolvency_month: ledger.insolvency_month,
        payoff_month: ledger.payoff_month,
        months_simulated,
        stop_reason,
        payment_segments: ledger.segments.finish(months_simulated),
        time_series,
    }
}

fn clamp_to_ceiling(income: f64, ceiling: Option<f64>) -> f64 {
    match ceiling {
        Some(cap) => income.min(cap),
        None => income,
    }
}

fn apply_annual_step(input: &ScenarioInput, state: &mut SimulationState) {
    let grown = state.income * (1.0 + input.income_growth_rate);
    state.income_ceiling = state
        .income_ceiling
        .map(|cap| cap * (1.0 + input.ceiling_growth_rate));
    state.income = clamp_to_ceiling(grown, state.income_ceiling);

    let inflation = 1.0 + input.expense_inflation_rate;
    state.living_expense *= inflation;
    state.carrying_cost *= inflation;
}

/// Applies windfall, prepayment and shock for the current month and returns
/// the cash they move, settled together with the recurring flows.
fn apply_scheduled_events(
    input: &ScenarioInput,
    state: &mut SimulationState,
    ledger: &mut RunLedger,
) -> f64 {
    let month = state.month;
    let opening_cash = state.cash_balance;
    let mut delta = 0.0;

    if input.windfall_month == Some(month) {
        delta += input.future_cash_inflow;
    }

    if let Some(prepayment) = input.prepayment.filter(|p| p.trigger_month == month) {
        delta -= apply_prepayment(input, prepayment, state, ledger);
    }

    if let Some(shock) = input.scheduled_shock.filter(|s| s.month == month) {
        delta -= apply_shock(shock, opening_cash, state);
    }

    delta
}

/// Returns the cash leaving the household: the principal actually retired plus the penalty.
fn apply_prepayment(
    input: &ScenarioInput,
    prepayment: Prepayment,
    state: &mut SimulationState,
    ledger: &mut RunLedger,
) -> f64 {
    let applied = prepayment.amount.max(0.0).min(state.loan_balance);
    if applied <= 0.0 {
        return 0.0;
    }

    state.loan_balance -= applied;
    debug!(
        "prepaid {applied:.2} in month {}, balance now {:.2}",
        state.month, state.loan_balance
    );

    if state.loan_balance <= PAYOFF_EPSILON {
        state.mark_paid_off();
        ledger.record_payoff(state.month);
    } else if input.options.prepayment_policy == PrepaymentPolicy::RecomputePaymentKeepTerm {
        let total_months = input.amortization_years.saturating_mul(12);
        let remaining_months = total_months.saturating_sub(state.month - 1);
        if remaining_months > 0 {
            state.monthly_payment = compute_payment(
                state.loan_balance,
                state.annual_rate,
                remaining_months as f64 / 12.0,
            );
            ledger.segments.start(state.month, state.monthly_payment);
        }
    }

    applied + prepayment.penalty.max(0.0)
}

/// Returns the one-off cash deduction; the expense multiplier moves no cash itself.
fn apply_shock(shock: ScheduledShock, opening_cash: f64, state: &mut SimulationState) -> f64 {
    debug!(
        "applying {:?} shock of {} in month {}",
        shock.kind, shock.magnitude, state.month
    );
    match shock.kind {
        ShockKind::Fixed => shock.magnitude.max(0.0),
        ShockKind::PercentOfCash => opening_cash.max(0.0) * shock.magnitude.clamp(0.0, 1.0),
        ShockKind::RecurringExpenseMultiplier => {
            let factor = 1.0 + shock.magnitude.max(0.0);
            state.living_expense *= factor;
            state.carrying_cost *= factor;
            0.0
        }
    }
}

fn amortize(state: &mut SimulationState) -> AmortizationStep {
    if state.loan_balance <= 0.0 {
        return AmortizationStep::default();
    }

    let interest = state.loan_balance * state.monthly_rate;
    let principal_paid = (state.monthly_payment - interest).max(0.0);
    state.loan_balance -= principal_paid;

    if state.loan_balance <= PAYOFF_EPSILON {
        state.mark_paid_off();
        return AmortizationStep {
            interest_paid: 0.0,
            payment_charged: 0.0,
            paid_off: true,
        };
    }

    AmortizationStep {
        interest_paid: interest.min(state.monthly_payment),
        payment_charged: state.monthly_payment,
        paid_off: false,
    }
}

/// Recomputes the payment at the end of each renewal term; the new payment
/// applies from the following month.
fn renew_if_due(input: &ScenarioInput, state: &mut SimulationState) -> Option<f64> {
    let term_months = input.renewal_term_years.checked_mul(12)?;
    if term_months == 0 || state.month % term_months != 0 || state.loan_balance <= 0.0 {
        return None;
    }

    let elapsed_years = state.month / 12;
    let remaining_years = input
        .amortization_years
        .checked_sub(elapsed_years)
        .filter(|years| *years > 0)?;

    let rate = input.renewal_rate.unwrap_or(input.nominal_annual_rate);
    state.annual_rate = rate;
    state.monthly_rate = monthly_rate(rate);
    state.monthly_payment = compute_payment(state.loan_balance, rate, remaining_years as f64);
    debug!(
        "renewal after month {}: balance {:.2} over {remaining_years} years at {:.3}% -> {:.2}/month",
        state.month,
        state.loan_balance,
        rate * 100.0,
        state.monthly_payment
    );
    Some(state.monthly_payment)
}

fn early_stop_reason(
    input: &ScenarioInput,
    state: &SimulationState,
    ledger: &RunLedger,
    recurring_net: f64,
) -> Option<StopReason> {
    if input.options.insolvency_policy == InsolvencyPolicy::StopAtInsolvency
        && ledger.insolvency_month.is_some()
    {
        return Some(StopReason::Insolvent);
    }

    let early = input.options.early_stop;
    if !early.enabled {
        return None;
    }
    if state.cash_balance < early.cash_floor {
        return Some(StopReason::CashFloor);
    }
    if state.loan_balance <= 0.0
        && state.month > early.min_months
        && cash_is_settled(input, state, ledger, recurring_net)
    {
        return Some(StopReason::PaidOffAndSettled);
    }
    None
}

/// Cash has nothing left to reveal once insolvency is on record, or when the
/// household runs a surplus that no pending shock or expense inflation can erode.
fn cash_is_settled(
    input: &ScenarioInput,
    state: &SimulationState,
    ledger: &RunLedger,
    recurring_net: f64,
) -> bool {
    if ledger.insolvency_month.is_some() {
        return true;
    }
    if recurring_net < 0.0 {
        return false;
    }
    if input
        .scheduled_shock
        .is_some_and(|shock| shock.month > state.month)
    {
        return false;
    }
    // A shrinking ceiling drags income down even with flat expenses.
    let income_growth_floor = match state.income_ceiling {
        Some(_) => input.income_growth_rate.min(input.ceiling_growth_rate),
        None => input.income_growth_rate,
    };
    income_growth_floor >= input.expense_inflation_rate.max(0.0)
}
