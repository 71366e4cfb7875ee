use chrono::NaiveDate;
use serde::Serialize;

/// Hard ceiling on the number of simulated months, whatever the caller asks for.
pub const MAX_HORIZON_MONTHS: u32 = 1200;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum PrepaymentPolicy {
    /// Level payment is unchanged; the loan simply amortizes sooner.
    #[default]
    KeepPaymentReduceTerm,
    /// Payment is recomputed over the months left in the amortization.
    RecomputePaymentKeepTerm,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum InsolvencyPolicy {
    #[default]
    ContinueToHorizon,
    StopAtInsolvency,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShockKind {
    /// One-time deduction of `magnitude` from cash.
    Fixed,
    /// One-time deduction of `magnitude` (a fraction) of the cash held at month start.
    PercentOfCash,
    /// Permanent increase of recurring expenses by `magnitude` (a fraction).
    RecurringExpenseMultiplier,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledShock {
    pub kind: ShockKind,
    pub magnitude: f64,
    pub month: u32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Prepayment {
    pub amount: f64,
    pub trigger_month: u32,
    pub penalty: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EarlyStop {
    pub enabled: bool,
    /// Cash below this level is treated as unrecoverable.
    pub cash_floor: f64,
    /// A paid-off run is never cut short at or before this month.
    pub min_months: u32,
}

impl Default for EarlyStop {
    fn default() -> Self {
        Self {
            enabled: true,
            cash_floor: -1_000_000.0,
            min_months: 72,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimulationOptions {
    pub horizon_months: u32,
    pub prepayment_policy: PrepaymentPolicy,
    pub insolvency_policy: InsolvencyPolicy,
    pub early_stop: EarlyStop,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            horizon_months: 480,
            prepayment_policy: PrepaymentPolicy::default(),
            insolvency_policy: InsolvencyPolicy::default(),
            early_stop: EarlyStop::default(),
        }
    }
}

/// Everything a single run needs. Rates are fractions (0.038 = 3.8%).
#[derive(Debug, Clone)]
pub struct ScenarioInput {
    pub current_age: u32,
    pub start_date: Option<NaiveDate>,
    pub liquid_cash: f64,
    pub future_cash_inflow: f64,
    /// `None` folds the inflow into starting cash.
    pub windfall_month: Option<u32>,
    pub house_price: f64,
    pub down_payment: f64,
    pub closing_cost_rate: f64,
    pub down_payment_from_cash: bool,
    pub nominal_annual_rate: f64,
    pub amortization_years: u32,
    pub renewal_term_years: u32,
    pub renewal_rate: Option<f64>,
    pub monthly_income: f64,
    pub income_growth_rate: f64,
    pub income_ceiling: Option<f64>,
    pub ceiling_growth_rate: f64,
    pub monthly_living_expense: f64,
    pub monthly_housing_carrying_cost: f64,
    pub expense_inflation_rate: f64,
    pub prepayment: Option<Prepayment>,
    pub scheduled_shock: Option<ScheduledShock>,
    pub options: SimulationOptions,
}

impl ScenarioInput {
    pub fn loan_principal(&self) -> f64 {
        (self.house_price - self.down_payment).max(0.0)
    }

    pub fn closing_costs(&self) -> f64 {
        self.house_price.max(0.0) * self.closing_cost_rate
    }

    pub fn initial_cash(&self) -> f64 {
        let mut cash = self.liquid_cash - self.closing_costs();
        if self.down_payment_from_cash {
            cash -= self.down_payment.max(0.0);
        }
        if self.windfall_month.is_none() {
            cash += self.future_cash_inflow;
        }
        cash
    }

    pub fn horizon_months(&self) -> u32 {
        self.options.horizon_months.min(MAX_HORIZON_MONTHS)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSnapshot {
    pub month: u32,
    pub age: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub cash_balance: f64,
    pub loan_balance: f64,
    pub payment: f64,
    pub income: f64,
    pub expense: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSegment {
    pub start_month: u32,
    pub end_month: u32,
    pub payment: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    Horizon,
    CashFloor,
    PaidOffAndSettled,
    Insolvent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub loan_principal: f64,
    pub initial_cash: f64,
    pub initial_payment: f64,
    pub renewal_payment: Option<f64>,
    pub final_payment: f64,
    pub total_interest_paid: f64,
    pub insolvency_month: Option<u32>,
    pub payoff_month: Option<u32>,
    pub months_simulated: u32,
    pub stop_reason: StopReason,
    pub payment_segments: Vec<PaymentSegment>,
    pub time_series: Vec<MonthSnapshot>,
}

impl SimulationResult {
    pub fn snapshot(&self, month: u32) -> Option<&MonthSnapshot> {
        let idx = month.checked_sub(1)? as usize;
        self.time_series.get(idx)
    }

    pub fn is_solvent_through(&self, month: u32) -> bool {
        self.insolvency_month.is_none_or(|m| m > month)
    }
}
