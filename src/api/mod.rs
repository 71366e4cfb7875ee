mod error;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    EarlyStop, GoalSolveConfig, GoalSolveResult, GoalType, InsolvencyPolicy, MAX_HORIZON_MONTHS,
    Prepayment, PrepaymentPolicy, ScenarioInput, ScheduledShock, ShockKind, SimulationOptions,
    SimulationResult, simulate, solve_goal,
};
use crate::shocks::{ResolvedShock, ShockCatalog};

pub use error::RequestError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPrepaymentPolicy {
    KeepPayment,
    RecomputePayment,
}

impl From<CliPrepaymentPolicy> for PrepaymentPolicy {
    fn from(value: CliPrepaymentPolicy) -> Self {
        match value {
            CliPrepaymentPolicy::KeepPayment => PrepaymentPolicy::KeepPaymentReduceTerm,
            CliPrepaymentPolicy::RecomputePayment => PrepaymentPolicy::RecomputePaymentKeepTerm,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliInsolvencyPolicy {
    Continue,
    Stop,
}

impl From<CliInsolvencyPolicy> for InsolvencyPolicy {
    fn from(value: CliInsolvencyPolicy) -> Self {
        match value {
            CliInsolvencyPolicy::Continue => InsolvencyPolicy::ContinueToHorizon,
            CliInsolvencyPolicy::Stop => InsolvencyPolicy::StopAtInsolvency,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliShockKind {
    Fixed,
    PercentOfCash,
    ExpenseMultiplier,
}

impl From<CliShockKind> for ShockKind {
    fn from(value: CliShockKind) -> Self {
        match value {
            CliShockKind::Fixed => ShockKind::Fixed,
            CliShockKind::PercentOfCash => ShockKind::PercentOfCash,
            CliShockKind::ExpenseMultiplier => ShockKind::RecurringExpenseMultiplier,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPrepaymentPolicy {
    #[serde(alias = "keepPayment", alias = "keep_payment")]
    KeepPayment,
    #[serde(alias = "recomputePayment", alias = "recompute_payment")]
    RecomputePayment,
}

impl From<ApiPrepaymentPolicy> for CliPrepaymentPolicy {
    fn from(value: ApiPrepaymentPolicy) -> Self {
        match value {
            ApiPrepaymentPolicy::KeepPayment => CliPrepaymentPolicy::KeepPayment,
            ApiPrepaymentPolicy::RecomputePayment => CliPrepaymentPolicy::RecomputePayment,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiInsolvencyPolicy {
    #[serde(alias = "continueToHorizon", alias = "continue-to-horizon")]
    Continue,
    #[serde(alias = "stopAtInsolvency", alias = "stop-at-insolvency")]
    Stop,
}

impl From<ApiInsolvencyPolicy> for CliInsolvencyPolicy {
    fn from(value: ApiInsolvencyPolicy) -> Self {
        match value {
            ApiInsolvencyPolicy::Continue => CliInsolvencyPolicy::Continue,
            ApiInsolvencyPolicy::Stop => CliInsolvencyPolicy::Stop,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiShockKind {
    Fixed,
    #[serde(alias = "percentOfCash", alias = "percent_of_cash", alias = "percent")]
    PercentOfCash,
    #[serde(
        alias = "expenseMultiplier",
        alias = "expense_multiplier",
        alias = "recurring-expense-multiplier"
    )]
    ExpenseMultiplier,
}

impl From<ApiShockKind> for CliShockKind {
    fn from(value: ApiShockKind) -> Self {
        match value {
            ApiShockKind::Fixed => CliShockKind::Fixed,
            ApiShockKind::PercentOfCash => CliShockKind::PercentOfCash,
            ApiShockKind::ExpenseMultiplier => CliShockKind::ExpenseMultiplier,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiGoalType {
    #[serde(alias = "minimumIncome", alias = "minimum_income", alias = "min-income")]
    MinimumIncome,
    #[serde(
        alias = "maxLivingExpense",
        alias = "max_living_expense",
        alias = "max-expense"
    )]
    MaxLivingExpense,
}

impl From<ApiGoalType> for GoalType {
    fn from(value: ApiGoalType) -> Self {
        match value {
            ApiGoalType::MinimumIncome => GoalType::MinimumIncome,
            ApiGoalType::MaxLivingExpense => GoalType::MaxLivingExpense,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    current_age: Option<u32>,
    start_date: Option<NaiveDate>,

    liquid_cash: Option<f64>,
    future_cash_inflow: Option<f64>,
    windfall_month: Option<u32>,

    house_price: Option<f64>,
    down_payment: Option<f64>,
    closing_cost_rate: Option<f64>,
    down_payment_from_cash: Option<bool>,

    rate: Option<f64>,
    amortization_years: Option<u32>,
    renewal_term_years: Option<u32>,
    renewal_rate: Option<f64>,

    monthly_income: Option<f64>,
    income_growth: Option<f64>,
    income_ceiling: Option<f64>,
    ceiling_growth: Option<f64>,
    living_expense: Option<f64>,
    carrying_cost: Option<f64>,
    expense_inflation: Option<f64>,

    prepayment_amount: Option<f64>,
    prepayment_month: Option<u32>,
    prepayment_penalty: Option<f64>,
    prepayment_policy: Option<ApiPrepaymentPolicy>,

    shock_kind: Option<ApiShockKind>,
    shock_magnitude: Option<f64>,
    shock_month: Option<u32>,
    shock_seed: Option<u64>,

    horizon_months: Option<u32>,
    insolvency_policy: Option<ApiInsolvencyPolicy>,
    early_stop: Option<bool>,
    cash_floor: Option<f64>,
    min_months: Option<u32>,

    goal: Option<ApiGoalType>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
    survive_months: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "brokedate",
    about = "Mortgage runway forecaster: when does cash run out, and when is the mortgage paid off"
)]
struct Cli {
    #[arg(long, default_value_t = 35)]
    current_age: u32,
    #[arg(long, help = "Calendar date of the first simulated month, e.g. 2025-11-01")]
    start_date: Option<NaiveDate>,
    #[arg(long, default_value_t = 190000.0, help = "Cash on hand today")]
    liquid_cash: f64,
    #[arg(
        long,
        default_value_t = 100000.0,
        help = "One-off inflow such as a maturing term deposit"
    )]
    future_cash_inflow: f64,
    #[arg(
        long,
        default_value_t = 6,
        help = "Month the inflow arrives; 0 adds it to starting cash"
    )]
    windfall_month: u32,
    #[arg(long, default_value_t = 420000.0)]
    house_price: f64,
    #[arg(long, default_value_t = 110000.0)]
    down_payment: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Closing costs as percent of house price"
    )]
    closing_cost_rate: f64,
    #[arg(
        long,
        help = "Pay the down payment out of liquid cash instead of treating it as already spent"
    )]
    down_payment_from_cash: bool,
    #[arg(
        long,
        default_value_t = 3.8,
        help = "Posted nominal annual rate in percent, compounded semi-annually"
    )]
    rate: f64,
    #[arg(long, default_value_t = 25, help = "Amortization period in years (25 or 30)")]
    amortization_years: u32,
    #[arg(long, default_value_t = 5, help = "Contract term in years between renewals")]
    renewal_term_years: u32,
    #[arg(
        long,
        help = "Nominal rate in percent from the first renewal on; defaults to --rate"
    )]
    renewal_rate: Option<f64>,
    #[arg(long, default_value_t = 2330.0, help = "Net monthly income")]
    monthly_income: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual income growth in percent"
    )]
    income_growth_rate: f64,
    #[arg(long, help = "Monthly income ceiling; income never grows above it")]
    income_ceiling: Option<f64>,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual growth of the income ceiling in percent"
    )]
    ceiling_growth_rate: f64,
    #[arg(long, default_value_t = 3302.0)]
    monthly_living_expense: f64,
    #[arg(
        long,
        default_value_t = 408.0,
        help = "Property tax, insurance and other monthly carrying costs"
    )]
    monthly_housing_carrying_cost: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual inflation of both expense lines in percent"
    )]
    expense_inflation_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Extra principal paid once")]
    prepayment_amount: f64,
    #[arg(long, default_value_t = 6)]
    prepayment_month: u32,
    #[arg(long, default_value_t = 0.0)]
    prepayment_penalty: f64,
    #[arg(long, value_enum, default_value_t = CliPrepaymentPolicy::KeepPayment)]
    prepayment_policy: CliPrepaymentPolicy,
    #[arg(long, value_enum)]
    shock_kind: Option<CliShockKind>,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Shock size: currency for fixed, percent for percent-of-cash and expense-multiplier"
    )]
    shock_magnitude: f64,
    #[arg(long, default_value_t = 0)]
    shock_month: u32,
    #[arg(
        long,
        help = "Draw a shock from the built-in catalog with this seed (ignored with --shock-kind)"
    )]
    shock_seed: Option<u64>,
    #[arg(long, default_value_t = 480)]
    horizon_months: u32,
    #[arg(long, value_enum, default_value_t = CliInsolvencyPolicy::Continue)]
    insolvency_policy: CliInsolvencyPolicy,
    #[arg(long, help = "Always simulate to the horizon")]
    no_early_stop: bool,
    #[arg(
        long,
        allow_negative_numbers = true,
        default_value_t = -1000000.0,
        help = "Stop once cash falls below this level"
    )]
    cash_floor: f64,
    #[arg(
        long,
        default_value_t = 72,
        help = "A paid-off run is not cut short before this month"
    )]
    min_months: u32,
}

#[derive(Copy, Clone, Debug)]
struct ApiOptions {
    goal: GoalType,
    search_min: f64,
    search_max: f64,
    tolerance: f64,
    max_iterations: u32,
    survive_months: Option<u32>,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            goal: GoalType::MinimumIncome,
            search_min: 0.0,
            search_max: 50_000.0,
            tolerance: 1.0,
            max_iterations: 60,
            survive_months: None,
        }
    }
}

#[derive(Debug)]
struct ScenarioRequest {
    input: ScenarioInput,
    shock: Option<ResolvedShock>,
}

#[derive(Debug)]
struct ApiRequest {
    scenario: ScenarioRequest,
    options: ApiOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    result: SimulationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    baseline: Option<SimulationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shock: Option<ResolvedShock>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn percent(value: f64) -> f64 {
    value / 100.0
}

fn build_inputs(cli: &Cli) -> Result<ScenarioInput, RequestError> {
    if cli.current_age > 120 {
        return Err(RequestError::invalid("--current-age", "must be <= 120"));
    }

    for (flag, value) in [
        ("--liquid-cash", cli.liquid_cash),
        ("--future-cash-inflow", cli.future_cash_inflow),
        ("--house-price", cli.house_price),
        ("--down-payment", cli.down_payment),
        ("--monthly-income", cli.monthly_income),
        ("--monthly-living-expense", cli.monthly_living_expense),
        (
            "--monthly-housing-carrying-cost",
            cli.monthly_housing_carrying_cost,
        ),
        ("--prepayment-amount", cli.prepayment_amount),
        ("--prepayment-penalty", cli.prepayment_penalty),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(RequestError::invalid(flag, "must be a finite value >= 0"));
        }
    }

    if cli.down_payment > cli.house_price {
        return Err(RequestError::invalid(
            "--down-payment",
            "must not exceed --house-price",
        ));
    }

    for (flag, value) in [
        ("--closing-cost-rate", cli.closing_cost_rate),
        ("--rate", cli.rate),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(RequestError::invalid(flag, "must be between 0 and 100"));
        }
    }
    if let Some(rate) = cli.renewal_rate {
        if !(0.0..=100.0).contains(&rate) {
            return Err(RequestError::invalid(
                "--renewal-rate",
                "must be between 0 and 100",
            ));
        }
    }

    if !matches!(cli.amortization_years, 25 | 30) {
        return Err(RequestError::invalid(
            "--amortization-years",
            "must be 25 or 30",
        ));
    }
    if cli.renewal_term_years == 0 {
        return Err(RequestError::invalid("--renewal-term-years", "must be > 0"));
    }

    for (flag, value) in [
        ("--income-growth-rate", cli.income_growth_rate),
        ("--ceiling-growth-rate", cli.ceiling_growth_rate),
        ("--expense-inflation-rate", cli.expense_inflation_rate),
    ] {
        if !value.is_finite() || value <= -100.0 {
            return Err(RequestError::invalid(flag, "must be > -100"));
        }
    }
    if let Some(ceiling) = cli.income_ceiling {
        if !ceiling.is_finite() || ceiling <= 0.0 {
            return Err(RequestError::invalid("--income-ceiling", "must be > 0"));
        }
    }

    if cli.prepayment_amount > 0.0 && cli.prepayment_month == 0 {
        return Err(RequestError::invalid("--prepayment-month", "must be >= 1"));
    }

    if cli.horizon_months == 0 || cli.horizon_months > MAX_HORIZON_MONTHS {
        return Err(RequestError::invalid(
            "--horizon-months",
            "must be between 1 and 1200",
        ));
    }
    if !cli.cash_floor.is_finite() || cli.cash_floor > 0.0 {
        return Err(RequestError::invalid("--cash-floor", "must be <= 0"));
    }

    let prepayment = (cli.prepayment_amount > 0.0).then_some(Prepayment {
        amount: cli.prepayment_amount,
        trigger_month: cli.prepayment_month,
        penalty: cli.prepayment_penalty,
    });

    Ok(ScenarioInput {
        current_age: cli.current_age,
        start_date: cli.start_date,
        liquid_cash: cli.liquid_cash,
        future_cash_inflow: cli.future_cash_inflow,
        windfall_month: (cli.windfall_month > 0).then_some(cli.windfall_month),
        house_price: cli.house_price,
        down_payment: cli.down_payment,
        closing_cost_rate: percent(cli.closing_cost_rate),
        down_payment_from_cash: cli.down_payment_from_cash,
        nominal_annual_rate: percent(cli.rate),
        amortization_years: cli.amortization_years,
        renewal_term_years: cli.renewal_term_years,
        renewal_rate: cli.renewal_rate.map(percent),
        monthly_income: cli.monthly_income,
        income_growth_rate: percent(cli.income_growth_rate),
        income_ceiling: cli.income_ceiling,
        ceiling_growth_rate: percent(cli.ceiling_growth_rate),
        monthly_living_expense: cli.monthly_living_expense,
        monthly_housing_carrying_cost: cli.monthly_housing_carrying_cost,
        expense_inflation_rate: percent(cli.expense_inflation_rate),
        prepayment,
        scheduled_shock: None,
        options: SimulationOptions {
            horizon_months: cli.horizon_months,
            prepayment_policy: cli.prepayment_policy.into(),
            insolvency_policy: cli.insolvency_policy.into(),
            early_stop: EarlyStop {
                enabled: !cli.no_early_stop,
                cash_floor: cli.cash_floor,
                min_months: cli.min_months,
            },
        },
    })
}

/// An explicit `--shock-kind` wins over `--shock-seed`.
fn resolve_shock(cli: &Cli) -> Result<Option<ResolvedShock>, RequestError> {
    if let Some(kind) = cli.shock_kind {
        if cli.shock_month == 0 {
            return Err(RequestError::invalid("--shock-month", "must be >= 1"));
        }
        if !cli.shock_magnitude.is_finite() || cli.shock_magnitude < 0.0 {
            return Err(RequestError::invalid("--shock-magnitude", "must be >= 0"));
        }
        let magnitude = match kind {
            CliShockKind::Fixed => cli.shock_magnitude,
            CliShockKind::PercentOfCash => {
                if cli.shock_magnitude > 100.0 {
                    return Err(RequestError::invalid(
                        "--shock-magnitude",
                        "must be <= 100 for percent-of-cash",
                    ));
                }
                percent(cli.shock_magnitude)
            }
            CliShockKind::ExpenseMultiplier => percent(cli.shock_magnitude),
        };
        return Ok(Some(ResolvedShock {
            name: "custom",
            shock: ScheduledShock {
                kind: kind.into(),
                magnitude,
                month: cli.shock_month,
            },
        }));
    }

    Ok(cli
        .shock_seed
        .and_then(|seed| ShockCatalog::default_catalog().draw(seed, cli.horizon_months)))
}

fn build_request(cli: &Cli) -> Result<ScenarioRequest, RequestError> {
    let mut input = build_inputs(cli)?;
    let shock = resolve_shock(cli)?;
    input.scheduled_shock = shock.as_ref().map(|s| s.shock);
    Ok(ScenarioRequest { input, shock })
}

/// Runs the scenario and, when a shock is scheduled, the unshocked baseline beside it.
fn run_scenario(request: ScenarioRequest) -> SimulateResponse {
    let result = simulate(&request.input);
    let baseline = request.input.scheduled_shock.map(|_| {
        let mut unshocked = request.input.clone();
        unshocked.scheduled_shock = None;
        simulate(&unshocked)
    });
    SimulateResponse {
        result,
        baseline,
        shock: request.shock,
    }
}

fn solve_config(input: &ScenarioInput, options: ApiOptions) -> GoalSolveConfig {
    GoalSolveConfig {
        goal_type: options.goal,
        survive_months: options
            .survive_months
            .unwrap_or_else(|| input.horizon_months()),
        search_min: options.search_min,
        search_max: options.search_max,
        tolerance: options.tolerance,
        max_iterations: options.max_iterations,
    }
}

/// Parses command-line flags, runs one scenario and returns the JSON response.
pub fn run_cli<I, T>(args: I) -> Result<String, RequestError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let request = build_request(&cli)?;
    let response = run_scenario(request);
    Ok(serde_json::to_string_pretty(&response)?)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/solve", get(solve_get_handler).post(solve_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("brokedate HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(payload: Result<Query<SimulatePayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => simulate_handler_impl(payload).await,
        Err(e) => rejected(RequestError::Payload(e.body_text())),
    }
}

async fn simulate_post_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => simulate_handler_impl(payload).await,
        Err(e) => rejected(RequestError::Payload(e.body_text())),
    }
}

async fn solve_get_handler(payload: Result<Query<SimulatePayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => solve_handler_impl(payload).await,
        Err(e) => rejected(RequestError::Payload(e.body_text())),
    }
}

async fn solve_post_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => solve_handler_impl(payload).await,
        Err(e) => rejected(RequestError::Payload(e.body_text())),
    }
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(e) => return rejected(e),
    };
    json_response(StatusCode::OK, run_scenario(request.scenario))
}

async fn solve_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(e) => return rejected(e),
    };
    let input = &request.scenario.input;
    match solve_goal(input, solve_config(input, request.options)) {
        Ok(result) => json_response::<GoalSolveResult>(StatusCode::OK, result),
        Err(e) => {
            warn!("rejected solve request: {e}");
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

fn rejected(err: RequestError) -> Response {
    warn!("rejected request: {err}");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, RequestError> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| RequestError::Payload(e.to_string()))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, RequestError> {
    let mut cli = default_cli_for_api();
    let mut options = ApiOptions::default();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if payload.start_date.is_some() {
        cli.start_date = payload.start_date;
    }

    if let Some(v) = payload.liquid_cash {
        cli.liquid_cash = v;
    }
    if let Some(v) = payload.future_cash_inflow {
        cli.future_cash_inflow = v;
    }
    if let Some(v) = payload.windfall_month {
        cli.windfall_month = v;
    }

    if let Some(v) = payload.house_price {
        cli.house_price = v;
    }
    if let Some(v) = payload.down_payment {
        cli.down_payment = v;
    }
    if let Some(v) = payload.closing_cost_rate {
        cli.closing_cost_rate = v;
    }
    if let Some(v) = payload.down_payment_from_cash {
        cli.down_payment_from_cash = v;
    }

    if let Some(v) = payload.rate {
        cli.rate = v;
    }
    if let Some(v) = payload.amortization_years {
        cli.amortization_years = v;
    }
    if let Some(v) = payload.renewal_term_years {
        cli.renewal_term_years = v;
    }
    if let Some(v) = payload.renewal_rate {
        cli.renewal_rate = Some(v);
    }

    if let Some(v) = payload.monthly_income {
        cli.monthly_income = v;
    }
    if let Some(v) = payload.income_growth {
        cli.income_growth_rate = v;
    }
    if let Some(v) = payload.income_ceiling {
        cli.income_ceiling = Some(v);
    }
    if let Some(v) = payload.ceiling_growth {
        cli.ceiling_growth_rate = v;
    }
    if let Some(v) = payload.living_expense {
        cli.monthly_living_expense = v;
    }
    if let Some(v) = payload.carrying_cost {
        cli.monthly_housing_carrying_cost = v;
    }
    if let Some(v) = payload.expense_inflation {
        cli.expense_inflation_rate = v;
    }

    if let Some(v) = payload.prepayment_amount {
        cli.prepayment_amount = v;
    }
    if let Some(v) = payload.prepayment_month {
        cli.prepayment_month = v;
    }
    if let Some(v) = payload.prepayment_penalty {
        cli.prepayment_penalty = v;
    }
    if let Some(v) = payload.prepayment_policy {
        cli.prepayment_policy = v.into();
    }

    if let Some(v) = payload.shock_kind {
        cli.shock_kind = Some(v.into());
    }
    if let Some(v) = payload.shock_magnitude {
        cli.shock_magnitude = v;
    }
    if let Some(v) = payload.shock_month {
        cli.shock_month = v;
    }
    if let Some(v) = payload.shock_seed {
        cli.shock_seed = Some(v);
    }

    if let Some(v) = payload.horizon_months {
        cli.horizon_months = v;
    }
    if let Some(v) = payload.insolvency_policy {
        cli.insolvency_policy = v.into();
    }
    if let Some(v) = payload.early_stop {
        cli.no_early_stop = !v;
    }
    if let Some(v) = payload.cash_floor {
        cli.cash_floor = v;
    }
    if let Some(v) = payload.min_months {
        cli.min_months = v;
    }

    if let Some(v) = payload.goal {
        options.goal = v.into();
    }
    if let Some(v) = payload.search_min {
        options.search_min = v;
    }
    if let Some(v) = payload.search_max {
        options.search_max = v;
    }
    if let Some(v) = payload.tolerance {
        options.tolerance = v;
    }
    if let Some(v) = payload.max_iterations {
        options.max_iterations = v;
    }
    if let Some(v) = payload.survive_months {
        options.survive_months = Some(v);
    }

    let scenario = build_request(&cli)?;
    Ok(ApiRequest { scenario, options })
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: 35,
        start_date: None,
        liquid_cash: 190_000.0,
        future_cash_inflow: 100_000.0,
        windfall_month: 6,
        house_price: 420_000.0,
        down_payment: 110_000.0,
        closing_cost_rate: 2.0,
        down_payment_from_cash: false,
        rate: 3.8,
        amortization_years: 25,
        renewal_term_years: 5,
        renewal_rate: None,
        monthly_income: 2_330.0,
        income_growth_rate: 0.0,
        income_ceiling: None,
        ceiling_growth_rate: 0.0,
        monthly_living_expense: 3_302.0,
        monthly_housing_carrying_cost: 408.0,
        expense_inflation_rate: 0.0,
        prepayment_amount: 0.0,
        prepayment_month: 6,
        prepayment_penalty: 0.0,
        prepayment_policy: CliPrepaymentPolicy::KeepPayment,
        shock_kind: None,
        shock_magnitude: 0.0,
        shock_month: 0,
        shock_seed: None,
        horizon_months: 480,
        insolvency_policy: CliInsolvencyPolicy::Continue,
        no_early_stop: false,
        cash_floor: -1_000_000.0,
        min_months: 72,
    }
}
