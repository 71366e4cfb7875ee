use serde::Serialize;
use thiserror::Error;

use super::{MAX_HORIZON_MONTHS, ScenarioInput, simulate};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalType {
    /// Smallest starting monthly income that stays solvent.
    MinimumIncome,
    /// Largest starting monthly living expense that stays solvent.
    MaxLivingExpense,
}

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub goal_type: GoalType,
    /// Cash must stay non-negative through this month.
    pub survive_months: u32,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub solvent: bool,
    pub insolvency_month: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveResult {
    pub goal_type: GoalType,
    pub survive_months: u32,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_value: Option<f64>,
    pub insolvency_month: Option<u32>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum SolveError {
    #[error("survive_months must be > 0")]
    ZeroSurviveMonths,
    #[error("survive_months must be <= {MAX_HORIZON_MONTHS}")]
    SurviveMonthsBeyondHorizonCap,
    #[error("search bounds must be finite")]
    NonFiniteBounds,
    #[error("search_max must be greater than search_min")]
    EmptySearchRange,
    #[error("tolerance must be > 0")]
    InvalidTolerance,
    #[error("max_iterations must be > 0")]
    ZeroIterations,
}

#[derive(Debug, Clone, Copy)]
struct CandidateEval {
    solvent: bool,
    insolvency_month: Option<u32>,
}

pub fn solve_goal(
    input: &ScenarioInput,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, SolveError> {
    validate_config(config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_eval = evaluate_candidate(input, config, config.search_min);
    let high_eval = evaluate_candidate(input, config, config.search_max);

    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    match config.goal_type {
        GoalType::MinimumIncome => {
            if low_eval.solvent {
                solved_value = Some(config.search_min);
                converged = true;
                feasible = true;
                message = "Already solvent at the lower income bound.".to_string();
            } else if !high_eval.solvent {
                feasible = false;
                message = "No solvent income found within the search bounds.".to_string();
            } else {
                let (value, done) = bisect(input, config, &mut iterations, true);
                solved_value = Some(value);
                converged = done;
                feasible = true;
                message = if converged {
                    "Solved minimum monthly income.".to_string()
                } else {
                    "Reached max iterations before tolerance was met; returning best estimate."
                        .to_string()
                };
            }
        }
        GoalType::MaxLivingExpense => {
            if !low_eval.solvent {
                feasible = false;
                message = "No solvent expense level found within the search bounds.".to_string();
            } else if high_eval.solvent {
                solved_value = Some(config.search_max);
                converged = true;
                feasible = true;
                message =
                    "Upper expense bound is still solvent; increase search max for a higher ceiling."
                        .to_string();
            } else {
                let (value, done) = bisect(input, config, &mut iterations, false);
                solved_value = Some(value);
                converged = done;
                feasible = true;
                message = if converged {
                    "Solved maximum monthly living expense.".to_string()
                } else {
                    "Reached max iterations before tolerance was met; returning best estimate."
                        .to_string()
                };
            }
        }
    }

    let insolvency_month = solved_value
        .map(|value| evaluate_candidate(input, config, value))
        .and_then(|eval| eval.insolvency_month);

    Ok(GoalSolveResult {
        goal_type: config.goal_type,
        survive_months: config.survive_months,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_value,
        insolvency_month,
        iterations,
        converged,
        feasible,
        message,
    })
}

/// Narrows `[search_min, search_max]` onto the solvency boundary. When
/// `solvent_above` is set, larger values are the solvent side.
fn bisect(
    input: &ScenarioInput,
    config: GoalSolveConfig,
    iterations: &mut Vec<GoalSolveIteration>,
    solvent_above: bool,
) -> (f64, bool) {
    let mut lo = config.search_min;
    let mut hi = config.search_max;
    let mut it = 0;
    while it < config.max_iterations {
        it += 1;
        let mid = (lo + hi) * 0.5;
        let eval = evaluate_candidate(input, config, mid);
        iterations.push(GoalSolveIteration {
            iteration: it,
            lower_bound: lo,
            upper_bound: hi,
            candidate_value: mid,
            solvent: eval.solvent,
            insolvency_month: eval.insolvency_month,
        });

        if eval.solvent == solvent_above {
            hi = mid;
        } else {
            lo = mid;
        }

        if (hi - lo).abs() <= config.tolerance {
            return (if solvent_above { hi } else { lo }, true);
        }
    }
    (if solvent_above { hi } else { lo }, false)
}

fn evaluate_candidate(
    base_input: &ScenarioInput,
    config: GoalSolveConfig,
    candidate_value: f64,
) -> CandidateEval {
    let mut input = base_input.clone();
    // Every month the goal asks about must actually be simulated.
    input.options.horizon_months = input
        .horizon_months()
        .max(config.survive_months)
        .min(MAX_HORIZON_MONTHS);
    match config.goal_type {
        GoalType::MinimumIncome => input.monthly_income = candidate_value.max(0.0),
        GoalType::MaxLivingExpense => input.monthly_living_expense = candidate_value.max(0.0),
    }

    let result = simulate(&input);
    CandidateEval {
        solvent: result.is_solvent_through(config.survive_months),
        insolvency_month: result.insolvency_month,
    }
}

fn validate_config(config: GoalSolveConfig) -> Result<(), SolveError> {
    if config.survive_months == 0 {
        return Err(SolveError::ZeroSurviveMonths);
    }
    if config.survive_months > MAX_HORIZON_MONTHS {
        return Err(SolveError::SurviveMonthsBeyondHorizonCap);
    }
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(SolveError::NonFiniteBounds);
    }
    if config.search_max <= config.search_min {
        return Err(SolveError::EmptySearchRange);
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(SolveError::InvalidTolerance);
    }
    if config.max_iterations == 0 {
        return Err(SolveError::ZeroIterations);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SimulationOptions;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    /// No mortgage, no growth: cash after `m` months is `12_000 + m * (income - 1_000)`.
    fn deterministic_input() -> ScenarioInput {
        ScenarioInput {
            current_age: 40,
            start_date: None,
            liquid_cash: 12_000.0,
            future_cash_inflow: 0.0,
            windfall_month: None,
            house_price: 0.0,
            down_payment: 0.0,
            closing_cost_rate: 0.0,
            down_payment_from_cash: false,
            nominal_annual_rate: 0.0,
            amortization_years: 25,
            renewal_term_years: 5,
            renewal_rate: None,
            monthly_income: 0.0,
            income_growth_rate: 0.0,
            income_ceiling: None,
            ceiling_growth_rate: 0.0,
            monthly_living_expense: 1_000.0,
            monthly_housing_carrying_cost: 0.0,
            expense_inflation_rate: 0.0,
            prepayment: None,
            scheduled_shock: None,
            options: SimulationOptions::default(),
        }
    }

    fn config(goal_type: GoalType, search_min: f64, search_max: f64) -> GoalSolveConfig {
        GoalSolveConfig {
            goal_type,
            survive_months: 120,
            search_min,
            search_max,
            tolerance: 0.5,
            max_iterations: 40,
        }
    }

    #[test]
    fn minimum_income_solver_finds_deterministic_solution() {
        // Surviving 120 months needs 12_000 + 120 * (income - 1_000) >= 0, i.e. income >= 900.
        let inputs = deterministic_input();
        let result = solve_goal(&inputs, config(GoalType::MinimumIncome, 0.0, 5_000.0))
            .expect("must solve");
        assert!(result.feasible);
        assert!(result.converged);
        let value = result.solved_value.expect("value expected");
        assert_close(value, 900.0, 1.0);
        assert!(value >= 900.0);
        assert!(result.insolvency_month.is_none_or(|m| m > 120));
        assert!(!result.iterations.is_empty());
    }

    #[test]
    fn max_expense_solver_finds_deterministic_solution() {
        // With income 1_000, expenses up to 1_100 keep 12_000 + 120 * (1_000 - e) >= 0.
        let mut inputs = deterministic_input();
        inputs.monthly_income = 1_000.0;
        let result = solve_goal(&inputs, config(GoalType::MaxLivingExpense, 0.0, 5_000.0))
            .expect("must solve");
        assert!(result.feasible);
        let value = result.solved_value.expect("value expected");
        assert_close(value, 1_100.0, 1.0);
        assert!(value <= 1_100.0);
    }

    #[test]
    fn minimum_income_reports_already_solvent_at_lower_bound() {
        let inputs = deterministic_input();
        let result = solve_goal(&inputs, config(GoalType::MinimumIncome, 950.0, 5_000.0))
            .expect("must return result");
        assert_eq!(result.solved_value, Some(950.0));
        assert!(result.iterations.is_empty());
    }

    #[test]
    fn minimum_income_reports_infeasible_when_bounds_too_low() {
        let inputs = deterministic_input();
        let result = solve_goal(&inputs, config(GoalType::MinimumIncome, 0.0, 500.0))
            .expect("must return result");
        assert!(!result.feasible);
        assert!(result.solved_value.is_none());
    }

    #[test]
    fn max_iterations_cap_returns_best_estimate() {
        let inputs = deterministic_input();
        let mut cfg = config(GoalType::MinimumIncome, 0.0, 5_000.0);
        cfg.max_iterations = 2;
        let result = solve_goal(&inputs, cfg).expect("must return result");
        assert!(result.feasible);
        assert!(!result.converged);
        assert_eq!(result.iterations.len(), 2);
    }

    #[test]
    fn survival_window_longer_than_horizon_is_simulated_in_full() {
        // 12_000 + 1_000 * (income - 1_000) >= 0 needs income >= 988, however short the horizon.
        let mut inputs = deterministic_input();
        inputs.options.horizon_months = 100;
        let mut cfg = config(GoalType::MinimumIncome, 0.0, 5_000.0);
        cfg.survive_months = 1_000;
        let result = solve_goal(&inputs, cfg).expect("must solve");
        assert!(result.feasible);
        let value = result.solved_value.expect("value expected");
        assert_close(value, 988.0, 1.0);
        assert!(value >= 988.0);
    }

    #[test]
    fn survival_window_past_horizon_cap_is_rejected() {
        let inputs = deterministic_input();
        let mut cfg = config(GoalType::MinimumIncome, 0.0, 5_000.0);
        cfg.survive_months = MAX_HORIZON_MONTHS + 1;
        assert_eq!(
            solve_goal(&inputs, cfg).expect_err("beyond cap"),
            SolveError::SurviveMonthsBeyondHorizonCap
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let inputs = deterministic_input();
        let mut cfg = config(GoalType::MinimumIncome, 10.0, 5.0);
        assert_eq!(
            solve_goal(&inputs, cfg).expect_err("empty range"),
            SolveError::EmptySearchRange
        );
        cfg = config(GoalType::MinimumIncome, 0.0, 5.0);
        cfg.tolerance = 0.0;
        assert_eq!(
            solve_goal(&inputs, cfg).expect_err("bad tolerance"),
            SolveError::InvalidTolerance
        );
        cfg = config(GoalType::MinimumIncome, 0.0, 5.0);
        cfg.survive_months = 0;
        assert_eq!(
            solve_goal(&inputs, cfg).expect_err("zero months"),
            SolveError::ZeroSurviveMonths
        );
    }
}
