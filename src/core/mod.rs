mod engine;
mod mortgage;
mod solver;
mod types;

pub use engine::simulate;
pub use mortgage::{compute_payment, monthly_rate};
pub use solver::{GoalSolveConfig, GoalSolveIteration, GoalSolveResult, GoalType, SolveError, solve_goal};
pub use types::{
    EarlyStop, InsolvencyPolicy, MAX_HORIZON_MONTHS, MonthSnapshot, PaymentSegment, Prepayment,
    PrepaymentPolicy, ScenarioInput, ScheduledShock, ShockKind, SimulationOptions,
    SimulationResult, StopReason,
};
