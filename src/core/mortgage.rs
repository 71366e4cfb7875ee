/// Effective monthly rate for a nominal annual rate compounded semi-annually,
/// the convention Canadian lenders quote posted rates in.
pub fn monthly_rate(nominal_annual_rate: f64) -> f64 {
    if !nominal_annual_rate.is_finite() || nominal_annual_rate <= 0.0 {
        return 0.0;
    }
    let semi_annual = nominal_annual_rate / 2.0;
    (1.0 + semi_annual).powf(2.0 / 12.0) - 1.0
}

/// Level monthly payment that fully amortizes `principal` over
/// `amortization_years` at the semi-annually compounded `nominal_annual_rate`.
///
/// Any non-positive (or non-finite) argument yields 0. A zero rate is not
/// amortized as an interest-free loan; the caller sees a zero payment and
/// the simulation carries on as a cash-only run.
pub fn compute_payment(principal: f64, nominal_annual_rate: f64, amortization_years: f64) -> f64 {
    if !principal.is_finite() || principal <= 0.0 {
        return 0.0;
    }
    if !amortization_years.is_finite() || amortization_years <= 0.0 {
        return 0.0;
    }
    let i = monthly_rate(nominal_annual_rate);
    if i <= 0.0 {
        return 0.0;
    }

    let n = amortization_years * 12.0;
    let growth = (1.0 + i).powf(n);
    if !growth.is_finite() {
        return 0.0;
    }
    let denom = growth - 1.0;
    if denom <= 1e-12 {
        return 0.0;
    }
    principal * (i * growth) / denom
}
