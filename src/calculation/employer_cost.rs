//! Total employer cost of an employee.
//!
//! Aggregates salary, the monthly accrual of vacation and 13th salary, FGTS,
//! the employer-side INSS contribution, an approximate tax-regime overhead,
//! and any extra charges and benefits into a monthly and annual total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RuleTableProvider;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ComputationTrace, HUNDRED, RegistrationType, TaxRegime, TraceBuilder, format_money,
    format_rate, percent_of, round_money,
};

use super::fgts::calculate_fgts;

/// Flat employer INSS rate (cota patronal), applied up to the ceiling.
pub const EMPLOYER_INSS_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Inputs to the employer cost aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerCostParams {
    /// Monthly gross salary; must be greater than zero.
    pub gross_salary: Decimal,
    /// Registration type, for the FGTS line.
    pub registration_type: RegistrationType,
    /// Employer tax regime, for the overhead estimate.
    pub tax_regime: TaxRegime,
    /// Other monthly charges borne by the employer.
    pub additional_charges: Decimal,
    /// Monthly benefits (meal vouchers, health plan, transport).
    pub benefits: Decimal,
    /// Year of the INSS table whose ceiling applies; `None` means current.
    pub year: Option<i32>,
}

/// Share of selected components in the monthly total, as percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostPercentages {
    /// Proportional vacation share.
    pub vacation: Decimal,
    /// Proportional 13th salary share.
    pub thirteenth: Decimal,
    /// FGTS share.
    pub fgts: Decimal,
    /// Benefits share.
    pub benefits: Decimal,
}

/// The result of an employer cost aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerCostResult {
    /// Monthly gross salary.
    pub gross_salary: Decimal,
    /// Monthly accrual of vacation plus the constitutional third.
    pub proportional_vacation: Decimal,
    /// Monthly accrual of the 13th salary.
    pub proportional_thirteenth: Decimal,
    /// Total FGTS deposit, including any additional deposit.
    pub fgts: Decimal,
    /// Salary base for the employer INSS, capped at the ceiling.
    pub employer_inss_base: Decimal,
    /// Employer INSS contribution.
    pub employer_inss: Decimal,
    /// Approximate rate used for the regime overhead.
    pub regime_rate: Decimal,
    /// Approximate regime overhead.
    pub regime_overhead: Decimal,
    /// Other charges, as supplied.
    pub additional_charges: Decimal,
    /// Benefits, as supplied.
    pub benefits: Decimal,
    /// Sum of every component.
    pub monthly_total: Decimal,
    /// `monthly_total × 12`.
    pub annual_total: Decimal,
    /// Component shares of the monthly total.
    pub percentages: CostPercentages,
    /// Step-by-step computation trace.
    pub trace: ComputationTrace,
}

/// Aggregates the total monthly and annual cost of an employee.
///
/// The employer INSS is a flat 20% of `min(gross, ceiling)`, derived here
/// independently of the employee-side progressive calculation. The regime
/// overhead is an estimate (see [`TaxRegime::approx_overhead_rate`]).
///
/// # Returns
///
/// Returns an `EmployerCostResult`, or `InvalidInput` if the gross salary is
/// not strictly positive or charges/benefits are negative.
///
/// # Examples
///
/// ```
/// use folha_engine::calculation::{EmployerCostParams, calculate_employer_cost};
/// use folha_engine::config::RuleTableProvider;
/// use folha_engine::models::{RegistrationType, TaxRegime};
/// use rust_decimal::Decimal;
///
/// let params = EmployerCostParams {
///     gross_salary: Decimal::from(3000),
///     registration_type: RegistrationType::CltGeral,
///     tax_regime: TaxRegime::SimplesNacional,
///     additional_charges: Decimal::ZERO,
///     benefits: Decimal::ZERO,
///     year: Some(2025),
/// };
/// let result = calculate_employer_cost(&params, &RuleTableProvider::builtin()).unwrap();
/// assert_eq!(result.annual_total, result.monthly_total * Decimal::from(12));
/// ```
pub fn calculate_employer_cost(
    params: &EmployerCostParams,
    tables: &RuleTableProvider,
) -> EngineResult<EmployerCostResult> {
    validate(params)?;

    let gross = round_money(params.gross_salary);
    let ceiling = tables.get_inss_table(params.year).ceiling;
    let mut trace = TraceBuilder::new();

    trace.money("Salário bruto", gross);

    let monthly_share = gross / MONTHS_PER_YEAR;
    let proportional_vacation = round_money(monthly_share + monthly_share / Decimal::from(3));
    trace
        .money("Férias proporcionais + 1/3", proportional_vacation)
        .formula(format!("{0} / 12 + ({0} / 12) / 3", format_money(gross)));

    let proportional_thirteenth = round_money(monthly_share);
    trace
        .money("13º salário proporcional", proportional_thirteenth)
        .formula(format!("{} / 12", format_money(gross)));

    let fgts = calculate_fgts(gross, params.registration_type)?.total_amount;
    trace
        .money("FGTS", fgts)
        .detail(format!("Registro {}", params.registration_type));

    let employer_inss_base = round_money(gross.min(ceiling));
    let employer_inss = round_money(percent_of(employer_inss_base, EMPLOYER_INSS_RATE));
    let inss_step = trace.money("INSS patronal", employer_inss).formula(format!(
        "{} × {}",
        format_money(employer_inss_base),
        format_rate(EMPLOYER_INSS_RATE)
    ));
    if gross > ceiling {
        inss_step.detail(format!("Base limitada ao teto {}", format_money(ceiling)));
    }

    let regime_rate = params.tax_regime.approx_overhead_rate();
    let regime_overhead = round_money(percent_of(gross, regime_rate));
    trace
        .money("Encargos do regime tributário", regime_overhead)
        .formula(format!("{} × {}", format_money(gross), format_rate(regime_rate)))
        .detail(format!("Estimativa para {}", params.tax_regime));

    let additional_charges = round_money(params.additional_charges);
    trace.money("Encargos adicionais", additional_charges);

    let benefits = round_money(params.benefits);
    trace.money("Benefícios", benefits);

    let monthly_total = gross
        + proportional_vacation
        + proportional_thirteenth
        + fgts
        + employer_inss
        + regime_overhead
        + additional_charges
        + benefits;
    trace.money("Custo mensal total", monthly_total).highlight();

    let annual_total = round_money(monthly_total * MONTHS_PER_YEAR);
    trace
        .money("Custo anual total", annual_total)
        .formula(format!("{} × 12", format_money(monthly_total)))
        .highlight();

    let share = |component: Decimal| round_money(component / monthly_total * HUNDRED);
    let percentages = CostPercentages {
        vacation: share(proportional_vacation),
        thirteenth: share(proportional_thirteenth),
        fgts: share(fgts),
        benefits: share(benefits),
    };

    Ok(EmployerCostResult {
        gross_salary: gross,
        proportional_vacation,
        proportional_thirteenth,
        fgts,
        employer_inss_base,
        employer_inss,
        regime_rate,
        regime_overhead,
        additional_charges,
        benefits,
        monthly_total,
        annual_total,
        percentages,
        trace: trace.finish(),
    })
}

fn validate(params: &EmployerCostParams) -> EngineResult<()> {
    if params.gross_salary <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross_salary",
            format!("must be greater than zero, got {}", params.gross_salary),
        ));
    }
    for (field, value) in [
        ("additional_charges", params.additional_charges),
        ("benefits", params.benefits),
    ] {
        if value < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                field,
                format!("must not be negative, got {}", value),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tables() -> RuleTableProvider {
        RuleTableProvider::load("./config/tables").unwrap()
    }

    fn params(gross: &str, regime: TaxRegime) -> EmployerCostParams {
        EmployerCostParams {
            gross_salary: dec(gross),
            registration_type: RegistrationType::CltGeral,
            tax_regime: regime,
            additional_charges: Decimal::ZERO,
            benefits: Decimal::ZERO,
            year: Some(2024),
        }
    }

    #[test]
    fn test_whole_inputs_serialize_with_two_digits() {
        let result =
            calculate_employer_cost(&params("3000", TaxRegime::SimplesNacional), &tables()).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["gross_salary"], "3000.00");
        assert_eq!(json["benefits"], "0.00");
        assert_eq!(json["additional_charges"], "0.00");
        assert_eq!(json["fgts"], "240.00");
        assert_eq!(json["employer_inss"], "600.00");
        assert_eq!(json["regime_overhead"], "0.00");
    }

    #[test]
    fn test_components_for_simples_nacional() {
        let mut input = params("3000.00", TaxRegime::SimplesNacional);
        input.benefits = dec("500.00");
        let result = calculate_employer_cost(&input, &tables()).unwrap();

        assert_eq!(result.proportional_vacation, dec("333.33"));
        assert_eq!(result.proportional_thirteenth, dec("250.00"));
        assert_eq!(result.fgts, dec("240.00"));
        assert_eq!(result.employer_inss, dec("600.00"));
        assert_eq!(result.regime_overhead, Decimal::ZERO);
        assert_eq!(result.monthly_total, dec("4923.33"));
        assert_eq!(result.annual_total, dec("59079.96"));
    }

    #[test]
    fn test_percentages_of_monthly_total() {
        let mut input = params("3000.00", TaxRegime::SimplesNacional);
        input.benefits = dec("500.00");
        let result = calculate_employer_cost(&input, &tables()).unwrap();

        assert_eq!(result.percentages.vacation, dec("6.77"));
        assert_eq!(result.percentages.thirteenth, dec("5.08"));
        assert_eq!(result.percentages.fgts, dec("4.87"));
        assert_eq!(result.percentages.benefits, dec("10.16"));
    }

    #[test]
    fn test_employer_inss_is_flat_and_capped() {
        let result =
            calculate_employer_cost(&params("10000.00", TaxRegime::LucroPresumido), &tables())
                .unwrap();

        assert_eq!(result.employer_inss_base, dec("7786.02"));
        // 7786.02 × 20%
        assert_eq!(result.employer_inss, dec("1557.20"));
        assert_eq!(result.regime_overhead, dec("780.00"));
    }

    #[test]
    fn test_domestico_fgts_includes_additional_deposit() {
        let mut input = params("2000.00", TaxRegime::SimplesNacional);
        input.registration_type = RegistrationType::Domestico;
        let result = calculate_employer_cost(&input, &tables()).unwrap();
        assert_eq!(result.fgts, dec("224.00"));
    }

    #[test]
    fn test_trace_ends_with_two_highlighted_totals() {
        let result =
            calculate_employer_cost(&params("3000.00", TaxRegime::LucroReal), &tables()).unwrap();
        let steps = result.trace.steps();

        assert_eq!(steps.len(), 10);
        let totals: Vec<&str> = steps
            .iter()
            .filter(|s| s.highlighted)
            .map(|s| s.description.as_str())
            .collect();
        assert_eq!(totals, vec!["Custo mensal total", "Custo anual total"]);
    }

    #[test]
    fn test_negative_benefits_are_rejected() {
        let mut input = params("3000.00", TaxRegime::LucroReal);
        input.benefits = dec("-10");
        assert!(matches!(
            calculate_employer_cost(&input, &tables()),
            Err(EngineError::InvalidInput { field, .. }) if field == "benefits"
        ));
    }

    proptest! {
        #[test]
        fn prop_annual_is_exactly_twelve_months(
            cents in 1i64..5_000_000,
            charges in 0i64..100_000,
            benefits in 0i64..200_000,
            regime in prop_oneof![
                Just(TaxRegime::SimplesNacional),
                Just(TaxRegime::LucroPresumido),
                Just(TaxRegime::LucroReal),
            ],
        ) {
            let input = EmployerCostParams {
                gross_salary: Decimal::new(cents, 2),
                registration_type: RegistrationType::CltGeral,
                tax_regime: regime,
                additional_charges: Decimal::new(charges, 2),
                benefits: Decimal::new(benefits, 2),
                year: Some(2025),
            };
            let result = calculate_employer_cost(&input, &tables()).unwrap();
            prop_assert_eq!(result.annual_total, result.monthly_total * Decimal::from(12));
            for (i, step) in result.trace.steps().iter().enumerate() {
                prop_assert_eq!(step.index as usize, i + 1);
            }
        }
    }
}
