//! FGTS deposit calculation.
//!
//! FGTS is a flat percentage of gross salary chosen by registration type.
//! Domestic workers carry an extra deposit that pre-funds the severance fine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    ComputationTrace, RegistrationType, TraceBuilder, ZERO_MONEY, format_money, format_rate,
    percent_of, round_money,
};

/// The FGTS rates for a registration type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FgtsRates {
    /// Monthly deposit rate, as a percentage.
    pub primary: Decimal,
    /// Extra deposit rate, as a percentage (domestic workers only).
    pub additional: Option<Decimal>,
}

/// Looks up the FGTS rates for a registration type.
///
/// | Type             | Primary | Additional |
/// |------------------|---------|------------|
/// | `clt_geral`      | 8%      | -          |
/// | `jovem_aprendiz` | 2%      | -          |
/// | `domestico`      | 8%      | 3.2%       |
pub fn fgts_rates(registration_type: RegistrationType) -> FgtsRates {
    match registration_type {
        RegistrationType::CltGeral => FgtsRates {
            primary: Decimal::from(8),
            additional: None,
        },
        RegistrationType::JovemAprendiz => FgtsRates {
            primary: Decimal::from(2),
            additional: None,
        },
        RegistrationType::Domestico => FgtsRates {
            primary: Decimal::from(8),
            additional: Some(Decimal::new(32, 1)),
        },
    }
}

/// The result of an FGTS calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FgtsResult {
    /// Monthly deposit at the primary rate.
    pub amount: Decimal,
    /// Extra deposit at the additional rate (zero when none applies).
    pub additional_amount: Decimal,
    /// `amount + additional_amount`.
    pub total_amount: Decimal,
    /// The registration type the rates came from.
    pub registration_type: RegistrationType,
    /// Step-by-step computation trace.
    pub trace: ComputationTrace,
}

/// Calculates the monthly FGTS deposit.
///
/// # Returns
///
/// Returns an `FgtsResult`, or `InvalidInput` if the gross salary is not
/// strictly positive.
///
/// # Examples
///
/// ```
/// use folha_engine::calculation::calculate_fgts;
/// use folha_engine::models::RegistrationType;
/// use rust_decimal::Decimal;
///
/// let result = calculate_fgts(Decimal::from(2000), RegistrationType::Domestico).unwrap();
/// assert_eq!(result.amount, Decimal::new(16000, 2));
/// assert_eq!(result.additional_amount, Decimal::new(6400, 2));
/// assert_eq!(result.total_amount, Decimal::new(22400, 2));
/// ```
pub fn calculate_fgts(
    gross_salary: Decimal,
    registration_type: RegistrationType,
) -> EngineResult<FgtsResult> {
    if gross_salary <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross_salary",
            format!("must be greater than zero, got {}", gross_salary),
        ));
    }

    let rates = fgts_rates(registration_type);
    let mut trace = TraceBuilder::new();
    trace.money("Salário bruto", gross_salary);
    trace.text("Tipo de registro", registration_type.as_str());

    let amount = round_money(percent_of(gross_salary, rates.primary));
    trace
        .money("FGTS mensal", amount)
        .formula(format!("{} × {}", format_money(gross_salary), format_rate(rates.primary)));

    let additional_amount = match rates.additional {
        Some(rate) => {
            let additional = round_money(percent_of(gross_salary, rate));
            trace
                .money("FGTS indenização compensatória", additional)
                .formula(format!("{} × {}", format_money(gross_salary), format_rate(rate)));
            additional
        }
        None => ZERO_MONEY,
    };

    let total_amount = amount + additional_amount;
    trace.money("FGTS total", total_amount).highlight();

    Ok(FgtsResult {
        amount,
        additional_amount,
        total_amount,
        registration_type,
        trace: trace.finish(),
    })
}

/// Calculates FGTS from a registration type given as text.
///
/// Unknown registration types are rejected with `UnsupportedValue`.
pub fn calculate_fgts_for(gross_salary: Decimal, registration_type: &str) -> EngineResult<FgtsResult> {
    calculate_fgts(gross_salary, registration_type.parse()?)
}
