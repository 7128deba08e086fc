//! IRRF income-tax withholding.
//!
//! The taxable base is gross salary minus either the itemised deductions
//! (INSS, dependents, alimony) or the fixed simplified deduction, never both.
//! The base is looked up against a rate-and-deduction table (not a marginal
//! sum), and tables flagged for the 2026 exemption rule then apply a
//! progressive discount driven by the base.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{IrrfTable, RuleTableProvider};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ComputationTrace, HUNDRED, TraceBuilder, ZERO_MONEY, format_money, format_rate, percent_of,
    round_money,
};

/// Base up to which the exemption discount is total.
pub const EXEMPTION_FULL_LIMIT: Decimal = Decimal::from_parts(5000, 0, 0, false, 0);

/// Base from which the exemption discount no longer applies.
pub const EXEMPTION_PHASE_OUT_LIMIT: Decimal = Decimal::from_parts(7000, 0, 0, false, 0);

/// How the taxable base was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionMode {
    /// INSS, dependents and alimony are deducted.
    Normal,
    /// A fixed amount substitutes for every itemised deduction.
    Simplified,
}

/// Inputs to an IRRF calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrfInput {
    /// Monthly gross salary; must be greater than zero.
    pub gross_salary: Decimal,
    /// Employee INSS already withheld; ignored in simplified mode.
    pub inss_amount: Decimal,
    /// Number of dependents; ignored in simplified mode.
    pub dependents: u32,
    /// Court-ordered alimony paid; ignored in simplified mode.
    pub pension_alimony: Decimal,
    /// Use the simplified deduction instead of itemised deductions.
    pub use_simplified_deduction: bool,
}

/// The result of an IRRF calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrfResult {
    /// Taxable base after deductions, rounded to centavos.
    pub base_amount: Decimal,
    /// Rate of the bracket the base fell into (0 when exempt).
    pub bracket_rate: Decimal,
    /// Final tax withheld.
    pub amount: Decimal,
    /// Which deduction mode produced the base.
    pub deduction_mode: DeductionMode,
    /// Discount percentage applied by the exemption rule, if it ran.
    pub exemption_discount_pct: Option<Decimal>,
    /// True when the amount is positive but below the table's collectible
    /// minimum. Informational only; the amount is not zeroed.
    pub below_minimum_collectible: bool,
    /// Year of the table revision used.
    pub table_year: i32,
    /// First month the table revision applies to.
    pub table_effective_month: u32,
    /// Step-by-step computation trace.
    pub trace: ComputationTrace,
}

/// Calculates IRRF withholding for one month.
///
/// # Arguments
///
/// * `input` - Salary and deduction inputs
/// * `year` - Table year; `None` means the current year
/// * `month` - Month (1-12) used to pick mid-year revisions; `None` means January
/// * `tables` - The rule-table provider
///
/// # Returns
///
/// Returns an `IrrfResult`, or an error if:
/// - `gross_salary` is not strictly positive, or `inss_amount` /
///   `pension_alimony` is negative (`InvalidInput`)
/// - `month` is outside 1-12 (`InvalidInput`)
/// - simplified mode is requested against a table that has no simplified
///   deduction (`UnsupportedValue`)
///
/// # Examples
///
/// ```
/// use folha_engine::calculation::{IrrfInput, calculate_irrf};
/// use folha_engine::config::RuleTableProvider;
/// use rust_decimal::Decimal;
///
/// let tables = RuleTableProvider::builtin();
/// let input = IrrfInput {
///     gross_salary: Decimal::from(4000),
///     inss_amount: Decimal::ZERO,
///     dependents: 0,
///     pension_alimony: Decimal::ZERO,
///     use_simplified_deduction: true,
/// };
/// let result = calculate_irrf(&input, Some(2026), None, &tables).unwrap();
/// // Base 3392.80 is below R$ 5,000, so the 2026 exemption zeroes the tax.
/// assert_eq!(result.amount, Decimal::ZERO);
/// ```
pub fn calculate_irrf(
    input: &IrrfInput,
    year: Option<i32>,
    month: Option<u32>,
    tables: &RuleTableProvider,
) -> EngineResult<IrrfResult> {
    validate(input, month)?;

    let table = tables.get_irrf_table(year, month);
    let mut trace = TraceBuilder::new();
    trace.money("Salário bruto", input.gross_salary);
    trace.text(
        "Tabela IRRF",
        format!("{}/{:02}", table.year, table.effective_from_month),
    );

    let (base, deduction_mode) = taxable_base(input, table, &mut trace)?;

    let mut result = IrrfResult {
        base_amount: base,
        bracket_rate: Decimal::ZERO,
        amount: ZERO_MONEY,
        deduction_mode,
        exemption_discount_pct: None,
        below_minimum_collectible: false,
        table_year: table.year,
        table_effective_month: table.effective_from_month,
        trace: ComputationTrace::default(),
    };

    if base <= Decimal::ZERO {
        trace
            .money("IRRF devido", ZERO_MONEY)
            .detail("Isento: base de cálculo não positiva")
            .highlight();
        result.trace = trace.finish();
        return Ok(result);
    }

    let (index, bracket) = table.bracket_for(base).ok_or_else(|| EngineError::CalculationError {
        message: format!(
            "no IRRF bracket covers base {} in table {}",
            format_money(base),
            table.year
        ),
    })?;
    result.bracket_rate = bracket.rate;

    let limit = bracket
        .limit
        .map(|l| format!("até {}", format_money(l)))
        .unwrap_or_else(|| "acima da faixa anterior".to_string());
    let gross_tax = round_money(percent_of(base, bracket.rate));
    trace
        .money(format!("Faixa {} ({})", index + 1, limit), gross_tax)
        .formula(format!("{} × {}", format_money(base), format_rate(bracket.rate)));

    let mut amount = round_money((gross_tax - bracket.deduction).max(Decimal::ZERO));
    trace.money("Imposto apurado", amount).formula(format!(
        "max(0, {} - {})",
        format_money(gross_tax),
        format_money(bracket.deduction)
    ));

    if table.law_change_exemption {
        let (discount_pct, discounted) = apply_exemption_discount(base, amount, &mut trace);
        result.exemption_discount_pct = Some(discount_pct);
        amount = discounted;
    }

    result.below_minimum_collectible = table
        .minimum_collectible
        .is_some_and(|min| amount > Decimal::ZERO && amount < min);

    let total = trace.money("IRRF devido", amount).highlight();
    if result.below_minimum_collectible {
        total.detail("Valor abaixo do mínimo de recolhimento");
    }

    result.amount = amount;
    result.trace = trace.finish();
    Ok(result)
}

fn validate(input: &IrrfInput, month: Option<u32>) -> EngineResult<()> {
    if input.gross_salary <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross_salary",
            format!("must be greater than zero, got {}", input.gross_salary),
        ));
    }
    if input.inss_amount < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "inss_amount",
            format!("must not be negative, got {}", input.inss_amount),
        ));
    }
    if input.pension_alimony < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "pension_alimony",
            format!("must not be negative, got {}", input.pension_alimony),
        ));
    }
    if let Some(m) = month.filter(|m| !(1..=12).contains(m)) {
        return Err(EngineError::invalid_input(
            "month",
            format!("must be between 1 and 12, got {}", m),
        ));
    }
    Ok(())
}

fn taxable_base(
    input: &IrrfInput,
    table: &IrrfTable,
    trace: &mut TraceBuilder,
) -> EngineResult<(Decimal, DeductionMode)> {
    if input.use_simplified_deduction {
        let deduction = table.simplified_deduction.ok_or_else(|| {
            EngineError::unsupported(
                "calculation mode",
                format!("simplified deduction for IRRF table {}", table.year),
            )
        })?;
        trace
            .money("Desconto simplificado", deduction)
            .detail("Substitui INSS, dependentes e pensão alimentícia");
        let base = round_money(input.gross_salary - deduction);
        trace
            .money("Base de cálculo", base)
            .formula(format!(
                "{} - {}",
                format_money(input.gross_salary),
                format_money(deduction)
            ));
        return Ok((base, DeductionMode::Simplified));
    }

    trace.money("Dedução INSS", input.inss_amount);
    let dependents_total = round_money(Decimal::from(input.dependents) * table.dependent_deduction);
    trace
        .money("Dedução por dependentes", dependents_total)
        .formula(format!(
            "{} × {}",
            input.dependents,
            format_money(table.dependent_deduction)
        ));
    trace.money("Pensão alimentícia", input.pension_alimony);

    let base = round_money(
        input.gross_salary - input.inss_amount - dependents_total - input.pension_alimony,
    );
    trace.money("Base de cálculo", base).formula(format!(
        "{} - {} - {} - {}",
        format_money(input.gross_salary),
        format_money(input.inss_amount),
        format_money(dependents_total),
        format_money(input.pension_alimony)
    ));
    Ok((base, DeductionMode::Normal))
}

/// Applies the exemption reduction: total up to R$ 5,000, none from
/// R$ 7,000, linear in between. The percentage depends on the base, not on
/// the tax.
///
/// The discounted amount is rounded once, from the unrounded percentage. The
/// reduction step reports the difference, so it and the final amount always
/// add back up to the undiscounted tax.
fn apply_exemption_discount(
    base: Decimal,
    amount: Decimal,
    trace: &mut TraceBuilder,
) -> (Decimal, Decimal) {
    let discount_pct = if base <= EXEMPTION_FULL_LIMIT {
        HUNDRED
    } else if base >= EXEMPTION_PHASE_OUT_LIMIT {
        Decimal::ZERO
    } else {
        let span = EXEMPTION_PHASE_OUT_LIMIT - EXEMPTION_FULL_LIMIT;
        HUNDRED - (base - EXEMPTION_FULL_LIMIT) / span * HUNDRED
    };

    let formula = if base <= EXEMPTION_FULL_LIMIT {
        format!("base {} ≤ 5000.00", format_money(base))
    } else if base >= EXEMPTION_PHASE_OUT_LIMIT {
        format!("base {} ≥ 7000.00", format_money(base))
    } else {
        format!("100 - ({} - 5000.00) / 2000.00 × 100", format_money(base))
    };
    trace
        .text("Percentual de redução", format_rate(discount_pct))
        .formula(formula);

    let discounted = round_money(amount - percent_of(amount, discount_pct));
    let discount = amount - discounted;
    trace
        .money("Valor da redução", discount)
        .formula(format!("{} × {}", format_money(amount), format_rate(discount_pct)));

    (round_money(discount_pct), discounted)
}
