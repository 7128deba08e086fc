//! Employee INSS withholding.
//!
//! Two unrelated formulas live here: the progressive (marginal) table used
//! for regular employees, and the flat 11% applied to pro-labore, both capped
//! by the year's contribution ceiling.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{InssTable, RuleTableProvider};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ComputationTrace, HUNDRED, TraceBuilder, format_money, format_rate, percent_of, round_money,
};

/// Flat rate applied to pro-labore (owner/partner) compensation.
pub const PRO_LABORE_RATE: Decimal = Decimal::from_parts(11, 0, 0, false, 0);

/// Which INSS formula was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InssMode {
    /// Marginal bracket table for employees.
    Progressive,
    /// Flat rate on owner compensation.
    ProLabore,
}

/// The contribution of one bracket slice in progressive mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InssSlice {
    /// 1-based bracket number.
    pub bracket: usize,
    /// Portion of the salary taxed in this bracket.
    pub taxable: Decimal,
    /// Bracket rate as a percentage.
    pub rate: Decimal,
    /// `taxable × rate`, rounded to centavos.
    pub contribution: Decimal,
}

/// The result of an INSS calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InssResult {
    /// Amount withheld.
    pub amount: Decimal,
    /// `amount / gross × 100`, rounded to two places.
    pub effective_rate: Decimal,
    /// The formula that was applied.
    pub mode: InssMode,
    /// True when the gross salary exceeded the contribution ceiling.
    pub ceiling_applied: bool,
    /// Per-bracket breakdown (progressive mode only).
    pub slices: Vec<InssSlice>,
    /// The table used.
    pub table: InssTable,
    /// Step-by-step computation trace.
    pub trace: ComputationTrace,
}

/// Calculates the employee INSS withholding for a monthly gross salary.
///
/// # Arguments
///
/// * `gross_salary` - Monthly gross salary; must be greater than zero
/// * `is_pro_labore` - Selects the flat pro-labore formula instead of the
///   progressive table
/// * `year` - Table year; `None` means the current year
/// * `tables` - The rule-table provider
///
/// # Returns
///
/// Returns an `InssResult`, or `InvalidInput` if the gross salary is not
/// strictly positive. Negative salaries are never clamped to zero.
///
/// # Examples
///
/// ```
/// use folha_engine::calculation::calculate_inss;
/// use folha_engine::config::RuleTableProvider;
/// use rust_decimal::Decimal;
///
/// let tables = RuleTableProvider::builtin();
/// let result = calculate_inss(Decimal::new(151800, 2), false, Some(2025), &tables).unwrap();
/// assert_eq!(result.amount, Decimal::new(11385, 2));
/// ```
pub fn calculate_inss(
    gross_salary: Decimal,
    is_pro_labore: bool,
    year: Option<i32>,
    tables: &RuleTableProvider,
) -> EngineResult<InssResult> {
    if gross_salary <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross_salary",
            format!("must be greater than zero, got {}", gross_salary),
        ));
    }

    let table = tables.get_inss_table(year);
    let mut trace = TraceBuilder::new();
    trace.money("Salário bruto", gross_salary);
    trace
        .text("Tabela INSS", table.year.to_string())
        .detail(format!("Teto previdenciário {}", format_money(table.ceiling)));

    let (amount, slices, ceiling_applied, mode) = if is_pro_labore {
        let (amount, capped) = pro_labore(gross_salary, table, &mut trace);
        (amount, Vec::new(), capped, InssMode::ProLabore)
    } else {
        let (amount, slices, capped) = progressive(gross_salary, table, &mut trace);
        (amount, slices, capped, InssMode::Progressive)
    };

    let effective_rate = round_money(amount / gross_salary * HUNDRED);
    trace
        .money("INSS devido", amount)
        .detail(format!("Alíquota efetiva {}", format_rate(effective_rate)))
        .highlight();

    Ok(InssResult {
        amount,
        effective_rate,
        mode,
        ceiling_applied,
        slices,
        table: table.clone(),
        trace: trace.finish(),
    })
}

fn progressive(
    gross_salary: Decimal,
    table: &InssTable,
    trace: &mut TraceBuilder,
) -> (Decimal, Vec<InssSlice>, bool) {
    let mut remaining = gross_salary;
    let mut previous_limit = Decimal::ZERO;
    let mut total = Decimal::ZERO;
    let mut slices = Vec::with_capacity(table.brackets.len());

    for (i, bracket) in table.brackets.iter().enumerate() {
        if remaining <= Decimal::ZERO {
            break;
        }
        let taxable = round_money((bracket.limit - previous_limit).min(remaining));
        let contribution = round_money(percent_of(taxable, bracket.rate));

        trace
            .money(
                format!(
                    "Faixa {} ({} a {})",
                    i + 1,
                    format_money(previous_limit),
                    format_money(bracket.limit)
                ),
                contribution,
            )
            .formula(format!("{} × {}", format_money(taxable), format_rate(bracket.rate)));

        slices.push(InssSlice {
            bracket: i + 1,
            taxable,
            rate: bracket.rate,
            contribution,
        });
        total += contribution;
        remaining -= taxable;
        previous_limit = bracket.limit;
    }

    let above_ceiling = gross_salary > table.ceiling;
    if above_ceiling {
        trace
            .money("Parcela acima do teto (não tributada)", gross_salary - table.ceiling)
            .formula(format!(
                "{} - {}",
                format_money(gross_salary),
                format_money(table.ceiling)
            ));

        let cap = round_money(table.max_contribution());
        if total > cap {
            trace
                .money("Limite de contribuição aplicado", cap)
                .formula(format!(
                    "{} × {}",
                    format_money(table.ceiling),
                    format_rate(table.top_rate())
                ))
                .detail(format!("Soma das faixas {} reduzida ao teto", format_money(total)));
            total = cap;
        }
    }

    (total, slices, above_ceiling)
}

fn pro_labore(gross_salary: Decimal, table: &InssTable, trace: &mut TraceBuilder) -> (Decimal, bool) {
    let capped = gross_salary > table.ceiling;
    let base = gross_salary.min(table.ceiling);

    let step = trace.money("Base de cálculo pró-labore", base);
    if capped {
        step.detail("Limitada ao teto previdenciário");
    }

    let amount = round_money(percent_of(base, PRO_LABORE_RATE));
    trace
        .money("Contribuição pró-labore", amount)
        .formula(format!("{} × {}", format_money(base), format_rate(PRO_LABORE_RATE)));

    (amount, capped)
}
