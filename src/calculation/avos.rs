//! 13th-salary proration ("avos").
//!
//! One twelfth of the 13th salary accrues for every calendar month in which
//! the employee worked at least 15 days. INSS-covered leave is subtracted from
//! the days worked before the threshold is checked.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{ComputationTrace, LeavePeriod, ProrationMonth, TraceBuilder};

/// Minimum days worked in a month for that month to grant an avo.
pub const AVO_MIN_DAYS: i64 = 15;

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// The result of a 13th-salary proration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvosResult {
    /// Number of twelfths granted.
    pub total_avos: u32,
    /// Month-by-month breakdown, in calendar order.
    pub months: Vec<ProrationMonth>,
    /// Total days subtracted for leave, summed per leave period.
    pub excluded_days: i64,
    /// Step-by-step computation trace.
    pub trace: ComputationTrace,
}

/// Prorates the 13th salary between an admission date and a reference date.
///
/// # Behavior
///
/// - Months are iterated from the admission month through the reference month,
///   inclusive; within each, only days between the two dates count.
/// - Every leave period is subtracted on its own. Overlapping leave periods
///   are not merged, so a day covered by two periods is subtracted twice.
/// - A month grants an avo when at least [`AVO_MIN_DAYS`] days remain.
/// - The total is not clamped to 12; callers supply the reference span.
///
/// # Returns
///
/// Returns an `AvosResult`, or `InvalidInput` if the reference date precedes
/// the admission date or a leave period ends before it starts.
///
/// # Examples
///
/// ```
/// use folha_engine::calculation::calculate_avos;
/// use chrono::NaiveDate;
///
/// let admission = NaiveDate::from_ymd_opt(2024, 12, 17).unwrap();
/// let reference = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
/// let result = calculate_avos(admission, reference, &[]).unwrap();
/// assert_eq!(result.total_avos, 1);
/// assert_eq!(result.months[0].days_worked, 15);
/// ```
pub fn calculate_avos(
    admission_date: NaiveDate,
    reference_date: NaiveDate,
    leave_periods: &[LeavePeriod],
) -> EngineResult<AvosResult> {
    if reference_date < admission_date {
        return Err(EngineError::invalid_input(
            "reference_date",
            format!(
                "{} is before the admission date {}",
                reference_date, admission_date
            ),
        ));
    }
    for leave in leave_periods {
        leave.validate()?;
    }

    let mut trace = TraceBuilder::new();
    let mut months = Vec::new();
    let mut total_avos = 0u32;
    let mut excluded_days = 0i64;

    let mut month_start = first_of_month(admission_date)?;
    while month_start <= reference_date {
        let next_month = month_start
            .checked_add_months(Months::new(1))
            .ok_or_else(|| date_overflow(month_start))?;
        let month_end = next_month.pred_opt().ok_or_else(|| date_overflow(month_start))?;

        let from = month_start.max(admission_date);
        let to = month_end.min(reference_date);
        let mut days_worked = ((to - from).num_days() + 1).max(0);

        let mut month_excluded = 0i64;
        for leave in leave_periods {
            let overlap = leave.overlap_days(from, to);
            if overlap > 0 {
                days_worked = (days_worked - overlap).max(0);
                month_excluded += overlap;
            }
        }
        excluded_days += month_excluded;

        let granted = days_worked >= AVO_MIN_DAYS;
        let avo_granted = u8::from(granted);
        total_avos += u32::from(avo_granted);

        let mut note = if granted {
            format!("{} dias trabalhados: avo concedido", days_worked)
        } else {
            format!(
                "{} dias trabalhados: abaixo de {} dias, sem avo",
                days_worked, AVO_MIN_DAYS
            )
        };
        if month_excluded > 0 {
            note.push_str(&format!(" ({} dias de afastamento)", month_excluded));
        }

        let month_label = format!(
            "{}/{}",
            MONTH_NAMES[month_start.month0() as usize],
            month_start.year()
        );
        trace
            .text(month_label.clone(), format!("{}/12", avo_granted))
            .formula(format!(
                "{} a {}: {} dias de {}",
                from.format("%d/%m"),
                to.format("%d/%m"),
                days_worked,
                month_end.day()
            ))
            .detail(note.clone());

        months.push(ProrationMonth {
            month_label,
            days_worked,
            days_in_month: month_end.day(),
            avo_granted,
            note,
        });

        month_start = next_month;
    }

    if !leave_periods.is_empty() {
        trace
            .text("Dias excluídos por afastamento", excluded_days.to_string())
            .detail(format!("{} período(s) de afastamento informado(s)", leave_periods.len()));
    }

    trace
        .text("Total de avos", format!("{}/12", total_avos))
        .highlight();

    Ok(AvosResult {
        total_avos,
        months,
        excluded_days,
        trace: trace.finish(),
    })
}

fn first_of_month(date: NaiveDate) -> EngineResult<NaiveDate> {
    date.with_day(1).ok_or_else(|| date_overflow(date))
}

fn date_overflow(date: NaiveDate) -> EngineError {
    EngineError::CalculationError {
        message: format!("date arithmetic out of range near {}", date),
    }
}
