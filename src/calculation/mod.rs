//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculators: employee INSS (progressive and
//! pro-labore), IRRF withholding with both deduction modes and the exemption
//! reduction, FGTS deposits, 13th-salary proration, and total employer cost.
//! Each returns its numeric result together with a computation trace.

mod avos;
mod employer_cost;
mod fgts;
mod inss;
mod irrf;

pub use avos::{AVO_MIN_DAYS, AvosResult, calculate_avos};
pub use employer_cost::{
    CostPercentages, EMPLOYER_INSS_RATE, EmployerCostParams, EmployerCostResult,
    calculate_employer_cost,
};
pub use fgts::{FgtsRates, FgtsResult, calculate_fgts, calculate_fgts_for, fgts_rates};
pub use inss::{InssMode, InssResult, InssSlice, PRO_LABORE_RATE, calculate_inss};
pub use irrf::{
    DeductionMode, EXEMPTION_FULL_LIMIT, EXEMPTION_PHASE_OUT_LIMIT, IrrfInput, IrrfResult,
    calculate_irrf,
};
