//! Core data models for the payroll calculation engine.
//!
//! This module contains the value types shared by every calculator: money
//! helpers, the computation trace, registration and regime enums, and the
//! leave/proration records.

mod leave;
mod money;
mod registration;
mod trace;

pub use leave::{LeavePeriod, ProrationMonth};
pub use money::{HUNDRED, ZERO_MONEY, format_money, format_rate, percent_of, round_money};
pub use registration::{
    LUCRO_PRESUMIDO_APPROX_RATE, LUCRO_REAL_APPROX_RATE, RegistrationType,
    SIMPLES_NACIONAL_APPROX_RATE, TaxRegime,
};
pub use trace::{ComputationTrace, StepHandle, TraceBuilder, TraceStep};
