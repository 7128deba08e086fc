//! Payroll Tax Engine for Brazilian Payroll
//!
//! This crate computes the statutory payroll figures for a monthly pay run:
//! employee INSS, IRRF withholding, FGTS deposits, 13th-salary proration and
//! total employer cost. Rates and brackets are loaded from year-indexed YAML
//! tables, and every calculation carries a step-by-step computation trace.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
