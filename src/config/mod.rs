//! Rule-table loading and resolution for the payroll calculation engine.
//!
//! This module loads the year-indexed INSS and IRRF bracket tables from YAML
//! files and resolves which table applies to a given year and month.
//!
//! # Example
//!
//! ```no_run
//! use folha_engine::config::RuleTableProvider;
//!
//! let provider = RuleTableProvider::load("./config/tables").unwrap();
//! println!("INSS years: {:?}", provider.inss_years());
//! ```

mod loader;
mod types;

pub use loader::RuleTableProvider;
pub use types::{InssBracket, InssTable, IrrfBracket, IrrfTable};
