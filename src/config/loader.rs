//! Rule-table loading and resolution.
//!
//! This module provides the [`RuleTableProvider`] type, which loads the
//! year-indexed INSS and IRRF tables once and answers "which table applies"
//! for a requested year and month.

use std::fs;
use std::path::Path;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

use super::types::{
    InssBracket, InssTable, InssTablesFile, IrrfBracket, IrrfTable, IrrfTablesFile,
};

/// Holds the immutable rule tables and resolves them by year.
///
/// Tables are sorted at construction and never mutated afterwards, so a
/// provider can be shared across threads behind an `Arc` without locking.
///
/// # Directory Structure
///
/// ```text
/// config/tables/
/// ├── inss.yaml   # one table per year
/// └── irrf.yaml   # one or more revisions per year
/// ```
///
/// # Resolution Policy
///
/// - An omitted year means the current calendar year.
/// - A year with no table falls back to the **most recent** year available,
///   never to the nearest year.
/// - IRRF revisions apply from their `effective_from_month`; an earlier month
///   of the same year uses the prior revision.
///
/// # Example
///
/// ```no_run
/// use folha_engine::config::RuleTableProvider;
///
/// let provider = RuleTableProvider::load_or_default("./config/tables");
/// let inss = provider.get_inss_table(Some(2024));
/// let irrf = provider.get_irrf_table(Some(2025), Some(6));
/// println!("INSS ceiling {}: {}", inss.year, inss.ceiling);
/// println!("IRRF revision {}/{}", irrf.year, irrf.effective_from_month);
/// ```
#[derive(Debug, Clone)]
pub struct RuleTableProvider {
    /// Sorted by year; never empty.
    inss: Vec<InssTable>,
    /// Sorted by (year, effective month); never empty.
    irrf: Vec<IrrfTable>,
}

impl RuleTableProvider {
    /// Loads tables from `inss.yaml` and `irrf.yaml` in the given directory.
    ///
    /// # Returns
    ///
    /// Returns an error if either file is missing, is not valid YAML, or
    /// contains a table violating the bracket invariants.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let inss_path = path.join("inss.yaml");
        let inss = Self::load_yaml::<InssTablesFile>(&inss_path)?.tables;

        let irrf_path = path.join("irrf.yaml");
        let irrf = Self::load_yaml::<IrrfTablesFile>(&irrf_path)?.tables;

        let provider = Self::build(inss, irrf, &path.display().to_string())?;
        info!(
            path = %path.display(),
            inss_years = provider.inss.len(),
            irrf_revisions = provider.irrf.len(),
            "Loaded rule tables"
        );
        Ok(provider)
    }

    /// Loads tables like [`RuleTableProvider::load`], falling back to the
    /// built-in defaults if the resource cannot be read.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(provider) => provider,
            Err(err) => {
                warn!(error = %err, "Rule tables unavailable, using built-in defaults");
                Self::builtin()
            }
        }
    }

    /// Builds a provider from in-memory tables, validating them the same way
    /// as the YAML loader.
    pub fn from_tables(inss: Vec<InssTable>, irrf: Vec<IrrfTable>) -> EngineResult<Self> {
        Self::build(inss, irrf, "in-memory tables")
    }

    /// The built-in fallback tables, covering only the most recent known
    /// years.
    pub fn builtin() -> Self {
        let recent_irrf = |year: i32, effective_from_month: u32, law_change_exemption: bool| {
            IrrfTable {
                year,
                effective_from_month,
                brackets: vec![
                    irrf_bracket(Some(242880), 0, 0),
                    irrf_bracket(Some(282665), 75, 18216),
                    irrf_bracket(Some(375105), 150, 39416),
                    irrf_bracket(Some(466468), 225, 67549),
                    irrf_bracket(None, 275, 90873),
                ],
                dependent_deduction: Decimal::new(18959, 2),
                simplified_deduction: Some(Decimal::new(60720, 2)),
                minimum_collectible: Some(Decimal::new(1000, 2)),
                law_change_exemption,
            }
        };

        Self {
            inss: vec![InssTable {
                year: 2025,
                ceiling: Decimal::new(815741, 2),
                brackets: vec![
                    inss_bracket(151800, 75),
                    inss_bracket(279388, 90),
                    inss_bracket(419083, 120),
                    inss_bracket(815741, 140),
                ],
            }],
            irrf: vec![recent_irrf(2025, 5, false), recent_irrf(2026, 1, true)],
        }
    }

    fn build(mut inss: Vec<InssTable>, mut irrf: Vec<IrrfTable>, source: &str) -> EngineResult<Self> {
        let parse_error = |message: String| EngineError::ConfigParseError {
            path: source.to_string(),
            message,
        };

        if inss.is_empty() {
            return Err(parse_error("no INSS tables defined".to_string()));
        }
        if irrf.is_empty() {
            return Err(parse_error("no IRRF tables defined".to_string()));
        }
        for table in &inss {
            table.validate().map_err(parse_error)?;
        }
        for table in &irrf {
            table.validate().map_err(parse_error)?;
        }

        inss.sort_by_key(|t| t.year);
        irrf.sort_by_key(|t| (t.year, t.effective_from_month));

        if let Some(pair) = inss.windows(2).find(|w| w[0].year == w[1].year) {
            return Err(parse_error(format!("duplicate INSS table for {}", pair[0].year)));
        }
        if let Some(pair) = irrf.windows(2).find(|w| {
            (w[0].year, w[0].effective_from_month) == (w[1].year, w[1].effective_from_month)
        }) {
            return Err(parse_error(format!(
                "duplicate IRRF revision for {}/{:02}",
                pair[0].year, pair[0].effective_from_month
            )));
        }

        Ok(Self { inss, irrf })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the INSS table for `year` (default: current year), falling back
    /// to the most recent year available.
    pub fn get_inss_table(&self, year: Option<i32>) -> &InssTable {
        let requested = year.unwrap_or_else(current_year);
        match self.inss.iter().find(|t| t.year == requested) {
            Some(table) => table,
            None => {
                let latest = self.latest_inss();
                debug!(
                    requested,
                    resolved = latest.year,
                    "No INSS table for year, using most recent"
                );
                latest
            }
        }
    }

    /// Returns the IRRF revision in force for `year`/`month`.
    ///
    /// An omitted year means the current year and an omitted month means
    /// January. A year without any revision falls back to the latest revision
    /// of the most recent year.
    pub fn get_irrf_table(&self, year: Option<i32>, month: Option<u32>) -> &IrrfTable {
        let requested = year.unwrap_or_else(current_year);
        let month = month.unwrap_or(1);

        let mut revisions = self.irrf.iter().filter(|t| t.year == requested).peekable();
        let Some(&earliest) = revisions.peek() else {
            let latest = self.latest_irrf();
            debug!(
                requested,
                resolved = latest.year,
                "No IRRF table for year, using most recent"
            );
            return latest;
        };

        if let Some(table) = revisions.filter(|t| t.effective_from_month <= month).last() {
            return table;
        }

        // Month precedes every revision of the year: the prior year's rules
        // are still in force.
        match self.irrf.iter().rev().find(|t| t.year < requested) {
            Some(prior) => {
                debug!(
                    requested,
                    month,
                    resolved = prior.year,
                    resolved_month = prior.effective_from_month,
                    "IRRF revision not yet effective, using prior table"
                );
                prior
            }
            None => earliest,
        }
    }

    /// Years with an INSS table, ascending.
    pub fn inss_years(&self) -> Vec<i32> {
        self.inss.iter().map(|t| t.year).collect()
    }

    /// All IRRF revisions as `(year, effective_from_month)`, ascending.
    pub fn irrf_revisions(&self) -> Vec<(i32, u32)> {
        self.irrf
            .iter()
            .map(|t| (t.year, t.effective_from_month))
            .collect()
    }

    fn latest_inss(&self) -> &InssTable {
        &self.inss[self.inss.len() - 1]
    }

    fn latest_irrf(&self) -> &IrrfTable {
        &self.irrf[self.irrf.len() - 1]
    }
}

fn current_year() -> i32 {
    Utc::now().year()
}

fn inss_bracket(limit_cents: i64, rate_tenths: i64) -> InssBracket {
    InssBracket {
        limit: Decimal::new(limit_cents, 2),
        rate: Decimal::new(rate_tenths, 1),
    }
}

fn irrf_bracket(limit_cents: Option<i64>, rate_tenths: i64, deduction_cents: i64) -> IrrfBracket {
    IrrfBracket {
        limit: limit_cents.map(|l| Decimal::new(l, 2)),
        rate: Decimal::new(rate_tenths, 1),
        deduction: Decimal::new(deduction_cents, 2),
    }
}
