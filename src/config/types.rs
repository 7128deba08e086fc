//! Rule-table types.
//!
//! This module contains the strongly-typed, year-indexed bracket tables that
//! are deserialized from the YAML rule-table resource. Tables are immutable
//! once loaded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::HUNDRED;

/// A single INSS contribution bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InssBracket {
    /// Upper limit of the bracket, inclusive.
    pub limit: Decimal,
    /// Contribution rate as a percentage.
    pub rate: Decimal,
}

/// The INSS table for one calendar year.
///
/// # Example
///
/// ```
/// use folha_engine::config::{InssBracket, InssTable};
/// use rust_decimal::Decimal;
///
/// let table = InssTable {
///     year: 2024,
///     ceiling: Decimal::new(778602, 2),
///     brackets: vec![
///         InssBracket { limit: Decimal::new(141200, 2), rate: Decimal::new(75, 1) },
///         InssBracket { limit: Decimal::new(778602, 2), rate: Decimal::from(14) },
///     ],
/// };
/// assert_eq!(table.top_rate(), Decimal::from(14));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InssTable {
    /// Calendar year the table applies to.
    pub year: i32,
    /// Maximum contribution base (teto previdenciário).
    pub ceiling: Decimal,
    /// Brackets, ascending by limit.
    pub brackets: Vec<InssBracket>,
}

impl InssTable {
    /// Rate of the highest bracket.
    pub fn top_rate(&self) -> Decimal {
        self.brackets.last().map(|b| b.rate).unwrap_or(Decimal::ZERO)
    }

    /// The largest contribution the table allows: `ceiling × top rate`.
    pub fn max_contribution(&self) -> Decimal {
        self.ceiling * self.top_rate() / HUNDRED
    }

    /// Checks the bracket invariants, returning a description of the first
    /// violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.brackets.is_empty() {
            return Err(format!("INSS table {} has no brackets", self.year));
        }
        if self.ceiling <= Decimal::ZERO {
            return Err(format!("INSS table {} has a non-positive ceiling", self.year));
        }
        let mut previous = Decimal::ZERO;
        for (i, bracket) in self.brackets.iter().enumerate() {
            if bracket.limit <= previous {
                return Err(format!(
                    "INSS table {} bracket {} limit {} is not above {}",
                    self.year,
                    i + 1,
                    bracket.limit,
                    previous
                ));
            }
            check_rate(self.year, i, bracket.rate)?;
            previous = bracket.limit;
        }
        Ok(())
    }
}

/// A single IRRF bracket. A missing `limit` marks the open top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrfBracket {
    /// Upper limit of the bracket, inclusive; `None` for the open top bracket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Decimal>,
    /// Tax rate as a percentage.
    pub rate: Decimal,
    /// Amount subtracted after applying the rate (parcela a deduzir).
    #[serde(default)]
    pub deduction: Decimal,
}

impl IrrfBracket {
    /// True if `base` falls at or below this bracket's limit.
    pub fn covers(&self, base: Decimal) -> bool {
        self.limit.is_none_or(|limit| base <= limit)
    }
}

/// One revision of the IRRF table.
///
/// A year may carry several revisions; each becomes effective from
/// `effective_from_month` of its year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrfTable {
    /// Calendar year the revision belongs to.
    pub year: i32,
    /// First month (1-12) the revision applies to.
    #[serde(default = "default_effective_month")]
    pub effective_from_month: u32,
    /// Brackets, ascending by limit.
    pub brackets: Vec<IrrfBracket>,
    /// Deduction per dependent in normal mode.
    pub dependent_deduction: Decimal,
    /// Fixed deduction used in simplified mode, if the regulation offers one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplified_deduction: Option<Decimal>,
    /// Smallest amount worth collecting (DARF minimum).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_collectible: Option<Decimal>,
    /// Whether the R$ 5,000 / R$ 7,000 exemption reduction applies.
    #[serde(default)]
    pub law_change_exemption: bool,
}

fn default_effective_month() -> u32 {
    1
}

impl IrrfTable {
    /// Finds the first bracket whose limit is at or above `base`.
    pub fn bracket_for(&self, base: Decimal) -> Option<(usize, &IrrfBracket)> {
        self.brackets.iter().enumerate().find(|(_, b)| b.covers(base))
    }

    /// Checks the bracket invariants, returning a description of the first
    /// violation.
    pub fn validate(&self) -> Result<(), String> {
        let label = format!("IRRF table {}/{:02}", self.year, self.effective_from_month);
        if !(1..=12).contains(&self.effective_from_month) {
            return Err(format!("{} has an invalid effective month", label));
        }
        if self.brackets.is_empty() {
            return Err(format!("{} has no brackets", label));
        }
        let last = self.brackets.len() - 1;
        let mut previous: Option<Decimal> = None;
        for (i, bracket) in self.brackets.iter().enumerate() {
            match bracket.limit {
                None if i != last => {
                    return Err(format!("{} bracket {} is open but not last", label, i + 1));
                }
                Some(limit) if previous.is_some_and(|p| limit <= p) => {
                    return Err(format!(
                        "{} bracket {} limit {} is not increasing",
                        label,
                        i + 1,
                        limit
                    ));
                }
                _ => {}
            }
            if bracket.deduction < Decimal::ZERO {
                return Err(format!("{} bracket {} has a negative deduction", label, i + 1));
            }
            check_rate(self.year, i, bracket.rate)?;
            previous = bracket.limit;
        }
        if self.dependent_deduction < Decimal::ZERO {
            return Err(format!("{} has a negative dependent deduction", label));
        }
        Ok(())
    }
}

fn check_rate(year: i32, index: usize, rate: Decimal) -> Result<(), String> {
    if rate < Decimal::ZERO || rate > HUNDRED {
        return Err(format!(
            "table {} bracket {} rate {} is outside 0-100",
            year,
            index + 1,
            rate
        ));
    }
    Ok(())
}

/// File structure of `inss.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct InssTablesFile {
    /// One table per year.
    pub tables: Vec<InssTable>,
}

/// File structure of `irrf.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct IrrfTablesFile {
    /// One or more revisions per year.
    pub tables: Vec<IrrfTable>,
}
