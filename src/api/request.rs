//! Request types for the calculation API.
//!
//! This module defines the JSON request bodies for each calculator endpoint.
//! Enumerated fields arrive as plain strings and are parsed by the handlers,
//! so an unknown value is reported by name rather than as a JSON error.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::IrrfInput;
use crate::models::LeavePeriod;

/// Request body for `POST /inss`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InssRequest {
    /// Monthly gross salary.
    pub gross_salary: Decimal,
    /// Apply the flat pro-labore rate.
    #[serde(default)]
    pub pro_labore: bool,
    /// Table year; defaults to the current year.
    #[serde(default)]
    pub year: Option<i32>,
}

/// Request body for `POST /irrf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrfRequest {
    /// Monthly gross salary.
    pub gross_salary: Decimal,
    /// INSS withheld; computed from the salary when omitted.
    #[serde(default)]
    pub inss_amount: Option<Decimal>,
    /// Number of dependents.
    #[serde(default)]
    pub dependents: u32,
    /// Alimony paid.
    #[serde(default)]
    pub pension_alimony: Decimal,
    /// Use the simplified deduction.
    #[serde(default)]
    pub simplified_deduction: bool,
    /// Table year; defaults to the current year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Month (1-12) for mid-year table revisions.
    #[serde(default)]
    pub month: Option<u32>,
}

impl IrrfRequest {
    /// Builds the calculator input once the INSS amount is known.
    pub fn to_input(&self, inss_amount: Decimal) -> IrrfInput {
        IrrfInput {
            gross_salary: self.gross_salary,
            inss_amount,
            dependents: self.dependents,
            pension_alimony: self.pension_alimony,
            use_simplified_deduction: self.simplified_deduction,
        }
    }
}

/// Request body for `POST /fgts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FgtsRequest {
    /// Monthly gross salary.
    pub gross_salary: Decimal,
    /// One of `clt_geral`, `jovem_aprendiz`, `domestico`.
    pub registration_type: String,
}

/// Request body for `POST /avos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvosRequest {
    /// First day of employment.
    pub admission_date: NaiveDate,
    /// Last day considered (usually 31 December or the termination date).
    pub reference_date: NaiveDate,
    /// INSS-covered absences.
    #[serde(default)]
    pub leave_periods: Vec<LeavePeriod>,
}

/// Request body for `POST /employer-cost`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerCostRequest {
    /// Monthly gross salary.
    pub gross_salary: Decimal,
    /// Registration type for FGTS; defaults to `clt_geral`.
    #[serde(default = "default_registration_type")]
    pub registration_type: String,
    /// One of `simples_nacional`, `lucro_presumido`, `lucro_real`.
    pub tax_regime: String,
    /// Other monthly charges.
    #[serde(default)]
    pub additional_charges: Decimal,
    /// Monthly benefits.
    #[serde(default)]
    pub benefits: Decimal,
    /// INSS table year for the ceiling; defaults to the current year.
    #[serde(default)]
    pub year: Option<i32>,
}

fn default_registration_type() -> String {
    "clt_geral".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_irrf_request_with_defaults() {
        let json = r#"{ "gross_salary": "5000.00" }"#;
        let request: IrrfRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.gross_salary, Decimal::from_str("5000.00").unwrap());
        assert!(request.inss_amount.is_none());
        assert_eq!(request.dependents, 0);
        assert!(!request.simplified_deduction);
        assert!(request.month.is_none());
    }

    #[test]
    fn test_deserialize_numeric_amounts() {
        let json = r#"{ "gross_salary": 1412.00, "pro_labore": true, "year": 2024 }"#;
        let request: InssRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.gross_salary, Decimal::from(1412));
        assert!(request.pro_labore);
        assert_eq!(request.year, Some(2024));
    }

    #[test]
    fn test_deserialize_avos_request_with_leave() {
        let json = r#"{
            "admission_date": "2024-01-01",
            "reference_date": "2024-12-31",
            "leave_periods": [{ "start": "2024-03-01", "end": "2024-03-20" }]
        }"#;
        let request: AvosRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.leave_periods.len(), 1);
        assert_eq!(request.leave_periods[0].days(), 20);
    }

    #[test]
    fn test_employer_cost_request_defaults_to_clt_geral() {
        let json = r#"{ "gross_salary": "3000", "tax_regime": "lucro_real" }"#;
        let request: EmployerCostRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.registration_type, "clt_geral");
        assert_eq!(request.benefits, Decimal::ZERO);
    }

    #[test]
    fn test_irrf_request_to_input() {
        let json = r#"{ "gross_salary": "4000", "dependents": 2, "pension_alimony": "100" }"#;
        let request: IrrfRequest = serde_json::from_str(json).unwrap();
        let input = request.to_input(Decimal::from(300));

        assert_eq!(input.inss_amount, Decimal::from(300));
        assert_eq!(input.dependents, 2);
        assert_eq!(input.pension_alimony, Decimal::from(100));
    }
}
