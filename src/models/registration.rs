//! Employer-side classification enums.
//!
//! [`RegistrationType`] drives the FGTS rate lookup and [`TaxRegime`] drives
//! the approximate overhead used in the employer cost aggregation.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Worker registration category for FGTS purposes.
///
/// # Example
///
/// ```
/// use folha_engine::models::RegistrationType;
/// use std::str::FromStr;
///
/// let kind = RegistrationType::from_str("domestico").unwrap();
/// assert_eq!(kind, RegistrationType::Domestico);
/// assert!(RegistrationType::from_str("estagiario").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationType {
    /// Regular CLT employment.
    CltGeral,
    /// Apprentice contract (Lei 10.097/2000).
    JovemAprendiz,
    /// Domestic worker (LC 150/2015).
    Domestico,
}

impl RegistrationType {
    /// Wire name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationType::CltGeral => "clt_geral",
            RegistrationType::JovemAprendiz => "jovem_aprendiz",
            RegistrationType::Domestico => "domestico",
        }
    }
}

impl fmt::Display for RegistrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "clt_geral" => Ok(RegistrationType::CltGeral),
            "jovem_aprendiz" => Ok(RegistrationType::JovemAprendiz),
            "domestico" => Ok(RegistrationType::Domestico),
            other => Err(EngineError::unsupported("registration type", other)),
        }
    }
}

/// The employer's federal tax regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    /// Simples Nacional.
    SimplesNacional,
    /// Lucro Presumido.
    LucroPresumido,
    /// Lucro Real.
    LucroReal,
}

impl TaxRegime {
    /// Approximate payroll overhead for the regime, as a percentage of gross
    /// salary (RAT plus third-party contributions).
    ///
    /// These are estimates. The real figures depend on the employer's revenue
    /// bracket, activity code and accident-risk factor.
    pub fn approx_overhead_rate(&self) -> Decimal {
        match self {
            TaxRegime::SimplesNacional => SIMPLES_NACIONAL_APPROX_RATE,
            TaxRegime::LucroPresumido => LUCRO_PRESUMIDO_APPROX_RATE,
            TaxRegime::LucroReal => LUCRO_REAL_APPROX_RATE,
        }
    }

    /// Wire name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxRegime::SimplesNacional => "simples_nacional",
            TaxRegime::LucroPresumido => "lucro_presumido",
            TaxRegime::LucroReal => "lucro_real",
        }
    }
}

/// Estimated overhead for Simples Nacional employers (none on top of the DAS).
pub const SIMPLES_NACIONAL_APPROX_RATE: Decimal = Decimal::ZERO;

/// Estimated overhead for Lucro Presumido: RAT 2% plus third parties 5.8%.
pub const LUCRO_PRESUMIDO_APPROX_RATE: Decimal = Decimal::from_parts(780, 0, 0, false, 2);

/// Estimated overhead for Lucro Real: RAT 3% plus third parties 5.8%.
pub const LUCRO_REAL_APPROX_RATE: Decimal = Decimal::from_parts(880, 0, 0, false, 2);

impl fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxRegime {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "simples_nacional" => Ok(TaxRegime::SimplesNacional),
            "lucro_presumido" => Ok(TaxRegime::LucroPresumido),
            "lucro_real" => Ok(TaxRegime::LucroReal),
            other => Err(EngineError::unsupported("tax regime", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_type_round_trips_through_str() {
        for kind in [
            RegistrationType::CltGeral,
            RegistrationType::JovemAprendiz,
            RegistrationType::Domestico,
        ] {
            assert_eq!(RegistrationType::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_registration_type_names_value() {
        match RegistrationType::from_str("pj") {
            Err(EngineError::UnsupportedValue { kind, value }) => {
                assert_eq!(kind, "registration type");
                assert_eq!(value, "pj");
            }
            other => panic!("Expected UnsupportedValue, got {:?}", other),
        }
    }

    #[test]
    fn test_registration_type_serde_names() {
        let json = serde_json::to_string(&RegistrationType::JovemAprendiz).unwrap();
        assert_eq!(json, "\"jovem_aprendiz\"");
    }

    #[test]
    fn test_tax_regime_overhead_constants() {
        assert_eq!(TaxRegime::SimplesNacional.approx_overhead_rate(), Decimal::ZERO);
        assert_eq!(TaxRegime::LucroPresumido.approx_overhead_rate(), Decimal::new(78, 1));
        assert_eq!(TaxRegime::LucroReal.approx_overhead_rate(), Decimal::new(88, 1));
    }

    #[test]
    fn test_unknown_tax_regime_is_rejected() {
        let err = TaxRegime::from_str("mei").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported tax regime: mei");
    }
}
