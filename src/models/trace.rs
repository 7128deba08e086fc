//! Computation trace models.
//!
//! Every calculator returns a [`ComputationTrace`] alongside its numeric
//! result. The trace is an ordered, human-readable record of each step taken,
//! intended for audit and compliance display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::format_money;

/// A single step in a computation trace.
///
/// `index` is 1-based and contiguous within a trace. The optional fields are
/// preserved verbatim by downstream renderers when present.
///
/// # Example
///
/// ```
/// use folha_engine::models::TraceStep;
///
/// let step = TraceStep {
///     index: 1,
///     description: "Faixa 1 (até 1412.00)".to_string(),
///     formula: Some("1412.00 × 7.50%".to_string()),
///     value: "105.90".to_string(),
///     highlighted: false,
///     detail: None,
/// };
/// assert_eq!(step.index, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    /// The sequential step number, starting at 1.
    pub index: u32,
    /// What this step computes.
    pub description: String,
    /// The formula applied, as display text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// The resulting value: a 2-decimal money string or free text.
    pub value: String,
    /// Whether a renderer should emphasise this step.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub highlighted: bool,
    /// Extra explanation attached to the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The ordered list of steps produced by one calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputationTrace {
    steps: Vec<TraceStep>,
}

impl ComputationTrace {
    /// Returns the recorded steps in order.
    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true when no step was recorded.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the last step, usually the final total.
    pub fn last(&self) -> Option<&TraceStep> {
        self.steps.last()
    }
}

/// Incrementally builds a [`ComputationTrace`], numbering steps as they are
/// pushed.
///
/// # Example
///
/// ```
/// use folha_engine::models::TraceBuilder;
/// use rust_decimal::Decimal;
///
/// let mut trace = TraceBuilder::new();
/// trace.money("Salário bruto", Decimal::from(2000));
/// trace.text("Modo", "progressivo").highlight();
/// let trace = trace.finish();
///
/// assert_eq!(trace.steps()[0].value, "2000.00");
/// assert_eq!(trace.steps()[1].index, 2);
/// assert!(trace.steps()[1].highlighted);
/// ```
#[derive(Debug, Default)]
pub struct TraceBuilder {
    steps: Vec<TraceStep>,
}

impl TraceBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step whose value is a money amount.
    pub fn money(&mut self, description: impl Into<String>, amount: Decimal) -> StepHandle<'_> {
        self.push(description.into(), format_money(amount))
    }

    /// Appends a step whose value is free text.
    pub fn text(
        &mut self,
        description: impl Into<String>,
        value: impl Into<String>,
    ) -> StepHandle<'_> {
        self.push(description.into(), value.into())
    }

    /// Appends every step of another trace, renumbering them to follow on.
    pub fn extend(&mut self, other: ComputationTrace) {
        for step in other.steps {
            let index = self.next_index();
            self.steps.push(TraceStep { index, ..step });
        }
    }

    /// Consumes the builder and returns the finished trace.
    pub fn finish(self) -> ComputationTrace {
        ComputationTrace { steps: self.steps }
    }

    fn next_index(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    fn push(&mut self, description: String, value: String) -> StepHandle<'_> {
        let index = self.next_index();
        self.steps.push(TraceStep {
            index,
            description,
            formula: None,
            value,
            highlighted: false,
            detail: None,
        });
        let last = self.steps.len() - 1;
        StepHandle {
            step: &mut self.steps[last],
        }
    }
}

/// Mutable access to the step just pushed, for attaching optional fields.
pub struct StepHandle<'a> {
    step: &'a mut TraceStep,
}

impl StepHandle<'_> {
    /// Attaches the formula text.
    pub fn formula(self, formula: impl Into<String>) -> Self {
        self.step.formula = Some(formula.into());
        self
    }

    /// Attaches a detail note.
    pub fn detail(self, detail: impl Into<String>) -> Self {
        self.step.detail = Some(detail.into());
        self
    }

    /// Marks the step as highlighted.
    pub fn highlight(self) -> Self {
        self.step.highlighted = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_start_at_one_and_are_contiguous() {
        let mut builder = TraceBuilder::new();
        builder.text("a", "x");
        builder.money("b", Decimal::ONE);
        builder.text("c", "y");
        let trace = builder.finish();

        let indices: Vec<u32> = trace.steps().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_extend_renumbers_steps() {
        let mut inner = TraceBuilder::new();
        inner.text("inner 1", "a");
        inner.text("inner 2", "b");
        let inner = inner.finish();

        let mut outer = TraceBuilder::new();
        outer.text("outer", "o");
        outer.extend(inner);
        let trace = outer.finish();

        assert_eq!(trace.len(), 3);
        assert_eq!(trace.steps()[1].index, 2);
        assert_eq!(trace.steps()[2].description, "inner 2");
        assert_eq!(trace.steps()[2].index, 3);
    }

    #[test]
    fn test_optional_fields_are_skipped_when_absent() {
        let mut builder = TraceBuilder::new();
        builder.money("Total", Decimal::new(22400, 2));
        let json = serde_json::to_string(&builder.finish()).unwrap();

        assert_eq!(json, r#"[{"index":1,"description":"Total","value":"224.00"}]"#);
    }

    #[test]
    fn test_optional_fields_are_serialized_when_present() {
        let mut builder = TraceBuilder::new();
        builder
            .money("Total", Decimal::new(50564, 2))
            .formula("5000.00 × 27.50% - 869.36")
            .detail("Faixa 5")
            .highlight();
        let json = serde_json::to_string(&builder.finish()).unwrap();

        assert!(json.contains(r#""formula":"5000.00 × 27.50% - 869.36""#));
        assert!(json.contains(r#""highlighted":true"#));
        assert!(json.contains(r#""detail":"Faixa 5""#));
    }

    #[test]
    fn test_step_deserializes_without_optional_fields() {
        let json = r#"{"index": 4, "description": "Base", "value": "10.00"}"#;
        let step: TraceStep = serde_json::from_str(json).unwrap();

        assert_eq!(step.index, 4);
        assert!(step.formula.is_none());
        assert!(!step.highlighted);
    }
}
