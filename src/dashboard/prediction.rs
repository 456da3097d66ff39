//! Prediction form
//!
//! Collects the eleven applicant fields, derives the two ratio fields,
//! submits through the API and turns the response into a risk assessment.
//!
//! ```text
//! Idle --submit--> Submitting --ok--> Succeeded(Assessment)
//!                       |
//!                       +--error--> Idle (with dismissible error)
//! ```

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::client::{
    ClientResult, CreditRiskApi, ModelMetrics, PredictionRequest, PredictionResponse,
};
use crate::mappings::{self, Code, Domain};

/// Alert shown when the prediction call fails
pub const SUBMIT_ERROR: &str = "Error making prediction. Please try again.";

// ============================================
// FIELDS
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Integer,
    Float,
    /// Category code from a mapping table
    Code(Domain),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Personal,
    Loan,
}

/// Static description of one form field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub section: Section,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub help: Option<&'static str>,
}

const fn field(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    section: Section,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        section,
        min: None,
        max: None,
        step: None,
        help: None,
    }
}

const fn bounded(spec: FieldSpec, min: f64, max: Option<f64>, step: f64) -> FieldSpec {
    FieldSpec {
        min: Some(min),
        max,
        step: Some(step),
        ..spec
    }
}

const fn helped(spec: FieldSpec, help: &'static str) -> FieldSpec {
    FieldSpec {
        help: Some(help),
        ..spec
    }
}

/// The form's fields in display order
pub const FIELDS: [FieldSpec; 11] = [
    helped(
        bounded(
            field("person_age", "Age", FieldKind::Integer, Section::Personal),
            18.0,
            Some(100.0),
            1.0,
        ),
        "Applicant's age (18-100)",
    ),
    bounded(
        field("person_income", "Annual Income", FieldKind::Float, Section::Personal),
        10000.0,
        None,
        1000.0,
    ),
    field(
        "person_home_ownership",
        "Home Ownership",
        FieldKind::Code(Domain::HomeOwnership),
        Section::Personal,
    ),
    helped(
        bounded(
            field(
                "person_emp_length",
                "Employment Length (years)",
                FieldKind::Float,
                Section::Personal,
            ),
            0.0,
            Some(60.0),
            0.5,
        ),
        "Years at current employer",
    ),
    bounded(
        field(
            "cb_person_cred_hist_length",
            "Credit History Length (years)",
            FieldKind::Integer,
            Section::Personal,
        ),
        0.0,
        Some(60.0),
        1.0,
    ),
    field(
        "cb_person_default_on_file",
        "Previous Default on File",
        FieldKind::Code(Domain::DefaultOnFile),
        Section::Personal,
    ),
    field(
        "loan_intent",
        "Loan Intent",
        FieldKind::Code(Domain::LoanIntent),
        Section::Loan,
    ),
    field(
        "loan_grade",
        "Loan Grade",
        FieldKind::Code(Domain::LoanGrade),
        Section::Loan,
    ),
    helped(
        bounded(
            field("loan_amnt", "Loan Amount", FieldKind::Float, Section::Loan),
            1000.0,
            Some(100000.0),
            1000.0,
        ),
        "Amount requested in USD",
    ),
    bounded(
        field("loan_int_rate", "Interest Rate (%)", FieldKind::Float, Section::Loan),
        1.0,
        Some(30.0),
        0.1,
    ),
    helped(
        bounded(
            field(
                "loan_percent_income",
                "Loan Percent Income",
                FieldKind::Float,
                Section::Loan,
            ),
            0.01,
            Some(1.0),
            0.01,
        ),
        "Value between 0.01 and 1.0",
    ),
];

pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.name == name)
}

/// Errors in form input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("{field}: {value:?} is not a valid number")]
    Parse { field: &'static str, value: String },

    #[error("{field} must be {bounds}")]
    OutOfRange {
        field: &'static str,
        bounds: String,
    },

    #[error("{field}: {value:?} is not a valid {domain} option")]
    UnknownCode {
        field: &'static str,
        domain: Domain,
        value: String,
    },

    #[error("{field} must be non-zero")]
    ZeroDivisor { field: &'static str },
}

// ============================================
// FORM VALUES
// ============================================

/// The eleven raw applicant fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationForm {
    pub person_age: u32,
    pub person_income: f64,
    pub person_home_ownership: Code,
    pub person_emp_length: f64,
    pub loan_intent: Code,
    pub loan_grade: Code,
    pub loan_amnt: f64,
    pub loan_int_rate: f64,
    pub loan_percent_income: f64,
    pub cb_person_default_on_file: Code,
    pub cb_person_cred_hist_length: u32,
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self {
            person_age: 35,
            person_income: 85000.0,
            person_home_ownership: 1,
            person_emp_length: 12.0,
            loan_intent: 3,
            loan_grade: 1,
            loan_amnt: 15000.0,
            loan_int_rate: 12.5,
            loan_percent_income: 0.18,
            cb_person_default_on_file: 0,
            cb_person_cred_hist_length: 15,
        }
    }
}

fn parse_float(spec: &FieldSpec, raw: &str) -> Result<f64, FormError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormError::Parse {
            field: spec.name,
            value: raw.to_string(),
        })
}

fn parse_integer(spec: &FieldSpec, raw: &str) -> Result<u32, FormError> {
    let value = parse_float(spec, raw)?;
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(FormError::Parse {
            field: spec.name,
            value: raw.to_string(),
        });
    }
    Ok(value as u32)
}

/// A code, or a label resolved through the reverse mapping
fn parse_code(spec: &FieldSpec, domain: Domain, raw: &str) -> Result<Code, FormError> {
    let raw_trimmed = raw.trim();
    if let Ok(code) = raw_trimmed.parse::<Code>() {
        return Ok(code);
    }
    mappings::mappings()
        .code(domain, raw_trimmed)
        .ok_or_else(|| FormError::UnknownCode {
            field: spec.name,
            domain,
            value: raw.to_string(),
        })
}

impl ApplicationForm {
    /// Build a form from `name=value` pairs over the defaults
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = Self::default();
        for (name, raw) in pairs {
            form.set_field(name, raw)?;
        }
        Ok(form)
    }

    /// Parse `raw` according to the field's kind and store it
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        let spec = field_spec(name).ok_or_else(|| FormError::UnknownField(name.to_string()))?;

        match spec.name {
            "person_age" => self.person_age = parse_integer(spec, raw)?,
            "person_income" => self.person_income = parse_float(spec, raw)?,
            "person_home_ownership" => {
                self.person_home_ownership = parse_code(spec, Domain::HomeOwnership, raw)?
            }
            "person_emp_length" => self.person_emp_length = parse_float(spec, raw)?,
            "loan_intent" => self.loan_intent = parse_code(spec, Domain::LoanIntent, raw)?,
            "loan_grade" => self.loan_grade = parse_code(spec, Domain::LoanGrade, raw)?,
            "loan_amnt" => self.loan_amnt = parse_float(spec, raw)?,
            "loan_int_rate" => self.loan_int_rate = parse_float(spec, raw)?,
            "loan_percent_income" => self.loan_percent_income = parse_float(spec, raw)?,
            "cb_person_default_on_file" => {
                self.cb_person_default_on_file = parse_code(spec, Domain::DefaultOnFile, raw)?
            }
            "cb_person_cred_hist_length" => {
                self.cb_person_cred_hist_length = parse_integer(spec, raw)?
            }
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Numeric value of a field as entered
    pub fn value(&self, name: &str) -> Option<f64> {
        Some(match name {
            "person_age" => self.person_age as f64,
            "person_income" => self.person_income,
            "person_home_ownership" => self.person_home_ownership as f64,
            "person_emp_length" => self.person_emp_length,
            "loan_intent" => self.loan_intent as f64,
            "loan_grade" => self.loan_grade as f64,
            "loan_amnt" => self.loan_amnt,
            "loan_int_rate" => self.loan_int_rate,
            "loan_percent_income" => self.loan_percent_income,
            "cb_person_default_on_file" => self.cb_person_default_on_file as f64,
            "cb_person_cred_hist_length" => self.cb_person_cred_hist_length as f64,
            _ => return None,
        })
    }

    /// `loan_amnt / person_income`
    pub fn debt_to_income(&self) -> Result<f64, FormError> {
        if self.person_income == 0.0 {
            return Err(FormError::ZeroDivisor {
                field: "person_income",
            });
        }
        Ok(self.loan_amnt / self.person_income)
    }

    /// `person_income / loan_amnt`
    pub fn income_to_loan_ratio(&self) -> Result<f64, FormError> {
        if self.loan_amnt == 0.0 {
            return Err(FormError::ZeroDivisor { field: "loan_amnt" });
        }
        Ok(self.person_income / self.loan_amnt)
    }

    /// Derived fields as displayed: 3 and 2 decimals, `-` when undefined
    pub fn derived_display(&self) -> (String, String) {
        (
            self.debt_to_income()
                .map(|v| format!("{:.3}", v))
                .unwrap_or_else(|_| "-".to_string()),
            self.income_to_loan_ratio()
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|_| "-".to_string()),
        )
    }

    /// Check ranges and category codes
    pub fn validate(&self) -> Result<(), FormError> {
        let table = mappings::mappings();
        for spec in FIELDS.iter() {
            let Some(value) = self.value(spec.name) else {
                continue;
            };

            if let FieldKind::Code(domain) = spec.kind {
                if !table.table(domain).contains(value as Code) {
                    return Err(FormError::UnknownCode {
                        field: spec.name,
                        domain,
                        value: (value as Code).to_string(),
                    });
                }
                continue;
            }

            let below = spec.min.is_some_and(|min| value < min);
            let above = spec.max.is_some_and(|max| value > max);
            if below || above {
                let bounds = match (spec.min, spec.max) {
                    (Some(min), Some(max)) => format!("between {} and {}", min, max),
                    (Some(min), None) => format!("at least {}", min),
                    (None, Some(max)) => format!("at most {}", max),
                    (None, None) => String::new(),
                };
                return Err(FormError::OutOfRange {
                    field: spec.label,
                    bounds,
                });
            }
        }
        Ok(())
    }

    /// Validated request body with the derived ratios filled in
    pub fn to_request(&self) -> Result<PredictionRequest, FormError> {
        self.validate()?;
        Ok(PredictionRequest {
            person_age: self.person_age,
            person_income: self.person_income,
            person_home_ownership: self.person_home_ownership,
            person_emp_length: self.person_emp_length,
            loan_intent: self.loan_intent,
            loan_grade: self.loan_grade,
            loan_amnt: self.loan_amnt,
            loan_int_rate: self.loan_int_rate,
            loan_percent_income: self.loan_percent_income,
            cb_person_default_on_file: self.cb_person_default_on_file,
            cb_person_cred_hist_length: self.cb_person_cred_hist_length,
            debt_to_income: self.debt_to_income()?,
            income_to_loan_ratio: self.income_to_loan_ratio()?,
        })
    }
}

// ============================================
// ASSESSMENT
// ============================================

/// Risk band of the default-class probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Low below 25 %, Moderate below 50 %, High otherwise
    pub fn from_probability(p_default: f64) -> Self {
        let percent = p_default * 100.0;
        if percent < 25.0 {
            RiskTier::Low
        } else if percent < 50.0 {
            RiskTier::Moderate
        } else {
            RiskTier::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Moderate => "Moderate Risk",
            RiskTier::High => "High Risk",
        }
    }

    /// Bootstrap contextual colour
    pub fn variant(&self) -> &'static str {
        match self {
            RiskTier::Low => "success",
            RiskTier::Moderate => "warning",
            RiskTier::High => "danger",
        }
    }
}

/// A prediction response interpreted for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// Predicted class (0 non-default, 1 default)
    pub class: usize,
    pub classification: String,
    /// Probability of the predicted class
    pub confidence: f64,
    /// Probability of the default class
    pub default_probability: f64,
    pub tier: RiskTier,
    pub model_name: String,
    pub model_version: String,
    pub metrics: Option<ModelMetrics>,
    pub response: PredictionResponse,
}

impl Assessment {
    pub fn from_response(response: PredictionResponse) -> ClientResult<Self> {
        let class = response.predicted_class()?;
        let confidence = response.confidence()?;
        let default_probability = response.default_probability()?;
        let classification = mappings::mappings().display(Domain::LoanStatus, class as Code);

        Ok(Self {
            class,
            classification,
            confidence,
            default_probability,
            tier: RiskTier::from_probability(default_probability),
            model_name: response.model_info.name.clone(),
            model_version: response.model_info.version.clone(),
            metrics: response.model_info.parsed_metrics(),
            response,
        })
    }

    pub fn is_default(&self) -> bool {
        self.class != 0
    }

    pub fn recommendation(&self) -> &'static str {
        if self.is_default() {
            "This loan has a high risk of default. Caution is advised."
        } else {
            "This loan has a low risk of default. Recommended for approval."
        }
    }

    /// Pretty-printed response body
    pub fn raw_json(&self) -> String {
        serde_json::to_string_pretty(&self.response).unwrap_or_default()
    }
}

// ============================================
// PANEL STATE MACHINE
// ============================================

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Submitting,
    Succeeded(Assessment),
}

/// Prediction form component: form values, submission phase and error
pub struct PredictionPanel<A: CreditRiskApi + ?Sized> {
    api: Arc<A>,
    form: ApplicationForm,
    phase: Phase,
    error: Option<String>,
}

impl<A: CreditRiskApi + ?Sized> PredictionPanel<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self::with_form(api, ApplicationForm::default())
    }

    pub fn with_form(api: Arc<A>, form: ApplicationForm) -> Self {
        Self {
            api,
            form,
            phase: Phase::Idle,
            error: None,
        }
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn assessment(&self) -> Option<&Assessment> {
        match &self.phase {
            Phase::Succeeded(assessment) => Some(assessment),
            _ => None,
        }
    }

    /// Submission is disabled while a request is in flight
    pub fn can_submit(&self) -> bool {
        !matches!(self.phase, Phase::Submitting)
    }

    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        self.form.set_field(name, raw)
    }

    /// Enter `Submitting` and return the request to send.
    ///
    /// Returns `None` while a submission is already in flight or when the
    /// form is invalid; the latter records an error and stays idle.
    pub fn begin_submit(&mut self) -> Option<PredictionRequest> {
        if !self.can_submit() {
            return None;
        }

        self.error = None;
        match self.form.to_request() {
            Ok(request) => {
                self.phase = Phase::Submitting;
                Some(request)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.phase = Phase::Idle;
                None
            }
        }
    }

    /// Leave `Submitting` with the outcome of the call
    pub fn finish_submit(&mut self, result: ClientResult<PredictionResponse>) {
        let outcome = result.and_then(Assessment::from_response);
        match outcome {
            Ok(assessment) => {
                tracing::info!(
                    class = assessment.class,
                    p_default = assessment.default_probability,
                    tier = ?assessment.tier,
                    "Prediction received"
                );
                self.phase = Phase::Succeeded(assessment);
            }
            Err(e) => {
                tracing::error!(error = %e, "Prediction error");
                self.error = Some(SUBMIT_ERROR.to_string());
                self.phase = Phase::Idle;
            }
        }
    }

    /// Validate, call the API and record the outcome
    pub async fn submit(&mut self) -> &Phase {
        if let Some(request) = self.begin_submit() {
            let result = self.api.predict(&request).await;
            self.finish_submit(result);
        }
        &self.phase
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Restore defaults and clear any result
    pub fn reset(&mut self) {
        self.form = ApplicationForm::default();
        self.phase = Phase::Idle;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeApi;
    use crate::client::{ClientError, ModelInfo};

    #[test]
    fn test_default_derived_ratios() {
        let form = ApplicationForm::default();
        assert!((form.debt_to_income().unwrap() - 0.176).abs() < 1e-3);
        assert!((form.income_to_loan_ratio().unwrap() - 5.667).abs() < 1e-3);
        assert_eq!(
            form.derived_display(),
            ("0.176".to_string(), "5.67".to_string())
        );
    }

    #[test]
    fn test_request_carries_all_fields() {
        let request = ApplicationForm::default().to_request().unwrap();
        assert_eq!(request.person_age, 35);
        assert_eq!(request.loan_grade, 1);
        assert_eq!(request.cb_person_cred_hist_length, 15);
        assert!((request.income_to_loan_ratio - 85000.0 / 15000.0).abs() < 1e-12);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 13);
    }

    #[test]
    fn test_set_field_parsing() {
        let mut form = ApplicationForm::default();
        form.set_field("person_age", "42").unwrap();
        form.set_field("loan_int_rate", " 9.75 ").unwrap();
        form.set_field("person_home_ownership", "RENT").unwrap();
        form.set_field("loan_grade", "4").unwrap();
        assert_eq!(form.person_age, 42);
        assert_eq!(form.loan_int_rate, 9.75);
        assert_eq!(form.person_home_ownership, 2);
        assert_eq!(form.loan_grade, 4);

        assert!(matches!(
            form.set_field("person_age", "forty"),
            Err(FormError::Parse { .. })
        ));
        assert!(matches!(
            form.set_field("person_age", "35.5"),
            Err(FormError::Parse { .. })
        ));
        assert!(matches!(
            form.set_field("loan_intent", "GAMBLING"),
            Err(FormError::UnknownCode { .. })
        ));
        assert!(matches!(
            form.set_field("favourite_colour", "blue"),
            Err(FormError::UnknownField(_))
        ));
    }

    #[test]
    fn test_range_validation() {
        let mut form = ApplicationForm::default();
        form.person_age = 17;
        assert_eq!(
            form.validate(),
            Err(FormError::OutOfRange {
                field: "Age",
                bounds: "between 18 and 100".to_string()
            })
        );

        let mut form = ApplicationForm::default();
        form.person_income = 5000.0;
        assert!(form.to_request().is_err());

        let mut form = ApplicationForm::default();
        form.loan_grade = 9;
        assert!(matches!(
            form.validate(),
            Err(FormError::UnknownCode { .. })
        ));
    }

    #[test]
    fn test_zero_divisors() {
        let form = ApplicationForm {
            person_income: 0.0,
            ..Default::default()
        };
        assert_eq!(
            form.debt_to_income(),
            Err(FormError::ZeroDivisor {
                field: "person_income"
            })
        );
        assert_eq!(form.derived_display().0, "-");
    }

    #[test]
    fn test_risk_tiers() {
        assert_eq!(RiskTier::from_probability(0.10), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(0.25), RiskTier::Moderate);
        assert_eq!(RiskTier::from_probability(0.30), RiskTier::Moderate);
        assert_eq!(RiskTier::from_probability(0.50), RiskTier::High);
        assert_eq!(RiskTier::from_probability(0.75), RiskTier::High);
    }

    #[test]
    fn test_assessment_from_response() {
        let response = PredictionResponse {
            prediction: vec![1],
            probability: vec![vec![0.3, 0.7]],
            model_info: ModelInfo {
                name: "rf".to_string(),
                version: "3".to_string(),
                metrics: None,
            },
        };
        let assessment = Assessment::from_response(response).unwrap();
        assert_eq!(assessment.classification, "Default");
        assert!((assessment.confidence - 0.7).abs() < 1e-12);
        assert_eq!(assessment.tier, RiskTier::High);
        assert!(assessment.recommendation().contains("Caution"));
        assert!(assessment.metrics.is_none());
        assert!(assessment.raw_json().contains("\"rf\""));
    }

    #[tokio::test]
    async fn test_submit_success() {
        let mut panel = PredictionPanel::new(Arc::new(FakeApi::new()));
        panel.submit().await;

        let assessment = panel.assessment().unwrap();
        assert_eq!(assessment.classification, "Non-Default");
        assert_eq!(assessment.tier, RiskTier::Low);
        assert!((assessment.confidence - 0.9).abs() < 1e-12);
        assert_eq!(assessment.metrics.unwrap().accuracy, 0.9312);
        assert!(assessment.recommendation().contains("Recommended for approval"));
        assert!(panel.error().is_none());
    }

    #[tokio::test]
    async fn test_submit_failure_returns_to_idle() {
        let mut panel = PredictionPanel::new(Arc::new(FakeApi::failing()));
        assert_eq!(panel.submit().await, &Phase::Idle);
        assert_eq!(panel.error(), Some(SUBMIT_ERROR));

        panel.dismiss_error();
        assert!(panel.error().is_none());
    }

    #[test]
    fn test_submitting_blocks_resubmission() {
        let mut panel = PredictionPanel::new(Arc::new(FakeApi::new()));
        assert!(panel.begin_submit().is_some());
        assert_eq!(panel.phase(), &Phase::Submitting);
        assert!(!panel.can_submit());
        assert!(panel.begin_submit().is_none());

        panel.finish_submit(Err(ClientError::Timeout));
        assert!(panel.can_submit());
        assert_eq!(panel.error(), Some(SUBMIT_ERROR));
    }

    #[test]
    fn test_invalid_form_does_not_submit() {
        let mut panel = PredictionPanel::new(Arc::new(FakeApi::new()));
        panel.set_field("loan_amnt", "500").unwrap();
        assert!(panel.begin_submit().is_none());
        assert_eq!(panel.phase(), &Phase::Idle);
        assert!(panel.error().unwrap().contains("Loan Amount"));
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let mut panel = PredictionPanel::new(Arc::new(FakeApi::new()));
        panel.set_field("loan_grade", "5").unwrap();
        panel.submit().await;
        assert_eq!(panel.assessment().unwrap().tier, RiskTier::High);

        panel.reset();
        assert_eq!(panel.form(), &ApplicationForm::default());
        assert_eq!(panel.phase(), &Phase::Idle);
    }
}
