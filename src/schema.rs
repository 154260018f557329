use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SalaryAnalystError};

/// Name of the function tool the model is forced to call during extraction.
pub const PAYSLIP_TOOL_NAME: &str = "PayslipComponents";

pub const PAYSLIP_TOOL_DESCRIPTION: &str = "Extracts salary components from a user's payslip text.";

/// The extracted components from a user's monthly salary slip.
///
/// Every amount is the *monthly* figure. Absent components are omitted when
/// serialized, so the JSON shown for confirmation only lists what was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(
    description = "The extracted components from a user's monthly salary slip. All values should be the monthly amount."
)]
pub struct PayslipComponents {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_amount"
    )]
    #[schemars(with = "Option<f64>")]
    #[schemars(description = "The monthly Basic Salary or Basic Pay.")]
    pub basic_salary: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_amount"
    )]
    #[schemars(with = "Option<f64>")]
    #[schemars(description = "The monthly House Rent Allowance (HRA).")]
    pub house_rent_allowance: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_amount"
    )]
    #[schemars(with = "Option<f64>")]
    #[schemars(description = "The monthly Employee's Provident Fund (PF) contribution.")]
    pub employee_pf_contribution: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_amount"
    )]
    #[schemars(with = "Option<f64>")]
    #[schemars(description = "The monthly Professional Tax (PT) deduction.")]
    pub professional_tax: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_amount"
    )]
    #[schemars(with = "Option<f64>")]
    #[schemars(description = "The monthly Leave Travel Allowance (LTA).")]
    pub leave_travel_allowance: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_amount"
    )]
    #[schemars(with = "Option<f64>")]
    #[schemars(description = "The monthly Special Allowance or Other Allowance.")]
    pub special_allowance: Option<f64>,
}

/// A present component with its display label.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub field: &'static str,
    pub label: &'static str,
    pub monthly_amount: f64,
}

impl PayslipComponents {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(PayslipComponents)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    /// Schema used as the `parameters` object of the extraction tool.
    pub fn tool_parameters() -> Result<serde_json::Value> {
        let mut value = serde_json::to_value(Self::generate_json_schema())?;
        if let Some(object) = value.as_object_mut() {
            object.remove("$schema");
        }
        Ok(value)
    }

    fn fields(&self) -> [(&'static str, &'static str, Option<f64>); 6] {
        [
            ("basic_salary", "Basic Salary", self.basic_salary),
            (
                "house_rent_allowance",
                "House Rent Allowance (HRA)",
                self.house_rent_allowance,
            ),
            (
                "employee_pf_contribution",
                "Employee PF Contribution",
                self.employee_pf_contribution,
            ),
            ("professional_tax", "Professional Tax", self.professional_tax),
            (
                "leave_travel_allowance",
                "Leave Travel Allowance (LTA)",
                self.leave_travel_allowance,
            ),
            ("special_allowance", "Special Allowance", self.special_allowance),
        ]
    }

    /// Present components in schema order.
    pub fn present_components(&self) -> Vec<Component> {
        self.fields()
            .into_iter()
            .filter_map(|(field, label, value)| {
                value.map(|monthly_amount| Component {
                    field,
                    label,
                    monthly_amount,
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, _, value)| value.is_none())
    }

    /// Rejects empty extractions and amounts that are negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(SalaryAnalystError::ExtractionFailed(
                "no salary components were found in the payslip text".to_string(),
            ));
        }

        for component in self.present_components() {
            if !component.monthly_amount.is_finite() {
                return Err(SalaryAnalystError::InvalidComponent {
                    field: component.field.to_string(),
                    details: "amount is not a finite number".to_string(),
                });
            }
            if component.monthly_amount < 0.0 {
                return Err(SalaryAnalystError::InvalidComponent {
                    field: component.field.to_string(),
                    details: format!("amount {} is negative", component.monthly_amount),
                });
            }
        }

        Ok(())
    }

    /// Parses and validates the raw tool-call arguments returned by the model.
    pub fn from_tool_arguments(raw_arguments: &str) -> Result<Self> {
        let components: PayslipComponents = serde_json::from_str(raw_arguments)?;
        components.validate()?;
        Ok(components)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parses a monetary amount written as text, e.g. `"50,000"` or `"Rs. 6,000.50"`.
///
/// Currency prefixes and suffixes are ignored along with digit-group separators.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let end = raw.rfind(|c: char| c.is_ascii_digit())? + 1;
    let negative = raw[..start].trim_end().ends_with('-');

    let cleaned: String = raw[start..end]
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '_' | '\u{a0}'))
        .collect();
    let value: f64 = cleaned.parse().ok()?;

    Some(if negative { -value } else { value })
}

fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    match Option::<RawAmount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawAmount::Number(value)) => Ok(Some(value)),
        Some(RawAmount::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawAmount::Text(text)) => parse_amount(&text).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("'{}' is not a monetary amount", text))
        }),
    }
}
