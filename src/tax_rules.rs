//! Static tax-rule table keyed by country and tax year.
//!
//! The table is intentionally small. Add a country by appending to
//! [`TAX_RULES_DB`] and a variant to [`Country`].

use std::fmt;
use std::str::FromStr;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::SalaryAnalystError;

pub const NO_RULES_FOUND: &str = "No rules found for the specified country and year.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RuleValue {
    Amount(u64),
    Flag(bool),
}

impl RuleValue {
    pub fn as_amount(&self) -> Option<u64> {
        match self {
            RuleValue::Amount(value) => Some(*value),
            RuleValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            RuleValue::Flag(value) => Some(*value),
            RuleValue::Amount(_) => None,
        }
    }
}

/// The flat set of constants for one country and tax year.
///
/// Serializes as a JSON object in table order.
#[derive(Debug, PartialEq)]
pub struct TaxRules {
    pub tax_year: &'static str,
    entries: &'static [(&'static str, RuleValue)],
}

impl TaxRules {
    pub fn get(&self, name: &str) -> Option<RuleValue> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, RuleValue)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for TaxRules {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug)]
pub struct CountryRules {
    pub key: &'static str,
    pub years: &'static [TaxRules],
}

const INDIA_RULES: &[(&str, RuleValue)] = &[
    ("80C_Limit", RuleValue::Amount(150_000)),
    ("80D_Self_Limit", RuleValue::Amount(25_000)),
    ("80D_Parents_Limit", RuleValue::Amount(25_000)),
    ("80D_Senior_Citizen_Limit", RuleValue::Amount(50_000)),
    ("Standard_Deduction", RuleValue::Amount(50_000)),
    ("Professional_Tax_Deductible", RuleValue::Flag(true)),
];

const USA_2024_RULES: &[(&str, RuleValue)] = &[
    ("401k_Limit", RuleValue::Amount(23_000)),
    ("Standard_Deduction_Single", RuleValue::Amount(14_600)),
    ("Standard_Deduction_Married", RuleValue::Amount(29_200)),
];

pub static TAX_RULES_DB: &[CountryRules] = &[
    CountryRules {
        key: "india",
        years: &[
            TaxRules {
                tax_year: "2024-25",
                entries: INDIA_RULES,
            },
            TaxRules {
                tax_year: "2023-24",
                entries: INDIA_RULES,
            },
        ],
    },
    CountryRules {
        key: "usa",
        years: &[TaxRules {
            tax_year: "2024",
            entries: USA_2024_RULES,
        }],
    },
];

fn find_country(country: &str) -> Option<&'static CountryRules> {
    let key = country.trim().to_lowercase();
    TAX_RULES_DB.iter().find(|rules| rules.key == key)
}

/// Looks up the rules for a country (case-insensitive) and tax year (exact).
pub fn get_tax_rules(country: &str, tax_year: &str) -> Option<&'static TaxRules> {
    let tax_year = tax_year.trim();
    find_country(country)?
        .years
        .iter()
        .find(|rules| rules.tax_year == tax_year)
}

/// Pretty JSON of the rules for embedding in the analysis prompt.
pub fn tax_rules_as_string(country: &str, tax_year: &str) -> String {
    match get_tax_rules(country, tax_year) {
        Some(rules) => {
            serde_json::to_string_pretty(rules).unwrap_or_else(|_| NO_RULES_FOUND.to_string())
        }
        None => NO_RULES_FOUND.to_string(),
    }
}

pub fn available_years(country: &str) -> Vec<&'static str> {
    find_country(country)
        .map(|rules| rules.years.iter().map(|year| year.tax_year).collect())
        .unwrap_or_default()
}

/// The whole table as nested JSON (`country -> year -> rules`).
pub fn tax_rules_table() -> serde_json::Value {
    let mut table = serde_json::Map::new();
    for country in TAX_RULES_DB {
        let mut years = serde_json::Map::new();
        for rules in country.years {
            years.insert(
                rules.tax_year.to_string(),
                serde_json::to_value(rules).unwrap_or_default(),
            );
        }
        table.insert(country.key.to_string(), serde_json::Value::Object(years));
    }
    serde_json::Value::Object(table)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Country {
    India,
    Usa,
}

impl Country {
    pub const ALL: [Country; 2] = [Country::India, Country::Usa];

    pub fn display_name(&self) -> &'static str {
        match self {
            Country::India => "India",
            Country::Usa => "USA",
        }
    }

    /// Key into [`TAX_RULES_DB`].
    pub fn key(&self) -> &'static str {
        match self {
            Country::India => "india",
            Country::Usa => "usa",
        }
    }

    pub fn default_tax_year(&self) -> &'static str {
        match self {
            Country::India => "2024-25",
            Country::Usa => "2024",
        }
    }
}

impl Default for Country {
    fn default() -> Self {
        Self::India
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Country {
    type Err = SalaryAnalystError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Country::ALL
            .into_iter()
            .find(|country| country.key() == key)
            .ok_or_else(|| SalaryAnalystError::UnknownCountry(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive_on_country() {
        let rules = get_tax_rules("India", "2024-25").unwrap();
        assert_eq!(rules.get("80C_Limit"), Some(RuleValue::Amount(150_000)));
        assert!(get_tax_rules("INDIA", "2023-24").is_some());
        assert!(get_tax_rules("usa", "2024").is_some());
    }

    #[test]
    fn test_lookup_misses() {
        assert!(get_tax_rules("India", "2019-20").is_none());
        assert!(get_tax_rules("Canada", "2024").is_none());
        assert!(get_tax_rules("USA", "2024-25").is_none());
    }

    #[test]
    fn test_rules_string() {
        let rendered = tax_rules_as_string("india", "2024-25");
        assert!(rendered.starts_with("{\n  \"80C_Limit\": 150000,"));
        assert!(rendered.contains("\"Professional_Tax_Deductible\": true"));

        assert_eq!(tax_rules_as_string("mars", "2024"), NO_RULES_FOUND);
    }

    #[test]
    fn test_rules_keep_table_order() {
        let rules = get_tax_rules("usa", "2024").unwrap();
        let keys: Vec<_> = rules.iter().map(|(key, _)| key).collect();
        assert_eq!(
            keys,
            vec![
                "401k_Limit",
                "Standard_Deduction_Single",
                "Standard_Deduction_Married"
            ]
        );
        assert_eq!(rules.get("401k_Limit").and_then(|v| v.as_amount()), Some(23_000));
    }

    #[test]
    fn test_country_parsing_and_defaults() {
        assert_eq!("India".parse::<Country>().unwrap(), Country::India);
        assert_eq!(" usa ".parse::<Country>().unwrap(), Country::Usa);
        assert!("Narnia".parse::<Country>().is_err());

        for country in Country::ALL {
            assert!(get_tax_rules(country.key(), country.default_tax_year()).is_some());
        }
    }

    #[test]
    fn test_available_years_and_table() {
        assert_eq!(available_years("India"), vec!["2024-25", "2023-24"]);
        assert!(available_years("Narnia").is_empty());

        let table = tax_rules_table();
        assert_eq!(table["usa"]["2024"]["Standard_Deduction_Married"], 29200);
    }
}
