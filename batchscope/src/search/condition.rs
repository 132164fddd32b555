use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::Operator;
use crate::filters::coerce_numeric;

/// Category name to condition for one criteria group.
pub type FilterCategoryState = BTreeMap<String, Condition>;

/// The operator values held by one category.
///
/// Each variant matches one filter kind, so a numeric category can never carry a text operator.
/// Constructors in [`super::apply_operator`] never store an empty condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    NumericRange {
        min: Option<String>,
        max: Option<String>,
    },
    DateRange {
        min_date: Option<String>,
        max_date: Option<String>,
    },
    MultiSelect {
        in_list: Vec<String>,
    },
    /// Exactly one of the text operators.
    TextMatch {
        operator: Operator,
        value: String,
    },
    BooleanFlag {
        equals: bool,
    },
}

impl Condition {
    pub fn is_empty(&self) -> bool {
        match self {
            Condition::NumericRange { min, max } => min.is_none() && max.is_none(),
            Condition::DateRange { min_date, max_date } => min_date.is_none() && max_date.is_none(),
            Condition::MultiSelect { in_list } => in_list.is_empty(),
            Condition::TextMatch { value, .. } => value.trim().is_empty(),
            Condition::BooleanFlag { .. } => false,
        }
    }

    /// Operators currently holding a value.
    pub fn operators(&self) -> Vec<Operator> {
        match self {
            Condition::NumericRange { min, max } => [(Operator::Min, min), (Operator::Max, max)]
                .into_iter()
                .filter_map(|(op, value)| value.as_ref().map(|_| op))
                .collect(),
            Condition::DateRange { min_date, max_date } => [(Operator::MinDate, min_date), (Operator::MaxDate, max_date)]
                .into_iter()
                .filter_map(|(op, value)| value.as_ref().map(|_| op))
                .collect(),
            Condition::MultiSelect { .. } => vec![Operator::InList],
            Condition::TextMatch { operator, .. } => vec![*operator],
            Condition::BooleanFlag { .. } => vec![Operator::Equals],
        }
    }

    /// Serialize into the category object of the request body.
    ///
    /// Numeric bounds are coerced to JSON numbers; bounds that do not parse are dropped with a
    /// warning. Returns `None` when nothing survives.
    pub fn to_json(&self, path: &str) -> Option<Map<String, Value>> {
        let mut object = Map::new();
        match self {
            Condition::NumericRange { min, max } => {
                for (op, bound) in [(Operator::Min, min), (Operator::Max, max)] {
                    let Some(raw) = bound else { continue };
                    match coerce_numeric(raw) {
                        Some(number) => {
                            object.insert(op.as_str().to_string(), Value::Number(number));
                        }
                        None => log::warn!("dropping non-numeric {} '{}' for {}", op, raw, path),
                    }
                }
            }
            Condition::DateRange { min_date, max_date } => {
                if let Some(date) = min_date {
                    object.insert(Operator::MinDate.as_str().to_string(), Value::String(date.clone()));
                }
                if let Some(date) = max_date {
                    object.insert(Operator::MaxDate.as_str().to_string(), Value::String(date.clone()));
                }
            }
            Condition::MultiSelect { in_list } => {
                if !in_list.is_empty() {
                    let codes = in_list.iter().cloned().map(Value::String).collect();
                    object.insert(Operator::InList.as_str().to_string(), Value::Array(codes));
                }
            }
            Condition::TextMatch { operator, value } => {
                if !value.trim().is_empty() {
                    object.insert(operator.as_str().to_string(), Value::String(value.clone()));
                }
            }
            Condition::BooleanFlag { equals } => {
                object.insert(Operator::Equals.as_str().to_string(), Value::Bool(*equals));
            }
        }
        (!object.is_empty()).then_some(object)
    }

    /// Short human-readable form, e.g. `min 2000, max 2010`.
    pub fn summary(&self) -> String {
        match self {
            Condition::NumericRange { min, max } => range_summary("min", min, "max", max),
            Condition::DateRange { min_date, max_date } => range_summary("from", min_date, "to", max_date),
            Condition::MultiSelect { in_list } => format!("any of {}", in_list.join(", ")),
            Condition::TextMatch { operator, value } => format!("{} \"{}\"", operator, value),
            Condition::BooleanFlag { equals } => (if *equals { "yes" } else { "no" }).to_string(),
        }
    }
}

fn range_summary(low_label: &str, low: &Option<String>, high_label: &str, high: &Option<String>) -> String {
    [(low_label, low), (high_label, high)]
        .into_iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{} {}", label, v)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_bounds_become_numbers() {
        let condition = Condition::NumericRange {
            min: Some("2000".to_string()),
            max: Some("2010".to_string()),
        };
        assert_eq!(
            Value::Object(condition.to_json("building.yearBuilt").unwrap()),
            json!({"min": 2000, "max": 2010})
        );
    }

    #[test]
    fn unparsable_bounds_are_dropped() {
        let condition = Condition::NumericRange {
            min: Some(".".to_string()),
            max: None,
        };
        assert!(condition.to_json("lot.lotSizeAcres").is_none());

        let partial = Condition::NumericRange {
            min: Some(".".to_string()),
            max: Some("2.5".to_string()),
        };
        assert_eq!(Value::Object(partial.to_json("lot.lotSizeAcres").unwrap()), json!({"max": 2.5}));
    }

    #[test]
    fn boolean_false_serializes() {
        let condition = Condition::BooleanFlag { equals: false };
        assert_eq!(
            Value::Object(condition.to_json("owner.ownerOccupied").unwrap()),
            json!({"equals": false})
        );
    }

    #[test]
    fn summaries() {
        let dates = Condition::DateRange {
            min_date: None,
            max_date: Some("2024-01-31".to_string()),
        };
        assert_eq!(dates.summary(), "to 2024-01-31");
        let text = Condition::TextMatch {
            operator: Operator::StartsWith,
            value: "Oak".to_string(),
        };
        assert_eq!(text.summary(), "startsWith \"Oak\"");
        assert_eq!(text.operators(), vec![Operator::StartsWith]);
    }
}
