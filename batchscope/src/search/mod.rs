//! # Filter criteria construction
//!
//! This module turns per-category filter edits into the nested `searchCriteria` document the
//! BatchData property endpoints expect.
//!
//! ## Operators Quick Reference
//!
//! | Operator     | Filter kind   | Stored as            | Serialized as              |
//! |--------------|---------------|----------------------|----------------------------|
//! | `min`/`max`  | numeric       | restricted digits    | JSON number                |
//! | `minDate`/`maxDate` | date   | ISO `YYYY-MM-DD`     | string                     |
//! | `inList`     | multi-select  | ordered code list    | array of strings           |
//! | `equals`     | text/boolean  | text or flag         | string or bool             |
//! | `contains`/`startsWith`/`endsWith` | text | text    | string                     |
//!
//! Text operators are exclusive: a category holds at most one of `equals`, `contains`,
//! `startsWith`, `endsWith` at a time.
//!
//! ## Example Usage
//!
//! ```
//! use batchscope::registry::CriteriaGroup;
//! use batchscope::search::{apply_operator, build_request_body, Operator, RawValue, SearchCriteria};
//!
//! let criteria = SearchCriteria::default();
//! let criteria = apply_operator(
//!     &criteria,
//!     CriteriaGroup::Building,
//!     "yearBuilt",
//!     Some(Operator::Min),
//!     Some(RawValue::from("2000")),
//! )
//! .unwrap();
//!
//! let body = build_request_body(&criteria, None).unwrap();
//! assert_eq!(body.pointer("building.yearBuilt.min").and_then(|v| v.as_u64()), Some(2000));
//! ```

mod condition;
mod criteria;
mod document;

use std::fmt;
use std::str::FromStr;

use crate::errors::ExplorerError;
use crate::filters::{parse_flag, split_list};
use crate::registry::CriteriaGroup;

pub use condition::{Condition, FilterCategoryState};
pub use criteria::{ActiveFilter, QuicklistMode, SearchCriteria, SearchTarget, apply_operator, toggle_in_list};
pub use document::{CriteriaDocument, build_request_body, parse_additional_criteria};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Min,
    Max,
    MinDate,
    MaxDate,
    InList,
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

impl Operator {
    pub const ALL: [Operator; 9] = [
        Operator::Min,
        Operator::Max,
        Operator::MinDate,
        Operator::MaxDate,
        Operator::InList,
        Operator::Equals,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
    ];

    /// Key used inside a category object of the request body.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Min => "min",
            Operator::Max => "max",
            Operator::MinDate => "minDate",
            Operator::MaxDate => "maxDate",
            Operator::InList => "inList",
            Operator::Equals => "equals",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
        }
    }

    /// The four mutually exclusive string-match operators.
    #[inline]
    pub const fn is_text_match(self) -> bool {
        matches!(
            self,
            Operator::Equals | Operator::Contains | Operator::StartsWith | Operator::EndsWith
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ExplorerError::invalid_request(format!("Unsupported filter operator: {}", wanted)))
    }
}

/// Raw input handed to [`apply_operator`] before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl RawValue {
    pub(crate) fn into_text(self, category: &str, operator: Operator) -> Result<String, ExplorerError> {
        match self {
            RawValue::Text(text) => Ok(text),
            other => Err(shape_error(category, operator, "a single text value", &other)),
        }
    }

    /// Text input is split on `|` so command-line values map onto a list.
    pub(crate) fn into_list(self, category: &str, operator: Operator) -> Result<Vec<String>, ExplorerError> {
        match self {
            RawValue::List(items) => Ok(items),
            RawValue::Text(text) => Ok(split_list(&text)),
            other => Err(shape_error(category, operator, "a list of codes", &other)),
        }
    }

    pub(crate) fn into_flag(self, category: &str, operator: Operator) -> Result<Option<bool>, ExplorerError> {
        match self {
            RawValue::Flag(flag) => Ok(Some(flag)),
            RawValue::Text(text) if text.trim().is_empty() => Ok(None),
            RawValue::Text(text) => parse_flag(&text, category).map(Some),
            other => Err(shape_error(category, operator, "a boolean", &other)),
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            RawValue::Text(_) => "text",
            RawValue::List(_) => "list",
            RawValue::Flag(_) => "boolean",
        }
    }
}

fn shape_error(category: &str, operator: Operator, expected: &str, got: &RawValue) -> ExplorerError {
    ExplorerError::InvalidValue {
        category: category.to_string(),
        operator: operator.as_str().to_string(),
        message: format!("expected {}, got {}", expected, got.shape()),
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Flag(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(value: Vec<String>) -> Self {
        RawValue::List(value)
    }
}

/// A single filter edit parsed from `group.category:operator:value`.
///
/// The operator `clear` removes the category. Values for `inList` are split on `|` (codes may contain commas).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDescriptor {
    pub group: CriteriaGroup,
    pub category: String,
    pub operator: Option<Operator>,
    pub value: Option<RawValue>,
}

impl FilterDescriptor {
    pub fn parse(raw: &str) -> Result<Self, ExplorerError> {
        let parts: Vec<&str> = raw.splitn(3, ':').collect();
        if parts.len() < 2 {
            return Err(ExplorerError::invalid_request(format!("Invalid filter syntax: {}", raw)));
        }

        let (group, category) = parts[0]
            .split_once('.')
            .ok_or_else(|| ExplorerError::invalid_request(format!("Filter field must be group.category: {}", parts[0])))?;
        let group: CriteriaGroup = group.parse()?;
        let category = category.trim();
        group.require_category(category)?;

        let operator = if parts[1].trim().eq_ignore_ascii_case("clear") {
            None
        } else {
            Some(parts[1].parse::<Operator>()?)
        };

        let text = parts.get(2).copied().unwrap_or_default();
        let value = match operator {
            None => None,
            Some(Operator::InList) => Some(RawValue::List(split_list(text))),
            Some(_) => Some(RawValue::Text(text.to_string())),
        };

        Ok(Self {
            group,
            category: category.to_string(),
            operator,
            value,
        })
    }

    /// Apply this edit on top of `state`.
    pub fn apply(&self, state: &SearchCriteria) -> Result<SearchCriteria, ExplorerError> {
        apply_operator(state, self.group, &self.category, self.operator, self.value.clone())
    }
}

impl FromStr for FilterDescriptor {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterDescriptor::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_parse_case_insensitively() {
        assert_eq!("startswith".parse::<Operator>().unwrap(), Operator::StartsWith);
        assert_eq!("inList".parse::<Operator>().unwrap(), Operator::InList);
        assert!("between".parse::<Operator>().is_err());
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
        }
    }

    #[test]
    fn descriptor_keeps_colons_in_value() {
        let descriptor = FilterDescriptor::parse("owner.mailingStreet:contains:Suite 4:B").unwrap();
        assert_eq!(descriptor.group, CriteriaGroup::Owner);
        assert_eq!(descriptor.operator, Some(Operator::Contains));
        assert_eq!(descriptor.value, Some(RawValue::from("Suite 4:B")));
    }

    #[test]
    fn descriptor_splits_in_list_values() {
        let descriptor = FilterDescriptor::parse("building.pool:inList:Heated Pool|Pool & Spa").unwrap();
        assert_eq!(
            descriptor.value,
            Some(RawValue::List(vec!["Heated Pool".to_string(), "Pool & Spa".to_string()]))
        );
    }

    #[test]
    fn descriptor_keeps_commas_inside_codes() {
        let descriptor = FilterDescriptor::parse("building.basementType:inList:Daylight, Partial").unwrap();
        let state = descriptor.apply(&SearchCriteria::new()).unwrap();
        assert_eq!(
            state.condition(CriteriaGroup::Building, "basementType"),
            Some(&Condition::MultiSelect {
                in_list: vec!["Daylight, Partial".to_string()],
            })
        );
    }

    #[test]
    fn descriptor_clear_has_no_operator() {
        let descriptor = FilterDescriptor::parse("lot.lotSizeAcres:clear").unwrap();
        assert_eq!(descriptor.operator, None);
        assert_eq!(descriptor.value, None);
    }

    #[test]
    fn descriptor_rejects_bad_syntax() {
        assert!(FilterDescriptor::parse("yearBuilt").is_err());
        assert!(FilterDescriptor::parse("yearBuilt:min:1").is_err());
        assert!(FilterDescriptor::parse("building.nope:min:1").is_err());
        assert!(FilterDescriptor::parse("building.yearBuilt:gt:1").is_err());
    }

    #[test]
    fn raw_value_shapes() {
        assert!(RawValue::Flag(true).into_text("x", Operator::Min).is_err());
        assert_eq!(
            RawValue::from("a|b").into_list("x", Operator::InList).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(
            RawValue::from("a, b").into_list("x", Operator::InList).unwrap(),
            vec!["a, b".to_string()]
        );
        assert_eq!(RawValue::from("").into_flag("x", Operator::Equals).unwrap(), None);
        assert_eq!(RawValue::from("no").into_flag("x", Operator::Equals).unwrap(), Some(false));
    }
}
