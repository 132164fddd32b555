use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::criteria::{SearchCriteria, SearchTarget};
use crate::errors::{ExplorerError, ExplorerResult};

/// The normalized `searchCriteria` object sent to the API.
///
/// Never contains an empty group object, an empty category object, or an operator key without a
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriteriaDocument(Map<String, Value>);

impl CriteriaDocument {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a dotted path such as `building.yearBuilt.min`.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = self.0.get(segments.next()?)?;
        segments.try_fold(first, |value, segment| value.get(segment))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for CriteriaDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Build the `searchCriteria` document from editable state plus optional free-form JSON.
///
/// The free-form text is wrapped in braces when it does not start with `{`, must parse to a JSON
/// object, and is merged key by key over the generated document. A parse failure is returned
/// before anything is sent.
pub fn build_request_body(criteria: &SearchCriteria, additional: Option<&str>) -> ExplorerResult<CriteriaDocument> {
    let extra = additional.map(parse_additional_criteria).transpose()?.flatten();

    let mut document = CriteriaDocument(criteria_object(criteria, true));
    if let Some(extra) = extra {
        for (key, value) in extra {
            document.0.insert(key, value);
        }
    }
    log::debug!("built searchCriteria with {} top-level keys", document.0.len());
    Ok(document)
}

/// Parse the free-form additional criteria text. Blank text yields `Ok(None)`.
pub fn parse_additional_criteria(text: &str) -> ExplorerResult<Option<Map<String, Value>>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let wrapped: Cow<'_, str> = if trimmed.starts_with('{') {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("{{{}}}", trimmed))
    };
    match serde_json::from_str::<Value>(&wrapped) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(other) => Err(ExplorerError::AdditionalCriteria {
            message: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
        Err(err) => Err(ExplorerError::AdditionalCriteria {
            message: err.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn criteria_object(criteria: &SearchCriteria, include_target: bool) -> Map<String, Value> {
    let mut object = Map::new();

    if include_target {
        match &criteria.target {
            Some(SearchTarget::Query(query)) if !query.trim().is_empty() => {
                object.insert("query".to_string(), Value::String(query.clone()));
            }
            Some(SearchTarget::CompAddress(address)) => {
                object.insert("compAddress".to_string(), address.to_json());
            }
            _ => {}
        }
    }

    for (group, state) in &criteria.groups {
        let categories: Map<String, Value> = state
            .iter()
            .filter_map(|(category, condition)| {
                let path = format!("{}.{}", group, category);
                condition.to_json(&path).map(|ops| (category.clone(), Value::Object(ops)))
            })
            .collect();
        if !categories.is_empty() {
            object.insert(group.as_str().to_string(), Value::Object(categories));
        }
    }

    if !criteria.quick_lists.is_empty() {
        object.insert("quickLists".to_string(), string_array(&criteria.quick_lists));
    }
    if !criteria.or_quick_lists.is_empty() {
        object.insert("orQuickLists".to_string(), string_array(&criteria.or_quick_lists));
    }

    let fragments: Vec<Value> = criteria
        .or
        .iter()
        .map(|fragment| criteria_object(fragment, false))
        .filter(|fragment| !fragment.is_empty())
        .map(Value::Object)
        .collect();
    if !fragments.is_empty() {
        object.insert("or".to_string(), Value::Array(fragments));
    }

    object
}

fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CriteriaGroup;
    use crate::search::{Operator, RawValue, apply_operator};
    use serde_json::json;

    #[test]
    fn additional_text_is_wrapped_in_braces() {
        let map = parse_additional_criteria(r#""intel": {"salePropensity": {"min": 50}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(Value::Object(map), json!({"intel": {"salePropensity": {"min": 50}}}));
    }

    #[test]
    fn additional_text_must_be_an_object() {
        assert!(parse_additional_criteria("   ").unwrap().is_none());
        let err = parse_additional_criteria("{\"a\": ").unwrap_err();
        assert!(matches!(err, ExplorerError::AdditionalCriteria { .. }));
        assert!(err.to_string().starts_with("Invalid JSON format in additional criteria"));
    }

    #[test]
    fn additional_keys_override_generated_ones() {
        let criteria = apply_operator(
            &SearchCriteria::new().with_query("Austin, TX"),
            CriteriaGroup::Building,
            "yearBuilt",
            Some(Operator::Min),
            Some(RawValue::from("1990")),
        )
        .unwrap();
        let document =
            build_request_body(&criteria, Some(r#"{"building": {"bedroomCount": {"min": 3}}}"#)).unwrap();
        assert_eq!(
            document.into_value(),
            json!({
                "query": "Austin, TX",
                "building": {"bedroomCount": {"min": 3}}
            })
        );
    }

    #[test]
    fn empty_or_fragments_are_dropped() {
        let mut criteria = SearchCriteria::new();
        criteria.push_or(SearchCriteria::new());
        criteria.push_or(SearchCriteria::new().with_query("ignored"));
        let document = build_request_body(&criteria, None).unwrap();
        assert!(document.is_empty());
    }

    #[test]
    fn pointer_walks_nested_objects() {
        let document = CriteriaDocument::from(
            json!({"a": {"b": {"c": 1}}})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );
        assert_eq!(document.pointer("a.b.c"), Some(&json!(1)));
        assert_eq!(document.pointer("a.x"), None);
    }
}
