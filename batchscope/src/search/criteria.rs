use std::collections::BTreeMap;

use super::condition::{Condition, FilterCategoryState};
use super::{Operator, RawValue};
use crate::errors::{ExplorerError, ExplorerResult};
use crate::filters::{clamp_text, parse_date_bound, restrict_numeric_input};
use crate::registry::{BooleanEncoding, CategorySpec, CriteriaGroup, FilterKind, validate_quicklist};
use crate::types::Address;

/// What the search is anchored on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    /// Free-text location such as `Phoenix, AZ`.
    Query(String),
    /// Subject property for a comparables search.
    CompAddress(Address),
}

/// Which quicklist list a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuicklistMode {
    /// Every tag must match (`quickLists`).
    All,
    /// Any tag may match (`orQuickLists`).
    Any,
}

/// Editable state of a search before it is turned into a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub target: Option<SearchTarget>,
    pub groups: BTreeMap<CriteriaGroup, FilterCategoryState>,
    pub quick_lists: Vec<String>,
    pub or_quick_lists: Vec<String>,
    /// Alternative fragments; the API matches a property if any fragment matches.
    pub or: Vec<SearchCriteria>,
}

/// One active category, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilter {
    pub group: CriteriaGroup,
    pub category: String,
    pub label: &'static str,
    pub summary: String,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria preloaded with the residential classification filter the search pages start with.
    pub fn with_default_classification() -> Self {
        let mut criteria = Self::default();
        criteria.insert_condition(
            CriteriaGroup::General,
            "propertyTypeCategory",
            Condition::MultiSelect {
                in_list: vec!["Residential".to_string()],
            },
        );
        criteria
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.target = Some(SearchTarget::Query(query.into()));
        self
    }

    pub fn with_comp_address(mut self, address: Address) -> Self {
        self.target = Some(SearchTarget::CompAddress(address));
        self
    }

    pub fn condition(&self, group: CriteriaGroup, category: &str) -> Option<&Condition> {
        self.groups.get(&group).and_then(|state| state.get(category))
    }

    pub fn group(&self, group: CriteriaGroup) -> Option<&FilterCategoryState> {
        self.groups.get(&group)
    }

    /// `true` when no group, quicklist or OR fragment is set. The target is not considered.
    pub fn has_no_filters(&self) -> bool {
        self.groups.is_empty() && self.quick_lists.is_empty() && self.or_quick_lists.is_empty() && self.or.is_empty()
    }

    /// Apply one edit in place. See [`apply_operator`] for the rules.
    pub fn set_condition(
        &mut self,
        group: CriteriaGroup,
        category: &str,
        operator: Option<Operator>,
        value: Option<RawValue>,
    ) -> ExplorerResult<()> {
        let spec = group.require_category(category)?;
        let Some(operator) = operator else {
            self.remove_category(group, category);
            return Ok(());
        };
        if !spec.kind.accepts(operator) {
            return Err(ExplorerError::UnsupportedOperator {
                category: category.to_string(),
                operator: operator.as_str().to_string(),
                kind: spec.kind.name(),
            });
        }

        let value = value.unwrap_or_else(|| RawValue::Text(String::new()));
        let next = normalize(spec, self.condition(group, category), operator, value)?;
        match next {
            Some(condition) if !condition.is_empty() => self.insert_condition(group, category, condition),
            _ => self.remove_category(group, category),
        }
        Ok(())
    }

    fn insert_condition(&mut self, group: CriteriaGroup, category: &str, condition: Condition) {
        self.groups.entry(group).or_default().insert(category.to_string(), condition);
    }

    /// Remove a category, and its group once the group is empty.
    pub fn remove_category(&mut self, group: CriteriaGroup, category: &str) {
        if let Some(state) = self.groups.get_mut(&group) {
            state.remove(category);
            if state.is_empty() {
                self.groups.remove(&group);
            }
        }
    }

    pub fn clear_group(&mut self, group: CriteriaGroup) {
        self.groups.remove(&group);
    }

    /// Drop every filter, quicklist and OR fragment but keep the target.
    pub fn clear_filters(&mut self) {
        self.groups.clear();
        self.quick_lists.clear();
        self.or_quick_lists.clear();
        self.or.clear();
    }

    fn quicklists_mut(&mut self, mode: QuicklistMode) -> &mut Vec<String> {
        match mode {
            QuicklistMode::All => &mut self.quick_lists,
            QuicklistMode::Any => &mut self.or_quick_lists,
        }
    }

    /// Add a quicklist tag. Adding a tag twice is a no-op.
    pub fn add_quicklist(&mut self, tag: &str, mode: QuicklistMode) -> ExplorerResult<()> {
        validate_quicklist(tag)?;
        let list = self.quicklists_mut(mode);
        if !list.iter().any(|existing| existing == tag) {
            list.push(tag.to_string());
        }
        Ok(())
    }

    /// Add the tag if absent, remove it if present.
    pub fn toggle_quicklist(&self, tag: &str, mode: QuicklistMode) -> ExplorerResult<SearchCriteria> {
        validate_quicklist(tag)?;
        let mut next = self.clone();
        let list = next.quicklists_mut(mode);
        if let Some(index) = list.iter().position(|existing| existing == tag) {
            list.remove(index);
        } else {
            list.push(tag.to_string());
        }
        Ok(next)
    }

    /// Append an OR fragment. Its target is ignored when the body is built.
    pub fn push_or(&mut self, fragment: SearchCriteria) {
        self.or.push(fragment);
    }

    /// Fragments for "listed with one of these statuses OR last sold within these dates".
    ///
    /// Each non-empty half becomes its own fragment; returns an empty vector when both are empty.
    pub fn listing_or_sale_fragments(
        statuses: &[String],
        min_sold: Option<&str>,
        max_sold: Option<&str>,
    ) -> ExplorerResult<Vec<SearchCriteria>> {
        let mut fragments = Vec::new();
        if !statuses.is_empty() {
            let fragment = apply_operator(
                &SearchCriteria::default(),
                CriteriaGroup::Listing,
                "status",
                Some(Operator::InList),
                Some(RawValue::List(statuses.to_vec())),
            )?;
            fragments.push(fragment);
        }

        let mut sold = SearchCriteria::default();
        for (operator, bound) in [(Operator::MinDate, min_sold), (Operator::MaxDate, max_sold)] {
            if let Some(bound) = bound {
                sold.set_condition(
                    CriteriaGroup::Intel,
                    "lastSoldDate",
                    Some(operator),
                    Some(RawValue::from(bound)),
                )?;
            }
        }
        if !sold.groups.is_empty() {
            fragments.push(sold);
        }
        Ok(fragments)
    }

    /// Flattened list of active categories in group order.
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        self.groups
            .iter()
            .flat_map(|(group, state)| {
                state.iter().map(move |(category, condition)| ActiveFilter {
                    group: *group,
                    category: category.clone(),
                    label: group.category(category).map(|spec| spec.label).unwrap_or("Unknown"),
                    summary: condition.summary(),
                })
            })
            .collect()
    }
}

/// Apply one operator edit to a category and return the new criteria.
///
/// * `operator = None` removes the category.
/// * Numeric bounds are restricted to digits (plus one `.` for decimal categories).
/// * Date bounds must be ISO `YYYY-MM-DD`; blank removes the bound.
/// * `inList` replaces the whole selection; an empty list removes the category.
/// * Text operators replace each other; blank text removes the category; values are clamped to
///   255 characters.
/// * Boolean flags follow the category's encoding: checkbox categories drop `false`.
///
/// The category key disappears as soon as its condition is empty, and the group key disappears
/// with its last category. Applying the same edit twice yields the same criteria.
pub fn apply_operator(
    state: &SearchCriteria,
    group: CriteriaGroup,
    category: &str,
    operator: Option<Operator>,
    value: Option<RawValue>,
) -> ExplorerResult<SearchCriteria> {
    let mut next = state.clone();
    next.set_condition(group, category, operator, value)?;
    Ok(next)
}

/// Toggle one code of a multi-select category.
pub fn toggle_in_list(
    state: &SearchCriteria,
    group: CriteriaGroup,
    category: &str,
    code: &str,
) -> ExplorerResult<SearchCriteria> {
    let mut codes = match state.condition(group, category) {
        Some(Condition::MultiSelect { in_list }) => in_list.clone(),
        _ => Vec::new(),
    };
    if let Some(index) = codes.iter().position(|existing| existing == code) {
        codes.remove(index);
    } else {
        codes.push(code.to_string());
    }
    apply_operator(state, group, category, Some(Operator::InList), Some(RawValue::List(codes)))
}

fn normalize(
    spec: &CategorySpec,
    current: Option<&Condition>,
    operator: Operator,
    value: RawValue,
) -> ExplorerResult<Option<Condition>> {
    let category = spec.name;
    let condition = match spec.kind {
        FilterKind::NumericRange(mode) => {
            let restricted = restrict_numeric_input(&value.into_text(category, operator)?, mode);
            let bound = (!restricted.is_empty()).then_some(restricted);
            let (mut min, mut max) = match current {
                Some(Condition::NumericRange { min, max }) => (min.clone(), max.clone()),
                _ => (None, None),
            };
            if operator == Operator::Min {
                min = bound;
            } else {
                max = bound;
            }
            Condition::NumericRange { min, max }
        }
        FilterKind::DateRange => {
            let bound = parse_date_bound(&value.into_text(category, operator)?, category, operator.as_str())?;
            let (mut min_date, mut max_date) = match current {
                Some(Condition::DateRange { min_date, max_date }) => (min_date.clone(), max_date.clone()),
                _ => (None, None),
            };
            if operator == Operator::MinDate {
                min_date = bound;
            } else {
                max_date = bound;
            }
            Condition::DateRange { min_date, max_date }
        }
        FilterKind::MultiSelect => {
            let mut in_list: Vec<String> = Vec::new();
            for code in value.into_list(category, operator)? {
                if !spec.options.is_empty() && !spec.options.contains(&code.as_str()) {
                    log::warn!("'{}' is not a known option for {}", code, category);
                }
                if !in_list.contains(&code) {
                    in_list.push(code);
                }
            }
            Condition::MultiSelect { in_list }
        }
        FilterKind::TextMatch => {
            let text = value.into_text(category, operator)?;
            if text.trim().is_empty() {
                return Ok(None);
            }
            Condition::TextMatch {
                operator,
                value: clamp_text(&text),
            }
        }
        FilterKind::BooleanFlag(encoding) => match (value.into_flag(category, operator)?, encoding) {
            (None, _) | (Some(false), BooleanEncoding::Checkbox) => return Ok(None),
            (Some(equals), _) => Condition::BooleanFlag { equals },
        },
    };
    Ok(Some(condition))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(state: &SearchCriteria, group: CriteriaGroup, category: &str, op: Operator, value: &str) -> SearchCriteria {
        apply_operator(state, group, category, Some(op), Some(RawValue::from(value))).expect("edit should apply")
    }

    #[test]
    fn numeric_bounds_keep_each_other() {
        let state = apply(&SearchCriteria::new(), CriteriaGroup::Building, "yearBuilt", Operator::Min, "2000");
        let state = apply(&state, CriteriaGroup::Building, "yearBuilt", Operator::Max, "2010");
        assert_eq!(
            state.condition(CriteriaGroup::Building, "yearBuilt"),
            Some(&Condition::NumericRange {
                min: Some("2000".to_string()),
                max: Some("2010".to_string()),
            })
        );

        let state = apply(&state, CriteriaGroup::Building, "yearBuilt", Operator::Min, "");
        let state = apply(&state, CriteriaGroup::Building, "yearBuilt", Operator::Max, "abc");
        assert!(state.groups.is_empty());
    }

    #[test]
    fn text_operator_replaces_previous() {
        let state = apply(&SearchCriteria::new(), CriteriaGroup::Legal, "subdivisionName", Operator::Contains, "Oak");
        let state = apply(&state, CriteriaGroup::Legal, "subdivisionName", Operator::StartsWith, "Pine");
        assert_eq!(
            state.condition(CriteriaGroup::Legal, "subdivisionName"),
            Some(&Condition::TextMatch {
                operator: Operator::StartsWith,
                value: "Pine".to_string(),
            })
        );
    }

    #[test]
    fn blank_text_clears_category() {
        let state = apply(&SearchCriteria::new(), CriteriaGroup::Owner, "lastName", Operator::Equals, "Smith");
        let state = apply(&state, CriteriaGroup::Owner, "lastName", Operator::Contains, "   ");
        assert!(state.condition(CriteriaGroup::Owner, "lastName").is_none());
        assert!(state.groups.is_empty());
    }

    #[test]
    fn text_is_stored_as_typed() {
        let state = apply(&SearchCriteria::new(), CriteriaGroup::Owner, "firstName", Operator::Equals, " Ann ");
        assert_eq!(
            state.condition(CriteriaGroup::Owner, "firstName"),
            Some(&Condition::TextMatch {
                operator: Operator::Equals,
                value: " Ann ".to_string(),
            })
        );
    }

    #[test]
    fn checkbox_false_removes_key() {
        let state = apply_operator(
            &SearchCriteria::new(),
            CriteriaGroup::Demographics,
            "businessOwner",
            Some(Operator::Equals),
            Some(RawValue::Flag(true)),
        )
        .unwrap();
        assert!(state.condition(CriteriaGroup::Demographics, "businessOwner").is_some());

        let state = apply_operator(
            &state,
            CriteriaGroup::Demographics,
            "businessOwner",
            Some(Operator::Equals),
            Some(RawValue::Flag(false)),
        )
        .unwrap();
        assert!(state.groups.is_empty());
    }

    #[test]
    fn tri_state_keeps_false() {
        let state = apply_operator(
            &SearchCriteria::new(),
            CriteriaGroup::Owner,
            "ownerOccupied",
            Some(Operator::Equals),
            Some(RawValue::Flag(false)),
        )
        .unwrap();
        assert_eq!(
            state.condition(CriteriaGroup::Owner, "ownerOccupied"),
            Some(&Condition::BooleanFlag { equals: false })
        );
    }

    #[test]
    fn wrong_operator_is_rejected() {
        let err = apply_operator(
            &SearchCriteria::new(),
            CriteriaGroup::Building,
            "yearBuilt",
            Some(Operator::Contains),
            Some(RawValue::from("19")),
        )
        .unwrap_err();
        assert!(matches!(err, ExplorerError::UnsupportedOperator { kind: "numeric", .. }));
    }

    #[test]
    fn toggling_codes() {
        let state = toggle_in_list(&SearchCriteria::new(), CriteriaGroup::Building, "pool", "Heated Pool").unwrap();
        let state = toggle_in_list(&state, CriteriaGroup::Building, "pool", "Indoor Pool").unwrap();
        assert_eq!(
            state.condition(CriteriaGroup::Building, "pool"),
            Some(&Condition::MultiSelect {
                in_list: vec!["Heated Pool".to_string(), "Indoor Pool".to_string()],
            })
        );
        let state = toggle_in_list(&state, CriteriaGroup::Building, "pool", "Heated Pool").unwrap();
        let state = toggle_in_list(&state, CriteriaGroup::Building, "pool", "Indoor Pool").unwrap();
        assert!(state.groups.is_empty());
    }

    #[test]
    fn quicklists_toggle_and_dedupe() {
        let mut state = SearchCriteria::new();
        state.add_quicklist("vacant", QuicklistMode::All).unwrap();
        state.add_quicklist("vacant", QuicklistMode::All).unwrap();
        assert_eq!(state.quick_lists, vec!["vacant"]);

        let state = state.toggle_quicklist("vacant", QuicklistMode::All).unwrap();
        assert!(state.quick_lists.is_empty());
        let state = state.toggle_quicklist("high-equity", QuicklistMode::Any).unwrap();
        assert_eq!(state.or_quick_lists, vec!["high-equity"]);
        assert!(state.toggle_quicklist("Not A Tag", QuicklistMode::Any).is_err());
    }

    #[test]
    fn clear_filters_keeps_target() {
        let mut state = SearchCriteria::with_default_classification().with_query("Austin, TX");
        state.add_quicklist("vacant", QuicklistMode::All).unwrap();
        state.clear_filters();
        assert!(state.has_no_filters());
        assert_eq!(state.target, Some(SearchTarget::Query("Austin, TX".to_string())));
    }

    #[test]
    fn listing_or_sale_fragments_split_halves() {
        let fragments =
            SearchCriteria::listing_or_sale_fragments(&["Sold".to_string()], Some("2024-01-01"), None).unwrap();
        assert_eq!(fragments.len(), 2);
        assert!(fragments[0].condition(CriteriaGroup::Listing, "status").is_some());
        assert_eq!(
            fragments[1].condition(CriteriaGroup::Intel, "lastSoldDate"),
            Some(&Condition::DateRange {
                min_date: Some("2024-01-01".to_string()),
                max_date: None,
            })
        );
        assert!(SearchCriteria::listing_or_sale_fragments(&[], None, None).unwrap().is_empty());
    }

    #[test]
    fn active_filters_use_catalog_labels() {
        let state = SearchCriteria::with_default_classification();
        let active = state.active_filters();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].label, "Property Type Category");
        assert_eq!(active[0].summary, "any of Residential");
    }
}
