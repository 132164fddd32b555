pub mod comps;
pub mod count;
pub mod filters;
pub mod list;
pub mod lookup;
pub mod skip_trace;

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use batchscope::client::{ApiClient, RequestSlot};
use batchscope::search::{FilterDescriptor, QuicklistMode, SearchCriteria};
use batchscope::validators::{is_valid_state_code, is_valid_zip};
use batchscope::ExplorerResult;

use crate::context::ExplorerContext;
use crate::output::OutputManager;

/// State shared by every command for one invocation
pub struct Session {
    pub context: ExplorerContext,
    pub token: Option<String>,
    slot: RequestSlot,
}

impl Session {
    pub fn new(context: ExplorerContext, token: Option<String>) -> Self {
        Self {
            context,
            token,
            slot: RequestSlot::new(),
        }
    }

    pub fn client(&self) -> Result<ApiClient> {
        let config = self.context.client_config(self.token.as_deref())?;
        ApiClient::new(config).context("Failed to create HTTP client")
    }

    /// Run a request through the session's slot so only the latest submission is accepted
    pub async fn submit<T, F>(&self, output: &OutputManager, label: &str, request: F) -> Result<T>
    where
        F: Future<Output = ExplorerResult<T>>,
    {
        output.progress(label);
        let result = self.slot.run(request).await;
        output.clear_line();
        Ok(result?)
    }
}

/// Filter flags shared by the search commands
#[derive(Args, Debug, Default)]
pub struct CriteriaArgs {
    /// Filter edit as group.category:operator:value (repeatable)
    #[arg(short = 'f', long = "filter", value_name = "FILTER")]
    pub filters: Vec<String>,

    /// OR fragment of ';'-separated filter edits (repeatable). Values cannot contain ';', use --or-filter
    #[arg(long = "or", value_name = "FILTERS")]
    pub or: Vec<String>,

    /// OR fragment holding one filter edit, taken verbatim (repeatable)
    #[arg(long = "or-filter", value_name = "FILTER")]
    pub or_filters: Vec<String>,

    /// Quicklist every result must match (repeatable)
    #[arg(long = "quicklist", value_name = "TAG")]
    pub quicklists: Vec<String>,

    /// Quicklist any result may match (repeatable)
    #[arg(long = "or-quicklist", value_name = "TAG")]
    pub or_quicklists: Vec<String>,

    /// Extra searchCriteria JSON merged over the generated filters
    #[arg(long, value_name = "JSON", conflicts_with = "criteria_file")]
    pub criteria: Option<String>,

    /// Read extra searchCriteria JSON from a file
    #[arg(long, value_name = "PATH")]
    pub criteria_file: Option<PathBuf>,

    /// Do not start from the Residential property type filter
    #[arg(long)]
    pub all_property_types: bool,

    /// Print the request body without sending it
    #[arg(long)]
    pub dry_run: bool,
}

impl CriteriaArgs {
    /// Apply every flag on top of the starting criteria
    pub fn build(&self) -> Result<SearchCriteria> {
        let mut criteria = if self.all_property_types {
            SearchCriteria::new()
        } else {
            SearchCriteria::with_default_classification()
        };

        for raw in &self.filters {
            criteria = apply_descriptor(&criteria, raw)?;
        }

        for raw in &self.or {
            let mut fragment = SearchCriteria::new();
            for part in raw.split(';').map(str::trim).filter(|part| !part.is_empty()) {
                fragment = apply_descriptor(&fragment, part)?;
            }
            criteria.push_or(fragment);
        }

        for raw in &self.or_filters {
            criteria.push_or(apply_descriptor(&SearchCriteria::new(), raw)?);
        }

        for tag in &self.quicklists {
            criteria
                .add_quicklist(tag, QuicklistMode::All)
                .with_context(|| format!("Invalid --quicklist '{tag}'"))?;
        }
        for tag in &self.or_quicklists {
            criteria
                .add_quicklist(tag, QuicklistMode::Any)
                .with_context(|| format!("Invalid --or-quicklist '{tag}'"))?;
        }

        Ok(criteria)
    }

    /// The additional criteria text from `--criteria` or `--criteria-file`
    pub async fn additional(&self) -> Result<Option<String>> {
        if let Some(text) = &self.criteria {
            return Ok(Some(text.clone()));
        }
        match &self.criteria_file {
            Some(path) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }
}

fn apply_descriptor(criteria: &SearchCriteria, raw: &str) -> Result<SearchCriteria> {
    let descriptor = FilterDescriptor::parse(raw).with_context(|| format!("Invalid filter '{raw}'"))?;
    descriptor
        .apply(criteria)
        .with_context(|| format!("Cannot apply filter '{raw}'"))
}

/// Warn about location input the API is likely to reject
pub fn check_location(output: &OutputManager, state: &str, zip: Option<&str>) {
    if !state.trim().is_empty() && !is_valid_state_code(state) {
        output.warning(&format!("'{}' is not a two-letter state code", state.trim()));
    }
    if let Some(zip) = zip.filter(|zip| !zip.trim().is_empty())
        && !is_valid_zip(zip)
    {
        output.warning(&format!("'{}' is not a 5-digit ZIP code", zip.trim()));
    }
}

/// Render the value at a JSON pointer for a table cell
pub fn text_at(value: &Value, pointer: &str) -> String {
    match value.pointer(pointer) {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(text)) if text.is_empty() => "-".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => (if *flag { "yes" } else { "no" }).to_string(),
        Some(other) => other.to_string(),
    }
}

/// One-line address of a property or person record
pub fn address_line(value: &Value, base: &str) -> String {
    let parts: Vec<String> = ["street", "city", "state", "zip"]
        .iter()
        .map(|field| text_at(value, &format!("{base}/{field}")))
        .filter(|part| part != "-")
        .collect();
    if parts.is_empty() { "-".to_string() } else { parts.join(", ") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batchscope::CriteriaGroup;
    use serde_json::json;

    #[test]
    fn build_applies_filters_fragments_and_quicklists() {
        let args = CriteriaArgs {
            filters: vec!["building.yearBuilt:min:2000".to_string()],
            or: vec!["listing.status:inList:Sold; intel.lastSoldDate:minDate:2024-01-01".to_string()],
            quicklists: vec!["vacant".to_string()],
            or_quicklists: vec!["high-equity".to_string()],
            ..CriteriaArgs::default()
        };
        let criteria = args.build().unwrap();
        assert!(criteria.condition(CriteriaGroup::General, "propertyTypeCategory").is_some());
        assert!(criteria.condition(CriteriaGroup::Building, "yearBuilt").is_some());
        assert_eq!(criteria.or.len(), 1);
        assert_eq!(criteria.or[0].groups.len(), 2);
        assert_eq!(criteria.quick_lists, vec!["vacant"]);
        assert_eq!(criteria.or_quick_lists, vec!["high-equity"]);
    }

    #[test]
    fn or_filter_keeps_semicolons_in_text_values() {
        let args = CriteriaArgs {
            or: vec!["owner.mailingStreet:contains:Unit 4".to_string()],
            or_filters: vec!["owner.mailingStreet:contains:Suite 4; Rear".to_string()],
            all_property_types: true,
            ..CriteriaArgs::default()
        };
        let criteria = args.build().unwrap();
        assert_eq!(criteria.or.len(), 2);
        assert_eq!(
            criteria.or[1].condition(CriteriaGroup::Owner, "mailingStreet"),
            Some(&batchscope::Condition::TextMatch {
                operator: batchscope::Operator::Contains,
                value: "Suite 4; Rear".to_string(),
            })
        );
    }

    #[test]
    fn build_reports_bad_filters() {
        let args = CriteriaArgs {
            filters: vec!["building.yearBuilt:contains:19".to_string()],
            all_property_types: true,
            ..CriteriaArgs::default()
        };
        let err = args.build().unwrap_err();
        assert!(format!("{err:#}").contains("building.yearBuilt:contains:19"));
    }

    #[test]
    fn text_at_formats_cells() {
        let record = json!({"address": {"street": "1 Main St", "zip": ""}, "owner": {"occupied": true}});
        assert_eq!(text_at(&record, "/address/street"), "1 Main St");
        assert_eq!(text_at(&record, "/address/zip"), "-");
        assert_eq!(text_at(&record, "/owner/occupied"), "yes");
        assert_eq!(address_line(&record, "/address"), "1 Main St");
        assert_eq!(address_line(&record, "/mailingAddress"), "-");
    }
}
