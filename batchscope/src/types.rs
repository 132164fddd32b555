//! Request bodies and response envelopes for the property endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::{ExplorerError, ExplorerResult, ValidationError};
use crate::filters::number_from_f64;
use crate::search::{CriteriaDocument, SearchCriteria, build_request_body};
use crate::validators::require_fields;

/// Page size used by the property list and comparables pages.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// A postal address. Blank parts are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    /// Build an address from user input, trimming every part.
    pub fn new(street: &str, city: &str, state: &str, zip: &str) -> Self {
        Self {
            street: street.trim().to_string(),
            city: city.trim().to_string(),
            state: state.trim().to_string(),
            zip: zip.trim().to_string(),
        }
    }

    /// Fails unless street, city, state and zip are all present.
    pub fn require_complete(&self) -> Result<(), ValidationError> {
        require_fields(&[
            ("street", self.street.as_str()),
            ("city", self.city.as_str()),
            ("state", self.state.as_str()),
            ("zip", self.zip.as_str()),
        ])
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (key, value) in [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
        ] {
            if !value.is_empty() {
                object.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        Value::Object(object)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.street, &self.city, &self.state, &self.zip]
            .into_iter()
            .map(String::as_str)
            .filter(|part| !part.is_empty())
            .collect();
        f.write_str(&parts.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    #[default]
    Miles,
    Yards,
    Feet,
    Kilometers,
    Meters,
}

impl DistanceUnit {
    pub const ALL: [DistanceUnit; 5] = [
        DistanceUnit::Miles,
        DistanceUnit::Yards,
        DistanceUnit::Feet,
        DistanceUnit::Kilometers,
        DistanceUnit::Meters,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "miles",
            DistanceUnit::Yards => "yards",
            DistanceUnit::Feet => "feet",
            DistanceUnit::Kilometers => "kilometers",
            DistanceUnit::Meters => "meters",
        }
    }

    /// Option key carrying the distance value.
    pub const fn option_key(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "distanceMiles",
            DistanceUnit::Yards => "distanceYards",
            DistanceUnit::Feet => "distanceFeet",
            DistanceUnit::Kilometers => "distanceKilometers",
            DistanceUnit::Meters => "distanceMeters",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DistanceUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ExplorerError::invalid_request(format!("Unknown distance unit: {}", wanted)))
    }
}

/// Allowed offset from the subject property for one attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeDelta {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeDelta {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

/// Delta filters for a comparables search. `Some` enables the matching `use*` flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparableOptions {
    pub distance: Option<(DistanceUnit, f64)>,
    pub bedrooms: Option<RangeDelta>,
    pub bathrooms: Option<RangeDelta>,
    pub stories: Option<RangeDelta>,
    pub area_percent: Option<RangeDelta>,
    pub year_built: Option<RangeDelta>,
    pub lot_size_percent: Option<RangeDelta>,
}

impl ComparableOptions {
    fn write_into(&self, options: &mut Map<String, Value>) {
        if let Some((unit, value)) = self.distance
            && let Some(number) = number_from_f64(value)
        {
            options.insert("useDistance".to_string(), Value::Bool(true));
            options.insert(unit.option_key().to_string(), Value::Number(number));
        }

        let deltas = [
            ("useBedrooms", "minBedrooms", "maxBedrooms", &self.bedrooms),
            ("useBathrooms", "minBathrooms", "maxBathrooms", &self.bathrooms),
            ("useStories", "minStories", "maxStories", &self.stories),
            ("useArea", "minAreaPercent", "maxAreaPercent", &self.area_percent),
            ("useYearBuilt", "minYearBuilt", "maxYearBuilt", &self.year_built),
            ("useLotSize", "minLotSizePercent", "maxLotSizePercent", &self.lot_size_percent),
        ];
        for (flag, min_key, max_key, delta) in deltas {
            let Some(delta) = delta else { continue };
            options.insert(flag.to_string(), Value::Bool(true));
            for (key, bound) in [(min_key, delta.min), (max_key, delta.max)] {
                if let Some(number) = bound.and_then(number_from_f64) {
                    options.insert(key.to_string(), Value::Number(number));
                }
            }
        }
    }
}

/// The `options` object of a property search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub skip: u64,
    pub take: u64,
    pub quicklist_counts: Option<bool>,
    pub agg_comparables_metrics: Option<bool>,
    pub comparables: ComparableOptions,
}

impl SearchOptions {
    /// Count-only search: no rows, but per-quicklist counts.
    pub fn count() -> Self {
        Self {
            skip: 0,
            take: 0,
            quicklist_counts: Some(true),
            ..Self::default()
        }
    }

    /// One page of results. Pages start at 1; 0 is treated as 1.
    pub fn page(page: u64, page_size: u64) -> Self {
        Self {
            skip: page.max(1).saturating_sub(1).saturating_mul(page_size),
            take: page_size,
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> Value {
        let mut options = Map::new();
        options.insert("skip".to_string(), Value::from(self.skip));
        options.insert("take".to_string(), Value::from(self.take));
        if let Some(flag) = self.quicklist_counts {
            options.insert("quicklistCounts".to_string(), Value::Bool(flag));
        }
        if let Some(flag) = self.agg_comparables_metrics {
            options.insert("aggComparablesMetrics".to_string(), Value::Bool(flag));
        }
        self.comparables.write_into(&mut options);
        Value::Object(options)
    }
}

impl Serialize for SearchOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Body of `POST /property/search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search_criteria: CriteriaDocument,
    pub options: SearchOptions,
}

impl SearchRequest {
    /// Count properties in `city, state` matching the criteria.
    pub fn count(criteria: &SearchCriteria, city: &str, state: &str, additional: Option<&str>) -> ExplorerResult<Self> {
        let query = location_query(city, state)?;
        Ok(Self {
            search_criteria: build_request_body(&criteria.clone().with_query(query), additional)?,
            options: SearchOptions::count(),
        })
    }

    /// One page of properties in `city, state` matching the criteria.
    pub fn list(
        criteria: &SearchCriteria,
        city: &str,
        state: &str,
        page: u64,
        page_size: u64,
        additional: Option<&str>,
    ) -> ExplorerResult<Self> {
        let query = location_query(city, state)?;
        Ok(Self {
            search_criteria: build_request_body(&criteria.clone().with_query(query), additional)?,
            options: SearchOptions::page(page, page_size),
        })
    }

    /// One page of comparables for the subject address.
    pub fn comparables(
        criteria: &SearchCriteria,
        subject: &Address,
        comparables: ComparableOptions,
        agg_metrics: bool,
        page: u64,
        page_size: u64,
        additional: Option<&str>,
    ) -> ExplorerResult<Self> {
        subject.require_complete()?;
        let mut options = SearchOptions::page(page, page_size);
        options.agg_comparables_metrics = Some(agg_metrics);
        options.comparables = comparables;
        Ok(Self {
            search_criteria: build_request_body(&criteria.clone().with_comp_address(subject.clone()), additional)?,
            options,
        })
    }
}

fn location_query(city: &str, state: &str) -> ExplorerResult<String> {
    require_fields(&[("city", city), ("state", state)])?;
    Ok(format!("{}, {}", city.trim(), state.trim()))
}

/// One entry of a lookup request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LookupTarget {
    Address { address: Address },
    Apn { apn: String, address: CountyRef },
}

/// State and county that scope an APN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountyRef {
    pub state: String,
    pub county: String,
}

/// Body of `POST /property/lookup/all-attributes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupRequest {
    pub requests: Vec<LookupTarget>,
}

impl LookupRequest {
    pub fn by_address(address: Address) -> ExplorerResult<Self> {
        address.require_complete()?;
        Ok(Self {
            requests: vec![LookupTarget::Address { address }],
        })
    }

    pub fn by_apn(apn: &str, state: &str, county: &str) -> ExplorerResult<Self> {
        require_fields(&[("apn", apn), ("state", state), ("county", county)])?;
        Ok(Self {
            requests: vec![LookupTarget::Apn {
                apn: apn.trim().to_string(),
                address: CountyRef {
                    state: state.trim().to_string(),
                    county: county.trim().to_string(),
                },
            }],
        })
    }
}

/// One entry of a skip-trace request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SkipTraceTarget {
    Address {
        #[serde(rename = "propertyAddress")]
        property_address: Address,
    },
    Apn {
        apn: String,
        county: String,
        state: String,
    },
}

/// Body of `POST /property/skip-trace`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkipTraceRequest {
    pub requests: Vec<SkipTraceTarget>,
}

impl SkipTraceRequest {
    /// Street and state are required; city and zip are optional.
    pub fn by_address(address: Address) -> ExplorerResult<Self> {
        require_fields(&[("street", address.street.as_str()), ("state", address.state.as_str())])?;
        Ok(Self {
            requests: vec![SkipTraceTarget::Address {
                property_address: address,
            }],
        })
    }

    pub fn by_apn(apn: &str, state: &str, county: &str) -> ExplorerResult<Self> {
        require_fields(&[("apn", apn), ("state", state), ("county", county)])?;
        Ok(Self {
            requests: vec![SkipTraceTarget::Apn {
                apn: apn.trim().to_string(),
                county: county.trim().to_string(),
                state: state.trim().to_string(),
            }],
        })
    }
}

/// Per-quicklist count returned by a count search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuicklistCount {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

/// Treats an explicit `null` like a missing key.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsEnvelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub persons: Vec<Value>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub quicklist_counts: Vec<QuicklistCount>,
}

/// Response envelope shared by all property endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub results: Option<ResultsEnvelope>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiResponse {
    /// Message for a failed request: `status.message`, then `message`, then a generic fallback.
    pub fn error_message(&self, http_status: u16) -> String {
        let status_message = self
            .status
            .as_ref()
            .and_then(|status| status.get("message"))
            .and_then(Value::as_str);
        status_message
            .or(self.message.as_deref())
            .filter(|message| !message.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("API request failed with status {}", http_status))
    }

    fn meta_results(&self) -> Option<&Value> {
        self.results.as_ref()?.meta.as_ref()?.get("results")
    }

    pub fn results_found(&self) -> Option<u64> {
        self.meta_results()?.get("resultsFound")?.as_u64()
    }

    pub fn agg_comparables_metrics(&self) -> Option<&Value> {
        self.meta_results()?.get("aggComparablesMetrics")
    }

    pub fn into_count(self) -> ExplorerResult<CountOutcome> {
        let results_found = self.results_found().ok_or(ExplorerError::UnexpectedResponse {
            message: "Unexpected response format".into(),
        })?;
        Ok(CountOutcome {
            results_found,
            quicklist_counts: self.results.map(|results| results.quicklist_counts).unwrap_or_default(),
        })
    }

    pub fn into_page(self, page: u64, page_size: u64) -> PropertyPage {
        let total = self.results_found().unwrap_or(0);
        let agg_comparables_metrics = self.agg_comparables_metrics().cloned();
        PropertyPage {
            properties: self.results.map(|results| results.properties).unwrap_or_default(),
            total,
            page: page.max(1),
            page_size,
            agg_comparables_metrics,
        }
    }

    pub fn into_lookup(self) -> LookupOutcome {
        match self.results.and_then(|results| results.properties.into_iter().next()) {
            Some(property) => LookupOutcome::Found(property),
            None => LookupOutcome::NoMatch,
        }
    }

    pub fn into_skip_trace(self) -> ExplorerResult<SkipTraceOutcome> {
        let Some(results) = self.results else {
            return Err(no_skip_trace_results());
        };
        let meta = results.meta;
        match results.persons.into_iter().next() {
            Some(person) => Ok(SkipTraceOutcome::Match { person, meta }),
            None => meta
                .map(|meta| SkipTraceOutcome::NoMatch { meta })
                .ok_or_else(no_skip_trace_results),
        }
    }
}

fn no_skip_trace_results() -> ExplorerError {
    ExplorerError::UnexpectedResponse {
        message: "No skip trace results found".into(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountOutcome {
    pub results_found: u64,
    pub quicklist_counts: Vec<QuicklistCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPage {
    pub properties: Vec<Value>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub agg_comparables_metrics: Option<Value>,
}

impl PropertyPage {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Value),
    NoMatch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipTraceOutcome {
    Match { person: Value, meta: Option<Value> },
    NoMatch { meta: Value },
}
