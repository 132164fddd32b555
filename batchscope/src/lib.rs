//! batchscope core library.
//!
//! Builds and sends request bodies for the BatchData property API: filter criteria normalization,
//! the category catalog, request/response shapes, and a thin HTTP client.

pub mod client;
pub mod errors;
pub mod filters;
pub mod registry;
pub mod search;
pub mod types;
pub mod validators;

pub use client::{ApiClient, ApiToken, ClientConfig, Endpoint, RequestSlot};
pub use errors::{ExplorerError, ExplorerResult, ValidationError, ValidationIssue};
pub use registry::{CategorySpec, CriteriaGroup, FilterKind};
pub use search::{
    Condition, CriteriaDocument, FilterDescriptor, Operator, QuicklistMode, RawValue, SearchCriteria, SearchTarget,
    apply_operator, build_request_body, toggle_in_list,
};
pub use types::{
    Address, ApiResponse, ComparableOptions, CountOutcome, DistanceUnit, LookupOutcome, LookupRequest, PropertyPage,
    RangeDelta, SearchOptions, SearchRequest, SkipTraceOutcome, SkipTraceRequest,
};
