//! Static catalog of criteria groups, their categories, and quicklist tags.
//!
//! Every category belongs to exactly one [`FilterKind`], which decides the operators it accepts
//! and how raw input is normalized before it is stored.

pub mod codes;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::ExplorerError;
use crate::search::Operator;
use codes::*;

/// How keystroke input for a numeric bound is restricted before storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericInput {
    /// Only ASCII digits survive.
    Integer,
    /// ASCII digits and a single decimal point survive.
    Decimal,
}

/// How a boolean category encodes an unchecked state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanEncoding {
    /// `true` or absent; `false` removes the key.
    Checkbox,
    /// `true`, `false`, or absent.
    TriState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    NumericRange(NumericInput),
    DateRange,
    MultiSelect,
    TextMatch,
    BooleanFlag(BooleanEncoding),
}

impl FilterKind {
    pub const fn name(self) -> &'static str {
        match self {
            FilterKind::NumericRange(_) => "numeric",
            FilterKind::DateRange => "date",
            FilterKind::MultiSelect => "multi-select",
            FilterKind::TextMatch => "text",
            FilterKind::BooleanFlag(_) => "boolean",
        }
    }

    pub fn accepts(self, operator: Operator) -> bool {
        match self {
            FilterKind::NumericRange(_) => matches!(operator, Operator::Min | Operator::Max),
            FilterKind::DateRange => matches!(operator, Operator::MinDate | Operator::MaxDate),
            FilterKind::MultiSelect => operator == Operator::InList,
            FilterKind::TextMatch => operator.is_text_match(),
            FilterKind::BooleanFlag(_) => operator == Operator::Equals,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CategorySpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
    pub options: &'static [&'static str],
}

const fn integer(name: &'static str, label: &'static str) -> CategorySpec {
    CategorySpec {
        name,
        label,
        kind: FilterKind::NumericRange(NumericInput::Integer),
        options: &[],
    }
}

const fn decimal(name: &'static str, label: &'static str) -> CategorySpec {
    CategorySpec {
        name,
        label,
        kind: FilterKind::NumericRange(NumericInput::Decimal),
        options: &[],
    }
}

const fn date(name: &'static str, label: &'static str) -> CategorySpec {
    CategorySpec {
        name,
        label,
        kind: FilterKind::DateRange,
        options: &[],
    }
}

const fn select(name: &'static str, label: &'static str, options: &'static [&'static str]) -> CategorySpec {
    CategorySpec {
        name,
        label,
        kind: FilterKind::MultiSelect,
        options,
    }
}

const fn text(name: &'static str, label: &'static str) -> CategorySpec {
    CategorySpec {
        name,
        label,
        kind: FilterKind::TextMatch,
        options: &[],
    }
}

const fn flag(name: &'static str, label: &'static str, encoding: BooleanEncoding) -> CategorySpec {
    CategorySpec {
        name,
        label,
        kind: FilterKind::BooleanFlag(encoding),
        options: &[],
    }
}

/// Top-level domain keys of `searchCriteria`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CriteriaGroup {
    General,
    Assessment,
    Building,
    Demographics,
    Foreclosure,
    Intel,
    InvoluntaryLien,
    Legal,
    Listing,
    Lot,
    OpenLien,
    Owner,
    Permit,
    Sale,
}

impl CriteriaGroup {
    pub const ALL: [CriteriaGroup; 14] = [
        CriteriaGroup::General,
        CriteriaGroup::Assessment,
        CriteriaGroup::Building,
        CriteriaGroup::Demographics,
        CriteriaGroup::Foreclosure,
        CriteriaGroup::Intel,
        CriteriaGroup::InvoluntaryLien,
        CriteriaGroup::Legal,
        CriteriaGroup::Listing,
        CriteriaGroup::Lot,
        CriteriaGroup::OpenLien,
        CriteriaGroup::Owner,
        CriteriaGroup::Permit,
        CriteriaGroup::Sale,
    ];

    /// Key used in the request body.
    pub const fn as_str(self) -> &'static str {
        match self {
            CriteriaGroup::General => "general",
            CriteriaGroup::Assessment => "assessment",
            CriteriaGroup::Building => "building",
            CriteriaGroup::Demographics => "demographics",
            CriteriaGroup::Foreclosure => "foreclosure",
            CriteriaGroup::Intel => "intel",
            CriteriaGroup::InvoluntaryLien => "involuntaryLien",
            CriteriaGroup::Legal => "legal",
            CriteriaGroup::Listing => "listing",
            CriteriaGroup::Lot => "lot",
            CriteriaGroup::OpenLien => "openLien",
            CriteriaGroup::Owner => "owner",
            CriteriaGroup::Permit => "permit",
            CriteriaGroup::Sale => "sale",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CriteriaGroup::General => "Property Classification",
            CriteriaGroup::Assessment => "Assessment",
            CriteriaGroup::Building => "Building",
            CriteriaGroup::Demographics => "Demographic",
            CriteriaGroup::Foreclosure => "Foreclosure",
            CriteriaGroup::Intel => "Intel",
            CriteriaGroup::InvoluntaryLien => "Involuntary Lien",
            CriteriaGroup::Legal => "Legal",
            CriteriaGroup::Listing => "Listing",
            CriteriaGroup::Lot => "Lot",
            CriteriaGroup::OpenLien => "Open Lien",
            CriteriaGroup::Owner => "Owner",
            CriteriaGroup::Permit => "Permit",
            CriteriaGroup::Sale => "Sale",
        }
    }

    pub fn categories(self) -> &'static [CategorySpec] {
        match self {
            CriteriaGroup::General => GENERAL,
            CriteriaGroup::Assessment => ASSESSMENT,
            CriteriaGroup::Building => BUILDING,
            CriteriaGroup::Demographics => DEMOGRAPHICS,
            CriteriaGroup::Foreclosure => FORECLOSURE,
            CriteriaGroup::Intel => INTEL,
            CriteriaGroup::InvoluntaryLien => INVOLUNTARY_LIEN,
            CriteriaGroup::Legal => LEGAL,
            CriteriaGroup::Listing => LISTING,
            CriteriaGroup::Lot => LOT,
            CriteriaGroup::OpenLien => OPEN_LIEN,
            CriteriaGroup::Owner => OWNER,
            CriteriaGroup::Permit => PERMIT,
            CriteriaGroup::Sale => SALE,
        }
    }

    pub fn category(self, name: &str) -> Option<&'static CategorySpec> {
        self.categories().iter().find(|spec| spec.name == name)
    }

    /// Look up a category, reporting unknown names as an error.
    pub fn require_category(self, name: &str) -> Result<&'static CategorySpec, ExplorerError> {
        self.category(name).ok_or_else(|| ExplorerError::UnknownCategory {
            group: self.as_str().to_string(),
            category: name.to_string(),
        })
    }
}

impl fmt::Display for CriteriaGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CriteriaGroup {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CriteriaGroup::ALL
            .into_iter()
            .find(|group| {
                group.as_str().eq_ignore_ascii_case(wanted)
                    || (*group == CriteriaGroup::General && wanted.eq_ignore_ascii_case("propertyClassification"))
            })
            .ok_or_else(|| ExplorerError::invalid_request(format!("Unknown criteria group: {}", wanted)))
    }
}

static GENERAL: &[CategorySpec] = &[
    select("propertyTypeCategory", "Property Type Category", PROPERTY_TYPE_CATEGORIES),
    select("propertyTypeDetail", "Property Type Detail", &[]),
];

static ASSESSMENT: &[CategorySpec] = &[
    integer("assessmentYear", "Assessment Year"),
    integer("totalAssessedValue", "Total Assessed Value"),
    integer("assessedImprovementValue", "Assessed Improvement Value"),
    integer("assessedLandValue", "Assessed Land Value"),
    integer("marketValueYear", "Market Value Year"),
    integer("landMarketValue", "Land Market Value"),
    integer("improvementMarketValue", "Improvement Market Value"),
    integer("totalMarketValue", "Total Market Value"),
];

static BUILDING: &[CategorySpec] = &[
    integer("yearBuilt", "Year Built"),
    integer("bedroomCount", "Bedroom Count"),
    integer("bathroomCount", "Bathroom Count"),
    integer("totalBuildingAreaSquareFeet", "Total Building Area (Sq Ft)"),
    integer("storyCount", "Story Count"),
    integer("roomCount", "Room Count"),
    integer("unitCount", "Unit Count"),
    integer("garageParkingSpaceCount", "Garage Parking Spaces"),
    integer("buildingCount", "Building Count"),
    select("basementType", "Basement Type", BASEMENT_TYPES),
    select("buildingCondition", "Building Condition", BUILDING_CONDITIONS),
    select("buildingQuality", "Building Quality", BUILDING_QUALITY),
    select("pool", "Pool", POOL_TYPES),
    select("garage", "Garage Type", GARAGE_TYPES),
    select("constructionType", "Construction Type", CONSTRUCTION_TYPES),
    select("roofCover", "Roof Cover", ROOF_COVER),
    select("style", "Building Style", BUILDING_STYLE),
];

static DEMOGRAPHICS: &[CategorySpec] = &[
    integer("age", "Age"),
    integer("householdSize", "Household Size"),
    integer("income", "Income"),
    integer("netWorth", "Net Worth"),
    integer("discretionaryIncome", "Discretionary Income"),
    select("homeownerRenter", "Homeowner / Renter", HOMEOWNER_RENTER_TYPES),
    flag("businessOwner", "Business Owner", BooleanEncoding::Checkbox),
    select("gender", "Gender", GENDER_TYPES),
    select("demographics", "Demographics", DEMOGRAPHICS_TYPES),
];

static FORECLOSURE: &[CategorySpec] = &[
    select("status", "Status", FORECLOSURE_STATUS_TYPES),
    date("recordingDate", "Recording Date"),
    date("auctionDate", "Auction Date"),
    date("releaseDate", "Release Date"),
    integer("auctionMinimumBidAmount", "Auction Minimum Bid Amount"),
    integer("pastDueAmount", "Past Due Amount"),
];

static INTEL: &[CategorySpec] = &[
    date("lastSoldDate", "Last Sold Date"),
    integer("lastSoldPrice", "Last Sold Price"),
    integer("salePropensity", "Sale Propensity"),
];

static INVOLUNTARY_LIEN: &[CategorySpec] = &[
    select("lienType", "Lien Type", &[]),
    date("recordingDate", "Recording Date"),
    date("filingDate", "Filing Date"),
    integer("lienAmount", "Lien Amount"),
];

static LEGAL: &[CategorySpec] = &[text("subdivisionName", "Subdivision Name")];

static LISTING: &[CategorySpec] = &[
    text("description", "Description"),
    select("status", "Status", LISTING_STATUS),
    select("statusCategory", "Status Category", LISTING_STATUS_CATEGORY),
    integer("price", "Price"),
    integer("daysOnMarket", "Days on Market"),
    date("failedListingDate", "Failed Listing Date"),
    date("soldDate", "Sold Date"),
];

static LOT: &[CategorySpec] = &[
    decimal("lotSizeAcres", "Lot Size (Acres)"),
    decimal("lotSizeSquareFeet", "Lot Size (Sq Ft)"),
    decimal("lotDepthFeet", "Lot Depth (Feet)"),
    decimal("lotFrontageFeet", "Lot Frontage (Feet)"),
    text("zoningCode", "Zoning Code"),
];

static OPEN_LIEN: &[CategorySpec] = &[
    integer("totalOpenLienCount", "Total Open Lien Count"),
    integer("totalOpenLienBalance", "Total Open Lien Balance"),
];

static OWNER: &[CategorySpec] = &[
    text("firstName", "First Name"),
    text("lastName", "Last Name"),
    text("mailingStreet", "Mailing Street"),
    text("mailingCity", "Mailing City"),
    text("mailingState", "Mailing State"),
    text("mailingZip", "Mailing Zip"),
    text("ownerStatusType", "Owner Status Type"),
    text("mailingAddressHash", "Mailing Address Hash"),
    flag("ownerOccupied", "Owner Occupied", BooleanEncoding::TriState),
    decimal("lengthOfResidenceMonths", "Length of Residence (Months)"),
    decimal("lengthOfResidenceYears", "Length of Residence (Years)"),
    date("ownershipStartDate", "Ownership Start Date"),
];

static PERMIT: &[CategorySpec] = &[
    decimal("permitCount", "Permit Count"),
    decimal("totalJobValue", "Total Job Value"),
    date("latestDate", "Latest Date"),
    date("earliestDate", "Earliest Date"),
    text("allTags", "All Tags"),
];

static SALE: &[CategorySpec] = &[
    integer("lastSalePrice", "Last Sale Price"),
    date("lastSaleDate", "Last Sale Date"),
];

fn quicklist_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("quicklist pattern is valid"))
}

/// Returns `true` if the tag is one of the published quicklists.
pub fn is_known_quicklist(tag: &str) -> bool {
    QUICKLISTS.contains(&tag)
}

/// Validate a quicklist tag. Unknown but well-formed tags are accepted so newly published
/// quicklists keep working.
pub fn validate_quicklist(tag: &str) -> Result<(), ExplorerError> {
    if quicklist_pattern().is_match(tag) {
        if !is_known_quicklist(tag) {
            log::warn!("quicklist '{}' is not in the published catalog", tag);
        }
        Ok(())
    } else {
        Err(ExplorerError::invalid_request(format!("Invalid quicklist tag: {}", tag)))
    }
}

/// Turn `high-equity` into `High Equity`.
pub fn quicklist_label(tag: &str) -> String {
    tag.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
