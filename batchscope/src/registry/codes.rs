//! Enumerated option codes accepted by `inList` categories.
//!
//! The API matches on the description text, so the codes are the labels.

pub const BASEMENT_TYPES: &[&str] = &[
    "Basement (not specified)",
    "Daylight, Partial",
    "Daylight/Walkout",
    "Full Basement",
    "Improved Basement (Finished)",
    "No Basement",
    "Partial Basement",
    "Unfinished Basement",
    "Daylight, Full",
];

pub const BUILDING_CONDITIONS: &[&str] = &["Excellent", "Fair", "Good", "Poor", "Unsound", "Average"];

pub const BUILDING_QUALITY: &[&str] = &[
    "S", "AA", "A+", "A", "A-", "B+", "B", "B-", "C+", "C", "C-", "D+", "D", "D-", "E+", "E", "E-", "F+", "F", "F-",
];

pub const POOL_TYPES: &[&str] = &[
    "Above-Ground Pool",
    "Community Pool or Spa",
    "Enclosed",
    "Heated Pool",
    "Indoor Pool",
    "Pool & Spa",
    "Pool - Yes",
    "Solar Heated",
    "Spa or Hot Tub (only)",
    "Vinyl In-Ground Pool",
];

pub const GARAGE_TYPES: &[&str] = &[
    "Attached Garage",
    "Built-in",
    "Carport",
    "Covered",
    "Detached Garage",
    "Finished",
    "Finished Attached",
    "Finished Detached",
    "Garage",
    "Heated",
    "None",
    "Parking Structure",
    "Pole",
    "Tuckunder",
    "Underground/Basement",
    "Unfinished Attached",
    "Unfinished Detached",
];

pub const CONSTRUCTION_TYPES: &[&str] = &[
    "Other",
    "Frame",
    "Wood",
    "Metal",
    "Steel",
    "Concrete",
    "Masonry",
    "Concrete Block",
    "Brick",
    "Stone",
    "Manufactured",
    "Tilt-Up",
];

pub const ROOF_COVER: &[&str] = &[
    "Aluminum",
    "Wood",
    "Wood Shake/ Shingles",
    "Asbestos",
    "Asphalt",
    "Built-Up",
    "Composition Shingle",
    "Concrete",
    "Fiberglass",
    "Metal",
    "Roll Composition",
    "Shingle (Not Wood)",
    "Slate",
    "Steel",
    "Tar & Gravel",
    "Tile",
];

pub const BUILDING_STYLE: &[&str] = &[
    "A-Frame",
    "Patio Home",
    "Ranch/Rambler",
    "Spanish",
    "Split Foyer",
    "Split Level",
    "Tiny House",
    "TownHouse",
    "Traditional",
    "Tudor",
    "Victorian",
    "Bi-Level",
    "Bungalow",
    "Cape Cod",
    "Cluster",
    "Colonial",
    "Condominium",
    "Contemporary",
    "Cottage",
    "Custom",
    "Dome",
    "Duplex",
    "Georgian",
    "Log Cabin/Rustic",
    "Mediterranean",
    "Mobile Home",
    "Mobile/Manufactured",
    "Modern",
];

pub const DEMOGRAPHICS_TYPES: &[&str] = &[
    "Accountant",
    "Builder",
    "Contractor",
    "Dealer/Retailer/Storekeeper",
    "Distributor/Wholesaler",
    "Funeral Director",
    "Maker/Manufacturer",
    "Owner",
    "Partner",
    "Self-Employed",
];

pub const GENDER_TYPES: &[&str] = &["Female", "Male", "Unknown"];

pub const HOMEOWNER_RENTER_TYPES: &[&str] = &["Home Owner", "Renter"];

pub const FORECLOSURE_STATUS_TYPES: &[&str] = &[
    "Notice of Sale",
    "Cancel Due to Length of Time and Auction Date",
    "Rescission Recording",
    "Rescission Release",
    "Notice of Default",
    "Notice of Lis Pendens",
    "Foreclosure Canceled",
];

pub const LISTING_STATUS: &[&str] = &["Active", "Canceled", "Expired", "Off Market", "Pending", "Sold"];

pub const LISTING_STATUS_CATEGORY: &[&str] = &["Active", "Failed", "Off Market", "Pending", "Sold"];

pub const PROPERTY_TYPE_CATEGORIES: &[&str] = &[
    "Residential",
    "Commercial",
    "Agricultural",
    "Industrial",
    "Vacant Land",
    "Exempt",
    "Miscellaneous",
];

/// Quicklist tags published by the API.
pub const QUICKLISTS: &[&str] = &[
    "absentee-owner",
    "active-auction",
    "active-listing",
    "canceled-listing",
    "cash-buyer",
    "corporate-owned",
    "expired-listing",
    "failed-listing",
    "fix-and-flip",
    "free-and-clear",
    "for-sale-by-owner",
    "has-hoa",
    "has-hoa-fees",
    "high-equity",
    "inherited",
    "involuntary-lien",
    "in-state-absentee-owner",
    "listed-below-market-price",
    "low-equity",
    "mailing-address-vacant",
    "notice-of-default",
    "notice-of-lis-pendens",
    "notice-of-sale",
    "on-market",
    "out-of-state-absentee-owner",
    "out-of-state-owner",
    "owner-occupied",
    "pending-listing",
    "preforeclosure",
    "recently-sold",
    "same-property-and-mailing-address",
    "tax-default",
    "tired-landlord",
    "unknown-equity",
    "vacant",
    "vacant-lot",
];

pub const US_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME",
    "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA",
    "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV", "WI", "WY",
];
