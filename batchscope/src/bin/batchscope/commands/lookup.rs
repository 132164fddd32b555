use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::Value;

use batchscope::types::{Address, LookupOutcome, LookupRequest};

use super::{Session, address_line, check_location, text_at};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Property Lookup",
    commands: &[
        "batchscope lookup --street '2800 N 24th St' --city Phoenix --state AZ --zip 85008",
        "batchscope lookup --apn 119-20-012 --state AZ --county Maricopa",
        "batchscope --output json lookup --apn 119-20-012 --state AZ --county Maricopa",
    ],
}];

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Street address
    #[arg(long, conflicts_with = "apn")]
    pub street: Option<String>,

    /// City
    #[arg(long, conflicts_with = "apn")]
    pub city: Option<String>,

    /// 5-digit ZIP code
    #[arg(long, conflicts_with = "apn")]
    pub zip: Option<String>,

    /// Assessor parcel number (requires --state and --county)
    #[arg(long, requires = "county")]
    pub apn: Option<String>,

    /// County of the parcel
    #[arg(long)]
    pub county: Option<String>,

    /// Two-letter state code
    #[arg(long)]
    pub state: String,

    /// Print the request body without sending it
    #[arg(long)]
    pub dry_run: bool,
}

impl LookupArgs {
    fn request(&self) -> Result<LookupRequest> {
        let request = match &self.apn {
            Some(apn) => LookupRequest::by_apn(apn, &self.state, self.county.as_deref().unwrap_or_default())?,
            None => LookupRequest::by_address(Address::new(
                self.street.as_deref().unwrap_or_default(),
                self.city.as_deref().unwrap_or_default(),
                &self.state,
                self.zip.as_deref().unwrap_or_default(),
            ))?,
        };
        Ok(request)
    }
}

/// Sections shown for a found property, in display order
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Property",
        &[
            ("APN", "/ids/apn"),
            ("County", "/address/county"),
            ("Type", "/general/propertyTypeDetail"),
            ("Subdivision", "/legal/subdivisionName"),
        ],
    ),
    (
        "Building",
        &[
            ("Year Built", "/building/yearBuilt"),
            ("Bedrooms", "/building/bedroomCount"),
            ("Bathrooms", "/building/bathroomCount"),
            ("Living Area", "/building/totalBuildingAreaSquareFeet"),
            ("Lot Size", "/lot/lotSizeSquareFeet"),
        ],
    ),
    (
        "Value",
        &[
            ("Estimated Value", "/valuation/estimatedValue"),
            ("Equity", "/valuation/equityCurrentEstimatedBalance"),
            ("Assessed Value", "/assessment/totalAssessedValue"),
            ("Last Sale Price", "/sale/lastSale/price"),
            ("Last Sale Date", "/sale/lastSale/saleDate"),
        ],
    ),
    (
        "Owner",
        &[
            ("Name", "/owner/fullName"),
            ("Owner Occupied", "/owner/ownerOccupied"),
            ("Absentee", "/quickLists/absenteeOwner"),
            ("Vacant", "/quickLists/vacant"),
        ],
    ),
];

#[derive(Serialize)]
struct PropertyView {
    property: Value,
}

impl PropertyView {
    fn rows(&self) -> Vec<(&'static str, &'static str, String)> {
        let mut rows = vec![("Property", "Address", address_line(&self.property, "/address"))];
        for &(section, fields) in SECTIONS {
            for &(label, pointer) in fields {
                rows.push((section, label, text_at(&self.property, pointer)));
            }
        }
        rows
    }
}

impl TableDisplay for PropertyView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Section", "Field", "Value"]);
        for (section, label, value) in self.rows() {
            table.add_row(vec![Cell::new(section), Cell::new(label), Cell::new(value)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "{} apn={} value={}",
            address_line(&self.property, "/address"),
            text_at(&self.property, "/ids/apn"),
            text_at(&self.property, "/valuation/estimatedValue")
        )
    }
}

pub async fn handle_lookup(args: LookupArgs, session: &Session, output: &OutputManager) -> Result<()> {
    check_location(output, &args.state, args.zip.as_deref());

    let request = args.request()?;
    if args.dry_run {
        return output.json(&request);
    }

    let client = session.client()?;
    match session.submit(output, "Looking up property", client.lookup(&request)).await? {
        LookupOutcome::Found(property) => {
            if !output.is_json() {
                output.success("Property found");
            }
            output.display(&PropertyView { property })
        }
        LookupOutcome::NoMatch => {
            if output.is_json() {
                output.json(&Value::Null)
            } else {
                output.warning("No property found for that lookup");
                Ok(())
            }
        }
    }
}
