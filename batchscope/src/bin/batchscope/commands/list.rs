use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, CellAlignment, Table};
use serde::Serialize;
use serde_json::Value;

use batchscope::types::{PropertyPage, SearchRequest};

use super::{CriteriaArgs, Session, address_line, check_location, text_at};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Paging",
        commands: &[
            "batchscope list Phoenix AZ                                   # First page of properties",
            "batchscope list Phoenix AZ --page 3                          # Third page",
            "batchscope --output json list Phoenix AZ > page.json         # Raw property records",
        ],
    },
    ExampleGroup {
        title: "Filtered Lists",
        commands: &[
            "batchscope list Denver CO -f building.bedroomCount:min:3 -f valuation.estimatedValue:max:650000",
            "batchscope list Miami FL --quicklist preforeclosure --or 'listing.status:inList:Active'",
        ],
    },
];

#[derive(Args, Debug)]
pub struct ListArgs {
    /// City to search in
    pub city: String,

    /// Two-letter state code
    pub state: String,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    #[command(flatten)]
    pub criteria: CriteriaArgs,
}

/// A page of property records as shown by `list` and `comps`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub properties: Vec<Value>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agg_comparables_metrics: Option<Value>,
}

impl From<PropertyPage> for PageView {
    fn from(page: PropertyPage) -> Self {
        let total_pages = page.total_pages();
        Self {
            properties: page.properties,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages,
            agg_comparables_metrics: page.agg_comparables_metrics,
        }
    }
}

impl PageView {
    /// "Page 2 of 7 (320 properties)"
    pub fn position(&self) -> String {
        format!("Page {} of {} ({} properties)", self.page, self.total_pages.max(1), self.total)
    }
}

impl TableDisplay for PageView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Address", "Type", "Built", "Beds", "Baths", "Est. Value"]);
        for property in &self.properties {
            table.add_row(vec![
                Cell::new(address_line(property, "/address")),
                Cell::new(text_at(property, "/general/propertyTypeDetail")),
                Cell::new(text_at(property, "/building/yearBuilt")),
                Cell::new(text_at(property, "/building/bedroomCount")).set_alignment(CellAlignment::Right),
                Cell::new(text_at(property, "/building/bathroomCount")).set_alignment(CellAlignment::Right),
                Cell::new(text_at(property, "/valuation/estimatedValue")).set_alignment(CellAlignment::Right),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        let mut lines = vec![self.position()];
        lines.extend(self.properties.iter().map(|property| address_line(property, "/address")));
        lines.join("\n")
    }
}

pub async fn handle_list(args: ListArgs, session: &Session, output: &OutputManager) -> Result<()> {
    check_location(output, &args.state, None);

    let criteria = args.criteria.build()?;
    let additional = args.criteria.additional().await?;
    let page_size = session.context.page_size();
    let request = SearchRequest::list(
        &criteria,
        &args.city,
        &args.state,
        args.page,
        page_size,
        additional.as_deref(),
    )?;

    if args.criteria.dry_run {
        return output.json(&request);
    }

    let client = session.client()?;
    let page = session.submit(output, "Fetching properties", client.list(&request)).await?;
    let view = PageView::from(page);

    if view.properties.is_empty() {
        output.info("No properties match these filters");
        return Ok(());
    }

    output.display(&view)?;
    output.info(&view.position());
    Ok(())
}
