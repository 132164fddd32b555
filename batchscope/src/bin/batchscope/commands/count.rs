use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, CellAlignment, Table};
use serde::Serialize;

use batchscope::registry::quicklist_label;
use batchscope::types::{CountOutcome, QuicklistCount, SearchRequest};

use super::{CriteriaArgs, Session, check_location};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Basic Counts",
        commands: &[
            "batchscope count Phoenix AZ                                  # Residential properties in Phoenix",
            "batchscope count Phoenix AZ --all-property-types             # Every property type",
        ],
    },
    ExampleGroup {
        title: "Filters and Quicklists",
        commands: &[
            "batchscope count Austin TX -f building.yearBuilt:min:2000 -f building.pool:inList:'Heated Pool'",
            "batchscope count Phoenix AZ --quicklist vacant --or-quicklist high-equity",
            "batchscope count Tampa FL --criteria '\"intel\": {\"salePropensity\": {\"min\": 60}}' --dry-run",
        ],
    },
];

#[derive(Args, Debug)]
pub struct CountArgs {
    /// City to search in
    pub city: String,

    /// Two-letter state code
    pub state: String,

    #[command(flatten)]
    pub criteria: CriteriaArgs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CountView {
    query: String,
    results_found: u64,
    quicklist_counts: Vec<QuicklistCount>,
}

impl TableDisplay for CountView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Category", "Properties"]);
        table.add_row(vec![
            Cell::new(format!("All matches in {}", self.query)),
            Cell::new(format_count(self.results_found)).set_alignment(CellAlignment::Right),
        ]);
        for item in &self.quicklist_counts {
            table.add_row(vec![
                Cell::new(quicklist_label(&item.name)),
                Cell::new(format_count(item.count)).set_alignment(CellAlignment::Right),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("{}: {}", self.query, self.results_found)
    }
}

/// Group digits in threes: `1234567` becomes `1,234,567`
fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub async fn handle_count(args: CountArgs, session: &Session, output: &OutputManager) -> Result<()> {
    check_location(output, &args.state, None);

    let criteria = args.criteria.build()?;
    let additional = args.criteria.additional().await?;
    let request = SearchRequest::count(&criteria, &args.city, &args.state, additional.as_deref())?;

    if args.criteria.dry_run {
        return output.json(&request);
    }

    let client = session.client()?;
    output.verbose(&format!("POST {}", client.endpoint_url(batchscope::Endpoint::PropertySearch)));
    let CountOutcome {
        results_found,
        quicklist_counts,
    } = session.submit(output, "Counting properties", client.count(&request)).await?;

    output.display(&CountView {
        query: format!("{}, {}", args.city.trim(), args.state.trim()),
        results_found,
        quicklist_counts,
    })
}
