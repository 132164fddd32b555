use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::Value;

use batchscope::SearchCriteria;
use batchscope::types::{Address, ComparableOptions, DistanceUnit, RangeDelta, SearchRequest};

use super::list::PageView;
use super::{CriteriaArgs, Session, check_location};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Comparables",
        commands: &[
            "batchscope comps --street '2800 N 24th St' --city Phoenix --state AZ --zip 85008",
            "batchscope comps --street '2800 N 24th St' --city Phoenix --state AZ --zip 85008 --distance 0.5",
        ],
    },
    ExampleGroup {
        title: "Deltas and Sold Filters",
        commands: &[
            "batchscope comps ... --min-bedrooms -1 --max-bedrooms 1 --min-year-built -10 --max-year-built 10",
            "batchscope comps ... --or-status Sold --or-min-sold 2024-01-01 --no-agg-metrics",
        ],
    },
];

#[derive(Args, Debug)]
pub struct CompsArgs {
    /// Subject street address
    #[arg(long)]
    pub street: String,

    /// Subject city
    #[arg(long)]
    pub city: String,

    /// Subject two-letter state code
    #[arg(long)]
    pub state: String,

    /// Subject 5-digit ZIP code
    #[arg(long)]
    pub zip: String,

    /// Search radius around the subject
    #[arg(long)]
    pub distance: Option<f64>,

    /// Unit of --distance (miles, yards, feet, kilometers, meters)
    #[arg(long, default_value = "miles", value_parser = parse_distance_unit)]
    pub distance_unit: DistanceUnit,

    #[arg(long, allow_hyphen_values = true)]
    pub min_bedrooms: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub max_bedrooms: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub min_bathrooms: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub max_bathrooms: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub min_stories: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub max_stories: Option<f64>,
    /// Living area offset in percent
    #[arg(long, allow_hyphen_values = true)]
    pub min_area_percent: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub max_area_percent: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub min_year_built: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub max_year_built: Option<f64>,
    /// Lot size offset in percent
    #[arg(long, allow_hyphen_values = true)]
    pub min_lot_size_percent: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub max_lot_size_percent: Option<f64>,

    /// Skip the aggregate metrics of the comparables
    #[arg(long)]
    pub no_agg_metrics: bool,

    /// OR fragment: listing status (repeatable)
    #[arg(long = "or-status", value_name = "STATUS")]
    pub or_statuses: Vec<String>,

    /// OR fragment: sold on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub or_min_sold: Option<String>,

    /// OR fragment: sold on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub or_max_sold: Option<String>,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    #[command(flatten)]
    pub criteria: CriteriaArgs,
}

fn parse_distance_unit(raw: &str) -> Result<DistanceUnit, String> {
    raw.parse().map_err(|err: batchscope::ExplorerError| err.to_string())
}

fn delta(min: Option<f64>, max: Option<f64>) -> Option<RangeDelta> {
    (min.is_some() || max.is_some()).then(|| RangeDelta::new(min, max))
}

impl CompsArgs {
    fn subject(&self) -> Address {
        Address::new(&self.street, &self.city, &self.state, &self.zip)
    }

    fn comparable_options(&self) -> ComparableOptions {
        ComparableOptions {
            distance: self.distance.map(|value| (self.distance_unit, value)),
            bedrooms: delta(self.min_bedrooms, self.max_bedrooms),
            bathrooms: delta(self.min_bathrooms, self.max_bathrooms),
            stories: delta(self.min_stories, self.max_stories),
            area_percent: delta(self.min_area_percent, self.max_area_percent),
            year_built: delta(self.min_year_built, self.max_year_built),
            lot_size_percent: delta(self.min_lot_size_percent, self.max_lot_size_percent),
        }
    }

    fn criteria(&self) -> Result<SearchCriteria> {
        let mut criteria = self.criteria.build()?;
        let fragments = SearchCriteria::listing_or_sale_fragments(
            &self.or_statuses,
            self.or_min_sold.as_deref(),
            self.or_max_sold.as_deref(),
        )
        .context("Invalid sold filter")?;
        for fragment in fragments {
            criteria.push_or(fragment);
        }
        Ok(criteria)
    }
}

/// Aggregate metrics block, one row per metric
#[derive(Serialize)]
struct MetricsView<'a>(&'a Value);

impl TableDisplay for MetricsView<'_> {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Metric", "Value"]);
        let rows = metric_rows(self.0);
        for (name, value) in rows {
            table.add_row(vec![Cell::new(name), Cell::new(value)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        metric_rows(self.0)
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Flatten nested metric objects into dotted names
fn metric_rows(metrics: &Value) -> Vec<(String, String)> {
    fn walk(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let name = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                    walk(&name, child, rows);
                }
            }
            Value::String(text) => rows.push((prefix.to_string(), text.clone())),
            other => rows.push((prefix.to_string(), other.to_string())),
        }
    }

    let mut rows = Vec::new();
    walk("", metrics, &mut rows);
    rows
}

pub async fn handle_comps(args: CompsArgs, session: &Session, output: &OutputManager) -> Result<()> {
    check_location(output, &args.state, Some(&args.zip));

    let subject = args.subject();
    let criteria = args.criteria()?;
    let additional = args.criteria.additional().await?;
    let request = SearchRequest::comparables(
        &criteria,
        &subject,
        args.comparable_options(),
        !args.no_agg_metrics,
        args.page,
        session.context.page_size(),
        additional.as_deref(),
    )?;

    if args.criteria.dry_run {
        return output.json(&request);
    }

    let client = session.client()?;
    let page = session
        .submit(output, &format!("Finding comparables for {subject}"), client.list(&request))
        .await?;
    let view = PageView::from(page);

    if output.is_json() {
        return output.display(&view);
    }

    output.key_value("Subject", &subject.to_string());

    if let Some(metrics) = view.agg_comparables_metrics.as_ref().filter(|metrics| !metrics.is_null()) {
        output.heading("Comparables Metrics");
        output.display(&MetricsView(metrics))?;
    }

    if view.properties.is_empty() {
        output.info("No comparable properties found");
        return Ok(());
    }

    output.heading(&format!("Comparables for {subject}"));
    output.display(&view)?;
    output.info(&view.position());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        comps: CompsArgs,
    }

    fn parse(extra: &[&str]) -> CompsArgs {
        let mut argv = vec![
            "comps", "--street", "1 Main St", "--city", "Phoenix", "--state", "AZ", "--zip", "85001",
        ];
        argv.extend_from_slice(extra);
        Harness::parse_from(argv).comps
    }

    #[test]
    fn deltas_only_enable_given_attributes() {
        let args = parse(&["--min-bedrooms", "-1", "--distance", "2", "--distance-unit", "kilometers"]);
        assert!(args.distance.is_some());
        let args = parse(&["--min-bedrooms", "-1", "--max-year-built", "10"]);
        let options = args.comparable_options();
        assert_eq!(options.bedrooms, Some(RangeDelta::new(Some(-1.0), None)));
        assert_eq!(options.year_built, Some(RangeDelta::new(None, Some(10.0))));
        assert!(options.bathrooms.is_none());
        assert!(options.distance.is_none());
    }

    #[test]
    fn sold_fragments_become_or_entries() {
        let args = parse(&["--or-status", "Sold", "--or-min-sold", "2024-01-01", "--all-property-types"]);
        let criteria = args.criteria().unwrap();
        assert_eq!(criteria.or.len(), 2);
    }

    #[test]
    fn metrics_are_flattened() {
        let rows = metric_rows(&json!({"price": {"avg": 410000, "median": "405000"}, "count": 12}));
        assert!(rows.contains(&("price.avg".to_string(), "410000".to_string())));
        assert!(rows.contains(&("price.median".to_string(), "405000".to_string())));
        assert!(rows.contains(&("count".to_string(), "12".to_string())));
    }
}
