use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};
use serde::Serialize;

use batchscope::registry::codes::QUICKLISTS;
use batchscope::registry::{CategorySpec, CriteriaGroup, quicklist_label};
use batchscope::search::{ActiveFilter, Operator};

use super::CriteriaArgs;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Catalog",
        commands: &[
            "batchscope filters groups                     # Every criteria group",
            "batchscope filters list building              # Categories of one group",
            "batchscope filters options building.pool      # Codes accepted by inList",
            "batchscope filters quicklists                 # Published quicklist tags",
        ],
    },
    ExampleGroup {
        title: "Preview",
        commands: &[
            "batchscope filters show -f building.yearBuilt:min:2000 -f owner.ownerOccupied:equals:false",
        ],
    },
];

#[derive(Subcommand)]
pub enum FiltersCommands {
    /// List every criteria group
    #[command(name = "groups")]
    Groups,

    /// List the categories of a group, or of every group
    #[command(name = "list")]
    List {
        /// Criteria group (optional, lists all if omitted)
        group: Option<String>,
    },

    /// Show the codes a multi-select category accepts
    #[command(name = "options")]
    Options {
        /// Category as group.category
        category: String,
    },

    /// List the published quicklist tags
    #[command(name = "quicklists")]
    Quicklists,

    /// Summarize the filters a set of flags produces
    #[command(name = "show")]
    Show(CriteriaArgs),
}

#[derive(Serialize)]
struct GroupRow {
    group: &'static str,
    label: &'static str,
    categories: usize,
}

#[derive(Serialize)]
struct GroupsView(Vec<GroupRow>);

impl TableDisplay for GroupsView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Group", "Label", "Categories"]);
        for row in &self.0 {
            table.add_row(vec![
                Cell::new(row.group),
                Cell::new(row.label),
                Cell::new(row.categories.to_string()),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0.iter().map(|row| row.group).collect::<Vec<_>>().join(" ")
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryRow {
    group: &'static str,
    category: &'static str,
    label: &'static str,
    kind: &'static str,
    operators: Vec<&'static str>,
}

impl CategoryRow {
    fn new(group: CriteriaGroup, spec: &CategorySpec) -> Self {
        Self {
            group: group.as_str(),
            category: spec.name,
            label: spec.label,
            kind: spec.kind.name(),
            operators: Operator::ALL
                .into_iter()
                .filter(|operator| spec.kind.accepts(*operator))
                .map(Operator::as_str)
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct CategoriesView(Vec<CategoryRow>);

impl TableDisplay for CategoriesView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Filter", "Label", "Kind", "Operators"]);
        for row in &self.0 {
            table.add_row(vec![
                Cell::new(format!("{}.{}", row.group, row.category)),
                Cell::new(row.label),
                Cell::new(row.kind),
                Cell::new(row.operators.join(", ")),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|row| format!("{}.{}", row.group, row.category))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Serialize)]
struct OptionsView {
    category: String,
    options: &'static [&'static str],
}

impl TableDisplay for OptionsView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &[self.category.as_str()]);
        for option in self.options {
            table.add_row(vec![Cell::new(option)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.options.join("|")
    }
}

#[derive(Serialize)]
struct QuicklistRow {
    tag: &'static str,
    label: String,
}

#[derive(Serialize)]
struct QuicklistsView(Vec<QuicklistRow>);

impl TableDisplay for QuicklistsView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Tag", "Label"]);
        for row in &self.0 {
            table.add_row(vec![Cell::new(row.tag), Cell::new(&row.label)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0.iter().map(|row| row.tag).collect::<Vec<_>>().join(" ")
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveRow {
    filter: String,
    label: &'static str,
    summary: String,
}

impl From<ActiveFilter> for ActiveRow {
    fn from(active: ActiveFilter) -> Self {
        Self {
            filter: format!("{}.{}", active.group, active.category),
            label: active.label,
            summary: active.summary,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveView {
    filters: Vec<ActiveRow>,
    quick_lists: Vec<String>,
    or_quick_lists: Vec<String>,
    or_fragments: usize,
}

impl TableDisplay for ActiveView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Filter", "Label", "Condition"]);
        for row in &self.filters {
            table.add_row(vec![Cell::new(&row.filter), Cell::new(row.label), Cell::new(&row.summary)]);
        }
        if !self.quick_lists.is_empty() {
            table.add_row(vec![
                Cell::new("quickLists"),
                Cell::new("All of"),
                Cell::new(self.quick_lists.join(", ")),
            ]);
        }
        if !self.or_quick_lists.is_empty() {
            table.add_row(vec![
                Cell::new("orQuickLists"),
                Cell::new("Any of"),
                Cell::new(self.or_quick_lists.join(", ")),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.filters
            .iter()
            .map(|row| format!("{} {}", row.filter, row.summary))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn parse_category(raw: &str) -> Result<(CriteriaGroup, &'static CategorySpec)> {
    let (group, category) = raw
        .split_once('.')
        .with_context(|| format!("Expected group.category, got '{raw}'"))?;
    let group: CriteriaGroup = group.parse()?;
    let spec = group.require_category(category)?;
    Ok((group, spec))
}

pub async fn handle_filters_commands(command: FiltersCommands, output: &OutputManager) -> Result<()> {
    match command {
        FiltersCommands::Groups => {
            let rows = CriteriaGroup::ALL
                .into_iter()
                .map(|group| GroupRow {
                    group: group.as_str(),
                    label: group.label(),
                    categories: group.categories().len(),
                })
                .collect();
            output.display(&GroupsView(rows))
        }
        FiltersCommands::List { group } => {
            let groups = match group {
                Some(name) => vec![name.parse::<CriteriaGroup>()?],
                None => CriteriaGroup::ALL.to_vec(),
            };
            let rows = groups
                .into_iter()
                .flat_map(|group| group.categories().iter().map(move |spec| CategoryRow::new(group, spec)))
                .collect();
            output.display(&CategoriesView(rows))
        }
        FiltersCommands::Options { category } => {
            let (group, spec) = parse_category(&category)?;
            if spec.options.is_empty() {
                output.info(&format!(
                    "{group}.{} is a {} filter without a fixed code list",
                    spec.name,
                    spec.kind.name()
                ));
                return Ok(());
            }
            output.display(&OptionsView {
                category: format!("{group}.{}", spec.name),
                options: spec.options,
            })
        }
        FiltersCommands::Quicklists => {
            let rows = QUICKLISTS
                .iter()
                .copied()
                .map(|tag| QuicklistRow {
                    tag,
                    label: quicklist_label(tag),
                })
                .collect();
            output.display(&QuicklistsView(rows))
        }
        FiltersCommands::Show(args) => {
            let criteria = args.build()?;
            let view = ActiveView {
                filters: criteria.active_filters().into_iter().map(ActiveRow::from).collect(),
                quick_lists: criteria.quick_lists.clone(),
                or_quick_lists: criteria.or_quick_lists.clone(),
                or_fragments: criteria.or.len(),
            };
            if view.filters.is_empty() && view.quick_lists.is_empty() && view.or_quick_lists.is_empty() {
                output.info("No filters set");
            } else {
                output.display(&view)?;
            }
            if !criteria.or.is_empty() {
                output.heading("Or");
                for fragment in &criteria.or {
                    let summary: Vec<String> = fragment
                        .active_filters()
                        .into_iter()
                        .map(|active| format!("{}.{} {}", active.group, active.category, active.summary))
                        .collect();
                    output.bullet(&summary.join(" and "));
                }
            }
            Ok(())
        }
    }
}
