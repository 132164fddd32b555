use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::Value;

use batchscope::types::{Address, SkipTraceOutcome, SkipTraceRequest};

use super::{Session, address_line, check_location, text_at};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Skip Trace",
    commands: &[
        "batchscope skip-trace --street '2800 N 24th St' --state AZ                # City and zip are optional",
        "batchscope skip-trace --street '2800 N 24th St' --city Phoenix --state AZ --zip 85008",
        "batchscope skip-trace --apn 119-20-012 --state AZ --county Maricopa",
    ],
}];

#[derive(Args, Debug)]
pub struct SkipTraceArgs {
    /// Street address of the property
    #[arg(long, conflicts_with = "apn")]
    pub street: Option<String>,

    /// City (optional)
    #[arg(long, conflicts_with = "apn")]
    pub city: Option<String>,

    /// 5-digit ZIP code (optional)
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

impl SkipTraceArgs {
    fn request(&self) -> Result<SkipTraceRequest> {
        let request = match &self.apn {
            Some(apn) => SkipTraceRequest::by_apn(apn, &self.state, self.county.as_deref().unwrap_or_default())?,
            None => SkipTraceRequest::by_address(Address::new(
                self.street.as_deref().unwrap_or_default(),
                self.city.as_deref().unwrap_or_default(),
                &self.state,
                self.zip.as_deref().unwrap_or_default(),
            ))?,
        };
        Ok(request)
    }
}

#[derive(Serialize)]
struct PersonView {
    person: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Value>,
}

impl PersonView {
    /// Full name, falling back to "first last"
    fn name(&self) -> String {
        let full = text_at(&self.person, "/name/full");
        if full != "-" {
            return full;
        }
        let joined = ["/name/first", "/name/last"]
            .iter()
            .map(|pointer| text_at(&self.person, pointer))
            .filter(|part| part != "-")
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() { "-".to_string() } else { joined }
    }

    fn litigator(&self) -> bool {
        self.person.get("litigator").and_then(Value::as_bool).unwrap_or(false)
    }

    fn entries(&self, key: &str) -> &[Value] {
        self.person
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn phone_line(phone: &Value) -> String {
        let mut line = text_at(phone, "/number");
        let kind = text_at(phone, "/type");
        if kind != "-" {
            line.push_str(&format!(" ({kind})"));
        }
        if phone.get("dnc").and_then(Value::as_bool) == Some(true) {
            line.push_str(" DNC");
        }
        line
    }
}

impl TableDisplay for PersonView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Field", "Value"]);
        table.add_row(vec![Cell::new("Name"), Cell::new(self.name())]);
        table.add_row(vec![
            Cell::new("TCPA Litigator"),
            output.alert_cell(if self.litigator() { "yes" } else { "no" }, self.litigator()),
        ]);
        for (label, pointer) in [
            ("On DNC List", "/dnc/tcpa"),
            ("Deceased", "/death/deceased"),
            ("Bankruptcy", "/bankruptcy/bankrupt"),
        ] {
            let value = text_at(&self.person, pointer);
            let raised = value == "yes";
            table.add_row(vec![Cell::new(label), output.alert_cell(value, raised)]);
        }
        for phone in self.entries("phoneNumbers") {
            table.add_row(vec![Cell::new("Phone"), Cell::new(Self::phone_line(phone))]);
        }
        for email in self.entries("emails") {
            table.add_row(vec![Cell::new("Email"), Cell::new(text_at(email, "/address"))]);
        }
        table.add_row(vec![
            Cell::new("Property Address"),
            Cell::new(address_line(&self.person, "/propertyAddress")),
        ]);
        table.add_row(vec![
            Cell::new("Mailing Address"),
            Cell::new(address_line(&self.person, "/mailingAddress")),
        ]);
        table
    }

    fn to_compact(&self) -> String {
        let phones: Vec<String> = self.entries("phoneNumbers").iter().map(|p| text_at(p, "/number")).collect();
        format!("{} phones={}", self.name(), phones.join(","))
    }
}

pub async fn handle_skip_trace(args: SkipTraceArgs, session: &Session, output: &OutputManager) -> Result<()> {
    check_location(output, &args.state, args.zip.as_deref());

    let request = args.request()?;
    if args.dry_run {
        return output.json(&request);
    }

    let client = session.client()?;
    match session.submit(output, "Running skip trace", client.skip_trace(&request)).await? {
        SkipTraceOutcome::Match { person, meta } => {
            let view = PersonView { person, meta };
            if !output.is_json() {
                output.success("Match found");
            }
            output.display(&view)?;
            if view.litigator() {
                output.warning("Known TCPA litigator: phone numbers are withheld");
            }
            Ok(())
        }
        SkipTraceOutcome::NoMatch { meta } => {
            if output.is_json() {
                output.json(&serde_json::json!({ "match": false, "meta": meta }))
            } else {
                output.warning("No match found for this property");
                Ok(())
            }
        }
    }
}
