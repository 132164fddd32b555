use crate::commands::{comps, count, filters, list, lookup, skip_trace};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "count",
            groups: count::EXAMPLES,
        },
        CommandExample {
            name: "list",
            groups: list::EXAMPLES,
        },
        CommandExample {
            name: "comps",
            groups: comps::EXAMPLES,
        },
        CommandExample {
            name: "lookup",
            groups: lookup::EXAMPLES,
        },
        CommandExample {
            name: "skip-trace",
            groups: skip_trace::EXAMPLES,
        },
        CommandExample {
            name: "filters",
            groups: filters::EXAMPLES,
        },
    ]
}
