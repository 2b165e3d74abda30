use iam_id_resolver_core::{Outcome, Resolution};
use std::io::{self, Write};

/// Quote a field that would otherwise split the CSV line
fn csv_field(field: &str) -> String {
    if field.contains(',') {
        format!("\"{field}\"")
    } else {
        field.to_string()
    }
}

/// Format one result line: `<id>,<result>`
pub(crate) fn format_resolution(resolution: &Resolution) -> String {
    format!("{},{}", csv_field(&resolution.id), resolution.outcome)
}

pub(crate) fn print_resolution(resolution: &Resolution) {
    let _ = writeln!(io::stdout(), "{}", format_resolution(resolution));
}

pub(crate) fn print_skipped(lines: &[String]) {
    let stdout = io::stdout();
    let mut w = stdout.lock();
    for line in lines {
        let skipped = Resolution::new(line.clone(), Outcome::Skipped);
        let _ = writeln!(w, "{}", format_resolution(&skipped));
    }
}
