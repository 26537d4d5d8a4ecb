//! Output formatting shared by every subcommand: `raw` (bytes/CID straight
//! to stdout), `json` (one `serde_json::Value` per line), and `human`
//! (a `comfy_table` grid), matching the `--output` flag spec.md's CLI
//! section describes per command.

use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;
use serde_json::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Raw,
    Json,
    Human,
}

pub fn print_value(format: OutputFormat, value: &impl Serialize) -> anyhow::Result<()> {
    let json = serde_json::to_value(value)?;
    match format {
        OutputFormat::Raw | OutputFormat::Json => {
            println!("{}", serde_json::to_string(&json)?);
        }
        OutputFormat::Human => print_object_table(&json),
    }
    Ok(())
}

pub fn print_rows(format: OutputFormat, rows: &[impl Serialize]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Raw | OutputFormat::Json => {
            for row in rows {
                println!("{}", serde_json::to_string(row)?);
            }
        }
        OutputFormat::Human => {
            let values: Vec<Value> = rows.iter().map(serde_json::to_value).collect::<Result<_, _>>()?;
            print_row_table(&values);
        }
    }
    Ok(())
}

fn print_object_table(value: &Value) {
    let Value::Object(map) = value else {
        println!("{value}");
        return;
    };
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["field", "value"]);
    for (key, val) in map {
        table.add_row(vec![key.clone(), scalar_to_string(val)]);
    }
    println!("{table}");
}

fn print_row_table(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            println!("{row}");
        }
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(headers.clone());
    for row in rows {
        if let Value::Object(map) = row {
            let cells: Vec<String> = headers.iter().map(|h| map.get(h).map(scalar_to_string).unwrap_or_default()).collect();
            table.add_row(cells);
        }
    }
    println!("{table}");
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
