//! Schema command - print expected input and output formats

use crate::records::RecordRow;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: csv-header, csv-fields or json-schema
    #[arg(value_enum, default_value = "csv-fields")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// CSV header row expected on import
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
    /// JSON Schema of an exported row, derived columns optional
    JsonSchema,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::CsvHeader => {
                println!("{}", RecordRow::csv_header(false).join(","));
            }
            SchemaFormat::CsvFields => print_csv_fields(),
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(RecordRow<'static>);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
        }
        Ok(())
    }
}

fn print_csv_fields() {
    println!("CSV Input Format");
    println!("================");
    println!();
    for field in RecordRow::csv_schema() {
        let req = if field.required { "import" } else { "export" };
        println!("{:16} ({:6})  {}", field.name, req, field.description);
    }
    println!();
    println!("The first line is a header and is skipped. Rows with fewer than eight");
    println!("fields are ignored. Profit and Valid are only written by `list --csv`.");
}
