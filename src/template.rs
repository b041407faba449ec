//! Import template generation
//!
//! A starter file with the expected header and one example row per scope.

use crate::error::{CarbonImportError, Result};
use carbon_import_common::CategoryRegistry;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

pub const TEMPLATE_HEADER: [&str; 5] = ["Date", "Category", "Amount", "Unit", "Description"];

const EXAMPLE_ROWS: [[&str; 5]; 2] = [
    ["2024-01-15", "grid_electricity", "1500", "kWh", "Office electricity, January"],
    ["2024-01-20", "gas_diesel_oil", "200", "litre", "Backup generator"],
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TemplateFormat {
    #[default]
    Csv,
    Xlsx,
}

impl TemplateFormat {
    /// Format implied by the output file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        ext.parse().ok()
    }
}

impl std::str::FromStr for TemplateFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(TemplateFormat::Csv),
            "xlsx" | "excel" => Ok(TemplateFormat::Xlsx),
            _ => Err(format!("Unknown format: {}. Use csv or xlsx", s)),
        }
    }
}

impl std::fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateFormat::Csv => write!(f, "csv"),
            TemplateFormat::Xlsx => write!(f, "xlsx"),
        }
    }
}

pub fn write_template(path: &Path, format: TemplateFormat, registry: &CategoryRegistry) -> Result<()> {
    match format {
        TemplateFormat::Csv => write_csv_template(path),
        TemplateFormat::Xlsx => write_xlsx_template(path, registry)
            .map_err(|e| CarbonImportError::TemplateGeneration(e.to_string())),
    }
}

fn write_csv_template(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(TEMPLATE_HEADER)?;
    for row in EXAMPLE_ROWS {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_xlsx_template(path: &Path, registry: &CategoryRegistry) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Records")?;
    for (col, title) in TEMPLATE_HEADER.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }
    for (i, row) in EXAMPLE_ROWS.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, row[0])?;
        sheet.write_string(r, 1, row[1])?;
        // amounts as numbers so Excel users keep typing numbers
        match row[2].parse::<f64>() {
            Ok(amount) => sheet.write_number(r, 2, amount)?,
            Err(_) => sheet.write_string(r, 2, row[2])?,
        };
        sheet.write_string(r, 3, row[3])?;
        sheet.write_string(r, 4, row[4])?;
    }
    sheet.set_column_width(0, 12)?;
    sheet.set_column_width(1, 28)?;
    sheet.set_column_width(4, 36)?;

    let categories = workbook.add_worksheet();
    categories.set_name("Categories")?;
    for (col, title) in ["Category", "Name", "Unit", "Scope", "Group"].iter().enumerate() {
        categories.write_string_with_format(0, col as u16, *title, &bold)?;
    }
    for (i, def) in registry.iter().enumerate() {
        let r = (i + 1) as u32;
        categories.write_string(r, 0, &def.key)?;
        categories.write_string(r, 1, &def.name)?;
        categories.write_string(r, 2, &def.unit)?;
        categories.write_number(r, 3, def.scope.number() as f64)?;
        categories.write_string(r, 4, &def.group)?;
    }
    categories.set_column_width(0, 32)?;
    categories.set_column_width(1, 40)?;
    categories.set_column_width(4, 28)?;

    workbook.save(path)?;
    Ok(())
}
