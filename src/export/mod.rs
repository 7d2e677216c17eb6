// src/export/mod.rs

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

pub mod clean;
pub mod sheet;

use crate::process::{RawTable, UnifiedTables};
use clean::clean_cell;
use sheet::assign_sheet_names;

/// Write every unified table to its own sheet of `<output_dir>/<file_name>`.
///
/// Sheets follow key order. Each sheet has a header row and no index column;
/// non-empty cells are written as text after [`clean_cell`], empty cells stay blank.
#[instrument(level = "info", skip(tables, output_dir), fields(dir = %output_dir.as_ref().display(), sheets = tables.len()))]
pub fn write_workbook<P: AsRef<Path>>(
    tables: &UnifiedTables,
    output_dir: P,
    file_name: &str,
) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir).with_context(|| format!("creating {:?}", output_dir))?;
    let path = output_dir.join(file_name);

    let mut workbook = Workbook::new();
    let names = assign_sheet_names(tables.keys().map(String::as_str));
    for ((key, table), name) in tables.iter().zip(names) {
        write_sheet(&mut workbook, &name, table)
            .with_context(|| format!("writing sheet `{}` for dataset `{}`", name, key))?;
        info!(dataset = %key, sheet = %name, rows = table.len(), "[OK] sheet written");
    }

    workbook
        .save(&path)
        .with_context(|| format!("saving workbook {:?}", path))?;
    info!(path = %path.display(), "[OK] workbook saved");
    Ok(path)
}

fn write_sheet(workbook: &mut Workbook, name: &str, table: &RawTable) -> Result<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string(0, u16::try_from(col)?, header.as_str())?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        let excel_row = u32::try_from(r + 1)?;
        for (col, (header, value)) in table.headers.iter().zip(row).enumerate() {
            let cell = clean_cell(header, value);
            if cell.is_empty() {
                continue;
            }
            worksheet.write_string(excel_row, u16::try_from(col)?, cell)?;
        }
    }
    Ok(())
}
