use std::{cmp::Reverse, collections::HashSet, path::Path};

use crate::error::UnifyError;
use crate::process::{
    date_parser::{format_iso, parse_reference_date},
    raw_table::RawTable,
};

pub const REFERENCE_DATE: &str = "Data_Referencia";
pub const REGISTRANT_ID: &str = "CNPJ_Fundo_Classe";
pub const REGISTRANT_NAME: &str = "Nome_Fundo_Classe";
pub const REGISTRANT_TYPE: &str = "Tipo_Fundo_Classe";
pub const DEFAULT_REGISTRANT_TYPE: &str = "Fundo";

/// Legacy identity columns and the canonical names they map to.
pub const LEGACY_IDENTITY_COLUMNS: &[(&str, &str)] = &[
    ("CNPJ_Fundo", REGISTRANT_ID),
    ("Nome_Fundo", REGISTRANT_NAME),
];

/// Reduce a full snapshot to one row per registrant: the row with the latest
/// `Data_Referencia`, dates rewritten as `YYYY-MM-DD`.
///
/// Rows with an empty date rank after every dated row; ties keep file order.
pub fn keep_latest_per_registrant(table: &mut RawTable, path: &Path) -> Result<(), UnifyError> {
    let missing = |column: &str| UnifyError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    };
    let date_idx = table
        .column_index(REFERENCE_DATE)
        .ok_or_else(|| missing(REFERENCE_DATE))?;
    let id_idx = table
        .column_index(REGISTRANT_ID)
        .ok_or_else(|| missing(REGISTRANT_ID))?;

    let mut dated = Vec::with_capacity(table.rows.len());
    for (row_no, row) in std::mem::take(&mut table.rows).into_iter().enumerate() {
        let date = parse_reference_date(&row[date_idx]).map_err(|_| UnifyError::BadDate {
            path: path.to_path_buf(),
            column: REFERENCE_DATE.to_string(),
            value: row[date_idx].clone(),
            row: row_no,
        })?;
        dated.push((date, row));
    }

    // stable: equal dates keep their file order
    dated.sort_by_key(|(date, _)| Reverse(*date));

    let mut seen = HashSet::new();
    table.rows = dated
        .into_iter()
        .filter(|(_, row)| seen.insert(row[id_idx].clone()))
        .map(|(date, mut row)| {
            row[date_idx] = format_iso(date);
            row
        })
        .collect();
    Ok(())
}

/// Bring identity columns to their canonical `_Classe` names and fill in the
/// registrant type where a fragment predates it.
pub fn normalize_identity_columns(table: &mut RawTable) {
    for (legacy, canonical) in LEGACY_IDENTITY_COLUMNS {
        table.move_column(legacy, canonical);
    }
    if !table.has_column(REGISTRANT_TYPE) {
        table.set_constant_column(REGISTRANT_TYPE, DEFAULT_REGISTRANT_TYPE);
    }
}

/// Fail unless `incoming` carries exactly the columns of `existing`, in any order.
pub fn ensure_same_columns(
    existing: &RawTable,
    incoming: &RawTable,
    path: &Path,
) -> Result<(), UnifyError> {
    let expected = existing.column_set();
    let got = incoming.column_set();
    if expected == got {
        return Ok(());
    }
    Err(UnifyError::SchemaMismatch {
        path: path.to_path_buf(),
        expected: existing.headers.clone(),
        got: incoming.headers.clone(),
        missing: expected.difference(&got).map(|s| s.to_string()).collect(),
        unexpected: got.difference(&expected).map(|s| s.to_string()).collect(),
    })
}
