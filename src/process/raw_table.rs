use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::{collections::BTreeSet, fs, io::Cursor, path::Path};
use tracing::{debug, instrument};

/// An all-text table loaded from one CSV fragment.
///
/// Missing values are empty strings; every row holds exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column names in file order, unique.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_set(&self) -> BTreeSet<&str> {
        self.headers.iter().map(String::as_str).collect()
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Overwrite `name` in place if it exists, otherwise append it as the last column.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    pub fn set_constant_column(&mut self, name: &str, value: &str) {
        let values = vec![value.to_string(); self.rows.len()];
        self.set_column(name, values);
    }

    /// Remove a column; returns whether it was present.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.headers.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }

    /// Copy `from` into `to` and drop `from`. No-op when `from` is absent.
    pub fn move_column(&mut self, from: &str, to: &str) -> bool {
        let Some(values) = self
            .column(from)
            .map(|v| v.into_iter().map(str::to_string).collect::<Vec<String>>())
        else {
            return false;
        };
        self.set_column(to, values);
        self.drop_column(from)
    }

    /// Append the rows of `other`, aligning its columns by name to `self.headers`.
    /// Both tables must carry the same column set.
    pub fn append(&mut self, other: RawTable) -> Result<()> {
        let order: Vec<usize> = self
            .headers
            .iter()
            .map(|h| other.column_index(h))
            .collect::<Option<_>>()
            .context("appending a table with a different column set")?;
        if other.headers.len() != self.headers.len() {
            bail!("appending a table with a different column set");
        }

        self.rows.reserve(other.rows.len());
        for mut row in other.rows {
            let aligned = order
                .iter()
                .map(|&i| std::mem::take(&mut row[i]))
                .collect();
            self.rows.push(aligned);
        }
        Ok(())
    }
}

/// Decode ISO-8859-1: every byte is the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Make header names unique the way spreadsheet tools do: `a, a` → `a, a.1`.
fn dedup_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for name in raw {
        let mut candidate = name.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", name, n);
            n += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Parse `;`-delimited Latin-1 CSV text with a header row. Every value stays text.
///
/// Short rows are padded with empty cells; rows with more fields than the header are an error.
pub fn parse_latin1_csv(bytes: &[u8], source: &str) -> Result<RawTable> {
    let text = decode_latin1(bytes);
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(text.as_bytes()));

    let raw_headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header of {}", source))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if raw_headers.is_empty() || raw_headers.iter().all(|h| h.is_empty()) {
        bail!("{}: no columns to parse", source);
    }
    let headers = dedup_headers(raw_headers);
    let width = headers.len();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error in {} at record {}", source, idx))?;
        if record.len() > width {
            bail!(
                "{}: record {} has {} fields, header has {}",
                source,
                idx,
                record.len(),
                width
            );
        }
        let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Load one regulator CSV file from disk.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_latin1_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {:?}", path))?;
    let table = parse_latin1_csv(&bytes, &path.display().to_string())?;
    debug!(rows = table.len(), cols = table.headers.len(), "loaded");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[Vec<&str>]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn parses_latin1_semicolon_csv_as_text() -> Result<()> {
        // "Gestão" and "Área" encoded in ISO-8859-1
        let mut bytes = b"CNPJ_Fundo_Classe;Nome;Valor\n00.000.000/0001-91;Gest".to_vec();
        bytes.push(0xE3);
        bytes.extend_from_slice(b"o;0012,50\n11.111.111/0001-11;\"");
        bytes.push(0xC1);
        bytes.extend_from_slice(b"rea; norte\";\n");

        let t = parse_latin1_csv(&bytes, "mem")?;
        assert_eq!(t.headers, vec!["CNPJ_Fundo_Classe", "Nome", "Valor"]);
        assert_eq!(t.rows[0], vec!["00.000.000/0001-91", "Gestão", "0012,50"]);
        assert_eq!(t.rows[1], vec!["11.111.111/0001-11", "Área; norte", ""]);
        Ok(())
    }

    #[test]
    fn pads_short_rows_and_rejects_long_ones() -> Result<()> {
        let t = parse_latin1_csv(b"a;b;c\n1\n", "mem")?;
        assert_eq!(t.rows, vec![vec!["1".to_string(), String::new(), String::new()]]);

        assert!(parse_latin1_csv(b"a;b\n1;2;3\n", "mem").is_err());
        Ok(())
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse_latin1_csv(b"", "mem").is_err());
    }

    #[test]
    fn duplicate_headers_get_suffixes() -> Result<()> {
        let t = parse_latin1_csv(b"a;a;b;a\n1;2;3;4\n", "mem")?;
        assert_eq!(t.headers, vec!["a", "a.1", "b", "a.2"]);
        Ok(())
    }

    #[test]
    fn move_column_appends_when_target_missing() {
        let mut t = table(&["CNPJ_Fundo", "Area"], &[vec!["1", "10 m"]]);
        assert!(t.move_column("CNPJ_Fundo", "CNPJ_Fundo_Classe"));
        assert_eq!(t.headers, vec!["Area", "CNPJ_Fundo_Classe"]);
        assert_eq!(t.rows[0], vec!["10 m", "1"]);
        assert!(!t.move_column("CNPJ_Fundo", "CNPJ_Fundo_Classe"));
    }

    #[test]
    fn move_column_overwrites_existing_target() {
        let mut t = table(&["CNPJ_Fundo_Classe", "CNPJ_Fundo"], &[vec!["old", "new"]]);
        t.move_column("CNPJ_Fundo", "CNPJ_Fundo_Classe");
        assert_eq!(t.headers, vec!["CNPJ_Fundo_Classe"]);
        assert_eq!(t.rows[0], vec!["new"]);
    }

    #[test]
    fn append_aligns_by_column_name() -> Result<()> {
        let mut a = table(&["x", "y"], &[vec!["1", "2"]]);
        let b = table(&["y", "x"], &[vec!["20", "10"], vec!["40", "30"]]);
        a.append(b)?;
        assert_eq!(a.len(), 3);
        assert_eq!(a.rows[1], vec!["10", "20"]);
        assert_eq!(a.rows[2], vec!["30", "40"]);

        let c = table(&["x", "z"], &[vec!["1", "2"]]);
        assert!(a.append(c).is_err());
        assert_eq!(a.len(), 3);
        Ok(())
    }

    #[test]
    fn loads_from_disk() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("doc_ativo_2023.csv");
        fs::write(&path, b"a;b\r\n1;2\r\n3;4\r\n")?;
        let t = load_latin1_csv(&path)?;
        assert_eq!(t.len(), 2);
        assert_eq!(t.column("b"), Some(vec!["2", "4"]));
        Ok(())
    }
}
