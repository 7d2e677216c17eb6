/// Marker distinguishing full registrant snapshots from incremental detail files.
pub const SNAPSHOT_MARKER: &str = "geral";

/// The trailing token of a file name, URL or directory name:
/// last `/` segment, then last `_` segment, cut at the first `.`.
///
/// `https://host/inf_trimestral_fii_2023.zip` → `2023`
pub fn year_token(name: &str) -> &str {
    let base = name.rsplit('/').next().unwrap_or(name);
    let last = base.rsplit('_').next().unwrap_or(base);
    last.split('.').next().unwrap_or(last)
}

/// `Some(year)` when the token is made only of ASCII digits.
pub fn parse_year(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Logical dataset name shared by the yearly fragments of one table:
/// drop the last `_` segment and join the rest with spaces.
///
/// `inf_trimestral_fii_geral_2023.csv` → `inf trimestral fii geral`
pub fn dataset_key(file_name: &str) -> String {
    let parts: Vec<&str> = file_name.split('_').collect();
    parts[..parts.len() - 1].join(" ")
}

/// Highest year among `names`, or 0 when none carries a numeric trailing token.
pub fn max_year<'a, I>(names: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter_map(|n| parse_year(year_token(n)))
        .max()
        .unwrap_or(0)
}

pub fn is_snapshot(file_name: &str) -> bool {
    file_name.contains(SNAPSHOT_MARKER)
}
