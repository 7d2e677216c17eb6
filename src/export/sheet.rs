use std::collections::HashSet;

/// Excel's sheet name length limit, in characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Make a single dataset key acceptable as a sheet name.
pub fn sanitize_sheet_name(key: &str) -> String {
    let replaced: String = key
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches('\'');
    let mut name: String = trimmed.chars().take(MAX_SHEET_NAME_LEN).collect();
    // truncation may expose a trailing quote
    while name.ends_with('\'') {
        name.pop();
    }
    if name.is_empty() {
        name = "Sheet".to_string();
    }
    if name.eq_ignore_ascii_case("history") {
        name.push('_');
    }
    name
}

/// Sheet names for `keys`, in the same order. Names are sanitized and then
/// disambiguated (case-insensitively) with a `~N` suffix, so the result only
/// depends on the sequence of keys.
pub fn assign_sheet_names<'a, I>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::new();

    for key in keys {
        let base = sanitize_sheet_name(key);
        let mut name = base.clone();
        let mut n = 2;
        while taken.contains(&name.to_lowercase()) {
            let suffix = format!("~{}", n);
            let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
            name = base.chars().take(keep).collect::<String>() + &suffix;
            n += 1;
        }
        taken.insert(name.to_lowercase());
        names.push(name);
    }
    names
}
