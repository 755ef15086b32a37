use std::{
    collections::HashSet,
    fs::File,
    path::{
        Path,
        PathBuf,
    },
    sync::OnceLock,
};

use regex::Regex;

use crate::core::DeckError;

#[derive(Debug)]
pub struct MergeSummary {
    pub written: usize,
    pub output_path: PathBuf,
}

/// Strips `[[...]]` markup (keeping the inner text) and all ASCII
/// punctuation, so the same word exported by different tools compares equal.
pub fn clean_text(text: &str) -> String {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    let re = MARKUP.get_or_init(|| Regex::new(r"\[\[(.*?)\]\]").unwrap());

    re.replace_all(text, "$1").chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

/// Merges two exported word lists: rows from the semicolon-delimited
/// `secondary` file whose cleaned key appears neither earlier in that file
/// nor anywhere in the comma-delimited `primary` file are written to
/// `output` as comma-delimited key/value rows.
pub fn merge_word_lists(
    primary: &Path,
    secondary: &Path,
    output: &Path,
) -> Result<MergeSummary, DeckError> {
    let existing = read_primary_keys(primary)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b';')
        .flexible(true)
        .from_reader(File::open(secondary)?);

    let mut writer = csv::Writer::from_writer(File::create(output)?);
    let mut seen: HashSet<String> = HashSet::new();
    let mut written = 0;

    for record in reader.records() {
        let record = record?;
        let key = match record.get(0) {
            Some(raw) if !raw.trim().is_empty() => clean_text(raw.trim()),
            _ => continue,
        };
        if seen.contains(&key) || existing.contains(&key) {
            continue;
        }
        let value = record.get(1).map(|v| clean_text(v.trim())).unwrap_or_default();
        writer.write_record([key.as_str(), value.as_str()])?;
        seen.insert(key);
        written += 1;
    }
    writer.flush()?;

    Ok(MergeSummary { written, output_path: output.to_path_buf() })
}

fn read_primary_keys(path: &Path) -> Result<HashSet<String>, DeckError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(File::open(path)?);

    let mut keys = HashSet::new();
    for record in reader.records() {
        let record = record?;
        if let Some(raw) = record.get(0) {
            let key: String =
                raw.trim().chars().filter(|c| !c.is_ascii_punctuation()).collect();
            keys.insert(key);
        }
    }
    Ok(keys)
}
