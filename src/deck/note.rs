use sha2::{
    Digest,
    Sha256,
};

use crate::{
    core::DeckSchema,
    media::ResolvedImage,
    sink::Note,
    store::VocabRecord,
};

/// Salt folded into every note guid. Changing it would re-key the whole deck
/// and duplicate every note on the next import, so it never changes.
const GUID_SALT: &str = "vocadeck-";

/// Deterministic note identity: a pure function of the record id, never of
/// field content. The sink dedups on this, so edits update notes in place.
pub fn note_guid(id: i64) -> String {
    let digest = Sha256::digest(format!("{GUID_SALT}{id}").as_bytes());
    format!("{digest:x}")[..16].to_string()
}

/// Ordered field values for one note: the configured text columns, empty
/// string for missing data, then the image field.
pub fn note_field_values(
    schema: &DeckSchema,
    record: &VocabRecord,
    resolved: &ResolvedImage,
) -> Vec<String> {
    let mut values: Vec<String> = Vec::with_capacity(schema.fields.len() + 1);
    for i in 0..schema.fields.len() {
        values.push(record.text(i).to_string());
    }
    values.push(match resolved {
        // Referenced by bare name: media files sit at the package root.
        ResolvedImage::Present { file_name, .. } => format!("<img src='{file_name}'>"),
        ResolvedImage::Absent => String::new(),
    });
    values
}

/// Builds one note from a record and its image resolution. Pure: the same
/// record and resolution always yield an identical note.
pub fn build_note(schema: &DeckSchema, record: &VocabRecord, resolved: &ResolvedImage) -> Note {
    Note { guid: note_guid(record.id), fields: note_field_values(schema, record, resolved) }
}
