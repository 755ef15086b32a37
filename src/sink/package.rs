use std::{
    fs::{
        self,
        File,
    },
    io::Write,
    path::{
        Path,
        PathBuf,
    },
    time::{
        SystemTime,
        UNIX_EPOCH,
    },
};

use rusqlite::Connection;
use serde_json::json;
use zip::{
    write::SimpleFileOptions,
    ZipWriter,
};

use crate::{
    core::DeckError,
    sink::{
        collection,
        Deck,
    },
};

/// One deck plus its media manifest, ready to serialize as a `.apkg`
/// archive: a zip holding the collection database, a numeric-name media map,
/// and the media files themselves.
pub struct Package {
    deck: Deck,
    media_files: Vec<PathBuf>,
}

impl Package {
    /// Validates the deck against its model before anything touches disk: a
    /// note with the wrong field count would silently corrupt the import.
    pub fn new(deck: Deck, media_files: Vec<PathBuf>) -> Result<Self, DeckError> {
        let expected = deck.model.fields.len();
        for note in &deck.notes {
            if note.fields.len() != expected {
                return Err(DeckError::Package(format!(
                    "note {} has {} fields, model '{}' defines {}",
                    note.guid,
                    note.fields.len(),
                    deck.model.name,
                    expected
                )));
            }
        }
        Ok(Package { deck, media_files })
    }

    /// Writes the archive at `output_path`. The zip is assembled under a
    /// temporary name and renamed into place, so a previous run's output is
    /// replaced all-or-nothing.
    pub fn write_to_file(&self, output_path: &Path) -> Result<(), DeckError> {
        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        let db_path = output_path.with_extension("anki2.tmp");
        let zip_path = output_path.with_extension("apkg.tmp");

        let result = self.write_inner(&db_path, &zip_path, now_millis);
        let _ = fs::remove_file(&db_path);
        if result.is_err() {
            let _ = fs::remove_file(&zip_path);
            return result;
        }

        if let Err(e) = fs::rename(&zip_path, output_path) {
            let _ = fs::remove_file(&zip_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn write_inner(
        &self,
        db_path: &Path,
        zip_path: &Path,
        now_millis: i64,
    ) -> Result<(), DeckError> {
        // A stale temp database from an interrupted run must not leak rows
        // into this one.
        let _ = fs::remove_file(db_path);
        let conn = Connection::open(db_path)?;
        collection::write_collection(&conn, &self.deck, now_millis)?;
        drop(conn);

        let file = File::create(zip_path)?;
        let mut zip = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("collection.anki2", options)?;
        zip.write_all(&fs::read(db_path)?)?;

        // Media files travel under numeric names; the "media" entry maps
        // them back to the names notes reference.
        let mut media_map = serde_json::Map::new();
        for (index, path) in self.media_files.iter().enumerate() {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| DeckError::Package(format!("Bad media path: {path:?}")))?;
            media_map.insert(index.to_string(), json!(name));
        }
        zip.start_file("media", options)?;
        zip.write_all(serde_json::Value::Object(media_map).to_string().as_bytes())?;

        for (index, path) in self.media_files.iter().enumerate() {
            zip.start_file(index.to_string(), options)?;
            zip.write_all(&fs::read(path)?)?;
        }

        zip.finish()?;
        Ok(())
    }
}
