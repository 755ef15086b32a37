use std::path::Path;

use rusqlite::{
    Connection,
    OpenFlags,
};

use crate::core::DeckError;

const TABLE: &str = "vocab_words";

/// One vocabulary row as the export pipeline sees it: the stable id, the
/// configured text columns in order, and the optional remote image URL.
#[derive(Debug, Clone)]
pub struct VocabRecord {
    pub id: i64,
    pub texts: Vec<Option<String>>,
    pub image_url: Option<String>,
}

impl VocabRecord {
    pub fn text(&self, index: usize) -> &str {
        self.texts.get(index).and_then(|t| t.as_deref()).unwrap_or("")
    }
}

/// Read-only view over the vocabulary database. The store is an external
/// collaborator; all the pipeline asks of it is stable row order and unique
/// ids.
pub struct VocabStore {
    conn: Connection,
}

impl VocabStore {
    /// Opens the database read-only. A missing or unreadable file is fatal to
    /// the run, unlike anything image-related.
    pub fn open(path: &Path) -> Result<Self, DeckError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(VocabStore { conn })
    }

    /// Pulls every record in one pass, ordered by id. The vocabulary sets this
    /// tool targets fit comfortably in memory.
    pub fn fetch_all(&self, text_columns: &[String]) -> Result<Vec<VocabRecord>, DeckError> {
        let query = format!(
            "SELECT id, {}, image_url FROM {} ORDER BY id",
            text_columns.join(", "),
            TABLE
        );
        let mut stmt = self.conn.prepare(&query)?;

        let n_texts = text_columns.len();
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let mut texts = Vec::with_capacity(n_texts);
            for i in 0..n_texts {
                texts.push(row.get::<_, Option<String>>(1 + i)?);
            }
            let image_url: Option<String> = row.get(1 + n_texts)?;
            Ok(VocabRecord { id, texts, image_url })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

#[cfg(test)]
pub mod test_support {
    use std::path::Path;

    use rusqlite::Connection;

    /// Creates a vocab database with the default rich schema and the given
    /// rows: (id, headword, image_url). Remaining text columns are left NULL.
    pub fn seed_db(path: &Path, rows: &[(i64, &str, Option<&str>)]) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE vocab_words (
                id INTEGER PRIMARY KEY,
                korean_word TEXT NOT NULL,
                korean_word_dictionary_form TEXT,
                korean_phrase TEXT,
                korean_short_example TEXT,
                english_translation_short TEXT,
                english_translation_long TEXT,
                english_alternate_definitions TEXT,
                image_url TEXT
            );",
        )
        .unwrap();
        for (id, word, url) in rows {
            conn.execute(
                "INSERT INTO vocab_words (id, korean_word, image_url) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, word, url],
            )
            .unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExportConfig;

    #[test]
    fn open_fails_for_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        assert!(VocabStore::open(&dir.path().join("nope.db")).is_err());
    }

    #[test]
    fn fetch_all_returns_rows_in_id_order_with_nulls_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("vocab.db");
        test_support::seed_db(
            &db,
            &[
                (3, "바다", Some("http://example.com/sea.jpg")),
                (1, "사과", None),
                (2, "книга", None),
            ],
        );

        let store = VocabStore::open(&db).unwrap();
        let columns = ExportConfig::default().text_columns;
        let records = store.fetch_all(&columns).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(records[0].text(0), "사과");
        // NULL columns surface as empty strings through text()
        assert_eq!(records[0].text(1), "");
        assert_eq!(records[2].image_url.as_deref(), Some("http://example.com/sea.jpg"));
    }

    #[test]
    fn store_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("vocab.db");
        test_support::seed_db(&db, &[(1, "사과", None)]);

        let store = VocabStore::open(&db).unwrap();
        let result = store.conn.execute("DELETE FROM vocab_words", []);
        assert!(result.is_err());
    }
}
