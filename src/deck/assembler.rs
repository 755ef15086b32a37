use std::path::{
    Path,
    PathBuf,
};

use crate::{
    core::{
        DeckError,
        DeckSchema,
    },
    deck::build_model,
    sink::{
        Deck,
        Note,
        Package,
    },
};

/// Accumulates notes and the media manifest over a run, then hands both to
/// the packaging sink in one shot. `finalize` consumes the assembler, so a
/// run cannot write the package twice.
pub struct DeckAssembler {
    deck: Deck,
    media: Vec<PathBuf>,
}

impl DeckAssembler {
    pub fn new(schema: &DeckSchema) -> Self {
        DeckAssembler {
            deck: Deck {
                id: schema.deck_id,
                name: schema.deck_name.clone(),
                description: String::new(),
                model: build_model(schema),
                notes: Vec::new(),
            },
            media: Vec::new(),
        }
    }

    pub fn add_note(&mut self, note: Note) {
        self.deck.notes.push(note);
    }

    /// Records a media file for embedding. Adding a path twice is a no-op;
    /// the manifest never holds duplicates.
    pub fn add_media(&mut self, path: PathBuf) {
        if !self.media.contains(&path) {
            self.media.push(path);
        }
    }

    pub fn media(&self) -> &[PathBuf] {
        &self.media
    }

    /// Writes the package at `output_path`, overwriting any previous run's
    /// output. Archive byte layout belongs entirely to the sink.
    pub fn finalize(self, output_path: &Path) -> Result<(), DeckError> {
        let package = Package::new(self.deck, self.media)?;
        package.write_to_file(output_path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        deck::build_note,
        media::ResolvedImage,
        store::VocabRecord,
    };

    fn record(id: i64) -> VocabRecord {
        VocabRecord {
            id,
            texts: vec![Some(format!("word-{id}")), None, None, None, None, None, None],
            image_url: None,
        }
    }

    #[test]
    fn add_media_is_idempotent() {
        let schema = DeckSchema::default();
        let mut assembler = DeckAssembler::new(&schema);
        assembler.add_media(PathBuf::from("images/img_1.png"));
        assembler.add_media(PathBuf::from("images/img_2.png"));
        assembler.add_media(PathBuf::from("images/img_1.png"));
        assert_eq!(assembler.media().len(), 2);
    }

    #[test]
    fn finalize_writes_one_package_file() {
        let dir = tempfile::tempdir().unwrap();
        let schema = DeckSchema::default();

        let mut assembler = DeckAssembler::new(&schema);
        for id in 1..=3 {
            assembler.add_note(build_note(&schema, &record(id), &ResolvedImage::Absent));
        }

        let out = dir.path().join("deck.apkg");
        assembler.finalize(&out).unwrap();
        assert!(out.metadata().unwrap().len() > 0);
    }

    #[test]
    fn finalize_embeds_manifest_media() {
        let dir = tempfile::tempdir().unwrap();
        let schema = DeckSchema::default();
        let img = dir.path().join("img_1.png");
        fs::write(&img, b"bytes").unwrap();

        let resolved =
            ResolvedImage::Present { file_name: "img_1.png".to_string(), path: img.clone() };
        let mut assembler = DeckAssembler::new(&schema);
        assembler.add_note(build_note(&schema, &record(1), &resolved));
        assembler.add_media(img);

        let out = dir.path().join("deck.apkg");
        assembler.finalize(&out).unwrap();

        let mut archive =
            zip::ZipArchive::new(fs::File::open(&out).unwrap()).unwrap();
        assert!(archive.by_name("0").is_ok());
    }
}
