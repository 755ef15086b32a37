use std::{
    fs,
    path::PathBuf,
    time::Instant,
};

use crate::{
    core::{
        DeckError,
        ExportConfig,
    },
    deck::{
        build_note,
        DeckAssembler,
    },
    media::{
        ImageResolver,
        ResolvedImage,
    },
    store::VocabStore,
};

/// Run-level diagnostics. Every record yields exactly one image outcome, so
/// `images_attached + images_skipped == processed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub processed: usize,
    pub images_attached: usize,
    pub images_skipped: usize,
    pub output_path: PathBuf,
}

/// Drives one full export: load every record, resolve its image, build its
/// note, then write the package once. Per-record image failures are absorbed
/// by the resolver; only store access and the final write can fail the run.
pub fn run_export(config: &ExportConfig) -> Result<ExportSummary, DeckError> {
    let total_start = Instant::now();
    config.validate()?;

    // Init: output directories, idempotent.
    fs::create_dir_all(&config.media_dir)?;
    if let Some(parent) = config.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // Loading: the whole record set in one pass.
    let store = VocabStore::open(&config.db_path)?;
    let records = store.fetch_all(&config.text_columns)?;
    println!("Loaded {} records from {}", records.len(), config.db_path.display());

    let resolver = ImageResolver::new(config)?;
    let mut assembler = DeckAssembler::new(&config.deck);

    let mut images_attached = 0;
    let mut images_skipped = 0;

    for record in &records {
        let resolved = resolver.resolve(record.id, record.image_url.as_deref());
        match &resolved {
            ResolvedImage::Present { path, .. } => {
                images_attached += 1;
                assembler.add_media(path.clone());
            }
            ResolvedImage::Absent => images_skipped += 1,
        }
        assembler.add_note(build_note(&config.deck, record, &resolved));
    }

    // Finalizing: the single package write.
    assembler.finalize(&config.output_path)?;

    let summary = ExportSummary {
        processed: records.len(),
        images_attached,
        images_skipped,
        output_path: config.output_path.clone(),
    };
    println!(
        "Deck exported to {} ({} notes, {} images attached, {} skipped, {:.1}s)",
        summary.output_path.display(),
        summary.processed,
        summary.images_attached,
        summary.images_skipped,
        total_start.elapsed().as_secs_f32()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::Path,
    };

    use super::*;
    use crate::{
        deck::note_guid,
        store::test_support::seed_db,
    };

    fn test_config(dir: &Path) -> ExportConfig {
        ExportConfig {
            db_path: dir.join("vocab.db"),
            raw_image_dir: dir.join("raw_images"),
            media_dir: dir.join("images"),
            output_path: dir.join("out.apkg"),
            image_size: (48, 48),
            fetch_timeout_secs: 1,
            ..ExportConfig::default()
        }
    }

    fn write_png(path: &Path) {
        image::RgbaImage::from_pixel(96, 64, image::Rgba([10, 200, 90, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn missing_store_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        assert!(run_export(&config).is_err());
    }

    #[test]
    fn export_handles_local_missing_and_failing_remote_images() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.raw_image_dir).unwrap();

        // id=1: valid local raw image; id=2: no source at all; id=3: remote
        // URL whose fetch fails (unroutable loopback port).
        seed_db(
            &config.db_path,
            &[
                (1, "사과", None),
                (2, "바다", None),
                (3, "나무", Some("http://127.0.0.1:9/tree.jpg")),
            ],
        );
        write_png(&config.raw_image_dir.join("1.png"));

        let summary = run_export(&config).unwrap();
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.images_attached, 1);
        assert_eq!(summary.images_skipped, 2);

        assert!(config.output_path.exists());
        assert!(config.media_dir.join("img_1.png").exists());
        // No orphan media: the failed and missing images wrote nothing.
        assert_eq!(fs::read_dir(&config.media_dir).unwrap().count(), 1);

        // All three records became notes, under their salted guids.
        let guids = package_guids(dir.path(), &config.output_path);
        assert_eq!(guids.len(), 3);
        for id in 1..=3 {
            assert!(guids.contains(&note_guid(id)));
        }
    }

    fn package_guids(scratch: &Path, package: &Path) -> Vec<String> {
        use std::io::Read;

        let mut archive =
            zip::ZipArchive::new(fs::File::open(package).unwrap()).unwrap();
        let mut db_bytes = Vec::new();
        archive.by_name("collection.anki2").unwrap().read_to_end(&mut db_bytes).unwrap();
        let db_path = scratch.join("extracted.anki2");
        fs::write(&db_path, &db_bytes).unwrap();

        let conn = rusqlite::Connection::open(&db_path).unwrap();
        let mut stmt = conn.prepare("SELECT guid FROM notes ORDER BY id").unwrap();
        let guids = stmt
            .query_map([], |r| r.get::<_, String>(0))
            .unwrap()
            .map(|g| g.unwrap())
            .collect();
        guids
    }

    #[test]
    fn rerun_is_idempotent_and_keeps_note_identity() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.raw_image_dir).unwrap();
        seed_db(&config.db_path, &[(1, "사과", None), (2, "바다", None)]);
        write_png(&config.raw_image_dir.join("2.png"));

        let first = run_export(&config).unwrap();
        let first_guids = package_guids(dir.path(), &config.output_path);
        let second = run_export(&config).unwrap();
        let second_guids = package_guids(dir.path(), &config.output_path);

        assert_eq!(first, second);
        assert_eq!(first_guids, second_guids);
        assert_eq!(first_guids, vec![note_guid(1), note_guid(2)]);
    }

    #[test]
    fn unwritable_output_path_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        seed_db(&config.db_path, &[(1, "사과", None)]);

        // A directory where the package file should go makes the final
        // rename fail, which must abort the run.
        config.output_path = dir.path().join("out.apkg");
        fs::create_dir_all(&config.output_path).unwrap();
        assert!(run_export(&config).is_err());
    }

    #[test]
    fn rerun_reuses_cached_remote_media_without_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.media_dir).unwrap();
        seed_db(&config.db_path, &[(5, "나무", Some("http://127.0.0.1:9/tree.jpg"))]);

        // A previous run already produced this file; the URL is unroutable,
        // so an attached image proves no fetch happened.
        fs::write(config.media_dir.join("img_5.jpg"), b"cached").unwrap();

        let summary = run_export(&config).unwrap();
        assert_eq!(summary.images_attached, 1);
        assert_eq!(summary.images_skipped, 0);
        assert_eq!(fs::read(config.media_dir.join("img_5.jpg")).unwrap(), b"cached");
    }
}
