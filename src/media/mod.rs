use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

use image::{
    imageops::FilterType,
    DynamicImage,
};
use reqwest::blocking::Client;

use crate::core::{
    http,
    DeckError,
    ExportConfig,
};

/// Outcome of image resolution for one record. `Absent` is a normal result,
/// not an error: the note is still built, with an empty image field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedImage {
    Present { file_name: String, path: PathBuf },
    Absent,
}

impl ResolvedImage {
    pub fn is_present(&self) -> bool {
        matches!(self, ResolvedImage::Present { .. })
    }
}

/// Turns a record's image source into a normalized file in the media output
/// directory. All failures are contained here and degrade to `Absent`; a bad
/// image never aborts the run.
pub struct ImageResolver {
    client: Client,
    raw_dir: PathBuf,
    media_dir: PathBuf,
    size: (u32, u32),
}

impl ImageResolver {
    pub fn new(config: &ExportConfig) -> Result<Self, DeckError> {
        let client = http::http_client(Duration::from_secs(config.fetch_timeout_secs))?;
        Ok(ImageResolver {
            client,
            raw_dir: config.raw_image_dir.clone(),
            media_dir: config.media_dir.clone(),
            size: config.image_size,
        })
    }

    /// Resolves the image for `id`. A URL selects remote mode; otherwise the
    /// conventional `{raw_dir}/{id}.png` is tried.
    pub fn resolve(&self, id: i64, image_url: Option<&str>) -> ResolvedImage {
        match image_url {
            Some(url) => self.resolve_remote(id, url),
            None => self.resolve_local(id),
        }
    }

    fn resolve_local(&self, id: i64) -> ResolvedImage {
        let raw_path = self.raw_dir.join(format!("{id}.png"));
        if !raw_path.exists() {
            println!("No raw image for record {id}, skipping");
            return ResolvedImage::Absent;
        }

        let file_name = format!("img_{id}.png");
        match self.normalize_file(&raw_path, &file_name) {
            Ok(path) => ResolvedImage::Present { file_name, path },
            Err(e) => {
                eprintln!("Could not process {}: {}", raw_path.display(), e);
                ResolvedImage::Absent
            }
        }
    }

    fn resolve_remote(&self, id: i64, url: &str) -> ResolvedImage {
        let file_name = format!("img_{id}{}", url_extension(url));
        let path = self.media_dir.join(&file_name);

        // Cache hit: the file from a previous run is reused as-is, no fetch.
        if path.exists() {
            return ResolvedImage::Present { file_name, path };
        }

        match self.fetch_and_normalize(url, &path) {
            Ok(()) => ResolvedImage::Present { file_name, path },
            Err(e) => {
                eprintln!("Image fetch failed for record {id} ({url}): {e}");
                ResolvedImage::Absent
            }
        }
    }

    fn normalize_file(&self, raw_path: &Path, file_name: &str) -> Result<PathBuf, DeckError> {
        let img = image::open(raw_path)?;
        let out_path = self.media_dir.join(file_name);
        self.save_resized(img, &out_path)?;
        Ok(out_path)
    }

    fn fetch_and_normalize(&self, url: &str, out_path: &Path) -> Result<(), DeckError> {
        let bytes = http::fetch_bytes(&self.client, url)?;
        let img = image::load_from_memory(&bytes)?;
        self.save_resized(img, out_path)
    }

    fn save_resized(&self, img: DynamicImage, out_path: &Path) -> Result<(), DeckError> {
        let (w, h) = self.size;
        let resized = img.resize_exact(w, h, FilterType::Lanczos3);
        // JPEG has no alpha channel; flatten before encoding.
        let is_jpeg = out_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
            .unwrap_or(false);
        if is_jpeg {
            DynamicImage::ImageRgb8(resized.to_rgb8()).save(out_path)?;
        } else {
            resized.save(out_path)?;
        }
        Ok(())
    }
}

/// Extension of the URL's path component, `.jpg` when it has none.
fn url_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or("");
    match last.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() && ext.len() <= 4 => {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => ".jpg".to_string(),
    }
}
