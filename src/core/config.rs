use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::DeckError;

/// The fixed note schema shared by every note in an exported deck: field
/// names, the single card template, and the stable deck/model identifiers.
///
/// Identifiers must never be reused across schema revisions; Anki keys both
/// the model and the dedup behavior on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSchema {
    pub deck_id: i64,
    pub deck_name: String,
    pub model_id: i64,
    pub model_name: String,
    /// Text field names, in template order. The image field is appended last.
    pub fields: Vec<String>,
    pub image_field: String,
    pub front_template: String,
    pub back_template: String,
}

impl Default for DeckSchema {
    fn default() -> Self {
        DeckSchema {
            deck_id: 2059403110,
            deck_name: "Korean Vocab".to_string(),
            model_id: 1607391319,
            model_name: "Korean Vocab Model".to_string(),
            fields: vec![
                "KoreanWord".to_string(),
                "KoreanDictionaryForm".to_string(),
                "KoreanPhrase".to_string(),
                "KoreanShortExample".to_string(),
                "EnglishShort".to_string(),
                "EnglishLong".to_string(),
                "EnglishAlternate".to_string(),
            ],
            image_field: "ImageUrl".to_string(),
            front_template: "<h2>{{KoreanDictionaryForm}}</h2><br>{{KoreanShortExample}}"
                .to_string(),
            back_template:
                "{{EnglishLong}}<br><br>Alternates: {{EnglishAlternate}}<br><br>{{ImageUrl}}"
                    .to_string(),
        }
    }
}

/// Everything one export run needs, passed explicitly into the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub db_path: PathBuf,
    pub raw_image_dir: PathBuf,
    pub media_dir: PathBuf,
    pub output_path: PathBuf,
    /// Store columns feeding `DeckSchema::fields`, in the same order.
    pub text_columns: Vec<String>,
    pub image_size: (u32, u32),
    pub fetch_timeout_secs: u64,
    pub deck: DeckSchema,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            db_path: PathBuf::from("vocab.db"),
            raw_image_dir: PathBuf::from("raw_images"),
            media_dir: PathBuf::from("images"),
            output_path: PathBuf::from("korean_vocab.apkg"),
            text_columns: vec![
                "korean_word".to_string(),
                "korean_word_dictionary_form".to_string(),
                "korean_phrase".to_string(),
                "korean_short_example".to_string(),
                "english_translation_short".to_string(),
                "english_translation_long".to_string(),
                "english_alternate_definitions".to_string(),
            ],
            image_size: (360, 360),
            fetch_timeout_secs: 10,
            deck: DeckSchema::default(),
        }
    }
}

impl ExportConfig {
    pub fn load(path: &Path) -> Result<Self, DeckError> {
        let json = fs::read_to_string(path)?;
        let config: ExportConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, DeckError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), DeckError> {
        if self.text_columns.len() != self.deck.fields.len() {
            return Err(DeckError::Custom(format!(
                "{} text columns configured for {} model fields",
                self.text_columns.len(),
                self.deck.fields.len()
            )));
        }
        if self.image_size.0 == 0 || self.image_size.1 == 0 {
            return Err(DeckError::Custom("image_size must be non-zero".to_string()));
        }
        Ok(())
    }
}
