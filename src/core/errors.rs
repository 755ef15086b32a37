use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("Store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Image error: {0}")]
    Image(Box<image::ImageError>),

    #[error("Package error: {0}")]
    Package(String),

    #[error("HTTP error {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("DeckError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for DeckError {
    fn from(error: std::io::Error) -> Self {
        DeckError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for DeckError {
    fn from(error: reqwest::Error) -> Self {
        DeckError::Reqwest(Box::new(error))
    }
}

impl From<image::ImageError> for DeckError {
    fn from(error: image::ImageError) -> Self {
        DeckError::Image(Box::new(error))
    }
}

impl From<zip::result::ZipError> for DeckError {
    fn from(error: zip::result::ZipError) -> Self {
        DeckError::Package(error.to_string())
    }
}
