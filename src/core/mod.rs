pub mod config;
pub mod errors;
pub mod http;

pub use config::{
    DeckSchema,
    ExportConfig,
};
pub use errors::DeckError;
