//! Packaging sink for the `.apkg` archive format.
//!
//! The rest of the crate treats this module as an opaque writer: it accepts
//! one deck of notes bound to a single model plus a media manifest, and owns
//! the archive byte layout. Notes are deduplicated downstream by guid
//! equality alone; the sink stores guids verbatim and never inspects them.

pub mod collection;
pub mod package;

pub use package::Package;

#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub qfmt: String,
    pub afmt: String,
}

#[derive(Debug, Clone)]
pub struct Model {
    pub id: i64,
    pub name: String,
    pub fields: Vec<String>,
    pub templates: Vec<Template>,
    pub css: String,
}

#[derive(Debug, Clone)]
pub struct Note {
    pub guid: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Deck {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub model: Model,
    pub notes: Vec<Note>,
}
