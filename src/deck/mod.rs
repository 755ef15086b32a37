pub mod assembler;
pub mod model;
pub mod note;

pub use assembler::DeckAssembler;
pub use model::build_model;
pub use note::{
    build_note,
    note_field_values,
    note_guid,
};
