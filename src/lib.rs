pub mod core;
pub mod deck;
pub mod export;
pub mod media;
pub mod sink;
pub mod store;
pub mod tools;
