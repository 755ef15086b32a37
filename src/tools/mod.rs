pub mod csv_merge;

pub use csv_merge::{
    merge_word_lists,
    MergeSummary,
};
