pub mod error;
pub mod renamer;
pub mod tagger;
