mod document;

pub use document::{Document, Example, Extraction, Flags, ParsedExample, SyncOutcome};
