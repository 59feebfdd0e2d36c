//! Text pre-processing for taxonomic post classification.
//!
//! Two stages live here:
//! - [`pre_processor::TextCleaner`] normalises raw captions (letters only,
//!   lower case, stop words removed).
//! - [`pre_processor::CountVectorizer`] turns cleaned captions into sparse
//!   word n-gram count matrices.

pub mod pre_processor;
