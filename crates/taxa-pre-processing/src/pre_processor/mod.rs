mod batch;
mod cleaner;
mod stopwords;
mod vectorizer;

pub use batch::{progress_bar, should_use_parallel};
pub use cleaner::{DOMAIN_STOPWORDS, MISSING_TEXT, TextCleaner};
pub use stopwords::ENGLISH_STOPWORDS;
pub use vectorizer::{CountVectorizer, VectorizerParams};
