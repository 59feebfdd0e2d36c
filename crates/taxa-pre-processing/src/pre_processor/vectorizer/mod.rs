mod count_vectorizer;
mod ngrams;
mod params;
mod tokenizer;

pub use count_vectorizer::CountVectorizer;
pub use params::VectorizerParams;
