use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};

/// Tokens must be longer than this many characters to count as keywords.
pub const MIN_KEYWORD_CHARS: usize = 2;

/// Splits on non-alphanumeric runs and lowercases.
pub fn keyword_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.build()
}

/// Reusable keyword extractor; the analyzer needs `&mut` to produce streams.
pub struct KeywordExtractor {
	analyzer: TextAnalyzer,
}

impl Default for KeywordExtractor {
	fn default() -> Self { Self { analyzer: keyword_analyzer() } }
}

impl KeywordExtractor {
	pub fn new() -> Self { Self::default() }

	pub fn extract(&mut self, text: &str) -> Vec<String> {
		let mut stream = self.analyzer.token_stream(text);
		let mut keywords = Vec::new();
		while stream.advance() {
			let token = &stream.token().text;
			if token.chars().count() > MIN_KEYWORD_CHARS { keywords.push(token.clone()); }
		}
		keywords
	}
}

/// One-shot form of [`KeywordExtractor::extract`].
pub fn extract_keywords(text: &str) -> Vec<String> {
	KeywordExtractor::new().extract(text)
}
