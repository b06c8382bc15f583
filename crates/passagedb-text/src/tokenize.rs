use tantivy::tokenizer::{LowerCaser, RegexTokenizer, TextAnalyzer, TokenStream};

use passagedb_core::error::{Error, Result};

/// Maximal runs of ASCII letters, digits, underscore, hyphen and period.
pub const TOKEN_PATTERN: &str = r"[A-Za-z0-9_\-\.]+";

/// The one tokenizer used for the lexical artifact, the index and queries.
///
/// No stemming and no stop words: every other character is a separator.
#[derive(Clone)]
pub struct PassageTokenizer {
	analyzer: TextAnalyzer,
}

impl PassageTokenizer {
	pub fn new() -> Result<Self> {
		let regex = RegexTokenizer::new(TOKEN_PATTERN).map_err(|e| Error::InvalidConfig(format!("token pattern: {e}")))?;
		let analyzer = TextAnalyzer::builder(regex).filter(LowerCaser).build();
		Ok(Self { analyzer })
	}

	pub fn tokenize(&self, text: &str) -> Vec<String> {
		// token_stream takes `&mut self`
		let mut analyzer = self.analyzer.clone();
		let mut stream = analyzer.token_stream(text);
		let mut tokens = Vec::new();
		while stream.advance() { tokens.push(stream.token().text.clone()); }
		tokens
	}
}

impl std::fmt::Debug for PassageTokenizer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PassageTokenizer").field("pattern", &TOKEN_PATTERN).finish()
	}
}
