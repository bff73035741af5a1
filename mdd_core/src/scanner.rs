use std::collections::HashMap;
use std::collections::HashSet;
use std::ops::Range;

use logos::Logos;
use snailquote::unescape;

use crate::options::Encoding;
use crate::options::ParseOptions;

/// Raw tokens produced by logos for flat tokenization of JavaScript-ish
/// source. This is deliberately not a full JavaScript lexer: strings and
/// comments are recognized so that bracket tracking never miscounts inside
/// them, and everything else the scanner does not care about falls through
/// as [`Tok::Other`].
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[regex(r"//[^\n]*", allow_greedy = true)]
	LineComment,
	#[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
	BlockComment,
	#[regex(r#""([^"\\\n]|\\.)*""#)]
	DoubleQuotedString,
	#[regex(r"'([^'\\\n]|\\.)*'")]
	SingleQuotedString,
	#[regex(r"`([^`\\]|\\.)*`")]
	TemplateString,
	#[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
	Ident,
	#[token("(")]
	OpenParen,
	#[token(")")]
	CloseParen,
	#[token("{")]
	OpenBrace,
	#[token("}")]
	CloseBrace,
	#[token("[")]
	OpenBracket,
	#[token("]")]
	CloseBracket,
	#[token(",")]
	Comma,
	#[token(".")]
	Dot,
	#[token(":")]
	Colon,
	#[token("=")]
	Equals,
	#[regex(r"[ \t\r\n]+")]
	Whitespace,
}

/// A significant token with its byte span. Whitespace and comments are
/// dropped before scanning; unrecognized bytes become `Other` so the token
/// stream always covers the interesting structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok {
	Ident,
	Str,
	Template,
	OpenParen,
	CloseParen,
	OpenBrace,
	CloseBrace,
	OpenBracket,
	CloseBracket,
	Comma,
	Dot,
	Colon,
	Equals,
	Other,
}

/// The four file-API entry points the inliner recognizes at call sites.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EntryPoint {
	DirAsync,
	DirSync,
	FileAsync,
	FileSync,
}

impl EntryPoint {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"parseDir" => Some(Self::DirAsync),
			"parseDirSync" => Some(Self::DirSync),
			"parseFile" => Some(Self::FileAsync),
			"parseFileSync" => Some(Self::FileSync),
			_ => None,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::DirAsync => "parseDir",
			Self::DirSync => "parseDirSync",
			Self::FileAsync => "parseFile",
			Self::FileSync => "parseFileSync",
		}
	}

	/// Async variants take a trailing callback and are rewritten into a
	/// deferred-callback form rather than a bare literal.
	pub fn is_async(self) -> bool {
		matches!(self, Self::DirAsync | Self::FileAsync)
	}

	/// Directory variants produce a content map; file variants a single
	/// document.
	pub fn is_dir(self) -> bool {
		matches!(self, Self::DirAsync | Self::DirSync)
	}
}

/// Option values the scanner can resolve from a statically literal options
/// object: strings, booleans, and arrays of strings for the recognized
/// non-function keys. Anything else makes the whole call site unresolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiteralOptions {
	pub encoding: Option<Encoding>,
	pub filter: Option<String>,
	pub ignore: Vec<String>,
	pub extensions: Option<bool>,
	pub dirnames: Option<bool>,
	pub original: Option<bool>,
}

impl LiteralOptions {
	/// Overlay the resolved literals onto the default options.
	pub fn to_parse_options(&self) -> ParseOptions {
		let mut options = ParseOptions::default();

		if let Some(encoding) = self.encoding {
			options.encoding = encoding;
		}
		if let Some(filter) = &self.filter {
			options.filter = filter.clone();
		}
		if !self.ignore.is_empty() {
			options.ignore = self.ignore.clone();
		}
		if let Some(extensions) = self.extensions {
			options.extensions = extensions;
		}
		if let Some(dirnames) = self.dirnames {
			options.dirnames = dirnames;
		}
		if let Some(original) = self.original {
			options.original = original;
		}

		options
	}
}

/// Whether a detected call site's arguments could be statically resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
	Resolved {
		/// The path argument, unescaped. Relative paths are resolved against
		/// the directory of the source file being rewritten.
		path: String,
		/// Options resolved from a literal options object, if one was given.
		options: LiteralOptions,
		/// Byte span of the callback expression for async variants, captured
		/// verbatim from source.
		callback: Option<Range<usize>>,
	},
	Unresolved { reason: String },
}

/// A call expression to one of the four entry points, found by static
/// scanning.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedCall {
	pub entry: EntryPoint,
	/// Byte span of the whole call expression, from the start of the callee
	/// to the closing parenthesis.
	pub span: Range<usize>,
	pub resolution: Resolution,
}

/// Module bindings discovered from `require()` expressions: namespace
/// bindings (`const md = require('mdd')`) and destructured named bindings
/// (`const { parseDir } = require('mdd')`, with renames).
#[derive(Debug, Default)]
struct Bindings {
	namespaces: HashSet<String>,
	named: HashMap<String, EntryPoint>,
}

impl Bindings {
	fn is_empty(&self) -> bool {
		self.namespaces.is_empty() && self.named.is_empty()
	}
}

struct Scanner<'a> {
	source: &'a str,
	tokens: Vec<(Tok, Range<usize>)>,
}

impl<'a> Scanner<'a> {
	fn new(source: &'a str) -> Self {
		let mut tokens = Vec::new();

		for (result, span) in RawToken::lexer(source).spanned() {
			let tok = match result {
				Ok(RawToken::Whitespace | RawToken::LineComment | RawToken::BlockComment) => {
					continue;
				}
				Ok(RawToken::Ident) => Tok::Ident,
				Ok(RawToken::DoubleQuotedString | RawToken::SingleQuotedString) => Tok::Str,
				Ok(RawToken::TemplateString) => Tok::Template,
				Ok(RawToken::OpenParen) => Tok::OpenParen,
				Ok(RawToken::CloseParen) => Tok::CloseParen,
				Ok(RawToken::OpenBrace) => Tok::OpenBrace,
				Ok(RawToken::CloseBrace) => Tok::CloseBrace,
				Ok(RawToken::OpenBracket) => Tok::OpenBracket,
				Ok(RawToken::CloseBracket) => Tok::CloseBracket,
				Ok(RawToken::Comma) => Tok::Comma,
				Ok(RawToken::Dot) => Tok::Dot,
				Ok(RawToken::Colon) => Tok::Colon,
				Ok(RawToken::Equals) => Tok::Equals,
				Err(()) => Tok::Other,
			};
			tokens.push((tok, span));
		}

		Self { source, tokens }
	}

	fn slice(&self, index: usize) -> &'a str {
		let (_, span) = &self.tokens[index];
		&self.source[span.clone()]
	}

	fn kind(&self, index: usize) -> Option<Tok> {
		self.tokens.get(index).map(|(tok, _)| *tok)
	}

	/// Unquote and unescape a string-literal token.
	fn string_value(&self, index: usize) -> Option<String> {
		let slice = self.slice(index);
		if slice.len() < 2 {
			return None;
		}
		let inner = &slice[1..slice.len() - 1];

		if inner.contains('\\') {
			unescape(inner).ok()
		} else {
			Some(inner.to_string())
		}
	}

	/// Find namespace and destructured bindings for `module`.
	fn find_bindings(&self, module: &str) -> Bindings {
		let mut bindings = Bindings::default();

		for index in 0..self.tokens.len() {
			if self.kind(index) != Some(Tok::Ident) || self.slice(index) != "require" {
				continue;
			}
			if self.kind(index + 1) != Some(Tok::OpenParen)
				|| self.kind(index + 2) != Some(Tok::Str)
				|| self.kind(index + 3) != Some(Tok::CloseParen)
			{
				continue;
			}
			if self.string_value(index + 2).as_deref() != Some(module) {
				continue;
			}
			if index < 2 || self.kind(index - 1) != Some(Tok::Equals) {
				continue;
			}

			match self.kind(index - 2) {
				Some(Tok::Ident) => {
					bindings.namespaces.insert(self.slice(index - 2).to_string());
				}
				Some(Tok::CloseBrace) => {
					self.collect_destructured(index - 2, &mut bindings);
				}
				_ => {}
			}
		}

		bindings
	}

	/// Walk backwards from a closing brace to its opening brace, collecting
	/// `name` and `exported: local` destructuring elements.
	fn collect_destructured(&self, close_index: usize, bindings: &mut Bindings) {
		let Some(open_index) = self.matching_open_brace(close_index) else {
			return;
		};

		let mut index = open_index + 1;
		while index < close_index {
			if self.kind(index) != Some(Tok::Ident) {
				index += 1;
				continue;
			}

			let exported = self.slice(index);
			let (local, consumed) =
				if self.kind(index + 1) == Some(Tok::Colon) && self.kind(index + 2) == Some(Tok::Ident) {
					(self.slice(index + 2), 3)
				} else {
					(exported, 1)
				};

			if let Some(entry) = EntryPoint::from_name(exported) {
				bindings.named.insert(local.to_string(), entry);
			}

			index += consumed;
			// Skip to the element after the next comma, if any.
			while index < close_index && self.kind(index) != Some(Tok::Comma) {
				index += 1;
			}
			index += 1;
		}
	}

	fn matching_open_brace(&self, close_index: usize) -> Option<usize> {
		let mut depth = 0usize;

		for index in (0..=close_index).rev() {
			match self.kind(index)? {
				Tok::CloseBrace => depth += 1,
				Tok::OpenBrace => {
					depth -= 1;
					if depth == 0 {
						return Some(index);
					}
				}
				_ => {}
			}
		}

		None
	}

	/// Find all call sites for the given bindings.
	fn find_calls(&self, bindings: &Bindings) -> Vec<ScannedCall> {
		let mut calls = Vec::new();
		let mut index = 0;

		while index < self.tokens.len() {
			let Some(candidate) = self.call_at(index, bindings) else {
				index += 1;
				continue;
			};

			index = candidate.next_index;
			calls.push(candidate.call);
		}

		calls
	}

	/// Try to match a call expression starting at `index`. Returns the call
	/// and the token index to resume scanning from.
	fn call_at(&self, index: usize, bindings: &Bindings) -> Option<Candidate> {
		if self.kind(index) != Some(Tok::Ident) {
			return None;
		}
		// A leading dot means this ident is a property of something else.
		if index > 0 && self.kind(index - 1) == Some(Tok::Dot) {
			return None;
		}

		let first = self.slice(index);

		let (entry, open_index) = if bindings.namespaces.contains(first)
			&& self.kind(index + 1) == Some(Tok::Dot)
			&& self.kind(index + 2) == Some(Tok::Ident)
			&& self.kind(index + 3) == Some(Tok::OpenParen)
		{
			(EntryPoint::from_name(self.slice(index + 2))?, index + 3)
		} else if self.kind(index + 1) == Some(Tok::OpenParen) {
			(*bindings.named.get(first)?, index + 1)
		} else {
			return None;
		};

		let (close_index, args) = self.split_arguments(open_index)?;

		let span = self.tokens[index].1.start..self.tokens[close_index].1.end;
		let resolution = self.resolve(entry, &args);

		Some(Candidate {
			call: ScannedCall {
				entry,
				span,
				resolution,
			},
			next_index: close_index + 1,
		})
	}

	/// Split the argument list starting at an opening parenthesis into
	/// per-argument token ranges, tracking bracket depth. Strings and
	/// comments are single tokens, so depth counting cannot be fooled by
	/// their contents.
	fn split_arguments(&self, open_index: usize) -> Option<(usize, Vec<Range<usize>>)> {
		let mut depth = 0usize;
		let mut args = Vec::new();
		let mut arg_start = open_index + 1;

		for index in open_index..self.tokens.len() {
			match self.kind(index)? {
				Tok::OpenParen | Tok::OpenBrace | Tok::OpenBracket => depth += 1,
				Tok::CloseParen | Tok::CloseBrace | Tok::CloseBracket => {
					depth = depth.checked_sub(1)?;
					if depth == 0 {
						if index > arg_start {
							args.push(arg_start..index);
						}
						return Some((index, args));
					}
				}
				Tok::Comma if depth == 1 => {
					args.push(arg_start..index);
					arg_start = index + 1;
				}
				_ => {}
			}
		}

		None
	}

	/// Resolve a call site's arguments into literals, or record why it
	/// cannot be inlined.
	fn resolve(&self, entry: EntryPoint, args: &[Range<usize>]) -> Resolution {
		let unresolved = |reason: &str| Resolution::Unresolved {
			reason: reason.to_string(),
		};

		let Some(path_tokens) = args.first() else {
			return unresolved("missing path argument");
		};
		if path_tokens.len() != 1 || self.kind(path_tokens.start) != Some(Tok::Str) {
			return unresolved("path argument is not a string literal");
		}
		let Some(path) = self.string_value(path_tokens.start) else {
			return unresolved("path argument has unsupported escapes");
		};

		let (options_tokens, callback_tokens) = if entry.is_async() {
			match args.len() {
				2 => (None, Some(&args[1])),
				3 => (Some(&args[1]), Some(&args[2])),
				_ => return unresolved("expected a trailing callback argument"),
			}
		} else {
			match args.len() {
				1 => (None, None),
				2 => (Some(&args[1]), None),
				_ => return unresolved("unexpected argument count"),
			}
		};

		let options = match options_tokens {
			Some(tokens) => match self.resolve_options(tokens) {
				Ok(options) => options,
				Err(reason) => return Resolution::Unresolved { reason },
			},
			None => LiteralOptions::default(),
		};

		let callback = callback_tokens
			.map(|tokens| self.tokens[tokens.start].1.start..self.tokens[tokens.end - 1].1.end);

		Resolution::Resolved {
			path,
			options,
			callback,
		}
	}

	/// Parse an options argument that must be an object literal restricted
	/// to literal values for the recognized non-function keys.
	fn resolve_options(&self, tokens: &Range<usize>) -> Result<LiteralOptions, String> {
		if self.kind(tokens.start) != Some(Tok::OpenBrace)
			|| self.kind(tokens.end - 1) != Some(Tok::CloseBrace)
		{
			return Err("options argument is not an object literal".to_string());
		}

		let mut options = LiteralOptions::default();
		let mut index = tokens.start + 1;

		while index < tokens.end - 1 {
			let key = match self.kind(index) {
				Some(Tok::Ident) => self.slice(index).to_string(),
				Some(Tok::Str) => self
					.string_value(index)
					.ok_or_else(|| "unsupported escapes in option key".to_string())?,
				Some(Tok::Comma) => {
					index += 1;
					continue;
				}
				_ => return Err("options object has a non-literal key".to_string()),
			};

			if self.kind(index + 1) != Some(Tok::Colon) {
				return Err(format!("option `{key}` has no literal value"));
			}

			index = self.resolve_option_value(&key, index + 2, tokens.end - 1, &mut options)?;
		}

		Ok(options)
	}

	/// Parse one option value starting at `index`, store it, and return the
	/// index just past it.
	fn resolve_option_value(
		&self,
		key: &str,
		index: usize,
		end: usize,
		options: &mut LiteralOptions,
	) -> Result<usize, String> {
		let non_literal = |key: &str| format!("option `{key}` is not a static literal");

		match key {
			"encoding" => {
				let value = self.literal_string(index).ok_or_else(|| non_literal(key))?;
				options.encoding = Some(match value.as_str() {
					"utf8" | "utf-8" => Encoding::Utf8,
					"utf8-lossy" => Encoding::Utf8Lossy,
					other => return Err(format!("unsupported encoding `{other}`")),
				});
				Ok(index + 1)
			}
			"filter" => {
				options.filter = Some(self.literal_string(index).ok_or_else(|| non_literal(key))?);
				Ok(index + 1)
			}
			"ignore" => {
				if let Some(value) = self.literal_string(index) {
					options.ignore = vec![value];
					return Ok(index + 1);
				}
				let (next, values) = self
					.literal_string_array(index, end)
					.ok_or_else(|| non_literal(key))?;
				options.ignore = values;
				Ok(next)
			}
			"extensions" | "dirnames" | "original" => {
				let value = self.literal_bool(index).ok_or_else(|| non_literal(key))?;
				match key {
					"extensions" => options.extensions = Some(value),
					"dirnames" => options.dirnames = Some(value),
					_ => options.original = Some(value),
				}
				Ok(index + 1)
			}
			// `md`, `frontmatter`, and `transform` are function-valued and
			// can never be resolved statically.
			other => Err(format!("option `{other}` cannot be resolved statically")),
		}
	}

	fn literal_string(&self, index: usize) -> Option<String> {
		if self.kind(index) == Some(Tok::Str) {
			self.string_value(index)
		} else {
			None
		}
	}

	fn literal_bool(&self, index: usize) -> Option<bool> {
		if self.kind(index) == Some(Tok::Ident) {
			match self.slice(index) {
				"true" => Some(true),
				"false" => Some(false),
				_ => None,
			}
		} else {
			None
		}
	}

	/// Parse `[ "a", "b" ]` starting at `index`. Returns the index past the
	/// closing bracket and the collected strings.
	fn literal_string_array(&self, index: usize, end: usize) -> Option<(usize, Vec<String>)> {
		if self.kind(index) != Some(Tok::OpenBracket) {
			return None;
		}

		let mut values = Vec::new();
		let mut cursor = index + 1;

		while cursor < end {
			match self.kind(cursor)? {
				Tok::CloseBracket => return Some((cursor + 1, values)),
				Tok::Comma => cursor += 1,
				Tok::Str => {
					values.push(self.string_value(cursor)?);
					cursor += 1;
				}
				_ => return None,
			}
		}

		None
	}
}

struct Candidate {
	call: ScannedCall,
	next_index: usize,
}

/// Statically scan JavaScript-ish source for call expressions to the four
/// file-API entry points imported from `module`.
///
/// Returns the call sites in source order, each with its arguments resolved
/// to literals or a reason why they could not be. Scanning never fails:
/// source with no bindings for `module` simply yields no calls.
pub fn scan_source(source: &str, module: &str) -> Vec<ScannedCall> {
	let scanner = Scanner::new(source);
	let bindings = scanner.find_bindings(module);

	if bindings.is_empty() {
		return Vec::new();
	}

	let calls = scanner.find_calls(&bindings);
	tracing::debug!(module, count = calls.len(), "scanned call sites");
	calls
}
