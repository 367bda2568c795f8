//! Crate-wide error type.
//!
//! Parser and loader failures all surface as one message-carrying enum.
//! The rendered messages are stable: tests (and downstream tooling that
//! pattern-matches loader diagnostics) rely on the exact wording.

/// Errors raised while compiling a plural-form expression or loading a
/// MO catalogue. Lookups never fail; missing entries fall back to the
/// caller's arguments instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// An atom was expected but EOF or an operator was found.
	#[error("expected expression at pos {0}")]
	ExpectedExpression(usize),

	/// A token appeared where the grammar does not permit it.
	#[error("unexpected token at pos {0}")]
	UnexpectedToken(usize),

	/// A `(` was opened but never closed.
	#[error("expected closing bracket at pos {0}")]
	ExpectedClosingBracket(usize),

	/// A `?` was parsed but no `:` followed the then-branch.
	#[error("expected ternary delimiter at pos {0}")]
	ExpectedTernaryDelimiter(usize),

	/// The lexer hit a character outside the expression alphabet.
	#[error("unexpected character '{ch}' at pos {pos}")]
	UnexpectedCharacter { ch: char, pos: usize },

	/// An integer literal does not fit 32 bits unsigned.
	#[error("invalid number '{text}' at pos {pos}")]
	InvalidNumber { text: String, pos: usize },

	/// The MO file could not be read from disk.
	#[error("failed to open file")]
	FailedToOpenFile(#[source] std::io::Error),

	/// The buffer is too small for a magic number, or the magic matches
	/// neither byte order.
	#[error("not a MO file")]
	NotAMoFile,

	/// The header declares a major format revision above 1.
	#[error("unsupported MO revision")]
	UnsupportedRevision,

	/// A header field or table descriptor lies outside the buffer.
	#[error("read at {addr:#x}: unexpected end of file")]
	UnexpectedEof { addr: u32 },

	/// A string descriptor points past the end of the buffer.
	#[error("string_info at {descr:#x}: extends beyond EOF (len:{len:#x} addr:{addr:#x} file size:{size:#x})")]
	StringOutOfBounds { descr: u32, len: u32, addr: u32, size: u64 },

	/// A string is not followed by the mandatory NUL byte.
	#[error("string_info at {descr:#x}: missing null terminator")]
	MissingNullTerminator { descr: u32 },

	/// A string is not valid UTF-8.
	#[error("string at {addr:#x}: invalid UTF-8")]
	InvalidUtf8 { addr: u32 },

	/// Entry 0 must pair an empty original with the metadata block.
	#[error("metadata entry has non-empty original string")]
	BadMetadataEntry,

	/// The `Content-Type:` metadata value names a charset other than
	/// UTF-8.
	#[error("unexpected value in Content-Type header (wrong charset?)")]
	WrongCharset,

	/// The metadata block carries no `Content-Type:` line.
	#[error("failed to find Content-Type header")]
	MissingContentType,

	/// The metadata block carries no `Plural-Forms:` line.
	#[error("failed to find Plural-Forms header")]
	MissingPluralForms,

	/// The `Plural-Forms:` value is not `nplurals=<N>; plural=<expr>;`
	/// with a positive `N`.
	#[error("failed to parse Plural-Forms header")]
	BadPluralForms,

	/// A plural translation does not provide exactly `nplurals` forms.
	#[error("string at index {index}: expected {expected} plural forms, found {found}")]
	PluralCountMismatch { index: u32, expected: usize, found: usize },
}
