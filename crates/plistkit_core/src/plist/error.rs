use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, PlistError>;

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// The encoder was asked for a variant or width the target profile forbids.
	UnsupportedValue,
	/// Binary input is not a well-formed `bplist00` file.
	MalformedFile,
	/// Text input does not follow the OpenStep / `.strings` grammar.
	SyntaxError,
	/// Binary object references loop back to an ancestor.
	CyclicReference,
	/// Input exceeded a configured depth or node budget.
	LimitExceeded,
	/// Filesystem or stream failure outside the codecs.
	Io,
}

/// Errors produced while encoding or decoding property lists.
#[derive(Debug, Error)]
pub enum PlistError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Value cannot be encoded under the selected target.
	#[error("unsupported {kind} value: {reason}")]
	UnsupportedValue {
		/// Variant label of the offending value.
		kind: &'static str,
		/// Why the value was refused.
		reason: &'static str,
	},
	/// Structural problem in binary input.
	#[error("malformed bplist at offset {at}: {reason}")]
	MalformedFile {
		/// Byte offset the problem was detected at.
		at: usize,
		/// Specific defect.
		reason: MalformedReason,
	},
	/// Grammar violation in text input.
	#[error("syntax error at line {line}, column {column}: {reason}")]
	Syntax {
		/// 1-based line number.
		line: usize,
		/// 1-based column, counted in bytes.
		column: usize,
		/// Specific defect.
		reason: SyntaxReason,
	},
	/// Object reference graph revisits an ancestor.
	#[error("cyclic object reference to index {index} at offset {at}")]
	CyclicReference {
		/// Object index that was already on the resolution path.
		index: u64,
		/// Byte offset of the container holding the reference.
		at: usize,
	},
	/// Nesting depth exceeded the configured ceiling.
	#[error("nesting depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: usize,
	},
	/// Decoded node count exceeded the configured budget.
	#[error("decoded node budget exceeded (max={max_nodes})")]
	NodeBudgetExceeded {
		/// Configured node budget.
		max_nodes: usize,
	},
}

impl PlistError {
	/// Classify this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io(_) => ErrorKind::Io,
			Self::UnsupportedValue { .. } => ErrorKind::UnsupportedValue,
			Self::MalformedFile { .. } => ErrorKind::MalformedFile,
			Self::Syntax { .. } => ErrorKind::SyntaxError,
			Self::CyclicReference { .. } => ErrorKind::CyclicReference,
			Self::DepthExceeded { .. } | Self::NodeBudgetExceeded { .. } => ErrorKind::LimitExceeded,
		}
	}

	pub(crate) fn malformed(at: usize, reason: MalformedReason) -> Self {
		Self::MalformedFile { at, reason }
	}

	/// Syntax error with 1-based line and byte column of `pos` in `bytes`.
	pub(crate) fn syntax_at(bytes: &[u8], pos: usize, reason: SyntaxReason) -> Self {
		let pos = pos.min(bytes.len());
		let before = &bytes[..pos];
		let line = before.iter().filter(|byte| **byte == b'\n').count() + 1;
		let line_start = before.iter().rposition(|byte| *byte == b'\n').map_or(0, |idx| idx + 1);
		Self::Syntax {
			line,
			column: pos - line_start + 1,
			reason,
		}
	}

	/// Syntax error naming the character at `pos`, or invalid UTF-8 if none decodes.
	pub(crate) fn unexpected_at(bytes: &[u8], pos: usize) -> Self {
		let rest = bytes.get(pos..).unwrap_or_default();
		let found = match std::str::from_utf8(&rest[..rest.len().min(4)]) {
			Ok(text) => text.chars().next(),
			Err(err) => std::str::from_utf8(&rest[..err.valid_up_to()]).ok().and_then(|text| text.chars().next()),
		};
		match found {
			Some(found) => Self::syntax_at(bytes, pos, SyntaxReason::Unexpected { found }),
			None if rest.is_empty() => Self::syntax_at(bytes, pos, SyntaxReason::UnexpectedEof),
			None => Self::syntax_at(bytes, pos, SyntaxReason::InvalidUtf8),
		}
	}
}

/// Specific defects in binary input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
	/// File does not start with `bplist00`.
	#[error("bad magic")]
	BadMagic,
	/// File is too short to hold magic, one object, and the trailer.
	#[error("truncated trailer")]
	TruncatedTrailer,
	/// Trailer offset or reference width is outside 1..=8.
	#[error("invalid {field} width {width}")]
	BadWidth {
		/// Trailer field name.
		field: &'static str,
		/// Declared width.
		width: u8,
	},
	/// Trailer declares zero objects.
	#[error("empty object table")]
	NoObjects,
	/// Root object index is not below the object count.
	#[error("top object {top} out of range for {count} objects")]
	TopOutOfRange {
		/// Declared root index.
		top: u64,
		/// Declared object count.
		count: u64,
	},
	/// Offset table does not sit between the object table and the trailer.
	#[error("offset table misplaced at {offset}")]
	OffsetTableOutOfRange {
		/// Declared offset table position.
		offset: u64,
	},
	/// A trailer width cannot hold the value it is meant to describe.
	#[error("{field} width {width} too small for {value}")]
	WidthTooSmall {
		/// Trailer field name.
		field: &'static str,
		/// Declared width.
		width: u8,
		/// Value that must fit.
		value: u64,
	},
	/// Offset table entry points outside the object table.
	#[error("object offset {offset} out of range")]
	OffsetOutOfRange {
		/// Offending offset.
		offset: u64,
	},
	/// Object reference is not below the object count.
	#[error("object ref {index} out of range")]
	RefOutOfRange {
		/// Offending object index.
		index: u64,
	},
	/// Marker byte names no known object type.
	#[error("unknown marker 0x{marker:02x}")]
	UnknownMarker {
		/// Raw marker byte.
		marker: u8,
	},
	/// Object payload runs past the end of the object table.
	#[error("object payload needs {need} bytes, {rem} remain")]
	PayloadOutOfRange {
		/// Bytes required.
		need: usize,
		/// Bytes available before the offset table.
		rem: usize,
	},
	/// Extended length is not an integer object or is negative.
	#[error("invalid extended length")]
	BadLength,
	/// ASCII string contains a byte at or above 0x80.
	#[error("non-ascii byte in ascii string")]
	NonAsciiString,
}

/// Specific grammar violations in text input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxReason {
	/// Quoted string reached end of input.
	#[error("unterminated quoted string")]
	UnterminatedQuote,
	/// Block comment reached end of input.
	#[error("unterminated comment")]
	UnterminatedComment,
	/// Backslash sequence is not a recognized escape.
	#[error("invalid escape sequence")]
	InvalidEscape,
	/// Escaped surrogate half without its partner.
	#[error("unpaired surrogate 0x{unit:04x}")]
	UnpairedSurrogate {
		/// Offending UTF-16 unit.
		unit: u16,
	},
	/// Pair or value not followed by `;`.
	#[error("missing ';'")]
	MissingSemicolon,
	/// Expected `=` between key and value.
	#[error("missing '='")]
	MissingEquals,
	/// Dictionary or array delimiters do not match.
	#[error("unbalanced braces")]
	UnbalancedBraces,
	/// Hex data literal contains a non-hex character or odd digit count.
	#[error("invalid data literal")]
	InvalidData,
	/// Character cannot start a token here.
	#[error("unexpected character {found:?}")]
	Unexpected {
		/// Offending character.
		found: char,
	},
	/// Input ended where a token was required.
	#[error("unexpected end of input")]
	UnexpectedEof,
	/// Content continues after the top-level dictionary.
	#[error("trailing content after dictionary")]
	TrailingContent,
	/// Input is not valid UTF-8.
	#[error("invalid utf-8")]
	InvalidUtf8,
	/// Closing tag does not match the open element.
	#[error("mismatched closing tag")]
	MismatchedTag,
	/// Element name is unknown or not allowed here.
	#[error("unexpected element <{name}>")]
	UnexpectedTag {
		/// Element name as written.
		name: String,
	},
	/// Dictionary entry is not a `<key>` followed by one value.
	#[error("dictionary keys and values do not alternate")]
	MisplacedKey,
	/// `<plist>` element holds no value or more than one.
	#[error("plist element must hold exactly one value")]
	PlistArity,
	/// Integer or real text does not parse.
	#[error("invalid number")]
	InvalidNumber,
	/// Date text is not `YYYY-MM-DDTHH:MM:SSZ` or names no calendar time.
	#[error("invalid date")]
	InvalidDate,
	/// Character or entity reference is unknown or names a surrogate.
	#[error("invalid entity reference")]
	InvalidEntity,
	/// Document type declaration carries an internal subset.
	#[error("internal DTD subset is not supported")]
	InternalSubset,
}
