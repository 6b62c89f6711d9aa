mod bytes;
mod decode;
mod detect;
mod encode;
mod error;
mod escape;
mod marker;
mod nextstep;
mod text_decode;
mod text_encode;
mod trailer;
mod value;
mod xml_decode;
mod xml_encode;

/// Binary `bplist00` decoding entry points and limits.
pub use decode::{DecodeOptions, decode_binary, decode_binary_with};
/// Input format sniffing.
pub use detect::{Format, detect_format};
/// Binary `bplist00` encoding entry points and policies.
pub use encode::{Dedup, EncodeOptions, Profile, encode_binary, encode_binary_with};
/// Error and result aliases.
pub use error::{ErrorKind, MalformedReason, PlistError, Result, SyntaxReason};
/// Per-character escaping for the text grammar.
pub use escape::{EscapeConfig, EscapePreset, Escaped, Quote, UnescapedSet, unescape_sequence};
/// Marker byte classification.
pub use marker::Marker;
/// Text grammar decoding entry points.
pub use text_decode::{TextDecodeOptions, decode_text};
/// Text grammar encoding entry points.
pub use text_encode::{TextEncodeOptions, TextVariant, encode_text};
/// Binary trailer representation.
pub use trailer::Trailer;
/// Value model types.
pub use value::{IntWidth, Value};
/// XML property-list decoding entry points.
pub use xml_decode::{XmlDecodeOptions, decode_xml};
/// XML property-list encoding entry points.
pub use xml_encode::{XML_DOCTYPE_PUBLIC, XmlEncodeOptions, encode_xml};
