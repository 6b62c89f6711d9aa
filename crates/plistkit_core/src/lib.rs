//! Property list serialization core for the `bplist00` binary container and the
//! OpenStep / `.strings` text grammar.

/// Value model, escape engine, and binary/text codecs.
pub mod plist;
