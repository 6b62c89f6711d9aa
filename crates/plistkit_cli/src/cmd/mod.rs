/// Binary/text conversion command.
pub mod convert;
/// Single code point escaping command.
pub mod escape;
/// Container summary command.
pub mod info;
/// Value tree printing command.
pub mod show;

pub(crate) mod util;
