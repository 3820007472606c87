mod error;
mod parse;

pub use error::{FormatError, FrontMatterError, ReleaseListError};
pub use parse::parse_changeset;
