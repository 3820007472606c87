mod status;

pub(crate) use status::{PlainTextStatusFormatter, StatusFormatter};
