mod planning;
mod pre;
mod status;
mod version;

pub use pre::{PreCommand, PreOperation};
pub use status::{StatusOperation, StatusOutput};
pub use version::{PreStateChange, VersionInput, VersionOperation, VersionOutput};
