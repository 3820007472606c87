mod document;
mod error;
mod patch;
mod writer;

pub use document::{ManifestDocument, detect_indent};
pub use error::ManifestError;
pub use patch::{
    DependencyUpdate, ManifestPatch, PatchOptions, ReleasedVersion, plan_patch, rewrite_range,
    should_update_dependency,
};
pub use writer::apply_patch;
