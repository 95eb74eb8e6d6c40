//! Document interchange features: logical structure (tagged PDF) and
//! embedded files.

pub(crate) mod embed;
pub(crate) mod tagging;

pub use tagging::StructureType;
