//! FHIR search compilation and URL rendering.

pub mod types;
pub mod compiler;
pub mod url;

pub use types::*;
pub use compiler::compile;
pub use url::{render_url, DEFAULT_FHIR_BASE_URL};
