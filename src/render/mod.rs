//! Output renderers. HTML mirrors the source layout one page per file;
//! JSON is a single tree for tooling.

pub mod html;
pub mod json;
