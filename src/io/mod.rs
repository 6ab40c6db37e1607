//! Local file I/O: history ingest, inline payload validation, exports.

pub mod export;
pub mod history;
pub mod input;
