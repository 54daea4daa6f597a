//! Dichotomous key pipeline.
//!
//! Raw OCR text goes through the line parser into step records, the tree
//! builder resolves them into nodes, and the key store persists the result.

mod builder;
mod error;
mod outline;
mod parser;
mod schema;
mod store;

use std::path::Path;

pub use builder::{build, BuildOutput, BuildReport, Conflict, DanglingRef};
pub use error::{KeyError, KeyResult};
pub use outline::outline;
pub use parser::{parse_document, parse_file, parse_line};
pub use schema::{prime_weight, Goto, Node, StepId, StepRecord, END, PRIME};
pub use store::{Issue, KeyStore};

/// Parse and build a key from an OCR text file.
pub fn build_file(input: &Path) -> KeyResult<BuildOutput> {
    let records = parse_file(input)?;
    Ok(build(records))
}

/// Run the full pipeline and persist the key.
///
/// With `strict`, any conflict or dangling reference rejects the build. In
/// every failure case the output file is left untouched.
pub fn build_and_save(input: &Path, output: &Path, strict: bool) -> KeyResult<BuildOutput> {
    let out = build_file(input)?;
    if strict {
        out.report.ensure_clean()?;
    }
    out.store.save(output)?;
    Ok(out)
}
