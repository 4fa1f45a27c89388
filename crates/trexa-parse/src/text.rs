use std::path::Path;

use anyhow::Context;

/// Read a text file as UTF-8, verbatim. Invalid UTF-8 is an error.
pub(crate) fn extract(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {} as UTF-8", path.display()))
}
