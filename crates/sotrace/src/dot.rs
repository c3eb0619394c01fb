//! Graphviz DOT output.
//!
//! The graph is written to a sibling `<out>.tmp` file and renamed onto the
//! target only after a complete write, so an interrupted or failed run never
//! leaves a truncated graph file behind.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::graph::DepGraph;

/// Write the graph as a `digraph` to `path`, atomically.
///
/// One edge statement per distinct edge, in whatever order the graph yields
/// them. Node names are quoted but not otherwise escaped.
///
/// # Errors
///
/// Fails if the temporary file cannot be created or written, or if the
/// final rename fails.
pub fn write_dot(path: &Path, graph: &DepGraph) -> Result<()> {
    let tmp = tmp_path(path);
    let mut out = BufWriter::new(File::create(&tmp)?);

    writeln!(out, "digraph G {{")?;
    writeln!(out, "  rankdir = LR;")?;
    for (from, to) in graph.edges() {
        writeln!(out, "\"{from}\" -> \"{to}\"")?;
    }
    writeln!(out, "}}")?;
    out.into_inner().map_err(std::io::IntoInnerError::into_error)?;

    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), edges = graph.edge_count(), "wrote graph");
    Ok(())
}

fn tmp_path(path: &Path) -> OsString {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(&PathBuf::from("out.dot")),
            OsString::from("out.dot.tmp")
        );
    }
}
