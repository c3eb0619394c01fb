//! # sotrace: shared-object dependency graph tracer
//!
//! Discovers the transitive shared-library dependency graph of a binary on
//! disk or a running process, and writes it as a Graphviz DOT file:
//!
//! ```sh
//! sotrace /usr/bin/curl out.dot && dot -Tsvg out.dot > out.svg
//! sotrace 1234 out.dot
//! ```
//!
//! Declared dependencies come from the binary's dynamic section (`readelf`),
//! resolved paths from the dynamic linker (`ldd`), and process seeds from
//! `/proc/<pid>/map_files`. The walk expands each resolved library at most
//! once, so cyclic dependency graphs terminate.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::path::Path;
//!
//! let graph = sotrace::trace_binary(Path::new("/usr/bin/curl"));
//! sotrace::dot::write_dot(Path::new("out.dot"), &graph)?;
//! # Ok::<(), sotrace::Error>(())
//! ```

pub mod dot;
pub mod error;
pub mod graph;
pub mod host;
pub mod process;
pub mod trace;

pub use error::{Error, Result};
pub use graph::{DepGraph, NameMode};

use std::path::Path;

use host::HostTools;

/// Trace the dependency closure of a binary or shared library on disk.
///
/// Node names keep their full version suffix. Per-library inspection
/// failures are logged and leave that node a leaf; this operation itself
/// cannot fail.
#[must_use]
pub fn trace_binary(target: &Path) -> DepGraph {
    let name = target
        .file_name()
        .map_or_else(|| target.display().to_string(), |n| n.to_string_lossy().into_owned());
    trace::trace_binary_with(&HostTools::new(), target, &name)
}

/// Trace the dependency closure of a running process.
///
/// Node names have their `.so` suffix stripped.
///
/// # Errors
///
/// Fails if the process's memory map cannot be enumerated even after the
/// privilege-escalated retry, or its comm file cannot be read.
pub fn trace_process(pid: u32) -> Result<DepGraph> {
    process::trace_process_with(&HostTools::new(), pid)
}
