//! The dependency-graph traversal core.
//!
//! [`Traverser`] walks the transitive shared-object closure of a starting
//! binary, using an [`Introspect`] implementation for the actual host lookups.
//! A visited set of resolved paths guarantees each library is expanded at most
//! once, which both bounds the walk to the size of the dependency closure and
//! breaks cycles.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::graph::{DepGraph, NameMode};

/// Host introspection operations the traverser depends on.
///
/// The real implementation shells out to `readelf` and `ldd`
/// ([`crate::host::HostTools`]); tests substitute an in-memory fake with a
/// synthetic dependency graph.
pub trait Introspect {
    /// List the shared-object names `path` declares as required, in the order
    /// the dynamic section reports them.
    ///
    /// `None` means the lookup failed (not an ELF, permission denied, tool
    /// missing). Callers treat that as "no dependencies discovered", not as a
    /// fatal error.
    fn list_dependencies(&self, path: &Path) -> Option<Vec<String>>;

    /// Resolve declared dependency names of `path` to absolute paths, as the
    /// dynamic linker would load them. The result is restricted to names
    /// present in `deps`; names the linker could not resolve are absent.
    ///
    /// `None` means the resolution tool itself failed; callers treat that as
    /// "nothing resolved".
    fn resolve(&self, path: &Path, deps: &[String]) -> Option<HashMap<String, PathBuf>>;
}

/// Recursive walker that builds a [`DepGraph`] from host lookups.
///
/// All state lives for one run: the visited set of resolved paths and the
/// accumulated edge set. Recursion depth is tracked for logging only; cycles
/// are broken solely by the visited set.
pub struct Traverser<'a, I: Introspect> {
    tools: &'a I,
    mode: NameMode,
    visited: HashSet<PathBuf>,
    graph: DepGraph,
}

impl<'a, I: Introspect> Traverser<'a, I> {
    /// Create a traverser with an empty visited set and graph.
    pub fn new(tools: &'a I, mode: NameMode) -> Self {
        Self {
            tools,
            mode,
            visited: HashSet::new(),
            graph: DepGraph::new(),
        }
    }

    /// Whether a resolved path has already been expanded.
    #[must_use]
    pub fn is_visited(&self, path: &Path) -> bool {
        self.visited.contains(path)
    }

    /// Add a depends-on edge, rendering both endpoints under the run's
    /// naming mode.
    pub fn link(&mut self, from: &str, to: &str) {
        self.graph
            .add_edge(self.mode.display(from), self.mode.display(to));
    }

    /// Expand one library: list its declared dependencies, resolve them, emit
    /// an edge per resolved dependency, and recurse into each resolved path
    /// not yet visited.
    ///
    /// A declared name that fails to resolve produces neither an edge nor a
    /// recursion. A failed resolution call makes this node a leaf.
    pub fn expand(&mut self, path: &Path, display_name: &str, depth: u32) {
        trace!(depth, path = %path.display(), "expanding");
        self.visited.insert(path.to_path_buf());

        let deps = self.tools.list_dependencies(path).unwrap_or_default();
        let Some(resolved) = self.tools.resolve(path, &deps) else {
            return;
        };

        for dep in &deps {
            let Some(target) = resolved.get(dep) else {
                continue;
            };
            self.link(display_name, dep);

            if !self.visited.contains(target.as_path()) {
                let target = target.clone();
                self.visited.insert(target.clone());
                let dep_name = basename(dep);
                self.expand(&target, dep_name, depth + 1);
            }
        }
    }

    /// Finish the walk and take the graph.
    #[must_use]
    pub fn into_graph(self) -> DepGraph {
        self.graph
    }
}

/// Final path component of a dependency name, as a display name.
///
/// Declared names are usually bare (`libfoo.so.1`) but some binaries record
/// loader paths like `/lib64/ld-linux-x86-64.so.2`.
#[must_use]
pub fn basename(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
}

/// Trace the dependency closure of a binary on disk.
///
/// `display_name` labels the root node; failures to inspect any single
/// library leave that node a leaf and never abort the walk.
pub fn trace_binary_with<I: Introspect>(tools: &I, target: &Path, display_name: &str) -> DepGraph {
    let mut traverser = Traverser::new(tools, NameMode::KeepSuffix);
    traverser.expand(target, display_name, 0);
    traverser.into_graph()
}
