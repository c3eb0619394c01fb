//! Host tool invocation: `readelf` for declared dependencies, `ldd` for
//! linker resolution.
//!
//! Both lookups are best-effort. A tool that fails to spawn, exits non-zero,
//! or emits non-UTF-8 output is logged at warn level and reported as an
//! absent result; the traversal treats the affected node as a leaf. Output
//! parsing is split into free functions so it can be tested without the
//! tools installed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::trace::Introspect;

/// Introspection backed by the host's binutils and dynamic linker.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostTools;

impl HostTools {
    /// Create a host-backed introspector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Introspect for HostTools {
    fn list_dependencies(&self, path: &Path) -> Option<Vec<String>> {
        let output = run_tool(Command::new("readelf").arg("-d").arg(path))?;
        let deps = parse_needed(&output);
        debug!(path = %path.display(), count = deps.len(), "declared dependencies");
        Some(deps)
    }

    fn resolve(&self, path: &Path, deps: &[String]) -> Option<HashMap<String, PathBuf>> {
        let output = run_tool(Command::new("ldd").arg(path))?;
        Some(parse_ldd(&output, deps))
    }
}

/// Run a command and return its stdout, or `None` with a warning on any
/// failure.
fn run_tool(cmd: &mut Command) -> Option<String> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let output = match cmd.output() {
        Ok(output) => output,
        Err(e) => {
            warn!(tool = %program, "failed to spawn: {e}");
            return None;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(tool = %program, status = %output.status, "tool failed: {}", stderr.trim());
        return None;
    }

    match String::from_utf8(output.stdout) {
        Ok(stdout) => Some(stdout),
        Err(e) => {
            warn!(tool = %program, "non-UTF-8 output: {e}");
            None
        }
    }
}

/// Extract declared dependency names from `readelf -d` output.
///
/// Keeps lines whose dynamic tag is `(NEEDED)` and returns the bracketed
/// shared-object name from each, in the order reported.
#[must_use]
pub fn parse_needed(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains("(NEEDED)"))
        .filter_map(|line| {
            let start = line.find('[')? + 1;
            let end = line[start..].find(']')? + start;
            Some(line[start..end].to_string())
        })
        .collect()
}

/// Extract a name-to-path mapping from `ldd` output, restricted to `deps`.
///
/// Only lines with the ` => ` resolution arrow contribute; the right-hand
/// side has its trailing ` (0x...)` load address stripped. Unresolved
/// entries (`=> not found`) and arrow-less lines (vdso, the loader itself)
/// are skipped silently.
#[must_use]
pub fn parse_ldd(output: &str, deps: &[String]) -> HashMap<String, PathBuf> {
    let mut mapping = HashMap::new();
    for line in output.lines() {
        let Some((lhs, rhs)) = line.split_once(" => ") else {
            continue;
        };
        let name = lhs.trim();
        if !deps.iter().any(|d| d == name) {
            continue;
        }
        let path = rhs.split(" (").next().unwrap_or(rhs).trim();
        if path.is_empty() || path == "not found" {
            continue;
        }
        mapping.insert(name.to_string(), PathBuf::from(path));
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    const READELF_OUTPUT: &str = "
Dynamic section at offset 0x2d50 contains 27 entries:
  Tag        Type                         Name/Value
 0x0000000000000001 (NEEDED)             Shared library: [libpthread.so.0]
 0x0000000000000001 (NEEDED)             Shared library: [libc.so.6]
 0x000000000000000c (INIT)               0x1000
 0x000000006ffffffb (FLAGS_1)            Flags: PIE
";

    #[test]
    fn parse_needed_extracts_names_in_order() {
        let deps = parse_needed(READELF_OUTPUT);
        assert_eq!(deps, vec!["libpthread.so.0", "libc.so.6"]);
    }

    #[test]
    fn parse_needed_ignores_other_tags() {
        let deps = parse_needed(" 0x000000000000000e (SONAME) Library soname: [libz.so.1]\n");
        assert!(deps.is_empty());
    }

    #[test]
    fn parse_needed_empty_output() {
        assert!(parse_needed("").is_empty());
    }

    const LDD_OUTPUT: &str = "\
\tlinux-vdso.so.1 (0x00007ffd0a1f2000)
\tlibpthread.so.0 => /lib/x86_64-linux-gnu/libpthread.so.0 (0x00007f39cbb64000)
\tlibc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x00007f39cb972000)
\tlibmissing.so.9 => not found
\t/lib64/ld-linux-x86-64.so.2 (0x00007f39cbb8b000)
";

    fn deps(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parse_ldd_maps_resolved_entries() {
        let map = parse_ldd(
            LDD_OUTPUT,
            &deps(&["libpthread.so.0", "libc.so.6", "libmissing.so.9"]),
        );

        assert_eq!(map.len(), 2);
        assert_eq!(
            map["libpthread.so.0"],
            PathBuf::from("/lib/x86_64-linux-gnu/libpthread.so.0")
        );
        assert_eq!(
            map["libc.so.6"],
            PathBuf::from("/lib/x86_64-linux-gnu/libc.so.6")
        );
    }

    #[test]
    fn parse_ldd_drops_not_found() {
        let map = parse_ldd(LDD_OUTPUT, &deps(&["libmissing.so.9"]));
        assert!(map.is_empty());
    }

    #[test]
    fn parse_ldd_restricts_to_declared_deps() {
        // libc resolves in the output but was not declared by this node.
        let map = parse_ldd(LDD_OUTPUT, &deps(&["libpthread.so.0"]));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key("libc.so.6"));
    }

    #[test]
    fn parse_ldd_skips_arrowless_lines() {
        let map = parse_ldd(
            "\tlinux-vdso.so.1 (0x00007ffd0a1f2000)\n",
            &deps(&["linux-vdso.so.1"]),
        );
        assert!(map.is_empty());
    }

    #[test]
    fn parse_ldd_strips_load_address() {
        let map = parse_ldd(
            "\tlibz.so.1 => /usr/lib/libz.so.1 (0x00007f0000000000)\n",
            &deps(&["libz.so.1"]),
        );
        assert_eq!(map["libz.so.1"], PathBuf::from("/usr/lib/libz.so.1"));
    }
}
