//! Seeding a trace from a running process.
//!
//! A live process has already resolved its libraries, so instead of asking
//! the linker we enumerate `/proc/<pid>/map_files` and take the mapped
//! shared objects directly. Unlike per-library lookups, a failure here is
//! fatal: without the memory map there is nothing to seed the walk with.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::graph::{DepGraph, NameMode};
use crate::trace::{basename, Introspect, Traverser};

/// Trace the dependency closure of a running process.
///
/// Emits one edge from the process's command name to each mapped shared
/// object, then expands each mapped library through the normal traversal.
/// Names are rendered with the `.so` suffix stripped.
///
/// # Errors
///
/// Fails if the comm file cannot be read, or if the memory-map listing
/// fails even after the one `sudo` retry.
pub fn trace_process_with<I: Introspect>(tools: &I, pid: u32) -> Result<DepGraph> {
    let comm = read_comm(pid)?;
    let libs = mapped_shared_objects(pid)?;
    info!(
        "tracing shared objects of command {comm} with {} mapped .so files",
        libs.len()
    );

    let seed = seed_map(&libs);
    let mut traverser = Traverser::new(tools, NameMode::StripSuffix);
    for name in seed.keys() {
        traverser.link(&comm, name);
    }
    for (name, path) in &seed {
        if !traverser.is_visited(path) {
            traverser.expand(path, basename(name), 1);
        }
    }
    Ok(traverser.into_graph())
}

/// Short command name of the process, from `/proc/<pid>/comm`.
fn read_comm(pid: u32) -> Result<String> {
    let comm = fs::read_to_string(format!("/proc/{pid}/comm"))?;
    Ok(comm.trim().to_string())
}

/// Shared objects currently mapped into the process, deduplicated by path.
///
/// Tries to read the map directory natively first; on failure (commonly
/// permission denied for another user's process) retries once via
/// `sudo ls -l`. A second failure is fatal.
fn mapped_shared_objects(pid: u32) -> Result<BTreeSet<PathBuf>> {
    let dir = PathBuf::from(format!("/proc/{pid}/map_files"));
    let targets = match read_map_targets(&dir) {
        Ok(targets) => targets,
        Err(e) => {
            warn!(pid, "map listing failed: {e}");
            info!(pid, "retrying map listing under sudo");
            sudo_map_targets(pid, &dir)?
        }
    };
    Ok(shared_objects(targets))
}

/// Resolve every mapping symlink in the map directory.
fn read_map_targets(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut targets = Vec::new();
    for entry in fs::read_dir(dir)? {
        targets.push(fs::read_link(entry?.path())?);
    }
    Ok(targets)
}

/// Privilege-escalated retry of the map listing.
fn sudo_map_targets(pid: u32, dir: &Path) -> Result<Vec<PathBuf>> {
    let output = Command::new("sudo")
        .args(["ls", "-l"])
        .arg(dir)
        .output()
        .map_err(|e| Error::process_maps(pid, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::process_maps(pid, stderr.trim().to_string()));
    }

    Ok(parse_map_listing(&String::from_utf8_lossy(&output.stdout)))
}

/// Extract symlink targets from `ls -l` output of a map directory.
#[must_use]
pub fn parse_map_listing(output: &str) -> Vec<PathBuf> {
    output
        .lines()
        .filter_map(|line| line.split_once(" -> "))
        .map(|(_, target)| PathBuf::from(target.trim()))
        .collect()
}

/// Keep mapped paths that look like shared objects, sorted and deduplicated.
fn shared_objects(targets: Vec<PathBuf>) -> BTreeSet<PathBuf> {
    targets
        .into_iter()
        .filter(|p| p.to_string_lossy().contains(".so"))
        .collect()
}

/// Build the seed mapping from library basename to its mapped path.
///
/// No linker invocation is needed; the process has already resolved
/// everything.
fn seed_map(libs: &BTreeSet<PathBuf>) -> BTreeMap<String, PathBuf> {
    libs.iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            Some((name.to_string(), path.clone()))
        })
        .collect()
}
