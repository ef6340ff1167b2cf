//! Places a panel can be rooted at
//!
//! Drive letters on Windows. Elsewhere `/` plus the usual mount directories
//! and whatever is mounted directly under them.

use std::collections::HashSet;
use tokio::fs;
use tracing::debug;

use crate::nav::NavPath;

/// Mount directories checked on non-Windows platforms
pub const MOUNT_DIRS: [&str; 4] = ["/", "/mnt", "/media", "/run/media"];

/// Roots available on this machine, in display order
pub async fn list_roots() -> Vec<NavPath> {
    if cfg!(windows) {
        list_drives().await
    } else {
        let candidates: Vec<NavPath> = MOUNT_DIRS
            .iter()
            .filter_map(|dir| NavPath::parse(dir).ok())
            .collect();
        list_mount_points(&candidates).await
    }
}

/// Drive roots `A:\` to `Z:\` that exist
pub async fn list_drives() -> Vec<NavPath> {
    let mut drives = Vec::new();
    for letter in 'A'..='Z' {
        let Ok(drive) = NavPath::parse(&format!("{letter}:\\")) else {
            continue;
        };
        if is_dir(&drive).await {
            drives.push(drive);
        }
    }
    debug!("Found {} drive(s)", drives.len());
    drives
}

/// Each existing candidate followed by its subdirectories, without repeats
pub async fn list_mount_points(candidates: &[NavPath]) -> Vec<NavPath> {
    let mut roots: Vec<NavPath> = Vec::new();
    for candidate in candidates {
        if !is_dir(candidate).await {
            continue;
        }
        roots.push(candidate.clone());

        let mut children = match subdirectories(candidate).await {
            Ok(children) => children,
            Err(e) => {
                debug!("Not listing mounts under {}: {}", candidate, e);
                continue;
            }
        };
        children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        roots.extend(children);
    }

    let mut seen = HashSet::new();
    roots.retain(|root| seen.insert(root.clone()));
    roots
}

async fn is_dir(path: &NavPath) -> bool {
    fs::metadata(path.to_native())
        .await
        .is_ok_and(|meta| meta.is_dir())
}

async fn subdirectories(dir: &NavPath) -> std::io::Result<Vec<NavPath>> {
    let mut read_dir = fs::read_dir(dir.to_native()).await?;
    let mut children = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if fs::metadata(entry.path())
            .await
            .is_ok_and(|meta| meta.is_dir())
        {
            children.push(dir.join(&name));
        }
    }
    Ok(children)
}
