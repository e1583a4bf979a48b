use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use super::stats::TreeStats;

/// Traversal depth cap. Symlinks are never followed, so this only matters
/// for filesystems that allow real directory cycles.
const MAX_DEPTH: usize = 64;

/// Walk the tree rooted at `root` and collect its timestamp statistics.
///
/// Every entry (the root included, directories included) contributes its
/// mtime; only regular files are counted. Fails if the root does not exist
/// or any entry cannot be statted or listed.
pub fn scan_tree(root: &Path) -> Result<TreeStats> {
    let mut stats = TreeStats::default();
    visit(root, 0, &mut stats)?;
    Ok(stats)
}

fn visit(path: &Path, depth: usize, stats: &mut TreeStats) -> Result<()> {
    if depth > MAX_DEPTH {
        bail!(
            "Directory tree deeper than {} levels at {:?}, giving up",
            MAX_DEPTH,
            path
        );
    }

    // symlink_metadata: a link is an opaque entry timestamped by its own
    // metadata, not something to follow.
    let meta =
        fs::symlink_metadata(path).with_context(|| format!("Failed to stat {:?}", path))?;
    let mtime = meta
        .modified()
        .with_context(|| format!("No modification time for {:?}", path))?;
    stats.record(mtime);

    if meta.is_dir() {
        let entries =
            fs::read_dir(path).with_context(|| format!("Failed to list {:?}", path))?;
        for entry in entries {
            let entry =
                entry.with_context(|| format!("Failed to read an entry of {:?}", path))?;
            visit(&entry.path(), depth + 1, stats)?;
        }
    } else if meta.is_file() {
        stats.count += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::ErrorKind;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn secs(n: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(n)
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let dir = tempdir().unwrap();
        let err = scan_tree(&dir.path().join("nope")).unwrap_err();
        let io = err
            .downcast_ref::<std::io::Error>()
            .expect("should carry the io error");
        assert_eq!(io.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_empty_dir_has_timestamps_but_no_files() {
        let dir = tempdir().unwrap();
        let stats = scan_tree(dir.path()).unwrap();
        assert_eq!(stats.count, 0);
        // The root directory itself was visited.
        assert!(stats.youngest.is_some());
        assert!(stats.oldest.is_some());
        assert_eq!(stats.youngest, stats.oldest);
    }

    #[test]
    fn test_counts_files_not_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("root.scss"), "x").unwrap();
        fs::write(dir.path().join("a/one.scss"), "x").unwrap();
        fs::write(dir.path().join("a/b/two.scss"), "x").unwrap();

        let stats = scan_tree(dir.path()).unwrap();
        assert_eq!(stats.count, 3);
        assert!(stats.oldest <= stats.youngest);
    }

    #[test]
    fn test_file_mtimes_drive_extremes() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("old.scss");
        let new = dir.path().join("new.scss");
        fs::write(&old, "x").unwrap();
        fs::write(&new, "x").unwrap();
        File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(secs(1_000))
            .unwrap();
        // Push the newest file far past the directory's own mtime.
        let future = SystemTime::now() + Duration::from_secs(100_000);
        File::options()
            .write(true)
            .open(&new)
            .unwrap()
            .set_modified(future)
            .unwrap();

        let stats = scan_tree(dir.path()).unwrap();
        assert_eq!(stats.oldest, Some(secs(1_000)));
        assert_eq!(stats.youngest, Some(future));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        fs::write(real.join("inside.scss"), "x").unwrap();

        let scanned = dir.path().join("scanned");
        fs::create_dir(&scanned).unwrap();
        fs::write(scanned.join("own.scss"), "x").unwrap();
        std::os::unix::fs::symlink(&real, scanned.join("link")).unwrap();
        // A cycle back into the scanned tree must not recurse either.
        std::os::unix::fs::symlink(&scanned, scanned.join("cycle")).unwrap();

        let stats = scan_tree(&scanned).unwrap();
        // Only own.scss counts; the links are opaque entries.
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn test_depth_bound() {
        let dir = tempdir().unwrap();
        let mut path = dir.path().to_path_buf();
        for _ in 0..(MAX_DEPTH + 2) {
            path.push("d");
        }
        fs::create_dir_all(&path).unwrap();

        let err = scan_tree(dir.path()).unwrap_err();
        assert!(err.to_string().contains("deeper than"));
    }
}
