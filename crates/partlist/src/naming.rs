use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PartListError;

/// Builds the path for partition `index` of a list created at `prefix`,
/// per the `<prefix>.NNNNN` (optionally `.gz`) naming convention.
pub(crate) fn partition_filename(prefix: &Path, index: u32, compressed: bool) -> PathBuf {
    let mut name = prefix
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    name.push_str(&format!(".{index:05}"));
    if compressed {
        name.push_str(".gz");
    }
    match prefix.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => PathBuf::from(name),
    }
}

/// Finds every file matching `<prefix>.NNNNN[.gz]` next to `prefix`,
/// returning them ordered by ascending partition index.
pub(crate) fn discover_partitions(prefix: &Path) -> Result<Vec<PathBuf>, PartListError> {
    let (dir, base) = match prefix.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => (parent.to_path_buf(), prefix.file_name()),
        _ => (PathBuf::from("."), prefix.file_name()),
    };
    let base = base
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let entries = fs::read_dir(&dir).map_err(|source| PartListError::Open {
        path: dir.clone(),
        source,
    })?;

    let mut found: Vec<(u32, PathBuf)> = Vec::new();
    let needle = format!("{base}.");
    for entry in entries {
        let entry = entry.map_err(|source| PartListError::Open {
            path: dir.clone(),
            source,
        })?;
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        let Some(rest) = file_name.strip_prefix(&needle) else {
            continue;
        };
        let digits = rest.strip_suffix(".gz").unwrap_or(rest);
        if digits.len() == 5
            && digits.chars().all(|c| c.is_ascii_digit())
            && let Ok(index) = digits.parse::<u32>()
        {
            found.push((index, entry.path()));
        }
    }

    if found.is_empty() {
        return Err(PartListError::NoPartitions {
            prefix: prefix.to_path_buf(),
        });
    }

    found.sort_by_key(|(index, _)| *index);
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_filename_zero_pads_to_five_digits() {
        let path = partition_filename(Path::new("/tmp/out"), 3, false);
        assert_eq!(path, PathBuf::from("/tmp/out.00003"));
    }

    #[test]
    fn partition_filename_appends_gz_suffix_when_compressed() {
        let path = partition_filename(Path::new("/tmp/out"), 12, true);
        assert_eq!(path, PathBuf::from("/tmp/out.00012.gz"));
    }

    #[test]
    fn partition_filename_handles_bare_prefix() {
        let path = partition_filename(Path::new("out"), 0, false);
        assert_eq!(path, PathBuf::from("out.00000"));
    }
}
