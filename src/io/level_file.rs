//! Level JSON persistence

use crate::io::error::{GenerationError, Result, WithPath};
use crate::model::level::Level;
use std::fs;
use std::path::{Path, PathBuf};

/// Location of a level file inside `directory`
pub fn level_path(directory: &Path, level_id: u32) -> PathBuf {
    directory.join(format!("level_{level_id}.json"))
}

/// Write a level as pretty-printed JSON
///
/// # Errors
///
/// Returns `Persistence` if the file exists and `overwrite` is false, or if
/// the directory or file cannot be written
pub fn write_level(directory: &Path, level: &Level, overwrite: bool) -> Result<PathBuf> {
    let path = level_path(directory, level.id);
    if path.exists() && !overwrite {
        return Err(GenerationError::Persistence {
            path,
            operation: "write level",
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "level file exists; enable overwrite to replace it",
            ),
        });
    }

    fs::create_dir_all(directory).with_path(directory, "create level directory")?;
    let json = serde_json::to_string_pretty(level).with_path(&path, "encode level")?;
    fs::write(&path, json).with_path(&path, "write level")?;
    Ok(path)
}

/// Read a level file
///
/// # Errors
///
/// Returns `Persistence` if the file cannot be read or `Serialization` if it
/// is not a level
pub fn read_level(path: &Path) -> Result<Level> {
    let contents = fs::read_to_string(path).with_path(path, "read level")?;
    serde_json::from_str(&contents).with_path(path, "decode level")
}

/// Expand files and directories into a sorted list of JSON files
///
/// # Errors
///
/// Returns `Persistence` for a path that does not exist or a directory that
/// cannot be listed
pub fn collect_level_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found = Vec::new();
            for entry in fs::read_dir(path).with_path(path, "list levels")? {
                let candidate = entry.with_path(path, "list levels")?.path();
                if candidate.extension().is_some_and(|ext| ext == "json") {
                    found.push(candidate);
                }
            }
            found.sort();
            files.extend(found);
        } else {
            return Err(GenerationError::Persistence {
                path: path.clone(),
                operation: "locate levels",
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            });
        }
    }

    Ok(files)
}
