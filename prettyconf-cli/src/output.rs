//! Output writers for `prettyconf`.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};
use tracing::debug;

use crate::error::CliError;

/// Writes `content` to `path`, or to standard output when `path` is unset.
///
/// Parent directories of `path` are created as needed.
///
/// # Errors
///
/// Returns [`CliError::Io`] when the file cannot be written and
/// [`CliError::Stdout`] when standard output is closed.
pub fn emit(path: Option<&Utf8Path>, content: &str) -> Result<(), CliError> {
    match path {
        Some(file) => write_file(file, content).map(|written| {
            debug!(path = %written, "wrote rendered document");
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(CliError::Stdout)
        }
    }
}

/// Writes `content` to `path` through a capability handle on its parent.
fn write_file(path: &Utf8Path, content: &str) -> Result<Utf8PathBuf, CliError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let filename = path.file_name().ok_or_else(|| CliError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "output path has no file name"),
    })?;
    let dir = ensure_dir(parent)?;

    let mut file = dir
        .open_with(
            filename,
            OpenOptions::new().write(true).create(true).truncate(true),
        )
        .map_err(|io_err| CliError::Io {
            path: path.to_path_buf(),
            source: io_err,
        })?;
    file.write_all(content.as_bytes())
        .map_err(|io_err| CliError::Io {
            path: path.to_path_buf(),
            source: io_err,
        })?;

    Ok(path.to_path_buf())
}

fn ensure_dir(path: &Utf8Path) -> Result<Dir, CliError> {
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(dir),
        Err(open_err) if open_err.kind() == std::io::ErrorKind::NotFound => {
            Dir::create_ambient_dir_all(path, ambient_authority()).map_err(|io_err| {
                CliError::Io {
                    path: path.to_path_buf(),
                    source: io_err,
                }
            })?;
            Dir::open_ambient_dir(path, ambient_authority()).map_err(|io_err| CliError::Io {
                path: path.to_path_buf(),
                source: io_err,
            })
        }
        Err(open_err) => Err(CliError::Io {
            path: path.to_path_buf(),
            source: open_err,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn creates_missing_parent_directories() {
        let temp = tempfile::tempdir().expect("create tempdir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 tempdir");
        let target = root.join("nested/out/config.yaml");

        emit(Some(&target), "a: 1\n").expect("write output");
        emit(Some(&target), "b: 2\n").expect("overwrite output");

        let written = std::fs::read_to_string(&target).expect("read output");
        assert_eq!(written, "b: 2\n");
    }

    #[rstest]
    fn rejects_paths_without_file_names() {
        let err = emit(Some(Utf8Path::new("/")), "a: 1\n").expect_err("root has no file name");
        assert!(matches!(err, CliError::Io { .. }), "unexpected error {err:?}");
    }
}
