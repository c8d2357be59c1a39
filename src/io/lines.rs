use std::io::Write;
use std::path::Path;

use atomic_write_file::AtomicWriteFile;

use crate::error::{CatalogError, Result};

const UTF8_BOM: char = '\u{feff}';

/// Read `path` as UTF-8, dropping a leading byte-order mark.
pub fn read_text(path: &Path) -> Result<String> {
    let text = fs_err::read_to_string(path).map_err(|err| CatalogError::from_read(path, err))?;
    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Non-blank lines of `path`, without their line terminators.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = read_text(path)?;
    Ok(text
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Replace `path` with one line per item. The file is swapped in by rename, so readers never
/// observe a half-written file.
pub fn write_lines_atomic<I, S>(path: &Path, lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut body = String::new();
    for line in lines {
        body.push_str(line.as_ref());
        body.push('\n');
    }

    let mut file =
        AtomicWriteFile::open(path).map_err(|err| CatalogError::persistence(path, err))?;
    file.write_all(body.as_bytes())
        .map_err(|err| CatalogError::persistence(path, err))?;
    file.commit()
        .map_err(|err| CatalogError::persistence(path, err))?;
    Ok(())
}

/// Append one line per item to an existing file and sync it.
pub fn append_lines<I, S>(path: &Path, lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut file = fs_err::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => CatalogError::MissingFile {
                path: path.to_path_buf(),
            },
            _ => CatalogError::persistence(path, err),
        })?;
    let mut body = String::new();
    for line in lines {
        body.push_str(line.as_ref());
        body.push('\n');
    }
    file.write_all(body.as_bytes())
        .map_err(|err| CatalogError::persistence(path, err))?;
    file.sync_all()
        .map_err(|err| CatalogError::persistence(path, err))?;
    Ok(())
}

/// Create an empty file at `path` unless one exists. Returns whether a file was created.
pub fn create_empty_if_absent(path: &Path) -> Result<bool> {
    match fs_err::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => {
            file.sync_all()
                .map_err(|err| CatalogError::persistence(path, err))?;
            Ok(true)
        }
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(CatalogError::persistence(path, err)),
    }
}
