use std::ffi::OsStr;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use flate2::read::MultiGzDecoder;
use wildmatch::WildMatch;

use crate::SourceError;

/// Every regular file next to `base` whose name starts with `base`'s name:
/// the live log plus its rotated (`.1`) and compressed (`.2.gz`) copies.
/// Sorted by path.
pub(crate) fn family_files(base: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let dir = match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = base
        .file_name()
        .map(OsStr::to_string_lossy)
        .unwrap_or_default();
    let pattern = WildMatch::new(&format!("{name}*"));

    let entries = std::fs::read_dir(dir).map_err(|source| SourceError::Open {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .is_some_and(|file_name| pattern.matches(&file_name.to_string_lossy()))
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Feed each line of `path` to `on_line`, decompressing `.gz` files. Lines
/// are decoded as lossy UTF-8 with trailing whitespace removed. Returns the
/// number of lines read.
pub(crate) fn read_lines(path: &Path, mut on_line: impl FnMut(&str)) -> Result<usize, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader: Box<dyn BufRead> = if is_gzip(path) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| SourceError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            return Ok(count);
        }
        on_line(String::from_utf8_lossy(&buf).trim_end());
        count += 1;
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}
