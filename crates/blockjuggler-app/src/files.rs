//! Reading the calendar and writing the leave block, `-` meaning stdio.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Path that stands for stdin or stdout.
pub const STDIO: &str = "-";

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO
}

/// ## Errors
/// Returns `AppError::Read` if the file or stdin cannot be read.
pub fn read_input(path: &Path) -> AppResult<Vec<u8>> {
    let read_error = |source: io::Error| AppError::Read {
        path: path.to_path_buf(),
        source,
    };

    if is_stdio(path) {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf).map_err(read_error)?;
        return Ok(buf);
    }

    fs::read(path).map_err(read_error)
}

/// ## Summary
/// Writes `text` to the output, creating or truncating the file.
///
/// ## Errors
/// Returns `AppError::Write` if the file or stdout cannot be written.
pub fn write_output(path: &Path, text: &str) -> AppResult<()> {
    let write_error = |source: io::Error| AppError::Write {
        path: PathBuf::from(path),
        source,
    };

    if is_stdio(path) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes()).map_err(write_error)?;
        return stdout.flush().map_err(write_error);
    }

    fs::write(path, text).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("blockjuggler-{}-{name}", std::process::id()))
    }

    #[test]
    fn dash_is_stdio() {
        assert!(is_stdio(Path::new("-")));
        assert!(!is_stdio(Path::new("./-")));
        assert!(!is_stdio(Path::new("out.tji")));
    }

    #[test]
    fn write_then_read_file() {
        let path = scratch("roundtrip.tji");
        write_output(&path, "supplement resource r1 {\n}\n").unwrap();
        assert_eq!(read_input(&path).unwrap(), b"supplement resource r1 {\n}\n");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_input_names_the_path() {
        let path = scratch("missing.ics");
        let err = read_input(&path).unwrap_err();
        assert!(matches!(err, AppError::Read { .. }));
        assert!(err.to_string().contains("missing.ics"));
    }
}
