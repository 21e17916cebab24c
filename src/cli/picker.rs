//! CSV file discovery and the text-mode picker.
//!
//! Choosing a file here is the terminal equivalent of uploading one: the TUI
//! shows the discovered list in an overlay, `sales report` prompts on stdin.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt on stdin/stdout for one of the CSV files under the working directory.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files();
    let stdin = io::stdin();
    prompt_from(&files, &mut stdin.lock(), &mut io::stdout())
}

/// Prompt loop over arbitrary input/output streams.
///
/// Accepts a list number or a path; `q` cancels.
pub fn prompt_from<R: BufRead, W: Write>(files: &[PathBuf], input: &mut R, output: &mut W) -> Result<PathBuf, AppError> {
    let write_err = |e: io::Error| AppError::io("Failed to write prompt", e);

    if files.is_empty() {
        writeln!(output, "No .csv files found under the current directory.").map_err(write_err)?;
    } else {
        writeln!(output, "Found {} CSV file(s):", files.len()).map_err(write_err)?;
        for (idx, path) in files.iter().enumerate() {
            writeln!(output, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(write_err)?;
        }
    }

    loop {
        write!(output, "Select a file by number or type a path (q to quit): ").map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::io("Failed to read input", e))?;
        if bytes == 0 {
            return Err(AppError::usage(
                "No input received. Provide a CSV path with `sales report -f <file.csv>`.",
            ));
        }

        let choice = line.trim();
        if choice.eq_ignore_ascii_case("q") {
            return Err(AppError::usage("Canceled."));
        }

        let candidate = match choice.parse::<usize>() {
            Ok(n) if (1..=files.len()).contains(&n) => files[n - 1].clone(),
            Ok(n) => {
                writeln!(output, "Invalid choice: {n}.").map_err(write_err)?;
                continue;
            }
            Err(_) => PathBuf::from(choice),
        };

        match validate_csv_path(&candidate) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(output, "{err}").map_err(write_err)?,
        }
    }
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::usage(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::usage(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) {
        return Err(AppError::usage(format!("Expected a .csv file (got: {}).", path.display())));
    }
    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory (deterministic order).
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

pub fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn walk(dir: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                walk(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

pub fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn touch(path: &Path) {
        fs::write(path, "Sucursal\n").unwrap();
    }

    #[test]
    fn finds_csv_files_sorted_and_skips_target() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.csv"));
        touch(&dir.path().join("a.CSV"));
        touch(&dir.path().join("notes.txt"));
        fs::create_dir(dir.path().join("target")).unwrap();
        touch(&dir.path().join("target").join("c.csv"));
        fs::create_dir(dir.path().join("data")).unwrap();
        touch(&dir.path().join("data").join("d.csv"));

        let found = find_csv_files(dir.path(), 2);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"a.CSV".to_string()));
        assert!(names.contains(&"b.csv".to_string()));
        assert!(!names.iter().any(|n| n.contains("target")));
    }

    #[test]
    fn validate_rejects_non_csv_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        touch(&txt);
        assert!(validate_csv_path(&txt).is_err());
        assert!(validate_csv_path(&dir.path().join("missing.csv")).is_err());
        assert!(validate_csv_path(dir.path()).is_err());
    }

    #[test]
    fn prompt_accepts_number_after_invalid_choice() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("ventas.csv");
        touch(&csv);

        let files = vec![csv.clone()];
        let mut input = Cursor::new("7\n1\n");
        let mut output = Vec::new();
        let picked = prompt_from(&files, &mut input, &mut output).unwrap();
        assert_eq!(picked, csv);
        assert!(String::from_utf8(output).unwrap().contains("Invalid choice: 7."));
    }

    #[test]
    fn prompt_cancels_on_q_and_eof() {
        let mut output = Vec::new();
        assert!(prompt_from(&[], &mut Cursor::new("q\n"), &mut output).is_err());
        assert!(prompt_from(&[], &mut Cursor::new(""), &mut output).is_err());
    }
}
