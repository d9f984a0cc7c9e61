//! Test harness for the label parser against fixture files.
//!
//! Every .lbl file under test/pvl/ must parse; its keyword table, printed as
//! `PATH = TEXT` lines, is compared with the matching file in test/flat/.
//! Every .lbl file under test/bad/ must fail, and the error message must
//! contain the text of the matching .error file.

use std::fs;
use std::path::{Path, PathBuf};

use libpvl::{encode, parse, parse_with_options, Format, LabelReader, ParseOptions};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// All files matching `pattern` under test/, sorted.
fn fixture_files(pattern: &str) -> Vec<PathBuf> {
    let full = test_root().join(pattern);
    let mut files: Vec<PathBuf> = glob::glob(&full.to_string_lossy())
        .expect("valid glob pattern")
        .flatten()
        .collect();
    files.sort();
    files
}

/// Read a sibling fixture: same stem, different directory and extension.
fn read_companion(path: &Path, subdir: &str, ext: &str) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    fs::read_to_string(test_root().join(subdir).join(format!("{}.{}", stem, ext))).ok()
}

fn flat_listing(reader: &LabelReader) -> String {
    reader
        .keywords()
        .iter()
        .map(|(path, text)| format!("{} = {}\n", path, text))
        .collect()
}

/// Run a single good label.
fn run_good_test(path: &Path) -> Result<(), String> {
    let filename = path.file_name().unwrap().to_string_lossy().to_string();
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    let reader =
        parse(&content).map_err(|e| format!("{}: Unexpected parse error: {}", filename, e))?;

    if reader.keywords().get("END").is_some() {
        return Err(format!("{}: END stored as a keyword", filename));
    }

    let actual = flat_listing(&reader);
    match read_companion(path, "flat", "flat") {
        Some(expected) if expected.trim() != actual.trim() => Err(format!(
            "{}: Keyword table mismatch\n    expected:\n{}\n    actual:\n{}",
            filename, expected, actual
        )),
        Some(_) => {
            println!("  {} => {} keywords", filename, reader.keywords().len());
            Ok(())
        }
        None => {
            println!("  {} => (no expected output)\n{}", filename, actual);
            Ok(())
        }
    }
}

/// Run a single bad label (expected to fail with a specific error).
fn run_bad_test(path: &Path) -> Result<(), String> {
    let filename = path.file_name().unwrap().to_string_lossy().to_string();
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    let options = ParseOptions::builder().filename(filename.as_str()).build();
    match parse_with_options(&content, options) {
        Ok(reader) => Err(format!(
            "{}: Expected parse error, but got {} keywords",
            filename,
            reader.keywords().len()
        )),
        Err(e) => {
            let actual = e.to_string();
            match read_companion(path, "bad", "error") {
                Some(expected) if !actual.contains(expected.trim()) => Err(format!(
                    "{}: Error mismatch\n    expected: {}\n    actual:   {}",
                    filename,
                    expected.trim(),
                    actual
                )),
                _ => {
                    println!("  {} => {}", filename, actual);
                    Ok(())
                }
            }
        }
    }
}

fn run_all(kind: &str, files: &[PathBuf], run: fn(&Path) -> Result<(), String>) {
    assert!(!files.is_empty(), "no {} fixtures found", kind);
    println!("\nRunning {} {} fixtures:", files.len(), kind);

    let errors: Vec<String> = files.iter().filter_map(|f| run(f).err()).collect();
    println!(
        "\nResults: {} passed, {} failed",
        files.len() - errors.len(),
        errors.len()
    );
    for error in &errors {
        println!("  - {}", error);
    }
    assert!(errors.is_empty(), "{} {} fixtures failed", errors.len(), kind);
}

#[test]
fn test_all_good_fixtures() {
    run_all("good", &fixture_files("pvl/*.lbl"), run_good_test);
}

#[test]
fn test_all_bad_fixtures() {
    run_all("bad", &fixture_files("bad/*.lbl"), run_bad_test);
}

/// Encoding a parsed tree as PVL and parsing it again gives the same tree.
#[test]
fn test_pvl_reencode_fixtures() {
    for file in fixture_files("pvl/*.lbl") {
        let content = fs::read_to_string(&file).unwrap();
        let tree = parse(&content).unwrap().steal_tree().unwrap();

        let encoded = encode(&tree, Format::Pvl);
        let reparsed = parse(&encoded)
            .unwrap_or_else(|e| panic!("{}: re-parse failed: {}\n{}", file.display(), e, encoded))
            .steal_tree()
            .unwrap();
        assert_eq!(tree.to_json(), reparsed.to_json(), "{}", file.display());

        // JSON output is always valid JSON.
        let json = encode(&tree, Format::Json);
        assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
    }
}
