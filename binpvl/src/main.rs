//! PVL command-line tool for checking, querying, and transcoding labels.
//!
//! Usage: pvl [OPTIONS] [FILE|DIR]
//!
//! Options:
//!   -t, --to <FORMAT>      Output format (flat, pvl, json, yaml, toml, cbor, diag)
//!   -k, --keyword <PATH>   Print the value at a dotted path (repeatable)
//!   --offset <BYTES>       Byte offset of the label within the input
//!   --strip-quotes         Drop surrounding quotes from keyword values
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if the label is valid (exit 0 if valid, 1 if invalid)
//!   -h, --help             Print help
//!   -V, --version          Print version

use libpvl::{encode, read_label, Format, LabelReader, ParseOptions};
use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod transcode;

/// Check whether a string is a recognized format name for -t.
fn is_format_name(s: &str) -> bool {
    matches!(
        s,
        "flat" | "pvl" | "lbl" | "json" | "yaml" | "yml" | "toml" | "cbor" | "diag"
    )
}

/// Settings shared by every input processed in one run.
struct Settings<'a> {
    to_format: &'a str,
    keywords: Vec<&'a str>,
    offset: u64,
    strip_quotes: bool,
    output_file: Option<&'a str>,
    check_only: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PVL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut settings = Settings {
        to_format: "flat",
        keywords: Vec::new(),
        offset: 0,
        strip_quotes: false,
        output_file: None,
        check_only: false,
    };
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("pvl {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-t" | "--to" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: -t requires a format argument");
                    process::exit(1);
                }
                if !is_format_name(&args[i]) {
                    eprintln!("Error: Unknown format: {}", args[i]);
                    process::exit(1);
                }
                settings.to_format = &args[i];
            }
            "-k" | "--keyword" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: -k requires a keyword path");
                    process::exit(1);
                }
                settings.keywords.push(&args[i]);
            }
            "--offset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --offset requires a byte count");
                    process::exit(1);
                }
                settings.offset = match args[i].parse() {
                    Ok(n) => n,
                    Err(_) => {
                        eprintln!("Error: Invalid offset: {}", args[i]);
                        process::exit(1);
                    }
                };
            }
            "--strip-quotes" => {
                settings.strip_quotes = true;
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                settings.output_file = Some(&args[i]);
            }
            "--check" => {
                settings.check_only = true;
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            _ => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
        }
        i += 1;
    }

    if let Some(path) = input_path {
        if Path::new(path).is_dir() {
            if settings.output_file.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            process::exit(process_directory(path, &settings));
        }
    }

    let result = match input_path {
        Some(path) => match File::open(path) {
            Ok(mut file) => read(&mut file, Some(path), &settings),
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            read(&mut Cursor::new(buffer), None, &settings)
        }
    };

    let exit_code = match result {
        Some(reader) => output(reader, input_path, &settings),
        None => 1,
    };
    process::exit(exit_code);
}

fn parse_options(settings: &Settings, input_file: Option<&str>) -> ParseOptions {
    let mut builder = ParseOptions::builder().strip_surrounding_quotes(settings.strip_quotes);
    if let Some(name) = input_file.and_then(|p| Path::new(p).file_name()) {
        builder = builder.filename(name.to_string_lossy());
    }
    builder.build()
}

/// Parse one label, reporting any error on stderr.
fn read<R: Read + io::Seek>(
    source: &mut R,
    input_file: Option<&str>,
    settings: &Settings,
) -> Option<LabelReader> {
    let options = parse_options(settings, input_file);
    match read_label(source, settings.offset, options) {
        Ok(reader) => {
            debug!(
                input = input_file.unwrap_or("<stdin>"),
                keywords = reader.keywords().len(),
                "label read"
            );
            Some(reader)
        }
        Err(e) => {
            match input_file {
                Some(path) => eprintln!("{}: {}", path, e),
                None => eprintln!("Parse error: {}", e),
            }
            None
        }
    }
}

fn process_directory(dir_path: &str, settings: &Settings) -> i32 {
    let entries = match fs::read_dir(dir_path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir_path, e);
            return 1;
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e.eq_ignore_ascii_case("lbl")))
        .collect();
    paths.sort();
    info!(directory = dir_path, labels = paths.len(), "processing directory");

    let mut had_errors = false;
    for path in paths {
        let path_str = path.to_string_lossy().into_owned();
        let exit_code = match File::open(&path) {
            Ok(mut file) => match read(&mut file, Some(path_str.as_str()), settings) {
                Some(reader) => output(reader, Some(path_str.as_str()), settings),
                None => 1,
            },
            Err(e) => {
                eprintln!("Error reading {}: {}", path_str, e);
                1
            }
        };
        if exit_code != 0 {
            had_errors = true;
        }
    }

    if had_errors {
        1
    } else {
        0
    }
}

/// Emit what the settings ask for from a parsed label.
fn output(mut reader: LabelReader, input_file: Option<&str>, settings: &Settings) -> i32 {
    if settings.check_only {
        match input_file {
            Some(path) => println!("{}: ok", path),
            None => println!("ok"),
        }
        return 0;
    }

    if !settings.keywords.is_empty() {
        return output_keywords(&reader, settings);
    }

    if settings.to_format == "flat" {
        let listing: String = reader
            .keywords()
            .iter()
            .map(|(path, text)| format!("{} = {}\n", path, text))
            .collect();
        write_text_output(&listing, settings.output_file);
        return 0;
    }

    let Some(tree) = reader.steal_tree() else {
        eprintln!("Error: label has no tree");
        return 1;
    };

    let encoded: Result<Vec<u8>, String> = match settings.to_format {
        "pvl" | "lbl" => Ok(encode(&tree, Format::Pvl).into_bytes()),
        "json" => Ok(encode(&tree, Format::Json).into_bytes()),
        "yaml" | "yml" => transcode::yaml::encode(&tree)
            .map(String::into_bytes)
            .map_err(|e| format!("Cannot convert to YAML: {}", e)),
        "toml" => transcode::toml::encode(&tree)
            .map(String::into_bytes)
            .map_err(|e| format!("Cannot convert to TOML: {}", e)),
        "cbor" => {
            transcode::cbor::encode(&tree).map_err(|e| format!("Cannot convert to CBOR: {}", e))
        }
        "diag" => transcode::cbor::encode(&tree)
            .map_err(|e| format!("Cannot convert to CBOR: {}", e))
            .and_then(|bytes| {
                transcode::cbor::diagnostic(&bytes)
                    .map(String::into_bytes)
                    .map_err(|e| format!("Cannot render CBOR diagnostic notation: {}", e))
            }),
        other => Err(format!("Unknown format: {}", other)),
    };

    match encoded {
        Ok(bytes) if settings.to_format == "cbor" => {
            write_binary_output(&bytes, settings.output_file);
            0
        }
        Ok(bytes) => {
            write_text_output(&String::from_utf8_lossy(&bytes), settings.output_file);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Print requested keywords, one per line. `PATH[N]` selects the N-th
/// (1-based) element of a list.
fn output_keywords(reader: &LabelReader, settings: &Settings) -> i32 {
    let mut out = String::new();
    let mut missing = false;
    for query in &settings.keywords {
        let value = match split_index(query) {
            Some((path, index)) => reader.keywords().get_sub(path, index),
            None => reader.keywords().get(query).map(str::to_string),
        };
        match value {
            Some(text) => {
                out.push_str(&text);
                out.push('\n');
            }
            None => {
                eprintln!("Error: keyword not found: {}", query);
                missing = true;
            }
        }
    }
    write_text_output(&out, settings.output_file);
    if missing {
        1
    } else {
        0
    }
}

fn split_index(query: &str) -> Option<(&str, usize)> {
    let (path, rest) = query.strip_suffix(']')?.rsplit_once('[')?;
    Some((path, rest.parse().ok()?))
}

fn write_text_output(output: &str, output_file: Option<&str>) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
    } else {
        print!("{}", output);
        if !output.is_empty() && !output.ends_with('\n') {
            println!();
        }
    }
}

fn write_binary_output(output: &[u8], output_file: Option<&str>) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = handle.write_all(output) {
            eprintln!("Error writing to stdout: {}", e);
            process::exit(1);
        }
    }
}

fn print_help() {
    println!(
        "pvl - PVL/ODL label tool

USAGE:
    pvl [OPTIONS] [FILE|DIR]

ARGS:
    [FILE|DIR]    Input file or directory (reads from stdin if not provided)
                  When a directory is given, processes all .lbl files in it

OPTIONS:
    -t, --to <FORMAT>      Output format [default: flat]
                           Supported: flat, pvl, json, yaml, toml, cbor, diag

                           'flat' lists every keyword as PATH = TEXT, using
                           dotted paths through GROUP/OBJECT blocks.

    -k, --keyword <PATH>   Print the text of one keyword (repeatable).
                           PATH[N] prints the N-th element of a list.

    --offset <BYTES>       Byte offset where the label starts [default: 0]

    --strip-quotes         Drop surrounding quotes from keyword text

    -o, --output <FILE>    Write output to specified file (not valid with directory input)

    --check                Check if input is valid (exit 0 if valid, 1 if invalid)

    -h, --help             Print help

    -V, --version          Print version

ENVIRONMENT:
    PVL_LOG                Log filter, e.g. PVL_LOG=debug [default: warn]

EXAMPLES:
    # List all keywords of an ISIS cube label
    pvl image.cub

    # Query keywords by dotted path
    pvl -k IsisCube.Core.Dimensions.Samples -k IsisCube.Core.Pixels.Type image.cub

    # Second element of a list
    pvl -k 'CORE_ITEMS[2]' image.lbl

    # Label embedded after a 512-byte header
    pvl --offset 512 image.img

    # Convert a label to JSON, YAML, or TOML
    pvl -t json image.lbl
    pvl -t yaml image.lbl

    # Re-emit a label as normalized PVL
    pvl -t pvl image.lbl -o clean.lbl

    # Validate all labels in a directory
    pvl --check ./labels/

    # View CBOR in diagnostic notation (RFC 8949 §8)
    pvl -t diag image.lbl
"
    );
}
