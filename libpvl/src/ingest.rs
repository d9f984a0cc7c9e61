//! Phase 1: Byte Ingestion
//!
//! Reads label text from a seekable source in fixed-size chunks until an
//! `END` line shows up or the source runs dry. Only the freshly read chunk
//! (plus a short overlap with the previous one) is searched for the
//! terminator, so ingestion stays linear in the label size.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

use memchr::memmem;
use tracing::debug;

/// Lines that end a label.
const TERMINATORS: [&[u8]; 4] = [b"\r\nEND\r\n", b"\nEND\n", b"\r\nEnd\r\n", b"\nEnd\n"];

/// Bytes of the previous chunk that are searched again, enough for a
/// terminator split across two reads.
const OVERLAP: usize = 8;

/// Read label text from `source` starting at `offset`.
///
/// The returned text ends right after the terminator line when one was
/// found; otherwise it holds everything up to the end of the source.
pub fn read_label_text<R: Read + Seek>(
    source: &mut R,
    offset: u64,
    chunk_size: usize,
) -> io::Result<String> {
    source.seek(SeekFrom::Start(offset))?;

    let chunk_size = chunk_size.max(1);
    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; chunk_size];

    loop {
        let n = read_chunk(source, &mut chunk)?;
        let window_start = buffer.len().saturating_sub(OVERLAP);
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(end) = find_terminator(&buffer[window_start..]) {
            buffer.truncate(window_start + end);
            debug!(bytes = buffer.len(), "found label terminator");
            break;
        }
        if n < chunk_size {
            debug!(bytes = buffer.len(), "source exhausted before END line");
            break;
        }
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Fill `chunk` as far as the source allows; a short count means end of
/// source.
fn read_chunk<R: Read>(source: &mut R, chunk: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < chunk.len() {
        match source.read(&mut chunk[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Offset just past the earliest terminator line in `window`.
fn find_terminator(window: &[u8]) -> Option<usize> {
    TERMINATORS
        .iter()
        .filter_map(|t| memmem::find(window, t).map(|pos| pos + t.len()))
        .min()
}
