//! Edge list readers and writers.
//!
//! Two on-disk forms are understood:
//! * binary: consecutive little-endian `u32` pairs, no header;
//! * text: one edge per line as `src dst` or `e src dst`. Lines starting with `#` or `%` and
//!   `t`/`v` header lines are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use memmap2::Mmap;
use rayon::prelude::*;

use crate::config::READ_BUFFER_SIZE;
use crate::error::{TcError, TcResult};
use crate::io_status::format_with_commas;
use crate::types::{Edge, EdgeList, VertexId, MAX_VERTEX_ID};

const EDGE_BYTES: usize = 2 * std::mem::size_of::<VertexId>();

/// Input encodings accepted by [`load_edge_list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeListFormat {
    Binary,
    Text,
}

impl EdgeListFormat {
    /// Guesses the format from the extension: `.bin` is binary, everything else is text.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("bin") => EdgeListFormat::Binary,
            _ => EdgeListFormat::Text,
        }
    }
}

/// Loads an edge list in the given format.
pub fn load_edge_list<P: AsRef<Path>>(path: P, format: EdgeListFormat) -> TcResult<EdgeList> {
    match format {
        EdgeListFormat::Binary => load_binary_edge_list(path),
        EdgeListFormat::Text => load_text_edge_list(path),
    }
}

/// Memory-maps a binary edge list and decodes it in parallel.
///
/// # Returns
/// The edges, or [`TcError::InvalidInput`] when the file length is not a multiple of 8 bytes
/// or some id is above [`MAX_VERTEX_ID`].
pub fn load_binary_edge_list<P: AsRef<Path>>(path: P) -> TcResult<EdgeList> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let byte_len = file.metadata()?.len() as usize;
    if byte_len % EDGE_BYTES != 0 {
        return Err(TcError::InvalidInput(format!(
            "{}: {} bytes is not a whole number of {}-byte edges",
            path.display(),
            byte_len,
            EDGE_BYTES
        )));
    }
    if byte_len == 0 {
        return Ok(EdgeList::default());
    }

    // SAFETY: the file is only read, and is not expected to change while it is mapped.
    let mmap = unsafe { Mmap::map(&file)? };
    let edges: Vec<Edge> = mmap
        .par_chunks_exact(EDGE_BYTES)
        .map(|c| {
            Edge::new(
                u32::from_le_bytes([c[0], c[1], c[2], c[3]]),
                u32::from_le_bytes([c[4], c[5], c[6], c[7]]),
            )
        })
        .collect();
    if let Some(edge) = edges.par_iter().find_any(|e| e.max_endpoint() > MAX_VERTEX_ID) {
        return Err(TcError::InvalidInput(format!(
            "{}: vertex id {} is reserved",
            path.display(),
            edge.max_endpoint()
        )));
    }
    info!("[load] {} edges from {}", format_with_commas(edges.len() as u64), path.display());
    Ok(EdgeList::new(edges))
}

fn parse_id(token: Option<&str>, line_no: usize, path: &Path) -> TcResult<VertexId> {
    token
        .and_then(|t| t.parse::<VertexId>().ok())
        .filter(|&id| id <= MAX_VERTEX_ID)
        .ok_or_else(|| TcError::InvalidInput(format!("{}:{}: malformed edge line", path.display(), line_no)))
}

/// Reads a whitespace-separated text edge list with a progress bar over the file bytes.
pub fn load_text_edge_list<P: AsRef<Path>>(path: P) -> TcResult<EdgeList> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let byte_len = file.metadata()?.len();
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

    let pb = ProgressBar::new(byte_len);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .map_err(|e| TcError::InvalidInput(e.to_string()))?
        .progress_chars("=>-"));
    pb.set_message("Edge List Loading.");

    let mut edges = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        pb.inc(line.len() as u64 + 1);
        let mut tokens = line.split_whitespace();
        let first = match tokens.next() {
            None => continue,
            Some(token) if token.starts_with('#') || token.starts_with('%') => continue,
            Some("t") | Some("v") => continue,
            Some("e") => tokens.next(),
            Some(token) => Some(token),
        };
        let src = parse_id(first, idx + 1, path)?;
        let dst = parse_id(tokens.next(), idx + 1, path)?;
        edges.push(Edge::new(src, dst));
    }
    pb.finish_and_clear();

    info!("[load] {} edges from {}", format_with_commas(edges.len() as u64), path.display());
    Ok(EdgeList::new(edges))
}

/// Writes `edges` as little-endian `u32` pairs.
pub fn write_binary_edge_list<P: AsRef<Path>>(path: P, edges: &EdgeList) -> TcResult<()> {
    let mut writer = BufWriter::with_capacity(READ_BUFFER_SIZE, File::create(path)?);
    for edge in edges.iter() {
        writer.write_all(&edge.src.to_le_bytes())?;
        writer.write_all(&edge.dst.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod test_loader {
    use std::fs;

    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_binary_round_trip() {
        let dir = TempDir::new("tricount").unwrap();
        let path = dir.path().join("graph.bin");
        let edges = EdgeList::from_pairs([(0, 1), (70_000, 2), (3, 3)]);
        write_binary_edge_list(&path, &edges).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 24);
        assert_eq!(load_binary_edge_list(&path).unwrap(), edges);
        assert_eq!(EdgeListFormat::from_path(&path), EdgeListFormat::Binary);
    }

    #[test]
    fn test_binary_rejects_odd_length() {
        let dir = TempDir::new("tricount").unwrap();
        let path = dir.path().join("broken.bin");
        fs::write(&path, [0u8; 12]).unwrap();
        assert!(matches!(load_binary_edge_list(&path), Err(TcError::InvalidInput(_))));
    }

    #[test]
    fn test_binary_empty_file() {
        let dir = TempDir::new("tricount").unwrap();
        let path = dir.path().join("empty.bin");
        fs::write(&path, b"").unwrap();
        assert!(load_binary_edge_list(&path).unwrap().is_empty());
    }

    #[test]
    fn test_text_formats_and_comments() {
        let dir = TempDir::new("tricount").unwrap();
        let path = dir.path().join("graph.txt");
        fs::write(&path, "# comment\n% matrix market style\nt 3 3\nv 0\n0 1\n\ne 1 2\n2\t0\n").unwrap();
        let edges = load_text_edge_list(&path).unwrap();
        assert_eq!(edges, EdgeList::from_pairs([(0, 1), (1, 2), (2, 0)]));
        assert_eq!(EdgeListFormat::from_path(&path), EdgeListFormat::Text);
    }

    #[test]
    fn test_text_rejects_garbage() {
        let dir = TempDir::new("tricount").unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "0 1\n2 x\n").unwrap();
        assert!(matches!(load_text_edge_list(&path), Err(TcError::InvalidInput(_))));
        fs::write(&path, "0 99999999999\n").unwrap();
        assert!(load_text_edge_list(&path).is_err());
    }

    #[test]
    fn test_reserved_vertex_id_rejected() {
        let dir = TempDir::new("tricount").unwrap();
        let path = dir.path().join("reserved.txt");
        fs::write(&path, format!("0 {}\n", u32::MAX)).unwrap();
        assert!(matches!(load_text_edge_list(&path), Err(TcError::InvalidInput(_))));
        fs::write(&path, format!("0 {}\n", MAX_VERTEX_ID)).unwrap();
        assert_eq!(load_text_edge_list(&path).unwrap().max_vertex_id(), Some(MAX_VERTEX_ID));

        let path = dir.path().join("reserved.bin");
        write_binary_edge_list(&path, &EdgeList::from_pairs([(1, 2), (u32::MAX, 0)])).unwrap();
        assert!(matches!(load_binary_edge_list(&path), Err(TcError::InvalidInput(_))));
    }
}
