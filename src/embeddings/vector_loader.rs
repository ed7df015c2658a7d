use std::{
    fs::File,
    io::{self, BufRead, BufReader, Error, ErrorKind},
    path::Path,
};

use bzip2::read::BzDecoder;
use rustc_hash::FxHashMap;

// The vector file is the text format pretrained embeddings are distributed in.
// The first line is a header carrying the vocabulary size and dimensionality,
// which we skip without validating. Every following line is
// `token v1 v2 ... vD`: the token runs up to the first space and the rest of
// the line is the whitespace-separated vector. The dimensionality D is fixed
// by the first data line.

/// Dense token-embedding matrix plus both token lookups.
///
/// Row `i` holds the vector of the token with id `i`. Ids are assigned in
/// file order, zero-based and gap-free, and never change after loading.
#[derive(Debug)]
pub struct EmbeddingTable {
    dim: usize,
    data: Vec<f64>,
    id_to_token: Vec<String>,
    token_to_id: FxHashMap<String, u32>,
}

impl EmbeddingTable {
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, id: u32) -> &[f64] {
        let start = id as usize * self.dim;
        &self.data[start..start + self.dim]
    }

    pub fn token(&self, id: u32) -> &str {
        &self.id_to_token[id as usize]
    }

    pub fn id(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    pub fn tokens(&self) -> &[String] {
        &self.id_to_token
    }
}

/// Load at most `max_count` tokens from a vector file, dispatching on the
/// extension so `.bz2` dumps are decompressed on the fly.
pub fn load_vectors_from_path<P: AsRef<Path>>(
    path: P,
    max_count: Option<usize>,
) -> io::Result<EmbeddingTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if path.extension().and_then(|s| s.to_str()) == Some("bz2") {
        load_vectors(BufReader::new(BzDecoder::new(file)), max_count)
    } else {
        load_vectors(BufReader::new(file), max_count)
    }
}

pub fn load_vectors<R: BufRead>(
    mut reader: R,
    max_count: Option<usize>,
) -> io::Result<EmbeddingTable> {
    let mut line: Vec<u8> = Vec::new();
    // header line, informational only
    reader.read_until(b'\n', &mut line)?;

    let mut dim = 0;
    let mut data: Vec<f64> = Vec::new();
    let mut id_to_token: Vec<String> = Vec::new();
    let mut token_to_id: FxHashMap<String, u32> = FxHashMap::default();

    let mut line_no = 1;
    loop {
        line.clear();
        line_no += 1;
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        // invalid utf-8 sequences are replaced, never raised
        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches(['\r', '\n']);

        let Some((token, rest)) = text.split_once(' ') else {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("line {}: expected a token followed by vector components", line_no),
            ));
        };

        if token_to_id.contains_key(token) {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("line {}: token {:?} found twice", line_no, token),
            ));
        }

        let row_start = data.len();
        for component in rest.split_whitespace() {
            let value: f64 = component.parse().map_err(|e| {
                Error::new(
                    ErrorKind::InvalidData,
                    format!("line {}: bad vector component {:?}: {}", line_no, component, e),
                )
            })?;
            data.push(value);
        }
        let row_len = data.len() - row_start;

        if row_len == 0 {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("line {}: no vector components after token {:?}", line_no, token),
            ));
        }
        if dim == 0 {
            dim = row_len;
        } else if row_len != dim {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!(
                    "line {}: vector has {} components, expected {}",
                    line_no, row_len, dim
                ),
            ));
        }

        token_to_id.insert(token.to_string(), id_to_token.len() as u32);
        id_to_token.push(token.to_string());
        if let Some(max) = max_count {
            if id_to_token.len() == max {
                break;
            }
        }
    }

    Ok(EmbeddingTable {
        dim,
        data,
        id_to_token,
        token_to_id,
    })
}
