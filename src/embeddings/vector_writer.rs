use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{aggregate::centroid::LemmaVectors, utils::paths::get_tmp_output_path};

/// Serialize the averaged vectors, one line per lemma in lemma-id order.
///
/// Each line is the lemma followed by every component in its default decimal
/// form, single spaces between fields, a trailing space, and a CRLF
/// terminator. The `f64` display form is the shortest string that parses back
/// to the same value, so a written line round-trips exactly.
pub fn write_vectors<W: Write>(
    mut writer: W,
    vectors: &LemmaVectors,
    write_header: bool,
) -> io::Result<()> {
    if write_header {
        write!(writer, "{} {}\r\n", vectors.len(), vectors.dim())?;
    }
    for id in 0..vectors.len() as u32 {
        write!(writer, "{} ", vectors.lemma(id))?;
        for value in vectors.row(id) {
            write!(writer, "{} ", value)?;
        }
        write!(writer, "\r\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write to a `.tmp` sibling first and rename over the destination, so a
/// failed run never leaves a truncated vector file behind.
pub fn write_vectors_to_path<P: AsRef<Path>>(
    path: P,
    vectors: &LemmaVectors,
    write_header: bool,
) -> io::Result<()> {
    let path = path.as_ref();
    let tmp_path = get_tmp_output_path(path);
    let file = File::create(&tmp_path)?;
    write_vectors(BufWriter::new(file), vectors, write_header)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
