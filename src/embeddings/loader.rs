// Model file readers for word2vec (text and binary) and GloVe files.
//
// word2vec text:   "<count> <dim>\n" then "<word> <f> <f> ...\n" per row
// word2vec binary: "<count> <dim>\n" then "<word> " + dim little-endian f32
//                  per row, each row optionally followed by '\n'
// GloVe text:      word2vec text without the header line
//
// All readers stop after `limit` rows when one is given. Every parse failure
// is reported as `ModelLoad` with the row number so a truncated download or a
// wrong format choice is easy to spot.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use super::space::{EmbeddingSpace, MAX_DIMENSION};
use super::traits::EmbeddingStore;
use crate::error::{AnalysisError, Result};

/// On-disk format of a model file. The ordinals are the numeric format
/// selectors accepted on the command line: 0 = word2vec text, 1 = word2vec binary,
/// 2 = GloVe text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelFormat {
    Word2VecText,
    Word2VecBinary,
    GloveText,
}

impl ModelFormat {
    /// Guess the format from a file extension: `.bin` is binary word2vec,
    /// everything else is read as word2vec text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bin") => ModelFormat::Word2VecBinary,
            _ => ModelFormat::Word2VecText,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFormat::Word2VecText => "word2vec",
            ModelFormat::Word2VecBinary => "word2vec-bin",
            ModelFormat::GloveText => "glove",
        }
    }
}

impl TryFrom<u8> for ModelFormat {
    type Error = AnalysisError;

    fn try_from(ordinal: u8) -> Result<Self> {
        match ordinal {
            0 => Ok(ModelFormat::Word2VecText),
            1 => Ok(ModelFormat::Word2VecBinary),
            2 => Ok(ModelFormat::GloveText),
            other => Err(AnalysisError::model_load(format!(
                "unimplemented model type {other}"
            ))),
        }
    }
}

impl FromStr for ModelFormat {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word2vec" | "w2v" | "text" | "txt" => Ok(ModelFormat::Word2VecText),
            "word2vec-bin" | "w2v-bin" | "bin" | "binary" => Ok(ModelFormat::Word2VecBinary),
            "glove" => Ok(ModelFormat::GloveText),
            other => match other.parse::<u8>() {
                Ok(ordinal) => ModelFormat::try_from(ordinal),
                Err(_) => Err(AnalysisError::model_load(format!(
                    "unimplemented model type '{other}'"
                ))),
            },
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Load a model file into memory.
pub fn load(path: &Path, format: ModelFormat, limit: Option<usize>) -> Result<EmbeddingSpace> {
    let started = Instant::now();
    let file = File::open(path).map_err(|e| {
        AnalysisError::model_load(format!("cannot open {}: {e}", path.display()))
    })?;
    let reader = BufReader::new(file);

    let space = match format {
        ModelFormat::Word2VecText => read_word2vec_text(reader, limit),
        ModelFormat::Word2VecBinary => read_word2vec_binary(reader, limit),
        ModelFormat::GloveText => read_glove_text(reader, limit),
    }
    .map_err(|e| match e {
        AnalysisError::ModelLoad(msg) => AnalysisError::model_load(format!(
            "{} ({format}): {msg}. The model type is probably wrong",
            path.display()
        )),
        other => other,
    })?;

    info!(
        path = %path.display(),
        format = %format,
        words = space.vocabulary_size(),
        dim = space.dimension(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Loaded embedding model"
    );

    Ok(space)
}

/// Parse a word2vec text model.
pub fn read_word2vec_text<R: BufRead>(reader: R, limit: Option<usize>) -> Result<EmbeddingSpace> {
    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => line.map_err(io_error)?,
        None => return Err(AnalysisError::model_load("empty file")),
    };
    let (count, dimension) = parse_header(&header)?;
    let wanted = limit.map_or(count, |l| l.min(count));

    let mut space = EmbeddingSpace::with_capacity(dimension, wanted);
    let mut rows = 0usize;
    for (i, line) in lines.enumerate() {
        if rows >= wanted {
            break;
        }
        let line = line.map_err(io_error)?;
        if line.trim().is_empty() {
            continue;
        }
        let (word, vector) = parse_text_row(&line, dimension, i + 2)?;
        space.insert(word, &vector)?;
        rows += 1;
    }
    if rows < wanted {
        return Err(AnalysisError::model_load(format!(
            "unexpected end of file: read {rows} of {wanted} entries"
        )));
    }

    debug!(declared = count, read = wanted, "word2vec text header");
    Ok(space)
}

/// Parse a GloVe text model. The dimension comes from the first row.
pub fn read_glove_text<R: BufRead>(reader: R, limit: Option<usize>) -> Result<EmbeddingSpace> {
    let mut space: Option<EmbeddingSpace> = None;
    let mut rows = 0usize;

    for (i, line) in reader.lines().enumerate() {
        if limit.is_some_and(|l| rows >= l) {
            break;
        }
        let line = line.map_err(io_error)?;
        if line.trim().is_empty() {
            continue;
        }
        let space = space.get_or_insert_with(|| {
            let dimension = line.split_whitespace().count().saturating_sub(1);
            EmbeddingSpace::new(dimension)
        });
        let dimension = space.dimension();
        if dimension == 0 {
            return Err(AnalysisError::model_load("first row has no vector components"));
        }
        let (word, vector) = parse_text_row(&line, dimension, i + 1)?;
        space.insert(word, &vector)?;
        rows += 1;
    }

    space.ok_or_else(|| AnalysisError::model_load("empty file"))
}

/// Parse a binary word2vec model.
pub fn read_word2vec_binary<R: BufRead>(
    mut reader: R,
    limit: Option<usize>,
) -> Result<EmbeddingSpace> {
    let mut header = String::new();
    reader.read_line(&mut header).map_err(io_error)?;
    if header.is_empty() {
        return Err(AnalysisError::model_load("empty file"));
    }
    let (count, dimension) = parse_header(&header)?;
    let wanted = limit.map_or(count, |l| l.min(count));

    let mut space = EmbeddingSpace::with_capacity(dimension, wanted);
    let mut word_buf = Vec::new();
    let mut vector_buf = vec![0u8; dimension * 4];
    let mut vector = vec![0.0_f32; dimension];

    for row in 0..wanted {
        word_buf.clear();
        let n = reader.read_until(b' ', &mut word_buf).map_err(io_error)?;
        if n == 0 || word_buf.last() != Some(&b' ') {
            return Err(AnalysisError::model_load(format!(
                "unexpected end of file at entry {} of {count}",
                row + 1
            )));
        }
        // Rows may be separated by a newline that ends up in front of the word
        let word_bytes = trim_ascii_newlines(&word_buf[..word_buf.len() - 1]);
        let word = String::from_utf8_lossy(word_bytes).into_owned();

        reader.read_exact(&mut vector_buf).map_err(|e| {
            AnalysisError::model_load(format!(
                "truncated vector for '{word}' at entry {}: {e}",
                row + 1
            ))
        })?;
        for (x, bytes) in vector.iter_mut().zip(vector_buf.chunks_exact(4)) {
            *x = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        space.insert(word, &vector)?;
    }

    debug!(declared = count, read = wanted, "word2vec binary header");
    Ok(space)
}

fn parse_header(header: &str) -> Result<(usize, usize)> {
    let mut parts = header.split_whitespace();
    let count = parts.next().and_then(|p| p.parse::<usize>().ok());
    let dimension = parts.next().and_then(|p| p.parse::<usize>().ok());
    match (count, dimension, parts.next()) {
        (Some(_), Some(d), None) if d > MAX_DIMENSION => Err(AnalysisError::model_load(
            format!("header declares dimension {d}, more than the supported {MAX_DIMENSION}"),
        )),
        (Some(c), Some(d), None) if d > 0 => Ok((c, d)),
        _ => Err(AnalysisError::model_load(format!(
            "invalid header '{}', expected '<count> <dimension>'",
            header.trim()
        ))),
    }
}

fn parse_text_row(line: &str, dimension: usize, line_no: usize) -> Result<(String, Vec<f32>)> {
    let mut parts = line.split_whitespace();
    let word = parts
        .next()
        .ok_or_else(|| AnalysisError::model_load(format!("line {line_no}: empty row")))?;

    let vector = parts
        .map(|p| {
            p.parse::<f32>().map_err(|_| {
                AnalysisError::model_load(format!("line {line_no}: invalid number '{p}'"))
            })
        })
        .collect::<Result<Vec<f32>>>()?;

    if vector.len() != dimension {
        return Err(AnalysisError::model_load(format!(
            "line {line_no}: expected {dimension} components for '{word}', found {}",
            vector.len()
        )));
    }
    Ok((word.to_string(), vector))
}

fn trim_ascii_newlines(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| *b != b'\n' && *b != b'\r')
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn io_error(e: std::io::Error) -> AnalysisError {
    AnalysisError::model_load(format!("read error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_format_ordinals() {
        assert_eq!(ModelFormat::try_from(0).unwrap(), ModelFormat::Word2VecText);
        assert_eq!(ModelFormat::try_from(1).unwrap(), ModelFormat::Word2VecBinary);
        assert_eq!(ModelFormat::try_from(2).unwrap(), ModelFormat::GloveText);
        assert!(matches!(
            ModelFormat::try_from(3),
            Err(AnalysisError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("glove".parse::<ModelFormat>().unwrap(), ModelFormat::GloveText);
        assert_eq!("BIN".parse::<ModelFormat>().unwrap(), ModelFormat::Word2VecBinary);
        assert_eq!("0".parse::<ModelFormat>().unwrap(), ModelFormat::Word2VecText);
        assert!("fasttext".parse::<ModelFormat>().is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ModelFormat::from_path(Path::new("GoogleNews-vectors-negative300.bin")),
            ModelFormat::Word2VecBinary
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("vectors.txt")),
            ModelFormat::Word2VecText
        );
    }

    #[test]
    fn test_word2vec_text() {
        let data = "3 2\nhe 1.0 0.0\nshe 0.0 1.0\nnurse 0.5 0.5\n";
        let space = read_word2vec_text(Cursor::new(data), None).unwrap();
        assert_eq!(space.vocabulary_size(), 3);
        assert_eq!(space.dimension(), 2);
        assert_eq!(space.vector_of("nurse").unwrap(), &[0.5_f32, 0.5][..]);
    }

    #[test]
    fn test_word2vec_text_limit() {
        let data = "3 2\nhe 1.0 0.0\nshe 0.0 1.0\nnurse 0.5 0.5\n";
        let space = read_word2vec_text(Cursor::new(data), Some(2)).unwrap();
        assert_eq!(space.vocabulary_size(), 2);
        assert!(!space.has_word("nurse"));
    }

    #[test]
    fn test_word2vec_text_bad_row() {
        let data = "2 2\nhe 1.0 0.0\nshe 0.0\n";
        let err = read_word2vec_text(Cursor::new(data), None).unwrap_err();
        assert!(matches!(err, AnalysisError::ModelLoad(ref m) if m.contains("line 3")));
    }

    #[test]
    fn test_word2vec_text_bad_header() {
        let data = "he 1.0 0.0\n";
        let err = read_word2vec_text(Cursor::new(data), None).unwrap_err();
        assert!(matches!(err, AnalysisError::ModelLoad(ref m) if m.contains("invalid header")));
    }

    #[test]
    fn test_word2vec_text_fewer_rows_than_header() {
        let data = "5 2\nhe 1.0 0.0\n";
        let err = read_word2vec_text(Cursor::new(data), None).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::model_load("unexpected end of file: read 1 of 5 entries")
        );
    }

    #[test]
    fn test_word2vec_text_duplicate_rows_count_toward_header() {
        let data = "2 2\nhe 1.0 0.0\nhe 0.0 1.0\n";
        let space = read_word2vec_text(Cursor::new(data), None).unwrap();
        assert_eq!(space.vocabulary_size(), 1);
        assert_eq!(space.vector_of("he").unwrap(), &[1.0_f32, 0.0][..]);
    }

    #[test]
    fn test_word2vec_text_huge_count_is_load_error() {
        let data = "18446744073709551615 2\nhe 1.0 0.0\n";
        let err = read_word2vec_text(Cursor::new(data), None).unwrap_err();
        assert!(matches!(err, AnalysisError::ModelLoad(ref m) if m.contains("read 1 of")));

        let data = "18446744073709551615 300\nhe 1.0\n";
        let err = read_word2vec_text(Cursor::new(data), None).unwrap_err();
        assert!(matches!(err, AnalysisError::ModelLoad(ref m) if m.contains("line 2")));
    }

    #[test]
    fn test_huge_dimension_is_load_error() {
        let err = read_word2vec_binary(Cursor::new(b"1 4611686018427387904\nhe ".to_vec()), None)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ModelLoad(ref m) if m.contains("dimension")));

        let err = read_word2vec_text(Cursor::new("1 4611686018427387904\nhe 1.0\n"), None)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ModelLoad(ref m) if m.contains("dimension")));
    }

    #[test]
    fn test_glove_text() {
        let data = "the 0.1 0.2 0.3\nof 0.4 0.5 0.6\n";
        let space = read_glove_text(Cursor::new(data), None).unwrap();
        assert_eq!(space.dimension(), 3);
        assert_eq!(space.vocabulary_size(), 2);
    }

    #[test]
    fn test_glove_rejects_word2vec_header_rows() {
        // A word2vec header read as GloVe yields a 1-d space, then fails
        let data = "2 3\nthe 0.1 0.2 0.3\n";
        assert!(read_glove_text(Cursor::new(data), None).is_err());
    }

    #[test]
    fn test_word2vec_binary() {
        let mut data = b"2 2\n".to_vec();
        for (word, v) in [("he", [1.0_f32, 0.0]), ("she", [0.0, 1.0])] {
            data.extend_from_slice(word.as_bytes());
            data.push(b' ');
            for x in v {
                data.extend_from_slice(&x.to_le_bytes());
            }
            data.push(b'\n');
        }
        let space = read_word2vec_binary(Cursor::new(data), None).unwrap();
        assert_eq!(space.vocabulary_size(), 2);
        assert_eq!(space.vector_of("she").unwrap(), &[0.0_f32, 1.0][..]);
    }

    #[test]
    fn test_word2vec_binary_truncated() {
        let mut data = b"1 2\nhe ".to_vec();
        data.extend_from_slice(&1.0_f32.to_le_bytes());
        let err = read_word2vec_binary(Cursor::new(data), None).unwrap_err();
        assert!(matches!(err, AnalysisError::ModelLoad(ref m) if m.contains("truncated")));
    }
}
