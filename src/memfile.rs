//! Hex memory-initialization files: one 32-bit word per line, real part in
//! the upper half.

use crate::common::FftError;
use crate::fixed::{Sample, TwiddleTable};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug)]
pub enum MemFileError {
    Io(io::Error),
    /// A line that is not a 32-bit hex word. `line` counts from 1.
    InvalidWord { line: usize, text: String },
    LengthMismatch { expected: usize, found: usize },
    /// File contents rejected by the transform itself, e.g. an invalid N.
    Fft(FftError),
}

impl fmt::Display for MemFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemFileError::Io(err) => write!(f, "I/O error: {}", err),
            MemFileError::InvalidWord { line, text } => {
                write!(f, "line {}: {:?} is not a 32-bit hex word", line, text)
            }
            MemFileError::LengthMismatch { expected, found } => {
                write!(f, "expected {} words, found {}", expected, found)
            }
            MemFileError::Fft(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for MemFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MemFileError::Io(err) => Some(err),
            MemFileError::Fft(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MemFileError {
    fn from(err: io::Error) -> Self {
        MemFileError::Io(err)
    }
}

impl From<FftError> for MemFileError {
    fn from(err: FftError) -> Self {
        MemFileError::Fft(err)
    }
}

fn parse_word(text: &str) -> Option<u32> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Reads every word of a hex file. Blank lines are skipped.
pub fn parse_words<R: BufRead>(reader: R) -> Result<Vec<u32>, MemFileError> {
    let mut words = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let word = parse_word(text).ok_or_else(|| MemFileError::InvalidWord {
            line: index + 1,
            text: text.to_string(),
        })?;
        words.push(word);
    }
    Ok(words)
}

fn expect_len(words: Vec<u32>, expected: usize) -> Result<Vec<u32>, MemFileError> {
    if words.len() != expected {
        return Err(MemFileError::LengthMismatch {
            expected,
            found: words.len(),
        });
    }
    Ok(words)
}

/// Reads exactly `n` samples.
pub fn read_samples(path: impl AsRef<Path>, n: usize) -> Result<Vec<Sample>, MemFileError> {
    let words = parse_words(BufReader::new(File::open(path)?))?;
    Ok(expect_len(words, n)?.into_iter().map(Sample::from_word).collect())
}

/// Reads the N/2-entry twiddle ROM of an N-point transform.
pub fn read_twiddles(path: impl AsRef<Path>, n: usize) -> Result<TwiddleTable, MemFileError> {
    let words = parse_words(BufReader::new(File::open(path)?))?;
    let words = expect_len(words, n / 2)?;
    Ok(TwiddleTable::from_words(n, &words)?)
}

/// Writes one word per line as 8 upper-case hex digits.
pub fn write_words<W: Write>(mut writer: W, words: impl IntoIterator<Item = u32>) -> io::Result<()> {
    for word in words {
        writeln!(writer, "{:08X}", word)?;
    }
    writer.flush()
}

pub fn write_samples(path: impl AsRef<Path>, samples: &[Sample]) -> Result<(), MemFileError> {
    let file = File::create(path)?;
    write_words(BufWriter::new(file), samples.iter().map(|s| s.to_word()))?;
    Ok(())
}
