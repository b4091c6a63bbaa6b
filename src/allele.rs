//! Allele matrix loader (§6): whitespace-separated integers, one line per
//! locus, columns are individuals.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlleleError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: expected {expected} columns, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid allele token '{token}'")]
    InvalidToken { line: usize, token: String },
}

pub type Result<T> = std::result::Result<T, AlleleError>;

/// Loads an allele matrix from `path`, returning `(loci_major,
/// individual_major)`. `loci_major[l]` is locus `l`'s alleles across
/// individuals, exactly as stored on disk; `individual_major[i]` is its
/// transpose, individual `i`'s alleles across loci (§4.B/§4.C's input shape).
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<(Vec<Vec<i64>>, Vec<Vec<i64>>)> {
    let file = File::open(path)?;
    read_matrix(file)
}

/// Same as [`load_matrix`] but from any `Read` source (tests, stdin).
pub fn read_matrix<R: Read>(source: R) -> Result<(Vec<Vec<i64>>, Vec<Vec<i64>>)> {
    let reader = BufReader::new(source);
    let mut loci_major: Vec<Vec<i64>> = Vec::new();
    let mut expected: Option<usize> = None;

    for (idx, raw) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let raw = raw?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for token in trimmed.split_whitespace() {
            let value = token.parse::<i64>().map_err(|_| AlleleError::InvalidToken {
                line: line_no,
                token: token.to_string(),
            })?;
            row.push(value);
        }
        let width = row.len();
        match expected {
            None => expected = Some(width),
            Some(w) if w != width => {
                return Err(AlleleError::RaggedRow {
                    line: line_no,
                    expected: w,
                    found: width,
                })
            }
            _ => {}
        }
        loci_major.push(row);
    }

    let individuals = expected.unwrap_or(0);
    let mut individual_major = vec![Vec::with_capacity(loci_major.len()); individuals];
    for locus in &loci_major {
        for (i, &allele) in locus.iter().enumerate() {
            individual_major[i].push(allele);
        }
    }

    Ok((loci_major, individual_major))
}
