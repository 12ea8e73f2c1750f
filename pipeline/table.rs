//! # Tabular Loader
//!
//! Turns a slice of delimited text lines into a [`Matrix`]. The configuration
//! mirrors the numpy `loadtxt` surface: a delimiter, an optional retain-set of
//! input columns, per-column or wildcard token converters, a missing-value
//! sentinel, and header/footer skip counts. Values the sentinel matches become
//! NaN; everything else must convert, and a token that does not is a typed
//! error rather than a silent zero.

use crate::matrix::Matrix;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Token converter: `None` marks an unconvertible token.
pub type Converter = fn(&str) -> Option<f64>;

fn parse_f64(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok()
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error(
        "{lines} input lines cannot satisfy skip_header {skip_header} + skip_footer {skip_footer}"
    )]
    TooFewLines {
        lines: usize,
        skip_header: usize,
        skip_footer: usize,
    },
    #[error("line {line}, column {column}: cannot convert {token:?} to a number")]
    BadField {
        line: usize,
        column: usize,
        token: String,
    },
    #[error("malformed delimited input: {0}")]
    Csv(#[from] csv::Error),
}

/// Builder-style configuration for [`load_table`].
#[derive(Clone)]
pub struct LoadConfig {
    delimiter: u8,
    use_cols: Option<HashSet<usize>>,
    converter: Option<Converter>,
    column_converters: HashMap<usize, Converter>,
    na_token: Option<String>,
    skip_header: usize,
    skip_footer: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            delimiter: b' ',
            use_cols: None,
            converter: None,
            column_converters: HashMap::new(),
            na_token: None,
            skip_header: 0,
            skip_footer: 0,
        }
    }
}

impl LoadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter as u8;
        self
    }

    /// Input-column indices to retain; all others are dropped. Retained
    /// columns keep their left-to-right order.
    pub fn use_cols<I: IntoIterator<Item = usize>>(mut self, cols: I) -> Self {
        self.use_cols = Some(cols.into_iter().collect());
        self
    }

    /// Wildcard converter applied to every column. Takes precedence over
    /// per-column converters.
    pub fn converter(mut self, converter: Converter) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn column_converter(mut self, column: usize, converter: Converter) -> Self {
        self.column_converters.insert(column, converter);
        self
    }

    /// Sentinel token mapped to NaN before any converter runs.
    pub fn na_token(mut self, token: &str) -> Self {
        self.na_token = Some(token.to_string());
        self
    }

    pub fn skip_header(mut self, lines: usize) -> Self {
        self.skip_header = lines;
        self
    }

    pub fn skip_footer(mut self, lines: usize) -> Self {
        self.skip_footer = lines;
        self
    }

    fn convert(&self, token: &str, input_col: usize) -> Option<f64> {
        if let Some(na) = &self.na_token {
            if token == na {
                return Some(f64::NAN);
            }
        }
        if let Some(wildcard) = self.converter {
            wildcard(token)
        } else if let Some(per_col) = self.column_converters.get(&input_col) {
            per_col(token)
        } else {
            parse_f64(token)
        }
    }
}

/// Parses `lines` into a matrix under `config`.
///
/// Column count is the retain-set size when one is given, otherwise it is
/// inferred from the first data line. Rows shorter than the inferred width
/// leave their trailing cells at zero; longer rows are truncated.
pub fn load_table(lines: &[String], config: &LoadConfig) -> Result<Matrix, TableError> {
    let skipped = config.skip_header + config.skip_footer;
    if lines.len() < skipped {
        return Err(TableError::TooFewLines {
            lines: lines.len(),
            skip_header: config.skip_header,
            skip_footer: config.skip_footer,
        });
    }

    let data = &lines[config.skip_header..lines.len() - config.skip_footer];
    if data.is_empty() {
        return Ok(Matrix::zeros(0, 0));
    }

    let joined = data.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(config.delimiter)
        .flexible(true)
        .from_reader(joined.as_bytes());

    let mut records = Vec::with_capacity(data.len());
    for record in reader.records() {
        records.push(record?);
    }

    let ncols = match &config.use_cols {
        Some(cols) => cols.len(),
        None => records.first().map_or(0, |r| r.len()),
    };
    let mut out = Matrix::zeros(records.len(), ncols);

    for (ridx, record) in records.iter().enumerate() {
        let mut ocidx = 0;
        for (icidx, token) in record.iter().enumerate() {
            if let Some(cols) = &config.use_cols {
                if !cols.contains(&icidx) {
                    continue;
                }
            }
            if ocidx >= ncols {
                break;
            }
            let value = config.convert(token, icidx).ok_or_else(|| TableError::BadField {
                line: config.skip_header + ridx,
                column: icidx,
                token: token.to_string(),
            })?;
            out.set(ridx as isize, ocidx as isize, value);
            ocidx += 1;
        }
    }

    Ok(out)
}
