use crate::error::HicError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One genomic bin
#[derive(Debug, Clone, PartialEq)]
pub struct BinRecord {
    pub cbin: i64,
    pub chrom: Option<String>,
    pub from_coord: i64,
    pub to_coord: i64,
    /// Every field of the row in header order, kept for table equality
    pub fields: Vec<String>,
}

/// Bin annotation table (*.bins.txt)
#[derive(Debug, Clone, PartialEq)]
pub struct BinTable {
    pub header: Vec<String>,
    pub records: Vec<BinRecord>,
}

impl BinTable {
    pub fn get(&self, cbin: i64) -> Option<&BinRecord> {
        self.records.iter().find(|r| r.cbin == cbin)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One pairwise contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactRecord {
    pub cbin1: i64,
    pub cbin2: i64,
    pub observed_count: f64,
    pub expected_count: f64,
}

/// Sparse contact table (*.n_contact.txt)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactTable {
    pub records: Vec<ContactRecord>,
}

impl ContactTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse f64 value from string, supporting "NaN" string
fn parse_f64_allow_nan(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("nan") {
        Some(f64::NAN)
    } else {
        trimmed.parse::<f64>().ok()
    }
}

/// Tab-separated reader that resolves columns by header name
struct TsvReader {
    path: String,
    lines: std::iter::Enumerate<std::io::Lines<BufReader<File>>>,
    header: Vec<String>,
    index: HashMap<String, usize>,
}

impl TsvReader {
    fn open(path: &Path) -> Result<Self, HicError> {
        let display = path.display().to_string();
        let file = File::open(path).map_err(|source| HicError::Io {
            path: display.clone(),
            source,
        })?;
        let mut lines = BufReader::new(file).lines().enumerate();
        let header_line = match lines.next() {
            Some((_, line)) => line.map_err(|source| HicError::Io {
                path: display.clone(),
                source,
            })?,
            None => return Err(HicError::EmptyFile(display)),
        };
        let header: Vec<String> = header_line
            .trim_end_matches('\r')
            .split('\t')
            .map(|h| h.trim().trim_matches('"').to_string())
            .collect();
        let index = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Ok(Self {
            path: display,
            lines,
            header,
            index,
        })
    }

    fn column(&self, name: &str) -> Result<usize, HicError> {
        self.index.get(name).copied().ok_or_else(|| HicError::MissingColumn {
            path: self.path.clone(),
            column: name.to_string(),
        })
    }

    /// Next non-blank row as (1-based line number, fields)
    fn next_row(&mut self) -> Result<Option<(usize, Vec<String>)>, HicError> {
        for (idx, line) in self.lines.by_ref() {
            let line = line.map_err(|source| HicError::Io {
                path: self.path.clone(),
                source,
            })?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let fields = line
                .split('\t')
                .map(|f| f.trim().trim_matches('"').to_string())
                .collect();
            return Ok(Some((idx + 1, fields)));
        }
        Ok(None)
    }

    fn check_width(&self, line: usize, fields: &[String], needed: usize) -> Result<(), HicError> {
        if fields.len() < needed {
            return Err(HicError::ShortRow {
                path: self.path.clone(),
                line,
                expected: needed,
                found: fields.len(),
            });
        }
        Ok(())
    }

    fn int(&self, line: usize, fields: &[String], col: usize) -> Result<i64, HicError> {
        let raw = &fields[col];
        raw.parse::<i64>()
            .or_else(|_| {
                // integral floats such as "1723.0"
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.fract() == 0.0 && v.is_finite())
                    .map(|v| v as i64)
                    .ok_or(())
            })
            .map_err(|_| self.parse_error(line, col, raw))
    }

    fn float(&self, line: usize, fields: &[String], col: usize) -> Result<f64, HicError> {
        let raw = &fields[col];
        parse_f64_allow_nan(raw).ok_or_else(|| self.parse_error(line, col, raw))
    }

    fn parse_error(&self, line: usize, col: usize, raw: &str) -> HicError {
        HicError::Parse {
            path: self.path.clone(),
            line,
            column: self.header[col].clone(),
            value: raw.to_string(),
        }
    }
}

/// Read a bin annotation file: needs `cbin`, `from.coord`, `to.coord`; `chr` is optional
pub fn load_bins<P: AsRef<Path>>(path: P) -> Result<BinTable, HicError> {
    let mut reader = TsvReader::open(path.as_ref())?;
    let cbin_col = reader.column("cbin")?;
    let from_col = reader.column("from.coord")?;
    let to_col = reader.column("to.coord")?;
    let chr_col = reader.column("chr").ok();
    let needed = [Some(cbin_col), Some(from_col), Some(to_col), chr_col]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
        + 1;

    let mut records = Vec::new();
    while let Some((line, fields)) = reader.next_row()? {
        reader.check_width(line, &fields, needed)?;
        records.push(BinRecord {
            cbin: reader.int(line, &fields, cbin_col)?,
            chrom: chr_col.map(|c| fields[c].clone()),
            from_coord: reader.int(line, &fields, from_col)?,
            to_coord: reader.int(line, &fields, to_col)?,
            fields,
        });
    }

    Ok(BinTable {
        header: reader.header,
        records,
    })
}

/// Read a contact file: needs `cbin1`, `cbin2`, `observed_count`, `expected_count`
pub fn load_contacts<P: AsRef<Path>>(path: P) -> Result<ContactTable, HicError> {
    let mut reader = TsvReader::open(path.as_ref())?;
    let cols = [
        reader.column("cbin1")?,
        reader.column("cbin2")?,
        reader.column("observed_count")?,
        reader.column("expected_count")?,
    ];
    let needed = cols.iter().copied().max().unwrap_or(0) + 1;

    let mut records = Vec::new();
    while let Some((line, fields)) = reader.next_row()? {
        reader.check_width(line, &fields, needed)?;
        records.push(ContactRecord {
            cbin1: reader.int(line, &fields, cols[0])?,
            cbin2: reader.int(line, &fields, cols[1])?,
            observed_count: reader.float(line, &fields, cols[2])?,
            expected_count: reader.float(line, &fields, cols[3])?,
        });
    }

    Ok(ContactTable { records })
}

/// Load the bin table and the contact table of one dataset
pub fn load_data<P: AsRef<Path>, Q: AsRef<Path>>(
    bin_file: P,
    contact_file: Q,
) -> Result<(BinTable, ContactTable), HicError> {
    let bins = load_bins(bin_file)?;
    let contacts = load_contacts(contact_file)?;
    Ok((bins, contacts))
}
