use crate::error::HicError;
use crate::table::ContactTable;

/// Dense square log2(O/E) matrix over an inclusive bin range.
///
/// Cells without data hold NaN. Row and column `k` correspond to bin
/// `start_bin + k`.
#[derive(Debug, Clone)]
pub struct ContactMatrix {
    start_bin: i64,
    n: usize,
    data: Vec<f64>,
}

impl ContactMatrix {
    /// An all-NaN matrix covering `start_bin..=end_bin`
    pub fn empty(start_bin: i64, end_bin: i64) -> Result<Self, HicError> {
        if end_bin < start_bin {
            return Err(HicError::InvalidRange {
                start: start_bin,
                end: end_bin,
            });
        }
        let too_large = || HicError::RangeTooLarge {
            start: start_bin,
            end: end_bin,
        };
        let n = end_bin
            .checked_sub(start_bin)
            .and_then(|d| d.checked_add(1))
            .and_then(|k| usize::try_from(k).ok())
            .ok_or_else(too_large)?;
        let cells = n
            .checked_mul(n)
            .filter(|c| {
                c.checked_mul(std::mem::size_of::<f64>())
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or_else(too_large)?;
        Ok(Self {
            start_bin,
            n,
            data: vec![f64::NAN; cells],
        })
    }

    pub fn start_bin(&self) -> i64 {
        self.start_bin
    }

    pub fn end_bin(&self) -> i64 {
        self.start_bin + self.n as i64 - 1
    }

    /// Side length
    pub fn size(&self) -> usize {
        self.n
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n, self.n)
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Number of cells holding a value
    pub fn filled_cells(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    fn offset(&self, cbin: i64) -> Option<usize> {
        if cbin < self.start_bin || cbin > self.end_bin() {
            None
        } else {
            Some((cbin - self.start_bin) as usize)
        }
    }
}

/// Result of filling a matrix from a contact table
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Rows with both bins inside the range
    pub pairs_in_range: usize,
    /// In-range rows skipped because expected_count <= 0
    pub skipped_no_expected: usize,
}

/// Build the log2(observed/expected) matrix for `start_bin..=end_bin`.
///
/// Rows outside the range or with `expected_count <= 0` are ignored. Each
/// accepted value is written to `[i, j]` and `[j, i]`; a repeated pair
/// overwrites the earlier value.
pub fn build_hic_matrix(
    contacts: &ContactTable,
    start_bin: i64,
    end_bin: i64,
) -> Result<(ContactMatrix, BuildSummary), HicError> {
    let mut mat = ContactMatrix::empty(start_bin, end_bin)?;
    let mut summary = BuildSummary {
        pairs_in_range: 0,
        skipped_no_expected: 0,
    };

    for rec in &contacts.records {
        let (i, j) = match (mat.offset(rec.cbin1), mat.offset(rec.cbin2)) {
            (Some(i), Some(j)) => (i, j),
            _ => continue,
        };
        summary.pairs_in_range += 1;

        // NaN fails the comparison as well
        if !(rec.expected_count > 0.0) {
            summary.skipped_no_expected += 1;
            continue;
        }
        let value = (rec.observed_count / rec.expected_count).log2();
        mat.set(i, j, value);
        mat.set(j, i, value);
    }

    Ok((mat, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ContactRecord;

    fn contacts(rows: &[(i64, i64, f64, f64)]) -> ContactTable {
        ContactTable {
            records: rows
                .iter()
                .map(|&(cbin1, cbin2, observed_count, expected_count)| ContactRecord {
                    cbin1,
                    cbin2,
                    observed_count,
                    expected_count,
                })
                .collect(),
        }
    }

    fn same(a: f64, b: f64) -> bool {
        (a.is_nan() && b.is_nan()) || a == b
    }

    #[test]
    fn figure_range_shape_and_diagonal_value() {
        let table = contacts(&[(1723, 1723, 4.0, 2.0)]);
        let (mat, summary) = build_hic_matrix(&table, 1723, 2061).unwrap();
        assert_eq!(mat.shape(), (339, 339));
        assert_eq!(mat.get(0, 0), 1.0);
        assert_eq!(summary.pairs_in_range, 1);
        assert_eq!(mat.filled_cells(), 1);
    }

    #[test]
    fn matrix_is_symmetric() {
        let table = contacts(&[
            (10, 12, 8.0, 2.0),
            (11, 10, 1.0, 4.0),
            (13, 13, 3.0, 3.0),
            (12, 13, 5.0, 0.5),
        ]);
        let (mat, _) = build_hic_matrix(&table, 10, 13).unwrap();
        for i in 0..mat.size() {
            for j in 0..mat.size() {
                assert!(same(mat.get(i, j), mat.get(j, i)), "asymmetric at ({}, {})", i, j);
            }
        }
        assert_eq!(mat.get(0, 2), 2.0);
        assert_eq!(mat.get(0, 1), -2.0);
        assert_eq!(mat.get(3, 3), 0.0);
    }

    #[test]
    fn non_positive_expected_never_alters_matrix() {
        let table = contacts(&[
            (0, 1, 5.0, 0.0),
            (1, 2, 5.0, -1.0),
            (2, 2, 5.0, f64::NAN),
        ]);
        let (mat, summary) = build_hic_matrix(&table, 0, 2).unwrap();
        assert_eq!(mat.filled_cells(), 0);
        assert_eq!(summary.pairs_in_range, 3);
        assert_eq!(summary.skipped_no_expected, 3);
    }

    #[test]
    fn range_filter_is_inclusive_on_both_ends() {
        let table = contacts(&[
            (5, 5, 2.0, 1.0),
            (9, 9, 4.0, 1.0),
            (4, 5, 2.0, 1.0),
            (9, 10, 2.0, 1.0),
            (3, 11, 2.0, 1.0),
        ]);
        let (mat, summary) = build_hic_matrix(&table, 5, 9).unwrap();
        assert_eq!(mat.shape(), (5, 5));
        assert_eq!(summary.pairs_in_range, 2);
        assert_eq!(mat.get(0, 0), 1.0);
        assert_eq!(mat.get(4, 4), 2.0);
        assert_eq!(mat.filled_cells(), 2);
    }

    #[test]
    fn duplicate_pair_last_write_wins() {
        let table = contacts(&[(0, 1, 2.0, 1.0), (1, 0, 8.0, 1.0)]);
        let (mat, _) = build_hic_matrix(&table, 0, 1).unwrap();
        assert_eq!(mat.get(0, 1), 3.0);
        assert_eq!(mat.get(1, 0), 3.0);
    }

    #[test]
    fn zero_observed_gives_negative_infinity() {
        let table = contacts(&[(0, 0, 0.0, 2.0)]);
        let (mat, _) = build_hic_matrix(&table, 0, 0).unwrap();
        assert_eq!(mat.get(0, 0), f64::NEG_INFINITY);
        assert_eq!(mat.filled_cells(), 1);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let table = contacts(&[]);
        assert!(matches!(
            build_hic_matrix(&table, 10, 9),
            Err(HicError::InvalidRange { start: 10, end: 9 })
        ));
    }

    #[test]
    fn oversized_ranges_are_errors() {
        assert!(matches!(
            ContactMatrix::empty(i64::MIN, i64::MAX),
            Err(HicError::RangeTooLarge { .. })
        ));
        assert!(matches!(
            ContactMatrix::empty(0, 5_000_000_000),
            Err(HicError::RangeTooLarge { start: 0, end: 5_000_000_000 })
        ));
        assert!(matches!(
            build_hic_matrix(&contacts(&[]), -1, i64::MAX),
            Err(HicError::RangeTooLarge { .. })
        ));
    }

    #[test]
    fn single_bin_range() {
        let (mat, _) = build_hic_matrix(&contacts(&[]), 7, 7).unwrap();
        assert_eq!(mat.shape(), (1, 1));
        assert!(mat.get(0, 0).is_nan());
        assert_eq!(mat.end_bin(), 7);
    }
}
