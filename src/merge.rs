use crate::error::HicError;
use crate::matrix::ContactMatrix;
use crate::table::BinTable;

/// Both conditions must share the same bin table, row for row
pub fn ensure_same_bins(a: &BinTable, b: &BinTable) -> Result<(), HicError> {
    if a.header != b.header {
        return Err(HicError::BinTableMismatch(format!(
            "headers differ: {:?} vs {:?}",
            a.header, b.header
        )));
    }
    if a.len() != b.len() {
        return Err(HicError::BinTableMismatch(format!(
            "{} rows vs {} rows",
            a.len(),
            b.len()
        )));
    }
    if let Some((idx, (ra, rb))) = a
        .records
        .iter()
        .zip(&b.records)
        .enumerate()
        .find(|(_, (ra, rb))| ra != rb)
    {
        return Err(HicError::BinTableMismatch(format!(
            "row {} differs: {:?} vs {:?}",
            idx + 1,
            ra.fields,
            rb.fields
        )));
    }
    Ok(())
}

/// Compose two matrices along the main diagonal.
///
/// `[i, j]` comes from `upper` when `i <= j` (diagonal included) and from
/// `lower` when `i > j`.
pub fn merge_diagonal(upper: &ContactMatrix, lower: &ContactMatrix) -> Result<ContactMatrix, HicError> {
    if upper.shape() != lower.shape() {
        return Err(HicError::ShapeMismatch(upper.size(), lower.size()));
    }
    let mut merged = ContactMatrix::empty(upper.start_bin(), upper.end_bin())?;
    let n = upper.size();
    for i in 0..n {
        for j in 0..n {
            let value = if i <= j { upper.get(i, j) } else { lower.get(i, j) };
            merged.set(i, j, value);
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::BinRecord;

    fn filled(start: i64, end: i64, base: f64) -> ContactMatrix {
        let mut m = ContactMatrix::empty(start, end).unwrap();
        let n = m.size();
        for i in 0..n {
            for j in 0..n {
                m.set(i, j, base + (i * n + j) as f64);
            }
        }
        m
    }

    fn bins(coords: &[(i64, i64, i64)]) -> BinTable {
        BinTable {
            header: vec!["cbin".into(), "from.coord".into(), "to.coord".into()],
            records: coords
                .iter()
                .map(|&(cbin, from, to)| BinRecord {
                    cbin,
                    chrom: None,
                    from_coord: from,
                    to_coord: to,
                    fields: vec![cbin.to_string(), from.to_string(), to.to_string()],
                })
                .collect(),
        }
    }

    #[test]
    fn upper_triangle_and_diagonal_from_first_lower_from_second() {
        let a = filled(0, 4, 0.0);
        let b = filled(0, 4, 1000.0);
        let m = merge_diagonal(&a, &b).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                let expected = if i <= j { a.get(i, j) } else { b.get(i, j) };
                assert_eq!(m.get(i, j), expected, "cell ({}, {})", i, j);
            }
        }
        assert_eq!(m.get(2, 2), a.get(2, 2));
    }

    #[test]
    fn nan_cells_are_carried_through() {
        let a = ContactMatrix::empty(0, 2).unwrap();
        let b = filled(0, 2, 1.0);
        let m = merge_diagonal(&a, &b).unwrap();
        assert!(m.get(0, 1).is_nan());
        assert!(m.get(1, 1).is_nan());
        assert_eq!(m.get(1, 0), b.get(1, 0));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let a = filled(0, 3, 0.0);
        let b = filled(0, 4, 0.0);
        assert!(matches!(merge_diagonal(&a, &b), Err(HicError::ShapeMismatch(4, 5))));
    }

    #[test]
    fn bin_tables_must_match() {
        let wt = bins(&[(1, 0, 40000), (2, 40000, 80000)]);
        assert!(ensure_same_bins(&wt, &wt.clone()).is_ok());

        let shifted = bins(&[(1, 0, 40000), (2, 40000, 80001)]);
        assert!(matches!(
            ensure_same_bins(&wt, &shifted),
            Err(HicError::BinTableMismatch(_))
        ));

        let shorter = bins(&[(1, 0, 40000)]);
        assert!(ensure_same_bins(&wt, &shorter).is_err());
    }
}
