use crate::logger::{format_time_used, Logger};
use crate::matrix::{build_hic_matrix, ContactMatrix};
use crate::merge::{ensure_same_bins, merge_diagonal};
use crate::plot::{plot_and_save, HeatmapStyle};
use crate::table::{load_data, BinTable};
use std::error::Error;
use std::path::Path;
use std::time::Instant;

/// Paths of one dataset: bin annotation file and contact file
#[derive(Debug, Clone)]
pub struct Dataset<'a> {
    pub label: &'a str,
    pub bins: &'a Path,
    pub contacts: &'a Path,
}

fn load_and_build(
    dataset: &Dataset<'_>,
    start_bin: i64,
    end_bin: i64,
    logger: &mut Logger,
) -> Result<(BinTable, ContactMatrix), Box<dyn Error>> {
    logger.step(&format!("Loading {}...", dataset.label))?;
    logger.log(&format!("Bin File: {}", dataset.bins.display()))?;
    logger.log(&format!("Contact File: {}", dataset.contacts.display()))?;
    let (bins, contacts) = load_data(dataset.bins, dataset.contacts)?;
    logger.log(&format!("Loaded {} bins, {} contact rows", bins.len(), contacts.len()))?;

    logger.step("Building Hi-C matrix...")?;
    let (mat, summary) = build_hic_matrix(&contacts, start_bin, end_bin)?;
    logger.step(&format!("Using {} contact pairs", summary.pairs_in_range))?;
    if summary.skipped_no_expected > 0 {
        logger.log(&format!(
            "Skipped {} pairs with non-positive expected count",
            summary.skipped_no_expected
        ))?;
    }
    logger.log(&format!(
        "Matrix {}x{}, {} cells with data",
        mat.size(),
        mat.size(),
        mat.filled_cells()
    ))?;
    Ok((bins, mat))
}

/// Load one dataset, build its matrix over `start_bin..=end_bin` and render it
pub fn run_hic_plot(
    dataset: &Dataset<'_>,
    start_bin: i64,
    end_bin: i64,
    output: &Path,
    style: &HeatmapStyle,
    logger: &mut Logger,
) -> Result<(), Box<dyn Error>> {
    let start_time = Instant::now();
    let (bins, mat) = load_and_build(dataset, start_bin, end_bin, logger)?;

    logger.step("Plotting...")?;
    plot_and_save(&mat, &bins, start_bin, end_bin, output, style)?;

    logger.step(&format!("Done. Figure saved to {}", output.display()))?;
    logger.log(&format!("[Time used] {}", format_time_used(start_time.elapsed())))?;
    Ok(())
}

/// Render two conditions split along the diagonal: `upper` above it, `lower` below.
///
/// Both datasets must have identical bin tables; nothing is written otherwise.
pub fn run_diagonal_comparison(
    upper: &Dataset<'_>,
    lower: &Dataset<'_>,
    start_bin: i64,
    end_bin: i64,
    output: &Path,
    style: &HeatmapStyle,
    logger: &mut Logger,
) -> Result<(), Box<dyn Error>> {
    let start_time = Instant::now();
    let (upper_bins, upper_mat) = load_and_build(upper, start_bin, end_bin, logger)?;
    let (lower_bins, lower_mat) = load_and_build(lower, start_bin, end_bin, logger)?;

    ensure_same_bins(&upper_bins, &lower_bins)?;
    let merged = merge_diagonal(&upper_mat, &lower_mat)?;
    logger.log(&format!(
        "Merged {} (upper triangle) with {} (lower triangle)",
        upper.label, lower.label
    ))?;

    logger.step("Plotting...")?;
    plot_and_save(&merged, &upper_bins, start_bin, end_bin, output, style)?;

    logger.step(&format!("Figure saved to {}", output.display()))?;
    logger.log(&format!("[Time used] {}", format_time_used(start_time.elapsed())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::write_tsv;

    const BINS: &str = "cbin\tchr\tfrom.coord\tto.coord\n\
                        1\tchr2L\t0\t20000\n\
                        2\tchr2L\t20000\t40000\n\
                        3\tchr2L\t40000\t60000\n";

    fn style() -> HeatmapStyle {
        HeatmapStyle {
            figure_inches: 1.0,
            dpi: 100,
            annotate: false,
            ..HeatmapStyle::default()
        }
    }

    #[test]
    fn single_matrix_end_to_end() {
        let bins = write_tsv(BINS);
        let contacts = write_tsv(
            "cbin1\tcbin2\tobserved_count\texpected_count\n\
             1\t1\t4\t2\n\
             1\t3\t8\t1\n\
             2\t9\t8\t1\n",
        );
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("figure").join("figure_1A.png");
        let mut logger = Logger::create(dir.path().join("run.log")).unwrap();
        let dataset = Dataset {
            label: "data",
            bins: bins.path(),
            contacts: contacts.path(),
        };
        run_hic_plot(&dataset, 1, 3, &out, &style(), &mut logger).unwrap();
        assert!(std::fs::metadata(&out).unwrap().len() > 0);

        let log = std::fs::read_to_string(dir.path().join("run.log")).unwrap();
        assert!(log.contains("Using 2 contact pairs"));
    }

    #[test]
    fn mismatched_bin_tables_abort_before_plotting() {
        let wt_bins = write_tsv(BINS);
        let mut_bins = write_tsv(&BINS.replace("60000", "60001"));
        let contacts = write_tsv("cbin1\tcbin2\tobserved_count\texpected_count\n1\t2\t4\t2\n");
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("figure_5G.png");
        let mut logger = Logger::create(dir.path().join("run.log")).unwrap();

        let wt = Dataset {
            label: "WT",
            bins: wt_bins.path(),
            contacts: contacts.path(),
        };
        let ph = Dataset {
            label: "ph505",
            bins: mut_bins.path(),
            contacts: contacts.path(),
        };
        let err = run_diagonal_comparison(&wt, &ph, 1, 3, &out, &style(), &mut logger).unwrap_err();
        assert!(err.to_string().contains("Bin tables must be identical"));
        assert!(!out.exists());
    }

    #[test]
    fn diagonal_comparison_end_to_end() {
        let bins = write_tsv(BINS);
        let wt_contacts = write_tsv("cbin1\tcbin2\tobserved_count\texpected_count\n1\t2\t4\t2\n");
        let ph_contacts = write_tsv("cbin1\tcbin2\tobserved_count\texpected_count\n2\t3\t16\t2\n");
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("figure").join("figure_5G.png");
        let mut logger = Logger::create(dir.path().join("run.log")).unwrap();

        let wt = Dataset {
            label: "WT",
            bins: bins.path(),
            contacts: wt_contacts.path(),
        };
        let ph = Dataset {
            label: "ph505",
            bins: bins.path(),
            contacts: ph_contacts.path(),
        };
        run_diagonal_comparison(&wt, &ph, 1, 3, &out, &style(), &mut logger).unwrap();
        assert!(std::fs::metadata(&out).unwrap().len() > 0);
    }

    #[test]
    fn missing_input_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = Logger::create(dir.path().join("run.log")).unwrap();
        let missing = dir.path().join("missing.bins.txt");
        let dataset = Dataset {
            label: "data",
            bins: &missing,
            contacts: &missing,
        };
        let out = dir.path().join("out.png");
        assert!(run_hic_plot(&dataset, 1, 2, &out, &style(), &mut logger).is_err());
        assert!(!out.exists());
    }
}
