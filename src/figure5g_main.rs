//! Fig. 5G: WT (upper triangle) vs ph505 (lower triangle) on chr3R.

use hicmap::logger::Logger;
use hicmap::pipeline::{run_diagonal_comparison, Dataset};
use hicmap::plot::HeatmapStyle;
use hicmap::VERSION;
use std::error::Error;
use std::path::Path;

const WT_BINS: &str = "data/GSE99105_nm_none_40000.bins.txt";
const WT_CONTACTS: &str = "data/GSE99105_nm_none_40000.n_contact.txt";

const PH_BINS: &str = "data/GSE99106_nm_none_40000.bins.txt";
const PH_CONTACTS: &str = "data/GSE99106_nm_none_40000.n_contact.txt";

const START_BIN: i64 = 1723;
const END_BIN: i64 = 2061;

const OUT_FIG: &str = "figure/figure_5G.png";
const LOG_FILE: &str = "figure5g.log";

fn figure_style() -> HeatmapStyle {
    HeatmapStyle {
        figure_inches: 7.0,
        title: "Fig. 5G | WT (upper triangle) vs ph505 (lower triangle)".to_string(),
        axis_label: Some("chr3R position (kb)".to_string()),
        colorbar_label: "Contact enrichment (log2 O/E)".to_string(),
        ..HeatmapStyle::default()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut logger = Logger::create(LOG_FILE)?;
    logger.log("=== Fig. 5G Log ===")?;
    logger.log(&format!("Software Version: v{}", VERSION))?;
    logger.log(&format!("Bin range: {}..={}", START_BIN, END_BIN))?;

    let wt = Dataset {
        label: "WT",
        bins: Path::new(WT_BINS),
        contacts: Path::new(WT_CONTACTS),
    };
    let ph = Dataset {
        label: "ph505",
        bins: Path::new(PH_BINS),
        contacts: Path::new(PH_CONTACTS),
    };

    let result = run_diagonal_comparison(
        &wt,
        &ph,
        START_BIN,
        END_BIN,
        Path::new(OUT_FIG),
        &figure_style(),
        &mut logger,
    );
    if let Err(e) = &result {
        logger.log_failure("Fig. 5G", e);
    }
    result
}
