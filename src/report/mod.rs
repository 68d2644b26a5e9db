/// Report layer: column mapping, derived revenue, and aggregations.
///
/// One pass over a loaded dataset:
/// ```text
///   SalesDataset + ColumnMapping
///        │
///        ▼
///   ┌──────────┐
///   │ revenue   │  add Price × QuantitySold if Revenue is unmapped
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │ metrics   │   │ category  │  per seller
///   └──────────┘   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ comparison  │  one metric across the selected sellers
///   └────────────┘
/// ```

pub mod category;
pub mod columns;
pub mod comparison;
pub mod format;
pub mod metrics;
pub mod revenue;
pub mod rows;

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::data::model::{CellValue, SalesDataset};
use crate::error::{ConfigurationError, Unavailable};
use category::{CategorySums, category_sums};
use columns::ColumnMapping;
use metrics::{SellerMetrics, calculate_metrics};
use revenue::synthesize_revenue;

/// Everything one pass produces for the presentation layer.
#[derive(Debug, Clone)]
pub struct Report {
    /// The mapping actually used, including a synthesized Revenue.
    pub mapping: ColumnMapping,
    pub metrics: SellerMetrics,
    pub categories: BTreeMap<CellValue, Result<CategorySums, Unavailable>>,
}

/// Run one full pass: synthesize revenue, compute metrics, then category
/// sums for every seller.
///
/// The input dataset is left untouched; revenue is added to a working copy.
pub fn run_pass(
    dataset: &SalesDataset,
    mapping: &ColumnMapping,
) -> Result<Report, ConfigurationError> {
    let mut working = dataset.clone();
    let mut mapping = mapping.clone();
    synthesize_revenue(&mut working, &mut mapping);

    let metrics = calculate_metrics(&working, &mapping)?;

    let categories: BTreeMap<CellValue, Result<CategorySums, Unavailable>> = metrics
        .sellers()
        .map(|seller| {
            let sums = category_sums(&working, &mapping, seller);
            if let Err(reason) = &sums {
                warn!("No category chart for seller {seller}: {reason}");
            }
            (seller.clone(), sums)
        })
        .collect();

    debug!(
        "Pass complete: {} sellers, {} warnings",
        metrics.by_seller.len(),
        metrics.warnings.len()
    );

    Ok(Report {
        mapping,
        metrics,
        categories,
    })
}
