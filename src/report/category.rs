use std::collections::BTreeMap;

use super::columns::{ColumnMapping, SemanticKey};
use crate::data::filter::{group_by, matching_records};
use crate::data::model::{CellValue, SalesDataset};
use crate::error::Unavailable;

/// Revenue per category for one seller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySums {
    pub sums: BTreeMap<CellValue, f64>,
}

impl CategorySums {
    pub fn total(&self) -> f64 {
        self.sums.values().sum()
    }

    /// Categories by descending revenue, ties in category order.
    pub fn sorted_desc(&self) -> Vec<(&CellValue, f64)> {
        let mut entries: Vec<(&CellValue, f64)> = self.sums.iter().map(|(k, v)| (k, *v)).collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries
    }
}

/// Sum revenue by category over `seller`'s records.
///
/// Checked in order, each giving [`Unavailable`] instead of a result:
/// Category or Revenue unmapped, no records for the seller, the mapped
/// columns missing from the data, and a zero grand total.
pub fn category_sums(
    dataset: &SalesDataset,
    mapping: &ColumnMapping,
    seller: &CellValue,
) -> Result<CategorySums, Unavailable> {
    let (Some(category), Some(revenue), Some(seller_col)) = (
        mapping.get(SemanticKey::Category),
        mapping.get(SemanticKey::Revenue),
        mapping.get(SemanticKey::SellerId),
    ) else {
        return Err(Unavailable::MissingColumns);
    };

    let records = matching_records(dataset, seller_col, seller);
    if records.is_empty() {
        return Err(Unavailable::NoRecords);
    }

    if !dataset.has_column(category) || !dataset.has_column(revenue) {
        return Err(Unavailable::ColumnsNotInData);
    }

    let sums: BTreeMap<CellValue, f64> = group_by(records, category)
        .into_iter()
        .map(|(cat, rows)| {
            let total: f64 = rows.iter().filter_map(|r| r.get(revenue).to_numeric()).sum();
            (cat, total)
        })
        .collect();

    let result = CategorySums { sums };
    if result.sums.is_empty() || result.total() == 0.0 {
        return Err(Unavailable::ZeroTotal);
    }
    Ok(result)
}
