use super::columns::{ColumnMapping, REVENUE_COLUMN, SemanticKey};
use crate::data::model::{CellValue, SalesDataset};

/// Add a synthetic revenue column (Price × QuantitySold) when Revenue is not
/// mapped yet but Price and QuantitySold are.
///
/// Rows where either operand is absent get a `Null` revenue. Returns whether
/// a column was added; with Revenue already mapped nothing changes.
pub fn synthesize_revenue(dataset: &mut SalesDataset, mapping: &mut ColumnMapping) -> bool {
    if mapping.contains(SemanticKey::Revenue) {
        return false;
    }
    let (Some(price), Some(quantity)) = (
        mapping.get(SemanticKey::Price),
        mapping.get(SemanticKey::QuantitySold),
    ) else {
        return false;
    };
    if !dataset.has_column(price) || !dataset.has_column(quantity) {
        return false;
    }

    dataset.set_column(REVENUE_COLUMN, |record| {
        match (record.get(price).to_numeric(), record.get(quantity).to_numeric()) {
            (Some(p), Some(q)) => CellValue::Float(p * q),
            _ => CellValue::Null,
        }
    });
    log::debug!("Synthesized '{REVENUE_COLUMN}' from '{price}' × '{quantity}'");
    mapping.insert(SemanticKey::Revenue, REVENUE_COLUMN);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::columns::resolve_columns;
    use pretty_assertions::assert_eq;

    fn dataset() -> SalesDataset {
        SalesDataset::from_rows(
            vec!["ИП".into(), "Цена продажи".into(), "Количество".into()],
            vec![
                vec!["A".into(), CellValue::Integer(100), CellValue::Integer(2)],
                vec!["A".into(), "N/A".into(), CellValue::Integer(1)],
            ],
        )
    }

    #[test]
    fn revenue_column_is_added_and_mapped() {
        let mut ds = dataset();
        let mut mapping = resolve_columns(&ds.column_names);

        assert!(synthesize_revenue(&mut ds, &mut mapping));
        assert_eq!(mapping.get(SemanticKey::Revenue), Some(REVENUE_COLUMN));
        assert!(ds.has_column(REVENUE_COLUMN));
        assert_eq!(ds.records[0].get(REVENUE_COLUMN), &CellValue::Float(200.0));
        assert_eq!(ds.records[1].get(REVENUE_COLUMN), &CellValue::Null);
    }

    #[test]
    fn second_run_changes_nothing() {
        let mut ds = dataset();
        let mut mapping = resolve_columns(&ds.column_names);
        synthesize_revenue(&mut ds, &mut mapping);

        let mapping_before = mapping.clone();
        let columns_before = ds.column_names.clone();
        assert!(!synthesize_revenue(&mut ds, &mut mapping));
        assert_eq!(mapping, mapping_before);
        assert_eq!(ds.column_names, columns_before);
    }

    #[test]
    fn needs_price_and_quantity() {
        let mut ds = dataset();
        let mut mapping = resolve_columns(&ds.column_names);
        mapping.remove(SemanticKey::QuantitySold);

        assert!(!synthesize_revenue(&mut ds, &mut mapping));
        assert!(!mapping.contains(SemanticKey::Revenue));
        assert!(!ds.has_column(REVENUE_COLUMN));
    }
}
