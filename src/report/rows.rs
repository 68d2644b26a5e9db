use std::collections::BTreeSet;

use super::columns::{ColumnMapping, SemanticKey};
use crate::data::model::{CellValue, SalesDataset, SalesRecord};
use crate::error::ConfigurationError;

/// One record viewed through a resolved [`ColumnMapping`].
///
/// Numeric fields are parse-or-absent: `None` when the key is unmapped or the
/// cell does not coerce to a number.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    pub seller: CellValue,
    pub cost: Option<f64>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
}

impl SalesRow {
    /// (Price − Cost) × QuantitySold.
    pub fn margin(&self) -> Option<f64> {
        Some((self.price? - self.cost?) * self.quantity?)
    }

    /// Price × QuantitySold.
    pub fn gross(&self) -> Option<f64> {
        Some(self.price? * self.quantity?)
    }
}

/// Typed rows plus the keys whose columns were actually usable.
#[derive(Debug, Clone, Default)]
pub struct TypedRows {
    pub rows: Vec<SalesRow>,
    pub present: BTreeSet<SemanticKey>,
    pub warnings: Vec<String>,
}

impl TypedRows {
    pub fn has(&self, key: SemanticKey) -> bool {
        self.present.contains(&key)
    }

    pub fn has_all(&self, keys: &[SemanticKey]) -> bool {
        keys.iter().all(|k| self.has(*k))
    }
}

/// Resolve `mapping` against `dataset` and build one [`SalesRow`] per record
/// with a non-blank seller.
///
/// The seller column is mandatory. Any other mapped column missing from the
/// dataset is reported as a warning and treated as unmapped.
pub fn typed_rows(
    dataset: &SalesDataset,
    mapping: &ColumnMapping,
) -> Result<TypedRows, ConfigurationError> {
    let seller_col = mapping
        .get(SemanticKey::SellerId)
        .ok_or(ConfigurationError::MissingColumn(SemanticKey::SellerId.label()))?;
    if !dataset.has_column(seller_col) {
        return Err(ConfigurationError::UnknownColumn {
            key: SemanticKey::SellerId.label(),
            column: seller_col.to_string(),
        });
    }

    let mut present = BTreeSet::from([SemanticKey::SellerId]);
    let mut warnings = Vec::new();
    for (key, column) in mapping.iter() {
        if key == SemanticKey::SellerId {
            continue;
        }
        if dataset.has_column(column) {
            present.insert(key);
        } else {
            let msg = format!(
                "Колонка '{column}' для '{}' отсутствует в данных, пропускаем",
                key.label()
            );
            log::warn!("{msg}");
            warnings.push(msg);
        }
    }

    let column_for = |key: SemanticKey| {
        if present.contains(&key) {
            mapping.get(key)
        } else {
            None
        }
    };
    let cost = column_for(SemanticKey::Cost);
    let price = column_for(SemanticKey::Price);
    let quantity = column_for(SemanticKey::QuantitySold);

    let numeric = |record: &SalesRecord, column: Option<&str>| {
        column.and_then(|c| record.get(c).to_numeric())
    };

    let rows = dataset
        .records
        .iter()
        .filter(|r| !r.get(seller_col).is_blank())
        .map(|r| SalesRow {
            seller: r.get(seller_col).clone(),
            cost: numeric(r, cost),
            price: numeric(r, price),
            quantity: numeric(r, quantity),
        })
        .collect();

    Ok(TypedRows {
        rows,
        present,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dataset() -> SalesDataset {
        SalesDataset::from_rows(
            vec!["ИП".into(), "Цена продажи".into(), "Заказы".into()],
            vec![
                vec!["A".into(), CellValue::Integer(100), CellValue::Integer(2)],
                vec![CellValue::Null, CellValue::Integer(1), CellValue::Integer(1)],
                vec!["B".into(), "N/A".into(), CellValue::Float(3.0)],
            ],
        )
    }

    fn mapping(ds: &SalesDataset) -> ColumnMapping {
        let mut m = ColumnMapping::default();
        m.assign(SemanticKey::SellerId, "ИП", ds).unwrap();
        m.assign(SemanticKey::Price, "Цена продажи", ds).unwrap();
        m.assign(SemanticKey::QuantitySold, "Заказы", ds).unwrap();
        m
    }

    #[test]
    fn rows_skip_blank_sellers_and_coerce() {
        let ds = dataset();
        let typed = typed_rows(&ds, &mapping(&ds)).unwrap();

        assert_eq!(typed.rows.len(), 2);
        assert_eq!(typed.rows[0].gross(), Some(200.0));
        assert_eq!(typed.rows[1].price, None);
        assert_eq!(typed.rows[1].gross(), None);
        assert_eq!(typed.rows[1].cost, None);
        assert!(typed.has_all(&[SemanticKey::Price, SemanticKey::QuantitySold]));
        assert!(!typed.has(SemanticKey::Cost));
    }

    #[test]
    fn missing_seller_is_a_configuration_error() {
        let ds = dataset();
        let mut m = mapping(&ds);
        m.remove(SemanticKey::SellerId);
        assert_eq!(
            typed_rows(&ds, &m).unwrap_err(),
            ConfigurationError::MissingColumn("ИП")
        );
    }

    #[test]
    fn stale_optional_column_becomes_a_warning() {
        let ds = dataset();
        let mut m = mapping(&ds);
        m.insert(SemanticKey::Category, "Категория");

        let typed = typed_rows(&ds, &m).unwrap();
        assert!(!typed.has(SemanticKey::Category));
        assert_eq!(typed.warnings.len(), 1);
        assert!(typed.warnings[0].contains("Категория"));
    }
}
