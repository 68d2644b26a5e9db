use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::SalesDataset;
use crate::error::ConfigurationError;

// ---------------------------------------------------------------------------
// Semantic keys and their aliases
// ---------------------------------------------------------------------------

/// The meaning a dataset column can have for the report.
///
/// Serialized with the Russian labels so the mapping can be shown as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SemanticKey {
    #[serde(rename = "ИП")]
    SellerId,
    #[serde(rename = "Себестоимость")]
    Cost,
    #[serde(rename = "Базовая цена")]
    Price,
    #[serde(rename = "Продажа шт")]
    QuantitySold,
    #[serde(rename = "Товар")]
    ProductName,
    #[serde(rename = "Категория")]
    Category,
    /// Derived; never auto-detected, synthesized from Price × QuantitySold.
    #[serde(rename = "Сумма продаж")]
    Revenue,
}

/// Name of the column that holds synthesized revenue.
pub const REVENUE_COLUMN: &str = "Сумма продаж";

impl SemanticKey {
    /// Keys looked up in the alias table, in prompt order.
    pub const DETECTABLE: [SemanticKey; 6] = [
        SemanticKey::SellerId,
        SemanticKey::Cost,
        SemanticKey::Price,
        SemanticKey::QuantitySold,
        SemanticKey::ProductName,
        SemanticKey::Category,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SemanticKey::SellerId => "ИП",
            SemanticKey::Cost => "Себестоимость",
            SemanticKey::Price => "Базовая цена",
            SemanticKey::QuantitySold => "Продажа шт",
            SemanticKey::ProductName => "Товар",
            SemanticKey::Category => "Категория",
            SemanticKey::Revenue => REVENUE_COLUMN,
        }
    }

    /// Candidate column names, most preferred first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            SemanticKey::SellerId => &["ИП", "Магазин", "Компания"],
            SemanticKey::Cost => &["С/с", "Себестоимость", "Себестоимость, ₽"],
            SemanticKey::Price => &[
                "Базовая цена",
                "Цена продажи",
                "Продажная цена",
                "Базовая, ₽",
            ],
            SemanticKey::QuantitySold => &[
                "Продажа шт",
                "Количество",
                "Кол-во",
                "Заказы",
                "Заказы Количество, шт.",
            ],
            SemanticKey::ProductName => &["Товар", "Наименование", "Продукт", "Название"],
            SemanticKey::Category => &["Категория", "Группа товаров", "Тип товара"],
            SemanticKey::Revenue => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnMapping
// ---------------------------------------------------------------------------

/// Semantic key → dataset column name. Absent keys suppress whatever
/// depends on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    columns: BTreeMap<SemanticKey, String>,
}

impl ColumnMapping {
    pub fn get(&self, key: SemanticKey) -> Option<&str> {
        self.columns.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: SemanticKey) -> bool {
        self.columns.contains_key(&key)
    }

    /// Map `key` to a column the user picked. The column must exist.
    pub fn assign(
        &mut self,
        key: SemanticKey,
        column: &str,
        dataset: &SalesDataset,
    ) -> Result<(), ConfigurationError> {
        if !dataset.has_column(column) {
            return Err(ConfigurationError::UnknownColumn {
                key: key.label(),
                column: column.to_string(),
            });
        }
        self.columns.insert(key, column.to_string());
        Ok(())
    }

    /// Unchecked insert, for columns the report itself adds.
    pub(crate) fn insert(&mut self, key: SemanticKey, column: &str) {
        self.columns.insert(key, column.to_string());
    }

    pub fn remove(&mut self, key: SemanticKey) {
        self.columns.remove(&key);
    }

    /// Detectable keys that are still unmapped.
    pub fn missing(&self) -> Vec<SemanticKey> {
        SemanticKey::DETECTABLE
            .into_iter()
            .filter(|k| !self.contains(*k))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SemanticKey, &str)> {
        self.columns.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Pretty JSON with the Russian labels, for display.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Detect columns by alias.
///
/// For every detectable key the aliases are tried in order and the first one
/// present verbatim in `column_names` wins. Keys with no match are left out.
pub fn resolve_columns(column_names: &[String]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    for key in SemanticKey::DETECTABLE {
        if let Some(alias) = key
            .aliases()
            .iter()
            .find(|alias| column_names.iter().any(|c| c == *alias))
        {
            mapping.insert(key, alias);
        }
    }
    log::debug!("Detected columns: {:?}", mapping);
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn detects_first_matching_alias() {
        let cols = names(&["Магазин", "Себестоимость, ₽", "Цена продажи", "Кол-во", "Прочее"]);
        let mapping = resolve_columns(&cols);

        assert_eq!(mapping.get(SemanticKey::SellerId), Some("Магазин"));
        assert_eq!(mapping.get(SemanticKey::Cost), Some("Себестоимость, ₽"));
        assert_eq!(mapping.get(SemanticKey::Price), Some("Цена продажи"));
        assert_eq!(mapping.get(SemanticKey::QuantitySold), Some("Кол-во"));
        assert_eq!(mapping.get(SemanticKey::ProductName), None);
        assert_eq!(
            mapping.missing(),
            vec![SemanticKey::ProductName, SemanticKey::Category]
        );
    }

    #[test]
    fn earlier_alias_wins_regardless_of_column_order() {
        let cols = names(&["Компания", "Заказы", "ИП", "Количество"]);
        let mapping = resolve_columns(&cols);

        assert_eq!(mapping.get(SemanticKey::SellerId), Some("ИП"));
        assert_eq!(mapping.get(SemanticKey::QuantitySold), Some("Количество"));
    }

    #[test]
    fn match_is_verbatim() {
        let cols = names(&["ип", "ИП ", "Категория товара"]);
        let mapping = resolve_columns(&cols);
        assert_eq!(mapping, ColumnMapping::default());
        assert_eq!(mapping.missing().len(), 6);
    }

    #[test]
    fn revenue_is_never_detected() {
        let mapping = resolve_columns(&names(&["Сумма продаж"]));
        assert!(!mapping.contains(SemanticKey::Revenue));
    }

    #[test]
    fn manual_assignment_requires_existing_column() {
        let ds = SalesDataset::from_rows(names(&["Продавец"]), vec![]);
        let mut mapping = ColumnMapping::default();

        mapping.assign(SemanticKey::SellerId, "Продавец", &ds).unwrap();
        assert_eq!(mapping.get(SemanticKey::SellerId), Some("Продавец"));

        let err = mapping.assign(SemanticKey::Cost, "С/с", &ds).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownColumn {
                key: "Себестоимость",
                column: "С/с".into()
            }
        );
        assert!(!mapping.contains(SemanticKey::Cost));
    }

    #[test]
    fn pretty_json_uses_labels() {
        let mapping = resolve_columns(&names(&["ИП", "Заказы"]));
        let json: serde_json::Value = serde_json::from_str(&mapping.to_pretty_json()).unwrap();
        assert_eq!(json["ИП"], "ИП");
        assert_eq!(json["Продажа шт"], "Заказы");
    }
}
