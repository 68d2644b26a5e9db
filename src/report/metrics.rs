//! Per-seller financial metrics.
//!
//! Sums skip absent (unparseable) terms; a seller with no usable cells for a
//! metric still gets the metric, with a zero total.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use super::columns::{ColumnMapping, SemanticKey};
use super::rows::{SalesRow, TypedRows, typed_rows};
use crate::data::model::{CellValue, SalesDataset};
use crate::error::ConfigurationError;

// ---------------------------------------------------------------------------
// Metric names
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Metric {
    #[default]
    TotalRevenue,
    TotalMargin,
    OrderCount,
    AverageOrderValue,
}

impl Metric {
    /// Choice order offered for comparison.
    pub const ALL: [Metric; 4] = [
        Metric::TotalRevenue,
        Metric::TotalMargin,
        Metric::OrderCount,
        Metric::AverageOrderValue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalRevenue => "Сумма продаж",
            Metric::TotalMargin => "Общая маржа",
            Metric::OrderCount => "Количество заказов",
            Metric::AverageOrderValue => "Средний чек",
        }
    }
}

// ---------------------------------------------------------------------------
// MetricsRecord
// ---------------------------------------------------------------------------

/// Metrics of one seller. A field is `None` when the columns it needs are
/// not mapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsRecord {
    #[serde(rename = "Общая маржа", skip_serializing_if = "Option::is_none")]
    pub total_margin: Option<f64>,
    #[serde(rename = "Сумма продаж", skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<i64>,
    #[serde(rename = "Количество заказов", skip_serializing_if = "Option::is_none")]
    pub order_count: Option<i64>,
    #[serde(rename = "Средний чек", skip_serializing_if = "Option::is_none")]
    pub average_order_value: Option<f64>,
}

impl MetricsRecord {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::TotalMargin => self.total_margin,
            Metric::TotalRevenue => self.total_revenue.map(|v| v as f64),
            Metric::OrderCount => self.order_count.map(|v| v as f64),
            Metric::AverageOrderValue => self.average_order_value,
        }
    }

    /// Pretty JSON with the Russian labels, for display.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Metrics for every seller, sorted by seller identity.
#[derive(Debug, Clone, Default)]
pub struct SellerMetrics {
    pub by_seller: BTreeMap<CellValue, MetricsRecord>,
    /// Non-fatal problems met while computing.
    pub warnings: Vec<String>,
}

impl SellerMetrics {
    pub fn sellers(&self) -> impl Iterator<Item = &CellValue> {
        self.by_seller.keys()
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Round half away from zero to 2 decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Group `dataset` by seller and compute each seller's metrics.
///
/// Fails only when the seller column cannot be resolved; everything else
/// degrades to a missing metric plus a warning.
pub fn calculate_metrics(
    dataset: &SalesDataset,
    mapping: &ColumnMapping,
) -> Result<SellerMetrics, ConfigurationError> {
    let typed = typed_rows(dataset, mapping)?;

    let mut groups: BTreeMap<&CellValue, Vec<&SalesRow>> = BTreeMap::new();
    for row in &typed.rows {
        groups.entry(&row.seller).or_default().push(row);
    }
    debug!(
        "Computing metrics for {} sellers over {} rows",
        groups.len(),
        typed.rows.len()
    );

    let by_seller = groups
        .into_iter()
        .map(|(seller, rows)| (seller.clone(), metrics_for_group(&typed, &rows)))
        .collect();

    Ok(SellerMetrics {
        by_seller,
        warnings: typed.warnings,
    })
}

fn metrics_for_group(typed: &TypedRows, rows: &[&SalesRow]) -> MetricsRecord {
    use SemanticKey::*;

    let mut record = MetricsRecord::default();

    if typed.has_all(&[Cost, Price, QuantitySold]) {
        let margin: f64 = rows.iter().filter_map(|r| r.margin()).sum();
        record.total_margin = Some(round2(margin));
    }

    if typed.has_all(&[Price, QuantitySold]) {
        let revenue: f64 = rows.iter().filter_map(|r| r.gross()).sum();
        record.total_revenue = Some(revenue.trunc() as i64);
    }

    if typed.has(QuantitySold) {
        let orders: f64 = rows.iter().filter_map(|r| r.quantity).sum();
        record.order_count = Some(orders.trunc() as i64);
    }

    if let (Some(revenue), Some(orders)) = (record.total_revenue, record.order_count) {
        record.average_order_value = Some(if orders > 0 {
            round2(revenue as f64 / orders as f64)
        } else {
            0.0
        });
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::columns::resolve_columns;
    use pretty_assertions::assert_eq;

    fn sales(rows: Vec<Vec<CellValue>>) -> (SalesDataset, ColumnMapping) {
        let ds = SalesDataset::from_rows(
            vec![
                "ИП".into(),
                "Базовая цена".into(),
                "С/с".into(),
                "Продажа шт".into(),
            ],
            rows,
        );
        let mapping = resolve_columns(&ds.column_names);
        (ds, mapping)
    }

    fn row(seller: &str, price: CellValue, cost: i64, qty: i64) -> Vec<CellValue> {
        vec![
            seller.into(),
            price,
            CellValue::Integer(cost),
            CellValue::Integer(qty),
        ]
    }

    #[test]
    fn two_sellers_match_hand_computed_values() {
        let (ds, mapping) = sales(vec![
            row("A", CellValue::Integer(100), 50, 2),
            row("A", CellValue::Integer(200), 100, 1),
            row("B", CellValue::Integer(50), 20, 3),
        ]);

        let metrics = calculate_metrics(&ds, &mapping).unwrap();
        assert_eq!(metrics.by_seller.len(), 2);
        assert!(metrics.warnings.is_empty());

        assert_eq!(
            metrics.by_seller[&CellValue::from("A")],
            MetricsRecord {
                total_margin: Some(200.0),
                total_revenue: Some(400),
                order_count: Some(3),
                average_order_value: Some(133.33),
            }
        );
        assert_eq!(
            metrics.by_seller[&CellValue::from("B")],
            MetricsRecord {
                total_margin: Some(90.0),
                total_revenue: Some(150),
                order_count: Some(3),
                average_order_value: Some(50.0),
            }
        );
    }

    #[test]
    fn unparseable_price_contributes_nothing() {
        let (ds, mapping) = sales(vec![
            row("A", CellValue::Integer(100), 50, 2),
            row("A", "N/A".into(), 100, 1),
        ]);

        let a = calculate_metrics(&ds, &mapping).unwrap().by_seller[&CellValue::from("A")];
        assert_eq!(a.total_revenue, Some(200));
        assert_eq!(a.total_margin, Some(100.0));
        // quantity of the N/A row still counts as sold units
        assert_eq!(a.order_count, Some(3));
        assert_eq!(a.average_order_value, Some(66.67));
    }

    #[test]
    fn zero_orders_give_zero_average() {
        let (ds, mapping) = sales(vec![row("A", CellValue::Integer(100), 50, 0)]);

        let a = calculate_metrics(&ds, &mapping).unwrap().by_seller[&CellValue::from("A")];
        assert_eq!(a.order_count, Some(0));
        assert_eq!(a.average_order_value, Some(0.0));
    }

    #[test]
    fn metrics_follow_available_columns() {
        let (ds, mut mapping) = sales(vec![row("A", CellValue::Integer(10), 5, 4)]);
        mapping.remove(SemanticKey::Cost);

        let a = calculate_metrics(&ds, &mapping).unwrap().by_seller[&CellValue::from("A")];
        assert_eq!(a.total_margin, None);
        assert_eq!(a.total_revenue, Some(40));

        mapping.remove(SemanticKey::Price);
        let a = calculate_metrics(&ds, &mapping).unwrap().by_seller[&CellValue::from("A")];
        assert_eq!(
            a,
            MetricsRecord {
                order_count: Some(4),
                ..Default::default()
            }
        );
    }

    #[test]
    fn revenue_is_truncated_and_margin_rounded() {
        let ds = SalesDataset::from_rows(
            vec!["ИП".into(), "Базовая цена".into(), "С/с".into(), "Продажа шт".into()],
            vec![vec![
                "A".into(),
                CellValue::Float(10.333),
                CellValue::Float(0.001),
                CellValue::Float(2.5),
            ]],
        );
        let mapping = resolve_columns(&ds.column_names);

        let a = calculate_metrics(&ds, &mapping).unwrap().by_seller[&CellValue::from("A")];
        assert_eq!(a.total_revenue, Some(25));
        assert_eq!(a.order_count, Some(2));
        assert_eq!(a.total_margin, Some(25.83));
        assert_eq!(a.average_order_value, Some(12.5));
    }

    #[test]
    fn unmapped_seller_fails_the_pass() {
        let (ds, mut mapping) = sales(vec![row("A", CellValue::Integer(1), 1, 1)]);
        mapping.remove(SemanticKey::SellerId);
        assert!(matches!(
            calculate_metrics(&ds, &mapping),
            Err(ConfigurationError::MissingColumn(_))
        ));
    }

    #[test]
    fn record_serializes_with_labels_and_skips_missing() {
        let record = MetricsRecord {
            total_revenue: Some(400),
            order_count: Some(3),
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::from_str(&record.to_pretty_json()).unwrap();
        assert_eq!(json["Сумма продаж"], 400);
        assert!(json.get("Общая маржа").is_none());
        assert_eq!(record.get(Metric::OrderCount), Some(3.0));
        assert_eq!(record.get(Metric::AverageOrderValue), None);
    }
}
