use std::collections::BTreeMap;

use super::metrics::{Metric, MetricsRecord};
use crate::data::model::CellValue;
use crate::error::Unavailable;

/// One metric side by side for several sellers, in metrics order.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub metric: Metric,
    pub values: Vec<(CellValue, f64)>,
}

impl Comparison {
    pub fn total(&self) -> f64 {
        self.values.iter().map(|(_, v)| v).sum()
    }
}

/// Pick `metric` for every seller that is both in `metrics` and in
/// `selected`. Sellers lacking the metric are skipped.
pub fn compare_sellers(
    metrics: &BTreeMap<CellValue, MetricsRecord>,
    metric: Metric,
    selected: &[CellValue],
) -> Result<Comparison, Unavailable> {
    let values: Vec<(CellValue, f64)> = metrics
        .iter()
        .filter(|(seller, _)| selected.contains(seller))
        .filter_map(|(seller, record)| Some((seller.clone(), record.get(metric)?)))
        .collect();

    let comparison = Comparison { metric, values };
    if comparison.values.is_empty() {
        return Err(Unavailable::EmptySelection);
    }
    if comparison.total() == 0.0 {
        return Err(Unavailable::ZeroTotal);
    }
    Ok(comparison)
}

// ---------------------------------------------------------------------------
// Selection kept between passes
// ---------------------------------------------------------------------------

/// Comparison choices that survive from one pass to the next.
#[derive(Debug, Clone, Default)]
pub struct ComparisonSession {
    pub metric: Metric,
    selected: Vec<CellValue>,
    initialized: bool,
}

impl ComparisonSession {
    pub fn selected(&self) -> &[CellValue] {
        &self.selected
    }

    pub fn is_selected(&self, seller: &CellValue) -> bool {
        self.selected.contains(seller)
    }

    /// Drop sellers that are no longer valid. The very first call selects
    /// every valid seller.
    pub fn revalidate<'a, I>(&mut self, valid: I)
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let valid: Vec<&CellValue> = valid.into_iter().collect();
        if !self.initialized {
            self.selected = valid.into_iter().cloned().collect();
            self.initialized = true;
            return;
        }
        let before = self.selected.len();
        self.selected.retain(|s| valid.contains(&s));
        if self.selected.len() != before {
            log::debug!(
                "Dropped {} stale sellers from the comparison",
                before - self.selected.len()
            );
        }
    }

    pub fn set_selected(&mut self, seller: &CellValue, on: bool) {
        let present = self.is_selected(seller);
        if on && !present {
            self.selected.push(seller.clone());
        } else if !on && present {
            self.selected.retain(|s| s != seller);
        }
    }

    pub fn compare(
        &self,
        metrics: &BTreeMap<CellValue, MetricsRecord>,
    ) -> Result<Comparison, Unavailable> {
        compare_sellers(metrics, self.metric, &self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics() -> BTreeMap<CellValue, MetricsRecord> {
        let record = |revenue: i64, margin: Option<f64>| MetricsRecord {
            total_revenue: Some(revenue),
            total_margin: margin,
            order_count: Some(3),
            average_order_value: Some(revenue as f64 / 3.0),
        };
        BTreeMap::from([
            ("A".into(), record(400, Some(200.0))),
            ("B".into(), record(150, None)),
            ("C".into(), record(0, Some(0.0))),
        ])
    }

    #[test]
    fn restricted_to_selection_in_metrics_order() {
        let selected: Vec<CellValue> = vec!["C".into(), "A".into(), "B".into(), "Z".into()];
        let cmp = compare_sellers(&metrics(), Metric::TotalRevenue, &selected).unwrap();

        assert_eq!(
            cmp.values,
            vec![
                (CellValue::from("A"), 400.0),
                (CellValue::from("B"), 150.0),
                (CellValue::from("C"), 0.0)
            ]
        );
    }

    #[test]
    fn sellers_without_the_metric_are_skipped() {
        let selected: Vec<CellValue> = vec!["A".into(), "B".into()];
        let cmp = compare_sellers(&metrics(), Metric::TotalMargin, &selected).unwrap();
        assert_eq!(cmp.values, vec![(CellValue::from("A"), 200.0)]);
    }

    #[test]
    fn empty_or_zero_is_unavailable() {
        assert_eq!(
            compare_sellers(&metrics(), Metric::TotalRevenue, &[]),
            Err(Unavailable::EmptySelection)
        );
        assert_eq!(
            compare_sellers(&metrics(), Metric::TotalRevenue, &[CellValue::from("C")]),
            Err(Unavailable::ZeroTotal)
        );
    }

    #[test]
    fn session_starts_with_everyone_then_drops_stale_sellers() {
        let first = metrics();
        let mut session = ComparisonSession::default();
        assert_eq!(session.metric, Metric::TotalRevenue);

        session.revalidate(first.keys());
        assert_eq!(session.selected().len(), 3);

        session.set_selected(&"B".into(), false);
        let second: BTreeMap<CellValue, MetricsRecord> = first
            .into_iter()
            .filter(|(s, _)| s != &CellValue::from("C"))
            .collect();
        session.revalidate(second.keys());

        assert_eq!(session.selected(), &[CellValue::from("A")]);
        let cmp = session.compare(&second).unwrap();
        assert_eq!(cmp.values, vec![(CellValue::from("A"), 400.0)]);
    }
}
