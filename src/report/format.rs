use super::category::CategorySums;
use super::comparison::Comparison;
use crate::data::model::CellValue;
use crate::error::Unavailable;

/// First pie slice starts here, degrees counter-clockwise from 3 o'clock.
pub const PIE_START_ANGLE: f64 = 140.0;

/// Truncate to an integer and group digits by three with spaces:
/// `1234567.9` → `"1 234 567"`.
pub fn format_thousands(value: f64) -> String {
    let int = value.trunc() as i64;
    let digits = int.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if int < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Heights of horizontal grid lines for a chart topping out at `max`: multiples
/// of a 1/2/5 × 10ⁿ step, about five lines, from the step up to `max`.
pub fn grid_ticks(max: f64) -> Vec<f64> {
    if !max.is_finite() || max <= 0.0 {
        return Vec::new();
    }
    let raw = max / 5.0;
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    (1..)
        .map(|i| i as f64 * step)
        .take_while(|y| *y <= max)
        .collect()
}

/// One bar of the per-seller category chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub category: String,
    pub value: f64,
    pub label: String,
}

/// Bars sorted by descending revenue, each with its value label.
pub fn category_bars(sums: &CategorySums) -> Vec<Bar> {
    sums.sorted_desc()
        .into_iter()
        .map(|(category, value)| Bar {
            category: category.to_string(),
            value,
            label: format_thousands(value),
        })
        .collect()
}

/// Geometry and labels of one pie slice. Angles are in degrees,
/// counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub seller: CellValue,
    pub label: String,
    pub value: f64,
    pub percent: f64,
    pub start_angle: f64,
    pub sweep: f64,
    /// `"12.5% (150)"`
    pub value_label: String,
}

/// Lay out the comparison as pie slices, in input order from
/// [`PIE_START_ANGLE`].
///
/// Negative values cannot be drawn as wedges and make the pie unavailable.
pub fn pie_slices(comparison: &Comparison) -> Result<Vec<PieSlice>, Unavailable> {
    if comparison.values.iter().any(|(_, v)| *v < 0.0) {
        return Err(Unavailable::NegativeValues);
    }
    let total = comparison.total();
    if total <= 0.0 {
        return Err(Unavailable::ZeroTotal);
    }

    let mut angle = PIE_START_ANGLE;
    let slices = comparison
        .values
        .iter()
        .map(|(seller, value)| {
            let percent = value / total * 100.0;
            let sweep = value / total * 360.0;
            let absolute = (percent / 100.0 * total).round_ties_even() as i64;
            let slice = PieSlice {
                seller: seller.clone(),
                label: seller.to_string(),
                value: *value,
                percent,
                start_angle: angle,
                sweep,
                value_label: format!("{percent:.1}% ({absolute})"),
            };
            angle += sweep;
            slice
        })
        .collect();
    Ok(slices)
}
