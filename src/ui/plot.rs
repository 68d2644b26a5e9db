use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, HLine, LineStyle, Plot, PlotPoint, Text};

use crate::color::{BAR_COLOR, ColorMap, contrasting_text, hex_color};
use crate::report::format::{Bar as CategoryBar, PieSlice, format_thousands, grid_ticks};

// ---------------------------------------------------------------------------
// Category bar chart (one per seller)
// ---------------------------------------------------------------------------

/// Render one seller's revenue by category, largest first.
pub fn category_chart(ui: &mut Ui, id: &str, bars: &[CategoryBar]) {
    let categories: Vec<String> = bars.iter().map(|b| b.category.clone()).collect();
    let top = bars.iter().map(|b| b.value).fold(0.0, f64::max);

    let chart = BarChart::new(
        bars.iter()
            .enumerate()
            .map(|(i, b)| Bar::new(i as f64, b.value).name(&b.category).width(0.6))
            .collect(),
    )
    .color(hex_color(BAR_COLOR))
    .name("Сумма продаж");

    Plot::new(id)
        .height(280.0)
        .y_axis_label("Сумма продаж (₽)")
        .y_axis_formatter(|mark, _range| format_thousands(mark.value))
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            categories.get(idx as usize).cloned().unwrap_or_default()
        })
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            // dashed y grid
            for y in grid_ticks(top) {
                plot_ui.hline(
                    HLine::new(y)
                        .color(Color32::from_gray(160))
                        .width(0.5)
                        .style(LineStyle::dashed_loose()),
                );
            }
            plot_ui.bar_chart(chart);
            for (i, bar) in bars.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, bar.value), bar.label.as_str())
                        .anchor(Align2::CENTER_BOTTOM)
                        .color(Color32::DARK_GRAY),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Comparison pie chart
// ---------------------------------------------------------------------------

/// Largest angle of a single triangle when tessellating a wedge.
const WEDGE_STEP_DEG: f64 = 2.0;

/// Paint the comparison pie. Slices are laid out by
/// [`crate::report::format::pie_slices`].
pub fn pie_chart(ui: &mut Ui, slices: &[PieSlice], colors: &ColorMap) {
    let size = ui.available_width().clamp(200.0, 520.0);
    let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
    let center = response.rect.center();
    let radius = size * 0.34;

    let at = |deg: f64, r: f32| -> Pos2 {
        let rad = (deg as f32).to_radians();
        // screen y grows downwards
        center + Vec2::new(rad.cos(), -rad.sin()) * r
    };

    for slice in slices {
        let fill = colors.color_for(&slice.seller);
        let steps = (slice.sweep / WEDGE_STEP_DEG).ceil().max(1.0) as usize;
        for k in 0..steps {
            let a0 = slice.start_angle + slice.sweep * k as f64 / steps as f64;
            let a1 = slice.start_angle + slice.sweep * (k + 1) as f64 / steps as f64;
            painter.add(Shape::convex_polygon(
                vec![center, at(a0, radius), at(a1, radius)],
                fill,
                Stroke::new(0.5, fill),
            ));
        }

        let mid = slice.start_angle + slice.sweep / 2.0;
        let outer = at(mid, radius * 1.15);
        let align = if outer.x >= center.x {
            Align2::LEFT_CENTER
        } else {
            Align2::RIGHT_CENTER
        };
        painter.text(
            outer,
            align,
            &slice.label,
            FontId::proportional(14.0),
            ui.visuals().text_color(),
        );
        painter.text(
            at(mid, radius * 0.6),
            Align2::CENTER_CENTER,
            &slice.value_label,
            FontId::proportional(12.0),
            contrasting_text(fill),
        );
    }

    if let Some(pos) = response.hover_pos() {
        let offset = pos - center;
        if offset.length() <= radius {
            let deg = f64::from((-offset.y).atan2(offset.x)).to_degrees();
            if let Some(slice) = slices
                .iter()
                .find(|s| normalize(deg, s.start_angle) < s.start_angle + s.sweep)
            {
                response.on_hover_text(format!(
                    "{}: {} ({:.1}%)",
                    slice.label,
                    format_thousands(slice.value),
                    slice.percent
                ));
            }
        }
    }
}

/// Shift `deg` by whole turns into `[start, start + 360)`.
fn normalize(deg: f64, start: f64) -> f64 {
    start + (deg - start).rem_euclid(360.0)
}

/// Warning line shown in place of a chart.
pub fn unavailable(ui: &mut Ui, message: impl std::fmt::Display) {
    ui.label(
        egui::RichText::new(format!("⚠ {message}. Пропускаем."))
            .color(Color32::from_rgb(200, 140, 0)),
    );
}
