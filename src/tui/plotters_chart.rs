//! Plotters-powered monthly sales chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`. Tick labels are drawn by the caller around the
//! widget, since month labels need the stride rule rather than Plotters'
//! automatic numeric ticks.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call, which keeps
/// `render()` focused on drawing.
pub struct SalesPlottersChart<'a> {
    /// Bars: `(position, units)` with positions `0..n-1`.
    pub bars: &'a [(f64, f64)],
    /// Trend overlay, already evaluated at the bar positions.
    pub trend: &'a [(f64, f64)],
    /// X bounds (half a slot of padding on each side of the bars).
    pub x_bounds: [f64; 2],
    /// Y bounds (units sold).
    pub y_bounds: [f64; 2],
}

/// Half-width of a bar, in slot units.
const BAR_HALF_WIDTH: f64 = 0.35;

impl Widget for SalesPlottersChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Axis lines only; labels are drawn outside by the TUI.
                .set_label_area_size(LabelAreaPosition::Left, 1)
                .set_label_area_size(LabelAreaPosition::Bottom, 1)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_label_formatter(&|_| String::new())
                .y_label_formatter(&|_| String::new())
                .axis_style(&WHITE)
                .draw()?;

            let bar_color = RGBColor(160, 32, 240); // purple
            let trend_color = RGBColor(255, 0, 0); // red

            // 1) Monthly bars.
            chart.draw_series(self.bars.iter().map(|&(x, y)| {
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, 0.0_f64.clamp(y0, y1)), (x + BAR_HALF_WIDTH, y)],
                    bar_color.filled(),
                )
            }))?;

            // 2) Trend overlay.
            chart.draw_series(LineSeries::new(self.trend.iter().copied(), &trend_color))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
