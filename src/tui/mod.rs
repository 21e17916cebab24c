//! Ratatui-based sales dashboard.
//!
//! One screen: a product list on the left, and for the highlighted product its
//! three metric cards above a monthly bar chart with the trend overlay. The
//! branch selector and the CSV picker drive the pipeline; every interaction
//! rebuilds a `DashboardRequest` and reruns it from the uploaded bytes.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};
use tracing::{debug, info, warn};

use crate::app::pipeline::{run_dashboard, Dashboard};
use crate::cli::picker::{discover_csv_files, pretty_path};
use crate::domain::{BranchSelection, DashboardRequest, ProductReport, Upload};
use crate::error::AppError;
use crate::plot::tick_indices;
use crate::report::{
    chart_title, fmt_margin, fmt_price, fmt_units, MARGIN_LABEL, PRICE_LABEL, UNITS_LABEL,
};

mod plotters_chart;

use plotters_chart::SalesPlottersChart;

/// Start the dashboard, optionally with a file already loaded.
pub fn run(upload: Option<Upload>, selection: BranchSelection) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(upload, selection);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// CSV picker overlay state.
struct Picker {
    files: Vec<PathBuf>,
    selected: usize,
}

struct App {
    upload: Option<Upload>,
    selection: BranchSelection,
    /// Result of the latest pipeline run; the error is the user-facing message.
    outcome: Option<Result<Dashboard, String>>,
    selected_product: usize,
    picker: Option<Picker>,
    status: String,
}

impl App {
    fn new(upload: Option<Upload>, selection: BranchSelection) -> Self {
        let mut app = Self {
            upload,
            selection,
            outcome: None,
            selected_product: 0,
            picker: None,
            status: String::new(),
        };
        if app.upload.is_some() {
            app.rerun();
        } else {
            app.open_picker();
            app.status = "Please choose a CSV file to begin.".to_string();
        }
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.picker.is_some() {
            self.handle_picker_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected_product = self.selected_product.saturating_sub(1),
            KeyCode::Down => {
                if self.selected_product + 1 < self.product_count() {
                    self.selected_product += 1;
                }
            }
            KeyCode::Left => self.cycle_branch(-1),
            KeyCode::Right => self.cycle_branch(1),
            KeyCode::Char('o') => self.open_picker(),
            KeyCode::Char('r') => {
                self.rerun();
                if matches!(self.outcome, Some(Ok(_))) {
                    self.status = "Reloaded.".to_string();
                }
            }
            _ => {}
        }
        false
    }

    fn handle_picker_key(&mut self, code: KeyCode) {
        let Some(picker) = self.picker.as_mut() else {
            return;
        };

        match code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.picker = None;
            }
            KeyCode::Up => picker.selected = picker.selected.saturating_sub(1),
            KeyCode::Down => {
                if picker.selected + 1 < picker.files.len() {
                    picker.selected += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(path) = picker.files.get(picker.selected).cloned() {
                    self.picker = None;
                    self.load_file(path);
                }
            }
            _ => {}
        }
    }

    fn open_picker(&mut self) {
        let files = discover_csv_files();
        debug!(count = files.len(), "discovered csv files");
        if files.is_empty() {
            self.status = "No .csv files found under the current directory.".to_string();
        }
        self.picker = Some(Picker { files, selected: 0 });
    }

    /// A new upload replaces the old one and resets the branch selection.
    fn load_file(&mut self, path: PathBuf) {
        match crate::io::read_upload(&path) {
            Ok(upload) => {
                info!(file = %upload.name, "upload replaced");
                self.upload = Some(upload);
                self.selection = BranchSelection::All;
                self.selected_product = 0;
                self.rerun();
            }
            Err(err) => {
                warn!(error = %err, "failed to read upload");
                self.status = err.to_string();
            }
        }
    }

    fn cycle_branch(&mut self, delta: isize) {
        let Some(Ok(dashboard)) = &self.outcome else {
            return;
        };
        let options = BranchSelection::options(&dashboard.branches);
        self.selection = cycle(&options, &self.selection, delta);
        self.selected_product = 0;
        self.rerun();
    }

    /// Run the whole pipeline for the current upload + selection.
    fn rerun(&mut self) {
        let Some(upload) = &self.upload else {
            self.outcome = None;
            return;
        };

        let request = DashboardRequest {
            upload: upload.clone(),
            selection: self.selection.clone(),
        };

        match run_dashboard(&request) {
            Ok(dashboard) => {
                self.status = format!("Data for {}", dashboard.selection);
                if self.selected_product >= dashboard.reports.len() {
                    self.selected_product = dashboard.reports.len().saturating_sub(1);
                }
                self.outcome = Some(Ok(dashboard));
            }
            Err(err) => {
                warn!(error = %err, "dashboard run failed");
                self.status = "Choose another file with `o`.".to_string();
                self.outcome = Some(Err(err.to_string()));
            }
        }
    }

    fn product_count(&self) -> usize {
        match &self.outcome {
            Some(Ok(d)) => d.reports.len(),
            _ => 0,
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        if self.picker.is_some() {
            self.draw_picker(frame, size);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("sales", Style::default().fg(Color::Cyan)),
            Span::raw(" - sales analysis"),
        ]));

        let file = self
            .upload
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "-".to_string());

        let detail = match &self.outcome {
            Some(Ok(d)) => format!(
                "file: {file} | branch: ◀ {} ▶ | rows: {}/{} ({} skipped) | products: {}",
                d.selection,
                d.rows_selected,
                d.stats.rows_read,
                d.stats.rows_skipped(),
                d.reports.len(),
            ),
            _ => format!("file: {file}"),
        };
        lines.push(Line::from(Span::styled(detail, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let dashboard = match &self.outcome {
            Some(Ok(d)) => d,
            Some(Err(message)) => {
                let p = Paragraph::new(message.as_str())
                    .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                    .wrap(Wrap { trim: true })
                    .block(Block::default().title("Error").borders(Borders::ALL));
                frame.render_widget(p, area);
                return;
            }
            None => {
                let p = Paragraph::new("Please choose a CSV file to begin (press `o`).")
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(p, area);
                return;
            }
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(26), Constraint::Min(0)])
            .split(area);

        self.draw_products(frame, chunks[0], dashboard);

        match dashboard.reports.get(self.selected_product) {
            Some(report) => self.draw_product(frame, chunks[1], report),
            None => {
                let p = Paragraph::new("No products to show.")
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(p, chunks[1]);
            }
        }
    }

    fn draw_products(&self, frame: &mut ratatui::Frame<'_>, area: Rect, dashboard: &Dashboard) {
        let items: Vec<ListItem> = dashboard
            .reports
            .iter()
            .map(|r| ListItem::new(r.summary.product.clone()))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Products").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if !dashboard.reports.is_empty() {
            state.select(Some(self.selected_product));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_product(&self, frame: &mut ratatui::Frame<'_>, area: Rect, report: &ProductReport) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(chunks[0]);

        let s = &report.summary;
        let metrics = [
            (PRICE_LABEL, fmt_price(s.mean_unit_price)),
            (MARGIN_LABEL, fmt_margin(s.mean_margin_ratio)),
            (UNITS_LABEL, fmt_units(s.total_units)),
        ];
        for ((label, value), rect) in metrics.into_iter().zip(cards.iter()) {
            let p = Paragraph::new(Line::from(Span::styled(
                value,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(Block::default().title(label).borders(Borders::ALL));
            frame.render_widget(p, *rect);
        }

        self.draw_chart(frame, chunks[1], report);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, report: &ProductReport) {
        let block = Block::default()
            .title(chart_title(&report.summary.product))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let data = chart_series(report);
        let (chart_rect, insets) = chart_layout(inner);
        let widget = SalesPlottersChart {
            bars: &data.bars,
            trend: &data.trend,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
        };
        frame.render_widget(widget, chart_rect);

        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &data);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ product  ←/→ branch  o open file  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_picker(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(picker) = &self.picker else {
            return;
        };
        let rect = centered_rect(area, 60, 60);
        frame.render_widget(Clear, rect);

        let block = Block::default()
            .title("Open CSV (Enter load, Esc close)")
            .borders(Borders::ALL);

        if picker.files.is_empty() {
            let p = Paragraph::new("No .csv files found under the current directory.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(p, rect);
            return;
        }

        let items: Vec<ListItem> = picker
            .files
            .iter()
            .map(|p| ListItem::new(pretty_path(p)))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(picker.selected));
        frame.render_stateful_widget(list, rect, &mut state);
    }
}

/// Step through `options` from `current`, wrapping at both ends.
fn cycle(options: &[BranchSelection], current: &BranchSelection, delta: isize) -> BranchSelection {
    if options.is_empty() {
        return BranchSelection::All;
    }
    let len = options.len() as isize;
    let idx = options.iter().position(|o| o == current).unwrap_or(0) as isize;
    options[(idx + delta).rem_euclid(len) as usize].clone()
}

/// Series and bounds for one product chart.
struct ChartData {
    bars: Vec<(f64, f64)>,
    trend: Vec<(f64, f64)>,
    labels: Vec<String>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(report: &ProductReport) -> ChartData {
    let n = report.series.len();
    let values = report.series.units();
    let fitted = report.trend.predictions(n);

    let bars: Vec<(f64, f64)> = values.iter().enumerate().map(|(i, &v)| (i as f64, v)).collect();

    // A single point still gets a visible (flat) trend segment.
    let trend: Vec<(f64, f64)> = match fitted.as_slice() {
        [only] => vec![(-0.4, *only), (0.4, *only)],
        _ => fitted.iter().enumerate().map(|(i, &y)| (i as f64, y)).collect(),
    };

    let (mut y_min, mut y_max) = (0.0_f64, f64::NEG_INFINITY);
    for &y in values.iter().chain(fitted.iter()).filter(|y| y.is_finite()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_max.is_finite() || y_max <= y_min {
        y_max = y_min + 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    ChartData {
        bars,
        trend,
        labels: report.series.labels().map(str::to_string).collect(),
        x_bounds: [-0.5, n.max(1) as f64 - 0.5],
        y_bounds: [y_min, y_max + pad],
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

/// Column of the centre of bar `idx` inside `chart`.
fn bar_column(chart: Rect, idx: usize, n: usize) -> u16 {
    let u = (idx as f64 + 0.5) / n.max(1) as f64;
    chart.x + ((chart.width.saturating_sub(1)) as f64 * u).round() as u16
}

fn draw_axis_ticks(frame: &mut ratatui::Frame<'_>, inner: Rect, chart: Rect, insets: AxisInsets, data: &ChartData) {
    let style = Style::default().fg(Color::Gray);
    let n = data.labels.len();

    // X: month labels at the tick stride, skipping any that would collide.
    let y = chart.y + chart.height;
    if y < inner.y + inner.height {
        let mut next_free = inner.x;
        for idx in tick_indices(n) {
            let label = &data.labels[idx];
            let label_len = label.chars().count() as u16;
            let start = bar_column(chart, idx, n).saturating_sub(label_len / 2).max(inner.x);
            if start < next_free || start + label_len > inner.x + inner.width {
                continue;
            }
            frame.render_widget(
                Paragraph::new(label.as_str()).style(style),
                Rect {
                    x: start,
                    y,
                    width: label_len,
                    height: 1,
                },
            );
            next_free = start + label_len + 1;
        }
    }

    // Y: five evenly spaced unit values.
    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = data.y_bounds[0] + u * (data.y_bounds[1] - data.y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("year-month")
        .alignment(Alignment::Center)
        .style(style);
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("units").style(style.add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

fn centered_rect(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(pct_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(pct_y) / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MonthlyPoint, MonthlySeries, ProductSummary, TrendLine};

    fn report(values: &[f64], trend: TrendLine) -> ProductReport {
        ProductReport {
            summary: ProductSummary {
                product: "Cafe".to_string(),
                mean_unit_price: 1.0,
                mean_margin_ratio: 0.5,
                total_units: values.iter().sum(),
            },
            series: MonthlySeries {
                points: values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| MonthlyPoint {
                        year_month: format!("2024-{:02}", i + 1),
                        units_sold: v,
                        revenue: 0.0,
                        cost: 0.0,
                    })
                    .collect(),
            },
            trend,
        }
    }

    #[test]
    fn cycle_wraps_in_both_directions() {
        let options = BranchSelection::options(&["A".to_string(), "B".to_string()]);
        let b = BranchSelection::Branch("B".to_string());
        assert_eq!(cycle(&options, &BranchSelection::All, 1), BranchSelection::Branch("A".to_string()));
        assert_eq!(cycle(&options, &BranchSelection::All, -1), b);
        assert_eq!(cycle(&options, &b, 1), BranchSelection::All);
    }

    #[test]
    fn chart_series_covers_every_bar() {
        let data = chart_series(&report(&[10.0, 20.0, 30.0], TrendLine { slope: 10.0, intercept: 10.0 }));
        assert_eq!(data.bars, vec![(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)]);
        assert_eq!(data.trend.len(), 3);
        assert_eq!(data.x_bounds, [-0.5, 2.5]);
        assert_eq!(data.y_bounds[0], 0.0);
        assert!(data.y_bounds[1] > 30.0);
        assert_eq!(data.labels[2], "2024-03");
    }

    #[test]
    fn single_point_gets_a_flat_trend_segment() {
        let data = chart_series(&report(&[7.0], TrendLine::flat(7.0)));
        assert_eq!(data.trend, vec![(-0.4, 7.0), (0.4, 7.0)]);
        assert_eq!(data.x_bounds, [-0.5, 0.5]);
    }

    #[test]
    fn bar_columns_are_ordered_inside_the_chart() {
        let chart = Rect::new(10, 0, 50, 10);
        let cols: Vec<u16> = (0..5).map(|i| bar_column(chart, i, 5)).collect();
        assert!(cols.windows(2).all(|w| w[0] < w[1]));
        assert!(cols[0] >= chart.x && cols[4] < chart.x + chart.width);
    }
}
