// Chart rendering. The aggregations are turned into plain `ChartSpec`s and
// handed to a `ChartSink`; the shipped sink draws SVG files with plotters.
use crate::error::{CafeError, Result};
use crate::reports::{items_by_quantity, monthly_sales, revenue_by_location};
use crate::types::CleanRecord;
use log::{debug, info, warn};
use plotters::prelude::*;
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    /// Line through the points, each point marked.
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub name: &'static str,
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub trait ChartSink {
    fn render(&mut self, chart: &ChartSpec) -> Result<()>;
}

/// Build the three insight charts from cleaned records, in display order.
pub fn build_charts(data: &[CleanRecord]) -> Vec<ChartSpec> {
    let items = items_by_quantity(data);
    let locations = revenue_by_location(data);
    let months = monthly_sales(data);
    vec![
        ChartSpec {
            name: "items_by_quantity",
            title: "Items Sold by Quantity".to_string(),
            x_desc: "Item".to_string(),
            y_desc: "Quantity".to_string(),
            kind: ChartKind::Bar,
            labels: items.iter().map(|r| r.item.clone()).collect(),
            values: items.iter().map(|r| r.quantity).collect(),
        },
        ChartSpec {
            name: "revenue_by_location",
            title: "Revenue by Location".to_string(),
            x_desc: "Location".to_string(),
            y_desc: "Total Spent".to_string(),
            kind: ChartKind::Bar,
            labels: locations.iter().map(|r| r.location.clone()).collect(),
            values: locations.iter().map(|r| r.total_spent).collect(),
        },
        ChartSpec {
            name: "monthly_sales",
            title: "Monthly Sales Trend".to_string(),
            x_desc: "Month".to_string(),
            y_desc: "Total Spent".to_string(),
            kind: ChartKind::Line,
            labels: months.iter().map(|r| r.month.to_string()).collect(),
            values: months.iter().map(|r| r.total_spent).collect(),
        },
    ]
}

/// Render every non-empty chart. Returns the names of the charts drawn;
/// charts without data are skipped with a warning.
pub fn render_charts(data: &[CleanRecord], sink: &mut dyn ChartSink) -> Result<Vec<&'static str>> {
    let mut rendered = Vec::new();
    for chart in build_charts(data) {
        if chart.is_empty() {
            warn!("render_charts: no data for {}, skipping", chart.name);
            continue;
        }
        sink.render(&chart)?;
        rendered.push(chart.name);
    }
    info!("render_charts: rendered {} of 3 charts", rendered.len());
    Ok(rendered)
}

pub struct SvgChartSink {
    dir: PathBuf,
    size: (u32, u32),
}

impl SvgChartSink {
    pub fn new(dir: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self {
            dir: dir.into(),
            size,
        }
    }

    pub fn path_for(&self, chart: &ChartSpec) -> PathBuf {
        self.dir.join(format!("{}.svg", chart.name))
    }
}

impl ChartSink for SvgChartSink {
    fn render(&mut self, chart: &ChartSpec) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(chart);
        debug!("SvgChartSink: drawing {} to {}", chart.name, path.display());
        let drawn = match chart.kind {
            ChartKind::Bar => draw_bar(&path, self.size, chart),
            ChartKind::Line => draw_line(&path, self.size, chart),
        };
        drawn.map_err(|e| CafeError::Chart(format!("{}: {}", chart.name, e)))
    }
}

fn y_upper(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn draw_bar(path: &Path, size: (u32, u32), chart: &ChartSpec) -> std::result::Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let n = chart.values.len() as u32;
    let labels = &chart.labels;
    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..n).into_segmented(), 0f64..y_upper(&chart.values))?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .x_labels(labels.len() + 1)
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    ctx.draw_series(chart.values.iter().enumerate().map(|(i, v)| {
        let i = i as u32;
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
            BLUE.mix(0.7).filled(),
        );
        bar.set_margin(0, 0, 8, 8);
        bar
    }))?;

    root.present()?;
    Ok(())
}

fn draw_line(path: &Path, size: (u32, u32), chart: &ChartSpec) -> std::result::Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let n = chart.values.len();
    let labels = &chart.labels;
    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_upper(&chart.values))?;

    ctx.configure_mesh()
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .x_labels(n)
        .x_label_formatter(&|x| {
            let i = x.round();
            if (x - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .draw()?;

    let points: Vec<(f64, f64)> = chart
        .values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect();
    ctx.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    ctx.draw_series(points.iter().map(|p| Circle::new(*p, 5, BLUE.filled())))?;

    root.present()?;
    Ok(())
}
