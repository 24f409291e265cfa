//! SVG line chart rendered with Plotters.

use std::path::Path;

use plotters::prelude::*;

use crate::domain::LabeledSeries;
use crate::error::AppError;
use crate::plot::{PlotStyle, day_count, day_labels, value_range};

/// Draw `series` into an SVG file at `path`.
pub fn render_svg_chart(path: &Path, series: &[LabeledSeries], style: &PlotStyle) -> Result<(), AppError> {
    draw(path, series, style)
        .map_err(|e| AppError::new(4, format!("Failed to render SVG chart '{}': {e}", path.display())))
}

fn draw(path: &Path, series: &[LabeledSeries], style: &PlotStyle) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = (day_count(series).saturating_sub(1)).max(1) as f64;
    let (y_min, y_max) = value_range(series, 0.05);
    let labels = day_labels(series);

    let mut builder = ChartBuilder::on(&root);
    builder.margin(10).x_label_area_size(40).y_label_area_size(60);
    if let Some(title) = &style.title {
        builder.caption(title, ("sans-serif", 24));
    }
    let mut chart = builder.build_cartesian_2d(0f64..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(style.x_desc.as_str())
        .y_desc(style.y_desc.as_str())
        .x_labels(style.x_labels)
        .x_label_formatter(&|v| day_label(labels, *v))
        .draw()?;

    for (i, s) in series.iter().enumerate() {
        let rgba = Palette99::pick(i).to_rgba();
        let color = RGBColor(rgba.0, rgba.1, rgba.2);
        chart
            .draw_series(LineSeries::new(s.series.numeric_points(), color.stroke_width(style.line_width)))?
            .label(format!("{} {}", s.legend(), s.field))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if style.legend && !series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Date label of the day nearest to axis position `v`.
fn day_label(labels: &[String], v: f64) -> String {
    if !v.is_finite() || v < 0.0 {
        return String::new();
    }
    labels.get(v.round() as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ResolvedSeries, Scope, Value};

    #[test]
    fn writes_an_svg_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("chart.svg");
        let series = vec![LabeledSeries {
            field: "Confirmed".to_string(),
            scope: Scope::Country("Italy".to_string()),
            series: ResolvedSeries {
                time: vec!["2020-03-01".into(), "2020-03-02".into(), "2020-03-03".into()],
                values: vec![Value::Int(1694), Value::Int(2036), Value::Int(2502)],
            },
        }];
        let style = PlotStyle {
            title: Some("Italy".to_string()),
            width: 400,
            height: 300,
            ..Default::default()
        };

        render_svg_chart(&path, &series, &style).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("polyline"));
    }

    #[test]
    fn day_labels_by_nearest_index() {
        let labels = vec!["03-01".to_string(), "03-02".to_string()];
        assert_eq!(day_label(&labels, 0.4), "03-01");
        assert_eq!(day_label(&labels, 0.6), "03-02");
        assert_eq!(day_label(&labels, 5.0), "");
        assert_eq!(day_label(&labels, -1.0), "");
    }
}
