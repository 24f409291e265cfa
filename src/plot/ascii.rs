//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Each series gets its own marker; where lines cross, the series drawn
//! first keeps the cell.

use crate::domain::LabeledSeries;
use crate::plot::{day_count, day_labels, value_range};

const MARKERS: [char; 8] = ['*', 'o', '+', 'x', '#', '@', '%', '&'];

/// Render `series` as lines over a `width` x `height` character grid,
/// followed by a legend.
pub fn render_ascii_chart(series: &[LabeledSeries], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let days = day_count(series);
    if days == 0 {
        return "Plot: no data\n".to_string();
    }
    let t_max = (days - 1).max(1) as f64;
    let (y_min, y_max) = value_range(series, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for (i, s) in series.iter().enumerate() {
        let points = s.series.numeric_points();
        draw_curve(&mut grid, &points, t_max, y_min, y_max, marker(i));
    }

    let labels = day_labels(series);
    let first = labels.first().map(String::as_str).unwrap_or("");
    let last = labels.last().map(String::as_str).unwrap_or("");

    let mut out = String::new();
    out.push_str(&format!("Plot: {first} .. {last} | y=[{y_min:.2}, {y_max:.2}]\n"));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    for (i, s) in series.iter().enumerate() {
        out.push_str(&format!("{} {}: {}\n", marker(i), s.legend(), s.field));
    }

    out
}

fn marker(i: usize) -> char {
    MARKERS[i % MARKERS.len()]
}

fn map_x(t: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (t / t_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], points: &[(f64, f64)], t_max: f64, y_min: f64, y_max: f64, ch: char) {
    let height = grid.len();
    let Some(width) = grid.first().map(Vec::len) else {
        return;
    };

    let mut prev = None;
    for &(t, y) in points {
        let x = map_x(t, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None if grid[yy][x] == ' ' => grid[yy][x] = ch,
            None => {}
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
