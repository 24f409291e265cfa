use crate::domain::LabeledSeries;
use crate::report::summarize;

/// Format one series as a `date value` table under a title line.
pub fn format_series_table(series: &LabeledSeries) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} | {} ===\n", series.field, series.scope.label()));
    out.push_str(format!("{:<12} {:>14}\n", "date", "value").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<14}\n", "", "").trim_end());
    out.push('\n');

    for (date, value) in series.series.time.iter().zip(&series.series.values) {
        out.push_str(format!("{:<12} {:>14}\n", date, value.to_string()).trim_end());
        out.push('\n');
    }

    out
}

/// Format one summary line per series.
pub fn format_summary(series: &[LabeledSeries]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<16} {:<40} {:>5} {:>12} {:>12} {:>12}\n",
            "scope", "field", "days", "latest", "min", "max"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<16} {:-<40} {:-<5} {:-<12} {:-<12} {:-<12}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for s in series {
        let summary = summarize(&s.series);
        out.push_str(
            format!(
                "{:<16} {:<40} {:>5} {:>12} {:>12} {:>12}\n",
                truncate(s.scope.label(), 16),
                truncate(&s.field, 40),
                summary.days,
                summary.latest.map(|v| v.to_string()).unwrap_or_default(),
                fmt_opt(summary.min),
                fmt_opt(summary.max),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_default()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
