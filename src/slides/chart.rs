/// Widest bar drawn, in characters
pub const BAR_WIDTH: usize = 40;

/// Render labelled horizontal bars scaled to the largest value.
///
/// Negative values draw as empty bars. Labels are padded to the longest one.
pub fn bar_chart(rows: &[(&str, f64)], unit: &str) -> String {
    let label_width = rows.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, value)| *value).fold(0.0_f64, f64::max);

    let mut chart = String::new();
    for (label, value) in rows {
        let length = if max > 0.0 && *value > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round().max(1.0) as usize
        } else {
            0
        };
        let suffix = if unit.is_empty() {
            format!("{}", value)
        } else {
            format!("{} {}", value, unit)
        };
        chart.push_str(&format!(
            "{:<width$} | {} {}\n",
            label,
            "█".repeat(length),
            suffix,
            width = label_width
        ));
    }
    chart
}
