//! Text rendering of measurements.

use crate::compare::Comparison;
use crate::stats::Summary;

pub const TABLE_WIDTH: usize = 80;

/// `"<label>: <value> ms"` with two decimals.
pub fn single_line(label: &str, ms: f64) -> String {
    format!("{label}: {ms:.2} ms")
}

pub fn rule(width: usize) -> String {
    "-".repeat(width)
}

/// Header of the five-column summary table.
pub fn table_header(key_title: &str) -> String {
    format!(
        "{:<10} {:<15} {:<15} {:<15} {:<15} {:<15}",
        key_title, "Mean (ms)", "Median (ms)", "Min (ms)", "Max (ms)", "Std. dev."
    )
}

pub fn table_row(key: &str, summary: &Summary) -> String {
    format!(
        "{:<10} {:<15.3} {:<15.3} {:<15.3} {:<15.3} {:<15.3}",
        key, summary.mean, summary.median, summary.min, summary.max, summary.std_dev
    )
}

/// One line of a relative-performance listing, e.g. `1000       2.131x slower`.
pub fn relative_line(key: &str, comparison: &Comparison) -> String {
    format!(
        "{:<10} {:<15}x {}",
        key,
        format!("{:.3}", comparison.ratio),
        comparison.verdict
    )
}

#[cfg(test)]
mod tests {
    use super::{relative_line, single_line, table_header, table_row};
    use crate::compare::compare_means;
    use crate::stats::Summary;

    #[test]
    fn single_line_uses_two_decimals() {
        assert_eq!(single_line("Fetch user 123", 1.23456), "Fetch user 123: 1.23 ms");
    }

    #[test]
    fn table_row_uses_three_decimals_in_column_order() {
        let summary = Summary::from_samples(&[10.0, 20.0, 30.0]).unwrap();
        let row = table_row("100", &summary);
        let cells: Vec<&str> = row.split_whitespace().collect();

        assert_eq!(cells, ["100", "20.000", "20.000", "10.000", "30.000", "10.000"]);
    }

    #[test]
    fn header_and_row_align() {
        let summary = Summary::from_samples(&[1.0]).unwrap();
        let header = table_header("Rows");
        let row = table_row("1", &summary);

        let median_col = header.find("Median").unwrap();
        assert_eq!(median_col, 27);
        assert_eq!(&row[median_col..median_col + 5], "1.000");
    }

    #[test]
    fn relative_line_shows_ratio_and_verdict() {
        let cmp = compare_means(2.0, 3.0).unwrap();
        let line = relative_line("1000", &cmp);

        assert!(line.starts_with("1000"));
        assert!(line.contains("1.500"));
        assert!(line.ends_with("x slower"));
    }
}
