//! Report module: renders scenario results as text tables and ratio lines.
//!
//! `render_*` functions build the text; the `print_*` wrappers send it to
//! stdout. Progress and failures go through `log`.

use crate::scenario::{IndexResults, RelationTiming, SingleTiming, SizeSeries};
use harness::compare::{compare, compare_means, Comparison};
use harness::format::{relative_line, rule, single_line, table_header, table_row, TABLE_WIDTH};
use harness::Summary;
use std::fmt::Write;

// Writing into a `String` cannot fail, so the `fmt::Result`s below are ignored.

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "=".repeat(TABLE_WIDTH));
    let _ = writeln!(out, "  {title}");
    let _ = writeln!(out, "{}", "=".repeat(TABLE_WIDTH));
}

fn ratio_text(comparison: Option<Comparison>) -> String {
    match comparison {
        Some(c) => c.to_string(),
        None => "n/a".to_string(),
    }
}

/// Five-column table followed by every later row relative to the first.
fn table_with_relative(
    out: &mut String,
    title: &str,
    key_title: &str,
    rows: &[(String, Summary)],
) {
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", table_header(key_title));
    let _ = writeln!(out, "{}", rule(TABLE_WIDTH + 16));
    for (key, summary) in rows {
        let _ = writeln!(out, "{}", table_row(key, summary));
    }

    let Some((first_key, first)) = rows.first() else {
        return;
    };
    if rows.len() < 2 {
        return;
    }
    let _ = writeln!(out, "\nRelative to {first_key}:");
    for (key, summary) in &rows[1..] {
        match compare(first, summary) {
            Some(c) => {
                let _ = writeln!(out, "{}", relative_line(key, &c));
            }
            None => {
                let _ = writeln!(out, "{key:<10} n/a");
            }
        }
    }
}

fn keyed_by_size(sizes: &[usize], summaries: &[Summary]) -> Vec<(String, Summary)> {
    sizes
        .iter()
        .zip(summaries)
        .map(|(size, summary)| (size.to_string(), *summary))
        .collect()
}

pub fn print_section(title: &str) {
    let mut out = String::new();
    section(&mut out, title);
    print!("{out}");
}

pub fn render_single(timing: &SingleTiming) -> String {
    format!(
        "[{}] {} ({} rows)",
        timing.store,
        single_line(&timing.label, timing.ms),
        timing.rows
    )
}

pub fn print_single(timing: &SingleTiming) {
    println!("{}", render_single(timing));
}

/// Model-layer time relative to raw time for every basic query.
pub fn render_basic_comparison(timings: &[SingleTiming]) -> String {
    let mut out = String::new();
    section(&mut out, "Basic queries: model vs raw");
    for model in timings.iter().filter(|t| t.store == "model") {
        let raw = timings
            .iter()
            .find(|t| t.store == "raw" && t.label == model.label);
        let text = match raw {
            Some(raw) => ratio_text(compare_means(raw.ms, model.ms)),
            None => "n/a".to_string(),
        };
        let _ = writeln!(out, "{}: {}", model.label, text);
    }
    out
}

pub fn print_basic_comparison(timings: &[SingleTiming]) {
    print!("{}", render_basic_comparison(timings));
}

pub fn render_size_report(series: &[SizeSeries]) -> String {
    let mut out = String::new();
    section(&mut out, "Lookup by id vs table size");

    for s in series {
        let rows: Vec<(String, Summary)> = s
            .rows
            .iter()
            .map(|(size, summary)| (size.to_string(), *summary))
            .collect();
        table_with_relative(&mut out, &format!("Access: {}", s.store), "Rows", &rows);

        if let (Some((first_size, first)), Some((last_size, last))) = (s.rows.first(), s.rows.last())
        {
            let _ = writeln!(
                out,
                "\n{} rows vs {} rows: {}",
                last_size,
                first_size,
                ratio_text(compare(first, last))
            );
        }
    }

    let model = series.iter().find(|s| s.store == "model");
    let raw = series.iter().find(|s| s.store == "raw");
    if let (Some(model), Some(raw)) = (model, raw) {
        let _ = writeln!(out, "\nModel vs raw per size:");
        for (size, m) in &model.rows {
            let text = match raw.rows.iter().find(|(raw_size, _)| raw_size == size) {
                Some((_, r)) => ratio_text(compare(r, m)),
                None => "n/a".to_string(),
            };
            let _ = writeln!(out, "{size:<10} {text}");
        }
    }
    out
}

pub fn print_size_report(series: &[SizeSeries]) {
    print!("{}", render_size_report(series));
}

pub fn render_index_report(results: &IndexResults) -> String {
    let mut out = String::new();
    section(&mut out, "Index impact on account lookups");

    let sizes = &results.sizes;
    table_with_relative(
        &mut out,
        "Primary key lookup",
        "Rows",
        &keyed_by_size(sizes, &results.pk_indexed),
    );
    table_with_relative(
        &mut out,
        "Name lookup, indexed",
        "Rows",
        &keyed_by_size(sizes, &results.name_indexed),
    );
    table_with_relative(
        &mut out,
        "Name lookup, no index",
        "Rows",
        &keyed_by_size(sizes, &results.name_unindexed),
    );

    let _ = writeln!(out, "\nIndex speedup on name (unindexed / indexed):");
    let _ = writeln!(
        out,
        "{:<10} {:<20} {:<20} {:<15}",
        "Rows", "Without index (ms)", "With index (ms)", "Speedup"
    );
    let _ = writeln!(out, "{}", rule(68));
    for ((size, indexed), unindexed) in sizes
        .iter()
        .zip(&results.name_indexed)
        .zip(&results.name_unindexed)
    {
        let speedup = match compare(indexed, unindexed) {
            Some(c) => format!("{:.3}x", c.ratio),
            None => "n/a".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<10} {:<20.3} {:<20.3} {:<15}",
            size, unindexed.mean, indexed.mean, speedup
        );
    }
    out
}

pub fn print_index_report(results: &IndexResults) {
    print!("{}", render_index_report(results));
}

pub fn render_relations_report(timings: &[RelationTiming]) -> String {
    let mut out = String::new();
    section(&mut out, "Relationship queries");
    for timing in timings {
        let rows = vec![
            ("small".to_string(), timing.small),
            ("large".to_string(), timing.large),
        ];
        table_with_relative(&mut out, timing.label, "Dataset", &rows);
        let _ = writeln!(
            out,
            "\nlarge vs small: {}",
            ratio_text(compare(&timing.small, &timing.large))
        );
    }
    out
}

pub fn print_relations_report(timings: &[RelationTiming]) {
    print!("{}", render_relations_report(timings));
}

#[cfg(test)]
mod tests {
    use super::{
        ratio_text, render_basic_comparison, render_index_report, render_relations_report,
        render_single, render_size_report,
    };
    use crate::scenario::{IndexResults, RelationTiming, SingleTiming, SizeSeries};
    use harness::compare::compare_means;
    use harness::Summary;

    fn summary(values: &[f64]) -> Summary {
        Summary::from_samples(values).unwrap()
    }

    fn lines_after<'a>(text: &'a str, heading: &str) -> Vec<&'a str> {
        text.lines()
            .skip_while(|l| !l.starts_with(heading))
            .skip(1)
            .take_while(|l| !l.is_empty())
            .collect()
    }

    #[test]
    fn ratio_text_reports_missing_ratio() {
        assert_eq!(ratio_text(compare_means(0.0, 1.0)), "n/a");
        assert_eq!(ratio_text(compare_means(2.0, 1.0)), "0.50x faster");
        assert_eq!(ratio_text(compare_means(1.0, 3.0)), "3.00x slower");
    }

    #[test]
    fn single_line_carries_store_and_rows() {
        let timing = SingleTiming {
            store: "raw",
            label: "Fetch all users".to_string(),
            ms: 12.5,
            rows: 100,
        };
        assert_eq!(render_single(&timing), "[raw] Fetch all users: 12.50 ms (100 rows)");
    }

    #[test]
    fn basic_comparison_pairs_queries_by_label() {
        let timing = |store, label: &str, ms| SingleTiming {
            store,
            label: label.to_string(),
            ms,
            rows: 1,
        };
        let text = render_basic_comparison(&[
            timing("model", "by id", 3.0),
            timing("model", "all", 1.0),
            timing("raw", "all", 2.0),
            timing("raw", "by id", 1.0),
        ]);

        assert!(text.contains("by id: 3.00x slower"), "{text}");
        assert!(text.contains("all: 0.50x faster"), "{text}");
    }

    #[test]
    fn size_report_relates_to_smallest_and_pairs_stores() {
        let model = SizeSeries {
            store: "model",
            rows: vec![(10, summary(&[2.0])), (100, summary(&[4.0])), (1000, summary(&[8.0]))],
        };
        let raw = SizeSeries {
            store: "raw",
            rows: vec![(10, summary(&[1.0])), (100, summary(&[1.0])), (1000, summary(&[16.0]))],
        };
        let text = render_size_report(&[model, raw]);

        let relative = lines_after(&text, "Relative to 10:");
        assert_eq!(relative.len(), 2);
        assert!(relative[0].starts_with("100") && relative[0].contains("2.000"));
        assert!(relative[1].starts_with("1000") && relative[1].contains("4.000"));
        assert!(text.contains("1000 rows vs 10 rows: 4.00x slower"), "{text}");

        let per_size = lines_after(&text, "Model vs raw per size:");
        assert_eq!(per_size.len(), 3);
        assert!(per_size[0].starts_with("10 ") && per_size[0].ends_with("2.00x slower"));
        assert!(per_size[1].starts_with("100 ") && per_size[1].ends_with("4.00x slower"));
        assert!(per_size[2].starts_with("1000 ") && per_size[2].ends_with("0.50x faster"));
    }

    #[test]
    fn index_report_has_relative_lines_and_speedup_columns() {
        let results = IndexResults {
            sizes: vec![10, 100],
            pk_indexed: vec![summary(&[1.0]), summary(&[1.0])],
            name_indexed: vec![summary(&[1.0]), summary(&[2.0])],
            name_unindexed: vec![summary(&[3.0]), summary(&[12.0])],
        };
        let text = render_index_report(&results);

        // one relative block per table
        assert_eq!(text.matches("Relative to 10:").count(), 3);
        let unindexed = lines_after(&text, "Name lookup, no index");
        assert!(unindexed.iter().any(|l| l.starts_with("Rows")));

        let speedup = lines_after(&text, "Index speedup on name");
        assert!(speedup[0].contains("Without index (ms)") && speedup[0].contains("With index (ms)"));
        let row: Vec<&str> = speedup[2].split_whitespace().collect();
        assert_eq!(row, ["10", "3.000", "1.000", "3.000x"]);
        let row: Vec<&str> = speedup[3].split_whitespace().collect();
        assert_eq!(row, ["100", "12.000", "2.000", "6.000x"]);
    }

    #[test]
    fn relations_report_compares_large_to_small() {
        let text = render_relations_report(&[RelationTiming {
            label: "join and update",
            small: summary(&[2.0]),
            large: summary(&[5.0]),
        }]);

        assert!(text.contains("join and update"));
        assert!(text.contains("Relative to small:"));
        assert!(text.contains("large vs small: 2.50x slower"), "{text}");
    }
}
