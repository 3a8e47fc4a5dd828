//! Text chart summaries of a data set.

use drug_nme_report::Keyed;
use drug_nme_report::chart::{donut_legend, stacked_bar_chart, year_bar_chart};
use drug_nme_report::group::{CategoryCount, count_by_column, count_by_year, pivot, shares};

/// Renders counts per year and, when `by` is given, the breakdown by that
/// field as a stacked bar chart and a donut legend.
///
/// Returns the rendered charts and the counts behind the breakdown.
pub fn render<R: Keyed>(
    title: &str,
    rows: &[R],
    by: Option<&str>,
    width: usize,
) -> (String, Vec<CategoryCount>) {
    let mut text = year_bar_chart(&format!("{title} per year"), &count_by_year(rows), width);

    let Some(key) = by else {
        return (text, Vec::new());
    };

    let grid = pivot(rows, key);
    let counts = count_by_column(rows, key);
    text.push('\n');
    text.push_str(&stacked_bar_chart(&format!("{title} per year by {key}"), &grid, width));
    text.push('\n');
    text.push_str(&donut_legend(&format!("{title} by {key}"), &shares(&counts), width));
    (text, counts)
}

#[cfg(test)]
mod tests {
    use drug_nme_approval_models::SubmissionRecord;

    use super::*;

    fn submission(date: &str, priority: &str) -> SubmissionRecord {
        SubmissionRecord {
            application_number: "NDA000001".to_owned(),
            submission_status_date: Some(date.to_owned()),
            review_priority: Some(priority.to_owned()),
            ..SubmissionRecord::default()
        }
    }

    #[test]
    fn breaks_down_by_requested_field() {
        let rows = [
            submission("20200101", "PRIORITY"),
            submission("20200601", "STANDARD"),
            submission("20210101", "PRIORITY"),
        ];
        let (text, counts) = render("NMEs", &rows, Some("review_priority"), 10);

        assert!(text.starts_with("NMEs per year\n"));
        assert!(text.contains("NMEs per year by review_priority"));
        assert!(text.contains("PRIORITY"));
        assert_eq!(counts[0].category, "PRIORITY");
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn years_only_without_breakdown() {
        let rows = [submission("20200101", "PRIORITY")];
        let (text, counts) = render("NMEs", &rows, None, 10);
        assert!(text.contains("2020 | ########## 1"));
        assert!(counts.is_empty());
    }
}
