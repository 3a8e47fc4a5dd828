//! Plain-text charts.
//!
//! Bars are scaled so the largest value spans `width` characters. Every
//! chart ends with a newline.

use std::fmt::Write as _;

use crate::group::{Pivot, Share, YearCount};

/// Fill characters for stacked segments, cycled when there are more
/// categories than glyphs.
const GLYPHS: [char; 8] = ['#', '=', '*', '+', '%', '@', 'o', '~'];

/// Length of a bar for `value` when `max` maps to `width`, rounded to the
/// nearest character. Non-zero values always get at least one character.
fn scaled(value: usize, max: usize, width: usize) -> usize {
    if max == 0 || value == 0 {
        return 0;
    }
    ((value * width + max / 2) / max).max(1)
}

/// Renders labelled horizontal bars.
#[must_use]
pub fn bar_chart(title: &str, bars: &[(String, usize)], width: usize) -> String {
    let mut out = format!("{title}\n");
    let label_width = bars.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let max = bars.iter().map(|(_, value)| *value).max().unwrap_or(0);

    for (label, value) in bars {
        let bar = "#".repeat(scaled(*value, max, width));
        let _ = writeln!(out, "{label:>label_width$} | {bar} {value}");
    }
    out
}

/// Renders one bar per year.
#[must_use]
pub fn year_bar_chart(title: &str, counts: &[YearCount], width: usize) -> String {
    let bars: Vec<(String, usize)> = counts
        .iter()
        .map(|c| (c.year.to_string(), c.count))
        .collect();
    bar_chart(title, &bars, width)
}

/// Renders one stacked bar per year, one glyph per category, followed by
/// a legend.
#[must_use]
pub fn stacked_bar_chart(title: &str, pivot: &Pivot, width: usize) -> String {
    let mut out = format!("{title}\n");
    let max = pivot
        .years
        .iter()
        .map(|&year| pivot.year_total(year))
        .max()
        .unwrap_or(0);

    for (y, year) in pivot.years.iter().enumerate() {
        let mut bar = String::new();
        for (c, &count) in pivot.counts[y].iter().enumerate() {
            let glyph = GLYPHS[c % GLYPHS.len()];
            bar.extend(std::iter::repeat_n(glyph, scaled(count, max, width)));
        }
        let total = pivot.year_total(*year);
        let _ = writeln!(out, "{year} | {bar} {total}");
    }

    out.push('\n');
    for (c, category) in pivot.categories.iter().enumerate() {
        let _ = writeln!(out, "  {} {category}", GLYPHS[c % GLYPHS.len()]);
    }
    out
}

/// Renders a donut chart as its percentage legend.
#[must_use]
pub fn donut_legend(title: &str, shares: &[Share], width: usize) -> String {
    let mut out = format!("{title}\n");
    let label_width = shares.iter().map(|s| s.category.len()).max().unwrap_or(0);
    let total = shares.iter().map(|s| s.count).sum();

    for share in shares {
        // `width` characters is the whole donut.
        let filled = scaled(share.count, total, width);
        let _ = writeln!(
            out,
            "{:<label_width$} {:>5.1}% {:>6} {}",
            share.category,
            share.percent,
            share.count,
            "#".repeat(filled),
        );
    }
    out
}
