//! Presentation layer. Prints the summary block and renders the simulated
//! paths and the terminal-score histogram as SVG files. The core has no
//! dependency on any of this; everything here consumes finished batches.

use crate::errors::{SimError, SimResult};
use crate::models::SimulationBatch;
use crate::stats::SummaryStatistics;
use std::path::{Path, PathBuf};

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 360.0;
const PADDING: f64 = 40.0;

/// Plotting every trajectory of a large batch produces unreadable ink; cap
/// the fan at this many paths.
const MAX_PLOTTED_PATHS: usize = 100;

const HISTOGRAM_BINS: usize = 50;

/// Print the terminal-value summary for one session.
pub fn print_summary(pair_label: &str, model: &str, stats: &SummaryStatistics) {
    println!();
    println!("Simulation results for {pair_label} ({model})");
    println!("  Mean:               {:.2}", stats.mean);
    println!("  Median:             {:.2}", stats.median);
    println!("  Min:                {:.2}", stats.min);
    println!("  Max:                {:.2}", stats.max);
    println!("  Standard deviation: {:.2}", stats.std_dev);
    println!(
        "  95% confidence interval: {:.2}, {:.2}",
        stats.ci_low, stats.ci_high
    );
    println!();
}

/// Render a fan of simulated paths as SVG polylines, with a horizontal
/// reference line at the spot price.
pub fn render_path_chart(batch: &SimulationBatch) -> String {
    let plotted = &batch.paths[..batch.paths.len().min(MAX_PLOTTED_PATHS)];

    let mut min_price = batch.spot;
    let mut max_price = batch.spot;
    for path in plotted {
        for &p in path {
            min_price = min_price.min(p);
            max_price = max_price.max(p);
        }
    }

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let range = max_price - min_price;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if batch.days > 1 {
        plot_width / (batch.days - 1) as f64
    } else {
        0.0
    };
    let y_of = |price: f64| HEIGHT - PADDING - (price - min_price) * scale_y;

    let mut svg = svg_open(&format!(
        "Simulated price paths ({}, {} trials)",
        batch.model,
        batch.paths.len()
    ));
    push_axes(&mut svg);

    for path in plotted {
        let points: Vec<String> = path
            .iter()
            .enumerate()
            .map(|(i, &price)| format!("{:.1},{:.1}", PADDING + i as f64 * scale_x, y_of(price)))
            .collect();
        svg.push_str(&format!(
            "  <polyline fill=\"none\" stroke=\"#4682b4\" stroke-opacity=\"0.35\" points=\"{}\"/>\n",
            points.join(" ")
        ));
    }

    // Spot reference line, the equivalent of the red axhline in a plotted fan.
    let spot_y = y_of(batch.spot);
    svg.push_str(&format!(
        "  <line x1=\"{:.1}\" y1=\"{spot_y:.1}\" x2=\"{:.1}\" y2=\"{spot_y:.1}\" stroke=\"#d62728\" stroke-width=\"1.5\"/>\n",
        PADDING,
        WIDTH - PADDING
    ));

    svg.push_str("</svg>\n");
    svg
}

/// Render the terminal-score distribution as an SVG bar histogram.
pub fn render_histogram(scores: &[f64]) -> String {
    let mut svg = svg_open("Frequencies of expected price occurrences");
    push_axes(&mut svg);
    if scores.is_empty() {
        svg.push_str("</svg>\n");
        return svg;
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let mut counts = [0usize; HISTOGRAM_BINS];
    for &s in scores {
        let bin = if range > 0.0 {
            (((s - min) / range) * HISTOGRAM_BINS as f64) as usize
        } else {
            0
        };
        counts[bin.min(HISTOGRAM_BINS - 1)] += 1;
    }
    let peak = counts.iter().copied().max().unwrap_or(1).max(1) as f64;

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let bar_width = plot_width / HISTOGRAM_BINS as f64;

    for (i, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let bar_height = plot_height * count as f64 / peak;
        svg.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"#2ca02c\" fill-opacity=\"0.6\"/>\n",
            PADDING + i as f64 * bar_width,
            HEIGHT - PADDING - bar_height,
            bar_width,
            bar_height
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Write both charts for a finished session. Returns the file paths.
pub fn write_reports(
    dir: &Path,
    pair_label: &str,
    batch: &SimulationBatch,
) -> SimResult<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)
        .map_err(|e| SimError::Report(format!("creating {}: {e}", dir.display())))?;

    let paths_file = dir.join(format!("{pair_label}-paths.svg"));
    let hist_file = dir.join(format!("{pair_label}-histogram.svg"));

    std::fs::write(&paths_file, render_path_chart(batch))
        .map_err(|e| SimError::Report(format!("writing {}: {e}", paths_file.display())))?;
    std::fs::write(&hist_file, render_histogram(&batch.scores))
        .map_err(|e| SimError::Report(format!("writing {}: {e}", hist_file.display())))?;

    Ok((paths_file, hist_file))
}

fn svg_open(title: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH:.0}\" height=\"{HEIGHT:.0}\" \
         viewBox=\"0 0 {WIDTH:.0} {HEIGHT:.0}\">\n  <title>{title}</title>\n  \
         <rect width=\"{WIDTH:.0}\" height=\"{HEIGHT:.0}\" fill=\"white\"/>\n"
    )
}

fn push_axes(svg: &mut String) {
    svg.push_str(&format!(
        "  <line x1=\"{p:.1}\" y1=\"{p:.1}\" x2=\"{p:.1}\" y2=\"{b:.1}\" stroke=\"#333\"/>\n  \
         <line x1=\"{p:.1}\" y1=\"{b:.1}\" x2=\"{r:.1}\" y2=\"{b:.1}\" stroke=\"#333\"/>\n",
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batch(num_paths: usize, days: usize) -> SimulationBatch {
        let paths: Vec<Vec<f64>> = (0..num_paths)
            .map(|i| (0..days).map(|d| 100.0 + i as f64 + d as f64).collect())
            .collect();
        let scores = paths.iter().map(|p| *p.last().unwrap()).collect();
        SimulationBatch {
            model: "log-normal",
            spot: 100.0,
            days,
            paths,
            scores,
        }
    }

    #[test]
    fn test_path_chart_structure() {
        let batch = sample_batch(5, 10);
        let svg = render_path_chart(&batch);

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert_eq!(svg.matches("<polyline").count(), 5);
        // Spot reference line plus the two axes
        assert_eq!(svg.matches("<line").count(), 3);
    }

    #[test]
    fn test_path_chart_caps_plotted_paths() {
        let batch = sample_batch(250, 5);
        let svg = render_path_chart(&batch);
        assert_eq!(svg.matches("<polyline").count(), MAX_PLOTTED_PATHS);
    }

    #[test]
    fn test_histogram_bars() {
        let scores: Vec<f64> = (0..500).map(|i| 100.0 + (i % 37) as f64).collect();
        let svg = render_histogram(&scores);

        assert!(svg.starts_with("<svg"));
        let bars = svg.matches("<rect").count();
        // Background rect plus at least one bar, never more than the bin cap
        assert!(bars > 1 && bars <= HISTOGRAM_BINS + 1, "bars = {bars}");
    }

    #[test]
    fn test_histogram_constant_scores() {
        let svg = render_histogram(&[42.0; 10]);
        // Everything lands in a single bin
        assert_eq!(svg.matches("<rect").count(), 2);
    }

    #[test]
    fn test_histogram_empty_scores() {
        let svg = render_histogram(&[]);
        assert!(svg.ends_with("</svg>\n"));
        assert_eq!(svg.matches("<rect").count(), 1);
    }
}
