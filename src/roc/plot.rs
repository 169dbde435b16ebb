use anyhow::Context;
use plotters::prelude::*;
use std::path::Path;

use super::summary::MeanRoc;

const PALETTE: [RGBColor; 6] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
];

pub fn legend_label(prefix: &str, summary: &MeanRoc) -> String {
    format!("{}- AUC = {:.3} ± {:.3}", prefix, summary.auc, summary.auc_std)
}

/// Draws one mean ROC curve per method with a ±1 std band and writes the
/// chart as SVG.
pub fn plot_mean_rocs(path: &Path, curves: &[(String, &MeanRoc)]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create plot directory {}", parent.display()))?;
    }

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.margin(10, 10, 10, 10);

    let mut chart = ChartBuilder::on(&root)
        .x_label_area_size(50)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .x_labels(6)
        .y_labels(6)
        .disable_mesh()
        .draw()?;

    for (i, (prefix, summary)) in curves.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];

        // band clipped to the unit square
        let upper = summary
            .fpr
            .iter()
            .zip(summary.mean_tpr.iter().zip(&summary.std_tpr))
            .map(|(&x, (&m, &s))| (x, (m + s).clamp(0.0, 1.0)));
        let lower = summary
            .fpr
            .iter()
            .zip(summary.mean_tpr.iter().zip(&summary.std_tpr))
            .map(|(&x, (&m, &s))| (x, (m - s).clamp(0.0, 1.0)))
            .rev();
        let band: Vec<(f64, f64)> = upper.chain(lower).collect();
        chart.draw_series(std::iter::once(Polygon::new(band, color.mix(0.2))))?;

        chart
            .draw_series(LineSeries::new(
                summary.fpr.iter().copied().zip(summary.mean_tpr.iter().copied()),
                color.stroke_width(2),
            ))?
            .label(legend_label(prefix, summary))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 16))
        .position(SeriesLabelPosition::LowerRight)
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write ROC plot {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod plot_tests {
    use super::*;

    #[test]
    fn test_legend_label_format() {
        let summary = MeanRoc {
            fpr: vec![0.0, 1.0],
            mean_tpr: vec![0.0, 1.0],
            std_tpr: vec![0.0, 0.0],
            auc: 0.81234,
            auc_std: 0.0456,
            fold_aucs: vec![0.81234],
        };
        assert_eq!(
            legend_label("Normalized data ", &summary),
            "Normalized data - AUC = 0.812 ± 0.046"
        );
    }

    #[test]
    fn test_plot_writes_svg() {
        let summary = MeanRoc {
            fpr: vec![0.0, 0.5, 1.0],
            mean_tpr: vec![0.0, 0.8, 1.0],
            std_tpr: vec![0.0, 0.3, 0.0],
            auc: 0.7,
            auc_std: 0.1,
            fold_aucs: vec![0.6, 0.8],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plots/full_signal_0.svg");

        plot_mean_rocs(&path, &[("Normalized data ".to_string(), &summary)]).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
    }
}
