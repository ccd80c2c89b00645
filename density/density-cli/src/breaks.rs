//! The `breaks` command.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use density::classify::{classify, ClassifyParams, DegeneratePolicy};
use density::ClassifierKind;

/// Arguments for `density breaks`.
#[derive(Debug, Args)]
pub struct BreaksArgs {
    /// JSON file holding an array of numbers
    #[arg(name = "VALUES")]
    pub values: PathBuf,

    /// Number of classes
    #[arg(long, default_value_t = 5)]
    pub classes: usize,

    /// Classifier: equal-interval, quantile or natural-breaks
    #[arg(long, default_value_t = ClassifierKind::NaturalBreaks)]
    pub classifier: ClassifierKind,

    /// Fail instead of collapsing when there are too few distinct values
    #[arg(long)]
    pub strict: bool,
}

/// Execute `density breaks`.
pub fn run(args: &BreaksArgs) -> Result<()> {
    let text = fs::read_to_string(&args.values)
        .with_context(|| format!("Failed to read {}", args.values.display()))?;
    let values: Vec<f64> =
        serde_json::from_str(&text).with_context(|| format!("Expected a JSON array of numbers in {}", args.values.display()))?;
    print!("{}", render(&values, args)?);
    Ok(())
}

/// Classify and format one line per class.
fn render(values: &[f64], args: &BreaksArgs) -> Result<String> {
    let policy = if args.strict {
        DegeneratePolicy::Strict
    } else {
        DegeneratePolicy::Collapse
    };
    let params = ClassifyParams::new(args.classifier, args.classes).with_degenerate_policy(policy);
    let classification = classify(values, &params).context("Classification failed")?;

    let breaks = &classification.breaks;
    let counts = breaks.bin_counts(values);
    let mut out = String::new();
    for (bin, pair) in breaks.boundaries().windows(2).enumerate() {
        out.push_str(&format!("{bin}\t{}\t{}\t{}\n", pair[0], pair[1], counts[bin]));
    }
    out.push_str(&format!(
        "# {} classes, {}, GVF {:.4}\n",
        classification.class_count(),
        classification.kind,
        classification.goodness_of_variance_fit
    ));
    for warning in &classification.warnings {
        out.push_str(&format!("# warning: {warning}\n"));
    }
    Ok(out)
}
