//! Analysis modules.
//!
//! Each analyzer is a set of pure aggregation functions over the issue
//! collection plus an `analyze` entry point that packages the results as
//! a [`FeatureReport`].

pub mod content;
pub mod contributors;
pub mod labels;
pub mod sentiment;
pub mod stats;
pub mod timing;

use crate::cli::Feature;
use crate::context::AnalysisContext;
use crate::report::FeatureReport;
use sentiment::PolarityScorer;
use tracing::info;

/// Run one feature (or all of them) over the context.
pub fn run_feature(
    feature: Feature,
    ctx: &AnalysisContext,
    scorer: &dyn PolarityScorer,
    contributor: Option<&str>,
) -> Vec<FeatureReport> {
    let features = match feature {
        Feature::All => Feature::individual(),
        ref single => std::slice::from_ref(single),
    };

    features
        .iter()
        .filter_map(|f| analyze_single(*f, ctx, scorer, contributor))
        .collect()
}

/// Run one of the individual features. `All` is not an individual feature.
fn analyze_single(
    feature: Feature,
    ctx: &AnalysisContext,
    scorer: &dyn PolarityScorer,
    contributor: Option<&str>,
) -> Option<FeatureReport> {
    info!("{}", feature.running_message());
    let report = match feature {
        Feature::Contributors => contributors::analyze(ctx, contributor),
        Feature::Response => timing::analyze(ctx),
        Feature::Content => content::analyze(ctx, scorer),
        Feature::Labels => labels::analyze(ctx),
        Feature::All => return None,
    };
    Some(report)
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::sentiment::LexiconScorer;
    use super::test_support::sample_context;

    #[test]
    fn test_run_single_feature() {
        let ctx = sample_context();
        let reports = run_feature(Feature::Labels, &ctx, &LexiconScorer::default(), None);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].title, labels::TITLE);
    }

    #[test]
    fn test_run_all_features_in_order() {
        let ctx = sample_context();
        let reports = run_feature(Feature::All, &ctx, &LexiconScorer::default(), None);
        let titles: Vec<&str> = reports.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![contributors::TITLE, timing::TITLE, content::TITLE, labels::TITLE]
        );
    }
}
