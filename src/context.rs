//! Per-run analysis context.
//!
//! Holds the configuration and the loaded, filtered issue collection for
//! one run. It is built once in `main` and passed by reference to every
//! analyzer; nothing in it changes after construction.

use crate::config::Config;
use crate::data::{IssueFilter, LoadedCorpus, RejectedRecord};
use crate::models::Issue;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct AnalysisContext {
    config: Config,
    source: PathBuf,
    filter: IssueFilter,
    issues: Vec<Issue>,
    rejected: Vec<RejectedRecord>,
    loaded: usize,
}

impl AnalysisContext {
    /// Build the context, applying `filter` to the loaded issues.
    pub fn new(config: Config, source: PathBuf, corpus: LoadedCorpus, filter: IssueFilter) -> Self {
        let loaded = corpus.issues.len();
        let issues = filter.apply(corpus.issues);
        debug!("{} of {} issues pass the filter", issues.len(), loaded);

        Self {
            config,
            source,
            filter,
            issues,
            rejected: corpus.rejected,
            loaded,
        }
    }

    /// The issues every analyzer consumes.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn filter(&self) -> &IssueFilter {
        &self.filter
    }

    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    /// Issues constructed from the input, before filtering.
    pub fn loaded_count(&self) -> usize {
        self.loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_corpus, LoadOptions};
    use crate::models::State;

    #[test]
    fn test_context_applies_filter() {
        let corpus = parse_corpus(
            include_str!("../fixtures/issues.json"),
            &LoadOptions::default(),
        )
        .unwrap();
        let filter = IssueFilter {
            state: Some(State::Closed),
            ..Default::default()
        };

        let ctx = AnalysisContext::new(
            Config::default(),
            PathBuf::from("issues.json"),
            corpus,
            filter,
        );

        assert_eq!(ctx.loaded_count(), 7);
        assert_eq!(ctx.issues().len(), 3);
        assert!(ctx.issues().iter().all(|i| i.state == State::Closed));
        assert_eq!(ctx.rejected().len(), 1);
        assert_eq!(ctx.source(), Path::new("issues.json"));
        assert_eq!(ctx.filter().describe(), vec!["state = closed"]);
    }
}
