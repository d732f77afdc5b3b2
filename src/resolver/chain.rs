//! Ordered candidate chain for one resolution call.
//!
//! [`CandidateChain`] walks the configured model list front to back. Every
//! failure advances to the next candidate; there are no per-candidate
//! retries and no reordering by latency or past success.
//!
//! # Example
//!
//! ```rust
//! use tutor::config::ModelCandidate;
//! use tutor::llm::LlmError;
//! use tutor::resolver::chain::CandidateChain;
//!
//! let models = vec![ModelCandidate::text("primary"), ModelCandidate::text("backup")];
//! let mut chain = CandidateChain::new(&models);
//!
//! assert_eq!(chain.next_candidate().map(|c| c.name.as_str()), Some("primary"));
//! chain.report_failure(LlmError::QuotaError("429".into()));
//!
//! assert_eq!(chain.next_candidate().map(|c| c.name.as_str()), Some("backup"));
//! chain.report_failure(LlmError::RequestError("offline".into()));
//!
//! assert!(chain.next_candidate().is_none());
//! assert_eq!(chain.failures().len(), 2);
//! ```

use tracing::warn;

use crate::config::ModelCandidate;
use crate::llm::LlmError;

#[derive(Debug)]
pub struct CandidateChain<'a> {
    candidates: &'a [ModelCandidate],
    current_index: usize,
    failures: Vec<(String, LlmError)>,
}

impl<'a> CandidateChain<'a> {
    /// Create a chain over `candidates`; the first entry is tried first.
    pub fn new(candidates: &'a [ModelCandidate]) -> Self {
        Self {
            candidates,
            current_index: 0,
            failures: Vec::new(),
        }
    }

    /// The candidate to try now, or `None` once every candidate has failed.
    pub fn next_candidate(&self) -> Option<&'a ModelCandidate> {
        self.candidates.get(self.current_index)
    }

    /// Record a failure for the current candidate and advance past it.
    pub fn report_failure(&mut self, error: LlmError) {
        let Some(candidate) = self.candidates.get(self.current_index) else {
            return;
        };
        warn!(
            model = candidate.name.as_str(),
            code = error.code(),
            retryable = error.is_retryable(),
            error = error.message(),
            "candidate failed"
        );
        self.failures.push((candidate.name.clone(), error));
        self.current_index += 1;
    }

    /// Failures recorded so far, in attempt order.
    pub fn failures(&self) -> &[(String, LlmError)] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(names: &[&str]) -> Vec<ModelCandidate> {
        names.iter().map(|n| ModelCandidate::text(*n)).collect()
    }

    #[test]
    fn empty_chain_has_no_candidate() {
        let list = models(&[]);
        let chain = CandidateChain::new(&list);
        assert!(chain.next_candidate().is_none());
        assert!(chain.failures().is_empty());
    }

    #[test]
    fn candidates_tried_in_declared_order() {
        let list = models(&["first", "second", "third"]);
        let mut chain = CandidateChain::new(&list);
        let mut seen = Vec::new();
        while let Some(candidate) = chain.next_candidate() {
            seen.push(candidate.name.clone());
            chain.report_failure(LlmError::ProviderError("boom".into()));
        }
        assert_eq!(seen, vec!["first", "second", "third"]);
    }

    #[test]
    fn non_retryable_failure_still_advances() {
        let list = models(&["a", "b"]);
        let mut chain = CandidateChain::new(&list);
        chain.report_failure(LlmError::AuthError("bad key".into()));
        assert_eq!(chain.next_candidate().map(|c| c.name.as_str()), Some("b"));
    }

    #[test]
    fn failures_are_recorded_with_model_names() {
        let list = models(&["a"]);
        let mut chain = CandidateChain::new(&list);
        chain.report_failure(LlmError::TimeoutError("30s".into()));
        chain.report_failure(LlmError::TimeoutError("ignored".into()));
        assert_eq!(chain.failures().len(), 1);
        assert_eq!(chain.failures()[0].0, "a");
    }
}
