use super::query::{full_query, narrow, SearchResultSet};
use crate::indexing::aggregator::Aggregator;
use tracing::debug;

/// Split user input into search terms
pub fn split_terms(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// Keystroke-driven search state.
///
/// Narrows the previous result when the new terms extend the previous ones
/// and no source changed in between; otherwise runs a full query.
#[derive(Debug, Default)]
pub struct SearchSession {
    current: Option<SearchResultSet>,
    generation: u64,
    empty: SearchResultSet,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the query for `input`. Blank input clears the session and yields an
    /// empty result.
    pub fn update(&mut self, aggregator: &Aggregator, input: &str) -> &SearchResultSet {
        let terms = split_terms(input);
        if terms.is_empty() {
            self.reset();
            return &self.empty;
        }
        let generation = aggregator.generation();

        let result = match self.current.as_ref() {
            Some(previous)
                if generation == self.generation
                    && !previous.terms().is_empty()
                    && terms.len() > previous.terms().len()
                    && terms.starts_with(previous.terms()) =>
            {
                debug!("Narrowing {} results", previous.len());
                narrow(previous, &terms[previous.terms().len()..])
            }
            _ => full_query(aggregator, &terms),
        };

        self.generation = generation;
        self.current.insert(result)
    }

    /// Result of the last update, if any
    pub fn results(&self) -> Option<&SearchResultSet> {
        self.current.as_ref()
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}
