use std::time::Duration;

use seekcore_bridge::BridgeError;
use seekcore_entry::FileEntry;

pub const DEFAULT_MIN_QUERY_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub sequence: u64,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEffect {
    Search(SearchRequest),
    ScheduleSearch { ticket: u64, delay: Duration },
    OpenFile(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    Accepted { count: usize },
    Stale,
    Failed(BridgeError),
}

/// A reply only replaces the results when its sequence is not older than
/// the last accepted one.
#[derive(Debug, Clone)]
pub struct QueryCoordinator {
    query: String,
    results: Vec<FileEntry>,
    min_query_len: usize,
    debounce: Option<Duration>,
    issued: u64,
    accepted: Option<u64>,
    edit_counter: u64,
    pending_ticket: Option<u64>,
}

impl Default for QueryCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_QUERY_LEN, None)
    }
}

impl QueryCoordinator {
    pub fn new(min_query_len: usize, debounce: Option<Duration>) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            min_query_len,
            debounce,
            issued: 0,
            accepted: None,
            edit_counter: 0,
            pending_ticket: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[FileEntry] {
        &self.results
    }

    pub fn last_accepted(&self) -> Option<u64> {
        self.accepted
    }

    pub fn last_issued(&self) -> Option<u64> {
        (self.issued > 0).then_some(self.issued)
    }

    pub fn has_pending_search(&self) -> bool {
        self.pending_ticket.is_some()
    }

    pub fn on_query_changed(&mut self, text: impl Into<String>) -> Option<QueryEffect> {
        self.query = text.into();
        self.edit_counter = self.edit_counter.wrapping_add(1);

        if self.query.chars().count() < self.min_query_len {
            self.pending_ticket = None;
            return None;
        }

        match self.debounce {
            Some(delay) => {
                self.pending_ticket = Some(self.edit_counter);
                Some(QueryEffect::ScheduleSearch {
                    ticket: self.edit_counter,
                    delay,
                })
            }
            None => Some(QueryEffect::Search(self.issue())),
        }
    }

    // Ignores the length gate and any pending delay.
    pub fn on_commit(&mut self) -> QueryEffect {
        self.pending_ticket = None;
        QueryEffect::Search(self.issue())
    }

    pub fn on_debounce_elapsed(&mut self, ticket: u64) -> Option<QueryEffect> {
        if self.pending_ticket != Some(ticket) {
            tracing::trace!(ticket, "debounce superseded by a later edit");
            return None;
        }

        self.pending_ticket = None;
        Some(QueryEffect::Search(self.issue()))
    }

    pub fn on_search_response(
        &mut self,
        sequence: u64,
        response: Result<Vec<FileEntry>, BridgeError>,
    ) -> ResponseOutcome {
        if sequence == 0 || sequence > self.issued {
            tracing::debug!(sequence, "reply for a search that was never issued");
            return ResponseOutcome::Stale;
        }

        if self.accepted.is_some_and(|accepted| sequence < accepted) {
            tracing::debug!(
                sequence,
                accepted = self.accepted,
                "discarding stale search reply"
            );
            return ResponseOutcome::Stale;
        }

        match response {
            Ok(entries) => {
                let count = entries.len();
                self.results = entries;
                self.accepted = Some(sequence);
                tracing::debug!(sequence, count, "search results replaced");
                ResponseOutcome::Accepted { count }
            }
            Err(error) => {
                tracing::warn!(sequence, %error, "search failed; keeping previous results");
                ResponseOutcome::Failed(error)
            }
        }
    }

    pub fn on_open_file(&self, path: &str) -> QueryEffect {
        if path.is_empty() {
            tracing::debug!("forwarding open for an empty path");
        }
        QueryEffect::OpenFile(path.to_string())
    }

    fn issue(&mut self) -> SearchRequest {
        self.issued += 1;
        SearchRequest {
            sequence: self.issued,
            query: self.query.clone(),
        }
    }
}
