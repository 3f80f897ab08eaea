//! Operation whitelist/blacklist and category filters.

use std::collections::BTreeSet;

use pv_protocol::{FilterState, FilterUpdate, TraceEvent};

/// Live admission filters shared by every subscriber.
///
/// All three checks must pass. An empty whitelist or category set admits
/// everything; the blacklist always applies, so an operation that is both
/// whitelisted and blacklisted is never admitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    whitelist: BTreeSet<String>,
    blacklist: BTreeSet<String>,
    categories: BTreeSet<String>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admits(&self, event: &TraceEvent) -> bool {
        if !self.whitelist.is_empty() && !self.whitelist.contains(&event.operation) {
            return false;
        }
        if self.blacklist.contains(&event.operation) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&event.category) {
            return false;
        }
        true
    }

    /// Replace each set present in `update`; leave the others alone.
    pub fn apply(&mut self, update: FilterUpdate) {
        if let Some(categories) = update.categories {
            self.categories = categories.into_iter().collect();
        }
        if let Some(whitelist) = update.whitelist {
            self.whitelist = whitelist.into_iter().collect();
        }
        if let Some(blacklist) = update.blacklist {
            self.blacklist = blacklist.into_iter().collect();
        }
    }

    pub fn state(&self) -> FilterState {
        FilterState {
            categories: self.categories.iter().cloned().collect(),
            whitelist: self.whitelist.iter().cloned().collect(),
            blacklist: self.blacklist.iter().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.whitelist.is_empty() && self.blacklist.is_empty() && self.categories.is_empty()
    }
}
