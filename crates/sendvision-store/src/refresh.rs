// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Refresh bookkeeping for a store: generations, coalescing and closure.
//!
//! This is pure state with no I/O. The store holds it behind a mutex and
//! acts on the [`Issue`]s and [`Completion`]s it hands back.

use sendvision_core::Filter;

/// Why a refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    Open,
    Change,
    Manual,
    RealtimeResumed,
}

/// A query the store must start now.
#[derive(Debug, Clone)]
pub(crate) struct Issue {
    pub generation: u64,
    pub filter: Filter,
}

/// Why a finished query's result was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DiscardReason {
    Closed,
    Stale { current: u64 },
}

/// What to do with a finished query.
#[derive(Debug)]
pub(crate) enum Completion {
    Discard(DiscardReason),
    /// Publish the result. `trailing` is the owed refresh, already issued.
    Apply { trailing: Option<Issue> },
}

#[derive(Debug)]
pub(crate) struct RefreshState {
    filter: Filter,
    /// Generation of the most recently issued query.
    generation: u64,
    /// Whether the query for `generation` is still outstanding.
    in_flight: bool,
    /// Set when a trigger arrived while `in_flight`.
    owed: bool,
    realtime: bool,
    closed: bool,
}

impl RefreshState {
    pub fn new(filter: Filter, realtime: bool) -> Self {
        Self {
            filter,
            generation: 0,
            in_flight: false,
            owed: false,
            realtime,
            closed: false,
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn realtime(&self) -> bool {
        self.realtime
    }

    pub fn refresh_owed(&self) -> bool {
        self.owed
    }

    /// Asks for a refresh. Returns a query to start, or `None` if the
    /// trigger was ignored or folded into the in-flight query.
    pub fn request(&mut self, trigger: Trigger) -> Option<Issue> {
        if self.closed {
            return None;
        }
        if trigger == Trigger::Change && !self.realtime {
            return None;
        }
        if self.in_flight {
            self.owed = true;
            return None;
        }
        Some(self.issue())
    }

    /// Swaps the filter and supersedes whatever is in flight.
    pub fn replace_filter(&mut self, filter: Filter) -> Option<Issue> {
        if self.closed {
            return None;
        }
        self.filter = filter;
        self.owed = false;
        Some(self.issue())
    }

    /// Returns whether a catch-up refresh should be requested.
    pub fn set_realtime(&mut self, enabled: bool) -> bool {
        let resumed = enabled && !self.realtime;
        self.realtime = enabled;
        resumed
    }

    pub fn complete(&mut self, generation: u64) -> Completion {
        if self.closed {
            return Completion::Discard(DiscardReason::Closed);
        }
        if generation != self.generation {
            return Completion::Discard(DiscardReason::Stale {
                current: self.generation,
            });
        }
        self.in_flight = false;
        let trailing = if std::mem::take(&mut self.owed) {
            Some(self.issue())
        } else {
            None
        };
        Completion::Apply { trailing }
    }

    /// Returns `false` if the state was already closed.
    pub fn close(&mut self) -> bool {
        let was_open = !self.closed;
        self.closed = true;
        self.in_flight = false;
        self.owed = false;
        was_open
    }

    fn issue(&mut self) -> Issue {
        self.generation += 1;
        self.in_flight = true;
        Issue {
            generation: self.generation,
            filter: self.filter.clone(),
        }
    }
}
