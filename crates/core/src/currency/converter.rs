//! Currency converter state.
//!
//! Fetching is split in two so the caller decides where the network call
//! runs: [`CurrencyConverter::begin_fetch`] (or any operation that changes the
//! base) hands out a [`FetchTicket`], and [`CurrencyConverter::complete`]
//! applies the result. Only the most recently issued ticket is accepted, so a
//! slow response for an old base can never overwrite a newer table.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};

use super::rates::{RateProvider, RateTable};
use crate::error::RateError;

/// Claim on one in-flight rate fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    base: String,
}

impl FetchTicket {
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Base currency the fetch should be made for.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }
}

#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    rates: Option<RateTable>,
    base: String,
    target: String,
    amount: f64,
    error: Option<String>,
    last_issued: u64,
    in_flight: Option<u64>,
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::new("USD", "EUR")
    }
}

impl CurrencyConverter {
    /// A converter for one unit of `base` into `target`, with no rates yet.
    #[must_use]
    pub fn new(base: &str, target: &str) -> Self {
        Self {
            rates: None,
            base: base.trim().to_uppercase(),
            target: target.trim().to_uppercase(),
            amount: 1.0,
            error: None,
            last_issued: 0,
            in_flight: None,
        }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount
    }

    #[must_use]
    pub fn rates(&self) -> Option<&RateTable> {
        self.rates.as_ref()
    }

    /// Message from the last failed fetch, cleared when a new fetch starts.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.rates.as_ref().and_then(|t| t.last_updated)
    }

    /// Change the base currency. Rates are relative to the base, so this
    /// always starts a new fetch.
    pub fn set_base(&mut self, code: &str) -> FetchTicket {
        self.base = code.trim().to_uppercase();
        self.begin_fetch()
    }

    pub fn set_target(&mut self, code: &str) {
        self.target = code.trim().to_uppercase();
    }

    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount;
    }

    /// Exchange base and target. The amount is left as entered.
    pub fn swap(&mut self) -> FetchTicket {
        std::mem::swap(&mut self.base, &mut self.target);
        self.begin_fetch()
    }

    /// Re-fetch rates for the current base.
    pub fn refresh(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    /// Issue a new ticket, superseding any fetch still in flight.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.last_issued += 1;
        self.in_flight = Some(self.last_issued);
        self.error = None;
        tracing::debug!(seq = self.last_issued, base = %self.base, "rate fetch started");
        FetchTicket {
            seq: self.last_issued,
            base: self.base.clone(),
        }
    }

    /// Apply a fetch result. Returns `false` when the ticket has been
    /// superseded and the result was dropped.
    ///
    /// On failure the previous table stays in place and the error message is
    /// kept for display.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<RateTable, RateError>) -> bool {
        if self.in_flight != Some(ticket.seq) {
            tracing::debug!(seq = ticket.seq, latest = self.last_issued, "discarding stale rate response");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(table) => {
                tracing::debug!(base = %table.base, count = table.len(), "rates updated");
                self.rates = Some(table);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(base = %ticket.base, error = %e, "rate fetch failed");
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Fetch and apply in one blocking call.
    pub fn fetch_with(&mut self, provider: &dyn RateProvider) -> bool {
        let ticket = self.refresh();
        let result = provider.fetch(ticket.base());
        self.complete(ticket, result)
    }

    /// Units of target per unit of base, or `0` when unknown.
    ///
    /// While a fetch for a new base is pending the held table may still be
    /// relative to the old base; the rate is then crossed through it.
    #[must_use]
    pub fn exchange_rate(&self) -> f64 {
        self.rates
            .as_ref()
            .and_then(|t| {
                if t.base == self.base {
                    t.rate(&self.target)
                } else {
                    t.cross_rate(&self.base, &self.target)
                }
            })
            .unwrap_or(0.0)
    }

    /// `amount × exchange_rate`, or `0` when the rate is unknown.
    #[must_use]
    pub fn converted_amount(&self) -> f64 {
        let rate = self.exchange_rate();
        if rate == 0.0 {
            return 0.0;
        }
        self.amount * rate
    }
}

/// Run `ticket`'s fetch on a background thread.
///
/// Join the handle and pass the pair to [`CurrencyConverter::complete`].
pub fn spawn_fetch(
    provider: Arc<dyn RateProvider>,
    ticket: FetchTicket,
) -> JoinHandle<(FetchTicket, Result<RateTable, RateError>)> {
    thread::spawn(move || {
        let result = provider.fetch(ticket.base());
        (ticket, result)
    })
}
