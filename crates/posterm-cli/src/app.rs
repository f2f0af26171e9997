//! Terminal state and event handling.
//!
//! [`TerminalApp`] owns the order session, the sync tracker and the payment
//! timers. It never touches the network or stdout; every handler returns
//! [`Effect`]s for the runner to carry out.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use posterm_core::{
    Catalog, DemoDataset, OrderError, OrderSession, PaymentState, StoreSettings, SyncCompletion,
    SyncTracker, TransactionRecord,
};
use posterm_sync::{SyncError, SyncPayload};
use rust_decimal::Decimal;

use crate::events::{TerminalEvent, HELP};

/// Where the catalog on screen came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CatalogSource {
    Demo(DemoDataset),
    File(PathBuf),
    Backend,
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Demo(dataset) => write!(f, "demo:{dataset}"),
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Backend => write!(f, "backend"),
        }
    }
}

/// Work the runner performs on behalf of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Effect {
    StartSync(u64),
    PostTransaction(TransactionRecord),
    Render,
    Print(String),
    Quit,
}

/// Fixed per-run settings.
#[derive(Debug, Clone)]
pub(crate) struct TerminalSettings {
    pub business_name: String,
    pub currency: String,
    pub tax_rate: Decimal,
    pub sync_interval: Duration,
    /// Zero disables auto-approval; payments then wait for `confirm`.
    pub payment_simulation: Duration,
    pub approval_dwell: Duration,
    /// `false` when no backend is configured or `--offline` was given.
    pub online: bool,
}

pub(crate) struct TerminalApp {
    session: OrderSession,
    tracker: SyncTracker,
    settings: TerminalSettings,
    source: CatalogSource,
    store: StoreSettings,
    last_sync_error: Option<String>,
    payment_deadline: Option<Instant>,
    dwell_deadline: Option<Instant>,
}

impl TerminalApp {
    pub(crate) fn new(catalog: Catalog, source: CatalogSource, settings: TerminalSettings) -> Self {
        Self {
            session: OrderSession::new(Arc::new(catalog), settings.tax_rate),
            tracker: SyncTracker::new(settings.sync_interval),
            settings,
            source,
            store: StoreSettings::default(),
            last_sync_error: None,
            payment_deadline: None,
            dwell_deadline: None,
        }
    }

    pub(crate) fn handle(&mut self, event: TerminalEvent, now: Instant) -> Vec<Effect> {
        match event {
            TerminalEvent::Tap(target) => {
                let Some(product_id) = self.resolve_product(&target) else {
                    return vec![Effect::Print(format!("no product `{target}`"))];
                };
                if self.session.add_to_cart(&product_id) {
                    vec![Effect::Render]
                } else {
                    Vec::new()
                }
            }
            // A product id already in the cart wins over a cart position.
            TerminalEvent::Remove(target) => {
                let product_id = if self.session.cart().quantity_of(&target) > 0 {
                    target
                } else {
                    self.resolve_cart_line(&target).unwrap_or(target)
                };
                if self.session.remove_one_from_cart(&product_id) {
                    vec![Effect::Render]
                } else {
                    Vec::new()
                }
            }
            TerminalEvent::SelectCategory(category) => {
                self.session.select_category(category.as_deref());
                vec![Effect::Render]
            }
            TerminalEvent::Pay => self.pay(now),
            TerminalEvent::Confirm => self.confirm(now),
            TerminalEvent::Cancel => self.cancel(),
            TerminalEvent::Sync => {
                if !self.settings.online {
                    return vec![Effect::Print(format!("offline; showing {}", self.source))];
                }
                vec![Effect::StartSync(self.tracker.force(now))]
            }
            TerminalEvent::Show => vec![Effect::Render],
            TerminalEvent::Help => vec![Effect::Print(HELP.to_string())],
            TerminalEvent::Quit => vec![Effect::Quit],
        }
    }

    /// Periodic tick: starts a background sync when one is due.
    pub(crate) fn on_tick(&mut self, now: Instant) -> Vec<Effect> {
        if !self.settings.online {
            return Vec::new();
        }
        self.tracker
            .begin(now)
            .map(Effect::StartSync)
            .into_iter()
            .collect()
    }

    /// Applies a finished sync unless a newer one superseded it. On failure
    /// the catalog already on screen stays.
    pub(crate) fn apply_sync(
        &mut self,
        generation: u64,
        result: Result<SyncPayload, SyncError>,
        now: Instant,
    ) -> Vec<Effect> {
        if self.tracker.complete(generation, now) == SyncCompletion::Discard {
            return Vec::new();
        }
        match result {
            Ok(payload) => {
                let (catalog, store) = payload.into_parts();
                tracing::info!(
                    generation,
                    products = catalog.products().len(),
                    categories = catalog.categories().len(),
                    "catalog synced"
                );
                self.session.replace_catalog(Arc::new(catalog));
                self.store = store;
                self.source = CatalogSource::Backend;
                self.last_sync_error = None;
                vec![Effect::Render]
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, source = %self.source, "sync failed; keeping current catalog");
                self.last_sync_error = Some(e.to_string());
                Vec::new()
            }
        }
    }

    /// The earliest pending payment timer, if any.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        match (self.payment_deadline, self.dwell_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fires whichever payment timers have expired by `now`.
    pub(crate) fn on_deadline(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.payment_deadline.is_some_and(|at| at <= now) {
            tracing::debug!("simulated card reader approved payment");
            effects.extend(self.confirm(now));
        }
        if self.dwell_deadline.is_some_and(|at| at <= now) {
            self.dwell_deadline = None;
            effects.extend(self.finish());
        }
        effects
    }

    fn pay(&mut self, now: Instant) -> Vec<Effect> {
        match self.session.checkout() {
            Ok(_) => {
                if !self.settings.payment_simulation.is_zero() {
                    self.payment_deadline = Some(now + self.settings.payment_simulation);
                }
                vec![Effect::Render]
            }
            Err(e) => {
                log_ignored(&e);
                Vec::new()
            }
        }
    }

    fn confirm(&mut self, now: Instant) -> Vec<Effect> {
        self.payment_deadline = None;
        match self.session.confirm_payment() {
            Ok(_) => {
                self.dwell_deadline = Some(now + self.settings.approval_dwell);
                vec![Effect::Render]
            }
            Err(e) => {
                log_ignored(&e);
                Vec::new()
            }
        }
    }

    fn cancel(&mut self) -> Vec<Effect> {
        if let Err(e) = self.session.cancel_payment() {
            log_ignored(&e);
            return Vec::new();
        }
        self.payment_deadline = None;
        self.finish()
    }

    fn finish(&mut self) -> Vec<Effect> {
        match self.session.finish_payment() {
            Ok(Some(record)) => vec![Effect::PostTransaction(record), Effect::Render],
            Ok(None) => vec![Effect::Render],
            Err(e) => {
                log_ignored(&e);
                Vec::new()
            }
        }
    }

    /// Finishes an approved sale that is still on screen.
    ///
    /// Called on shutdown so a sale the card reader approved is reported
    /// and the cart cleared even when the dwell timer never fired.
    pub(crate) fn settle(&mut self) -> Vec<Effect> {
        if !matches!(self.payment_state(), PaymentState::Approved { .. }) {
            return Vec::new();
        }
        self.dwell_deadline = None;
        tracing::info!("settling approved payment before exit");
        self.finish()
    }

    /// Accepts a product id, or a 1-based position on the visible grid.
    fn resolve_product(&self, target: &str) -> Option<String> {
        if self.session.catalog().product(target).is_some() {
            return Some(target.to_string());
        }
        let index = target.parse::<usize>().ok()?.checked_sub(1)?;
        self.session
            .visible_products()
            .get(index)
            .map(|p| p.id.clone())
    }

    /// Accepts a 1-based position in the cart list.
    fn resolve_cart_line(&self, target: &str) -> Option<String> {
        let index = target.parse::<usize>().ok()?.checked_sub(1)?;
        self.session
            .cart()
            .lines()
            .get(index)
            .map(|line| line.product_id.clone())
    }

    pub(crate) fn session(&self) -> &OrderSession {
        &self.session
    }

    pub(crate) fn payment_state(&self) -> PaymentState {
        self.session.payment_state()
    }

    pub(crate) fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub(crate) fn last_sync_error(&self) -> Option<&str> {
        self.last_sync_error.as_deref()
    }

    /// Synced store name, else the configured one.
    pub(crate) fn business_name(&self) -> &str {
        self.store
            .business_name
            .as_deref()
            .unwrap_or(&self.settings.business_name)
    }

    /// Synced currency symbol, else the configured one.
    pub(crate) fn currency(&self) -> &str {
        self.store
            .currency
            .as_deref()
            .unwrap_or(&self.settings.currency)
    }

    pub(crate) fn is_online(&self) -> bool {
        self.settings.online
    }

    pub(crate) fn sync_in_flight(&self) -> bool {
        self.tracker.in_flight()
    }
}

fn log_ignored(err: &OrderError) {
    tracing::debug!(error = %err, "input ignored");
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
