//! Shopping cart state.
//!
//! DESIGN
//! ======
//! Entries are keyed by catalog id; adding an item that is already present bumps
//! its quantity. Quantity never drops below 1 through `update_quantity`; removing an
//! entry is a separate, explicit operation. `count` and `total_cents` are computed
//! from the entries on demand.
//!
//! ERROR HANDLING
//! ==============
//! Every mutation is written to the store. A failed write is logged and the in-memory
//! cart stays authoritative. A stored payload that does not decode into a valid entry
//! list is discarded and the cart starts empty.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::CatalogItem;
use crate::config::CartConfig;
use crate::storage::KeyValueStore;

/// One line in the cart, with a snapshot of the catalog item at the time it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: u32,
    pub name: String,
    pub price_cents: u32,
    pub image: String,
    pub category: String,
    pub quantity: u32,
}

impl CartEntry {
    fn from_item(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price_cents: item.price_cents,
            image: item.image.clone(),
            category: item.category.clone(),
            quantity: 1,
        }
    }

    pub fn subtotal_cents(&self) -> u64 {
        u64::from(self.price_cents) * u64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    expires_at: f64,
}

#[derive(Debug, thiserror::Error)]
enum DecodeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("entry {0} has zero quantity")]
    ZeroQuantity(u32),
    #[error("entry {0} appears twice")]
    Duplicate(u32),
}

fn decode_entries(raw: &str) -> Result<Vec<CartEntry>, DecodeError> {
    let entries: Vec<CartEntry> = serde_json::from_str(raw)?;
    for (i, entry) in entries.iter().enumerate() {
        if entry.quantity == 0 {
            return Err(DecodeError::ZeroQuantity(entry.id));
        }
        if entries[..i].iter().any(|other| other.id == entry.id) {
            return Err(DecodeError::Duplicate(entry.id));
        }
    }
    Ok(entries)
}

pub struct Cart {
    entries: Vec<CartEntry>,
    store: Box<dyn KeyValueStore>,
    settings: CartConfig,
    clock: f64,
    notification: Option<Notification>,
    open_at: Option<f64>,
    is_open: bool,
}

impl Cart {
    /// Load the cart saved under the configured key, or start empty.
    pub fn restore(store: Box<dyn KeyValueStore>, settings: CartConfig) -> Self {
        let entries = match store.load(&settings.storage_key) {
            Ok(Some(raw)) => decode_entries(&raw).unwrap_or_else(|err| {
                warn!(key = %settings.storage_key, error = %err, "discarding corrupt cart payload");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(key = %settings.storage_key, error = %err, "failed to read cart, starting empty");
                Vec::new()
            }
        };
        info!(entries = entries.len(), "cart restored");
        Self {
            entries,
            store,
            settings,
            clock: 0.0,
            notification: None,
            open_at: None,
            is_open: false,
        }
    }

    pub fn add(&mut self, item: &CatalogItem) {
        match self.entries.iter_mut().find(|entry| entry.id == item.id) {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(1),
            None => self.entries.push(CartEntry::from_item(item)),
        }
        debug!(item = item.id, "added to cart");
        self.persist();
        self.notification = Some(Notification {
            message: format!("Added {} to bag!", item.name),
            expires_at: self.clock + self.settings.notification_secs,
        });
        self.open_at = Some(self.clock + self.settings.open_delay_secs);
    }

    /// Drop the entry regardless of quantity.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Shift an entry's quantity by `delta`, clamped at 1. Returns the new quantity.
    pub fn update_quantity(&mut self, id: u32, delta: i64) -> Option<u32> {
        let entry = self.entries.iter_mut().find(|entry| entry.id == id)?;
        let quantity = i64::from(entry.quantity)
            .saturating_add(delta)
            .clamp(1, i64::from(u32::MAX));
        entry.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let quantity = entry.quantity;
        self.persist();
        Some(quantity)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Sum of quantities.
    pub fn count(&self) -> u64 {
        self.entries.iter().map(|entry| u64::from(entry.quantity)).sum()
    }

    pub fn total_cents(&self) -> u64 {
        self.entries.iter().map(CartEntry::subtotal_cents).sum()
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn entry(&self, id: u32) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance the cart's clock: expire the notification and open the cart view when due.
    pub fn tick(&mut self, dt: f64) {
        self.clock += dt;
        if self
            .notification
            .as_ref()
            .is_some_and(|n| self.clock >= n.expires_at)
        {
            self.notification = None;
        }
        if self.open_at.is_some_and(|at| self.clock >= at) {
            self.open_at = None;
            self.is_open = true;
        }
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_ref().map(|n| n.message.as_str())
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
        if !open {
            self.open_at = None;
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }

    fn persist(&mut self) {
        let payload = match serde_json::to_string(&self.entries) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to encode cart");
                return;
            }
        };
        if let Err(err) = self.store.save(&self.settings.storage_key, &payload) {
            warn!(key = %self.settings.storage_key, error = %err, "failed to persist cart");
        }
    }
}

impl std::fmt::Debug for Cart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cart")
            .field("entries", &self.entries)
            .field("notification", &self.notification)
            .field("is_open", &self.is_open)
            .finish()
    }
}
