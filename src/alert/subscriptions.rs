//! In-memory alert subscription registry.
//!
//! Keyed by phone number. Safe to share across threads; concurrent writes
//! to the same key resolve last-writer-wins. Nothing survives a restart.

use crate::logging::{self, DataSource};
use crate::model::AlertSubscription;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct SubscriptionStore {
    subscriptions: RwLock<HashMap<String, AlertSubscription>>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the subscription for its phone number.
    /// Returns the subscription it replaced, if any.
    pub fn subscribe(&self, subscription: AlertSubscription) -> Option<AlertSubscription> {
        logging::info(
            DataSource::Alerts,
            Some(&subscription.phone_number),
            &format!(
                "Subscribed for {} (threshold {})",
                subscription.address, subscription.threshold_grade
            ),
        );
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subscription.phone_number.clone(), subscription)
    }

    /// Removes a subscription. Returns `false` if none existed.
    pub fn unsubscribe(&self, phone_number: &str) -> bool {
        let removed = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(phone_number)
            .is_some();
        if removed {
            logging::info(DataSource::Alerts, Some(phone_number), "Unsubscribed");
        }
        removed
    }

    pub fn get(&self, phone_number: &str) -> Option<AlertSubscription> {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(phone_number)
            .cloned()
    }

    /// All subscriptions, ordered by phone number.
    pub fn list(&self) -> Vec<AlertSubscription> {
        let mut subs: Vec<_> = self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        subs.sort_by(|a, b| a.phone_number.cmp(&b.phone_number));
        subs
    }

    pub fn len(&self) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Seed file
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SubscriptionFile {
    #[serde(default, rename = "subscription")]
    subscriptions: Vec<AlertSubscription>,
}

/// Parses a TOML list of `[[subscription]]` tables.
pub fn parse_subscriptions_toml(content: &str) -> Result<Vec<AlertSubscription>, String> {
    toml::from_str::<SubscriptionFile>(content)
        .map(|file| file.subscriptions)
        .map_err(|e| format!("Invalid subscription file: {}", e))
}

/// Renders subscriptions as `[[subscription]]` tables.
pub fn format_subscriptions_toml(subscriptions: &[AlertSubscription]) -> Result<String, String> {
    let file = SubscriptionFile {
        subscriptions: subscriptions.to_vec(),
    };
    toml::to_string(&file).map_err(|e| format!("Failed to encode subscriptions: {}", e))
}

/// Renders one subscription as a `[[subscription]]` table, ready to append
/// to a seed file.
pub fn format_subscription_toml(subscription: &AlertSubscription) -> Result<String, String> {
    format_subscriptions_toml(std::slice::from_ref(subscription))
}

/// Loads a seed list of subscriptions into `store`. Returns how many were
/// read; duplicates by phone number collapse to the last entry.
pub fn load_subscriptions_toml(store: &SubscriptionStore, path: &Path) -> Result<usize, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let subs = parse_subscriptions_toml(&content)?;
    let count = subs.len();
    for sub in subs {
        store.subscribe(sub);
    }
    Ok(count)
}

/// Overwrites `path` with every subscription in `store`, ordered by phone
/// number. Returns how many were written.
pub fn save_subscriptions_toml(store: &SubscriptionStore, path: &Path) -> Result<usize, String> {
    let subs = store.list();
    let content = format_subscriptions_toml(&subs)?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    Ok(subs.len())
}
