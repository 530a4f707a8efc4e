//! In-process store of checkout forms in progress.
//!
//! The session cookie only carries a checkout id; the form itself lives
//! here behind a per-form mutex so that overlapping address requests from
//! the same visitor read and write one consistent state.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::form::CheckoutForm;

/// Id of one checkout visit.
pub type CheckoutId = Uuid;

/// Shared handle to a form.
pub type SharedForm = Arc<Mutex<CheckoutForm>>;

/// Forms abandoned for this long are dropped.
const DEFAULT_IDLE: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Clone)]
pub struct CheckoutStore {
    forms: Cache<CheckoutId, SharedForm>,
}

impl CheckoutStore {
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            forms: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Begin a new checkout visit.
    pub async fn start(&self, form: CheckoutForm) -> (CheckoutId, SharedForm) {
        let id = Uuid::new_v4();
        let shared = Arc::new(Mutex::new(form));
        self.forms.insert(id, Arc::clone(&shared)).await;
        (id, shared)
    }

    /// The form for `id`, if it has not expired.
    pub async fn get(&self, id: CheckoutId) -> Option<SharedForm> {
        self.forms.get(&id).await
    }

    /// Forget a finished or abandoned visit.
    pub async fn remove(&self, id: CheckoutId) {
        self.forms.invalidate(&id).await;
    }
}

impl Default for CheckoutStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{Contact, Field};

    #[tokio::test]
    async fn test_start_get_remove() {
        let store = CheckoutStore::default();
        let (id, form) = store.start(CheckoutForm::default()).await;

        form.lock()
            .await
            .edit_text(Field::FullName, "Le C".to_string())
            .ok();

        let fetched = store.get(id).await.map(|f| Arc::ptr_eq(&f, &form));
        assert_eq!(fetched, Some(true));

        store.remove(id).await;
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_visits_are_isolated() {
        let store = CheckoutStore::default();
        let (first, _) = store
            .start(CheckoutForm::new(Contact {
                full_name: "A".to_string(),
                ..Contact::default()
            }))
            .await;
        let (second, _) = store.start(CheckoutForm::default()).await;

        assert_ne!(first, second);
        let Some(form) = store.get(second).await else {
            panic!("second visit should exist");
        };
        assert_eq!(form.lock().await.contact.full_name, "");
    }
}
