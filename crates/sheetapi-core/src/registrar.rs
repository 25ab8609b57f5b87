use crate::collection::Collection;
use crate::error::SheetApiError;
use crate::locator::extract_spreadsheet_id;
use parking_lot::RwLock;
use sheetapi_store::{SheetStore, SpreadsheetMetadata};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// What happens when a title that is already bound gets registered again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationPolicy {
    /// The newer binding takes over the title.
    #[default]
    Replace,
    /// The registration fails and nothing from it is bound.
    Reject,
}

/// Outcome of one [`CollectionRegistrar::register`] call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Registration {
    pub spreadsheet_id: String,
    /// Titles bound by this call, in the order given.
    pub bound: Vec<String>,
    /// Subset of `bound` that displaced an earlier binding.
    pub replaced: Vec<String>,
}

/// Result of [`CollectionRegistrar::connect`].
#[derive(Debug, Clone)]
pub struct Connected {
    pub metadata: SpreadsheetMetadata,
    pub registration: Registration,
}

/// Table of bound tabs, keyed by title.
///
/// Exactly one [`Collection`] answers for a title at any time. The lock is only held for map
/// access and never across store I/O.
pub struct CollectionRegistrar<S> {
    store: Arc<S>,
    policy: RegistrationPolicy,
    collections: RwLock<BTreeMap<String, Arc<Collection<S>>>>,
}

impl<S: SheetStore> CollectionRegistrar<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_policy(store, RegistrationPolicy::default())
    }

    pub fn with_policy(store: Arc<S>, policy: RegistrationPolicy) -> Self {
        Self {
            store,
            policy,
            collections: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Bind a collection for every title of `spreadsheet_id`.
    ///
    /// A title repeated within `titles` is bound once. Under [`RegistrationPolicy::Reject`]
    /// all titles are checked before anything is bound.
    pub fn register<I, T>(
        &self,
        spreadsheet_id: &str,
        titles: I,
    ) -> Result<Registration, SheetApiError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut incoming: Vec<String> = Vec::new();
        for title in titles {
            let title = title.into();
            if !incoming.contains(&title) {
                incoming.push(title);
            }
        }

        let mut collections = self.collections.write();
        if self.policy == RegistrationPolicy::Reject {
            if let Some(taken) = incoming.iter().find(|t| collections.contains_key(t.as_str())) {
                return Err(SheetApiError::AlreadyRegistered(taken.clone()));
            }
        }

        let mut registration = Registration {
            spreadsheet_id: spreadsheet_id.to_string(),
            ..Registration::default()
        };
        for title in incoming {
            let collection = Arc::new(Collection::new(
                Arc::clone(&self.store),
                spreadsheet_id,
                title.as_str(),
            ));
            if let Some(previous) = collections.insert(title.clone(), collection) {
                warn!(
                    title = %title,
                    previous = previous.spreadsheet_id(),
                    spreadsheet_id,
                    "collection binding replaced"
                );
                registration.replaced.push(title.clone());
            } else {
                debug!(title = %title, spreadsheet_id, "collection bound");
            }
            registration.bound.push(title);
        }
        Ok(registration)
    }

    /// Parse `locator`, read the spreadsheet's tab list and bind every tab.
    pub async fn connect(&self, locator: &str) -> Result<Connected, SheetApiError> {
        let spreadsheet_id = extract_spreadsheet_id(locator)
            .ok_or_else(|| SheetApiError::InvalidLocator(locator.to_string()))?;
        let metadata = self.store.fetch_metadata(spreadsheet_id).await?;
        let registration = self.register(&metadata.spreadsheet_id, metadata.titles())?;
        Ok(Connected {
            metadata,
            registration,
        })
    }

    pub fn resolve(&self, title: &str) -> Option<Arc<Collection<S>>> {
        self.collections.read().get(title).cloned()
    }

    /// Bound titles, sorted.
    pub fn titles(&self) -> Vec<String> {
        self.collections.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.collections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.read().is_empty()
    }
}
