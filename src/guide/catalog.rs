use crate::error::Result;
use crate::guide::model::GuideDocument;
use crate::guide::store::{GuideStore, guide_id};
use indexmap::IndexMap;

/// In-memory registry of guides, keyed by guide id, in insertion order
#[derive(Debug, Clone, Default)]
pub struct GuideCatalog {
    guides: IndexMap<String, GuideDocument>,
}

impl GuideCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every guide a store holds; guides that fail to load are logged and left out
    pub fn from_store<S: GuideStore + ?Sized>(store: &S) -> Result<Self> {
        let mut catalog = Self::new();
        for id in store.list()? {
            match store.load(&id) {
                Ok(guide) => {
                    catalog.guides.insert(id, guide);
                }
                Err(e) => log::error!("Skipping guide '{}': {}", id, e),
            }
        }
        Ok(catalog)
    }

    /// Add or replace a guide; returns the id it is stored under and any guide it replaced
    pub fn insert(&mut self, guide: GuideDocument) -> (String, Option<GuideDocument>) {
        let id = guide_id(&guide.name);
        let previous = self.guides.insert(id.clone(), guide);
        (id, previous)
    }

    pub fn get(&self, id: &str) -> Option<&GuideDocument> {
        self.guides.get(id)
    }

    /// Remove a guide, keeping the order of the rest
    pub fn remove(&mut self, id: &str) -> Option<GuideDocument> {
        self.guides.shift_remove(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.guides.keys().map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.guides.values().map(|g| g.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GuideDocument)> {
        self.guides.iter().map(|(id, guide)| (id.as_str(), guide))
    }

    /// Guides in `category`, in catalog order
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a GuideDocument> + 'a {
        self.guides.values().filter(move |g| g.category == category)
    }

    pub fn len(&self) -> usize {
        self.guides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }
}
