//! Persistent quote list.
//!
//! Quotes are stored as a JSON array in the app data directory and survive
//! restarts. The store owns the file path and the in-memory list; every
//! mutation is followed by a wholesale rewrite of the file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// A single quote record. Identity is informally keyed on `text`
/// (exact, case- and whitespace-sensitive match); there is no ID field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub category: String,
    /// When the record entered this store. Absent on the seed set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
}

impl Quote {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            date_added: Some(Utc::now()),
        }
    }
}

/// The three quotes shown before any data has been persisted.
pub fn seed_quotes() -> Vec<Quote> {
    let seed = |text: &str, category: &str| Quote {
        text: text.to_string(),
        category: category.to_string(),
        date_added: None,
    };
    vec![
        seed(
            "The only limit to our realization of tomorrow is our doubts of today.",
            "inspiration",
        ),
        seed(
            "Life is 10% what happens to us and 90% how we react to it.",
            "life",
        ),
        seed(
            "Your time is limited, don't waste it living someone else's life.",
            "motivation",
        ),
    ]
}

/// Owned quote list bound to its backing file.
pub struct QuoteStore {
    path: PathBuf,
    quotes: Vec<Quote>,
}

impl QuoteStore {
    /// Load the quote list from a JSON file. Returns the seed set if the
    /// file doesn't exist or can't be parsed.
    pub fn load(path: &Path) -> Self {
        let quotes = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse quote file: {} — using seed quotes", e);
                seed_quotes()
            }),
            Err(_) => {
                tracing::info!("No quote file found, using seed quotes");
                seed_quotes()
            }
        };
        Self {
            path: path.to_path_buf(),
            quotes,
        }
    }

    /// Rewrite the backing file with the current list.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.quotes)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!("Saved {} quotes to {}", self.quotes.len(), self.path.display());
        Ok(())
    }

    /// Validate and insert a user-entered quote, then persist.
    /// Both fields are trimmed; an empty result on either rejects the insert
    /// and leaves the store untouched.
    pub fn add_quote(&mut self, text: &str, category: &str) -> Result<Quote> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() || category.is_empty() {
            return Err(VaultError::Validation(
                "both quote text and category are required".to_string(),
            ));
        }
        let quote = Quote::new(text, category);
        self.quotes.push(quote.clone());
        self.save()?;
        Ok(quote)
    }

    /// Append already-validated records (import, remote merge) and persist once.
    pub fn extend(&mut self, quotes: impl IntoIterator<Item = Quote>) -> Result<()> {
        self.quotes.extend(quotes);
        self.save()
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Distinct categories in first-seen order, for populating a selector.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for quote in &self.quotes {
            if !seen.contains(&quote.category) {
                seen.push(quote.category.clone());
            }
        }
        seen
    }

    /// Pick a uniformly random quote, optionally restricted to one category.
    /// Returns `None` when the (filtered) list is empty.
    pub fn random_quote(&self, category: Option<&str>) -> Option<&Quote> {
        let mut rng = rand::rng();
        match category {
            Some(cat) => {
                let filtered: Vec<&Quote> =
                    self.quotes.iter().filter(|q| q.category == cat).collect();
                filtered.choose(&mut rng).copied()
            }
            None => self.quotes.choose(&mut rng),
        }
    }
}
