//! Quotes shown alongside a running session. Display-only.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub source_title: Option<String>,
    #[serde(default)]
    pub metadata: Option<String>,
}

impl Quote {
    /// Character, source and metadata joined with an em dash; empty when
    /// none are set.
    pub fn attribution(&self) -> String {
        [&self.character, &self.source_title, &self.metadata]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" \u{2014} ")
    }

    pub fn with_attribution(&self) -> String {
        let attribution = self.attribution();
        if attribution.is_empty() {
            format!("\"{}\"", self.text)
        } else {
            format!("\"{}\" {}", self.text, attribution)
        }
    }
}

impl Default for Quote {
    fn default() -> Self {
        quote(
            "quote-naruto-01",
            "Hard work is worthless for those that don't believe in themselves.",
            "Naruto Uzumaki",
            "Naruto",
            None,
        )
    }
}

/// A fixed catalogue of quotes.
#[derive(Debug, Clone)]
pub struct QuoteBook {
    quotes: Vec<Quote>,
}

impl QuoteBook {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            quote(
                "quote-haikyuu-01",
                "Talent is something you make bloom. Instinct is something you polish!",
                "Tooru Oikawa",
                "Haikyuu!!",
                Some("Season 2, Episode 24"),
            ),
            quote(
                "quote-demonslayer-01",
                "No matter how many people you may lose, you have no choice but to go on living.",
                "Tanjiro Kamado",
                "Demon Slayer",
                None,
            ),
            quote(
                "quote-onepiece-01",
                "If you don't take risks, you can't create a future.",
                "Monkey D. Luffy",
                "One Piece",
                None,
            ),
            Quote::default(),
        ])
    }

    /// Random quote, or the default one when the book is empty.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Quote {
        self.quotes.choose(rng).cloned().unwrap_or_default()
    }

    pub fn by_id(&self, id: &str) -> Quote {
        self.quotes
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl Default for QuoteBook {
    fn default() -> Self {
        Self::builtin()
    }
}

fn quote(id: &str, text: &str, character: &str, source: &str, metadata: Option<&str>) -> Quote {
    Quote {
        id: id.into(),
        text: text.into(),
        character: Some(character.into()),
        source_title: Some(source.into()),
        metadata: metadata.map(Into::into),
    }
}
