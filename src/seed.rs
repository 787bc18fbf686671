use crate::models::{Card, Deck};
use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

/// One row of a word list.
#[derive(Deserialize)]
struct WordPair {
    english: String,
    hebrew: String,
    #[serde(default)]
    transliteration: Option<String>,
}

/// Identity of a deck about to be seeded.
pub struct DeckSeed {
    pub id: u64,
    pub name: String,
    pub owner: String,
    /// Id of the first card, the following cards count up from here.
    pub first_card_id: u64,
}

/// Builds a deck and its cards from a comma-separated word list with the
/// header `english,hebrew[,transliteration]`. Every card starts out unseen and
/// due at `now`.
pub fn seed_deck<R: Read>(seed: DeckSeed, reader: R, now: NaiveDateTime) -> Result<(Deck, Vec<Card>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut english = HashMap::<String, usize>::new();
    let mut hebrew = HashMap::<String, usize>::new();
    let mut cards = Vec::new();

    for (i, record) in reader.deserialize::<WordPair>().enumerate() {
        let line = i + 2;
        let pair = record?;
        if let Some(j) = english.get(&pair.english) {
            return Err(anyhow!(
                "The English word {} in line {} is a duplicate of line {}!",
                &pair.english,
                line,
                j,
            ));
        }
        if let Some(j) = hebrew.get(&pair.hebrew) {
            return Err(anyhow!(
                "The Hebrew word {} in line {} is a duplicate of line {}!",
                &pair.hebrew,
                line,
                j,
            ));
        }
        english.insert(pair.english.clone(), line);
        hebrew.insert(pair.hebrew.clone(), line);

        let id = seed.first_card_id + cards.len() as u64;
        let mut card = Card::new(id, seed.id, pair.english, pair.hebrew, now);
        card.transliteration = pair.transliteration.filter(|t| !t.is_empty());
        cards.push(card);
    }

    let deck = Deck::new(seed.id, seed.name, seed.owner, u32::try_from(cards.len())?, now.date());
    debug!(deck = deck.id, "seeded {} cards", cards.len());
    Ok((deck, cards))
}

#[cfg(test)]
fn test_seed(name: &str) -> DeckSeed {
    DeckSeed {
        id: 2,
        name: name.to_string(),
        owner: String::from("dana"),
        first_card_id: 100,
    }
}

#[cfg(test)]
fn test_now() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2025, 5, 10)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

#[test]
fn test_seed_deck_defaults() {
    use crate::models::INITIAL_EASE_FACTOR;
    use chrono::TimeDelta;

    let words = "english,hebrew,transliteration\n\
    water,מים,mayim\n\
    bread,לחם,\n";
    let now = test_now();
    let (deck, cards) = seed_deck(test_seed("Standard"), words.as_bytes(), now).unwrap();

    assert_eq!(deck.id, 2);
    assert_eq!(deck.name, "Standard");
    assert_eq!(deck.num_cards, 2);
    assert_eq!(deck.streak, 0);
    assert_eq!(deck.unseen_count, 0);
    assert_eq!(deck.date, now.date() - TimeDelta::days(1));

    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].id, 100);
    assert_eq!(cards[1].id, 101);
    assert_eq!(cards[0].transliteration.as_deref(), Some("mayim"));
    assert_eq!(cards[1].transliteration, None);
    for card in &cards {
        assert_eq!(card.deck_id, 2);
        assert!(!card.seen);
        assert_eq!(card.interval, 0.0);
        assert_eq!(card.ease_factor, INITIAL_EASE_FACTOR);
        assert_eq!(card.next_shown, now);
    }
}

#[test]
fn test_seed_deck_without_transliteration_column() {
    let words = "english,hebrew\nto eat,לאכול\n";
    let (_, cards) = seed_deck(test_seed("Verbs"), words.as_bytes(), test_now()).unwrap();
    assert_eq!(cards[0].front, "to eat");
    assert_eq!(cards[0].transliteration, None);
}

#[test]
fn test_seed_deck_rejects_duplicates() {
    let words = "english,hebrew\n\
    water,מים\n\
    bread,לחם\n\
    water,מַיִם\n";
    let result = seed_deck(test_seed("Standard"), words.as_bytes(), test_now());
    assert_eq!(
        result.unwrap_err().to_string(),
        "The English word water in line 4 is a duplicate of line 2!"
    );
}

#[test]
fn test_seed_empty_deck() {
    let (deck, cards) = seed_deck(test_seed("Custom"), "english,hebrew\n".as_bytes(), test_now()).unwrap();
    assert_eq!(deck.num_cards, 0);
    assert!(cards.is_empty());
}
