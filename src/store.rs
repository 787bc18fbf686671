//! On-disk card box: a directory with `decks.csv` and `cards.csv`.

use crate::models::{Card, Deck};
use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use struct_field_names_as_array::FieldNamesAsArray;
use tracing::debug;

const DECKS_FILE: &str = "decks.csv";
const CARDS_FILE: &str = "cards.csv";

#[derive(Debug, Default, PartialEq)]
pub struct CardBox {
    pub decks: Vec<Deck>,
    pub cards: Vec<Card>,
}

impl CardBox {
    pub fn exists(dir: &Path) -> bool {
        dir.join(DECKS_FILE).exists()
    }

    pub fn load(dir: &Path) -> Result<Self> {
        if !Self::exists(dir) {
            return Err(anyhow!(
                "Card box {:?} doesn't exist. Use `lexdeck init` to create it. Aborting.",
                dir
            ));
        }
        let card_box = Self {
            decks: read_all(&dir.join(DECKS_FILE))?,
            cards: read_all(&dir.join(CARDS_FILE))?,
        };
        debug!(
            "loaded {} decks and {} cards from {:?}",
            card_box.decks.len(),
            card_box.cards.len(),
            dir
        );
        Ok(card_box)
    }

    /// Writes both files next to the originals first and then moves them in
    /// place.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        write_all(&dir.join(DECKS_FILE), Deck::FIELD_NAMES_AS_ARRAY, &self.decks)?;
        write_all(&dir.join(CARDS_FILE), Card::FIELD_NAMES_AS_ARRAY, &self.cards)?;
        debug!("saved {} cards to {:?}", self.cards.len(), dir);
        Ok(())
    }

    pub fn deck(&self, name: &str) -> Result<&Deck> {
        self.decks
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| anyhow!("No deck named {:?} in this card box.", name))
    }

    pub fn cards_of(&self, deck_id: u64) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.deck_id == deck_id)
    }

    pub fn next_deck_id(&self) -> u64 {
        self.decks.iter().map(|d| d.id + 1).max().unwrap_or(1)
    }

    pub fn next_card_id(&self) -> u64 {
        self.cards.iter().map(|c| c.id + 1).max().unwrap_or(1)
    }

    /// Adds a freshly seeded deck. Deck names are unique within a box.
    pub fn insert_deck(&mut self, deck: Deck, cards: Vec<Card>) -> Result<()> {
        if self.decks.iter().any(|d| d.name == deck.name) {
            return Err(anyhow!("A deck named {:?} already exists. Aborting.", deck.name));
        }
        self.decks.push(deck);
        self.cards.extend(cards);
        Ok(())
    }

    /// Removes a deck together with its cards.
    pub fn remove_deck(&mut self, deck_id: u64) -> Option<Deck> {
        let i = self.decks.iter().position(|d| d.id == deck_id)?;
        self.cards.retain(|c| c.deck_id != deck_id);
        Some(self.decks.remove(i))
    }

    /// Stores the result of a rating.
    pub fn update(&mut self, card: Card, deck: Deck) -> Result<()> {
        let stored_card = self
            .cards
            .iter_mut()
            .find(|c| c.id == card.id)
            .ok_or_else(|| anyhow!("Card {} is not part of this card box.", card.id))?;
        *stored_card = card;
        let stored_deck = self
            .decks
            .iter_mut()
            .find(|d| d.id == deck.id)
            .ok_or_else(|| anyhow!("Deck {} is not part of this card box.", deck.id))?;
        *stored_deck = deck;
        Ok(())
    }
}

fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .quote(b'#')
        .has_headers(true)
        .from_path(path)?;
    let records = reader.deserialize().collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(records)
}

fn write_all<H, T>(path: &Path, header: H, records: &[T]) -> Result<()>
where
    H: IntoIterator,
    H::Item: AsRef<[u8]>,
    T: Serialize,
{
    let tmp = temp_path(path);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'|')
        .quote(b'#')
        .has_headers(false)
        .from_path(&tmp)?;
    writer.write_record(header)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    drop(writer);
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
fn sample_box() -> CardBox {
    let now = chrono::NaiveDate::from_ymd_opt(2025, 5, 10)
        .unwrap()
        .and_hms_opt(7, 15, 0)
        .unwrap();
    let deck = Deck::new(1, String::from("Standard | Basics"), String::from("dana"), 2, now.date());
    let mut first = Card::new(1, 1, String::from("water"), String::from("מים"), now);
    first.transliteration = Some(String::from("mayim"));
    let mut second = Card::new(2, 1, String::from("#hash"), String::from("לחם"), now);
    second.seen = true;
    second.interval = 2.5;
    second.ease_factor = 2.35;
    CardBox {
        decks: vec![deck],
        cards: vec![first, second],
    }
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let card_box = sample_box();
    card_box.save(dir.path()).unwrap();
    assert!(!dir.path().join("cards.csv.tmp").exists());
    assert_eq!(CardBox::load(dir.path()).unwrap(), card_box);
}

#[test]
fn test_save_empty_box() {
    let dir = tempfile::tempdir().unwrap();
    CardBox::default().save(dir.path()).unwrap();
    let header = fs::read_to_string(dir.path().join("decks.csv")).unwrap();
    assert_eq!(header, "id|name|owner|num_cards|streak|unseen_count|date\n");
    assert_eq!(CardBox::load(dir.path()).unwrap(), CardBox::default());
}

#[test]
fn test_load_missing_box() {
    let dir = tempfile::tempdir().unwrap();
    let err = CardBox::load(&dir.path().join("nope")).unwrap_err();
    assert!(err.to_string().contains("doesn't exist"));
}

#[test]
fn test_insert_and_remove_deck() {
    let mut card_box = sample_box();
    assert_eq!(card_box.next_deck_id(), 2);
    assert_eq!(card_box.next_card_id(), 3);

    let duplicate = card_box.decks[0].clone();
    assert!(card_box.insert_deck(duplicate, Vec::new()).is_err());

    let removed = card_box.remove_deck(1).unwrap();
    assert_eq!(removed.name, "Standard | Basics");
    assert!(card_box.cards.is_empty());
    assert_eq!(card_box.remove_deck(1), None);
}

#[test]
fn test_update_unknown_card() {
    let mut card_box = sample_box();
    let mut card = card_box.cards[0].clone();
    card.id = 9;
    let deck = card_box.decks[0].clone();
    assert_eq!(
        card_box.update(card, deck).unwrap_err().to_string(),
        "Card 9 is not part of this card box."
    );
}
