use crate::seed::{seed_deck, DeckSeed};
use crate::store::CardBox;
use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDateTime};
use std::fs::File;
use std::path::Path;

/// Adds a deck seeded from a word list to an existing card box.
pub fn add(dir: &Path, word_list: &Path, name: Option<&str>, owner: Option<&str>) -> Result<()> {
    let mut card_box = CardBox::load(dir)?;
    let owner = match owner {
        Some(owner) => owner.to_string(),
        None => card_box
            .decks
            .first()
            .map(|d| d.owner.clone())
            .unwrap_or_default(),
    };
    let now = Local::now().naive_local();
    let name = add_deck(&mut card_box, word_list, name, &owner, now)?;
    card_box.save(dir)?;
    println!("Added deck {} to card box {:?}", name, dir);
    Ok(())
}

/// Seeds one deck into the box and returns its name. Without an explicit
/// name the deck is named after the word list's file stem.
pub(crate) fn add_deck(
    card_box: &mut CardBox,
    word_list: &Path,
    name: Option<&str>,
    owner: &str,
    now: NaiveDateTime,
) -> Result<String> {
    let name = match name {
        Some(name) => name.to_string(),
        None => word_list
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Cannot derive a deck name from {:?}.", word_list))?,
    };
    if !word_list.exists() {
        return Err(anyhow!("Word list {:?} doesn't exist. Aborting.", word_list));
    }
    let file = File::open(word_list)?;
    let seed = DeckSeed {
        id: card_box.next_deck_id(),
        name: name.clone(),
        owner: owner.to_string(),
        first_card_id: card_box.next_card_id(),
    };
    let (deck, cards) =
        seed_deck(seed, file, now).with_context(|| format!("Reading word list {:?}", word_list))?;
    card_box.insert_deck(deck, cards)?;
    Ok(name)
}

#[test]
fn test_add_deck_names_and_ids() {
    use std::fs;

    let dir = tempfile::tempdir().unwrap();
    let words = dir.path().join("verbs.csv");
    fs::write(&words, "english,hebrew\nto eat,לאכול\nto go,ללכת\n").unwrap();
    let now = chrono::NaiveDate::from_ymd_opt(2025, 5, 10)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();

    let mut card_box = CardBox::default();
    assert_eq!(add_deck(&mut card_box, &words, None, "dana", now).unwrap(), "verbs");
    assert_eq!(
        add_deck(&mut card_box, &words, Some("More verbs"), "dana", now).unwrap(),
        "More verbs"
    );

    assert_eq!(card_box.decks.len(), 2);
    assert_eq!(card_box.decks[1].id, 2);
    let ids: Vec<u64> = card_box.cards_of(2).map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 4]);

    let err = add_deck(&mut card_box, &words, None, "dana", now).unwrap_err();
    assert_eq!(err.to_string(), "A deck named \"verbs\" already exists. Aborting.");
}

#[test]
fn test_add_deck_missing_word_list() {
    let dir = tempfile::tempdir().unwrap();
    let now = chrono::Local::now().naive_local();
    let result = add_deck(
        &mut CardBox::default(),
        &dir.path().join("nope.csv"),
        None,
        "dana",
        now,
    );
    assert!(result.unwrap_err().to_string().contains("doesn't exist"));
}
