use crate::schedule::reset_progress;
use crate::store::CardBox;
use crate::utils::plural;
use anyhow::Result;
use chrono::Local;
use std::path::Path;

/// Makes every card of the given deck (or of all decks) new again.
pub fn reset(dir: &Path, deck_name: Option<&str>) -> Result<()> {
    let mut card_box = CardBox::load(dir)?;
    let deck_ids: Vec<u64> = match deck_name {
        Some(name) => vec![card_box.deck(name)?.id],
        None => card_box.decks.iter().map(|d| d.id).collect(),
    };
    let now = Local::now().naive_local();
    let CardBox { decks, cards } = &mut card_box;
    for deck in decks.iter_mut().filter(|d| deck_ids.contains(&d.id)) {
        reset_progress(deck, cards.iter_mut(), now);
    }
    card_box.save(dir)?;
    println!("Reset {} deck{}", deck_ids.len(), plural(deck_ids.len()));
    Ok(())
}
