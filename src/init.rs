use crate::add::add_deck;
use crate::store::CardBox;
use crate::utils::plural;
use anyhow::{anyhow, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

/// Initializes a new card box with one deck per word list.
pub fn init(dir: &Path, owner: &str, word_lists: &[PathBuf]) -> Result<()> {
    if CardBox::exists(dir) {
        return Err(anyhow!(
            "Card box {:?} already exists! Use `lexdeck add` to add new decks. Aborting.",
            dir
        ));
    }
    let now = Local::now().naive_local();
    let mut card_box = CardBox::default();
    for word_list in word_lists {
        add_deck(&mut card_box, word_list, None, owner, now)?;
    }
    card_box.save(dir)?;
    println!(
        "Created new card box {:?} with {} card{} in {} deck{}",
        dir,
        card_box.cards.len(),
        plural(card_box.cards.len()),
        card_box.decks.len(),
        plural(card_box.decks.len())
    );
    Ok(())
}
