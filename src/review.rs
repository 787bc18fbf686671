use crate::models::{Card, Rating};
use crate::schedule::schedule;
use crate::select::select_due_with_limit;
use crate::store::CardBox;
use crate::utils::{clear, plural, read_line};
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::io::{stdin, stdout, BufRead, Write};
use std::path::Path;

pub struct ReviewOptions {
    pub daily_new_cards: u32,
    /// Seed for the card order. A random one is used if unset.
    pub seed: Option<u64>,
}

/// Lets user review the due cards of one deck until none are left.
pub fn review(dir: &Path, deck_name: &str, options: &ReviewOptions) -> Result<()> {
    let mut card_box = CardBox::load(dir)?;
    let deck_id = card_box.deck(deck_name)?.id;
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let now = Local::now().naive_local();
    review_deck(
        &mut card_box,
        deck_id,
        options.daily_new_cards,
        now,
        &mut stdin().lock(),
        &mut stdout().lock(),
        &mut rng,
        |card_box| card_box.save(dir),
    )?;
    Ok(())
}

/// Runs the review loop and returns the number of reviews. `persist` is called
/// after every rating.
#[allow(clippy::too_many_arguments)]
fn review_deck<R, W, G, P>(
    card_box: &mut CardBox,
    deck_id: u64,
    daily_new_cards: u32,
    now: NaiveDateTime,
    stdin: &mut R,
    stdout: &mut W,
    rng: &mut G,
    mut persist: P,
) -> Result<usize>
where
    R: BufRead,
    W: Write,
    G: Rng,
    P: FnMut(&CardBox) -> Result<()>,
{
    let mut deck = card_box
        .decks
        .iter()
        .find(|d| d.id == deck_id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Deck {} is not part of this card box.", deck_id))?;
    if card_box.cards_of(deck_id).next().is_none() {
        writeln!(stdout, "Deck {} has no cards.", deck.name)?;
        return Ok(0);
    }

    let mut num_reviews = 0;
    let mut started = false;
    loop {
        let next = {
            let due = select_due_with_limit(
                &deck,
                card_box.cards_of(deck_id),
                now,
                rng,
                daily_new_cards,
            )?;
            due.choose(rng).map(|card| (due.len(), (*card).clone()))
        };
        let Some((num_due, card)) = next else {
            break;
        };
        if !started {
            clear(stdout)?;
            writeln!(
                stdout,
                "Reviewing {} (streak: {} day{})\n",
                deck.name,
                deck.streak,
                plural(deck.streak as usize)
            )?;
            started = true;
        }
        writeln!(stdout, "{} card{} due", num_due, plural(num_due))?;

        let Some(rating) = ask_rating(&card, stdin, stdout)? else {
            break;
        };
        let (card, updated) = schedule(&card, &deck, rating, now)?;
        card_box.update(card, updated.clone())?;
        persist(card_box)?;
        deck = updated;
        num_reviews += 1;
    }

    if started {
        writeln!(
            stdout,
            "{} review{}. Done.",
            num_reviews,
            plural(num_reviews)
        )?;
    } else {
        writeln!(stdout, "No cards due for review in {} right now.", deck.name)?;
    }
    Ok(num_reviews)
}

// Shows both sides of the card. Returns None if the user wants to stop.
fn ask_rating<R, W>(card: &Card, stdin: &mut R, stdout: &mut W) -> Result<Option<Rating>>
where
    R: BufRead,
    W: Write,
{
    write!(stdout, "F: {}", card.front)?;
    stdout.flush()?;
    if read_line(&mut *stdin)?.is_none() {
        return Ok(None);
    }
    match &card.transliteration {
        Some(transliteration) => writeln!(stdout, "B: {} ({})", card.back, transliteration)?,
        None => writeln!(stdout, "B: {}", card.back)?,
    }

    loop {
        write!(stdout, "Rating [0-3, q to quit]: ")?;
        stdout.flush()?;
        let input = match read_line(&mut *stdin)? {
            Some(input) if input.trim() != "q" => input,
            _ => return Ok(None),
        };
        match input.parse::<Rating>() {
            Ok(rating) => {
                writeln!(stdout)?;
                return Ok(Some(rating));
            }
            Err(e) => writeln!(stdout, "{}", e)?,
        }
    }
}

#[cfg(test)]
fn single_card_box(now: NaiveDateTime) -> CardBox {
    use crate::models::Deck;

    let deck = Deck::new(1, String::from("Standard"), String::from("dana"), 1, now.date());
    let mut card = Card::new(5, 1, String::from("water"), String::from("מים"), now);
    card.transliteration = Some(String::from("mayim"));
    CardBox {
        decks: vec![deck],
        cards: vec![card],
    }
}

#[cfg(test)]
fn test_now() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2025, 5, 10)
        .unwrap()
        .and_hms_opt(20, 0, 0)
        .unwrap()
}

#[test]
fn test_review_new_card() {
    use chrono::TimeDelta;
    use std::io::Cursor;

    let now = test_now();
    let mut card_box = single_card_box(now);
    let mut stdin = Cursor::new(b"\n1\n");
    let mut stdout = Cursor::new(Vec::new());
    let mut saves = 0;
    let result = review_deck(
        &mut card_box,
        1,
        10,
        now,
        &mut stdin,
        &mut stdout,
        &mut StdRng::seed_from_u64(3),
        |_| {
            saves += 1;
            Ok(())
        },
    );

    assert_eq!(result.unwrap(), 1);
    assert_eq!(saves, 1);
    assert_eq!(
        String::from_utf8_lossy(&stdout.into_inner()),
        "\u{1b}[2J\u{1b}[1;1HReviewing Standard (streak: 0 days)\n\n\
        1 card due\n\
        F: waterB: מים (mayim)\n\
        Rating [0-3, q to quit]: \n\
        1 review. Done.\n"
    );

    let card = &card_box.cards[0];
    assert!(card.seen);
    assert_eq!(card.interval, 1.0);
    assert_eq!(card.next_shown, now + TimeDelta::days(1));
    let deck = &card_box.decks[0];
    assert_eq!(deck.streak, 1);
    assert_eq!(deck.unseen_count, 1);
    assert_eq!(deck.date, now.date());
}

#[test]
fn test_wrong_card_comes_back() {
    use std::io::Cursor;

    let now = test_now();
    let mut card_box = single_card_box(now);
    let mut stdin = Cursor::new(b"\n0\n\nx\n3\n");
    let mut stdout = Cursor::new(Vec::new());
    let result = review_deck(
        &mut card_box,
        1,
        10,
        now,
        &mut stdin,
        &mut stdout,
        &mut StdRng::seed_from_u64(3),
        |_| Ok(()),
    );

    assert_eq!(result.unwrap(), 2);
    let output = String::from_utf8_lossy(&stdout.into_inner()).to_string();
    assert!(output.contains("\"x\" is not a rating, expected 0, 1, 2 or 3\n"));
    assert!(output.ends_with("2 reviews. Done.\n"));

    let card = &card_box.cards[0];
    assert_eq!(card.interval, 1.0);
    assert!((card.ease_factor - 2.15).abs() < 1e-9);
    assert_eq!(card_box.decks[0].unseen_count, 1);
    assert_eq!(card_box.decks[0].streak, 1);
}

#[test]
fn test_quit_keeps_card_untouched() {
    use std::io::Cursor;

    let now = test_now();
    let mut card_box = single_card_box(now);
    let before = card_box.cards.clone();
    let mut stdin = Cursor::new(b"\nq\n");
    let mut stdout = Cursor::new(Vec::new());
    let result = review_deck(
        &mut card_box,
        1,
        10,
        now,
        &mut stdin,
        &mut stdout,
        &mut StdRng::seed_from_u64(3),
        |_| Ok(()),
    );

    assert_eq!(result.unwrap(), 0);
    assert_eq!(card_box.cards, before);
    assert!(String::from_utf8_lossy(&stdout.into_inner()).ends_with("0 reviews. Done.\n"));
}

#[test]
fn test_new_card_limit_reached() {
    use std::io::Cursor;

    let now = test_now();
    let mut card_box = single_card_box(now);
    card_box.decks[0].date = now.date();
    card_box.decks[0].unseen_count = 10;
    let mut stdout = Cursor::new(Vec::new());
    let result = review_deck(
        &mut card_box,
        1,
        10,
        now,
        &mut Cursor::new(b""),
        &mut stdout,
        &mut StdRng::seed_from_u64(3),
        |_| Ok(()),
    );

    assert_eq!(result.unwrap(), 0);
    assert_eq!(
        String::from_utf8_lossy(&stdout.into_inner()),
        "No cards due for review in Standard right now.\n"
    );
}
