use crate::error::ScheduleError;
use crate::models::{Card, Deck};
use crate::schedule::check_membership;
use chrono::NaiveDateTime;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Maximum number of never-seen cards introduced per deck and day.
pub const DAILY_NEW_CARDS: u32 = 10;

/// Collects the cards of a deck that are due now, with the default daily
/// new-card limit.
pub fn select_due<'a, I, R>(
    deck: &Deck,
    cards: I,
    now: NaiveDateTime,
    rng: &mut R,
) -> Result<Vec<&'a Card>, ScheduleError>
where
    I: IntoIterator<Item = &'a Card>,
    R: Rng + ?Sized,
{
    select_due_with_limit(deck, cards, now, rng, DAILY_NEW_CARDS)
}

/// Collects the cards of a deck that are due now.
///
/// Due cards that were never seen are sampled at random, at most as many as
/// the deck may still introduce today. They come first, followed by every due
/// card that was seen before, in input order. Nothing is modified: a new card
/// only uses up its slot once it gets rated.
pub fn select_due_with_limit<'a, I, R>(
    deck: &Deck,
    cards: I,
    now: NaiveDateTime,
    rng: &mut R,
    daily_new_cards: u32,
) -> Result<Vec<&'a Card>, ScheduleError>
where
    I: IntoIterator<Item = &'a Card>,
    R: Rng + ?Sized,
{
    let mut unseen: Vec<&Card> = Vec::new();
    let mut seen: Vec<&Card> = Vec::new();
    for card in cards {
        check_membership(card, deck)?;
        if !card.is_due(now) {
            continue;
        }
        if card.seen {
            seen.push(card);
        } else {
            unseen.push(card);
        }
    }

    let budget = daily_new_cards.saturating_sub(deck.unseen_today(now.date())) as usize;
    let mut due: Vec<&Card> = unseen
        .choose_multiple(rng, budget.min(unseen.len()))
        .copied()
        .collect();
    due.extend(seen);
    Ok(due)
}

#[cfg(test)]
use chrono::{NaiveDate, TimeDelta};
#[cfg(test)]
use rand::{rngs::StdRng, SeedableRng};

#[cfg(test)]
fn build_deck(unseen_count: u32, now: NaiveDateTime) -> Deck {
    let mut deck = Deck::new(3, String::from("Verbs"), String::from("dana"), 0, now.date());
    deck.date = now.date();
    deck.unseen_count = unseen_count;
    deck
}

#[cfg(test)]
fn build_cards(now: NaiveDateTime, unseen: u64, seen: u64, later: u64) -> Vec<Card> {
    let mut cards = Vec::new();
    for id in 0..unseen + seen + later {
        let mut card = Card::new(id, 3, format!("front {}", id), format!("back {}", id), now);
        if id >= unseen {
            card.seen = true;
            card.interval = 1.0;
        }
        if id >= unseen + seen {
            card.next_shown = now + TimeDelta::days(1);
        }
        cards.push(card);
    }
    cards
}

#[cfg(test)]
fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 10)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap()
}

#[cfg(test)]
fn ids(cards: &[&Card]) -> Vec<u64> {
    cards.iter().map(|c| c.id).collect()
}

#[test]
fn test_new_card_cap() {
    let now = now();
    let deck = build_deck(8, now);
    let cards = build_cards(now, 5, 3, 2);
    let due = select_due(&deck, &cards, now, &mut StdRng::seed_from_u64(1)).unwrap();

    assert_eq!(due.len(), 5);
    assert!(due[..2].iter().all(|c| !c.seen));
    assert_eq!(ids(&due[2..]), vec![5, 6, 7]);
}

#[test]
fn test_budget_exhausted() {
    let now = now();
    let deck = build_deck(12, now);
    let cards = build_cards(now, 4, 2, 0);
    let due = select_due(&deck, &cards, now, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(ids(&due), vec![4, 5]);
}

#[test]
fn test_fewer_unseen_than_budget() {
    let now = now();
    let deck = build_deck(0, now);
    let cards = build_cards(now, 3, 0, 0);
    let due = select_due(&deck, &cards, now, &mut StdRng::seed_from_u64(1)).unwrap();
    let mut picked = ids(&due);
    picked.sort();
    assert_eq!(picked, vec![0, 1, 2]);
}

#[test]
fn test_counter_from_yesterday_does_not_count() {
    let now = now();
    let mut deck = build_deck(10, now);
    deck.date = now.date() - TimeDelta::days(1);
    let cards = build_cards(now, 15, 0, 0);
    let due = select_due(&deck, &cards, now, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(due.len(), 10);
}

#[test]
fn test_custom_limit() {
    let now = now();
    let deck = build_deck(1, now);
    let cards = build_cards(now, 6, 1, 0);
    let due =
        select_due_with_limit(&deck, &cards, now, &mut StdRng::seed_from_u64(1), 3).unwrap();
    assert_eq!(due.len(), 3);
    assert_eq!(due.iter().filter(|c| !c.seen).count(), 2);
}

#[test]
fn test_due_at_exactly_now() {
    let now = now();
    let deck = build_deck(0, now);
    let mut cards = build_cards(now, 0, 2, 0);
    cards[1].next_shown = now + TimeDelta::seconds(1);
    let due = select_due(&deck, &cards, now, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(ids(&due), vec![0]);
}

#[test]
fn test_nothing_due() {
    let now = now();
    let deck = build_deck(0, now);
    let cards = build_cards(now, 0, 0, 4);
    let due = select_due(&deck, &cards, now, &mut StdRng::seed_from_u64(1)).unwrap();
    assert!(due.is_empty());
    assert!(!cards.is_empty());
}

#[test]
fn test_selection_is_repeatable_and_pure() {
    let now = now();
    let deck = build_deck(4, now);
    let cards = build_cards(now, 20, 5, 5);
    let before = (deck.clone(), cards.clone());

    let first = ids(&select_due(&deck, &cards, now, &mut StdRng::seed_from_u64(42)).unwrap());
    let second = ids(&select_due(&deck, &cards, now, &mut StdRng::seed_from_u64(42)).unwrap());

    assert_eq!(first, second);
    assert_eq!(first.len(), 11);
    assert_eq!((deck, cards), before);
}

#[test]
fn test_rejects_foreign_card() {
    let now = now();
    let deck = build_deck(0, now);
    let mut cards = build_cards(now, 1, 1, 0);
    cards[1].deck_id = 4;
    assert_eq!(
        select_due(&deck, &cards, now, &mut StdRng::seed_from_u64(1)),
        Err(ScheduleError::DeckCardMismatch {
            card_id: 1,
            card_deck_id: 4,
            deck_id: 3
        })
    );
}
