//! Review scheduler: an SM-2 variant with a clamped ease factor.
//!
//! A wrong answer resets the interval and makes the card due immediately. A
//! correct answer starts a one-day interval after a reset and otherwise
//! multiplies the interval by the ease factor. The rating's confidence only
//! moves the ease factor.

use crate::error::ScheduleError;
use crate::models::{Card, Deck, Rating};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tracing::{debug, info};

pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_EASE_FACTOR: f64 = 2.5;

/// A streak survives this many days without reviews.
pub const STREAK_GRACE_DAYS: i64 = 2;

const WRONG_PENALTY: f64 = 0.5;
const CONFIDENCE_STEP: f64 = 0.15;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Applies a rating to a card and returns the updated card and deck.
///
/// The deck's day-boundary transition runs first, then a never-seen card
/// consumes one of today's new-card slots, then the interval and ease factor
/// are updated.
pub fn schedule(
    card: &Card,
    deck: &Deck,
    rating: Rating,
    now: NaiveDateTime,
) -> Result<(Card, Deck), ScheduleError> {
    check_membership(card, deck)?;
    check_state(card)?;

    let mut card = card.clone();
    let mut deck = deck.clone();

    roll_over(&mut deck, now.date());

    if !card.seen {
        deck.unseen_count += 1;
        card.seen = true;
    }

    if rating.is_correct() {
        card.interval = if card.interval == 0.0 {
            1.0
        } else {
            card.interval * card.ease_factor
        };
        card.next_shown = add_days(now, card.interval).ok_or(ScheduleError::IntervalOverflow {
            card_id: card.id,
            interval: card.interval,
        })?;
        match rating {
            Rating::Hard => card.ease_factor -= CONFIDENCE_STEP,
            Rating::Easy => card.ease_factor += CONFIDENCE_STEP,
            _ => {}
        }
    } else {
        card.next_shown = now;
        card.interval = 0.0;
        card.ease_factor -= WRONG_PENALTY;
    }
    card.ease_factor = card.ease_factor.clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR);

    Ok((card, deck))
}

/// Starts a new day for the deck if its counters belong to an earlier one.
/// Returns true if the transition happened.
pub fn roll_over(deck: &mut Deck, today: NaiveDate) -> bool {
    if deck.date == today {
        return false;
    }
    expire_streak(deck, today);
    deck.date = today;
    deck.unseen_count = 0;
    deck.streak += 1;
    debug!(deck = deck.id, streak = deck.streak, "started new review day");
    true
}

/// Resets the streak of a deck that was left alone for more than
/// [`STREAK_GRACE_DAYS`] days. Returns true if the streak was reset.
pub fn expire_streak(deck: &mut Deck, today: NaiveDate) -> bool {
    if (today - deck.date).num_days() <= STREAK_GRACE_DAYS || deck.streak == 0 {
        return false;
    }
    info!(deck = deck.id, last = %deck.date, "streak of {} expired", deck.streak);
    deck.streak = 0;
    true
}

/// Forgets all review progress of a deck. Ease factors and the streak are kept.
pub fn reset_progress<'a, I>(deck: &mut Deck, cards: I, now: NaiveDateTime)
where
    I: IntoIterator<Item = &'a mut Card>,
{
    let mut count = 0;
    for card in cards.into_iter().filter(|c| c.deck_id == deck.id) {
        card.seen = false;
        card.interval = 0.0;
        card.next_shown = now;
        count += 1;
    }
    deck.unseen_count = 0;
    info!(deck = deck.id, "reset {} cards", count);
}

pub(crate) fn check_membership(card: &Card, deck: &Deck) -> Result<(), ScheduleError> {
    if card.deck_id != deck.id {
        return Err(ScheduleError::DeckCardMismatch {
            card_id: card.id,
            card_deck_id: card.deck_id,
            deck_id: deck.id,
        });
    }
    Ok(())
}

fn check_state(card: &Card) -> Result<(), ScheduleError> {
    for (field, value) in [("interval", card.interval), ("ease factor", card.ease_factor)] {
        if !value.is_finite() || value < 0.0 {
            return Err(ScheduleError::InvalidCardState {
                card_id: card.id,
                field,
                value,
            });
        }
    }
    Ok(())
}

fn add_days(now: NaiveDateTime, days: f64) -> Option<NaiveDateTime> {
    let ms = (days * MS_PER_DAY).round();
    if ms >= i64::MAX as f64 {
        return None;
    }
    now.checked_add_signed(TimeDelta::try_milliseconds(ms as i64)?)
}

#[cfg(test)]
fn fixtures(interval: f64, ease_factor: f64, seen: bool) -> (Card, Deck, NaiveDateTime) {
    let now = NaiveDate::from_ymd_opt(2025, 5, 10)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let mut card = Card::new(1, 7, String::from("water"), String::from("מים"), now);
    card.interval = interval;
    card.ease_factor = ease_factor;
    card.seen = seen;
    let mut deck = Deck::new(7, String::from("Standard"), String::from("dana"), 1, now.date());
    deck.date = now.date();
    deck.streak = 3;
    (card, deck, now)
}

#[test]
fn test_wrong_answer_resets_interval() {
    let (card, deck, now) = fixtures(5.0, 2.0, true);
    let (card, _) = schedule(&card, &deck, Rating::Wrong, now).unwrap();
    assert_eq!(card.interval, 0.0);
    assert_eq!(card.next_shown, now);
    assert_eq!(card.ease_factor, 1.5);
}

#[test]
fn test_first_correct_answer_after_reset() {
    let (card, deck, now) = fixtures(0.0, 2.0, true);
    let (card, _) = schedule(&card, &deck, Rating::Good, now).unwrap();
    assert_eq!(card.interval, 1.0);
    assert_eq!(card.next_shown, now + TimeDelta::days(1));
    assert_eq!(card.ease_factor, 2.0);
}

#[test]
fn test_interval_grows_by_ease_factor() {
    let (card, deck, now) = fixtures(4.0, 2.0, true);
    let (card, _) = schedule(&card, &deck, Rating::Good, now).unwrap();
    assert_eq!(card.interval, 8.0);
    assert_eq!(card.next_shown, now + TimeDelta::days(8));
}

#[test]
fn test_fractional_interval() {
    let (card, deck, now) = fixtures(1.0, 1.5, true);
    let (card, _) = schedule(&card, &deck, Rating::Easy, now).unwrap();
    assert_eq!(card.interval, 1.5);
    assert_eq!(card.next_shown, now + TimeDelta::hours(36));
    assert!((card.ease_factor - 1.65).abs() < 1e-9);
}

#[test]
fn test_hard_ratings_stop_at_minimum_ease() {
    let (mut card, deck, now) = fixtures(1.0, 2.5, true);
    let mut previous = card.ease_factor;
    for _ in 0..20 {
        card = schedule(&card, &deck, Rating::Hard, now).unwrap().0;
        assert!(card.ease_factor <= previous);
        assert!(card.ease_factor >= MIN_EASE_FACTOR);
        previous = card.ease_factor;
    }
    assert_eq!(card.ease_factor, MIN_EASE_FACTOR);
}

#[test]
fn test_ease_factor_stays_clamped() {
    let ratings = [Rating::Wrong, Rating::Good, Rating::Hard, Rating::Easy];
    for ease in [0.0, 1.0, 1.3, 1.8, 2.5, 3.0, 10.0] {
        for rating in ratings {
            let (card, deck, now) = fixtures(2.0, ease, true);
            let (card, _) = schedule(&card, &deck, rating, now).unwrap();
            assert!(
                (MIN_EASE_FACTOR..=MAX_EASE_FACTOR).contains(&card.ease_factor),
                "ease {} rating {} gave {}",
                ease,
                rating,
                card.ease_factor
            );
        }
    }
}

#[test]
fn test_inputs_are_not_mutated() {
    let (card, deck, now) = fixtures(4.0, 2.0, false);
    let (before_card, before_deck) = (card.clone(), deck.clone());
    schedule(&card, &deck, Rating::Easy, now).unwrap();
    assert_eq!(card, before_card);
    assert_eq!(deck, before_deck);
}

#[test]
fn test_unseen_card_consumes_new_slot() {
    let (card, deck, now) = fixtures(0.0, 2.5, false);
    let (card, deck) = schedule(&card, &deck, Rating::Wrong, now).unwrap();
    assert!(card.seen);
    assert_eq!(deck.unseen_count, 1);

    let (_, deck) = schedule(&card, &deck, Rating::Good, now).unwrap();
    assert_eq!(deck.unseen_count, 1);
}

#[test]
fn test_day_boundary_fires_once_per_day() {
    let (first, mut deck, now) = fixtures(0.0, 2.5, false);
    deck.date = now.date() - TimeDelta::days(1);
    deck.unseen_count = 10;
    let mut second = first.clone();
    second.id = 2;

    let (_, deck) = schedule(&first, &deck, Rating::Good, now).unwrap();
    assert_eq!(deck.streak, 4);
    assert_eq!(deck.date, now.date());
    assert_eq!(deck.unseen_count, 1);

    let (_, deck) = schedule(&second, &deck, Rating::Good, now + TimeDelta::hours(2)).unwrap();
    assert_eq!(deck.streak, 4);
    assert_eq!(deck.date, now.date());
    assert_eq!(deck.unseen_count, 2);
}

#[test]
fn test_streak_survives_two_idle_days() {
    let (card, mut deck, now) = fixtures(0.0, 2.5, true);
    deck.date = now.date() - TimeDelta::days(2);
    assert!(!expire_streak(&mut deck.clone(), now.date()));
    let (_, deck) = schedule(&card, &deck, Rating::Good, now).unwrap();
    assert_eq!(deck.streak, 4);
}

#[test]
fn test_streak_expires_after_three_idle_days() {
    let (card, mut deck, now) = fixtures(0.0, 2.5, true);
    deck.date = now.date() - TimeDelta::days(3);

    let mut expired = deck.clone();
    assert!(expire_streak(&mut expired, now.date()));
    assert_eq!(expired.streak, 0);
    assert_eq!(expired.date, deck.date);

    // Reset, then today's review counts as the first day.
    let (_, deck) = schedule(&card, &deck, Rating::Good, now).unwrap();
    assert_eq!(deck.streak, 1);
}

#[test]
fn test_rejects_card_of_other_deck() {
    let (mut card, deck, now) = fixtures(0.0, 2.5, true);
    card.deck_id = 8;
    assert_eq!(
        schedule(&card, &deck, Rating::Good, now),
        Err(ScheduleError::DeckCardMismatch {
            card_id: 1,
            card_deck_id: 8,
            deck_id: 7
        })
    );
}

#[test]
fn test_rejects_corrupted_state() {
    let (card, deck, now) = fixtures(-1.0, 2.5, true);
    assert_eq!(
        schedule(&card, &deck, Rating::Good, now).unwrap_err().to_string(),
        "card 1 has an invalid interval: -1"
    );
    let (card, deck, now) = fixtures(1.0, f64::NAN, true);
    assert!(matches!(
        schedule(&card, &deck, Rating::Good, now),
        Err(ScheduleError::InvalidCardState {
            field: "ease factor",
            ..
        })
    ));
}

#[test]
fn test_interval_overflow() {
    let (card, deck, now) = fixtures(1e300, 2.5, true);
    assert!(matches!(
        schedule(&card, &deck, Rating::Good, now),
        Err(ScheduleError::IntervalOverflow { card_id: 1, .. })
    ));
}

#[test]
fn test_reset_progress_only_touches_deck() {
    let (mut card, mut deck, now) = fixtures(6.0, 1.9, true);
    deck.unseen_count = 4;
    let mut other = card.clone();
    other.deck_id = 9;
    card.next_shown = now + TimeDelta::days(6);
    let later = now + TimeDelta::hours(1);
    let mut cards = vec![card, other.clone()];

    reset_progress(&mut deck, &mut cards, later);

    assert!(!cards[0].seen);
    assert_eq!(cards[0].interval, 0.0);
    assert_eq!(cards[0].next_shown, later);
    assert_eq!(cards[0].ease_factor, 1.9);
    assert_eq!(cards[1], other);
    assert_eq!(deck.unseen_count, 0);
    assert_eq!(deck.streak, 3);
}
