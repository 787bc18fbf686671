use crate::error::ScheduleError;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use struct_field_names_as_array::FieldNamesAsArray;

/// Ease factor of a card that has never been rated.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// A single vocabulary item and its scheduling state.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, FieldNamesAsArray)]
pub struct Card {
    pub id: u64,
    pub deck_id: u64,
    pub front: String,
    pub back: String,
    pub transliteration: Option<String>,
    pub seen: bool,
    pub next_shown: NaiveDateTime,
    pub ease_factor: f64,
    pub interval: f64,
}

impl Card {
    pub fn new(id: u64, deck_id: u64, front: String, back: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            deck_id,
            front,
            back,
            transliteration: None,
            seen: false,
            next_shown: now,
            ease_factor: INITIAL_EASE_FACTOR,
            interval: 0.0,
        }
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.next_shown <= now
    }
}

/// A named collection of cards plus its daily counters.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, FieldNamesAsArray)]
pub struct Deck {
    pub id: u64,
    pub name: String,
    pub owner: String,
    pub num_cards: u32,
    pub streak: u32,
    pub unseen_count: u32,
    pub date: NaiveDate,
}

impl Deck {
    /// Creates a deck whose counters were last touched yesterday, so the first
    /// rating starts a new day.
    pub fn new(id: u64, name: String, owner: String, num_cards: u32, today: NaiveDate) -> Self {
        Self {
            id,
            name,
            owner,
            num_cards,
            streak: 0,
            unseen_count: 0,
            date: today - TimeDelta::days(1),
        }
    }

    /// Number of new cards introduced on `today`. A counter left over from an
    /// earlier day counts as zero.
    pub fn unseen_today(&self, today: NaiveDate) -> u32 {
        if self.date == today {
            self.unseen_count
        } else {
            0
        }
    }
}

/// How well a card was recalled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rating {
    Wrong = 0,
    /// Correct.
    Good = 1,
    /// Correct, but with low confidence.
    Hard = 2,
    /// Correct, with high confidence.
    Easy = 3,
}

impl Rating {
    pub fn is_correct(self) -> bool {
        self != Rating::Wrong
    }
}

impl TryFrom<i64> for Rating {
    type Error = ScheduleError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rating::Wrong),
            1 => Ok(Rating::Good),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Easy),
            _ => Err(ScheduleError::InvalidRating(value)),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct ParseRatingError(String);

impl fmt::Display for ParseRatingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} is not a rating, expected 0, 1, 2 or 3", self.0)
    }
}

impl std::error::Error for ParseRatingError {}

impl FromStr for Rating {
    type Err = ParseRatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| Rating::try_from(n).ok())
            .ok_or_else(|| ParseRatingError(s.to_string()))
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

#[test]
fn test_rating_from_integer() {
    assert_eq!(Rating::try_from(0i64), Ok(Rating::Wrong));
    assert_eq!(Rating::try_from(3i64), Ok(Rating::Easy));
    assert_eq!(Rating::try_from(4i64), Err(ScheduleError::InvalidRating(4)));
    assert_eq!(Rating::try_from(-1i64), Err(ScheduleError::InvalidRating(-1)));
}

#[test]
fn test_rating_from_str() {
    assert_eq!(" 2 ".parse::<Rating>(), Ok(Rating::Hard));
    assert_eq!(
        "x".parse::<Rating>().unwrap_err().to_string(),
        "\"x\" is not a rating, expected 0, 1, 2 or 3"
    );
    assert!("7".parse::<Rating>().is_err());
}

#[test]
fn test_unseen_today_ignores_stale_counter() {
    let today = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
    let mut deck = Deck::new(1, String::from("Standard"), String::from("dana"), 3, today);
    deck.unseen_count = 7;
    assert_eq!(deck.unseen_today(today), 0);
    deck.date = today;
    assert_eq!(deck.unseen_today(today), 7);
}
