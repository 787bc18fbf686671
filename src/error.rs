//! Errors raised by the scheduling core.
//!
//! The core only validates its inputs. Callers decide whether to abort or
//! repair the offending record.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    /// A rating outside 0..=3.
    #[error("rating {0} is out of range, expected 0, 1, 2 or 3")]
    InvalidRating(i64),

    /// A card handed in together with a deck it does not belong to.
    #[error("card {card_id} belongs to deck {card_deck_id}, not to deck {deck_id}")]
    DeckCardMismatch {
        card_id: u64,
        card_deck_id: u64,
        deck_id: u64,
    },

    /// Negative or non-finite scheduling state.
    #[error("card {card_id} has an invalid {field}: {value}")]
    InvalidCardState {
        card_id: u64,
        field: &'static str,
        value: f64,
    },

    /// The next review date does not fit into a timestamp.
    #[error("interval of {interval} days for card {card_id} is out of range")]
    IntervalOverflow { card_id: u64, interval: f64 },
}
