//! Spaced-repetition scheduling for vocabulary decks.
//!
//! [`schedule::schedule`] applies a rating to a card, [`select::select_due`]
//! picks the cards to show today. Both are pure and take the current time and
//! the source of randomness from the caller. The remaining modules make up the
//! `lexdeck` command-line tool around them.

pub mod add;
pub mod error;
pub mod init;
pub mod models;
pub mod reset;
pub mod review;
pub mod schedule;
pub mod seed;
pub mod select;
pub mod stats;
pub mod store;
pub mod utils;

pub use error::ScheduleError;
pub use models::{Card, Deck, Rating};
pub use schedule::schedule;
pub use select::select_due;
