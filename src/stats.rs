use crate::models::Card;
use crate::schedule::expire_streak;
use crate::select::select_due_with_limit;
use crate::store::CardBox;
use crate::utils::plural;
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use rand::Rng;
use std::fmt;
use std::fmt::Write;
use std::path::Path;

#[derive(Default)]
struct Counts {
    unseen: u64,
    today: u64,
    day: u64,
    week: u64,
    month: u64,
    quarter: u64,
    year: u64,
    more: u64,
}

impl Counts {
    fn increment_count(&mut self, card: &Card) {
        if !card.seen {
            self.unseen += 1;
            return;
        }
        match card.interval as i64 {
            0 => self.today += 1,
            1 => self.day += 1,
            2..7 => self.week += 1,
            7..30 => self.month += 1,
            30..90 => self.quarter += 1,
            90..365 => self.year += 1,
            _ => self.more += 1,
        }
    }

    fn total(&self) -> u64 {
        self.unseen
            + self.today
            + self.day
            + self.week
            + self.month
            + self.quarter
            + self.year
            + self.more
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            concat!(
                "Review intervals:\n",
                "  new      {}\n",
                "  <day     {}\n",
                "  =day     {}\n",
                "  <week    {}\n",
                "  <month   {}\n",
                "  <quarter {}\n",
                "  <year    {}\n",
                "  >=year   {}\n\n",
                "Total: {}"
            ),
            self.unseen,
            self.today,
            self.day,
            self.week,
            self.month,
            self.quarter,
            self.year,
            self.more,
            self.total(),
        )
    }
}

pub fn stats(dir: &Path, daily_new_cards: u32) -> Result<()> {
    let card_box = CardBox::load(dir)?;
    let now = Local::now().naive_local();
    println!("{}", summarize(&card_box, now, daily_new_cards, &mut rand::rng())?);
    Ok(())
}

/// One line per deck followed by the interval histogram of all cards.
fn summarize<R: Rng>(
    card_box: &CardBox,
    now: NaiveDateTime,
    daily_new_cards: u32,
    rng: &mut R,
) -> Result<String> {
    let mut out = String::new();
    for deck in &card_box.decks {
        let mut deck = deck.clone();
        expire_streak(&mut deck, now.date());
        let due = select_due_with_limit(
            &deck,
            card_box.cards_of(deck.id),
            now,
            rng,
            daily_new_cards,
        )?;
        writeln!(
            out,
            "{}: {} due, {}/{} new today, streak {} day{}",
            deck.name,
            due.len(),
            deck.unseen_today(now.date()),
            daily_new_cards,
            deck.streak,
            plural(deck.streak as usize),
        )?;
    }
    if !card_box.decks.is_empty() {
        out.push('\n');
    }

    let mut counts = Counts::default();
    for card in &card_box.cards {
        counts.increment_count(card);
    }
    write!(out, "{}", counts)?;
    Ok(out)
}

#[test]
fn test_summarize() {
    use crate::models::Deck;
    use chrono::{NaiveDate, TimeDelta};
    use rand::{rngs::StdRng, SeedableRng};

    let now = NaiveDate::from_ymd_opt(2025, 5, 10)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let mut standard = Deck::new(1, String::from("Standard"), String::from("dana"), 12, now.date());
    standard.date = now.date() - TimeDelta::days(1);
    standard.streak = 4;
    standard.unseen_count = 3;
    let mut verbs = Deck::new(2, String::from("Verbs"), String::from("dana"), 1, now.date());
    verbs.date = now.date() - TimeDelta::days(5);
    verbs.streak = 9;

    let mut cards: Vec<Card> = (0..12)
        .map(|id| Card::new(id, 1, format!("w{}", id), format!("h{}", id), now))
        .collect();
    cards[0].seen = true;
    cards[0].interval = 8.0;
    cards[0].next_shown = now + TimeDelta::days(8);
    cards[1].seen = true;
    cards[1].interval = 0.0;
    let mut verb = Card::new(12, 2, String::from("to go"), String::from("ללכת"), now);
    verb.seen = true;
    verb.interval = 400.0;
    verb.next_shown = now - TimeDelta::days(1);
    cards.push(verb);

    let card_box = CardBox {
        decks: vec![standard, verbs],
        cards,
    };
    let summary = summarize(&card_box, now, 10, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(
        summary,
        "Standard: 11 due, 0/10 new today, streak 4 days\n\
        Verbs: 1 due, 0/10 new today, streak 0 days\n\
        \n\
        Review intervals:\n  \
        new      10\n  \
        <day     1\n  \
        =day     0\n  \
        <week    0\n  \
        <month   1\n  \
        <quarter 0\n  \
        <year    0\n  \
        >=year   1\n\n\
        Total: 13"
    );
}

