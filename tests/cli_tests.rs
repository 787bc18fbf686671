//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn lexdeck() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("lexdeck").unwrap()
}

fn init_box(tmp: &TempDir) -> std::path::PathBuf {
    let words = tmp.path().join("words.csv");
    fs::write(
        &words,
        "english,hebrew,transliteration\nwater,מים,mayim\nbread,לחם,lechem\n",
    )
    .unwrap();
    let card_box = tmp.path().join("box");
    lexdeck()
        .arg("init")
        .arg(&card_box)
        .arg(&words)
        .arg("--owner")
        .arg("dana")
        .assert()
        .success()
        .stdout(predicate::str::contains("with 2 cards in 1 deck"));
    card_box
}

fn stats(card_box: &Path) -> assert_cmd::assert::Assert {
    lexdeck().arg("stats").arg(card_box).assert().success()
}

#[test]
fn init_creates_box() {
    let tmp = TempDir::new().unwrap();
    let card_box = init_box(&tmp);
    assert!(card_box.join("decks.csv").exists());
    assert!(card_box.join("cards.csv").exists());
    stats(&card_box)
        .stdout(predicate::str::contains(
            "words: 2 due, 0/10 new today, streak 0 days",
        ))
        .stdout(predicate::str::contains("Total: 2"));
}

#[test]
fn init_refuses_existing_box() {
    let tmp = TempDir::new().unwrap();
    let card_box = init_box(&tmp);
    lexdeck()
        .arg("init")
        .arg(&card_box)
        .arg(tmp.path().join("words.csv"))
        .arg("--owner")
        .arg("dana")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn review_then_reset() {
    let tmp = TempDir::new().unwrap();
    let card_box = init_box(&tmp);

    lexdeck()
        .arg("review")
        .arg(&card_box)
        .arg("words")
        .arg("--seed")
        .arg("1")
        .write_stdin("\n1\n\n3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 cards due"))
        .stdout(predicate::str::contains("2 reviews. Done."));

    stats(&card_box).stdout(predicate::str::contains(
        "words: 0 due, 2/10 new today, streak 1 day\n",
    ));

    lexdeck()
        .arg("review")
        .arg(&card_box)
        .arg("words")
        .assert()
        .success()
        .stdout(predicate::str::contains("No cards due for review in words right now."));

    lexdeck()
        .arg("reset")
        .arg(&card_box)
        .assert()
        .success()
        .stdout(predicate::str::contains("Reset 1 deck"));

    stats(&card_box).stdout(predicate::str::contains(
        "words: 2 due, 0/10 new today, streak 1 day\n",
    ));
}

#[test]
fn review_respects_new_card_limit() {
    let tmp = TempDir::new().unwrap();
    let card_box = init_box(&tmp);

    lexdeck()
        .arg("review")
        .arg(&card_box)
        .arg("words")
        .arg("--new-per-day")
        .arg("1")
        .write_stdin("\n2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 card due"))
        .stdout(predicate::str::contains("1 review. Done."));
}

#[test]
fn add_deck_to_box() {
    let tmp = TempDir::new().unwrap();
    let card_box = init_box(&tmp);
    let verbs = tmp.path().join("verbs.csv");
    fs::write(&verbs, "english,hebrew\nto eat,לאכול\n").unwrap();

    lexdeck()
        .arg("add")
        .arg(&card_box)
        .arg(&verbs)
        .arg("--name")
        .arg("Verbs")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added deck Verbs"));

    stats(&card_box).stdout(predicate::str::contains(
        "Verbs: 1 due, 0/10 new today, streak 0 days",
    ));
}

#[test]
fn review_unknown_deck_fails() {
    let tmp = TempDir::new().unwrap();
    let card_box = init_box(&tmp);
    lexdeck()
        .arg("review")
        .arg(&card_box)
        .arg("Nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No deck named \"Nope\""));
}
