//! The preset card catalog loaded on first run.

use crate::card::NewCard;

/// The preset catalog: ten lab visitor cards, twenty general visitor cards,
/// and three specials. Seeding is insert-if-absent, so re-running never
/// duplicates anything.
pub fn default_catalog() -> Vec<NewCard> {
  let mut cards = Vec::with_capacity(33);

  for i in 1..=10 {
    let location = if i <= 4 { "119-1 Cabinet" } else { "118-2 Cabinet" };
    cards.push(preset(format!("Lab Visitor {i}"), 1000 + i, location));
  }
  for i in 1..=20 {
    let location = if i <= 10 {
      "Second Floor Admin"
    } else {
      "Third Floor Admin"
    };
    cards.push(preset(format!("Visitor {i}"), 2000 + i, location));
  }
  cards.push(preset("JHSC".into(), 3001, "118-1 Cabinet"));
  cards.push(preset("PHE 2".into(), 3002, "118-1 Cabinet"));
  cards.push(preset("Lab Manager Card".into(), 9000, "Lab Manager's Office"));

  cards
}

fn preset(label: String, code: u32, home_location: &str) -> NewCard {
  NewCard {
    label,
    code: Some(format!("{code:04}")),
    home_location: Some(home_location.to_owned()),
  }
}
