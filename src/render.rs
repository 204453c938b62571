//! Result card view: rarity theme, "top X%" framing and the share file name.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Rarity, ResultPayload};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Theme {
  pub key: &'static str,
  /// Tailwind background classes for the page and the card.
  pub background: &'static str,
  /// Card border; legendary gets the glowing variant.
  pub border: &'static str,
}

impl Theme {
  pub fn for_rarity(rarity: Rarity) -> Self {
    match rarity {
      Rarity::Common => Theme { key: "common", background: "bg-gray-900", border: "border-gray-700" },
      Rarity::Rare => Theme {
        key: "rare",
        background: "bg-gradient-to-br from-gray-900 to-blue-900/60",
        border: "border-gray-700",
      },
      Rarity::Epic => Theme {
        key: "epic",
        background: "bg-gradient-to-br from-gray-900 to-purple-900/60",
        border: "border-gray-700",
      },
      Rarity::Legendary => Theme {
        key: "legendary",
        background: "bg-gradient-to-br from-gray-900 to-yellow-900/50",
        border: "border-glow-legendary-plus",
      },
    }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct ResultView {
  pub result: ResultPayload,
  pub theme: Theme,
  pub top_percent: u8,
  pub share_file_name: String,
}

impl ResultView {
  pub fn new(result: ResultPayload, today: NaiveDate) -> Self {
    let theme = Theme::for_rarity(result.rarity);
    let top_percent = result.top_percent();
    let share_file_name = share_file_name(&result.kind, today);
    Self { result, theme, top_percent, share_file_name }
  }
}

/// `doomsday_{type}-{YYYYMMDD}.png`, whitespace in the type replaced by `_`.
pub fn share_file_name(kind: &str, date: NaiveDate) -> String {
  let kind = kind.trim();
  let label: String = if kind.is_empty() {
    "result".into()
  } else {
    kind.chars().map(|c| if c.is_whitespace() { '_' } else { c }).collect()
  };
  format!("doomsday_{}-{}.png", label, date.format("%Y%m%d"))
}
