//! Domain models: questions, answer history, personality result and rarity tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One dilemma question as produced by the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub question: String,
  pub options: Vec<String>,
}

pub const MIN_OPTIONS: usize = 3;
pub const MAX_OPTIONS: usize = 4;

impl Question {
  /// Structural check: non-empty text and 3 to 4 non-empty options.
  pub fn validate(&self) -> Result<(), String> {
    if self.question.trim().is_empty() {
      return Err("question text is empty".into());
    }
    let n = self.options.len();
    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&n) {
      return Err(format!("expected {}-{} options, got {}", MIN_OPTIONS, MAX_OPTIONS, n));
    }
    if self.options.iter().any(|o| o.trim().is_empty()) {
      return Err("empty option text".into());
    }
    Ok(())
  }
}

/// A single answered question. `selected` is always one of `options`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub question: String,
  #[serde(default)]
  pub options: Vec<String>,
  pub selected: String,
}

/// Four-tier label meant to follow the percentile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
  #[serde(alias = "common", alias = "COMMON")]
  Common,
  #[serde(alias = "rare", alias = "RARE")]
  Rare,
  #[serde(alias = "epic", alias = "EPIC")]
  Epic,
  #[serde(alias = "legendary", alias = "LEGENDARY")]
  Legendary,
}

impl Rarity {
  /// Common > 40, Rare (15, 40], Epic (5, 15], Legendary <= 5.
  pub fn from_percentile(percentile: u8) -> Self {
    match percentile {
      0..=5 => Rarity::Legendary,
      6..=15 => Rarity::Epic,
      16..=40 => Rarity::Rare,
      _ => Rarity::Common,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Rarity::Common => "Common",
      Rarity::Rare => "Rare",
      Rarity::Epic => "Epic",
      Rarity::Legendary => "Legendary",
    }
  }
}

impl fmt::Display for Rarity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Personality result returned by the model (and shown on the result card).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPayload {
  #[serde(rename = "type")]
  pub kind: String,
  pub summary: String,
  pub advice: String,
  pub quote: String,
  pub badge: String,
  pub rarity: Rarity,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(deserialize_with = "percentile_from_number")]
  pub percentile: u8,
}

/// Models sometimes answer `25.0` or `120`; accept any number and saturate.
fn percentile_from_number<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let raw = f64::deserialize(deserializer)?;
  if raw.is_nan() {
    return Err(serde::de::Error::custom("percentile is NaN"));
  }
  Ok(raw.round().clamp(0.0, 255.0) as u8)
}

impl ResultPayload {
  /// Reject payloads whose text fields are blank.
  pub fn validate(&self) -> Result<(), String> {
    let fields = [
      ("type", &self.kind),
      ("summary", &self.summary),
      ("advice", &self.advice),
      ("quote", &self.quote),
      ("badge", &self.badge),
    ];
    for (name, value) in fields {
      if value.trim().is_empty() {
        return Err(format!("field '{}' is empty", name));
      }
    }
    Ok(())
  }

  /// Clamp percentile into [1, 99], drop duplicate tags and force `rarity`
  /// to agree with the percentile. Returns the label the model sent when it
  /// had to be replaced.
  pub fn normalize(&mut self) -> Option<Rarity> {
    self.percentile = self.percentile.clamp(1, 99);

    let mut seen = Vec::with_capacity(self.tags.len());
    for tag in self.tags.drain(..) {
      let tag = tag.trim().to_string();
      if !tag.is_empty() && !seen.contains(&tag) {
        seen.push(tag);
      }
    }
    self.tags = seen;

    let expected = Rarity::from_percentile(self.percentile);
    if self.rarity != expected {
      let sent = self.rarity;
      self.rarity = expected;
      Some(sent)
    } else {
      None
    }
  }

  /// "Top X%" framing shown under the card.
  pub fn top_percent(&self) -> u8 {
    100u8.saturating_sub(self.percentile)
  }
}

/// Navigation destinations of the quiz flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
  #[serde(rename = "/")]
  Home,
  #[serde(rename = "/test")]
  Test,
  #[serde(rename = "/fail")]
  Fail,
  #[serde(rename = "/loading")]
  Loading,
  #[serde(rename = "/result")]
  Result,
}

impl Screen {
  pub fn path(&self) -> &'static str {
    match self {
      Screen::Home => "/",
      Screen::Test => "/test",
      Screen::Fail => "/fail",
      Screen::Loading => "/loading",
      Screen::Result => "/result",
    }
  }
}
