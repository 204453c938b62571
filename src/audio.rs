//! Audio cue descriptors and fade-out plans.
//!
//! Playback happens in the browser; the backend only says which asset to
//! play, how loud, and how to ramp it down. A fade is a fixed number of
//! equal steps, so the client schedules one finite task instead of polling.

use std::time::Duration;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AudioCue {
  pub asset: &'static str,
  pub volume: f32,
  #[serde(rename = "loop")]
  pub looping: bool,
}

/// Home screen background noise.
pub const AMBIENT: AudioCue = AudioCue { asset: "/ambient-noise.mp3", volume: 0.5, looping: true };
/// Quiz alarm, looped while the countdown runs.
pub const EMERGENCY_ALERT: AudioCue = AudioCue { asset: "/emergency-alert.mp3", volume: 0.7, looping: true };
/// Start button click.
pub const CLICK: AudioCue = AudioCue { asset: "/click.mp3", volume: 0.7, looping: false };
/// Failure screen loop.
pub const DOOM: AudioCue = AudioCue { asset: "/doom-sound.mp3", volume: 0.7, looping: true };

pub const FADE_STEP: f32 = 0.05;
pub const FADE_INTERVAL: Duration = Duration::from_millis(30);

/// Linear ramp from `from` down to silence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FadePlan {
  pub from: f32,
  pub step: f32,
  #[serde(rename = "interval_ms", serialize_with = "as_millis")]
  pub interval: Duration,
  pub steps: u32,
}

pub(crate) fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
  s.serialize_u64(d.as_millis() as u64)
}

impl FadePlan {
  pub fn new(from: f32, step: f32, interval: Duration) -> Self {
    let from = from.clamp(0.0, 1.0);
    // Tolerance keeps 0.7 / 0.05 at 14 steps despite f32 rounding.
    let steps = if step <= 0.0 || from == 0.0 { 0 } else { (from / step - 1e-4).ceil() as u32 };
    Self { from, step, interval, steps }
  }

  pub fn for_cue(cue: &AudioCue) -> Self {
    Self::new(cue.volume, FADE_STEP, FADE_INTERVAL)
  }

  /// Volume after each step; the last entry is always 0 (pause point).
  pub fn volumes(&self) -> Vec<f32> {
    (1..=self.steps)
      .map(|i| (self.from - self.step * i as f32).max(0.0))
      .map(|v| if v < 1e-4 { 0.0 } else { v })
      .collect()
  }

  pub fn total(&self) -> Duration {
    self.interval * self.steps
  }
}
