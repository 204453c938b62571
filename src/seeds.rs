//! Canned content served when the model is unavailable or answers garbage.
//!
//! These payloads are schema-conforming so a frontend can always render them;
//! the HTTP layer pairs them with a 500 status.

use rand::seq::SliceRandom;

use crate::domain::{Question, Rarity, ResultPayload};

/// Emergency question set. Deliberately shorter than a real session.
pub fn fallback_questions(locale: &str) -> Vec<Question> {
  let q = |question: &str, options: [&str; 3]| Question {
    question: question.into(),
    options: options.iter().map(|o| o.to_string()).collect(),
  };
  match locale {
    "ko" => vec![
      q("AI가 응답하지 않습니다. 당신 탓인 것 같습니다. 어떻게 하시겠습니까?", ["내 탓을 한다", "AI 탓을 한다", "인터넷 탓을 한다"]),
      q("비상용 질문이 나타났습니다. 왠지 희귀한 결과를 볼 수 있을 것 같습니다. 기분이 어떻습니까?", ["오히려 좋아", "찝찝하다", "아무 생각 없다"]),
    ],
    _ => vec![
      q("The AI isn't responding. It's probably your fault. What do you do?", ["Blame myself", "Blame the AI", "Blame the internet"]),
      q("Emergency questions have appeared. You sense a rare result coming. How do you feel?", ["Even better", "Uneasy", "Nothing at all"]),
    ],
  }
}

/// "Unpredictable chaos" result. Epic at percentile 10, consistent with the rarity rule.
pub fn fallback_result(locale: &str) -> ResultPayload {
  let tags = |t: [&str; 3]| t.iter().map(|s| s.to_string()).collect::<Vec<_>>();
  match locale {
    "ko" => ResultPayload {
      kind: "🌀 예측불가 혼돈형".into(),
      summary: "당신의 선택은 AI마저 혼란에 빠뜨렸습니다! 기존의 유형으로는 도저히 분석할 수 없는 미지의 존재입니다.".into(),
      advice: "가끔은 예측 가능한 선택을 해보는 건 어떨까요? 물론, 그럴 리 없겠지만요.".into(),
      quote: "분석? 그게 뭔데. 난 내 길을 간다.".into(),
      badge: "미지의 존재".into(),
      rarity: Rarity::Epic,
      tags: tags(["혼돈", "예측불가", "유니크"]),
      percentile: 10,
    },
    _ => ResultPayload {
      kind: "🌀 Unpredictable Chaos".into(),
      summary: "Your choices confused even the AI! No existing type can describe an entity as unknowable as you.".into(),
      advice: "Maybe try a predictable choice once in a while? Not that you ever would.".into(),
      quote: "Analysis? What's that. I walk my own path.".into(),
      badge: "Unknown Entity".into(),
      rarity: Rarity::Epic,
      tags: tags(["Chaos", "Unpredictable", "Unique"]),
      percentile: 10,
    },
  }
}

/// Shown when the result analysis fails; the client goes back home.
pub fn analysis_failed_alert(locale: &str) -> &'static str {
  match locale {
    "ko" => "결과 분석 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.",
    _ => "Something went wrong while analyzing your result. Please try again in a moment.",
  }
}

const LOADING_MESSAGES_KO: &[&str] = &[
  "당신의 뇌파와 AI 동기화 중... (오류율: 42%)",
  "선택지에 숨겨진 무의식의 '찌질함'을 분석합니다.",
  "과거의 트라우마가 멸망에 미친 영향을 역산 중...",
  "AI가 당신의 성향을 비웃을 확률: 82%... 계산 완료.",
  "인류 데이터베이스에서 당신과 유사한 '관종' 유형 검색 중...",
  "최종 생존 프로파일링 완료. 곧 결과를 전송합니다.",
];

const LOADING_MESSAGES_EN: &[&str] = &[
  "Syncing your brainwaves with the AI... (error rate: 42%)",
  "Analyzing the unconscious pettiness hidden in your choices.",
  "Back-calculating how your past trauma affected the apocalypse...",
  "Probability the AI laughs at your personality: 82%... done.",
  "Searching humanity's database for attention-seekers like you...",
  "Final survival profiling complete. Transmitting results shortly.",
];

pub fn loading_messages(locale: &str) -> &'static [&'static str] {
  match locale {
    "ko" => LOADING_MESSAGES_KO,
    _ => LOADING_MESSAGES_EN,
  }
}

/// One random "analysis in progress" line for the loading screen.
pub fn random_loading_message(locale: &str) -> &'static str {
  loading_messages(locale)
    .choose(&mut rand::thread_rng())
    .copied()
    .unwrap_or("…")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fallbacks_are_schema_conforming() {
    for locale in ["en", "ko", "ja"] {
      for q in fallback_questions(locale) {
        q.validate().unwrap();
      }
      let mut r = fallback_result(locale);
      r.validate().unwrap();
      assert_eq!(r.normalize(), None, "fallback rarity must already match its percentile");
    }
  }

  #[test]
  fn loading_message_comes_from_the_locale_list() {
    let m = random_loading_message("ko");
    assert!(LOADING_MESSAGES_KO.contains(&m));
    assert!(LOADING_MESSAGES_EN.contains(&random_loading_message("de")));
  }
}
