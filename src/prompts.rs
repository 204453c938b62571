//! Prompt template registry: locale code -> prompt builders.
//!
//! The registry is built once at startup (optionally with TOML overrides) and
//! shared read-only. Korean and English carry native worked examples; every
//! other locale uses the English framing plus a hard directive to answer in
//! its own language. Unknown codes resolve to the default locale.

use std::collections::HashMap;

use crate::config::PromptOverride;
use crate::domain::HistoryEntry;
use crate::locale::DEFAULT_LOCALE;
use crate::util::fill_template;

/// Human-readable names used inside prompts.
#[derive(Clone, Copy, Debug)]
pub struct Language {
  pub code: &'static str,
  pub english_name: &'static str,
  pub native_name: &'static str,
}

pub const LANGUAGES: [Language; 20] = [
  Language { code: "en", english_name: "English", native_name: "English" },
  Language { code: "ko", english_name: "Korean", native_name: "한국어" },
  Language { code: "es", english_name: "Spanish", native_name: "Español" },
  Language { code: "ja", english_name: "Japanese", native_name: "日本語" },
  Language { code: "de", english_name: "German", native_name: "Deutsch" },
  Language { code: "fr", english_name: "French", native_name: "Français" },
  Language { code: "pt", english_name: "Portuguese", native_name: "Português" },
  Language { code: "ru", english_name: "Russian", native_name: "Русский" },
  Language { code: "zh", english_name: "Simplified Chinese", native_name: "简体中文" },
  Language { code: "it", english_name: "Italian", native_name: "Italiano" },
  Language { code: "ar", english_name: "Arabic", native_name: "العربية" },
  Language { code: "hi", english_name: "Hindi", native_name: "हिन्दी" },
  Language { code: "id", english_name: "Indonesian", native_name: "Bahasa Indonesia" },
  Language { code: "tr", english_name: "Turkish", native_name: "Türkçe" },
  Language { code: "vi", english_name: "Vietnamese", native_name: "Tiếng Việt" },
  Language { code: "pl", english_name: "Polish", native_name: "Polski" },
  Language { code: "nl", english_name: "Dutch", native_name: "Nederlands" },
  Language { code: "th", english_name: "Thai", native_name: "ไทย" },
  Language { code: "sv", english_name: "Swedish", native_name: "Svenska" },
  Language { code: "ms", english_name: "Malay", native_name: "Bahasa Melayu" },
];

type QuestionsFn = fn(&Language, usize) -> String;
type ResultFn = fn(&Language, &str) -> String;

#[derive(Clone)]
enum Template<F> {
  Builtin(F),
  Custom(String),
}

/// Both builders for a single locale.
#[derive(Clone)]
pub struct LocalePrompts {
  pub language: Language,
  questions: Template<QuestionsFn>,
  result: Template<ResultFn>,
}

impl LocalePrompts {
  fn builtin(language: Language) -> Self {
    let (questions, result): (QuestionsFn, ResultFn) = match language.code {
      "ko" => (questions_ko, result_ko),
      "en" => (questions_en, result_en),
      _ => (questions_directed, result_directed),
    };
    Self { language, questions: Template::Builtin(questions), result: Template::Builtin(result) }
  }

  pub fn questions_prompt(&self, count: usize) -> String {
    match &self.questions {
      Template::Builtin(f) => f(&self.language, count),
      Template::Custom(tpl) => fill_template(tpl, &[("count", &count.to_string())]),
    }
  }

  pub fn result_prompt(&self, history: &[HistoryEntry]) -> String {
    let transcript = format_history(history);
    match &self.result {
      Template::Builtin(f) => f(&self.language, &transcript),
      Template::Custom(tpl) => fill_template(tpl, &[("history", &transcript)]),
    }
  }
}

/// Immutable locale -> builders mapping.
#[derive(Clone)]
pub struct PromptRegistry {
  by_locale: HashMap<&'static str, LocalePrompts>,
  fallback: LocalePrompts,
}

impl PromptRegistry {
  pub fn builtin() -> Self {
    let by_locale = LANGUAGES.iter().map(|l| (l.code, LocalePrompts::builtin(*l))).collect();
    // LANGUAGES[0] is DEFAULT_LOCALE
    Self { by_locale, fallback: LocalePrompts::builtin(LANGUAGES[0]) }
  }

  /// Built-in templates with per-locale replacements. Overrides for codes
  /// outside the supported list are ignored.
  pub fn with_overrides(overrides: &HashMap<String, PromptOverride>) -> Self {
    let mut reg = Self::builtin();
    for (code, ov) in overrides {
      let Some(entry) = reg.by_locale.get_mut(code.as_str()) else {
        tracing::warn!(target: "doomsday", locale = %code, "Ignoring prompt override for unsupported locale");
        continue;
      };
      if let Some(q) = ov.questions.as_ref().filter(|s| !s.trim().is_empty()) {
        entry.questions = Template::Custom(q.clone());
      }
      if let Some(r) = ov.result.as_ref().filter(|s| !s.trim().is_empty()) {
        entry.result = Template::Custom(r.clone());
      }
    }
    if let Some(default) = reg.by_locale.get(DEFAULT_LOCALE) {
      reg.fallback = default.clone();
    }
    reg
  }

  /// Builders for `locale`, or the default locale's when unsupported.
  pub fn get(&self, locale: &str) -> &LocalePrompts {
    self.by_locale.get(locale).unwrap_or(&self.fallback)
  }

  pub fn questions_prompt(&self, locale: &str, count: usize) -> String {
    self.get(locale).questions_prompt(count)
  }

  pub fn result_prompt(&self, locale: &str, history: &[HistoryEntry]) -> String {
    self.get(locale).result_prompt(history)
  }

  pub fn len(&self) -> usize {
    self.by_locale.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_locale.is_empty()
  }
}

impl Default for PromptRegistry {
  fn default() -> Self {
    Self::builtin()
  }
}

/// One block per answer: `Q{n}: question` then `A: selected`, blank line between.
pub fn format_history(history: &[HistoryEntry]) -> String {
  history
    .iter()
    .enumerate()
    .map(|(i, h)| format!("Q{}: {}\nA: {}", i + 1, h.question, h.selected))
    .collect::<Vec<_>>()
    .join("\n\n")
}

// ---------------- Korean ----------------

fn questions_ko(_lang: &Language, count: usize) -> String {
  format!(
    r#"
너는 '지구 멸망 1분 전'을 주제로 황당하고 웃긴 심리테스트 질문을 만드는 AI다.
사용자의 본능적인 성향(이타심, 이기심, 쾌락주의, 찌질함, 관종력 등)이 드러나도록 정답이 없는 딜레마 상황을 제시해라.
서로 다른 유형의 질문 {count}개를 순수 JSON 배열로만 출력해라. 설명이나 마크다운은 절대 포함하지 마라.

[생성 절차]
1. 질문은 총 {count}개, 각 질문의 선택지는 3~4개.
2. 모든 질문은 지구 멸망 직전의 구체적인 '병맛' 시나리오여야 한다.
3. 선택지는 가치관의 갈등을 유발하고, 예상치 못한 방향으로 허를 찔러야 한다.
4. 음식 얘기만 하는 식으로 한 유형에 치우치지 말고 다양하게 구성해라.

[예시 1: 사소한 집착]
{{
  "question": "운석이 코앞에 떨어지는데, 넷플릭스 '다음화 자동재생'까지 5초 남았다. 당신의 선택은?",
  "options": ["당연히 다음화를 본다", "일단 잠시정지 후 창밖을 본다", "어차피 죽을 거, 넷플릭스 계정 삭제한다"]
}}
[예시 2: 인간관계]
{{
  "question": "옆집 웬수가 '같이 살자'며 현관문을 미친듯이 두드린다. 당신의 선택은?",
  "options": ["이때다 싶어 문을 잠근다", "일단 열어주고 상황을 본다", "인터폰에 대고 마지막 욕을 시전한다"]
}}
[예시 3: 흑역사]
{{
  "question": "마지막 순간, 브라우저에 당신의 흑역사 검색기록이 그대로 남아있다. 어떻게 할까?",
  "options": ["어차피 다 죽는데 그냥 둔다", "컴퓨터 본체를 부순다", "가장 부끄러운 기록 하나만 지운다"]
}}
[예시 4: 마지막 SNS]
{{
  "question": "지구 멸망이 확정된 지금, SNS에 마지막 게시물을 올릴 수 있다. 무엇을 올릴 것인가?",
  "options": ["'#지구멸망 #마지막날' 해시태그와 함께 셀카를 올린다", "가족/친구에게 마지막 편지를 쓴다", "아무도 안 궁금해할 TMI를 방출한다", "좋아요를 가장 많이 받았던 게시물을 재업로드한다"]
}}
"#
  )
}

fn result_ko(_lang: &Language, history: &str) -> String {
  format!(
    r#"
당신은 사용자의 선택을 분석해 독창적인 '병맛 유형'을 부여하는 심리 분석 AI다.
선택 기록에서 이타성, 생존 본능, 현실도피, 리더십 등의 경향을 파악해라.
반드시 아래 예시와 같은 JSON 객체 하나로만 응답해라. 마크다운이나 설명은 금지한다.

[분석 절차]
1. 선택 기록 전체를 읽고 일관된 성향을 찾는다.
2. 그 성향에 이모지를 포함한 유형 이름(type)과 배지(badge)를 붙인다.
3. summary, advice, quote, tags(3개)를 작성한다.
4. percentile(1~99)을 정하고 아래 규칙대로 rarity를 정한다.

[매우 중요한 평가 기준]
결과를 매우 엄격하고 '짜게' 평가해라. 대부분의 평범하거나 약간 이기적인 선택은 'Common' 등급과 높은 percentile(40~99)을 받아야 한다.
'Legendary'(percentile 1~5)는 예측 불가능하고 일관된 광기를 보여주는 극소수의 조합에만 부여해라.

{rule}

---
[예시 1: 이기적 쾌락주의 유형 (Common)]
{{
  "type": "🚀 최후의 만찬 집행관",
  "summary": "세상이 끝나도 나의 즐거움은 끝나지 않아! 위기 속에서도 자신의 행복을 최우선으로 추구하는 순수 본능주의자입니다.",
  "advice": "그 만찬, 혼자보단 둘이 더 맛있을지도? 주변을 한번 둘러보세요.",
  "quote": "내일 지구가 멸망해도 나는 한 그릇의 라면을 먹겠다.",
  "badge": "쾌락주의자",
  "rarity": "Common",
  "tags": ["본능형", "마이웨이", "현재지향"],
  "percentile": 68
}}
---
[예시 2: 영웅적 이타주의 유형 (Rare)]
{{
  "type": "✨ 고양이 행성의 수호자",
  "summary": "나보다 작은 생명을 구하는 데서 삶의 의미를 찾습니다. 혼돈 속에서도 따뜻함을 잃지 않는 진정한 영웅입니다.",
  "advice": "모두를 구할 순 없어요. 때로는 자신을 먼저 챙기는 용기도 필요합니다.",
  "quote": "내 세상이 무너져도, 너의 세상은 지켜줄게.",
  "badge": "이타주의자",
  "rarity": "Rare",
  "tags": ["영웅형", "이타적", "관계지향"],
  "percentile": 25
}}
---
[예시 3: 소심한 현실도피 유형 (Common)]
{{
  "type": "💻 인터넷 익스플로러",
  "summary": "위기가 닥치자 문제를 해결하기보다 익숙하고 안전한 가상 세계로 도피합니다. 모든 게 끝나면 괜찮아질 거라 믿고 싶어 합니다.",
  "advice": "가끔은 로그아웃하고 창밖을 보세요. 물론 지금은 보면 안 됩니다.",
  "quote": "일단... F5 한번 눌러보자.",
  "badge": "현실도피자",
  "rarity": "Common",
  "tags": ["회피형", "안전지향", "내향적"],
  "percentile": 85
}}
---
[실제 분석 요청]
{history}
"#,
    rule = RARITY_RULE_KO,
  )
}

const RARITY_RULE_KO: &str = r#"'rarity'는 'percentile' 값으로 결정된다:
- "Common": percentile > 40
- "Rare": 15 < percentile <= 40
- "Epic": 5 < percentile <= 15
- "Legendary": percentile <= 5"#;

// ---------------- English (and the directed variants) ----------------

const RARITY_RULE_EN: &str = r#"'rarity' is determined by 'percentile':
- "Common": percentile > 40
- "Rare": 15 < percentile <= 40
- "Epic": 5 < percentile <= 15
- "Legendary": percentile <= 5"#;

const QUESTION_EXAMPLES_EN: &str = r#"[Example 1: petty obsession]
{
  "question": "A meteor is about to hit, and Netflix's 'next episode' autoplay starts in 5 seconds. What do you do?",
  "options": ["Obviously watch the next episode", "Pause it and glance out the window", "We're all dying anyway, delete the Netflix account"]
}
[Example 2: relationships]
{
  "question": "Your nemesis from next door is pounding on your door begging to shelter with you. What do you do?",
  "options": ["Lock the door, this is my moment", "Open up and see how it goes", "Deliver one final insult through the intercom"]
}
[Example 3: embarrassing past]
{
  "question": "In the final moments, your most embarrassing search history is still sitting in your browser. What now?",
  "options": ["Leave it, everyone's doomed anyway", "Smash the computer", "Delete only the single most shameful entry"]
}
[Example 4: last post]
{
  "question": "The end of the world is confirmed and you can publish one last social media post. What do you post?",
  "options": ["A selfie tagged #EndOfTheWorld #LastDay", "A final letter to family and friends", "A flood of TMI nobody asked for", "Re-upload your most-liked post ever"]
}"#;

const RESULT_EXAMPLES_EN: &str = r#"[Example 1: selfish hedonist (Common)]
{
  "type": "🚀 Last Supper Executor",
  "summary": "The world may end, but the fun never does! Even in a crisis you put your own happiness first, a pure creature of instinct.",
  "advice": "That last supper might taste better shared. Take a look around you.",
  "quote": "Even if the world ends tomorrow, I will eat one more bowl of ramen.",
  "badge": "Hedonist",
  "rarity": "Common",
  "tags": ["Instinctive", "My Way", "Live in the Moment"],
  "percentile": 68
}
---
[Example 2: heroic altruist (Rare)]
{
  "type": "✨ Guardian of the Cat Planet",
  "summary": "You find meaning in saving lives smaller than your own. Even in chaos you stay warm, a true hero.",
  "advice": "You can't save everyone. Sometimes it takes courage to look after yourself first.",
  "quote": "Even if my world collapses, I'll protect yours.",
  "badge": "Altruist",
  "rarity": "Rare",
  "tags": ["Hero", "Selfless", "People-First"],
  "percentile": 25
}
---
[Example 3: timid escapist (Common)]
{
  "type": "💻 Internet Explorer",
  "summary": "When the crisis hits, you retreat into the familiar safety of the virtual world instead of facing reality, hoping it will all be fine once it's over.",
  "advice": "Log out and look out the window once in a while. Well, maybe not right now.",
  "quote": "Let's just... hit F5 and see.",
  "badge": "Escapist",
  "rarity": "Common",
  "tags": ["Avoidant", "Safety-First", "Introvert"],
  "percentile": 85
}"#;

fn questions_en(lang: &Language, count: usize) -> String {
  questions_english_framed(lang, count, "")
}

fn result_en(lang: &Language, history: &str) -> String {
  result_english_framed(lang, history, "")
}

fn questions_directed(lang: &Language, count: usize) -> String {
  questions_english_framed(lang, count, &language_directive(lang))
}

fn result_directed(lang: &Language, history: &str) -> String {
  result_english_framed(lang, history, &language_directive(lang))
}

fn language_directive(lang: &Language) -> String {
  format!(
    "\n[LANGUAGE]\nWrite every natural-language value (questions, options, type, summary, advice, quote, badge, tags) in {} ({}).\nThe examples below are in English for illustration only; do not copy their language. Keep JSON keys and the rarity labels in English.\n",
    lang.english_name, lang.native_name
  )
}

fn questions_english_framed(_lang: &Language, count: usize, directive: &str) -> String {
  format!(
    r#"
You are an AI that writes absurd, funny personality-test questions on the theme "1 minute before the end of the world".
Present dilemmas with no right answer that expose the user's instincts (altruism, selfishness, hedonism, pettiness, attention-seeking, and so on).
Output ONLY a pure JSON array of {count} questions of different kinds. Never include explanations or markdown.
{directive}
[Procedure]
1. Exactly {count} questions, each with 3 to 4 options.
2. Every question is a concrete, ridiculous scenario set right before the world ends.
3. Options must force a clash of values and go in unexpected directions.
4. Vary the kinds of questions; do not lean on a single theme (e.g. only food).

{examples}
"#,
    examples = QUESTION_EXAMPLES_EN,
  )
}

fn result_english_framed(_lang: &Language, history: &str, directive: &str) -> String {
  format!(
    r#"
You are a psychological-analysis AI that assigns an original, absurd personality "type" based on the user's choices.
Read the choice history and identify tendencies such as altruism, survival instinct, escapism and leadership.
Respond ONLY with a single JSON object shaped exactly like the examples. No markdown, no explanations.
{directive}
[Procedure]
1. Read the whole history and find a consistent tendency.
2. Give it a type name that starts with an emoji, and a badge.
3. Write summary, advice, quote and exactly 3 tags.
4. Pick a percentile (1-99) and set rarity with the rule below.

[CRITICAL GRADING RULE]
Grade strictly. Most ordinary or mildly selfish choices must get 'Common' and a high percentile (40-99).
'Legendary' (percentile 1-5) is reserved for the rare combination that shows unpredictable, consistent madness.

{rule}

---
{examples}
---
[Actual analysis request]
{history}
"#,
    rule = RARITY_RULE_EN,
    examples = RESULT_EXAMPLES_EN,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::locale::SUPPORTED_LOCALES;

  fn history() -> Vec<HistoryEntry> {
    vec![
      HistoryEntry { question: "Q one?".into(), options: vec!["a".into(), "b".into(), "c".into()], selected: "b".into() },
      HistoryEntry { question: "Q two?".into(), options: vec!["x".into(), "y".into(), "z".into()], selected: "z".into() },
    ]
  }

  #[test]
  fn every_supported_locale_is_registered() {
    assert_eq!(LANGUAGES[0].code, DEFAULT_LOCALE);
    let reg = PromptRegistry::builtin();
    assert_eq!(reg.len(), SUPPORTED_LOCALES.len());
    for code in SUPPORTED_LOCALES {
      assert_eq!(reg.get(code).language.code, code);
    }
  }

  #[test]
  fn every_locale_yields_worked_json_examples() {
    let reg = PromptRegistry::builtin();
    for code in SUPPORTED_LOCALES {
      let q = reg.questions_prompt(code, 5);
      assert!(q.contains("\"question\":") && q.contains("\"options\":"), "{code}");
      assert!(q.contains('5'), "{code}");

      let r = reg.result_prompt(code, &history());
      assert!(r.contains("\"percentile\":"), "{code}");
      assert!(r.contains("\"Legendary\": percentile <= 5"), "{code}");
      assert!(r.contains("Q2: Q two?\nA: z"), "{code}");
    }
  }

  #[test]
  fn unsupported_locale_falls_back_to_default_template() {
    let reg = PromptRegistry::builtin();
    assert_eq!(reg.questions_prompt("tlh", 5), reg.questions_prompt("en", 5));
    assert_eq!(reg.result_prompt("", &history()), reg.result_prompt("en", &history()));
  }

  #[test]
  fn directed_locales_name_their_language() {
    let reg = PromptRegistry::builtin();
    assert!(reg.questions_prompt("ja", 5).contains("Japanese (日本語)"));
    assert!(!reg.questions_prompt("en", 5).contains("[LANGUAGE]"));
    assert!(reg.questions_prompt("ko", 5).contains("지구 멸망"));
  }

  #[test]
  fn history_transcript_blocks() {
    assert_eq!(format_history(&history()), "Q1: Q one?\nA: b\n\nQ2: Q two?\nA: z");
    assert_eq!(format_history(&[]), "");
  }

  #[test]
  fn overrides_replace_only_named_templates() {
    let mut ov = HashMap::new();
    ov.insert("ko".to_string(), PromptOverride { questions: Some("N={count}".into()), result: None });
    ov.insert("tlh".to_string(), PromptOverride { questions: Some("ignored".into()), result: None });
    let reg = PromptRegistry::with_overrides(&ov);
    assert_eq!(reg.questions_prompt("ko", 5), "N=5");
    assert!(reg.result_prompt("ko", &history()).contains("Q1: Q one?"));
    assert_eq!(reg.len(), 20);
  }
}
