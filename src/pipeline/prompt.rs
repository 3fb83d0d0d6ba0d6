//! Stage Prompt Builders
//!
//! Pure functions producing the exact prompt string for each generation
//! stage. No side effects, no network, referentially transparent. The
//! target content language is fixed to Korean in the system prompt and is
//! not configurable per call.

use crate::constants::document;
use crate::types::ToneMode;

/// Fixed system prompt shared by every stage and provider
pub const SYSTEM_PROMPT: &str = "당신은 장소 방문 후기를 한국어로 작성하는 전문 작가입니다. \
항상 한국어로만 답변하고, 요청된 본문 외의 인사말이나 설명은 절대 덧붙이지 마세요.";

/// Positive-feature checklists by place type, interpolated into the
/// digest prompt so the model knows what counts as a positive aspect.
const PLACE_TYPE_CHECKLISTS: &str = "\
- 음식점: 맛, 신선도, 양, 플레이팅, 시그니처 메뉴, 재방문 의사
- 병원/의원: 진료 꼼꼼함, 친절한 설명, 대기 시간, 시설 청결
- 미용실/뷰티: 스타일 만족도, 상담 꼼꼼함, 손재주, 예약 편의
- 소매점: 상품 구성, 품질, 가격 대비 만족도, 진열
- 숙박: 객실 청결, 침구, 방음, 조식, 체크인 응대
- 관광지: 볼거리, 사진 명소, 동선, 계절 풍경
- 기타: 접근성, 주차, 직원 친절도, 분위기, 가성비";

fn tone_phrase(tone: ToneMode) -> &'static str {
    match tone {
        ToneMode::Gentle => "차분하고 따뜻한 말투로, 과장 없이 부드럽게 써주세요.",
        ToneMode::Casual => "친근하고 편안한 말투로, 실제 방문객이 이야기하듯 써주세요.",
        ToneMode::Energetic => "생동감 있고 활기찬 말투로, 즐거운 기분이 전해지게 써주세요.",
    }
}

fn numbered_reviews(reviews: &[String]) -> String {
    reviews
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r))
        .collect::<Vec<_>>()
        .join("\n")
}

fn impression_clause(impression: Option<&str>) -> String {
    match impression {
        Some(text) => format!(
            "\n\n방문자가 남긴 한 줄 소감: \"{}\"\n이 소감이 리뷰 내용과 크게 어긋나지 않는 경우에만 자연스럽게 녹여주세요. 어긋난다면 무시하세요.",
            text
        ),
        None => String::new(),
    }
}

/// Digest stage: summarize only the positive aspects of the corpus.
pub fn digest_prompt(reviews: &[String], impression: Option<&str>, tone: ToneMode) -> String {
    format!(
        "아래는 한 장소에 대한 실제 방문 리뷰들입니다.\n\n{reviews}\n\n\
위 리뷰들에서 긍정적인 면만 골라 핵심을 요약해주세요.\n\n\
장소 유형별로 주목할 긍정 요소:\n{checklists}\n\n\
규칙:\n\
- 불만, 단점, 부정적 표현(별로, 아쉽, 불친절, 더럽 등)은 절대 포함하지 마세요.\n\
- 리뷰에 실제로 언급된 내용만 사용하고, 없는 사실을 지어내지 마세요.\n\
- {tone}{impression}",
        reviews = numbered_reviews(reviews),
        checklists = PLACE_TYPE_CHECKLISTS,
        tone = tone_phrase(tone),
        impression = impression_clause(impression),
    )
}

/// Outline stage: exactly `section_count` MECE section titles.
pub fn outline_prompt(digest: &str, section_count: usize) -> String {
    format!(
        "아래 요약을 바탕으로 블로그 후기의 소제목을 정확히 {count}개 만들어주세요.\n\n\
요약:\n{digest}\n\n\
규칙:\n\
- {count}개의 소제목은 서로 겹치지 않고(상호배타), 전체적으로 장소의 장점을 빠짐없이 다루어야 합니다.\n\
- 한 줄에 하나씩만 적어주세요.\n\
- 존댓말 명사형으로 끝내고, 이모지는 소제목당 1개 이하로 사용하세요.\n\
- 번호, 마크다운 기호(#, *, -)는 붙이지 마세요.",
        count = section_count,
        digest = digest,
    )
}

/// Section stage: 3-4 paragraphs for exactly one named section.
pub fn section_prompt(title: &str, digest: &str) -> String {
    format!(
        "블로그 후기 중 \"{title}\" 섹션의 본문만 작성해주세요.\n\n\
전체 내용 요약:\n{digest}\n\n\
규칙:\n\
- 3~4개 문단으로 작성하세요.\n\
- 이 섹션의 주제만 다루고, 다른 섹션에서 다룰 내용은 반복하지 마세요.\n\
- 인사말, \"이번 섹션에서는\" 같은 도입 문구로 시작하지 마세요.\n\
- 마크다운 기호(#, *, -)를 사용하지 마세요.\n\
- 문장은 \"~요\", \"~습니다\"체로 끝내주세요.",
        title = title,
        digest = digest,
    )
}

/// Title stage: one short attractive title for the assembled body.
pub fn title_prompt(assembled_body: &str) -> String {
    format!(
        "아래 블로그 후기 본문에 어울리는 제목을 하나만 지어주세요.\n\n\
본문:\n{body}\n\n\
규칙:\n\
- {min}~{max}자 사이로, 장소의 핵심 매력이 드러나게 지어주세요.\n\
- 이모지는 2개 이하로 사용하세요.\n\
- 제목 한 줄만 출력하고 다른 말은 덧붙이지 마세요.",
        body = assembled_body,
        min = document::TITLE_MIN_CHARS,
        max = document::TITLE_MAX_CHARS,
    )
}

/// Visitor-review stage: one flat paragraph, no outline or sections.
pub fn visitor_prompt(reviews: &[String], impression: Option<&str>, tone: ToneMode) -> String {
    format!(
        "아래는 한 장소에 대한 실제 방문 리뷰들입니다.\n\n{reviews}\n\n\
이 리뷰들을 바탕으로 실제 방문객이 남길 법한 짧은 방문자 리뷰를 한 문단으로 작성해주세요.\n\n\
규칙:\n\
- 3~5문장, 한 문단으로만 작성하세요.\n\
- 긍정적인 면만 담고, 부정적 표현은 쓰지 마세요.\n\
- 인사말이나 설명 없이 리뷰 본문만 출력하세요.\n\
- {tone}{impression}",
        reviews = numbered_reviews(reviews),
        tone = tone_phrase(tone),
        impression = impression_clause(impression),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec!["맛있어요 진짜 강추".to_string(), "분위기 좋고 친절해요".to_string()]
    }

    #[test]
    fn test_digest_prompt_contains_reviews_and_checklists() {
        let prompt = digest_prompt(&corpus(), None, ToneMode::Casual);
        assert!(prompt.contains("맛있어요 진짜 강추"));
        assert!(prompt.contains("분위기 좋고 친절해요"));
        assert!(prompt.contains("음식점"));
        assert!(prompt.contains("숙박"));
        assert!(prompt.contains("부정적 표현"));
    }

    #[test]
    fn test_digest_prompt_impression_is_conditional() {
        let without = digest_prompt(&corpus(), None, ToneMode::Casual);
        assert!(!without.contains("한 줄 소감"));

        let with = digest_prompt(&corpus(), Some("데이트 장소로 최고"), ToneMode::Casual);
        assert!(with.contains("데이트 장소로 최고"));
        assert!(with.contains("어긋나지 않는 경우에만"));
    }

    #[test]
    fn test_tone_steering_varies() {
        let gentle = digest_prompt(&corpus(), None, ToneMode::Gentle);
        let energetic = digest_prompt(&corpus(), None, ToneMode::Energetic);
        assert_ne!(gentle, energetic);
        assert!(gentle.contains("차분"));
        assert!(energetic.contains("활기찬"));
    }

    #[test]
    fn test_outline_prompt_requests_exact_count() {
        let prompt = outline_prompt("좋은 요약", 6);
        assert!(prompt.contains("정확히 6개"));
        assert!(prompt.contains("좋은 요약"));
    }

    #[test]
    fn test_section_prompt_names_its_section() {
        let prompt = section_prompt("감동적인 맛", "요약 내용");
        assert!(prompt.contains("\"감동적인 맛\""));
        assert!(prompt.contains("요약 내용"));
        assert!(prompt.contains("반복하지 마세요"));
    }

    #[test]
    fn test_title_prompt_carries_body() {
        let prompt = title_prompt("본문 텍스트");
        assert!(prompt.contains("본문 텍스트"));
        assert!(prompt.contains("15~25자"));
    }

    #[test]
    fn test_visitor_prompt_is_flat_paragraph_request() {
        let prompt = visitor_prompt(&corpus(), None, ToneMode::Casual);
        assert!(prompt.contains("한 문단"));
        assert!(!prompt.contains("소제목"));
    }

    #[test]
    fn test_builders_are_deterministic() {
        let a = digest_prompt(&corpus(), Some("좋아요"), ToneMode::Gentle);
        let b = digest_prompt(&corpus(), Some("좋아요"), ToneMode::Gentle);
        assert_eq!(a, b);
    }
}
