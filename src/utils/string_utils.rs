//! # 문자열 유틸리티
//!
//! 필드 경로 검증과 패턴 매칭용 문자열 이스케이프 함수들입니다.

use crate::errors::DataError;

/// 패턴 매칭 언어에서 특수한 의미를 가지는 문자 목록
const REGEX_SPECIAL_CHARS: [char; 14] = [
    '\\', '$', '(', ')', '*', '+', '.', '[', ']', '?', '^', '{', '}', '|',
];

/// DBRef 에서 사용하는 예약 키. `$` 로 시작하지만 경로 세그먼트로 허용됩니다.
const DBREF_KEYS: [&str; 2] = ["$id", "$ref"];

/// 부분 문자열 검색 전에 정규식 특수 문자를 이스케이프합니다.
///
/// 사용자 입력을 그대로 `$regex` 조건에 넣으면 조회 의미가 바뀌거나
/// 저장소가 오류를 던지므로, 정규식을 만들기 전에 항상 이 함수를 거칩니다.
///
/// # 예제
/// ```rust,ignore
/// use mongo_support::utils::string_utils::escape_for_substring_search;
///
/// assert_eq!(escape_for_substring_search("a.b*c"), r"a\.b\*c");
/// ```
pub fn escape_for_substring_search(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if REGEX_SPECIAL_CHARS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// 필드 경로 검증
///
/// 빈 문자열, 빈 세그먼트(`a..b`), `$` 로 시작하는 세그먼트(DBRef 키 제외),
/// NUL 문자가 포함된 경로는 `MalformedCriteriaError`를 반환합니다.
///
/// # 인자
/// * `field` - 점(`.`)으로 구분된 필드 경로
///
/// # 반환값
/// * `Ok(())` - 유효한 경로
/// * `Err(DataError::MalformedCriteriaError)` - 잘못된 경로
pub fn validate_field_path(field: &str) -> Result<(), DataError> {
    if field.trim().is_empty() {
        return Err(DataError::MalformedCriteriaError(
            "field name must not be empty".to_string(),
        ));
    }
    if field.contains('\0') {
        return Err(DataError::MalformedCriteriaError(format!(
            "field name '{}' contains a NUL byte",
            field.escape_debug()
        )));
    }
    for segment in field.split('.') {
        if segment.is_empty() {
            return Err(DataError::MalformedCriteriaError(format!(
                "field name '{}' has an empty path segment",
                field
            )));
        }
        if segment.starts_with('$') && !DBREF_KEYS.contains(&segment) {
            return Err(DataError::MalformedCriteriaError(format!(
                "field name '{}' contains operator segment '{}'",
                field, segment
            )));
        }
    }
    Ok(())
}

/// 선택적 문자열 정리
///
/// None 이거나 공백만 있는 경우 None을, 그 외에는 trim 된 문자열을 반환합니다.
///
/// # 예제
/// ```rust,ignore
/// assert_eq!(clean_optional_str(Some("  Hi ")), Some("Hi"));
/// assert_eq!(clean_optional_str(Some("   ")), None);
/// ```
pub fn clean_optional_str(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
