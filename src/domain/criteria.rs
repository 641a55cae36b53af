//! # 조회 조건 (Criteria) 구성
//!
//! 불변 트리로 표현되는 조회 조건입니다. 리프는 `is`, `in`, `regex` 조건이고,
//! 내부 노드는 `And` / `Or` 입니다.
//!
//! ## 병합 규칙
//!
//! 최상위 노드가 이미 같은 종류의 논리 노드라면 새 조건은 그 노드의 자식으로
//! 추가됩니다. `AND(AND(AND(...)))` 같은 중첩은 만들어지지 않습니다.
//! 병합은 항상 새 값을 반환하며 원본 조건은 변경되지 않으므로,
//! 같은 조건 값을 여러 호출에서 재사용해도 안전합니다.
//!
//! ```rust,ignore
//! use mongo_support::domain::criteria::Criteria;
//!
//! let base = Criteria::is("status", "open").and([Criteria::is("priority", 1)]);
//! let narrowed = base.and([Criteria::contains("title", "a.b*c")]);
//!
//! assert_eq!(narrowed.children().len(), 3);
//! assert_eq!(base.children().len(), 2);
//! ```

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};

use crate::errors::{DataError, DataResult};
use crate::utils::string_utils::{
    clean_optional_str, escape_for_substring_search, validate_field_path,
};

/// 저장소의 식별자 필드 이름
pub const ID_FIELD: &str = "_id";

/// 논리 삭제 플래그 필드 이름
pub const DELETED_FIELD: &str = "deleted";

/// 엔티티 필드 이름을 저장소 필드 이름으로 변환합니다. `id` 는 `_id` 의 별칭입니다.
pub(crate) fn storage_field(field: &str) -> &str {
    if field == "id" { ID_FIELD } else { field }
}

/// 조회 조건 트리
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    /// `field == value`
    Is { field: String, value: Bson },
    /// `field ∈ values`
    In { field: String, values: Vec<Bson> },
    /// `field =~ pattern`
    Regex {
        field: String,
        pattern: String,
        case_insensitive: bool,
    },
    /// 모든 자식 조건을 만족 (자식이 없으면 전체 매칭)
    And(Vec<Criteria>),
    /// 자식 조건 중 하나 이상을 만족
    Or(Vec<Criteria>),
}

impl Criteria {
    /// 모든 문서와 매칭되는 빈 조건
    pub fn all() -> Self {
        Criteria::And(Vec::new())
    }

    pub fn is(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Criteria::Is {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        Criteria::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn regex(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Criteria::Regex {
            field: field.into(),
            pattern: pattern.into(),
            case_insensitive: false,
        }
    }

    pub fn regex_ignore_case(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Criteria::Regex {
            field: field.into(),
            pattern: pattern.into(),
            case_insensitive: true,
        }
    }

    /// 대소문자를 무시하는 부분 문자열 검색 조건
    ///
    /// 입력은 trim 후 [`escape_for_substring_search`]로 이스케이프되어
    /// `^.*<text>.*$` 패턴으로 만들어집니다.
    pub fn contains(field: impl Into<String>, text: &str) -> Self {
        let escaped = escape_for_substring_search(text.trim());
        Criteria::regex_ignore_case(field, format!("^.*{}.*$", escaped))
    }

    /// 식별자 동등 조건
    pub fn by_id(id: ObjectId) -> Self {
        Criteria::is(ID_FIELD, id)
    }

    /// AND 병합
    ///
    /// 현재 조건이 이미 `And` 노드면 자식 목록을 확장한 새 노드를, 아니면
    /// 현재 조건과 새 조건들을 감싼 새 `And` 노드를 반환합니다.
    /// 새 조건이 없으면 현재 조건을 그대로 반환합니다.
    pub fn and<I>(&self, more: I) -> Criteria
    where
        I: IntoIterator<Item = Criteria>,
    {
        let more: Vec<Criteria> = more.into_iter().collect();
        if more.is_empty() {
            return self.clone();
        }
        match self {
            Criteria::And(children) => {
                let mut merged = children.clone();
                merged.extend(more);
                Criteria::And(merged)
            }
            other => {
                let mut merged = Vec::with_capacity(more.len() + 1);
                merged.push(other.clone());
                merged.extend(more);
                Criteria::And(merged)
            }
        }
    }

    /// OR 병합. 규칙은 [`Criteria::and`]와 같습니다.
    pub fn or<I>(&self, more: I) -> Criteria
    where
        I: IntoIterator<Item = Criteria>,
    {
        let more: Vec<Criteria> = more.into_iter().collect();
        if more.is_empty() {
            return self.clone();
        }
        match self {
            Criteria::Or(children) => {
                let mut merged = children.clone();
                merged.extend(more);
                Criteria::Or(merged)
            }
            other => {
                let mut merged = Vec::with_capacity(more.len() + 1);
                merged.push(other.clone());
                merged.extend(more);
                Criteria::Or(merged)
            }
        }
    }

    /// 논리 삭제 플래그 조건을 명시적으로 추가합니다.
    ///
    /// `Some(flag)` 이면 `deleted == flag` 조건을 AND 로 추가하고,
    /// `None` 이면 조건을 그대로 반환합니다. 삭제된 문서를 암묵적으로
    /// 제외하는 기본 동작은 없습니다.
    pub fn with_deleted(&self, deleted: Option<bool>) -> Criteria {
        match deleted {
            Some(flag) => self.and([Criteria::is(DELETED_FIELD, flag)]),
            None => self.clone(),
        }
    }

    /// 검색어가 있을 때만 부분 문자열 검색 조건을 AND 로 추가합니다.
    pub fn with_contains(&self, field: impl Into<String>, text: Option<&str>) -> Criteria {
        match clean_optional_str(text) {
            Some(text) => self.and([Criteria::contains(field, text)]),
            None => self.clone(),
        }
    }

    /// 논리 노드의 자식 목록. 리프 조건은 빈 슬라이스를 반환합니다.
    pub fn children(&self) -> &[Criteria] {
        match self {
            Criteria::And(children) | Criteria::Or(children) => children,
            _ => &[],
        }
    }

    /// 저장소 필터 문서로 변환합니다.
    ///
    /// 모든 필드 경로와 정규식을 검증하며, 잘못된 입력은
    /// `MalformedCriteriaError`로 반환됩니다.
    pub fn to_document(&self) -> DataResult<Document> {
        match self {
            Criteria::Is { field, value } => {
                validate_field_path(field)?;
                let field = storage_field(field);
                // 연산자처럼 보이는 문서 값은 $eq 로 감싸 연산자 주입을 막는다
                let operator_like = matches!(
                    value,
                    Bson::Document(d) if d.keys().any(|k| k.starts_with('$'))
                );
                if operator_like {
                    Ok(doc! { field: { "$eq": value.clone() } })
                } else {
                    Ok(doc! { field: value.clone() })
                }
            }
            Criteria::In { field, values } => {
                validate_field_path(field)?;
                Ok(doc! { storage_field(field): { "$in": values.clone() } })
            }
            Criteria::Regex {
                field,
                pattern,
                case_insensitive,
            } => {
                validate_field_path(field)?;
                fancy_regex::Regex::new(pattern).map_err(|e| {
                    DataError::MalformedCriteriaError(format!(
                        "invalid pattern for '{}': {}",
                        field, e
                    ))
                })?;
                let field = storage_field(field);
                if *case_insensitive {
                    Ok(doc! { field: { "$regex": pattern.as_str(), "$options": "i" } })
                } else {
                    Ok(doc! { field: { "$regex": pattern.as_str() } })
                }
            }
            Criteria::And(children) => match children.as_slice() {
                [] => Ok(Document::new()),
                [single] => single.to_document(),
                many => Ok(doc! { "$and": render_all(many)? }),
            },
            Criteria::Or(children) => match children.as_slice() {
                [] => Err(DataError::MalformedCriteriaError(
                    "$or requires at least one predicate".to_string(),
                )),
                [single] => single.to_document(),
                many => Ok(doc! { "$or": render_all(many)? }),
            },
        }
    }
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria::all()
    }
}

fn render_all(children: &[Criteria]) -> DataResult<Vec<Document>> {
    children.iter().map(Criteria::to_document).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: i32) -> Criteria {
        Criteria::is(format!("f{}", n), n)
    }

    #[test]
    fn test_and_extends_existing_and_node() {
        let existing = Criteria::And(vec![p(1), p(2)]);
        let merged = existing.and([p(3)]);

        assert_eq!(merged, Criteria::And(vec![p(1), p(2), p(3)]));
        assert!(merged.children().iter().all(|c| !matches!(c, Criteria::And(_))));
    }

    #[test]
    fn test_or_extends_existing_or_node() {
        let existing = Criteria::Or(vec![p(1), p(2)]);
        let merged = existing.or([p(3)]);

        assert_eq!(merged, Criteria::Or(vec![p(1), p(2), p(3)]));
    }

    #[test]
    fn test_repeated_and_stays_flat() {
        let merged = p(1).and([p(2)]).and([p(3)]).and([p(4), p(5)]);

        assert_eq!(merged.children().len(), 5);
        assert!(merged.children().iter().all(|c| c.children().is_empty()));
    }

    #[test]
    fn test_and_on_or_node_wraps_it() {
        let existing = Criteria::Or(vec![p(1), p(2)]);
        let merged = existing.and([p(3)]);

        assert_eq!(merged, Criteria::And(vec![existing.clone(), p(3)]));
    }

    #[test]
    fn test_merge_does_not_mutate_original() {
        let base = Criteria::And(vec![p(1)]);
        let _first = base.and([p(2)]);
        let _second = base.and([p(3)]);

        assert_eq!(base, Criteria::And(vec![p(1)]));
    }

    #[test]
    fn test_merge_with_nothing_is_noop() {
        let existing = Criteria::Or(vec![p(1), p(2)]);

        assert_eq!(existing.and(Vec::new()), existing);
        assert_eq!(existing.or(Vec::new()), existing);
    }

    #[test]
    fn test_with_deleted() {
        let base = Criteria::is("status", "open");

        assert_eq!(base.with_deleted(None), base);
        assert_eq!(
            base.with_deleted(Some(false)),
            Criteria::And(vec![base.clone(), Criteria::is("deleted", false)])
        );
    }

    #[test]
    fn test_with_contains_skips_blank_text() {
        let base = Criteria::all();

        assert_eq!(base.with_contains("title", None), base);
        assert_eq!(base.with_contains("title", Some("   ")), base);
        assert_eq!(base.with_contains("title", Some("x")).children().len(), 1);
    }

    #[test]
    fn test_render_leaves_and_nodes() {
        let criteria = Criteria::is("status", "open")
            .and([Criteria::is_in("tag", ["a", "b"])])
            .and([Criteria::regex("name", "^A")]);

        let rendered = criteria.to_document().unwrap();

        assert_eq!(
            rendered,
            doc! { "$and": [
                { "status": "open" },
                { "tag": { "$in": ["a", "b"] } },
                { "name": { "$regex": "^A" } },
            ] }
        );
    }

    #[test]
    fn test_render_maps_id_alias() {
        let id = ObjectId::new();

        assert_eq!(Criteria::is("id", id).to_document().unwrap(), doc! { "_id": id });
    }

    #[test]
    fn test_render_empty_and_single_child() {
        assert_eq!(Criteria::all().to_document().unwrap(), Document::new());
        assert_eq!(
            Criteria::And(vec![p(1)]).to_document().unwrap(),
            doc! { "f1": 1 }
        );
    }

    #[test]
    fn test_render_wraps_operator_like_values() {
        let rendered = Criteria::is("meta", doc! { "$gt": 1 }).to_document().unwrap();

        assert_eq!(rendered, doc! { "meta": { "$eq": { "$gt": 1 } } });
    }

    #[test]
    fn test_contains_renders_escaped_case_insensitive_pattern() {
        let rendered = Criteria::contains("title", " a.b*c ").to_document().unwrap();

        assert_eq!(
            rendered,
            doc! { "title": { "$regex": r"^.*a\.b\*c.*$", "$options": "i" } }
        );
    }

    #[test]
    fn test_look_around_and_backreference_patterns_render() {
        assert_eq!(
            Criteria::regex("title", "^(?!admin).*").to_document().unwrap(),
            doc! { "title": { "$regex": "^(?!admin).*" } }
        );
        assert_eq!(
            Criteria::regex_ignore_case("code", r"^(ab)\1$").to_document().unwrap(),
            doc! { "code": { "$regex": r"^(ab)\1$", "$options": "i" } }
        );
    }

    #[test]
    fn test_malformed_criteria() {
        assert!(matches!(
            Criteria::is("", 1).to_document(),
            Err(DataError::MalformedCriteriaError(_))
        ));
        assert!(matches!(
            Criteria::regex("name", "(unclosed").to_document(),
            Err(DataError::MalformedCriteriaError(_))
        ));
        assert!(matches!(
            Criteria::regex("name", r"(a)\2").to_document(),
            Err(DataError::MalformedCriteriaError(_))
        ));
        assert!(matches!(
            Criteria::Or(Vec::new()).to_document(),
            Err(DataError::MalformedCriteriaError(_))
        ));
        assert!(matches!(
            Criteria::is("ok", 1).and([Criteria::is("$where", 1)]).to_document(),
            Err(DataError::MalformedCriteriaError(_))
        ));
    }
}
