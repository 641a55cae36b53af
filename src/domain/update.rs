//! # 부분 업데이트 (Update) 구성
//!
//! 필드 단위 변경을 모아 `$set`, `$unset`, `$inc`, `$addToSet`, `$pull`, `$push`
//! 연산 문서로 렌더링합니다.
//!
//! 같은 필드에 대한 연산이 여러 번 추가되면 마지막 연산만 남습니다.
//! 덕분에 `set_or_unset` 을 같은 필드에 반복 호출해도 저장소가 거부하는
//! 충돌 업데이트(`$set` 과 `$unset` 이 같은 경로를 건드리는 경우)가 만들어지지 않습니다.

use mongodb::bson::{Bson, Document};

use crate::domain::criteria::{ID_FIELD, storage_field};
use crate::errors::{DataError, DataResult};
use crate::utils::string_utils::validate_field_path;

/// 업데이트 연산자. 선언 순서가 렌더링 순서입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateOp {
    Set,
    Unset,
    Inc,
    AddToSet,
    Pull,
    Push,
}

impl UpdateOp {
    const ALL: [UpdateOp; 6] = [
        UpdateOp::Set,
        UpdateOp::Unset,
        UpdateOp::Inc,
        UpdateOp::AddToSet,
        UpdateOp::Pull,
        UpdateOp::Push,
    ];

    fn operator(self) -> &'static str {
        match self {
            UpdateOp::Set => "$set",
            UpdateOp::Unset => "$unset",
            UpdateOp::Inc => "$inc",
            UpdateOp::AddToSet => "$addToSet",
            UpdateOp::Pull => "$pull",
            UpdateOp::Push => "$push",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// 필드 변경 집합
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    /// 연산자별 `필드 -> 값`. 인덱스는 [`UpdateOp::slot`].
    operations: [Document; UpdateOp::ALL.len()],
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.with(UpdateOp::Set, field.into(), value.into())
    }

    pub fn unset(self, field: impl Into<String>) -> Self {
        self.with(UpdateOp::Unset, field.into(), Bson::String(String::new()))
    }

    /// 값이 있으면 `$set`, 없으면 `$unset`
    ///
    /// "이 필드를 비운다"와 "이 필드를 설정한다"를 하나의 nullable 입력으로
    /// 처리하는 업데이트 기본 연산입니다.
    pub fn set_or_unset<V: Into<Bson>>(self, field: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(field, value),
            None => self.unset(field),
        }
    }

    pub fn inc(self, field: impl Into<String>, amount: impl Into<Bson>) -> Self {
        self.with(UpdateOp::Inc, field.into(), amount.into())
    }

    pub fn add_to_set(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.with(UpdateOp::AddToSet, field.into(), value.into())
    }

    pub fn pull(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.with(UpdateOp::Pull, field.into(), value.into())
    }

    pub fn push(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.with(UpdateOp::Push, field.into(), value.into())
    }

    pub fn is_empty(&self) -> bool {
        self.operations.iter().all(Document::is_empty)
    }

    /// 변경 대상 필드 목록 (연산자 순서)
    pub fn fields(&self) -> Vec<&str> {
        self.operations
            .iter()
            .flat_map(|op| op.keys().map(String::as_str))
            .collect()
    }

    /// 저장소 업데이트 문서로 변환합니다.
    ///
    /// 빈 업데이트와 식별자 변경은 `ValidationError`, 잘못된 필드 경로는
    /// `MalformedCriteriaError`입니다.
    pub fn to_document(&self) -> DataResult<Document> {
        if self.is_empty() {
            return Err(DataError::ValidationError(
                "update must contain at least one field operation".to_string(),
            ));
        }
        let mut rendered = Document::new();
        for (op, fields) in UpdateOp::ALL.iter().zip(&self.operations) {
            if fields.is_empty() {
                continue;
            }
            for field in fields.keys() {
                validate_field_path(field)?;
                if field == ID_FIELD {
                    return Err(DataError::ValidationError(
                        "the identifier field is immutable".to_string(),
                    ));
                }
            }
            rendered.insert(op.operator(), fields.clone());
        }
        Ok(rendered)
    }

    fn with(mut self, op: UpdateOp, field: String, value: Bson) -> Self {
        let field = storage_field(&field).to_string();
        for (i, fields) in self.operations.iter_mut().enumerate() {
            if i != op.slot() {
                fields.remove(&field);
            }
        }
        self.operations[op.slot()].insert(field, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_set_or_unset_dispatch() {
        let set = Update::new().set_or_unset("name", Some("kim"));
        let unset = Update::new().set_or_unset::<&str>("name", None);

        assert_eq!(set.to_document().unwrap(), doc! { "$set": { "name": "kim" } });
        assert_eq!(unset.to_document().unwrap(), doc! { "$unset": { "name": "" } });
    }

    #[test]
    fn test_later_operation_on_same_field_wins() {
        let update = Update::new()
            .set("name", "kim")
            .unset("name")
            .set_or_unset("name", Some("lee"));

        assert_eq!(update.to_document().unwrap(), doc! { "$set": { "name": "lee" } });
    }

    #[test]
    fn test_render_multiple_operators() {
        let update = Update::new()
            .set("status", "done")
            .inc("count", 1)
            .add_to_set("tags", "x")
            .pull("watchers", "bob")
            .push("history", "closed");

        assert_eq!(
            update.to_document().unwrap(),
            doc! {
                "$set": { "status": "done" },
                "$inc": { "count": 1 },
                "$addToSet": { "tags": "x" },
                "$pull": { "watchers": "bob" },
                "$push": { "history": "closed" },
            }
        );
        assert_eq!(update.fields(), ["status", "count", "tags", "watchers", "history"]);
    }

    #[test]
    fn test_operator_slots_follow_declaration_order() {
        for (i, op) in UpdateOp::ALL.iter().enumerate() {
            assert_eq!(op.slot(), i);
        }
        let rendered = Update::new()
            .push("h", 1)
            .pull("w", 1)
            .add_to_set("t", 1)
            .inc("c", 1)
            .unset("u")
            .set("s", 1)
            .to_document()
            .unwrap();
        let operators: Vec<&str> = rendered.keys().map(String::as_str).collect();

        assert_eq!(operators, ["$set", "$unset", "$inc", "$addToSet", "$pull", "$push"]);
    }

    #[test]
    fn test_empty_update_is_rejected() {
        assert!(matches!(
            Update::new().to_document(),
            Err(DataError::ValidationError(_))
        ));
    }

    #[test]
    fn test_identifier_is_immutable() {
        let update = Update::new().set("id", mongodb::bson::oid::ObjectId::new());

        assert!(matches!(update.to_document(), Err(DataError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_field_is_malformed() {
        assert!(matches!(
            Update::new().set("$where", 1).to_document(),
            Err(DataError::MalformedCriteriaError(_))
        ));
    }
}
