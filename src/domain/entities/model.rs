//! Support Model Contract
//!
//! 모든 문서 엔티티가 공유하는 형태를 정의합니다.
//! 식별자, 감사 필드, 논리 삭제 플래그를 갖는 타입이면 어떤 엔티티든
//! [`SupportRepository`](crate::repositories::support::SupportRepository) 하나로 다룰 수 있습니다.

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::accessors::FieldAccessors;

/// 감사 필드와 논리 삭제 플래그
///
/// 엔티티에 `#[serde(flatten)]` 으로 포함되어 최상위 필드로 저장됩니다.
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// #[serde(default)]
/// pub struct Order {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     pub id: Option<ObjectId>,
///     pub title: String,
///     #[serde(flatten)]
///     pub audit: AuditFields,
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    /// 최초 저장 시간
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime>,
    /// 마지막 저장 시간
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<DateTime>,
    /// 최초 저장한 사용자
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// 마지막으로 저장한 사용자
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    /// 논리 삭제 플래그
    #[serde(default)]
    pub deleted: bool,
}

impl AuditFields {
    /// 저장 직전 감사 필드를 채웁니다.
    ///
    /// 생성 정보는 비어 있을 때만 채우고, 수정 정보는 항상 갱신합니다.
    pub fn touch(&mut self, now: DateTime, actor: Option<String>) {
        if self.created_date.is_none() {
            self.created_date = Some(now);
            self.created_by = actor.clone();
        }
        self.last_modified_date = Some(now);
        self.last_modified_by = actor;
    }
}

/// 다른 컬렉션 문서에 대한 참조 (DBRef)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    #[serde(rename = "$ref")]
    pub collection: String,
    #[serde(rename = "$id")]
    pub id: ObjectId,
}

impl DocumentRef {
    /// `T` 컬렉션의 문서를 가리키는 참조
    pub fn to<T: SupportModel>(id: ObjectId) -> Self {
        DocumentRef {
            collection: T::COLLECTION.to_string(),
            id,
        }
    }
}

/// 문서 엔티티 계약
///
/// 엔티티는 프로젝션된(일부 필드만 있는) 문서에서도 역직렬화될 수 있어야 하므로
/// 모든 필드에 기본값이 있어야 합니다 (`#[serde(default)]`).
pub trait SupportModel:
    Serialize + DeserializeOwned + Default + Clone + Send + Sync + Unpin + 'static
{
    /// 저장 컬렉션 이름
    const COLLECTION: &'static str;

    fn id(&self) -> Option<ObjectId>;

    fn set_id(&mut self, id: ObjectId);

    fn audit(&self) -> &AuditFields;

    fn audit_mut(&mut self) -> &mut AuditFields;

    fn is_deleted(&self) -> bool {
        self.audit().deleted
    }

    /// 이름으로 필드 값을 읽기 위한 접근자 테이블
    ///
    /// 기본값은 식별자와 감사 필드만 등록합니다. 도메인 필드를 이름으로
    /// 조회하려면 엔티티에서 재정의하여 접근자를 추가합니다.
    fn field_accessors() -> FieldAccessors<Self> {
        FieldAccessors::with_audit_fields()
    }
}
