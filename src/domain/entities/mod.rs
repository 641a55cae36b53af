//! # Domain Entities Module
//!
//! 문서 엔티티가 구현해야 하는 [`SupportModel`] 계약과 공통 구성 요소입니다.
//!
//! - [`model`] - 엔티티 계약, 감사 필드, 문서 참조
//! - [`accessors`] - 이름으로 필드 값을 읽는 접근자 테이블
//!
//! ## 엔티티 정의 예제
//!
//! ```rust,ignore
//! use mongodb::bson::{Bson, oid::ObjectId};
//! use serde::{Deserialize, Serialize};
//! use mongo_support::domain::entities::{AuditFields, FieldAccessors, SupportModel};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! #[serde(default, rename_all = "camelCase")]
//! pub struct Order {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     pub title: String,
//!     #[serde(flatten)]
//!     pub audit: AuditFields,
//! }
//!
//! impl SupportModel for Order {
//!     const COLLECTION: &'static str = "orders";
//!
//!     fn id(&self) -> Option<ObjectId> { self.id }
//!     fn set_id(&mut self, id: ObjectId) { self.id = Some(id); }
//!     fn audit(&self) -> &AuditFields { &self.audit }
//!     fn audit_mut(&mut self) -> &mut AuditFields { &mut self.audit }
//!
//!     fn field_accessors() -> FieldAccessors<Self> {
//!         FieldAccessors::with_audit_fields()
//!             .register("title", |o: &Order| Some(Bson::String(o.title.clone())))
//!     }
//! }
//! ```
//!
//! ## 주의사항
//!
//! - 프로젝션 조회 결과도 엔티티로 역직렬화되므로 모든 필드에 기본값이 필요합니다.
//! - 다른 컬렉션 참조는 [`DocumentRef`]로 저장하고 `<필드>.$id` 로 조회합니다.

pub mod accessors;
pub mod model;

pub use accessors::{FieldAccessors, FieldGetter};
pub use model::{AuditFields, DocumentRef, SupportModel};
