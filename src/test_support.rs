//! 테스트 전용 엔티티와 리포지토리 준비 함수

use std::sync::Arc;

use mongodb::bson::{Bson, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{AuditFields, DocumentRef, FieldAccessors, SupportModel};
use crate::repositories::support::SupportRepository;
use crate::store::MemoryStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub status: String,
    pub count: i64,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<DocumentRef>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Order {
    pub fn titled(title: &str) -> Self {
        Order {
            title: title.to_string(),
            status: "open".to_string(),
            ..Order::default()
        }
    }
}

impl SupportModel for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }

    fn field_accessors() -> FieldAccessors<Self> {
        FieldAccessors::with_audit_fields()
            .register("title", |o: &Order| Some(Bson::String(o.title.clone())))
            .register("status", |o: &Order| Some(Bson::String(o.status.clone())))
            .register("count", |o: &Order| Some(Bson::Int64(o.count)))
            .register("tags", |o: &Order| {
                Some(Bson::Array(o.tags.iter().cloned().map(Bson::String).collect()))
            })
            .register("note", |o: &Order| o.note.clone().map(Bson::String))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl SupportModel for Customer {
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

pub fn order_repository() -> (Arc<MemoryStore>, SupportRepository<Order>) {
    let store = Arc::new(MemoryStore::new());
    let repo = SupportRepository::new(store.clone());
    (store, repo)
}

/// 제목 목록으로 주문을 저장하고 저장된 엔티티를 순서대로 반환합니다.
pub async fn seed_orders(repo: &SupportRepository<Order>, titles: &[&str]) -> Vec<Order> {
    let mut saved = Vec::with_capacity(titles.len());
    for title in titles {
        saved.push(repo.save(Order::titled(title)).await.unwrap());
    }
    saved
}
