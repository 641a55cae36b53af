//! # 범용 문서 리포지토리
//!
//! [`SupportModel`]을 구현한 모든 엔티티 타입에 대해 같은 조회, 페이지,
//! 업데이트, 삭제 연산을 제공합니다.
//!
//! ```text
//! SupportRepository<T>
//! ├── fetch        - 단건/다건/페이지/참조 조회, 개수
//! ├── update       - 부분 업데이트, 원자적 find-and-apply, 저장
//! ├── delete       - 논리 삭제와 물리 삭제
//! └── field_value  - 필드 하나만 읽기
//! ```
//!
//! 모든 연산은 저장소에 대한 요청 하나(페이지 조회는 개수와 내용 두 개)로
//! 끝나며, 재시도나 클라이언트 측 잠금은 없습니다. 삭제된 문서를 조회에서
//! 제외하려면 조건에 [`Criteria::with_deleted`]를 명시합니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mongo_support::domain::{Criteria, PageRequest, Sort, Update};
//! use mongo_support::repositories::support::SupportRepository;
//! use mongo_support::store::MemoryStore;
//!
//! let orders = SupportRepository::<Order>::new(Arc::new(MemoryStore::new()));
//!
//! let saved = orders.save(Order::titled("first")).await?;
//! let page = orders
//!     .find_page(
//!         &Criteria::all().with_deleted(Some(false)),
//!         &PageRequest::of(0, 20)?.with_sort(Sort::desc("createdDate")),
//!         None,
//!     )
//!     .await?;
//! let bumped = orders
//!     .update_by_id(saved.id.unwrap(), &Update::new().inc("count", 1))
//!     .await?;
//! ```

mod delete;
mod fetch;
mod field_value;
mod update;

use std::sync::Arc;

use mongodb::bson::{Document, from_document};

use crate::core::{AuditorAware, IdGenerator, NoAuditor, ObjectIdGenerator};
use crate::domain::criteria::Criteria;
use crate::domain::entities::{FieldAccessors, SupportModel};
use crate::domain::projection::Projection;
use crate::errors::DataResult;
use crate::store::DocumentStore;

/// 엔티티 타입 `T` 의 데이터 액세스 리포지토리
pub struct SupportRepository<T: SupportModel> {
    store: Arc<dyn DocumentStore>,
    auditor: Arc<dyn AuditorAware>,
    ids: Arc<dyn IdGenerator>,
    accessors: FieldAccessors<T>,
}

impl<T: SupportModel> SupportRepository<T> {
    /// 기본 협력자([`NoAuditor`], [`ObjectIdGenerator`])로 생성합니다.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        SupportRepository {
            store,
            auditor: Arc::new(NoAuditor),
            ids: Arc::new(ObjectIdGenerator),
            accessors: T::field_accessors(),
        }
    }

    pub fn with_auditor(mut self, auditor: Arc<dyn AuditorAware>) -> Self {
        self.auditor = auditor;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// 엔티티가 저장되는 컬렉션 이름
    pub fn collection_name(&self) -> &'static str {
        T::COLLECTION
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    fn decode(document: Document) -> DataResult<T> {
        Ok(from_document(document)?)
    }

    fn decode_all(documents: Vec<Document>) -> DataResult<Vec<T>> {
        documents.into_iter().map(Self::decode).collect()
    }

    fn filter(criteria: &Criteria) -> DataResult<Document> {
        criteria.to_document()
    }

    fn projection(projection: Option<&Projection>) -> DataResult<Option<Document>> {
        match projection {
            Some(p) if !p.is_empty() => Ok(Some(p.to_document()?)),
            _ => Ok(None),
        }
    }
}

impl<T: SupportModel> Clone for SupportRepository<T> {
    fn clone(&self) -> Self {
        SupportRepository {
            store: Arc::clone(&self.store),
            auditor: Arc::clone(&self.auditor),
            ids: Arc::clone(&self.ids),
            accessors: T::field_accessors(),
        }
    }
}
