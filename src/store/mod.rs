//! # Document Store Abstraction
//!
//! 리포지토리가 사용하는 저장소 연산의 최소 집합입니다. 모든 연산은 렌더링된
//! BSON 문서(필터, 업데이트, 프로젝션, 정렬)와 컬렉션 이름을 받습니다.
//!
//! - [`crate::db::MongoStore`] - mongodb 드라이버 구현
//! - [`MemoryStore`] - 프로세스 내 구현 (테스트와 로컬 실행용)
//!
//! 구현체는 여러 태스크에서 공유되므로 `Send + Sync` 여야 하며,
//! 리포지토리는 `Arc<dyn DocumentStore>` 로 보관합니다.

pub mod matcher;
pub mod memory;

use async_trait::async_trait;
use mongodb::bson::Document;
use serde::Serialize;

use crate::errors::DataResult;

pub use memory::MemoryStore;

/// 다건 조회 요청
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub filter: Document,
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

impl FindQuery {
    pub fn new(filter: Document) -> Self {
        FindQuery {
            filter,
            ..FindQuery::default()
        }
    }

    pub fn projection(mut self, projection: Option<Document>) -> Self {
        self.projection = projection.filter(|p| !p.is_empty());
        self
    }

    pub fn sort(mut self, sort: Option<Document>) -> Self {
        self.sort = sort.filter(|s| !s.is_empty());
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// 업데이트 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// 필터와 일치한 문서 수
    pub matched_count: u64,
    /// 실제로 값이 바뀐 문서 수
    pub modified_count: u64,
}

/// 문서 저장소
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 필터, 프로젝션, 정렬, skip/limit 을 적용한 다건 조회
    async fn find(&self, collection: &str, query: FindQuery) -> DataResult<Vec<Document>>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> DataResult<Option<Document>>;

    async fn count(&self, collection: &str, filter: Document) -> DataResult<u64>;

    /// 첫 번째 일치 문서를 원자적으로 수정하고 수정 후 문서를 반환합니다.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        projection: Option<Document>,
    ) -> DataResult<Option<Document>>;

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> DataResult<MatchResult>;

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> DataResult<MatchResult>;

    /// 삭제된 문서 수 (0 또는 1)
    async fn delete_one(&self, collection: &str, filter: Document) -> DataResult<u64>;

    async fn delete_many(&self, collection: &str, filter: Document) -> DataResult<u64>;

    async fn insert_one(&self, collection: &str, document: Document) -> DataResult<()>;

    /// 문서 전체 교체. `upsert` 이면 일치 문서가 없을 때 새로 삽입합니다.
    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        upsert: bool,
    ) -> DataResult<MatchResult>;
}
