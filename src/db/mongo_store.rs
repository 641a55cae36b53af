//! mongodb 드라이버 기반 [`DocumentStore`] 구현
//!
//! 드라이버 오류는 재시도 없이 `StoreUnavailableError` 로 변환되며, 메시지에
//! 작업 이름, 컬렉션, 필터가 포함됩니다.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use log::debug;
use mongodb::bson::Document;
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::errors::{DataError, DataResult};
use crate::store::{DocumentStore, FindQuery, MatchResult};

/// MongoDB 문서 저장소
#[derive(Clone, Debug)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    pub fn new(database: Database) -> Self {
        MongoStore { database }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(&self, collection: &str, query: FindQuery) -> DataResult<Vec<Document>> {
        debug!("find on {} [filter: {}]", collection, query.filter);
        let FindQuery {
            filter,
            projection,
            sort,
            skip,
            limit,
        } = query;

        let coll = self.collection(collection);
        let mut action = coll.find(filter.clone());
        if let Some(projection) = projection {
            action = action.projection(projection);
        }
        if let Some(sort) = sort {
            action = action.sort(sort);
        }
        if let Some(skip) = skip {
            action = action.skip(skip);
        }
        if let Some(limit) = limit {
            action = action.limit(limit);
        }

        let cursor = action
            .await
            .map_err(|e| DataError::store("find", collection, &filter, e))?;
        cursor
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| DataError::store("find", collection, &filter, e))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> DataResult<Option<Document>> {
        debug!("find_one on {} [filter: {}]", collection, filter);
        let coll = self.collection(collection);
        let mut action = coll.find_one(filter.clone());
        if let Some(projection) = projection.filter(|p| !p.is_empty()) {
            action = action.projection(projection);
        }
        action
            .await
            .map_err(|e| DataError::store("find_one", collection, &filter, e))
    }

    async fn count(&self, collection: &str, filter: Document) -> DataResult<u64> {
        debug!("count on {} [filter: {}]", collection, filter);
        self.collection(collection)
            .count_documents(filter.clone())
            .await
            .map_err(|e| DataError::store("count", collection, &filter, e))
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        projection: Option<Document>,
    ) -> DataResult<Option<Document>> {
        debug!(
            "find_one_and_update on {} [filter: {}] {}",
            collection, filter, update
        );
        let coll = self.collection(collection);
        let mut action = coll
            .find_one_and_update(filter.clone(), update)
            .return_document(ReturnDocument::After);
        if let Some(projection) = projection.filter(|p| !p.is_empty()) {
            action = action.projection(projection);
        }
        action
            .await
            .map_err(|e| DataError::store("find_one_and_update", collection, &filter, e))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> DataResult<MatchResult> {
        debug!("update_one on {} [filter: {}] {}", collection, filter, update);
        let result = self
            .collection(collection)
            .update_one(filter.clone(), update)
            .await
            .map_err(|e| DataError::store("update_one", collection, &filter, e))?;
        Ok(MatchResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> DataResult<MatchResult> {
        debug!("update_many on {} [filter: {}] {}", collection, filter, update);
        let result = self
            .collection(collection)
            .update_many(filter.clone(), update)
            .await
            .map_err(|e| DataError::store("update_many", collection, &filter, e))?;
        Ok(MatchResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> DataResult<u64> {
        debug!("delete_one on {} [filter: {}]", collection, filter);
        let result = self
            .collection(collection)
            .delete_one(filter.clone())
            .await
            .map_err(|e| DataError::store("delete_one", collection, &filter, e))?;
        Ok(result.deleted_count)
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> DataResult<u64> {
        debug!("delete_many on {} [filter: {}]", collection, filter);
        let result = self
            .collection(collection)
            .delete_many(filter.clone())
            .await
            .map_err(|e| DataError::store("delete_many", collection, &filter, e))?;
        Ok(result.deleted_count)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> DataResult<()> {
        let filter = mongodb::bson::doc! { "_id": document.get("_id").cloned() };
        debug!("insert_one on {} [{}]", collection, filter);
        self.collection(collection)
            .insert_one(document)
            .await
            .map_err(|e| DataError::store("insert_one", collection, &filter, e))?;
        Ok(())
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        upsert: bool,
    ) -> DataResult<MatchResult> {
        debug!("replace_one on {} [filter: {}]", collection, filter);
        let result = self
            .collection(collection)
            .replace_one(filter.clone(), replacement)
            .upsert(upsert)
            .await
            .map_err(|e| DataError::store("replace_one", collection, &filter, e))?;
        Ok(MatchResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }
}
