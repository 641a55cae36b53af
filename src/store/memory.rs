//! 프로세스 내 문서 저장소
//!
//! 컬렉션 이름별 문서 목록을 `RwLock` 하나로 보호합니다. 각 연산은 잠금을
//! 한 번만 잡으므로 `find_one_and_update` 는 다른 쓰기와 섞이지 않습니다.

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use mongodb::bson::{Bson, Document, doc};
use parking_lot::RwLock;

use super::matcher::{apply_update, compare_documents, matches, project};
use super::{DocumentStore, FindQuery, MatchResult};
use crate::errors::{DataError, DataResult};

/// 메모리 기반 [`DocumentStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 컬렉션의 문서 수 (필터 없음)
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// 컬렉션의 모든 문서 사본
    pub fn snapshot(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn select(docs: &[Document], filter: &Document) -> DataResult<Vec<usize>> {
        let mut hits = Vec::new();
        for (index, document) in docs.iter().enumerate() {
            if matches(document, filter)? {
                hits.push(index);
            }
        }
        Ok(hits)
    }

    fn apply_to(
        docs: &mut [Document],
        indexes: &[usize],
        update: &Document,
    ) -> DataResult<MatchResult> {
        let mut result = MatchResult::default();
        for &index in indexes {
            let mut updated = docs[index].clone();
            let modified = apply_update(&mut updated, update)?;
            if updated.get("_id") != docs[index].get("_id") {
                return Err(DataError::ValidationError(
                    "the identifier field is immutable".to_string(),
                ));
            }
            docs[index] = updated;
            result.matched_count += 1;
            if modified {
                result.modified_count += 1;
            }
        }
        Ok(result)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, query: FindQuery) -> DataResult<Vec<Document>> {
        debug!("find on {} [filter: {}]", collection, query.filter);
        let guard = self.collections.read();
        let docs = guard.get(collection).map(Vec::as_slice).unwrap_or(&[]);

        let mut hits: Vec<&Document> = Vec::new();
        for document in docs {
            if matches(document, &query.filter)? {
                hits.push(document);
            }
        }
        if let Some(sort) = &query.sort {
            hits.sort_by(|a, b| compare_documents(a, b, sort));
        }

        let skip = query.skip.unwrap_or(0) as usize;
        let limit = match query.limit {
            Some(limit) if limit != 0 => limit.unsigned_abs() as usize,
            _ => usize::MAX,
        };
        let empty = Document::new();
        let projection = query.projection.as_ref().unwrap_or(&empty);

        Ok(hits
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|d| project(d, projection))
            .collect())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> DataResult<Option<Document>> {
        let mut found = self
            .find(collection, FindQuery::new(filter).projection(projection).limit(1))
            .await?;
        Ok(found.pop())
    }

    async fn count(&self, collection: &str, filter: Document) -> DataResult<u64> {
        debug!("count on {} [filter: {}]", collection, filter);
        let guard = self.collections.read();
        let docs = guard.get(collection).map(Vec::as_slice).unwrap_or(&[]);
        Ok(Self::select(docs, &filter)?.len() as u64)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        projection: Option<Document>,
    ) -> DataResult<Option<Document>> {
        debug!("find_one_and_update on {} [filter: {}]", collection, filter);
        let mut guard = self.collections.write();
        let docs = guard.entry(collection.to_string()).or_default();

        let Some(&index) = Self::select(docs, &filter)?.first() else {
            return Ok(None);
        };
        Self::apply_to(docs, &[index], &update)?;

        let projection = projection.unwrap_or_default();
        Ok(Some(project(&docs[index], &projection)))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> DataResult<MatchResult> {
        debug!("update_one on {} [filter: {}]", collection, filter);
        let mut guard = self.collections.write();
        let docs = guard.entry(collection.to_string()).or_default();
        let hits = Self::select(docs, &filter)?;
        Self::apply_to(docs, &hits[..hits.len().min(1)], &update)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> DataResult<MatchResult> {
        debug!("update_many on {} [filter: {}]", collection, filter);
        let mut guard = self.collections.write();
        let docs = guard.entry(collection.to_string()).or_default();
        let hits = Self::select(docs, &filter)?;
        Self::apply_to(docs, &hits, &update)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> DataResult<u64> {
        debug!("delete_one on {} [filter: {}]", collection, filter);
        let mut guard = self.collections.write();
        let docs = guard.entry(collection.to_string()).or_default();
        match Self::select(docs, &filter)?.first() {
            Some(&index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> DataResult<u64> {
        debug!("delete_many on {} [filter: {}]", collection, filter);
        let mut guard = self.collections.write();
        let docs = guard.entry(collection.to_string()).or_default();
        let hits = Self::select(docs, &filter)?;
        for &index in hits.iter().rev() {
            docs.remove(index);
        }
        Ok(hits.len() as u64)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> DataResult<()> {
        let id = document.get("_id").cloned().unwrap_or(Bson::Null);
        debug!("insert_one on {} [_id: {}]", collection, id);
        let mut guard = self.collections.write();
        let docs = guard.entry(collection.to_string()).or_default();
        if id != Bson::Null && docs.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(DataError::store(
                "insert_one",
                collection,
                &doc! { "_id": id },
                "duplicate key",
            ));
        }
        docs.push(document);
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
        let mut guard = self.collections.write();
        let docs = guard.entry(collection.to_string()).or_default();

        match Self::select(docs, &filter)?.first() {
            Some(&index) => {
                let mut replacement = replacement;
                if let Some(id) = docs[index].get("_id") {
                    replacement.insert("_id", id.clone());
                }
                let modified = docs[index] != replacement;
                docs[index] = replacement;
                Ok(MatchResult {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                })
            }
            None if upsert => {
                let mut replacement = replacement;
                if !replacement.contains_key("_id") {
                    if let Some(id) = filter.get("_id") {
                        replacement.insert("_id", id.clone());
                    }
                }
                docs.push(replacement);
                Ok(MatchResult::default())
            }
            None => Ok(MatchResult::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDERS: &str = "orders";

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (id, title, count) in [(1, "a", 3), (2, "b", 1), (3, "c", 2)] {
            store
                .insert_one(ORDERS, doc! { "_id": id, "title": title, "count": count })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_find_with_sort_skip_limit_projection() {
        let store = seeded().await;
        let query = FindQuery::new(doc! {})
            .sort(Some(doc! { "count": -1 }))
            .skip(1)
            .limit(1)
            .projection(Some(doc! { "title": 1 }));

        let found = store.find(ORDERS, query).await.unwrap();

        assert_eq!(found, vec![doc! { "_id": 3, "title": "c" }]);
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let store = seeded().await;

        let result = store.insert_one(ORDERS, doc! { "_id": 1 }).await;

        assert!(matches!(result, Err(DataError::StoreUnavailableError(_))));
    }

    #[tokio::test]
    async fn test_update_counts() {
        let store = seeded().await;

        let many = store
            .update_many(ORDERS, doc! {}, doc! { "$set": { "title": "a" } })
            .await
            .unwrap();
        let one = store
            .update_one(ORDERS, doc! { "count": 99 }, doc! { "$set": { "x": 1 } })
            .await
            .unwrap();

        assert_eq!(many, MatchResult { matched_count: 3, modified_count: 2 });
        assert_eq!(one, MatchResult::default());
    }

    #[tokio::test]
    async fn test_find_one_and_update_returns_new_document() {
        let store = seeded().await;

        let updated = store
            .find_one_and_update(ORDERS, doc! { "_id": 2 }, doc! { "$inc": { "count": 1 } }, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.get_i32("count").unwrap(), 2);
    }

    #[tokio::test]
    async fn test_replace_upsert_and_delete() {
        let store = seeded().await;

        store
            .replace_one(ORDERS, doc! { "_id": 9 }, doc! { "title": "z" }, true)
            .await
            .unwrap();
        assert_eq!(store.count(ORDERS, doc! { "_id": 9 }).await.unwrap(), 1);

        assert_eq!(store.delete_many(ORDERS, doc! { "count": { "$lte": 2 } }).await.unwrap(), 2);
        assert_eq!(store.delete_one(ORDERS, doc! { "_id": 1 }).await.unwrap(), 1);
        assert_eq!(store.len(ORDERS), 1);
    }
}
