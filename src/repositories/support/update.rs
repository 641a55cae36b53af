//! 업데이트와 저장 연산
//!
//! `find_and_apply` 는 저장소의 find-one-and-update 를 한 번 호출하여
//! 수정 후 문서를 돌려받습니다. 다른 클라이언트의 동시 쓰기와 섞이지 않는
//! 유일한 연산이며, 식별자 기반 단건 업데이트는 모두 이 연산을 거칩니다.

use log::{info, warn};
use mongodb::bson::{Bson, oid::ObjectId, to_document};

use super::SupportRepository;
use crate::domain::criteria::Criteria;
use crate::domain::entities::SupportModel;
use crate::domain::projection::Projection;
use crate::domain::update::Update;
use crate::errors::{DataError, DataResult};
use crate::store::MatchResult;

impl<T: SupportModel> SupportRepository<T> {
    /// 조건과 일치하는 첫 번째 문서에 업데이트를 적용합니다.
    pub async fn update_first(
        &self,
        criteria: &Criteria,
        update: &Update,
    ) -> DataResult<MatchResult> {
        let filter = Self::filter(criteria)?;
        let update = update.to_document()?;
        self.store.update_one(T::COLLECTION, filter, update).await
    }

    /// 조건과 일치하는 모든 문서에 업데이트를 적용합니다.
    pub async fn update_all(
        &self,
        criteria: &Criteria,
        update: &Update,
    ) -> DataResult<MatchResult> {
        let filter = Self::filter(criteria)?;
        let update = update.to_document()?;
        let result = self.store.update_many(T::COLLECTION, filter, update).await?;
        info!(
            "update_all on {}: matched {}, modified {}",
            T::COLLECTION,
            result.matched_count,
            result.modified_count
        );
        Ok(result)
    }

    /// 원자적 find-one-and-update
    ///
    /// 조건과 일치하는 첫 번째 문서를 수정하고 수정 후 상태를 반환합니다.
    ///
    /// # 반환값
    ///
    /// * `Ok(T)` - 수정 후 엔티티 (`projection` 적용)
    /// * `Err(DataError::NotFound)` - 일치하는 문서가 없음
    /// * `Err(DataError::ValidationError)` - 빈 업데이트
    pub async fn find_and_apply(
        &self,
        criteria: &Criteria,
        update: &Update,
        projection: Option<&Projection>,
    ) -> DataResult<T> {
        let filter = Self::filter(criteria)?;
        let rendered = update.to_document()?;
        let projection = Self::projection(projection)?;

        match self
            .store
            .find_one_and_update(T::COLLECTION, filter.clone(), rendered, projection)
            .await?
        {
            Some(document) => Self::decode(document),
            None => {
                warn!(
                    "find_and_apply on {} matched nothing [filter: {}]",
                    T::COLLECTION,
                    filter
                );
                Err(DataError::not_found("find_and_apply", T::COLLECTION, &filter))
            }
        }
    }

    pub async fn update_by_id(&self, id: ObjectId, update: &Update) -> DataResult<T> {
        self.find_and_apply(&Criteria::by_id(id), update, None).await
    }

    /// 필드 하나를 설정하거나(`Some`) 제거합니다(`None`).
    pub async fn update_field_by_id<V: Into<Bson>>(
        &self,
        id: ObjectId,
        key: &str,
        value: Option<V>,
    ) -> DataResult<T> {
        self.update_by_id(id, &Update::new().set_or_unset(key, value)).await
    }

    pub async fn unset_field_by_id(&self, id: ObjectId, key: &str) -> DataResult<T> {
        self.update_by_id(id, &Update::new().unset(key)).await
    }

    /// 배열 필드에 값이 없을 때만 추가합니다.
    pub async fn add_to_set(
        &self,
        id: ObjectId,
        key: &str,
        value: impl Into<Bson>,
    ) -> DataResult<T> {
        self.update_by_id(id, &Update::new().add_to_set(key, value)).await
    }

    /// 배열 필드에서 값과 같은 원소를 모두 제거합니다.
    pub async fn pull(
        &self,
        id: ObjectId,
        key: &str,
        value: impl Into<Bson>,
    ) -> DataResult<T> {
        self.update_by_id(id, &Update::new().pull(key, value)).await
    }

    /// 엔티티 전체 저장 (식별자 기준 upsert)
    ///
    /// 식별자가 없으면 새로 부여하고, 감사 필드를 채운 뒤 문서 전체를 교체합니다.
    pub async fn save(&self, entity: T) -> DataResult<T> {
        let (entity, id) = self.prepare(entity);
        let document = to_document(&entity)?;
        self.store
            .replace_one(T::COLLECTION, Criteria::by_id(id).to_document()?, document, true)
            .await?;
        Ok(entity)
    }

    /// 새 엔티티 삽입. 같은 식별자가 이미 있으면 저장소 오류입니다.
    pub async fn insert(&self, entity: T) -> DataResult<T> {
        let (entity, _) = self.prepare(entity);
        let document = to_document(&entity)?;
        self.store.insert_one(T::COLLECTION, document).await?;
        Ok(entity)
    }

    fn prepare(&self, mut entity: T) -> (T, ObjectId) {
        let id = match entity.id() {
            Some(id) => id,
            None => {
                let id = self.ids.next_id();
                entity.set_id(id);
                id
            }
        };
        let now = self.auditor.now();
        let actor = self.auditor.current_auditor();
        entity.audit_mut().touch(now, actor);
        (entity, id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mongodb::bson::{DateTime, oid::ObjectId};

    use crate::core::{FixedAuditor, IdGenerator};
    use crate::domain::criteria::Criteria;
    use crate::domain::projection::Projection;
    use crate::domain::update::Update;
    use crate::errors::DataError;
    use crate::repositories::support::SupportRepository;
    use crate::store::{MatchResult, MemoryStore};
    use crate::test_support::{Order, order_repository, seed_orders};

    #[tokio::test]
    async fn test_inc_is_applied_atomically() {
        let (_, repo) = order_repository();
        let mut order = Order::titled("counter");
        order.count = 1;
        let saved = repo.save(order).await.unwrap();

        let updated = repo
            .update_by_id(saved.id.unwrap(), &Update::new().inc("count", 1))
            .await
            .unwrap();

        assert_eq!(updated.count, 2);
    }

    #[tokio::test]
    async fn test_inc_overflow_is_rejected_and_leaves_document_intact() {
        let (_, repo) = order_repository();
        let mut order = Order::titled("limit");
        order.count = i64::MAX;
        let id = repo.save(order).await.unwrap().id.unwrap();

        let result = repo
            .update_by_id(id, &Update::new().inc("count", 1_i64))
            .await;

        assert!(matches!(result, Err(DataError::ValidationError(_))));
        assert_eq!(repo.get_one(id).await.unwrap().count, i64::MAX);
    }

    #[tokio::test]
    async fn test_set_or_unset_is_idempotent() {
        let (_, repo) = order_repository();
        let id = seed_orders(&repo, &["a"]).await[0].id.unwrap();

        let first = repo.update_field_by_id(id, "note", Some("hi")).await.unwrap();
        let second = repo.update_field_by_id(id, "note", Some("hi")).await.unwrap();
        assert_eq!(first.note.as_deref(), Some("hi"));
        assert_eq!(first, second);

        let cleared = repo.update_field_by_id::<&str>(id, "note", None).await.unwrap();
        let again = repo.unset_field_by_id(id, "note").await.unwrap();
        assert_eq!(cleared.note, None);
        assert_eq!(cleared, again);
    }

    #[tokio::test]
    async fn test_find_and_apply_with_projection() {
        let (_, repo) = order_repository();
        seed_orders(&repo, &["a", "b"]).await;

        let updated = repo
            .find_and_apply(
                &Criteria::is("title", "b"),
                &Update::new().set("status", "closed"),
                Some(&Projection::include_only(["status"])),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, "closed");
        assert_eq!(updated.title, "");
        assert!(updated.id.is_some());
    }

    #[tokio::test]
    async fn test_find_and_apply_without_match_is_not_found() {
        let (_, repo) = order_repository();

        let result = repo
            .update_by_id(ObjectId::new(), &Update::new().set("status", "closed"))
            .await;

        assert!(matches!(result, Err(DataError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected_before_store() {
        let (_, repo) = order_repository();
        let id = seed_orders(&repo, &["a"]).await[0].id.unwrap();

        let result = repo.update_by_id(id, &Update::new()).await;

        assert!(matches!(result, Err(DataError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_first_and_all() {
        let (_, repo) = order_repository();
        seed_orders(&repo, &["a", "b", "c"]).await;
        let open = Criteria::is("status", "open");

        let first = repo
            .update_first(&open, &Update::new().set("status", "closed"))
            .await
            .unwrap();
        let all = repo
            .update_all(&open, &Update::new().set("status", "closed"))
            .await
            .unwrap();

        assert_eq!(first, MatchResult { matched_count: 1, modified_count: 1 });
        assert_eq!(all, MatchResult { matched_count: 2, modified_count: 2 });
        assert_eq!(repo.count(&open).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_to_set_and_pull() {
        let (_, repo) = order_repository();
        let id = seed_orders(&repo, &["a"]).await[0].id.unwrap();

        repo.add_to_set(id, "tags", "x").await.unwrap();
        let twice = repo.add_to_set(id, "tags", "x").await.unwrap();
        assert_eq!(twice.tags, ["x"]);

        let pulled = repo.pull(id, "tags", "x").await.unwrap();
        assert!(pulled.tags.is_empty());
    }

    struct FixedIds(ObjectId);

    impl IdGenerator for FixedIds {
        fn next_id(&self) -> ObjectId {
            self.0
        }
    }

    #[tokio::test]
    async fn test_save_populates_id_and_audit_fields() {
        let id = ObjectId::new();
        let created = DateTime::from_millis(1_000);
        let repo = SupportRepository::<Order>::new(Arc::new(MemoryStore::new()))
            .with_id_generator(Arc::new(FixedIds(id)))
            .with_auditor(Arc::new(FixedAuditor::new("alice").at(created)));

        let saved = repo.save(Order::titled("a")).await.unwrap();

        assert_eq!(saved.id, Some(id));
        assert_eq!(saved.audit.created_by.as_deref(), Some("alice"));
        assert_eq!(saved.audit.created_date, Some(created));

        let modified = DateTime::from_millis(2_000);
        let repo = repo.with_auditor(Arc::new(FixedAuditor::new("bob").at(modified)));
        let mut changed = saved.clone();
        changed.title = "b".to_string();
        let resaved = repo.save(changed).await.unwrap();

        assert_eq!(resaved.audit.created_by.as_deref(), Some("alice"));
        assert_eq!(resaved.audit.last_modified_by.as_deref(), Some("bob"));
        assert_eq!(resaved.audit.last_modified_date, Some(modified));

        let stored = repo.get_one(id).await.unwrap();
        assert_eq!(stored, resaved);
        assert_eq!(repo.count(&Criteria::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_duplicate_fails() {
        let (_, repo) = order_repository();
        let saved = seed_orders(&repo, &["a"]).await.remove(0);

        let result = repo.insert(saved).await;

        assert!(matches!(result, Err(DataError::StoreUnavailableError(_))));
    }
}
