//! 삭제 연산
//!
//! 논리 삭제는 `deleted` 플래그만 설정하며 문서는 남습니다. 조회 연산은
//! 삭제 플래그를 자동으로 거르지 않으므로, 삭제된 문서를 숨기려면
//! [`Criteria::with_deleted`]를 명시해야 합니다.

use log::info;
use mongodb::bson::oid::ObjectId;

use super::SupportRepository;
use crate::domain::criteria::{Criteria, DELETED_FIELD};
use crate::domain::entities::SupportModel;
use crate::domain::update::Update;
use crate::errors::{DataError, DataResult};

impl<T: SupportModel> SupportRepository<T> {
    /// 논리 삭제. 삭제 플래그가 설정된 엔티티를 반환합니다.
    pub async fn soft_delete_by_id(&self, id: ObjectId) -> DataResult<T> {
        self.update_by_id(id, &Update::new().set_or_unset(DELETED_FIELD, Some(true)))
            .await
    }

    /// 물리 삭제. 문서가 있었으면 `true`.
    pub async fn hard_delete_by_id(&self, id: ObjectId) -> DataResult<bool> {
        let filter = Self::filter(&Criteria::by_id(id))?;
        let deleted = self.store.delete_one(T::COLLECTION, filter).await?;
        Ok(deleted > 0)
    }

    /// 조건과 일치하는 모든 문서를 물리 삭제하고 삭제 수를 반환합니다.
    pub async fn hard_delete(&self, criteria: &Criteria) -> DataResult<u64> {
        let filter = Self::filter(criteria)?;
        let deleted = self.store.delete_many(T::COLLECTION, filter).await?;
        info!("hard_delete on {}: {} removed", T::COLLECTION, deleted);
        Ok(deleted)
    }

    /// 엔티티 물리 삭제. 식별자가 없는 엔티티는 `ValidationError`.
    pub async fn remove(&self, entity: &T) -> DataResult<bool> {
        let id = entity.id().ok_or_else(|| {
            DataError::ValidationError(format!(
                "cannot remove a {} entity without an identifier",
                T::COLLECTION
            ))
        })?;
        self.hard_delete_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::criteria::Criteria;
    use crate::errors::DataError;
    use crate::test_support::{Order, order_repository, seed_orders};

    #[tokio::test]
    async fn test_soft_delete_keeps_document_visible() {
        let (store, repo) = order_repository();
        let id = seed_orders(&repo, &["a", "b"]).await[0].id.unwrap();

        let deleted = repo.soft_delete_by_id(id).await.unwrap();

        assert!(deleted.audit.deleted);
        assert_eq!(store.len("orders"), 2);
        assert!(repo.find_by_id(id).await.unwrap().unwrap().audit.deleted);
        let hidden = repo
            .find_one(&Criteria::by_id(id).with_deleted(Some(false)), None)
            .await
            .unwrap();
        assert!(hidden.is_none());

        let live = Criteria::all().with_deleted(Some(false));
        let remaining = repo.find_many(&live, None, None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "b");
    }

    #[tokio::test]
    async fn test_hard_delete_by_id() {
        let (_, repo) = order_repository();
        let id = seed_orders(&repo, &["a"]).await[0].id.unwrap();

        assert!(repo.hard_delete_by_id(id).await.unwrap());
        assert!(!repo.hard_delete_by_id(id).await.unwrap());
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hard_delete_by_criteria() {
        let (_, repo) = order_repository();
        seed_orders(&repo, &["keep", "drop-1", "drop-2"]).await;

        let removed = repo
            .hard_delete(&Criteria::regex("title", "^drop-"))
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert_eq!(repo.count(&Criteria::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_requires_identifier() {
        let (_, repo) = order_repository();
        let saved = seed_orders(&repo, &["a"]).await.remove(0);

        assert!(matches!(
            repo.remove(&Order::titled("unsaved")).await,
            Err(DataError::ValidationError(_))
        ));
        assert!(repo.remove(&saved).await.unwrap());
    }
}
