//! 필드 값 추출
//!
//! 필드 하나만 프로젝션해 조회한 뒤, 엔티티에 등록된 접근자로 값을 읽어
//! 호출자가 원하는 타입으로 변환합니다.

use mongodb::bson::{DateTime, from_bson, oid::ObjectId};
use serde::de::DeserializeOwned;

use super::SupportRepository;
use crate::domain::criteria::Criteria;
use crate::domain::entities::SupportModel;
use crate::domain::projection::Projection;
use crate::errors::{DataError, DataResult};

impl<T: SupportModel> SupportRepository<T> {
    /// 식별자로 찾은 문서의 필드 값
    pub async fn field_value_by_id<R: DeserializeOwned>(
        &self,
        id: ObjectId,
        field: &str,
    ) -> DataResult<Option<R>> {
        self.field_value(&Criteria::by_id(id), field).await
    }

    /// 조건과 일치하는 첫 번째 문서의 필드 값
    ///
    /// # 반환값
    ///
    /// * `Ok(Some(R))` - 값이 있음
    /// * `Ok(None)` - 문서가 없거나 필드가 비어 있음
    /// * `Err(DataError::MalformedCriteriaError)` - 접근자가 등록되지 않은 필드
    /// * `Err(DataError::SerializationError)` - 값을 `R` 로 변환할 수 없음
    pub async fn field_value<R: DeserializeOwned>(
        &self,
        criteria: &Criteria,
        field: &str,
    ) -> DataResult<Option<R>> {
        if !self.accessors.contains(field) {
            return Err(DataError::MalformedCriteriaError(format!(
                "no field accessor registered for '{}' on {}",
                field,
                T::COLLECTION
            )));
        }

        let projection = Projection::include_only([field]);
        let Some(entity) = self.find_one(criteria, Some(&projection)).await? else {
            return Ok(None);
        };

        match self.accessors.read(&entity, field)? {
            Some(value) => Ok(Some(from_bson(value)?)),
            None => Ok(None),
        }
    }

    /// 최초 저장 시간
    pub async fn created_date(&self, id: ObjectId) -> DataResult<Option<DateTime>> {
        self.field_value_by_id(id, "createdDate").await
    }
}
