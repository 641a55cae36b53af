//! 조회 연산
//!
//! 단건/다건/페이지 조회와 참조(DBRef) 조회, 개수 연산입니다.
//! 어떤 조회도 삭제 플래그 조건을 암묵적으로 추가하지 않습니다.

use log::debug;
use mongodb::bson::{Bson, Document, oid::ObjectId};

use super::SupportRepository;
use crate::domain::criteria::{Criteria, ID_FIELD, storage_field};
use crate::domain::entities::SupportModel;
use crate::domain::page::{Page, PageRequest, Sort, sort_document};
use crate::domain::projection::{Projection, single_field};
use crate::errors::{DataError, DataResult};
use crate::store::FindQuery;

impl<T: SupportModel> SupportRepository<T> {
    /// 조건과 일치하는 첫 번째 엔티티
    pub async fn find_one(
        &self,
        criteria: &Criteria,
        projection: Option<&Projection>,
    ) -> DataResult<Option<T>> {
        let filter = Self::filter(criteria)?;
        let projection = Self::projection(projection)?;
        self.store
            .find_one(T::COLLECTION, filter, projection)
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// 조건과 일치하는 모든 엔티티
    pub async fn find_many(
        &self,
        criteria: &Criteria,
        projection: Option<&Projection>,
        sort: Option<&Sort>,
    ) -> DataResult<Vec<T>> {
        let query = FindQuery::new(Self::filter(criteria)?)
            .projection(Self::projection(projection)?)
            .sort(sort_document(sort)?);
        let documents = self.store.find(T::COLLECTION, query).await?;
        Self::decode_all(documents)
    }

    /// 한 페이지 조회
    ///
    /// 같은 조건으로 전체 개수를 센 뒤 `skip = page * size`, `limit = size` 로
    /// 내용을 조회합니다. 두 요청은 원자적이지 않으므로 그 사이의 쓰기에 따라
    /// `total_elements` 와 내용이 어긋날 수 있습니다.
    ///
    /// # 인자
    ///
    /// * `criteria` - 개수와 내용 조회에 공통으로 쓰는 조건
    /// * `request` - 페이지 번호(0부터), 크기, 정렬
    /// * `projection` - 내용 조회에만 적용되는 프로젝션
    pub async fn find_page(
        &self,
        criteria: &Criteria,
        request: &PageRequest,
        projection: Option<&Projection>,
    ) -> DataResult<Page<T>> {
        let filter = Self::filter(criteria)?;
        let projection = Self::projection(projection)?;
        self.page_of(filter, request, projection).await
    }

    /// 식별자 목록으로 조회합니다. 결과 순서는 보장하지 않습니다.
    pub async fn find_by_ids(
        &self,
        ids: &[ObjectId],
        projection: Option<&Projection>,
    ) -> DataResult<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let criteria = Criteria::is_in(ID_FIELD, ids.iter().copied());
        self.find_many(&criteria, projection, None).await
    }

    /// `ref_field` 참조가 `ref_id` 문서를 가리키는 엔티티
    pub async fn find_by_reference(
        &self,
        ref_field: &str,
        ref_id: ObjectId,
        sort: Option<&Sort>,
    ) -> DataResult<Vec<T>> {
        self.find_many(&reference_criteria(ref_field, ref_id), None, sort)
            .await
    }

    pub async fn find_page_by_reference(
        &self,
        ref_field: &str,
        ref_id: ObjectId,
        request: &PageRequest,
    ) -> DataResult<Page<T>> {
        self.find_page(&reference_criteria(ref_field, ref_id), request, None)
            .await
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DataResult<Option<T>> {
        self.find_one(&Criteria::by_id(id), None).await
    }

    /// 식별자로 조회하되 `projection` 을 적용합니다.
    pub async fn find_by_id_with(
        &self,
        id: ObjectId,
        projection: &Projection,
    ) -> DataResult<Option<T>> {
        self.find_one(&Criteria::by_id(id), Some(projection)).await
    }

    /// 반드시 존재해야 하는 엔티티 조회. 없으면 `NotFound`.
    pub async fn get_one(&self, id: ObjectId) -> DataResult<T> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| missing(T::COLLECTION, &Criteria::by_id(id)))
    }

    /// `field == value` 인 첫 번째 엔티티. 없으면 `NotFound`.
    pub async fn get_one_by_field_is(
        &self,
        field: &str,
        value: impl Into<Bson>,
    ) -> DataResult<T> {
        let criteria = Criteria::is(field, value);
        self.find_one(&criteria, None)
            .await?
            .ok_or_else(|| missing(T::COLLECTION, &criteria))
    }

    pub async fn find_by_field_is(
        &self,
        field: &str,
        value: impl Into<Bson>,
        sort: Option<&Sort>,
    ) -> DataResult<Vec<T>> {
        self.find_many(&Criteria::is(field, value), None, sort).await
    }

    /// 컬렉션 전체 조회. 데이터가 많은 컬렉션에서는 [`Self::find_all_page`]를 사용합니다.
    pub async fn find_all(&self, sort: Option<&Sort>) -> DataResult<Vec<T>> {
        self.find_many(&Criteria::all(), None, sort).await
    }

    pub async fn find_all_page(&self, request: &PageRequest) -> DataResult<Page<T>> {
        self.find_page(&Criteria::all(), request, None).await
    }

    pub async fn count(&self, criteria: &Criteria) -> DataResult<u64> {
        let filter = Self::filter(criteria)?;
        self.store.count(T::COLLECTION, filter).await
    }

    /// `field == value` 인 문서 수
    ///
    /// `deleted` 가 `Some(flag)` 이면 삭제 플래그 조건을 함께 적용합니다.
    pub async fn count_by_field_is(
        &self,
        field: &str,
        value: impl Into<Bson>,
        deleted: Option<bool>,
    ) -> DataResult<u64> {
        self.count(&Criteria::is(field, value).with_deleted(deleted))
            .await
    }

    /// 배열 필드의 원소 수
    ///
    /// 필드가 없거나 `null` 이면 0 입니다. 문서가 없으면 `NotFound`.
    pub async fn count_array_field(&self, id: ObjectId, field: &str) -> DataResult<u64> {
        let projection = single_field(field)?;
        let criteria = Criteria::by_id(id);
        let filter = Self::filter(&criteria)?;
        let document = self
            .store
            .find_one(T::COLLECTION, filter, Some(projection))
            .await?
            .ok_or_else(|| missing(T::COLLECTION, &criteria))?;

        match lookup(&document, field) {
            None | Some(Bson::Null) => Ok(0),
            Some(Bson::Array(items)) => Ok(items.len() as u64),
            Some(other) => Err(DataError::ValidationError(format!(
                "field '{}' of {} is not an array: {}",
                field,
                T::COLLECTION,
                other
            ))),
        }
    }

    async fn page_of(
        &self,
        filter: Document,
        request: &PageRequest,
        projection: Option<Document>,
    ) -> DataResult<Page<T>> {
        let total = self.store.count(T::COLLECTION, filter.clone()).await?;
        let query = FindQuery::new(filter)
            .projection(projection)
            .sort(sort_document(request.sort())?)
            .skip(request.offset())
            .limit(i64::try_from(request.size()).unwrap_or(i64::MAX));
        let content = Self::decode_all(self.store.find(T::COLLECTION, query).await?)?;

        debug!(
            "page {} of {} ({} / {} elements)",
            request.page(),
            T::COLLECTION,
            content.len(),
            total
        );
        Ok(Page::new(content, request, total))
    }
}

/// DBRef 참조 필드의 `$id` 동등 조건
fn reference_criteria(ref_field: &str, ref_id: ObjectId) -> Criteria {
    Criteria::is(format!("{}.$id", ref_field), ref_id)
}

fn missing(collection: &str, criteria: &Criteria) -> DataError {
    let filter = criteria.to_document().unwrap_or_default();
    DataError::not_found("find_one", collection, &filter)
}

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    match path.split_once('.') {
        None => document.get(storage_field(path)),
        Some((head, rest)) => match document.get(head) {
            Some(Bson::Document(inner)) => lookup(inner, rest),
            _ => None,
        },
    }
}
