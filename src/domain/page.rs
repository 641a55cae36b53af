//! # 정렬과 페이지
//!
//! [`PageRequest`]는 0부터 시작하는 페이지 번호와 페이지 크기, 선택적 정렬을
//! 담습니다. [`Page`]는 한 페이지의 내용과 같은 필터로 센 전체 개수입니다.
//!
//! 전체 개수와 내용은 저장소에 대한 두 번의 독립된 요청으로 얻습니다.
//! 두 요청 사이에 다른 쓰기가 끼어들면 `total_elements` 와 실제 내용이
//! 어긋날 수 있으며, 이는 의도된 약한 일관성입니다.

use mongodb::bson::Document;
use serde::Serialize;

use crate::domain::criteria::storage_field;
use crate::errors::{DataError, DataResult};
use crate::utils::string_utils::validate_field_path;

/// 정렬 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Asc,
    Desc,
}

/// 다중 필드 정렬
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sort {
    orders: Vec<(String, Direction)>,
}

impl Sort {
    pub fn by(field: impl Into<String>, direction: Direction) -> Self {
        Sort {
            orders: vec![(field.into(), direction)],
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::by(field, Direction::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::by(field, Direction::Desc)
    }

    /// 보조 정렬 키 추가
    pub fn then(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.orders.push((field.into(), direction));
        self
    }

    pub fn orders(&self) -> &[(String, Direction)] {
        &self.orders
    }

    pub fn to_document(&self) -> DataResult<Document> {
        let mut rendered = Document::new();
        for (field, direction) in &self.orders {
            validate_field_path(field)?;
            let value = match direction {
                Direction::Asc => 1,
                Direction::Desc => -1,
            };
            rendered.insert(storage_field(field), value);
        }
        Ok(rendered)
    }
}

/// 페이지 요청
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    size: u64,
    sort: Option<Sort>,
}

impl PageRequest {
    /// 페이지 요청 생성. 페이지 크기가 0이면 `ValidationError`.
    pub fn of(page: u64, size: u64) -> DataResult<Self> {
        if size == 0 {
            return Err(DataError::ValidationError(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(PageRequest {
            page,
            size,
            sort: None,
        })
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// 건너뛸 문서 수 (`page * size`)
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

/// 한 페이지의 조회 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_number: u64,
    pub page_size: u64,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Page {
            content,
            page_number: request.page(),
            page_size: request.size(),
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(self.page_size.max(1))
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn has_next(&self) -> bool {
        self.page_number.saturating_add(1) < self.total_pages()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
        }
    }
}

/// 정렬이 지정되지 않으면 `None`
pub(crate) fn sort_document(sort: Option<&Sort>) -> DataResult<Option<Document>> {
    sort.map(Sort::to_document).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_zero_page_size_is_rejected() {
        assert!(matches!(
            PageRequest::of(0, 0),
            Err(DataError::ValidationError(_))
        ));
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::of(0, 10).unwrap().offset(), 0);
        assert_eq!(PageRequest::of(3, 10).unwrap().offset(), 30);
    }

    #[test]
    fn test_sort_render() {
        let sort = Sort::desc("createdDate").then("id", Direction::Asc);

        assert_eq!(sort.to_document().unwrap(), doc! { "createdDate": -1, "_id": 1 });
    }

    #[test]
    fn test_page_navigation() {
        let request = PageRequest::of(1, 2).unwrap();
        let page = Page::new(vec![3, 4], &request, 5);

        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(!page.is_last());
        assert_eq!(page.number_of_elements(), 2);

        let last = Page::new(vec![5], &PageRequest::of(2, 2).unwrap(), 5);
        assert!(last.is_last());
    }

    #[test]
    fn test_last_possible_page_number_has_no_next() {
        let request = PageRequest::of(u64::MAX, 10).unwrap();
        let page = Page::<i32>::new(Vec::new(), &request, u64::MAX);

        assert_eq!(request.offset(), u64::MAX);
        assert!(!page.has_next());
        assert!(page.is_last());
    }

    #[test]
    fn test_page_map_and_json_shape() {
        let page = Page::new(vec![1, 2], &PageRequest::of(0, 2).unwrap(), 2).map(|n| n * 10);
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["content"], serde_json::json!([10, 20]));
        assert_eq!(json["totalElements"], 2);
        assert_eq!(json["pageNumber"], 0);
    }
}
