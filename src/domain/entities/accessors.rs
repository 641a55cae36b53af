//! 필드 접근자 테이블
//!
//! 필드 이름에서 타입이 있는 getter 로의 등록 시점 매핑입니다.
//! 런타임 타입 검사 없이 "이름으로 필드 하나를 읽는" 기능을 제공합니다.

use std::collections::HashMap;
use std::fmt;

use mongodb::bson::Bson;

use super::model::SupportModel;
use crate::errors::{DataError, DataResult};

/// 엔티티에서 필드 하나를 읽는 getter. 값이 없으면 `None`.
pub type FieldGetter<T> = fn(&T) -> Option<Bson>;

/// 엔티티 타입별 필드 접근자 테이블
pub struct FieldAccessors<T> {
    getters: HashMap<&'static str, FieldGetter<T>>,
}

impl<T: SupportModel> FieldAccessors<T> {
    /// 빈 테이블
    pub fn new() -> Self {
        FieldAccessors {
            getters: HashMap::new(),
        }
    }

    /// 식별자와 감사 필드가 등록된 테이블
    pub fn with_audit_fields() -> Self {
        Self::new()
            .register("id", |m: &T| m.id().map(Bson::ObjectId))
            .register("createdDate", |m: &T| m.audit().created_date.map(Bson::DateTime))
            .register("lastModifiedDate", |m: &T| {
                m.audit().last_modified_date.map(Bson::DateTime)
            })
            .register("createdBy", |m: &T| m.audit().created_by.clone().map(Bson::String))
            .register("lastModifiedBy", |m: &T| {
                m.audit().last_modified_by.clone().map(Bson::String)
            })
            .register("deleted", |m: &T| Some(Bson::Boolean(m.audit().deleted)))
    }

    /// getter 등록. 같은 이름이 있으면 교체합니다.
    pub fn register(mut self, name: &'static str, getter: FieldGetter<T>) -> Self {
        self.getters.insert(name, getter);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.getters.contains_key(name)
    }

    /// 등록된 필드 이름 (정렬됨)
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.getters.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// 엔티티에서 필드 값을 읽습니다.
    ///
    /// 등록되지 않은 이름은 `MalformedCriteriaError`입니다.
    pub fn read(&self, entity: &T, name: &str) -> DataResult<Option<Bson>> {
        let getter = self.getters.get(name).ok_or_else(|| {
            DataError::MalformedCriteriaError(format!(
                "no field accessor registered for '{}' on {}",
                name,
                T::COLLECTION
            ))
        })?;
        Ok(getter(entity))
    }
}

impl<T: SupportModel> Default for FieldAccessors<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FieldAccessors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.getters.keys()).finish()
    }
}
