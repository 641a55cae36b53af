//! # 필드 프로젝션
//!
//! 조회 시 포함하거나 제외할 필드 집합을 선언합니다. 한 스펙 안에서
//! include 모드와 exclude 모드는 서로 배타적입니다.
//!
//! 식별자(`_id`)는 프로젝션과 관계없이 항상 조회됩니다. include 모드는
//! 저장소의 암묵적 `_id` 포함에 의존하고, exclude 모드에서 `_id`/`id` 제외
//! 요청은 렌더링 시 무시됩니다.

use mongodb::bson::{Document, doc};

use crate::domain::criteria::{ID_FIELD, storage_field};
use crate::errors::{DataError, DataResult};
use crate::utils::string_utils::validate_field_path;

/// 프로젝션 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Include,
    Exclude,
}

/// 필드 프로젝션 스펙
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    mode: Option<ProjectionMode>,
    fields: Vec<String>,
}

impl Projection {
    /// 지정한 필드만 포함하는 스펙
    pub fn include_only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut projection = Projection {
            mode: Some(ProjectionMode::Include),
            fields: Vec::new(),
        };
        projection.push_all(fields);
        projection
    }

    /// 지정한 필드를 제외하는 스펙
    pub fn exclude_only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut projection = Projection {
            mode: Some(ProjectionMode::Exclude),
            fields: Vec::new(),
        };
        projection.push_all(fields);
        projection
    }

    /// 포함 필드를 추가합니다. exclude 모드 스펙이면 `ConflictingProjectionError`.
    pub fn include<I, S>(mut self, fields: I) -> DataResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.switch_to(ProjectionMode::Include)?;
        self.push_all(fields);
        Ok(self)
    }

    /// 제외 필드를 추가합니다. include 모드 스펙이면 `ConflictingProjectionError`.
    pub fn exclude<I, S>(mut self, fields: I) -> DataResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.switch_to(ProjectionMode::Exclude)?;
        self.push_all(fields);
        Ok(self)
    }

    pub fn mode(&self) -> Option<ProjectionMode> {
        self.mode
    }

    /// 선언된 필드 목록 (선언 순서, 중복 제거)
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 저장소 프로젝션 문서로 변환합니다.
    pub fn to_document(&self) -> DataResult<Document> {
        let mut rendered = Document::new();
        let flag = match self.mode {
            Some(ProjectionMode::Include) => 1,
            Some(ProjectionMode::Exclude) => 0,
            None => return Ok(rendered),
        };
        for field in &self.fields {
            validate_field_path(field)?;
            let field = storage_field(field);
            if flag == 0 && field == ID_FIELD {
                continue;
            }
            rendered.insert(field, flag);
        }
        Ok(rendered)
    }

    fn switch_to(&mut self, mode: ProjectionMode) -> DataResult<()> {
        match self.mode {
            Some(current) if current != mode => Err(DataError::ConflictingProjectionError(format!(
                "projection is {:?}-only; cannot add {:?} fields {:?}",
                current, mode, self.fields
            ))),
            _ => {
                self.mode = Some(mode);
                Ok(())
            }
        }
    }

    fn push_all<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.fields.contains(&field) {
                self.fields.push(field);
            }
        }
    }
}

/// 단일 필드 include 프로젝션 (필드 값 추출용)
pub(crate) fn single_field(field: &str) -> DataResult<Document> {
    validate_field_path(field)?;
    Ok(doc! { storage_field(field): 1 })
}
