//! 식별자 생성기

use mongodb::bson::oid::ObjectId;

/// 저장 시 식별자가 없는 엔티티에 부여할 ID 를 만듭니다.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> ObjectId;
}

/// `ObjectId::new()` 기반 기본 생성기
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectIdGenerator;

impl IdGenerator for ObjectIdGenerator {
    fn next_id(&self) -> ObjectId {
        ObjectId::new()
    }
}
