// Admin domain model
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Admin {
    pub id: i64,
    pub username: String,
}
