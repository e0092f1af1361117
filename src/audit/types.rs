use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::schema::{error_logs, visitor_logs};

pub const DEFAULT_LOG_LIMIT: i64 = 100;
pub const MAX_LOG_LIMIT: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = visitor_logs)]
pub struct VisitorLog {
    pub id: Uuid,
    pub visitor_name: String,
    pub visitor_company: String,
    pub staff_member_id: Option<Uuid>,
    pub has_appointment: bool,
    pub created_at: DateTime<Utc>,
}

impl VisitorLog {
    /// Walk-in visits never carry a staff reference, appointments always do.
    pub fn appointment(visitor_name: &str, visitor_company: Option<&str>, staff_member_id: Uuid) -> Self {
        Self::build(visitor_name, visitor_company, Some(staff_member_id))
    }

    pub fn walk_in(visitor_name: &str, visitor_company: Option<&str>) -> Self {
        Self::build(visitor_name, visitor_company, None)
    }

    fn build(visitor_name: &str, visitor_company: Option<&str>, staff_member_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            visitor_name: visitor_name.to_string(),
            visitor_company: visitor_company.unwrap_or_default().to_string(),
            staff_member_id,
            has_appointment: staff_member_id.is_some(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = error_logs)]
pub struct ErrorLog {
    pub id: Uuid,
    pub error_message: String,
    pub error_stack: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ErrorLog {
    pub fn new(error_message: impl Into<String>, error_stack: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            error_message: error_message.into(),
            error_stack,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitorLogEntry {
    #[serde(flatten)]
    pub log: VisitorLog,
    pub staff_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    pub limit: Option<i64>,
}

impl LogQuery {
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LOG_LIMIT)
            .clamp(1, MAX_LOG_LIMIT)
    }
}
