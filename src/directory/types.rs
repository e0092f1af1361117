use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::error::{StoreError, StoreResult};
use crate::core::shared::schema::{companies, staff_members};
use crate::core::shared::utils::non_blank;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = companies)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub chatwork_room_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = staff_members)]
pub struct StaffMember {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub name: String,
    pub department: Option<String>,
    pub chatwork_id: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A staff member together with the company it belongs to, if that company still exists.
#[derive(Debug, Clone, Serialize)]
pub struct StaffWithCompany {
    pub staff: StaffMember,
    pub company: Option<Company>,
}

/// Row shape for the admin staff listing.
#[derive(Debug, Clone, Serialize)]
pub struct StaffListing {
    #[serde(flatten)]
    pub staff: StaffMember,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyInput {
    pub name: String,
    pub chatwork_room_id: Option<String>,
}

impl CompanyInput {
    pub fn validated(self) -> StoreResult<Self> {
        let name = non_blank(Some(self.name.as_str()))
            .ok_or_else(|| StoreError::Validation("company name is required".to_string()))?
            .to_string();
        Ok(Self {
            name,
            chatwork_room_id: non_blank(self.chatwork_room_id.as_deref()).map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffInput {
    pub name: String,
    pub company_id: Option<Uuid>,
    pub department: Option<String>,
    pub chatwork_id: Option<String>,
    pub photo_url: Option<String>,
}

impl StaffInput {
    pub fn validated(self) -> StoreResult<Self> {
        let name = non_blank(Some(self.name.as_str()))
            .ok_or_else(|| StoreError::Validation("staff name is required".to_string()))?
            .to_string();
        if self.company_id.is_none() {
            return Err(StoreError::Validation("company is required".to_string()));
        }
        Ok(Self {
            name,
            company_id: self.company_id,
            department: non_blank(self.department.as_deref()).map(str::to_string),
            chatwork_id: non_blank(self.chatwork_id.as_deref()).map(str::to_string),
            photo_url: non_blank(self.photo_url.as_deref()).map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_input_trims_and_drops_blank_room() {
        let input = CompanyInput {
            name: "  Acme  ".to_string(),
            chatwork_room_id: Some("   ".to_string()),
        }
        .validated()
        .expect("valid");
        assert_eq!(input.name, "Acme");
        assert_eq!(input.chatwork_room_id, None);
    }

    #[test]
    fn test_company_input_requires_name() {
        let err = CompanyInput::default().validated().expect_err("blank name");
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_staff_input_requires_company() {
        let err = StaffInput {
            name: "Sato".to_string(),
            ..Default::default()
        }
        .validated()
        .expect_err("missing company");
        assert!(matches!(err, StoreError::Validation(msg) if msg.contains("company")));
    }

    #[test]
    fn test_staff_input_normalizes_optional_fields() {
        let input = StaffInput {
            name: "Sato".to_string(),
            company_id: Some(Uuid::new_v4()),
            department: Some(String::new()),
            chatwork_id: Some(" 123 ".to_string()),
            photo_url: None,
        }
        .validated()
        .expect("valid");
        assert_eq!(input.department, None);
        assert_eq!(input.chatwork_id.as_deref(), Some("123"));
    }
}
