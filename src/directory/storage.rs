use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::shared::error::{StoreError, StoreResult};
use crate::core::shared::schema::{companies, staff_members};
use crate::core::shared::utils::{with_conn, DbPool};

use super::types::{Company, CompanyInput, StaffInput, StaffListing, StaffMember, StaffWithCompany};

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn list_companies(&self) -> StoreResult<Vec<Company>>;
    async fn get_company(&self, id: Uuid) -> StoreResult<Option<Company>>;
    async fn create_company(&self, input: CompanyInput) -> StoreResult<Company>;
    async fn update_company(&self, id: Uuid, input: CompanyInput) -> StoreResult<Company>;
    async fn delete_company(&self, id: Uuid) -> StoreResult<()>;

    async fn list_staff(&self) -> StoreResult<Vec<StaffListing>>;
    async fn list_staff_for_company(&self, company_id: Uuid) -> StoreResult<Vec<StaffMember>>;
    async fn get_staff(&self, id: Uuid) -> StoreResult<Option<StaffWithCompany>>;
    async fn create_staff(&self, input: StaffInput) -> StoreResult<StaffMember>;
    async fn update_staff(&self, id: Uuid, input: StaffInput) -> StoreResult<StaffMember>;
    async fn delete_staff(&self, id: Uuid) -> StoreResult<()>;
}

pub struct PgDirectoryStore {
    pool: DbPool,
}

impl PgDirectoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        with_conn(&self.pool, |conn| {
            Ok(companies::table
                .order(companies::name.asc())
                .load::<Company>(conn)?)
        })
        .await
    }

    async fn get_company(&self, id: Uuid) -> StoreResult<Option<Company>> {
        with_conn(&self.pool, move |conn| {
            Ok(companies::table
                .find(id)
                .first::<Company>(conn)
                .optional()?)
        })
        .await
    }

    async fn create_company(&self, input: CompanyInput) -> StoreResult<Company> {
        with_conn(&self.pool, move |conn| {
            let now = Utc::now();
            let company = Company {
                id: Uuid::new_v4(),
                name: input.name,
                chatwork_room_id: input.chatwork_room_id,
                created_at: now,
                updated_at: now,
            };
            diesel::insert_into(companies::table)
                .values(&company)
                .execute(conn)?;
            Ok(company)
        })
        .await
    }

    async fn update_company(&self, id: Uuid, input: CompanyInput) -> StoreResult<Company> {
        with_conn(&self.pool, move |conn| {
            diesel::update(companies::table.find(id))
                .set((
                    companies::name.eq(input.name),
                    companies::chatwork_room_id.eq(input.chatwork_room_id),
                    companies::updated_at.eq(Utc::now()),
                ))
                .get_result::<Company>(conn)
                .optional()?
                .ok_or_else(|| StoreError::NotFound(format!("company {id}")))
        })
        .await
    }

    async fn delete_company(&self, id: Uuid) -> StoreResult<()> {
        with_conn(&self.pool, move |conn| {
            let deleted = diesel::delete(companies::table.find(id)).execute(conn)?;
            if deleted == 0 {
                return Err(StoreError::NotFound(format!("company {id}")));
            }
            Ok(())
        })
        .await
    }

    async fn list_staff(&self) -> StoreResult<Vec<StaffListing>> {
        with_conn(&self.pool, |conn| {
            let rows: Vec<(StaffMember, Option<String>)> = staff_members::table
                .left_join(companies::table)
                .order(staff_members::name.asc())
                .select((staff_members::all_columns, companies::name.nullable()))
                .load(conn)?;
            Ok(rows
                .into_iter()
                .map(|(staff, company_name)| StaffListing {
                    staff,
                    company_name,
                })
                .collect())
        })
        .await
    }

    async fn list_staff_for_company(&self, company_id: Uuid) -> StoreResult<Vec<StaffMember>> {
        with_conn(&self.pool, move |conn| {
            Ok(staff_members::table
                .filter(staff_members::company_id.eq(company_id))
                .order(staff_members::name.asc())
                .load::<StaffMember>(conn)?)
        })
        .await
    }

    async fn get_staff(&self, id: Uuid) -> StoreResult<Option<StaffWithCompany>> {
        with_conn(&self.pool, move |conn| {
            let row: Option<(StaffMember, Option<Company>)> = staff_members::table
                .left_join(companies::table)
                .filter(staff_members::id.eq(id))
                .select((staff_members::all_columns, companies::all_columns.nullable()))
                .first(conn)
                .optional()?;
            Ok(row.map(|(staff, company)| StaffWithCompany { staff, company }))
        })
        .await
    }

    async fn create_staff(&self, input: StaffInput) -> StoreResult<StaffMember> {
        with_conn(&self.pool, move |conn| {
            let now = Utc::now();
            let staff = StaffMember {
                id: Uuid::new_v4(),
                company_id: input.company_id,
                name: input.name,
                department: input.department,
                chatwork_id: input.chatwork_id,
                photo_url: input.photo_url,
                created_at: now,
                updated_at: now,
            };
            diesel::insert_into(staff_members::table)
                .values(&staff)
                .execute(conn)?;
            Ok(staff)
        })
        .await
    }

    async fn update_staff(&self, id: Uuid, input: StaffInput) -> StoreResult<StaffMember> {
        with_conn(&self.pool, move |conn| {
            diesel::update(staff_members::table.find(id))
                .set((
                    staff_members::name.eq(input.name),
                    staff_members::company_id.eq(input.company_id),
                    staff_members::department.eq(input.department),
                    staff_members::chatwork_id.eq(input.chatwork_id),
                    staff_members::photo_url.eq(input.photo_url),
                    staff_members::updated_at.eq(Utc::now()),
                ))
                .get_result::<StaffMember>(conn)
                .optional()?
                .ok_or_else(|| StoreError::NotFound(format!("staff member {id}")))
        })
        .await
    }

    async fn delete_staff(&self, id: Uuid) -> StoreResult<()> {
        with_conn(&self.pool, move |conn| {
            let deleted = diesel::delete(staff_members::table.find(id)).execute(conn)?;
            if deleted == 0 {
                return Err(StoreError::NotFound(format!("staff member {id}")));
            }
            Ok(())
        })
        .await
    }
}

/// Map-backed directory used by tests and local runs without a database.
/// Methods that need both maps lock `companies` before `staff`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectoryStore {
    companies: Arc<RwLock<HashMap<Uuid, Company>>>,
    staff: Arc<RwLock<HashMap<Uuid, StaffMember>>>,
}

impl InMemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_name<T, F>(mut items: Vec<T>, name: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| name(a).cmp(name(b)));
    items
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let companies = self.companies.read().await;
        Ok(sorted_by_name(companies.values().cloned().collect(), |c| {
            c.name.as_str()
        }))
    }

    async fn get_company(&self, id: Uuid) -> StoreResult<Option<Company>> {
        Ok(self.companies.read().await.get(&id).cloned())
    }

    async fn create_company(&self, input: CompanyInput) -> StoreResult<Company> {
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: input.name,
            chatwork_room_id: input.chatwork_room_id,
            created_at: now,
            updated_at: now,
        };
        self.companies
            .write()
            .await
            .insert(company.id, company.clone());
        Ok(company)
    }

    async fn update_company(&self, id: Uuid, input: CompanyInput) -> StoreResult<Company> {
        let mut companies = self.companies.write().await;
        let company = companies
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("company {id}")))?;
        company.name = input.name;
        company.chatwork_room_id = input.chatwork_room_id;
        company.updated_at = Utc::now();
        Ok(company.clone())
    }

    async fn delete_company(&self, id: Uuid) -> StoreResult<()> {
        let mut companies = self.companies.write().await;
        if companies.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("company {id}")));
        }
        // ON DELETE SET NULL
        for staff in self.staff.write().await.values_mut() {
            if staff.company_id == Some(id) {
                staff.company_id = None;
            }
        }
        Ok(())
    }

    async fn list_staff(&self) -> StoreResult<Vec<StaffListing>> {
        let companies = self.companies.read().await;
        let staff = self.staff.read().await;
        let listings = staff
            .values()
            .map(|s| StaffListing {
                staff: s.clone(),
                company_name: s
                    .company_id
                    .and_then(|cid| companies.get(&cid))
                    .map(|c| c.name.clone()),
            })
            .collect();
        Ok(sorted_by_name(listings, |l| l.staff.name.as_str()))
    }

    async fn list_staff_for_company(&self, company_id: Uuid) -> StoreResult<Vec<StaffMember>> {
        let staff = self.staff.read().await;
        Ok(sorted_by_name(
            staff
                .values()
                .filter(|s| s.company_id == Some(company_id))
                .cloned()
                .collect(),
            |s| s.name.as_str(),
        ))
    }

    async fn get_staff(&self, id: Uuid) -> StoreResult<Option<StaffWithCompany>> {
        let companies = self.companies.read().await;
        let staff = self.staff.read().await;
        let Some(member) = staff.get(&id) else {
            return Ok(None);
        };
        let company = member.company_id.and_then(|cid| companies.get(&cid)).cloned();
        Ok(Some(StaffWithCompany {
            staff: member.clone(),
            company,
        }))
    }

    async fn create_staff(&self, input: StaffInput) -> StoreResult<StaffMember> {
        let now = Utc::now();
        let member = StaffMember {
            id: Uuid::new_v4(),
            company_id: input.company_id,
            name: input.name,
            department: input.department,
            chatwork_id: input.chatwork_id,
            photo_url: input.photo_url,
            created_at: now,
            updated_at: now,
        };
        self.staff.write().await.insert(member.id, member.clone());
        Ok(member)
    }

    async fn update_staff(&self, id: Uuid, input: StaffInput) -> StoreResult<StaffMember> {
        let mut staff = self.staff.write().await;
        let member = staff
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("staff member {id}")))?;
        member.name = input.name;
        member.company_id = input.company_id;
        member.department = input.department;
        member.chatwork_id = input.chatwork_id;
        member.photo_url = input.photo_url;
        member.updated_at = Utc::now();
        Ok(member.clone())
    }

    async fn delete_staff(&self, id: Uuid) -> StoreResult<()> {
        if self.staff.write().await.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("staff member {id}")));
        }
        Ok(())
    }
}
