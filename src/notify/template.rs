//! Placeholder substitution for notification messages.
//!
//! Tokens are plain substrings. Each recognized token is replaced at its first
//! occurrence only; later occurrences of the same token, and any unknown
//! `{...}` sequence, are left as written.

pub const VISITOR_NAME: &str = "{visitor_name}";
pub const VISITOR_COMPANY: &str = "{visitor_company}";
pub const VISITOR_COMPANY_INFO: &str = "{visitor_company_info}";
pub const STAFF_NAME: &str = "{staff_name}";
pub const STAFF_CHATWORK_ID: &str = "{staff_chatwork_id}";
pub const STAFF_DEPARTMENT: &str = "{staff_department}";

/// Used for appointment notifications when the configured template is empty.
pub const DEFAULT_APPOINTMENT_TEMPLATE: &str = "[info][title]来客のお知らせ[/title]{visitor_name}様{visitor_company_info}が来社されました。\n\n担当: {staff_name}\nChatwork: [To:{staff_chatwork_id}]\n\n応対をお願いいたします。[/info]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffAttributes {
    pub name: String,
    pub chatwork_id: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    pub visitor_name: String,
    pub visitor_company: Option<String>,
    /// `None` leaves the staff tokens untouched (walk-in messages).
    pub staff: Option<StaffAttributes>,
}

impl TemplateContext {
    pub fn visitor(name: impl Into<String>, company: Option<&str>) -> Self {
        Self {
            visitor_name: name.into(),
            visitor_company: company.filter(|c| !c.is_empty()).map(str::to_string),
            staff: None,
        }
    }

    pub fn with_staff(mut self, staff: StaffAttributes) -> Self {
        self.staff = Some(staff);
        self
    }

    fn company_info(&self) -> String {
        self.visitor_company
            .as_deref()
            .map(|c| format!("（{c}）"))
            .unwrap_or_default()
    }
}

pub fn render(template: &str, ctx: &TemplateContext) -> String {
    let company = ctx.visitor_company.as_deref().unwrap_or_default();
    let mut out = template
        .replacen(VISITOR_NAME, &ctx.visitor_name, 1)
        .replacen(VISITOR_COMPANY_INFO, &ctx.company_info(), 1)
        .replacen(VISITOR_COMPANY, company, 1);

    if let Some(staff) = &ctx.staff {
        out = out
            .replacen(STAFF_NAME, &staff.name, 1)
            .replacen(
                STAFF_CHATWORK_ID,
                staff.chatwork_id.as_deref().unwrap_or_default(),
                1,
            )
            .replacen(
                STAFF_DEPARTMENT,
                staff.department.as_deref().unwrap_or_default(),
                1,
            );
    }

    out
}
