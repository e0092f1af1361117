use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::audit::storage::AuditLogStore;
use crate::audit::types::{ErrorLog, VisitorLog};
use crate::core::config::MAX_CHATWORK_TIMEOUT;
use crate::core::shared::utils::non_blank;
use crate::directory::storage::DirectoryStore;
use crate::settings::storage::SettingsStore;

use super::chatwork::ChatworkClient;
use super::error::NotifyError;
use super::template::{render, StaffAttributes, TemplateContext, DEFAULT_APPOINTMENT_TEMPLATE};

fn default_has_appointment() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRequest {
    pub visitor_name: String,
    #[serde(default)]
    pub visitor_company: Option<String>,
    #[serde(default)]
    pub staff_id: Option<Uuid>,
    #[serde(default = "default_has_appointment")]
    pub has_appointment: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPath {
    Appointment,
    WalkIn,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchReceipt {
    pub path: DispatchPath,
    pub room_id: String,
    pub message: String,
    pub message_id: Option<String>,
    pub visitor_log_id: Uuid,
}

/// Room and rendered text resolved from settings and the directory.
struct PreparedMessage {
    path: DispatchPath,
    room_id: String,
    message: String,
    staff_id: Option<Uuid>,
}

/// Turns a kiosk check-in into one Chatwork message plus audit records.
///
/// Each call performs at most one room check, one send and one visitor log
/// insert. Every failure is written to the error log once and returned
/// unchanged. Nothing is retried.
pub struct NotificationDispatcher {
    directory: Arc<dyn DirectoryStore>,
    settings: Arc<dyn SettingsStore>,
    audit: Arc<dyn AuditLogStore>,
    chatwork: ChatworkClient,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        settings: Arc<dyn SettingsStore>,
        audit: Arc<dyn AuditLogStore>,
        chatwork: ChatworkClient,
        timeout: Duration,
    ) -> Self {
        Self {
            directory,
            settings,
            audit,
            chatwork,
            timeout: timeout.min(MAX_CHATWORK_TIMEOUT),
        }
    }

    pub async fn dispatch(&self, request: &VisitRequest) -> Result<DispatchReceipt, NotifyError> {
        match self.deliver(request).await {
            Ok(receipt) => {
                info!(
                    "Visitor notification sent to room {} ({:?}), log {}",
                    receipt.room_id, receipt.path, receipt.visitor_log_id
                );
                Ok(receipt)
            }
            Err(e) => {
                error!(
                    "Visitor notification failed: {} [visitor={:?} company={:?} staff_id={:?} has_appointment={}]",
                    e,
                    request.visitor_name,
                    request.visitor_company,
                    request.staff_id,
                    request.has_appointment
                );
                self.record_failure(&e).await;
                Err(e)
            }
        }
    }

    async fn deliver(&self, request: &VisitRequest) -> Result<DispatchReceipt, NotifyError> {
        let visitor_name = request.visitor_name.trim();
        if visitor_name.is_empty() {
            return Err(NotifyError::Validation("visitor name is required".to_string()));
        }
        let visitor_company = non_blank(request.visitor_company.as_deref());

        let settings = self
            .settings
            .chatwork_settings()
            .await
            .map_err(|e| NotifyError::Storage(format!("Chatwork settings: {e}")))?
            .ok_or_else(|| {
                NotifyError::Configuration("Chatwork settings are not configured".to_string())
            })?;
        let api_key = non_blank(Some(settings.api_key.as_str())).ok_or_else(|| {
            NotifyError::Configuration("Chatwork API key is not set".to_string())
        })?;

        let context = TemplateContext::visitor(visitor_name, visitor_company);
        let prepared = match (request.has_appointment, request.staff_id) {
            (true, Some(staff_id)) => {
                self.prepare_appointment(staff_id, &settings.message_template, context)
                    .await?
            }
            _ => self.prepare_walk_in(context).await?,
        };

        let room_id = non_blank(Some(prepared.room_id.as_str()))
            .ok_or_else(|| NotifyError::Configuration("Chatwork room is not set".to_string()))?;

        debug!(
            "Chatwork request: room={} message_length={} path={:?}",
            room_id,
            prepared.message.chars().count(),
            prepared.path
        );

        let deadline = Instant::now() + self.timeout;
        self.chatwork
            .check_room(api_key, room_id, deadline)
            .await
            .map_err(|e| NotifyError::from_room_check(room_id, e))?;
        let message_id = self
            .chatwork
            .post_message(api_key, room_id, &prepared.message, deadline)
            .await
            .map_err(NotifyError::from_send)?;

        let log = match prepared.staff_id {
            Some(staff_id) => VisitorLog::appointment(visitor_name, visitor_company, staff_id),
            None => VisitorLog::walk_in(visitor_name, visitor_company),
        };
        let saved = self
            .audit
            .append_visitor_log(log)
            .await
            .map_err(|e| NotifyError::Persistence(e.to_string()))?;

        Ok(DispatchReceipt {
            path: prepared.path,
            room_id: room_id.to_string(),
            message: prepared.message,
            message_id,
            visitor_log_id: saved.id,
        })
    }

    async fn prepare_appointment(
        &self,
        staff_id: Uuid,
        configured_template: &str,
        context: TemplateContext,
    ) -> Result<PreparedMessage, NotifyError> {
        let found = self
            .directory
            .get_staff(staff_id)
            .await
            .map_err(|e| NotifyError::Storage(format!("staff member: {e}")))?
            .ok_or_else(|| NotifyError::NotFound(format!("staff member {staff_id}")))?;
        let company = found.company.ok_or_else(|| {
            NotifyError::NotFound(format!("company of staff member {}", found.staff.name))
        })?;
        let room_id = company.chatwork_room_id.ok_or_else(|| {
            NotifyError::Configuration(format!(
                "Chatwork room ID is not set for {}",
                company.name
            ))
        })?;

        let template = if configured_template.trim().is_empty() {
            DEFAULT_APPOINTMENT_TEMPLATE
        } else {
            configured_template
        };
        let context = context.with_staff(StaffAttributes {
            name: found.staff.name,
            chatwork_id: found.staff.chatwork_id,
            department: found.staff.department,
        });

        Ok(PreparedMessage {
            path: DispatchPath::Appointment,
            room_id,
            message: render(template, &context),
            staff_id: Some(staff_id),
        })
    }

    async fn prepare_walk_in(&self, context: TemplateContext) -> Result<PreparedMessage, NotifyError> {
        let walkin = self
            .settings
            .walkin_settings()
            .await
            .map_err(|e| NotifyError::Storage(format!("walk-in settings: {e}")))?
            .ok_or_else(|| {
                NotifyError::Configuration("walk-in notification settings are not configured".to_string())
            })?;
        if walkin.chatwork_room_id.trim().is_empty() {
            return Err(NotifyError::Configuration(
                "walk-in Chatwork room ID is not set".to_string(),
            ));
        }
        if walkin.message_template.trim().is_empty() {
            return Err(NotifyError::Configuration(
                "walk-in message template is not set".to_string(),
            ));
        }

        Ok(PreparedMessage {
            path: DispatchPath::WalkIn,
            message: render(&walkin.message_template, &context),
            room_id: walkin.chatwork_room_id,
            staff_id: None,
        })
    }

    async fn record_failure(&self, e: &NotifyError) {
        let entry = ErrorLog::new(e.to_string(), Some(format!("{e:?}")));
        if let Err(log_err) = self.audit.append_error_log(entry).await {
            warn!("Failed to record error log: {log_err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::storage::InMemoryAuditLogStore;
    use crate::audit::types::VisitorLogEntry;
    use crate::core::shared::error::{StoreError, StoreResult};
    use crate::directory::storage::InMemoryDirectoryStore;
    use crate::directory::types::{CompanyInput, StaffInput};
    use crate::notify::error::RemoteErrorKind;
    use crate::settings::storage::InMemorySettingsStore;
    use crate::settings::types::{ChatworkSettingsInput, WalkinSettingsInput};
    use async_trait::async_trait;
    use mockito::{Matcher, Server};
    use std::sync::atomic::{AtomicUsize, Ordering};

    impl VisitRequest {
        fn appointment(visitor_name: &str, visitor_company: Option<&str>, staff_id: Uuid) -> Self {
            Self {
                visitor_name: visitor_name.to_string(),
                visitor_company: visitor_company.map(str::to_string),
                staff_id: Some(staff_id),
                has_appointment: true,
            }
        }

        fn walk_in(visitor_name: &str, visitor_company: Option<&str>) -> Self {
            Self {
                visitor_name: visitor_name.to_string(),
                visitor_company: visitor_company.map(str::to_string),
                staff_id: None,
                has_appointment: false,
            }
        }
    }

    struct Fixture {
        directory: InMemoryDirectoryStore,
        settings: InMemorySettingsStore,
        audit: InMemoryAuditLogStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                directory: InMemoryDirectoryStore::new(),
                settings: InMemorySettingsStore::new(),
                audit: InMemoryAuditLogStore::new(),
            }
        }

        fn dispatcher(&self, base_url: &str) -> NotificationDispatcher {
            NotificationDispatcher::new(
                Arc::new(self.directory.clone()),
                Arc::new(self.settings.clone()),
                Arc::new(self.audit.clone()),
                ChatworkClient::new(base_url),
                Duration::from_secs(5),
            )
        }

        async fn chatwork(&self, api_key: &str, template: &str) {
            self.settings
                .save_chatwork_settings(ChatworkSettingsInput {
                    api_key: api_key.to_string(),
                    message_template: template.to_string(),
                })
                .await
                .expect("save chatwork settings");
        }

        async fn walkin(&self, room: &str, template: &str) {
            self.settings
                .save_walkin_settings(WalkinSettingsInput {
                    chatwork_room_id: room.to_string(),
                    message_template: template.to_string(),
                })
                .await
                .expect("save walk-in settings");
        }

        async fn staff(&self, room: Option<&str>, chatwork_id: Option<&str>) -> Uuid {
            let company = self
                .directory
                .create_company(CompanyInput {
                    name: "Acme".to_string(),
                    chatwork_room_id: room.map(str::to_string),
                })
                .await
                .expect("company");
            self.directory
                .create_staff(StaffInput {
                    name: "Staff".to_string(),
                    company_id: Some(company.id),
                    chatwork_id: chatwork_id.map(str::to_string),
                    ..Default::default()
                })
                .await
                .expect("staff")
                .id
        }
    }

    async fn room_ok(server: &mut Server, room: &str) -> mockito::Mock {
        server
            .mock("GET", format!("/rooms/{room}").as_str())
            .match_header("x-chatworktoken", "K")
            .with_status(200)
            .with_body(format!(r#"{{"room_id": 1, "name": "{room}"}}"#))
            .expect(1)
            .create_async()
            .await
    }

    async fn send(server: &mut Server, room: &str, status: usize, body: &str) -> mockito::Mock {
        server
            .mock("POST", format!("/rooms/{room}/messages").as_str())
            .match_header("x-chatworktoken", "K")
            .match_body(Matcher::UrlEncoded("body".into(), body.into()))
            .with_status(status)
            .with_body(r#"{"message_id": "99"}"#)
            .expect(1)
            .create_async()
            .await
    }

    async fn no_remote_calls(server: &mut Server) -> mockito::Mock {
        server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_appointment_scenario() {
        let mut server = Server::new_async().await;
        let fx = Fixture::new();
        fx.chatwork("K", "{visitor_name} arrived").await;
        let staff_id = fx.staff(Some("R1"), Some("123")).await;

        let room_check = room_ok(&mut server, "R1").await;
        let post = send(&mut server, "R1", 200, "Taro arrived").await;

        let receipt = fx
            .dispatcher(&server.url())
            .dispatch(&VisitRequest::appointment("Taro", None, staff_id))
            .await
            .expect("dispatch");

        assert_eq!(receipt.path, DispatchPath::Appointment);
        assert_eq!(receipt.room_id, "R1");
        assert_eq!(receipt.message, "Taro arrived");
        assert_eq!(receipt.message_id.as_deref(), Some("99"));
        room_check.assert_async().await;
        post.assert_async().await;

        let visits = fx.audit.visitor_logs().await;
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].id, receipt.visitor_log_id);
        assert_eq!(visits[0].staff_member_id, Some(staff_id));
        assert!(visits[0].has_appointment);
        assert!(fx.audit.error_logs().await.is_empty());
    }

    #[tokio::test]
    async fn test_walk_in_scenario() {
        let mut server = Server::new_async().await;
        let fx = Fixture::new();
        fx.chatwork("K", "unused").await;
        fx.walkin("R2", "Walkin: {visitor_name}{visitor_company_info}").await;

        let room_check = room_ok(&mut server, "R2").await;
        let post = send(&mut server, "R2", 200, "Walkin: Hanako（Acme）").await;

        let receipt = fx
            .dispatcher(&server.url())
            .dispatch(&VisitRequest::walk_in("Hanako", Some("Acme")))
            .await
            .expect("dispatch");

        assert_eq!(receipt.path, DispatchPath::WalkIn);
        assert_eq!(receipt.room_id, "R2");
        assert_eq!(receipt.message, "Walkin: Hanako（Acme）");
        room_check.assert_async().await;
        post.assert_async().await;

        let visits = fx.audit.visitor_logs().await;
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].staff_member_id, None);
        assert!(!visits[0].has_appointment);
        assert_eq!(visits[0].visitor_company, "Acme");
    }

    #[tokio::test]
    async fn test_appointment_without_staff_takes_walk_in_path() {
        let mut server = Server::new_async().await;
        let fx = Fixture::new();
        fx.chatwork("K", "unused").await;
        fx.walkin("R2", "{visitor_name} / {staff_name}").await;

        room_ok(&mut server, "R2").await;
        send(&mut server, "R2", 200, "Ken / {staff_name}").await;

        let request = VisitRequest {
            visitor_name: "Ken".to_string(),
            visitor_company: None,
            staff_id: None,
            has_appointment: true,
        };
        let receipt = fx
            .dispatcher(&server.url())
            .dispatch(&request)
            .await
            .expect("dispatch");
        assert_eq!(receipt.path, DispatchPath::WalkIn);

        let visits = fx.audit.visitor_logs().await;
        assert!(!visits[0].has_appointment);
        assert_eq!(visits[0].staff_member_id, None);
    }

    #[tokio::test]
    async fn test_default_template_when_configured_template_empty() {
        let mut server = Server::new_async().await;
        let fx = Fixture::new();
        fx.chatwork("K", "").await;
        let staff_id = fx.staff(Some("R1"), Some("123")).await;

        room_ok(&mut server, "R1").await;
        server
            .mock("POST", "/rooms/R1/messages")
            .match_body(Matcher::Regex("To%3A123".to_string()))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let receipt = fx
            .dispatcher(&server.url())
            .dispatch(&VisitRequest::appointment("Taro", Some("Acme"), staff_id))
            .await
            .expect("dispatch");
        assert!(receipt.message.starts_with("[info][title]来客のお知らせ[/title]Taro様（Acme）"));
        assert_eq!(receipt.message_id, None);
    }

    #[tokio::test]
    async fn test_empty_visitor_name_fails_validation() {
        let mut server = Server::new_async().await;
        let guard = no_remote_calls(&mut server).await;
        let fx = Fixture::new();
        fx.chatwork("K", "t").await;

        let err = fx
            .dispatcher(&server.url())
            .dispatch(&VisitRequest::walk_in("   ", None))
            .await
            .expect_err("validation");
        assert!(matches!(err, NotifyError::Validation(_)));
        guard.assert_async().await;
        assert_eq!(fx.audit.error_logs().await.len(), 1);
        assert!(fx.audit.visitor_logs().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_chatwork_settings_is_configuration_error() {
        let mut server = Server::new_async().await;
        let guard = no_remote_calls(&mut server).await;
        let fx = Fixture::new();
        fx.walkin("R2", "t").await;

        let err = fx
            .dispatcher(&server.url())
            .dispatch(&VisitRequest::walk_in("Hanako", None))
            .await
            .expect_err("not configured");
        assert!(matches!(err, NotifyError::Configuration(_)));
        guard.assert_async().await;

        let errors = fx.audit.error_logs().await;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_message, err.to_string());
    }

    #[tokio::test]
    async fn test_company_without_room_fails_before_remote_calls() {
        let mut server = Server::new_async().await;
        let guard = no_remote_calls(&mut server).await;
        let fx = Fixture::new();
        fx.chatwork("K", "{visitor_name}").await;
        let staff_id = fx.staff(None, Some("123")).await;

        let err = fx
            .dispatcher(&server.url())
            .dispatch(&VisitRequest::appointment("Taro", None, staff_id))
            .await
            .expect_err("no room");
        assert!(matches!(err, NotifyError::Configuration(ref msg) if msg.contains("Acme")));
        guard.assert_async().await;
        assert_eq!(fx.audit.error_logs().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_staff_is_not_found() {
        let server = Server::new_async().await;
        let fx = Fixture::new();
        fx.chatwork("K", "{visitor_name}").await;

        let err = fx
            .dispatcher(&server.url())
            .dispatch(&VisitRequest::appointment("Taro", None, Uuid::new_v4()))
            .await
            .expect_err("missing staff");
        assert!(matches!(err, NotifyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_walk_in_settings_missing_or_blank() {
        let server = Server::new_async().await;
        let fx = Fixture::new();
        fx.chatwork("K", "t").await;
        let dispatcher = fx.dispatcher(&server.url());

        let err = dispatcher
            .dispatch(&VisitRequest::walk_in("Hanako", None))
            .await
            .expect_err("no walk-in settings");
        assert!(matches!(err, NotifyError::Configuration(_)));

        fx.walkin("  ", "t").await;
        let err = dispatcher
            .dispatch(&VisitRequest::walk_in("Hanako", None))
            .await
            .expect_err("blank room");
        assert!(matches!(err, NotifyError::Configuration(_)));
        assert_eq!(fx.audit.error_logs().await.len(), 2);
    }

    #[tokio::test]
    async fn test_room_check_failure_is_access_error_without_send() {
        let mut server = Server::new_async().await;
        let fx = Fixture::new();
        fx.chatwork("K", "t").await;
        fx.walkin("R2", "t").await;

        server
            .mock("GET", "/rooms/R2")
            .with_status(403)
            .create_async()
            .await;
        let post = server
            .mock("POST", "/rooms/R2/messages")
            .expect(0)
            .create_async()
            .await;

        let err = fx
            .dispatcher(&server.url())
            .dispatch(&VisitRequest::walk_in("Hanako", None))
            .await
            .expect_err("no access");
        assert!(matches!(err, NotifyError::Access { status: 403, .. }));
        post.assert_async().await;
        assert!(fx.audit.visitor_logs().await.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_distinguishable_from_missing_room() {
        let mut server = Server::new_async().await;
        let fx = Fixture::new();
        fx.chatwork("K", "t").await;
        fx.walkin("R2", "hello").await;

        room_ok(&mut server, "R2").await;
        send(&mut server, "R2", 429, "hello").await;
        let rate_limited = fx
            .dispatcher(&server.url())
            .dispatch(&VisitRequest::walk_in("Hanako", None))
            .await
            .expect_err("429");

        server.reset();
        room_ok(&mut server, "R2").await;
        send(&mut server, "R2", 404, "hello").await;
        let not_found = fx
            .dispatcher(&server.url())
            .dispatch(&VisitRequest::walk_in("Hanako", None))
            .await
            .expect_err("404");

        assert!(matches!(
            rate_limited,
            NotifyError::Remote {
                kind: RemoteErrorKind::RateLimited,
                status: 429
            }
        ));
        assert!(matches!(
            not_found,
            NotifyError::Remote {
                kind: RemoteErrorKind::RoomNotFound,
                status: 404
            }
        ));
        assert_ne!(rate_limited.to_string(), not_found.to_string());
        assert!(fx.audit.visitor_logs().await.is_empty());
        assert_eq!(fx.audit.error_logs().await.len(), 2);
    }

    #[tokio::test]
    async fn test_stalled_chatwork_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let fx = Fixture::new();
        fx.chatwork("K", "t").await;
        fx.walkin("R2", "t").await;
        let dispatcher = NotificationDispatcher::new(
            Arc::new(fx.directory.clone()),
            Arc::new(fx.settings.clone()),
            Arc::new(fx.audit.clone()),
            ChatworkClient::new(format!("http://{addr}")),
            Duration::from_millis(200),
        );

        let err = dispatcher
            .dispatch(&VisitRequest::walk_in("Hanako", None))
            .await
            .expect_err("timeout");
        assert!(matches!(err, NotifyError::Timeout));
        assert_eq!(fx.audit.error_logs().await.len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_timeout_is_capped() {
        let mut server = Server::new_async().await;
        let fx = Fixture::new();
        fx.chatwork("K", "t").await;
        fx.walkin("R2", "hello").await;
        room_ok(&mut server, "R2").await;
        send(&mut server, "R2", 200, "hello").await;

        let dispatcher = NotificationDispatcher::new(
            Arc::new(fx.directory.clone()),
            Arc::new(fx.settings.clone()),
            Arc::new(fx.audit.clone()),
            ChatworkClient::new(server.url()),
            Duration::MAX,
        );
        assert_eq!(dispatcher.timeout, MAX_CHATWORK_TIMEOUT);

        dispatcher
            .dispatch(&VisitRequest::walk_in("Hanako", None))
            .await
            .expect("dispatch");
        assert_eq!(fx.audit.visitor_logs().await.len(), 1);
    }

    /// Accepts error logs but refuses visitor logs, counting every attempt.
    #[derive(Default)]
    struct BrokenVisitorLog {
        inner: InMemoryAuditLogStore,
        visitor_attempts: AtomicUsize,
        error_attempts: AtomicUsize,
    }

    #[async_trait]
    impl AuditLogStore for BrokenVisitorLog {
        async fn append_visitor_log(&self, _log: VisitorLog) -> StoreResult<VisitorLog> {
            self.visitor_attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Database("connection reset".to_string()))
        }

        async fn append_error_log(&self, log: ErrorLog) -> StoreResult<ErrorLog> {
            self.error_attempts.fetch_add(1, Ordering::SeqCst);
            self.inner.append_error_log(log).await
        }

        async fn list_visitor_logs(&self, limit: i64) -> StoreResult<Vec<VisitorLogEntry>> {
            self.inner.list_visitor_logs(limit).await
        }

        async fn list_error_logs(&self, limit: i64) -> StoreResult<Vec<ErrorLog>> {
            self.inner.list_error_logs(limit).await
        }
    }

    #[tokio::test]
    async fn test_visitor_log_failure_after_send_is_persistence_error() {
        let mut server = Server::new_async().await;
        let fx = Fixture::new();
        fx.chatwork("K", "t").await;
        fx.walkin("R2", "hello").await;

        room_ok(&mut server, "R2").await;
        let post = send(&mut server, "R2", 200, "hello").await;

        let audit = Arc::new(BrokenVisitorLog::default());
        let dispatcher = NotificationDispatcher::new(
            Arc::new(fx.directory.clone()),
            Arc::new(fx.settings.clone()),
            audit.clone(),
            ChatworkClient::new(server.url()),
            Duration::from_secs(5),
        );

        let err = dispatcher
            .dispatch(&VisitRequest::walk_in("Hanako", None))
            .await
            .expect_err("log failure");
        assert!(matches!(err, NotifyError::Persistence(_)));
        assert!(err.message_delivered());
        post.assert_async().await;
        assert_eq!(audit.visitor_attempts.load(Ordering::SeqCst), 1);
        assert_eq!(audit.error_attempts.load(Ordering::SeqCst), 1);
    }

    struct FailingAudit;

    #[async_trait]
    impl AuditLogStore for FailingAudit {
        async fn append_visitor_log(&self, _log: VisitorLog) -> StoreResult<VisitorLog> {
            Err(StoreError::Database("down".to_string()))
        }

        async fn append_error_log(&self, _log: ErrorLog) -> StoreResult<ErrorLog> {
            Err(StoreError::Database("down".to_string()))
        }

        async fn list_visitor_logs(&self, _limit: i64) -> StoreResult<Vec<VisitorLogEntry>> {
            Ok(Vec::new())
        }

        async fn list_error_logs(&self, _limit: i64) -> StoreResult<Vec<ErrorLog>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_error_log_failure_is_swallowed() {
        let server = Server::new_async().await;
        let dispatcher = NotificationDispatcher::new(
            Arc::new(InMemoryDirectoryStore::new()),
            Arc::new(InMemorySettingsStore::new()),
            Arc::new(FailingAudit),
            ChatworkClient::new(server.url()),
            Duration::from_secs(5),
        );

        let err = dispatcher
            .dispatch(&VisitRequest::walk_in("Hanako", None))
            .await
            .expect_err("unconfigured");
        assert!(matches!(err, NotifyError::Configuration(_)));
    }

    #[test]
    fn test_visit_request_defaults_to_appointment() {
        let request: VisitRequest =
            serde_json::from_str(r#"{"visitor_name": "Taro"}"#).expect("parse");
        assert!(request.has_appointment);
        assert_eq!(request.staff_id, None);
        assert_eq!(request.visitor_company, None);
    }
}
