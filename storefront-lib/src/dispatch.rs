//! Side effects for classified failures.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Deserialize;
use serde::Serialize;

use crate::auth::CredentialStore;
use crate::error::ErrorClassification;
use crate::error::FailureOutcome;
use crate::validation::ValidationErrors;

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Non-blocking problem.
    Warning,
    /// The action failed.
    Error,
}

/// Shows user-visible notices (toasts, banners).
pub trait Notifier: Send + Sync {
    /// Shows a notice.
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Triggers navigation.
pub trait Navigator: Send + Sync {
    /// Navigates to the authentication entry point.
    fn redirect_to_login(&self);
}

/// Notice texts used by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchMessages {
    pub network: String,
    pub session_expired: String,
    pub forbidden: String,
    pub not_found: String,
    pub validation: String,
    pub server: String,
    /// Used for unknown failures without a server message.
    pub unknown: String,
}

impl Default for DispatchMessages {
    fn default() -> Self {
        Self {
            network: "网络连接失败，请检查网络".to_string(),
            session_expired: "登录已过期，请重新登录".to_string(),
            forbidden: "没有权限执行此操作".to_string(),
            not_found: "请求的资源不存在".to_string(),
            validation: "提交的数据有误".to_string(),
            server: "服务器繁忙，请稍后重试".to_string(),
            unknown: "请求失败".to_string(),
        }
    }
}

/// What [`ErrorDispatcher::dispatch`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A notice was shown.
    Notified {
        level: NoticeLevel,
        message: String,
    },
    /// Credentials were cleared, the user was told and redirected to login.
    SessionEnded,
    /// The session had already been ended; nothing was done.
    SessionAlreadyEnded,
    /// The server rejected specific fields; surface these next to the inputs.
    FieldErrors(ValidationErrors),
}

/// Performs the category-specific side effect of a failed call, once.
///
/// The session-expired path is latched to the stored credential: an `Auth`
/// dispatch clears the credentials and redirects, and later ones do nothing
/// while the store stays empty. Storing a new session after login re-arms it,
/// as does [`session_restored`](Self::session_restored).
pub struct ErrorDispatcher {
    credentials: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    messages: DispatchMessages,
    session_ended: Mutex<bool>,
}

impl ErrorDispatcher {
    /// Creates a dispatcher with the default notice texts.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            credentials,
            notifier,
            navigator,
            messages: DispatchMessages::default(),
            session_ended: Mutex::new(false),
        }
    }

    /// Replaces the notice texts.
    pub fn with_messages(mut self, messages: DispatchMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Returns the notice texts.
    pub fn messages(&self) -> &DispatchMessages {
        &self.messages
    }

    /// Classifies `outcome` and dispatches it.
    pub fn handle(&self, outcome: &FailureOutcome) -> DispatchOutcome {
        self.dispatch(ErrorClassification::classify(outcome), outcome)
    }

    /// Performs the side effect for `classification`.
    pub fn dispatch(
        &self,
        classification: ErrorClassification,
        outcome: &FailureOutcome,
    ) -> DispatchOutcome {
        log::debug!(
            "[dispatch] {} (status {:?})",
            classification,
            outcome.http_status
        );

        match classification {
            ErrorClassification::Network => self.notice(NoticeLevel::Error, &self.messages.network),
            ErrorClassification::Auth => self.end_session(),
            ErrorClassification::Forbidden => {
                self.notice(NoticeLevel::Error, &self.messages.forbidden)
            }
            ErrorClassification::NotFound => {
                self.notice(NoticeLevel::Warning, &self.messages.not_found)
            }
            ErrorClassification::Validation => match outcome.field_errors() {
                Some(errors) => {
                    log::debug!("[dispatch] {} field error(s)", errors.len());
                    DispatchOutcome::FieldErrors(errors)
                }
                None => {
                    let message = outcome.message().unwrap_or(&self.messages.validation);
                    self.notice(NoticeLevel::Error, message)
                }
            },
            ErrorClassification::Server => self.notice(NoticeLevel::Error, &self.messages.server),
            ErrorClassification::Unknown => {
                let message = outcome.message().unwrap_or(&self.messages.unknown);
                self.notice(NoticeLevel::Error, message)
            }
        }
    }

    /// Re-arms the session-expired path after a successful login.
    pub fn session_restored(&self) {
        *self.session_ended.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    /// Returns `true` if the session has been ended and no new one stored since.
    pub fn is_session_ended(&self) -> bool {
        let ended = self.session_ended.lock().unwrap_or_else(PoisonError::into_inner);
        *ended && self.credentials.token().is_none()
    }

    fn end_session(&self) -> DispatchOutcome {
        // Held across the check and the clear: concurrent 401s tear down once.
        let mut ended = self.session_ended.lock().unwrap_or_else(PoisonError::into_inner);
        if *ended && self.credentials.token().is_none() {
            log::debug!("[dispatch] session already ended");
            return DispatchOutcome::SessionAlreadyEnded;
        }
        *ended = true;
        self.credentials.clear();
        drop(ended);

        self.notifier
            .notify(NoticeLevel::Warning, &self.messages.session_expired);
        self.navigator.redirect_to_login();
        log::info!("[dispatch] session expired, redirected to login");
        DispatchOutcome::SessionEnded
    }

    fn notice(&self, level: NoticeLevel, message: &str) -> DispatchOutcome {
        self.notifier.notify(level, message);
        DispatchOutcome::Notified {
            level,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use serde_json::json;

    use super::*;
    use crate::auth::MemoryCredentialStore;
    use crate::auth::StoredSession;
    use crate::error::FailurePayload;

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<(NoticeLevel, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: NoticeLevel, message: &str) {
            self.notices.lock().unwrap().push((level, message.to_string()));
        }
    }

    #[derive(Default)]
    struct CountingNavigator {
        redirects: AtomicUsize,
    }

    impl Navigator for CountingNavigator {
        fn redirect_to_login(&self) {
            self.redirects.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        credentials: Arc<MemoryCredentialStore>,
        notifier: Arc<RecordingNotifier>,
        navigator: Arc<CountingNavigator>,
        dispatcher: ErrorDispatcher,
    }

    fn harness() -> Harness {
        let credentials = Arc::new(MemoryCredentialStore::default());
        credentials.set(StoredSession::new("token-1").with_user_info(json!({ "id": 1 })));
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(CountingNavigator::default());
        let dispatcher = ErrorDispatcher::new(credentials.clone(), notifier.clone(), navigator.clone());
        Harness {
            credentials,
            notifier,
            navigator,
            dispatcher,
        }
    }

    #[test]
    fn test_auth_dispatch_is_effect_idempotent() {
        let h = harness();
        let outcome = FailureOutcome::http(401);

        assert_eq!(h.dispatcher.handle(&outcome), DispatchOutcome::SessionEnded);
        assert_eq!(h.dispatcher.handle(&outcome), DispatchOutcome::SessionAlreadyEnded);

        assert_eq!(h.navigator.redirects.load(Ordering::SeqCst), 1);
        assert!(h.credentials.get().is_none());
        assert_eq!(h.notifier.notices.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_session_restored_rearms_auth_path() {
        let h = harness();
        h.dispatcher.handle(&FailureOutcome::http(401));
        h.credentials.set(StoredSession::new("token-2"));
        h.dispatcher.session_restored();

        assert_eq!(h.dispatcher.handle(&FailureOutcome::http(401)), DispatchOutcome::SessionEnded);
        assert_eq!(h.navigator.redirects.load(Ordering::SeqCst), 2);
        assert!(h.credentials.get().is_none());
    }

    #[test]
    fn test_relogin_rearms_auth_path() {
        let h = harness();
        assert_eq!(h.dispatcher.handle(&FailureOutcome::http(401)), DispatchOutcome::SessionEnded);
        assert!(h.dispatcher.is_session_ended());

        // Login stores a new token; its expiry must tear the session down again.
        h.credentials.set(StoredSession::new("token-2"));
        assert!(!h.dispatcher.is_session_ended());
        assert_eq!(h.dispatcher.handle(&FailureOutcome::http(401)), DispatchOutcome::SessionEnded);

        assert_eq!(h.navigator.redirects.load(Ordering::SeqCst), 2);
        assert_eq!(h.notifier.notices.lock().unwrap().len(), 2);
        assert!(h.credentials.get().is_none());
        assert_eq!(
            h.dispatcher.handle(&FailureOutcome::http(401)),
            DispatchOutcome::SessionAlreadyEnded
        );
    }

    #[test]
    fn test_validation_without_payload_uses_default_notice() {
        let h = harness();
        assert_eq!(
            h.dispatcher.handle(&FailureOutcome::http(422)),
            DispatchOutcome::Notified {
                level: NoticeLevel::Error,
                message: DispatchMessages::default().validation
            }
        );
    }

    #[test]
    fn test_validation_with_unusable_data_falls_back_to_message() {
        let h = harness();
        let outcome = FailureOutcome::http(400).with_payload(FailurePayload {
            code: Some(400),
            message: Some("表单有误".into()),
            data: Some(json!({ "qty": 0, "sku": null, "tags": [1, 2] })),
        });
        assert!(outcome.field_errors().is_none());
        assert_eq!(
            h.dispatcher.handle(&outcome),
            DispatchOutcome::Notified {
                level: NoticeLevel::Error,
                message: "表单有误".into()
            }
        );
    }

    #[test]
    fn test_not_found_uses_configured_notice() {
        let h = harness();
        let outcome = FailureOutcome::http(404).with_payload(FailurePayload::message("no such sku"));
        assert_eq!(
            h.dispatcher.handle(&outcome),
            DispatchOutcome::Notified {
                level: NoticeLevel::Warning,
                message: DispatchMessages::default().not_found
            }
        );
    }

    #[test]
    fn test_validation_surfaces_field_errors() {
        let h = harness();
        let outcome = FailureOutcome::http(422)
            .with_payload(FailurePayload::data(json!({ "name": "too short" })));

        let DispatchOutcome::FieldErrors(errors) = h.dispatcher.handle(&outcome) else {
            panic!("expected field errors");
        };
        assert_eq!(errors.get("name"), Some(&["too short".to_string()][..]));
        assert!(h.notifier.notices.lock().unwrap().is_empty());
    }

    #[test]
    fn test_validation_without_mapping_falls_back_to_notice() {
        let h = harness();
        let outcome = FailureOutcome::http(400).with_payload(FailurePayload::message("bad sku"));
        assert_eq!(
            h.dispatcher.handle(&outcome),
            DispatchOutcome::Notified {
                level: NoticeLevel::Error,
                message: "bad sku".into()
            }
        );
    }

    #[test]
    fn test_notices_leave_credentials_alone() {
        let h = harness();
        h.dispatcher.handle(&FailureOutcome::transport());
        h.dispatcher.handle(&FailureOutcome::http(403));
        h.dispatcher.handle(&FailureOutcome::http(404));
        h.dispatcher.handle(&FailureOutcome::http(500));

        let notices = h.notifier.notices.lock().unwrap();
        let messages = DispatchMessages::default();
        assert_eq!(
            *notices,
            vec![
                (NoticeLevel::Error, messages.network),
                (NoticeLevel::Error, messages.forbidden),
                (NoticeLevel::Warning, messages.not_found),
                (NoticeLevel::Error, messages.server),
            ]
        );
        assert_eq!(h.credentials.token().as_deref(), Some("token-1"));
        assert_eq!(h.navigator.redirects.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_prefers_server_message() {
        let h = harness().dispatcher.with_messages(DispatchMessages {
            unknown: "出错了".into(),
            ..Default::default()
        });

        let with_message =
            FailureOutcome::http(200).with_payload(FailurePayload::message("库存不足"));
        assert_eq!(
            h.dispatch(ErrorClassification::Unknown, &with_message),
            DispatchOutcome::Notified {
                level: NoticeLevel::Error,
                message: "库存不足".into()
            }
        );
        assert_eq!(
            h.dispatch(ErrorClassification::Unknown, &FailureOutcome::http(409)),
            DispatchOutcome::Notified {
                level: NoticeLevel::Error,
                message: "出错了".into()
            }
        );
    }
}
