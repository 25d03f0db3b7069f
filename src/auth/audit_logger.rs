// Security event logging

use tracing::{info, warn};

/// Authentication event type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    Registered { user_id: i64 },
    LoginSuccess { user_id: i64 },
    /// `reason` stays in the log; callers only see a generic failure
    LoginFailure { reason: String },
    TokenRejected { reason: String },
}

/// Audit logger for security events
///
/// Events go to the `audit` tracing target so they can be filtered or routed
/// separately. Passwords and tokens are never passed in.
#[derive(Debug, Default)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn new() -> Self {
        Self
    }

    /// Log an authentication event
    pub fn log_auth_event(
        &self,
        event: &AuthEvent,
        username: Option<&str>,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) {
        match event {
            AuthEvent::Registered { user_id } => {
                info!(
                    target: "audit",
                    user_id = *user_id,
                    username = ?username,
                    ip_address = ?ip_address,
                    user_agent = ?user_agent,
                    "User registered"
                );
            }
            AuthEvent::LoginSuccess { user_id } => {
                info!(
                    target: "audit",
                    user_id = *user_id,
                    username = ?username,
                    ip_address = ?ip_address,
                    user_agent = ?user_agent,
                    "Login successful"
                );
            }
            AuthEvent::LoginFailure { reason } => {
                warn!(
                    target: "audit",
                    username = ?username,
                    ip_address = ?ip_address,
                    user_agent = ?user_agent,
                    reason = %reason,
                    "Login failed"
                );
            }
            AuthEvent::TokenRejected { reason } => {
                warn!(
                    target: "audit",
                    ip_address = ?ip_address,
                    user_agent = ?user_agent,
                    reason = %reason,
                    "Token rejected"
                );
            }
        }
    }
}
