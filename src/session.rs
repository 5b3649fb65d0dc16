//! Per-interaction session context.
//!
//! Holds the admin gate and the user-visible notices an action produced. A
//! session is created by the caller and passed into every service call.

use chrono::{DateTime, Local};

use crate::auth::CredentialCheck;

/// Severity of a user-visible message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Messages collected for the user during one interaction.
///
/// Every notice is also sent to the log at the matching level.
#[derive(Debug, Default)]
pub struct Notices {
    entries: Vec<Notice>,
}

impl Notices {
    fn push(&mut self, level: NoticeLevel, message: String) {
        self.entries.push(Notice { level, message });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.push(NoticeLevel::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.push(NoticeLevel::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.push(NoticeLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{message}");
        self.push(NoticeLevel::Error, message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|n| n.level == NoticeLevel::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns everything collected so far
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.entries)
    }
}

#[derive(Debug, Default)]
pub struct Session {
    admin: bool,
    last_update: Option<DateTime<Local>>,
    pub notices: Notices,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Unlocks admin actions if `password` passes `checker`.
    pub fn login(&mut self, checker: &dyn CredentialCheck, password: &str) -> bool {
        if checker.verify(password) {
            self.admin = true;
            self.notices.success("Acceso concedido");
        } else {
            self.notices.error("Contraseña incorrecta");
        }
        self.admin
    }

    pub fn logout(&mut self) {
        if self.admin {
            self.notices.info("Sesión cerrada");
        }
        self.admin = false;
    }

    /// Time of the last successful save in this session
    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    pub(crate) fn mark_saved(&mut self) {
        self.last_update = Some(Local::now());
    }
}
