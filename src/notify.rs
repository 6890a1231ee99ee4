//! Desktop notifications via notify-rust (D-Bus).

use crate::error::{Error, Result};
use crate::inject::{ProcessEnv, set_environ};
use crate::procfs::ProcRoot;
use notify_rust::{Hint, Notification};
use tracing::{debug, error};

/// App name used when the caller does not pick one.
pub const APP_NAME: &str = "tasknotify";

/// What to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub summary: String,
    pub body: Option<String>,
    pub app_name: Option<String>,
}

impl NotificationRequest {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            body: None,
            app_name: None,
        }
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }
}

/// A notification client bound to one application name.
///
/// Each session carries its own name, so sessions opened with different
/// names never affect each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifySession {
    app_name: String,
}

impl NotifySession {
    /// Open a session for `app_name`. Empty names and names containing NUL
    /// cannot be sent over D-Bus and are rejected.
    pub fn initialize(app_name: &str) -> Result<Self> {
        if app_name.is_empty() || app_name.contains('\0') {
            return Err(Error::InvalidAppName(app_name.to_string()));
        }
        Ok(Self {
            app_name: app_name.to_string(),
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Build the notification without sending it.
    pub fn build(&self, summary: &str, body: Option<&str>) -> Notification {
        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(summary)
            .hint(Hint::DesktopEntry(self.app_name.clone()));
        if let Some(body) = body {
            notification.body(body);
        }
        notification
    }

    pub fn show(&self, summary: &str, body: Option<&str>) -> Result<()> {
        self.build(summary, body).show()?;
        Ok(())
    }
}

/// Send a notification. Returns true only if the notification server accepted it.
pub fn notify(summary: &str, body: Option<&str>, app_name: Option<&str>) -> bool {
    let app_name = app_name.unwrap_or(APP_NAME);
    let session = match NotifySession::initialize(app_name) {
        Ok(session) => session,
        Err(e) => {
            error!("failed to initialize notifications with app_name {:?}: {}", app_name, e);
            return false;
        }
    };

    match session.show(summary, body) {
        Ok(()) => true,
        Err(e) => {
            error!("error from notification service: {}", e);
            debug!("error is: {:?}", e);
            false
        }
    }
}

/// Borrow the graphical session from the user's other processes, then notify.
pub fn notify_headless<S: AsRef<str>>(
    proc_root: &ProcRoot,
    request: &NotificationRequest,
    session_variables: &[S],
) -> bool {
    set_environ(&mut ProcessEnv, proc_root, None, session_variables);
    if let Some(body) = &request.body {
        debug!("will create notification with body text: {:?}", body);
    }
    notify(
        &request.summary,
        request.body.as_deref(),
        request.app_name.as_deref(),
    )
}
