use std::fmt;
use std::sync::Arc;

use huddle_cache::CacheStore;
use huddle_chats::User;

type LogoutHook = Box<dyn FnOnce() + Send>;

/// Everything a session needs from the login that created it.
///
/// Created once authentication succeeds and consumed by the session, which
/// runs the logout hook when it ends.
pub struct SessionContext {
    pub token: String,
    pub user: User,
    pub cache: Arc<dyn CacheStore>,
    on_logout: Option<LogoutHook>,
}

impl SessionContext {
    pub fn new(token: impl Into<String>, user: User, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            token: token.into(),
            user,
            cache,
            on_logout: None,
        }
    }

    pub fn on_logout(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_logout = Some(Box::new(hook));
        self
    }

    pub(crate) fn take_logout_hook(&mut self) -> Option<LogoutHook> {
        self.on_logout.take()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user", &self.user.id)
            .field("token", &"<redacted>")
            .field("on_logout", &self.on_logout.is_some())
            .finish()
    }
}
