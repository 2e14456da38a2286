//! The nickname session, that gates every task operation

/// A display name, chosen once per run. It is not authenticated, and not unique
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    nickname: String,
}

impl Session {
    /// Start a session, if `input` contains a usable nickname.
    /// Leading and trailing whitespace is dropped.
    pub fn start(input: &str) -> Option<Self> {
        let nickname = input.trim();
        if nickname.is_empty() {
            return None;
        }
        Some(Self { nickname: nickname.to_string() })
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// The greeting shown once the task board is revealed
    pub fn welcome_message(&self) -> String {
        format!("{}님 환영합니다!", self.nickname)
    }
}


/// Holds the session once it has started.
///
/// Unlocking is irreversible: there is no logout, and later nicknames are ignored.
#[derive(Debug, Default)]
pub struct SessionGate {
    session: Option<Session>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to unlock the gate with a nickname.
    ///
    /// Returns the new session if this call unlocked the gate, or `None` if the input was blank
    /// or if the gate was already unlocked.
    pub fn submit(&mut self, input: &str) -> Option<&Session> {
        if self.session.is_some() {
            log::debug!("A session has already started, ignoring nickname {:?}", input);
            return None;
        }
        self.session = Session::start(input);
        if let Some(session) = &self.session {
            log::info!("Session started for {}", session.nickname());
        }
        self.session.as_ref()
    }

    /// The current session, if the gate is unlocked
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_unlocked(&self) -> bool {
        self.session.is_some()
    }
}
