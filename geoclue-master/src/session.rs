//! Client sessions and their registry.
//!
//! A session is created for a bus peer on request and lives until it is
//! destroyed, either explicitly or because its owner left the bus. Destroying
//! the last live session also releases the provider registry, so providers
//! are only held while someone is using them.

use std::fmt;

use geoclue_bus::ObjectPath;
use geoclue_providers::{Constraints, ProviderRegistry};

type TeardownHook = Box<dyn FnOnce(&Session) + Send>;

/// One client of the master
pub struct Session {
    owner: String,
    path: ObjectPath,
    requirements: Constraints,
    teardown: Option<TeardownHook>,
}

impl Session {
    /// Bus identity of the peer that created the session
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    /// Constraints last set by the client; accepts every provider until set
    pub fn requirements(&self) -> &Constraints {
        &self.requirements
    }

    pub fn set_requirements(&mut self, requirements: Constraints) {
        self.requirements = requirements;
    }

    /// Run `hook` when the session is destroyed
    ///
    /// The hook runs exactly once, after the session has left the registry.
    /// Attaching a second hook replaces the first.
    pub fn on_teardown(&mut self, hook: impl FnOnce(&Session) + Send + 'static) {
        self.teardown = Some(Box::new(hook));
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("owner", &self.owner)
            .field("path", &self.path)
            .field("requirements", &self.requirements)
            .field("has_teardown", &self.teardown.is_some())
            .finish()
    }
}

/// The set of live sessions
///
/// Paths are `prefix` followed by a serial that starts at 0 and only ever
/// increases, so no two sessions of one registry share a path.
#[derive(Debug)]
pub struct SessionRegistry {
    prefix: ObjectPath,
    next_serial: u64,
    sessions: Vec<Session>,
}

impl SessionRegistry {
    pub fn new(prefix: ObjectPath) -> Self {
        Self {
            prefix,
            next_serial: 0,
            sessions: Vec::new(),
        }
    }

    /// Allocate a new session for `owner`
    ///
    /// Every call mints a fresh path, even for an owner that already has a
    /// session.
    pub fn create(&mut self, owner: impl Into<String>) -> &mut Session {
        let path = self.prefix.with_serial(self.next_serial);
        self.next_serial += 1;

        let session = Session {
            owner: owner.into(),
            path,
            requirements: Constraints::default(),
            teardown: None,
        };
        tracing::debug!("Created session {} for {}", session.path, session.owner);

        let index = self.sessions.len();
        self.sessions.push(session);
        &mut self.sessions[index]
    }

    /// First live session owned by `owner`; an empty identity never matches
    pub fn find(&self, owner: &str) -> Option<&Session> {
        if owner.is_empty() {
            return None;
        }
        self.sessions.iter().find(|session| session.owner == owner)
    }

    pub fn get(&self, path: &ObjectPath) -> Option<&Session> {
        self.sessions.iter().find(|session| &session.path == path)
    }

    pub fn get_mut(&mut self, path: &ObjectPath) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|session| &session.path == path)
    }

    /// Remove the session at `path` and run its teardown hook
    ///
    /// When this leaves no live sessions, `providers` is released before
    /// returning. Unknown paths are ignored and return `None`.
    pub fn destroy(
        &mut self,
        path: &ObjectPath,
        providers: &mut ProviderRegistry,
    ) -> Option<Session> {
        let index = self.sessions.iter().position(|session| &session.path == path)?;
        let mut session = self.sessions.remove(index);

        if let Some(hook) = session.teardown.take() {
            hook(&session);
        }
        tracing::debug!(
            "Destroyed session {} of {}, {} remaining",
            session.path,
            session.owner,
            self.sessions.len()
        );

        if self.sessions.is_empty() {
            let released = providers.release();
            tracing::debug!("Last session gone, released {} providers", released);
        }

        Some(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Live sessions in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    /// Serial the next session will get
    pub fn next_serial(&self) -> u64 {
        self.next_serial
    }
}
