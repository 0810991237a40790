//! The session: who is signed in and what is on their watchlist.
//!
//! Every mutation goes to the backend first and touches local state only once the backend has
//! confirmed it. Local state is persisted to [`Storage`] under [`TOKEN_KEY`] and [`USER_KEY`] so
//! a later process can [`Session::restore`] it.

use crate::api_client::{ApiClient, AuthClient};
use crate::error::{ApiError, SessionError};
use crate::settings::Settings;
use crate::storage::Storage;
use futures_util::future::join_all;
use marquee_common::api::{AuthResponse, LoginRequest, Movie, ProfileUpdate, RegisterRequest};
use marquee_common::domain::{Identity, ItemId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Restoring,
    Authenticated,
    Anonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Add,
    Remove,
}

impl Mutation {
    fn failure(&self) -> &'static str {
        match self {
            Mutation::Add => "Failed to add to watchlist",
            Mutation::Remove => "Failed to remove from watchlist",
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    token: Option<String>,
    identity: Option<Identity>,
    watchlist: Vec<ItemId>,
    loading: bool,
    /// Sequence number of the last applied watchlist change per item.
    applied: HashMap<ItemId, u64>,
    /// Bumped whenever the session is replaced or dropped.
    generation: u64,
}

impl Inner {
    fn clear(&mut self) -> Option<String> {
        let token = self.token.take();
        self.identity = None;
        self.watchlist.clear();
        self.applied.clear();
        self.state = SessionState::Anonymous;
        self.generation += 1;
        token
    }

    fn holds(&self, token: &str) -> bool {
        self.state == SessionState::Authenticated && self.token.as_deref() == Some(token)
    }
}

/// Resets the loading flag even when the login future is dropped halfway.
struct Loading<'a>(&'a Session);

impl<'a> Loading<'a> {
    fn start(session: &'a Session) -> Self {
        session.inner().loading = true;
        Self(session)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.inner().loading = false;
    }
}

/// A slot in the per-item queue. Leaving it, by finishing or by being dropped while queued or
/// mid-request, forgets the item's lock once nobody else holds it.
struct Flight<'a> {
    session: &'a Session,
    id: ItemId,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<'a> Flight<'a> {
    fn enter(session: &'a Session, id: ItemId) -> Self {
        let lock = session.flights().entry(id).or_default().clone();
        Self { session, id, lock }
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut flights = self.session.flights();
        // Only the map and this slot left.
        if flights
            .get(&self.id)
            .is_some_and(|x| Arc::ptr_eq(x, &self.lock) && Arc::strong_count(x) == 2)
        {
            flights.remove(&self.id);
        }
    }
}

pub struct Session {
    api: ApiClient,
    storage: Arc<dyn Storage>,
    logout_timeout: Duration,
    inner: Mutex<Inner>,
    flights: Mutex<HashMap<ItemId, Arc<tokio::sync::Mutex<()>>>>,
    sequence: AtomicU64,
}

impl Session {
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>, logout_timeout: Duration) -> Self {
        Self {
            api,
            storage,
            logout_timeout,
            inner: Mutex::new(Inner::default()),
            flights: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn from_settings(settings: &Settings) -> eyre::Result<Self> {
        let api = ApiClient::new(&settings.server_address, settings.request_timeout())?;
        let storage = Arc::new(settings.storage()?);
        Ok(Self::new(api, storage, settings.logout_timeout()))
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> SessionState {
        self.inner().state
    }

    pub fn is_loading(&self) -> bool {
        self.inner().loading
    }

    pub fn is_initializing(&self) -> bool {
        matches!(
            self.state(),
            SessionState::Uninitialized | SessionState::Restoring
        )
    }

    pub fn token(&self) -> Option<String> {
        self.inner().token.clone()
    }

    /// The signed in user with the current watchlist embedded.
    pub fn identity(&self) -> Option<Identity> {
        let inner = self.inner();
        inner
            .identity
            .as_ref()
            .map(|x| x.with_watchlist(&inner.watchlist))
    }

    pub fn watchlist(&self) -> Vec<ItemId> {
        self.inner().watchlist.clone()
    }

    pub fn is_in_watchlist(&self, id: ItemId) -> bool {
        self.inner().watchlist.contains(&id)
    }

    fn persist(&self, token: Option<&str>, identity: &Identity) -> Result<(), SessionError> {
        let snapshot =
            serde_json::to_string(identity).map_err(|e| SessionError::Storage(e.to_string()))?;
        if let Some(token) = token {
            self.storage.set(TOKEN_KEY, token)?;
        }
        self.storage.set(USER_KEY, &snapshot)?;
        Ok(())
    }

    fn purge(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!("Failed to remove {key} from storage: {err}");
            }
        }
    }

    /// Reads the persisted credential and checks it with the backend.
    ///
    /// The watchlist comes from the backend's answer, not from the persisted snapshot. Anything
    /// that goes wrong leaves the session anonymous with nothing persisted.
    ///
    /// A login, registration or logout that lands while the backend is being asked wins; the
    /// answer is then dropped without touching memory or storage.
    pub async fn restore(&self) -> SessionState {
        let generation = {
            let mut inner = self.inner();
            inner.state = SessionState::Restoring;
            inner.generation += 1;
            inner.generation
        };

        let token = match (self.storage.get(TOKEN_KEY), self.storage.get(USER_KEY)) {
            (Some(token), Some(snapshot)) => match serde_json::from_str::<Identity>(&snapshot) {
                Ok(_) => token,
                Err(err) => {
                    warn!("Stored user is unreadable: {err}");
                    return self.expire(None);
                }
            },
            (None, None) => {
                debug!("no stored credential");
                self.inner().state = SessionState::Anonymous;
                return SessionState::Anonymous;
            }
            _ => {
                warn!("Stored credential is incomplete");
                return self.expire(None);
            }
        };

        let res = self.api.authed(token.as_str()).profile().await;

        let mut inner = self.inner();
        if inner.generation != generation {
            debug!("session changed during restore");
            return inner.state;
        }

        let identity = match res {
            Ok(identity) => identity,
            Err(err) => {
                warn!("Failed to restore session: {err}");
                self.purge();
                inner.clear();
                return SessionState::Anonymous;
            }
        };

        let watchlist = dedup(&identity.watchlist);
        let identity = identity.with_watchlist(&watchlist);
        if let Err(err) = self.persist(None, &identity) {
            warn!("{err}");
        }

        inner.watchlist = watchlist;
        inner.identity = Some(identity);
        inner.token = Some(token);
        inner.applied.clear();
        inner.state = SessionState::Authenticated;
        debug!("session restored");
        SessionState::Authenticated
    }

    /// Drops the local session. With `Some(token)` only if that token is still the current one,
    /// so a late 401 from an old session can't log out a newer one.
    fn expire(&self, token: Option<&str>) -> SessionState {
        let mut inner = self.inner();
        if let Some(token) = token {
            if inner.token.as_deref() != Some(token) {
                return inner.state;
            }
        }
        self.purge();
        inner.clear();
        SessionState::Anonymous
    }

    fn establish(&self, res: AuthResponse) -> Result<(), SessionError> {
        let watchlist = dedup(&res.user.watchlist);
        let identity = res.user.with_watchlist(&watchlist);

        let mut inner = self.inner();
        self.persist(Some(&res.access_token), &identity)?;
        inner.token = Some(res.access_token);
        inner.identity = Some(identity);
        inner.watchlist = watchlist;
        inner.applied.clear();
        inner.state = SessionState::Authenticated;
        inner.generation += 1;
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::Validation(
                "Email and password are required".into(),
            ));
        }

        let req = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        let res = {
            let _loading = Loading::start(self);
            self.api.login(&req).await
        }
        .map_err(|err| SessionError::from_auth(err, "Login failed"))?;

        self.establish(res)?;
        debug!("logged in");
        Ok(())
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), SessionError> {
        validate_registration(email, password, name)?;

        let req = RegisterRequest {
            email: email.trim().into(),
            password: password.into(),
            name: name.trim().into(),
        };
        let res = {
            let _loading = Loading::start(self);
            self.api.register(&req).await
        }
        .map_err(|err| SessionError::from_auth(err, "Registration failed"))?;

        self.establish(res)?;
        debug!("registered");
        Ok(())
    }

    /// [`Session::register`] behind a check that both password entries match.
    pub async fn register_confirmed(
        &self,
        email: &str,
        password: &str,
        confirmation: &str,
        name: &str,
    ) -> Result<(), SessionError> {
        if password != confirmation {
            return Err(SessionError::Validation(
                "Passwords do not match. Please try again.".into(),
            ));
        }
        self.register(email, password, name).await
    }

    /// Clears the session right away. The backend is told in a detached task that may take at
    /// most the logout timeout; its outcome is only logged.
    ///
    /// Returns the handle of that task when one was started, for callers that are about to exit.
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        let token = {
            let mut inner = self.inner();
            self.purge();
            inner.clear()
        }?;

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("no runtime, skipping remote logout");
            return None;
        };

        let client = self.api.authed(token);
        let limit = self.logout_timeout;
        Some(handle.spawn(async move {
            match tokio::time::timeout(limit, client.logout()).await {
                Ok(Ok(_)) => debug!("remote session closed"),
                Ok(Err(err)) => debug!("remote logout failed: {err}"),
                Err(_) => debug!("remote logout timed out"),
            }
        }))
    }

    fn client(&self) -> Result<AuthClient, SessionError> {
        let inner = self.inner();
        match (&inner.state, &inner.token) {
            (SessionState::Authenticated, Some(token)) => Ok(self.api.authed(token.as_str())),
            _ => Err(SessionError::NotAuthenticated),
        }
    }

    /// The one place that deals with rejected credentials.
    fn intercept<T>(
        &self,
        client: &AuthClient,
        result: Result<T, ApiError>,
        fallback: &str,
    ) -> Result<T, SessionError> {
        match result {
            Ok(v) => Ok(v),
            Err(err) if err.is_unauthorized() => {
                warn!("Credential rejected by the server, signing out");
                self.expire(Some(client.token()));
                Err(SessionError::StaleCredential)
            }
            Err(err) => Err(SessionError::from_api(err, fallback)),
        }
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<(), SessionError> {
        validate_profile(&update)?;
        let client = self.client()?;
        let res = client.update_profile(&update).await;
        let identity = self.intercept(&client, res, "Profile update failed")?;

        let mut inner = self.inner();
        if !inner.holds(client.token()) {
            debug!("session changed during profile update");
            return Ok(());
        }
        let identity = identity.with_watchlist(&inner.watchlist);
        self.persist(None, &identity)?;
        inner.identity = Some(identity);
        Ok(())
    }

    pub async fn add_to_watchlist(&self, id: ItemId) -> Result<(), SessionError> {
        self.mutate(id, Mutation::Add).await
    }

    pub async fn remove_from_watchlist(&self, id: ItemId) -> Result<(), SessionError> {
        self.mutate(id, Mutation::Remove).await
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn flights(&self) -> MutexGuard<'_, HashMap<ItemId, Arc<tokio::sync::Mutex<()>>>> {
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutations on the same item run one at a time in issue order. The sequence number is taken
    /// before queueing so a result never overwrites one that was issued later.
    async fn mutate(&self, id: ItemId, mutation: Mutation) -> Result<(), SessionError> {
        let client = self.client()?;
        let sequence = self.next_sequence();
        let flight = Flight::enter(self, id);
        let _guard = flight.lock.lock().await;

        let res = match mutation {
            Mutation::Add => client.add_to_watchlist(id).await,
            Mutation::Remove => client.remove_from_watchlist(id).await,
        };
        self.intercept(&client, res, mutation.failure())
            .and_then(|_| self.apply(&client, id, sequence, mutation))
    }

    fn apply(
        &self,
        client: &AuthClient,
        id: ItemId,
        sequence: u64,
        mutation: Mutation,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner();
        if !inner.holds(client.token()) {
            debug!("session changed during watchlist update of {id}");
            return Ok(());
        }
        if inner.applied.get(&id).is_some_and(|x| *x > sequence) {
            debug!("watchlist update {sequence} of {id} superseded");
            return Ok(());
        }

        let mut watchlist = inner.watchlist.clone();
        match mutation {
            Mutation::Add => {
                if !watchlist.contains(&id) {
                    watchlist.push(id);
                }
            }
            Mutation::Remove => watchlist.retain(|x| *x != id),
        }

        if let Some(identity) = &inner.identity {
            self.persist(None, &identity.with_watchlist(&watchlist))?;
        }
        inner.watchlist = watchlist;
        inner.applied.insert(id, sequence);
        Ok(())
    }

    /// Full records of the watchlist. Also replaces the local set with the backend's, keeping
    /// only changes that were confirmed after this request went out.
    pub async fn watchlist_items(&self) -> Result<Vec<Movie>, SessionError> {
        let client = self.client()?;
        let sequence = self.next_sequence();
        let res = client.watchlist().await;
        let res = self.intercept(&client, res, "Failed to load watchlist")?;

        let mut inner = self.inner();
        if !inner.holds(client.token()) {
            debug!("session changed during watchlist refresh");
            return Ok(res.watchlist);
        }

        let mut watchlist = dedup(&res.watchlist.iter().map(|x| x.id).collect::<Vec<_>>());
        for (id, applied) in &inner.applied {
            if *applied <= sequence {
                continue;
            }
            let local = inner.watchlist.contains(id);
            let remote = watchlist.contains(id);
            if local && !remote {
                watchlist.push(*id);
            } else if !local && remote {
                watchlist.retain(|x| x != id);
            }
        }

        if let Some(identity) = &inner.identity {
            self.persist(None, &identity.with_watchlist(&watchlist))?;
        }
        debug!("watchlist refreshed with {} items", watchlist.len());
        inner.watchlist = watchlist;
        Ok(res.watchlist)
    }

    /// Like [`Session::watchlist_items`] but failures are only logged and the current set is kept.
    pub async fn refresh_watchlist(&self) {
        if let Err(err) = self.watchlist_items().await {
            warn!("Failed to refresh watchlist: {err}");
        }
    }

    /// Removes everything on the watchlist. Returns the items that could not be removed.
    pub async fn clear_watchlist(&self) -> Vec<(ItemId, SessionError)> {
        let removals = self
            .watchlist()
            .into_iter()
            .map(|id| async move { (id, self.remove_from_watchlist(id).await) });

        join_all(removals)
            .await
            .into_iter()
            .filter_map(|(id, res)| res.err().map(|err| (id, err)))
            .collect()
    }
}

fn dedup(ids: &[ItemId]) -> Vec<ItemId> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn validate_name(name: &str) -> Result<(), SessionError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SessionError::Validation("Name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(SessionError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters long."
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), SessionError> {
    if !looks_like_email(email.trim()) {
        return Err(SessionError::Validation(
            "Please enter a valid email address.".into(),
        ));
    }
    Ok(())
}

/// Checks run before a registration request is sent.
pub fn validate_registration(email: &str, password: &str, name: &str) -> Result<(), SessionError> {
    validate_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SessionError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long."
        )));
    }
    validate_name(name)
}

fn validate_profile(update: &ProfileUpdate) -> Result<(), SessionError> {
    if update.is_empty() {
        return Err(SessionError::Validation("Nothing to update".into()));
    }
    if let Some(name) = &update.name {
        validate_name(name)?;
    }
    if let Some(email) = &update.email {
        validate_email(email)?;
    }
    Ok(())
}
