//! Client-side mirror of the authenticated user's server watchlist.
//!
//! # Design
//! The backend is the single source of truth: `load` replaces the local
//! collection wholesale, and a mutation only touches the local collection
//! after the remote call succeeded. A failed call leaves the cache exactly
//! as it was — no optimistic update survives.
//!
//! Mutations fail closed without a session: they return `false`, log the
//! rejection, and make zero network calls. Membership checks are pure
//! local reads; the UI calls them per rendered card, so they must never
//! hit the network.

use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::session::SessionStore;
use crate::types::{Movie, MovieSnapshot, Source, WatchlistEntry, WatchlistPage};

/// Page size used when pulling the full remote list.
const LOAD_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct WatchlistCache {
    api: ApiClient,
    entries: Vec<WatchlistEntry>,
}

impl WatchlistCache {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            entries: Vec::new(),
        }
    }

    /// Replace the local collection with the full remote list.
    ///
    /// Unauthenticated callers get an empty cache (their server list is not
    /// reachable, and stale entries from a previous session must not leak).
    /// Lists longer than one page are fetched page by page until the
    /// server-reported `total` is reached. If any fetch fails the local
    /// collection is left untouched and `false` is returned.
    pub fn load(&mut self, session: &SessionStore) -> bool {
        if !session.is_authenticated() {
            self.entries.clear();
            return true;
        }
        let mut collected: Vec<WatchlistEntry> = Vec::new();
        let mut page = 1u32;
        loop {
            match self
                .api
                .get::<WatchlistPage>(&format!("/watchlist?page={page}&limit={LOAD_LIMIT}"))
            {
                Ok(remote) => {
                    let fetched = remote.watchlist.len();
                    collected.extend(remote.watchlist);
                    // an empty page ends the loop even if `total` disagrees
                    if fetched == 0 || collected.len() >= remote.total as usize {
                        self.entries = collected;
                        return true;
                    }
                    page += 1;
                }
                Err(e) => {
                    warn!(page, error = %e, "watchlist load failed");
                    return false;
                }
            }
        }
    }

    /// Explicit re-synchronization after external changes.
    pub fn refresh(&mut self, session: &SessionStore) -> bool {
        self.load(session)
    }

    /// Save a movie to the watchlist.
    ///
    /// The source tag is taken from the movie when present, else inferred
    /// from the id prefix. Adding an id that is already cached is a no-op
    /// success — the cache never holds duplicates.
    pub fn add(&mut self, session: &SessionStore, movie: &Movie) -> bool {
        if !session.is_authenticated() {
            debug!(movie_id = %movie.id, "watchlist add rejected: not authenticated");
            return false;
        }
        if self.is_in_watchlist(&movie.id) {
            return true;
        }
        let entry = WatchlistEntry {
            movie_id: movie.id.clone(),
            source: movie.resolved_source(),
            movie_data: MovieSnapshot::from_movie(movie),
        };
        match self.api.post::<serde_json::Value, _>("/watchlist", &entry) {
            Ok(_) => {
                self.entries.push(entry);
                true
            }
            Err(e) => {
                warn!(movie_id = %movie.id, error = %e, "watchlist add failed");
                false
            }
        }
    }

    /// Remove a movie by id. A missing `source` is resolved with the same
    /// id-prefix heuristic the add path uses.
    pub fn remove(&mut self, session: &SessionStore, movie_id: &str, source: Option<Source>) -> bool {
        if !session.is_authenticated() {
            debug!(movie_id, "watchlist remove rejected: not authenticated");
            return false;
        }
        let source = source.unwrap_or_else(|| Source::from_id(movie_id));
        match self
            .api
            .delete::<serde_json::Value>(&format!("/watchlist/{movie_id}?source={source}"))
        {
            Ok(_) => {
                self.entries.retain(|e| e.movie_id != movie_id);
                true
            }
            Err(e) => {
                warn!(movie_id, error = %e, "watchlist remove failed");
                false
            }
        }
    }

    /// Remove every entry, local and remote.
    pub fn clear(&mut self, session: &SessionStore) -> bool {
        if !session.is_authenticated() {
            debug!("watchlist clear rejected: not authenticated");
            return false;
        }
        match self.api.delete::<serde_json::Value>("/watchlist") {
            Ok(_) => {
                self.entries.clear();
                true
            }
            Err(e) => {
                warn!(error = %e, "watchlist clear failed");
                false
            }
        }
    }

    /// Pure local membership check; reflects the last successful
    /// `load`/`add`/`remove` and never triggers a network call.
    pub fn is_in_watchlist(&self, movie_id: &str) -> bool {
        self.entries.iter().any(|e| e.movie_id == movie_id)
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
