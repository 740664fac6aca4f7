// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Routes
//!
//! ```text
//! /                           landing (public)
//! /dashboard                  home, behind the auth gate
//! /dashboard/about
//! /dashboard/profile
//! /dashboard/members?search=&role=
//! /dashboard/members/{principal}
//! /dashboard/proposals
//! /dashboard/projects
//! ```

use std::sync::{Arc, Mutex};

use tracing::debug;
use url::Url;

use crate::identity::Principal;
use crate::models::Role;

/// Filters of the members roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembersQuery {
    /// Case-insensitive name substring
    pub search: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Dashboard,
    About,
    Profile,
    Members(MembersQuery),
    Member(Principal),
    Proposals,
    Projects,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::About => "/dashboard/about".to_string(),
            Route::Profile => "/dashboard/profile".to_string(),
            Route::Members(query) => {
                let mut params = url::form_urlencoded::Serializer::new(String::new());
                if let Some(search) = &query.search {
                    params.append_pair("search", search);
                }
                if let Some(role) = query.role {
                    params.append_pair("role", role.label());
                }
                let params = params.finish();
                if params.is_empty() {
                    "/dashboard/members".to_string()
                } else {
                    format!("/dashboard/members?{params}")
                }
            }
            Route::Member(principal) => format!("/dashboard/members/{principal}"),
            Route::Proposals => "/dashboard/proposals".to_string(),
            Route::Projects => "/dashboard/projects".to_string(),
        }
    }

    /// Parse a path (with optional query) into a route.
    ///
    /// Unknown paths, malformed principals and unknown roles yield `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let base = Url::parse("http://localhost/").ok()?;
        let url = base.join(path).ok()?;
        let segments: Vec<&str> = url
            .path()
            .trim_end_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Some(Route::Landing),
            ["dashboard"] => Some(Route::Dashboard),
            ["dashboard", "about"] => Some(Route::About),
            ["dashboard", "profile"] => Some(Route::Profile),
            ["dashboard", "proposals"] => Some(Route::Proposals),
            ["dashboard", "projects"] => Some(Route::Projects),
            ["dashboard", "members"] => {
                let mut query = MembersQuery::default();
                for (key, value) in url.query_pairs() {
                    match key.as_ref() {
                        "search" if !value.is_empty() => query.search = Some(value.into_owned()),
                        "role" if !value.is_empty() => query.role = Some(Role::from_label(&value)?),
                        _ => {}
                    }
                }
                Some(Route::Members(query))
            }
            ["dashboard", "members", id] => Principal::from_text(id).ok().map(Route::Member),
            _ => None,
        }
    }

    /// Everything except the landing page is mounted behind the auth gate.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Landing)
    }
}

/// Records navigation requests so the host can follow them.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    history: Arc<Mutex<Vec<Route>>>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigate(&self, route: Route) {
        debug!(path = %route.path(), "Navigating");
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(route);
    }

    /// Last requested route, the landing page before any navigation.
    pub fn current(&self) -> Route {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
            .unwrap_or(Route::Landing)
    }

    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
