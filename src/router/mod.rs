// Console route table, the authorization guard consulted before every
// navigation, and the navigation controller that applies its decisions

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::middleware::{Navigator, LOGIN_PATH};
use crate::session::SessionGate;

pub const HOME_PATH: &str = "/";
pub const REGISTER_PATH: &str = "/register";

/// Upper bound on redirects followed by one navigation
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMeta {
    pub title: Option<&'static str>,
    /// Unset means the route needs a session
    pub requires_auth: Option<bool>,
    pub requires_admin: bool,
    pub hide_layout: bool,
}

impl RouteMeta {
    pub const fn titled(title: &'static str) -> Self {
        Self {
            title: Some(title),
            requires_auth: None,
            requires_admin: false,
            hide_layout: false,
        }
    }

    pub const fn public(mut self) -> Self {
        self.requires_auth = Some(false);
        self.hide_layout = true;
        self
    }

    pub const fn admin(mut self) -> Self {
        self.requires_admin = true;
        self
    }

    pub const fn requires_auth(&self) -> bool {
        !matches!(self.requires_auth, Some(false))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub meta: RouteMeta,
    pub redirect: Option<&'static str>,
}

impl Route {
    pub const fn new(path: &'static str, name: &'static str, meta: RouteMeta) -> Self {
        Self {
            path,
            name,
            meta,
            redirect: None,
        }
    }

    pub const fn redirect(path: &'static str, to: &'static str) -> Self {
        Self {
            path,
            name: "",
            meta: RouteMeta {
                title: None,
                requires_auth: None,
                requires_admin: false,
                hide_layout: false,
            },
            redirect: Some(to),
        }
    }
}

const CONSOLE_ROUTES: &[Route] = &[
    Route::redirect(HOME_PATH, "/dashboard"),
    Route::new(LOGIN_PATH, "Login", RouteMeta::titled("登录").public()),
    Route::new(REGISTER_PATH, "Register", RouteMeta::titled("注册").public()),
    Route::new("/dashboard", "Dashboard", RouteMeta::titled("数据概览")),
    Route::new("/questions", "Questions", RouteMeta::titled("问题管理")),
    Route::new("/answers", "Answers", RouteMeta::titled("答案对比")),
    Route::new("/scores", "Scores", RouteMeta::titled("评分分析")),
    Route::new("/badcase", "Badcase", RouteMeta::titled("Badcase分析")),
    Route::new("/monitor", "Monitor", RouteMeta::titled("系统监控")),
    Route::new("/settings", "Settings", RouteMeta::titled("系统配置").admin()),
    Route::new("/admin/users", "AdminUsers", RouteMeta::titled("用户管理").admin()),
    Route::new(
        "/admin/applications",
        "AdminApplications",
        RouteMeta::titled("申请审核").admin(),
    ),
    Route::new("/access-stats", "AccessStats", RouteMeta::titled("访问统计").admin()),
];

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn console() -> Self {
        Self::new(CONSOLE_ROUTES.to_vec())
    }

    /// Exact path match; query string and trailing slash are ignored
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let path = normalize_path(path);
        self.routes.iter().find(|route| route.path == path)
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| !route.name.is_empty() && route.name == name)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => HOME_PATH,
        trimmed => trimmed,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Decides each navigation from route metadata and the current session
#[derive(Clone)]
pub struct RouteGuard {
    gate: SessionGate,
}

impl RouteGuard {
    pub fn new(gate: SessionGate) -> Self {
        Self { gate }
    }

    pub fn evaluate(&self, route: &Route) -> GuardDecision {
        let logged_in = self.gate.is_logged_in();

        if route.meta.requires_auth() && !logged_in {
            return GuardDecision::Redirect(LOGIN_PATH);
        }

        if route.meta.requires_admin && !self.gate.is_admin() {
            return GuardDecision::Redirect(HOME_PATH);
        }

        if logged_in && (route.path == LOGIN_PATH || route.path == REGISTER_PATH) {
            return GuardDecision::Redirect(HOME_PATH);
        }

        GuardDecision::Allow
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("No route matches '{0}'")]
    NotFound(String),

    #[error("Too many redirects navigating to '{0}'")]
    RedirectLoop(String),
}

/// Result of one navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    /// Where the navigation settled
    pub location: &'static str,
    pub route_name: &'static str,
    /// Every redirect taken, in order, as `(from, to)`
    pub redirects: Vec<(&'static str, &'static str)>,
    pub hide_layout: bool,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

#[derive(Debug, Default)]
struct RouterState {
    location: Option<&'static str>,
    title: Option<String>,
}

/// Navigation controller: resolves paths, runs the guard and tracks the
/// committed location and window title
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    table: RouteTable,
    guard: RouteGuard,
    title_suffix: String,
    state: Mutex<RouterState>,
}

impl Router {
    pub fn new(table: RouteTable, gate: SessionGate, title_suffix: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                table,
                guard: RouteGuard::new(gate),
                title_suffix: title_suffix.into(),
                state: Mutex::new(RouterState::default()),
            }),
        }
    }

    pub fn console(gate: SessionGate) -> Self {
        Self::new(
            RouteTable::console(),
            gate,
            crate::config::config().ui.title_suffix.clone(),
        )
    }

    pub fn table(&self) -> &RouteTable {
        &self.inner.table
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.inner.guard
    }

    pub fn location(&self) -> Option<&'static str> {
        self.state().location
    }

    pub fn title(&self) -> Option<String> {
        self.state().title.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, RouterState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn navigate(&self, path: &str) -> Result<Navigation, NavigationError> {
        let mut route = self
            .inner
            .table
            .resolve(path)
            .ok_or_else(|| NavigationError::NotFound(path.to_string()))?;
        let mut redirects = Vec::new();

        loop {
            if let Some(title) = route.meta.title {
                self.state().title = Some(format!("{} - {}", title, self.inner.title_suffix));
            }

            let next = match route.redirect {
                Some(to) => to,
                None => match self.inner.guard.evaluate(route) {
                    GuardDecision::Allow => break,
                    GuardDecision::Redirect(to) => {
                        tracing::debug!("Guard redirected {} to {}", route.path, to);
                        to
                    }
                },
            };

            if redirects.len() == MAX_REDIRECTS {
                tracing::error!("Redirect loop navigating to {}: {:?}", path, redirects);
                return Err(NavigationError::RedirectLoop(path.to_string()));
            }
            redirects.push((route.path, next));
            route = self
                .inner
                .table
                .resolve(next)
                .ok_or_else(|| NavigationError::NotFound(next.to_string()))?;
        }

        self.state().location = Some(route.path);
        tracing::debug!("Navigated to {} ({})", route.path, route.name);

        Ok(Navigation {
            requested: path.to_string(),
            location: route.path,
            route_name: route.name,
            redirects,
            hide_layout: route.meta.hide_layout,
        })
    }
}

impl Navigator for Router {
    fn redirect(&self, path: &str) {
        if let Err(e) = self.navigate(path) {
            tracing::error!("Forced navigation to {} failed: {}", path, e);
        }
    }
}
