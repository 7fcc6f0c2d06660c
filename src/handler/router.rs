//! Request routing dispatch module
//!
//! The [`Router`] owns the route table and the static mount table. Each
//! request goes through:
//!
//! 1. static check: the first mount holding a file for the path serves it
//! 2. route check: the first entry, in registration order, whose method
//!    equals the request method and whose pattern matches the path
//! 3. not found: an HTML page for GET, plain text for everything else

use crate::handler::static_files::{self, MountCallback, StaticMount};
use crate::http::{self, RequestView, ResponseWriter};
use crate::logger;
use crate::routing::CompiledPattern;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Terminal route handler
///
/// The handler owns the response: it is expected to make exactly one terminal
/// call on the writer.
pub type Handler = Arc<dyn Fn(&RequestView, &mut ResponseWriter) + Send + Sync>;

/// URL prefix of the mount installed by [`Router::new`]
pub const DEFAULT_MOUNT: &str = "/public";

/// One registered route, immutable after registration
#[derive(Clone)]
pub struct RouteEntry {
    method: Method,
    template: String,
    pattern: CompiledPattern,
    handler: Handler,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

impl RouteEntry {
    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub const fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    fn accepts(&self, method: &Method, path: &str) -> bool {
        self.method == *method && self.pattern.matches(path)
    }
}

/// Which terminal state a request ended in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    StaticServed,
    /// Carries the template of the winning route
    HandlerDispatched(String),
    Homepage,
    NotFound,
}

/// Route and static mount tables plus the dispatch logic
#[derive(Debug)]
pub struct Router {
    routes: Vec<RouteEntry>,
    mounts: Vec<StaticMount>,
    static_root: PathBuf,
    fallback_homepage: bool,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Router with the default `/public` mount, relative to the working directory
    pub fn new() -> Self {
        Self::with_static_root(".", DEFAULT_MOUNT)
    }

    /// Router whose mount prefixes resolve under `static_root`, with a
    /// default mount at `default_mount`
    pub fn with_static_root(static_root: impl Into<PathBuf>, default_mount: &str) -> Self {
        let mut router = Self {
            routes: Vec::new(),
            mounts: Vec::new(),
            static_root: static_root.into(),
            fallback_homepage: false,
        };
        router.mount(default_mount);
        router
    }

    /// Serve a default welcome page for an unrouted `GET /` instead of a 404
    pub fn set_fallback_homepage(&mut self, enabled: bool) -> &mut Self {
        self.fallback_homepage = enabled;
        self
    }

    pub fn get<F>(&mut self, template: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestView, &mut ResponseWriter) + Send + Sync + 'static,
    {
        self.route(Method::GET, template, handler)
    }

    pub fn post<F>(&mut self, template: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestView, &mut ResponseWriter) + Send + Sync + 'static,
    {
        self.route(Method::POST, template, handler)
    }

    pub fn put<F>(&mut self, template: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestView, &mut ResponseWriter) + Send + Sync + 'static,
    {
        self.route(Method::PUT, template, handler)
    }

    pub fn patch<F>(&mut self, template: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestView, &mut ResponseWriter) + Send + Sync + 'static,
    {
        self.route(Method::PATCH, template, handler)
    }

    pub fn delete<F>(&mut self, template: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestView, &mut ResponseWriter) + Send + Sync + 'static,
    {
        self.route(Method::DELETE, template, handler)
    }

    /// Append a route. No duplicate or conflict detection: an entry shadowed
    /// by an earlier broader pattern is simply unreachable.
    pub fn route<F>(&mut self, method: Method, template: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestView, &mut ResponseWriter) + Send + Sync + 'static,
    {
        let pattern = CompiledPattern::compile(template);
        if pattern.is_malformed() {
            logger::log_warning(&format!(
                "Route template '{template}' is malformed, {method} route will never match"
            ));
        }
        logger::log_route_registered(&method, template);
        self.routes.push(RouteEntry {
            method,
            template: template.to_string(),
            pattern,
            handler: Arc::new(handler),
        });
        self
    }

    /// Mount `<static root>/<prefix>` at `prefix`
    pub fn mount(&mut self, url_prefix: &str) -> &mut Self {
        let dir = self.mount_dir_for(url_prefix);
        self.push_mount(StaticMount::new(url_prefix, dir, None))
    }

    /// Like [`Router::mount`], running `callback` after each served file
    pub fn mount_with_callback<F>(&mut self, url_prefix: &str, callback: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let dir = self.mount_dir_for(url_prefix);
        let callback: MountCallback = Arc::new(callback);
        self.push_mount(StaticMount::new(url_prefix, dir, Some(callback)))
    }

    /// Mount an arbitrary directory at `url_prefix`
    pub fn mount_dir(
        &mut self,
        url_prefix: &str,
        dir: impl AsRef<Path>,
        callback: Option<MountCallback>,
    ) -> &mut Self {
        self.push_mount(StaticMount::new(url_prefix, dir.as_ref(), callback))
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn mounts(&self) -> &[StaticMount] {
        &self.mounts
    }

    fn mount_dir_for(&self, url_prefix: &str) -> PathBuf {
        self.static_root.join(url_prefix.trim_start_matches('/'))
    }

    fn push_mount(&mut self, mount: StaticMount) -> &mut Self {
        logger::log_mount_registered(mount.url_prefix(), mount.root());
        self.mounts.push(mount);
        self
    }

    /// First route accepting `method` and `path`, in registration order
    pub fn find_route(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        self.routes.iter().find(|route| route.accepts(method, path))
    }

    /// Dispatch one request to exactly one terminal response
    pub async fn dispatch(&self, request: RequestView) -> Response<Full<Bytes>> {
        self.dispatch_with_outcome(request).await.0
    }

    /// Dispatch and also report which terminal state was reached
    pub async fn dispatch_with_outcome(
        &self,
        mut request: RequestView,
    ) -> (Response<Full<Bytes>>, Outcome) {
        if let Some(hit) = static_files::resolve(&self.mounts, &request.path).await {
            let response = static_files::serve(&hit, &request.path).await;
            return (response, Outcome::StaticServed);
        }

        if let Some(route) = self.find_route(&request.method, &request.path) {
            logger::log_route_dispatched(&request.method, &request.path, &route.template);
            request.params = route.pattern.extract(&request.path);
            if request.params.len() < route.pattern.param_names().len() {
                logger::log_warning(&format!(
                    "Route '{}' matched '{}' but not every parameter was extracted",
                    route.template, request.path
                ));
            }

            let mut writer = ResponseWriter::new();
            (route.handler)(&request, &mut writer);
            if !writer.is_finished() {
                logger::log_warning(&format!(
                    "Handler for {} '{}' returned without writing a response",
                    request.method, route.template
                ));
            }
            let outcome = Outcome::HandlerDispatched(route.template.clone());
            return (writer.into_response(), outcome);
        }

        if self.fallback_homepage && request.method == Method::GET && request.path == "/" {
            return (http::build_homepage_response(), Outcome::Homepage);
        }

        logger::log_not_found(&request.method, &request.path);
        let response = if request.method == Method::GET {
            http::build_404_page_response()
        } else {
            http::build_404_text_response()
        };
        (response, Outcome::NotFound)
    }
}
