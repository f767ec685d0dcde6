//! [`Router`](crate::Router) is a lightweight high performance HTTP request router.
//!
//! This router supports variables in the routing pattern and matches against
//! the request method. It also scales well.
//!
//! The router is optimized for high performance and a small memory footprint.
//! It scales well even with very long paths and a large number of routes.
//! A compressing dynamic trie (radix tree) structure is used for efficient matching.
//!
//! The `Router` can be used as the service of a hyper server:
//!
//! ```rust,no_run
//! use trie_router::{Router, Params};
//! use hyper::{Request, Response, Body, Error};
//!
//! async fn index(_: Request<Body>) -> Result<Response<Body>, Error> {
//!     Ok(Response::new("Hello, World!".into()))
//! }
//!
//! async fn hello(req: Request<Body>) -> Result<Response<Body>, Error> {
//!     let user = req.extensions().get::<Params>().and_then(|p| p.get("user")).unwrap_or("stranger");
//!     Ok(Response::new(format!("Hello, {}", user).into()))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::default()
//!         .get("/", index)?
//!         .get("/hello/:user", hello)?;
//!
//!     hyper::Server::bind(&([127, 0, 0, 1], 3000).into())
//!         .serve(router.into_service())
//!         .await?;
//!     Ok(())
//! }
//!```
//!
//! The registered path, against which the router matches incoming requests, can
//! contain two types of parameters:
//! ```ignore
//!  Syntax    Type
//!  :name     named parameter
//!  *name     catch-all parameter
//! ```
//!
//! Named parameters are dynamic path segments. They match anything until the
//! next '/' or the path end, but never an empty segment:
//! ```ignore
//!  Path: /blog/:category/:post
//!
//!  Requests:
//!   /blog/rust/request-routers            match: category="rust", post="request-routers"
//!   /blog/rust/request-routers/           no match, but the router would redirect
//!   /blog/rust/                           no match
//!   /blog/rust/request-routers/comments   no match
//! ```
//!
//! Catch-all parameters match anything until the path end, including the
//! directory index (the '/' before the catch-all). Since they match anything
//! until the end, catch-all parameters must always be the final path element.
//! ```ignore
//!  Path: /files/*filepath
//!
//!  Requests:
//!   /files/                             match: filepath="/"
//!   /files/LICENSE                      match: filepath="/LICENSE"
//!   /files/templates/article.html       match: filepath="/templates/article.html"
//!   /files                              no match, but the router would redirect
//! ```
//! The value of parameters is saved as a slice of the `Param` struct, consisting
//! each of a key and a value.
//!
//! There are two ways to retrieve the value of a parameter:
//!  1) by the name of the parameter
//! ```rust
//!  # use trie_router::Params;
//!  # let params = Params::default();
//!  let user = params.get("user"); // defined by :user or *user
//! ```
//!  2) by the index of the parameter. This way you can also get the name (key)
//! ```rust,no_run
//!  # use trie_router::Params;
//!  # let params = Params::default();
//!  let third_key = &params[2].key;   // the name of the 3rd parameter
//!  let third_value = &params[2].value; // the value of the 3rd parameter
//! ```
use crate::error::InsertError;
use crate::params::{Params, ParamsPool, MATCHED_ROUTE_PATH};
use crate::path::clean;
use crate::tree::{Match, Node, Tsr};

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::{self, CatchUnwind};
use futures_util::{ready, FutureExt};
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::service::Service;
use hyper::{Body, Method, Request, Response, StatusCode, Uri};

/// Router dispatches requests to different handlers via configurable routes.
pub struct Router {
    trees: HashMap<Method, Node<Box<dyn Handler>>>,
    params: Arc<ParamsPool>,
    global_allowed: Vec<Method>,
    redirect_trailing_slash: bool,
    redirect_fixed_path: bool,
    handle_method_not_allowed: bool,
    handle_options: bool,
    save_matched_route_path: bool,
    global_options: Option<Box<dyn Handler>>,
    not_found: Option<Box<dyn Handler>>,
    method_not_allowed: Option<Box<dyn Handler>>,
    panic_handler: Option<Arc<dyn PanicHandler>>,
}

impl Router {
    /// Creates a router with the default configuration; equivalent to
    /// [`Router::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value into the router for a specific path at the specified method.
    /// ```rust
    /// use trie_router::Router;
    /// use hyper::{Response, Body, Method};
    ///
    /// let router = Router::default()
    ///     .handle("/teapot", Method::GET, |_| async {
    ///         Ok(Response::new(Body::from("I am a teapot!")))
    ///     })
    ///     .unwrap();
    /// ```
    ///
    /// Registration fails if the path is malformed or conflicts with a route
    /// already registered for the method. Errors are meant to abort startup.
    pub fn handle(
        self,
        path: &str,
        method: Method,
        handler: impl Handler + 'static,
    ) -> Result<Self, InsertError> {
        self.insert(path, method, Box::new(handler))
    }

    /// Registers a batch of routes, stopping at the first one that fails.
    /// ```rust
    /// use trie_router::{Route, Router};
    /// use hyper::{Body, Request, Response};
    ///
    /// async fn ok(_: Request<Body>) -> hyper::Result<Response<Body>> {
    ///     Ok(Response::new(Body::empty()))
    /// }
    ///
    /// let router = Router::default()
    ///     .routes(vec![
    ///         Route::get("/users", ok),
    ///         Route::post("/users", ok),
    ///         Route::delete("/users/:id", ok),
    ///     ])
    ///     .unwrap();
    /// ```
    pub fn routes(self, routes: impl IntoIterator<Item = Route>) -> Result<Self, InsertError> {
        routes.into_iter().try_fold(self, |router, route| {
            router.insert(&route.path, route.method, route.handler)
        })
    }

    fn insert(
        mut self,
        path: &str,
        method: Method,
        handler: Box<dyn Handler>,
    ) -> Result<Self, InsertError> {
        let new_method = !self.trees.contains_key(&method);

        let params = self
            .trees
            .entry(method.clone())
            .or_insert_with(Node::default)
            .insert(path, handler)?;

        self.params
            .reserve(params + usize::from(self.save_matched_route_path));

        if new_method {
            self.refresh_global_allowed();
        }

        tracing::debug!(method = %method, path, params, "registered route");
        Ok(self)
    }

    /// Lookup allows the manual lookup of handler for a specific method and path.
    /// If the handler is not found, it returns a `Err(Tsr)` indicating whether a redirection should be performed to the same path with a trailing slash
    /// ```rust
    /// use trie_router::Router;
    /// use hyper::{Response, Body, Method};
    ///
    /// let router = Router::default()
    ///     .get("/home", |_| async {
    ///         Ok(Response::new(Body::from("Welcome!")))
    ///     })
    ///     .unwrap();
    ///
    /// let res = router.lookup(&Method::GET, "/home").unwrap();
    /// assert!(res.params.is_empty());
    /// ```
    pub fn lookup(
        &self,
        method: &Method,
        path: impl AsRef<str>,
    ) -> Result<Match<'_, Box<dyn Handler>>, Tsr> {
        self.trees
            .get(method)
            .map_or(Err(Tsr::No), |n| n.at_with(path.as_ref(), self.params.get()))
    }

    /// Register a handler for `GET` requests
    pub fn get(self, path: &str, handler: impl Handler + 'static) -> Result<Self, InsertError> {
        self.handle(path, Method::GET, handler)
    }

    /// Register a handler for `HEAD` requests
    pub fn head(self, path: &str, handler: impl Handler + 'static) -> Result<Self, InsertError> {
        self.handle(path, Method::HEAD, handler)
    }

    /// Register a handler for `OPTIONS` requests
    pub fn options(self, path: &str, handler: impl Handler + 'static) -> Result<Self, InsertError> {
        self.handle(path, Method::OPTIONS, handler)
    }

    /// Register a handler for `POST` requests
    pub fn post(self, path: &str, handler: impl Handler + 'static) -> Result<Self, InsertError> {
        self.handle(path, Method::POST, handler)
    }

    /// Register a handler for `PUT` requests
    pub fn put(self, path: &str, handler: impl Handler + 'static) -> Result<Self, InsertError> {
        self.handle(path, Method::PUT, handler)
    }

    /// Register a handler for `PATCH` requests
    pub fn patch(self, path: &str, handler: impl Handler + 'static) -> Result<Self, InsertError> {
        self.handle(path, Method::PATCH, handler)
    }

    /// Register a handler for `DELETE` requests
    pub fn delete(self, path: &str, handler: impl Handler + 'static) -> Result<Self, InsertError> {
        self.handle(path, Method::DELETE, handler)
    }

    /// Enables automatic redirection if the current route can't be matched but a
    /// handler for the path with (without) the trailing slash exists.
    /// For example if `/foo/` is requested but a route only exists for `/foo`, the
    /// client is redirected to `/foo` with HTTP status code 301 for `GET` and
    /// `HEAD` requests and 308 for all other request methods.
    ///
    /// Enabled by default.
    pub fn redirect_trailing_slash(mut self, enabled: bool) -> Self {
        self.redirect_trailing_slash = enabled;
        self
    }

    /// If enabled, the router tries to fix the current request path, if no
    /// handle is registered for it.
    /// First superfluous path elements like `../` or `//` are removed.
    /// Afterwards the router does a case-insensitive lookup of the cleaned path.
    /// If a handle can be found for this route, the router makes a redirection
    /// to the corrected path with status code 301 for `GET` and `HEAD` requests
    /// and 308 for all other request methods.
    /// For example `/FOO` and `/..//Foo` could be redirected to `/foo`.
    /// `redirect_trailing_slash` is independent of this option.
    ///
    /// Enabled by default.
    pub fn redirect_fixed_path(mut self, enabled: bool) -> Self {
        self.redirect_fixed_path = enabled;
        self
    }

    /// If enabled, the router checks if another method is allowed for the
    /// current route, if the current request can not be routed.
    /// If this is the case, the request is answered with `MethodNotAllowed`
    /// and HTTP status code 405.
    /// If no other Method is allowed, the request is delegated to the `NotFound`
    /// handler.
    ///
    /// Enabled by default.
    pub fn handle_method_not_allowed(mut self, enabled: bool) -> Self {
        self.handle_method_not_allowed = enabled;
        self
    }

    /// If enabled, the router automatically replies to `OPTIONS` requests.
    /// Custom `OPTIONS` handlers take priority over automatic replies.
    ///
    /// Enabled by default.
    pub fn handle_options(mut self, enabled: bool) -> Self {
        self.handle_options = enabled;
        self
    }

    /// If enabled, the pattern of the matched route is appended to the
    /// request's [`Params`] under [`MATCHED_ROUTE_PATH`](crate::MATCHED_ROUTE_PATH).
    /// Set this before registering routes so that parameter buffers are
    /// sized for the extra entry.
    ///
    /// Disabled by default.
    pub fn save_matched_route_path(mut self, enabled: bool) -> Self {
        self.save_matched_route_path = enabled;
        self
    }

    /// Sets the number of idle parameter buffers kept for reuse across
    /// requests. Buffers returned to a full pool are freed.
    pub fn params_pool_capacity(mut self, capacity: usize) -> Self {
        let pool = ParamsPool::new(capacity);
        pool.reserve(self.params.max_params());
        self.params = Arc::new(pool);
        self
    }

    /// An optional handler that is called on automatic `OPTIONS` requests.
    /// The handler is only called if `handle_options` is true and no `OPTIONS`
    /// handler for the specific path was set.
    /// The `Allow` header is added to the handler's response unless it sets one.
    pub fn global_options(mut self, handler: impl Handler + 'static) -> Self {
        self.global_options = Some(Box::new(handler));
        self
    }

    /// Configurable handler which is called when no matching route is
    /// found.
    pub fn not_found(mut self, handler: impl Handler + 'static) -> Self {
        self.not_found = Some(Box::new(handler));
        self
    }

    /// A configurable handler which is called when a request
    /// cannot be routed and `handle_method_not_allowed` is true.
    /// The `Allow` header with allowed request methods is added to the
    /// handler's response unless it sets one.
    pub fn method_not_allowed(mut self, handler: impl Handler + 'static) -> Self {
        self.method_not_allowed = Some(Box::new(handler));
        self
    }

    /// A handler for panics raised by route handlers. When set, a panicking
    /// handler is answered with the response of this handler instead of
    /// unwinding into the server.
    /// ```rust
    /// use trie_router::{Panic, Router};
    /// use hyper::{Body, Response, StatusCode};
    ///
    /// let router = Router::default().panic_handler(|panic: Panic| {
    ///     let mut res = Response::new(Body::from(format!("error: {}", panic.message())));
    ///     *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    ///     res
    /// });
    /// ```
    pub fn panic_handler(mut self, handler: impl PanicHandler + 'static) -> Self {
        self.panic_handler = Some(Arc::new(handler));
        self
    }

    /// Returns a list of the allowed methods for a specific path, other than
    /// `method`. The path `*` asks for every method the server can handle.
    /// ```rust
    /// use trie_router::Router;
    /// use hyper::{Response, Body, Method};
    ///
    /// let router = Router::default()
    ///     .get("/home", |_| async {
    ///         Ok(Response::new(Body::from("Welcome!")))
    ///     })
    ///     .unwrap()
    ///     .post("/home", |_| async {
    ///         Ok(Response::new(Body::from("Welcome!")))
    ///     })
    ///     .unwrap();
    ///
    /// let allowed = router.allowed("/home", &Method::PUT);
    /// assert_eq!(allowed, ["GET", "OPTIONS", "POST"]);
    /// ```
    pub fn allowed(&self, path: &str, method: &Method) -> Vec<&str> {
        if path == "*" {
            return self.global_allowed.iter().map(Method::as_str).collect();
        }

        let mut allowed = self
            .trees
            .iter()
            .filter(|(m, _)| *m != method && **m != Method::OPTIONS)
            .filter(|(_, root)| root.matches(path))
            .map(|(m, _)| m.as_str())
            .collect::<Vec<_>>();

        if !allowed.is_empty() {
            allowed.push("OPTIONS");
            allowed.sort_unstable();
        }

        allowed
    }

    /// The server-wide allow list only changes when a method gets its first
    /// route.
    fn refresh_global_allowed(&mut self) {
        let mut allowed = self
            .trees
            .keys()
            .filter(|&m| *m != Method::OPTIONS)
            .cloned()
            .collect::<Vec<_>>();

        if !allowed.is_empty() {
            allowed.push(Method::OPTIONS);
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        }

        self.global_allowed = allowed;
    }

    /// Routes a request without invoking anything.
    ///
    /// ```rust
    /// use trie_router::{Dispatch, Router};
    /// use hyper::{Response, Body, Method, StatusCode};
    ///
    /// let router = Router::default()
    ///     .get("/user/:name", |_| async { Ok(Response::new(Body::empty())) })
    ///     .unwrap();
    ///
    /// match router.dispatch(&Method::GET, "/user/gopher") {
    ///     Dispatch::Matched { params, .. } => assert_eq!(params.get("name"), Some("gopher")),
    ///     _ => unreachable!(),
    /// }
    ///
    /// match router.dispatch(&Method::GET, "/user/gopher/") {
    ///     Dispatch::Redirect { location, status } => {
    ///         assert_eq!(location, "/user/gopher");
    ///         assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
    ///     }
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn dispatch(&self, method: &Method, path: &str) -> Dispatch<'_> {
        if let Some(root) = self.trees.get(method) {
            match root.at_with(path, self.params.get()) {
                Ok(Match {
                    value,
                    mut params,
                    route,
                }) => {
                    if self.save_matched_route_path {
                        params.push(MATCHED_ROUTE_PATH, route);
                    }

                    return Dispatch::Matched {
                        handler: value.as_ref(),
                        params,
                    };
                }
                Err(tsr) => {
                    if *method != Method::CONNECT && path != "/" {
                        let status = match *method {
                            // Moved Permanently, request with GET method
                            Method::GET | Method::HEAD => StatusCode::MOVED_PERMANENTLY,
                            // Permanent Redirect, request with same method
                            _ => StatusCode::PERMANENT_REDIRECT,
                        };

                        if tsr == Tsr::Yes && self.redirect_trailing_slash {
                            let location = match path.strip_suffix('/') {
                                Some(stripped) => stripped.to_owned(),
                                None => format!("{}/", path),
                            };

                            tracing::trace!(%method, path, %location, "trailing slash redirect");
                            return Dispatch::Redirect { location, status };
                        }

                        if self.redirect_fixed_path {
                            let fixed = root.path_ignore_case(&clean(path), self.redirect_trailing_slash);
                            if let Some(location) = fixed.filter(|fixed| fixed != path) {
                                tracing::trace!(%method, path, %location, "fixed path redirect");
                                return Dispatch::Redirect { location, status };
                            }
                        }
                    }
                }
            }
        }

        if *method == Method::OPTIONS && self.handle_options {
            let allowed = self.allowed(path, method);

            if !allowed.is_empty() {
                return Dispatch::Options(allowed);
            }
        } else if self.handle_method_not_allowed {
            let allowed = self.allowed(path, method);

            if !allowed.is_empty() {
                tracing::trace!(%method, path, "method not allowed");
                return Dispatch::MethodNotAllowed(allowed);
            }
        }

        tracing::trace!(%method, path, "no route matched");
        Dispatch::NotFound
    }
}

/// The default configuration
impl Default for Router {
    fn default() -> Self {
        Self {
            trees: HashMap::new(),
            params: Arc::new(ParamsPool::new(ParamsPool::DEFAULT_CAPACITY)),
            global_allowed: Vec::new(),
            redirect_trailing_slash: true,
            redirect_fixed_path: true,
            handle_method_not_allowed: true,
            handle_options: true,
            save_matched_route_path: false,
            global_options: None,
            method_not_allowed: None,
            not_found: None,
            panic_handler: None,
        }
    }
}

/// A route that has not been registered yet, for [`Router::routes`].
pub struct Route {
    method: Method,
    path: String,
    handler: Box<dyn Handler>,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self {
            method,
            path: path.into(),
            handler: Box::new(handler),
        }
    }

    pub fn get(path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::GET, path, handler)
    }

    pub fn post(path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::POST, path, handler)
    }

    pub fn put(path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::PUT, path, handler)
    }

    pub fn patch(path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::PATCH, path, handler)
    }

    pub fn delete(path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::DELETE, path, handler)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}

/// The outcome of routing a request.
pub enum Dispatch<'r> {
    /// A route matched.
    Matched {
        handler: &'r dyn Handler,
        params: Params,
    },
    /// The path can be corrected. `status` is 301 for `GET` and `HEAD`
    /// requests and 308 otherwise.
    Redirect { location: String, status: StatusCode },
    /// An automatic reply to an `OPTIONS` request, with the allowed methods.
    Options(Vec<&'r str>),
    /// The path exists for other methods only.
    MethodNotAllowed(Vec<&'r str>),
    NotFound,
}

impl fmt::Debug for Dispatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Matched { params, .. } => {
                f.debug_struct("Matched").field("params", params).finish()
            }
            Dispatch::Redirect { location, status } => f
                .debug_struct("Redirect")
                .field("location", location)
                .field("status", status)
                .finish(),
            Dispatch::Options(allowed) => f.debug_tuple("Options").field(allowed).finish(),
            Dispatch::MethodNotAllowed(allowed) => {
                f.debug_tuple("MethodNotAllowed").field(allowed).finish()
            }
            Dispatch::NotFound => f.write_str("NotFound"),
        }
    }
}

/// The future returned by a [`Handler`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = hyper::Result<Response<Body>>> + Send + Sync>>;

/// Represents a HTTP handler function.
/// This trait is implemented for asynchronous functions that take a `Request` and return a
/// `Result<Response<Body>, hyper::Error>`
/// ```rust
/// # use trie_router::Handler;
/// # use hyper::{Request, Response, Body};
/// async fn hello(_: Request<Body>) -> Result<Response<Body>, hyper::Error> {
///     Ok(Response::new(Body::empty()))
/// }
///
/// let handler: Box<dyn Handler> = Box::new(hello);
/// ```
pub trait Handler: Send + Sync {
    fn handle(&self, req: Request<Body>) -> HandlerFuture;
}

impl<F, R> Handler for F
where
    F: Fn(Request<Body>) -> R + Send + Sync,
    R: Future<Output = Result<Response<Body>, hyper::Error>> + Send + Sync + 'static,
{
    fn handle(&self, req: Request<Body>) -> HandlerFuture {
        Box::pin(self(req))
    }
}

/// A panic raised by a route handler.
pub struct Panic {
    pub method: Method,
    pub uri: Uri,
    pub payload: Box<dyn Any + Send>,
}

impl Panic {
    /// The panic message, if the payload is a string.
    pub fn message(&self) -> &str {
        if let Some(message) = self.payload.downcast_ref::<&'static str>() {
            message
        } else if let Some(message) = self.payload.downcast_ref::<String>() {
            message
        } else {
            "Box<dyn Any>"
        }
    }
}

impl fmt::Debug for Panic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panic")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("message", &self.message())
            .finish()
    }
}

/// Turns a handler panic into a response.
///
/// This trait is implemented for functions that take a [`Panic`] and
/// return a `Response<Body>`.
pub trait PanicHandler: Send + Sync {
    fn handle(&self, panic: Panic) -> Response<Body>;
}

impl<F> PanicHandler for F
where
    F: Fn(Panic) -> Response<Body> + Send + Sync,
{
    fn handle(&self, panic: Panic) -> Response<Body> {
        self(panic)
    }
}

/// What a panicking handler needs to be answered with.
struct Recover {
    handler: Arc<dyn PanicHandler>,
    method: Method,
    uri: Uri,
}

impl Recover {
    fn respond(&self, payload: Box<dyn Any + Send>) -> Response<Body> {
        let panic = Panic {
            method: self.method.clone(),
            uri: self.uri.clone(),
            payload,
        };

        tracing::error!(method = %panic.method, uri = %panic.uri, message = panic.message(), "handler panicked");
        self.handler.handle(panic)
    }
}

#[doc(hidden)]
pub struct MakeRouterService(RouterService);

impl<T> Service<T> for MakeRouterService {
    type Response = RouterService;
    type Error = hyper::Error;
    type Future = future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _: T) -> Self::Future {
        let service = self.0.clone();
        future::ok(service)
    }
}

#[doc(hidden)]
#[derive(Clone)]
pub struct RouterService(Arc<Router>);

impl RouterService {
    fn new(router: Router) -> Self {
        RouterService(Arc::new(router))
    }
}

impl Service<Request<Body>> for RouterService {
    type Response = Response<Body>;
    type Error = hyper::Error;
    type Future = ResponseFut;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        self.0.serve(req)
    }
}

impl Router {
    /// Converts the `Router` into a `Service` which you can serve directly with `Hyper`.
    /// If you have an existing `Service` that you want to incorporate a `Router` into, see
    /// [`Router::serve`](crate::Router::serve).
    /// ```rust,no_run
    /// # use trie_router::Router;
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// // Our router...
    /// let router = Router::default();
    ///
    /// // Convert it into a service...
    /// let service = router.into_service();
    ///
    /// // Serve with hyper
    /// hyper::Server::bind(&([127, 0, 0, 1], 3030).into())
    ///     .serve(service)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn into_service(self) -> MakeRouterService {
        MakeRouterService(RouterService::new(self))
    }

    /// An asynchronous function from a `Request` to a `Response`. You will generally not need to use
    /// this function directly, and instead use
    /// [`Router::into_service`](crate::Router::into_service). However, it may be useful when
    /// incorporating the router into a larger service.
    /// ```rust,no_run
    /// # use trie_router::Router;
    /// # use hyper::service::{make_service_fn, service_fn};
    /// # use hyper::{Request, Body, Server};
    /// # use std::convert::Infallible;
    /// # use std::sync::Arc;
    ///
    /// # async fn run() {
    /// let router = Arc::new(Router::default());
    ///
    /// let make_svc = make_service_fn(move |_| {
    ///     let router = router.clone();
    ///     async move {
    ///         Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
    ///             let router = router.clone();
    ///             async move { router.serve(req).await }
    ///         }))
    ///     }
    /// });
    ///
    /// let server = Server::bind(&([127, 0, 0, 1], 3000).into())
    ///     .serve(make_svc)
    ///     .await;
    /// # }
    /// ```
    pub fn serve(&self, mut req: Request<Body>) -> ResponseFut {
        match self.dispatch(req.method(), req.uri().path()) {
            Dispatch::Matched { handler, params } => {
                req.extensions_mut().insert(params);
                self.call(handler, req)
            }
            Dispatch::Redirect {
                mut location,
                status,
            } => {
                if let Some(query) = req.uri().query() {
                    location.push('?');
                    location.push_str(query);
                }

                ResponseFutKind::Redirect(location, status).into()
            }
            Dispatch::Options(allowed) => {
                let allowed = allowed.join(", ");
                match self.global_options {
                    Some(ref handler) => with_allow(self.call(handler.as_ref(), req), &allowed),
                    None => ResponseFutKind::Options(allowed).into(),
                }
            }
            Dispatch::MethodNotAllowed(allowed) => {
                let allowed = allowed.join(", ");
                match self.method_not_allowed {
                    Some(ref handler) => with_allow(self.call(handler.as_ref(), req), &allowed),
                    None => ResponseFutKind::MethodNotAllowed(allowed).into(),
                }
            }
            Dispatch::NotFound => match self.not_found {
                Some(ref handler) => self.call(handler.as_ref(), req),
                None => ResponseFutKind::NotFound.into(),
            },
        }
    }

    /// Invokes a handler, guarding it with the panic handler if one is set.
    fn call(&self, handler: &dyn Handler, req: Request<Body>) -> ResponseFut {
        let panic_handler = match self.panic_handler {
            Some(ref panic_handler) => panic_handler,
            None => return ResponseFutKind::Boxed(handler.handle(req)).into(),
        };

        let recover = Recover {
            handler: Arc::clone(panic_handler),
            method: req.method().clone(),
            uri: req.uri().clone(),
        };

        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(req))) {
            Ok(fut) => ResponseFutKind::Guarded(AssertUnwindSafe(fut).catch_unwind(), recover).into(),
            Err(payload) => {
                ResponseFutKind::Boxed(Box::pin(future::ok(recover.respond(payload)))).into()
            }
        }
    }
}

/// Adds the `Allow` header to a custom handler's response.
fn with_allow(inner: ResponseFut, allowed: &str) -> ResponseFut {
    match HeaderValue::from_str(allowed) {
        Ok(allowed) => ResponseFutKind::WithAllow(Box::new(inner), allowed).into(),
        Err(_) => {
            tracing::warn!(header = %header::ALLOW, value = allowed, "invalid header value in router response");
            inner
        }
    }
}

pub struct ResponseFut {
    kind: ResponseFutKind,
}

impl From<ResponseFutKind> for ResponseFut {
    fn from(kind: ResponseFutKind) -> Self {
        Self { kind }
    }
}

enum ResponseFutKind {
    Boxed(HandlerFuture),
    Guarded(CatchUnwind<AssertUnwindSafe<HandlerFuture>>, Recover),
    WithAllow(Box<ResponseFut>, HeaderValue),
    Redirect(String, StatusCode),
    MethodNotAllowed(String),
    Options(String),
    NotFound,
}

impl Future for ResponseFut {
    type Output = hyper::Result<Response<Body>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let ready = match self.kind {
            ResponseFutKind::Boxed(ref mut fut) => ready!(fut.as_mut().poll(cx)),
            ResponseFutKind::Guarded(ref mut fut, ref recover) => match ready!(fut.poll_unpin(cx)) {
                Ok(res) => res,
                Err(payload) => Ok(recover.respond(payload)),
            },
            ResponseFutKind::WithAllow(ref mut fut, ref allowed) => {
                ready!(Pin::new(&mut **fut).poll(cx)).map(|mut res| {
                    res.headers_mut()
                        .entry(header::ALLOW)
                        .or_insert_with(|| allowed.clone());
                    res
                })
            }
            ResponseFutKind::Redirect(ref path, code) => {
                Ok(fallback_response(code, Some((header::LOCATION, path.as_str())), Body::empty()))
            }
            ResponseFutKind::NotFound => Ok(fallback_response(
                StatusCode::NOT_FOUND,
                None,
                Body::from("404 page not found"),
            )),
            ResponseFutKind::Options(ref allowed) => {
                Ok(fallback_response(StatusCode::OK, Some((header::ALLOW, allowed.as_str())), Body::empty()))
            }
            ResponseFutKind::MethodNotAllowed(ref allowed) => Ok(fallback_response(
                StatusCode::METHOD_NOT_ALLOWED,
                Some((header::ALLOW, allowed.as_str())),
                Body::from("Method Not Allowed"),
            )),
        };

        Poll::Ready(ready)
    }
}

/// Builds a router-generated response.
fn fallback_response(
    status: StatusCode,
    header: Option<(HeaderName, &str)>,
    body: Body,
) -> Response<Body> {
    let mut res = Response::new(body);
    *res.status_mut() = status;

    if let Some((name, value)) = header {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                res.headers_mut().insert(name, value);
            }
            Err(_) => {
                tracing::warn!(header = %name, value, "invalid header value in router response");
                *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                *res.body_mut() = Body::empty();
            }
        }
    }

    res
}
