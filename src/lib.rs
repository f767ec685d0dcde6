//! # trie-router
//!
//! A lightweight high performance HTTP request router.
//!
//! This router supports variables in the routing pattern and matches against the request method. It also scales very well.
//!
//! The router is optimized for high performance and a small memory footprint. It scales well even with very long paths and a large number of routes. A compressing dynamic trie (radix tree) structure, kept per request method, is used for efficient matching.
//!
//! ## Features
//!
//! **Only explicit matches:** With other routers, a requested URL path could match multiple patterns. Therefore they have some awkward pattern priority rules, like *longest match* or *first registered, first matched*. In this router a request can only match exactly one or no route, so there are no unintended matches.
//!
//! **Path auto-correction:** Besides detecting the missing or additional trailing slash at no extra cost, the router can also fix wrong cases and remove superfluous path elements (like `../` or `//`). The client is redirected to the corrected URL after a case-insensitive lookup.
//!
//! **Parameters in your routing pattern:** Stop parsing the requested URL path, just give the path segment a name and the router delivers the dynamic value to you. Parameter buffers are pooled, so path parameters are very cheap.
//!
//! **High Performance:** The router relies on a tree structure which makes heavy use of *common prefixes*, it is basically a [radix tree](https://en.wikipedia.org/wiki/Radix_tree). Children are ordered by how many routes pass through them, so the busiest branches are tried first.
//!
//! Of course you can also set **custom [`not_found`](crate::Router::not_found) and [`method_not_allowed`](crate::Router::method_not_allowed) handlers**, [**automatically respond to OPTIONS requests**](crate::Router::global_options) and [**recover from panicking handlers**](crate::Router::panic_handler).
//!
//! ## Usage
//!
//! Here is a simple example:
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
//!     let params = req.extensions().get::<Params>().cloned().unwrap_or_default();
//!     Ok(Response::new(format!("Hello, {}", params.get("user").unwrap_or_default()).into()))
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
//! ```
//!
//! ### Named parameters
//!
//! As you can see, `:user` is a *named parameter*. The values are accessible via `req.extensions().get::<Params>()`.
//!
//! Named parameters only match a single, non-empty path segment:
//!
//! ```ignore
//! Pattern: /user/:user
//!
//!  /user/gordon              match
//!  /user/you                 match
//!  /user/gordon/profile      no match
//!  /user/                    no match
//! ```
//!
//! **Note:** Since this router has only explicit matches, you can not register static routes and parameters for the same path segment. For example you can not register the patterns `/user/new` and `/user/:user` for the same request method at the same time. The routing of different request methods is independent from each other.
//!
//! ```rust
//! use trie_router::Router;
//! use hyper::{Response, Body};
//!
//! let err = Router::default()
//!     .get("/user/:user", |_| async { Ok(Response::new(Body::empty())) })
//!     .unwrap()
//!     .get("/user/new", |_| async { Ok(Response::new(Body::empty())) })
//!     .err()
//!     .unwrap();
//!
//! assert!(err.is_conflict());
//! ```
//!
//! ### Catch-All parameters
//!
//! The second type are *catch-all* parameters and have the form `*name`. Like the name suggests, they match everything. Therefore they must always be at the **end** of the pattern:
//!
//! ```ignore
//! Pattern: /src/*filepath
//!
//!  /src/                     match
//!  /src/somefile.go          match
//!  /src/subdir/somefile.go   match
//! ```
//!
//! ## Automatic OPTIONS responses and CORS
//!
//! One might wish to modify automatic responses to OPTIONS requests, e.g. to support [CORS preflight requests](https://developer.mozilla.org/en-US/docs/Glossary/preflight_request) or to set other headers. This can be achieved using the [`Router::global_options`](crate::Router::global_options) handler. The router adds the `Allow` header to its response:
//!
//! ```rust
//! use trie_router::Router;
//! use hyper::{Request, Response, Body, Error};
//!
//! async fn global_options(_: Request<Body>) -> Result<Response<Body>, Error> {
//!     let mut res = Response::new(Body::empty());
//!     res.headers_mut().insert("Access-Control-Allow-Origin", "*".parse().unwrap());
//!     Ok(res)
//! }
//!
//! let router = Router::default().global_options(global_options);
//! ```
//!
//! ### Multi-domain / Sub-domains
//!
//! Does your server serve multiple domains / hosts? You want to use sub-domains? Define a router per host!
//!
//! ```rust,no_run
//! use trie_router::Router;
//! use hyper::service::{make_service_fn, service_fn};
//! use hyper::{Body, Request, Response, Server, StatusCode};
//! use std::collections::HashMap;
//! use std::convert::Infallible;
//! use std::sync::Arc;
//!
//! pub struct HostSwitch(HashMap<String, Router>);
//!
//! impl HostSwitch {
//!     async fn serve(&self, req: Request<Body>) -> hyper::Result<Response<Body>> {
//!         let router = req
//!             .headers()
//!             .get("host")
//!             .and_then(|host| host.to_str().ok())
//!             .and_then(|host| self.0.get(host));
//!
//!         match router {
//!             Some(router) => router.serve(req).await,
//!             None => {
//!                 let mut forbidden = Response::new(Body::empty());
//!                 *forbidden.status_mut() = StatusCode::FORBIDDEN;
//!                 Ok(forbidden)
//!             }
//!         }
//!     }
//! }
//!
//! async fn hello(_: Request<Body>) -> hyper::Result<Response<Body>> {
//!     Ok(Response::new(Body::default()))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::default().get("/", hello)?;
//!
//!     let mut host_switch = HostSwitch(HashMap::new());
//!     host_switch.0.insert("example.com:12345".into(), router);
//!
//!     let host_switch = Arc::new(host_switch);
//!
//!     let make_svc = make_service_fn(move |_| {
//!         let host_switch = host_switch.clone();
//!         async move {
//!             Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
//!                 let host_switch = host_switch.clone();
//!                 async move { host_switch.serve(req).await }
//!             }))
//!         }
//!     });
//!
//!     Server::bind(&([127, 0, 0, 1], 3000).into())
//!         .serve(make_svc)
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ### Not Found Handler
//!
//! You can use another handler, to handle requests which could not be matched by this router by using the [`Router::not_found`](crate::Router::not_found) handler.
//! Requests whose path exists for another method are answered by
//! [`Router::method_not_allowed`](crate::Router::method_not_allowed) first, unless
//! [`Router::handle_method_not_allowed`](crate::Router::handle_method_not_allowed) is disabled.
//!
//! The `not_found` handler can for example be used to return a custom 404 page:
//!
//! ```rust
//! use trie_router::Router;
//! use hyper::{Response, Body, StatusCode};
//!
//! let router = Router::default().not_found(|_| async {
//!     let mut res = Response::new(Body::from("nothing here"));
//!     *res.status_mut() = StatusCode::NOT_FOUND;
//!     Ok(res)
//! });
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod params;
pub mod path;
pub mod tree;

#[doc(hidden)]
pub mod router;

#[doc(inline)]
pub use router::{Dispatch, Handler, Panic, PanicHandler, Route, Router};

#[doc(inline)]
pub use params::{Param, Params, MATCHED_ROUTE_PATH};

#[doc(inline)]
pub use error::{ConflictError, InsertError, StructuralError};

#[doc(inline)]
pub use tree::{Match, Tsr};
