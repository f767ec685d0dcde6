use hyper::header::{self, HeaderValue};
use hyper::service::Service;
use hyper::{Body, Method, Request, Response, StatusCode};
use std::future::{ready, Ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use trie_router::{Dispatch, Panic, Params, Router};

async fn echo(req: Request<Body>) -> hyper::Result<Response<Body>> {
    let body = match req.extensions().get::<Params>() {
        Some(params) => params
            .iter()
            .map(|param| format!("{}={}", param.key, param.value))
            .collect::<Vec<_>>()
            .join("&"),
        None => String::from("no params"),
    };

    Ok(Response::new(Body::from(body)))
}

async fn explode(_: Request<Body>) -> hyper::Result<Response<Body>> {
    panic!("handler exploded")
}

fn explode_early(_: Request<Body>) -> Ready<hyper::Result<Response<Body>>> {
    panic!("exploded before polling")
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body(res: Response<Body>) -> String {
    let bytes = hyper::body::to_bytes(res.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn allow(res: &Response<Body>) -> Option<&str> {
    res.headers()
        .get(header::ALLOW)
        .and_then(|value| value.to_str().ok())
}

#[tokio::test]
async fn handlers_receive_params() {
    let router = Router::default()
        .get("/user/:name/files/*path", echo)
        .unwrap()
        .get("/", echo)
        .unwrap();

    let res = router
        .serve(request(Method::GET, "/user/gopher/files/a/b.txt"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body(res).await, "name=gopher&path=/a/b.txt");

    let res = router.serve(request(Method::GET, "/")).await.unwrap();
    assert_eq!(body(res).await, "");
}

#[tokio::test]
async fn matched_route_path_reaches_handlers() {
    let router = Router::default()
        .save_matched_route_path(true)
        .get("/user/:name", echo)
        .unwrap();

    let res = router
        .serve(request(Method::GET, "/user/gopher"))
        .await
        .unwrap();
    assert_eq!(body(res).await, "name=gopher&$matchedRoutePath=/user/:name");
}

#[tokio::test]
async fn redirects_keep_the_query() {
    let router = Router::default()
        .get("/user/:name", echo)
        .unwrap()
        .post("/submit/", echo)
        .unwrap();

    let res = router
        .serve(request(Method::GET, "/user/gopher/?tab=repos"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[header::LOCATION], "/user/gopher?tab=repos");

    let res = router
        .serve(request(Method::GET, "/USER//gopher"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[header::LOCATION], "/user/gopher");

    let res = router
        .serve(request(Method::POST, "/submit"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(res.headers()[header::LOCATION], "/submit/");
}

#[tokio::test]
async fn default_fallback_responses() {
    let router = Router::default()
        .get("/path", echo)
        .unwrap()
        .delete("/path", echo)
        .unwrap();

    let res = router.serve(request(Method::PUT, "/path")).await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(allow(&res), Some("DELETE, GET, OPTIONS"));
    assert_eq!(body(res).await, "Method Not Allowed");

    let res = router
        .serve(request(Method::OPTIONS, "/path"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(allow(&res), Some("DELETE, GET, OPTIONS"));

    let res = router.serve(request(Method::OPTIONS, "*")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(allow(&res), Some("DELETE, GET, OPTIONS"));

    let res = router.serve(request(Method::GET, "/nope")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(res).await, "404 page not found");
}

#[tokio::test]
async fn custom_fallbacks_get_the_allow_header() {
    let router = Router::default()
        .get("/path", echo)
        .unwrap()
        .post("/path", echo)
        .unwrap()
        .method_not_allowed(|_| async {
            let mut res = Response::new(Body::from("custom 405"));
            *res.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
            Ok(res)
        })
        .global_options(|_| async {
            let mut res = Response::new(Body::empty());
            res.headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET"));
            Ok(res)
        })
        .not_found(|_| async {
            let mut res = Response::new(Body::from("custom 404"));
            *res.status_mut() = StatusCode::NOT_FOUND;
            Ok(res)
        });

    let res = router.serve(request(Method::PUT, "/path")).await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(allow(&res), Some("GET, OPTIONS, POST"));
    assert_eq!(body(res).await, "custom 405");

    // a header set by the handler wins
    let res = router
        .serve(request(Method::OPTIONS, "/path"))
        .await
        .unwrap();
    assert_eq!(allow(&res), Some("GET"));

    let res = router.serve(request(Method::GET, "/nope")).await.unwrap();
    assert_eq!(allow(&res), None);
    assert_eq!(body(res).await, "custom 404");
}

#[tokio::test]
async fn panics_are_recovered() {
    let recovered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&recovered);

    let router = Router::default()
        .get("/explode", explode)
        .unwrap()
        .get("/explode-early", explode_early)
        .unwrap()
        .panic_handler(move |panic: Panic| {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut res = Response::new(Body::from(format!(
                "{} {}: {}",
                panic.method,
                panic.uri,
                panic.message()
            )));
            *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            res
        });

    let res = router
        .serve(request(Method::GET, "/explode"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body(res).await, "GET /explode: handler exploded");

    let res = router
        .serve(request(Method::GET, "/explode-early?now=1"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body(res).await,
        "GET /explode-early?now=1: exploded before polling"
    );

    assert_eq!(recovered.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn router_as_a_hyper_service() {
    let router = Router::default().get("/hello/:name", echo).unwrap();

    let mut make_service = router.into_service();
    let mut service = make_service.call(()).await.unwrap();

    let res = service
        .call(request(Method::GET, "/hello/world"))
        .await
        .unwrap();
    assert_eq!(body(res).await, "name=world");

    let res = service
        .call(request(Method::GET, "/hello/world/"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
}

#[test]
fn concurrent_lookups_do_not_share_params() {
    let router = Arc::new(
        Router::default()
            .params_pool_capacity(4)
            .get("/user/:name/post/:id", echo)
            .unwrap(),
    );

    let threads = (0..8)
        .map(|t| {
            let router = Arc::clone(&router);
            thread::spawn(move || {
                for i in 0..500 {
                    let name = format!("user{}", t);
                    let id = i.to_string();
                    let path = format!("/user/{}/post/{}", name, id);

                    match router.dispatch(&Method::GET, &path) {
                        Dispatch::Matched { params, .. } => {
                            assert_eq!(params.len(), 2);
                            assert_eq!(params.get("name"), Some(name.as_str()));
                            assert_eq!(params.get("id"), Some(id.as_str()));
                        }
                        other => panic!("{} did not match: {:?}", path, other),
                    }
                }
            })
        })
        .collect::<Vec<_>>();

    for thread in threads {
        thread.join().unwrap();
    }
}
