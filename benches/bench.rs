#![feature(test)]

extern crate test;
extern crate trie_router;

use hyper::{Body, Method, Request, Response};
use std::future::{ready, Ready};
use test::Bencher;
use trie_router::path::clean;
use trie_router::tree::Node;
use trie_router::{Dispatch, Router};

// path, result
fn clean_tests() -> Vec<(&'static str, &'static str)> {
    vec![
        // already clean
        ("/", "/"),
        ("/abc", "/abc"),
        ("/a/b/c", "/a/b/c"),
        ("/abc/", "/abc/"),
        ("/a/b/c/", "/a/b/c/"),
        // missing root
        ("", "/"),
        ("a/", "/a/"),
        ("abc", "/abc"),
        ("abc/def", "/abc/def"),
        ("a/b/c", "/a/b/c"),
        // remove doubled slash
        ("//", "/"),
        ("/abc//", "/abc/"),
        ("/abc/def//", "/abc/def/"),
        ("/a/b/c//", "/a/b/c/"),
        ("/abc//def//ghi", "/abc/def/ghi"),
        ("//abc", "/abc"),
        ("///abc", "/abc"),
        ("//abc//", "/abc/"),
        // remove . elements
        (".", "/"),
        ("./", "/"),
        ("/abc/./def", "/abc/def"),
        ("/./abc/def", "/abc/def"),
        ("/abc/.", "/abc/"),
        // remove .. elements
        ("..", "/"),
        ("../", "/"),
        ("../../", "/"),
        ("../..", "/"),
        ("../../abc", "/abc"),
        ("/abc/def/ghi/../jkl", "/abc/def/jkl"),
        ("/abc/def/../ghi/../jkl", "/abc/jkl"),
        ("/abc/def/..", "/abc"),
        ("/abc/def/../..", "/"),
        ("/abc/def/../../..", "/"),
        ("/abc/def/../../../ghi/jkl/../../../mno", "/mno"),
        // combinations
        ("abc/./../def", "/def"),
        ("abc//./../def", "/def"),
        ("abc/../../././../def", "/def"),
    ]
}

#[bench]
fn test_path_clean(b: &mut Bencher) {
    let tests = clean_tests();

    b.iter(|| {
        for test in &tests {
            test::black_box(clean(test.0));
            test::black_box(clean(test.1));
        }
    });
}

#[bench]
fn test_path_clean_long(b: &mut Bencher) {
    let mut test_paths: Vec<(String, String)> = Vec::new();
    for i in 1..1234 {
        let element = "a".repeat(i);
        let correct = format!("/{}", element);

        test_paths.push((correct.clone(), correct.clone()));
        test_paths.push((element.clone(), correct.clone()));
        test_paths.push((format!("//{}", element), correct.clone()));
        test_paths.push((format!("//{}/b/..", element), correct.clone()));
    }

    b.iter(|| {
        for test in &test_paths {
            test::black_box(clean(&test.0));
            test::black_box(clean(&test.1));
        }
    });
}

const ROUTES: &[&str] = &[
    "/authorizations",
    "/authorizations/:id",
    "/applications/:client_id/tokens/:access_token",
    "/events",
    "/repos/:owner/:repo/events",
    "/networks/:owner/:repo/events",
    "/orgs/:org/events",
    "/users/:user/received_events",
    "/users/:user/received_events/public",
    "/users/:user/events",
    "/users/:user/events/public",
    "/users/:user/events/orgs/:org",
    "/feeds",
    "/notifications",
    "/repos/:owner/:repo/notifications",
    "/notifications/threads/:id",
    "/notifications/threads/:id/subscription",
    "/repos/:owner/:repo/stargazers",
    "/users/:user/starred",
    "/user/starred",
    "/user/starred/:owner/:repo",
    "/static/*filepath",
];

const LOOKUPS: &[&str] = &[
    "/authorizations/12",
    "/applications/rust/tokens/abcdef",
    "/repos/rust-lang/rust/events",
    "/users/gopher/events/orgs/golang",
    "/notifications/threads/42/subscription",
    "/user/starred/rust-lang/cargo",
    "/static/css/site.css",
];

fn ok(_: Request<Body>) -> Ready<hyper::Result<Response<Body>>> {
    ready(Ok(Response::new(Body::empty())))
}

#[bench]
fn tree_lookup(b: &mut Bencher) {
    let mut root = Node::default();
    for (i, route) in ROUTES.iter().enumerate() {
        root.insert(*route, i).unwrap();
    }

    b.iter(|| {
        for path in LOOKUPS {
            test::black_box(root.at(path).unwrap());
        }
    });
}

#[bench]
fn router_dispatch(b: &mut Bencher) {
    let router = ROUTES
        .iter()
        .fold(Router::default(), |router, route| router.get(route, ok).unwrap());

    b.iter(|| {
        for path in LOOKUPS {
            match router.dispatch(&Method::GET, path) {
                Dispatch::Matched { params, .. } => {
                    test::black_box(params);
                }
                other => panic!("{} did not match: {:?}", path, other),
            }
        }
    });
}

#[bench]
fn router_fixed_path(b: &mut Bencher) {
    let router = ROUTES
        .iter()
        .fold(Router::default(), |router, route| router.get(route, ok).unwrap());

    b.iter(|| {
        test::black_box(router.dispatch(&Method::GET, "/USERS/gopher//events/../events/"));
    });
}
