mod common;

use common::endpoints::{echo_endpoint, AppState};
use common::http_helpers::{body_json, request, request_with};
use http::header::ALLOW;
use http::StatusCode;
use routewise::endpoint::EndpointConfig;
use routewise::method::HttpMethod;
use routewise::router::{RouteOutcome, Router};
use routewise::{Dispatcher, RouterConfig};
use serde_json::json;

fn zoo(config: RouterConfig<AppState>) -> Dispatcher<AppState> {
    let endpoints = vec![
        echo_endpoint(HttpMethod::Get, "/", EndpointConfig::new()),
        echo_endpoint(HttpMethod::Get, "/zoo/animals", EndpointConfig::new()),
        echo_endpoint(HttpMethod::Post, "/zoo/animals", EndpointConfig::new()),
        echo_endpoint(
            [HttpMethod::Get, HttpMethod::Put, HttpMethod::Delete],
            "/zoo/animals/:id",
            EndpointConfig::new(),
        ),
        echo_endpoint(
            HttpMethod::Get,
            "/users/:userId/books/:bookId",
            EndpointConfig::new(),
        ),
        echo_endpoint("HEAD", "/zoo/health", EndpointConfig::new()),
    ];
    Dispatcher::build(endpoints, config).unwrap()
}

#[tokio::test]
async fn test_user_books_params() {
    let dispatcher = zoo(RouterConfig::default());
    let res = dispatcher.handle(request("GET", "/users/123/books/456")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(&res);
    assert_eq!(body["params"], json!({ "userId": "123", "bookId": "456" }));
    assert_eq!(body["route"], "/users/:userId/books/:bookId");
}

#[tokio::test]
async fn test_static_routes_have_empty_params() {
    let dispatcher = zoo(RouterConfig::default());
    for path in ["/", "/zoo/animals", "/zoo/animals/"] {
        let res = dispatcher.handle(request("GET", path)).await;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        assert_eq!(body_json(&res)["params"], json!({}));
    }
}

#[tokio::test]
async fn test_percent_encoded_params_are_decoded() {
    let dispatcher = zoo(RouterConfig::default());
    let res = dispatcher.handle(request("GET", "/zoo/animals/hello%20world")).await;
    assert_eq!(body_json(&res)["params"]["id"], "hello world");
}

#[tokio::test]
async fn test_not_found() {
    let dispatcher = zoo(RouterConfig::default());
    let res = dispatcher.handle(request("GET", "/nope")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(&res),
        json!({ "message": "No route found for path: /nope" })
    );

    let res = dispatcher.handle(request("GET", "/zoo/animals/1/extra")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_host_header_still_routes() {
    let dispatcher = zoo(RouterConfig::default());
    for host in ["bad host", "exa mple.com", "[::1"] {
        let res = dispatcher
            .handle(request_with("GET", "/zoo/animals/9?limit=2", &[("host", host)], ""))
            .await;
        assert_eq!(res.status(), StatusCode::OK, "{host}");
        let body = body_json(&res);
        assert_eq!(body["params"]["id"], "9");
        assert_eq!(body["query"]["limit"], "2");
    }
}

#[tokio::test]
async fn test_method_not_allowed_static_and_dynamic() {
    let dispatcher = zoo(RouterConfig::default());

    let res = dispatcher.handle(request("DELETE", "/zoo/animals")).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        body_json(&res),
        json!({ "message": "The HTTP method 'DELETE' is not allowed" })
    );
    assert_eq!(res.headers()[ALLOW], "GET, POST");

    // POST is declared (on /zoo/animals) but not on the dynamic route
    let res = dispatcher.handle(request("POST", "/zoo/animals/7")).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()[ALLOW], "GET, PUT, DELETE");
}

#[tokio::test]
async fn test_undeclared_and_unsupported_methods() {
    let dispatcher = zoo(RouterConfig::default());
    assert!(dispatcher.handler(HttpMethod::Patch).is_none());
    assert!(dispatcher.handler(HttpMethod::Options).is_none());
    assert_eq!(
        dispatcher.methods().collect::<Vec<_>>(),
        vec![
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Head
        ]
    );

    let res = dispatcher.handle(request("PATCH", "/zoo/animals/1")).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    // Undeclared methods are rejected before the path is looked at
    let res = dispatcher.handle(request("PATCH", "/nope")).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    let res = dispatcher.handle(request("GET", "/nope")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = dispatcher.handle(request("TRACE", "/zoo/animals/1")).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        body_json(&res)["message"],
        "The HTTP method 'TRACE' is not allowed"
    );
}

#[tokio::test]
async fn test_method_handler_rejects_foreign_method() {
    let dispatcher = zoo(RouterConfig::default());
    let get = dispatcher.handler(HttpMethod::Get).unwrap();
    let res = get.call(request("POST", "/zoo/animals")).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    let res = get.call(request("TRACE", "/zoo/animals")).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_base_path() {
    let dispatcher = Dispatcher::build(
        vec![
            echo_endpoint(HttpMethod::Get, "/session", EndpointConfig::new()),
            echo_endpoint(HttpMethod::Get, "/", EndpointConfig::new()),
        ],
        RouterConfig::default().base_path("/api/auth"),
    )
    .unwrap();

    let res = dispatcher.handle(request("GET", "/api/auth/session")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(&res)["route"], "/api/auth/session");

    let res = dispatcher.handle(request("GET", "/session")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = dispatcher.handle(request("GET", "/api/auth")).await;
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(
        dispatcher.routes(),
        &[
            (HttpMethod::Get, "/api/auth/session".to_string()),
            (HttpMethod::Get, "/api/auth".to_string())
        ]
    );
}

#[test]
fn test_build_rejects_conflicts_and_duplicates() {
    let conflict = Dispatcher::build(
        vec![
            echo_endpoint(HttpMethod::Get, "/users/:id", EndpointConfig::new()),
            echo_endpoint(HttpMethod::Get, "/users/:userId/books", EndpointConfig::new()),
        ],
        RouterConfig::default(),
    );
    let err = conflict.err().unwrap();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(err.message().contains(":userId"));
    assert!(err.message().contains(":id"));

    let duplicate = Dispatcher::build(
        vec![
            echo_endpoint([HttpMethod::Get, HttpMethod::Post], "/items", EndpointConfig::new()),
            echo_endpoint(HttpMethod::Post, "/items", EndpointConfig::new()),
        ],
        RouterConfig::default(),
    );
    let err = duplicate.err().unwrap();
    assert!(err.message().contains("Duplicate endpoint: POST /items"));

    // The base path is part of the registered pattern
    let prefixed = Dispatcher::build(
        vec![
            echo_endpoint(HttpMethod::Get, "/a", EndpointConfig::new()),
            echo_endpoint(HttpMethod::Get, "/v1/a", EndpointConfig::new()),
        ],
        RouterConfig::default().base_path("/v1"),
    );
    assert!(prefixed.is_ok());
}

#[test]
fn test_router_is_generic_over_values() {
    let mut router: Router<u32> = Router::new();
    router.add(&[HttpMethod::Get], "/a/:x/b", 1).unwrap();
    router.add(&[HttpMethod::Get], "/a/static/b", 2).unwrap();
    match router.route(HttpMethod::Get, "/a/static/b") {
        RouteOutcome::Matched(m) => {
            assert_eq!(*m.value, 2);
            assert!(m.path_params.is_empty());
        }
        other => panic!("unexpected {other:?}"),
    }
    match router.route(HttpMethod::Get, "/a/dynamic/b") {
        RouteOutcome::Matched(m) => assert_eq!(m.get_path_param("x"), Some("dynamic")),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_requests_share_router() {
    let state = AppState::default();
    let dispatcher = Dispatcher::build(
        vec![echo_endpoint(HttpMethod::Get, "/zoo/animals/:id", EndpointConfig::new())],
        RouterConfig::new(state.clone()),
    )
    .unwrap();

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let d = dispatcher.clone();
            tokio::spawn(async move {
                let res = d.handle(request("GET", &format!("/zoo/animals/{i}"))).await;
                body_json(&res)["params"]["id"].as_str().map(str::to_owned)
            })
        })
        .collect();
    for (i, task) in tasks.into_iter().enumerate() {
        assert_eq!(task.await.unwrap(), Some(i.to_string()));
    }
    assert_eq!(state.calls(), 32);
}
