use super::{RouteOutcome, Router};
use crate::method::HttpMethod;

fn zoo() -> Router<&'static str> {
    let mut router = Router::new();
    let routes: &[(&[HttpMethod], &str, &'static str)] = &[
        (&[HttpMethod::Get], "/", "root_handler"),
        (&[HttpMethod::Get], "/zoo/animals", "get_animals"),
        (&[HttpMethod::Post], "/zoo/animals", "create_animal"),
        (&[HttpMethod::Get], "/zoo/animals/:id", "get_animal"),
        (
            &[HttpMethod::Put, HttpMethod::Patch],
            "/zoo/animals/:id",
            "update_animal",
        ),
        (&[HttpMethod::Delete], "/zoo/animals/:id", "delete_animal"),
        (&[HttpMethod::Get], "/zoo/animals/:id/toys/:toyId", "animal_toy"),
        (&[HttpMethod::Head, HttpMethod::Options], "/zoo/health", "health"),
    ];
    for (methods, pattern, handler) in routes {
        router.add(methods, pattern, *handler).unwrap();
    }
    router
}

fn handler_for(router: &Router<&'static str>, method: HttpMethod, path: &str) -> Option<&'static str> {
    match router.route(method, path) {
        RouteOutcome::Matched(m) => Some(*m.value),
        _ => None,
    }
}

#[test]
fn test_verb_zoo() {
    let router = zoo();
    let cases = [
        (HttpMethod::Get, "/", Some("root_handler")),
        (HttpMethod::Get, "/zoo/animals", Some("get_animals")),
        (HttpMethod::Post, "/zoo/animals", Some("create_animal")),
        (HttpMethod::Get, "/zoo/animals/123", Some("get_animal")),
        (HttpMethod::Put, "/zoo/animals/123", Some("update_animal")),
        (HttpMethod::Patch, "/zoo/animals/123", Some("update_animal")),
        (HttpMethod::Delete, "/zoo/animals/123", Some("delete_animal")),
        (HttpMethod::Get, "/zoo/animals/1/toys/2", Some("animal_toy")),
        (HttpMethod::Head, "/zoo/health", Some("health")),
        (HttpMethod::Options, "/zoo/health", Some("health")),
        (HttpMethod::Get, "/zoo/health", None),
        (HttpMethod::Get, "/does/not/exist", None),
    ];
    for (method, path, expected) in cases {
        assert_eq!(handler_for(&router, method, path), expected, "{method} {path}");
    }
}

#[test]
fn test_multi_method_registration_shares_value() {
    let router = zoo();
    let (put, patch) = match (
        router.route(HttpMethod::Put, "/zoo/animals/1"),
        router.route(HttpMethod::Patch, "/zoo/animals/1"),
    ) {
        (RouteOutcome::Matched(a), RouteOutcome::Matched(b)) => (a.value, b.value),
        _ => panic!("expected both methods to match"),
    };
    assert!(std::sync::Arc::ptr_eq(&put, &patch));
}

#[test]
fn test_route_params_map() {
    let router = zoo();
    let RouteOutcome::Matched(m) = router.route(HttpMethod::Get, "/zoo/animals/7/toys/ball") else {
        panic!("expected a match");
    };
    let params = m.path_params_map();
    assert_eq!(params.get("id").map(String::as_str), Some("7"));
    assert_eq!(params.get("toyId").map(String::as_str), Some("ball"));
}

#[test]
fn test_known_path_unknown_method() {
    let router = zoo();
    match router.route(HttpMethod::Get, "/zoo/health") {
        RouteOutcome::MethodNotAllowed { allowed } => {
            assert_eq!(allowed, vec![HttpMethod::Head, HttpMethod::Options]);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        router.route(HttpMethod::Post, "/zoo/animals/1/toys/2"),
        RouteOutcome::MethodNotAllowed { .. }
    ));
}

#[test]
fn test_routes_listing_in_registration_order() {
    let router = zoo();
    let routes = router.routes();
    assert_eq!(routes.len(), 10);
    assert_eq!(routes[0], (HttpMethod::Get, "/".to_string()));
    assert_eq!(routes[4], (HttpMethod::Put, "/zoo/animals/:id".to_string()));
    assert_eq!(routes[5], (HttpMethod::Patch, "/zoo/animals/:id".to_string()));
    assert_eq!(routes[9], (HttpMethod::Options, "/zoo/health".to_string()));
}
