#![allow(dead_code)]

pub mod http_helpers {
    use bytes::Bytes;
    use http::header::CONTENT_TYPE;
    use routewise::response::{Request, Response};
    use serde_json::Value;

    /// Build a request with an empty body.
    pub fn request(method: &str, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap()
    }

    /// Build a request with the given headers and raw body.
    pub fn request_with(
        method: &str,
        uri: &str,
        headers: &[(&str, &str)],
        body: impl Into<Bytes>,
    ) -> Request {
        let mut builder = http::Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(body.into()).unwrap()
    }

    pub fn json_request(method: &str, uri: &str, body: &Value) -> Request {
        request_with(
            method,
            uri,
            &[(CONTENT_TYPE.as_str(), "application/json")],
            serde_json::to_vec(body).unwrap(),
        )
    }

    /// Parse a response body as JSON.
    pub fn body_json(res: &Response) -> Value {
        serde_json::from_slice(res.body()).unwrap()
    }
}

pub mod endpoints {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use http::StatusCode;
    use routewise::context::RequestContext;
    use routewise::endpoint::{create_endpoint, Endpoint, EndpointConfig, IntoMethods};
    use routewise::error::RouterError;
    use routewise::response::{self, Response};
    use serde_json::json;

    /// Application context used across integration tests.
    #[derive(Clone, Default)]
    pub struct AppState {
        pub handler_calls: Arc<AtomicUsize>,
        pub user: Option<String>,
    }

    impl AppState {
        pub fn calls(&self) -> usize {
            self.handler_calls.load(Ordering::SeqCst)
        }
    }

    /// Echo everything the handler received as JSON and count the call.
    pub async fn echo(ctx: RequestContext<AppState>) -> Result<Response, RouterError> {
        ctx.context.handler_calls.fetch_add(1, Ordering::SeqCst);
        Ok(response::json(
            StatusCode::OK,
            &json!({
                "route": ctx.route.as_ref(),
                "method": ctx.method.as_str(),
                "params": ctx.params.to_value(),
                "query": ctx.search_params.to_value(),
                "body": ctx.body.to_value(),
                "user": ctx.context.user,
                "headerStamp": ctx.header("x-stamp"),
            }),
        ))
    }

    pub fn echo_endpoint(
        methods: impl IntoMethods,
        pattern: &str,
        config: EndpointConfig<AppState>,
    ) -> Endpoint<AppState> {
        create_endpoint(methods, pattern, echo, config).unwrap()
    }
}
