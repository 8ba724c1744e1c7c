use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nanoroute::{App, Headers, HttpError, Method, Request, Response, with_params};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn call(app: &App, method: &str, target: &str) -> Response {
    app.handle(method, target, Headers::new(), "")
}

fn body(res: &Response) -> &str {
    std::str::from_utf8(res.body()).expect("utf-8 body")
}

/// One handler per argument shape, each echoing what it was given.
fn echo_app() -> App {
    App::new()
        .get("/no_param", || "no_param")
        .get("/only_req", |req: &Request| format!("only_req {}", req.path()))
        .get("/req_1_path_param/{param1}", |_: &Request, param1: String| format!("req_1_path_param {param1}"))
        .route(&[Method::Get], "/req_1_path_param_flask/<param1>", |_: &Request, param1: String| {
            format!("req_1_path_param_flask {param1}")
        })
        .get("/req_2_path_param/{param1}/{param2}", |param1: String, param2: String| {
            format!("req_2_path_param {param1} {param2}")
        })
        .get("/req_ignore_path_param/{param1}", |req: &Request| {
            format!("req_ignore_path_param {:?}", req.param("param1"))
        })
        .get("/req_qs", with_params(["client", "q"], |_: &Request, client: String, q: String| {
            format!("req_qs {client} {q}")
        }))
        .get("/req_ignored_qs", |req: &Request| format!("req_ignored_qs {:?}", req.query("client")))
        .get(
            "/req_path_param_and_qs/{param1}",
            with_params(["param1", "client", "q"], |param1: String, client: String, q: String| {
                format!("req_path_param_and_qs {param1} {client} {q}")
            }),
        )
        .get("/req_conflicting_path_param_and_qs/{param1}", |param1: String| {
            format!("req_conflicting_path_param_and_qs {param1}")
        })
}

#[test]
fn arguments_are_bound_by_shape() {
    let app = echo_app();
    let cases = [
        ("/no_param", "no_param"),
        ("/only_req", "only_req /only_req"),
        ("/req_1_path_param/value1", "req_1_path_param value1"),
        ("/req_1_path_param_flask/value1", "req_1_path_param_flask value1"),
        ("/req_2_path_param/value1/value2", "req_2_path_param value1 value2"),
        ("/req_ignore_path_param/value1", r#"req_ignore_path_param Some("value1")"#),
        ("/req_qs?client=firefox&q=test", "req_qs firefox test"),
        ("/req_ignored_qs?client=firefox&q=test", r#"req_ignored_qs Some("firefox")"#),
        ("/req_path_param_and_qs/value1?client=firefox&q=test", "req_path_param_and_qs value1 firefox test"),
        (
            "/req_conflicting_path_param_and_qs/path-value?param1=qs-value",
            "req_conflicting_path_param_and_qs path-value",
        ),
    ];

    for (target, expected) in cases {
        let res = call(&app, "GET", target);
        assert_eq!(res.status(), 200, "{target}");
        assert_eq!(body(&res), expected, "{target}");
    }
}

#[test]
fn lookup_sets_path_parameters() {
    let app = echo_app();
    let mut req = Request::with_target(Method::Get, "/req_2_path_param/value1/value2");
    app.lookup(&mut req).unwrap();
    assert_eq!(req.param("param1"), Some("value1"));
    assert_eq!(req.param("param2"), Some("value2"));
}

#[test]
fn every_method_can_be_routed() {
    let app = App::new()
        .route(&Method::ALL, "/flask_style", |req: &Request| format!("flask_style {}", req.method()))
        .get("/fastapi_style", |req: &Request| format!("fastapi_style {}", req.method()))
        .head("/fastapi_style", |req: &Request| format!("fastapi_style {}", req.method()))
        .post("/fastapi_style", |req: &Request| format!("fastapi_style {}", req.method()))
        .put("/fastapi_style", |req: &Request| format!("fastapi_style {}", req.method()))
        .delete("/fastapi_style", |req: &Request| format!("fastapi_style {}", req.method()))
        .connect("/fastapi_style", |req: &Request| format!("fastapi_style {}", req.method()))
        .options("/fastapi_style", |req: &Request| format!("fastapi_style {}", req.method()))
        .trace("/fastapi_style", |req: &Request| format!("fastapi_style {}", req.method()));

    for style in ["flask_style", "fastapi_style"] {
        for method in Method::ALL {
            let res = call(&app, method.as_str(), &format!("/{style}"));
            assert_eq!(body(&res), format!("{style} {method}"));
        }
    }
}

#[test]
fn method_not_allowed_lists_methods() {
    let app = App::new().get("/", || "").post("/", || "");
    let res = call(&app, "DELETE", "/");
    assert_eq!(res.status(), 405);
    assert_eq!(res.header("Allow"), Some("GET, POST"));

    assert_eq!(call(&app, "GET", "/missing").status(), 404);
}

#[test]
fn json_round_trips_through_handle() {
    let app = App::new().post("/echo", |req: &Request| -> Result<Value, HttpError> {
        let value: Value = serde_json::from_slice(req.body()).map_err(|e| HttpError::bad_request(e.to_string()))?;
        Ok(json!({ "received": value }))
    });

    let res = app.handle("POST", "/echo", Headers::new(), r#"{"a":[1,2,3]}"#);
    assert_eq!(res.status(), 200);
    assert_eq!(res.header("Content-Type"), Some("application/json; charset=UTF-8"));
    let decoded: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(decoded, json!({ "received": { "a": [1, 2, 3] } }));

    assert_eq!(app.handle("POST", "/echo", Headers::new(), "not json").status(), 400);
}

#[test]
fn panicking_handler_does_not_take_the_app_down() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let app = App::new()
        .get("/panic", || -> &'static str { panic!("boom") })
        .get("/ok", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "fine"
        });

    let res = call(&app, "GET", "/panic");
    assert_eq!(res.status(), 500);
    assert!(res.body().is_empty());

    let res = call(&app, "GET", "/ok");
    assert_eq!(res.status(), 200);
    assert_eq!(body(&res), "fine");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn tuple_replies_set_status_and_headers() {
    let app = App::new()
        .post("/users", || (json!({ "id": 42 }), 201, [("Location", "/users/42")]))
        .delete("/users/{id}", |_id: u32| http::StatusCode::NO_CONTENT);

    let res = call(&app, "POST", "/users");
    assert_eq!(res.status(), 201);
    assert_eq!(res.header("location"), Some("/users/42"));

    let res = call(&app, "DELETE", "/users/42");
    assert_eq!(res.status(), 204);
    assert_eq!(res.header("Content-Length"), None);
    assert_eq!(res.header("Content-Type"), None);
}

#[test]
fn fragment_is_not_a_parameter() {
    let app = App::new().get("/doc", with_params(["section"], |section: Option<String>| {
        section.unwrap_or_else(|| "none".to_owned())
    }));

    assert_eq!(body(&call(&app, "GET", "/doc#section=intro")), "none");
    assert_eq!(body(&call(&app, "GET", "/doc?section=intro#top")), "intro");
}
