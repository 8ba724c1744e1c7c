//! Minimal nanoroute example: CRUD-style JSON endpoints.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl 'http://localhost:3000/search?q=alice&limit=5'
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/users/42

use nanoroute::{App, HttpError, Request, Server, with_params};
use serde_json::{Value, json};

#[tokio::main]
async fn main() -> Result<(), nanoroute::Error> {
    tracing_subscriber::fmt::init();

    let app = App::new()
        .get("/users/{id}", get_user)
        .post("/users", create_user)
        .delete("/users/<id>", delete_user)
        .get("/search", with_params(["q", "limit"], search));

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

// GET /users/{id}
fn get_user(id: u64) -> Result<Value, HttpError> {
    if id == 0 {
        return Err(HttpError::not_found());
    }
    Ok(json!({ "id": id, "name": "alice" }))
}

// POST /users → 201 with a Location header
fn create_user(req: &Request) -> Result<(Value, u16, [(&'static str, &'static str); 1]), HttpError> {
    let input: Value = serde_json::from_slice(req.body())
        .map_err(|e| HttpError::bad_request(format!("invalid JSON: {e}")))?;
    Ok((json!({ "id": 99, "name": input["name"] }), 201, [("Location", "/users/99")]))
}

// DELETE /users/{id} → 204 No Content
fn delete_user(_id: u64) -> http::StatusCode {
    http::StatusCode::NO_CONTENT
}

// GET /search?q=..&limit=..
fn search(q: String, limit: Option<usize>) -> Value {
    json!({ "q": q, "limit": limit.unwrap_or(10), "results": [] })
}
