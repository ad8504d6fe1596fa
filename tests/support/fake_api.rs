// ABOUTME: In-memory product catalog implementing ApiClient.
// ABOUTME: Misbehaviours (slow health, blank ids, mangled reads) are switchable per test.

use async_trait::async_trait;
use bytes::Bytes;
use deployline::verify::{ApiClient, ApiMethod, ApiRequest, ApiResponse, HttpError, ProductRecord};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct State {
    health_failures_left: u32,
    products: HashMap<String, ProductRecord>,
    next_id: u32,
    requests: Vec<(ApiMethod, String)>,
}

#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<State>,
    blank_ids: bool,
    rename_on_read: Option<String>,
    fail_delete: bool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Health answers 503 this many times before 200.
    pub fn unhealthy_for(self, attempts: u32) -> Self {
        self.state.lock().health_failures_left = attempts;
        self
    }

    /// Created products come back with an empty id.
    pub fn with_blank_ids(mut self) -> Self {
        self.blank_ids = true;
        self
    }

    /// Reads return the stored product under a different name.
    pub fn renaming_on_read(mut self, name: &str) -> Self {
        self.rename_on_read = Some(name.to_string());
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn requests(&self) -> Vec<(ApiMethod, String)> {
        self.state.lock().requests.clone()
    }

    pub fn stored(&self) -> usize {
        self.state.lock().products.len()
    }

    fn respond(status: u16, body: impl Into<Bytes>) -> Result<ApiResponse, HttpError> {
        Ok(ApiResponse {
            status,
            body: body.into(),
        })
    }
}

#[async_trait]
impl ApiClient for FakeApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        let mut state = self.state.lock();
        state.requests.push((request.method, request.url.clone()));

        let path = request
            .url
            .splitn(4, '/')
            .nth(3)
            .map(|p| format!("/{p}"))
            .unwrap_or_default();

        match (request.method, path.as_str()) {
            (ApiMethod::Get, "/health") => {
                if state.health_failures_left > 0 {
                    state.health_failures_left -= 1;
                    Self::respond(503, "starting")
                } else {
                    Self::respond(200, r#"{"status":"ok"}"#)
                }
            }
            (ApiMethod::Post, "/products") => {
                let body = request.body.unwrap_or_default();
                let mut record: ProductRecord = serde_json::from_slice(&body).unwrap();
                state.next_id += 1;
                let id = format!("prod-{}", state.next_id);
                record.id = Some(if self.blank_ids {
                    String::new()
                } else {
                    id.clone()
                });
                state.products.insert(id, record.clone());
                Self::respond(201, serde_json::to_vec(&record).unwrap())
            }
            (ApiMethod::Get, p) if p.starts_with("/products/") => {
                let id = &p["/products/".len()..];
                match state.products.get(id) {
                    Some(record) => {
                        let mut record = record.clone();
                        if let Some(name) = &self.rename_on_read {
                            record.name = Some(name.clone());
                        }
                        Self::respond(200, serde_json::to_vec(&record).unwrap())
                    }
                    None => Self::respond(404, r#"{"detail":"not found"}"#),
                }
            }
            (ApiMethod::Delete, p) if p.starts_with("/products/") => {
                if self.fail_delete {
                    return Self::respond(500, "boom");
                }
                let id = p["/products/".len()..].to_string();
                match state.products.remove(&id) {
                    Some(_) => Self::respond(204, Bytes::new()),
                    None => Self::respond(404, Bytes::new()),
                }
            }
            _ => Self::respond(404, Bytes::new()),
        }
    }
}
