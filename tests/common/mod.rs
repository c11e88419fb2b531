#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use eunify_menu::app::{router, AppState};
use eunify_menu::auth::{generate_jwt, Claims};
use eunify_menu::menu::{default_menu, Initializer, MemoryMenuStore, Role};

pub const SECRET: &str = "integration-test-secret";

/// Router over an in-memory store, plus the store for direct inspection.
pub struct TestApp {
    pub store: Arc<MemoryMenuStore>,
    pub router: Router,
}

impl TestApp {
    pub fn empty() -> Self {
        let store = Arc::new(MemoryMenuStore::new());
        let router = router(AppState::new(store.clone(), SECRET));
        Self { store, router }
    }

    /// An app whose store already holds the shipped defaults.
    pub async fn seeded() -> Result<Self> {
        let app = Self::empty();
        Initializer::new(app.store.clone(), default_menu())
            .run()
            .await
            .context("seeding defaults")?;
        Ok(app)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, token, None).await
    }
}

pub fn token_for(role: Role) -> Result<String> {
    let claims = Claims::new(format!("{}-tester", role), role, 1);
    Ok(generate_jwt(&claims, SECRET)?)
}

/// Menu ids of a `/api/menu` response, section by section.
pub fn section_ids(body: &Value) -> Vec<(String, Vec<String>)> {
    body["data"]
        .as_array()
        .map(|sections| {
            sections
                .iter()
                .map(|section| {
                    let category = section["category"].as_str().unwrap_or_default().to_string();
                    let ids = section["items"]
                        .as_array()
                        .map(|items| {
                            items
                                .iter()
                                .filter_map(|item| item["menuId"].as_str().map(str::to_string))
                                .collect()
                        })
                        .unwrap_or_default();
                    (category, ids)
                })
                .collect()
        })
        .unwrap_or_default()
}
