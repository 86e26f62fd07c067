//! Test utilities for spendwise-core
//!
//! This module provides a mock expense backend serving the read endpoints
//! (`/get_expenses`, `/get_expenses/{user_id}`) plus a shared sample data set.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::sync::oneshot;

use crate::models::{Amount, ExpenseRecord};

/// Mock expense backend for testing and development
pub struct MockExpenseServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Clone)]
struct MockState {
    records: Arc<Vec<ExpenseRecord>>,
    fail_with: Option<StatusCode>,
}

impl MockExpenseServer {
    /// Start the mock server on an available port, serving `records`
    pub async fn start(records: Vec<ExpenseRecord>) -> Self {
        Self::start_with_state(MockState {
            records: Arc::new(records),
            fail_with: None,
        })
        .await
    }

    /// Start a mock server whose endpoints all answer with `status`
    pub async fn start_failing(status: u16) -> Self {
        Self::start_with_state(MockState {
            records: Arc::new(Vec::new()),
            fail_with: Some(StatusCode::from_u16(status).unwrap()),
        })
        .await
    }

    async fn start_with_state(state: MockState) -> Self {
        let app = Router::new()
            .route("/get_expenses", get(handle_list))
            .route("/get_expenses/:user_id", get(handle_list_user))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockExpenseServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_list(State(state): State<MockState>) -> Response {
    if let Some(status) = state.fail_with {
        return (status, "backend unavailable").into_response();
    }
    Json(state.records.as_ref().clone()).into_response()
}

async fn handle_list_user(
    State(state): State<MockState>,
    Path(user_id): Path<String>,
) -> Response {
    if let Some(status) = state.fail_with {
        return (status, "backend unavailable").into_response();
    }
    let records: Vec<ExpenseRecord> = state
        .records
        .iter()
        .filter(|r| r.user_id == user_id)
        .cloned()
        .collect();
    Json(records).into_response()
}

/// A small mixed data set: two users, several categories, months and weeks,
/// one text amount from the entry form
pub fn sample_records() -> Vec<ExpenseRecord> {
    let record = |id: &str, user: &str, amount: Amount, category: &str, date: &str| ExpenseRecord {
        id: Some(id.to_string()),
        user_id: user.to_string(),
        amount: Some(amount),
        category: category.to_string(),
        description: None,
        date: date.to_string(),
    };

    vec![
        record("e1", "alice", Amount::Number(1200.0), "Rent", "2024-01-01"),
        record("e2", "alice", Amount::Number(85.5), "Food", "2024-01-03"),
        record("e3", "bob", Amount::Number(40.0), "Transport", "2024-01-08"),
        record("e4", "bob", Amount::from("64.50"), "Food", "2024-01-20"),
        record("e5", "alice", Amount::Number(150.0), "Utilities", "2024-02-02"),
        record("e6", "bob", Amount::Number(300.0), "Travel", "2024-02-14"),
    ]
}
