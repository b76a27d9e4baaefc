//! Scripted model backend shared by the unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

use crate::error::ModelError;
use crate::llm::{ModelBackend, ModelRequest};

type Reply = Result<Option<String>, String>;

pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ModelRequest>>,
    calls: AtomicUsize,
    entered: Notify,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            gate: None,
        }
    }

    /// Every call blocks until a permit is added to the returned semaphore
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let mut backend = Self::new();
        backend.gate = Some(gate.clone());
        (backend, gate)
    }

    pub fn push_reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(Some(text.to_string())));
    }

    pub fn push_empty(&self) {
        self.replies.lock().unwrap().push_back(Ok(None));
    }

    pub fn push_error(&self, message: &str) {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Resolves once a call has reached the backend
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: ModelRequest) -> Result<Option<String>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let reply = self.replies.lock().unwrap().pop_front().unwrap_or(Ok(None));
        reply.map_err(|body| ModelError::Http { status: 500, body })
    }
}

pub fn analysis_json(asset: &str, current_price: &str, stop_loss: &str) -> String {
    serde_json::json!({
        "assetName": asset,
        "timeframe": "4h",
        "currentPrice": current_price,
        "positionType": "N/A",
        "trend": "Bullish",
        "sentiment": "Cautiously optimistic",
        "zones": {
            "resistanceZone": "1.2500 - 1.2550",
            "supportZone": "1.2000 - 1.2050"
        },
        "nakedForexPatterns": ["Kangaroo Tail", "Last Kiss"],
        "expectedOutcome": "Reversal at major zone",
        "investmentVerdict": "PROCEED",
        "riskScore": 4,
        "summary": "Price rejected the support zone with a kangaroo tail.",
        "tradingRecommendation": "Enter on a break of the tail high.",
        "stopLoss": stop_loss,
        "takeProfit": "1.2540"
    })
    .to_string()
}

pub fn sample_analysis_json(asset: &str) -> String {
    analysis_json(asset, "$1.2345", "1.2000")
}
