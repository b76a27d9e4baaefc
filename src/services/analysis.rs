use std::sync::Arc;
use tracing::{error, info, warn};

use crate::agents::{Agent, NakedForexAnalyst};
use crate::analysis::{parse_analysis, schema::analysis_schema, AnalysisResult, Timeframe};
use crate::capture::ImagePayload;
use crate::error::SessionError;
use crate::llm::{ModelBackend, ModelRequest};

/// What a single analysis request is grounded on
#[derive(Clone, Debug)]
pub enum AnalysisInput {
    Image(ImagePayload),
    Pair { pair: String, timeframe: Timeframe },
}

impl AnalysisInput {
    pub fn describe(&self) -> String {
        match self {
            AnalysisInput::Image(image) => format!("image ({}, {} bytes)", image.mime_type(), image.len()),
            AnalysisInput::Pair { pair, timeframe } => format!("pair {} @ {}", pair, timeframe),
        }
    }
}

/// Stateless request service: shapes the two analysis variants and validates
/// the reply against the schema. Single-flight is the session's job.
#[derive(Clone)]
pub struct AnalysisService {
    backend: Arc<dyn ModelBackend>,
    analyst: Arc<NakedForexAnalyst>,
}

impl AnalysisService {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            analyst: Arc::new(NakedForexAnalyst),
        }
    }

    pub async fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisResult, SessionError> {
        match input {
            AnalysisInput::Image(image) => self.analyze_from_image(image).await,
            AnalysisInput::Pair { pair, timeframe } => self.analyze_from_pair(pair, *timeframe).await,
        }
    }

    pub async fn analyze_from_image(&self, image: &ImagePayload) -> Result<AnalysisResult, SessionError> {
        if image.is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let request = ModelRequest::new(self.analyst.system_prompt(), self.analyst.image_prompt())
            .with_image(image.clone())
            .with_json_schema(analysis_schema());

        self.run(request, "image").await
    }

    pub async fn analyze_from_pair(&self, pair: &str, timeframe: Timeframe) -> Result<AnalysisResult, SessionError> {
        if pair.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let request = ModelRequest::new(
            self.analyst.search_system_prompt(),
            self.analyst.pair_prompt(pair, timeframe),
        )
        .with_json_schema(analysis_schema())
        .with_search_grounding();

        self.run(request, "pair").await
    }

    async fn run(&self, request: ModelRequest, variant: &str) -> Result<AnalysisResult, SessionError> {
        info!(
            "📊 [ANALYSIS] Sending {} analysis to {} via {}...",
            variant,
            self.analyst.name(),
            self.backend.name()
        );

        let reply = self.backend.generate(request).await.map_err(|e| {
            error!("❌ [ANALYSIS] Model request failed: {}", e);
            SessionError::ModelRequest(e.to_string())
        })?;

        let result = parse_analysis(reply.as_deref());
        match &result {
            Ok(analysis) => info!(
                "📊 [ANALYSIS] {} ({}) -> {} (risk {})",
                analysis.asset_name, analysis.timeframe, analysis.investment_verdict, analysis.risk_score
            ),
            Err(e) => warn!("⚠️ [ANALYSIS] Rejected model reply: {}", e),
        }
        result
    }
}
