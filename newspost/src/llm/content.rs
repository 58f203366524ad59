//! Platform-tailored copy generation on top of an [`LlmProvider`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use common::{NewsArticle, Platform};

use super::{LlmProvider, LlmRequest};
use crate::error::{ConfigurationError, GenerationError};
use crate::platforms::{instruction_for, PlatformCatalog};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: usize = 500;

const PERSONA: &str = "You are a professional social media content creator.";

pub struct ContentGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl ContentGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Like [`ContentGenerator::new`], but refuses a catalog that lists a
    /// platform with no instruction template.
    pub fn for_catalog(
        llm: Arc<dyn LlmProvider>,
        catalog: &PlatformCatalog,
    ) -> Result<Self, ConfigurationError> {
        if let Some(missing) = catalog.all().iter().find(|p| instruction_for(&p.id).is_none()) {
            return Err(ConfigurationError::MissingTemplate(missing.id.clone()));
        }
        Ok(Self::new(llm))
    }

    /// Draft copy for `platform` about `keywords`, using `articles` as context.
    pub async fn generate(
        &self,
        keywords: &str,
        platform: &Platform,
        articles: &[NewsArticle],
    ) -> Result<String, GenerationError> {
        let instruction = instruction_for(&platform.id).ok_or_else(|| {
            GenerationError::new(anyhow::anyhow!(
                "no instruction template for platform '{}'",
                platform.id
            ))
        })?;

        let request = LlmRequest {
            system: Some(system_instruction(platform, instruction)),
            prompt: user_prompt(keywords, articles),
            max_tokens: Some(MAX_TOKENS),
            temperature: Some(TEMPERATURE),
            timeout_seconds: None,
        };

        let t0 = Instant::now();
        let response = self.llm.generate(request).await.map_err(|e| {
            warn!(platform = %platform.id, error = %format!("{:#}", e), "completion request failed");
            GenerationError::new(e)
        })?;

        debug!(
            platform = %platform.id,
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "content generated"
        );
        Ok(response.content)
    }
}

/// System message: persona, platform instruction, and the length reminder
/// when the platform declares a budget.
pub fn system_instruction(platform: &Platform, instruction: &str) -> String {
    let mut system = format!("{} {}", PERSONA, instruction);
    if let Some(max_length) = platform.max_length {
        system.push_str(&format!(" Keep the content within {} characters.", max_length));
    }
    system
}

/// User message: optional news context block followed by the topic line.
pub fn user_prompt(keywords: &str, articles: &[NewsArticle]) -> String {
    let mut prompt = String::new();
    if !articles.is_empty() {
        prompt.push_str("Based on these news articles:\n");
        let rendered: Vec<String> = articles
            .iter()
            .map(|a| format!("Title: {}\nDescription: {}\n", a.title, a.description))
            .collect();
        prompt.push_str(&rendered.join("\n"));
    }
    prompt.push_str(&format!("Create content about: {}", keywords));
    prompt
}
