//! LLM-backed capability implementations
//!
//! Each agent renders its prompt template, makes one stateless completion
//! call and decodes the reply leniently. Agents never retry on their own:
//! transport retries live in the LLM client, everything else is the
//! pipeline's fallback business.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

mod assembler;
mod curator;
mod parser;
pub mod prompts;
mod researcher;

pub use assembler::LlmItineraryAssembler;
pub use curator::LlmItineraryCurator;
pub use parser::LlmQueryParser;
pub use prompts::PromptLoader;
pub use researcher::{LlmDestinationResearcher, LlmLogisticsSearcher};

use crate::capability::CapabilityError;
use crate::config::Config;
use crate::llm::{CompletionRequest, LlmClient, StopReason};
use crate::pipeline::Capabilities;
use crate::pipeline::sanitize::unwrap_code_fence;

/// What every agent needs to make a call
#[derive(Clone)]
pub struct AgentContext {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
}

impl AgentContext {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, max_tokens: u32) -> Self {
        debug!(%max_tokens, "AgentContext::new: called");
        Self {
            llm,
            prompts,
            max_tokens,
        }
    }

    /// Render `template`, send it with `user` as the only message, return the text
    async fn ask(&self, template: &str, context: serde_json::Value, user: String) -> Result<String, CapabilityError> {
        debug!(%template, "AgentContext::ask: called");
        let system_prompt = self.prompts.render(template, &context)?;
        let request = CompletionRequest::single(system_prompt, user, self.max_tokens).with_json_mode();

        let response = self.llm.complete(request).await?;
        if response.stop_reason == StopReason::MaxTokens {
            warn!(%template, "AgentContext::ask: response truncated at max tokens");
        }

        match response.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                debug!(%template, "AgentContext::ask: empty response");
                Err(CapabilityError::Malformed(format!("{}: empty response", template)))
            }
        }
    }

    /// Like `ask`, decoding the (possibly fenced) reply as JSON
    async fn ask_json<T: DeserializeOwned>(
        &self,
        template: &str,
        context: serde_json::Value,
        user: String,
    ) -> Result<T, CapabilityError> {
        let text = self.ask(template, context, user).await?;
        let decoded = serde_json::from_str(unwrap_code_fence(&text)).map_err(|e| {
            debug!(%template, error = %e, "AgentContext::ask_json: decode failed");
            CapabilityError::Malformed(format!("{}: {}", template, e))
        })?;
        Ok(decoded)
    }
}

/// Build the five capabilities on top of one LLM client
pub fn llm_capabilities(llm: Arc<dyn LlmClient>, config: &Config) -> Capabilities {
    debug!(model = %config.llm.model, "llm_capabilities: called");
    let ctx = AgentContext::new(llm, Arc::new(PromptLoader::default()), config.llm.max_tokens);

    Capabilities {
        parser: Arc::new(LlmQueryParser::new(ctx.clone())),
        researcher: Arc::new(LlmDestinationResearcher::new(ctx.clone())),
        logistics: Arc::new(LlmLogisticsSearcher::new(ctx.clone(), config.booking.clone())),
        curator: Arc::new(LlmItineraryCurator::new(ctx.clone())),
        assembler: Arc::new(LlmItineraryAssembler::new(ctx)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;

    /// Context over a mock client answering every call with `text`
    pub fn context_with(text: &str) -> (AgentContext, Arc<MockLlmClient>) {
        let mock = Arc::new(MockLlmClient::with_text(text));
        let ctx = AgentContext::new(mock.clone(), Arc::new(PromptLoader::embedded_only()), 2000);
        (ctx, mock)
    }
}
