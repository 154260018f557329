use async_trait::async_trait;
use log::{error, info};

use crate::error::{Result, SalaryAnalystError};
use crate::llm::client::OpenAiClient;
use crate::llm::config::AgentConfig;
use crate::llm::types::{ChatCompletionRequest, ChatMessage, ToolChoice, ToolDefinition};
use crate::prompts::{
    analysis_system_prompt, analysis_user_message, parser_user_message, PARSER_SYSTEM_PROMPT,
};
use crate::schema::{PayslipComponents, PAYSLIP_TOOL_DESCRIPTION, PAYSLIP_TOOL_NAME};
use crate::session::PayslipAnalyzer;

/// Runs the extraction and analysis calls against the chat completions API.
pub struct SalaryAgent {
    client: OpenAiClient,
    config: AgentConfig,
}

impl SalaryAgent {
    pub fn new(config: AgentConfig) -> Result<Self> {
        let client = OpenAiClient::new(&config)?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(AgentConfig::from_env()?)
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn extraction_request(&self, payslip_text: &str) -> Result<ChatCompletionRequest> {
        Ok(ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(PARSER_SYSTEM_PROMPT),
                ChatMessage::user(parser_user_message(payslip_text)),
            ],
            tools: Some(vec![ToolDefinition::function(
                PAYSLIP_TOOL_NAME,
                PAYSLIP_TOOL_DESCRIPTION,
                PayslipComponents::tool_parameters()?,
            )]),
            tool_choice: Some(ToolChoice::function(PAYSLIP_TOOL_NAME)),
            temperature: None,
        })
    }

    async fn extract(&self, payslip_text: &str) -> Result<PayslipComponents> {
        let request = self.extraction_request(payslip_text)?;
        let response = self.client.chat_completion(&request).await?;

        let tool_call = response
            .first_message()
            .and_then(|message| message.tool_calls.as_ref())
            .and_then(|calls| calls.first())
            .ok_or_else(|| {
                SalaryAnalystError::ExtractionFailed("Model returned no tool call".to_string())
            })?;

        if tool_call.function.name != PAYSLIP_TOOL_NAME {
            return Err(SalaryAnalystError::ExtractionFailed(format!(
                "Model called '{}' instead of '{}'",
                tool_call.function.name, PAYSLIP_TOOL_NAME
            )));
        }

        PayslipComponents::from_tool_arguments(&tool_call.function.arguments)
    }

    /// Call 1: extracts monthly salary components using a forced tool call.
    pub async fn parse_payslip_text(&self, payslip_text: &str) -> Result<PayslipComponents> {
        match self.extract(payslip_text).await {
            Ok(components) => {
                info!(
                    "Extracted {} payslip component(s)",
                    components.present_components().len()
                );
                Ok(components)
            }
            Err(e) => {
                match &e {
                    SalaryAnalystError::SerializationError(_)
                    | SalaryAnalystError::InvalidComponent { .. } => {
                        error!("Payslip validation failed: {}", e)
                    }
                    _ => error!("Extraction call failed: {}", e),
                }
                Err(e)
            }
        }
    }

    /// Call 2: generates the markdown report from confirmed data and the rules.
    pub async fn generate_analysis_report(
        &self,
        confirmed: &PayslipComponents,
        country: &str,
        tax_year: &str,
        tax_rules: &str,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(analysis_system_prompt(country, tax_year, tax_rules)),
                ChatMessage::user(analysis_user_message(confirmed)?),
            ],
            tools: None,
            tool_choice: None,
            temperature: Some(self.config.analysis_temperature),
        };

        let response = self.client.chat_completion(&request).await.map_err(|e| {
            error!("Analysis call failed: {}", e);
            e
        })?;

        let report = response
            .first_message()
            .and_then(|message| message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                SalaryAnalystError::AnalysisFailed("Model returned an empty report".to_string())
            })?;

        info!("Received analysis report ({} chars)", report.len());
        Ok(report.to_string())
    }
}

#[async_trait]
impl PayslipAnalyzer for SalaryAgent {
    async fn parse_payslip_text(&self, payslip_text: &str) -> Result<PayslipComponents> {
        SalaryAgent::parse_payslip_text(self, payslip_text).await
    }

    async fn generate_analysis_report(
        &self,
        confirmed: &PayslipComponents,
        country: &str,
        tax_year: &str,
        tax_rules: &str,
    ) -> Result<String> {
        SalaryAgent::generate_analysis_report(self, confirmed, country, tax_year, tax_rules).await
    }
}
