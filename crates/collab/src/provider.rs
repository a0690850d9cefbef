// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SuggestContext;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider call failed: {0}")]
    Failed(String),
    #[error("provider call timed out")]
    Timeout,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextToCommandResult {
    pub command: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NextStepResult {
    pub commands: Vec<String>,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnoseResult {
    pub explanation: String,
}

/// An AI provider capable of text-to-command, next-step prediction, and
/// failure diagnosis. Handlers must tolerate no provider being registered:
/// see spec.md §4.7 ("on no provider, return an empty/explanatory
/// response, never an RPC error").
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    fn name(&self) -> &str;
    async fn available(&self) -> bool;

    async fn text_to_command(
        &self,
        prompt: &str,
        context: &SuggestContext,
    ) -> Result<TextToCommandResult, ProviderError>;

    async fn next_step(&self, context: &SuggestContext) -> Result<NextStepResult, ProviderError>;

    async fn diagnose(
        &self,
        command: &str,
        output: &str,
        context: &SuggestContext,
    ) -> Result<DiagnoseResult, ProviderError>;
}
