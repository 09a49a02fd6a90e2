//! Practice Coach
//!
//! Ties the sampler, the prompt templates and a [`ContentService`] together:
//! it turns a sampled subject into an interview problem and turns a learner's
//! walk through the decision map into feedback.

use crate::{
    content::ContentService,
    library::Subject,
    navigator::NavigatorState,
    prompts::PromptTemplates,
    sampler::PrunedTree,
};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// A generated practice problem and the subject it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedProblem {
    pub subject: Subject,
    pub markdown: String,
}

/// Generates problems and feedback through a content service.
#[derive(Clone)]
pub struct Coach {
    service: Arc<dyn ContentService>,
    prompts: Arc<PromptTemplates>,
}

impl Coach {
    pub fn new(service: Arc<dyn ContentService>, prompts: Arc<PromptTemplates>) -> Self {
        Self { service, prompts }
    }

    /// Asks the content service for a problem built around `tree`.
    pub async fn generate_problem(&self, tree: &PrunedTree) -> Result<GeneratedProblem> {
        let prompt = self.prompts.problem_prompt(tree)?;
        let markdown = self.service.complete(prompt).await?;
        info!(subject = %tree.subject, len = markdown.len(), "Problem generated");
        Ok(GeneratedProblem {
            subject: tree.subject,
            markdown,
        })
    }

    /// Asks the content service to review the learner's approach.
    ///
    /// Blank feedback text is rejected before any request is made.
    pub async fn request_feedback(
        &self,
        problem: &GeneratedProblem,
        trail: &NavigatorState,
        feedback: &str,
    ) -> Result<String> {
        if feedback.trim().is_empty() {
            bail!("Feedback text is empty");
        }
        let prompt = self
            .prompts
            .feedback_prompt(&problem.markdown, trail, feedback)?;
        let reply = self.service.complete(prompt).await?;
        info!(
            subject = %problem.subject,
            depth = trail.depth(),
            "Feedback generated"
        );
        Ok(reply)
    }
}
