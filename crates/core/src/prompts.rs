//! Prompt Templates
//!
//! Prompts are markdown files with `{placeholder}` slots. Defaults are compiled
//! in; a directory of `.md` files can override any of them by file stem.

use crate::{navigator::NavigatorState, sampler::PrunedTree};
use anyhow::{Context, Result};
use std::{collections::HashMap, fs, path::Path};

/// Template key for the problem-generation prompt.
pub const GENERATE_PROBLEM: &str = "generate_problem";
/// Template key for the feedback prompt.
pub const REQUEST_FEEDBACK: &str = "request_feedback";

/// A named set of prompt templates.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    templates: HashMap<String, String>,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        let templates = HashMap::from([
            (
                GENERATE_PROBLEM.to_string(),
                include_str!("../prompts/generate_problem.md").to_string(),
            ),
            (
                REQUEST_FEEDBACK.to_string(),
                include_str!("../prompts/request_feedback.md").to_string(),
            ),
        ]);
        Self { templates }
    }
}

impl PromptTemplates {
    /// The compiled-in defaults with `overrides` layered on top.
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        let mut prompts = Self::default();
        prompts.templates.extend(overrides);
        prompts
    }

    /// Loads every `.md` file in `dir` as an override keyed by its file stem.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut overrides = HashMap::new();
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read prompts directory {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
                let key = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .context("Could not get file stem")?
                    .to_string();
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read prompt {}", path.display()))?;
                overrides.insert(key, content);
            }
        }
        Ok(Self::with_overrides(overrides))
    }

    pub fn get(&self, key: &str) -> Result<&str> {
        self.templates
            .get(key)
            .map(String::as_str)
            .with_context(|| format!("Missing prompt template: '{}'", key))
    }

    /// Builds the problem-generation prompt around a code-free subject tree.
    pub fn problem_prompt(&self, tree: &PrunedTree) -> Result<String> {
        let problem_set = tree.to_json()?;
        Ok(render(
            self.get(GENERATE_PROBLEM)?,
            &[("problem_set", problem_set.as_str()), ("subject", tree.subject.name())],
        ))
    }

    /// Builds the feedback prompt from the problem, the learner's walk and
    /// their free-text submission.
    pub fn feedback_prompt(
        &self,
        problem: &str,
        trail: &NavigatorState,
        feedback: &str,
    ) -> Result<String> {
        let path = serde_json::to_string(trail.path())?;
        let content_stack = serde_json::to_string(trail.content_stack())?;
        let code_stack = serde_json::to_string(trail.code_stack())?;
        Ok(render(
            self.get(REQUEST_FEEDBACK)?,
            &[
                ("problem", problem),
                ("path", path.as_str()),
                ("feedback", feedback),
                ("content_stack", content_stack.as_str()),
                ("code_stack", code_stack.as_str()),
            ],
        ))
    }
}

/// Substitutes `{name}` slots in a single pass over the template, so values
/// that themselves contain braces are inserted verbatim. Unknown slots are
/// left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let slot = after.find('}').map(|close| (&after[..close], close));
        match slot.and_then(|(name, close)| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        }) {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assembler::assemble, navigator::Navigator, sampler::Sampler};

    #[test]
    fn test_render_substitutes_known_slots_once() {
        let rendered = render(
            "A {x} and {y} but not {z}",
            &[("x", "{y}"), ("y", "why")],
        );
        assert_eq!(rendered, "A {y} and why but not {z}");
    }

    #[test]
    fn test_render_handles_unbalanced_braces() {
        assert_eq!(render("fn() { {x}", &[("x", "1")]), "fn() { 1");
        assert_eq!(render("open {", &[]), "open {");
    }

    #[test]
    fn test_problem_prompt_embeds_code_free_tree() {
        let prompts = PromptTemplates::default();
        let tree = Sampler::seeded(3).sample().unwrap();
        let prompt = prompts.problem_prompt(&tree).unwrap();

        assert!(prompt.contains(&tree.to_json().unwrap()));
        assert!(!prompt.contains("\"code\""));
        assert!(!prompt.contains("{problem_set}"));
        assert!(prompt.contains("####"));
    }

    #[test]
    fn test_feedback_prompt_includes_walk_and_submission() {
        let map = assemble().unwrap();
        let mut navigator = Navigator::new(&map);
        navigator.descend("Arrays").unwrap();
        navigator.descend("Perform Reversal").unwrap();

        let prompts = PromptTemplates::default();
        let prompt = prompts
            .feedback_prompt(
                "#### Reverse an array",
                navigator.state(),
                "I swap from both ends",
            )
            .unwrap();

        assert!(prompt.contains("#### Reverse an array"));
        assert!(prompt.contains(r#"["Arrays","Perform Reversal"]"#));
        assert!(prompt.contains("I swap from both ends"));
        assert!(prompt.contains("return arr[::-1]"));
        for slot in ["{problem}", "{path}", "{feedback}", "{content_stack}", "{code_stack}"] {
            assert!(!prompt.contains(slot), "unfilled slot {slot}");
        }
    }

    #[test]
    fn test_overrides_replace_defaults_by_key() {
        let prompts = PromptTemplates::with_overrides(HashMap::from([(
            GENERATE_PROBLEM.to_string(),
            "Subject: {subject}".to_string(),
        )]));
        let tree = Sampler::seeded(1).sample().unwrap();
        assert_eq!(
            prompts.problem_prompt(&tree).unwrap(),
            format!("Subject: {}", tree.subject)
        );
        assert!(prompts.get(REQUEST_FEEDBACK).is_ok());
        assert!(prompts.get("missing").is_err());
    }
}
