//! Prompt-driven narrator.

use tracing::{debug, warn};
use triage_core::{
    IntakeNarrative, NarrativeError, NarrativeResult, Narrator, Patient, PatientInput,
    TriageAssessment,
};

use crate::config::NarrativeConfig;
use crate::generator::{GenerationOptions, TextGenerator};
use crate::prompts::{
    make_intake_prompt, make_score_prompt, make_vitals_prompt, INTAKE_RESPONSE_SCHEMA,
    SYSTEM_PROMPT,
};
use crate::response::{parse_free_text, parse_intake_summary};

/// [`Narrator`] that builds prompts and hands them to a [`TextGenerator`].
pub struct PromptNarrator<G> {
    config: NarrativeConfig,
    generator: G,
}

impl<G: TextGenerator> PromptNarrator<G> {
    pub fn new(config: NarrativeConfig, generator: G) -> Self {
        Self { config, generator }
    }

    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    fn options(&self) -> GenerationOptions {
        GenerationOptions::new(self.config.model.clone())
            .with_system(SYSTEM_PROMPT)
            .with_timeout(self.config.timeout)
    }

    fn run(&self, kind: &str, prompt: &str, options: &GenerationOptions) -> NarrativeResult<String> {
        if !self.config.is_configured() {
            return Err(NarrativeError::Unavailable("API key not configured".into()));
        }

        debug!(kind, model = %options.model, prompt_len = prompt.len(), "requesting narrative");
        self.generator.generate(prompt, options).map_err(|e| {
            warn!(kind, error = %e, "narrative generation failed");
            NarrativeError::from(e)
        })
    }
}

impl<G: TextGenerator> Narrator for PromptNarrator<G> {
    fn intake_summary(
        &self,
        input: &PatientInput,
        assessment: &TriageAssessment,
    ) -> NarrativeResult<IntakeNarrative> {
        let prompt = make_intake_prompt(input, assessment);
        let options = self.options().with_schema(INTAKE_RESPONSE_SCHEMA);
        let text = self.run("intake_summary", &prompt, &options)?;
        parse_intake_summary(&text)
    }

    fn vitals_narrative(&self, patient: &Patient) -> NarrativeResult<String> {
        let text = self.run("vitals", &make_vitals_prompt(patient), &self.options())?;
        parse_free_text(&text)
    }

    fn score_narrative(&self, patient: &Patient) -> NarrativeResult<String> {
        let text = self.run("score", &make_score_prompt(patient), &self.options())?;
        parse_free_text(&text)
    }
}
