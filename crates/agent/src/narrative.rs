use std::sync::Arc;

use serde::{Deserialize, Serialize};

use stickfit_core::engine::FallbackDiagnostics;
use stickfit_core::{Profile, RankedProduct, SelectionSlate};

use crate::capsules::{BOW_KNOWLEDGE, BRAND_BRIEF};
use crate::llm::LlmClient;

const SYSTEM_ROLE: &str = "You are a hockey equipment expert.";
const WORD_CAP: usize = 500;

/// Everything the copywriter needs about one finished recommendation.
#[derive(Clone, Copy, Debug)]
pub struct RationaleRequest<'a> {
    pub profile: &'a Profile,
    pub slate: &'a SelectionSlate,
    pub fallback: &'a FallbackDiagnostics,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RationaleSource {
    Llm,
    Deterministic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rationale {
    pub summary: String,
    pub summary_html: String,
    pub source: RationaleSource,
}

/// Builds the prompt, calls the model, and post-processes the copy. Never
/// errors: with no client, or a failing one, the deterministic template
/// answers instead.
pub struct NarrativeGenerator {
    client: Option<Arc<dyn LlmClient>>,
}

impl NarrativeGenerator {
    pub fn new(client: Option<Arc<dyn LlmClient>>) -> Self {
        Self { client }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub async fn generate(&self, request: RationaleRequest<'_>) -> Rationale {
        if let Some(client) = &self.client {
            let prompt = build_prompt(request);
            tracing::debug!(
                event_name = "narrative.prompt_assembled",
                prompt_sha256 = %prompt_digest(&prompt),
                "narrative prompt assembled for audit"
            );
            match client.complete(SYSTEM_ROLE, &prompt).await {
                Ok(text) => return finish(&text, RationaleSource::Llm),
                Err(error) => {
                    tracing::warn!(
                        event_name = "narrative.llm_degraded",
                        error = %error,
                        "llm narrative failed; using deterministic rationale"
                    );
                }
            }
        }

        finish(&deterministic_summary(request), RationaleSource::Deterministic)
    }
}

/// Assemble the full prompt: brief, player context, product facts for the
/// slate, and the bow-knowledge stanza.
pub fn build_prompt(request: RationaleRequest<'_>) -> String {
    format!(
        "{BRAND_BRIEF}\n\nPLAYER PROFILE:\n{}\n\nSTICKS:\n{}\n\nBOW DEFINITIONS:\n{BOW_KNOWLEDGE}",
        player_context(request.profile, request.fallback),
        product_facts(request.slate),
    )
}

fn player_context(profile: &Profile, fallback: &FallbackDiagnostics) -> String {
    let mut context = format!(
        "journey={}, attack={}, midfield={}, defence={}, aerials={}, dragflick={}, \
         budget=£{} ({}, priority={:?}, bow={})",
        profile.journey,
        profile.attack,
        profile.midfield,
        profile.defence,
        profile.aerials,
        profile.dragflick,
        profile.budget,
        profile.player_type,
        profile.priority,
        profile.preferred_bow.as_deref().unwrap_or("none"),
    );
    if !fallback.is_empty() {
        context.push_str(&format!(
            "\nnote: the search was widened to find these ({})",
            fallback.relaxed.join(", ")
        ));
    }
    context
}

fn product_facts(slate: &SelectionSlate) -> String {
    let mut facts: Vec<String> = slate
        .primaries()
        .iter()
        .map(|pick| fact_line(pick))
        .collect();
    if let Some(wildcard) = &slate.wildcard {
        facts.push(format!("{} (wildcard)", fact_line(wildcard)));
    }
    facts.join("\n")
}

fn fact_line(pick: &RankedProduct) -> String {
    let product = &pick.product;
    let price = product
        .price
        .map(|price| format!("£{price}"))
        .unwrap_or_else(|| "price unknown".to_string());
    format!(
        "- {} — {}: {} tier, {} bow, {:.0}% carbon, {}",
        product.code,
        if product.description.is_empty() { "(no description)" } else { &product.description },
        product.tier.map(|tier| tier.as_str()).unwrap_or("unknown"),
        product.bow.as_deref().unwrap_or("unknown"),
        product.carbon(),
        price,
    )
}

/// Template fallback used when the model is off or unreachable. Plain,
/// factual, and always available.
fn deterministic_summary(request: RationaleRequest<'_>) -> String {
    let primary = &request.slate.primary.product;
    let mut summary = format!(
        "Based on your {} journey and priorities, the {} leads this selection: {} bow, \
         {:.0}% carbon, matched to how you said you play.",
        request.profile.journey,
        if primary.description.is_empty() { primary.code.as_str() } else { &primary.description },
        primary.bow.as_deref().unwrap_or("classic"),
        primary.carbon(),
    );

    if let Some(secondary) = &request.slate.secondary {
        let product = &secondary.product;
        summary.push_str(&format!(
            " The {} runs it close and offers a different feel.",
            if product.description.is_empty() { product.code.as_str() } else { &product.description },
        ));
    }
    if let Some(wildcard) = &request.slate.wildcard {
        let product = &wildcard.product;
        summary.push_str(&format!(
            " As a wildcard, the {} is worth a look if you fancy a change of shape.",
            if product.description.is_empty() { product.code.as_str() } else { &product.description },
        ));
    }
    if !request.fallback.is_empty() {
        summary.push_str(&format!(
            " We widened the search slightly to find these ({}).",
            request.fallback.relaxed.join(", ")
        ));
    }
    summary
}

/// Post-process model output: tidy whitespace without flattening paragraph
/// breaks, cap the length, guarantee terminal punctuation, and render the
/// HTML variant.
fn finish(text: &str, source: RationaleSource) -> Rationale {
    let mut summary = tidy_whitespace(text);

    let words: Vec<&str> = summary.split_whitespace().collect();
    if words.len() > WORD_CAP {
        summary = words[..WORD_CAP].join(" ");
    }

    if !summary.is_empty() && !summary.ends_with(['.', '!', '?']) {
        summary.push('.');
    }

    let summary_html = summary
        .split('\n')
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| format!("<p>{paragraph}</p>"))
        .collect::<String>();

    Rationale { summary, summary_html, source }
}

/// Audit digest of the exact prompt sent to the model.
pub fn prompt_digest(prompt: &str) -> String {
    use sha2::{Digest, Sha256};

    let digest = Sha256::digest(prompt.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Collapse runs of spaces and tabs but keep newlines, which mark paragraph
/// boundaries for the HTML rendering.
fn tidy_whitespace(text: &str) -> String {
    text.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use stickfit_core::engine::FallbackDiagnostics;
    use stickfit_core::{
        Journey, PlayerType, Priority, Product, Profile, RankedProduct, SelectionSlate, Tier,
    };

    use super::*;
    use crate::llm::{FailingLlm, StaticLlm};

    #[tokio::test]
    async fn llm_copy_is_used_when_the_client_succeeds() {
        let generator = NarrativeGenerator::new(Some(Arc::new(StaticLlm(
            "A confident paragraph about your sticks".to_string(),
        ))));

        let (profile, slate, fallback) = fixtures();
        let rationale = generator
            .generate(RationaleRequest { profile: &profile, slate: &slate, fallback: &fallback })
            .await;

        assert_eq!(rationale.source, RationaleSource::Llm);
        assert_eq!(rationale.summary, "A confident paragraph about your sticks.");
        assert_eq!(rationale.summary_html, "<p>A confident paragraph about your sticks.</p>");
    }

    #[tokio::test]
    async fn failing_client_degrades_to_the_deterministic_template() {
        let generator = NarrativeGenerator::new(Some(Arc::new(FailingLlm)));

        let (profile, slate, fallback) = fixtures();
        let rationale = generator
            .generate(RationaleRequest { profile: &profile, slate: &slate, fallback: &fallback })
            .await;

        assert_eq!(rationale.source, RationaleSource::Deterministic);
        assert!(rationale.summary.contains("Evolution 95"));
    }

    #[tokio::test]
    async fn disabled_generator_always_answers_deterministically() {
        let generator = NarrativeGenerator::disabled();

        let (profile, slate, fallback) = fixtures();
        let rationale = generator
            .generate(RationaleRequest { profile: &profile, slate: &slate, fallback: &fallback })
            .await;

        assert_eq!(rationale.source, RationaleSource::Deterministic);
        assert!(!rationale.summary.is_empty());
    }

    #[test]
    fn prompt_carries_profile_facts_and_bow_knowledge() {
        let (profile, slate, fallback) = fixtures();
        let prompt =
            build_prompt(RationaleRequest { profile: &profile, slate: &slate, fallback: &fallback });

        assert!(prompt.contains("journey=Elite"));
        assert!(prompt.contains("EV95"));
        assert!(prompt.contains("BOW DEFINITIONS"));
        assert!(prompt.contains("budget=£200"));
    }

    #[test]
    fn relaxation_tokens_surface_in_the_prompt() {
        let (profile, slate, _) = fixtures();
        let fallback = FallbackDiagnostics {
            relaxed: vec!["budget(+10%)".to_string()],
            ..FallbackDiagnostics::default()
        };
        let prompt =
            build_prompt(RationaleRequest { profile: &profile, slate: &slate, fallback: &fallback });

        assert!(prompt.contains("budget(+10%)"));
    }

    #[test]
    fn long_copy_is_capped_and_terminated() {
        let long_text = "word ".repeat(600);
        let rationale = finish(&long_text, RationaleSource::Llm);

        assert_eq!(rationale.summary.split_whitespace().count(), 500);
        assert!(rationale.summary.ends_with('.'));
    }

    #[test]
    fn prompt_digest_is_stable_hex_sha256() {
        let digest = prompt_digest("same prompt");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, prompt_digest("same prompt"));
        assert_ne!(digest, prompt_digest("different prompt"));
    }

    #[test]
    fn paragraph_breaks_become_html_paragraphs() {
        let rationale = finish("First  part.\n\nSecond   part.", RationaleSource::Llm);
        assert_eq!(rationale.summary, "First part.\n\nSecond part.");
        assert_eq!(rationale.summary_html, "<p>First part.</p><p>Second part.</p>");
    }

    fn fixtures() -> (Profile, SelectionSlate, FallbackDiagnostics) {
        let product = Product {
            code: "EV95".to_string(),
            description: "Evolution 95 Ultimate".to_string(),
            player_type: "Outdoor Player".to_string(),
            tier: Some(Tier::Elite),
            price: Some(Decimal::new(29_995, 2)),
            length: Some(36.5),
            bow: Some("Ultimate".to_string()),
            carbon_pct: Some(95.0),
            power: Some(9.0),
            touch: Some(8.0),
            aerial: Some(8.0),
            drag_flick: Some(8.0),
            image_url: None,
            product_url: None,
            is_solid_core: false,
        };
        let slate = SelectionSlate {
            primary: RankedProduct::new(product, 0.9, 1.0),
            secondary: None,
            wildcard: None,
        };
        let profile = Profile {
            skill: 9.0,
            journey: Journey::Elite,
            player_type: PlayerType::OutdoorPlayer,
            priority: Priority::Power,
            preferred_bow: None,
            budget: Decimal::from(200),
            length: None,
            attack: 8.0,
            midfield: 5.0,
            defence: 4.0,
            aerials: 9.0,
            dragflick: 9.0,
        };
        (profile, slate, FallbackDiagnostics::default())
    }
}
