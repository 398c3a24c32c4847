//! crates/eer_net/src/classify.rs
//! Narrative classification through the Gemini `generateContent` API.
//!
//! The model is asked for `{ "trigger": ..., "priorityNeeds": [a, b, c] }`.
//! The reply is checked against a JSON Schema before it is trusted; an
//! unknown trigger is coerced to `other` rather than rejected. Individual
//! needs are passed through unchecked.

use std::future::Future;

use jsonschema::{Draft, JSONSchema};
use once_cell::sync::Lazy;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use eer_core::{ClosedChoice, Trigger};
use eer_form::{Classification, FormStore};

use crate::config::{join_url, ClientConfig};
use crate::error::{NetError, NetResult};

pub const SYSTEM_INSTRUCTION: &str = "You are an expert humanitarian aid analyst working for the IOM Displacement Tracking Matrix (DTM). Your task is to analyze an emergency event narrative and extract key information. Based on the text provided, identify the primary trigger of the event and list the top three most urgent priority needs of the affected population. The response must be in JSON format and adhere to the provided schema.";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Shape the reply text must have (checked locally), compiled once.
static REPLY_SCHEMA: Lazy<Result<JSONSchema, String>> = Lazy::new(|| {
    let schema = json!({
        "type": "object",
        "required": ["trigger", "priorityNeeds"],
        "properties": {
            "trigger": { "type": "string", "minLength": 1 },
            "priorityNeeds": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 3,
                "maxItems": 3
            }
        }
    });
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .map_err(|e| e.to_string())
});

/// Anything that can turn a narrative into a suggestion.
pub trait NarrativeClassifier {
    fn classify(&self, narrative: &str) -> impl Future<Output = NetResult<Classification>> + Send;
}

#[derive(Debug, Clone)]
pub struct GeminiClassifier {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl GeminiClassifier {
    /// Fails with `NetError::Config` when no API key is configured.
    pub fn new(config: &ClientConfig) -> NetResult<Self> {
        let api_key = config
            .classifier
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| NetError::Config("classifier API key is not set (API_KEY or GEMINI_API_KEY)".into()))?;
        let path = format!("v1beta/models/{}:generateContent", config.classifier.model);
        Ok(Self {
            http: config.http_client()?,
            endpoint: join_url(&config.classifier.base_url, &path)?,
            api_key,
        })
    }

    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl NarrativeClassifier for GeminiClassifier {
    async fn classify(&self, narrative: &str) -> NetResult<Classification> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body(narrative))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NetError::Http { status: status.as_u16(), body });
        }

        let reply: GenerateContentResponse = resp.json().await?;
        let text = reply.first_text().ok_or_else(|| {
            NetError::Integration("classifier reply has no candidate text".into())
        })?;
        let c = parse_classification(text)?;
        info!(trigger = %c.trigger, "narrative classified");
        Ok(c)
    }
}

/// Classify the store's narrative and write the suggestion back.
pub async fn classify_form<C: NarrativeClassifier>(
    store: &mut FormStore,
    classifier: &C,
) -> NetResult<Classification> {
    let narrative = store.report().narrative_summary.clone();
    let c = classifier.classify(&narrative).await?;
    store.apply_classification(&c);
    Ok(c)
}

/// Parse and check the model's JSON text.
pub fn parse_classification(text: &str) -> NetResult<Classification> {
    let v: Value = serde_json::from_str(text.trim())
        .map_err(|e| NetError::Integration(format!("classifier reply is not JSON: {e}")))?;

    let compiled = REPLY_SCHEMA
        .as_ref()
        .map_err(|e| NetError::Integration(format!("reply schema: {e}")))?;
    if let Err(errors) = compiled.validate(&v) {
        let msgs: Vec<String> = errors
            .map(|e| {
                let ptr = e.instance_path.to_string();
                format!("{}: {e}", if ptr.is_empty() { "/" } else { ptr.as_str() })
            })
            .collect();
        return Err(NetError::Integration(format!(
            "AI returned an invalid or incomplete data structure: {}",
            msgs.join("; ")
        )));
    }

    let raw: RawClassification = serde_json::from_value(v)
        .map_err(|e| NetError::Integration(format!("classifier reply: {e}")))?;
    let trigger = Trigger::parse_choice(&raw.trigger).unwrap_or_else(|_| {
        warn!(trigger = %raw.trigger, "unexpected trigger from classifier; using 'other'");
        Trigger::Other
    });
    Ok(Classification { trigger, priority_needs: raw.priority_needs })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClassification {
    trigger: String,
    priority_needs: [String; 3],
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

fn request_body(narrative: &str) -> Value {
    let triggers: Vec<&str> = Trigger::ALL.iter().map(|t| t.as_str()).collect();
    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{
            "role": "user",
            "parts": [{ "text": format!("Please analyze the following narrative:\n\n---\n\n{narrative}") }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "trigger": {
                        "type": "STRING",
                        "description": format!(
                            "The main trigger of the event. Must be one of the following values: {}.",
                            triggers.join(", ")
                        ),
                        "enum": triggers
                    },
                    "priorityNeeds": {
                        "type": "ARRAY",
                        "description": "A list of the top 3 priority needs for the affected population. Each need should be a short phrase (e.g., \"Clean Water\", \"Shelter\", \"Medical Supplies\").",
                        "items": { "type": "STRING" },
                        "minItems": 3,
                        "maxItems": 3
                    }
                },
                "required": ["trigger", "priorityNeeds"]
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}
