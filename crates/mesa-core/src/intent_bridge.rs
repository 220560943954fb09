//! Intent Bridge: conversational language understanding endpoint.
//! Sends one utterance, decodes `topIntent` + entities, hands them to the resolver.

use serde::Serialize;
use serde_json::Value;

use crate::config::ChatConfig;
use crate::conversation::Turn;
use crate::error::{ChatError, ChatResult};
use crate::http::{build_client, send_with_retry, RetryPolicy};
use crate::resolver::{self, Entity};
use crate::router::{BackendMode, Responder};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const PARTICIPANT_ID: &str = "user";
const CONVERSATION_ITEM_ID: &str = "1";
const STRING_INDEX_TYPE: &str = "TextElement_V8";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    kind: &'static str,
    analysis_input: AnalysisInput<'a>,
    parameters: AnalyzeParameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisInput<'a> {
    conversation_item: ConversationItem<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationItem<'a> {
    id: &'static str,
    participant_id: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeParameters<'a> {
    project_name: &'a str,
    deployment_name: &'a str,
    string_index_type: &'static str,
}

/// Normalized classifier output handed to the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub top_intent: Option<String>,
    pub entities: Vec<Entity>,
}

impl Classification {
    /// Read `result.prediction` from a decoded body. Every level is optional and
    /// type-checked field by field: a missing or mistyped prediction is a
    /// "no intent" result, a non-string `topIntent` is no intent, and entities
    /// without a string category and non-blank text are dropped.
    pub fn from_value(value: &Value) -> Self {
        let Some(prediction) = value.pointer("/result/prediction") else {
            return Classification::default();
        };
        let top_intent = prediction
            .get("topIntent")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
        let entities: Vec<Entity> = prediction
            .get("entities")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(entity_from_value).collect())
            .unwrap_or_default();
        Classification {
            top_intent,
            entities,
        }
    }
}

fn entity_from_value(value: &Value) -> Option<Entity> {
    let category = value.get("category")?.as_str()?;
    let text = value.get("text")?.as_str()?;
    if text.trim().is_empty() {
        return None;
    }
    Some(Entity::new(category, text))
}

/// Decode a 2xx body. Non-JSON is a classification error carrying the response
/// status; JSON of any shape normalizes through [`Classification::from_value`].
pub fn decode_classification(status: u16, body: &str) -> ChatResult<Classification> {
    let value: Value = serde_json::from_str(body).map_err(|e| ChatError::Classification {
        status: Some(status),
        body: format!("response parse: {}: {}", e, body),
    })?;
    Ok(Classification::from_value(&value))
}

fn classification_error(status: Option<u16>, body: String) -> ChatError {
    ChatError::Classification { status, body }
}

/// Structured-intent responder backed by the analyze-conversations API.
pub struct IntentBridge {
    url: String,
    api_key: String,
    project_name: String,
    deployment_name: String,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl IntentBridge {
    pub fn new(config: &ChatConfig) -> ChatResult<Self> {
        let url = format!(
            "{}/language/:analyze-conversations?api-version={}",
            config.base_url(),
            config.clu_api_version
        );
        Ok(Self {
            url,
            api_key: config.api_key.trim().to_string(),
            project_name: config.deployment_name.trim().to_string(),
            deployment_name: config.clu_deployment.trim().to_string(),
            retry: RetryPolicy::from_config(config),
            client: build_client(config, classification_error)?,
        })
    }

    /// Classify only; no template resolution.
    pub async fn classify(&self, utterance: &str) -> ChatResult<Classification> {
        let body = AnalyzeRequest {
            kind: "Conversation",
            analysis_input: AnalysisInput {
                conversation_item: ConversationItem {
                    id: CONVERSATION_ITEM_ID,
                    participant_id: PARTICIPANT_ID,
                    text: utterance,
                },
            },
            parameters: AnalyzeParameters {
                project_name: &self.project_name,
                deployment_name: &self.deployment_name,
                string_index_type: STRING_INDEX_TYPE,
            },
        };

        let (status, text) = send_with_retry("Intent classification", self.retry, classification_error, || {
            self.client
                .post(&self.url)
                .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
                .json(&body)
        })
        .await?;

        let classification = decode_classification(status, &text)?;
        tracing::info!(
            "[MESA] Intent Bridge: topIntent={:?}, entities={}",
            classification.top_intent,
            classification.entities.len()
        );
        Ok(classification)
    }

    /// Classify and resolve into reply text.
    pub async fn resolve(&self, utterance: &str) -> ChatResult<String> {
        let c = self.classify(utterance).await?;
        Ok(resolver::resolve(c.top_intent.as_deref(), &c.entities))
    }
}

#[async_trait::async_trait]
impl Responder for IntentBridge {
    fn mode(&self) -> BackendMode {
        BackendMode::StructuredIntent
    }

    async fn respond(&self, _history: &[Turn], utterance: &str) -> ChatResult<String> {
        self.resolve(utterance).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_intent_and_entities() {
        let body = r#"{
            "kind": "ConversationResult",
            "result": {
                "query": "quiero pizza",
                "prediction": {
                    "topIntent": "RealizarPedido",
                    "projectKind": "Conversation",
                    "intents": [{"category": "RealizarPedido", "confidenceScore": 0.97}],
                    "entities": [{"category": "Plato", "text": "pizza", "offset": 7, "length": 5, "confidenceScore": 1}]
                }
            }
        }"#;
        let c = decode_classification(200, body).unwrap();
        assert_eq!(c.top_intent.as_deref(), Some("RealizarPedido"));
        assert_eq!(c.entities, vec![Entity::new("Plato", "pizza")]);
    }

    #[test]
    fn missing_entities_are_empty_not_an_error() {
        let body = r#"{"result":{"prediction":{"topIntent":"Horarios"}}}"#;
        let c = decode_classification(200, body).unwrap();
        assert_eq!(c.top_intent.as_deref(), Some("Horarios"));
        assert!(c.entities.is_empty());
    }

    #[test]
    fn missing_prediction_yields_empty_classification() {
        for body in [r#"{}"#, r#"{"result":{}}"#, r#"{"result":{"prediction":{"topIntent":""}}}"#] {
            assert_eq!(decode_classification(200, body).unwrap(), Classification::default());
        }
    }

    #[test]
    fn non_json_body_is_classification_error() {
        let err = decode_classification(200, "<html>gateway</html>").unwrap_err();
        assert!(matches!(err, ChatError::Classification { status: Some(200), .. }));
        assert!(err.to_string().contains("gateway"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn entities_without_usable_text_are_dropped() {
        let body = r#"{"result":{"prediction":{"topIntent":"Horarios","entities":[
            {"category":"Plato"},
            {"category":"Plato","text":"   "},
            {"category":"Plato","text":7},
            {"text":"pizza"},
            {"category":"Bebida","text":"limonada"}
        ]}}}"#;
        let c = decode_classification(200, body).unwrap();
        assert_eq!(c.top_intent.as_deref(), Some("Horarios"));
        assert_eq!(c.entities, vec![Entity::new("Bebida", "limonada")]);
    }

    #[test]
    fn mistyped_fields_fall_back_to_no_intent() {
        for body in [
            r#"{"result":{"prediction":{"topIntent":42}}}"#,
            r#"{"result":{"prediction":"Horarios"}}"#,
            r#"{"result":[]}"#,
            r#"{"result":{"prediction":{"topIntent":null,"entities":{"category":"Plato"}}}}"#,
            r#"[1, 2, 3]"#,
        ] {
            assert_eq!(decode_classification(200, body).unwrap(), Classification::default());
        }
    }

    #[test]
    fn mistyped_intent_with_product_entity_still_resolves_the_product() {
        let body = r#"{"result":{"prediction":{"topIntent":42,"entities":[{"category":"Plato","text":"pizza"}]}}}"#;
        let c = decode_classification(200, body).unwrap();
        assert_eq!(c.top_intent, None);
        assert_eq!(c.entities, vec![Entity::new("Plato", "pizza")]);
    }

    #[test]
    fn request_body_matches_wire_format() {
        let body = AnalyzeRequest {
            kind: "Conversation",
            analysis_input: AnalysisInput {
                conversation_item: ConversationItem {
                    id: CONVERSATION_ITEM_ID,
                    participant_id: PARTICIPANT_ID,
                    text: "hola",
                },
            },
            parameters: AnalyzeParameters {
                project_name: "restaurante",
                deployment_name: "production",
                string_index_type: STRING_INDEX_TYPE,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "Conversation",
                "analysisInput": {"conversationItem": {"id": "1", "participantId": "user", "text": "hola"}},
                "parameters": {"projectName": "restaurante", "deploymentName": "production", "stringIndexType": "TextElement_V8"}
            })
        );
    }
}
