//! Chat-completions classifier.
//!
//! Blocking reqwest client (no Tokio runtime required). Works against any
//! OpenAI-compatible `/chat/completions` endpoint: the OpenAI API itself or
//! a local Ollama server.

use std::time::Duration;

use serde_json::{json, Value};

use datacat_config::{AIConfigStatus, ResolvedAIConfig};
use datacat_engine::classify::{parse_metadata, ClassificationRequest, Classifier, ClassifyError, TableMetadata};

/// Fixed instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "Eres un experto catalogador de datos. Analiza la siguiente muestra de una tabla y responde en **español**. Describe la tabla en un máximo de 500 caracteres y cada columna con su tipo de dato (texto, numero o fecha). Si el nombre de una columna es poco claro, sugiere un nuevo nombre y la razón.";

/// Longest error body kept in an HTTP error.
const MAX_ERROR_BODY: usize = 300;

#[derive(Clone)]
pub struct HttpClassifier {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpClassifier {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassifyError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("datacat/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifyError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    /// Client for a resolved configuration. Fails unless the configuration
    /// is ready.
    pub fn from_config(config: &ResolvedAIConfig) -> Result<Self, ClassifyError> {
        if config.status != AIConfigStatus::Ready {
            let reason = config
                .blocking_reason
                .clone()
                .unwrap_or_else(|| format!("classifier status is {}", config.status.as_str()));
            return Err(ClassifyError::Unavailable(reason));
        }
        Self::new(
            &config.endpoint,
            &config.model,
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    /// Request body: fixed instruction, the sample as the user message, and
    /// a strict JSON schema for the answer.
    pub fn request_body(&self, request: &ClassificationRequest) -> Value {
        let mut user = String::new();
        user.push_str(&format!("Nombre de la tabla: {}\n", request.table_name));
        if let Some(context) = &request.context {
            user.push_str(&format!("Contexto adicional: {}\n", context));
        }
        user.push_str(&format!("Muestra de la tabla (formato JSON):\n{}", request.sample_json()));

        json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                {"role": "system", "content": SYSTEM_INSTRUCTION},
                {"role": "user", "content": user},
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "table_metadata",
                    "strict": true,
                    "schema": metadata_schema(),
                },
            },
        })
    }
}

fn metadata_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["table_description", "columns"],
        "properties": {
            "table_description": {"type": "string"},
            "columns": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["name", "description", "type", "new_name", "reason"],
                    "properties": {
                        "name": {"type": "string"},
                        "description": {"type": "string"},
                        "type": {"type": "string", "enum": ["texto", "numero", "fecha"]},
                        "new_name": {"type": ["string", "null"]},
                        "reason": {"type": ["string", "null"]},
                    },
                },
            },
        },
    })
}

impl Classifier for HttpClassifier {
    fn classify(&self, request: &ClassificationRequest) -> Result<TableMetadata, ClassifyError> {
        let url = self.completions_url();
        let mut req = self.http.post(&url).json(&self.request_body(request));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        log::debug!("classifying '{}' with {} at {}", request.table_name, self.model, url);
        let response = req.send().map_err(|e| ClassifyError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClassifyError::Http(status, truncate(&body, MAX_ERROR_BODY)));
        }

        let json: Value = response.json().map_err(|e| ClassifyError::Malformed(e.to_string()))?;
        let content = message_content(&json)?;
        parse_metadata(content)
    }
}

/// `choices[0].message.content`, or the refusal text as an error.
fn message_content(json: &Value) -> Result<&str, ClassifyError> {
    let message = &json["choices"][0]["message"];
    if let Some(refusal) = message["refusal"].as_str() {
        return Err(ClassifyError::Malformed(format!("model refused: {}", refusal)));
    }
    message["content"]
        .as_str()
        .ok_or_else(|| ClassifyError::Malformed("Missing choices[0].message.content in response".into()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
