//! Wire format of the CPI protocol.
//!
//! One request document is written to the provider's stdin and one response
//! document is read back from its stdout. Responses are validated strictly:
//! `result`, `error` and `log` must all be present, `error` must be null or an
//! object with a string `type`, a string `message` and a boolean
//! `ok_to_retry`, and `log` must be a string. Extra keys are ignored.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cpi::errors::{legacy_not_implemented, CloudErrorKind};
use crate::cpi::CpiMethod;
use crate::error::{Error, Result};

/// Placeholder written in place of secret values in logged requests.
pub const REDACTED: &str = "<redacted>";

/// The per-call context sent alongside the arguments.
///
/// Serializes as a flat JSON object: `director_uuid`, `request_id`, the
/// optional `vm.stemcell.api_version` entry and then every property from the
/// CPI config, which may shadow the built-in keys.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    director_uuid: String,
    request_id: String,
    stemcell_api_version: Option<u32>,
    properties: Map<String, Value>,
}

impl RequestContext {
    /// Creates a context without stemcell version or extra properties.
    #[must_use]
    pub fn new(director_uuid: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            director_uuid: director_uuid.into(),
            request_id: request_id.into(),
            stemcell_api_version: None,
            properties: Map::new(),
        }
    }

    /// Adds `vm.stemcell.api_version` to the context.
    #[must_use]
    pub fn with_stemcell_api_version(mut self, version: Option<u32>) -> Self {
        self.stemcell_api_version = version;
        self
    }

    /// Merges properties from the CPI config into the context.
    #[must_use]
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    /// The request id of the call.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The context as a JSON object.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("director_uuid".into(), Value::from(self.director_uuid.as_str()));
        map.insert("request_id".into(), Value::from(self.request_id.as_str()));
        if let Some(version) = self.stemcell_api_version {
            map.insert(
                "vm".into(),
                serde_json::json!({ "stemcell": { "api_version": version } }),
            );
        }
        for (key, value) in &self.properties {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    /// The context with every key that came from the CPI config replaced by
    /// [`REDACTED`].
    #[must_use]
    pub fn to_redacted_map(&self) -> Map<String, Value> {
        let mut map = self.to_map();
        for key in self.properties.keys() {
            map.insert(key.clone(), Value::from(REDACTED));
        }
        map
    }
}

/// A CPI request document.
///
/// # Examples
///
/// ```
/// use stratus::cpi::{CpiMethod, CpiRequest, RequestContext};
///
/// let context = RequestContext::new("fake-director-uuid", "cpi-123456").to_map();
/// let request = CpiRequest::new(CpiMethod::Ping, vec![], context, None);
/// let json = request.to_json().unwrap();
/// assert!(json.contains(r#""method":"ping""#));
/// assert!(!json.contains("api_version"));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CpiRequest {
    method: &'static str,
    arguments: Vec<Value>,
    context: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_version: Option<u32>,
}

impl CpiRequest {
    /// Assembles a request; `api_version` is only emitted when set.
    #[must_use]
    pub fn new(
        method: CpiMethod,
        arguments: Vec<Value>,
        context: Map<String, Value>,
        api_version: Option<u32>,
    ) -> Self {
        Self {
            method: method.as_str(),
            arguments,
            context,
            api_version,
        }
    }

    /// Serializes the request as a single-line JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] only if an argument cannot be
    /// represented as JSON, which cannot happen for [`Value`] arguments.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidResponse {
            reason: format!("unserializable request - {e}"),
        })
    }
}

/// The `error` member of a CPI response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpiErrorPayload {
    /// Error type as reported, possibly namespaced.
    pub error_type: String,
    /// Human-readable message.
    pub message: String,
    /// Whether the provider considers the call safe to retry.
    pub ok_to_retry: bool,
}

impl CpiErrorPayload {
    /// Converts the payload into the typed error for a call of `method`.
    ///
    /// Legacy "method not known" replies become `NotImplemented`, known types
    /// become [`Error::Cloud`] and everything else [`Error::UnknownCpiError`].
    #[must_use]
    pub fn into_error(self, method: CpiMethod, request_id: &str) -> Error {
        let kind = if legacy_not_implemented(&self.error_type, &self.message) {
            Some(CloudErrorKind::NotImplemented)
        } else {
            CloudErrorKind::from_type(&self.error_type)
        };

        match kind {
            Some(kind) => Error::Cloud {
                kind,
                ok_to_retry: kind.is_retriable().then_some(self.ok_to_retry),
                error_type: self.error_type,
                message: self.message,
                method: method.as_str().to_string(),
                request_id: request_id.to_string(),
            },
            None => Error::UnknownCpiError {
                error_type: self.error_type,
                message: self.message,
                method: method.as_str().to_string(),
                request_id: request_id.to_string(),
            },
        }
    }
}

/// A validated CPI response document.
#[derive(Debug, Clone, PartialEq)]
pub struct CpiResponse {
    /// The method's result; meaningless when `error` is set.
    pub result: Value,
    /// The provider-declared error, if any.
    pub error: Option<CpiErrorPayload>,
    /// Provider log output destined for the task log.
    pub log: String,
}

impl CpiResponse {
    /// Parses and validates a raw response document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] with a `ParserError` reason when the
    /// bytes are not UTF-8 JSON and a `SchemaValidationError` reason when the document
    /// does not have the required shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus::cpi::CpiResponse;
    ///
    /// let response = CpiResponse::parse(r#"{"result":"abc","error":null,"log":""}"#).unwrap();
    /// assert_eq!(response.result, serde_json::json!("abc"));
    /// assert!(CpiResponse::parse("invalid-json").is_err());
    /// assert!(CpiResponse::parse(r#"{"result":"abc"}"#).is_err());
    /// ```
    pub fn parse(input: impl AsRef<[u8]>) -> Result<Self> {
        let document: Value = serde_json::from_slice(input.as_ref()).map_err(|e| Error::InvalidResponse {
            reason: format!("ParserError - {e}"),
        })?;
        Self::from_value(document).map_err(|reason| Error::InvalidResponse {
            reason: format!("SchemaValidationError: {reason}"),
        })
    }

    fn from_value(document: Value) -> std::result::Result<Self, String> {
        let mut object = match document {
            Value::Object(object) => object,
            other => return Err(format!("Expected instance of Hash, given {}", type_name(&other))),
        };

        let result = object
            .remove("result")
            .ok_or_else(|| "{ result => Missing key }".to_string())?;

        let error = match object.remove("error") {
            None => return Err("{ error => Missing key }".to_string()),
            Some(Value::Null) => None,
            Some(Value::Object(error)) => Some(parse_error_payload(&error)?),
            Some(other) => {
                return Err(format!(
                    "{{ error => Expected null or Hash, given {} }}",
                    type_name(&other)
                ))
            }
        };

        let log = match object.remove("log") {
            None => return Err("{ log => Missing key }".to_string()),
            Some(Value::String(log)) => log,
            Some(other) => {
                return Err(format!(
                    "{{ log => Expected instance of String, given {} }}",
                    type_name(&other)
                ))
            }
        };

        Ok(Self { result, error, log })
    }

    /// Returns the result, or the typed error the provider declared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cloud`] or [`Error::UnknownCpiError`] when the
    /// response carries an error.
    pub fn into_result(self, method: CpiMethod, request_id: &str) -> Result<Value> {
        match self.error {
            Some(error) => Err(error.into_error(method, request_id)),
            None => Ok(self.result),
        }
    }
}

fn parse_error_payload(error: &Map<String, Value>) -> std::result::Result<CpiErrorPayload, String> {
    let string_field = |key: &str| match error.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(format!(
            "{{ error => {{ {key} => Expected instance of String, given {} }} }}",
            type_name(other)
        )),
        None => Err(format!("{{ error => {{ {key} => Missing key }} }}")),
    };

    let error_type = string_field("type")?;
    let message = string_field("message")?;
    let ok_to_retry = match error.get("ok_to_retry") {
        Some(Value::Bool(flag)) => *flag,
        Some(other) => {
            return Err(format!(
                "{{ error => {{ ok_to_retry => Expected bool, given {} }} }}",
                type_name(other)
            ))
        }
        None => return Err("{ error => { ok_to_retry => Missing key } }".to_string()),
    };

    Ok(CpiErrorPayload {
        error_type,
        message,
        ok_to_retry,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Hash",
    }
}
