use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::colony::{Intent, Outcome};
use crate::error::Error;

#[derive(Deserialize, Debug, Clone)]
pub struct ApiRequest<T = Value> {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: T,
}

impl TryFrom<ApiRequest> for Intent {
    type Error = Error;

    /// `method` picks the intent and `params` fills in its fields.
    fn try_from(request: ApiRequest) -> Result<Self, Self::Error> {
        let mut fields = match request.params {
            Value::Object(fields) => fields,
            Value::Null => Map::new(),
            other => {
                return Err(Error::BadRequest {
                    message: format!("params must be an object, got {other}"),
                });
            }
        };
        fields.insert("method".to_string(), Value::String(request.method.clone()));

        serde_json::from_value(Value::Object(fields)).map_err(|e| Error::BadRequest {
            message: format!("{}: {}", request.method, e),
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub id: Option<String>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn success(id: impl Into<String>, outcome: &Outcome) -> Self {
        let id = id.into();
        match serde_json::to_value(outcome) {
            Ok(result) => Self {
                id: Some(id),
                ok: true,
                result: Some(result),
                error: None,
            },
            Err(e) => Self::failure(Some(id), &Error::Json(e)),
        }
    }

    pub fn failure(id: Option<String>, error: &Error) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(error.to_string()),
        }
    }
}
