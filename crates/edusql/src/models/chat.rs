use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub seq: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RelayError {
    pub line: usize,
    pub error: String,
}

#[must_use]
pub fn wire_json_schema() -> Value {
    json!({
        "inbound": schemars::schema_for!(InboundMessage),
        "outbound": schemars::schema_for!(OutboundMessage),
        "error": schemars::schema_for!(RelayError),
    })
}
