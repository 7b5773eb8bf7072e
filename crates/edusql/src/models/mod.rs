pub mod ask_envelope;
pub mod chat;
pub mod query;
pub mod question;
pub mod reply;
pub mod result;

pub use ask_envelope::{
    ASK_ENVELOPE_SCHEMA_VERSION, AskEnvelope, AskEnvelopeError, UnansweredQuestion,
};
pub use chat::{InboundMessage, OutboundMessage, RelayError, wire_json_schema};
pub use query::{CandidateQuery, QueryOrigin, SqlParam};
pub use question::Question;
pub use reply::{Reply, ReplyKind};
pub use result::{
    FailureKind, QueryFailure, QueryResult, ResultSet, display_sql_value, json_value_from_sql,
};
