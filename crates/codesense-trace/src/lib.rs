//! CodeSense Trace
//!
//! Data model for replayable execution traces.
//!
//! # Architecture
//!
//! - **Step**: one point-in-time snapshot (line, code, description, payload)
//! - **Visualization**: tagged payload describing what to draw for a step
//! - **TraceStore**: the ordered, read-only step sequence of one session
//! - **Highlight**: current source line derived from the cursor
//! - **Wire**: request/response envelopes of the external trace generator
//!
//! # Usage
//!
//! ```
//! use codesense_trace::{highlighted_line, TraceStore, VisualizeResponse};
//!
//! let body = r#"{"steps": [{"line": 1, "code": "x = 5",
//!     "visualization": {"type": "variable", "name": "x", "value": 5, "var_type": "int"}}]}"#;
//! let response: VisualizeResponse = serde_json::from_str(body).unwrap();
//!
//! let mut store = TraceStore::new();
//! store.load(response.into_steps().unwrap()).unwrap();
//! assert_eq!(highlighted_line(&store, 0), Some(1));
//! ```

mod error;
mod graph;
mod highlight;
mod pairs;
mod payload;
mod step;
mod store;
mod wire;

pub use error::{InputError, Result, TraceError};
pub use graph::{GraphPayload, Neighbor, NodeId, Position, fallback_position};
pub use highlight::highlighted_line;
pub use payload::{
    ArrayOperation, ArrayPayload, Companion, DictPayload, GraphWithDsPayload, MessagePayload,
    QueueOperation, SequencePayload, StackOperation, VariablePayload, Visualization,
};
pub use step::{Step, StepRecord, FALLBACK_TEXT};
pub use store::TraceStore;
pub use wire::{
    Bug, BugReport, CodeSmell, Complexity, ErrorBody, Explanation, Improvement, KeyConcept,
    Language, Level, LineExplanation, TraceRequest, VisualizeResponse, DEFAULT_MAX_CODE_LENGTH,
};
