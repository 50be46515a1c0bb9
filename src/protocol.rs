//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisResult, FactoringCase, Language, MathContextFact, PracticeExample};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Analyze {
        expression: String,
        #[serde(default)]
        case: FactoringCase,
        #[serde(default)]
        language: Language,
    },
    NewExample {
        case: FactoringCase,
        #[serde(default)]
        language: Language,
    },
    NewContextFact {
        #[serde(default)]
        language: Language,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Analysis {
        analysis: AnalysisResult,
    },
    Example {
        example: PracticeExample,
    },
    ContextFact {
        fact: MathContextFact,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct AnalyzeIn {
    pub expression: String,
    #[serde(default)]
    pub case: FactoringCase,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct ExampleIn {
    pub case: FactoringCase,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct ContextQuery {
    #[serde(default)]
    pub language: Language,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
