//! Pipeline bus events

/// Bus message relevant to the classification session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    StreamStarted,
    EndOfStream,
    Error {
        message: String,
        debug: Option<String>,
    },
    Warning {
        message: String,
        debug: Option<String>,
    },
    /// Quality-of-service statistics from a sink
    Qos {
        format: String,
        processed: u64,
        dropped: u64,
    },
}

/// Why the upstream pipeline stopped the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    EndOfStream,
    Error {
        message: String,
        debug: Option<String>,
    },
}

impl PipelineEvent {
    /// Terminal events end the session
    pub fn termination(&self) -> Option<Termination> {
        match self {
            PipelineEvent::EndOfStream => Some(Termination::EndOfStream),
            PipelineEvent::Error { message, debug } => Some(Termination::Error {
                message: message.clone(),
                debug: debug.clone(),
            }),
            _ => None,
        }
    }
}
