use serde::{Deserialize, Serialize};

/// Opaque identifier for a marketing touchpoint.
pub type ChannelId = String;

/// A recorded customer journey: the ordered channel touches plus outcome.
///
/// Journeys are immutable inputs; the engine never mutates them. Touches may
/// repeat (consecutive repeats become self-transitions during training) and
/// must be drawn from the declared channel vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journey {
    pub touches: Vec<ChannelId>,
    pub converted: bool,
}
