use thiserror::Error;

#[derive(Error, Debug)]
pub enum TouchflowError {
    #[error("channel vocabulary is empty")]
    EmptyChannels,

    #[error("duplicate channel in vocabulary: {0}")]
    DuplicateChannel(String),

    #[error("reserved state name used as channel: {0}")]
    ReservedChannel(String),

    #[error("journey {journey} references unknown channel: {channel}")]
    UnknownChannel { channel: String, journey: usize },

    #[error("channel count {count} exceeds exact coalition enumeration limit {limit}")]
    TooManyChannels { count: usize, limit: usize },
}
