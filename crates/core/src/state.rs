use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::TouchflowError;
use crate::journey::ChannelId;

/// Reserved display name for the entry state.
pub const START_STATE: &str = "(start)";
/// Reserved display name for the conversion absorbing state.
pub const CONVERSION_STATE: &str = "(conversion)";
/// Reserved display name for the abandonment absorbing state.
pub const NULL_STATE: &str = "(null)";

/// A node in the journey chain: a channel, or one of the reserved markers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum State {
    /// Entry point. Non-absorbing, never has incoming edges.
    Start,
    /// A marketing touchpoint.
    Channel(ChannelId),
    /// Absorbing: the journey converted.
    Conversion,
    /// Absorbing: the journey was abandoned.
    Null,
}

impl State {
    pub fn is_absorbing(&self) -> bool {
        matches!(self, State::Conversion | State::Null)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Start => write!(f, "{}", START_STATE),
            State::Channel(c) => write!(f, "{}", c),
            State::Conversion => write!(f, "{}", CONVERSION_STATE),
            State::Null => write!(f, "{}", NULL_STATE),
        }
    }
}

/// Validate a channel vocabulary: non-empty, no duplicates, no reserved names.
pub fn validate_vocabulary(channels: &[ChannelId]) -> Result<(), TouchflowError> {
    if channels.is_empty() {
        return Err(TouchflowError::EmptyChannels);
    }
    let mut seen = HashSet::with_capacity(channels.len());
    for channel in channels {
        if matches!(
            channel.as_str(),
            START_STATE | CONVERSION_STATE | NULL_STATE
        ) {
            return Err(TouchflowError::ReservedChannel(channel.clone()));
        }
        if !seen.insert(channel.as_str()) {
            return Err(TouchflowError::DuplicateChannel(channel.clone()));
        }
    }
    Ok(())
}

/// Dense state arena for one training run.
///
/// Index layout: `start`, the channels in declared order, `conversion`,
/// `null`. The state ↔ index mapping is assigned once and stays stable for
/// the lifetime of a trained model, so matrices can be addressed without
/// string hashing in the hot loops.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    states: Vec<State>,
    channels: Vec<ChannelId>,
    channel_index: HashMap<ChannelId, usize>,
}

impl StateSpace {
    pub fn new(channels: &[ChannelId]) -> Result<Self, TouchflowError> {
        validate_vocabulary(channels)?;

        let mut states = Vec::with_capacity(channels.len() + 3);
        states.push(State::Start);
        for channel in channels {
            states.push(State::Channel(channel.clone()));
        }
        states.push(State::Conversion);
        states.push(State::Null);

        let channel_index = channels
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i + 1))
            .collect();

        Ok(Self {
            states,
            channels: channels.to_vec(),
            channel_index,
        })
    }

    /// Total number of states (channels + the three markers).
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Display names in index order.
    pub fn names(&self) -> Vec<String> {
        self.states.iter().map(|s| s.to_string()).collect()
    }

    /// The channel vocabulary in declared order.
    pub fn channels(&self) -> &[ChannelId] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn start(&self) -> usize {
        0
    }

    pub fn conversion(&self) -> usize {
        self.states.len() - 2
    }

    pub fn null(&self) -> usize {
        self.states.len() - 1
    }

    /// Index of a channel by name, if it is in the vocabulary.
    pub fn channel(&self, name: &str) -> Option<usize> {
        self.channel_index.get(name).copied()
    }

    /// Indices of the channel states (excludes the three markers).
    pub fn channel_indices(&self) -> std::ops::Range<usize> {
        1..self.conversion()
    }

    pub fn is_absorbing(&self, index: usize) -> bool {
        index >= self.conversion()
    }

    pub fn is_transient(&self, index: usize) -> bool {
        !self.is_absorbing(index)
    }
}
