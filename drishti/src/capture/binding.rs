//! Activation channel → pose target mapping.
//!
//! Input devices differ (mouse buttons, keyboard modifiers, touch gestures,
//! an on-screen toggle), so the capture logic only sees abstract channels.
//! Which channel sets which target is configuration.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DrishtiError;

/// Abstract input channel that can start a pose drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationChannel {
    /// Main pointer button / plain click
    Primary,
    /// Secondary pointer button
    Secondary,
    /// Click with a keyboard modifier held
    Modifier,
    /// One-finger touch
    TouchSingle,
    /// Two-finger touch
    TouchDouble,
    /// Click while an on-screen mode toggle is active
    Toggle,
}

impl ActivationChannel {
    pub const ALL: [ActivationChannel; 6] = [
        ActivationChannel::Primary,
        ActivationChannel::Secondary,
        ActivationChannel::Modifier,
        ActivationChannel::TouchSingle,
        ActivationChannel::TouchDouble,
        ActivationChannel::Toggle,
    ];

    /// Configuration name of the channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationChannel::Primary => "primary",
            ActivationChannel::Secondary => "secondary",
            ActivationChannel::Modifier => "modifier",
            ActivationChannel::TouchSingle => "touch_single",
            ActivationChannel::TouchDouble => "touch_double",
            ActivationChannel::Toggle => "toggle",
        }
    }
}

impl FromStr for ActivationChannel {
    type Err = DrishtiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DrishtiError::Config(format!("unknown activation channel '{}'", s)))
    }
}

/// Which of the two independently tracked poses a drag sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseTarget {
    /// Mission destination
    Goal,
    /// Localization seed
    Initial,
}

impl std::fmt::Display for PoseTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoseTarget::Goal => write!(f, "goal"),
            PoseTarget::Initial => write!(f, "initial"),
        }
    }
}

/// Channel → target table. Unbound channels are ignored by capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, PoseTarget>",
    into = "BTreeMap<String, PoseTarget>"
)]
pub struct ChannelBindings {
    table: BTreeMap<ActivationChannel, PoseTarget>,
}

impl ChannelBindings {
    /// No channel bound.
    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    /// Bind a channel, replacing any previous binding for it.
    pub fn bind(mut self, channel: ActivationChannel, target: PoseTarget) -> Self {
        self.table.insert(channel, target);
        self
    }

    /// Target selected by a channel, if bound.
    #[inline]
    pub fn resolve(&self, channel: ActivationChannel) -> Option<PoseTarget> {
        self.table.get(&channel).copied()
    }

    /// Channels bound to a target.
    pub fn channels_for(&self, target: PoseTarget) -> impl Iterator<Item = ActivationChannel> + '_ {
        self.table
            .iter()
            .filter(move |(_, t)| **t == target)
            .map(|(c, _)| *c)
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl TryFrom<BTreeMap<String, PoseTarget>> for ChannelBindings {
    type Error = DrishtiError;

    fn try_from(raw: BTreeMap<String, PoseTarget>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .try_fold(Self::empty(), |b, (name, target)| {
                Ok(b.bind(name.parse()?, target))
            })
    }
}

impl From<ChannelBindings> for BTreeMap<String, PoseTarget> {
    fn from(b: ChannelBindings) -> Self {
        b.table
            .into_iter()
            .map(|(c, t)| (c.as_str().to_string(), t))
            .collect()
    }
}

impl Default for ChannelBindings {
    /// Primary sets the goal, secondary sets the initial pose.
    fn default() -> Self {
        Self::empty()
            .bind(ActivationChannel::Primary, PoseTarget::Goal)
            .bind(ActivationChannel::Secondary, PoseTarget::Initial)
    }
}
