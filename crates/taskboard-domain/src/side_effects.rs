//! Column-transition business rules.
//!
//! Every status is reachable from every other status. Rules key on the
//! status being entered and only fire when the task was not already there,
//! so leaving a column never triggers anything. In particular, leaving
//! `done` keeps `is_completed`, `completed_at` and `completed_by` as they
//! were.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::ActorContext;
use crate::drag::Delta;
use crate::patch::TaskPatch;
use crate::task::TaskStatus;

/// Fire-and-forget notification for the host. Delivery never affects
/// whether the transition is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorySignal {
    TaskComplete,
    Blocked,
}

impl AdvisorySignal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskComplete => "task_complete",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for AdvisorySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl Transition {
    pub fn new(from: TaskStatus, to: TaskStatus) -> Self {
        Self { from, to }
    }

    pub fn enters(&self, status: TaskStatus) -> bool {
        self.to == status && self.from != status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    StampCompletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub enters: TaskStatus,
    pub mutation: Option<Mutation>,
    pub signal: Option<AdvisorySignal>,
}

impl TransitionRule {
    pub fn fires(&self, transition: Transition) -> bool {
        transition.enters(self.enters)
    }
}

const STANDARD_RULES: [TransitionRule; 2] = [
    TransitionRule {
        enters: TaskStatus::Done,
        mutation: Some(Mutation::StampCompletion),
        signal: Some(AdvisorySignal::TaskComplete),
    },
    TransitionRule {
        enters: TaskStatus::Blocked,
        mutation: None,
        signal: Some(AdvisorySignal::Blocked),
    },
];

/// Extra field changes and signals produced by a transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideEffects {
    pub patch: TaskPatch,
    pub signals: Vec<AdvisorySignal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SideEffectPolicy {
    rules: Vec<TransitionRule>,
}

impl Default for SideEffectPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl SideEffectPolicy {
    pub fn standard() -> Self {
        Self::with_rules(STANDARD_RULES.to_vec())
    }

    pub fn with_rules(rules: Vec<TransitionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    /// Evaluate the rule table in order against one transition.
    pub fn evaluate(
        &self,
        transition: Transition,
        actor: &ActorContext,
        now: DateTime<Utc>,
    ) -> SideEffects {
        let mut effects = SideEffects::default();
        for rule in self.rules.iter().filter(|r| r.fires(transition)) {
            if let Some(Mutation::StampCompletion) = rule.mutation {
                effects.patch =
                    std::mem::take(&mut effects.patch).completion(now, actor.actor_id.clone());
            }
            effects.signals.extend(rule.signal);
        }
        effects
    }

    /// Combine a drag delta with the side effects of its transition into the
    /// single patch that gets applied locally and sent to the store.
    pub fn augment(
        &self,
        from: TaskStatus,
        delta: Delta,
        actor: &ActorContext,
        now: DateTime<Utc>,
    ) -> (TaskPatch, Vec<AdvisorySignal>) {
        let effects = self.evaluate(Transition::new(from, delta.status), actor, now);
        (delta.into_patch().merge(effects.patch), effects.signals)
    }
}
