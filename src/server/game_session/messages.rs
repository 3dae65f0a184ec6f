use actix::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::game::snapshot::Snapshot;
use crate::game::state::Intent;

/// Queue a player intent for the next tick.
#[derive(Message, Debug, Clone, Copy, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct SubmitIntent {
    pub intent: Intent,
}

/// Pushed to subscribers after intents were applied and every few ticks.
#[derive(Message, Clone, Serialize, Deserialize, Debug)]
#[rtype(result = "()")]
pub struct SnapshotUpdate {
    pub session_id: Uuid,
    pub snapshot: Snapshot,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe(pub Recipient<SnapshotUpdate>);

#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "Snapshot")]
pub struct GetSnapshot;

/// Throw the current run away and start over, optionally with a new config.
#[derive(Message, Debug, Clone, Default)]
#[rtype(result = "()")]
pub struct ResetSession {
    pub config: Option<EngineConfig>,
}
