use actix::prelude::*;
use actix::MessageResult;
use log::{debug, info};
use std::collections::VecDeque;
use std::time::Duration;
use uuid::Uuid;

use crate::config::game::{BROADCAST_EVERY_TICKS, TICK_MILLIS};
use crate::config::EngineConfig;
use crate::game::snapshot::Snapshot;
use crate::game::state::{GameState, Intent};
use crate::server::game_session::messages::{GetSnapshot, ResetSession, SnapshotUpdate, SubmitIntent, Subscribe};

/// Owns one [`GameState`] and drives it on a fixed-step timer.
pub struct GameSession {
    pub session_id: Uuid,
    config: EngineConfig,
    game_state: GameState,
    pending_intents: VecDeque<Intent>,
    subscribers: Vec<Recipient<SnapshotUpdate>>,
}

impl Actor for GameSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("[GameSession] Session {} started (seed {})", self.session_id, self.game_state.seed());
        ctx.run_interval(Duration::from_millis(TICK_MILLIS), |act, _ctx| {
            act.step();
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!("[GameSession] Session {} stopped after {} ticks", self.session_id, self.game_state.tick_count());
    }
}

impl GameSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            game_state: GameState::new(config.clone()),
            config,
            pending_intents: VecDeque::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    /// One fixed step: drain queued intents, advance the simulation, and
    /// broadcast when something was requested or the broadcast period elapsed.
    pub fn step(&mut self) {
        let had_intents = !self.pending_intents.is_empty();
        while let Some(intent) = self.pending_intents.pop_front() {
            if let Err(err) = self.game_state.apply_intent(intent) {
                debug!("[GameSession] {:?} -> {}", intent, err);
            }
        }

        let phase_before = self.game_state.phase();
        self.game_state.tick(TICK_MILLIS as f32 / 1000.0);
        let phase_changed = phase_before != self.game_state.phase();

        if had_intents || phase_changed || self.game_state.tick_count() % BROADCAST_EVERY_TICKS == 0 {
            self.send_snapshot();
        }
    }

    pub fn send_snapshot(&mut self) {
        self.subscribers.retain(|r| r.connected());
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.game_state.snapshot();
        debug!(
            "[GameSession] Broadcast snapshot: session={} tick={} subscribers={}",
            self.session_id,
            snapshot.tick,
            self.subscribers.len()
        );
        for recipient in &self.subscribers {
            recipient.do_send(SnapshotUpdate { session_id: self.session_id, snapshot: snapshot.clone() });
        }
    }
}

impl Handler<SubmitIntent> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: SubmitIntent, _: &mut Context<Self>) -> Self::Result {
        self.pending_intents.push_back(msg.intent);
    }
}

impl Handler<Subscribe> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _: &mut Context<Self>) -> Self::Result {
        let snapshot = self.game_state.snapshot();
        msg.0.do_send(SnapshotUpdate { session_id: self.session_id, snapshot });
        self.subscribers.push(msg.0);
    }
}

impl Handler<GetSnapshot> for GameSession {
    type Result = MessageResult<GetSnapshot>;

    fn handle(&mut self, _: GetSnapshot, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.game_state.snapshot())
    }
}

impl Handler<ResetSession> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: ResetSession, _: &mut Context<Self>) -> Self::Result {
        if let Some(config) = msg.config {
            self.config = config;
        }
        self.pending_intents.clear();
        self.game_state = GameState::new(self.config.clone());
        info!("[GameSession] Session {} reset (seed {})", self.session_id, self.game_state.seed());
        self.send_snapshot();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Phase;
    use crate::game::types::{Direction, Position};

    fn seeded() -> EngineConfig {
        EngineConfig { seed: Some(21), ..EngineConfig::default() }
    }

    #[test]
    fn test_step_applies_queued_intents_in_order() {
        let mut session = GameSession::new(seeded());
        session.pending_intents.push_back(Intent::SelectCell(Position::new(0, 0)));
        session.pending_intents.push_back(Intent::MoveSelector(Direction::Right));
        session.pending_intents.push_back(Intent::MoveSelector(Direction::Down));
        session.step();
        assert_eq!(session.game_state().selector(), Position::new(1, 1));
        assert_eq!(session.game_state().tick_count(), 1);
        assert!(session.pending_intents.is_empty());
    }

    #[actix::test]
    async fn test_session_ticks_and_resets() {
        let addr = GameSession::new(seeded()).start();
        addr.send(SubmitIntent { intent: Intent::SelectCell(Position::new(2, 3)) }).await.unwrap();
        actix::clock::sleep(Duration::from_millis(TICK_MILLIS * 4)).await;

        let snapshot: Snapshot = addr.send(GetSnapshot).await.unwrap();
        assert!(snapshot.tick >= 1);
        assert_eq!(snapshot.selector, Position::new(2, 3));
        assert_eq!(snapshot.phase, Phase::Running);

        addr.send(ResetSession::default()).await.unwrap();
        let snapshot: Snapshot = addr.send(GetSnapshot).await.unwrap();
        assert_eq!(snapshot.selector, Position::new(5, 5));
    }
}
