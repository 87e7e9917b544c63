//! Notice delivery
//!
//! Every seat gets a courier task that hands its player's notices over in
//! order, each bounded by the notification timeout. The referee only
//! enqueues, so a slow observer never holds up the match.

use std::time::Duration;

use fish_core::{GameState, TeamColor};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::player::PlayerRef;
use crate::referee::bounded;

#[derive(Clone, Debug)]
pub(crate) enum Notice {
    Setup {
        color: TeamColor,
        turn_order: Vec<TeamColor>,
        state: GameState,
    },
    Starting(GameState),
    Changed(GameState),
    Kicked,
    GameOver { won: bool },
}

impl Notice {
    fn kind(&self) -> &'static str {
        match self {
            Notice::Setup { .. } => "setup",
            Notice::Starting(_) => "game_starting",
            Notice::Changed(_) => "state_changed",
            Notice::Kicked => "kicked",
            Notice::GameOver { .. } => "game_over",
        }
    }

    async fn deliver(self, player: PlayerRef) -> anyhow::Result<()> {
        match self {
            Notice::Setup {
                color,
                turn_order,
                state,
            } => player.setup(color, &turn_order, &state).await,
            Notice::Starting(state) => player.game_starting(&state).await,
            Notice::Changed(state) => player.state_changed(&state).await,
            Notice::Kicked => player.kicked().await,
            Notice::GameOver { won } => player.game_over(won).await,
        }
    }
}

/// Spawn the courier for one player
///
/// The courier ends once every sender is dropped and the queue is drained.
pub(crate) fn spawn_courier(player: PlayerRef, limit: Duration) -> (mpsc::UnboundedSender<Notice>, JoinHandle<()>) {
    let (outbox, mut inbox) = mpsc::unbounded_channel::<Notice>();
    let courier = tokio::spawn(async move {
        while let Some(notice) = inbox.recv().await {
            let kind = notice.kind();
            if let Err(error) = bounded(limit, notice.deliver(player.clone())).await {
                debug!(player = player.name(), notice = kind, %error, "notification failed");
            }
        }
    });
    (outbox, courier)
}

/// Let couriers finish their queues, aborting whatever is left after `grace`
pub(crate) async fn settle(couriers: Vec<JoinHandle<()>>, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;
    for courier in couriers {
        let abort = courier.abort_handle();
        if tokio::time::timeout_at(deadline, courier).await.is_err() {
            abort.abort();
        }
    }
}
