//! Match referee
//!
//! Drives one match through `Setup -> Placement -> Movement -> Complete`.
//! Players are asked for actions one at a time in turn order. Each call runs
//! on its own task and races a timer; a late answer is aborted and never
//! reaches the state. Invalid proposals, player errors, panics and timeouts
//! all eject the player, removing its seat and its team together so the two
//! lists stay index-aligned. Notices are queued to each seat's courier and
//! never awaited on the turn loop.

use std::future::Future;
use std::time::Duration;

use fish_core::{penguins_per_player, Board, BoardError, GameState, RuleError, TeamColor};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::config::RefereeConfig;
use crate::notice::{settle, spawn_courier, Notice};
use crate::player::PlayerRef;
use crate::report::{GameEndReport, PlayerResult};

// ============================================================================
// ERRORS
// ============================================================================

/// Why a solicited action was rejected; every variant ejects the player
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error("player returned an error: {0}")]
    Failed(anyhow::Error),
    #[error("player task panicked or was cancelled")]
    Panicked,
    #[error("no answer within {0:?}")]
    TimedOut(Duration),
}

/// Failures that stop a match from running at all
#[derive(Debug, Error)]
pub enum RefereeError {
    #[error("{found} players cannot play, expected {min} to {max}")]
    PlayerCount { found: usize, min: usize, max: usize },
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("state has {teams} teams for {players} players")]
    TeamMismatch { teams: usize, players: usize },
    #[error("cannot run the {requested:?} phase during {current:?}")]
    OutOfOrder { current: Phase, requested: Phase },
    #[error(transparent)]
    Rule(#[from] RuleError),
}

// ============================================================================
// MATCH STATE
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Placement,
    Movement,
    Complete,
}

/// A player still in the match and the color it plays
#[derive(Clone)]
pub struct Seat {
    pub player: PlayerRef,
    pub color: TeamColor,
    outbox: mpsc::UnboundedSender<Notice>,
}

impl Seat {
    fn post(&self, notice: Notice) {
        if self.outbox.send(notice).is_err() {
            debug!(player = self.player.name(), "courier gone, notice dropped");
        }
    }
}

/// A match in progress
///
/// `seats[i]` always plays `state.teams()[i]`.
pub struct Match {
    phase: Phase,
    player_count: usize,
    seats: Vec<Seat>,
    kicked: Vec<PlayerRef>,
    state: GameState,
    couriers: Vec<JoinHandle<()>>,
}

impl Match {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn active_names(&self) -> Vec<&str> {
        self.seats.iter().map(|s| s.player.name()).collect()
    }

    pub fn kicked_names(&self) -> Vec<&str> {
        self.kicked.iter().map(|p| p.name()).collect()
    }

    fn expect_phase(&self, requested: Phase) -> Result<(), RefereeError> {
        if self.phase != requested {
            return Err(RefereeError::OutOfOrder {
                current: self.phase,
                requested,
            });
        }
        Ok(())
    }
}

// ============================================================================
// REFEREE
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct Referee {
    config: RefereeConfig,
}

impl Referee {
    pub fn new(config: RefereeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RefereeConfig {
        &self.config
    }

    // ========================================================================
    // LEVEL 1: WHOLE MATCHES
    // ========================================================================

    /// Run a match on a generated board sized from the configuration
    ///
    /// Players must already be in turn order (see
    /// [`order_players`](crate::order_players)).
    pub async fn run_match(&self, players: Vec<PlayerRef>) -> Result<GameEndReport, RefereeError> {
        self.check_player_count(players.len())?;
        let mut rng = self.config.rng();
        let board = Board::for_players(
            self.config.rows,
            self.config.columns,
            players.len(),
            self.config.max_fish,
            &mut rng,
        )?;
        self.run_match_with_board(players, board).await
    }

    /// Run a match on a supplied board
    pub async fn run_match_with_board(
        &self,
        players: Vec<PlayerRef>,
        board: Board,
    ) -> Result<GameEndReport, RefereeError> {
        let mut game = self.setup(players, board).await?;
        self.placement_phase(&mut game).await?;
        self.movement_phase(&mut game).await?;
        self.finish(game).await
    }

    /// Run the movement phase from a state whose penguins are already placed
    pub async fn run_match_with_state(
        &self,
        players: Vec<PlayerRef>,
        state: GameState,
    ) -> Result<GameEndReport, RefereeError> {
        let mut game = self.resume(players, state).await?;
        self.movement_phase(&mut game).await?;
        self.finish(game).await
    }

    // ========================================================================
    // LEVEL 2: PHASES
    // ========================================================================

    /// Empty teams in palette order, one per player
    pub fn initial_state(&self, board: Board, players: usize) -> GameState {
        let colors = &self.config.palette[..players.min(self.config.palette.len())];
        GameState::new(board, colors)
    }

    /// Seat the players, hand out colors and announce the starting state
    pub async fn setup(&self, players: Vec<PlayerRef>, board: Board) -> Result<Match, RefereeError> {
        self.check_player_count(players.len())?;
        let state = self.initial_state(board, players.len());
        let mut game = self.seat(players, state)?;
        info!(
            players = game.player_count,
            rows = game.state.board().rows(),
            columns = game.state.board().columns(),
            "match setup"
        );
        self.announce_colors(&game);
        game.phase = Phase::Placement;
        Ok(game)
    }

    /// Seat players on an existing state, ready for the movement phase
    pub async fn resume(&self, players: Vec<PlayerRef>, state: GameState) -> Result<Match, RefereeError> {
        self.check_player_count(players.len())?;
        let mut game = self.seat(players, state)?;
        info!(players = game.player_count, turn = game.state.turn(), "match resumed");
        self.announce_colors(&game);
        game.phase = Phase::Movement;
        Ok(game)
    }

    /// `6 - players` rounds, each asking every remaining player once
    pub async fn placement_phase(&self, game: &mut Match) -> Result<(), RefereeError> {
        game.expect_phase(Phase::Placement)?;
        let rounds = penguins_per_player(game.player_count);
        info!(rounds, "placement phase");

        for _ in 0..rounds {
            let turns = game.seats.len();
            for _ in 0..turns {
                let index = game.state.players_turn();
                let Some(seat) = game.seats.get(index).cloned() else {
                    break;
                };
                let player = seat.player.clone();
                let snapshot = game.state.clone();
                let outcome = self
                    .solicit(async move { player.propose_placement(&snapshot).await })
                    .await
                    .and_then(|pos| Ok((pos, game.state.place_penguin(pos)?)));

                match outcome {
                    Ok((pos, next)) => {
                        debug!(player = seat.player.name(), %pos, turn = next.turn(), "placement accepted");
                        game.state = next;
                        self.broadcast(game);
                    }
                    Err(error) => self.eject(game, index, error)?,
                }
            }
        }

        game.phase = Phase::Movement;
        Ok(())
    }

    /// Ask for moves until nobody can move, skipping stuck teams
    pub async fn movement_phase(&self, game: &mut Match) -> Result<(), RefereeError> {
        game.expect_phase(Phase::Movement)?;
        info!(players = game.seats.len(), "movement phase");
        self.announce_start(game);

        while game.state.can_any_penguin_move() {
            let index = game.state.players_turn();
            let Some(seat) = game.seats.get(index).cloned() else {
                break;
            };

            if !game.state.can_team_move(index) {
                game.state = game.state.skip_turn()?;
                debug!(player = seat.player.name(), "no legal move, turn skipped");
                self.broadcast(game);
                continue;
            }

            let player = seat.player.clone();
            let snapshot = game.state.clone();
            let outcome = self
                .solicit(async move { player.propose_move(&snapshot).await })
                .await
                .and_then(|mv| Ok((mv, game.state.move_penguin(mv)?)));

            match outcome {
                Ok((mv, next)) => {
                    debug!(player = seat.player.name(), %mv, turn = next.turn(), "move accepted");
                    game.state = next;
                    self.broadcast(game);
                }
                Err(error) => self.eject(game, index, error)?,
            }
        }

        game.phase = Phase::Complete;
        Ok(())
    }

    /// Split the remaining players into winners and losers and tell them
    ///
    /// Waits at most one notification timeout for queued notices to drain.
    pub async fn finish(&self, game: Match) -> Result<GameEndReport, RefereeError> {
        game.expect_phase(Phase::Complete)?;
        if game.seats.len() != game.state.teams().len() {
            return Err(RefereeError::TeamMismatch {
                teams: game.state.teams().len(),
                players: game.seats.len(),
            });
        }

        let results: Vec<PlayerResult> = game
            .seats
            .iter()
            .zip(game.state.teams())
            .map(|(seat, team)| PlayerResult {
                player: seat.player.clone(),
                color: seat.color,
                score: team.score,
            })
            .collect();
        let best = results.iter().map(|r| r.score).max();
        let (winners, losers): (Vec<_>, Vec<_>) =
            results.into_iter().partition(|r| Some(r.score) == best);

        for seat in &game.seats {
            let won = winners.iter().any(|r| r.color == seat.color);
            seat.post(Notice::GameOver { won });
        }

        let Match {
            seats,
            kicked,
            state,
            couriers,
            ..
        } = game;
        drop(seats);
        settle(couriers, self.config.notify_timeout).await;

        let report = GameEndReport {
            winners,
            losers,
            kicked,
            final_state: state,
        };
        info!(
            winners = ?report.winner_names(),
            kicked = ?report.kicked_names(),
            turns = report.final_state.turn(),
            "match complete"
        );
        Ok(report)
    }

    // ========================================================================
    // LEVEL 3: SEATS AND PLAYER CALLS
    // ========================================================================

    fn check_player_count(&self, found: usize) -> Result<(), RefereeError> {
        if !self.config.accepts_player_count(found) {
            return Err(RefereeError::PlayerCount {
                found,
                min: self.config.min_players,
                max: self.config.effective_max_players(),
            });
        }
        Ok(())
    }

    fn seat(&self, players: Vec<PlayerRef>, state: GameState) -> Result<Match, RefereeError> {
        if players.len() != state.teams().len() {
            return Err(RefereeError::TeamMismatch {
                teams: state.teams().len(),
                players: players.len(),
            });
        }
        let mut couriers = Vec::with_capacity(players.len());
        let seats = players
            .into_iter()
            .zip(state.teams())
            .map(|(player, team)| {
                let (outbox, courier) = spawn_courier(player.clone(), self.config.notify_timeout);
                couriers.push(courier);
                Seat {
                    player,
                    color: team.color,
                    outbox,
                }
            })
            .collect::<Vec<_>>();
        Ok(Match {
            phase: Phase::Setup,
            player_count: seats.len(),
            seats,
            kicked: Vec::new(),
            state,
            couriers,
        })
    }

    fn eject(&self, game: &mut Match, index: usize, error: ActionError) -> Result<(), RefereeError> {
        if index >= game.seats.len() {
            return Err(RefereeError::TeamMismatch {
                teams: game.state.teams().len(),
                players: game.seats.len(),
            });
        }
        game.state = game.state.remove_team(index)?;
        let seat = game.seats.remove(index);
        warn!(
            player = seat.player.name(),
            color = %seat.color,
            phase = ?game.phase,
            %error,
            "player ejected"
        );

        seat.post(Notice::Kicked);
        game.kicked.push(seat.player);
        self.broadcast(game);
        Ok(())
    }

    fn announce_colors(&self, game: &Match) {
        let turn_order: Vec<TeamColor> = game.seats.iter().map(|s| s.color).collect();
        for seat in &game.seats {
            seat.post(Notice::Setup {
                color: seat.color,
                turn_order: turn_order.clone(),
                state: game.state.clone(),
            });
        }
    }

    fn announce_start(&self, game: &Match) {
        for seat in &game.seats {
            seat.post(Notice::Starting(game.state.clone()));
        }
    }

    fn broadcast(&self, game: &Match) {
        for seat in &game.seats {
            seat.post(Notice::Changed(game.state.clone()));
        }
    }

    async fn solicit<T, F>(&self, call: F) -> Result<T, ActionError>
    where
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        bounded(self.config.action_timeout, call).await
    }
}

// ============================================================================
// LEVEL 4: BOUNDED CALLS
// ============================================================================

/// Run `call` on its own task, giving up after `limit`
///
/// The task is aborted on timeout or when this future is dropped, so
/// whatever it eventually produces is dropped unseen.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, ActionError>
where
    F: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::spawn(call);
    let _abort = AbortOnDrop(task.abort_handle());
    match tokio::time::timeout(limit, task).await {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(error))) => Err(ActionError::Failed(error)),
        Ok(Err(_)) => Err(ActionError::Panicked),
        Err(_) => Err(ActionError::TimedOut(limit)),
    }
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::house::HousePlayer;

    fn house(name: &str) -> PlayerRef {
        Arc::new(HousePlayer::new(name))
    }

    async fn answer() -> anyhow::Result<u32> {
        Ok(7)
    }

    async fn refuse() -> anyhow::Result<()> {
        Err(anyhow::anyhow!("nope"))
    }

    async fn explode() -> anyhow::Result<()> {
        panic!("boom")
    }

    async fn dawdle() -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(())
    }

    #[tokio::test]
    async fn test_bounded_outcomes() {
        let limit = Duration::from_millis(50);
        assert_eq!(bounded(limit, answer()).await.unwrap(), 7);
        assert!(matches!(bounded(limit, refuse()).await, Err(ActionError::Failed(_))));
        assert!(matches!(bounded(limit, explode()).await, Err(ActionError::Panicked)));
        assert!(matches!(bounded(limit, dawdle()).await, Err(ActionError::TimedOut(_))));
    }

    #[tokio::test]
    async fn test_setup_assigns_palette_colors() {
        let referee = Referee::default();
        let board = Board::uniform(4, 4, 1).unwrap();
        let game = referee
            .setup(vec![house("a"), house("b"), house("c")], board)
            .await
            .unwrap();
        assert_eq!(game.phase(), Phase::Placement);
        let colors: Vec<TeamColor> = game.seats().iter().map(|s| s.color).collect();
        assert_eq!(colors, vec![TeamColor::Black, TeamColor::Red, TeamColor::White]);
        assert_eq!(game.state().teams().len(), 3);
    }

    #[tokio::test]
    async fn test_player_count_bounds() {
        let referee = Referee::default();
        let board = Board::uniform(4, 4, 1).unwrap();
        let result = referee.setup(vec![house("solo")], board).await;
        assert!(matches!(
            result,
            Err(RefereeError::PlayerCount { found: 1, min: 2, max: 4 })
        ));
    }

    #[tokio::test]
    async fn test_phases_run_in_order() {
        let referee = Referee::default();
        let board = Board::uniform(4, 4, 1).unwrap();
        let mut game = referee.setup(vec![house("a"), house("b")], board).await.unwrap();
        assert!(matches!(
            referee.movement_phase(&mut game).await,
            Err(RefereeError::OutOfOrder {
                current: Phase::Placement,
                requested: Phase::Movement
            })
        ));
        referee.placement_phase(&mut game).await.unwrap();
        assert_eq!(game.phase(), Phase::Movement);
        assert_eq!(game.state().turn(), 8);
        assert!(game.state().teams().iter().all(|t| t.penguins.len() == 4));
    }

    #[tokio::test]
    async fn test_resume_requires_matching_teams() {
        let referee = Referee::default();
        let state = GameState::new(Board::uniform(4, 4, 1).unwrap(), &[TeamColor::Black]);
        let result = referee.resume(vec![house("a"), house("b")], state).await;
        assert!(matches!(
            result,
            Err(RefereeError::TeamMismatch { teams: 1, players: 2 })
        ));
    }
}
