// Framework bootstrap for the headless client: logging, env config and the
// solo / host / join flows around one session.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use tokio::sync::{Notify, mpsc};
use tracing::{debug, info};

use crate::domain::systems::progression::{Enhancement, SkillChoice, SkillOffer};
use crate::domain::{
    ClientError, Element, Frontend, MoveInput, PartyLink, PartyNotice, RemoteRoster, RenderFrame,
};
use crate::frameworks::config::{self, GameMode};
use crate::interface_adapters::{BrokerClient, ChannelCapacity, normalize_broker_url};
use crate::use_cases::{
    Authority, SessionConfig, SessionOutcome, SimConfig, Simulation, run_session,
};

#[derive(Debug)]
pub enum RunError {
    Config(String),
    Client(ClientError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Config(message) => write!(f, "config error: {message}"),
            RunError::Client(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<ClientError> for RunError {
    fn from(err: ClientError) -> Self {
        RunError::Client(err)
    }
}

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Headless frontend: backs away from the nearest enemy, takes the first
/// offer and rotates through elements at tier boundaries.
#[derive(Debug, Default)]
pub struct AutoPilot {
    next_element: usize,
    frames: u64,
}

impl AutoPilot {
    const FLEE_RADIUS: f32 = 320.0;
    const REPORT_EVERY: u64 = 300;
}

impl Frontend for AutoPilot {
    fn input(&mut self, frame: &RenderFrame) -> MoveInput {
        let position = frame.player.body.position;
        let nearest = frame
            .enemies
            .iter()
            .map(|e| e.body.position)
            .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)));

        let Some(threat) = nearest.filter(|p| p.distance(position) < Self::FLEE_RADIUS) else {
            return MoveInput::default();
        };
        let away: Vec2 = position - threat;
        MoveInput {
            up: away.y < -1.0,
            down: away.y > 1.0,
            left: away.x < -1.0,
            right: away.x > 1.0,
        }
    }

    fn choose_skill(&mut self, offers: &[SkillOffer]) -> Option<SkillChoice> {
        let offer = offers.first()?;
        let enhancement = offer.enhancement_required.then(|| {
            let element = Element::ALL[self.next_element % Element::ALL.len()];
            self.next_element += 1;
            Enhancement::Element(element)
        });
        Some(SkillChoice {
            kind: offer.kind,
            enhancement,
        })
    }

    fn present(&mut self, frame: &RenderFrame, others: &RemoteRoster) {
        self.frames += 1;
        if self.frames % Self::REPORT_EVERY == 0 {
            debug!(
                game_time = frame.game_time,
                level = frame.player.level,
                health = frame.player.body.health,
                enemies = frame.enemies.len(),
                others = others.len(),
                "frame"
            );
        }
    }
}

fn session_config() -> SessionConfig {
    SessionConfig {
        frame_interval: config::FRAME_INTERVAL,
        avatar_interval: config::AVATAR_INTERVAL,
        host_state_interval: config::HOST_STATE_INTERVAL,
        prune_interval: config::PRUNE_INTERVAL,
        stale_after: config::STALE_AVATAR_AFTER,
        run_for: config::run_for(),
    }
}

fn sim_config(authority: Authority) -> SimConfig {
    SimConfig {
        seed: config::sim_seed(),
        character: config::character(),
        authority,
        ..SimConfig::default()
    }
}

fn shutdown_on_ctrl_c() -> Arc<Notify> {
    let shutdown = Arc::new(Notify::new());
    let notify = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            notify.notify_one();
        }
    });
    shutdown
}

async fn connect() -> Result<(Arc<BrokerClient>, mpsc::Receiver<PartyNotice>), RunError> {
    let url = normalize_broker_url(&config::broker_url())?;
    let capacity = ChannelCapacity {
        outbound: config::OUTBOUND_CHANNEL_CAPACITY,
        notices: config::NOTICE_CHANNEL_CAPACITY,
    };
    let (client, notices) = BrokerClient::connect(&url, config::request_timeout(), capacity).await?;
    Ok((Arc::new(client), notices))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LobbyExit {
    Started { is_host: bool },
    /// The lobby host left and `promote_to` now leads the party.
    Promoted,
}

/// Consumes lobby pushes until the game starts, or until a party update
/// names `promote_to` as host of a party still in the lobby.
async fn wait_for_start(
    notices: &mut mpsc::Receiver<PartyNotice>,
    promote_to: Option<&str>,
) -> Result<LobbyExit, RunError> {
    loop {
        match notices.recv().await {
            Some(PartyNotice::GameStarted { is_host }) => return Ok(LobbyExit::Started { is_host }),
            Some(PartyNotice::PartyUpdated(party)) => {
                info!(party_code = %party.code, players = party.players.len(), "party updated");
                if !party.game_started && promote_to.is_some_and(|id| party.is_host(id)) {
                    return Ok(LobbyExit::Promoted);
                }
            }
            Some(PartyNotice::Closed) | None => return Err(ClientError::Closed.into()),
            Some(_) => {}
        }
    }
}

/// Logs lobby pushes for `delay`, then returns.
async fn linger_in_lobby(
    notices: &mut mpsc::Receiver<PartyNotice>,
    delay: Duration,
) -> Result<(), RunError> {
    let lobby = tokio::time::sleep(delay);
    tokio::pin!(lobby);
    loop {
        tokio::select! {
            _ = &mut lobby => return Ok(()),
            notice = notices.recv() => match notice {
                Some(PartyNotice::PartyUpdated(party)) => {
                    info!(party_code = %party.code, players = party.players.len(), "party updated");
                }
                Some(PartyNotice::Closed) | None => return Err(ClientError::Closed.into()),
                Some(_) => {}
            },
        }
    }
}

async fn play_party(
    client: Arc<BrokerClient>,
    notices: mpsc::Receiver<PartyNotice>,
    authority: Authority,
) -> SessionOutcome {
    let mut sim = Simulation::new(sim_config(authority));
    let link: Arc<dyn PartyLink> = client.clone();
    let outcome = run_session(
        &mut sim,
        Some(link),
        Some(notices),
        &mut AutoPilot::default(),
        session_config(),
        shutdown_on_ctrl_c(),
    )
    .await;

    if let Err(err) = client.leave_party().await {
        debug!(error = %err, "leave after session failed");
    }
    outcome
}

pub async fn run() -> Result<SessionOutcome, RunError> {
    match config::game_mode() {
        GameMode::Solo => {
            info!(character = %config::character(), "starting solo run");
            let mut sim = Simulation::new(sim_config(Authority::Solo));
            Ok(run_session(
                &mut sim,
                None,
                None,
                &mut AutoPilot::default(),
                session_config(),
                shutdown_on_ctrl_c(),
            )
            .await)
        }
        GameMode::Host => {
            let (client, notices) = connect().await?;
            let (code, _) = client.create_party(&config::player_name()).await?;
            info!(party_code = %code, "party created; share this code");
            lead_party(client, notices).await
        }
        GameMode::Join => {
            let code = config::party_code()
                .ok_or_else(|| RunError::Config("PARTY_CODE is required to join".to_string()))?;
            let (client, mut notices) = connect().await?;
            let party = client.join_party(&code, &config::player_name()).await?;
            info!(
                party_code = %party.code,
                players = party.players.len(),
                "joined party; waiting for host"
            );

            match wait_for_start(&mut notices, Some(client.player_id())).await? {
                LobbyExit::Started { is_host } => {
                    info!(is_host, "game started");
                    let authority = if is_host { Authority::Host } else { Authority::Follower };
                    Ok(play_party(client, notices, authority).await)
                }
                LobbyExit::Promoted => {
                    info!("lobby host left; taking over the party");
                    lead_party(client, notices).await
                }
            }
        }
    }
}

/// Host side of the lobby: waits for others, starts the game and plays it.
async fn lead_party(
    client: Arc<BrokerClient>,
    mut notices: mpsc::Receiver<PartyNotice>,
) -> Result<SessionOutcome, RunError> {
    linger_in_lobby(&mut notices, config::host_start_delay()).await?;
    client.start_game().await?;
    let started = tokio::time::timeout(
        config::request_timeout(),
        wait_for_start(&mut notices, None),
    )
    .await
    .map_err(|_| ClientError::Timeout)??;

    let authority = match started {
        LobbyExit::Started { is_host: true } => Authority::Host,
        _ => Authority::Follower,
    };
    Ok(play_party(client, notices, authority).await)
}

pub async fn run_with_config() -> Result<SessionOutcome, RunError> {
    init_runtime();
    run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PartyView, SkillKind};

    #[test]
    fn autopilot_backs_away_from_the_nearest_enemy() {
        let mut sim = Simulation::new(SimConfig::default());
        sim.debug_spawn_ring(1);
        let threat = sim.enemies()[0].body.position;
        let input = AutoPilot::default().input(&sim.frame());
        assert_eq!(input.right, threat.x < -1.0);
        assert_eq!(input.left, threat.x > 1.0);
    }

    fn lobby(host: &str, game_started: bool) -> PartyNotice {
        PartyNotice::PartyUpdated(PartyView {
            code: "ABC234".into(),
            host: host.into(),
            players: Vec::new(),
            game_started,
        })
    }

    #[tokio::test]
    async fn joiner_promoted_in_the_lobby_stops_waiting() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(lobby("1", false)).await.unwrap();
        tx.send(lobby("7", false)).await.unwrap();

        let exit = wait_for_start(&mut rx, Some("7")).await.unwrap();
        assert_eq!(exit, LobbyExit::Promoted);
    }

    #[tokio::test]
    async fn lobby_wait_ends_on_start_or_close() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(lobby("1", false)).await.unwrap();
        tx.send(PartyNotice::GameStarted { is_host: false }).await.unwrap();
        assert_eq!(
            wait_for_start(&mut rx, Some("7")).await.unwrap(),
            LobbyExit::Started { is_host: false }
        );

        // Without a promotion target, host updates are only logged.
        tx.send(lobby("7", false)).await.unwrap();
        tx.send(PartyNotice::Closed).await.unwrap();
        assert!(matches!(
            wait_for_start(&mut rx, None).await,
            Err(RunError::Client(ClientError::Closed))
        ));
    }

    #[test]
    fn autopilot_cycles_elements_at_tier_boundaries() {
        let mut pilot = AutoPilot::default();
        let offers = [SkillOffer {
            kind: SkillKind::Fireball,
            current_level: 9,
            enhancement_required: true,
        }];
        let first = pilot.choose_skill(&offers).unwrap();
        let second = pilot.choose_skill(&offers).unwrap();
        assert_eq!(first.enhancement, Some(Enhancement::Element(Element::Fire)));
        assert_eq!(second.enhancement, Some(Enhancement::Element(Element::Water)));
        assert!(pilot.choose_skill(&[]).is_none());
    }
}
