use glam::Vec2;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use super::sync;
use crate::domain::effects::{StatusEffectEvent, decay_effects};
use crate::domain::entities::{Character, Enemy, MoveInput, Player, Projectile};
use crate::domain::errors::ChoiceError;
use crate::domain::snapshot::{AuthoritativeState, AvatarState, RenderFrame, SimPhase};
use crate::domain::systems::camera::{self, Viewport};
use crate::domain::systems::progression::{self, SkillChoice, SkillOffer};
use crate::domain::systems::skills::{self, OrbitState};
use crate::domain::systems::spawner::{self, EnemyIds, SpawnState};
use crate::domain::systems::{collision, movement};
use crate::domain::tuning::GameTuning;

/// Who owns the enemy population of this simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Authority {
    /// Single player: spawns locally, publishes nothing.
    #[default]
    Solo,
    /// Party host: spawns locally and publishes snapshots.
    Host,
    /// Party member: enemies come from the host's snapshots.
    Follower,
}

impl Authority {
    pub fn spawns(self) -> bool {
        !matches!(self, Authority::Follower)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Seeds spawning and chain rolls. Same seed, same inputs, same run.
    pub seed: u64,
    pub viewport: Viewport,
    pub character: Character,
    pub authority: Authority,
    pub tuning: GameTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            viewport: Viewport::default(),
            character: Character::default(),
            authority: Authority::default(),
            tuning: GameTuning::default(),
        }
    }
}

/// Things a tick produced that the outside world may care about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// XP earned by local kills this tick. Party members receive it verbatim.
    XpGained(f32),
    LeveledUp { level: u32 },
    GameOver,
}

/// One fixed-step simulation instance. Everything is owned here and only
/// mutated from `tick` or between ticks.
pub struct Simulation {
    tuning: GameTuning,
    viewport: Viewport,
    authority: Authority,
    rng: ChaCha8Rng,
    ids: EnemyIds,
    spawn: SpawnState,
    orbit: OrbitState,
    player: Player,
    camera: Vec2,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    orbiting: Vec<Projectile>,
    effects: Vec<StatusEffectEvent>,
    game_time: f32,
    phase: SimPhase,
    pending_choices: u32,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let ids = EnemyIds::new(rng.next_u32());
        let player = Player::new(
            &config.tuning.player,
            &config.tuning.skills,
            config.character.starting_skill(),
        );
        let camera = player.body.position
            - Vec2::new(config.viewport.width, config.viewport.height) / 2.0;

        Self {
            tuning: config.tuning,
            viewport: config.viewport,
            authority: config.authority,
            rng,
            ids,
            spawn: SpawnState::default(),
            orbit: OrbitState::default(),
            player,
            camera,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            orbiting: Vec::new(),
            effects: Vec::new(),
            game_time: 0.0,
            phase: SimPhase::Running,
            pending_choices: 0,
        }
    }

    /// Advances one step. Does nothing unless the phase is `Running`.
    pub fn tick(&mut self, input: MoveInput, dt: f32) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.phase != SimPhase::Running {
            return events;
        }

        self.game_time += dt;
        let now = self.game_time;

        movement::tick_player(&mut self.player, input, dt);
        self.camera = camera::follow(
            self.camera,
            self.player.body.position,
            self.viewport,
            self.tuning.player.camera_dead_zone,
        );

        if self.authority.spawns() {
            let wave = spawner::tick_spawner(
                &mut self.spawn,
                &mut self.rng,
                &mut self.ids,
                self.player.level,
                self.camera,
                self.viewport,
                dt,
                &self.tuning.enemy,
                &self.tuning.spawn,
            );
            if !wave.is_empty() {
                debug!(count = wave.len(), level = self.player.level, "wave spawned");
                self.enemies.extend(wave);
            }
        }

        movement::tick_enemies(
            &mut self.enemies,
            self.player.body.position,
            now,
            self.tuning.enemy.slow_factor,
            dt,
        );

        let cast = skills::tick_skills(
            &mut self.player,
            &mut self.enemies,
            &mut self.projectiles,
            &mut self.orbiting,
            &mut self.orbit,
            now,
            dt,
            &self.tuning.skills,
        );

        movement::tick_projectiles(&mut self.projectiles, dt);

        let hits = collision::resolve_collisions(
            &mut self.player,
            &mut self.enemies,
            &mut self.projectiles,
            &self.orbiting,
            now,
            dt,
            &mut self.rng,
            &self.tuning.skills,
        );

        decay_effects(&mut self.effects, dt);
        self.effects.extend(cast.effects);
        self.effects.extend(hits.effects);

        let xp = cast.xp + hits.xp;
        if xp > 0.0 {
            events.push(SimEvent::XpGained(xp));
            if self.credit_xp(xp) > 0 {
                events.push(SimEvent::LeveledUp {
                    level: self.player.level,
                });
            }
        }

        if !self.player.body.is_alive() {
            info!(game_time = self.game_time, level = self.player.level, "player died");
            self.phase = SimPhase::GameOver;
            events.push(SimEvent::GameOver);
        }

        events
    }

    fn credit_xp(&mut self, amount: f32) -> u32 {
        let levels = progression::gain_xp(&mut self.player, amount, &self.tuning.player);
        if levels > 0 {
            self.queue_choices(levels);
        }
        levels
    }

    fn queue_choices(&mut self, count: u32) {
        self.pending_choices += count;
        if self.phase == SimPhase::Running {
            self.phase = SimPhase::LevelingUp;
        }
    }

    /// XP relayed from another party member. Returns the levels gained.
    pub fn receive_shared_xp(&mut self, amount: f32) -> u32 {
        if self.phase == SimPhase::GameOver || amount <= 0.0 {
            return 0;
        }
        self.credit_xp(amount)
    }

    pub fn pause(&mut self) {
        if self.phase == SimPhase::Running {
            self.phase = SimPhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == SimPhase::Paused {
            self.phase = if self.pending_choices > 0 {
                SimPhase::LevelingUp
            } else {
                SimPhase::Running
            };
        }
    }

    pub fn offers(&self) -> Vec<SkillOffer> {
        progression::offers(&self.player, &self.tuning.skills)
    }

    /// Resolves one pending level-up. The last one returns the simulation to
    /// `Running`.
    pub fn choose_skill(&mut self, choice: SkillChoice) -> Result<(), ChoiceError> {
        if self.pending_choices == 0 {
            return Err(ChoiceError::NoPendingChoice);
        }
        progression::apply_choice(&mut self.player, choice, &self.tuning.skills)?;
        self.pending_choices -= 1;
        if self.pending_choices == 0 && self.phase == SimPhase::LevelingUp {
            self.phase = SimPhase::Running;
        }
        Ok(())
    }

    /// Replaces the enemy list with the host's. Ignored unless this
    /// simulation follows.
    pub fn apply_authoritative(&mut self, state: &AuthoritativeState) -> bool {
        if self.authority != Authority::Follower {
            return false;
        }
        let local = std::mem::take(&mut self.enemies);
        self.enemies = sync::reconcile_enemies(local, &state.enemies, &self.tuning.enemy);
        self.game_time = state.game_time;
        true
    }

    /// Snapshot to publish, if this simulation is the party host.
    pub fn host_snapshot(&self) -> Option<AuthoritativeState> {
        (self.authority == Authority::Host)
            .then(|| sync::capture_authoritative(&self.enemies, self.game_time))
    }

    pub fn avatar_state(&self) -> AvatarState {
        sync::avatar_state(&self.player)
    }

    pub fn set_authority(&mut self, authority: Authority) {
        if self.authority != authority {
            info!(from = ?self.authority, to = ?authority, "authority changed");
            self.authority = authority;
        }
    }

    pub fn authority(&self) -> Authority {
        self.authority
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn pending_choices(&self) -> u32 {
        self.pending_choices
    }

    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn frame(&self) -> RenderFrame {
        RenderFrame {
            player: self.player.clone(),
            camera: self.camera,
            enemies: self.enemies.clone(),
            projectiles: self.projectiles.clone(),
            orbiting: self.orbiting.clone(),
            status_effects: self.effects.clone(),
            game_time: self.game_time,
            phase: self.phase,
        }
    }

    // Debug commands.

    pub fn debug_add_xp(&mut self, amount: f32) -> u32 {
        self.receive_shared_xp(amount)
    }

    pub fn debug_heal(&mut self) {
        if self.phase != SimPhase::GameOver {
            self.player.body.health = self.player.body.max_health;
        }
    }

    pub fn debug_spawn_ring(&mut self, count: usize) {
        let ring = spawner::spawn_ring(
            &mut self.rng,
            &mut self.ids,
            self.player.body.position,
            count,
            self.player.level,
            &self.tuning.enemy,
            &self.tuning.spawn,
        );
        self.enemies.extend(ring);
    }

    /// Opens a level-up prompt without touching level or XP.
    pub fn debug_force_level_up(&mut self) {
        if self.phase != SimPhase::GameOver {
            self.queue_choices(1);
        }
    }
}
