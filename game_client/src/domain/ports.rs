use async_trait::async_trait;

use super::errors::ClientError;
use super::party::RemotePlayerView;
use super::roster::RemoteRoster;
use super::snapshot::{AuthoritativeState, AvatarState, RenderFrame};
use super::entities::MoveInput;
use super::systems::progression::{SkillChoice, SkillOffer};

// Port for the outbound half of the party connection used by the session loop.
// Dependencies point inwards: the broker client implements this trait.
#[async_trait]
pub trait PartyLink: Send + Sync {
    fn local_id(&self) -> &str;
    async fn publish_avatar(&self, state: AvatarState) -> Result<(), ClientError>;
    async fn publish_host_state(&self, state: AuthoritativeState) -> Result<(), ClientError>;
    async fn share_xp(&self, amount: f32) -> Result<(), ClientError>;
    async fn request_player_states(&self) -> Result<Vec<RemotePlayerView>, ClientError>;
}

// Port for whatever renders frames and supplies input. Called from the session
// loop between ticks only.
pub trait Frontend {
    /// Directional input for the next tick.
    fn input(&mut self, frame: &RenderFrame) -> MoveInput;

    /// Asked while a level-up is pending. `None` keeps the prompt open.
    fn choose_skill(&mut self, offers: &[SkillOffer]) -> Option<SkillChoice>;

    fn present(&mut self, frame: &RenderFrame, others: &RemoteRoster);
}
