//! Ownership of the single live avatar and ordering of overlapping loads.
//!
//! Every `load` call takes a [`LoadTicket`]. Only the newest ticket may
//! install its avatar; a completion for an older ticket is disposed on
//! arrival, so two loads racing can never leave two avatars in the scene.

use crate::error::AvatarError;
use crate::pose::RestPose;
use crate::rig::{AvatarRig, ExpressionWeights};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    url: String,
}

impl LoadTicket {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The avatar is now the live one; the previous one (if any) was disposed.
    Installed { replaced: bool },
    /// A newer load was requested meanwhile; the avatar was disposed.
    Superseded,
}

pub struct AvatarSlot<R: AvatarRig> {
    current: Option<R>,
    current_url: Option<String>,
    requested: u64,
    rest_pose: RestPose,
}

impl<R: AvatarRig> Default for AvatarSlot<R> {
    fn default() -> Self {
        Self::new(RestPose::standard())
    }
}

impl<R: AvatarRig> AvatarSlot<R> {
    pub fn new(rest_pose: RestPose) -> Self {
        Self {
            current: None,
            current_url: None,
            requested: 0,
            rest_pose,
        }
    }

    pub fn begin_load(&mut self, url: &str) -> LoadTicket {
        self.requested += 1;
        log::info!("[load] #{} requesting {}", self.requested, url);
        LoadTicket {
            generation: self.requested,
            url: url.to_owned(),
        }
    }

    pub fn complete_load(&mut self, ticket: LoadTicket, mut rig: R) -> LoadOutcome {
        if ticket.generation != self.requested {
            log::info!(
                "[load] #{} superseded by #{}; discarding {}",
                ticket.generation,
                self.requested,
                ticket.url
            );
            rig.dispose();
            return LoadOutcome::Superseded;
        }
        let replaced = match self.current.take() {
            Some(mut old) => {
                old.dispose();
                true
            }
            None => false,
        };
        rig.attach();
        self.rest_pose.apply(&mut rig);
        rig.reset_physics();
        rig.look_at_camera();
        log::info!("[load] #{} installed {}", ticket.generation, ticket.url);
        self.current = Some(rig);
        self.current_url = Some(ticket.url);
        LoadOutcome::Installed { replaced }
    }

    /// Record a failed load. Whatever avatar was live stays live; an older
    /// load already discarded in favour of this one is not brought back.
    pub fn fail_load(&mut self, ticket: LoadTicket, reason: impl Into<String>) -> AvatarError {
        let err = AvatarError::AssetLoad {
            url: ticket.url,
            reason: reason.into(),
        };
        log::error!("[load] #{} failed: {}", ticket.generation, err);
        err
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&R> {
        self.current.as_ref()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Per-frame update: push the weight snapshot, then advance pose and
    /// physics (which also resolves the expressions). Returns `false` when no
    /// avatar is loaded yet.
    pub fn drive(&mut self, dt_sec: f32, weights: &ExpressionWeights) -> bool {
        let Some(rig) = self.current.as_mut() else {
            return false;
        };
        for (expression, weight) in weights.iter() {
            rig.set_expression(expression, weight);
        }
        rig.advance(dt_sec);
        true
    }

    pub fn clear(&mut self) {
        if let Some(mut old) = self.current.take() {
            old.dispose();
        }
        self.current_url = None;
    }
}
