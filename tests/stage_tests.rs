// Host-side tests for avatar replacement and overlapping loads, using a
// recording stand-in for the scene library's avatar handle.

use avatar_core::*;
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Joint(Joint, Vec3),
    Expression(Expression, f32),
    Advance(f32),
    ResetPhysics,
    LookAt,
}

#[derive(Default)]
struct SceneLog {
    attached: Vec<&'static str>,
    disposed: Vec<&'static str>,
    calls: Vec<(&'static str, Call)>,
}

type Shared = Rc<RefCell<SceneLog>>;

struct RecordingRig {
    name: &'static str,
    log: Shared,
}

impl RecordingRig {
    fn new(name: &'static str, log: &Shared) -> Self {
        Self {
            name,
            log: log.clone(),
        }
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().calls.push((self.name, call));
    }
}

impl AvatarRig for RecordingRig {
    fn set_expression(&mut self, expression: Expression, weight: f32) {
        self.record(Call::Expression(expression, weight));
    }
    fn set_joint_rotation(&mut self, joint: Joint, euler: Vec3) {
        self.record(Call::Joint(joint, euler));
    }
    fn advance(&mut self, dt_sec: f32) {
        self.record(Call::Advance(dt_sec));
    }
    fn reset_physics(&mut self) {
        self.record(Call::ResetPhysics);
    }
    fn look_at_camera(&mut self) {
        self.record(Call::LookAt);
    }
    fn attach(&mut self) {
        self.log.borrow_mut().attached.push(self.name);
    }
    fn dispose(&mut self) {
        let mut log = self.log.borrow_mut();
        log.attached.retain(|n| *n != self.name);
        log.disposed.push(self.name);
    }
}

fn slot() -> AvatarSlot<RecordingRig> {
    AvatarSlot::new(RestPose::standard())
}

#[test]
fn newest_request_wins_when_older_resolves_first() {
    let log = Shared::default();
    let mut slot = slot();
    let a = slot.begin_load("a.vrm");
    let b = slot.begin_load("b.vrm");

    assert_eq!(slot.complete_load(a, RecordingRig::new("A", &log)), LoadOutcome::Superseded);
    assert!(!slot.is_loaded());
    assert_eq!(
        slot.complete_load(b, RecordingRig::new("B", &log)),
        LoadOutcome::Installed { replaced: false }
    );
    assert_eq!(log.borrow().attached, vec!["B"]);
    assert_eq!(log.borrow().disposed, vec!["A"]);
    assert_eq!(slot.current_url(), Some("b.vrm"));
    assert_eq!(slot.current().map(|rig| rig.name), Some("B"));
}

#[test]
fn newest_request_wins_when_older_resolves_last() {
    let log = Shared::default();
    let mut slot = slot();
    let a = slot.begin_load("a.vrm");
    let b = slot.begin_load("b.vrm");

    slot.complete_load(b, RecordingRig::new("B", &log));
    assert_eq!(slot.complete_load(a, RecordingRig::new("A", &log)), LoadOutcome::Superseded);
    assert_eq!(log.borrow().attached, vec!["B"]);
    assert_eq!(slot.current_url(), Some("b.vrm"));
}

#[test]
fn sequential_load_disposes_previous_avatar() {
    let log = Shared::default();
    let mut slot = slot();
    let a = slot.begin_load("a.vrm");
    slot.complete_load(a, RecordingRig::new("A", &log));
    let b = slot.begin_load("b.vrm");
    assert_eq!(
        slot.complete_load(b, RecordingRig::new("B", &log)),
        LoadOutcome::Installed { replaced: true }
    );
    assert_eq!(log.borrow().attached, vec!["B"]);
    assert_eq!(log.borrow().disposed, vec!["A"]);
}

#[test]
fn failed_load_keeps_current_avatar() {
    let log = Shared::default();
    let mut slot = slot();
    let a = slot.begin_load("a.vrm");
    slot.complete_load(a, RecordingRig::new("A", &log));
    let b = slot.begin_load("missing.vrm");
    let err = slot.fail_load(b, "404");
    assert_eq!(
        err,
        AvatarError::AssetLoad {
            url: "missing.vrm".into(),
            reason: "404".into()
        }
    );
    assert_eq!(slot.current_url(), Some("a.vrm"));
    assert_eq!(log.borrow().attached, vec!["A"]);
}

#[test]
fn installed_avatar_gets_rest_pose_then_physics_reset_and_gaze() {
    let log = Shared::default();
    let mut slot = slot();
    let t = slot.begin_load("a.vrm");
    slot.complete_load(t, RecordingRig::new("A", &log));

    let calls: Vec<Call> = log.borrow().calls.iter().map(|(_, c)| c.clone()).collect();
    let mut expected: Vec<Call> = RestPose::standard()
        .rotations()
        .iter()
        .map(|&(j, e)| Call::Joint(j, e))
        .collect();
    expected.push(Call::ResetPhysics);
    expected.push(Call::LookAt);
    assert_eq!(calls, expected);
    assert_eq!(calls[0], Call::Joint(Joint::Hips, Vec3::new(0.0, HIPS_YAW, 0.0)));
}

#[test]
fn drive_pushes_weights_before_advancing() {
    let log = Shared::default();
    let mut slot = slot();
    let mut weights = ExpressionWeights::default();
    weights.set(Expression::Aa, 0.5);
    assert!(!slot.drive(0.016, &weights), "nothing loaded yet");

    let t = slot.begin_load("a.vrm");
    slot.complete_load(t, RecordingRig::new("A", &log));
    log.borrow_mut().calls.clear();
    assert!(slot.drive(0.016, &weights));

    let calls: Vec<Call> = log.borrow().calls.iter().map(|(_, c)| c.clone()).collect();
    assert_eq!(calls.len(), Expression::ALL.len() + 1);
    assert!(calls.contains(&Call::Expression(Expression::Aa, 0.5)));
    assert_eq!(calls.last(), Some(&Call::Advance(0.016)));
}

#[test]
fn clear_disposes_the_live_avatar() {
    let log = Shared::default();
    let mut slot = slot();
    let t = slot.begin_load("a.vrm");
    slot.complete_load(t, RecordingRig::new("A", &log));
    slot.clear();
    assert!(!slot.is_loaded());
    assert!(log.borrow().attached.is_empty());
}

#[test]
fn jittered_pose_adds_small_head_neck_spine_tilts() {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    let mut rng = StdRng::seed_from_u64(8);
    let pose = RestPose::standard().with_jitter(&mut rng);
    assert_eq!(pose.rotations().len(), 8);
    for &(joint, euler) in &pose.rotations()[5..] {
        assert!(matches!(joint, Joint::Head | Joint::Neck | Joint::Spine));
        assert!(euler.abs().max_element() <= IDLE_JITTER_SPAN / 2.0);
    }
}

#[test]
fn newest_request_failing_leaves_slot_empty_when_older_was_discarded() {
    let log = Shared::default();
    let mut slot = slot();
    let a = slot.begin_load("a.vrm");
    let b = slot.begin_load("b.vrm");

    assert_eq!(slot.complete_load(a, RecordingRig::new("A", &log)), LoadOutcome::Superseded);
    slot.fail_load(b, "network error");
    assert!(!slot.is_loaded());
    assert!(slot.current().is_none());
    assert!(log.borrow().attached.is_empty());
    assert_eq!(log.borrow().disposed, vec!["A"]);
}
