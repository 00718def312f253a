use avatar_core::{AvatarRig, Expression, Joint, SceneFraming};
use glam::Vec3;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen(module = "/js/avatar_scene.js")]
extern "C" {
    #[derive(Clone)]
    pub type AvatarScene;

    #[wasm_bindgen(constructor, catch)]
    fn new(
        fovy_deg: f32,
        znear: f32,
        zfar: f32,
        eye: &[f32],
        target: &[f32],
    ) -> Result<AvatarScene, JsValue>;

    #[wasm_bindgen(method, js_name = loadVrm)]
    fn load_vrm(this: &AvatarScene, url: &str) -> js_sys::Promise;

    #[wasm_bindgen(method)]
    fn add(this: &AvatarScene, handle: &VrmHandle);

    #[wasm_bindgen(method)]
    fn remove(this: &AvatarScene, handle: &VrmHandle);

    #[wasm_bindgen(method, js_name = bindLookAt)]
    fn bind_look_at(this: &AvatarScene, handle: &VrmHandle);

    #[wasm_bindgen(method, js_name = setLookAtHeight)]
    pub fn set_look_at_height(this: &AvatarScene, y: f32);

    #[wasm_bindgen(method)]
    pub fn resize(this: &AvatarScene, width: f64, height: f64);

    #[wasm_bindgen(method)]
    pub fn render(this: &AvatarScene);

    #[derive(Clone)]
    pub type VrmHandle;

    #[wasm_bindgen(method, js_name = setExpression)]
    fn set_expression(this: &VrmHandle, name: &str, weight: f32);

    #[wasm_bindgen(method, js_name = setJointRotation)]
    fn set_joint_rotation(this: &VrmHandle, name: &str, x: f32, y: f32, z: f32);

    #[wasm_bindgen(method)]
    fn update(this: &VrmHandle, dt_sec: f32);

    #[wasm_bindgen(method, js_name = resetSpringBones)]
    fn reset_spring_bones(this: &VrmHandle);

    #[wasm_bindgen(method)]
    fn dispose(this: &VrmHandle);
}

pub fn create_scene(framing: &SceneFraming) -> anyhow::Result<AvatarScene> {
    AvatarScene::new(
        framing.fovy_deg,
        framing.znear,
        framing.zfar,
        &framing.eye.to_array(),
        &framing.target.to_array(),
    )
    .map_err(|e| anyhow::anyhow!("scene init failed: {:?}", e))
}

/// Fetch and parse a VRM asset. The result is not attached to the scene.
pub async fn fetch_avatar(scene: &AvatarScene, url: &str) -> Result<WebAvatar, String> {
    let value = JsFuture::from(scene.load_vrm(url))
        .await
        .map_err(|e| format!("{:?}", e))?;
    Ok(WebAvatar {
        vrm: value.unchecked_into(),
        scene: scene.clone(),
        attached: false,
    })
}

/// A loaded avatar bound to the scene it will be shown in.
pub struct WebAvatar {
    vrm: VrmHandle,
    scene: AvatarScene,
    attached: bool,
}

impl AvatarRig for WebAvatar {
    fn set_expression(&mut self, expression: Expression, weight: f32) {
        self.vrm.set_expression(expression.name(), weight);
    }

    fn set_joint_rotation(&mut self, joint: Joint, euler: Vec3) {
        self.vrm
            .set_joint_rotation(joint.name(), euler.x, euler.y, euler.z);
    }

    fn advance(&mut self, dt_sec: f32) {
        self.vrm.update(dt_sec);
    }

    fn reset_physics(&mut self) {
        self.vrm.reset_spring_bones();
    }

    fn look_at_camera(&mut self) {
        self.scene.bind_look_at(&self.vrm);
    }

    fn attach(&mut self) {
        if !self.attached {
            self.scene.add(&self.vrm);
            self.attached = true;
        }
    }

    fn dispose(&mut self) {
        if self.attached {
            self.scene.remove(&self.vrm);
            self.attached = false;
        }
        self.vrm.dispose();
    }
}
