//! 生物实例：烘焙 → 绑定 → 标定 → 每帧控制
//!
//! 外部只通过 [`Creature::set_control`] 写入控制方向，其余状态只读。

use glam::{Quat, Vec3};

use crate::axes::JointAxis;
use crate::blueprint::PartSpec;
use crate::control::{calibrate, ControlDirection, JointMotorController, RuntimeJointState};
use crate::error::{Result, RigError};
use crate::physics::{PhysicsBackend, SkeletonBinding};
use crate::skeleton::{bake, BakedPart, Skeleton};

/// 一个已放入物理世界的生物
pub struct Creature<B: PhysicsBackend> {
    skeleton: Skeleton,
    binding: SkeletonBinding<B>,
    /// 按骨架索引，根部件为 None
    states: Vec<Option<RuntimeJointState>>,
    controller: JointMotorController,
}

impl<B: PhysicsBackend> Creature<B> {
    /// 构建生物：任一步失败都返回错误，不返回生物实例
    ///
    /// 绑定中途失败时，已创建的刚体仍留在引擎中，由调用方处理
    pub fn build(spec: &PartSpec, position: Vec3, rotation: Quat, engine: &mut B) -> Result<Self> {
        let skeleton = bake(spec, position, rotation)?;
        let binding = SkeletonBinding::bind(&skeleton, engine)?;

        let mut states: Vec<Option<RuntimeJointState>> = skeleton
            .parts()
            .iter()
            .map(|part| part.joint.as_ref().map(|_| RuntimeJointState::new()))
            .collect();
        let bodies = binding.body_states(engine)?;
        calibrate(&skeleton, &bodies, &mut states)?;

        log::info!(
            "[Creature] '{}' 构建完成: {} 部件, {} 对称对",
            spec.id,
            skeleton.len(),
            skeleton.mirrored_pairs().len()
        );

        Ok(Self {
            skeleton,
            binding,
            states,
            controller: JointMotorController::new(),
        })
    }

    /// 一次控制 tick，必须在引擎步进之前调用
    pub fn update(&mut self, engine: &mut B) -> Result<()> {
        self.controller
            .tick(&self.skeleton, &self.binding, &mut self.states, engine)
    }

    /// 设置某个关节某个轴的控制方向
    pub fn set_control(&mut self, part: &str, axis: JointAxis, direction: ControlDirection) -> Result<()> {
        let index = self
            .skeleton
            .index_of(part)
            .ok_or_else(|| RigError::UnknownPart(part.to_string()))?;
        let state = self.states[index]
            .as_mut()
            .ok_or_else(|| RigError::NoJoint(part.to_string()))?;
        state.control[axis] = direction;
        Ok(())
    }

    /// 所有关节回到中立输入
    pub fn clear_controls(&mut self) {
        for state in self.states.iter_mut().flatten() {
            state.control = Default::default();
        }
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn binding(&self) -> &SkeletonBinding<B> {
        &self.binding
    }

    pub fn part(&self, name: &str) -> Option<&BakedPart> {
        self.skeleton.get(name)
    }

    pub fn joint_state(&self, name: &str) -> Option<&RuntimeJointState> {
        let index = self.skeleton.index_of(name)?;
        self.states[index].as_ref()
    }

    pub fn mirrored_pairs(&self) -> Vec<(String, String)> {
        self.skeleton.mirrored_pairs()
    }

    pub fn tick_count(&self) -> u64 {
        self.controller.tick_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::mock::MockBackend;
    use crate::physics::RapierWorld;
    use crate::presets;

    #[test]
    fn test_symmetric_arm_scenario() {
        let mut engine = MockBackend::default();
        let creature = Creature::build(&presets::symmetric_arm(), Vec3::Y, Quat::IDENTITY, &mut engine).unwrap();
        let skeleton = creature.skeleton();
        assert_eq!(skeleton.len(), 7);
        assert_eq!(skeleton.joint_count(), 6);
        assert_eq!(
            creature.mirrored_pairs(),
            vec![
                ("l_shoulder".to_string(), "r_shoulder".to_string()),
                ("l_upper_arm".to_string(), "r_upper_arm".to_string()),
                ("l_lower_arm".to_string(), "r_lower_arm".to_string()),
            ]
        );
        for (_, state) in skeleton.parts().iter().zip(&creature.states).skip(1) {
            assert!(state.as_ref().unwrap().calibrated);
        }
    }

    #[test]
    fn test_set_control_errors() {
        let mut engine = MockBackend::default();
        let mut creature =
            Creature::build(&presets::symmetric_arm(), Vec3::Y, Quat::IDENTITY, &mut engine).unwrap();
        assert!(matches!(
            creature.set_control("tail", JointAxis::Yaw, ControlDirection::Positive),
            Err(RigError::UnknownPart(_))
        ));
        assert!(matches!(
            creature.set_control("chest", JointAxis::Yaw, ControlDirection::Positive),
            Err(RigError::NoJoint(_))
        ));
        creature
            .set_control("l_lower_arm", JointAxis::Pitch, ControlDirection::Negative)
            .unwrap();
        assert_eq!(
            creature.joint_state("l_lower_arm").unwrap().control.pitch,
            ControlDirection::Negative
        );
        creature.clear_controls();
        assert_eq!(
            creature.joint_state("l_lower_arm").unwrap().control.pitch,
            ControlDirection::Neutral
        );
    }

    #[test]
    fn test_update_writes_motors() {
        let mut engine = MockBackend::default();
        let mut creature =
            Creature::build(&presets::symmetric_arm(), Vec3::Y, Quat::IDENTITY, &mut engine).unwrap();
        creature
            .set_control("l_lower_arm", JointAxis::Pitch, ControlDirection::Positive)
            .unwrap();
        creature.update(&mut engine).unwrap();
        assert_eq!(creature.tick_count(), 1);
        assert_eq!(creature.joint_state("l_lower_arm").unwrap().drive.pitch, 1.0);
        assert_eq!(creature.joint_state("r_lower_arm").unwrap().drive.pitch, 0.0);
    }

    #[test]
    fn test_missing_joint_halts_build() {
        let spec = PartSpec::new("root", crate::blueprint::Size::length(0.2))
            .with_child(PartSpec::new("loose", crate::blueprint::Size::length(0.1)));
        let mut engine = MockBackend::default();
        assert!(Creature::build(&spec, Vec3::ZERO, Quat::IDENTITY, &mut engine).is_err());
        assert!(engine.bodies.is_empty());
    }

    #[test]
    fn test_rapier_humanoid_smoke() {
        let mut world = RapierWorld::new();
        world.add_floor(0.0);
        let mut creature =
            Creature::build(&presets::simple_human_top(), Vec3::new(0.0, 1.2, 0.0), Quat::IDENTITY, &mut world)
                .unwrap();
        assert_eq!(world.joint_count(), creature.skeleton().joint_count());

        creature
            .set_control("l_upper_arm", JointAxis::Pitch, ControlDirection::Positive)
            .unwrap();
        for _ in 0..30 {
            creature.update(&mut world).unwrap();
            world.step();
        }
        assert_eq!(creature.tick_count(), 30);
        for part in creature.skeleton().parts() {
            if let Some(state) = creature.joint_state(&part.name) {
                assert!(state.deviation.yaw.is_finite());
                assert!(state.deviation.pitch.is_finite());
                assert!(state.deviation.roll.is_finite());
                assert!(state.max_torque >= 0.0);
            }
        }
    }
}
