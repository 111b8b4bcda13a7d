//! 基础力矩标定
//!
//! 单次后序遍历：每个关节的基础力矩由“到末端”的部件质量和其余部件质量，
//! 分别乘以各自质心到关节的距离并加权得到。

use crate::error::{Result, RigError};
use crate::math::center_of_mass;
use crate::physics::BodyState;
use crate::skeleton::Skeleton;

use super::RuntimeJointState;

/// 标定所有关节的力矩上下限
///
/// `bodies` 与 `states` 均按骨架索引排列，只能执行一次。
pub fn calibrate(
    skeleton: &Skeleton,
    bodies: &[BodyState],
    states: &mut [Option<RuntimeJointState>],
) -> Result<()> {
    for len in [bodies.len(), states.len()] {
        if len != skeleton.len() {
            return Err(RigError::BodyCountMismatch {
                expected: skeleton.len(),
                actual: len,
            });
        }
    }
    if states.iter().flatten().any(|s| s.calibrated) {
        return Err(RigError::AlreadyCalibrated);
    }

    let total_mass: f32 = bodies.iter().map(BodyState::mass).sum();

    // 后序：子树集合在子节点处先算好，父节点直接合并
    let mut to_end: Vec<Vec<usize>> = vec![Vec::new(); skeleton.len()];
    let mut in_set = vec![false; skeleton.len()];

    for index in skeleton.postorder() {
        let part = &skeleton.parts()[index];

        let mut set = vec![index];
        for &child in &part.children {
            set.append(&mut to_end[child]);
        }

        if let (Some(joint), Some(state)) = (&part.joint, states[index].as_mut()) {
            let body = &bodies[index];
            let joint_position = body.position + body.rotation * joint.child_anchor;

            for &i in &set {
                in_set[i] = true;
            }
            let to_end_mass: f32 = set.iter().map(|&i| bodies[i].mass()).sum();
            let to_end_center = center_of_mass(set.iter().map(|&i| (bodies[i].mass(), bodies[i].center_of_mass)));
            let others_center = center_of_mass(
                bodies
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !in_set[*i])
                    .map(|(_, b)| (b.mass(), b.center_of_mass)),
            );
            for &i in &set {
                in_set[i] = false;
            }

            let distance = |center: Option<glam::Vec3>| center.map_or(0.0, |c| c.distance(joint_position));
            let factors = joint.settings.factors;
            let base = factors.to_end * to_end_mass * distance(to_end_center)
                + factors.others * (total_mass - to_end_mass) * distance(others_center);

            state.base_torque = base;
            state.max_torque = base * joint.settings.torque.max;
            state.min_torque = base * joint.settings.min_factor();
            state.calibrated = true;

            if base == 0.0 {
                log::warn!("[Calibrate] 关节 '{}' 基础力矩为 0，马达无法出力", part.name);
            } else {
                log::debug!(
                    "[Calibrate] 关节 '{}': 末端质量={:.3}, 基础力矩={:.4}, 范围=[{:.4}, {:.4}]",
                    part.name,
                    to_end_mass,
                    base,
                    state.min_torque,
                    state.max_torque
                );
            }
        }

        to_end[index] = set;
    }

    log::info!(
        "[Calibrate] 力矩标定完成: {} 关节, 总质量 {:.3}",
        states.iter().flatten().count(),
        total_mass
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::{JointAxis, PartAxis};
    use crate::blueprint::{AnchorSide, AnchorSpec, JointOverrides, JointSpec, PartSpec, Size};
    use crate::skeleton::bake;
    use glam::{Quat, Vec3};

    fn state_slots(skeleton: &Skeleton) -> Vec<Option<RuntimeJointState>> {
        skeleton
            .parts()
            .iter()
            .map(|p| p.joint.as_ref().map(|_| RuntimeJointState::new()))
            .collect()
    }

    fn body(position: Vec3, mass: f32) -> BodyState {
        BodyState {
            position,
            rotation: Quat::IDENTITY,
            inverse_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            center_of_mass: position,
        }
    }

    fn chain(overrides: JointOverrides) -> Skeleton {
        let joint = JointSpec::new(
            AnchorSpec::new().from(PartAxis::Length, AnchorSide::Max),
            AnchorSpec::new().from(PartAxis::Length, AnchorSide::Min),
        )
        .limit(JointAxis::Pitch, 90.0)
        .overrides(overrides);
        let root = PartSpec::new("root", Size::length(0.2))
            .with_child(PartSpec::new("child", Size::length(0.4)).with_joint(joint));
        bake(&root, Vec3::ZERO, Quat::IDENTITY).unwrap()
    }

    #[test]
    fn test_two_body_to_end_only() {
        let skeleton = chain(JointOverrides::default().to_end_factor(1.0).others_factor(0.0));
        let child = skeleton.get("child").unwrap();
        let bodies = vec![
            body(Vec3::ZERO, 3.0),
            body(child.world_position, 2.0),
        ];
        let mut states = state_slots(&skeleton);
        calibrate(&skeleton, &bodies, &mut states).unwrap();

        // 关节在 y = 0.1，子部件质心在 y = 0.3
        let state = states[1].as_ref().unwrap();
        assert!((state.base_torque - 2.0 * 0.2).abs() < 1e-5);
        assert!((state.max_torque - 4.0).abs() < 1e-4);
        assert!((state.min_torque + 4.0).abs() < 1e-4);
        assert!(state.calibrated);
        assert!(states[0].is_none());
    }

    #[test]
    fn test_others_contribution() {
        let skeleton = chain(JointOverrides::default().to_end_factor(0.0).others_factor(1.0));
        let child = skeleton.get("child").unwrap();
        let bodies = vec![body(Vec3::ZERO, 3.0), body(child.world_position, 2.0)];
        let mut states = state_slots(&skeleton);
        calibrate(&skeleton, &bodies, &mut states).unwrap();
        // 其余部件 = 根，质量 3，距离 0.1
        let state = states[1].as_ref().unwrap();
        assert!((state.base_torque - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_static_bodies_contribute_nothing() {
        let skeleton = chain(JointOverrides::default().to_end_factor(0.0).others_factor(1.0));
        let child = skeleton.get("child").unwrap();
        let bodies = vec![body(Vec3::ZERO, 0.0), body(child.world_position, 2.0)];
        let mut states = state_slots(&skeleton);
        calibrate(&skeleton, &bodies, &mut states).unwrap();
        let state = states[1].as_ref().unwrap();
        assert_eq!(state.base_torque, 0.0);
        assert_eq!(state.max_torque, 0.0);
        assert_eq!(state.min_torque, 0.0);
    }

    #[test]
    fn test_calibrate_once() {
        let skeleton = chain(JointOverrides::default());
        let child = skeleton.get("child").unwrap();
        let bodies = vec![body(Vec3::ZERO, 1.0), body(child.world_position, 1.0)];
        let mut states = state_slots(&skeleton);
        calibrate(&skeleton, &bodies, &mut states).unwrap();
        assert!(matches!(
            calibrate(&skeleton, &bodies, &mut states),
            Err(RigError::AlreadyCalibrated)
        ));
    }

    #[test]
    fn test_body_count_mismatch() {
        let skeleton = chain(JointOverrides::default());
        let mut states = state_slots(&skeleton);
        assert!(matches!(
            calibrate(&skeleton, &[body(Vec3::ZERO, 1.0)], &mut states),
            Err(RigError::BodyCountMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_to_end_includes_descendants() {
        let joint = || {
            JointSpec::new(
                AnchorSpec::new().from(PartAxis::Length, AnchorSide::Max),
                AnchorSpec::new().from(PartAxis::Length, AnchorSide::Min),
            )
            .limit(JointAxis::Pitch, 90.0)
            .overrides(JointOverrides::default().others_factor(0.0))
        };
        let root = PartSpec::new("root", Size::length(0.2)).with_child(
            PartSpec::new("upper", Size::length(0.2))
                .with_joint(joint())
                .with_child(PartSpec::new("lower", Size::length(0.2)).with_joint(joint())),
        );
        let skeleton = bake(&root, Vec3::ZERO, Quat::IDENTITY).unwrap();
        let bodies: Vec<BodyState> = skeleton.parts().iter().map(|p| body(p.world_position, 1.0)).collect();
        let mut states = state_slots(&skeleton);
        calibrate(&skeleton, &bodies, &mut states).unwrap();

        // upper 关节 y = 0.1，末端质心 (0.2 + 0.4) / 2 = 0.3，质量 2
        let upper = states[1].as_ref().unwrap();
        assert!((upper.base_torque - 2.0 * 0.2).abs() < 1e-5);
        // lower 关节 y = 0.3，末端只有 lower，质心 0.4
        let lower = states[2].as_ref().unwrap();
        assert!((lower.base_torque - 0.1).abs() < 1e-5);
    }
}
