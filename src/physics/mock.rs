//! 测试用引擎：记录所有写入，旋转由测试直接设置

use glam::{Quat, Vec3};

use crate::axes::RawAxis;
use crate::error::{Result, RigError};

use super::{BodyDesc, BodyState, ConstraintDesc, PhysicsBackend};

#[derive(Clone, Debug)]
pub struct MockBody {
    pub desc: BodyDesc,
    pub state: BodyState,
}

#[derive(Clone, Debug)]
pub struct MockConstraint {
    pub parent: usize,
    pub child: usize,
    pub desc: ConstraintDesc,
    pub rotation: Quat,
    /// 按约束空间轴 (x, y, z) 存放 (min, max)
    pub torque_limits: [(f32, f32); 3],
    pub velocity: Vec3,
    pub active: bool,
    pub velocity_writes: usize,
    pub activations: usize,
    pub lambda: Option<Vec3>,
}

#[derive(Debug, Default)]
pub struct MockBackend {
    pub bodies: Vec<MockBody>,
    pub constraints: Vec<MockConstraint>,
}

impl MockBackend {
    fn constraint_ref(&self, handle: usize) -> Result<&MockConstraint> {
        self.constraints
            .get(handle)
            .ok_or_else(|| RigError::EngineDesync(format!("mock constraint {handle}")))
    }

    fn constraint_mut(&mut self, handle: usize) -> Result<&mut MockConstraint> {
        self.constraints
            .get_mut(handle)
            .ok_or_else(|| RigError::EngineDesync(format!("mock constraint {handle}")))
    }

    pub fn set_rotation(&mut self, handle: usize, rotation: Quat) {
        self.constraints[handle].rotation = rotation;
    }

    pub fn sleep_all(&mut self) {
        for c in &mut self.constraints {
            c.active = false;
        }
    }
}

impl PhysicsBackend for MockBackend {
    type Body = usize;
    type Constraint = usize;

    fn create_body(&mut self, desc: &BodyDesc) -> Result<usize> {
        let mass = desc.shape.volume() * desc.material.density;
        let state = BodyState {
            position: desc.position,
            rotation: desc.rotation,
            inverse_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            center_of_mass: desc.position,
        };
        self.bodies.push(MockBody {
            desc: desc.clone(),
            state,
        });
        Ok(self.bodies.len() - 1)
    }

    fn create_constraint(&mut self, parent: usize, child: usize, desc: &ConstraintDesc) -> Result<usize> {
        if parent >= self.bodies.len() || child >= self.bodies.len() {
            return Err(RigError::EngineDesync(format!("mock bodies {parent}/{child}")));
        }
        self.constraints.push(MockConstraint {
            parent,
            child,
            desc: desc.clone(),
            rotation: Quat::IDENTITY,
            torque_limits: [(0.0, 0.0); 3],
            velocity: Vec3::ZERO,
            active: true,
            velocity_writes: 0,
            activations: 0,
            lambda: None,
        });
        Ok(self.constraints.len() - 1)
    }

    fn body_state(&self, body: usize) -> Result<BodyState> {
        self.bodies
            .get(body)
            .map(|b| b.state)
            .ok_or_else(|| RigError::EngineDesync(format!("mock body {body}")))
    }

    fn constraint_rotation(&self, constraint: usize) -> Result<Quat> {
        Ok(self.constraint_ref(constraint)?.rotation)
    }

    fn set_motor_torque_limits(&mut self, constraint: usize, axis: RawAxis, min: f32, max: f32) -> Result<()> {
        self.constraint_mut(constraint)?.torque_limits[axis.index()] = (min, max);
        Ok(())
    }

    fn set_target_angular_velocity(&mut self, constraint: usize, velocity: Vec3) -> Result<()> {
        let c = self.constraint_mut(constraint)?;
        c.velocity = velocity;
        c.velocity_writes += 1;
        Ok(())
    }

    fn is_constraint_active(&self, constraint: usize) -> Result<bool> {
        Ok(self.constraint_ref(constraint)?.active)
    }

    fn activate_constraint(&mut self, constraint: usize) -> Result<()> {
        let c = self.constraint_mut(constraint)?;
        c.active = true;
        c.activations += 1;
        Ok(())
    }

    fn motor_lambda(&self, constraint: usize) -> Result<Option<Vec3>> {
        Ok(self.constraint_ref(constraint)?.lambda)
    }
}
