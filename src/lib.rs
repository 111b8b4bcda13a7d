//! 程序化生物骨架 - 蓝图烘焙 + 关节马达控制
//!
//! 流程：PartSpec 蓝图树 → [bake] → Skeleton → [bind] → 物理刚体/约束
//! → [calibrate] 一次性力矩标定 → 每帧 [JointMotorController::tick]。
//!
//! 物理引擎通过 [`physics::PhysicsBackend`] 接入，默认实现为 Rapier3D。

pub mod axes;
pub mod blueprint;
pub mod control;
pub mod creature;
pub mod error;
pub mod math;
pub mod physics;
pub mod presets;
pub mod skeleton;

pub use axes::{AxisMask, JointAxes, JointAxis, PartAxes, PartAxis, RawAxis, AXIS_CONFIGS};
pub use blueprint::{AnchorSide, AnchorSpec, JointSpec, PartShape, PartSpec, Size};
pub use control::{ControlDirection, JointMotorController, RuntimeJointState};
pub use creature::Creature;
pub use error::{Result, RigError};
pub use physics::{PhysicsBackend, RapierWorld, SkeletonBinding};
pub use skeleton::{bake, BakedJoint, BakedPart, Skeleton};
