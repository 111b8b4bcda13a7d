//! 蓝图 - 作者编写的不可变输入
//!
//! - PartSpec: 单个刚体段
//! - JointSpec: 连接到父部件的关节
//! - JointSettings: 可继承的关节参数（内置默认 ← 父关节 ← 本地覆盖）

mod joint_spec;
mod part_spec;
mod settings;

pub use joint_spec::{AnchorSide, AnchorSpec, JointSpec};
pub use part_spec::{Material, MaterialOverrides, PartShape, PartSpec, Size};
pub use settings::{
    CenteringOverrides, CenteringSettings, FactorOverrides, JointOverrides, JointSettings,
    TorqueFactors, TorqueOverrides, TorqueSettings,
};
