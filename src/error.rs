//! 错误类型
//!
//! 所有错误都是结构性错误（蓝图写错、引擎与骨架失步），不做重试。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RigError {
    /// 非根部件没有关节
    #[error("Non-root part '{0}' must have a joint")]
    MissingJoint(String),

    /// 根部件声明了关节
    #[error("Root part '{0}' must not have a joint")]
    RootJoint(String),

    /// 根部件不能对称（镜像需要关节锚点）
    #[error("Root part '{0}' cannot be symmetrical")]
    SymmetricRoot(String),

    #[error("Invalid root transform: {0}")]
    InvalidRootTransform(String),

    #[error("Invalid size for part '{name}': {reason}")]
    InvalidSize { name: String, reason: String },

    /// 加前缀后仍然重名
    #[error("Duplicate part name '{0}'")]
    DuplicateName(String),

    #[error("Unknown part '{0}'")]
    UnknownPart(String),

    #[error("Part '{0}' has no joint")]
    NoJoint(String),

    /// 力矩标定只能执行一次
    #[error("Joint torques are already calibrated")]
    AlreadyCalibrated,

    #[error("Expected {expected} body states, got {actual}")]
    BodyCountMismatch { expected: usize, actual: usize },

    /// 引擎句柄与骨架索引失步
    #[error("Engine desync: {0}")]
    EngineDesync(String),
}

pub type Result<T> = std::result::Result<T, RigError>;
