// ==========================================
// 车间报工系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 角色 (Role)
// ==========================================
// USER 为"班组长/主管"，WORKER 为一线工人（不直接调用本系统接口）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Superadmin,
    Admin,
    User,
    Worker,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Superadmin => write!(f, "SUPERADMIN"),
            Role::Admin => write!(f, "ADMIN"),
            Role::User => write!(f, "USER"),
            Role::Worker => write!(f, "WORKER"),
        }
    }
}

impl Role {
    /// 从字符串解析角色
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "SUPERADMIN" => Role::Superadmin,
            "ADMIN" => Role::Admin,
            "USER" => Role::User,
            _ => Role::Worker, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "SUPERADMIN",
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Worker => "WORKER",
        }
    }
}

// ==========================================
// 班次类型 (Shift Type)
// ==========================================
// 每种班次对应一张固定的小时时段表（见 engine::shift_calendar）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftType {
    #[serde(rename = "NORMAL_8H")]
    Normal8h, // 标准8小时班
    #[serde(rename = "EXTENDED_9_5H")]
    Extended95h, // 延长9.5小时班
    #[serde(rename = "OVERTIME_11H")]
    Overtime11h, // 加班11小时班
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftType::Normal8h => write!(f, "NORMAL_8H"),
            ShiftType::Extended95h => write!(f, "EXTENDED_9_5H"),
            ShiftType::Overtime11h => write!(f, "OVERTIME_11H"),
        }
    }
}

impl ShiftType {
    /// 从字符串解析班次类型
    ///
    /// 未知值回退为 NORMAL_8H。该回退行为与既有系统保持一致，
    /// 新增班次类型时不得依赖此默认值（需显式决策）。
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "EXTENDED_9_5H" => ShiftType::Extended95h,
            "OVERTIME_11H" => ShiftType::Overtime11h,
            _ => ShiftType::Normal8h,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ShiftType::Normal8h => "NORMAL_8H",
            ShiftType::Extended95h => "EXTENDED_9_5H",
            ShiftType::Overtime11h => "OVERTIME_11H",
        }
    }
}

// ==========================================
// 报工单状态 (Worksheet Status)
// ==========================================
// 生命周期: ACTIVE → COMPLETED → ARCHIVED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorksheetStatus {
    Active,    // 进行中
    Completed, // 已完成
    Archived,  // 已归档
}

impl fmt::Display for WorksheetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorksheetStatus::Active => write!(f, "ACTIVE"),
            WorksheetStatus::Completed => write!(f, "COMPLETED"),
            WorksheetStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

impl WorksheetStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "COMPLETED" => WorksheetStatus::Completed,
            "ARCHIVED" => WorksheetStatus::Archived,
            _ => WorksheetStatus::Active, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WorksheetStatus::Active => "ACTIVE",
            WorksheetStatus::Completed => "COMPLETED",
            WorksheetStatus::Archived => "ARCHIVED",
        }
    }
}

// ==========================================
// 小时记录状态 (Record Status)
// ==========================================
// 生命周期: PENDING → IN_PROGRESS → COMPLETED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Pending,    // 待填报
    InProgress, // 填报中
    Completed,  // 已完成
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Pending => write!(f, "PENDING"),
            RecordStatus::InProgress => write!(f, "IN_PROGRESS"),
            RecordStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl RecordStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "IN_PROGRESS" => RecordStatus::InProgress,
            "COMPLETED" => RecordStatus::Completed,
            _ => RecordStatus::Pending, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "PENDING",
            RecordStatus::InProgress => "IN_PROGRESS",
            RecordStatus::Completed => "COMPLETED",
        }
    }
}
