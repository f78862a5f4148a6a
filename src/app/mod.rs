// ==========================================
// 车间报工系统 - 应用层
// ==========================================
// 职责: 应用状态组装与启动入口支持
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
