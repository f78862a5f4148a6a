// ==========================================
// 车间报工系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL；所有判定可解释、可单测
// ==========================================

pub mod analytics;
pub mod authorization;
pub mod proration;
pub mod shift_calendar;

// 重导出核心引擎
pub use analytics::AnalyticsEngine;
pub use authorization::{can_lead, can_manage, can_view};
pub use proration::{prorated_target, DEFAULT_BASELINE_CREW_SIZE};
pub use shift_calendar::{ShiftCalendar, ShiftSlot};
