// ==========================================
// 车间报工系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、只读视图
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod analytics;
pub mod org;
pub mod product;
pub mod types;
pub mod worksheet;

// 重导出核心类型
pub use analytics::{
    AnalyticsSummary, FactoryDashboard, FactoryStat, GroupBoard, GroupPerformance, HourExtreme,
    HourlyMetric, ProductionDashboard, ProductionSummary, RecentActivity, TrendExtremes,
    WorkerPerformance, WorksheetAnalytics,
};
pub use org::{Caller, GroupChain, Worker};
pub use product::ProductProcess;
pub use types::{RecordStatus, Role, ShiftType, WorksheetStatus};
pub use worksheet::{
    RecordWithItemRecords, Worksheet, WorksheetAggregate, WorksheetItem, WorksheetItemRecord,
    WorksheetRecord, WorksheetSummary,
};
