// ==========================================
// 车间报工系统 - 效率分析结果模型
// ==========================================
// 分析引擎的输出结构；所有百分比对外取整显示，
// 内部累加使用精确整数和（不提前取整）
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{RecordStatus, WorksheetStatus};

// ==========================================
// 单张报工单分析
// ==========================================

/// 报工单分析汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_records: i64,     // 小时记录总数
    pub completed_records: i64, // 已完成小时记录数
    pub completion_rate: i64,   // 完成率（%，取整；无记录时为0）
    pub total_output: i64,      // 实际产量合计
    pub target_output: i64,     // 目标产量合计
    pub efficiency: i64,        // 效率（%，取整；目标为0时为0）
    pub total_workers: i64,     // 工人数快照
}

/// 单小时指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyMetric {
    pub work_hour: i64,       // 工时序号
    pub target_output: i64,   // 该小时目标
    pub actual_output: i64,   // 该小时实际
    pub efficiency: i64,      // 效率（%，取整）
    pub status: RecordStatus, // 记录状态
    pub worker_count: i64,    // 已报工人数
}

/// 单工人绩效
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerPerformance {
    pub worker_id: String,
    pub total_output: i64,     // 实际产量合计
    pub hours_worked: i64,     // 已报工小时数
    pub average_per_hour: f64, // 平均每小时产量
    pub efficiency: i64,       // 效率（%，取整；期望为0时为0）
}

/// 峰谷小时（按实际产量，平手取先扫描到者）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourExtreme {
    pub work_hour: i64,
    pub actual_output: i64,
}

/// 产量走势极值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendExtremes {
    pub peak_hour: Option<HourExtreme>,
    pub lowest_hour: Option<HourExtreme>,
}

/// 单张报工单的完整分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorksheetAnalytics {
    pub summary: AnalyticsSummary,
    pub hourly_data: Vec<HourlyMetric>,
    pub worker_performance: Vec<WorkerPerformance>,
    pub trends: TrendExtremes,
}

// ==========================================
// 跨报工单聚合（驾驶舱/实时视图共用）
// ==========================================

/// 单厂聚合统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryStat {
    pub name: String,
    pub code: String,
    pub worksheets: i64,        // 报工单数
    pub workers: i64,           // 工人数合计
    pub target_output: i64,     // 目标产量合计
    pub actual_output: i64,     // 实际产量合计
    pub completed_records: i64, // 已完成小时记录数
    pub total_records: i64,     // 小时记录总数
    pub efficiency: i64,        // 效率（%，取整）
    pub completion_rate: i64,   // 完成率（%，取整）
}

/// 全局聚合汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSummary {
    pub date: Option<NaiveDate>,  // 聚合日期（无日期过滤时为 None）
    pub total_worksheets: i64,
    pub total_workers: i64,
    pub total_target_output: i64,
    pub total_actual_output: i64,
    pub overall_efficiency: i64, // %（取整）
    pub completion_rate: i64,    // %（取整）
    pub active_factories: i64,   // 涉及的厂数
}

/// 最近动态条目（按更新时间倒序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub worksheet_id: String,
    pub factory: String,
    pub group: String,
    pub status: WorksheetStatus,
    pub updated_at: NaiveDateTime,
}

/// 当日生产驾驶舱 / 实时分析视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionDashboard {
    pub summary: ProductionSummary,
    pub factories: Vec<FactoryStat>,
    pub recent_activity: Vec<RecentActivity>,
}

// ==========================================
// 单厂驾驶舱
// ==========================================

/// 小组当班绩效
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPerformance {
    pub efficiency: i64,      // %（取整）
    pub completion_rate: i64, // %（取整）
    pub total_output: i64,
    pub target_output: i64,
}

/// 单厂驾驶舱里的小组看板
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupBoard {
    pub worksheet_id: String,
    pub group_name: String,
    pub status: WorksheetStatus,
    pub performance: GroupPerformance,
}

/// 单厂单日驾驶舱
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryDashboard {
    pub factory_name: String,
    pub factory_code: String,
    pub date: NaiveDate,
    pub worksheets: Vec<GroupBoard>,
    pub total_groups: i64,
    pub total_workers: i64,
    pub avg_efficiency: i64, // 各单效率的平均（%，取整）
}
