// ==========================================
// 车间报工系统 - API层请求/响应结构
// ==========================================
// 职责: 定义对外操作的入参与出参（serde 序列化边界）
// ==========================================

use crate::domain::types::{RecordStatus, ShiftType, WorksheetStatus};
use crate::domain::worksheet::{RecordWithItemRecords, WorksheetAggregate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// 建单
// ==========================================

/// 建单请求：指定组、日期、班次与全组统一的产品×工序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorksheetRequest {
    pub work_date: NaiveDate,
    pub group_id: String,
    pub shift_type: ShiftType,
    pub product_id: String,
    pub process_id: String,
}

/// 建单结果概要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreationSummary {
    pub items_created: usize,
    pub records_created: usize,
    pub total_workers: i64,
    pub standard_output_per_hour: i64,
    pub target_output_per_hour: i64,
}

/// 建单响应：完整聚合 + 创建概要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorksheetResponse {
    pub worksheet: WorksheetAggregate,
    pub creation: CreationSummary,
}

// ==========================================
// 记录更新
// ==========================================

/// 单个报工单元的更新（按 (record, item) 覆盖写入）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecordUpdate {
    pub item_id: String,
    pub actual_output: i64,
    pub product_id: Option<String>,
    pub process_id: Option<String>,
    pub note: Option<String>,
}

/// 单条小时记录更新请求
///
/// status 缺省时：只要触碰了记录即置为 IN_PROGRESS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordUpdateRequest {
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub item_records: Vec<ItemRecordUpdate>,
}

/// 批量更新中的一条记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecordUpdate {
    pub record_id: String,
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub item_records: Vec<ItemRecordUpdate>,
}

/// 批量更新请求（整批原子生效）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpdateRequest {
    pub records: Vec<BatchRecordUpdate>,
}

/// 批量更新响应：生效条数 + 更新后的各条记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpdateResponse {
    pub updated_count: usize,
    pub records: Vec<RecordWithItemRecords>,
}

/// 快速报工：逐工人产量（状态强制置为 IN_PROGRESS）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickItemOutput {
    pub item_id: String,
    pub actual_output: i64,
    pub note: Option<String>,
}

/// 快速报工请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickUpdateRequest {
    pub items: Vec<QuickItemOutput>,
}

// ==========================================
// 单头更新与生命周期
// ==========================================

/// 单头更新请求（字段均可选，缺省不变）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorksheetRequest {
    pub status: Option<WorksheetStatus>,
    pub target_output_per_hour: Option<i64>,
}

/// 批量归档结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveResult {
    pub cutoff: NaiveDate,
    pub archived_count: usize,
}

// ==========================================
// 列表查询
// ==========================================

/// 报工单列表过滤条件（全部可选）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorksheetFilter {
    pub factory_id: Option<String>,
    pub group_id: Option<String>,
    pub work_date: Option<NaiveDate>,
    pub status: Option<WorksheetStatus>,
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// 由条目与总数组装分页结果（limit=0 时视为单页）
    pub fn new(items: Vec<T>, total: i64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            1
        } else {
            ((total as u64).div_ceil(limit as u64)) as u32
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}
