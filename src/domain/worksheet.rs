// ==========================================
// 车间报工系统 - 报工单领域模型
// ==========================================
// 聚合关系: Worksheet 独占其 Item 与 Record（级联生命周期）
// ItemRecord 是 (Item, Record) 的交叉单元，物理上挂在 Record 侧
// ==========================================

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{RecordStatus, ShiftType, WorksheetStatus};

// ==========================================
// Worksheet - 报工单（每组每日一张）
// ==========================================
// 唯一性: (work_date, group_id) 由存储层唯一约束保障
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worksheet {
    pub worksheet_id: String,            // 报工单ID
    pub work_date: NaiveDate,            // 报工日期（自然日）
    pub factory_id: String,              // 厂ID（自小组链路冗余，便于过滤）
    pub group_id: String,                // 小组ID
    pub shift_type: ShiftType,           // 班次类型
    pub total_workers: i64,              // 建单时的在岗工人数快照
    pub target_output_per_hour: i64,     // 每小时目标产量（折算后）
    pub status: WorksheetStatus,         // 状态
    pub created_by: String,              // 创建人ID
    pub created_at: NaiveDateTime,       // 创建时间
    pub updated_at: NaiveDateTime,       // 更新时间
}

// ==========================================
// WorksheetItem - 工人分工明细
// ==========================================
// 建单时为小组每位在岗 WORKER 生成一条，此后不再单独增删
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetItem {
    pub item_id: String,      // 明细ID
    pub worksheet_id: String, // 所属报工单
    pub worker_id: String,    // 工人ID
    pub product_id: String,   // 产品ID（默认继承单头，允许逐人覆盖）
    pub process_id: String,   // 工序ID
}

// ==========================================
// WorksheetRecord - 小时时段记录
// ==========================================
// 建单时按班次时段表生成，时段集合固定，不增不减
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetRecord {
    pub record_id: String,         // 记录ID
    pub worksheet_id: String,      // 所属报工单
    pub work_hour: i64,            // 工时序号（1..n）
    pub start_time: NaiveTime,     // 时段起始
    pub end_time: NaiveTime,       // 时段结束
    pub status: RecordStatus,      // 状态
    pub updated_by: Option<String>, // 最后填报人
}

// ==========================================
// WorksheetItemRecord - 报工明细单元（工人×小时）
// ==========================================
// 唯一性: (record_id, item_id)，upsert 语义，惰性创建
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetItemRecord {
    pub record_id: String,          // 所属小时记录
    pub item_id: String,            // 所属工人明细
    pub actual_output: i64,         // 实际产量（非负）
    pub product_id: Option<String>, // 产品覆盖（可选）
    pub process_id: Option<String>, // 工序覆盖（可选）
    pub note: Option<String>,       // 备注（可选）
}

// ==========================================
// RecordWithItemRecords - 小时记录及其报工明细
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordWithItemRecords {
    pub record: WorksheetRecord,
    pub item_records: Vec<WorksheetItemRecord>,
}

// ==========================================
// WorksheetAggregate - 报工单完整聚合（只读视图）
// ==========================================
// 用途: 分析引擎的输入；一次加载，纯计算，不回写
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetAggregate {
    pub worksheet: Worksheet,
    pub factory_name: String,
    pub factory_code: String,
    pub group_name: String,
    pub leader_id: Option<String>,
    pub items: Vec<WorksheetItem>,
    pub records: Vec<RecordWithItemRecords>,
}

impl WorksheetAggregate {
    /// 全部报工明细的实际产量合计
    pub fn total_actual_output(&self) -> i64 {
        self.records
            .iter()
            .map(|r| r.item_records.iter().map(|ir| ir.actual_output).sum::<i64>())
            .sum()
    }

    /// 目标产量合计（单头目标 × 时段数）
    pub fn total_target_output(&self) -> i64 {
        self.worksheet.target_output_per_hour * self.records.len() as i64
    }

    /// 已完成的小时记录数
    pub fn completed_records(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.record.status == RecordStatus::Completed)
            .count()
    }
}

// ==========================================
// WorksheetSummary - 列表视图摘要
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetSummary {
    pub worksheet: Worksheet,
    pub factory_name: String,
    pub factory_code: String,
    pub group_name: String,
    pub items_count: i64,             // 工人明细数
    pub completed_records: i64,       // 已完成小时记录数
    pub total_records: i64,           // 小时记录总数
}
