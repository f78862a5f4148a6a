// ==========================================
// 车间报工系统 - 报工单操作API
// ==========================================
// 职责: 建单/报工/生命周期操作的编排与校验，错误映射为业务错误
// 红线: 校验顺序固定（存在性 → 链路 → 权限 → 重复 → 映射 → 成员）
// 并发: 建单以 (work_date, group_id) 唯一约束兜底，预检仅用于提前报错
// ==========================================

use crate::api::dto::{
    ArchiveResult, BatchUpdateRequest, BatchUpdateResponse, CreateWorksheetRequest,
    CreateWorksheetResponse, CreationSummary, ItemRecordUpdate, Page, QuickUpdateRequest,
    RecordUpdateRequest, UpdateWorksheetRequest, WorksheetFilter,
};
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::org::Caller;
use crate::domain::types::{RecordStatus, WorksheetStatus};
use crate::domain::worksheet::{
    RecordWithItemRecords, Worksheet, WorksheetAggregate, WorksheetItem, WorksheetRecord,
    WorksheetSummary,
};
use crate::engine::{can_lead, can_manage, can_view, prorated_target, ShiftCalendar};
use crate::repository::{
    GroupRepository, ItemRecordSpec, ProductProcessRepository, RecordUpdateSpec, RepositoryError,
    VisibilityScope, WorksheetQuery, WorksheetRepository,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// 分页上限（防止单次取数过大）
const MAX_PAGE_LIMIT: u32 = 200;

// ==========================================
// WorksheetApi - 报工单操作API
// ==========================================
pub struct WorksheetApi {
    worksheet_repo: Arc<WorksheetRepository>,
    group_repo: Arc<GroupRepository>,
    product_repo: Arc<ProductProcessRepository>,
    config: Arc<ConfigManager>,
}

impl WorksheetApi {
    /// 创建新的 WorksheetApi 实例
    pub fn new(
        worksheet_repo: Arc<WorksheetRepository>,
        group_repo: Arc<GroupRepository>,
        product_repo: Arc<ProductProcessRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            worksheet_repo,
            group_repo,
            product_repo,
            config,
        }
    }

    // ==========================================
    // 建单
    // ==========================================

    /// 创建报工单（单头 + 每位在岗工人一条明细 + 班次时段表逐时记录）
    ///
    /// # 校验顺序
    /// 1. 小组存在 → NotFound
    /// 2. 组织链路完整（组→班组→产线→厂）→ InvalidStructure
    /// 3. 管理员或该组组长 → Forbidden
    /// 4. 同组同日无重复单（预检 + 唯一约束兜底）→ DuplicateWorksheet
    /// 5. (product, process) 映射存在且启用 → InvalidProductProcess
    /// 6. 在岗成员非空 → EmptyGroup
    ///
    /// # 说明
    /// 小时目标 = floor(标准产量 × 实际人数 / 折算基数)，基数取自配置（默认5）
    pub fn create_worksheet(
        &self,
        caller: &Caller,
        req: &CreateWorksheetRequest,
    ) -> ApiResult<CreateWorksheetResponse> {
        tracing::info!(
            group_id = %req.group_id,
            work_date = %req.work_date,
            shift = %req.shift_type,
            "创建报工单"
        );

        let Some((chain, complete)) = self.group_repo.find_chain(&req.group_id)? else {
            return Err(ApiError::NotFound(format!(
                "小组(id={})不存在",
                req.group_id
            )));
        };

        if !complete {
            return Err(ApiError::InvalidStructure(format!(
                "小组{}缺少班组/产线/厂归属，无法建单",
                req.group_id
            )));
        }

        if !can_lead(caller, chain.leader_id.as_deref()) {
            return Err(ApiError::Forbidden(format!(
                "用户{}不是小组{}的组长",
                caller.id, req.group_id
            )));
        }

        // 预检仅提前报错，最终一致性由唯一约束保证
        if self.worksheet_repo.exists_for(req.work_date, &req.group_id)? {
            return Err(ApiError::DuplicateWorksheet {
                group_id: req.group_id.clone(),
                work_date: req.work_date.to_string(),
            });
        }

        let mapping = self
            .product_repo
            .find_by_pair(&req.product_id, &req.process_id)?
            .filter(|m| m.is_active);
        let Some(mapping) = mapping else {
            return Err(ApiError::InvalidProductProcess {
                product_id: req.product_id.clone(),
                process_id: req.process_id.clone(),
            });
        };

        if chain.active_workers.is_empty() {
            return Err(ApiError::EmptyGroup(req.group_id.clone()));
        }

        let total_workers = chain.active_workers.len() as i64;
        let baseline = self.config.baseline_crew_size();
        let target = prorated_target(mapping.standard_output_per_hour, total_workers, baseline);

        let now = chrono::Local::now().naive_local();
        let worksheet_id = Uuid::new_v4().to_string();
        let worksheet = Worksheet {
            worksheet_id: worksheet_id.clone(),
            work_date: req.work_date,
            factory_id: chain.factory_id.clone(),
            group_id: req.group_id.clone(),
            shift_type: req.shift_type,
            total_workers,
            target_output_per_hour: target,
            status: WorksheetStatus::Active,
            created_by: caller.id.clone(),
            created_at: now,
            updated_at: now,
        };

        let items: Vec<WorksheetItem> = chain
            .active_workers
            .iter()
            .map(|worker| WorksheetItem {
                item_id: Uuid::new_v4().to_string(),
                worksheet_id: worksheet_id.clone(),
                worker_id: worker.worker_id.clone(),
                product_id: req.product_id.clone(),
                process_id: req.process_id.clone(),
            })
            .collect();

        let records: Vec<WorksheetRecord> = ShiftCalendar::slots_for(req.shift_type)
            .into_iter()
            .map(|slot| WorksheetRecord {
                record_id: Uuid::new_v4().to_string(),
                worksheet_id: worksheet_id.clone(),
                work_hour: slot.work_hour,
                start_time: slot.start_time,
                end_time: slot.end_time,
                status: RecordStatus::Pending,
                updated_by: None,
            })
            .collect();

        match self.worksheet_repo.create_graph(&worksheet, &items, &records) {
            Ok(()) => {}
            // 预检后仍可能与并发建单撞上唯一约束
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Err(ApiError::DuplicateWorksheet {
                    group_id: req.group_id.clone(),
                    work_date: req.work_date.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        let aggregate = self
            .worksheet_repo
            .load_aggregate(&worksheet_id)?
            .ok_or_else(|| ApiError::InternalError("建单后聚合加载失败".to_string()))?;

        tracing::info!(
            worksheet_id = %worksheet_id,
            items = items.len(),
            records = records.len(),
            target = target,
            "报工单创建完成"
        );

        Ok(CreateWorksheetResponse {
            worksheet: aggregate,
            creation: CreationSummary {
                items_created: items.len(),
                records_created: records.len(),
                total_workers,
                standard_output_per_hour: mapping.standard_output_per_hour,
                target_output_per_hour: target,
            },
        })
    }

    // ==========================================
    // 报工（记录更新）
    // ==========================================

    /// 更新单条小时记录（状态 + 报工明细覆盖写入）
    ///
    /// status 缺省时自动置为 IN_PROGRESS
    pub fn update_record(
        &self,
        caller: &Caller,
        worksheet_id: &str,
        record_id: &str,
        req: &RecordUpdateRequest,
    ) -> ApiResult<RecordWithItemRecords> {
        let header = self.require_header(worksheet_id)?;
        self.require_lead(caller, &header)?;

        if self
            .worksheet_repo
            .find_record(worksheet_id, record_id)?
            .is_none()
        {
            return Err(ApiError::NotFound(format!(
                "小时记录(id={})不属于报工单{}",
                record_id, worksheet_id
            )));
        }

        let item_ids = self.item_id_set(worksheet_id)?;
        let cells = validate_item_records(&req.item_records, &item_ids)?;

        let spec = RecordUpdateSpec {
            record_id: record_id.to_string(),
            status: req.status.unwrap_or(RecordStatus::InProgress),
            item_records: cells,
        };
        self.worksheet_repo
            .apply_record_updates(worksheet_id, &[spec], &caller.id)?;

        self.worksheet_repo
            .load_record_with_items(record_id)?
            .ok_or_else(|| ApiError::InternalError("记录更新后加载失败".to_string()))
    }

    /// 批量更新小时记录（整批原子生效，任一校验失败整批拒绝）
    pub fn batch_update_records(
        &self,
        caller: &Caller,
        worksheet_id: &str,
        req: &BatchUpdateRequest,
    ) -> ApiResult<BatchUpdateResponse> {
        let header = self.require_header(worksheet_id)?;
        self.require_lead(caller, &header)?;

        if req.records.is_empty() {
            return Ok(BatchUpdateResponse {
                updated_count: 0,
                records: vec![],
            });
        }

        let record_ids: HashSet<String> = self
            .worksheet_repo
            .find_record_ids(worksheet_id)?
            .into_iter()
            .collect();
        let item_ids = self.item_id_set(worksheet_id)?;

        let mut specs = Vec::with_capacity(req.records.len());
        for update in &req.records {
            if !record_ids.contains(&update.record_id) {
                return Err(ApiError::NotFound(format!(
                    "小时记录(id={})不属于报工单{}",
                    update.record_id, worksheet_id
                )));
            }
            let cells = validate_item_records(&update.item_records, &item_ids)?;
            specs.push(RecordUpdateSpec {
                record_id: update.record_id.clone(),
                status: update.status.unwrap_or(RecordStatus::InProgress),
                item_records: cells,
            });
        }

        let updated_count = self
            .worksheet_repo
            .apply_record_updates(worksheet_id, &specs, &caller.id)?;

        // 按请求顺序回读各条记录的最终形态
        let mut records = Vec::with_capacity(specs.len());
        for spec in &specs {
            let loaded = self
                .worksheet_repo
                .load_record_with_items(&spec.record_id)?
                .ok_or_else(|| ApiError::InternalError("批量更新后记录加载失败".to_string()))?;
            records.push(loaded);
        }

        tracing::info!(
            worksheet_id = %worksheet_id,
            updated = updated_count,
            "批量报工完成"
        );
        Ok(BatchUpdateResponse {
            updated_count,
            records,
        })
    }

    /// 快速报工：简化入参适配到标准更新路径，状态强制 IN_PROGRESS
    pub fn quick_update_record(
        &self,
        caller: &Caller,
        worksheet_id: &str,
        record_id: &str,
        req: &QuickUpdateRequest,
    ) -> ApiResult<RecordWithItemRecords> {
        let full = RecordUpdateRequest {
            status: Some(RecordStatus::InProgress),
            item_records: req
                .items
                .iter()
                .map(|item| ItemRecordUpdate {
                    item_id: item.item_id.clone(),
                    actual_output: item.actual_output,
                    product_id: None,
                    process_id: None,
                    note: item.note.clone(),
                })
                .collect(),
        };
        self.update_record(caller, worksheet_id, record_id, &full)
    }

    // ==========================================
    // 生命周期
    // ==========================================

    /// 完成报工单（任意当前状态均可标记完成）
    pub fn complete_worksheet(&self, caller: &Caller, worksheet_id: &str) -> ApiResult<Worksheet> {
        let header = self.require_header(worksheet_id)?;
        self.require_lead(caller, &header)?;

        self.worksheet_repo
            .update_status(worksheet_id, WorksheetStatus::Completed)?;
        tracing::info!(worksheet_id = %worksheet_id, "报工单已完成");
        self.require_header(worksheet_id)
    }

    /// 更新单头（状态/小时目标）；创建人、组长或管理员可操作
    pub fn update_worksheet(
        &self,
        caller: &Caller,
        worksheet_id: &str,
        req: &UpdateWorksheetRequest,
    ) -> ApiResult<Worksheet> {
        let header = self.require_header(worksheet_id)?;
        let leader_id = self
            .group_repo
            .find_leader_id(&header.group_id)?
            .flatten();
        if !can_view(caller, &header.created_by, leader_id.as_deref()) {
            return Err(ApiError::Forbidden(format!(
                "用户{}无权修改报工单{}",
                caller.id, worksheet_id
            )));
        }

        if let Some(target) = req.target_output_per_hour {
            if target < 0 {
                return Err(ApiError::InvalidOutput(format!(
                    "小时目标不能为负: {}",
                    target
                )));
            }
        }

        if req.status.is_some() || req.target_output_per_hour.is_some() {
            self.worksheet_repo
                .update_header(worksheet_id, req.status, req.target_output_per_hour)?;
        }
        self.require_header(worksheet_id)
    }

    /// 批量归档早于截止日期的报工单（仅管理员）
    ///
    /// 无匹配时返回 archived_count=0，不视为错误
    pub fn archive_older_than(&self, caller: &Caller, cutoff: NaiveDate) -> ApiResult<ArchiveResult> {
        if !can_manage(caller) {
            return Err(ApiError::Forbidden("归档操作仅管理员可执行".to_string()));
        }
        let archived_count = self.worksheet_repo.archive_older_than(cutoff)?;
        tracing::info!(cutoff = %cutoff, archived = archived_count, "批量归档完成");
        Ok(ArchiveResult {
            cutoff,
            archived_count,
        })
    }

    /// 删除报工单及其全部明细/记录（仅管理员，不区分状态）
    pub fn remove(&self, caller: &Caller, worksheet_id: &str) -> ApiResult<()> {
        if !can_manage(caller) {
            return Err(ApiError::Forbidden("删除操作仅管理员可执行".to_string()));
        }
        let count = self.worksheet_repo.delete(worksheet_id)?;
        if count == 0 {
            return Err(ApiError::NotFound(format!(
                "报工单(id={})不存在",
                worksheet_id
            )));
        }
        tracing::info!(worksheet_id = %worksheet_id, "报工单已删除");
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 查询报工单完整聚合
    pub fn get_worksheet(&self, caller: &Caller, worksheet_id: &str) -> ApiResult<WorksheetAggregate> {
        let aggregate = self
            .worksheet_repo
            .load_aggregate(worksheet_id)?
            .ok_or_else(|| ApiError::NotFound(format!("报工单(id={})不存在", worksheet_id)))?;

        if !can_view(
            caller,
            &aggregate.worksheet.created_by,
            aggregate.leader_id.as_deref(),
        ) {
            return Err(ApiError::Forbidden(format!(
                "用户{}无权查看报工单{}",
                caller.id, worksheet_id
            )));
        }
        Ok(aggregate)
    }

    /// 报工单摘要列表（非管理员仅见本人创建或本人领导小组的）
    pub fn list_worksheets(
        &self,
        caller: &Caller,
        filter: &WorksheetFilter,
    ) -> ApiResult<Vec<WorksheetSummary>> {
        let query = self.scoped_query(caller, filter)?;
        Ok(self.worksheet_repo.list(&query)?)
    }

    /// 报工单摘要分页列表（page 从 1 起，limit 超限自动收敛）
    pub fn list_worksheets_paginated(
        &self,
        caller: &Caller,
        filter: &WorksheetFilter,
        page: u32,
        limit: u32,
    ) -> ApiResult<Page<WorksheetSummary>> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let query = self.scoped_query(caller, filter)?;
        let (items, total) = self.worksheet_repo.list_page(&query, page, limit)?;
        Ok(Page::new(items, total, page, limit))
    }

    /// 指定小组的报工单列表（管理员或该组组长）
    pub fn get_group_worksheets(
        &self,
        caller: &Caller,
        group_id: &str,
        work_date: Option<NaiveDate>,
    ) -> ApiResult<Vec<WorksheetSummary>> {
        let Some(leader_id) = self.group_repo.find_leader_id(group_id)? else {
            return Err(ApiError::NotFound(format!("小组(id={})不存在", group_id)));
        };
        if !can_lead(caller, leader_id.as_deref()) {
            return Err(ApiError::Forbidden(format!(
                "用户{}不是小组{}的组长",
                caller.id, group_id
            )));
        }

        let query = WorksheetQuery {
            group_id: Some(group_id.to_string()),
            work_date,
            ..Default::default()
        };
        Ok(self.worksheet_repo.list(&query)?)
    }

    /// 当前用户领导的全部小组的报工单（无领导小组时返回空列表）
    pub fn get_my_group_worksheets(
        &self,
        caller: &Caller,
        work_date: Option<NaiveDate>,
    ) -> ApiResult<Vec<WorksheetSummary>> {
        let led = self.group_repo.find_groups_led_by(&caller.id)?;
        if led.is_empty() {
            return Ok(Vec::new());
        }
        let query = WorksheetQuery {
            group_ids: Some(led),
            work_date,
            ..Default::default()
        };
        Ok(self.worksheet_repo.list(&query)?)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 加载单头，不存在即 NotFound
    fn require_header(&self, worksheet_id: &str) -> ApiResult<Worksheet> {
        self.worksheet_repo
            .find_header(worksheet_id)?
            .ok_or_else(|| ApiError::NotFound(format!("报工单(id={})不存在", worksheet_id)))
    }

    /// 带班权限校验（管理员或报工单所属小组的组长）
    fn require_lead(&self, caller: &Caller, header: &Worksheet) -> ApiResult<()> {
        let leader_id = self
            .group_repo
            .find_leader_id(&header.group_id)?
            .flatten();
        if !can_lead(caller, leader_id.as_deref()) {
            return Err(ApiError::Forbidden(format!(
                "用户{}不是小组{}的组长",
                caller.id, header.group_id
            )));
        }
        Ok(())
    }

    fn item_id_set(&self, worksheet_id: &str) -> ApiResult<HashSet<String>> {
        Ok(self
            .worksheet_repo
            .find_item_ids(worksheet_id)?
            .into_iter()
            .collect())
    }

    /// 按角色收敛查询范围：管理员不限，其余仅见本人创建或本人领导小组的
    fn scoped_query(&self, caller: &Caller, filter: &WorksheetFilter) -> ApiResult<WorksheetQuery> {
        let visible_to = if can_manage(caller) {
            None
        } else {
            let led = self.group_repo.find_groups_led_by(&caller.id)?;
            Some(VisibilityScope {
                user_id: caller.id.clone(),
                led_group_ids: led,
            })
        };
        Ok(WorksheetQuery {
            factory_id: filter.factory_id.clone(),
            group_id: filter.group_id.clone(),
            work_date: filter.work_date,
            status: filter.status,
            visible_to,
            ..Default::default()
        })
    }
}

/// 报工明细校验：条目归属 + 产量非负
fn validate_item_records(
    updates: &[ItemRecordUpdate],
    item_ids: &HashSet<String>,
) -> ApiResult<Vec<ItemRecordSpec>> {
    let mut cells = Vec::with_capacity(updates.len());
    for update in updates {
        if !item_ids.contains(&update.item_id) {
            return Err(ApiError::NotFound(format!(
                "工人明细(id={})不属于该报工单",
                update.item_id
            )));
        }
        if update.actual_output < 0 {
            return Err(ApiError::InvalidOutput(format!(
                "item_id={}, actual_output={}",
                update.item_id, update.actual_output
            )));
        }
        cells.push(ItemRecordSpec {
            item_id: update.item_id.clone(),
            actual_output: update.actual_output,
            product_id: update.product_id.clone(),
            process_id: update.process_id.clone(),
            note: update.note.clone(),
        });
    }
    Ok(cells)
}
