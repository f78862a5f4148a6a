// ==========================================
// 车间报工系统 - 生产分析API
// ==========================================
// 职责: 三个粒度的效率/完成度分析（单张报工单 / 厂·日驾驶舱 / 跨厂实时）
// 红线: 取数在仓储层，归并在引擎层，本层只做编排与权限收敛
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::analytics::{FactoryDashboard, ProductionDashboard, WorksheetAnalytics};
use crate::domain::org::Caller;
use crate::engine::{can_manage, can_view, AnalyticsEngine};
use crate::repository::{GroupRepository, WorksheetQuery, WorksheetRepository};
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// AnalyticsApi - 生产分析API
// ==========================================
pub struct AnalyticsApi {
    worksheet_repo: Arc<WorksheetRepository>,
    group_repo: Arc<GroupRepository>,
    engine: AnalyticsEngine,
}

impl AnalyticsApi {
    /// 创建新的 AnalyticsApi 实例
    pub fn new(worksheet_repo: Arc<WorksheetRepository>, group_repo: Arc<GroupRepository>) -> Self {
        Self {
            worksheet_repo,
            group_repo,
            engine: AnalyticsEngine::new(),
        }
    }

    /// 单张报工单的效率分析（总量/逐时/逐工人/峰谷）
    ///
    /// 无写入，重复调用结果一致
    pub fn get_analytics(&self, caller: &Caller, worksheet_id: &str) -> ApiResult<WorksheetAnalytics> {
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

        Ok(self.engine.worksheet_analytics(&aggregate))
    }

    /// 厂·日驾驶舱：单厂某日的逐组看板（日期缺省为当日）
    pub fn get_factory_dashboard(
        &self,
        caller: &Caller,
        factory_id: &str,
        date: Option<NaiveDate>,
    ) -> ApiResult<FactoryDashboard> {
        let Some((factory_name, factory_code)) = self.group_repo.find_factory(factory_id)? else {
            return Err(ApiError::NotFound(format!("厂(id={})不存在", factory_id)));
        };

        let date = date.unwrap_or_else(today);
        let aggs = self.worksheet_repo.load_aggregates(&WorksheetQuery {
            factory_id: Some(factory_id.to_string()),
            work_date: Some(date),
            ..Default::default()
        })?;

        tracing::debug!(
            caller = %caller.id,
            factory_id = %factory_id,
            date = %date,
            worksheets = aggs.len(),
            "厂·日驾驶舱"
        );
        Ok(self
            .engine
            .factory_dashboard(&factory_name, &factory_code, date, &aggs))
    }

    /// 当日生产总览：跨厂汇总 + 最近动态（日期缺省为当日）
    pub fn get_today_production_dashboard(
        &self,
        caller: &Caller,
        date: Option<NaiveDate>,
    ) -> ApiResult<ProductionDashboard> {
        let date = date.unwrap_or_else(today);
        let aggs = self.worksheet_repo.load_aggregates(&WorksheetQuery {
            work_date: Some(date),
            ..Default::default()
        })?;

        tracing::debug!(caller = %caller.id, date = %date, worksheets = aggs.len(), "当日生产总览");
        Ok(self.engine.production_dashboard(Some(date), &aggs))
    }

    /// 跨厂实时分析：可选厂/日期过滤；非管理员仅统计本人创建的报工单
    pub fn get_realtime_analytics(
        &self,
        caller: &Caller,
        factory_id: Option<&str>,
        date: Option<NaiveDate>,
    ) -> ApiResult<ProductionDashboard> {
        let created_by = if can_manage(caller) {
            None
        } else {
            Some(caller.id.clone())
        };

        let aggs = self.worksheet_repo.load_aggregates(&WorksheetQuery {
            factory_id: factory_id.map(str::to_string),
            work_date: date,
            created_by,
            ..Default::default()
        })?;

        Ok(self.engine.production_dashboard(date, &aggs))
    }
}

/// 本地日历日（"今日"判定以本地零点为界）
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
