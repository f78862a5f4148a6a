// ==========================================
// 车间报工系统 - 效率分析引擎
// ==========================================
// 职责: 对已加载的报工单聚合做纯读取归约（不回写）
// 输入: WorksheetAggregate（单张或列表）
// 输出: domain::analytics 下的分析结构
// 红线: 除法一律做零分母保护（返回0，不得出现 NaN/报错）
// ==========================================

use chrono::NaiveDate;

use crate::domain::analytics::{
    AnalyticsSummary, FactoryDashboard, FactoryStat, GroupBoard, GroupPerformance, HourExtreme,
    HourlyMetric, ProductionDashboard, ProductionSummary, RecentActivity, TrendExtremes,
    WorkerPerformance, WorksheetAnalytics,
};
use crate::domain::worksheet::WorksheetAggregate;

/// 最近动态条数上限
const RECENT_ACTIVITY_LIMIT: usize = 10;

// ==========================================
// AnalyticsEngine - 效率分析引擎
// ==========================================
pub struct AnalyticsEngine {
    // 无状态引擎,不需要注入依赖
}

impl AnalyticsEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 单张报工单分析
    // ==========================================

    /// 计算单张报工单的完整分析
    ///
    /// # 口径
    /// - efficiency = 实际产量合计 / 目标产量合计 × 100（目标为0时取0）
    /// - completion_rate = 已完成记录数 / 记录总数 × 100（无记录时取0）
    /// - 单工人期望产量 = 单头小时目标 / 工人数 × 已报工小时数
    /// - 峰谷小时按实际产量取极值，平手取先扫描到者
    pub fn worksheet_analytics(&self, agg: &WorksheetAggregate) -> WorksheetAnalytics {
        let ws = &agg.worksheet;
        let total_records = agg.records.len() as i64;
        let completed_records = agg.completed_records() as i64;
        let total_output = agg.total_actual_output();
        let target_output = agg.total_target_output();

        // 逐小时指标
        let hourly_data: Vec<HourlyMetric> = agg
            .records
            .iter()
            .map(|r| {
                let hour_output: i64 = r.item_records.iter().map(|ir| ir.actual_output).sum();
                HourlyMetric {
                    work_hour: r.record.work_hour,
                    target_output: ws.target_output_per_hour,
                    actual_output: hour_output,
                    efficiency: rounded_pct(hour_output, ws.target_output_per_hour),
                    status: r.record.status,
                    worker_count: r.item_records.len() as i64,
                }
            })
            .collect();

        // 逐工人绩效
        let worker_performance: Vec<WorkerPerformance> = agg
            .items
            .iter()
            .map(|item| {
                let cells: Vec<i64> = agg
                    .records
                    .iter()
                    .flat_map(|r| r.item_records.iter())
                    .filter(|ir| ir.item_id == item.item_id)
                    .map(|ir| ir.actual_output)
                    .collect();
                let worker_output: i64 = cells.iter().sum();
                let hours_worked = cells.len() as i64;
                // 期望产量按人头均摊单头小时目标
                let expected_output = if ws.total_workers > 0 {
                    ws.target_output_per_hour as f64 / ws.total_workers as f64
                        * hours_worked as f64
                } else {
                    0.0
                };
                let efficiency = if expected_output > 0.0 {
                    (worker_output as f64 / expected_output * 100.0).round() as i64
                } else {
                    0
                };
                WorkerPerformance {
                    worker_id: item.worker_id.clone(),
                    total_output: worker_output,
                    hours_worked,
                    average_per_hour: if hours_worked > 0 {
                        worker_output as f64 / hours_worked as f64
                    } else {
                        0.0
                    },
                    efficiency,
                }
            })
            .collect();

        WorksheetAnalytics {
            summary: AnalyticsSummary {
                total_records,
                completed_records,
                completion_rate: rounded_pct(completed_records, total_records),
                total_output,
                target_output,
                efficiency: rounded_pct(total_output, target_output),
                total_workers: ws.total_workers,
            },
            trends: trend_extremes(&hourly_data),
            hourly_data,
            worker_performance,
        }
    }

    /// 计算小组当班绩效（驾驶舱用的紧凑口径）
    pub fn group_performance(&self, agg: &WorksheetAggregate) -> GroupPerformance {
        let total_output = agg.total_actual_output();
        let target_output = agg.total_target_output();
        GroupPerformance {
            efficiency: rounded_pct(total_output, target_output),
            completion_rate: rounded_pct(agg.completed_records() as i64, agg.records.len() as i64),
            total_output,
            target_output,
        }
    }

    // ==========================================
    // 跨报工单聚合
    // ==========================================

    /// 生产驾驶舱 / 实时分析：按厂归约一批报工单聚合
    ///
    /// # 参数
    /// - date: 聚合日期（仅用于展示；无日期过滤时传 None）
    /// - aggs: 已按可见性/过滤条件加载的报工单聚合列表
    ///
    /// # 说明
    /// 厂的出现顺序保持首次扫描到的顺序；内部累加使用精确整数和，
    /// 效率/完成率在归约完成后统一取整。
    pub fn production_dashboard(
        &self,
        date: Option<NaiveDate>,
        aggs: &[WorksheetAggregate],
    ) -> ProductionDashboard {
        let mut factories: Vec<FactoryStat> = Vec::new();
        let mut total_workers = 0i64;
        let mut total_target = 0i64;
        let mut total_actual = 0i64;
        let mut total_records = 0i64;
        let mut completed_records = 0i64;

        for agg in aggs {
            let ws = &agg.worksheet;
            let sheet_target = agg.total_target_output();
            let sheet_actual = agg.total_actual_output();
            let sheet_records = agg.records.len() as i64;
            let sheet_completed = agg.completed_records() as i64;

            total_workers += ws.total_workers;
            total_target += sheet_target;
            total_actual += sheet_actual;
            total_records += sheet_records;
            completed_records += sheet_completed;

            let stat = match factories.iter_mut().find(|f| f.code == agg.factory_code) {
                Some(stat) => stat,
                None => {
                    factories.push(FactoryStat {
                        name: agg.factory_name.clone(),
                        code: agg.factory_code.clone(),
                        worksheets: 0,
                        workers: 0,
                        target_output: 0,
                        actual_output: 0,
                        completed_records: 0,
                        total_records: 0,
                        efficiency: 0,
                        completion_rate: 0,
                    });
                    factories.last_mut().expect("刚插入的元素必然存在")
                }
            };
            stat.worksheets += 1;
            stat.workers += ws.total_workers;
            stat.target_output += sheet_target;
            stat.actual_output += sheet_actual;
            stat.completed_records += sheet_completed;
            stat.total_records += sheet_records;
        }

        // 归约完成后统一推导百分比
        for stat in &mut factories {
            stat.efficiency = rounded_pct(stat.actual_output, stat.target_output);
            stat.completion_rate = rounded_pct(stat.completed_records, stat.total_records);
        }

        ProductionDashboard {
            summary: ProductionSummary {
                date,
                total_worksheets: aggs.len() as i64,
                total_workers,
                total_target_output: total_target,
                total_actual_output: total_actual,
                overall_efficiency: rounded_pct(total_actual, total_target),
                completion_rate: rounded_pct(completed_records, total_records),
                active_factories: factories.len() as i64,
            },
            factories,
            recent_activity: recent_activity(aggs),
        }
    }

    /// 单厂单日驾驶舱
    ///
    /// avg_efficiency 为各报工单效率（已取整）的算术平均再取整；无单时为0
    pub fn factory_dashboard(
        &self,
        factory_name: &str,
        factory_code: &str,
        date: NaiveDate,
        aggs: &[WorksheetAggregate],
    ) -> FactoryDashboard {
        let boards: Vec<GroupBoard> = aggs
            .iter()
            .map(|agg| GroupBoard {
                worksheet_id: agg.worksheet.worksheet_id.clone(),
                group_name: agg.group_name.clone(),
                status: agg.worksheet.status,
                performance: self.group_performance(agg),
            })
            .collect();

        let avg_efficiency = if boards.is_empty() {
            0
        } else {
            let total: i64 = boards.iter().map(|b| b.performance.efficiency).sum();
            (total as f64 / boards.len() as f64).round() as i64
        };

        FactoryDashboard {
            factory_name: factory_name.to_string(),
            factory_code: factory_code.to_string(),
            date,
            total_groups: boards.len() as i64,
            total_workers: aggs.iter().map(|a| a.worksheet.total_workers).sum(),
            avg_efficiency,
            worksheets: boards,
        }
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 百分比（零分母保护 + 取整）
fn rounded_pct(numerator: i64, denominator: i64) -> i64 {
    if denominator > 0 {
        (numerator as f64 / denominator as f64 * 100.0).round() as i64
    } else {
        0
    }
}

/// 峰谷小时（严格大于/小于才替换，平手保留先扫描到者）
fn trend_extremes(hourly: &[HourlyMetric]) -> TrendExtremes {
    let mut peak: Option<&HourlyMetric> = None;
    let mut lowest: Option<&HourlyMetric> = None;
    for h in hourly {
        match peak {
            Some(p) if h.actual_output <= p.actual_output => {}
            _ => peak = Some(h),
        }
        match lowest {
            Some(l) if h.actual_output >= l.actual_output => {}
            _ => lowest = Some(h),
        }
    }
    let to_extreme = |m: &HourlyMetric| HourExtreme {
        work_hour: m.work_hour,
        actual_output: m.actual_output,
    };
    TrendExtremes {
        peak_hour: peak.map(to_extreme),
        lowest_hour: lowest.map(to_extreme),
    }
}

/// 最近动态（按更新时间倒序，上限10条）
fn recent_activity(aggs: &[WorksheetAggregate]) -> Vec<RecentActivity> {
    let mut entries: Vec<RecentActivity> = aggs
        .iter()
        .map(|agg| RecentActivity {
            worksheet_id: agg.worksheet.worksheet_id.clone(),
            factory: agg.factory_name.clone(),
            group: agg.group_name.clone(),
            status: agg.worksheet.status,
            updated_at: agg.worksheet.updated_at,
        })
        .collect();
    entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    entries.truncate(RECENT_ACTIVITY_LIMIT);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{RecordStatus, ShiftType, WorksheetStatus};
    use crate::domain::worksheet::{
        RecordWithItemRecords, Worksheet, WorksheetItem, WorksheetItemRecord, WorksheetRecord,
    };
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn test_aggregate(target_per_hour: i64, workers: usize, hours: usize) -> WorksheetAggregate {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let now = NaiveDateTime::new(date, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        let items: Vec<WorksheetItem> = (0..workers)
            .map(|i| WorksheetItem {
                item_id: format!("item-{}", i),
                worksheet_id: "ws-1".to_string(),
                worker_id: format!("worker-{}", i),
                product_id: "prod-1".to_string(),
                process_id: "proc-1".to_string(),
            })
            .collect();
        let records: Vec<RecordWithItemRecords> = (0..hours)
            .map(|h| RecordWithItemRecords {
                record: WorksheetRecord {
                    record_id: format!("rec-{}", h),
                    worksheet_id: "ws-1".to_string(),
                    work_hour: h as i64 + 1,
                    start_time: NaiveTime::from_hms_opt(7 + h as u32, 30, 0).unwrap(),
                    end_time: NaiveTime::from_hms_opt(8 + h as u32, 30, 0).unwrap(),
                    status: RecordStatus::Pending,
                    updated_by: None,
                },
                item_records: Vec::new(),
            })
            .collect();
        WorksheetAggregate {
            worksheet: Worksheet {
                worksheet_id: "ws-1".to_string(),
                work_date: date,
                factory_id: "f-1".to_string(),
                group_id: "g-1".to_string(),
                shift_type: ShiftType::Normal8h,
                total_workers: workers as i64,
                target_output_per_hour: target_per_hour,
                status: WorksheetStatus::Active,
                created_by: "creator-1".to_string(),
                created_at: now,
                updated_at: now,
            },
            factory_name: "一厂".to_string(),
            factory_code: "F1".to_string(),
            group_name: "甲组".to_string(),
            leader_id: Some("leader-1".to_string()),
            items,
            records,
        }
    }

    fn cell(record_id: &str, item_id: &str, output: i64) -> WorksheetItemRecord {
        WorksheetItemRecord {
            record_id: record_id.to_string(),
            item_id: item_id.to_string(),
            actual_output: output,
            product_id: None,
            process_id: None,
            note: None,
        }
    }

    #[test]
    fn test_零分母保护() {
        let engine = AnalyticsEngine::new();
        // 目标为0、无记录
        let agg = test_aggregate(0, 2, 0);
        let analytics = engine.worksheet_analytics(&agg);
        assert_eq!(analytics.summary.efficiency, 0);
        assert_eq!(analytics.summary.completion_rate, 0);
        assert!(analytics.trends.peak_hour.is_none());
        assert!(analytics.trends.lowest_hour.is_none());
    }

    #[test]
    fn test_单张报工单口径() {
        let engine = AnalyticsEngine::new();
        let mut agg = test_aggregate(40, 2, 2);
        agg.records[0].item_records.push(cell("rec-0", "item-0", 30));
        agg.records[0].item_records.push(cell("rec-0", "item-1", 10));
        agg.records[1].item_records.push(cell("rec-1", "item-0", 20));
        agg.records[1].record.status = RecordStatus::Completed;

        let analytics = engine.worksheet_analytics(&agg);
        assert_eq!(analytics.summary.total_output, 60);
        assert_eq!(analytics.summary.target_output, 80);
        assert_eq!(analytics.summary.efficiency, 75);
        assert_eq!(analytics.summary.completion_rate, 50);

        // 逐小时
        assert_eq!(analytics.hourly_data[0].actual_output, 40);
        assert_eq!(analytics.hourly_data[0].efficiency, 100);
        assert_eq!(analytics.hourly_data[0].worker_count, 2);
        assert_eq!(analytics.hourly_data[1].worker_count, 1);

        // 逐工人: item-0 报了2小时共50，期望 40/2*2=40 → 125%
        let w0 = &analytics.worker_performance[0];
        assert_eq!(w0.total_output, 50);
        assert_eq!(w0.hours_worked, 2);
        assert_eq!(w0.efficiency, 125);

        // 峰谷
        assert_eq!(analytics.trends.peak_hour.as_ref().unwrap().work_hour, 1);
        assert_eq!(analytics.trends.lowest_hour.as_ref().unwrap().work_hour, 2);
    }

    #[test]
    fn test_峰谷平手取先扫描到者() {
        let engine = AnalyticsEngine::new();
        let mut agg = test_aggregate(10, 1, 3);
        agg.records[0].item_records.push(cell("rec-0", "item-0", 5));
        agg.records[1].item_records.push(cell("rec-1", "item-0", 5));
        agg.records[2].item_records.push(cell("rec-2", "item-0", 5));
        let analytics = engine.worksheet_analytics(&agg);
        assert_eq!(analytics.trends.peak_hour.as_ref().unwrap().work_hour, 1);
        assert_eq!(analytics.trends.lowest_hour.as_ref().unwrap().work_hour, 1);
    }

    #[test]
    fn test_分析幂等() {
        let engine = AnalyticsEngine::new();
        let mut agg = test_aggregate(40, 2, 2);
        agg.records[0].item_records.push(cell("rec-0", "item-0", 33));
        assert_eq!(
            engine.worksheet_analytics(&agg),
            engine.worksheet_analytics(&agg)
        );
    }

    #[test]
    fn test_跨厂归约() {
        let engine = AnalyticsEngine::new();
        let mut agg1 = test_aggregate(40, 2, 2);
        agg1.records[0].item_records.push(cell("rec-0", "item-0", 80));
        let mut agg2 = test_aggregate(10, 1, 1);
        agg2.worksheet.worksheet_id = "ws-2".to_string();
        agg2.factory_code = "F2".to_string();
        agg2.factory_name = "二厂".to_string();
        agg2.records[0].item_records.push(cell("rec-0", "item-0", 5));

        let dashboard = engine.production_dashboard(None, &[agg1, agg2]);
        assert_eq!(dashboard.summary.total_worksheets, 2);
        assert_eq!(dashboard.summary.active_factories, 2);
        assert_eq!(dashboard.summary.total_target_output, 90);
        assert_eq!(dashboard.summary.total_actual_output, 85);
        // 85/90 = 94.4% → 94
        assert_eq!(dashboard.summary.overall_efficiency, 94);
        // 厂顺序保持首次扫描顺序
        assert_eq!(dashboard.factories[0].code, "F1");
        assert_eq!(dashboard.factories[1].code, "F2");
        assert_eq!(dashboard.factories[0].efficiency, 100);
        assert_eq!(dashboard.factories[1].efficiency, 50);
    }

    #[test]
    fn test_单厂驾驶舱平均效率() {
        let engine = AnalyticsEngine::new();
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let mut agg1 = test_aggregate(10, 1, 1);
        agg1.records[0].item_records.push(cell("rec-0", "item-0", 10));
        let mut agg2 = test_aggregate(10, 1, 1);
        agg2.worksheet.worksheet_id = "ws-2".to_string();
        agg2.records[0].item_records.push(cell("rec-0", "item-0", 5));

        let board = engine.factory_dashboard("一厂", "F1", date, &[agg1, agg2]);
        assert_eq!(board.total_groups, 2);
        // (100 + 50) / 2 = 75
        assert_eq!(board.avg_efficiency, 75);

        let empty = engine.factory_dashboard("一厂", "F1", date, &[]);
        assert_eq!(empty.avg_efficiency, 0);
    }
}
