// ==========================================
// 生产分析API集成测试
// ==========================================
// 测试范围:
// 1. 单张报工单分析: 口径与幂等
// 2. 当日生产总览: 跨厂归约与最近动态
// 3. 单厂驾驶舱: 逐组看板
// 4. 跨厂实时分析: 非管理员仅统计本人创建的
// ==========================================


use chrono::NaiveDate;
use test_helpers::*;
use worksheet_mes::api::{
    ApiError, BatchRecordUpdate, BatchUpdateRequest, CreateWorksheetRequest, ItemRecordUpdate,
};
use worksheet_mes::domain::types::{RecordStatus, ShiftType};

fn work_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

/// 建单并把第1小时全员各报 per_worker 件（记录标记完成），返回 worksheet_id
fn seed_reported_worksheet(
    env: &TestEnv,
    suffix: &str,
    workers: usize,
    standard: i64,
    per_worker: i64,
    creator: &worksheet_mes::domain::org::Caller,
) -> String {
    let group_id = env.seed_full_chain(suffix, Some(&format!("leader-{}", suffix)));
    env.seed_workers(&group_id, workers);
    env.seed_product_process("p1", "pr1", standard, true);

    let ws = env
        .worksheet_api
        .create_worksheet(
            creator,
            &CreateWorksheetRequest {
                work_date: work_date(),
                group_id,
                shift_type: ShiftType::Normal8h,
                product_id: "p1".to_string(),
                process_id: "pr1".to_string(),
            },
        )
        .expect("建单失败")
        .worksheet;

    let update = BatchUpdateRequest {
        records: vec![BatchRecordUpdate {
            record_id: ws.records[0].record.record_id.clone(),
            status: Some(RecordStatus::Completed),
            item_records: ws
                .items
                .iter()
                .map(|item| ItemRecordUpdate {
                    item_id: item.item_id.clone(),
                    actual_output: per_worker,
                    product_id: None,
                    process_id: None,
                    note: None,
                })
                .collect(),
        }],
    };
    env.worksheet_api
        .batch_update_records(&admin(), &ws.worksheet.worksheet_id, &update)
        .expect("报工失败");
    ws.worksheet.worksheet_id
}

#[test]
fn test_单张分析_口径与幂等() {
    let env = TestEnv::new().expect("无法创建测试环境");
    // 5人×标准45 → 目标45；第1小时全员各报9 → 该小时45件
    let ws_id = seed_reported_worksheet(&env, "a", 5, 45, 9, &admin());

    let analytics = env
        .analytics_api
        .get_analytics(&admin(), &ws_id)
        .expect("分析失败");

    assert_eq!(analytics.summary.total_records, 8);
    assert_eq!(analytics.summary.completed_records, 1);
    // 1/8 = 12.5% → 13（四舍五入取整）
    assert_eq!(analytics.summary.completion_rate, 13);
    assert_eq!(analytics.summary.total_output, 45);
    assert_eq!(analytics.summary.target_output, 45 * 8);
    // 45/360 = 12.5% → 13
    assert_eq!(analytics.summary.efficiency, 13);

    // 第1小时满产
    assert_eq!(analytics.hourly_data[0].actual_output, 45);
    assert_eq!(analytics.hourly_data[0].efficiency, 100);
    assert_eq!(analytics.hourly_data[0].worker_count, 5);
    // 峰在第1小时，谷取平手中先扫描到的第2小时
    assert_eq!(analytics.trends.peak_hour.as_ref().unwrap().work_hour, 1);
    assert_eq!(analytics.trends.lowest_hour.as_ref().unwrap().work_hour, 2);

    // 逐工人: 每人报9，期望 45/5×1=9 → 100%
    for w in &analytics.worker_performance {
        assert_eq!(w.total_output, 9);
        assert_eq!(w.efficiency, 100);
    }

    // 无写入重复调用结果一致
    let again = env
        .analytics_api
        .get_analytics(&admin(), &ws_id)
        .expect("分析失败");
    assert_eq!(analytics, again);
}

#[test]
fn test_单张分析_越权与缺单() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let ws_id = seed_reported_worksheet(&env, "a", 3, 45, 9, &admin());

    let err = env
        .analytics_api
        .get_analytics(&plain_user("stranger"), &ws_id)
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)), "{:?}", err);

    let err = env
        .analytics_api
        .get_analytics(&admin(), "ws-missing")
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "{:?}", err);
}

#[test]
fn test_当日总览_跨厂归约() {
    let env = TestEnv::new().expect("无法创建测试环境");
    // 厂a: 5人 目标45 实报45 → 100%；厂b: 5人 目标45 实报9×5=45? 改: per_worker=4 → 20件
    seed_reported_worksheet(&env, "a", 5, 45, 9, &admin());
    seed_reported_worksheet(&env, "b", 5, 45, 4, &admin());

    let dashboard = env
        .analytics_api
        .get_today_production_dashboard(&admin(), Some(work_date()))
        .expect("总览失败");

    assert_eq!(dashboard.summary.total_worksheets, 2);
    assert_eq!(dashboard.summary.active_factories, 2);
    assert_eq!(dashboard.summary.total_workers, 10);
    assert_eq!(dashboard.summary.total_actual_output, 45 + 20);
    assert_eq!(dashboard.summary.total_target_output, 45 * 8 * 2);

    assert_eq!(dashboard.factories.len(), 2);
    let f_a = dashboard
        .factories
        .iter()
        .find(|f| f.name.contains('a'))
        .expect("缺厂a");
    assert_eq!(f_a.worksheets, 1);
    assert_eq!(f_a.actual_output, 45);

    // 最近动态包含两张单
    assert_eq!(dashboard.recent_activity.len(), 2);

    // 另一天为空
    let other_day = env
        .analytics_api
        .get_today_production_dashboard(&admin(), Some(work_date().succ_opt().unwrap()))
        .expect("总览失败");
    assert_eq!(other_day.summary.total_worksheets, 0);
    assert!(other_day.factories.is_empty());
    assert_eq!(other_day.summary.overall_efficiency, 0);
}

#[test]
fn test_单厂驾驶舱() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let ws_id = seed_reported_worksheet(&env, "a", 5, 45, 9, &admin());

    let board = env
        .analytics_api
        .get_factory_dashboard(&admin(), "f-a", Some(work_date()))
        .expect("驾驶舱失败");

    assert_eq!(board.factory_code, "F-f-a");
    assert_eq!(board.total_groups, 1);
    assert_eq!(board.total_workers, 5);
    assert_eq!(board.worksheets[0].worksheet_id, ws_id);
    // 单张单: 45/360 → 13%
    assert_eq!(board.avg_efficiency, 13);

    let err = env
        .analytics_api
        .get_factory_dashboard(&admin(), "f-missing", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "{:?}", err);
}

#[test]
fn test_实时分析_非管理员仅见本人创建() {
    let env = TestEnv::new().expect("无法创建测试环境");
    // leader-a 自建一张，管理员在厂b另建一张
    seed_reported_worksheet(&env, "a", 3, 45, 9, &leader("leader-a"));
    seed_reported_worksheet(&env, "b", 3, 45, 9, &admin());

    // 管理员视角: 两张
    let all = env
        .analytics_api
        .get_realtime_analytics(&admin(), None, Some(work_date()))
        .expect("实时分析失败");
    assert_eq!(all.summary.total_worksheets, 2);

    // 组长视角: 仅本人创建的一张
    let mine = env
        .analytics_api
        .get_realtime_analytics(&leader("leader-a"), None, Some(work_date()))
        .expect("实时分析失败");
    assert_eq!(mine.summary.total_worksheets, 1);

    // 厂过滤
    let scoped = env
        .analytics_api
        .get_realtime_analytics(&admin(), Some("f-b"), Some(work_date()))
        .expect("实时分析失败");
    assert_eq!(scoped.summary.total_worksheets, 1);
    assert_eq!(scoped.factories[0].name, "测试厂b");
}
