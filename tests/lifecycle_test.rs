// ==========================================
// 生命周期与列表查询集成测试
// ==========================================
// 测试范围:
// 1. 完成/归档/删除: 权限与计数语义
// 2. 单头更新: 状态与小时目标
// 3. 列表: 角色可见性、过滤、分页
// ==========================================


use chrono::NaiveDate;
use test_helpers::*;
use worksheet_mes::api::{
    ApiError, CreateWorksheetRequest, UpdateWorksheetRequest, WorksheetFilter,
};
use worksheet_mes::domain::types::{ShiftType, WorksheetStatus};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

/// 在已播种的小组上按日期建单，返回 worksheet_id
fn create_on(
    env: &TestEnv,
    group_id: &str,
    day: u32,
    creator: &worksheet_mes::domain::org::Caller,
) -> String {
    env.worksheet_api
        .create_worksheet(
            creator,
            &CreateWorksheetRequest {
                work_date: date(day),
                group_id: group_id.to_string(),
                shift_type: ShiftType::Normal8h,
                product_id: "p1".to_string(),
                process_id: "pr1".to_string(),
            },
        )
        .expect("建单失败")
        .worksheet
        .worksheet
        .worksheet_id
}

fn seed_group(env: &TestEnv, suffix: &str, leader_id: Option<&str>) -> String {
    let group_id = env.seed_full_chain(suffix, leader_id);
    env.seed_workers(&group_id, 3);
    env.seed_product_process("p1", "pr1", 45, true);
    group_id
}

#[test]
fn test_完成报工单() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let group_id = seed_group(&env, "a", Some("leader-a"));
    let ws_id = create_on(&env, &group_id, 2, &admin());

    let header = env
        .worksheet_api
        .complete_worksheet(&leader("leader-a"), &ws_id)
        .expect("完成失败");
    assert_eq!(header.status, WorksheetStatus::Completed);

    // 非组长不可完成
    let err = env
        .worksheet_api
        .complete_worksheet(&plain_user("stranger"), &ws_id)
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)), "{:?}", err);
}

#[test]
fn test_批量归档_计数与跳过已归档() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let group_id = seed_group(&env, "a", None);
    create_on(&env, &group_id, 1, &admin());
    create_on(&env, &group_id, 2, &admin());
    let ws_recent = create_on(&env, &group_id, 10, &admin());

    // 3/5 之前的两张被归档
    let result = env
        .worksheet_api
        .archive_older_than(&admin(), date(5))
        .expect("归档失败");
    assert_eq!(result.archived_count, 2);

    // 再次归档同一截止日: 已归档的不重复计数
    let again = env
        .worksheet_api
        .archive_older_than(&admin(), date(5))
        .expect("归档失败");
    assert_eq!(again.archived_count, 0);

    // 晚于截止日的不受影响
    let recent = env
        .worksheet_api
        .get_worksheet(&admin(), &ws_recent)
        .expect("查询失败");
    assert_eq!(recent.worksheet.status, WorksheetStatus::Active);
}

#[test]
fn test_批量归档_无匹配返回零() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let result = env
        .worksheet_api
        .archive_older_than(&admin(), date(1))
        .expect("归档失败");
    assert_eq!(result.archived_count, 0);
}

#[test]
fn test_归档后仍可标记完成() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let group_id = seed_group(&env, "a", Some("leader-a"));
    let ws_id = create_on(&env, &group_id, 1, &admin());

    env.worksheet_api
        .archive_older_than(&admin(), date(5))
        .expect("归档失败");

    // 状态机允许从 ARCHIVED 标记完成（补录场景）
    let header = env
        .worksheet_api
        .complete_worksheet(&admin(), &ws_id)
        .expect("完成失败");
    assert_eq!(header.status, WorksheetStatus::Completed);
}

#[test]
fn test_归档与删除仅管理员() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let group_id = seed_group(&env, "a", Some("leader-a"));
    let ws_id = create_on(&env, &group_id, 2, &admin());

    let err = env
        .worksheet_api
        .archive_older_than(&leader("leader-a"), date(5))
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)), "{:?}", err);

    let err = env
        .worksheet_api
        .remove(&leader("leader-a"), &ws_id)
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)), "{:?}", err);
}

#[test]
fn test_删除级联() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let group_id = seed_group(&env, "a", None);
    let ws_id = create_on(&env, &group_id, 2, &admin());

    env.worksheet_api
        .remove(&admin(), &ws_id)
        .expect("删除失败");

    let err = env.worksheet_api.get_worksheet(&admin(), &ws_id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "{:?}", err);

    // 明细/记录随单级联删除
    {
        let conn = env.conn.lock().unwrap();
        let records: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM worksheet_record WHERE worksheet_id = ?1",
                [&ws_id],
                |row| row.get(0),
            )
            .unwrap();
        let items: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM worksheet_item WHERE worksheet_id = ?1",
                [&ws_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(records, 0);
        assert_eq!(items, 0);
    }

    // 删除不存在的单
    let err = env.worksheet_api.remove(&admin(), "ws-missing").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "{:?}", err);
}

#[test]
fn test_单头更新() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let group_id = seed_group(&env, "a", Some("leader-a"));
    let ws_id = create_on(&env, &group_id, 2, &admin());

    let header = env
        .worksheet_api
        .update_worksheet(
            &leader("leader-a"),
            &ws_id,
            &UpdateWorksheetRequest {
                status: Some(WorksheetStatus::Completed),
                target_output_per_hour: Some(50),
            },
        )
        .expect("单头更新失败");
    assert_eq!(header.status, WorksheetStatus::Completed);
    assert_eq!(header.target_output_per_hour, 50);

    // 负目标被拒
    let err = env
        .worksheet_api
        .update_worksheet(
            &admin(),
            &ws_id,
            &UpdateWorksheetRequest {
                status: None,
                target_output_per_hour: Some(-1),
            },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidOutput(_)), "{:?}", err);

    // 空更新为无操作
    let unchanged = env
        .worksheet_api
        .update_worksheet(&admin(), &ws_id, &UpdateWorksheetRequest::default())
        .expect("空更新失败");
    assert_eq!(unchanged.target_output_per_hour, 50);
}

#[test]
fn test_列表_角色可见性() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let group_a = seed_group(&env, "a", Some("leader-a"));
    let group_b = seed_group(&env, "b", Some("leader-b"));
    create_on(&env, &group_a, 2, &admin());
    create_on(&env, &group_b, 2, &leader("leader-b"));

    // 管理员全量
    let all = env
        .worksheet_api
        .list_worksheets(&admin(), &WorksheetFilter::default())
        .expect("列表失败");
    assert_eq!(all.len(), 2);

    // leader-a 领导组a → 见组a的单（虽非本人创建）
    let mine = env
        .worksheet_api
        .list_worksheets(&leader("leader-a"), &WorksheetFilter::default())
        .expect("列表失败");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].worksheet.group_id, group_a);

    // leader-b 自建自领 → 一张
    let theirs = env
        .worksheet_api
        .list_worksheets(&leader("leader-b"), &WorksheetFilter::default())
        .expect("列表失败");
    assert_eq!(theirs.len(), 1);

    // 无关用户 → 空
    let none = env
        .worksheet_api
        .list_worksheets(&plain_user("stranger"), &WorksheetFilter::default())
        .expect("列表失败");
    assert!(none.is_empty());
}

#[test]
fn test_列表_过滤与摘要计数() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let group_a = seed_group(&env, "a", None);
    let group_b = seed_group(&env, "b", None);
    create_on(&env, &group_a, 1, &admin());
    create_on(&env, &group_a, 2, &admin());
    create_on(&env, &group_b, 2, &admin());

    // 按厂过滤
    let in_a = env
        .worksheet_api
        .list_worksheets(
            &admin(),
            &WorksheetFilter {
                factory_id: Some("f-a".to_string()),
                ..Default::default()
            },
        )
        .expect("列表失败");
    assert_eq!(in_a.len(), 2);
    assert!(in_a.iter().all(|s| s.factory_name == "测试厂a"));

    // 按日期过滤
    let on_2 = env
        .worksheet_api
        .list_worksheets(
            &admin(),
            &WorksheetFilter {
                work_date: Some(date(2)),
                ..Default::default()
            },
        )
        .expect("列表失败");
    assert_eq!(on_2.len(), 2);

    // 摘要计数: 3人 8小时
    assert_eq!(on_2[0].items_count, 3);
    assert_eq!(on_2[0].total_records, 8);
    assert_eq!(on_2[0].completed_records, 0);

    // 按状态过滤
    env.worksheet_api
        .archive_older_than(&admin(), date(2))
        .expect("归档失败");
    let archived = env
        .worksheet_api
        .list_worksheets(
            &admin(),
            &WorksheetFilter {
                status: Some(WorksheetStatus::Archived),
                ..Default::default()
            },
        )
        .expect("列表失败");
    assert_eq!(archived.len(), 1);
}

#[test]
fn test_列表_分页() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let group_id = seed_group(&env, "a", None);
    for day in 1..=5 {
        create_on(&env, &group_id, day, &admin());
    }

    let page1 = env
        .worksheet_api
        .list_worksheets_paginated(&admin(), &WorksheetFilter::default(), 1, 2)
        .expect("分页失败");
    assert_eq!(page1.items.len(), 2);
    assert_eq!(page1.total, 5);
    assert_eq!(page1.total_pages, 3);
    // 日期倒序
    assert_eq!(page1.items[0].worksheet.work_date, date(5));

    let page3 = env
        .worksheet_api
        .list_worksheets_paginated(&admin(), &WorksheetFilter::default(), 3, 2)
        .expect("分页失败");
    assert_eq!(page3.items.len(), 1);
    assert_eq!(page3.items[0].worksheet.work_date, date(1));
}

#[test]
fn test_小组报工单查询() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let group_id = seed_group(&env, "a", Some("leader-a"));
    create_on(&env, &group_id, 1, &admin());
    create_on(&env, &group_id, 2, &admin());

    // 组长查本组: 日期过滤
    let on_2 = env
        .worksheet_api
        .get_group_worksheets(&leader("leader-a"), &group_id, Some(date(2)))
        .expect("查询失败");
    assert_eq!(on_2.len(), 1);

    // 非组长被拒
    let err = env
        .worksheet_api
        .get_group_worksheets(&plain_user("stranger"), &group_id, None)
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)), "{:?}", err);

    // 小组不存在
    let err = env
        .worksheet_api
        .get_group_worksheets(&admin(), "g-missing", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "{:?}", err);

    // 我领导的小组
    let mine = env
        .worksheet_api
        .get_my_group_worksheets(&leader("leader-a"), None)
        .expect("查询失败");
    assert_eq!(mine.len(), 2);

    let none = env
        .worksheet_api
        .get_my_group_worksheets(&plain_user("stranger"), None)
        .expect("查询失败");
    assert!(none.is_empty());
}
