// ==========================================
// 车间报工系统 - 报工单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 报工单聚合（单头/明细/小时记录/报工单元）的事务化存取
// 并发: (work_date, group_id) 唯一约束是防重复建单的唯一可靠保障；
//       建单与批量更新均在单事务内执行，读者不会看到半成品聚合
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::{RecordStatus, ShiftType, WorksheetStatus};
use crate::domain::worksheet::{
    RecordWithItemRecords, Worksheet, WorksheetAggregate, WorksheetItem, WorksheetItemRecord,
    WorksheetRecord, WorksheetSummary,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 日期存储格式
const DATE_FMT: &str = "%Y-%m-%d";
/// 时间戳存储格式
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
/// 时段时刻存储格式
const TIME_FMT: &str = "%H:%M";

// ==========================================
// 查询过滤条件
// ==========================================

/// 报工单列表查询条件（全部可选，叠加为 AND）
#[derive(Debug, Clone, Default)]
pub struct WorksheetQuery {
    pub factory_id: Option<String>,
    pub group_id: Option<String>,
    pub group_ids: Option<Vec<String>>, // 组长视角：本人领导的小组集合
    pub work_date: Option<NaiveDate>,
    pub status: Option<WorksheetStatus>,
    pub created_by: Option<String>,
    pub visible_to: Option<VisibilityScope>, // 非管理员可见范围
}

/// 非管理员的可见范围：本人创建的 OR 本人领导小组的
#[derive(Debug, Clone)]
pub struct VisibilityScope {
    pub user_id: String,
    pub led_group_ids: Vec<String>,
}

// ==========================================
// 记录更新规格（由 API 层校验后传入）
// ==========================================

/// 单条报工明细的 upsert 规格
#[derive(Debug, Clone)]
pub struct ItemRecordSpec {
    pub item_id: String,
    pub actual_output: i64,
    pub product_id: Option<String>,
    pub process_id: Option<String>,
    pub note: Option<String>,
}

/// 单条小时记录的更新规格
#[derive(Debug, Clone)]
pub struct RecordUpdateSpec {
    pub record_id: String,
    pub status: RecordStatus,
    pub item_records: Vec<ItemRecordSpec>,
}

// ==========================================
// WorksheetRepository - 报工单仓储
// ==========================================
pub struct WorksheetRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorksheetRepository {
    /// 创建新的 WorksheetRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> crate::repository::RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(
        &self,
    ) -> crate::repository::RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| crate::repository::RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 建单（事务化整图创建）
    // ==========================================

    /// 原子创建报工单聚合（单头 + 工人明细 + 小时记录）
    ///
    /// # 说明
    /// - 全部落在一个事务内：读者不会观察到"有单头没记录"的半成品
    /// - (work_date, group_id) 唯一约束冲突会以 UniqueConstraintViolation
    ///   形式返回，调用方据此映射为重复建单错误
    pub fn create_graph(
        &self,
        worksheet: &Worksheet,
        items: &[WorksheetItem],
        records: &[WorksheetRecord],
    ) -> crate::repository::RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO worksheet (
                worksheet_id, work_date, factory_id, group_id, shift_type,
                total_workers, target_output_per_hour, status,
                created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                worksheet.worksheet_id,
                worksheet.work_date.format(DATE_FMT).to_string(),
                worksheet.factory_id,
                worksheet.group_id,
                worksheet.shift_type.to_db_str(),
                worksheet.total_workers,
                worksheet.target_output_per_hour,
                worksheet.status.to_db_str(),
                worksheet.created_by,
                worksheet.created_at.format(DATETIME_FMT).to_string(),
                worksheet.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;

        for item in items {
            tx.execute(
                r#"
                INSERT INTO worksheet_item (item_id, worksheet_id, worker_id, product_id, process_id)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    item.item_id,
                    item.worksheet_id,
                    item.worker_id,
                    item.product_id,
                    item.process_id,
                ],
            )?;
        }

        for record in records {
            tx.execute(
                r#"
                INSERT INTO worksheet_record (
                    record_id, worksheet_id, work_hour, start_time, end_time, status, updated_by
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    record.record_id,
                    record.worksheet_id,
                    record.work_hour,
                    record.start_time.format(TIME_FMT).to_string(),
                    record.end_time.format(TIME_FMT).to_string(),
                    record.status.to_db_str(),
                    record.updated_by,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 预检: 该组该日是否已有报工单（仅提示用途，最终以唯一约束为准）
    pub fn exists_for(
        &self,
        work_date: NaiveDate,
        group_id: &str,
    ) -> crate::repository::RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM worksheet WHERE work_date = ?1 AND group_id = ?2 LIMIT 1",
                params![work_date.format(DATE_FMT).to_string(), group_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // ==========================================
    // 单头/记录查询
    // ==========================================

    /// 按ID查询报工单单头
    pub fn find_header(
        &self,
        worksheet_id: &str,
    ) -> crate::repository::RepositoryResult<Option<Worksheet>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                &format!("SELECT {} FROM worksheet WHERE worksheet_id = ?1", WS_COLS),
                params![worksheet_id],
                map_worksheet_row,
            )
            .optional()?;
        Ok(result)
    }

    /// 查询小时记录（必须属于指定报工单）
    pub fn find_record(
        &self,
        worksheet_id: &str,
        record_id: &str,
    ) -> crate::repository::RepositoryResult<Option<WorksheetRecord>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT record_id, worksheet_id, work_hour, start_time, end_time, status, updated_by
                FROM worksheet_record
                WHERE record_id = ?1 AND worksheet_id = ?2
                "#,
                params![record_id, worksheet_id],
                map_record_row,
            )
            .optional()?;
        Ok(result)
    }

    /// 查询报工单的全部工人明细ID（供 API 层做归属校验）
    pub fn find_item_ids(
        &self,
        worksheet_id: &str,
    ) -> crate::repository::RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT item_id FROM worksheet_item WHERE worksheet_id = ?1")?;
        let ids = stmt
            .query_map(params![worksheet_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(ids)
    }

    /// 查询报工单的全部小时记录ID集合（供批量更新做归属校验）
    pub fn find_record_ids(
        &self,
        worksheet_id: &str,
    ) -> crate::repository::RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT record_id FROM worksheet_record WHERE worksheet_id = ?1")?;
        let ids = stmt
            .query_map(params![worksheet_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(ids)
    }

    /// 加载单条小时记录及其报工明细
    pub fn load_record_with_items(
        &self,
        record_id: &str,
    ) -> crate::repository::RepositoryResult<Option<RecordWithItemRecords>> {
        let conn = self.get_conn()?;
        let record = conn
            .query_row(
                r#"
                SELECT record_id, worksheet_id, work_hour, start_time, end_time, status, updated_by
                FROM worksheet_record
                WHERE record_id = ?1
                "#,
                params![record_id],
                map_record_row,
            )
            .optional()?;

        let Some(record) = record else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT record_id, item_id, actual_output, product_id, process_id, note
            FROM worksheet_item_record
            WHERE record_id = ?1
            ORDER BY item_id ASC
            "#,
        )?;
        let item_records = stmt
            .query_map(params![record_id], map_item_record_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(Some(RecordWithItemRecords {
            record,
            item_records,
        }))
    }

    // ==========================================
    // 聚合加载
    // ==========================================

    /// 加载完整报工单聚合（单头 + 厂/组标签 + 明细 + 记录 + 报工单元）
    pub fn load_aggregate(
        &self,
        worksheet_id: &str,
    ) -> crate::repository::RepositoryResult<Option<WorksheetAggregate>> {
        let conn = self.get_conn()?;
        self.load_aggregate_with(&conn, worksheet_id)
    }

    /// 按条件加载一批报工单聚合（驾驶舱/实时分析用）
    pub fn load_aggregates(
        &self,
        query: &WorksheetQuery,
    ) -> crate::repository::RepositoryResult<Vec<WorksheetAggregate>> {
        let conn = self.get_conn()?;
        let (where_sql, args) = build_where(query, "");
        let sql = format!(
            "SELECT worksheet_id FROM worksheet{} ORDER BY work_date DESC, created_at DESC",
            where_sql
        );
        let mut stmt = conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                row.get::<_, String>(0)
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut aggs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(agg) = self.load_aggregate_with(&conn, &id)? {
                aggs.push(agg);
            }
        }
        Ok(aggs)
    }

    fn load_aggregate_with(
        &self,
        conn: &Connection,
        worksheet_id: &str,
    ) -> crate::repository::RepositoryResult<Option<WorksheetAggregate>> {
        let header = conn
            .query_row(
                &format!(
                    r#"
                    SELECT {}, f.name, f.code, g.name, g.leader_id
                    FROM worksheet w
                    JOIN factory f ON f.factory_id = w.factory_id
                    JOIN work_group g ON g.group_id = w.group_id
                    WHERE w.worksheet_id = ?1
                    "#,
                    WS_COLS_QUALIFIED
                ),
                params![worksheet_id],
                |row| {
                    Ok((
                        map_worksheet_row(row)?,
                        row.get::<_, String>(11)?,
                        row.get::<_, String>(12)?,
                        row.get::<_, String>(13)?,
                        row.get::<_, Option<String>>(14)?,
                    ))
                },
            )
            .optional()?;

        let Some((worksheet, factory_name, factory_code, group_name, leader_id)) = header else {
            return Ok(None);
        };

        // 工人明细
        let mut stmt = conn.prepare(
            r#"
            SELECT item_id, worksheet_id, worker_id, product_id, process_id
            FROM worksheet_item
            WHERE worksheet_id = ?1
            ORDER BY item_id ASC
            "#,
        )?;
        let items = stmt
            .query_map(params![worksheet_id], |row| {
                Ok(WorksheetItem {
                    item_id: row.get(0)?,
                    worksheet_id: row.get(1)?,
                    worker_id: row.get(2)?,
                    product_id: row.get(3)?,
                    process_id: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        // 小时记录
        let mut stmt = conn.prepare(
            r#"
            SELECT record_id, worksheet_id, work_hour, start_time, end_time, status, updated_by
            FROM worksheet_record
            WHERE worksheet_id = ?1
            ORDER BY work_hour ASC
            "#,
        )?;
        let records = stmt
            .query_map(params![worksheet_id], map_record_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        // 报工单元（一次取全，再按 record_id 分组）
        let mut stmt = conn.prepare(
            r#"
            SELECT ir.record_id, ir.item_id, ir.actual_output, ir.product_id, ir.process_id, ir.note
            FROM worksheet_item_record ir
            JOIN worksheet_record r ON r.record_id = ir.record_id
            WHERE r.worksheet_id = ?1
            ORDER BY ir.record_id ASC, ir.item_id ASC
            "#,
        )?;
        let all_cells = stmt
            .query_map(params![worksheet_id], map_item_record_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut by_record: HashMap<String, Vec<WorksheetItemRecord>> = HashMap::new();
        for cell in all_cells {
            by_record.entry(cell.record_id.clone()).or_default().push(cell);
        }

        let records = records
            .into_iter()
            .map(|record| {
                let item_records = by_record.remove(&record.record_id).unwrap_or_default();
                RecordWithItemRecords {
                    record,
                    item_records,
                }
            })
            .collect();

        Ok(Some(WorksheetAggregate {
            worksheet,
            factory_name,
            factory_code,
            group_name,
            leader_id,
            items,
            records,
        }))
    }

    // ==========================================
    // 记录更新（事务化批量）
    // ==========================================

    /// 在单事务内应用一批小时记录更新（全部成功或全部回滚）
    ///
    /// # 参数
    /// - worksheet_id: 所属报工单（记录归属在事务内复核）
    /// - updates: 记录更新规格（状态 + 报工明细 upsert），由 API 层完成业务校验
    /// - updated_by: 填报人ID
    ///
    /// # 返回
    /// - Ok(usize): 更新的记录条数
    /// - Err(NotFound): 任一记录不属于该报工单（整批回滚）
    pub fn apply_record_updates(
        &self,
        worksheet_id: &str,
        updates: &[RecordUpdateSpec],
        updated_by: &str,
    ) -> crate::repository::RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = chrono::Local::now().naive_local();

        for update in updates {
            // 事务内复核记录归属，防止跨单更新
            let belongs: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM worksheet_record WHERE record_id = ?1 AND worksheet_id = ?2",
                    params![update.record_id, worksheet_id],
                    |row| row.get(0),
                )
                .optional()?;
            if belongs.is_none() {
                return Err(crate::repository::RepositoryError::NotFound {
                    entity: "WorksheetRecord".to_string(),
                    id: update.record_id.clone(),
                });
            }

            tx.execute(
                "UPDATE worksheet_record SET status = ?1, updated_by = ?2 WHERE record_id = ?3",
                params![update.status.to_db_str(), updated_by, update.record_id],
            )?;

            for cell in &update.item_records {
                tx.execute(
                    r#"
                    INSERT INTO worksheet_item_record (
                        record_id, item_id, actual_output, product_id, process_id, note
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ON CONFLICT(record_id, item_id) DO UPDATE SET
                        actual_output = excluded.actual_output,
                        product_id = excluded.product_id,
                        process_id = excluded.process_id,
                        note = excluded.note
                    "#,
                    params![
                        update.record_id,
                        cell.item_id,
                        cell.actual_output,
                        cell.product_id,
                        cell.process_id,
                        cell.note,
                    ],
                )?;
            }
        }

        tx.execute(
            "UPDATE worksheet SET updated_at = ?1 WHERE worksheet_id = ?2",
            params![now.format(DATETIME_FMT).to_string(), worksheet_id],
        )?;

        tx.commit()?;
        Ok(updates.len())
    }

    // ==========================================
    // 生命周期
    // ==========================================

    /// 更新报工单状态
    pub fn update_status(
        &self,
        worksheet_id: &str,
        status: WorksheetStatus,
    ) -> crate::repository::RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let now = chrono::Local::now().naive_local();
        let count = conn.execute(
            "UPDATE worksheet SET status = ?1, updated_at = ?2 WHERE worksheet_id = ?3",
            params![
                status.to_db_str(),
                now.format(DATETIME_FMT).to_string(),
                worksheet_id
            ],
        )?;
        Ok(count)
    }

    /// 更新单头可编辑字段（状态/小时目标，均可选；二者皆空时无操作）
    pub fn update_header(
        &self,
        worksheet_id: &str,
        status: Option<WorksheetStatus>,
        target_output_per_hour: Option<i64>,
    ) -> crate::repository::RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let now = chrono::Local::now().naive_local().format(DATETIME_FMT).to_string();
        let count = match (status, target_output_per_hour) {
            (Some(status), Some(target)) => conn.execute(
                "UPDATE worksheet SET status = ?1, target_output_per_hour = ?2, updated_at = ?3 WHERE worksheet_id = ?4",
                params![status.to_db_str(), target, now, worksheet_id],
            )?,
            (Some(status), None) => conn.execute(
                "UPDATE worksheet SET status = ?1, updated_at = ?2 WHERE worksheet_id = ?3",
                params![status.to_db_str(), now, worksheet_id],
            )?,
            (None, Some(target)) => conn.execute(
                "UPDATE worksheet SET target_output_per_hour = ?1, updated_at = ?2 WHERE worksheet_id = ?3",
                params![target, now, worksheet_id],
            )?,
            (None, None) => 0,
        };
        Ok(count)
    }

    /// 批量归档早于截止日期的报工单（已归档的不重复处理）
    ///
    /// # 返回
    /// - Ok(usize): 归档条数（无匹配时为0，不视为错误）
    pub fn archive_older_than(
        &self,
        cutoff: NaiveDate,
    ) -> crate::repository::RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let now = chrono::Local::now().naive_local();
        let count = conn.execute(
            r#"
            UPDATE worksheet
            SET status = 'ARCHIVED', updated_at = ?1
            WHERE work_date < ?2 AND status != 'ARCHIVED'
            "#,
            params![
                now.format(DATETIME_FMT).to_string(),
                cutoff.format(DATE_FMT).to_string()
            ],
        )?;
        Ok(count)
    }

    /// 硬删除报工单（明细/记录/报工单元级联删除）
    pub fn delete(&self, worksheet_id: &str) -> crate::repository::RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count = conn.execute(
            "DELETE FROM worksheet WHERE worksheet_id = ?1",
            params![worksheet_id],
        )?;
        Ok(count)
    }

    // ==========================================
    // 列表查询
    // ==========================================

    /// 按条件查询报工单摘要列表（日期倒序、创建时间倒序）
    pub fn list(
        &self,
        query: &WorksheetQuery,
    ) -> crate::repository::RepositoryResult<Vec<WorksheetSummary>> {
        self.list_with_limit(query, None)
    }

    /// 按条件分页查询（page 从 1 开始）
    pub fn list_page(
        &self,
        query: &WorksheetQuery,
        page: u32,
        limit: u32,
    ) -> crate::repository::RepositoryResult<(Vec<WorksheetSummary>, i64)> {
        let offset = (page.max(1) - 1) * limit;
        let rows = self.list_with_limit(query, Some((limit, offset)))?;
        let total = self.count(query)?;
        Ok((rows, total))
    }

    /// 按条件统计报工单数
    pub fn count(&self, query: &WorksheetQuery) -> crate::repository::RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let (where_sql, args) = build_where(query, "");
        let sql = format!("SELECT COUNT(*) FROM worksheet{}", where_sql);
        let total = conn.query_row(&sql, params_from_iter(args.iter()), |row| row.get(0))?;
        Ok(total)
    }

    fn list_with_limit(
        &self,
        query: &WorksheetQuery,
        window: Option<(u32, u32)>, // (limit, offset)
    ) -> crate::repository::RepositoryResult<Vec<WorksheetSummary>> {
        let conn = self.get_conn()?;
        let (where_sql, args) = build_where(query, "w.");
        let mut sql = format!(
            r#"
            SELECT {},
                f.name, f.code, g.name,
                (SELECT COUNT(*) FROM worksheet_item i WHERE i.worksheet_id = w.worksheet_id),
                (SELECT COUNT(*) FROM worksheet_record r
                    WHERE r.worksheet_id = w.worksheet_id AND r.status = 'COMPLETED'),
                (SELECT COUNT(*) FROM worksheet_record r WHERE r.worksheet_id = w.worksheet_id)
            FROM worksheet w
            JOIN factory f ON f.factory_id = w.factory_id
            JOIN work_group g ON g.group_id = w.group_id
            {}
            ORDER BY w.work_date DESC, w.created_at DESC
            "#,
            WS_COLS_QUALIFIED, where_sql
        );
        if let Some((limit, offset)) = window {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
        }

        let mut stmt = conn.prepare(&sql)?;
        let summaries = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok(WorksheetSummary {
                    worksheet: map_worksheet_row(row)?,
                    factory_name: row.get(11)?,
                    factory_code: row.get(12)?,
                    group_name: row.get(13)?,
                    items_count: row.get(14)?,
                    completed_records: row.get(15)?,
                    total_records: row.get(16)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(summaries)
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 单头列（非限定，单表查询用）
const WS_COLS: &str = "worksheet_id, work_date, factory_id, group_id, shift_type, \
    total_workers, target_output_per_hour, status, created_by, created_at, updated_at";

/// 单头列（w. 限定，连表查询用）
const WS_COLS_QUALIFIED: &str = "w.worksheet_id, w.work_date, w.factory_id, w.group_id, \
    w.shift_type, w.total_workers, w.target_output_per_hour, w.status, w.created_by, \
    w.created_at, w.updated_at";

/// 组装 WHERE 子句与参数（prefix 用于连表查询时限定到 worksheet 表）
fn build_where(query: &WorksheetQuery, prefix: &str) -> (String, Vec<String>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<String> = Vec::new();

    let mut push = |clauses: &mut Vec<String>, args: &mut Vec<String>, col: &str, value: String| {
        args.push(value);
        clauses.push(format!("{}{} = ?{}", prefix, col, args.len()));
    };

    if let Some(factory_id) = &query.factory_id {
        push(&mut clauses, &mut args, "factory_id", factory_id.clone());
    }
    if let Some(group_id) = &query.group_id {
        push(&mut clauses, &mut args, "group_id", group_id.clone());
    }
    if let Some(date) = &query.work_date {
        push(
            &mut clauses,
            &mut args,
            "work_date",
            date.format(DATE_FMT).to_string(),
        );
    }
    if let Some(status) = &query.status {
        push(&mut clauses, &mut args, "status", status.to_db_str().to_string());
    }
    if let Some(created_by) = &query.created_by {
        push(&mut clauses, &mut args, "created_by", created_by.clone());
    }
    if let Some(group_ids) = &query.group_ids {
        if group_ids.is_empty() {
            // 空集合匹配不到任何行
            clauses.push("1 = 0".to_string());
        } else {
            let mut holes = Vec::with_capacity(group_ids.len());
            for id in group_ids {
                args.push(id.clone());
                holes.push(format!("?{}", args.len()));
            }
            clauses.push(format!("{}group_id IN ({})", prefix, holes.join(", ")));
        }
    }
    if let Some(scope) = &query.visible_to {
        args.push(scope.user_id.clone());
        let created_clause = format!("{}created_by = ?{}", prefix, args.len());
        if scope.led_group_ids.is_empty() {
            clauses.push(created_clause);
        } else {
            let mut holes = Vec::with_capacity(scope.led_group_ids.len());
            for id in &scope.led_group_ids {
                args.push(id.clone());
                holes.push(format!("?{}", args.len()));
            }
            clauses.push(format!(
                "({} OR {}group_id IN ({}))",
                created_clause,
                prefix,
                holes.join(", ")
            ));
        }
    }

    if clauses.is_empty() {
        (String::new(), args)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), args)
    }
}

/// 行 → Worksheet（列顺序与 WS_COLS 对齐）
fn map_worksheet_row(row: &Row<'_>) -> rusqlite::Result<Worksheet> {
    Ok(Worksheet {
        worksheet_id: row.get(0)?,
        work_date: parse_date(&row.get::<_, String>(1)?),
        factory_id: row.get(2)?,
        group_id: row.get(3)?,
        shift_type: ShiftType::from_str(&row.get::<_, String>(4)?),
        total_workers: row.get(5)?,
        target_output_per_hour: row.get(6)?,
        status: WorksheetStatus::from_str(&row.get::<_, String>(7)?),
        created_by: row.get(8)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?),
        updated_at: parse_datetime(&row.get::<_, String>(10)?),
    })
}

/// 行 → WorksheetRecord
fn map_record_row(row: &Row<'_>) -> rusqlite::Result<WorksheetRecord> {
    Ok(WorksheetRecord {
        record_id: row.get(0)?,
        worksheet_id: row.get(1)?,
        work_hour: row.get(2)?,
        start_time: parse_time(&row.get::<_, String>(3)?),
        end_time: parse_time(&row.get::<_, String>(4)?),
        status: RecordStatus::from_str(&row.get::<_, String>(5)?),
        updated_by: row.get(6)?,
    })
}

/// 行 → WorksheetItemRecord
fn map_item_record_row(row: &Row<'_>) -> rusqlite::Result<WorksheetItemRecord> {
    Ok(WorksheetItemRecord {
        record_id: row.get(0)?,
        item_id: row.get(1)?,
        actual_output: row.get(2)?,
        product_id: row.get(3)?,
        process_id: row.get(4)?,
        note: row.get(5)?,
    })
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FMT)
        .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT).unwrap_or_default()
}

fn parse_time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, TIME_FMT)
        .unwrap_or_else(|_| NaiveTime::from_hms_opt(0, 0, 0).unwrap())
}
