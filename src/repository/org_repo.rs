// ==========================================
// 车间报工系统 - 组织结构数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 小组链路（组→班组→产线→厂）与在岗成员的只读访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::org::{GroupChain, Worker};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// GroupRepository - 小组仓储
// ==========================================
pub struct GroupRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GroupRepository {
    /// 创建新的 GroupRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
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
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询小组及其完整组织链路与在岗 WORKER 成员
    ///
    /// # 返回
    /// - Ok(Some((chain, complete))): 小组存在；complete=false 表示链路缺失
    ///   （缺班组/产线/厂任一层），此时 chain 中链路字段为占位空串
    /// - Ok(None): 小组不存在
    ///
    /// # 说明
    /// 链路是否完整的判定交由调用方转换为业务错误；
    /// 本方法只负责如实取数。
    pub fn find_chain(&self, group_id: &str) -> RepositoryResult<Option<(GroupChain, bool)>> {
        let conn = self.get_conn()?;

        let row = conn
            .query_row(
                r#"
                SELECT
                    g.group_id, g.name, g.code, g.leader_id,
                    t.name AS team_name,
                    l.name AS line_name,
                    f.factory_id, f.name AS factory_name, f.code AS factory_code
                FROM work_group g
                LEFT JOIN team t ON t.team_id = g.team_id
                LEFT JOIN line l ON l.line_id = t.line_id
                LEFT JOIN factory f ON f.factory_id = l.factory_id
                WHERE g.group_id = ?1
                "#,
                params![group_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, Option<String>>(6)?,
                        row.get::<_, Option<String>>(7)?,
                        row.get::<_, Option<String>>(8)?,
                    ))
                },
            )
            .optional()?;

        let Some((
            group_id,
            group_name,
            group_code,
            leader_id,
            team_name,
            line_name,
            factory_id,
            factory_name,
            factory_code,
        )) = row
        else {
            return Ok(None);
        };

        // 链路任一层缺失即为不完整
        let complete = team_name.is_some()
            && line_name.is_some()
            && factory_id.is_some()
            && factory_name.is_some()
            && factory_code.is_some();

        let active_workers = self.find_active_workers(&conn, &group_id)?;

        Ok(Some((
            GroupChain {
                group_id,
                group_name,
                group_code,
                leader_id,
                team_name: team_name.unwrap_or_default(),
                line_name: line_name.unwrap_or_default(),
                factory_id: factory_id.unwrap_or_default(),
                factory_name: factory_name.unwrap_or_default(),
                factory_code: factory_code.unwrap_or_default(),
                active_workers,
            },
            complete,
        )))
    }

    /// 查询小组的组长ID（小组不存在时返回 None）
    pub fn find_leader_id(&self, group_id: &str) -> RepositoryResult<Option<Option<String>>> {
        let conn = self.get_conn()?;
        let leader = conn
            .query_row(
                "SELECT leader_id FROM work_group WHERE group_id = ?1",
                params![group_id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(leader)
    }

    /// 查询厂的名称与代码（厂不存在时返回 None）
    pub fn find_factory(&self, factory_id: &str) -> RepositoryResult<Option<(String, String)>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                "SELECT name, code FROM factory WHERE factory_id = ?1",
                params![factory_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(result)
    }

    /// 查询某用户担任组长的全部小组ID
    pub fn find_groups_led_by(&self, user_id: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT group_id FROM work_group WHERE leader_id = ?1 ORDER BY code ASC")?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(ids)
    }

    /// 查询小组的在岗 WORKER 角色成员
    fn find_active_workers(
        &self,
        conn: &Connection,
        group_id: &str,
    ) -> RepositoryResult<Vec<Worker>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT worker_id, employee_code, first_name, last_name
            FROM worker
            WHERE group_id = ?1 AND is_active = 1 AND role = 'WORKER'
            ORDER BY employee_code ASC
            "#,
        )?;
        let workers = stmt
            .query_map(params![group_id], |row| {
                Ok(Worker {
                    worker_id: row.get(0)?,
                    employee_code: row.get(1)?,
                    first_name: row.get(2)?,
                    last_name: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(workers)
    }
}
