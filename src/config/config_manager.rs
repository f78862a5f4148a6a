// ==========================================
// 车间报工系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::proration::DEFAULT_BASELINE_CREW_SIZE;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 目标产量折算基数的配置键
pub const KEY_BASELINE_CREW_SIZE: &str = "worksheet.baseline_crew_size";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（scope_id='global'，upsert）
    fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 目标产量折算基数（标准产量标定时的班组人数）
    ///
    /// 未配置或配置非法时回退为默认值 5
    pub fn baseline_crew_size(&self) -> i64 {
        match self.get_config_value(KEY_BASELINE_CREW_SIZE) {
            Ok(Some(v)) => match v.parse::<i64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!("折算基数配置非法({}), 回退默认值", v);
                    DEFAULT_BASELINE_CREW_SIZE
                }
            },
            Ok(None) => DEFAULT_BASELINE_CREW_SIZE,
            Err(e) => {
                tracing::warn!("读取折算基数失败({}), 回退默认值", e);
                DEFAULT_BASELINE_CREW_SIZE
            }
        }
    }

    /// 覆写目标产量折算基数
    pub fn set_baseline_crew_size(&self, size: i64) -> Result<(), Box<dyn Error>> {
        if size <= 0 {
            return Err(format!("折算基数必须为正: {}", size).into());
        }
        self.set_config_value(KEY_BASELINE_CREW_SIZE, &size.to_string())
    }
}
