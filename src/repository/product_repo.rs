// ==========================================
// 车间报工系统 - 产品/工序数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: (product, process) 标准产量映射的只读访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::product::ProductProcess;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// ProductProcessRepository - 产品×工序仓储
// ==========================================
pub struct ProductProcessRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductProcessRepository {
    /// 创建新的 ProductProcessRepository 实例
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

    /// 按 (product_id, process_id) 查询标准产量映射
    ///
    /// # 返回
    /// - Ok(Some(ProductProcess)): 映射存在
    /// - Ok(None): 未注册该映射
    pub fn find_by_pair(
        &self,
        product_id: &str,
        process_id: &str,
    ) -> RepositoryResult<Option<ProductProcess>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT
                    pp.product_id, pp.process_id,
                    p.name, p.code,
                    pr.name, pr.code,
                    pp.standard_output_per_hour, pp.is_active
                FROM product_process pp
                JOIN product p ON p.product_id = pp.product_id
                JOIN process pr ON pr.process_id = pp.process_id
                WHERE pp.product_id = ?1 AND pp.process_id = ?2
                "#,
                params![product_id, process_id],
                |row| {
                    Ok(ProductProcess {
                        product_id: row.get(0)?,
                        process_id: row.get(1)?,
                        product_name: row.get(2)?,
                        product_code: row.get(3)?,
                        process_name: row.get(4)?,
                        process_code: row.get(5)?,
                        standard_output_per_hour: row.get(6)?,
                        is_active: row.get::<_, i64>(7)? != 0,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }
}
