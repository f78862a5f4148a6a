// ==========================================
// 车间报工系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AnalyticsApi, WorksheetApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{GroupRepository, ProductProcessRepository, WorksheetRepository};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 报工单操作API
    pub worksheet_api: Arc<WorksheetApi>,

    /// 生产分析API
    pub analytics_api: Arc<AnalyticsApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享数据库连接并初始化表结构
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn =
            open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("表结构初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let worksheet_repo = Arc::new(WorksheetRepository::from_connection(conn.clone()));
        let group_repo = Arc::new(GroupRepository::from_connection(conn.clone()));
        let product_repo = Arc::new(ProductProcessRepository::from_connection(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));

        // ==========================================
        // 初始化API层
        // ==========================================
        let worksheet_api = Arc::new(WorksheetApi::new(
            worksheet_repo.clone(),
            group_repo.clone(),
            product_repo,
            config_manager.clone(),
        ));
        let analytics_api = Arc::new(AnalyticsApi::new(worksheet_repo, group_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            worksheet_api,
            analytics_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 WORKSHEET_MES_DB_PATH 优先
/// - 其次用户数据目录/worksheet-mes[-dev]/worksheet_mes.db
/// - 拿不到用户数据目录时回退到当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("WORKSHEET_MES_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./worksheet_mes.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("worksheet-mes-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("worksheet-mes");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("worksheet_mes.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
