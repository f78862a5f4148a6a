// ==========================================
// 车间报工系统 - 启动入口
// ==========================================
// 用法:
//   cargo run --bin worksheet-mes -- [db_path]
//
// 初始化数据库与应用状态，输出当日生产总览快照后退出；
// 对外服务由上层宿主（HTTP 网关等）持有 AppState 提供。
// ==========================================

use worksheet_mes::app::{get_default_db_path, AppState};
use worksheet_mes::domain::org::Caller;
use worksheet_mes::domain::types::Role;
use worksheet_mes::{logging, APP_NAME, VERSION};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let db_path = std::env::args()
        .nth(1)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(get_default_db_path);

    tracing::info!("{} v{} 启动，数据库: {}", APP_NAME, VERSION, db_path);

    let state = AppState::new(db_path)?;

    // 启动自检：以系统管理员身份取一次当日总览
    let system = Caller::new("system", Role::Superadmin);
    let dashboard = state
        .analytics_api
        .get_today_production_dashboard(&system, None)?;

    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    tracing::info!(
        worksheets = dashboard.summary.total_worksheets,
        factories = dashboard.factories.len(),
        "当日生产总览就绪"
    );

    Ok(())
}
