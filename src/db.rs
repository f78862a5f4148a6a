// ==========================================
// 车间报工系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供幂等的 schema 初始化（主程序与测试共用同一份建表语句）
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等初始化数据库 schema
///
/// # 说明
/// - 所有表使用 CREATE TABLE IF NOT EXISTS，可安全重复执行
/// - (work_date, group_id) 的唯一约束是防止同组同日重复报工单的
///   唯一并发正确性保障（应用层的预检查仅作提示用途）
/// - (record_id, item_id) 的复合主键保障报工明细 upsert 不产生重复行
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- ===== 配置表 =====
        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        -- ===== 组织结构表（厂 → 产线 → 班组 → 小组） =====
        CREATE TABLE IF NOT EXISTS factory (
            factory_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS line (
            line_id TEXT PRIMARY KEY,
            factory_id TEXT REFERENCES factory(factory_id),
            name TEXT NOT NULL,
            code TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS team (
            team_id TEXT PRIMARY KEY,
            line_id TEXT REFERENCES line(line_id),
            name TEXT NOT NULL,
            code TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS work_group (
            group_id TEXT PRIMARY KEY,
            team_id TEXT REFERENCES team(team_id),
            name TEXT NOT NULL,
            code TEXT NOT NULL,
            leader_id TEXT
        );

        CREATE TABLE IF NOT EXISTS worker (
            worker_id TEXT PRIMARY KEY,
            group_id TEXT REFERENCES work_group(group_id),
            employee_code TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            role TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        );

        -- ===== 产品与工序表 =====
        CREATE TABLE IF NOT EXISTS product (
            product_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS process (
            process_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS product_process (
            product_id TEXT NOT NULL REFERENCES product(product_id),
            process_id TEXT NOT NULL REFERENCES process(process_id),
            standard_output_per_hour INTEGER NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (product_id, process_id)
        );

        -- ===== 报工单聚合表 =====
        CREATE TABLE IF NOT EXISTS worksheet (
            worksheet_id TEXT PRIMARY KEY,
            work_date TEXT NOT NULL,
            factory_id TEXT NOT NULL REFERENCES factory(factory_id),
            group_id TEXT NOT NULL REFERENCES work_group(group_id),
            shift_type TEXT NOT NULL,
            total_workers INTEGER NOT NULL,
            target_output_per_hour INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (work_date, group_id)
        );

        CREATE TABLE IF NOT EXISTS worksheet_item (
            item_id TEXT PRIMARY KEY,
            worksheet_id TEXT NOT NULL REFERENCES worksheet(worksheet_id) ON DELETE CASCADE,
            worker_id TEXT NOT NULL REFERENCES worker(worker_id),
            product_id TEXT NOT NULL REFERENCES product(product_id),
            process_id TEXT NOT NULL REFERENCES process(process_id)
        );

        CREATE TABLE IF NOT EXISTS worksheet_record (
            record_id TEXT PRIMARY KEY,
            worksheet_id TEXT NOT NULL REFERENCES worksheet(worksheet_id) ON DELETE CASCADE,
            work_hour INTEGER NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDING',
            updated_by TEXT
        );

        CREATE TABLE IF NOT EXISTS worksheet_item_record (
            record_id TEXT NOT NULL REFERENCES worksheet_record(record_id) ON DELETE CASCADE,
            item_id TEXT NOT NULL REFERENCES worksheet_item(item_id) ON DELETE CASCADE,
            actual_output INTEGER NOT NULL DEFAULT 0,
            product_id TEXT,
            process_id TEXT,
            note TEXT,
            PRIMARY KEY (record_id, item_id)
        );

        -- ===== 查询索引 =====
        CREATE INDEX IF NOT EXISTS idx_worksheet_factory_date
            ON worksheet(factory_id, work_date);
        CREATE INDEX IF NOT EXISTS idx_worksheet_group_date
            ON worksheet(group_id, work_date);
        CREATE INDEX IF NOT EXISTS idx_worksheet_record_sheet
            ON worksheet_record(worksheet_id, work_hour);
        CREATE INDEX IF NOT EXISTS idx_worksheet_item_sheet
            ON worksheet_item(worksheet_id);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_幂等() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        // 重复执行不应报错
        init_schema(&conn).unwrap();
    }
}
