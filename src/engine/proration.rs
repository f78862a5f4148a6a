// ==========================================
// 车间报工系统 - 目标产量折算
// ==========================================
// 职责: 标准小时产量 → 按实际人数线性折算的目标产量
// 约束: 向下取整（不得四舍五入虚高目标）；对任意人数成立
// ==========================================

/// 折算基数的默认值（标准产量按 5 人班组标定）
///
/// 实际折算基数从 config_kv 读取（见 config::ConfigManager），
/// 此常量仅作为缺省值。
pub const DEFAULT_BASELINE_CREW_SIZE: i64 = 5;

/// 按实际人数折算每小时目标产量
///
/// # 公式
/// `floor(standard_output_per_hour * worker_count / baseline_crew_size)`
///
/// # 参数
/// - standard_output_per_hour: 标准小时产量（按基准班组人数标定）
/// - worker_count: 实际在岗工人数
/// - baseline_crew_size: 折算基数（标定时的班组人数，须为正）
pub fn prorated_target(
    standard_output_per_hour: i64,
    worker_count: i64,
    baseline_crew_size: i64,
) -> i64 {
    debug_assert!(baseline_crew_size > 0, "折算基数必须为正");
    standard_output_per_hour * worker_count / baseline_crew_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_标准人数_不折算() {
        // 5人班组，标准45/小时 → 目标45
        assert_eq!(prorated_target(45, 5, DEFAULT_BASELINE_CREW_SIZE), 45);
    }

    #[test]
    fn test_减员折算_向下取整() {
        // 3人班组: floor(45*3/5) = 27
        assert_eq!(prorated_target(45, 3, DEFAULT_BASELINE_CREW_SIZE), 27);
        // floor(44*3/5) = floor(26.4) = 26
        assert_eq!(prorated_target(44, 3, DEFAULT_BASELINE_CREW_SIZE), 26);
    }

    #[test]
    fn test_单人与大班组() {
        assert_eq!(prorated_target(45, 1, DEFAULT_BASELINE_CREW_SIZE), 9);
        assert_eq!(prorated_target(45, 50, DEFAULT_BASELINE_CREW_SIZE), 450);
    }
}
