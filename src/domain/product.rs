// ==========================================
// 车间报工系统 - 产品/工序读模型
// ==========================================
// 产品与工序的 CRUD 由外部协作方维护；
// 本系统只读取 (product, process) 映射及其标准小时产量
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ProductProcess - 产品×工序标准产量映射
// ==========================================
// standard_output_per_hour 按 5 人标准班组标定（折算基数见 config）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductProcess {
    pub product_id: String,
    pub process_id: String,
    pub product_name: String,
    pub product_code: String,
    pub process_name: String,
    pub process_code: String,
    pub standard_output_per_hour: i64, // 标准小时产量
    pub is_active: bool,               // 是否启用
}
