// ==========================================
// 车间报工系统 - 组织结构读模型
// ==========================================
// 组织 CRUD 由外部协作方维护；本系统只读取
// 小组 → 班组 → 产线 → 厂 的链路与在岗成员
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::Role;

// ==========================================
// Worker - 工人简要信息
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub worker_id: String,     // 工人ID
    pub employee_code: String, // 工号
    pub first_name: String,    // 名
    pub last_name: String,     // 姓
}

// ==========================================
// GroupChain - 小组及其组织链路
// ==========================================
// 链路不完整（缺班组/产线/厂）视为结构非法，建单前置校验会拒绝
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupChain {
    pub group_id: String,
    pub group_name: String,
    pub group_code: String,
    pub leader_id: Option<String>, // 组长（一名工人最多领导一个在用小组，由组织管理方保障）
    pub team_name: String,
    pub line_name: String,
    pub factory_id: String,
    pub factory_name: String,
    pub factory_code: String,
    pub active_workers: Vec<Worker>, // 在岗 WORKER 角色成员
}

// ==========================================
// Caller - 已认证调用者上下文
// ==========================================
// 由外部认证协作方（JWT 等）注入，本系统不做签发
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}
