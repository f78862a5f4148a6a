// ==========================================
// 车间报工系统 - 授权判定引擎
// ==========================================
// 职责: 集中定义按操作类别的能力判定（每次调用判定一次，不逐条判定）
// 角色: SUPERADMIN/ADMIN 为管理员; USER 为班组长/主管; WORKER 不直接调用接口
// ==========================================

use crate::domain::org::Caller;
use crate::domain::types::Role;

/// 管理类操作（删除、归档等）：仅管理员
pub fn can_manage(caller: &Caller) -> bool {
    matches!(caller.role, Role::Superadmin | Role::Admin)
}

/// 带班类操作（报工、完成等）：管理员或该组组长
pub fn can_lead(caller: &Caller, leader_id: Option<&str>) -> bool {
    can_manage(caller) || leader_id == Some(caller.id.as_str())
}

/// 查看类操作：带班权限之外，创建人本人也可查看
pub fn can_view(caller: &Caller, created_by: &str, leader_id: Option<&str>) -> bool {
    can_lead(caller, leader_id) || caller.id == created_by
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_管理员具备全部能力() {
        for role in [Role::Superadmin, Role::Admin] {
            let caller = Caller::new("admin-1", role);
            assert!(can_manage(&caller));
            assert!(can_lead(&caller, None));
            assert!(can_view(&caller, "someone-else", None));
        }
    }

    #[test]
    fn test_组长可带班不可管理() {
        let caller = Caller::new("leader-1", Role::User);
        assert!(!can_manage(&caller));
        assert!(can_lead(&caller, Some("leader-1")));
        assert!(!can_lead(&caller, Some("leader-2")));
    }

    #[test]
    fn test_创建人仅可查看() {
        let caller = Caller::new("user-1", Role::User);
        assert!(can_view(&caller, "user-1", None));
        assert!(!can_view(&caller, "user-2", Some("leader-9")));
    }

    #[test]
    fn test_无leader时组长判定不误放行() {
        let caller = Caller::new("user-1", Role::User);
        assert!(!can_lead(&caller, None));
    }
}
