// ==========================================
// 车间报工系统 - 班次时段表引擎
// ==========================================
// 职责: 班次类型 → 有序小时时段表（纯函数，无副作用）
// 约束: 时段表固定、确定、可重入；午休/晚饭为不计薪间隔
// ==========================================

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::ShiftType;

// ==========================================
// ShiftSlot - 单个小时时段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSlot {
    pub work_hour: i64,        // 工时序号（1..n）
    pub start_time: NaiveTime, // 时段起始
    pub end_time: NaiveTime,   // 时段结束
}

// ==========================================
// ShiftCalendar - 班次时段表
// ==========================================
pub struct ShiftCalendar;

impl ShiftCalendar {
    /// 取班次的小时时段表
    ///
    /// # 时段规则
    /// - NORMAL_8H: 07:30–16:30 共 8 段，午休 11:30–12:30（第4段止于11:30，第5段起于12:30）
    /// - EXTENDED_9_5H: 在 NORMAL_8H 基础上追加 16:30–17:00（半小时段）与 17:00–18:00，共 10 段
    /// - OVERTIME_11H: 在 NORMAL_8H 基础上追加 17:00–18:00、18:00–19:00、19:00–20:00，
    ///   晚饭 16:30–17:00 不计薪，共 11 段
    ///
    /// # 返回
    /// 按 work_hour 升序的时段表，非空
    pub fn slots_for(shift_type: ShiftType) -> Vec<ShiftSlot> {
        let mut slots = Self::base_slots();

        match shift_type {
            ShiftType::Normal8h => {}
            ShiftType::Extended95h => {
                slots.push(slot(9, (16, 30), (17, 0)));
                slots.push(slot(10, (17, 0), (18, 0)));
            }
            ShiftType::Overtime11h => {
                // 晚饭 16:30-17:00
                slots.push(slot(9, (17, 0), (18, 0)));
                slots.push(slot(10, (18, 0), (19, 0)));
                slots.push(slot(11, (19, 0), (20, 0)));
            }
        }

        slots
    }

    /// 标准8小时班的基础时段表
    fn base_slots() -> Vec<ShiftSlot> {
        vec![
            slot(1, (7, 30), (8, 30)),
            slot(2, (8, 30), (9, 30)),
            slot(3, (9, 30), (10, 30)),
            slot(4, (10, 30), (11, 30)),
            // 午休 11:30-12:30
            slot(5, (12, 30), (13, 30)),
            slot(6, (13, 30), (14, 30)),
            slot(7, (14, 30), (15, 30)),
            slot(8, (15, 30), (16, 30)),
        ]
    }
}

/// 构造时段（时刻均为合法常量，可直接断言）
fn slot(work_hour: i64, start: (u32, u32), end: (u32, u32)) -> ShiftSlot {
    ShiftSlot {
        work_hour,
        start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).expect("时段表时刻非法"),
        end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).expect("时段表时刻非法"),
    }
}
