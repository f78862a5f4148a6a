// ==========================================
// 车间报工系统 - API层
// ==========================================
// 职责: 操作编排、业务校验、错误映射
// 红线: 业务规则在 engine，SQL 在 repository，本层只做编排
// ==========================================

pub mod analytics_api;
pub mod dto;
pub mod error;
pub mod worksheet_api;

pub use analytics_api::AnalyticsApi;
pub use dto::{
    ArchiveResult, BatchRecordUpdate, BatchUpdateRequest, BatchUpdateResponse,
    CreateWorksheetRequest, CreateWorksheetResponse, CreationSummary, ItemRecordUpdate, Page,
    QuickItemOutput, QuickUpdateRequest, RecordUpdateRequest, UpdateWorksheetRequest,
    WorksheetFilter,
};
pub use error::{ApiError, ApiResult};
pub use worksheet_api::WorksheetApi;
