// ==========================================
// 车间报工系统 - 数据访问层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: SQLite 数据存取与事务边界
// ==========================================

pub mod error;
pub mod org_repo;
pub mod product_repo;
pub mod worksheet_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use org_repo::GroupRepository;
pub use product_repo::ProductProcessRepository;
pub use worksheet_repo::{
    ItemRecordSpec, RecordUpdateSpec, VisibilityScope, WorksheetQuery, WorksheetRepository,
};
