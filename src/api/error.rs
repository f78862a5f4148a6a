// ==========================================
// 车间报工系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 小组组织链路不完整（缺班组/产线/厂任一层）
    #[error("组织链路不完整: {0}")]
    InvalidStructure(String),

    /// 同组同日重复建单
    #[error("重复建单: group_id={group_id}, work_date={work_date}")]
    DuplicateWorksheet {
        group_id: String,
        work_date: String,
    },

    /// (product, process) 标准产量映射缺失或停用
    #[error("产品工序映射无效: product_id={product_id}, process_id={process_id}")]
    InvalidProductProcess {
        product_id: String,
        process_id: String,
    },

    /// 小组无在岗成员，无法建单
    #[error("小组无在岗成员: group_id={0}")]
    EmptyGroup(String),

    /// 报工产量非法（负数）
    #[error("报工产量非法: {0}")]
    InvalidOutput(String),

    /// 越权操作
    #[error("无权执行该操作: {0}")]
    Forbidden(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的业务错误
// 注意: 唯一约束违反在建单路径上由调用方先行映射为 DuplicateWorksheet，
//       这里只兜底未被上层拦截的情况
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        // NotFound错误转换
        let repo_err = RepositoryError::NotFound {
            entity: "Worksheet".to_string(),
            id: "WS001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Worksheet"));
                assert!(msg.contains("WS001"));
            }
            _ => panic!("Expected NotFound"),
        }

        // 锁错误归入连接错误
        let repo_err = RepositoryError::LockError("poisoned".to_string());
        let api_err: ApiError = repo_err.into();
        assert!(matches!(api_err, ApiError::DatabaseConnectionError(_)));
    }

    #[test]
    fn test_error_display_包含原因() {
        let err = ApiError::DuplicateWorksheet {
            group_id: "G001".to_string(),
            work_date: "2026-03-01".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("G001"));
        assert!(msg.contains("2026-03-01"));
    }
}
