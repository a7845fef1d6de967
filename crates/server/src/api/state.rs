//! 统一的应用状态。

use std::sync::Arc;

use identity_directory::IdentityProvider;
use review_delegate::ReviewClient;
use sea_orm::DatabaseConnection;

use crate::repository::{
    AssignmentRepository, ChallengeRepository, GroupRepository, SeaOrmAssignmentRepository,
    SeaOrmChallengeRepository, SeaOrmGroupRepository, SeaOrmUserProfileRepository,
    UserProfileRepository,
};
use crate::watch::ChangeBroadcaster;

/// 变更广播队列容量。
const CHANGE_BUFFER_SIZE: usize = 1_000;

/// 统一的应用状态，包含所有 handler 共享的数据。
#[derive(Clone)]
pub struct AppState {
    /// 用户资料存储。
    pub users: Arc<dyn UserProfileRepository>,
    /// 分组存储。
    pub groups: Arc<dyn GroupRepository>,
    /// 挑战题库存储。
    pub challenges: Arc<dyn ChallengeRepository>,
    /// 作业分发存储。
    pub assignments: Arc<dyn AssignmentRepository>,
    /// 外部账号目录。
    pub directory: Arc<dyn IdentityProvider>,
    /// AI 评审客户端；未配置时为 `None`。
    pub review: Option<Arc<ReviewClient>>,
    /// 存储变更广播器。
    pub changes: ChangeBroadcaster,
}

impl AppState {
    /// 创建新的应用状态。
    pub fn new(
        db: DatabaseConnection,
        directory: Arc<dyn IdentityProvider>,
        review: Option<Arc<ReviewClient>>,
    ) -> Self {
        Self {
            users: Arc::new(SeaOrmUserProfileRepository::new(db.clone())),
            groups: Arc::new(SeaOrmGroupRepository::new(db.clone())),
            challenges: Arc::new(SeaOrmChallengeRepository::new(db.clone())),
            assignments: Arc::new(SeaOrmAssignmentRepository::new(db)),
            directory,
            review,
            changes: ChangeBroadcaster::new(CHANGE_BUFFER_SIZE),
        }
    }
}
