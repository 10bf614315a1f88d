//! Account administration: listing accounts and blocking or unblocking them.

use carelink_core::error::{CarelinkError, CarelinkResult};
use carelink_core::models::account::{Account, AccountStatus, Role};
use carelink_core::models::session::Actor;
use carelink_core::repository::{AccountRepository, PaginatedResult, Pagination};
use tracing::info;
use uuid::Uuid;

pub struct AdminService<A: AccountRepository> {
    accounts: A,
}

impl<A: AccountRepository> AdminService<A> {
    pub fn new(accounts: A) -> Self {
        Self { accounts }
    }

    fn require_admin(actor: &Actor) -> CarelinkResult<()> {
        if actor.role != Role::Admin {
            return Err(CarelinkError::AuthorizationDenied {
                reason: format!("{} cannot manage accounts", actor.role),
            });
        }
        Ok(())
    }

    pub async fn list_accounts(
        &self,
        actor: &Actor,
        role: Role,
        pagination: Pagination,
    ) -> CarelinkResult<PaginatedResult<Account>> {
        Self::require_admin(actor)?;
        self.accounts.list_by_role(role, pagination).await
    }

    pub async fn count_by_role(&self, actor: &Actor, role: Role) -> CarelinkResult<u64> {
        Self::require_admin(actor)?;
        self.accounts.count_by_role(role).await
    }

    /// Set an account's status. Reapplying the current status is a no-op,
    /// so concurrent admins converge on the last write.
    pub async fn set_status(
        &self,
        actor: &Actor,
        principal_id: Uuid,
        status: AccountStatus,
    ) -> CarelinkResult<Account> {
        Self::require_admin(actor)?;
        if principal_id == actor.principal_id && status.is_blocked() {
            return Err(CarelinkError::Validation {
                message: "admins cannot block their own account".into(),
            });
        }

        let account = self.accounts.set_status(principal_id, status).await?;
        info!(
            admin_id = %actor.principal_id,
            principal_id = %principal_id,
            status = %account.status,
            "Account status changed"
        );
        Ok(account)
    }

    /// Flip between active and blocked.
    pub async fn toggle_block(&self, actor: &Actor, principal_id: Uuid) -> CarelinkResult<Account> {
        Self::require_admin(actor)?;
        let account = self.accounts.get(principal_id).await?;
        self.set_status(actor, principal_id, account.status.toggled())
            .await
    }
}
