//! Soft-delete workflow with audit logging
//!
//! Deleting a sale never removes rows. The flow per transaction is
//! `Active -> ReasonPrompt -> Confirm -> Deleted`; cancelling at either
//! prompt leaves the sale untouched. Only admins get past the first
//! step, and the check runs again server-side at execution time.

use chrono::Utc;

use crate::error::{CoreError, CoreResult};
use crate::models::{DeletionLog, Role, SessionUser};
use crate::repo::SalesRepository;

/// Table name recorded in the audit log for sale deletions
const SALES_TABLE: &str = "sales";

/// Stage of an in-flight delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStage {
    /// Reason not yet provided
    ReasonPrompt,
    /// Reason captured, awaiting confirmation
    Confirm { reason: String },
}

/// One delete request working its way through the prompts
#[derive(Debug, Clone)]
pub struct DeleteWorkflow {
    transno: String,
    stage: DeleteStage,
}

impl DeleteWorkflow {
    /// Start a delete request. Non-admin actors are rejected before the
    /// reason prompt is ever shown.
    pub fn begin(transno: &str, role: Role) -> CoreResult<Self> {
        if role != Role::Admin {
            return Err(CoreError::Unauthorized);
        }
        Ok(Self {
            transno: transno.to_string(),
            stage: DeleteStage::ReasonPrompt,
        })
    }

    /// Capture the deletion reason; an empty reason keeps the prompt open
    pub fn provide_reason(&mut self, reason: &str) -> CoreResult<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CoreError::validation("reason", "a reason is required"));
        }
        self.stage = DeleteStage::Confirm {
            reason: reason.to_string(),
        };
        Ok(())
    }

    /// Abandon the request with no side effect
    pub fn cancel(self) {}

    pub fn transno(&self) -> &str {
        &self.transno
    }

    pub fn stage(&self) -> &DeleteStage {
        &self.stage
    }

    /// The captured reason, once past the reason prompt
    pub fn reason(&self) -> Option<&str> {
        match &self.stage {
            DeleteStage::Confirm { reason } => Some(reason),
            DeleteStage::ReasonPrompt => None,
        }
    }
}

/// Execute a confirmed delete: mark the header and detail rows with
/// deletion markers and append one audit log entry capturing a snapshot
/// of the sale, all inside one store boundary.
pub async fn execute_delete(
    repo: &SalesRepository,
    workflow: &DeleteWorkflow,
    actor: &SessionUser,
) -> CoreResult<DeletionLog> {
    let reason = workflow
        .reason()
        .ok_or_else(|| CoreError::validation("reason", "a reason is required"))?;

    // Snapshot before mutation so the log reflects the sale as deleted.
    let view = repo.sale_view(workflow.transno()).await?;
    let deleted_at = Utc::now();
    let log = DeletionLog {
        table_name: SALES_TABLE.to_string(),
        record_id: view.transno.clone(),
        transaction_id: format!("DEL-{}-{}", deleted_at.timestamp_millis(), view.transno),
        deleted_by: actor.id.clone(),
        deleted_by_name: actor.name.clone(),
        reason: reason.to_string(),
        metadata: serde_json::json!({
            "salesdate": view.salesdate,
            "customer_name": view.customer_name,
            "employee_name": view.employee_name,
            "total": view.total,
        }),
        deleted_at,
    };

    repo.store()
        .soft_delete_sale(&view.transno, deleted_at, &actor.id, reason, log.clone())
        .await?;

    log::info!(
        "sale {} soft-deleted by {} ({})",
        view.transno,
        actor.name,
        reason
    );
    Ok(log)
}

// ==================== Tests ====================
