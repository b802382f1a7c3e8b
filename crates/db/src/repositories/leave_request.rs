//! Leave request lifecycle repository.
//!
//! Orchestrates the pure rules in `leavebook_core` against the database:
//! authorization through [`PermissionRepository`], duration through the
//! holiday calendar, and every balance mutation through
//! [`BalanceRepository::with_locked_balance`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::json;
use uuid::Uuid;

use leavebook_core::audit::{AuditAction, AuditEvent, AuditSink};
use leavebook_core::balance::{BalanceKey, LeaveBalance};
use leavebook_core::calendar::{DateRange, working_days};
use leavebook_core::leave::{
    LeaveError, LeaveRequest, LeaveService, LeaveStatus, NewLeaveRequest, Transition,
    chargeable_hours,
};
use leavebook_core::permission::{Action, RecordScope, Resource};
use leavebook_shared::LeaveConfig;
use leavebook_shared::types::{LeaveRequestId, LeaveTypeId, PageRequest, PageResponse, UserId};

use crate::entities::{leave_requests, sea_orm_active_enums::LeaveStatus as DbLeaveStatus, users};

use super::balance::BalanceRepository;
use super::error::map_db_err;
use super::holiday::HolidayRepository;
use super::permission::PermissionRepository;
use super::policy::PolicyRepository;

/// Transitions out of pending.
#[derive(Debug, Clone, Copy)]
enum Review {
    Approve,
    Decline,
    Cancel,
}

impl Review {
    fn apply(
        self,
        current: LeaveStatus,
        actor: UserId,
        note: Option<String>,
    ) -> Result<Transition, LeaveError> {
        match self {
            Self::Approve => LeaveService::approve(current, actor, note),
            Self::Decline => LeaveService::decline(current, actor, note),
            Self::Cancel => LeaveService::cancel(current, actor),
        }
    }

    const fn audit_action(self) -> AuditAction {
        match self {
            Self::Approve => AuditAction::Approve,
            Self::Decline => AuditAction::Decline,
            Self::Cancel => AuditAction::Cancel,
        }
    }
}

/// Repository implementing the leave request lifecycle.
#[derive(Clone)]
pub struct LeaveRequestRepository {
    db: DatabaseConnection,
    permissions: PermissionRepository,
    holidays: HolidayRepository,
    policies: PolicyRepository,
    balances: BalanceRepository,
    audit: Arc<dyn AuditSink>,
    config: LeaveConfig,
}

impl LeaveRequestRepository {
    /// Creates a new lifecycle repository.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        lock_timeout: Duration,
        config: LeaveConfig,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            permissions: PermissionRepository::new(db.clone()),
            holidays: HolidayRepository::new(db.clone()),
            policies: PolicyRepository::new(db.clone()),
            balances: BalanceRepository::new(db.clone(), lock_timeout),
            db,
            audit,
            config,
        }
    }

    /// The permission store used for authorization.
    #[must_use]
    pub const fn permissions(&self) -> &PermissionRepository {
        &self.permissions
    }

    /// The balance store.
    #[must_use]
    pub const fn balances(&self) -> &BalanceRepository {
        &self.balances
    }

    /// Creates a leave request.
    ///
    /// The request is auto-approved when the principal holds unconditional
    /// approve permission or the leave type's rules waive review; otherwise
    /// it is pending and its hours are reserved. Monthly-accruing types
    /// cannot draw on allowance that accrues after the start month.
    ///
    /// # Errors
    ///
    /// - `Forbidden` without create permission for the owner
    /// - `InvalidInput` for unknown/inactive types, reversed or empty ranges
    ///   and policy violations
    /// - `Conflict` when overlapping an active request of the owner
    /// - `InsufficientBalance` when a capped balance cannot cover the hours
    pub async fn create(
        &self,
        principal: UserId,
        input: NewLeaveRequest,
    ) -> Result<LeaveRequest, LeaveError> {
        let owner = input.owner(principal);

        if !self
            .permissions
            .can_access(principal, Resource::LeaveRequests, Action::Create, owner)
            .await?
        {
            return Err(LeaveError::Forbidden(
                "not allowed to create leave requests for this user".into(),
            ));
        }

        let owner_row = self.find_user(owner).await?;
        if !owner_row.is_active {
            return Err(LeaveError::InvalidInput(format!("user {owner} is inactive")));
        }

        let leave_type = self
            .policies
            .active_leave_type(input.leave_type_id)
            .await?
            .ok_or_else(|| {
                LeaveError::InvalidInput(format!(
                    "unknown or inactive leave type {}",
                    input.leave_type_id
                ))
            })?;

        let range = input.range().ok_or_else(|| {
            LeaveError::InvalidInput("start_date must not be after end_date".into())
        })?;

        let region = owner_row
            .region
            .as_deref()
            .unwrap_or(&self.config.default_region);
        let calendar = self.holidays.calendar_for(range).await?;
        let days = working_days(&calendar, range.start, range.end, region);
        if days == 0 {
            return Err(LeaveError::InvalidInput(
                "requested range contains no working days".into(),
            ));
        }

        ensure_no_overlap(&self.db, owner, range).await?;

        let hours = chargeable_hours(days, input.half_day);
        let policy = self.policies.policy_for(owner).await?;
        policy.check_request(&leave_type.code, range.start, self.today(), hours)?;

        let accrual = policy.accrual(&leave_type.code);
        let document_required = policy.requires_document(&leave_type.code, hours);

        let approve = self
            .permissions
            .evaluate(principal, Resource::LeaveRequests, Action::Approve)
            .await?;
        let approved_by_policy = policy.approves_automatically(&leave_type.code, hours);
        let status = LeaveService::initial_status(&approve, approved_by_policy);
        let auto_approved = status == LeaveStatus::Approved;
        // Only a principal approving on its own authority is recorded as reviewer.
        let reviewer = approve.is_unconditional().then(|| principal.into_inner());

        let key = BalanceKey::new(owner, input.leave_type_id, range.charge_year());
        let row = leave_requests::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(owner.into_inner()),
            leave_type_id: Set(input.leave_type_id.into_inner()),
            start_date: Set(range.start),
            end_date: Set(range.end),
            half_day: Set(input.half_day),
            total_hours: Set(hours),
            status: Set(status.into()),
            note: Set(input.note),
            reviewer_id: Set(reviewer),
            reviewer_note: Set(None),
            reviewed_at: Set(auto_approved.then(|| Utc::now().into())),
            auto_approved: Set(auto_approved),
            ..Default::default()
        };

        let created = self
            .balances
            .with_locked_balance(key, move |txn, balance| {
                Box::pin(async move {
                    // Same-type creates serialize on the balance lock; re-check under it.
                    ensure_no_overlap(txn, owner, range).await?;
                    let withheld = accrual.unaccrued(balance.allowance, range.start);
                    LeaveService::book_new_withholding(balance, status, hours, withheld)?;
                    row.insert(txn).await.map_err(map_db_err)
                })
            })
            .await?;

        let request = to_request(&created);
        tracing::info!(
            request_id = %request.id,
            user_id = %owner,
            principal = %principal,
            status = %request.status,
            hours = %hours,
            document_required,
            "leave request created"
        );
        self.emit(
            AuditAction::Create,
            &request,
            principal,
            json!({
                "status": request.status,
                "total_hours": request.total_hours,
                "start_date": request.start_date,
                "end_date": request.end_date,
                "auto_approved": auto_approved,
                "document_required": document_required,
            }),
        );

        Ok(request)
    }

    /// Approves a pending request: `used += hours`, `scheduled -= hours`.
    pub async fn approve(
        &self,
        principal: UserId,
        id: LeaveRequestId,
        note: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        self.transition(principal, id, Review::Approve, note).await
    }

    /// Declines a pending request: `scheduled -= hours`.
    pub async fn decline(
        &self,
        principal: UserId,
        id: LeaveRequestId,
        note: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        self.transition(principal, id, Review::Decline, note).await
    }

    /// Cancels a pending request: `scheduled -= hours`.
    pub async fn cancel(
        &self,
        principal: UserId,
        id: LeaveRequestId,
    ) -> Result<LeaveRequest, LeaveError> {
        self.transition(principal, id, Review::Cancel, None).await
    }

    async fn transition(
        &self,
        principal: UserId,
        id: LeaveRequestId,
        review: Review,
        note: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        let existing = self.find(id).await?;
        let current: LeaveStatus = existing.status.into();
        review.apply(current, principal, None)?;

        let owner = UserId::from_uuid(existing.user_id);
        self.authorize_transition(principal, owner, review).await?;

        let key = balance_key(&existing);
        let updated = self
            .balances
            .with_locked_balance(key, move |txn, balance| {
                Box::pin(async move {
                    let row = lock_request(txn, id).await?;
                    let transition = review.apply(row.status.into(), principal, note)?;
                    LeaveService::apply_transition(balance, &transition, row.total_hours);

                    let mut active: leave_requests::ActiveModel = row.into();
                    active.status = Set(transition.to.into());
                    if transition.is_review() {
                        active.reviewer_id = Set(Some(transition.actor.into_inner()));
                        active.reviewer_note = Set(transition.note);
                        active.reviewed_at = Set(Some(transition.at.into()));
                    }
                    active.updated_at = Set(transition.at.into());
                    active.update(txn).await.map_err(map_db_err)
                })
            })
            .await?;

        let request = to_request(&updated);
        tracing::info!(
            request_id = %request.id,
            principal = %principal,
            from = %current,
            to = %request.status,
            "leave request transitioned"
        );
        self.emit(
            review.audit_action(),
            &request,
            principal,
            json!({
                "from": current,
                "to": request.status,
                "reviewer_note": request.reviewer_note,
            }),
        );

        Ok(request)
    }

    async fn authorize_transition(
        &self,
        principal: UserId,
        owner: UserId,
        review: Review,
    ) -> Result<(), LeaveError> {
        let allowed = match review {
            Review::Approve | Review::Decline => {
                let elevated = self
                    .permissions
                    .has_elevated_role(principal, &self.config)
                    .await?;
                let scope = RecordScope {
                    principal,
                    owner,
                    owner_manager: self.permissions.manager_of(owner).await?,
                };
                LeaveService::can_review(&scope, elevated)
            }
            Review::Cancel => {
                let delete = self
                    .permissions
                    .evaluate(principal, Resource::LeaveRequests, Action::Delete)
                    .await?;
                let scope = self.permissions.scope_for(&delete, principal, owner).await?;
                LeaveService::can_cancel(&delete, &scope)
            }
        };

        if allowed {
            Ok(())
        } else {
            Err(LeaveError::Forbidden(format!(
                "not allowed to {} this leave request",
                review.audit_action()
            )))
        }
    }

    /// Hard deletes a request and reverses its balance effect.
    ///
    /// Allowed with unconditional delete permission, a satisfied scoped
    /// delete permission, or for the owner while the request is pending.
    pub async fn delete(&self, principal: UserId, id: LeaveRequestId) -> Result<(), LeaveError> {
        let existing = self.find(id).await?;
        let owner = UserId::from_uuid(existing.user_id);

        let decision = self
            .permissions
            .evaluate(principal, Resource::LeaveRequests, Action::Delete)
            .await?;
        let scope = self.permissions.scope_for(&decision, principal, owner).await?;
        if !LeaveService::can_delete(&decision, &scope, existing.status.into()) {
            return Err(LeaveError::Forbidden(
                "not allowed to delete this leave request".into(),
            ));
        }

        let key = balance_key(&existing);
        let deleted = self
            .balances
            .with_locked_balance(key, move |txn, balance| {
                Box::pin(async move {
                    let row = lock_request(txn, id).await?;
                    let status: LeaveStatus = row.status.into();
                    // Status may have changed since the pre-check.
                    if !LeaveService::can_delete(&decision, &scope, status) {
                        return Err(LeaveError::Forbidden(
                            "not allowed to delete this leave request".into(),
                        ));
                    }
                    LeaveService::apply_delete(balance, status, row.total_hours);
                    leave_requests::Entity::delete_by_id(row.id)
                        .exec(txn)
                        .await
                        .map_err(map_db_err)?;
                    Ok(row)
                })
            })
            .await?;

        let request = to_request(&deleted);
        tracing::info!(
            request_id = %request.id,
            principal = %principal,
            status = %request.status,
            "leave request deleted"
        );
        self.emit(
            AuditAction::Delete,
            &request,
            principal,
            json!({
                "status": request.status,
                "total_hours": request.total_hours,
            }),
        );

        Ok(())
    }

    /// Fetches a request the principal may read.
    pub async fn get(
        &self,
        principal: UserId,
        id: LeaveRequestId,
    ) -> Result<LeaveRequest, LeaveError> {
        let row = self.find(id).await?;
        let owner = UserId::from_uuid(row.user_id);
        if !self
            .permissions
            .can_access(principal, Resource::LeaveRequests, Action::Read, owner)
            .await?
        {
            return Err(LeaveError::Forbidden("not allowed to read this leave request".into()));
        }
        Ok(to_request(&row))
    }

    /// Lists a user's requests, newest first.
    pub async fn list(
        &self,
        principal: UserId,
        user_id: UserId,
        page: &PageRequest,
    ) -> Result<PageResponse<LeaveRequest>, LeaveError> {
        if !self
            .permissions
            .can_access(principal, Resource::LeaveRequests, Action::Read, user_id)
            .await?
        {
            return Err(LeaveError::Forbidden(
                "not allowed to read leave requests of this user".into(),
            ));
        }

        let query = leave_requests::Entity::find()
            .filter(leave_requests::Column::UserId.eq(user_id.into_inner()));

        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;
        let rows = query
            .order_by_desc(leave_requests::Column::CreatedAt)
            .order_by_desc(leave_requests::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(page.respond(rows.iter().map(to_request).collect(), total))
    }

    /// Returns a balance the principal may read, initializing it lazily.
    pub async fn get_balance(
        &self,
        principal: UserId,
        user_id: UserId,
        leave_type_id: LeaveTypeId,
        year: i32,
    ) -> Result<LeaveBalance, LeaveError> {
        if !self
            .permissions
            .can_access(principal, Resource::LeaveBalances, Action::Read, user_id)
            .await?
        {
            return Err(LeaveError::Forbidden(
                "not allowed to read balances of this user".into(),
            ));
        }
        self.find_user(user_id).await?;
        self.balances
            .get_or_init(BalanceKey::new(user_id, leave_type_id, year))
            .await
    }

    async fn find(&self, id: LeaveRequestId) -> Result<leave_requests::Model, LeaveError> {
        leave_requests::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| LeaveError::not_found("leave request", id))
    }

    async fn find_user(&self, user_id: UserId) -> Result<users::Model, LeaveError> {
        users::Entity::find_by_id(user_id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| LeaveError::not_found("user", user_id))
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.tz()).date_naive()
    }

    /// Hands the event to the audit sink without waiting for it.
    fn emit(
        &self,
        action: AuditAction,
        request: &LeaveRequest,
        actor: UserId,
        changes: serde_json::Value,
    ) {
        let event = AuditEvent::leave_request(action, request.id.into_inner(), actor, changes);
        let audit = Arc::clone(&self.audit);
        let request_id = request.id;
        tokio::spawn(async move {
            if let Err(e) = audit.record(event).await {
                tracing::warn!(
                    error = %e,
                    request_id = %request_id,
                    action = %action,
                    "failed to record audit event"
                );
            }
        });
    }
}

/// Fails with `Conflict` when `candidate` overlaps an active request of `owner`.
async fn ensure_no_overlap<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    candidate: DateRange,
) -> Result<(), LeaveError> {
    let rows = leave_requests::Entity::find()
        .filter(leave_requests::Column::UserId.eq(owner.into_inner()))
        .filter(
            leave_requests::Column::Status
                .is_in([DbLeaveStatus::Pending, DbLeaveStatus::Approved]),
        )
        .filter(leave_requests::Column::EndDate.gte(candidate.start))
        .all(conn)
        .await
        .map_err(map_db_err)?;

    let existing: Vec<(DateRange, LeaveStatus)> = rows
        .iter()
        .filter_map(|r| DateRange::new(r.start_date, r.end_date).map(|d| (d, r.status.into())))
        .collect();

    match LeaveService::find_overlap(&candidate, existing.iter().map(|(d, s)| (d, *s))) {
        Some(hit) => Err(LeaveError::Conflict(format!(
            "overlaps existing request from {} to {}",
            hit.start, hit.end
        ))),
        None => Ok(()),
    }
}

async fn lock_request(
    txn: &DatabaseTransaction,
    id: LeaveRequestId,
) -> Result<leave_requests::Model, LeaveError> {
    leave_requests::Entity::find_by_id(id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| LeaveError::not_found("leave request", id))
}

fn balance_key(row: &leave_requests::Model) -> BalanceKey {
    BalanceKey::new(
        UserId::from_uuid(row.user_id),
        LeaveTypeId::from_uuid(row.leave_type_id),
        row.start_date.year(),
    )
}

/// Converts a stored row into the domain request.
pub fn to_request(row: &leave_requests::Model) -> LeaveRequest {
    LeaveRequest {
        id: LeaveRequestId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        leave_type_id: LeaveTypeId::from_uuid(row.leave_type_id),
        start_date: row.start_date,
        end_date: row.end_date,
        half_day: row.half_day,
        total_hours: row.total_hours,
        status: row.status.into(),
        note: row.note.clone(),
        reviewer_id: row.reviewer_id.map(UserId::from_uuid),
        reviewer_note: row.reviewer_note.clone(),
        reviewed_at: row.reviewed_at.map(|t| t.with_timezone(&Utc)),
        auto_approved: row.auto_approved,
        created_at: row.created_at.with_timezone(&Utc),
        updated_at: row.updated_at.with_timezone(&Utc),
    }
}
