//! Workflow service: batch state transitions, numbering and the guarded
//! draft reset.
//!
//! Every batch is checked as a whole first. If any service is missing,
//! fails its transition guard or cannot be numbered, nothing is written and
//! no sequence value is consumed. The checked batch is then handed to
//! [`ServiceRepository::transition_many`], which draws the numbers and writes
//! the rows in one transaction, guarded on the states read here.

use techserv_domain::context::RequestContext;
use techserv_domain::error::{
    AuthorizationError, BatchRejection, NotFoundError, SequenceError, TechServError,
    ValidationError,
};
use techserv_domain::id::{SequenceId, ServiceId};
use techserv_domain::service::{Service, ServiceState, TransitionCheck};
use techserv_domain::time::Date;

use crate::ports::{
    FiscalYearRepository, GroupMembership, PeriodRepository, ServiceRepository, StateChange,
};
use crate::services::service_order_service::missing;

/// Authorization group allowed to run the draft reset by default.
pub const DEFAULT_DRAFT_GROUP: &str = "service_draft";

/// Where the number of one service will come from.
struct NumberPlan {
    sequence: SequenceId,
    date: Date,
}

/// Application service driving the service state machine.
pub struct WorkflowService<S, P, F, M> {
    services: S,
    periods: P,
    fiscal_years: F,
    membership: M,
    draft_group: String,
}

impl<S, P, F, M> WorkflowService<S, P, F, M>
where
    S: ServiceRepository,
    P: PeriodRepository,
    F: FiscalYearRepository,
    M: GroupMembership,
{
    /// Create a new service backed by the given ports.
    pub fn new(services: S, periods: P, fiscal_years: F, membership: M) -> Self {
        Self {
            services,
            periods,
            fiscal_years,
            membership,
            draft_group: DEFAULT_DRAFT_GROUP.to_string(),
        }
    }

    /// Use `group` instead of [`DEFAULT_DRAFT_GROUP`] for the draft reset.
    #[must_use]
    pub fn with_draft_group(mut self, group: impl Into<String>) -> Self {
        self.draft_group = group.into();
        self
    }

    /// Move to review, numbering services that have no number yet.
    ///
    /// # Errors
    ///
    /// See [`Self::transition`].
    pub async fn review(
        &self,
        ctx: &RequestContext,
        ids: &[ServiceId],
    ) -> Result<Vec<Service>, TechServError> {
        self.transition(ctx, ServiceState::Review, ids).await
    }

    /// Mark repaired services as ready for pickup.
    ///
    /// # Errors
    ///
    /// See [`Self::transition`].
    pub async fn ready(
        &self,
        ctx: &RequestContext,
        ids: &[ServiceId],
    ) -> Result<Vec<Service>, TechServError> {
        self.transition(ctx, ServiceState::Ready, ids).await
    }

    /// Mark reviewed services as having no solution.
    ///
    /// # Errors
    ///
    /// See [`Self::transition`].
    pub async fn without(
        &self,
        ctx: &RequestContext,
        ids: &[ServiceId],
    ) -> Result<Vec<Service>, TechServError> {
        self.transition(ctx, ServiceState::Without, ids).await
    }

    /// Send covered services to the manufacturer.
    ///
    /// # Errors
    ///
    /// See [`Self::transition`].
    pub async fn warranty(
        &self,
        ctx: &RequestContext,
        ids: &[ServiceId],
    ) -> Result<Vec<Service>, TechServError> {
        self.transition(ctx, ServiceState::Warranty, ids).await
    }

    /// Hand services back to the customer.
    ///
    /// # Errors
    ///
    /// See [`Self::transition`].
    pub async fn delivered(
        &self,
        ctx: &RequestContext,
        ids: &[ServiceId],
    ) -> Result<Vec<Service>, TechServError> {
        self.transition(ctx, ServiceState::Delivered, ids).await
    }

    /// Move every service of `ids` to `target`.
    ///
    /// Services already in `target` are left untouched and not returned.
    /// The returned list holds the services that changed.
    ///
    /// # Errors
    ///
    /// - [`TechServError::Validation`] for an empty selection
    /// - the violation of the only offending service, or a
    ///   [`TechServError::Batch`] listing all of them
    /// - [`WorkflowError::StaleState`] when a service changed after it was
    ///   read
    /// - a storage error propagated from the ports
    ///
    /// [`WorkflowError::StaleState`]: techserv_domain::error::WorkflowError::StaleState
    #[tracing::instrument(skip(self, ctx), fields(count = ids.len()))]
    pub async fn transition(
        &self,
        ctx: &RequestContext,
        target: ServiceState,
        ids: &[ServiceId],
    ) -> Result<Vec<Service>, TechServError> {
        if ids.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        let found = self.services.get_many(ids).await?;
        let mut violations = missing(ids, &found);
        let mut changes = Vec::new();
        for service in found {
            match service.check_transition(target) {
                Ok(TransitionCheck::Apply) => {}
                Ok(TransitionCheck::Unchanged) => continue,
                Err(err) => {
                    violations.push(err.into());
                    continue;
                }
            }
            let mut change = StateChange {
                id: service.id,
                from: service.state,
                to: target,
                entry_date: None,
                draw: None,
            };
            if target == ServiceState::Review && service.number_service.is_none() {
                match self.plan_number(ctx, &service).await {
                    Ok(plan) => {
                        change.entry_date = Some(plan.date);
                        change.draw = Some(plan.sequence);
                    }
                    Err(err @ TechServError::Storage(_)) => return Err(err),
                    Err(err) => violations.push(err),
                }
            }
            changes.push(change);
        }
        BatchRejection::check(violations)?;

        if changes.is_empty() {
            return Ok(Vec::new());
        }
        for change in &changes {
            tracing::info!(
                service_id = %change.id,
                from = %change.from,
                to = %change.to,
                numbered = change.draw.is_some(),
                "service transition"
            );
        }
        self.services.transition_many(changes).await
    }

    /// Reset services to review, skipping the transition table.
    ///
    /// Allowed for the system caller and members of the draft group.
    ///
    /// # Errors
    ///
    /// - [`TechServError::Authorization`] when the user is not in the group
    /// - [`TechServError::NotFound`] (or a batch of them) for unknown ids
    #[tracing::instrument(skip(self, ctx), fields(count = ids.len()))]
    pub async fn draft(
        &self,
        ctx: &RequestContext,
        ids: &[ServiceId],
    ) -> Result<Vec<Service>, TechServError> {
        if let Some(user) = ctx.user {
            if !self.membership.is_member(user, &self.draft_group).await? {
                return Err(AuthorizationError::NotInGroup {
                    user: user.to_string(),
                    group: self.draft_group.clone(),
                }
                .into());
            }
        }
        if ids.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        let found = self.services.get_many(ids).await?;
        BatchRejection::check(missing(ids, &found))?;

        let reset: Vec<StateChange> = found
            .into_iter()
            .filter(|service| service.state != ServiceState::Review)
            .map(|service| {
                tracing::warn!(service_id = %service.id, from = %service.state, "service reset to review");
                StateChange {
                    id: service.id,
                    from: service.state,
                    to: ServiceState::Review,
                    entry_date: None,
                    draw: None,
                }
            })
            .collect();
        if reset.is_empty() {
            return Ok(Vec::new());
        }
        self.services.transition_many(reset).await
    }

    /// Resolve the sequence numbering `service`, and the as-of date.
    ///
    /// A missing entry date becomes the context date, which must still come
    /// before the delivery date.
    async fn plan_number(
        &self,
        ctx: &RequestContext,
        service: &Service,
    ) -> Result<NumberPlan, TechServError> {
        let date = service.entry_date.unwrap_or(ctx.date);
        if service.entry_date.is_none() {
            Service {
                entry_date: Some(date),
                ..service.clone()
            }
            .validate()?;
        }
        let period = self
            .periods
            .find_open_standard(service.company_id, date)
            .await?
            .ok_or_else(|| SequenceError::PeriodNotFound {
                company: service.company_id.to_string(),
                date,
            })?;
        let fiscal_year = self
            .fiscal_years
            .get_by_id(period.fiscal_year_id)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "FiscalYear",
                id: period.fiscal_year_id.to_string(),
            })?;
        let sequence = period
            .sequence_for(service.kind, &fiscal_year)
            .ok_or_else(|| SequenceError::NotConfigured {
                service: service.label(),
                period: period.name.clone(),
            })?;
        Ok(NumberPlan { sequence, date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Memory;
    use chrono::NaiveDate;
    use techserv_domain::error::WorkflowError;
    use techserv_domain::fiscal::{FiscalYear, Period, PeriodKind, PeriodState, ServiceSequences};
    use techserv_domain::id::{CompanyId, FiscalYearId, PeriodId, UserId};
    use techserv_domain::sequence::StrictSequence;
    use techserv_domain::service::ServiceKind;

    type Workflow = WorkflowService<Memory, Memory, Memory, Memory>;

    fn date(y: i32, m: u32, d: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        workflow: Workflow,
        memory: Memory,
        company: CompanyId,
    }

    /// A company with fiscal year 2026 and an open March period numbered by
    /// its own sequence, `MAR-0001` onwards.
    fn fixture() -> Fixture {
        let memory = Memory::default();
        let company = CompanyId::new();
        let sequence = StrictSequence::builder()
            .name("March services")
            .prefix("MAR-")
            .padding(4)
            .build()
            .unwrap();
        let year = FiscalYear {
            id: FiscalYearId::new(),
            name: "2026".to_string(),
            company_id: company,
            start_date: date(2026, 1, 1),
            end_date: date(2026, 12, 31),
            sequences: ServiceSequences::default(),
        };
        let march = Period {
            id: PeriodId::new(),
            name: "2026-03".to_string(),
            fiscal_year_id: year.id,
            start_date: date(2026, 3, 1),
            end_date: date(2026, 3, 31),
            kind: PeriodKind::Standard,
            state: PeriodState::Open,
            sequences: ServiceSequences {
                service: Some(sequence.id),
                home_service: None,
            },
        };
        memory.insert_sequence(sequence);
        memory.insert_fiscal_year(year);
        memory.insert_period(march);
        let workflow = WorkflowService::new(
            memory.clone(),
            memory.clone(),
            memory.clone(),
            memory.clone(),
        );
        Fixture {
            workflow,
            memory,
            company,
        }
    }

    /// Service store where a competing review lands right after each read.
    struct Racing(Memory);

    impl ServiceRepository for Racing {
        async fn create(&self, service: Service) -> Result<Service, TechServError> {
            ServiceRepository::create(&self.0, service).await
        }

        async fn get_by_id(&self, id: ServiceId) -> Result<Option<Service>, TechServError> {
            ServiceRepository::get_by_id(&self.0, id).await
        }

        async fn get_many(&self, ids: &[ServiceId]) -> Result<Vec<Service>, TechServError> {
            let found = self.0.get_many(ids).await?;
            let mut data = self.0.data();
            for service in &found {
                if let Some(stored) = data.services.get_mut(&service.id) {
                    stored.state = ServiceState::Review;
                    stored.number_service = Some("MAR-0009".to_string());
                }
            }
            Ok(found)
        }

        async fn get_all(&self) -> Result<Vec<Service>, TechServError> {
            ServiceRepository::get_all(&self.0).await
        }

        async fn update(&self, service: Service) -> Result<Service, TechServError> {
            ServiceRepository::update(&self.0, service).await
        }

        async fn transition_many(
            &self,
            changes: Vec<StateChange>,
        ) -> Result<Vec<Service>, TechServError> {
            self.0.transition_many(changes).await
        }

        async fn delete_many(&self, ids: &[ServiceId]) -> Result<(), TechServError> {
            self.0.delete_many(ids).await
        }

        async fn exists_numbered_between(
            &self,
            kind: ServiceKind,
            start: Date,
            end: Date,
        ) -> Result<bool, TechServError> {
            self.0.exists_numbered_between(kind, start, end).await
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::system().with_date(date(2026, 3, 15))
    }

    impl Fixture {
        fn service(&self, state: ServiceState) -> Service {
            let service = Service::builder()
                .company_id(self.company)
                .state(state)
                .entry_date(date(2026, 3, 10))
                .build()
                .unwrap();
            self.memory.insert_service(service.clone());
            service
        }
    }

    #[tokio::test]
    async fn should_number_service_from_period_sequence_on_review() {
        let fx = fixture();
        let service = fx.service(ServiceState::Pending);

        let changed = fx.workflow.review(&ctx(), &[service.id]).await.unwrap();

        assert_eq!(changed.len(), 1);
        let stored = fx.memory.service(service.id);
        assert_eq!(stored.state, ServiceState::Review);
        assert_eq!(stored.number_service.as_deref(), Some("MAR-0001"));
    }

    #[tokio::test]
    async fn should_number_batch_consecutively() {
        let fx = fixture();
        let first = fx.service(ServiceState::Pending);
        let second = fx.service(ServiceState::Pending);

        fx.workflow
            .review(&ctx(), &[first.id, second.id])
            .await
            .unwrap();

        let mut numbers = vec![
            fx.memory.service(first.id).number_service.unwrap(),
            fx.memory.service(second.id).number_service.unwrap(),
        ];
        numbers.sort();
        assert_eq!(numbers, vec!["MAR-0001", "MAR-0002"]);
    }

    #[tokio::test]
    async fn should_fall_back_to_fiscal_year_sequence() {
        let fx = fixture();
        let year_sequence = StrictSequence::builder()
            .name("Home 2026")
            .prefix("H-")
            .build()
            .unwrap();
        {
            let mut data = fx.memory.data();
            let year = data.fiscal_years.values_mut().next().unwrap();
            year.sequences.home_service = Some(year_sequence.id);
            data.sequences.insert(year_sequence.id, year_sequence);
        }
        let mut service = fx.service(ServiceState::Pending);
        service.kind = ServiceKind::HomeService;
        fx.memory.insert_service(service.clone());

        fx.workflow.review(&ctx(), &[service.id]).await.unwrap();

        assert_eq!(
            fx.memory.service(service.id).number_service.as_deref(),
            Some("H-1")
        );
    }

    #[tokio::test]
    async fn should_use_context_date_when_entry_date_missing() {
        let fx = fixture();
        let mut service = fx.service(ServiceState::Pending);
        service.entry_date = None;
        fx.memory.insert_service(service.clone());

        fx.workflow.review(&ctx(), &[service.id]).await.unwrap();

        let stored = fx.memory.service(service.id);
        assert_eq!(stored.entry_date, Some(date(2026, 3, 15)));
        assert!(stored.number_service.is_some());
    }

    #[tokio::test]
    async fn should_reject_context_entry_date_past_delivery_before_drawing() {
        let fx = fixture();
        let good = fx.service(ServiceState::Pending);
        let mut late = fx.service(ServiceState::Pending);
        late.entry_date = None;
        late.delivery_date = Some(date(2026, 3, 5));
        fx.memory.insert_service(late.clone());

        let result = fx.workflow.review(&ctx(), &[good.id, late.id]).await;

        assert!(matches!(
            result,
            Err(TechServError::Validation(ValidationError::DatesOutOfOrder { .. }))
        ));
        assert_eq!(fx.memory.data().drawn, 0);
        assert_eq!(fx.memory.service(good.id).state, ServiceState::Pending);
        assert!(fx.memory.service(late.id).entry_date.is_none());

        fx.workflow.review(&ctx(), &[good.id]).await.unwrap();
        assert_eq!(
            fx.memory.service(good.id).number_service.as_deref(),
            Some("MAR-0001")
        );
    }

    #[tokio::test]
    async fn should_refuse_review_of_service_changed_meanwhile() {
        let fx = fixture();
        let service = fx.service(ServiceState::Pending);
        let workflow = WorkflowService::new(
            Racing(fx.memory.clone()),
            fx.memory.clone(),
            fx.memory.clone(),
            fx.memory.clone(),
        );

        let result = workflow.review(&ctx(), &[service.id]).await;

        assert!(matches!(
            result,
            Err(TechServError::Workflow(WorkflowError::StaleState { .. }))
        ));
        assert_eq!(fx.memory.data().drawn, 0);
        assert_eq!(fx.memory.data().batch_writes, 0);
        assert_eq!(
            fx.memory.service(service.id).number_service.as_deref(),
            Some("MAR-0009")
        );
    }

    #[tokio::test]
    async fn should_keep_existing_number_when_reviewed_again() {
        let fx = fixture();
        let mut service = fx.service(ServiceState::Pending);
        service.number_service = Some("OLD-7".to_string());
        fx.memory.insert_service(service.clone());

        fx.workflow.review(&ctx(), &[service.id]).await.unwrap();

        assert_eq!(
            fx.memory.service(service.id).number_service.as_deref(),
            Some("OLD-7")
        );
        assert_eq!(fx.memory.data().drawn, 0);
    }

    #[tokio::test]
    async fn should_fail_when_no_period_covers_entry_date() {
        let fx = fixture();
        let mut service = fx.service(ServiceState::Pending);
        service.entry_date = Some(date(2026, 7, 1));
        fx.memory.insert_service(service.clone());

        assert!(matches!(
            fx.workflow.review(&ctx(), &[service.id]).await,
            Err(TechServError::Sequence(SequenceError::PeriodNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn should_fail_when_no_sequence_configured() {
        let fx = fixture();
        let mut service = fx.service(ServiceState::Pending);
        service.kind = ServiceKind::HomeService;
        fx.memory.insert_service(service.clone());

        assert!(matches!(
            fx.workflow.review(&ctx(), &[service.id]).await,
            Err(TechServError::Sequence(SequenceError::NotConfigured { .. }))
        ));
    }

    #[tokio::test]
    async fn should_consume_no_number_when_batch_fails() {
        let fx = fixture();
        let good = fx.service(ServiceState::Pending);
        let mut orphan = fx.service(ServiceState::Pending);
        orphan.entry_date = Some(date(2025, 6, 1));
        fx.memory.insert_service(orphan.clone());

        let result = fx.workflow.review(&ctx(), &[good.id, orphan.id]).await;

        assert!(result.is_err());
        assert_eq!(fx.memory.data().drawn, 0);
        assert_eq!(fx.memory.service(good.id).state, ServiceState::Pending);
        assert!(fx.memory.service(good.id).number_service.is_none());
    }

    #[tokio::test]
    async fn should_skip_write_when_already_in_target_state() {
        let fx = fixture();
        let service = fx.service(ServiceState::Ready);

        let changed = fx.workflow.ready(&ctx(), &[service.id]).await.unwrap();

        assert!(changed.is_empty());
        assert_eq!(fx.memory.data().batch_writes, 0);
    }

    #[tokio::test]
    async fn should_reject_review_to_delivered_for_whole_batch() {
        let fx = fixture();
        let service = fx.service(ServiceState::Pending);
        fx.workflow.review(&ctx(), &[service.id]).await.unwrap();
        let ready = fx.service(ServiceState::Ready);

        let result = fx
            .workflow
            .delivered(&ctx(), &[ready.id, service.id])
            .await;

        assert!(matches!(
            result,
            Err(TechServError::Workflow(WorkflowError::InvalidTransition {
                from: ServiceState::Review,
                to: ServiceState::Delivered,
                ..
            }))
        ));
        assert_eq!(fx.memory.service(ready.id).state, ServiceState::Ready);
    }

    #[tokio::test]
    async fn should_require_garanty_for_warranty() {
        let fx = fixture();
        let service = fx.service(ServiceState::Review);
        assert!(matches!(
            fx.workflow.warranty(&ctx(), &[service.id]).await,
            Err(TechServError::Workflow(WorkflowError::WarrantyNotCovered { .. }))
        ));

        let mut covered = fx.memory.service(service.id);
        covered.garanty = true;
        fx.memory.insert_service(covered);
        fx.workflow.warranty(&ctx(), &[service.id]).await.unwrap();
        assert_eq!(fx.memory.service(service.id).state, ServiceState::Warranty);
    }

    #[tokio::test]
    async fn should_walk_full_lifecycle() {
        let fx = fixture();
        let service = fx.service(ServiceState::Pending);
        let ids = [service.id];

        fx.workflow.review(&ctx(), &ids).await.unwrap();
        fx.workflow.without(&ctx(), &ids).await.unwrap();
        fx.workflow.delivered(&ctx(), &ids).await.unwrap();

        assert_eq!(fx.memory.service(service.id).state, ServiceState::Delivered);
    }

    #[tokio::test]
    async fn should_report_unknown_service() {
        let fx = fixture();
        assert!(matches!(
            fx.workflow.ready(&ctx(), &[ServiceId::new()]).await,
            Err(TechServError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_reject_empty_selection() {
        let fx = fixture();
        assert!(matches!(
            fx.workflow.ready(&ctx(), &[]).await,
            Err(TechServError::Validation(ValidationError::EmptySelection))
        ));
    }

    #[tokio::test]
    async fn should_let_system_caller_draft_delivered_service() {
        let fx = fixture();
        let service = fx.service(ServiceState::Delivered);

        fx.workflow.draft(&ctx(), &[service.id]).await.unwrap();

        assert_eq!(fx.memory.service(service.id).state, ServiceState::Review);
    }

    #[tokio::test]
    async fn should_refuse_draft_to_user_outside_group() {
        let fx = fixture();
        let service = fx.service(ServiceState::Delivered);
        let user_ctx = RequestContext::for_user(UserId::new());

        assert!(matches!(
            fx.workflow.draft(&user_ctx, &[service.id]).await,
            Err(TechServError::Authorization(AuthorizationError::NotInGroup { .. }))
        ));
        assert_eq!(fx.memory.service(service.id).state, ServiceState::Delivered);
    }

    #[tokio::test]
    async fn should_allow_draft_to_member_of_configured_group() {
        let fx = fixture();
        let workflow = WorkflowService::new(
            fx.memory.clone(),
            fx.memory.clone(),
            fx.memory.clone(),
            fx.memory.clone(),
        )
        .with_draft_group("workshop_admin");
        let user = UserId::new();
        fx.memory.add_member(user, "workshop_admin");
        let service = fx.service(ServiceState::Ready);

        workflow
            .draft(&RequestContext::for_user(user), &[service.id])
            .await
            .unwrap();

        assert_eq!(fx.memory.service(service.id).state, ServiceState::Review);
    }
}
