use std::time::Duration;

use thiserror::Error;

use crate::schedule::day::{DayOfWeek, DaySchedule};
use crate::schedule::error::ScheduleError;
use crate::schedule::interval::Interval;
use crate::schedule::partition::{FullPartition, partition};
use crate::schedule::resolver::current_activity;
use crate::schedule::time::TimePoint;
use crate::session::draft::{DraftPatch, EditDraft};
use crate::session::mutation::{MutationRequest, with_timeout};
use crate::sync::store::{ActivityRecord, ActivityStore, LoadError, load_schedule};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("Another change is still being saved")]
    Busy,
    #[error("Activity was never saved, so it cannot be deleted")]
    NotPersisted,
    #[error("Free time cannot be selected or edited")]
    FreeTime,
    #[error("{0} has no activities to copy")]
    NothingToCopy(DayOfWeek),
    #[error("Cannot copy {0} onto itself")]
    SameDay(DayOfWeek),
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    pub requests: Vec<MutationRequest>,
    pub draft: Option<EditDraft>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Viewing,
    Selected(Interval),
    Editing(EditDraft),
    Committing(PendingMutation),
    Error {
        message: String,
        draft: Option<EditDraft>,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Viewing => "viewing",
            SessionState::Selected(_) => "selected",
            SessionState::Editing(_) => "editing",
            SessionState::Committing(_) => "committing",
            SessionState::Error { .. } => "in error",
        }
    }
}

fn load_failure(error: LoadError) -> ScheduleError {
    match error {
        LoadError::Schedule(e) => e,
        LoadError::Store(e) => ScheduleError::RemoteFailure(e.to_string()),
    }
}

/// Edit workflow for one user's week. Every change goes to the store first
/// and is only visible locally after the following reload.
pub struct ScheduleEditSession {
    user_id: String,
    current_day: DayOfWeek,
    schedule: DaySchedule,
    state: SessionState,
    remote_timeout: Option<Duration>,
}

impl ScheduleEditSession {
    pub fn new(user_id: impl Into<String>, current_day: DayOfWeek) -> Self {
        Self {
            user_id: user_id.into(),
            current_day,
            schedule: DaySchedule::new(),
            state: SessionState::Viewing,
            remote_timeout: None,
        }
    }

    pub fn with_timeout(mut self, remote_timeout: Option<Duration>) -> Self {
        self.remote_timeout = remote_timeout;
        self
    }

    pub fn with_schedule(mut self, schedule: DaySchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn schedule(&self) -> &DaySchedule {
        &self.schedule
    }

    pub fn current_day(&self) -> DayOfWeek {
        self.current_day
    }

    pub fn set_current_day(&mut self, day: DayOfWeek) {
        self.current_day = day;
    }

    pub fn day_intervals(&self) -> &[Interval] {
        self.schedule.day(self.current_day)
    }

    pub fn day_partition(&self) -> Result<FullPartition, ScheduleError> {
        partition(self.day_intervals())
    }

    pub fn current_activity(&self, now: TimePoint) -> Result<Option<&Interval>, ScheduleError> {
        current_activity(self.day_intervals(), now)
    }

    pub fn draft(&self) -> Option<&EditDraft> {
        match &self.state {
            SessionState::Editing(draft) => Some(draft),
            SessionState::Committing(pending) => pending.draft.as_ref(),
            SessionState::Error { draft, .. } => draft.as_ref(),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SessionState::Committing(_))
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        tracing::warn!("Rejected {} while {}", action, self.state.name());
        if self.is_busy() {
            return SessionError::Busy;
        }
        SessionError::InvalidTransition {
            state: self.state.name(),
            action,
        }
    }

    pub fn select(&mut self, interval: &Interval) -> Result<(), SessionError> {
        match self.state {
            SessionState::Viewing | SessionState::Selected(_) => {}
            _ => return Err(self.invalid("select")),
        }
        if interval.is_synthetic {
            return Err(SessionError::FreeTime);
        }
        self.state = SessionState::Selected(interval.clone());
        Ok(())
    }

    pub fn start_create(&mut self, day: DayOfWeek) -> Result<(), SessionError> {
        match self.state {
            SessionState::Viewing | SessionState::Selected(_) => {}
            _ => return Err(self.invalid("create")),
        }
        self.current_day = day;
        self.state = SessionState::Editing(EditDraft::new(day));
        tracing::info!("Creating a new activity on {}", day);
        Ok(())
    }

    pub fn start_edit(&mut self, interval: &Interval) -> Result<(), SessionError> {
        match self.state {
            SessionState::Viewing | SessionState::Selected(_) => {}
            _ => return Err(self.invalid("edit")),
        }
        if interval.is_synthetic {
            return Err(SessionError::FreeTime);
        }
        self.state = SessionState::Editing(EditDraft::for_interval(self.current_day, interval));
        tracing::info!("Editing {} on {}", interval.describe(), self.current_day);
        Ok(())
    }

    pub fn edit_selected(&mut self) -> Result<(), SessionError> {
        let SessionState::Selected(interval) = &self.state else {
            return Err(self.invalid("edit selection"));
        };
        let interval = interval.clone();
        self.start_edit(&interval)
    }

    pub fn update_draft(&mut self, patch: DraftPatch) -> Result<(), SessionError> {
        let mut draft = match &self.state {
            SessionState::Editing(draft) => draft.clone(),
            SessionState::Error { draft: Some(draft), .. } => draft.clone(),
            _ => return Err(self.invalid("update the draft")),
        };
        draft.apply(patch);
        self.state = SessionState::Editing(draft);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        self.state = SessionState::Viewing;
        Ok(())
    }

    /// Drops whatever the session was doing, including a save whose
    /// outcome will never be reported.
    pub fn reset(&mut self) {
        if self.is_busy() {
            tracing::warn!("Resetting session with a change still in flight");
        }
        self.state = SessionState::Viewing;
    }

    pub fn begin_commit(&mut self) -> Result<MutationRequest, SessionError> {
        let draft = match &self.state {
            SessionState::Editing(draft) => draft,
            SessionState::Error { draft: Some(draft), .. } => draft,
            _ => return Err(self.invalid("commit")),
        };

        let request = draft.to_request(&self.user_id)?;
        let draft = draft.clone();

        tracing::info!("Committing: {}", request.describe());
        self.state = SessionState::Committing(PendingMutation {
            requests: vec![request.clone()],
            draft: Some(draft),
        });
        Ok(request)
    }

    pub fn begin_delete(&mut self) -> Result<MutationRequest, SessionError> {
        let (target, draft) = match &self.state {
            SessionState::Selected(interval) => (Some(interval), None),
            SessionState::Editing(draft) => (draft.original.as_ref(), Some(draft.clone())),
            _ => return Err(self.invalid("delete")),
        };

        let id = target
            .and_then(|interval| interval.id.clone())
            .ok_or(SessionError::NotPersisted)?;
        let request = MutationRequest::Delete { id };

        tracing::info!("Committing: {}", request.describe());
        self.state = SessionState::Committing(PendingMutation {
            requests: vec![request.clone()],
            draft,
        });
        Ok(request)
    }

    /// Records a failed store call. The draft survives so the user can
    /// retry or cancel. Outside `Committing` nothing was sent, so the state
    /// is left alone and an invalid transition is returned instead.
    pub fn fail_mutation(&mut self, message: impl Into<String>) -> SessionError {
        if !self.is_busy() {
            return self.invalid_outside_commit("fail a mutation");
        }
        let message = message.into();
        let draft = match std::mem::replace(&mut self.state, SessionState::Viewing) {
            SessionState::Committing(pending) => pending.draft,
            _ => None,
        };

        tracing::error!("Remote store failure: {}", message);
        self.state = SessionState::Error {
            message: message.clone(),
            draft,
        };
        SessionError::Schedule(ScheduleError::RemoteFailure(message))
    }

    /// Installs the schedule reloaded after an acknowledged change.
    pub fn complete_mutation(&mut self, schedule: DaySchedule) -> Result<(), SessionError> {
        if !self.is_busy() {
            return Err(self.invalid_outside_commit("complete a mutation"));
        }
        self.schedule = schedule;
        self.state = SessionState::Viewing;
        tracing::info!("Change saved; {} activities on {}", self.day_intervals().len(), self.current_day);
        Ok(())
    }

    fn invalid_outside_commit(&self, action: &'static str) -> SessionError {
        tracing::warn!("Rejected {} while {}", action, self.state.name());
        SessionError::InvalidTransition {
            state: self.state.name(),
            action,
        }
    }

    pub async fn commit<S>(&mut self, store: &S) -> Result<(), SessionError>
    where
        S: ActivityStore + ?Sized,
    {
        let request = self.begin_commit()?;
        self.run_pending(store, vec![request]).await
    }

    pub async fn delete<S>(&mut self, store: &S) -> Result<(), SessionError>
    where
        S: ActivityStore + ?Sized,
    {
        let request = self.begin_delete()?;
        self.run_pending(store, vec![request]).await
    }

    /// Replaces every activity of `target` with copies of `source`'s.
    pub async fn copy_day<S>(&mut self, store: &S, source: DayOfWeek, target: DayOfWeek) -> Result<(), SessionError>
    where
        S: ActivityStore + ?Sized,
    {
        if !matches!(self.state, SessionState::Viewing) {
            return Err(self.invalid("copy a day"));
        }
        if source == target {
            return Err(SessionError::SameDay(source));
        }
        let copies = self.schedule.day(source);
        if copies.is_empty() {
            return Err(SessionError::NothingToCopy(source));
        }

        let mut requests: Vec<MutationRequest> = self
            .schedule
            .day(target)
            .iter()
            .filter_map(|interval| interval.id.clone())
            .map(|id| MutationRequest::Delete { id })
            .collect();
        requests.extend(
            copies
                .iter()
                .map(|interval| MutationRequest::Insert(ActivityRecord::from_interval(target, interval, &self.user_id))),
        );

        tracing::info!("Copying {} activities from {} to {}", copies.len(), source, target);
        self.state = SessionState::Committing(PendingMutation {
            requests: requests.clone(),
            draft: None,
        });
        self.run_pending(store, requests).await
    }

    pub async fn reload<S>(&mut self, store: &S) -> Result<(), SessionError>
    where
        S: ActivityStore + ?Sized,
    {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }

        let schedule = with_timeout(self.remote_timeout, load_schedule(store, &self.user_id))
            .await
            .map_err(load_failure)?;

        self.schedule = schedule;
        if let SessionState::Selected(selected) = &self.state {
            let refreshed = selected
                .id
                .as_deref()
                .and_then(|id| self.schedule.find(id))
                .map(|(_, interval)| interval.clone());
            self.state = match refreshed {
                Some(interval) => SessionState::Selected(interval),
                None => SessionState::Viewing,
            };
        }
        Ok(())
    }

    async fn run_pending<S>(&mut self, store: &S, requests: Vec<MutationRequest>) -> Result<(), SessionError>
    where
        S: ActivityStore + ?Sized,
    {
        for request in &requests {
            if let Err(e) = with_timeout(self.remote_timeout, request.send(store)).await {
                let error = self.fail_mutation(e.to_string());
                if requests.len() > 1 {
                    // some changes may have landed; show what the store now holds
                    if let Ok(schedule) = with_timeout(self.remote_timeout, load_schedule(store, &self.user_id)).await {
                        self.schedule = schedule;
                    }
                }
                return Err(error);
            }
        }

        match with_timeout(self.remote_timeout, load_schedule(store, &self.user_id)).await {
            Ok(schedule) => self.complete_mutation(schedule),
            Err(e) => {
                let error = load_failure(e);
                tracing::error!("Change saved but reload failed: {}", error);
                // the store already has the change, so the draft must not be resubmitted
                self.state = SessionState::Error {
                    message: error.to_string(),
                    draft: None,
                };
                Err(error.into())
            }
        }
    }
}
