use crate::api::{FeedError, SwipeRequest};
use crate::swipe::{SwipeDecision, SwipeEvent};

use super::{FeedController, FeedEvent};

impl FeedController {
    /// Record a decision on a candidate.
    ///
    /// The record must be confirmed by the backend before the candidate
    /// leaves the feed. On success a match (if any) is broadcast first, then
    /// the candidate is removed after the configured exit delay. On failure
    /// the candidate stays where it was and can be swiped again.
    ///
    /// A second swipe on the same candidate while one is pending fails with
    /// [`FeedError::Conflict`].
    pub async fn swipe(
        &self,
        candidate_id: &str,
        decision: SwipeDecision,
    ) -> Result<SwipeEvent, FeedError> {
        if self.is_disposed() {
            return Err(FeedError::Disposed);
        }

        let candidate = self
            .shared
            .inner
            .lock()
            .state()
            .candidate(candidate_id)
            .cloned()
            .ok_or_else(|| FeedError::CandidateNotFound {
                candidate_id: candidate_id.to_string(),
            })?;

        // Held until removal so a retry during the exit delay still conflicts.
        let _slot = self.shared.in_flight.begin(candidate_id)?;

        let request = SwipeRequest {
            swiped_id: candidate.founder_id.clone(),
            swipe_type: decision,
            project_id: candidate.primary_project_id().map(str::to_string),
        };

        self.emit(FeedEvent::SwipeStarted {
            candidate_id: candidate_id.to_string(),
            decision,
        });

        let response = match self.shared.api.record_swipe(&request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(
                    candidate_id,
                    decision = %decision,
                    error = %error,
                    error_type = error.error_type(),
                    "Swipe failed, candidate kept"
                );
                self.emit(FeedEvent::SwipeFailed {
                    candidate_id: candidate_id.to_string(),
                    error: error.clone(),
                });
                return Err(error);
            }
        };

        let event = SwipeEvent {
            candidate_id: candidate_id.to_string(),
            decision,
            founder_id: request.swiped_id,
            project_id: request.project_id,
            match_created: response.match_created,
        };

        tracing::info!(
            candidate_id,
            decision = %decision,
            match_created = event.match_created,
            "Swipe recorded"
        );
        if event.match_created {
            self.emit(FeedEvent::MatchCreated(event.clone()));
        }

        let delay = self.shared.settings.swipe_exit_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.remove_candidate(candidate_id);

        Ok(event)
    }

    /// Whether a swipe on `candidate_id` is awaiting confirmation.
    pub fn is_swipe_pending(&self, candidate_id: &str) -> bool {
        self.shared.in_flight.is_pending(candidate_id)
    }
}
