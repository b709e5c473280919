//! Kanban board with optimistic moves.
//!
//! A drag becomes a [`RequestStatusChange`] command. The board applies it at
//! once (`Pending`), then [`KanbanBoard::settle`] either keeps it
//! (`Confirmed`) or puts the card back where it was (`Rejected`).

use crate::error::{Result, TileError};
use crate::model::{JobWithAssignee, Profile};
use crate::status::{authorize_transition, can_act_on, JobStatus};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatusChange {
    pub job_id: String,
    pub new_status: JobStatus,
    /// Profile id of whoever dropped the card.
    pub actor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StatusChangeOutcome {
    Confirmed { job: JobWithAssignee },
    Rejected { job_id: String, reason: String },
}

impl StatusChangeOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, StatusChangeOutcome::Confirmed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MoveState {
    /// Shown in the new column, not yet acknowledged by the store.
    Pending { from: JobStatus },
    Confirmed,
    /// Rolled back to its previous column.
    Rejected { reason: String },
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KanbanCard {
    #[serde(flatten)]
    pub job: JobWithAssignee,
    pub draggable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_state: Option<MoveState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KanbanColumn {
    pub status: JobStatus,
    pub label: &'static str,
    pub color: &'static str,
    pub count: usize,
    pub cards: Vec<KanbanCard>,
}

impl KanbanColumn {
    fn recount(&mut self) {
        self.count = self.cards.len();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KanbanBoard {
    pub columns: Vec<KanbanColumn>,
    #[serde(skip)]
    actor: Option<Profile>,
}

impl KanbanBoard {
    /// Six columns in lifecycle order. Cancelled jobs are left off the board.
    pub fn build(jobs: &[JobWithAssignee], actor: &Profile) -> Self {
        let columns = JobStatus::board()
            .iter()
            .map(|&status| {
                let style = status.style();
                let cards: Vec<_> = jobs
                    .iter()
                    .filter(|j| j.status == status)
                    .map(|j| KanbanCard {
                        job: j.clone(),
                        draggable: can_act_on(actor, j),
                        move_state: None,
                    })
                    .collect();
                KanbanColumn {
                    status,
                    label: style.label,
                    color: style.color,
                    count: cards.len(),
                    cards,
                }
            })
            .collect();
        Self {
            columns,
            actor: Some(actor.clone()),
        }
    }

    pub fn column(&self, status: JobStatus) -> Option<&KanbanColumn> {
        self.columns.iter().find(|c| c.status == status)
    }

    pub fn card(&self, job_id: &str) -> Option<&KanbanCard> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .find(|card| card.job.id == job_id)
    }

    fn locate(&self, job_id: &str) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(ci, col)| {
            col.cards
                .iter()
                .position(|card| card.job.id == job_id)
                .map(|pos| (ci, pos))
        })
    }

    /// Take the card out of its column and drop it into `to`'s column. A
    /// target with no column (cancelled) leaves the card off the board.
    fn move_card(&mut self, job_id: &str, to: JobStatus) -> Option<&mut KanbanCard> {
        let (ci, pos) = self.locate(job_id)?;
        let mut card = self.columns[ci].cards.remove(pos);
        self.columns[ci].recount();
        card.job.job.status = to;
        let target = self.columns.iter_mut().find(|c| c.status == to)?;
        target.cards.push(card);
        target.recount();
        target.cards.last_mut()
    }

    /// Handle a drop: validate, apply optimistically, and return the command
    /// to send to the store. On error the board is unchanged.
    pub fn request_move(&mut self, job_id: &str, target: JobStatus) -> Result<RequestStatusChange> {
        let actor = self
            .actor
            .clone()
            .ok_or_else(|| TileError::Unauthorized("board has no actor".to_string()))?;
        let (ci, pos) = self
            .locate(job_id)
            .ok_or_else(|| TileError::JobNotFound(job_id.to_string()))?;
        let card = &self.columns[ci].cards[pos];
        let from = card.job.status;

        if !card.draggable {
            return Err(TileError::Unauthorized(format!(
                "job #{} is not assigned to {}",
                card.job.job_number, actor.full_name
            )));
        }
        if self.column(target).is_none() {
            return Err(TileError::InvalidTransition {
                from: from.to_string(),
                to: target.to_string(),
                reason: format!("{} is not a board column", target.label()),
            });
        }
        if from == target {
            return Err(TileError::InvalidTransition {
                from: from.to_string(),
                to: target.to_string(),
                reason: format!("job is already {}", target.label()),
            });
        }
        authorize_transition(&actor, &card.job, target)?;

        if let Some(card) = self.move_card(job_id, target) {
            card.move_state = Some(MoveState::Pending { from });
        }
        Ok(RequestStatusChange {
            job_id: job_id.to_string(),
            new_status: target,
            actor: actor.id,
        })
    }

    /// Fold the store's answer back into the board.
    pub fn settle(&mut self, outcome: &StatusChangeOutcome) {
        match outcome {
            StatusChangeOutcome::Confirmed { job } => {
                if let Some(card) = self.move_card(&job.id, job.status) {
                    card.job = job.clone();
                    card.move_state = Some(MoveState::Confirmed);
                }
            }
            StatusChangeOutcome::Rejected { job_id, reason } => {
                let previous = match self.card(job_id).and_then(|c| c.move_state.as_ref()) {
                    Some(MoveState::Pending { from }) => Some(*from),
                    _ => None,
                };
                let card = match previous {
                    Some(from) => self.move_card(job_id, from),
                    None => match self.locate(job_id) {
                        Some((ci, pos)) => Some(&mut self.columns[ci].cards[pos]),
                        None => None,
                    },
                };
                if let Some(card) = card {
                    card.move_state = Some(MoveState::Rejected {
                        reason: reason.clone(),
                    });
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{job, lead, owner, with_assignee};

    fn jobs() -> Vec<JobWithAssignee> {
        vec![
            with_assignee(job("a", JobStatus::Scheduled, Some("crew-x"))),
            with_assignee(job("b", JobStatus::Scheduled, Some("crew-y"))),
            with_assignee(job("c", JobStatus::Lead, None)),
            with_assignee(job("d", JobStatus::Cancelled, None)),
        ]
    }

    fn column_ids(board: &KanbanBoard, status: JobStatus) -> Vec<String> {
        board
            .column(status)
            .map(|c| c.cards.iter().map(|card| card.job.id.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn six_columns_without_cancelled() {
        let board = KanbanBoard::build(&jobs(), &owner("boss"));
        assert_eq!(board.columns.len(), 6);
        assert!(board.column(JobStatus::Cancelled).is_none());
        assert!(board.card("d").is_none());
        assert_eq!(board.column(JobStatus::Scheduled).unwrap().count, 2);
        assert_eq!(board.columns[3].label, "In Progress");
    }

    #[test]
    fn draggable_follows_assignment() {
        let board = KanbanBoard::build(&jobs(), &lead("crew-x"));
        assert!(board.card("a").unwrap().draggable);
        assert!(!board.card("b").unwrap().draggable);
        assert!(!board.card("c").unwrap().draggable);

        let board = KanbanBoard::build(&jobs(), &owner("boss"));
        assert!(board.columns.iter().flat_map(|c| &c.cards).all(|c| c.draggable));
    }

    #[test]
    fn lead_cannot_move_someone_elses_card() {
        let mut board = KanbanBoard::build(&jobs(), &lead("crew-x"));
        let before = board.clone();
        let err = board.request_move("b", JobStatus::InProgress).unwrap_err();
        assert!(matches!(err, TileError::Unauthorized(_)));
        assert_eq!(board, before);
    }

    #[test]
    fn lead_cannot_skip_ahead_on_own_card() {
        let mut board = KanbanBoard::build(&jobs(), &lead("crew-x"));
        let err = board.request_move("a", JobStatus::Paid).unwrap_err();
        assert!(matches!(err, TileError::InvalidTransition { .. }));
        assert_eq!(column_ids(&board, JobStatus::Scheduled), vec!["a", "b"]);
    }

    #[test]
    fn optimistic_move_then_confirm() {
        let mut board = KanbanBoard::build(&jobs(), &lead("crew-x"));
        let cmd = board.request_move("a", JobStatus::InProgress).unwrap();
        assert_eq!(
            cmd,
            RequestStatusChange {
                job_id: "a".into(),
                new_status: JobStatus::InProgress,
                actor: "crew-x".into(),
            }
        );
        assert_eq!(column_ids(&board, JobStatus::InProgress), vec!["a"]);
        assert_eq!(
            board.card("a").unwrap().move_state,
            Some(MoveState::Pending {
                from: JobStatus::Scheduled
            })
        );

        let mut confirmed = jobs()[0].clone();
        confirmed.job.status = JobStatus::InProgress;
        board.settle(&StatusChangeOutcome::Confirmed { job: confirmed });
        assert_eq!(board.card("a").unwrap().move_state, Some(MoveState::Confirmed));
        assert_eq!(board.column(JobStatus::InProgress).unwrap().count, 1);
        assert_eq!(board.column(JobStatus::Scheduled).unwrap().count, 1);
    }

    #[test]
    fn rejected_move_rolls_back() {
        let mut board = KanbanBoard::build(&jobs(), &owner("boss"));
        board.request_move("c", JobStatus::Quoted).unwrap();
        assert_eq!(column_ids(&board, JobStatus::Quoted), vec!["c"]);

        board.settle(&StatusChangeOutcome::Rejected {
            job_id: "c".into(),
            reason: "backend unavailable".into(),
        });
        assert_eq!(column_ids(&board, JobStatus::Lead), vec!["c"]);
        assert!(column_ids(&board, JobStatus::Quoted).is_empty());
        let card = board.card("c").unwrap();
        assert_eq!(card.job.status, JobStatus::Lead);
        assert_eq!(
            card.move_state,
            Some(MoveState::Rejected {
                reason: "backend unavailable".into()
            })
        );
    }

    #[test]
    fn cancelled_is_not_a_drop_target() {
        let mut board = KanbanBoard::build(&jobs(), &owner("boss"));
        let err = board.request_move("c", JobStatus::Cancelled).unwrap_err();
        assert!(matches!(err, TileError::InvalidTransition { .. }));
        assert!(board.request_move("zzz", JobStatus::Quoted).is_err());
    }

    #[test]
    fn card_serializes_flat_with_state() {
        let mut board = KanbanBoard::build(&jobs(), &owner("boss"));
        board.request_move("c", JobStatus::Quoted).unwrap();
        let json = serde_json::to_value(&board).unwrap();
        let card = &json["columns"][1]["cards"][0];
        assert_eq!(card["id"], "c");
        assert_eq!(card["status"], "quoted");
        assert_eq!(card["move_state"]["state"], "pending");
        assert_eq!(card["move_state"]["from"], "lead");
        assert!(json.get("actor").is_none());
    }
}
