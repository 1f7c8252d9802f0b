//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - The per-client session (navigation, mounted board, open decision key, account)
//!   - Opening/closing activities (mount/unmount lifecycle)
//!   - Checking a board and recording course progress when it is solved
//!   - Stateless grading of a full placement map (HTTP)

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, instrument, warn};

use crate::board::{ActivityBoard, CheckResponse, Phase};
use crate::curriculum::Navigator;
use crate::decision::DecisionKey;
use crate::drag::Placements;
use crate::error::ApiError;
use crate::grading::{check_all, CheckOutcome};
use crate::progress::{course_percent, ProgressClient, ProgressError, User};
use crate::state::AppState;

/// Everything one connected client has open. Dropped on disconnect.
pub struct ClientSession {
  pub navigator: Navigator,
  pub board: Option<ActivityBoard>,
  pub decision_key: Option<DecisionKey>,
  pub progress: ProgressClient,
  /// Activities solved during this session.
  pub solved: HashSet<String>,
}

impl ClientSession {
  pub fn new(state: &AppState) -> Self {
    Self {
      navigator: Navigator::new(),
      board: None,
      decision_key: None,
      progress: ProgressClient::new(state.progress.clone()),
      solved: HashSet::new(),
    }
  }
}

/// Mount an activity, discarding whatever board was open before.
#[instrument(level = "info", skip(state, session), fields(%activity_id))]
pub fn open_activity<'a>(
  state: &AppState,
  session: &'a mut ClientSession,
  activity_id: &str,
) -> Result<&'a ActivityBoard, ApiError> {
  let activity = state.activity(activity_id).ok_or_else(|| ApiError::UnknownActivity(activity_id.to_string()))?;
  if !session.navigator.offers_activity(&state.curriculum, activity_id) {
    debug!(target: "activity", %activity_id, "Activity opened outside the selected séance");
  }
  if let Some(prev) = session.board.take() {
    debug!(target: "activity", id = %prev.activity().id, "Unmounting previous board");
  }
  info!(target: "activity", id = %activity.id, source = ?activity.source, "Activity opened");
  let board = session.board.insert(ActivityBoard::new(activity, state.policy.shuffle_items));
  Ok(&*board)
}

pub fn close_activity(session: &mut ClientSession) -> bool {
  match session.board.take() {
    Some(board) => {
      debug!(target: "activity", id = %board.activity().id, placed = board.placements().len(), score = ?board.score(), "Activity closed");
      true
    }
    None => false,
  }
}

// Solved activities belong to whoever was signed in when they were solved, so
// every account change starts a fresh set.

pub async fn sign_up(session: &mut ClientSession, email: &str, password: &str, name: &str) -> Result<User, ProgressError> {
  let user = session.progress.sign_up(email, password, name).await?;
  session.solved.clear();
  Ok(user)
}

pub async fn sign_in(session: &mut ClientSession, email: &str, password: &str) -> Result<User, ProgressError> {
  let user = session.progress.sign_in(email, password).await?;
  session.solved.clear();
  Ok(user)
}

pub fn sign_out(session: &mut ClientSession) -> Result<(), ProgressError> {
  session.solved.clear();
  session.progress.sign_out()
}

/// Check the mounted board; a newly solved board bumps the course percentage.
#[instrument(level = "info", skip(state, session))]
pub async fn check_board(state: &AppState, session: &mut ClientSession) -> Option<CheckResponse> {
  let board = session.board.as_mut()?;
  let resp = board.check();
  let activity_id = board.activity().id.clone();
  if resp.scored && board.phase() == Phase::Solved {
    record_solved(state, session, &activity_id).await;
  }
  Some(resp)
}

async fn record_solved(state: &AppState, session: &mut ClientSession, activity_id: &str) {
  session.solved.insert(activity_id.to_string());
  let Some(course) = state.curriculum.course_of_activity(activity_id) else {
    debug!(target: "progress", %activity_id, "Solved activity is not part of any course");
    return;
  };
  let percent = course_percent(&course.activity_ids(), &session.solved);
  match session.progress.update_progress(&course.id, percent).await {
    Ok(()) => info!(target: "progress", course = %course.id, percent, "Course progress saved"),
    Err(ProgressError::NotSignedIn) => {
      debug!(target: "progress", course = %course.id, percent, "No user signed in; progress not saved")
    }
    Err(e) => warn!(target: "progress", course = %course.id, error = %e, "Saving progress failed; continuing"),
  }
}

/// Grade a full placement map without any session. Placements naming an unknown
/// item or region are ignored.
#[instrument(level = "info", skip(state, placements), fields(%activity_id, placed = placements.len()))]
pub fn check_placements(
  state: &AppState,
  activity_id: &str,
  placements: BTreeMap<String, String>,
) -> Result<CheckOutcome, ApiError> {
  let activity = state.activity(activity_id).ok_or_else(|| ApiError::UnknownActivity(activity_id.to_string()))?;
  let known: Placements = placements
    .into_iter()
    .filter(|(item, region)| {
      if activity.item(item).is_none() {
        warn!(target: "activity", %activity_id, %item, "Placement for unknown item ignored");
        return false;
      }
      if activity.region(region).is_none() {
        warn!(target: "activity", %activity_id, %item, %region, "Placement on unknown region ignored");
        return false;
      }
      true
    })
    .collect();
  Ok(check_all(&activity, &known))
}
