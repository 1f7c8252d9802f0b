//! WebSocket upgrade + message loop. Each connection owns one `ClientSession`
//! (navigation, mounted board, decision key, account); messages are handled in
//! arrival order on the connection's task. We reply with a single JSON message
//! per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::decision::DecisionKey;
use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

const NO_BOARD: &str = "No activity is open.";

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "sciquest_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "sciquest_backend", "WebSocket connected");
  let mut session = ClientSession::new(&state);
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "sciquest_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &mut session).await
          }
          Err(e) => error_msg(ApiError::InvalidMessage(e.to_string())),
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "sciquest_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  // An interrupted gesture must not leave a drag behind.
  if let Some(board) = session.board.as_mut() {
    board.cancel_drag();
  }
  info!(target: "sciquest_backend", solved = session.solved.len(), "WebSocket disconnected");
}

fn error_msg(e: ApiError) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

fn nav(state: &AppState, session: &ClientSession) -> ServerWsMessage {
  ServerWsMessage::Navigation { state: session.navigator.state(&state.curriculum) }
}

fn decision_key_msg(key: &DecisionKey, focus: Option<&str>) -> ServerWsMessage {
  ServerWsMessage::DecisionKey {
    key_id: key.id().to_string(),
    title: key.title().to_string(),
    nodes: key.visible_nodes(),
    path: focus.and_then(|id| key.path_to(id)).unwrap_or_default(),
  }
}

#[instrument(level = "debug", skip(msg, state, session))]
pub async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session: &mut ClientSession) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::SelectCourse { course_id } => {
      session.navigator.select_course(&state.curriculum, &course_id);
      nav(state, session)
    }
    ClientWsMessage::SelectChapter { chapter_id } => {
      session.navigator.select_chapter(&state.curriculum, &chapter_id);
      nav(state, session)
    }
    ClientWsMessage::SelectSequence { sequence_id } => {
      session.navigator.select_sequence(&state.curriculum, &sequence_id);
      nav(state, session)
    }
    ClientWsMessage::SelectSeance { seance_id } => {
      session.navigator.select_seance(&state.curriculum, &seance_id);
      nav(state, session)
    }
    ClientWsMessage::Back => {
      // Leaving a séance unmounts whatever activity was open in it.
      close_activity(session);
      session.navigator.back();
      nav(state, session)
    }
    ClientWsMessage::ResetNavigation => {
      close_activity(session);
      session.navigator.reset();
      nav(state, session)
    }

    ClientWsMessage::OpenActivity { activity_id } => match open_activity(state, session, &activity_id) {
      Ok(board) => ServerWsMessage::Board { board: board.snapshot() },
      Err(e) => error_msg(e),
    },
    ClientWsMessage::CloseActivity => {
      close_activity(session);
      ServerWsMessage::ActivityClosed
    }

    ClientWsMessage::LayoutReset => match session.board.as_mut() {
      Some(board) => {
        board.clear_layout();
        ServerWsMessage::Board { board: board.snapshot() }
      }
      None => ServerWsMessage::Error { message: NO_BOARD.into() },
    },
    ClientWsMessage::RegionLayout { region_id, rect } => match session.board.as_mut() {
      Some(board) => {
        let accepted = board.register_layout(&region_id, rect);
        ServerWsMessage::LayoutAck { region_id, accepted }
      }
      None => ServerWsMessage::Error { message: NO_BOARD.into() },
    },

    ClientWsMessage::DragStart { item_id, point } => match session.board.as_mut() {
      Some(board) => match board.start_drag(&item_id, point) {
        Ok(()) => ServerWsMessage::DragStarted { item_id },
        Err(reason) => ServerWsMessage::DragRefused { item_id, reason },
      },
      None => ServerWsMessage::Error { message: NO_BOARD.into() },
    },
    ClientWsMessage::DragMove { point } => match session.board.as_mut().and_then(|b| b.move_drag(point)) {
      Some(offset) => ServerWsMessage::DragMoved { offset },
      None => ServerWsMessage::Error { message: "No drag in progress.".into() },
    },
    ClientWsMessage::DragRelease { point } => match session.board.as_mut() {
      Some(board) => ServerWsMessage::DropResult { result: board.release_drag(point) },
      None => ServerWsMessage::Error { message: NO_BOARD.into() },
    },
    ClientWsMessage::DragCancel => match session.board.as_mut() {
      Some(board) => ServerWsMessage::DropResult { result: board.cancel_drag() },
      None => ServerWsMessage::Error { message: NO_BOARD.into() },
    },

    ClientWsMessage::Check => match check_board(state, session).await {
      Some(result) => {
        tracing::info!(target: "activity", scored = result.scored, phase = ?result.phase, "WS check evaluated");
        ServerWsMessage::CheckResult { result, feedback: state.feedback.clone() }
      }
      None => ServerWsMessage::Error { message: NO_BOARD.into() },
    },
    ClientWsMessage::RevealSolution => match session.board.as_mut() {
      Some(board) => {
        board.reveal_solution();
        ServerWsMessage::Board { board: board.snapshot() }
      }
      None => ServerWsMessage::Error { message: NO_BOARD.into() },
    },
    ClientWsMessage::Reset => match session.board.as_mut() {
      Some(board) => {
        board.reset();
        ServerWsMessage::Board { board: board.snapshot() }
      }
      None => ServerWsMessage::Error { message: NO_BOARD.into() },
    },
    ClientWsMessage::Snapshot => match session.board.as_ref() {
      Some(board) => ServerWsMessage::Board { board: board.snapshot() },
      None => ServerWsMessage::Error { message: NO_BOARD.into() },
    },

    ClientWsMessage::OpenDecisionKey { key_id } => match state.decision_key(&key_id) {
      Some(def) => decision_key_msg(session.decision_key.insert(DecisionKey::new(def)), None),
      None => error_msg(ApiError::UnknownDecisionKey(key_id)),
    },
    ClientWsMessage::ToggleNode { node_id } => match session.decision_key.as_mut() {
      Some(key) => {
        key.toggle(&node_id);
        decision_key_msg(key, Some(&node_id))
      }
      None => ServerWsMessage::Error { message: "No decision key is open.".into() },
    },
    ClientWsMessage::CollapseAll => match session.decision_key.as_mut() {
      Some(key) => {
        key.collapse_all();
        decision_key_msg(key, None)
      }
      None => ServerWsMessage::Error { message: "No decision key is open.".into() },
    },

    ClientWsMessage::SignUp { email, password, name } => match sign_up(session, &email, password.expose(), &name).await {
      Ok(user) => ServerWsMessage::User { user: Some(user) },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },
    ClientWsMessage::SignIn { email, password } => match sign_in(session, &email, password.expose()).await {
      Ok(user) => ServerWsMessage::User { user: Some(user) },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },
    ClientWsMessage::SignOut => {
      if let Err(e) = sign_out(session) {
        debug!(target: "progress", error = %e, "Sign out without a user");
      }
      ServerWsMessage::User { user: None }
    }
    ClientWsMessage::WhoAmI => ServerWsMessage::User { user: session.progress.current_user().await },
  }
}
