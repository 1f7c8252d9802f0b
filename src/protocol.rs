//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::board::{BoardSnapshot, CheckResponse, DragRefusal};
use crate::config::Feedback;
use crate::curriculum::NavigationState;
use crate::decision::VisibleNode;
use crate::domain::{ActivityDef, ContentSource, Course, ItemDef, RegionDef};
use crate::drag::DropOutcome;
use crate::geometry::{Offset, Point, Rect};
use crate::grading::CheckOutcome;
use crate::progress::User;

/// Password as received from the client. Never printed by `Debug`.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"***\"")
    }
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    // Navigation
    SelectCourse {
        #[serde(rename = "courseId")]
        course_id: String,
    },
    SelectChapter {
        #[serde(rename = "chapterId")]
        chapter_id: String,
    },
    SelectSequence {
        #[serde(rename = "sequenceId")]
        sequence_id: String,
    },
    SelectSeance {
        #[serde(rename = "seanceId")]
        seance_id: String,
    },
    Back,
    ResetNavigation,
    // Activity lifecycle
    OpenActivity {
        #[serde(rename = "activityId")]
        activity_id: String,
    },
    CloseActivity,
    /// Every drop zone is about to be re-measured (rotation, resize).
    LayoutReset,
    RegionLayout {
        #[serde(rename = "regionId")]
        region_id: String,
        rect: Rect,
    },
    DragStart {
        #[serde(rename = "itemId")]
        item_id: String,
        point: Point,
    },
    DragMove {
        point: Point,
    },
    DragRelease {
        point: Point,
    },
    DragCancel,
    Check,
    RevealSolution,
    Reset,
    Snapshot,
    // Decision keys
    OpenDecisionKey {
        #[serde(rename = "keyId")]
        key_id: String,
    },
    ToggleNode {
        #[serde(rename = "nodeId")]
        node_id: String,
    },
    CollapseAll,
    // Accounts
    SignUp {
        email: String,
        password: Password,
        name: String,
    },
    SignIn {
        email: String,
        password: Password,
    },
    SignOut,
    WhoAmI,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Navigation {
        state: NavigationState,
    },
    Board {
        board: BoardSnapshot,
    },
    ActivityClosed,
    LayoutAck {
        #[serde(rename = "regionId")]
        region_id: String,
        accepted: bool,
    },
    DragStarted {
        #[serde(rename = "itemId")]
        item_id: String,
    },
    DragRefused {
        #[serde(rename = "itemId")]
        item_id: String,
        reason: DragRefusal,
    },
    DragMoved {
        offset: Offset,
    },
    DropResult {
        result: DropOutcome,
    },
    CheckResult {
        result: CheckResponse,
        feedback: Feedback,
    },
    DecisionKey {
        #[serde(rename = "keyId")]
        key_id: String,
        title: String,
        nodes: Vec<VisibleNode>,
        /// Labels from the root to the last toggled node.
        path: Vec<String>,
    },
    User {
        user: Option<User>,
    },
    Error {
        message: String,
    },
}

/// DTO used by HTTP for activity delivery. Answer keys are never sent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityOut {
    pub id: String,
    pub title: String,
    pub instructions: String,
    pub source: ContentSource,
    pub regions: Vec<RegionOut>,
    pub items: Vec<ItemOut>,
}

#[derive(Debug, Serialize)]
pub struct RegionOut {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct ItemOut {
    pub id: String,
    pub label: String,
    pub image: Option<String>,
}

fn region_out(r: &RegionDef) -> RegionOut {
    RegionOut { id: r.id.clone(), label: r.label.clone() }
}

fn item_out(i: &ItemDef) -> ItemOut {
    ItemOut { id: i.id.clone(), label: i.label.clone(), image: i.image.clone() }
}

/// Convert the full `ActivityDef` (internal) to the public DTO.
pub fn to_out(a: &ActivityDef) -> ActivityOut {
    ActivityOut {
        id: a.id.clone(),
        title: a.title.clone(),
        instructions: a.instructions.clone(),
        source: a.source,
        regions: a.regions.iter().map(region_out).collect(),
        items: a.items.iter().map(item_out).collect(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct CoursesOut {
    pub courses: Vec<Course>,
}

#[derive(Debug, Deserialize)]
pub struct CheckIn {
    /// item id -> region id
    pub placements: BTreeMap<String, String>,
}
#[derive(Serialize)]
pub struct CheckOut {
    pub result: CheckOutcome,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionKeyOut {
    pub id: String,
    pub title: String,
    pub root: crate::domain::DecisionNode,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub email: String,
}
#[derive(Serialize)]
pub struct ProgressOut {
    pub email: String,
    pub progress: BTreeMap<String, u8>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
