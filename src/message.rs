use uuid::Uuid;

use crate::core::collection::CollectionInfo;
use crate::store::{Collection, MigrationReport, StoreManager};

/// Relationship to the remote account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Local,
    Linking,
    Linked,
}

/// Which screen is showing. The detail screen keeps its collection id here so
/// deletion by another actor can be detected even before the open completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Lists,
    Detail(String),
}

/// Everything a successful link (or session restore) produces: the
/// replacement store handle, a first listing fetched through it, and what was
/// migrated along the way.
#[derive(Debug, Clone)]
pub struct LinkOutcome {
    pub store: StoreManager,
    pub collections: Vec<CollectionInfo>,
    pub migrated: MigrationReport,
}

#[derive(Debug, Clone)]
pub enum Message {
    // Lists screen
    ListInputChanged(String),
    ListSubmit,
    OpenList(String),
    DeleteList(String),
    CollectionsLoaded(Result<Vec<CollectionInfo>, String>),

    // Items screen
    ItemInputChanged(String),
    ItemSubmit,
    DeleteItem(Uuid),
    ListOpened(Result<Collection, String>),
    ListRefreshed(Result<Collection, String>),
    NavigateBack,

    // Sharing
    OpenShareDrawer,
    CopyShareLink,

    // Account linking
    OpenLinkDrawer,
    CloseDrawer,
    LinkServerChanged(String),
    LinkUsernameChanged(String),
    LinkPasswordChanged(String),
    LinkSubmit,
    LinkCompleted(Result<LinkOutcome, String>),
    AccountRestored(Result<Option<LinkOutcome>, String>),
    Unlink,
    CredentialsCleared(Result<(), String>),

    // Background refresh
    PollTick,
}
