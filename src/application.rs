use std::time::Duration;

use cosmic::app::{Core, Task as CosmicTask, context_drawer};
use cosmic::iced::{Alignment, Length};
use cosmic::widget::{button, column, container, icon, row, scrollable, text, text_input};
use cosmic::{Application, Element, executor};

use crate::config::TandemConfig;
use crate::core::collection::{self, CollectionInfo};
use crate::core::item::normalize_input;
use crate::fl;
use crate::message::{LinkOutcome, LinkState, Message, Screen};
use crate::pages;
use crate::store::remote::RemoteStore;
use crate::store::{self, Collection, StoreManager, keyring};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextDrawerState {
    Link,
    Share,
}

/// Current health of the backing store, surfaced as a header icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    Idle,
    Busy,
    Error(String),
    Refreshed(String), // formatted timestamp
}

#[derive(Default)]
pub struct LinkForm {
    pub server: String,
    pub username: String,
    pub password: String,
    pub error: Option<String>,
}

pub struct Tandem {
    core: Core,
    config: TandemConfig,
    cosmic_config: cosmic::cosmic_config::Config,

    /// The active backing store. Replaced wholesale on link/unlink; in-flight
    /// futures hold their own clone and finish against the store they
    /// started with.
    store: StoreManager,
    link_state: LinkState,

    // Data
    screen: Screen,
    collections: Vec<CollectionInfo>,
    open_list: Option<Collection>,

    // UI state
    list_input: String,
    item_input: String,
    link_form: LinkForm,
    context_drawer_state: Option<ContextDrawerState>,
    status: StoreStatus,
}

pub struct Flags {
    pub config: TandemConfig,
    pub cosmic_config: cosmic::cosmic_config::Config,
    /// Deep-link target passed on the command line, already reduced to a
    /// collection id.
    pub launch_target: Option<String>,
}

impl Application for Tandem {
    type Executor = executor::Default;
    type Flags = Flags;
    type Message = Message;

    const APP_ID: &'static str = "dev.tandem.app";

    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn init(core: Core, flags: Self::Flags) -> (Self, CosmicTask<Self::Message>) {
        let config = flags.config;
        let cosmic_config = flags.cosmic_config;

        if let Err(e) = config.ensure_dirs() {
            log::error!("Failed to create data directory: {}", e);
        }

        let screen = match flags.launch_target {
            Some(ref id) => Screen::Detail(id.clone()),
            None => Screen::Lists,
        };

        let app = Self {
            core,
            // Until an account session is restored, everything runs against
            // the local store.
            store: StoreManager::local(&config.lists_dir()),
            link_state: LinkState::Local,
            screen: screen.clone(),
            collections: Vec::new(),
            open_list: None,
            list_input: String::new(),
            item_input: String::new(),
            link_form: LinkForm::default(),
            context_drawer_state: None,
            status: StoreStatus::Idle,
            config: config.clone(),
            cosmic_config,
        };

        let mut batch: Vec<CosmicTask<Message>> = vec![app.refresh_collections()];

        if let Screen::Detail(id) = screen {
            batch.push(app.fetch_open(id));
        }

        // Reconnect to a previously linked account, if its credentials are
        // still in the keyring. Nothing is migrated on restore.
        if config.account_configured() {
            let server = config.server_url.trim().to_string();
            batch.push(CosmicTask::perform(
                async move {
                    let creds = keyring::load_credentials(&server).await?;
                    let Some((username, password)) = creds else {
                        return Ok(None);
                    };
                    let remote = RemoteStore::new(&server, &username, &password)
                        .map_err(|e| e.to_string())?;
                    remote.probe().await.map_err(|e| e.to_string())?;
                    let linked = StoreManager::linked(remote);
                    let collections =
                        linked.list_collections().await.map_err(|e| e.to_string())?;
                    Ok(Some(LinkOutcome {
                        store: linked,
                        collections,
                        migrated: store::MigrationReport::default(),
                    }))
                },
                |result| cosmic::Action::App(Message::AccountRestored(result)),
            ));
        }

        (app, CosmicTask::batch(batch))
    }

    fn update(&mut self, message: Message) -> CosmicTask<Message> {
        match message {
            // --- Lists screen ---
            Message::ListInputChanged(value) => {
                self.list_input = value;
            }

            Message::ListSubmit => {
                let Some(title) = normalize_input(&self.list_input) else {
                    return CosmicTask::none();
                };
                self.list_input.clear();
                self.status = StoreStatus::Busy;

                // Create, push, and drop the handle; the collection is opened
                // again when the user selects it. The listing is fetched in
                // the same future so it cannot run ahead of the create.
                let store = self.store.clone();
                return CosmicTask::perform(
                    async move {
                        store
                            .create_collection(&title)
                            .await
                            .map_err(|e| e.to_string())?;
                        store.list_collections().await.map_err(|e| e.to_string())
                    },
                    |result| cosmic::Action::App(Message::CollectionsLoaded(result)),
                );
            }

            Message::OpenList(id) => {
                self.screen = Screen::Detail(id.clone());
                self.open_list = None;
                self.item_input.clear();
                return self.fetch_open(id);
            }

            Message::DeleteList(id) => {
                let store = self.store.clone();
                return CosmicTask::perform(
                    async move {
                        store.delete_collection(&id).await.map_err(|e| e.to_string())?;
                        store.list_collections().await.map_err(|e| e.to_string())
                    },
                    |result| cosmic::Action::App(Message::CollectionsLoaded(result)),
                );
            }

            Message::CollectionsLoaded(result) => match result {
                Ok(infos) => {
                    self.collections = infos;
                    self.status =
                        StoreStatus::Refreshed(chrono::Local::now().format("%H:%M").to_string());

                    // Another actor may have deleted the list we are showing.
                    if let Screen::Detail(ref id) = self.screen {
                        if !collection::is_present(&self.collections, id) {
                            log::info!("Open list {} disappeared, navigating back", id);
                            return self.navigate_back();
                        }
                    }
                }
                Err(e) => {
                    // Leave the current listing untouched; the next refresh
                    // will catch up.
                    log::error!("Failed to refresh lists: {}", e);
                    self.status = StoreStatus::Error(e);
                }
            },

            // --- Items screen ---
            Message::ItemInputChanged(value) => {
                self.item_input = value;
            }

            Message::ItemSubmit => {
                let Screen::Detail(ref id) = self.screen else {
                    return CosmicTask::none();
                };
                if !self.open_list.as_ref().is_some_and(|l| l.info.writable) {
                    return CosmicTask::none();
                }
                let Some(text) = normalize_input(&self.item_input) else {
                    return CosmicTask::none();
                };
                self.item_input.clear();

                let store = self.store.clone();
                let id = id.clone();
                return CosmicTask::perform(
                    async move {
                        store.insert_item(&id, &text).await.map_err(|e| e.to_string())?;
                        store.synchronize(&id).await.map_err(|e| e.to_string())
                    },
                    |result| cosmic::Action::App(Message::ListRefreshed(result)),
                );
            }

            Message::DeleteItem(item_id) => {
                let Screen::Detail(ref id) = self.screen else {
                    return CosmicTask::none();
                };
                let store = self.store.clone();
                let id = id.clone();
                return CosmicTask::perform(
                    async move {
                        store.delete_item(&id, item_id).await.map_err(|e| e.to_string())?;
                        store.synchronize(&id).await.map_err(|e| e.to_string())
                    },
                    |result| cosmic::Action::App(Message::ListRefreshed(result)),
                );
            }

            Message::ListOpened(result) | Message::ListRefreshed(result) => match result {
                Ok(open) => {
                    // Stale completions for a list we already left are dropped.
                    if self.screen == Screen::Detail(open.info.id.clone()) {
                        self.open_list = Some(open);
                    }
                }
                Err(e) => {
                    log::error!("Failed to fetch open list: {}", e);
                    if e.contains("no such collection") {
                        return self.navigate_back();
                    }
                    self.status = StoreStatus::Error(e);
                }
            },

            Message::NavigateBack => {
                return self.navigate_back();
            }

            // --- Sharing ---
            Message::OpenShareDrawer => {
                self.context_drawer_state = Some(ContextDrawerState::Share);
                self.core.window.show_context = true;
            }

            Message::CopyShareLink => {
                if let Screen::Detail(ref id) = self.screen {
                    return cosmic::iced::clipboard::write(self.config.share_url(id));
                }
            }

            // --- Account linking ---
            Message::OpenLinkDrawer => {
                self.link_form = LinkForm {
                    server: self.config.server_url.clone(),
                    username: self.config.server_username.clone(),
                    ..LinkForm::default()
                };
                self.context_drawer_state = Some(ContextDrawerState::Link);
                self.core.window.show_context = true;
            }

            Message::CloseDrawer => {
                self.context_drawer_state = None;
                self.core.window.show_context = false;
            }

            Message::LinkServerChanged(value) => {
                self.link_form.server = value;
            }

            Message::LinkUsernameChanged(value) => {
                self.link_form.username = value;
            }

            Message::LinkPasswordChanged(value) => {
                self.link_form.password = value;
            }

            Message::LinkSubmit => {
                if self.link_state == LinkState::Linking {
                    return CosmicTask::none();
                }
                let server = self.link_form.server.trim().to_string();
                let username = self.link_form.username.trim().to_string();
                let password = self.link_form.password.clone();
                if server.is_empty() || username.is_empty() || password.is_empty() {
                    self.link_form.error = Some("Server, username and password are required".into());
                    return CosmicTask::none();
                }

                self.link_state = LinkState::Linking;
                self.link_form.error = None;

                // Everything created while unlinked moves into the account
                // before the store handle is swapped.
                let local = self.store.clone();
                return CosmicTask::perform(
                    async move {
                        keyring::store_credentials(&server, &username, &password).await?;
                        let remote = RemoteStore::new(&server, &username, &password)
                            .map_err(|e| e.to_string())?;
                        remote.probe().await.map_err(|e| e.to_string())?;
                        let linked = StoreManager::linked(remote);
                        let migrated =
                            store::migrate(&local, &linked).await.map_err(|e| e.to_string())?;
                        let collections =
                            linked.list_collections().await.map_err(|e| e.to_string())?;
                        Ok(LinkOutcome {
                            store: linked,
                            collections,
                            migrated,
                        })
                    },
                    |result| cosmic::Action::App(Message::LinkCompleted(result)),
                );
            }

            Message::LinkCompleted(result) => match result {
                Ok(outcome) => {
                    log::info!(
                        "Linked account: migrated {} lists / {} items, {} remapped",
                        outcome.migrated.collections,
                        outcome.migrated.items,
                        outcome.migrated.remapped.len()
                    );
                    self.store = outcome.store;
                    self.link_state = LinkState::Linked;
                    self.collections = outcome.collections;
                    self.status =
                        StoreStatus::Refreshed(chrono::Local::now().format("%H:%M").to_string());

                    self.config.server_url = self.link_form.server.trim().to_string();
                    self.config.server_username = self.link_form.username.trim().to_string();
                    self.save_config();

                    self.link_form = LinkForm::default();
                    self.context_drawer_state = None;
                    self.core.window.show_context = false;
                }
                Err(e) => {
                    log::error!("Account linking failed: {}", e);
                    self.link_state = LinkState::Local;
                    self.link_form.error = Some(e.clone());
                    self.status = StoreStatus::Error(e);
                }
            },

            Message::AccountRestored(result) => match result {
                Ok(Some(outcome)) => {
                    log::info!("Restored linked account session");
                    self.store = outcome.store;
                    self.link_state = LinkState::Linked;
                    self.collections = outcome.collections;

                    // A deep link opened before the restore should resolve
                    // against the account store.
                    if let Screen::Detail(ref id) = self.screen {
                        return self.fetch_open(id.clone());
                    }
                }
                Ok(None) => {
                    log::info!("No stored credentials; staying local");
                }
                Err(e) => {
                    // The account is unreachable or no longer authorized.
                    // Keep working locally and say so instead of failing
                    // silently on every operation.
                    log::error!("Could not restore account session: {}", e);
                    self.status = StoreStatus::Error(e);
                }
            },

            Message::Unlink => {
                let server = self.config.server_url.trim().to_string();
                self.store = StoreManager::local(&self.config.lists_dir());
                self.link_state = LinkState::Local;
                self.open_list = None;
                self.screen = Screen::Lists;

                let mut batch = vec![self.refresh_collections()];
                if !server.is_empty() {
                    batch.push(CosmicTask::perform(
                        async move { keyring::delete_credentials(&server).await },
                        |result| cosmic::Action::App(Message::CredentialsCleared(result)),
                    ));
                }
                return CosmicTask::batch(batch);
            }

            Message::CredentialsCleared(result) => {
                if let Err(e) = result {
                    log::error!("Failed to remove stored credentials: {}", e);
                }
            }

            // --- Background refresh ---
            Message::PollTick => {
                if self.status == StoreStatus::Busy {
                    return CosmicTask::none();
                }
                let mut batch = vec![self.refresh_collections()];
                if let Screen::Detail(ref id) = self.screen {
                    let store = self.store.clone();
                    let id = id.clone();
                    batch.push(CosmicTask::perform(
                        async move { store.synchronize(&id).await.map_err(|e| e.to_string()) },
                        |result| cosmic::Action::App(Message::ListRefreshed(result)),
                    ));
                }
                return CosmicTask::batch(batch);
            }
        }

        CosmicTask::none()
    }

    fn view(&self) -> Element<'_, Message> {
        match self.screen {
            Screen::Lists => pages::lists::lists_view(&self.collections, &self.list_input),
            Screen::Detail(_) => {
                pages::items::items_view(self.open_list.as_ref(), &self.item_input)
            }
        }
    }

    fn header_start(&self) -> Vec<Element<'_, Message>> {
        match self.screen {
            Screen::Lists => Vec::new(),
            Screen::Detail(_) => vec![
                button::icon(icon::from_name("go-previous-symbolic"))
                    .on_press(Message::NavigateBack)
                    .into(),
            ],
        }
    }

    fn header_end(&self) -> Vec<Element<'_, Message>> {
        let mut header_row = row().spacing(4).align_y(Alignment::Center);

        if let StoreStatus::Error(_) = self.status {
            header_row = header_row.push(icon::from_name("dialog-warning-symbolic").icon());
        }

        match self.screen {
            Screen::Lists => {
                let link_btn = match self.link_state {
                    LinkState::Local => {
                        button::standard(fl!("link-button")).on_press(Message::OpenLinkDrawer)
                    }
                    // Disabled while the flow is in flight.
                    LinkState::Linking => button::standard(fl!("link-button")),
                    LinkState::Linked => {
                        button::standard(fl!("unlink-button")).on_press(Message::Unlink)
                    }
                };
                header_row = header_row.push(link_btn);
            }
            Screen::Detail(_) => {
                header_row = header_row.push(
                    button::icon(icon::from_name("emblem-shared-symbolic"))
                        .on_press(Message::OpenShareDrawer),
                );
            }
        }

        vec![header_row.into()]
    }

    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Message>> {
        let drawer_state = self.context_drawer_state?;

        match drawer_state {
            ContextDrawerState::Link => Some(
                context_drawer::context_drawer(
                    container(scrollable(self.link_form_view().padding(16)))
                        .width(Length::Fill),
                    Message::CloseDrawer,
                )
                .title(fl!("link-title")),
            ),
            ContextDrawerState::Share => Some(
                context_drawer::context_drawer(
                    container(scrollable(self.share_view().padding(16))).width(Length::Fill),
                    Message::CloseDrawer,
                )
                .title(fl!("share-title")),
            ),
        }
    }

    fn on_escape(&mut self) -> CosmicTask<Message> {
        if self.context_drawer_state.is_some() {
            self.context_drawer_state = None;
            self.core.window.show_context = false;
        }
        CosmicTask::none()
    }

    fn subscription(&self) -> cosmic::iced::Subscription<Message> {
        let interval = self.config.poll_interval_secs.max(5);
        cosmic::iced::time::every(Duration::from_secs(interval)).map(|_| Message::PollTick)
    }
}

impl Tandem {
    fn refresh_collections(&self) -> CosmicTask<Message> {
        let store = self.store.clone();
        CosmicTask::perform(
            async move { store.list_collections().await.map_err(|e| e.to_string()) },
            |result| cosmic::Action::App(Message::CollectionsLoaded(result)),
        )
    }

    fn fetch_open(&self, id: String) -> CosmicTask<Message> {
        let store = self.store.clone();
        CosmicTask::perform(
            async move { store.open_collection(&id).await.map_err(|e| e.to_string()) },
            |result| cosmic::Action::App(Message::ListOpened(result)),
        )
    }

    /// Leave the detail screen. The open snapshot is dropped here, which is
    /// the whole teardown: no listener or handle survives the screen.
    fn navigate_back(&mut self) -> CosmicTask<Message> {
        self.screen = Screen::Lists;
        self.open_list = None;
        self.item_input.clear();
        self.refresh_collections()
    }

    fn save_config(&self) {
        use cosmic::cosmic_config::CosmicConfigEntry;
        if let Err(e) = self.config.write_entry(&self.cosmic_config) {
            log::error!("Failed to save config: {}", e);
        }
    }

    fn link_form_view(&self) -> column::Column<'_, Message> {
        let form = &self.link_form;
        let mut content = column().spacing(16);

        content = content.push(text::body(fl!("link-hint")));

        content = content.push(
            text_input::text_input(fl!("link-server"), form.server.to_string())
                .on_input(Message::LinkServerChanged)
                .width(Length::Fill),
        );
        content = content.push(
            text_input::text_input(fl!("link-username"), form.username.to_string())
                .on_input(Message::LinkUsernameChanged)
                .width(Length::Fill),
        );
        content = content.push(
            text_input::secure_input(
                fl!("link-password"),
                form.password.clone(),
                None::<Message>,
                true,
            )
            .on_input(Message::LinkPasswordChanged)
            .on_submit(|_| Message::LinkSubmit)
            .width(Length::Fill),
        );

        let connect = if self.link_state == LinkState::Linking {
            button::suggested(fl!("link-connect"))
        } else {
            button::suggested(fl!("link-connect")).on_press(Message::LinkSubmit)
        };
        content = content.push(connect);

        if let Some(ref error) = form.error {
            content = content.push(text::body(format!("✗ {}", error)));
        }

        content
    }

    fn share_view(&self) -> column::Column<'_, Message> {
        let mut content = column().spacing(16);

        if self.link_state == LinkState::Linked {
            if let Screen::Detail(ref id) = self.screen {
                content = content.push(text::body(fl!("share-hint")));
                content = content.push(text::body(self.config.share_url(id)));
                content = content
                    .push(button::standard(fl!("share-copy")).on_press(Message::CopyShareLink));
            }
        } else {
            content = content.push(text::body(fl!("share-requires-account")));
        }

        content
    }
}
