//! Screen navigation: the main menu, folder screens and file screens.
//!
//! Each screen runs one prompt and returns the next screen. A failed action shows a notice and
//! returns to the screen that offered it; a screen that cannot be shown at all falls back to
//! the screen it was entered from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use drive_service::{
    format_bytes, format_date, format_quota, DriveItem, DriveService, ItemId, ROOT_FOLDER_ID,
};
use item_cache::{ItemCache, TtlCache, STORAGE_QUOTA_TTL};
use prompt_tui::{
    Answer, ConfigurationError, PendingSource, Picked, Prompt, PromptError, PromptRuntime,
    PromptTheme, Terminal,
};

use crate::error::ActionError;
use crate::naming::keep_extension;
use crate::questions::{
    self, item_choices, DeleteMode, FileAction, FolderAction, FolderTarget, MainAction,
};
use crate::transfer::download_item;

const QUOTA_KEY: &str = "storage_quota";

/// Where the user is. `trail` holds the folder ids from below the root down to the current
/// folder; an empty trail is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Main,
    Folder { trail: Vec<ItemId> },
    File { item: DriveItem, trail: Vec<ItemId> },
    Exit,
}

impl Screen {
    fn at(trail: Vec<ItemId>) -> Self {
        if trail.is_empty() {
            Screen::Main
        } else {
            Screen::Folder { trail }
        }
    }

    /// The screen this one was entered from; the main menu has none.
    fn back(&self) -> Option<Screen> {
        match self {
            Screen::Main | Screen::Exit => None,
            Screen::Folder { trail } => {
                let mut trail = trail.clone();
                trail.pop();
                Some(Screen::at(trail))
            }
            Screen::File { trail, .. } => Some(Screen::at(trail.clone())),
        }
    }
}

fn current_folder(trail: &[ItemId]) -> &str {
    trail.last().map(String::as_str).unwrap_or(ROOT_FOLDER_ID)
}

fn parent_folder(trail: &[ItemId]) -> &str {
    match trail.len() {
        0 | 1 => ROOT_FOLDER_ID,
        len => &trail[len - 2],
    }
}

/// A lazy list whose loaded listing turned out to be empty.
fn is_empty_listing(err: &PromptError) -> bool {
    matches!(err, PromptError::Configuration(ConfigurationError::NoSelectableChoices { .. }))
}

pub struct App<T: Terminal> {
    pub(crate) runtime: PromptRuntime<T>,
    pub(crate) drive: Arc<dyn DriveService>,
    pub(crate) cache: Arc<ItemCache>,
    quota: TtlCache<String>,
    pub(crate) theme: PromptTheme,
    pub(crate) cwd: PathBuf,
}

impl<T: Terminal> App<T> {
    pub fn new(
        runtime: PromptRuntime<T>,
        drive: Arc<dyn DriveService>,
        cache: Arc<ItemCache>,
        theme: PromptTheme,
    ) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            runtime,
            drive,
            cache,
            quota: TtlCache::new(STORAGE_QUOTA_TTL),
            theme,
            cwd,
        }
    }

    /// Directory offered as the default local path.
    pub fn with_working_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn cache(&self) -> &Arc<ItemCache> {
        &self.cache
    }

    pub fn runtime(&self) -> &PromptRuntime<T> {
        &self.runtime
    }

    pub fn run(&mut self) -> Result<(), ActionError> {
        self.run_from(Screen::Main)
    }

    /// Navigate until the user exits. Aborts, terminal failures and an unreachable main menu
    /// end the loop with an error.
    pub fn run_from(&mut self, start: Screen) -> Result<(), ActionError> {
        let mut screen = start;
        loop {
            if screen == Screen::Exit {
                tracing::info!("drive session finished");
                return Ok(());
            }
            let back = screen.back();
            screen = match self.show(screen) {
                Ok(next) => next,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::warn!(error = %err, "screen failed");
                    self.notice(&err.to_string());
                    match back {
                        Some(back) => back,
                        None => return Err(err),
                    }
                }
            };
        }
    }

    fn show(&mut self, screen: Screen) -> Result<Screen, ActionError> {
        match screen {
            Screen::Main => self.show_main(),
            Screen::Folder { trail } => self.show_folder(trail),
            Screen::File { item, trail } => self.show_file(item, trail),
            Screen::Exit => Ok(Screen::Exit),
        }
    }

    /// Run a prompt; `None` when it was cancelled.
    pub(crate) fn ask<P: Prompt>(&mut self, prompt: P) -> Result<Option<P::Output>, ActionError> {
        Ok(self.runtime.run(prompt)?.submitted())
    }

    pub(crate) fn confirm(&mut self, message: &str) -> Result<bool, ActionError> {
        let prompt = questions::confirm(message, &self.theme);
        Ok(self.ask(prompt)?.unwrap_or(false))
    }

    pub(crate) fn say(&mut self, text: &str) {
        self.runtime.print_line(text);
    }

    pub(crate) fn notice(&mut self, text: &str) {
        let line = (self.theme.error)(text);
        self.runtime.print_line(&line);
    }

    /// Turn a non-fatal action failure into a notice and `fallback`.
    fn recover(
        &mut self,
        outcome: Result<Screen, ActionError>,
        fallback: Screen,
    ) -> Result<Screen, ActionError> {
        match outcome {
            Err(err) if !err.is_fatal() => {
                tracing::warn!(error = %err, "action failed");
                self.notice(&err.to_string());
                Ok(fallback)
            }
            other => other,
        }
    }

    /// Cached items right away, otherwise a background fetch that fills the cache.
    fn listing_source(&self, folder_id: &str) -> PendingSource<DriveItem> {
        if let Some(listing) = self.cache.get(folder_id) {
            return PendingSource::ready(item_choices(&self.theme, &listing.items))
                .resume_at(listing.history_id);
        }
        let drive = Arc::clone(&self.drive);
        let cache = Arc::clone(&self.cache);
        let theme = self.theme.clone();
        let key = folder_id.to_string();
        PendingSource::spawn(move || {
            cache
                .get_items(&key, || drive.list_items(&key))
                .map(|listing| item_choices(&theme, &listing.items))
        })
    }

    fn remember_position(&self, folder_id: &str, item_id: &str) {
        let position = self
            .cache
            .get(folder_id)
            .and_then(|listing| listing.items.iter().position(|item| item.id == item_id));
        if let Some(position) = position {
            self.cache.update_history_id(folder_id, position);
        }
    }

    fn quota_line(&self) -> Option<String> {
        let drive = &self.drive;
        self.quota
            .get_or_try_insert_with(QUOTA_KEY, || {
                drive.storage_quota().map(|quota| format_quota(&quota))
            })
            .map_err(|err| tracing::warn!(error = %err, "storage quota unavailable"))
            .ok()
    }

    fn open(&self, folder_id: &str, item: DriveItem, trail: Vec<ItemId>) -> Screen {
        self.remember_position(folder_id, &item.id);
        if item.is_folder() {
            let mut trail = trail;
            trail.push(item.id);
            Screen::Folder { trail }
        } else {
            Screen::File { item, trail }
        }
    }

    fn show_main(&mut self) -> Result<Screen, ActionError> {
        let quota = self.quota_line();
        let source = self.listing_source(ROOT_FOLDER_ID);
        let prompt = questions::main_menu(source, quota, &self.theme)?;
        let answer = match self.runtime.run(prompt) {
            Err(err) if is_empty_listing(&err) => return self.show_empty_main(),
            other => other?,
        };
        match answer {
            Answer::Cancelled => Ok(Screen::Exit),
            Answer::Submitted(Picked::Item(item)) => {
                Ok(self.open(ROOT_FOLDER_ID, item, Vec::new()))
            }
            Answer::Submitted(Picked::Action(action)) => {
                let outcome = self.main_action(action);
                self.recover(outcome, Screen::Main)
            }
        }
    }

    fn show_empty_main(&mut self) -> Result<Screen, ActionError> {
        let prompt = questions::empty_main_menu(&self.theme)?;
        match self.ask(prompt)? {
            None => Ok(Screen::Exit),
            Some(action) => {
                let outcome = self.main_action(action);
                self.recover(outcome, Screen::Main)
            }
        }
    }

    fn main_action(&mut self, action: MainAction) -> Result<Screen, ActionError> {
        tracing::debug!(?action, "main menu action");
        match action {
            MainAction::ManageTrash => self.manage_trash()?,
            MainAction::Upload => self.upload_into(ROOT_FOLDER_ID)?,
            MainAction::CreateFolder => self.create_folder_in(ROOT_FOLDER_ID)?,
            MainAction::OperateItems => self.operate_items(ROOT_FOLDER_ID)?,
            MainAction::Exit => return Ok(Screen::Exit),
        }
        Ok(Screen::Main)
    }

    fn show_folder(&mut self, trail: Vec<ItemId>) -> Result<Screen, ActionError> {
        let folder_id = current_folder(&trail).to_string();
        if trail.is_empty() {
            return Ok(Screen::Main);
        }
        let name = self.drive.folder_name(&folder_id)?;
        let count = self.cache.get(&folder_id).map(|listing| listing.items.len());
        if count == Some(0) {
            return self.show_empty_folder(trail, &name);
        }

        let source = self.listing_source(&folder_id);
        let message = questions::folder_message(&name, count);
        let prompt = questions::folder_menu(message, source, &self.theme)?;
        let answer = match self.runtime.run(prompt) {
            Err(err) if is_empty_listing(&err) => return self.show_empty_folder(trail, &name),
            other => other?,
        };
        match answer {
            Answer::Cancelled => Ok(Screen::Folder { trail }.back().unwrap_or(Screen::Main)),
            Answer::Submitted(Picked::Item(item)) => Ok(self.open(&folder_id, item, trail)),
            Answer::Submitted(Picked::Action(action)) => {
                let outcome = self.folder_action(action, &trail, &name);
                self.recover(outcome, Screen::Folder { trail })
            }
        }
    }

    fn show_empty_folder(&mut self, trail: Vec<ItemId>, name: &str) -> Result<Screen, ActionError> {
        let prompt = questions::empty_folder_menu(name, &self.theme)?;
        match self.ask(prompt)? {
            None => Ok(Screen::Folder { trail }.back().unwrap_or(Screen::Main)),
            Some(action) => {
                let outcome = self.folder_action(action, &trail, name);
                self.recover(outcome, Screen::Folder { trail })
            }
        }
    }

    fn folder_action(
        &mut self,
        action: FolderAction,
        trail: &[ItemId],
        name: &str,
    ) -> Result<Screen, ActionError> {
        tracing::debug!(?action, folder = name, "folder action");
        let folder_id = current_folder(trail).to_string();
        let parent_id = parent_folder(trail).to_string();
        let here = Screen::Folder { trail: trail.to_vec() };
        let up = here.back().unwrap_or(Screen::Main);

        match action {
            FolderAction::Upload => self.upload_into(&folder_id)?,
            FolderAction::CreateFolder => self.create_folder_in(&folder_id)?,
            FolderAction::OperateItems => self.operate_items(&folder_id)?,
            FolderAction::Rename => {
                let prompt =
                    questions::name_input("Provide new name of the selected: ", &self.theme);
                let Some(typed) = self.ask(prompt)? else {
                    return Ok(here);
                };
                let renamed = self.drive.rename(&folder_id, typed.trim())?;
                self.cache.update_item(&parent_id, renamed);
            }
            FolderAction::Download => {
                let prompt = questions::destination_input(
                    "Provide a desired destination to store the drive folder: ",
                    &self.cwd,
                    &self.theme,
                );
                let Some(dir) = self.ask(prompt)? else {
                    return Ok(here);
                };
                let folder = self.drive.get_item(&folder_id)?;
                let target = download_item(&*self.drive, &folder, Path::new(&dir))?;
                self.say(&format!("Downloaded to {}", target.display()));
            }
            FolderAction::Delete => {
                if !self.confirm("Proceed deleting the folder?")? {
                    return Ok(here);
                }
                self.drive.delete_item(&folder_id)?;
                self.cache.remove_item(&parent_id, &folder_id);
                self.cache.invalidate(&folder_id);
                return Ok(up);
            }
            FolderAction::Trash => {
                let message = format!(
                    "Proceed moving the folder to trash? {}",
                    (self.theme.hint)("(You will be able to restore it in the next 30 days.)")
                );
                if !self.confirm(&message)? {
                    return Ok(here);
                }
                self.drive.move_to_trash(&folder_id)?;
                self.cache.remove_item(&parent_id, &folder_id);
                return Ok(Screen::Main);
            }
            FolderAction::Move => {
                let Some(target) = self.pick_move_target(&[folder_id.as_str()])? else {
                    return Ok(here);
                };
                let moved = self.drive.move_item(&folder_id, &target.id)?;
                self.cache.remove_item(&parent_id, &folder_id);
                self.cache.add_item(&target.id, moved);
                return Ok(up);
            }
        }
        Ok(here)
    }

    /// Every folder except `exclude`, the drive root first.
    pub(crate) fn pick_move_target(
        &mut self,
        exclude: &[&str],
    ) -> Result<Option<FolderTarget>, ActionError> {
        let mut targets = Vec::new();
        if !exclude.contains(&ROOT_FOLDER_ID) {
            targets.push(FolderTarget {
                id: ROOT_FOLDER_ID.to_string(),
                name: self.drive.folder_name(ROOT_FOLDER_ID)?,
            });
        }
        targets.extend(
            self.drive
                .list_folders()?
                .into_iter()
                .filter(|folder| !exclude.contains(&folder.id.as_str()))
                .map(|folder| FolderTarget {
                    id: folder.id,
                    name: folder.name,
                }),
        );
        let prompt = questions::move_target(targets, &self.theme)?;
        self.ask(prompt)
    }

    fn show_file(&mut self, item: DriveItem, trail: Vec<ItemId>) -> Result<Screen, ActionError> {
        let prompt = questions::file_menu(&item.name, &self.theme)?;
        let Some(action) = self.ask(prompt)? else {
            return Ok(Screen::at(trail));
        };
        let outcome = self.file_action(action, &item, &trail);
        self.recover(outcome, Screen::File { item, trail })
    }

    fn file_action(
        &mut self,
        action: FileAction,
        item: &DriveItem,
        trail: &[ItemId],
    ) -> Result<Screen, ActionError> {
        tracing::debug!(?action, file = %item.name, "file action");
        let folder_id = current_folder(trail);
        let here = Screen::File {
            item: item.clone(),
            trail: trail.to_vec(),
        };
        let folder = Screen::at(trail.to_vec());

        match action {
            FileAction::Rename => {
                let prompt =
                    questions::name_input("Provide new name of the selected: ", &self.theme);
                let Some(typed) = self.ask(prompt)? else {
                    return Ok(here);
                };
                let renamed = self.drive.rename(&item.id, &keep_extension(&item.name, &typed))?;
                self.cache.update_item(folder_id, renamed);
            }
            FileAction::Delete => {
                let prompt = questions::delete_question(&self.theme)?;
                let Some(mode) = self.ask(prompt)? else {
                    return Ok(here);
                };
                match mode {
                    DeleteMode::Trash => self.drive.move_to_trash(&item.id)?,
                    DeleteMode::Forever => self.drive.delete_item(&item.id)?,
                }
                self.cache.remove_item(folder_id, &item.id);
            }
            FileAction::Download => {
                let prompt = questions::destination_input(
                    "Provide a destination where to store file: ",
                    &self.cwd,
                    &self.theme,
                );
                let Some(dir) = self.ask(prompt)? else {
                    return Ok(here);
                };
                let target = download_item(&*self.drive, item, Path::new(&dir))?;
                self.say(&format!("Downloaded to {}", target.display()));
            }
            FileAction::Move => {
                let Some(target) = self.pick_move_target(&[folder_id])? else {
                    return Ok(here);
                };
                let moved = self.drive.move_item(&item.id, &target.id)?;
                self.cache.remove_item(folder_id, &item.id);
                self.cache.add_item(&target.id, moved);
            }
            FileAction::Information => {
                for line in info_lines(item) {
                    self.say(&line);
                }
                if self.confirm("Go back?")? {
                    return Ok(here);
                }
            }
        }
        Ok(folder)
    }
}

fn info_lines(item: &DriveItem) -> Vec<String> {
    vec![
        format!("Id: {}", item.id),
        format!("Name: {}", item.name),
        format!("Size: {}", format_bytes(item.size)),
        format!("MimeType: {}", item.mime_type),
        format!("Created time: {}", format_date(&item.created_at)),
    ]
}
