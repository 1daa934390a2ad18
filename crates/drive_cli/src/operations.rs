//! Actions shared by the main menu and folder screens: trash, upload, new folders and
//! operations over several items.

use std::path::Path;
use std::sync::Arc;

use drive_service::DriveItem;
use item_cache::ItemCache;
use prompt_tui::Terminal;

use crate::app::App;
use crate::batch::{for_each_limited, DELETE_LIMIT, MOVE_LIMIT, TRASH_LIMIT, TRASH_RESTORE_LIMIT};
use crate::error::ActionError;
use crate::questions::{self, ItemOperation, TrashAction};
use crate::transfer::{download_item, upload_path};

impl<T: Terminal> App<T> {
    pub(crate) fn manage_trash(&mut self) -> Result<(), ActionError> {
        let trash = self.drive.list_trash()?;
        if trash.is_empty() {
            self.say("Trash is empty!");
            return Ok(());
        }
        let picker = questions::item_picker("Select items: ", &trash, &self.theme)?;
        let Some(selected) = self.ask(picker)? else {
            return Ok(());
        };
        let prompt = questions::trash_action(&self.theme)?;
        let Some(action) = self.ask(prompt)? else {
            return Ok(());
        };

        let drive = Arc::clone(&self.drive);
        match action {
            TrashAction::Delete if selected.len() == trash.len() => {
                drive.empty_trash()?;
                self.say("Trash emptied");
            }
            TrashAction::Delete => {
                for_each_limited("trash delete", &selected, TRASH_RESTORE_LIMIT, |item| {
                    Ok(drive.delete_item(&item.id)?)
                })?;
                self.say("Delete finished");
            }
            TrashAction::Recover => {
                let result =
                    for_each_limited("trash recover", &selected, TRASH_RESTORE_LIMIT, |item| {
                        drive.recover(&item.id).map(|_| ()).map_err(ActionError::from)
                    });
                // Recovered items may land in any cached folder.
                self.cache.flush_all();
                result?;
                self.say("Recovery finished");
            }
        }
        Ok(())
    }

    pub(crate) fn upload_into(&mut self, folder_id: &str) -> Result<(), ActionError> {
        let prompt = questions::upload_source_input(&self.cwd, &self.theme);
        let Some(path) = self.ask(prompt)? else {
            return Ok(());
        };
        let result = upload_path(&*self.drive, Path::new(&path), folder_id);
        self.cache.invalidate(folder_id);
        let uploaded = result?;
        tracing::info!(id = %uploaded.id, name = %uploaded.name, "upload finished");
        self.say("Uploading finished");
        Ok(())
    }

    pub(crate) fn create_folder_in(&mut self, folder_id: &str) -> Result<(), ActionError> {
        let prompt = questions::name_input("Enter new folder name: ", &self.theme);
        let Some(name) = self.ask(prompt)? else {
            return Ok(());
        };
        let folder = self.drive.create_folder(name.trim(), folder_id)?;
        self.cache.add_item(folder_id, folder);
        Ok(())
    }

    /// "Operate with items": pick several items of a folder and delete, trash, download or move
    /// them together.
    pub(crate) fn operate_items(&mut self, folder_id: &str) -> Result<(), ActionError> {
        let drive = Arc::clone(&self.drive);
        let cache = Arc::clone(&self.cache);
        let items = self.cache.get_items(folder_id, || drive.list_items(folder_id))?.items;
        if items.is_empty() {
            self.say("There are no items to operate with.");
            return Ok(());
        }
        let picker = questions::item_picker("Select items: ", &items, &self.theme)?;
        let Some(selected) = self.ask(picker)? else {
            return Ok(());
        };
        let prompt = questions::item_operation(&self.theme)?;
        let Some(operation) = self.ask(prompt)? else {
            return Ok(());
        };

        let (drive, cache) = (&*drive, &*cache);
        match operation {
            ItemOperation::Delete => {
                if !self.confirm("Confirm deletion of items?")? {
                    return Ok(());
                }
                for_each_limited("delete", &selected, DELETE_LIMIT, |item| {
                    drive.delete_item(&item.id)?;
                    forget(cache, folder_id, item);
                    Ok(())
                })?;
                self.say("Delete finished");
            }
            ItemOperation::Trash => {
                if !self.confirm("Confirm moving items to trash?")? {
                    return Ok(());
                }
                for_each_limited("trash", &selected, TRASH_LIMIT, |item| {
                    drive.move_to_trash(&item.id)?;
                    forget(cache, folder_id, item);
                    Ok(())
                })?;
                self.say("Moving to trash finished");
            }
            ItemOperation::Download => {
                let prompt = questions::destination_input(
                    "Provide a destination for the selected items: ",
                    &self.cwd,
                    &self.theme,
                );
                let Some(dir) = self.ask(prompt)? else {
                    return Ok(());
                };
                let dir = Path::new(&dir);
                for_each_limited("download", &selected, selected.len(), |item| {
                    download_item(drive, item, dir).map(|_| ())
                })?;
                self.say("Download finished");
            }
            ItemOperation::Move => {
                let exclude: Vec<&str> = selected
                    .iter()
                    .filter(|item| item.is_folder())
                    .map(|item| item.id.as_str())
                    .chain(std::iter::once(folder_id))
                    .collect();
                let Some(target) = self.pick_move_target(&exclude)? else {
                    return Ok(());
                };
                for_each_limited("move", &selected, MOVE_LIMIT, |item| {
                    let moved = drive.move_item(&item.id, &target.id)?;
                    cache.remove_item(folder_id, &item.id);
                    cache.add_item(&target.id, moved);
                    Ok(())
                })?;
                self.say("Moving finished");
            }
        }
        Ok(())
    }
}

/// Drop an item that no longer exists in `folder_id` from the cache.
fn forget(cache: &ItemCache, folder_id: &str, item: &DriveItem) {
    cache.remove_item(folder_id, &item.id);
    if item.is_folder() {
        cache.invalidate(&item.id);
    }
}
