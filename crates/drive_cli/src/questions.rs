//! Every prompt the file manager asks, with its wording and answer type.

use std::fmt;
use std::path::Path;

use drive_service::{DriveItem, ItemId};
use prompt_tui::{
    validator, CheckboxConfig, CheckboxPrompt, Choice, ConfigurationError, ConfirmPrompt, Item,
    LazySelectConfig, LazySelectPrompt, PathInputConfig, PathInputPrompt,
    PendingSource, PromptTheme, SelectConfig, SelectPrompt, TextInputConfig, TextInputPrompt,
};

pub const NO_ITEMS_SELECTED: &str =
    "No items selected, make sure you have selected items in order to proceed.";
pub const INVALID_UPLOAD_PATH: &str =
    "The path that you provided is incorrect. Make sure you are providing valid path.";
pub const INVALID_DESTINATION: &str = "The destination must be an existing folder.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainAction {
    ManageTrash,
    Upload,
    CreateFolder,
    OperateItems,
    Exit,
}

impl MainAction {
    const KEYED: [(&'static str, MainAction); 5] = [
        ("t", MainAction::ManageTrash),
        ("u", MainAction::Upload),
        ("n", MainAction::CreateFolder),
        ("o", MainAction::OperateItems),
        ("x", MainAction::Exit),
    ];
}

impl fmt::Display for MainAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MainAction::ManageTrash => "Manage Trash",
            MainAction::Upload => "Upload from your device",
            MainAction::CreateFolder => "Create new empty folder",
            MainAction::OperateItems => "Operate with items",
            MainAction::Exit => "Exit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderAction {
    Upload,
    Download,
    Move,
    Rename,
    OperateItems,
    Delete,
    Trash,
    CreateFolder,
}

impl FolderAction {
    const KEYED: [(&'static str, FolderAction); 8] = [
        ("u", FolderAction::Upload),
        ("z", FolderAction::Download),
        ("m", FolderAction::Move),
        ("r", FolderAction::Rename),
        ("o", FolderAction::OperateItems),
        ("d", FolderAction::Delete),
        ("t", FolderAction::Trash),
        ("n", FolderAction::CreateFolder),
    ];
}

impl fmt::Display for FolderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FolderAction::Upload => "Upload from your device",
            FolderAction::Download => "Download folder",
            FolderAction::Move => "Move folder",
            FolderAction::Rename => "Rename folder",
            FolderAction::OperateItems => "Operate with items",
            FolderAction::Delete => "Delete folder",
            FolderAction::Trash => "Move folder to trash",
            FolderAction::CreateFolder => "Create new empty folder",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Rename,
    Delete,
    Download,
    Move,
    Information,
}

impl FileAction {
    fn description(self) -> &'static str {
        match self {
            FileAction::Rename => "Change the name of the file",
            FileAction::Delete => "Move the file to trash or delete it forever",
            FileAction::Download => "Save the file on your device",
            FileAction::Move => "Put the file into another folder",
            FileAction::Information => "Show id, size, type and creation time",
        }
    }
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileAction::Rename => "Rename",
            FileAction::Delete => "Delete",
            FileAction::Download => "Download",
            FileAction::Move => "Move",
            FileAction::Information => "Information",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    Trash,
    Forever,
}

impl fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeleteMode::Trash => "Move it to trash",
            DeleteMode::Forever => "Delete forever",
        })
    }
}

/// What to do with the items picked in "Operate with items".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOperation {
    Delete,
    Trash,
    Download,
    Move,
}

impl fmt::Display for ItemOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ItemOperation::Delete => "Delete",
            ItemOperation::Trash => "Move to trash",
            ItemOperation::Download => "Download",
            ItemOperation::Move => "Move",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrashAction {
    Recover,
    Delete,
}

impl fmt::Display for TrashAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrashAction::Recover => "Recover selected items",
            TrashAction::Delete => "Delete selected items",
        })
    }
}

/// A folder items can be moved into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTarget {
    pub id: ItemId,
    pub name: String,
}

impl fmt::Display for FolderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// `name`, plus a gray `(folder)` marker for folders.
pub fn item_label(theme: &PromptTheme, item: &DriveItem) -> String {
    if item.is_folder() {
        format!("{} {}", item.name, (theme.hint)("(folder)"))
    } else {
        item.name.clone()
    }
}

pub fn item_choices(theme: &PromptTheme, items: &[DriveItem]) -> Vec<Item<DriveItem>> {
    items
        .iter()
        .map(|item| Choice::named(item.clone(), item_label(theme, item)).into())
        .collect()
}

fn plain_choices<V: Copy + fmt::Display>(values: &[V]) -> Vec<Item<V>> {
    values.iter().map(|value| Choice::new(*value).into()).collect()
}

pub fn main_menu(
    source: PendingSource<DriveItem>,
    quota: Option<String>,
    theme: &PromptTheme,
) -> Result<LazySelectPrompt<DriveItem, MainAction>, ConfigurationError> {
    let mut config = LazySelectConfig::new("Your root folder/files: ", source)
        .suffix(quota)
        .theme(theme.clone());
    for (key, action) in MainAction::KEYED {
        config = config.action(key, action.to_string(), action);
    }
    LazySelectPrompt::new(config)
}

/// The main menu of a drive with nothing in it: the actions become the list.
pub fn empty_main_menu(
    theme: &PromptTheme,
) -> Result<SelectPrompt<MainAction>, ConfigurationError> {
    let actions: Vec<MainAction> = MainAction::KEYED.iter().map(|(_, action)| *action).collect();
    SelectPrompt::new(
        SelectConfig::new("Your drive is empty. Choose action: ", plain_choices(&actions))
            .suffix(None)
            .theme(theme.clone()),
    )
}

/// Heading of a folder screen; the item count is known only for cached listings.
pub fn folder_message(name: &str, count: Option<usize>) -> String {
    match count {
        Some(1) => format!("Choose action for folder {name}: "),
        _ => format!("Choose file or choose the action for folder {name}: "),
    }
}

pub fn folder_menu(
    message: String,
    source: PendingSource<DriveItem>,
    theme: &PromptTheme,
) -> Result<LazySelectPrompt<DriveItem, FolderAction>, ConfigurationError> {
    let mut config = LazySelectConfig::new(message, source)
        .action_message("Folder actions:")
        .theme(theme.clone());
    for (key, action) in FolderAction::KEYED {
        config = config.action(key, action.to_string(), action);
    }
    LazySelectPrompt::new(config)
}

pub fn empty_folder_menu(
    name: &str,
    theme: &PromptTheme,
) -> Result<SelectPrompt<FolderAction>, ConfigurationError> {
    let actions: Vec<FolderAction> =
        FolderAction::KEYED.iter().map(|(_, action)| *action).collect();
    SelectPrompt::new(
        SelectConfig::new(
            format!("The folder {name} is empty. Choose action: "),
            plain_choices(&actions),
        )
        .theme(theme.clone()),
    )
}

pub fn file_menu(
    name: &str,
    theme: &PromptTheme,
) -> Result<SelectPrompt<FileAction>, ConfigurationError> {
    let items: Vec<Item<FileAction>> = [
        FileAction::Rename,
        FileAction::Delete,
        FileAction::Download,
        FileAction::Move,
        FileAction::Information,
    ]
    .into_iter()
    .map(|action| Choice::new(action).with_description(action.description()).into())
    .collect();
    SelectPrompt::new(
        SelectConfig::new(format!("Choose file operation for {name}: "), items)
            .theme(theme.clone()),
    )
}

pub fn delete_question(
    theme: &PromptTheme,
) -> Result<SelectPrompt<DeleteMode>, ConfigurationError> {
    SelectPrompt::new(
        SelectConfig::new(
            "Do you want to permanently delete seleceted item or move it to trash",
            plain_choices(&[DeleteMode::Trash, DeleteMode::Forever]),
        )
        .theme(theme.clone()),
    )
}

/// Free-text name for a new or renamed item.
pub fn name_input(message: &str, theme: &PromptTheme) -> TextInputPrompt {
    TextInputPrompt::new(
        TextInputConfig::new(message)
            .validate(validator(|name: &String| {
                if name.trim().is_empty() {
                    Err("The name cannot be empty")
                } else if name.contains('/') {
                    Err("The name cannot contain '/'")
                } else {
                    Ok(())
                }
            }))
            .theme(theme.clone()),
    )
}

/// Local folder to download into, defaulting to the working directory.
pub fn destination_input(message: &str, cwd: &Path, theme: &PromptTheme) -> PathInputPrompt {
    PathInputPrompt::new(
        PathInputConfig::new(message)
            .default_value(cwd.display().to_string())
            .validate(validator(|path: &String| {
                Path::new(path).is_dir().then_some(()).ok_or(INVALID_DESTINATION)
            }))
            .theme(theme.clone()),
    )
}

/// Local file or folder to upload.
pub fn upload_source_input(cwd: &Path, theme: &PromptTheme) -> PathInputPrompt {
    PathInputPrompt::new(
        PathInputConfig::new("Provide a path to upload: ")
            .default_value(cwd.display().to_string())
            .validate(validator(|path: &String| {
                Path::new(path).exists().then_some(()).ok_or(INVALID_UPLOAD_PATH)
            }))
            .theme(theme.clone()),
    )
}

pub fn confirm(message: &str, theme: &PromptTheme) -> ConfirmPrompt {
    ConfirmPrompt::new(message).theme(theme.clone())
}

/// Pick at least one of `items`.
pub fn item_picker(
    message: &str,
    items: &[DriveItem],
    theme: &PromptTheme,
) -> Result<CheckboxPrompt<DriveItem>, ConfigurationError> {
    CheckboxPrompt::new(
        CheckboxConfig::new(message, item_choices(theme, items))
            .validate(validator(|selected: &Vec<DriveItem>| {
                if selected.is_empty() {
                    Err(NO_ITEMS_SELECTED)
                } else {
                    Ok(())
                }
            }))
            .theme(theme.clone()),
    )
}

pub fn item_operation(
    theme: &PromptTheme,
) -> Result<SelectPrompt<ItemOperation>, ConfigurationError> {
    SelectPrompt::new(
        SelectConfig::new(
            "Choose folder/file operation: ",
            plain_choices(&[
                ItemOperation::Delete,
                ItemOperation::Trash,
                ItemOperation::Download,
                ItemOperation::Move,
            ]),
        )
        .theme(theme.clone()),
    )
}

pub fn trash_action(theme: &PromptTheme) -> Result<SelectPrompt<TrashAction>, ConfigurationError> {
    SelectPrompt::new(
        SelectConfig::new(
            "Choose action for trash: ",
            plain_choices(&[TrashAction::Recover, TrashAction::Delete]),
        )
        .theme(theme.clone()),
    )
}

/// Destination folder for a move, the drive root first.
pub fn move_target(
    targets: Vec<FolderTarget>,
    theme: &PromptTheme,
) -> Result<SelectPrompt<FolderTarget>, ConfigurationError> {
    let items: Vec<Item<FolderTarget>> =
        targets.into_iter().map(|target| Choice::new(target).into()).collect();
    SelectPrompt::new(
        SelectConfig::new("Select the destination folder: ", items).theme(theme.clone()),
    )
}
