mod support;

use std::fs;
use std::sync::Arc;

use drive_cli::ActionError;
use drive_service::{DriveService, ROOT_FOLDER_ID};
use drive_service_mock::MockDrive;
use pretty_assertions::assert_eq;
use prompt_tui::PromptError;

use support::{app_with, prompt_lock, PromptScriptTerminal, CTRL_C, DOWN, ENTER, ESC, SPACE};

fn names(drive: &MockDrive, folder_id: &str) -> Vec<String> {
    drive
        .list_items(folder_id)
        .expect("listing")
        .into_iter()
        .map(|item| item.name)
        .collect()
}

#[test]
fn main_menu_lists_root_items_with_quota_and_exits() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[&["x"]]);

    app_with(&drive, &terminal, cwd.path()).run().expect("session");

    let writes = terminal.writes();
    assert!(writes.contains("Your root folder/files:"));
    assert!(writes.contains("Documents (folder)"));
    assert!(writes.contains("notes.txt"));
    assert!(writes.contains("of 15.00 GB"));
    assert!(writes.contains("Manage Trash [t]"));
    assert_eq!(terminal.starts(), 1);
}

#[test]
fn escape_on_the_main_menu_ends_the_session() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[&[ESC]]);

    app_with(&drive, &terminal, cwd.path()).run().expect("session");
    assert_eq!(terminal.starts(), 1);
}

#[test]
fn ctrl_c_aborts_the_session() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[&[CTRL_C]]);

    let err = app_with(&drive, &terminal, cwd.path()).run().expect_err("aborted");
    assert!(matches!(err, ActionError::Prompt(PromptError::Aborted)));
    assert!(!terminal.aborted_stuck_prompt());
}

#[test]
fn new_folder_appears_at_the_top_of_the_cached_listing() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[&["n"], &["Reports", ENTER], &["x"]]);
    let mut app = app_with(&drive, &terminal, cwd.path());

    app.run().expect("session");

    let created = drive.find(ROOT_FOLDER_ID, "Reports").expect("folder created");
    assert!(created.is_folder());
    let cached = app.cache().get(ROOT_FOLDER_ID).expect("root listing cached");
    assert_eq!(cached.items[0].name, "Reports");
    assert!(terminal.writes().contains("Enter new folder name:"));
    assert!(!terminal.aborted_stuck_prompt());
}

#[test]
fn leaving_a_folder_remembers_the_cursor_position() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[&[DOWN, ENTER], &[ESC], &["x"]]);
    let mut app = app_with(&drive, &terminal, cwd.path());

    app.run().expect("session");

    assert_eq!(app.cache().get(ROOT_FOLDER_ID).expect("root").history_id, 1);
    let photos = drive.find(ROOT_FOLDER_ID, "Photos").expect("photos");
    assert!(app.cache().contains(&photos.id));
    let writes = terminal.writes();
    assert!(writes.contains("Choose file or choose the action for folder Photos:"));
    assert!(writes.contains("Folder actions:"));
    assert!(writes.contains("Download folder [z]"));
}

#[test]
fn renaming_a_file_keeps_its_extension() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[
        &[DOWN, ENTER],
        &[ENTER],
        &[ENTER],
        &["holiday", ENTER],
        &[ESC],
        &["x"],
    ]);
    let mut app = app_with(&drive, &terminal, cwd.path());

    app.run().expect("session");

    let photos = drive.find(ROOT_FOLDER_ID, "Photos").expect("photos");
    assert_eq!(names(&drive, &photos.id), vec!["holiday.jpg", "sunset.png"]);
    let cached = app.cache().get(&photos.id).expect("photos cached");
    assert_eq!(cached.items[0].name, "holiday.jpg");
    assert!(terminal.writes().contains("Choose file operation for beach.jpg:"));
}

#[test]
fn failed_action_shows_a_notice_and_returns_to_the_file_screen() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let notes = drive.find(ROOT_FOLDER_ID, "notes.txt").expect("notes");
    drive.fail_item(notes.id.clone());
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[
        &[DOWN, DOWN, ENTER],
        &[DOWN, ENTER],
        &[DOWN, ENTER],
        &[ESC],
        &["x"],
    ]);

    app_with(&drive, &terminal, cwd.path()).run().expect("session");

    let writes = terminal.writes();
    assert!(
        writes.contains("Do you want to permanently delete seleceted item or move it to trash")
    );
    assert!(writes.contains(&format!("simulated failure for '{}'", notes.id)));
    assert_eq!(terminal.starts(), 5);
    assert!(!terminal.aborted_stuck_prompt());
}

#[test]
fn moving_a_file_into_another_folder() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    // Targets exclude the root the file is in: Archive, Documents, Photos.
    let terminal = PromptScriptTerminal::new(&[
        &[DOWN, DOWN, ENTER],
        &[DOWN, DOWN, DOWN, ENTER],
        &[DOWN, DOWN, ENTER],
        &["x"],
    ]);
    let mut app = app_with(&drive, &terminal, cwd.path());

    app.run().expect("session");

    let photos = drive.find(ROOT_FOLDER_ID, "Photos").expect("photos");
    assert!(drive.find(&photos.id, "notes.txt").is_some());
    let root = app.cache().get(ROOT_FOLDER_ID).expect("root cached");
    assert!(root.items.iter().all(|item| item.name != "notes.txt"));
    assert!(terminal.writes().contains("Select the destination folder:"));
}

#[test]
fn file_information_then_go_back() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[
        &[DOWN, DOWN, ENTER],
        &[DOWN, DOWN, DOWN, DOWN, ENTER],
        &[ENTER],
        &[ESC],
        &["x"],
    ]);

    app_with(&drive, &terminal, cwd.path()).run().expect("session");

    let writes = terminal.writes();
    assert!(writes.contains("Name: notes.txt"));
    assert!(writes.contains("Size: 18bytes"));
    assert!(writes.contains("MimeType: text/plain"));
    assert!(writes.contains("Created time: Jan 1, 2026, 09:30:00 AM"));
    assert!(writes.contains("Go back?"));
    assert_eq!(terminal.starts(), 5);
}

#[test]
fn empty_trash_is_reported() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[&["t"], &["x"]]);

    app_with(&drive, &terminal, cwd.path()).run().expect("session");

    assert!(terminal.writes().contains("Trash is empty!"));
    assert_eq!(terminal.starts(), 2);
}

#[test]
fn recovering_from_trash_flushes_the_cache() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let notes = drive.find(ROOT_FOLDER_ID, "notes.txt").expect("notes");
    drive.move_to_trash(&notes.id).expect("trash");
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[&["t"], &[SPACE, ENTER], &[ENTER], &["x"]]);
    let mut app = app_with(&drive, &terminal, cwd.path());

    app.run().expect("session");

    assert!(drive.list_trash().expect("trash").is_empty());
    assert_eq!(names(&drive, ROOT_FOLDER_ID), vec!["Documents", "Photos", "notes.txt"]);
    let writes = terminal.writes();
    assert!(writes.contains("Choose action for trash:"));
    assert!(writes.contains("Recovery finished"));
    // The main menu after recovery fetched a fresh listing.
    let root = app.cache().get(ROOT_FOLDER_ID).expect("root cached");
    assert_eq!(root.items.len(), 3);
}

#[test]
fn checkbox_requires_a_selection() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let notes = drive.find(ROOT_FOLDER_ID, "notes.txt").expect("notes");
    drive.move_to_trash(&notes.id).expect("trash");
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal =
        PromptScriptTerminal::new(&[&["t"], &[ENTER, SPACE, ENTER], &[DOWN, ENTER], &["x"]]);

    app_with(&drive, &terminal, cwd.path()).run().expect("session");

    let writes = terminal.writes();
    assert!(writes
        .contains("No items selected, make sure you have selected items in order to proceed."));
    assert!(writes.contains("Trash emptied"));
    assert!(drive.list_trash().expect("trash").is_empty());
    assert!(drive.find(ROOT_FOLDER_ID, "notes.txt").is_none());
}

#[test]
fn operate_with_items_deletes_the_selection() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let documents = drive.find(ROOT_FOLDER_ID, "Documents").expect("documents");
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[
        &[ENTER],
        &["o"],
        &[DOWN, SPACE, DOWN, SPACE, ENTER],
        &[ENTER],
        &[ENTER],
        &[ESC],
        &["x"],
    ]);

    app_with(&drive, &terminal, cwd.path()).run().expect("session");

    assert_eq!(names(&drive, &documents.id), vec!["Archive"]);
    let writes = terminal.writes();
    assert!(writes.contains("Choose folder/file operation:"));
    assert!(writes.contains("Confirm deletion of items?"));
    assert!(writes.contains("Delete finished"));
    assert!(writes.contains("Choose action for folder Documents:"));
    assert!(!terminal.aborted_stuck_prompt());
}

#[test]
fn empty_folder_offers_its_actions_as_the_list() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    drive.create_folder("Empty", ROOT_FOLDER_ID).expect("folder");
    let cwd = tempfile::tempdir().expect("tempdir");
    // Listing: Documents, Empty, Photos, notes.txt. The lazy prompt for Empty ends on load.
    let terminal = PromptScriptTerminal::new(&[&[DOWN, ENTER], &[], &[ESC], &["x"]]);

    app_with(&drive, &terminal, cwd.path()).run().expect("session");

    let writes = terminal.writes();
    assert!(writes.contains("The folder Empty is empty. Choose action:"));
    assert!(writes.contains("Create new empty folder"));
    assert_eq!(terminal.starts(), 4);
}

#[test]
fn folder_download_writes_the_tree_into_the_chosen_directory() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    let terminal = PromptScriptTerminal::new(&[&[ENTER], &["z"], &[ENTER], &[ESC], &["x"]]);

    app_with(&drive, &terminal, cwd.path()).run().expect("session");

    let nested = cwd.path().join("Documents").join("Archive").join("2025.txt");
    assert_eq!(fs::read_to_string(nested).expect("downloaded"), "old notes");
    assert!(terminal.writes().contains("Downloaded to"));
}

#[test]
fn uploading_a_local_folder_refreshes_the_listing() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    let local = cwd.path().join("trip");
    fs::create_dir(&local).expect("mkdir");
    fs::write(local.join("plan.md"), "plan").expect("write");
    let local_text = local.display().to_string();
    let terminal = PromptScriptTerminal::new(&[&["u"], &[local_text.as_str(), ENTER], &["x"]]);
    let mut app = app_with(&drive, &terminal, cwd.path());

    app.run().expect("session");

    let trip = drive.find(ROOT_FOLDER_ID, "trip").expect("uploaded folder");
    assert_eq!(names(&drive, &trip.id), vec!["plan.md"]);
    let root = app.cache().get(ROOT_FOLDER_ID).expect("root refetched");
    assert!(root.items.iter().any(|item| item.name == "trip"));
    assert!(terminal.writes().contains("Uploading finished"));
}

#[test]
fn unknown_upload_path_keeps_the_prompt_open() {
    let _lock = prompt_lock();
    let drive = Arc::new(MockDrive::seeded());
    let cwd = tempfile::tempdir().expect("tempdir");
    let missing = cwd.path().join("missing").display().to_string();
    let terminal = PromptScriptTerminal::new(&[&["u"], &[missing.as_str(), ENTER, ESC], &["x"]]);

    app_with(&drive, &terminal, cwd.path()).run().expect("session");

    let writes = terminal.writes();
    assert!(writes
        .contains("The path that you provided is incorrect. Make sure you are providing valid path."));
    assert_eq!(names(&drive, ROOT_FOLDER_ID), vec!["Documents", "Photos", "notes.txt"]);
}
