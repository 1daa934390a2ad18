mod support;

use std::fs;
use std::path::MAIN_SEPARATOR;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use prompt_tui::core::text::ansi::strip_ansi;
use prompt_tui::{
    validator, Answer, CheckboxConfig, CheckboxPrompt, Choice, ConfigurationError, Deferred, Item,
    LazySelectConfig, LazySelectPrompt, PathInputConfig, PathInputPrompt, PendingSource, Picked,
    PromptError, PromptRuntime, PromptTheme, SelectConfig, SelectPrompt, Separator, Terminal,
};

use support::{
    input, pause_ms, prompt_lock, run, ScriptedTerminal, Step, CTRL_C, DOWN, ENTER, ESC, SPACE, TAB,
};

fn folders() -> Vec<Item<&'static str>> {
    vec![
        Choice::new("alpha").into(),
        Separator::labeled("more").into(),
        Choice::new("beta").into(),
        Choice::new("gamma").disabled().into(),
        Choice::new("delta").into(),
    ]
}

fn select(items: Vec<Item<&'static str>>) -> SelectPrompt<&'static str> {
    SelectPrompt::new(SelectConfig::new("Pick a folder", items).theme(PromptTheme::plain()))
        .expect("valid select")
}

fn runtime_with(steps: Vec<Step>) -> (PromptRuntime<ScriptedTerminal>, ScriptedTerminal) {
    let terminal = ScriptedTerminal::new(60, 20);
    terminal.script(steps);
    (PromptRuntime::new(terminal.clone()), terminal)
}

#[test]
fn select_submits_the_active_choice_and_leaves_a_summary() {
    let _lock = prompt_lock();
    let (mut runtime, terminal) = runtime_with(vec![input(DOWN), input(DOWN), input(ENTER)]);

    let answer = runtime.run(select(folders())).expect("select runs");

    assert_eq!(answer, Answer::Submitted("delta"));
    assert_eq!(terminal.starts(), 1);
    assert_eq!(terminal.stops(), 1);
    let writes = strip_ansi(&terminal.writes());
    assert!(writes.contains("? Pick a folder"));
    assert!(writes.contains("✔ Pick a folder delta"));
}

#[test]
fn escape_cancels_and_erases_the_frame() {
    let _lock = prompt_lock();
    let (mut runtime, terminal) = runtime_with(vec![input(DOWN), input(ESC)]);

    let answer = runtime.run(select(folders())).expect("select runs");

    assert!(answer.is_cancelled());
    assert!(!strip_ansi(&terminal.writes()).contains("✔"));
    assert_eq!(terminal.stops(), 1);
}

#[test]
fn ctrl_c_aborts() {
    let _lock = prompt_lock();
    let (mut runtime, terminal) = runtime_with(vec![input(CTRL_C)]);

    let result = runtime.run(select(folders()));

    assert_matches!(result, Err(PromptError::Aborted));
    assert_eq!(terminal.stops(), 1);
}

#[test]
fn keyed_action_resolves_without_moving_the_cursor() {
    let _lock = prompt_lock();
    let (mut runtime, _terminal) = runtime_with(vec![input("n")]);
    let prompt = SelectPrompt::new(
        SelectConfig::new("Main menu", folders())
            .action("n", "Create new empty folder", "new")
            .action("x", "Exit", "exit")
            .theme(PromptTheme::plain()),
    )
    .expect("valid select");

    assert_eq!(runtime.run(prompt).expect("select runs"), Answer::Submitted("new"));
}

#[test]
fn resize_rerenders_and_input_still_works() {
    let _lock = prompt_lock();
    let (mut runtime, terminal) =
        runtime_with(vec![Step::Resize(30, 10), pause_ms(10), input(ENTER)]);

    let answer = runtime.run(select(folders())).expect("select runs");

    assert_eq!(answer, Answer::Submitted("alpha"));
    assert_eq!(runtime.terminal().columns(), 30);
    assert!(terminal.writes().matches("Pick a folder").count() >= 2);
}

#[test]
fn all_disabled_is_a_configuration_error() {
    let items: Vec<Item<&str>> = vec![Choice::new("a").disabled().into(), Separator::line().into()];
    let err = SelectPrompt::new(SelectConfig::new("Pick", items)).err();
    assert_eq!(err, Some(ConfigurationError::NoSelectableChoices { prompt: "select" }));
}

#[test]
fn checkbox_requires_a_selection_before_submitting() {
    let _lock = prompt_lock();
    let (mut runtime, terminal) = runtime_with(vec![
        input(ENTER),
        input(SPACE),
        input(DOWN),
        input(DOWN),
        input(SPACE),
        input(ENTER),
    ]);
    let prompt = CheckboxPrompt::new(
        CheckboxConfig::new("Select items", folders())
            .required(true)
            .theme(PromptTheme::plain()),
    )
    .expect("valid checkbox");

    let answer = runtime.run(prompt).expect("checkbox runs");

    assert_eq!(answer, Answer::Submitted(vec!["alpha", "delta"]));
    let writes = strip_ansi(&terminal.writes());
    assert!(writes.contains("At least one choice must be selected"));
    assert!(writes.contains("✔ Select items alpha, delta"));
}

#[test]
fn checkbox_validator_rejects_then_accepts() {
    let _lock = prompt_lock();
    let (mut runtime, terminal) =
        runtime_with(vec![input(ENTER), pause_ms(20), input("a"), input(ENTER)]);
    let prompt = CheckboxPrompt::new(
        CheckboxConfig::new("Select items", folders())
            .validate(validator(|values: &Vec<&'static str>| {
                if values.is_empty() {
                    Err("No items selected, make sure you have selected items in order to proceed.")
                } else {
                    Ok(())
                }
            }))
            .theme(PromptTheme::plain()),
    )
    .expect("valid checkbox");

    let answer = runtime.run(prompt).expect("checkbox runs");

    assert_eq!(answer, Answer::Submitted(vec!["alpha", "beta", "delta"]));
    assert!(strip_ansi(&terminal.writes()).contains("No items selected"));
}

#[test]
fn checkbox_ignores_keys_while_validation_is_pending() {
    let _lock = prompt_lock();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let (mut runtime, _terminal) = runtime_with(vec![
        input(SPACE),
        input(ENTER),
        input(DOWN),
        input(SPACE),
        pause_ms(300),
        input(ENTER),
    ]);
    let prompt = CheckboxPrompt::new(
        CheckboxConfig::new("Select items", folders())
            .validate(validator(move |_: &Vec<&'static str>| {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    std::thread::sleep(Duration::from_millis(150));
                    return false;
                }
                true
            }))
            .theme(PromptTheme::plain()),
    )
    .expect("valid checkbox");

    let answer = runtime.run(prompt).expect("checkbox runs");

    // DOWN and SPACE arrived while loading: the cursor stayed on alpha and beta stayed unchecked.
    assert_eq!(answer, Answer::Submitted(vec!["alpha"]));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn checkbox_can_be_cancelled_while_validation_is_pending() {
    let _lock = prompt_lock();
    let (mut runtime, terminal) = runtime_with(vec![
        input(SPACE),
        input(ENTER),
        input(DOWN),
        input(SPACE),
        input(ESC),
    ]);
    let prompt = CheckboxPrompt::new(
        CheckboxConfig::new("Select items", folders())
            .validate(validator(|_: &Vec<&'static str>| {
                std::thread::sleep(Duration::from_millis(300));
                true
            }))
            .theme(PromptTheme::plain()),
    )
    .expect("valid checkbox");

    let started = Instant::now();
    let answer = runtime.run(prompt).expect("checkbox runs");
    let elapsed = started.elapsed();

    assert!(answer.is_cancelled());
    assert!(elapsed < Duration::from_millis(250), "cancel waited for the validator: {elapsed:?}");
    assert_eq!(terminal.stops(), 1);
    let writes = strip_ansi(&terminal.writes());
    assert!(writes.contains("◉ alpha"));
    assert!(!writes.contains("◉ beta"));
}

#[test]
fn checkbox_survives_a_panicking_validator() {
    let _lock = prompt_lock();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let (mut runtime, terminal) =
        runtime_with(vec![input(SPACE), input(ENTER), pause_ms(50), input(ENTER)]);
    let prompt = CheckboxPrompt::new(
        CheckboxConfig::new("Select items", folders())
            .validate(validator(move |_: &Vec<&'static str>| {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("validator bug");
                }
                true
            }))
            .theme(PromptTheme::plain()),
    )
    .expect("valid checkbox");

    let answer = runtime.run(prompt).expect("checkbox runs");

    assert_eq!(answer, Answer::Submitted(vec!["alpha"]));
    assert!(strip_ansi(&terminal.writes()).contains("You must select a valid value"));
}

#[test]
fn path_input_completes_from_the_filesystem() {
    let _lock = prompt_lock();
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("report.pdf"), "pdf").expect("write");
    fs::create_dir(dir.path().join("photos")).expect("mkdir");
    let typed = format!("{}{MAIN_SEPARATOR}re", dir.path().display());

    let (mut runtime, _terminal) =
        runtime_with(vec![input(&typed), input(TAB), input(ENTER), input(ENTER)]);
    let prompt =
        PathInputPrompt::new(PathInputConfig::new("Path to upload").theme(PromptTheme::plain()));

    let answer = runtime.run(prompt).expect("path input runs");

    let expected = format!("{}{MAIN_SEPARATOR}report.pdf", dir.path().display());
    assert_eq!(answer, Answer::Submitted(expected));
}

#[test]
fn path_input_keeps_the_buffer_after_failed_validation() {
    let _lock = prompt_lock();
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = format!("{}{MAIN_SEPARATOR}missing", dir.path().display());
    let present = dir.path().display().to_string();

    let (mut runtime, terminal) = runtime_with(vec![
        input(&missing),
        input(ENTER),
        pause_ms(20),
        input("\x15"),
        input(&present),
        input(ENTER),
    ]);
    let prompt = PathInputPrompt::new(
        PathInputConfig::new("Path to upload")
            .validate(validator(|path: &String| std::path::Path::new(path).exists()))
            .theme(PromptTheme::plain()),
    );

    let answer = runtime.run(prompt).expect("path input runs");

    assert_eq!(answer, Answer::Submitted(present));
    assert!(strip_ansi(&terminal.writes()).contains("> You must provide a valid value"));
}

#[test]
fn lazy_select_shows_a_spinner_until_items_arrive() {
    let _lock = prompt_lock();
    let (items, resolver) = Deferred::channel();
    let (mut runtime, terminal) = runtime_with(vec![
        pause_ms(120),
        run(move || {
            let _ = resolver.resolve(Ok(folders()));
        }),
        pause_ms(50),
        input(DOWN),
        input(ENTER),
    ]);
    let prompt: LazySelectPrompt<&str, &str> = LazySelectPrompt::new(
        LazySelectConfig::new("Loading folder", PendingSource::deferred(items))
            .action("u", "Upload", "upload")
            .theme(PromptTheme::plain()),
    )
    .expect("valid lazy select");

    let answer = runtime.run(prompt).expect("lazy select runs");

    assert_eq!(answer, Answer::Submitted(Picked::Item("beta")));
    let writes = strip_ansi(&terminal.writes());
    assert!(writes.contains("⠋ Loading folder"));
    assert!(writes.contains("beta"));
}

#[test]
fn lazy_select_can_be_cancelled_while_loading() {
    let _lock = prompt_lock();
    let (items, resolver) = Deferred::<prompt_tui::LoadResult<&str>>::channel();
    let (mut runtime, terminal) = runtime_with(vec![
        pause_ms(30),
        input(DOWN),
        input(ENTER),
        input("u"),
        pause_ms(200),
        input(ESC),
    ]);
    let prompt: LazySelectPrompt<&str, &str> = LazySelectPrompt::new(
        LazySelectConfig::new("Loading folder", PendingSource::deferred(items))
            .action("u", "Upload", "upload")
            .theme(PromptTheme::plain()),
    )
    .expect("valid lazy select");

    let answer = runtime.run(prompt).expect("lazy select runs");

    // Navigation, submit and the bound action are all ignored until the items arrive.
    assert_eq!(answer, Answer::Cancelled);
    assert_eq!(terminal.stops(), 1);
    let writes = strip_ansi(&terminal.writes());
    assert!(writes.matches("Loading folder").count() > 1);
    assert!(writes.contains("⠙ Loading folder"));
    drop(resolver);
}

#[test]
fn lazy_select_surfaces_load_failures() {
    let _lock = prompt_lock();
    let (mut runtime, _terminal) = runtime_with(Vec::new());
    let source = PendingSource::spawn(|| -> Result<Vec<Item<&'static str>>, String> {
        std::thread::sleep(Duration::from_millis(20));
        Err("listing failed".to_string())
    });
    let prompt: LazySelectPrompt<&str, &str> =
        LazySelectPrompt::new(LazySelectConfig::new("Loading folder", source))
            .expect("valid lazy select");

    let result = runtime.run(prompt);

    assert_matches!(result, Err(PromptError::Load(message)) if message == "listing failed");
}

#[test]
fn a_second_prompt_is_rejected_while_one_is_active() {
    let _lock = prompt_lock();
    let (tx, rx) = mpsc::channel();
    let (mut runtime, _terminal) = runtime_with(vec![
        run(move || {
            let mut nested = PromptRuntime::new(ScriptedTerminal::new(40, 10));
            let _ = tx.send(nested.run(select(folders())).map(|_| ()));
        }),
        input(ENTER),
    ]);

    let answer = runtime.run(select(folders())).expect("outer prompt runs");

    assert_eq!(answer, Answer::Submitted("alpha"));
    let nested = rx.recv_timeout(Duration::from_secs(1)).expect("nested result");
    assert_matches!(nested, Err(PromptError::AlreadyActive));
}
