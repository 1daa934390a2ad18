//! Prompt keybindings.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::core::input::matches_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptAction {
    SelectUp,
    SelectDown,
    Confirm,
    Cancel,
    Abort,
    Toggle,
    ToggleAll,
    InvertAll,
    Complete,
    CompleteBackward,
    CursorLeft,
    CursorRight,
    CursorLineStart,
    CursorLineEnd,
    DeleteCharBackward,
    DeleteCharForward,
    DeleteWordBackward,
    DeleteToLineStart,
    Yes,
    No,
}

pub type KeyId = String;

#[derive(Debug, Clone)]
pub enum KeyBinding {
    Single(KeyId),
    Multiple(Vec<KeyId>),
}

impl From<&str> for KeyBinding {
    fn from(value: &str) -> Self {
        KeyBinding::Single(value.to_string())
    }
}

impl From<String> for KeyBinding {
    fn from(value: String) -> Self {
        KeyBinding::Single(value)
    }
}

impl From<Vec<&str>> for KeyBinding {
    fn from(value: Vec<&str>) -> Self {
        KeyBinding::Multiple(value.into_iter().map(|item| item.to_string()).collect())
    }
}

impl From<Vec<String>> for KeyBinding {
    fn from(value: Vec<String>) -> Self {
        KeyBinding::Multiple(value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptKeybindingsConfig {
    entries: HashMap<PromptAction, KeyBinding>,
}

impl PromptKeybindingsConfig {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn set<K: Into<KeyBinding>>(&mut self, action: PromptAction, keys: K) {
        self.entries.insert(action, keys.into());
    }
}

pub static DEFAULT_PROMPT_KEYBINDINGS: LazyLock<HashMap<PromptAction, Vec<KeyId>>> =
    LazyLock::new(|| {
        use PromptAction::*;

        let mut map = HashMap::new();
        map.insert(SelectUp, vec!["up".to_string(), "shift+tab".to_string()]);
        map.insert(SelectDown, vec!["down".to_string(), "tab".to_string()]);
        map.insert(Confirm, vec!["enter".to_string()]);
        map.insert(Cancel, vec!["escape".to_string()]);
        map.insert(Abort, vec!["ctrl+c".to_string()]);
        map.insert(Toggle, vec!["space".to_string()]);
        map.insert(ToggleAll, vec!["a".to_string()]);
        map.insert(InvertAll, vec!["i".to_string()]);
        map.insert(Complete, vec!["tab".to_string()]);
        map.insert(CompleteBackward, vec!["shift+tab".to_string()]);
        map.insert(CursorLeft, vec!["left".to_string(), "ctrl+b".to_string()]);
        map.insert(CursorRight, vec!["right".to_string(), "ctrl+f".to_string()]);
        map.insert(CursorLineStart, vec!["home".to_string(), "ctrl+a".to_string()]);
        map.insert(CursorLineEnd, vec!["end".to_string(), "ctrl+e".to_string()]);
        map.insert(DeleteCharBackward, vec!["backspace".to_string()]);
        map.insert(DeleteCharForward, vec!["delete".to_string(), "ctrl+d".to_string()]);
        map.insert(
            DeleteWordBackward,
            vec!["ctrl+w".to_string(), "alt+backspace".to_string()],
        );
        map.insert(DeleteToLineStart, vec!["ctrl+u".to_string()]);
        map.insert(Yes, vec!["y".to_string(), "Y".to_string()]);
        map.insert(No, vec!["n".to_string(), "N".to_string()]);

        map
    });

#[derive(Debug, Clone)]
pub struct PromptKeybindingsManager {
    action_to_keys: HashMap<PromptAction, Vec<KeyId>>,
}

impl Default for PromptKeybindingsManager {
    fn default() -> Self {
        Self::new(PromptKeybindingsConfig::default())
    }
}

impl PromptKeybindingsManager {
    pub fn new(config: PromptKeybindingsConfig) -> Self {
        let mut manager = Self {
            action_to_keys: HashMap::new(),
        };
        manager.build_maps(&config);
        manager
    }

    fn build_maps(&mut self, config: &PromptKeybindingsConfig) {
        self.action_to_keys.clear();

        for (action, keys) in DEFAULT_PROMPT_KEYBINDINGS.iter() {
            self.action_to_keys.insert(*action, keys.clone());
        }

        for (action, binding) in config.entries.iter() {
            let key_list = match binding {
                KeyBinding::Single(key) => vec![key.clone()],
                KeyBinding::Multiple(keys) => keys.clone(),
            };
            self.action_to_keys.insert(*action, key_list);
        }
    }

    pub fn matches(&self, data: &str, action: PromptAction) -> bool {
        let Some(keys) = self.action_to_keys.get(&action) else {
            return false;
        };
        keys.iter().any(|key| matches_key(data, key))
    }

    pub fn get_keys(&self, action: PromptAction) -> Vec<KeyId> {
        self.action_to_keys.get(&action).cloned().unwrap_or_default()
    }

    pub fn set_config(&mut self, config: PromptKeybindingsConfig) {
        self.build_maps(&config);
    }
}
