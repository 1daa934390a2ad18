//! Item model shared by every list prompt.

/// Non-selectable visual divider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Separator {
    pub label: Option<String>,
}

impl Separator {
    /// Full-width horizontal rule.
    pub fn line() -> Self {
        Self { label: None }
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

/// Disabled flag of a choice. A reason is shown in place of the generic marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Disabled {
    #[default]
    Enabled,
    Disabled,
    Reason(String),
}

impl Disabled {
    pub fn is_disabled(&self) -> bool {
        !matches!(self, Disabled::Enabled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice<V> {
    pub value: V,
    pub name: Option<String>,
    pub description: Option<String>,
    pub disabled: Disabled,
    /// Initial state for multi-choice prompts; ignored elsewhere.
    pub checked: bool,
}

impl<V> Choice<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            name: None,
            description: None,
            disabled: Disabled::Enabled,
            checked: false,
        }
    }

    pub fn named(value: V, name: impl Into<String>) -> Self {
        Self::new(value).with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = Disabled::Disabled;
        self
    }

    pub fn disabled_because(mut self, reason: impl Into<String>) -> Self {
        self.disabled = Disabled::Reason(reason.into());
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn is_selectable(&self) -> bool {
        !self.disabled.is_disabled()
    }
}

impl<V: std::fmt::Display> Choice<V> {
    /// Display text: the explicit name, or the value's string form.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item<V> {
    Separator(Separator),
    Choice(Choice<V>),
}

impl<V> Item<V> {
    pub fn is_selectable(&self) -> bool {
        match self {
            Item::Separator(_) => false,
            Item::Choice(choice) => choice.is_selectable(),
        }
    }

    pub fn as_choice(&self) -> Option<&Choice<V>> {
        match self {
            Item::Choice(choice) => Some(choice),
            Item::Separator(_) => None,
        }
    }
}

impl<V> From<Choice<V>> for Item<V> {
    fn from(choice: Choice<V>) -> Self {
        Item::Choice(choice)
    }
}

impl<V> From<Separator> for Item<V> {
    fn from(separator: Separator) -> Self {
        Item::Separator(separator)
    }
}

/// A choice resolvable by pressing `key` regardless of cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedChoice<V> {
    pub key: String,
    pub choice: Choice<V>,
}

impl<V> KeyedChoice<V> {
    pub fn new(key: impl Into<String>, name: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            choice: Choice::named(value, name),
        }
    }
}
