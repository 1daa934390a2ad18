//! Cursor state shared by every list prompt.

use crate::core::error::ConfigurationError;
use crate::core::item::{Choice, Disabled, Item};
use crate::render::{paginate, PageWindow};
use crate::widgets::theme::PromptTheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn offset(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

/// Items plus a cursor that always addresses a selectable item.
#[derive(Debug, Clone)]
pub struct ListState<V> {
    items: Vec<Item<V>>,
    active: usize,
    first: usize,
    last: usize,
    looping: bool,
}

impl<V> ListState<V> {
    pub fn new(
        prompt: &'static str,
        items: Vec<Item<V>>,
        looping: bool,
    ) -> Result<Self, ConfigurationError> {
        let first = items.iter().position(Item::is_selectable);
        let last = items.iter().rposition(Item::is_selectable);
        let (Some(first), Some(last)) = (first, last) else {
            return Err(ConfigurationError::NoSelectableChoices { prompt });
        };
        Ok(Self {
            items,
            active: first,
            first,
            last,
            looping,
        })
    }

    pub fn items(&self) -> &[Item<V>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_choice(&self) -> Option<&Choice<V>> {
        self.items.get(self.active).and_then(Item::as_choice)
    }

    pub fn is_selectable(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(Item::is_selectable)
    }

    /// First selectable index strictly after (or before) `from`, wrapping around the list.
    pub fn next_selectable(&self, from: usize, direction: Direction) -> usize {
        let len = self.items.len() as isize;
        let mut index = from as isize;
        loop {
            index = (index + direction.offset()).rem_euclid(len);
            if self.items[index as usize].is_selectable() || index as usize == from {
                return index as usize;
            }
        }
    }

    /// Move the cursor one selectable item. Without looping the move stops at the bounds.
    pub fn move_active(&mut self, direction: Direction) {
        let can_move = self.looping
            || match direction {
                Direction::Up => self.first < self.active,
                Direction::Down => self.last > self.active,
            };
        if can_move {
            self.active = self.next_selectable(self.active, direction);
        }
    }

    /// Put the cursor on `index` when that item is selectable.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if self.is_selectable(index) {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Put the cursor on the first selectable choice matching `predicate`.
    pub fn select_where(&mut self, predicate: impl Fn(&Choice<V>) -> bool) -> bool {
        let found = self.items.iter().position(|item| match item {
            Item::Choice(choice) => choice.is_selectable() && predicate(choice),
            Item::Separator(_) => false,
        });
        match found {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    pub fn window(&self, page_size: usize) -> PageWindow {
        paginate(self.items.len(), self.active, page_size, self.looping)
    }

    pub fn into_items(self) -> Vec<Item<V>> {
        self.items
    }
}

/// Draw the visible page. `choice_line` renders selectable choices as `(index, choice, active)`.
pub fn render_page<V>(
    list: &ListState<V>,
    page_size: usize,
    theme: &PromptTheme,
    width: usize,
    mut choice_line: impl FnMut(usize, &Choice<V>, bool) -> String,
) -> Vec<String>
where
    V: std::fmt::Display,
{
    let window = list.window(page_size);
    let mut lines = Vec::with_capacity(window.rows.len() + 1);
    for (row, &index) in window.rows.iter().enumerate() {
        let line = match &list.items()[index] {
            Item::Separator(separator) => match &separator.label {
                Some(label) => format!(" {}", (theme.separator)(label)),
                None => (theme.separator)(&"─".repeat(width.max(1))),
            },
            Item::Choice(choice) => match &choice.disabled {
                Disabled::Enabled => choice_line(index, choice, row == window.active_row),
                Disabled::Disabled => {
                    format!("  {}", (theme.disabled)(&format!("- {} (disabled)", choice.label())))
                }
                Disabled::Reason(reason) => {
                    format!("  {}", (theme.disabled)(&format!("- {} {reason}", choice.label())))
                }
            },
        };
        lines.push(line);
    }
    if window.is_partial(list.len()) {
        lines.push((theme.help)("(Use arrow keys to reveal more choices)"));
    }
    lines
}
