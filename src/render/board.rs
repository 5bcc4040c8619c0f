//! In-memory rendered surface served to the display

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{
    format::{digit_fragments, fragments_to_html, Fragment, PLACEHOLDER, ZERO_DURATION},
    target::RenderTarget,
};
use crate::state::{SyncStatus, TimerInstance};

pub const CARD_CLASS: &str = "timer-card";
pub const FINISHED_CLASS: &str = "finished";
pub const FADING_CLASS: &str = "fading";

#[derive(Debug, Clone)]
struct Card {
    id: String,
    label: String,
    text: String,
    classes: BTreeSet<String>,
    generation: u64,
}

#[derive(Debug)]
struct Board {
    status: SyncStatus,
    delay_seconds: u32,
    clock: String,
    refresh_seconds: i64,
    warning_visible: bool,
    cards: Vec<Card>,
    /// Bumped by every full rebuild
    generation: u64,
    /// Bumped by every visible change
    revision: u64,
}

impl Board {
    fn card_mut(&mut self, id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }
}

/// Card as exposed in a snapshot
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub id: String,
    pub label: String,
    pub text: String,
    pub digits: Vec<Fragment>,
    pub html: String,
    pub classes: Vec<String>,
    pub generation: u64,
}

/// Serializable copy of the whole surface
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub status: String,
    pub delay: String,
    pub clock: String,
    pub clock_html: String,
    pub refresh_countdown: String,
    pub warning_visible: bool,
    pub cards: Vec<CardView>,
    pub generation: u64,
    pub revision: u64,
}

/// Render target keeping the surface in memory.
///
/// Writes that would not change what is displayed are dropped, so the
/// revision only advances on real redraws.
#[derive(Debug, Clone)]
pub struct BoardRenderer {
    board: Arc<Mutex<Board>>,
}

impl BoardRenderer {
    pub fn new() -> Self {
        Self {
            board: Arc::new(Mutex::new(Board {
                status: SyncStatus::Syncing,
                delay_seconds: 0,
                clock: PLACEHOLDER.to_string(),
                refresh_seconds: 0,
                warning_visible: false,
                cards: Vec::new(),
                generation: 0,
                revision: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> Result<BoardSnapshot, String> {
        let board = self
            .board
            .lock()
            .map_err(|e| format!("Failed to lock board: {}", e))?;

        let cards = board
            .cards
            .iter()
            .map(|card| {
                let digits = digit_fragments(&card.text);
                CardView {
                    id: card.id.clone(),
                    label: card.label.clone(),
                    text: card.text.clone(),
                    html: fragments_to_html(&digits),
                    digits,
                    classes: card.classes.iter().cloned().collect(),
                    generation: card.generation,
                }
            })
            .collect();

        Ok(BoardSnapshot {
            status: board.status.to_string(),
            delay: format!("+{}s", board.delay_seconds),
            clock: board.clock.clone(),
            clock_html: fragments_to_html(&digit_fragments(&board.clock)),
            refresh_countdown: format!("{}S", board.refresh_seconds),
            warning_visible: board.warning_visible,
            cards,
            generation: board.generation,
            revision: board.revision,
        })
    }

    /// Apply `f`, bumping the revision if it reports a change
    fn edit<F>(&self, f: F)
    where
        F: FnOnce(&mut Board) -> bool,
    {
        match self.board.lock() {
            Ok(mut board) => {
                if f(&mut *board) {
                    board.revision += 1;
                }
            }
            Err(e) => warn!("Failed to lock board: {}", e),
        }
    }
}

impl Default for BoardRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn remove_card(board: &Mutex<Board>, id: &str, generation: u64) {
    if let Ok(mut board) = board.lock() {
        let before = board.cards.len();
        board.cards.retain(|c| !(c.id == id && c.generation == generation));
        if board.cards.len() != before {
            debug!("Removed card {}", id);
            board.revision += 1;
        }
    }
}

impl RenderTarget for BoardRenderer {
    fn replace_all(&self, instances: &[TimerInstance]) {
        self.edit(|board| {
            board.generation += 1;
            let generation = board.generation;
            board.cards = instances
                .iter()
                .map(|instance| {
                    let mut classes = BTreeSet::from([CARD_CLASS.to_string()]);
                    let text = if instance.is_finished() {
                        classes.insert(FINISHED_CLASS.to_string());
                        ZERO_DURATION
                    } else {
                        PLACEHOLDER
                    };
                    Card {
                        id: instance.id.clone(),
                        label: instance.label.clone(),
                        text: text.to_string(),
                        classes,
                        generation,
                    }
                })
                .collect();
            debug!("Rebuilt {} cards (generation {})", board.cards.len(), generation);
            true
        });
    }

    fn update_text(&self, id: &str, text: &str) {
        self.edit(|board| match board.card_mut(id) {
            Some(card) if card.text != text => {
                card.text = text.to_string();
                true
            }
            _ => false,
        });
    }

    fn set_class(&self, id: &str, class: &str, active: bool) {
        self.edit(|board| match board.card_mut(id) {
            Some(card) if active => card.classes.insert(class.to_string()),
            Some(card) => card.classes.remove(class),
            None => false,
        });
    }

    fn remove_after_delay(&self, id: &str, delay: Duration) {
        let generation = match self.board.lock() {
            Ok(board) => match board.cards.iter().find(|c| c.id == id) {
                Some(card) => card.generation,
                None => return,
            },
            Err(e) => {
                warn!("Failed to lock board: {}", e);
                return;
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let board = Arc::clone(&self.board);
                let id = id.to_string();
                handle.spawn(async move {
                    sleep(delay).await;
                    remove_card(&board, &id, generation);
                });
            }
            Err(_) => remove_card(&self.board, id, generation),
        }
    }

    fn reorder(&self, ids_in_order: &[String]) {
        self.edit(|board| {
            let position = |id: &str| ids_in_order.iter().position(|i| i == id).unwrap_or(usize::MAX);
            let before: Vec<String> = board.cards.iter().map(|c| c.id.clone()).collect();
            board.cards.sort_by_key(|c| position(&c.id));
            board.cards.iter().map(|c| &c.id).ne(before.iter())
        });
    }

    fn set_status(&self, status: SyncStatus) {
        self.edit(|board| {
            let changed = board.status != status;
            board.status = status;
            changed
        });
    }

    fn set_delay(&self, delay_seconds: u32) {
        self.edit(|board| {
            let changed = board.delay_seconds != delay_seconds;
            board.delay_seconds = delay_seconds;
            changed
        });
    }

    fn set_clock(&self, text: &str) {
        self.edit(|board| {
            if board.clock == text {
                return false;
            }
            board.clock = text.to_string();
            true
        });
    }

    fn set_refresh_countdown(&self, seconds: i64) {
        self.edit(|board| {
            let changed = board.refresh_seconds != seconds;
            board.refresh_seconds = seconds;
            changed
        });
    }

    fn set_warning(&self, visible: bool) {
        self.edit(|board| {
            let changed = board.warning_visible != visible;
            board.warning_visible = visible;
            changed
        });
    }
}
