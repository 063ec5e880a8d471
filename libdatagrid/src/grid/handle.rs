use std::sync::mpsc::Sender;

use crate::message::GridMessage;
use crate::try_log_error;

use super::model::RowKey;

/// Imperative selection commands for the host, usable outside the draw
/// loop. Commands are queued and applied when the grid next updates.
#[derive(Debug, Clone)]
pub struct GridHandle {
    sender: Sender<GridMessage>,
}

impl GridHandle {
    pub(crate) fn new(sender: Sender<GridMessage>) -> Self {
        Self { sender }
    }

    pub fn deselect_row(&self, key: impl Into<RowKey>) {
        self.send(GridMessage::DeselectRow(key.into()));
    }

    pub fn clear_selected_rows(&self) {
        self.send(GridMessage::ClearSelectedRows);
    }

    fn send(&self, message: GridMessage) {
        try_log_error!(self.sender.send(message), "Grid command dropped");
    }
}
