//! Interactive terminal console.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::console::{Console, ConsoleEvent, Dispatcher, NoticeKind};
use crate::model::{ConsoleConfig, MarkerColor, Mode};

mod app;
mod event_loop;
mod modal;
mod render;
mod runtime;
mod style;
mod time_fmt;

use app::{App, Focus, HostRow};
use modal::{Modal, ModalKind};

pub fn run(cfg: &ConsoleConfig) -> Result<()> {
    runtime::run(cfg)
}
