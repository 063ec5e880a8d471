use super::*;
use crate::message::GridMessage;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

mod columns_theme;
mod filtering;
mod layout_interaction;
mod support;
