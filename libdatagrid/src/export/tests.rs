use super::*;
use chrono::TimeZone;

mod support;
