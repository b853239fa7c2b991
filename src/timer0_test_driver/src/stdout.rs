//! The console of a hosted run.
use std::{
    fmt,
    io::{self, Write as _},
};

pub struct Console;

impl fmt::Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        io::stdout().lock().write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
