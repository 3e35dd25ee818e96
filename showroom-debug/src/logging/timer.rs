use std::time::Instant;

use super::colors::Colorize;
use super::print::print_prefix;
use super::stack::{decrement_stack, get_message_count, increment_stack, stack_size};
use super::symbols::ARROW;
use crate::print_debug;

/// Scoped measurement of a named operation. Messages printed while the timer
/// is alive are indented below it. Dropping the timer without calling
/// [`stop`](Timer::stop) reports the operation as failed.
pub struct Timer {
    start_time: Instant,
    completed: bool,
    name: String,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self::new_dynamic(String::from(name))
    }

    pub fn new_dynamic(name: String) -> Self {
        if stack_size() == 0 {
            let timestamp = chrono::offset::Local::now().time().format("%H:%M:%S").to_string();
            print_prefix(format!("[{}] {}", timestamp.red(), name));
        } else {
            print_prefix(name.clone());
        }

        increment_stack(2);

        Self {
            start_time: Instant::now(),
            completed: false,
            name,
        }
    }

    pub fn stop(mut self) {
        self.finish("completed".green().to_string());
        self.completed = true;
    }

    fn finish(&self, status: String) {
        let elapsed = format!("{}ms", self.start_time.elapsed().as_millis());

        if stack_size() > 0 && get_message_count() == 0 {
            decrement_stack();
            println!(" ({})", elapsed.cyan());
        } else {
            decrement_stack();
            print_debug!("{} {} {} ({})", self.name, ARROW, status, elapsed.cyan());
        }

        if stack_size() == 0 {
            println!();
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if !self.completed {
            self.finish("failed".red().to_string());
        }
    }
}
