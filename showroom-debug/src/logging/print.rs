use std::io::Write;

use super::stack::{get_message_count, increment_message_count, message_offset, stack_size};
use super::symbols::{ARROW, NEWLINE};

/// Prints a formatted message, indented below the currently running
/// [`Timer`](super::Timer)s.
#[macro_export]
macro_rules! print_debug {
    ($($arguments:tt)*) => {
        $crate::logging::print_indented(format!($($arguments)*), true)
    };
}

pub(crate) fn print_prefix(message: String) {
    print_indented(message, false);
}

/// Prints a message with the indentation of the current timer stack.
pub fn print_indented(message: String, newline: bool) {
    let offset = message_offset();
    let mut output = std::io::stdout().lock();

    if stack_size() > 0 {
        if get_message_count() == 0 {
            let _ = writeln!(output, " {ARROW} started");
        }

        increment_message_count();
    }

    let _ = write!(output, "{:offset$}", "");

    if offset != 0 {
        let _ = write!(output, "{NEWLINE} ");
    }

    let _ = write!(output, "{message}");

    if newline {
        let _ = writeln!(output);
    }
}
