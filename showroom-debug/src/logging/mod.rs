mod colors;
mod print;
mod stack;
mod symbols;
mod timer;

pub use self::colors::{Colorize, Colorized};
pub use self::print::print_indented;
pub use self::timer::Timer;
pub use crate::print_debug;
